use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

pub fn is_valid_email(string: &str) -> Result<(), String> {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
        r#"^(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?|[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])$"#
    ).unwrap()
    });
    match RE.is_match(&string.to_lowercase()) {
        true => Ok(()),
        false => Err("e-mail inválido".to_string()),
    }
}

/// Dates as sent by `<input type="date">`.
pub fn parse_form_date(string: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(string, "%Y-%m-%d")
        .map_err(|_| "data inválida".to_string())
}

#[cfg(test)]
#[test]
fn test_email() {
    assert!(is_valid_email("hello@example.com").is_ok());
    assert!(is_valid_email("Aluno@Escola.com.br").is_ok());
    assert!(is_valid_email("not an email").is_err());
}

#[cfg(test)]
#[test]
fn test_form_date() {
    assert_eq!(
        parse_form_date("2010-03-14"),
        Ok(NaiveDate::from_ymd_opt(2010, 3, 14).unwrap())
    );
    assert!(parse_form_date("14/03/2010").is_err());
}
