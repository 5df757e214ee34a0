use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde_json::{Value, json};

/// Encodes `at` the way the store represents native timestamps.
pub fn to_value(at: DateTime<Utc>) -> Value {
    json!({
        "seconds": at.timestamp(),
        "nanoseconds": at.timestamp_subsec_nanos(),
    })
}

/// Reads a submission time back from a stored document. Older records carry
/// a plain date (or an RFC 3339 string, or epoch milliseconds) instead of the
/// native timestamp object.
pub fn from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Object(map) => {
            let seconds = map.get("seconds")?.as_i64()?;
            let nanos = map
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, nanos)
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|at| at.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|at| at.and_utc())
            }),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// `dd/mm/yyyy` in Brasília time.
pub fn display_date(at: DateTime<Utc>) -> String {
    let local = FixedOffset::west_opt(3 * 3600)
        .map(|brasilia| at.with_timezone(&brasilia).naive_local())
        .unwrap_or(at.naive_utc());
    local.format("%d/%m/%Y").to_string()
}
