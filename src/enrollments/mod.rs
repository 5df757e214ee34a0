//! Enrollment records and the operations the site performs on them.
//!
//! Records live in the [`COLLECTION`] collection of the document store,
//! under the field names of [`fields`]. They are only ever created or
//! deleted.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Value, json};
use thiserror::Error;

use crate::backend::{
    StoreError,
    store::{Document, DocumentStore, Fields},
};

pub mod form;
pub mod teams;
pub mod timestamp;

pub use teams::{TEAMS, Team};

pub const COLLECTION: &str = "inscricoes";

/// The only training slot on offer.
pub const TRAINING_SLOT: &str = "Contraturno";

pub mod fields {
    pub const FULL_NAME: &str = "nomeCompleto";
    pub const BIRTH_DATE: &str = "dataNascimento";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "numeroTelefone";
    pub const CLASS: &str = "sala";
    pub const SHIFT: &str = "turno";
    pub const GRADE: &str = "anoEscolar";
    pub const TRAINING_TIME: &str = "horarioTreino";
    pub const HEALTH_ISSUES: &str = "problemaSaude";
    pub const TEAM: &str = "time";
    pub const SUBMITTED_AT: &str = "dataEnvio";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Morning,
    Afternoon,
}

impl Shift {
    pub const ALL: [Shift; 2] = [Shift::Morning, Shift::Afternoon];

    /// The value written to the store (and submitted by the form).
    pub fn stored(self) -> &'static str {
        match self {
            Shift::Morning => "Manhã",
            Shift::Afternoon => "Tarde",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Shift::Morning => "Matutino (Manhã)",
            Shift::Afternoon => "Vespertino (Tarde)",
        }
    }

    pub fn parse(value: &str) -> Option<Shift> {
        Shift::ALL.into_iter().find(|shift| shift.stored() == value)
    }
}

/// A validated submission, not yet stored.
#[derive(Debug, Clone)]
pub struct NewEnrollment {
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub email: String,
    pub phone: String,
    pub class: String,
    pub shift: Shift,
    pub grade: u32,
    pub health_issues: String,
    pub team: &'static Team,
}

impl NewEnrollment {
    fn to_fields(&self, submitted_at: DateTime<Utc>) -> Fields {
        let mut doc = Fields::new();
        doc.insert(fields::FULL_NAME.into(), json!(self.full_name));
        doc.insert(
            fields::BIRTH_DATE.into(),
            json!(self.birth_date.format("%Y-%m-%d").to_string()),
        );
        doc.insert(fields::EMAIL.into(), json!(self.email));
        doc.insert(fields::PHONE.into(), json!(self.phone));
        doc.insert(fields::CLASS.into(), json!(self.class));
        doc.insert(fields::SHIFT.into(), json!(self.shift.stored()));
        // kept as text, as existing records store it
        doc.insert(fields::GRADE.into(), json!(self.grade.to_string()));
        doc.insert(fields::TRAINING_TIME.into(), json!(TRAINING_SLOT));
        doc.insert(fields::HEALTH_ISSUES.into(), json!(self.health_issues));
        doc.insert(fields::TEAM.into(), json!(self.team.name));
        doc.insert(
            fields::SUBMITTED_AT.into(),
            timestamp::to_value(submitted_at),
        );
        doc
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("an enrollment with this phone number already exists for this team")]
    Duplicate,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Stores `enrollment` unless the same phone number is already enrolled in
/// the same team. Returns the new record's identifier.
///
/// The existence check and the insert are separate store calls, so two
/// simultaneous submissions of the same pair can both be stored.
#[tracing::instrument(skip_all, fields(team = enrollment.team.name))]
pub fn submit(
    store: &dyn DocumentStore,
    enrollment: &NewEnrollment,
    now: DateTime<Utc>,
) -> Result<String, SubmitError> {
    let existing = store.query_eq(
        COLLECTION,
        &[
            (fields::PHONE, json!(enrollment.phone)),
            (fields::TEAM, json!(enrollment.team.name)),
        ],
    )?;

    if !existing.is_empty() {
        tracing::info!("rejected duplicate enrollment");
        return Err(SubmitError::Duplicate);
    }

    let id = store.create(COLLECTION, enrollment.to_fields(now))?;
    tracing::info!("stored enrollment {id}");
    Ok(id)
}

/// An enrollment as the admin dashboard shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentRow {
    pub id: String,
    pub name: String,
    pub grade: String,
    pub class: String,
    pub shift: String,
    pub phone: String,
    pub email: Option<String>,
    pub health_issues: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl EnrollmentRow {
    /// Documents carry no schema, so every field is read leniently.
    pub fn from_document(doc: &Document) -> Self {
        let text = |name: &str| doc.str_field(name).unwrap_or_default().to_string();
        let optional = |name: &str| {
            doc.str_field(name)
                .filter(|value| !value.trim().is_empty())
                .map(str::to_string)
        };

        let grade = match doc.fields.get(fields::GRADE) {
            Some(Value::String(grade)) => format!("{grade}ª série"),
            Some(Value::Number(grade)) => format!("{grade}ª série"),
            _ => String::new(),
        };

        EnrollmentRow {
            id: doc.id.clone(),
            name: text(fields::FULL_NAME),
            grade,
            class: text(fields::CLASS),
            shift: text(fields::SHIFT),
            phone: text(fields::PHONE),
            email: optional(fields::EMAIL),
            health_issues: optional(fields::HEALTH_ISSUES),
            submitted_at: doc
                .fields
                .get(fields::SUBMITTED_AT)
                .and_then(timestamp::from_value),
        }
    }

    pub fn submitted_on(&self) -> String {
        self.submitted_at
            .map(timestamp::display_date)
            .unwrap_or_else(|| "Não disponível".to_string())
    }
}

/// Every enrollment of `team`. The whole collection is fetched and filtered
/// here; the store is never asked to filter.
pub fn list_for_team(
    store: &dyn DocumentStore,
    team: &Team,
) -> Result<Vec<EnrollmentRow>, StoreError> {
    Ok(store
        .list(COLLECTION)?
        .iter()
        .filter(|doc| doc.str_field(fields::TEAM) == Some(team.name))
        .map(EnrollmentRow::from_document)
        .collect())
}

pub fn delete(store: &dyn DocumentStore, id: &str) -> Result<(), StoreError> {
    store.delete(COLLECTION, id)?;
    tracing::info!("deleted enrollment {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::backend::{connect, store::SqliteDocumentStore};

    fn store() -> SqliteDocumentStore {
        SqliteDocumentStore::new(connect(":memory:").unwrap())
    }

    fn enrollment(phone: &str, team: &str) -> NewEnrollment {
        NewEnrollment {
            full_name: "Ana Souza".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2010, 3, 14).unwrap(),
            email: String::new(),
            phone: phone.to_string(),
            class: "B".to_string(),
            shift: Shift::Morning,
            grade: 9,
            health_issues: String::new(),
            team: Team::find(team).unwrap(),
        }
    }

    #[test]
    fn same_phone_and_team_is_refused() {
        let store = store();
        let now = Utc.with_ymd_and_hms(2025, 9, 20, 12, 0, 0).unwrap();

        submit(&store, &enrollment("11999990000", "Matira"), now).unwrap();
        assert!(matches!(
            submit(&store, &enrollment("11999990000", "Matira"), now),
            Err(SubmitError::Duplicate)
        ));

        let matira = Team::find("Matira").unwrap();
        assert_eq!(list_for_team(&store, matira).unwrap().len(), 1);
    }

    #[test]
    fn same_phone_may_join_another_team() {
        let store = store();
        let now = Utc::now();

        submit(&store, &enrollment("11999990000", "Matira"), now).unwrap();
        submit(&store, &enrollment("11999990000", "Nexon"), now).unwrap();

        assert_eq!(store.list(COLLECTION).unwrap().len(), 2);
    }

    #[test]
    fn stored_record_has_every_field() {
        let store = store();
        let now = Utc.with_ymd_and_hms(2025, 9, 20, 12, 0, 0).unwrap();

        let id =
            submit(&store, &enrollment("11988887777", "Falxtra"), now).unwrap();
        let doc = store.list(COLLECTION).unwrap().remove(0);

        assert_eq!(doc.id, id);
        assert_eq!(doc.str_field(fields::TEAM), Some("Falxtra"));
        assert_eq!(doc.str_field(fields::SHIFT), Some("Manhã"));
        assert_eq!(doc.str_field(fields::GRADE), Some("9"));
        assert_eq!(doc.str_field(fields::BIRTH_DATE), Some("2010-03-14"));
        assert_eq!(doc.str_field(fields::TRAINING_TIME), Some(TRAINING_SLOT));
        assert_eq!(
            doc.fields.get(fields::SUBMITTED_AT).and_then(timestamp::from_value),
            Some(now)
        );
    }

    #[test]
    fn listing_keeps_only_the_selected_team() {
        let store = store();
        let now = Utc::now();

        submit(&store, &enrollment("1100000001", "Matira"), now).unwrap();
        submit(&store, &enrollment("1100000002", "Nexon"), now).unwrap();
        submit(&store, &enrollment("1100000003", "Matira"), now).unwrap();

        let rows = list_for_team(&store, Team::find("Matira").unwrap()).unwrap();
        let phones: Vec<_> = rows.iter().map(|r| r.phone.as_str()).collect();
        assert_eq!(phones, vec!["1100000001", "1100000003"]);
        assert!(rows.iter().all(|r| r.grade == "9ª série"));
        assert!(rows.iter().all(|r| r.email.is_none()));
    }

    #[test]
    fn rows_tolerate_hand_written_documents() {
        let doc = Document {
            id: "legado".to_string(),
            fields: json!({
                "nomeCompleto": "Bruno Lima",
                "anoEscolar": 8,
                "email": "bruno@escola.com",
                "problemaSaude": "  ",
                "time": "Nexon",
                "dataEnvio": "2025-09-01",
            })
            .as_object()
            .unwrap()
            .clone(),
        };

        let row = EnrollmentRow::from_document(&doc);
        assert_eq!(row.grade, "8ª série");
        assert_eq!(row.email.as_deref(), Some("bruno@escola.com"));
        assert_eq!(row.health_issues, None);
        assert_eq!(row.phone, "");
        assert_eq!(row.submitted_on(), "31/08/2025");
    }

    #[test]
    fn deleted_records_disappear() {
        let store = store();
        let id =
            submit(&store, &enrollment("11999990000", "Matira"), Utc::now())
                .unwrap();

        delete(&store, &id).unwrap();
        let matira = Team::find("Matira").unwrap();
        assert!(list_for_team(&store, matira).unwrap().is_empty());
    }

    #[test]
    fn shifts_round_trip_through_their_stored_value() {
        for shift in Shift::ALL {
            assert_eq!(Shift::parse(shift.stored()), Some(shift));
        }
        assert_eq!(Shift::parse("Noite"), None);
    }
}
