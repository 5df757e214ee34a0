//! End-to-end tests which drive the router the way a browser (or htmx)
//! would.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::Request,
    http::header::{CONTENT_TYPE, COOKIE},
    response::Response,
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    backend::{
        StoreError,
        auth::SqliteAuthService,
        connect,
        store::{Document, DocumentStore, Fields},
    },
    enrollments::form::EnrollmentForm,
    settings::Settings,
    state::AppState,
};

// This is a macro rather than a function because the `assert!` panic
// then directly notes the span of the call site (rather than requiring
// a look at the stack trace to find it).
macro_rules! assert_res_ok {
    ($response:expr) => {
        assert!(
            $response.status().is_success()
                || $response.status().is_redirection(),
            "response status = {:?}, str = {}",
            $response.status(),
            {
                let body_bytes =
                    axum::body::to_bytes($response.into_body(), usize::MAX)
                        .await
                        .unwrap();
                let body_str = String::from_utf8_lossy(&body_bytes).to_string();
                body_str
            }
        );
    };
}

pub(crate) use assert_res_ok;

mod enrollment;

pub const ADMIN_EMAIL: &str = "admin@solarys.com";
pub const ADMIN_PASSWORD: &str = "senha-do-painel";

fn settings() -> Settings {
    Settings {
        secret_key: Some("0".repeat(64)),
        ..Default::default()
    }
}

/// A fresh in-memory site with one administrator account.
pub fn test_state() -> AppState {
    let pool = connect(":memory:").unwrap();
    SqliteAuthService::new(pool.clone())
        .create_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
        .unwrap();

    AppState::new(pool, settings()).unwrap()
}

/// A store whose backend is permanently unreachable.
pub struct FailingStore;

fn offline() -> StoreError {
    StoreError::Query(diesel::result::Error::BrokenTransactionManager)
}

impl DocumentStore for FailingStore {
    fn create(&self, _: &str, _: Fields) -> Result<String, StoreError> {
        Err(offline())
    }

    fn list(&self, _: &str) -> Result<Vec<Document>, StoreError> {
        Err(offline())
    }

    fn query_eq(
        &self,
        _: &str,
        _: &[(&str, Value)],
    ) -> Result<Vec<Document>, StoreError> {
        Err(offline())
    }

    fn delete(&self, _: &str, _: &str) -> Result<(), StoreError> {
        Err(offline())
    }
}

/// Like [`test_state`], but every enrollment operation fails.
pub fn failing_state() -> AppState {
    AppState {
        store: Arc::new(FailingStore),
        ..test_state()
    }
}

pub fn example_form() -> EnrollmentForm {
    EnrollmentForm {
        nome_completo: "Ana Souza".to_string(),
        data_nascimento: "2010-03-14".to_string(),
        email: "ana@example.com".to_string(),
        numero_telefone: "11999990000".to_string(),
        sala: "B".to_string(),
        turno: "Manhã".to_string(),
        ano_escolar: "9".to_string(),
        problema_saude: String::new(),
    }
}

pub fn form_request(
    method: &str,
    uri: &str,
    form: &impl Serialize,
    cookie: Option<&str>,
) -> Request {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    let builder = match cookie {
        Some(cookie) => builder.header(COOKIE, cookie),
        None => builder,
    };

    builder
        .body(Body::from(serde_urlencoded::to_string(form).unwrap()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request {
    let builder = Request::builder().method(method).uri(uri);
    let builder = match cookie {
        Some(cookie) => builder.header(COOKIE, cookie),
        None => builder,
    };

    builder.body(Body::empty()).unwrap()
}

/// The `name=value` part of the first cookie the response sets.
pub fn set_cookie(response: &Response) -> String {
    response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub async fn body_string(response: Response) -> String {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body_bytes).to_string()
}
