//! The administration area at `/painel-admin`.
//!
//! The page itself is a shell around a gate, which asks the server for the
//! current session state and shows either the login form or the dashboard.
//! Every response that changes the session carries a
//! [`SESSION_CHANGED`] trigger, which makes the gate ask again.

use axum::extract::State;
use hypertext::prelude::*;

use crate::{
    admin::dashboard::render_dashboard,
    auth::{AdminUser, SESSION_CHANGED, login::LoginForm},
    enrollments::Team,
    state::AppState,
    template::Page,
    util_resp::{StandardResponse, success},
    widgets::loading::Loading,
};

pub mod dashboard;
pub mod updates;

pub async fn admin_page() -> StandardResponse {
    success(
        Page::new()
            .title("Painel Administrativo - Solarys")
            .script("https://cdn.jsdelivr.net/npm/htmx-ext-ws@2.0.2")
            .body(maud! {
                div id="gate"
                    hx-get="/painel-admin/sessao"
                    hx-trigger=(format!("load, {SESSION_CHANGED} from:body")) {
                    (Loading { msg: "Verificando autenticação..." })
                }
            })
            .render(),
    )
}

/// Whatever the gate should currently show.
pub async fn session_fragment(
    State(state): State<AppState>,
    admin: Option<AdminUser>,
) -> StandardResponse {
    match admin {
        Some(admin) => success(render_dashboard(
            state.store.as_ref(),
            &admin,
            Team::first(),
        )),
        None => success(LoginForm.render()),
    }
}
