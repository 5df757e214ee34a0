use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    admin::{
        admin_page,
        dashboard::{delete_enrollment, enrollments_fragment},
        session_fragment,
        updates::enrollment_updates,
    },
    auth::login::{do_login, do_logout},
    enrollments::form::{do_enroll, enrollment_page},
    landing::{countdown::countdown_fragment, landing_page, notice::dismiss_notice},
    state::AppState,
    template::stylesheet,
};

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/prazo", get(countdown_fragment))
        .route("/aviso/dispensar", post(dismiss_notice))
        .route(
            "/inscricao/:team",
            get(enrollment_page).post(do_enroll),
        )
        .route("/painel-admin", get(admin_page))
        .route("/painel-admin/sessao", get(session_fragment))
        .route("/painel-admin/login", post(do_login))
        .route("/painel-admin/logout", post(do_logout))
        .route("/painel-admin/inscricoes", get(enrollments_fragment))
        .route("/painel-admin/inscricoes/:id", delete(delete_enrollment))
        .route("/painel-admin/ws", get(enrollment_updates))
        .route("/static/style.css", get(stylesheet))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
