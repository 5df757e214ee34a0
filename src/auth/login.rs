use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use hypertext::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{
        AdminUser, SESSION_CHANGED, clear_login_cookie, set_login_cookie,
    },
    backend::auth::SignInError,
    state::AppState,
    widgets::alert::ErrorAlert,
};

/// The only failure message shown to the user, whatever went wrong.
pub const LOGIN_FAILED: &str = "Credenciais inválidas ou erro de conexão.";

#[derive(Deserialize, Serialize, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub struct LoginForm;

impl Renderable for LoginForm {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="login" {
                div class="login-card" {
                    div class="login-header" {
                        i class="fas fa-shield-alt" {}
                        h2 { "Painel Administrativo" }
                        p { "Faça login para acessar as inscrições" }
                    }
                    form hx-post="/painel-admin/login"
                        hx-target="#login-erro"
                        hx-swap="innerHTML" {
                        div id="login-erro" {}
                        div class="form-group" {
                            label for="email" { "Email" }
                            input type="email" id="email" name="email"
                                placeholder="admin@solarys.com" required;
                        }
                        div class="form-group" {
                            label for="password" { "Senha" }
                            input type="password" id="password" name="password"
                                placeholder="Sua senha" required;
                        }
                        button type="submit" class="submit-button" {
                            i class="fas fa-sign-in-alt" {}
                            " Entrar"
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

/// Signs an administrator in. The gate reloads itself on success; on failure
/// the same generic message is shown for unknown emails, wrong passwords and
/// backend errors alike.
pub async fn do_login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(credentials): Form<Credentials>,
) -> Response {
    match state
        .auth
        .sign_in(credentials.email.trim(), &credentials.password)
    {
        Ok(admin) => {
            tracing::info!("admin {} signed in", admin.email);
            (
                set_login_cookie(admin.id, jar),
                [("HX-Trigger", SESSION_CHANGED)],
                "",
            )
                .into_response()
        }
        Err(e) => {
            match e {
                SignInError::UnknownEmail | SignInError::WrongPassword => {
                    tracing::info!("failed admin sign in: {e}")
                }
                SignInError::BadHash(_) | SignInError::Store(_) => {
                    tracing::error!("admin sign in failed: {e}")
                }
            }
            // htmx only swaps successful responses
            Html(ErrorAlert { msg: LOGIN_FAILED }.render().into_inner())
                .into_response()
        }
    }
}

pub async fn do_logout(
    State(state): State<AppState>,
    admin: Option<AdminUser>,
    jar: PrivateCookieJar,
) -> Response {
    if let Some(admin) = admin {
        state.auth.sign_out(&admin);
    }

    (
        clear_login_cookie(jar),
        [("HX-Trigger", SESSION_CHANGED)],
        "",
    )
        .into_response()
}
