use axum::http::StatusCode;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use hypertext::prelude::*;

pub const NOTICE_COOKIE: &str = "aviso_visto";

pub fn seen(jar: &CookieJar) -> bool {
    jar.get(NOTICE_COOKIE).is_some()
}

/// One-time informational banner, shown until the visitor dismisses it.
pub struct UpdateNotice;

impl Renderable for UpdateNotice {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div id="aviso" class="notice" role="status" {
                i class="fas fa-bullhorn" {}
                p {
                    strong { "Novidade: " }
                    "cada número de telefone pode ser inscrito apenas uma vez "
                    "em cada modalidade. Após uma inscrição, é preciso aguardar "
                    "um intervalo antes de enviar outra."
                }
                button class="notice-close"
                    hx-post="/aviso/dispensar"
                    hx-target="#aviso"
                    hx-swap="outerHTML" {
                    "Entendi"
                }
            }
        }
        .render_to(buffer);
    }
}

/// Marks the notice as seen for good and removes it from the page.
pub async fn dismiss_notice(jar: CookieJar) -> (CookieJar, StatusCode) {
    (
        jar.add(Cookie::build((NOTICE_COOKIE, "1")).path("/").permanent()),
        StatusCode::OK,
    )
}
