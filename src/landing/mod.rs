//! The public landing page: intro, team grid, registration countdown and the
//! cooldown gate in front of the enrollment form.

use axum::extract::{Query, State};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    enrollments::TEAMS,
    landing::{
        countdown::{Countdown, Remaining, ensure_deadline},
        flow::Step,
        notice::UpdateNotice,
    },
    settings::Settings,
    state::AppState,
    template::Page,
    util_resp::{StandardResponse, success},
    widgets::alert::WarningAlert,
};

pub mod cooldown;
pub mod countdown;
pub mod flow;
pub mod notice;

#[derive(Deserialize, Default)]
pub struct LandingQuery {
    #[serde(default)]
    etapa: Option<String>,
}

pub async fn landing_page(
    State(state): State<AppState>,
    Query(query): Query<LandingQuery>,
    jar: CookieJar,
) -> (CookieJar, StandardResponse) {
    let (jar, page) = render_landing(
        &state.settings,
        jar,
        Step::from_query(query.etapa.as_deref()),
        None,
    );
    (jar, success(page))
}

/// The landing page for `step`. `blocked` is the cooldown left when the
/// visitor just tried to pick a team too soon.
pub fn render_landing(
    settings: &Settings,
    jar: CookieJar,
    step: Step,
    blocked: Option<Duration>,
) -> (CookieJar, Rendered<String>) {
    let now = Utc::now();
    let (jar, deadline) =
        ensure_deadline(jar, now, settings.registration_window());

    let landing = Landing {
        step,
        remaining: Remaining::until(deadline, now),
        show_notice: !notice::seen(&jar),
        blocked,
        intro_ms: settings.intro().as_millis(),
    };

    (jar, Page::new().body(landing).render())
}

struct Landing {
    step: Step,
    remaining: Remaining,
    show_notice: bool,
    blocked: Option<Duration>,
    intro_ms: u128,
}

impl Renderable for Landing {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="home" {
                @if self.step.shows_intro() {
                    div class="intro"
                        style=(format!("animation-delay: {}ms", self.intro_ms)) {
                        div class="intro-icons" {
                            @for team in &TEAMS {
                                div class="intro-circle"
                                    style=(format!("background: {}", team.color)) {
                                    i class=(team.icon) {}
                                }
                            }
                        }
                        div class="intro-text" {
                            h1 { "Solarys" }
                            p { "Nós somos a nova geração" }
                        }
                    }
                }
                div class="content" {
                    div class="banner" {
                        h2 {
                            i class="fas fa-trophy" {}
                            " Movimento e Transformação"
                        }
                        p { "Junte-se ao melhor" }
                    }
                    @if self.show_notice {
                        (UpdateNotice)
                    }
                    (Countdown { remaining: self.remaining })
                    @if let Some(left) = self.blocked {
                        (WarningAlert {
                            msg: format!(
                                "Você enviou uma inscrição recentemente. Aguarde {} para fazer uma nova inscrição.",
                                cooldown::describe(left)
                            ),
                        })
                    }
                    h3 class="title" { "Escolha sua modalidade" }
                    div class="cards" {
                        @for team in &TEAMS {
                            a class="card" href=(format!("/inscricao/{}", team.name)) {
                                div class="card-icon"
                                    style=(format!("box-shadow: 0 0 40px {}, inset 0 0 10px #000", team.color)) {
                                    i class=(team.icon)
                                      style=(format!("background-image: linear-gradient(135deg, white, {}); -webkit-background-clip: text; -webkit-text-fill-color: transparent;", team.color)) {}
                                }
                                h4 { (team.name) }
                                p { (team.sport) }
                                div class="colors" {
                                    div class="color" style=(format!("background: {}", team.color)) {}
                                    div class="color border" {}
                                }
                            }
                        }
                    }
                }
                @if self.step.shows_success() {
                    dialog class="dialog" open {
                        i class="fas fa-check-circle" {}
                        h3 { "Inscrição enviada!" }
                        p {
                            "Sua inscrição foi registrada com sucesso. "
                            "Boa sorte na nova temporada!"
                        }
                        form method="dialog" {
                            button type="submit" class="submit-button" { "Fechar" }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}
