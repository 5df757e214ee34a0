use axum::extract::State;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use chrono::{DateTime, Duration, Utc};
use hypertext::prelude::*;

use crate::{state::AppState, util_resp::{StandardResponse, success}};

pub const DEADLINE_COOKIE: &str = "prazo_inscricoes";

/// Time left until the registration deadline, split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    /// Never negative: once `deadline` has passed every part is zero.
    pub fn until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total = (deadline - now).num_seconds().max(0);

        Remaining {
            days: total / 86_400,
            hours: total % 86_400 / 3_600,
            minutes: total % 3_600 / 60,
            seconds: total % 60,
        }
    }

    pub fn is_over(&self) -> bool {
        *self
            == Remaining {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 0,
            }
    }
}

/// Reads the browser's deadline, fixing it at `now + window` on the first
/// visit. An existing deadline is never moved.
pub fn ensure_deadline(
    jar: CookieJar,
    now: DateTime<Utc>,
    window: Duration,
) -> (CookieJar, DateTime<Utc>) {
    let stored = jar
        .get(DEADLINE_COOKIE)
        .and_then(|cookie| cookie.value().parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis);

    match stored {
        Some(deadline) => (jar, deadline),
        None => {
            let deadline = now + window;
            let jar = jar.add(
                Cookie::build((
                    DEADLINE_COOKIE,
                    deadline.timestamp_millis().to_string(),
                ))
                .path("/")
                .permanent(),
            );
            (jar, deadline)
        }
    }
}

pub struct Countdown {
    pub remaining: Remaining,
}

impl Renderable for Countdown {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let r = self.remaining;
        let units = [
            (r.days, "dias"),
            (r.hours, "horas"),
            (r.minutes, "min"),
            (r.seconds, "seg"),
        ];

        maud! {
            @if r.is_over() {
                div id="prazo" class="countdown" {
                    p class="countdown-title" { "Inscrições encerradas" }
                    div class="countdown-units" {
                        @for (value, label) in units {
                            div class="countdown-unit" {
                                span class="countdown-value" { (format!("{value:02}")) }
                                span class="countdown-label" { (label) }
                            }
                        }
                    }
                }
            } @else {
                div id="prazo"
                    class="countdown"
                    hx-get="/prazo"
                    hx-trigger="every 1s"
                    hx-swap="outerHTML" {
                    p class="countdown-title" {
                        i class="fas fa-hourglass-half" {}
                        " Tempo restante para inscrições"
                    }
                    div class="countdown-units" {
                        @for (value, label) in units {
                            div class="countdown-unit" {
                                span class="countdown-value" { (format!("{value:02}")) }
                                span class="countdown-label" { (label) }
                            }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

/// Polled once per second by the landing page. Polling stops once the
/// deadline has passed, since the fragment no longer asks to be refreshed.
pub async fn countdown_fragment(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, StandardResponse) {
    let now = Utc::now();
    let (jar, deadline) =
        ensure_deadline(jar, now, state.settings.registration_window());

    (
        jar,
        success(
            Countdown {
                remaining: Remaining::until(deadline, now),
            }
            .render(),
        ),
    )
}
