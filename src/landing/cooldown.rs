use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::Cookie;
use chrono::{DateTime, Duration, Utc};

/// Holds the time of the browser's last successful enrollment. The cookie has
/// no expiry, so it lasts for the browser session only.
///
/// Reloading the page does not reset the wait: the cooldown is kept here
/// rather than in page state on purpose.
pub const COOLDOWN_COOKIE: &str = "ultima_inscricao";

pub fn last_submission(jar: &PrivateCookieJar) -> Option<DateTime<Utc>> {
    jar.get(COOLDOWN_COOKIE)
        .and_then(|cookie| cookie.value().parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis)
}

pub fn start(jar: PrivateCookieJar, now: DateTime<Utc>) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOLDOWN_COOKIE, now.timestamp_millis().to_string()))
            .path("/")
            .http_only(true),
    )
}

/// How much of the cooldown is left, if any.
pub fn remaining(
    last: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Option<Duration> {
    let left = last? + cooldown - now;
    (left > Duration::zero()).then_some(left)
}

/// "1h 05min", rounding up to the next minute.
pub fn describe(left: Duration) -> String {
    let minutes = (left.num_seconds().max(0) + 59) / 60;
    format!("{}h {:02}min", minutes / 60, minutes % 60)
}
