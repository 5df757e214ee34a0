use chrono::{DateTime, Duration, Utc};

use crate::{enrollments::Team, landing::cooldown};

/// Where a visitor is on the landing page, as carried in the `etapa` query
/// parameter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A fresh visit: the intro plays over the team grid.
    #[default]
    Intro,
    /// Back from the form, or blocked by the cooldown.
    Selecting,
    /// Just enrolled: the grid with the success dialog on top.
    Submitted,
}

impl Step {
    /// Reads `etapa`. Anything unrecognised starts from the intro.
    pub fn from_query(etapa: Option<&str>) -> Step {
        match etapa {
            Some("selecao") => Step::Selecting,
            Some("enviado") => Step::Submitted,
            _ => Step::Intro,
        }
    }

    pub fn shows_intro(self) -> bool {
        matches!(self, Step::Intro)
    }

    pub fn shows_success(self) -> bool {
        matches!(self, Step::Submitted)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Selection {
    Enroll(&'static Team),
    Blocked { remaining: Duration },
}

/// Picking a team opens its form unless this browser enrolled someone less
/// than `cooldown` ago.
pub fn choose(
    team: &'static Team,
    last_submission: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Selection {
    match cooldown::remaining(last_submission, now, cooldown) {
        Some(remaining) => Selection::Blocked { remaining },
        None => Selection::Enroll(team),
    }
}
