//! Runner entity and genre enumeration.
//!
//! A runner is a registered participant offering one timed activity.
//! Static registration data (name, game, estimate) is combined with the
//! derived scheduling attributes: the *occupied duration* (estimate plus
//! hand-over buffer, rounded up to the scheduling quantum) and the
//! consolidated eligibility windows.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SolveSettings;
use crate::error::ScheduleError;
use crate::models::TimeWindow;

/// A runner to be assigned a session and a start time.
///
/// Identity and ordering are fixed by `id` (1-based input row order).
/// All other fields are payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runner {
    /// Unique, stable identifier (1-based, assigned in input order).
    pub id: u32,
    /// Runner name; co-runners are folded in by the reader.
    pub name: String,
    /// Game title.
    pub game: String,
    /// Run category.
    pub category: String,
    /// Raw run estimate in seconds, as registered.
    pub est_run_s: i64,
    /// Derived occupied duration in seconds: estimate + buffer, rounded
    /// up to the scheduling quantum. Always a non-negative multiple of
    /// the quantum.
    pub occupied_s: i64,
    /// Game genre tag.
    pub genre: Genre,
    /// Ordered, non-overlapping eligibility windows. May be empty,
    /// which makes the runner valid but unschedulable.
    pub windows: Vec<TimeWindow>,
    /// Stream URL.
    pub url: String,
    /// Promotional text.
    pub promo: String,
    /// Free-form note.
    pub note: String,
}

impl Runner {
    /// Creates a runner, deriving the occupied duration from the
    /// estimate and the buffer/quantum tuning in `settings`.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        genre: Genre,
        est_run_s: i64,
        settings: &SolveSettings,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            game: String::new(),
            category: String::new(),
            est_run_s,
            occupied_s: round_up_to_quantum(est_run_s + settings.buffer_s, settings.quantum_s),
            genre,
            windows: Vec::new(),
            url: String::new(),
            promo: String::new(),
            note: String::new(),
        }
    }

    /// Sets the game title.
    pub fn with_game(mut self, game: impl Into<String>) -> Self {
        self.game = game.into();
        self
    }

    /// Sets the run category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the eligibility windows.
    pub fn with_windows(mut self, windows: Vec<TimeWindow>) -> Self {
        self.windows = windows;
        self
    }

    /// Sets the stream URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the promotional text.
    pub fn with_promo(mut self, promo: impl Into<String>) -> Self {
        self.promo = promo.into();
        self
    }

    /// Sets the free-form note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Whether the runner has at least one eligibility window.
    pub fn is_schedulable(&self) -> bool {
        !self.windows.is_empty()
    }
}

impl PartialEq for Runner {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Runner {}

impl PartialOrd for Runner {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Runner {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

/// Rounds `seconds` up to the next multiple of `quantum_s`.
///
/// Never rounds down; an exact multiple is returned unchanged.
fn round_up_to_quantum(seconds: i64, quantum_s: i64) -> i64 {
    let rem = seconds.rem_euclid(quantum_s);
    if rem == 0 {
        seconds
    } else {
        seconds + quantum_s - rem
    }
}

/// Game genre tags.
///
/// A fixed, closed enumeration: labels outside it fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    RolePlaying,
    Shooter,
    Action,
    Puzzle,
    Racing,
    Simulation,
    Fighting,
    Rhythm,
    Other,
}

impl Genre {
    /// All tags, in display order.
    pub const ALL: [Genre; 9] = [
        Genre::RolePlaying,
        Genre::Shooter,
        Genre::Action,
        Genre::Puzzle,
        Genre::Racing,
        Genre::Simulation,
        Genre::Fighting,
        Genre::Rhythm,
        Genre::Other,
    ];

    /// Short code used in schedule output cells.
    pub fn code(&self) -> &'static str {
        match self {
            Genre::RolePlaying => "RPG",
            Genre::Shooter => "STG",
            Genre::Action => "ACT",
            Genre::Puzzle => "PZL",
            Genre::Racing => "RCG",
            Genre::Simulation => "SLG",
            Genre::Fighting => "FTG",
            Genre::Rhythm => "RTM",
            Genre::Other => "OTH",
        }
    }
}

impl FromStr for Genre {
    type Err = ScheduleError;

    /// Parses a free-text genre label, case-insensitively.
    ///
    /// Both the short codes and the common long-form labels are
    /// accepted; anything else is an [`ScheduleError::UnknownGenre`].
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label.trim().to_ascii_lowercase().as_str() {
            "rpg" | "role-playing" | "role playing" => Ok(Genre::RolePlaying),
            "stg" | "shooter" | "fps" | "tps" => Ok(Genre::Shooter),
            "act" | "action" => Ok(Genre::Action),
            "pzl" | "puzzle" => Ok(Genre::Puzzle),
            "rcg" | "racing" | "race" => Ok(Genre::Racing),
            "slg" | "simulation" | "rts" => Ok(Genre::Simulation),
            "ftg" | "fighting" => Ok(Genre::Fighting),
            "rtm" | "rhythm" | "music" => Ok(Genre::Rhythm),
            "oth" | "other" => Ok(Genre::Other),
            _ => Err(ScheduleError::UnknownGenre {
                label: label.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
