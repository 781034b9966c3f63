//! Domain types for the train tracker.
//!
//! Core model types representing validated route data. Invariants are
//! enforced at construction time (by the schedule loader), so code that
//! receives these types can trust their validity.

mod position;
mod question;
mod station;
mod time;

pub use position::{JourneyInfo, Position, TrainStatus};
pub use question::{Answer, Question, QuestionResult, error_answer, is_error_answer};
pub use station::{StationInterval, first_ordering_violation};
pub use time::{
    TimeError, format_duration, format_local, format_local_short, parse_hhmm,
    parse_stand_duration, timezone_difference,
};
