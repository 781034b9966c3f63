//! The fixed set of journey questions and their results.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Opaque answer payload: field name to value, shape varies by question.
///
/// A failed answer is marked by an `"error"` field rather than by absence,
/// so an aggregate result set always carries all ten entries.
pub type Answer = Map<String, Value>;

/// Build an error answer payload.
pub fn error_answer(message: impl Into<String>) -> Answer {
    let mut map = Map::new();
    map.insert("error".to_string(), Value::String(message.into()));
    map
}

/// True if the payload signals an error condition.
pub fn is_error_answer(answer: &Answer) -> bool {
    answer.contains_key("error")
}

/// The ten fixed journey questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Question {
    LocalTime,
    CurrentStation,
    TrainStatus,
    JourneyDay,
    Distance,
    NextArrival,
    TimeDifference,
    MessageToHer,
    MessageFromHer,
    UpcomingStations,
}

impl Question {
    /// All questions in identity order.
    pub const ALL: [Question; 10] = [
        Question::LocalTime,
        Question::CurrentStation,
        Question::TrainStatus,
        Question::JourneyDay,
        Question::Distance,
        Question::NextArrival,
        Question::TimeDifference,
        Question::MessageToHer,
        Question::MessageFromHer,
        Question::UpcomingStations,
    ];

    /// Question identity, 1 through 10.
    pub fn id(self) -> u8 {
        match self {
            Question::LocalTime => 1,
            Question::CurrentStation => 2,
            Question::TrainStatus => 3,
            Question::JourneyDay => 4,
            Question::Distance => 5,
            Question::NextArrival => 6,
            Question::TimeDifference => 7,
            Question::MessageToHer => 8,
            Question::MessageFromHer => 9,
            Question::UpcomingStations => 10,
        }
    }

    /// Human-readable question text.
    pub fn text(self) -> &'static str {
        match self {
            Question::LocalTime => "Какое сейчас локальное время у пассажира?",
            Question::CurrentStation => "На какой станции пассажир сейчас находится?",
            Question::TrainStatus => "Поезд стоит или в пути?",
            Question::JourneyDay => "Какой день путешествия?",
            Question::Distance => "Какое расстояние от Москвы?",
            Question::NextArrival => "Когда пассажир прибудет на следующую станцию?",
            Question::TimeDifference => {
                "Какая разница во времени между Москвой и текущим городом?"
            }
            Question::MessageToHer => "Если я пишу сейчас, когда она получит?",
            Question::MessageFromHer => "Если она пишет сейчас, когда я получу?",
            Question::UpcomingStations => "Какие основные станции впереди и когда прибытие?",
        }
    }
}

/// Outcome of one question task: produced by exactly one task execution
/// (or its final retry attempt), then immutable.
#[derive(Debug, Clone)]
pub struct QuestionResult {
    /// Which question this answers.
    pub question: Question,

    /// The question text.
    pub text: &'static str,

    /// Answer payload; an `"error"` field marks failure.
    pub answer: Answer,

    /// When the terminal attempt completed.
    pub completed_at: DateTime<Utc>,
}

impl QuestionResult {
    /// True if this result carries an error payload.
    pub fn is_error(&self) -> bool {
        is_error_answer(&self.answer)
    }
}
