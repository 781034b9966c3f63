//! Answer builders for the ten journey questions.
//!
//! Each builder produces an opaque field-to-value payload; failures are
//! reported as an `"error"` field so the aggregate result set always has
//! an entry per question.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Europe::Moscow;
use serde_json::{Value, json};

use crate::domain::{
    Answer, Position, Question, TrainStatus, error_answer, format_duration, format_local,
    format_local_short, timezone_difference,
};
use crate::tracker::Tracker;

/// Most upcoming major stations a single answer will list.
const UPCOMING_LIMIT: usize = 10;

/// Answer one question at `instant`.
///
/// `position` is the position resolved once per batch; questions that
/// need it report an error when it is absent.
pub fn answer(
    tracker: &Tracker,
    question: Question,
    instant: DateTime<Utc>,
    position: Option<&Position>,
) -> Answer {
    match question {
        Question::LocalTime => local_time(instant, position),
        Question::CurrentStation => current_station(position),
        Question::TrainStatus => train_status(tracker, instant, position),
        Question::JourneyDay => journey_day(tracker, instant),
        Question::Distance => distance(position),
        Question::NextArrival => next_arrival(instant, position),
        Question::TimeDifference => time_difference(instant, position),
        Question::MessageToHer => message_to_her(instant, position),
        Question::MessageFromHer => message_from_her(instant, position),
        Question::UpcomingStations => upcoming_stations(tracker, position),
    }
}

/// Convert a `json!` object literal into an answer map.
fn fields(value: Value) -> Answer {
    match value {
        Value::Object(map) => map,
        _ => Answer::new(),
    }
}

fn position_or_error(position: Option<&Position>) -> Result<&Position, Answer> {
    position.ok_or_else(|| error_answer("Position not found"))
}

fn local_time(instant: DateTime<Utc>, position: Option<&Position>) -> Answer {
    let pos = match position_or_error(position) {
        Ok(pos) => pos,
        Err(err) => return err,
    };

    fields(json!({
        "local_time": format_local(instant, pos.timezone()),
        "timezone": pos.timezone().name(),
    }))
}

fn current_station(position: Option<&Position>) -> Answer {
    let pos = match position_or_error(position) {
        Ok(pos) => pos,
        Err(err) => return err,
    };

    match pos {
        Position::AtStation { station, .. } => fields(json!({
            "station": station.name,
            "distance_from_moscow": station.distance_km,
            "at_station": true,
        })),
        Position::BetweenStations {
            previous,
            next,
            distance_km,
        } => fields(json!({
            "between_stations": true,
            "previous": previous.name,
            "next": next.name,
            "distance_from_moscow": distance_km.round() as i64,
        })),
    }
}

fn train_status(tracker: &Tracker, instant: DateTime<Utc>, position: Option<&Position>) -> Answer {
    let pos = match position_or_error(position) {
        Ok(pos) => pos,
        Err(err) => return err,
    };

    match tracker.train_status(instant, pos) {
        TrainStatus::Standing {
            station,
            remaining_stand,
        } => fields(json!({
            "status": "СТОИТ",
            "station": station.name,
            "stand_duration": format_duration(station.stand),
            "remaining_stand": format_duration(remaining_stand),
        })),
        TrainStatus::Moving {
            from,
            to,
            time_to_next,
        } => fields(json!({
            "status": "В ПУТИ",
            "from": from.name,
            "to": to.name,
            "time_to_next": format_duration(time_to_next),
        })),
    }
}

fn journey_day(tracker: &Tracker, instant: DateTime<Utc>) -> Answer {
    let info = tracker.journey_info(instant);

    fields(json!({
        "day_number": info.day_number,
        "start_date": format_local(info.start, Moscow),
        "time_in_trip": format_duration(info.elapsed),
    }))
}

fn distance(position: Option<&Position>) -> Answer {
    let pos = match position_or_error(position) {
        Ok(pos) => pos,
        Err(err) => return err,
    };

    let location = pos
        .current_station()
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "между станциями".to_string());

    fields(json!({
        "distance_km": pos.distance_from_start().round() as i64,
        "location": location,
    }))
}

fn next_arrival(instant: DateTime<Utc>, position: Option<&Position>) -> Answer {
    let next = match position.and_then(|pos| pos.next_station()) {
        Some(next) => next,
        None => return error_answer("Next station not found"),
    };

    fields(json!({
        "next_station": next.name,
        "arrival_time": format_local(next.arrival, Moscow),
        "time_remaining": format_duration((next.arrival - instant).max(Duration::zero())),
    }))
}

fn time_difference(instant: DateTime<Utc>, position: Option<&Position>) -> Answer {
    let pos = match position_or_error(position) {
        Ok(pos) => pos,
        Err(err) => return err,
    };

    let diff = timezone_difference(Moscow, pos.timezone(), instant);
    let (direction, magnitude) = if diff < Duration::zero() {
        ("отстаёт от Москвы", -diff)
    } else {
        ("впереди Москвы", diff)
    };

    fields(json!({
        "moscow_time": format_local_short(instant, Moscow),
        "local_time": format_local_short(instant, pos.timezone()),
        "difference": format_duration(magnitude),
        "direction": direction,
    }))
}

fn message_to_her(instant: DateTime<Utc>, position: Option<&Position>) -> Answer {
    let pos = match position_or_error(position) {
        Ok(pos) => pos,
        Err(err) => return err,
    };

    fields(json!({
        "send_time_moscow": format_local_short(instant, Moscow),
        "receive_time_local": format_local_short(instant, pos.timezone()),
        "instant_delivery": true,
        "note": "Сообщение доставляется мгновенно!",
    }))
}

fn message_from_her(instant: DateTime<Utc>, position: Option<&Position>) -> Answer {
    let pos = match position_or_error(position) {
        Ok(pos) => pos,
        Err(err) => return err,
    };

    fields(json!({
        "send_time_local": format_local_short(instant, pos.timezone()),
        "receive_time_moscow": format_local_short(instant, Moscow),
        "instant_delivery": true,
        "note": "Сообщение доставляется мгновенно!",
    }))
}

fn upcoming_stations(tracker: &Tracker, position: Option<&Position>) -> Answer {
    let pos = match position_or_error(position) {
        Ok(pos) => pos,
        Err(err) => return err,
    };

    // Scan starts at the current station, or at the next one when moving.
    let from_id = pos
        .current_station()
        .or_else(|| pos.next_station())
        .map(|s| s.id)
        .unwrap_or(u32::MAX);

    let upcoming: Vec<Value> = tracker
        .stations()
        .iter()
        .filter(|s| s.id >= from_id && s.is_major)
        .take(UPCOMING_LIMIT)
        .map(|s| {
            json!({
                "name": s.name,
                "arrival_time": format_local(s.arrival, Moscow),
                "stand_duration": format_duration(s.stand),
                "distance": s.distance_km,
            })
        })
        .collect();

    fields(json!({
        "count": upcoming.len(),
        "upcoming_stations": upcoming,
    }))
}
