//! Route schedule loading and static reference data.

mod load;
mod reference;

pub use load::{RawStation, Route, ScheduleError, build_route, load_route};
pub use reference::{TimezoneError, distance_for, is_major_city, parse_timezone, timezone_for};
