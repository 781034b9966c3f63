//! Train journey tracker.
//!
//! Answers the question "where on the Москва - Хабаровск route is the
//! passenger right now?", plus nine follow-up questions about local time,
//! distance, stops, and message timing, all computed concurrently per
//! batch.

pub mod cache;
pub mod domain;
pub mod engine;
pub mod locator;
pub mod schedule;
pub mod tracker;
