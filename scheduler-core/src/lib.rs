//! Core types and pipeline for the THWS scheduler.
//!
//! This crate turns remote schedule data and uploaded files into one
//! canonical event model and serializes it again:
//! - `metadata` and `request` compile user selections into schedule requests
//! - `api` holds the wire types of the remote schedule service
//! - `normalize`, `tabular` and `import` build a [`ResultSet`]
//! - `export` encodes a result set as JSON, CSV or ICS
//! - `state` owns the current result set for one session

pub mod api;
pub mod calendar;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod export;
pub mod import;
pub mod metadata;
pub mod normalize;
pub mod request;
pub mod state;
pub mod tabular;
pub mod time;

mod de;

pub use error::{ScheduleError, ScheduleResult};
pub use event::{LectureEvent, ResultSet, ScheduleDay};
