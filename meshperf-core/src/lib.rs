//! Performance profile model, form validation and the run session state machine.
//!
//! Nothing in this crate performs I/O besides reading user supplied files into a form; the
//! network side lives in `meshperf-runtime`.
mod board;
mod config;
mod constants;
mod error;
mod event;
mod form;
mod generator;
mod mesh;
mod naming;
mod notification;
mod prefs;
mod profile;
mod run;
mod session;

pub mod endpoints;
pub mod validation;

pub use board::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use event::*;
pub use form::*;
pub use generator::*;
pub use mesh::*;
pub use naming::*;
pub use notification::*;
pub use prefs::*;
pub use profile::*;
pub use run::*;
pub use session::*;
pub use validation::{DurationUnit, TestDuration};
