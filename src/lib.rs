#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::too_many_lines,
    clippy::uninlined_format_args
)]

pub mod chat;
pub mod config;
pub mod providers;
pub mod reply;
pub mod session;
pub mod store;

pub use config::Config;
