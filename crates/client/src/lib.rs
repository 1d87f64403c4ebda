//! Command-line client: data access over HTTP plus the analytics, advice,
//! alert and onboarding flows built on top of it.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod insights;
pub mod local_state;
pub mod survey;
