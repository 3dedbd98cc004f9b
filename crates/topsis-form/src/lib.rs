pub mod config;
pub mod error;
pub mod footer;
pub mod form;
pub mod notify;
pub mod results;
pub mod submission;
pub mod telemetry;
