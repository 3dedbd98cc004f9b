//! Talking to the remote TOPSIS scoring service.

mod backend;
mod client;
mod payload;

pub use backend::{parse_success_body, ScoringBackend, SubmissionFailure, FALLBACK_MESSAGE};
pub use client::{TopsisApiClient, SCORE_PATH};
pub use payload::SubmissionPayload;
