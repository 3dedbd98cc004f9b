use tracing::{debug, info, warn};

use super::fields::{FormFields, UploadFile};
use super::input::{FormInput, ValidationError};
use super::lifecycle::{Lifecycle, RequestToken};
use crate::results::{ResultSink, ResultTable};
use crate::submission::{ScoringBackend, SubmissionFailure, SubmissionPayload};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("a submission is already in progress")]
    InFlight,
}

/// Request that left the form and is waiting for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub token: RequestToken,
    pub payload: SubmissionPayload,
}

/// Whether a backend response settled the form or arrived too late.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Discarded,
}

/// Owns the field values and the request lifecycle of one form.
///
/// `on_submit` and `complete` are split so callers can perform the HTTP call
/// without holding the controller; `submit` runs both around a backend.
#[derive(Debug, Default)]
pub struct FormController {
    fields: FormFields,
    lifecycle: Lifecycle,
    last_token: u64,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn set_file(&mut self, file: Option<UploadFile>) {
        self.fields.file = file;
    }

    pub fn set_weights(&mut self, weights: impl Into<String>) {
        self.fields.weights = weights.into();
    }

    pub fn set_impacts(&mut self, impacts: impl Into<String>) {
        self.fields.impacts = impacts.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.fields.email = email.into();
    }

    /// Shows and requires the e-mail field, or hides it. Nothing is validated here.
    pub fn on_toggle_send_mail(&mut self, checked: bool) {
        self.fields.send_mail = checked;
    }

    pub fn email_field_visible(&self) -> bool {
        self.fields.send_mail
    }

    pub fn email_required(&self) -> bool {
        self.fields.send_mail
    }

    pub fn submit_disabled(&self) -> bool {
        self.lifecycle.is_loading()
    }

    /// Captures the submitted field values and, if they satisfy the required
    /// fields, moves to `Loading` and hands back the request to send.
    ///
    /// A blocked submission leaves the lifecycle untouched.
    pub fn on_submit(&mut self, snapshot: FormFields) -> Result<PendingSubmission, SubmitError> {
        if self.lifecycle.is_loading() {
            return Err(SubmitError::InFlight);
        }

        self.fields = snapshot;
        let input = FormInput::from_fields(&self.fields).inspect_err(|err| {
            debug!(reason = %err, "submission blocked by required fields");
        })?;

        self.last_token += 1;
        let token = RequestToken(self.last_token);
        self.lifecycle = Lifecycle::Loading { token };
        info!(
            token = token.0,
            file = %input.file.file_name,
            send_mail = input.delivery.send_mail(),
            "submission started"
        );

        Ok(PendingSubmission {
            token,
            payload: SubmissionPayload::from(input),
        })
    }

    /// Settles the form with a backend outcome, unless a reset or a newer
    /// submission has happened since `token` was issued.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<ResultTable, SubmissionFailure>,
    ) -> Completion {
        match self.lifecycle {
            Lifecycle::Loading { token: current } if current == token => {}
            _ => {
                debug!(token = token.0, state = self.lifecycle.label(), "stale response discarded");
                return Completion::Discarded;
            }
        }

        self.lifecycle = match outcome {
            Ok(table) => {
                info!(token = token.0, rows = table.rows.len(), "submission succeeded");
                Lifecycle::Succeeded(table)
            }
            Err(failure) => {
                warn!(token = token.0, message = %failure.message, "submission failed");
                Lifecycle::Failed(failure.message)
            }
        };
        Completion::Applied
    }

    pub async fn submit<B>(
        &mut self,
        snapshot: FormFields,
        backend: &B,
    ) -> Result<&Lifecycle, SubmitError>
    where
        B: ScoringBackend + ?Sized,
    {
        let PendingSubmission { token, payload } = self.on_submit(snapshot)?;
        let outcome = backend.score(payload).await;
        self.complete(token, outcome);
        Ok(&self.lifecycle)
    }

    /// Clears every field and any result or error. No request is made.
    pub fn on_reset(&mut self) {
        self.fields = FormFields::default();
        self.lifecycle = Lifecycle::Idle;
        debug!("form reset");
    }

    /// Hands the stored rows to `sink`; returns whether there was anything to show.
    pub fn present<S: ResultSink>(&self, sink: &mut S) -> Result<bool, S::Error> {
        match &self.lifecycle {
            Lifecycle::Succeeded(table) => {
                sink.display(table.rows.clone())?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
