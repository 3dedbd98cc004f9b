//! Submission form state: raw fields, validated input and the request lifecycle.

mod controller;
mod fields;
mod input;
mod lifecycle;

pub use controller::{Completion, FormController, PendingSubmission, SubmitError};
pub use fields::{FormFields, UploadFile};
pub use input::{EmailAddress, FormInput, MailDelivery, ValidationError};
pub use lifecycle::{Lifecycle, RequestToken};
