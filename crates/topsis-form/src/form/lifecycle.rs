use crate::results::ResultTable;

/// Identifies one submission; only the latest token may settle the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

/// Client-visible status of the current submission attempt.
///
/// The result and the error live inside the terminal variants, so at most one
/// of them exists at any time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Lifecycle {
    #[default]
    Idle,
    Loading {
        token: RequestToken,
    },
    Succeeded(ResultTable),
    Failed(String),
}

impl Lifecycle {
    pub fn is_loading(&self) -> bool {
        matches!(self, Lifecycle::Loading { .. })
    }

    pub fn result(&self) -> Option<&ResultTable> {
        match self {
            Lifecycle::Succeeded(table) => Some(table),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Lifecycle::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Lifecycle::Idle => "idle",
            Lifecycle::Loading { .. } => "loading",
            Lifecycle::Succeeded(_) => "succeeded",
            Lifecycle::Failed(_) => "failed",
        }
    }
}
