use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{identifier}: component {component} is invalid: {reason}")]
    InvalidComponent {
        identifier: String,
        component: String,
        reason: String,
    },

    #[error("{identifier}: state {state} is invalid: {reason}")]
    InvalidState {
        identifier: String,
        state: String,
        reason: String,
    },
}

impl PackError {
    pub(crate) fn component(identifier: &str, component: &str, reason: impl ToString) -> Self {
        PackError::InvalidComponent {
            identifier: identifier.to_string(),
            component: component.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn state(identifier: &str, state: &str, reason: impl ToString) -> Self {
        PackError::InvalidState {
            identifier: identifier.to_string(),
            state: state.to_string(),
            reason: reason.to_string(),
        }
    }
}
