use clockwork_core::{ClientError, ViewError};
use thiserror::Error;

/// Everything a command can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    /// A view recorded a failure; the API envelope fields are preserved.
    #[error("{}", .0.message)]
    View(ViewError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to listen for Ctrl-C: {0}")]
    Signal(#[source] std::io::Error),
}

impl From<ViewError> for CliError {
    fn from(err: ViewError) -> Self {
        CliError::View(err)
    }
}

impl CliError {
    /// API-level details, when the failure came from the backend.
    pub fn view_error(&self) -> Option<ViewError> {
        match self {
            CliError::View(err) => Some(err.clone()),
            CliError::Client(err) => err.as_api().map(|_| ViewError::from(err)),
            CliError::Runtime(_) | CliError::Signal(_) => None,
        }
    }
}
