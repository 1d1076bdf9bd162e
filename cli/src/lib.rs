//! Terminal host for `clockwork-core`.
//!
//! Supplies the pieces the core leaves to its host: a blocking `ureq`
//! transport, configuration, logging, user-facing error copy, rendering and
//! the polling task behind `timer watch`.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod messages;
pub mod poller;
pub mod render;
pub mod transport;

pub use cli::Cli;
pub use error::CliError;
pub use poller::Poller;
pub use transport::UreqTransport;
