//! Installation wizard: step registry, configuration persistence, and the
//! sequential workflow driving schema provisioning, admin-user creation and
//! fixture loading.

use thiserror::Error;

pub mod configurator;
pub mod fixtures;
pub mod flash;
pub mod steps;
pub mod workflow;

pub use configurator::Configurator;
pub use flash::{FlashLevel, FlashMessage};
pub use workflow::{InstallationWorkflow, RenderDirective, RequestMethod};

#[derive(Debug, Error)]
pub enum InstallerError {
    /// Step index outside the configured range
    #[error("install step {index} does not exist ({count} steps)")]
    StepNotFound { index: usize, count: usize },
}
