//! OS-integration collaborators the core only passes through to.
//!
//! Failures here must never take the process down: callers log them and
//! continue without the capability.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrationError {
    /// The platform or build has no implementation for this capability.
    Unsupported(&'static str),
    Failed(String),
}

impl Display for IntegrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported(capability) => write!(f, "{capability} is not supported here"),
            Self::Failed(reason) => write!(f, "{reason}"),
        }
    }
}

impl Error for IntegrationError {}

/// Launch-at-login registration.
pub trait AutoLaunch {
    fn is_enabled(&self) -> Result<bool, IntegrationError>;
    fn set_enabled(&mut self, enabled: bool) -> Result<(), IntegrationError>;
}

/// Stand-in used where no launcher is wired up; always reports unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedAutoLaunch;

impl AutoLaunch for UnsupportedAutoLaunch {
    fn is_enabled(&self) -> Result<bool, IntegrationError> {
        Err(IntegrationError::Unsupported("auto-launch"))
    }

    fn set_enabled(&mut self, _enabled: bool) -> Result<(), IntegrationError> {
        Err(IntegrationError::Unsupported("auto-launch"))
    }
}
