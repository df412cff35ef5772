//! Error types shared by every Easel crate

use crate::element::{Capability, ElementId};
use thiserror::Error;

/// Errors that can occur while building or running a canvas
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EaselError {
    /// Invalid setup: zero fps, negative duration, double start, bad options
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An animation or setter needs a capability the target does not have
    #[error("{kind} does not support {capability}")]
    CapabilityMismatch {
        kind: &'static str,
        capability: Capability,
    },

    /// A drawable failed to describe itself
    #[error("Rendering failed: {0}")]
    Render(String),

    /// A blocked caller was woken because the canvas shut down
    #[error("Wait interrupted: {0}")]
    Interrupted(String),

    /// The handle refers to an element that is no longer stored
    #[error("Element {0:?} is not on the canvas")]
    ElementNotFound(ElementId),
}

impl EaselError {
    pub fn configuration(message: impl Into<String>) -> Self {
        EaselError::Configuration(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        EaselError::Render(message.into())
    }
}

/// Result type for Easel operations
pub type Result<T> = std::result::Result<T, EaselError>;
