//! Error taxonomy for the ocean simulation.

use thiserror::Error;

/// Errors surfaced by the simulation core.
///
/// Degenerate spectrum samples (zero wavenumber) are not errors; they are
/// handled where they occur by returning zero density.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OceanError {
    /// Invalid parameters or a missing collaborator. Fatal at start-up.
    #[error("invalid ocean configuration: {0}")]
    Configuration(String),

    /// A render target could not be allocated. Reflections are skipped for the tick.
    #[error("render target allocation failed: {0}")]
    ResourceExhaustion(String),

    /// Buffers were requested before the first synthesis tick completed.
    #[error("ocean buffers are not ready; run a simulation tick first")]
    NotReady,

    /// A tile or LOD level that does not exist in the current epoch was requested.
    #[error("out of range: {0}")]
    OutOfRange(String),
}

impl OceanError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
