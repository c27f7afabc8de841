//! BundleSink trait - persistence output interface
//!
//! Abstract interface for anything that consumes synchronized frame bundles.

use crate::{ContractError, FrameBundle};

/// Bundle output trait
///
/// The capture loop only talks to this trait; the concrete raw-capture
/// writer (and any test double) implements it.
#[trait_variant::make(BundleSink: Send)]
pub trait LocalBundleSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Persist one synchronized bundle
    ///
    /// # Errors
    /// A persistence error is fatal for the current frame only; the caller
    /// skips the frame and continues the session.
    async fn write(&mut self, bundle: &FrameBundle) -> Result<(), ContractError>;

    /// Flush buffered state (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
