//! Device trait.
//!
//! The [`Device`] trait is the boundary between a host simulation
//! framework and a remote execution service:
//!
//! ```text
//!   operations() ──→ apply() ──→ generate_samples()
//!    (sync, &ref)    (async)        (sync)
//! ```
//!
//! - The host validates its circuit against [`Device::operations`].
//! - [`Device::apply`] lowers, submits and waits for one circuit. It takes
//!   `&mut self`: a device runs at most one circuit at a time.
//! - [`Device::generate_samples`] turns the stored raw samples into a
//!   `(shots, wires)` matrix of 0/1 outcomes.

use std::collections::BTreeSet;

use async_trait::async_trait;
use marmot_ir::{Operation, Wires};
use ndarray::Array2;

use crate::error::HalResult;

/// A remote execution target for abstract circuits.
#[async_trait]
pub trait Device: Send {
    /// Human-readable device name.
    fn name(&self) -> &str;

    /// Registry name (e.g. `"aqt.sim"`).
    fn short_name(&self) -> &str;

    /// The device wire register.
    fn wires(&self) -> &Wires;

    /// Number of wires.
    fn num_wires(&self) -> usize {
        self.wires().len()
    }

    /// Number of shots per execution.
    fn shots(&self) -> u32;

    /// Operation names the device accepts.
    fn operations(&self) -> BTreeSet<&'static str>;

    /// Whether the device accepts `name` (an `.inv` suffix is ignored).
    fn supports_operation(&self, name: &str) -> bool {
        let base = name.strip_suffix(marmot_ir::INVERSE_SUFFIX).unwrap_or(name);
        self.operations().contains(base)
    }

    /// Run `operations` followed by the diagonalizing `rotations`.
    ///
    /// On success the raw samples are stored on the device.
    async fn apply(&mut self, operations: &[Operation], rotations: &[Operation]) -> HalResult<()>;

    /// Decode the stored samples into a `(shots, wires)` matrix.
    fn generate_samples(&self) -> HalResult<Array2<u8>>;

    /// Clear all per-execution state.
    fn reset(&mut self);

    /// Reset, apply and decode in one call.
    async fn execute(
        &mut self,
        operations: &[Operation],
        rotations: &[Operation],
    ) -> HalResult<Array2<u8>> {
        self.reset();
        self.apply(operations, rotations).await?;
        self.generate_samples()
    }
}
