//! Marmot Device for AQT (Alpine Quantum Technologies)
//!
//! This crate executes Marmot circuits on AQT's ion-trap simulators through
//! the AQT gateway (`https://gateway.aqt.eu/marmot`).
//!
//! # Targets
//!
//! | Registry name     | Path                | Description                     |
//! |-------------------|---------------------|---------------------------------|
//! | `aqt.sim`         | `sim`               | Noiseless simulator             |
//! | `aqt.noisy_sim`   | `sim/noise-model-1` | Simulator with AQT noise model  |
//! | `aqt.base_device` | *(none)*            | Gateway root                    |
//!
//! # Authentication
//!
//! Pass the key through [`DeviceConfig`] or set `AQT_TOKEN`:
//!
//! ```bash
//! export AQT_TOKEN="your-aqt-token"
//! ```
//!
//! # Pipeline
//!
//! ```text
//!   operations ──→ translate ──→ serialize ──→ JobRunner ──→ decode_samples
//!                 (native gates)  (JSON array)  (submit, poll)  (shots × wires)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use marmot_adapter_aqt::{AqtDevice, AqtTarget};
//! use marmot_hal::{Device, DeviceConfig};
//! use marmot_ir::{Operation, Wires};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DeviceConfig::load(None)?.with_shots(100);
//!     let mut device = AqtDevice::new(AqtTarget::Simulator, Wires::range(2), config)?;
//!
//!     let ops = [Operation::hadamard(0), Operation::cnot(0, 1)];
//!     let samples = device.execute(&ops, &[]).await?;
//!     println!("{samples}");
//!     Ok(())
//! }
//! ```

pub mod api;
mod backend;
pub mod circuit;
mod error;
pub mod runner;
pub mod samples;
pub mod translate;

#[cfg(test)]
mod test_support;

pub use api::{ApiResponse, Headers, HttpMethod, HttpTransport, Transport};
pub use backend::{API_KEY_ENV, AqtDevice, AqtTarget};
pub use circuit::{GateCode, Instruction, serialize};
pub use error::{AqtError, AqtResult};
pub use runner::JobRunner;
pub use samples::decode_samples;
pub use translate::{SUPPORTED_OPERATIONS, emit_rotation, translate};

// Re-export common types for convenience.
pub use marmot_hal::{Device, DeviceConfig, DeviceRegistry};
