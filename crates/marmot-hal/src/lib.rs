//! Marmot Device Abstraction Layer
//!
//! This crate provides the interface between a host circuit framework and
//! remote execution services.
//!
//! # Overview
//!
//! - A common [`Device`] trait: supported operation names, `apply`, sample
//!   decoding and reset
//! - [`DeviceConfig`] with YAML file, environment and builder layers
//! - [`DeviceRegistry`] mapping short names to device factories
//! - [`Job`] / [`JobStatus`] tracking of remote work
//! - [`PollPolicy`] and the injectable [`Clock`] used while waiting on jobs
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use marmot_hal::{Device, DeviceConfig};
//! use marmot_adapter_aqt::{AqtDevice, AqtTarget};
//! use marmot_ir::{Operation, Wires};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DeviceConfig::load(None)?.with_shots(100);
//!     let mut device = AqtDevice::new(AqtTarget::Simulator, Wires::range(2), config)?;
//!
//!     let ops = [Operation::hadamard(0), Operation::cnot(0, 1)];
//!     let samples = device.execute(&ops, &[]).await?;
//!     assert_eq!(samples.shape(), &[100, 2]);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod job;
pub mod poll;
pub mod registry;

pub use config::{DEFAULT_BASE_URL, DEFAULT_SHOTS, DeviceConfig};
pub use device::Device;
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use poll::{Clock, DEFAULT_RETRY_DELAY, ManualClock, PollPolicy, TokioClock};
pub use registry::DeviceRegistry;
