//! Marmot Operation Model
//!
//! This crate holds the host-facing data model shared by every Marmot
//! device: abstract [`Operation`]s expressed in the host framework's gate
//! vocabulary, and the [`Wires`] register that maps user-facing
//! [`WireLabel`]s to device-local indices.
//!
//! Nothing here knows about a particular provider. Adapters such as
//! `marmot-adapter-aqt` decide which operation names they accept and how
//! to lower them to their native gate set.
//!
//! # Example
//!
//! ```rust
//! use marmot_ir::{Operation, WireLabel, Wires};
//!
//! let wires = Wires::new([WireLabel::from("a"), WireLabel::from("b")]).unwrap();
//! let ops = vec![
//!     Operation::hadamard("a"),
//!     Operation::cnot("a", "b"),
//!     Operation::rz(0.25, "b").inverse(),
//! ];
//!
//! let mapped = wires.map(&ops[1].wires, &ops[1].name).unwrap();
//! assert_eq!(mapped, vec![0, 1]);
//! assert_eq!(ops[2].resolved_name(), ("RZ", true));
//! ```

pub mod error;
pub mod operation;
pub mod wire;

pub use error::{IrError, IrResult};
pub use operation::{INVERSE_SUFFIX, Operation, STATE_PREPARATIONS};
pub use wire::{WireLabel, Wires};
