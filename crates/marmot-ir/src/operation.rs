//! Abstract operations as handed over by the host framework.
//!
//! An [`Operation`] is a named gate application: the name follows the
//! host's vocabulary (`"RX"`, `"Hadamard"`, `"CNOT"`, ...), parameters are
//! plain reals and wires are user-facing labels. Devices decide which names
//! they support and how to lower them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::wire::WireLabel;

/// Name suffix marking the inverse of an operation (`"RX.inv"`).
pub const INVERSE_SUFFIX: &str = ".inv";

/// Operations that prepare a full register state.
///
/// They are only meaningful as the first operation of a circuit.
pub const STATE_PREPARATIONS: &[&str] = &["BasisState", "StatePrep", "QubitStateVector"];

/// A single abstract gate application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation name in the host vocabulary.
    pub name: String,
    /// Real-valued parameters (a basis state carries its bits here).
    #[serde(default, alias = "parameters")]
    pub params: Vec<f64>,
    /// Wires the operation acts on.
    pub wires: Vec<WireLabel>,
    /// Whether this is the inverse of the named operation.
    #[serde(default, alias = "inverse")]
    pub adjoint: bool,
}

impl Operation {
    /// Create a parameterless operation.
    pub fn new(name: impl Into<String>, wires: impl IntoIterator<Item = impl Into<WireLabel>>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            wires: wires.into_iter().map(Into::into).collect(),
            adjoint: false,
        }
    }

    /// Set the parameters.
    pub fn with_params(mut self, params: impl IntoIterator<Item = f64>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    /// Return the inverse of this operation.
    #[must_use]
    pub fn inverse(mut self) -> Self {
        self.adjoint = !self.adjoint;
        self
    }

    /// The name with any `.inv` suffix removed, and the effective adjoint flag.
    ///
    /// `"RX.inv"` is the same operation as `"RX"` with the adjoint flag set;
    /// applying both cancels out.
    pub fn resolved_name(&self) -> (&str, bool) {
        match self.name.strip_suffix(INVERSE_SUFFIX) {
            Some(base) => (base, !self.adjoint),
            None => (&self.name, self.adjoint),
        }
    }

    /// Whether this operation prepares a full register state.
    pub fn is_state_preparation(&self) -> bool {
        STATE_PREPARATIONS.contains(&self.resolved_name().0)
    }

    /// Check the number of parameters.
    pub fn expect_params(&self, expected: usize) -> IrResult<()> {
        if self.params.len() == expected {
            Ok(())
        } else {
            Err(IrError::ParameterCountMismatch {
                op_name: self.name.clone(),
                expected,
                got: self.params.len(),
            })
        }
    }

    /// Check the number of wires.
    pub fn expect_wires(&self, expected: usize) -> IrResult<()> {
        if self.wires.len() == expected {
            Ok(())
        } else {
            Err(IrError::WireCountMismatch {
                op_name: self.name.clone(),
                expected,
                got: self.wires.len(),
            })
        }
    }

    // Host-vocabulary shorthands.

    /// `RX(theta)`, theta in radians.
    pub fn rx(theta: f64, wire: impl Into<WireLabel>) -> Self {
        Self::new("RX", [wire]).with_params([theta])
    }

    /// `RY(theta)`, theta in radians.
    pub fn ry(theta: f64, wire: impl Into<WireLabel>) -> Self {
        Self::new("RY", [wire]).with_params([theta])
    }

    /// `RZ(theta)`, theta in radians.
    pub fn rz(theta: f64, wire: impl Into<WireLabel>) -> Self {
        Self::new("RZ", [wire]).with_params([theta])
    }

    /// Native two-parameter rotation `R(t, p)`, both in half-turns.
    pub fn r(t: f64, p: f64, wire: impl Into<WireLabel>) -> Self {
        Self::new("R", [wire]).with_params([t, p])
    }

    /// Mølmer-Sørensen gate `MS(t)`, t in half-turns.
    pub fn ms(t: f64, a: impl Into<WireLabel>, b: impl Into<WireLabel>) -> Self {
        let wires: [WireLabel; 2] = [a.into(), b.into()];
        Self::new("MS", wires).with_params([t])
    }

    /// Pauli-X.
    pub fn pauli_x(wire: impl Into<WireLabel>) -> Self {
        Self::new("PauliX", [wire])
    }

    /// Pauli-Y.
    pub fn pauli_y(wire: impl Into<WireLabel>) -> Self {
        Self::new("PauliY", [wire])
    }

    /// Pauli-Z.
    pub fn pauli_z(wire: impl Into<WireLabel>) -> Self {
        Self::new("PauliZ", [wire])
    }

    /// Hadamard.
    pub fn hadamard(wire: impl Into<WireLabel>) -> Self {
        Self::new("Hadamard", [wire])
    }

    /// Phase gate `S`.
    pub fn s(wire: impl Into<WireLabel>) -> Self {
        Self::new("S", [wire])
    }

    /// CNOT with `control` and `target`.
    pub fn cnot(control: impl Into<WireLabel>, target: impl Into<WireLabel>) -> Self {
        let wires: [WireLabel; 2] = [control.into(), target.into()];
        Self::new("CNOT", wires)
    }

    /// Prepare the computational basis state `bits` on `wires`.
    pub fn basis_state(
        bits: &[u8],
        wires: impl IntoIterator<Item = impl Into<WireLabel>>,
    ) -> Self {
        Self::new("BasisState", wires).with_params(bits.iter().map(|&b| f64::from(b)))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.adjoint {
            write!(f, "†")?;
        }
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
            write!(f, "({})", params.join(", "))?;
        }
        let wires: Vec<String> = self.wires.iter().map(ToString::to_string).collect();
        write!(f, " [{}]", wires.join(", "))
    }
}
