//! Lowering of host operations to the AQT native gate set.
//!
//! AQT accepts single-qubit rotations about X, Y and Z, the phased
//! rotation `R(theta, phi)` and the Mølmer-Sørensen gate `MS`. Every other
//! supported operation is rewritten into a fixed sequence of those:
//!
//! | Operation    | Instructions (half-turns)                                    |
//! |--------------|--------------------------------------------------------------|
//! | `RX/RY/RZ(θ)`| `X/Y/Z(θ/π)`                                                  |
//! | `R(t, p)`    | `R(t, p)` (already in half-turns)                            |
//! | `MS(t)`      | `MS(t)` (already in half-turns)                              |
//! | `PauliX/Y/Z` | `X/Y/Z(1)`                                                   |
//! | `S`          | `Z(0.5)`                                                     |
//! | `Hadamard`   | `X(1)`, `Y(-0.5)`                                            |
//! | `CNOT [a,b]` | `Y(0.5)[a]`, `MS(0.5)[a,b]`, `X(-0.5)[a]`, `X(-0.5)[b]`, `Y(-0.5)[a]` |
//! | `BasisState` | `X(1)` on every wire whose bit is 1                          |
//!
//! The adjoint of a rotation negates its angle (both angles for `R`); the
//! adjoint of `Hadamard` is `Y(0.5)`, `X(1)`. `CNOT` and `BasisState`
//! ignore the adjoint flag.

use std::f64::consts::PI;

use marmot_ir::{IrError, Operation, Wires};
use tracing::debug;

use crate::circuit::{GateCode, Instruction};
use crate::error::{AqtError, AqtResult};

/// Operation names accepted by AQT devices.
pub const SUPPORTED_OPERATIONS: &[&str] = &[
    "RX",
    "RY",
    "RZ",
    "BasisState",
    "PauliX",
    "PauliY",
    "PauliZ",
    "Hadamard",
    "S",
    "CNOT",
    "R",
    "MS",
];

/// Supported operation with its parameters validated.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationKind {
    /// `RX(theta)`, radians.
    Rx(f64),
    /// `RY(theta)`, radians.
    Ry(f64),
    /// `RZ(theta)`, radians.
    Rz(f64),
    /// Native `R(theta, phi)`, half-turns.
    R(f64, f64),
    /// Native `MS(theta)`, half-turns.
    Ms(f64),
    /// Pauli-X.
    PauliX,
    /// Pauli-Y.
    PauliY,
    /// Pauli-Z.
    PauliZ,
    /// Phase gate.
    S,
    /// Hadamard.
    Hadamard,
    /// CNOT, control first.
    Cnot,
    /// Computational basis state preparation, one bit per wire.
    BasisState(Vec<bool>),
}

impl OperationKind {
    /// Classify `op` by its resolved name and check its shape.
    pub fn parse(op: &Operation) -> AqtResult<Self> {
        let (name, _) = op.resolved_name();
        let kind = match name {
            "RX" | "RY" | "RZ" => {
                op.expect_params(1)?;
                op.expect_wires(1)?;
                let theta = op.params[0];
                match name {
                    "RX" => OperationKind::Rx(theta),
                    "RY" => OperationKind::Ry(theta),
                    _ => OperationKind::Rz(theta),
                }
            }
            "R" => {
                op.expect_params(2)?;
                op.expect_wires(1)?;
                OperationKind::R(op.params[0], op.params[1])
            }
            "MS" => {
                op.expect_params(1)?;
                op.expect_wires(2)?;
                OperationKind::Ms(op.params[0])
            }
            "PauliX" | "PauliY" | "PauliZ" | "S" | "Hadamard" => {
                op.expect_params(0)?;
                op.expect_wires(1)?;
                match name {
                    "PauliX" => OperationKind::PauliX,
                    "PauliY" => OperationKind::PauliY,
                    "PauliZ" => OperationKind::PauliZ,
                    "S" => OperationKind::S,
                    _ => OperationKind::Hadamard,
                }
            }
            "CNOT" => {
                op.expect_params(0)?;
                op.expect_wires(2)?;
                OperationKind::Cnot
            }
            "BasisState" => {
                op.expect_params(op.wires.len())?;
                let bits = op
                    .params
                    .iter()
                    .map(|&bit| match bit {
                        b if b == 0.0 => Ok(false),
                        b if b == 1.0 => Ok(true),
                        _ => Err(IrError::InvalidBasisState(op.params.clone())),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                OperationKind::BasisState(bits)
            }
            other => return Err(AqtError::UnsupportedOperation(other.to_string())),
        };
        Ok(kind)
    }

    /// Lower to native instructions on the given device wires.
    pub fn lower(&self, adjoint: bool, wires: &[u32]) -> AqtResult<Vec<Instruction>> {
        let sign = if adjoint { -1.0 } else { 1.0 };
        let instructions = match self {
            OperationKind::R(theta, phi) => vec![Instruction::r(sign * theta, sign * phi, wires)],
            OperationKind::BasisState(bits) => bits
                .iter()
                .zip(wires)
                .filter(|(bit, _)| **bit)
                .map(|(_, &wire)| emit_rotation("RX", PI, [wire]))
                .collect::<AqtResult<Vec<_>>>()?,
            OperationKind::Hadamard if adjoint => vec![
                emit_rotation("RY", PI / 2.0, wires)?,
                emit_rotation("RX", PI, wires)?,
            ],
            OperationKind::Hadamard => vec![
                emit_rotation("RX", PI, wires)?,
                emit_rotation("RY", -PI / 2.0, wires)?,
            ],
            // The adjoint flag is not applied to CNOT; the same sequence is
            // emitted either way.
            OperationKind::Cnot => {
                let &[control, target] = wires else {
                    return Err(IrError::WireCountMismatch {
                        op_name: "CNOT".into(),
                        expected: 2,
                        got: wires.len(),
                    }
                    .into());
                };
                vec![
                    emit_rotation("RY", PI / 2.0, [control])?,
                    emit_rotation("MS", PI / 2.0, wires)?,
                    emit_rotation("RX", -PI / 2.0, [control])?,
                    emit_rotation("RX", -PI / 2.0, [target])?,
                    emit_rotation("RY", -PI / 2.0, [control])?,
                ]
            }
            OperationKind::Rx(theta) => vec![emit_rotation("RX", sign * theta, wires)?],
            OperationKind::Ry(theta) => vec![emit_rotation("RY", sign * theta, wires)?],
            OperationKind::Rz(theta) => vec![emit_rotation("RZ", sign * theta, wires)?],
            OperationKind::Ms(theta) => vec![emit_rotation("MS", sign * theta * PI, wires)?],
            OperationKind::PauliX => vec![emit_rotation("RX", sign * PI, wires)?],
            OperationKind::PauliY => vec![emit_rotation("RY", sign * PI, wires)?],
            OperationKind::PauliZ => vec![emit_rotation("RZ", sign * PI, wires)?],
            OperationKind::S => vec![emit_rotation("RZ", sign * PI / 2.0, wires)?],
        };
        Ok(instructions)
    }
}

/// Emit a single rotation given by host name and angle in radians.
///
/// Only names with a one-parameter native code are accepted: `RX`, `RY`,
/// `RZ` and `MS`. Anything else fails with
/// [`AqtError::UnsupportedOperation`].
pub fn emit_rotation(
    name: &str,
    angle: f64,
    wires: impl Into<Vec<u32>>,
) -> AqtResult<Instruction> {
    let gate = match name {
        "RX" => GateCode::X,
        "RY" => GateCode::Y,
        "RZ" => GateCode::Z,
        "MS" => GateCode::Ms,
        other => return Err(AqtError::UnsupportedOperation(other.to_string())),
    };
    Ok(Instruction::new(gate, angle / PI, wires))
}

/// Lower one operation, mapping its wire labels through `wires`.
pub fn translate_operation(op: &Operation, wires: &Wires) -> AqtResult<Vec<Instruction>> {
    let kind = OperationKind::parse(op)?;
    let (_, adjoint) = op.resolved_name();
    let device_wires = wires.map(&op.wires, &op.name)?;
    kind.lower(adjoint, &device_wires)
}

/// Lower a circuit: `operations` followed by the diagonalizing `rotations`.
///
/// State preparations are only accepted as the very first operation of
/// the combined queue.
pub fn translate(
    operations: &[Operation],
    rotations: &[Operation],
    wires: &Wires,
) -> AqtResult<Vec<Instruction>> {
    let instructions = operations.iter().chain(rotations).enumerate().try_fold(
        Vec::new(),
        |mut buffer, (position, op)| {
            if position > 0 && op.is_state_preparation() {
                return Err(AqtError::OperationOrder(op.resolved_name().0.to_string()));
            }
            buffer.extend(translate_operation(op, wires)?);
            Ok(buffer)
        },
    )?;
    debug!(
        "Translated {} operations into {} instructions",
        operations.len() + rotations.len(),
        instructions.len()
    );
    Ok(instructions)
}
