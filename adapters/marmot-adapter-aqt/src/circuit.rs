//! Native AQT instructions and their wire encoding.
//!
//! A circuit is sent as a JSON array of positional arrays:
//!
//! ```text
//! [["X", 1.0, [0]], ["R", 0.5, 0.25, [1]], ["MS", 0.5, [0, 1]]]
//! ```
//!
//! Every angle is in half-turns (radians divided by π).

use std::fmt;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::error::AqtResult;

/// Gate code understood by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateCode {
    /// Rotation about X.
    X,
    /// Rotation about Y.
    Y,
    /// Rotation about Z.
    Z,
    /// Rotation about an axis in the XY plane: `R(theta, phi)`.
    R,
    /// Mølmer-Sørensen entangling gate.
    Ms,
}

impl GateCode {
    /// Wire encoding of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            GateCode::X => "X",
            GateCode::Y => "Y",
            GateCode::Z => "Z",
            GateCode::R => "R",
            GateCode::Ms => "MS",
        }
    }
}

impl fmt::Display for GateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One native instruction on device-local wire indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Gate code.
    pub gate: GateCode,
    /// Parameters in half-turns; two for `R`, one otherwise.
    pub params: Vec<f64>,
    /// Device wire indices.
    pub wires: Vec<u32>,
}

impl Instruction {
    /// Single-parameter instruction (`X`, `Y`, `Z` or `MS`).
    pub fn new(gate: GateCode, param: f64, wires: impl Into<Vec<u32>>) -> Self {
        Self {
            gate,
            params: vec![param],
            wires: wires.into(),
        }
    }

    /// Two-parameter `R(theta, phi)` instruction.
    pub fn r(theta: f64, phi: f64, wires: impl Into<Vec<u32>>) -> Self {
        Self {
            gate: GateCode::R,
            params: vec![theta, phi],
            wires: wires.into(),
        }
    }
}

impl Serialize for Instruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.params.len() + 2))?;
        seq.serialize_element(self.gate.as_str())?;
        for param in &self.params {
            seq.serialize_element(param)?;
        }
        seq.serialize_element(&self.wires)?;
        seq.end()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        write!(f, "{}({}) {:?}", self.gate, params.join(", "), self.wires)
    }
}

/// Encode an instruction buffer as the gateway's JSON string.
pub fn serialize(instructions: &[Instruction]) -> AqtResult<String> {
    Ok(serde_json::to_string(instructions)?)
}
