//! Wire labels and the device wire register.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};

/// A user-facing label for one wire (qubit slot).
///
/// Labels are either integers (`0`, `-1`, `2`) or strings (`"ancilla"`).
/// Devices translate them to contiguous indices before anything reaches
/// the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireLabel {
    /// Numeric label.
    Index(i64),
    /// Named label.
    Name(String),
}

impl fmt::Display for WireLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireLabel::Index(i) => write!(f, "{i}"),
            WireLabel::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for WireLabel {
    fn from(i: i64) -> Self {
        WireLabel::Index(i)
    }
}

impl From<i32> for WireLabel {
    fn from(i: i32) -> Self {
        WireLabel::Index(i64::from(i))
    }
}

impl From<u32> for WireLabel {
    fn from(i: u32) -> Self {
        WireLabel::Index(i64::from(i))
    }
}

impl From<&str> for WireLabel {
    fn from(name: &str) -> Self {
        WireLabel::Name(name.to_string())
    }
}

impl From<String> for WireLabel {
    fn from(name: String) -> Self {
        WireLabel::Name(name)
    }
}

/// Ordered register of unique wire labels owned by a device.
///
/// The position of a label in the register is its device-local index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wires {
    labels: Vec<WireLabel>,
}

impl Wires {
    /// Create a register from explicit labels.
    ///
    /// Returns an error if a label appears twice.
    pub fn new(labels: impl IntoIterator<Item = impl Into<WireLabel>>) -> IrResult<Self> {
        let mut seen = Vec::new();
        for label in labels {
            let label = label.into();
            if seen.contains(&label) {
                return Err(IrError::DuplicateWire(label));
            }
            seen.push(label);
        }
        Ok(Self { labels: seen })
    }

    /// Create the register `0..n`.
    pub fn range(n: u32) -> Self {
        Self {
            labels: (0..n).map(WireLabel::from).collect(),
        }
    }

    /// Number of wires.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the register has no wires.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The labels in register order.
    pub fn labels(&self) -> &[WireLabel] {
        &self.labels
    }

    /// Device-local index of `label`, if registered.
    pub fn index_of(&self, label: &WireLabel) -> Option<u32> {
        self.labels
            .iter()
            .position(|l| l == label)
            .and_then(|i| u32::try_from(i).ok())
    }

    /// Map operation wire labels to device-local indices.
    pub fn map(&self, labels: &[WireLabel], op_name: &str) -> IrResult<Vec<u32>> {
        labels
            .iter()
            .map(|label| {
                self.index_of(label).ok_or_else(|| IrError::WireNotFound {
                    wire: label.clone(),
                    op_name: Some(op_name.to_string()),
                })
            })
            .collect()
    }
}
