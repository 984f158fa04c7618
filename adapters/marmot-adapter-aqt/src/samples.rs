//! Decoding of raw AQT samples.
//!
//! The gateway returns one integer per shot. Bit `k` of that integer
//! (counting from the least significant bit) is the outcome of device
//! wire `k`, so the first wire is the least significant bit.

use ndarray::Array2;

use crate::error::{AqtError, AqtResult};

/// Expand integer samples into a `(shots, wires)` matrix of 0/1 outcomes.
///
/// Fails with [`AqtError::SampleOutOfRange`] if a sample has a bit set
/// beyond the last wire.
pub fn decode_samples(samples: &[u64], num_wires: usize) -> AqtResult<Array2<u8>> {
    let mut out = Array2::zeros((samples.len(), num_wires));
    for (mut row, &sample) in out.rows_mut().into_iter().zip(samples) {
        if num_wires < 64 && sample >> num_wires != 0 {
            return Err(AqtError::SampleOutOfRange {
                sample,
                wires: num_wires,
            });
        }
        for (wire, bit) in row.iter_mut().enumerate().take(64) {
            *bit = ((sample >> wire) & 1) as u8;
        }
    }
    Ok(out)
}
