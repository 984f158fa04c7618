//! Contract tests for the provided `Device` methods and the registry,
//! using an in-memory device that echoes a fixed outcome.

use std::collections::BTreeSet;

use async_trait::async_trait;
use marmot_hal::{Device, DeviceConfig, DeviceRegistry, HalError, HalResult};
use marmot_ir::{Operation, Wires};
use ndarray::Array2;

/// Device that "measures" every wire touched by an operation as 1.
struct EchoDevice {
    wires: Wires,
    shots: u32,
    applied: Vec<String>,
    outcome: Option<Vec<u8>>,
    resets: usize,
}

impl EchoDevice {
    fn new(wires: Wires, config: DeviceConfig) -> Self {
        Self {
            wires,
            shots: config.shots,
            applied: Vec::new(),
            outcome: None,
            resets: 0,
        }
    }
}

#[async_trait]
impl Device for EchoDevice {
    fn name(&self) -> &str {
        "Echo device"
    }

    fn short_name(&self) -> &str {
        "test.echo"
    }

    fn wires(&self) -> &Wires {
        &self.wires
    }

    fn shots(&self) -> u32 {
        self.shots
    }

    fn operations(&self) -> BTreeSet<&'static str> {
        ["PauliX", "Hadamard"].into_iter().collect()
    }

    async fn apply(&mut self, operations: &[Operation], rotations: &[Operation]) -> HalResult<()> {
        let mut outcome = vec![0u8; self.num_wires()];
        for op in operations.iter().chain(rotations) {
            if !self.supports_operation(&op.name) {
                return Err(HalError::UnsupportedOperation(op.name.clone()));
            }
            for index in self.wires.map(&op.wires, &op.name)? {
                outcome[index as usize] = 1;
            }
            self.applied.push(op.name.clone());
        }
        self.outcome = Some(outcome);
        Ok(())
    }

    fn generate_samples(&self) -> HalResult<Array2<u8>> {
        let outcome = self
            .outcome
            .as_ref()
            .ok_or_else(|| HalError::NoSamples("nothing executed".into()))?;
        let rows = self.shots as usize;
        let flat: Vec<u8> = outcome.iter().copied().cycle().take(rows * outcome.len()).collect();
        Array2::from_shape_vec((rows, outcome.len()), flat)
            .map_err(|e| HalError::Backend(e.to_string()))
    }

    fn reset(&mut self) {
        self.applied.clear();
        self.outcome = None;
        self.resets += 1;
    }
}

#[tokio::test]
async fn execute_resets_applies_and_decodes() {
    let mut device = EchoDevice::new(Wires::range(3), DeviceConfig::default().with_shots(4));
    device.applied.push("stale".into());

    let samples = device
        .execute(&[Operation::pauli_x(2)], &[Operation::hadamard(0)])
        .await
        .unwrap();

    assert_eq!(device.resets, 1);
    assert_eq!(device.applied, vec!["PauliX", "Hadamard"]);
    assert_eq!(samples.shape(), &[4, 3]);
    assert_eq!(samples.row(0).to_vec(), vec![1, 0, 1]);
}

#[tokio::test]
async fn execute_propagates_apply_errors() {
    let mut device = EchoDevice::new(Wires::range(1), DeviceConfig::default());
    let result = device.execute(&[Operation::cnot(0, 1)], &[]).await;
    assert!(matches!(result, Err(HalError::UnsupportedOperation(name)) if name == "CNOT"));
}

#[test]
fn supports_operation_ignores_inverse_suffix() {
    let device = EchoDevice::new(Wires::range(1), DeviceConfig::default());
    assert!(device.supports_operation("Hadamard"));
    assert!(device.supports_operation("Hadamard.inv"));
    assert!(!device.supports_operation("CNOT"));
}

#[test]
fn samples_before_execution_fail() {
    let device = EchoDevice::new(Wires::range(1), DeviceConfig::default());
    assert!(matches!(device.generate_samples(), Err(HalError::NoSamples(_))));
}

#[test]
fn registry_builds_registered_device() {
    let mut registry = DeviceRegistry::new();
    registry.register_factory("test.echo", |wires, config| {
        Ok(Box::new(EchoDevice::new(wires, config)))
    });

    let Ok(device) = registry.create("test.echo", Wires::range(5), DeviceConfig::default())
    else {
        panic!("registered device should be constructible");
    };
    assert_eq!(device.num_wires(), 5);
    assert_eq!(device.short_name(), "test.echo");
}
