//! Run command implementation.

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::common::{device_registry, load_circuit, load_config, print_samples};

/// Execute the run command.
pub async fn execute(
    input: &str,
    backend: &str,
    shots: Option<u32>,
    wires: Option<u32>,
    config: Option<&str>,
) -> Result<()> {
    println!("{} Loading circuit from {}", style("→").cyan().bold(), input);
    let circuit = load_circuit(input, wires)?;

    println!(
        "  Operations: {}, rotations: {}, wires: {}",
        circuit.operations.len(),
        circuit.rotations.len(),
        circuit.wires.len()
    );

    let mut config = load_config(config)?;
    if let Some(shots) = shots {
        config = config.with_shots(shots);
    }

    let registry = device_registry();
    let mut device = registry.create(backend, circuit.wires.clone(), config)?;

    if let Some(op) = circuit
        .operations
        .iter()
        .chain(&circuit.rotations)
        .find(|op| !device.supports_operation(&op.name))
    {
        anyhow::bail!(
            "Operation {} is not supported on {}. Supported: {}",
            op.name,
            device.short_name(),
            device.operations().into_iter().collect::<Vec<_>>().join(", ")
        );
    }

    println!(
        "{} Running on {} with {} shots",
        style("→").cyan().bold(),
        style(device.name()).green(),
        device.shots()
    );
    info!("Submitting {} operations to {}", circuit.operations.len(), backend);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Waiting for job to complete...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let outcome = device.execute(&circuit.operations, &circuit.rotations).await;
    spinner.finish_and_clear();
    let samples = outcome?;

    print_samples(&samples, &circuit.wires);

    Ok(())
}
