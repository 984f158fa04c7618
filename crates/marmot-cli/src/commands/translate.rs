//! Translate command implementation.

use anyhow::Result;
use console::style;

use marmot_adapter_aqt::{serialize, translate};

use super::common::load_circuit;

/// Execute the translate command.
pub fn execute(input: &str, wires: Option<u32>, format: &str) -> Result<()> {
    let circuit = load_circuit(input, wires)?;
    let instructions = translate(&circuit.operations, &circuit.rotations, &circuit.wires)?;

    match format.to_lowercase().as_str() {
        "json" => println!("{}", serialize(&instructions)?),
        "text" => {
            println!(
                "{} {} AQT instructions on {} wires:",
                style("→").cyan().bold(),
                instructions.len(),
                circuit.wires.len()
            );
            for (i, instruction) in instructions.iter().enumerate() {
                println!("  {:>3}  {}", style(i).dim(), instruction);
            }
        }
        other => anyhow::bail!("Unknown format: '{other}'. Available: json, text"),
    }

    Ok(())
}
