//! Shared helpers for CLI commands.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ndarray::Array2;
use serde::Deserialize;

use marmot_adapter_aqt::AqtDevice;
use marmot_hal::{DeviceConfig, DeviceRegistry};
use marmot_ir::{Operation, WireLabel, Wires};

/// Largest register the CLI builds from a count or inferred indices.
pub const MAX_WIRES: u32 = 1024;

/// Device register declared in a circuit file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireDeclaration {
    /// Wires `0..n`.
    Count(u32),
    /// Explicit labels, in device order.
    Labels(Vec<WireLabel>),
}

#[derive(Debug, Deserialize)]
struct CircuitFile {
    #[serde(default)]
    wires: Option<WireDeclaration>,
    operations: Vec<Operation>,
    #[serde(default)]
    rotations: Vec<Operation>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CircuitSource {
    File(CircuitFile),
    Operations(Vec<Operation>),
}

/// A circuit read from disk, ready to hand to a device.
#[derive(Debug, Clone)]
pub struct LoadedCircuit {
    pub operations: Vec<Operation>,
    pub rotations: Vec<Operation>,
    pub wires: Wires,
}

/// Load a circuit from a JSON or YAML file.
///
/// The file holds either a bare list of operations or an object with
/// `operations`, optional `rotations` and optional `wires`. `num_wires`
/// overrides any register declared in the file.
pub fn load_circuit(path: &str, num_wires: Option<u32>) -> Result<LoadedCircuit> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");
    let yaml = matches!(ext.to_lowercase().as_str(), "yaml" | "yml");
    parse_circuit(&source, yaml, num_wires).with_context(|| format!("Invalid circuit file: {path}"))
}

/// Parse circuit source text.
pub fn parse_circuit(source: &str, yaml: bool, num_wires: Option<u32>) -> Result<LoadedCircuit> {
    let parsed: CircuitSource = if yaml {
        serde_yaml_ng::from_str(source)?
    } else {
        serde_json::from_str(source)?
    };

    let (operations, rotations, declared) = match parsed {
        CircuitSource::File(file) => (file.operations, file.rotations, file.wires),
        CircuitSource::Operations(ops) => (ops, Vec::new(), None),
    };

    let wires = match (num_wires, declared) {
        (Some(n), _) | (None, Some(WireDeclaration::Count(n))) => {
            Wires::range(checked_width(n)?)
        }
        (None, Some(WireDeclaration::Labels(labels))) => Wires::new(labels)?,
        (None, None) => infer_wires(operations.iter().chain(&rotations))?,
    };

    Ok(LoadedCircuit {
        operations,
        rotations,
        wires,
    })
}

/// Build a register covering every wire the operations touch.
///
/// Non-negative integer labels yield `0..=max`. Anything else keeps the
/// labels in order of first appearance.
pub fn infer_wires<'a>(ops: impl IntoIterator<Item = &'a Operation>) -> Result<Wires> {
    let mut labels: Vec<WireLabel> = Vec::new();
    for label in ops.into_iter().flat_map(|op| &op.wires) {
        if !labels.contains(label) {
            labels.push(label.clone());
        }
    }

    let indices: Option<Vec<u32>> = labels
        .iter()
        .map(|label| match label {
            WireLabel::Index(i) => u32::try_from(*i).ok(),
            WireLabel::Name(_) => None,
        })
        .collect();

    match indices {
        Some(indices) => {
            let width = match indices.iter().max() {
                Some(max) => max
                    .checked_add(1)
                    .ok_or_else(|| anyhow::anyhow!("Wire index {max} is out of range"))?,
                None => 0,
            };
            Ok(Wires::range(checked_width(width)?))
        }
        None => Ok(Wires::new(labels)?),
    }
}

fn checked_width(width: u32) -> Result<u32> {
    if width > MAX_WIRES {
        anyhow::bail!("Register of {width} wires exceeds the limit of {MAX_WIRES}");
    }
    Ok(width)
}

/// Return the default Marmot configuration file (~/.marmot/config.yaml).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".marmot").join("config.yaml"))
}

/// Load the device configuration.
///
/// An explicit path must exist. Without one, the default file is used if
/// present; environment variables apply on top in both cases.
pub fn load_config(path: Option<&str>) -> Result<DeviceConfig> {
    let file = match path {
        Some(path) => {
            let path = PathBuf::from(path);
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path)
        }
        None => default_config_path().filter(|p| p.exists()),
    };

    if let Some(file) = &file {
        tracing::debug!("Using configuration file {}", file.display());
    }
    Ok(DeviceConfig::load(file.as_deref())?)
}

/// Registry with every device the CLI knows about.
pub fn device_registry() -> DeviceRegistry {
    let mut registry = DeviceRegistry::new();
    AqtDevice::register(&mut registry);
    registry
}

/// Count outcomes, keyed by bitstring in wire order.
pub fn sample_counts(samples: &Array2<u8>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in samples.rows() {
        let bitstring: String = row.iter().map(|&bit| if bit == 0 { '0' } else { '1' }).collect();
        *counts.entry(bitstring).or_insert(0) += 1;
    }
    counts
}

/// Print a histogram of the sampled outcomes.
pub fn print_samples(samples: &Array2<u8>, wires: &Wires) {
    use console::style;

    let shots = samples.nrows();
    println!("\n{} Results ({} shots):", style("✓").green().bold(), shots);

    let labels: Vec<String> = wires.labels().iter().map(ToString::to_string).collect();
    println!("  wires: [{}]", style(labels.join(", ")).dim());

    let mut sorted: Vec<_> = sample_counts(samples).into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let total = shots.max(1) as f64;
    for (bitstring, count) in sorted.iter().take(16) {
        let prob = *count as f64 / total * 100.0;
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }
}
