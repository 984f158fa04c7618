//! Backends command implementation.

use anyhow::Result;
use console::style;

use marmot_adapter_aqt::{API_KEY_ENV, AqtTarget, SUPPORTED_OPERATIONS, api::join_path};

use super::common::{device_registry, load_config};

/// Execute the backends command.
pub fn execute(config: Option<&str>) -> Result<()> {
    let config = load_config(config)?;
    let has_key = config.api_key.as_deref().is_some_and(|k| !k.is_empty())
        || std::env::var(API_KEY_ENV).is_ok_and(|k| !k.is_empty());

    println!("{} Available backends:\n", style("Marmot").cyan().bold());

    for name in device_registry().available_devices() {
        let Some(target) = AqtTarget::from_short_name(&name) else {
            continue;
        };
        println!(
            "  {} {} ({})",
            if has_key {
                style("●").green()
            } else {
                style("○").yellow()
            },
            style(&name).bold(),
            target.name()
        );
        println!("    Endpoint: {}", join_path(&config.base_url, target.path()));
        println!("    Shots: {}", config.shots);
        println!();
    }

    println!("  Operations: {}", SUPPORTED_OPERATIONS.join(", "));

    if !has_key {
        println!(
            "\n  {} No API key configured. Set MARMOT_API_KEY or {}.",
            style("!").yellow().bold(),
            API_KEY_ENV
        );
    }

    Ok(())
}
