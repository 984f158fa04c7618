//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - abstract circuits on AQT cloud devices",
        style("Marmot").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  marmot-ir           Operations and wire registers");
    println!("  marmot-hal          Device trait, configuration, job polling");
    println!("  marmot-adapter-aqt  AQT gateway device");
    println!("  marmot-cli          Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
