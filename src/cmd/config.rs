//! Configuration view and validation commands — `ticketsmith config`.

use anyhow::{Context, Result, bail};
use std::path::Path;

use super::super::ConfigCommands;
use ticketsmith::settings::{SAMPLE_CONFIG, Settings, TOKEN_ENV};

pub fn cmd_config(config_path: &Path, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => show(config_path),
        Some(ConfigCommands::Validate) => validate(config_path),
        Some(ConfigCommands::Init) => init(config_path),
    }
}

fn show(config_path: &Path) -> Result<()> {
    println!();
    println!("Ticketsmith Configuration");
    println!("=========================");
    println!();

    if !config_path.exists() {
        println!("No config file found at {}", config_path.display());
        println!();
        println!("Run 'ticketsmith config init' to create one.");
        return Ok(());
    }

    println!("Config file: {}", config_path.display());
    println!();

    let settings = Settings::load(config_path)?;

    println!("[service]");
    println!("  base_url = \"{}\"", settings.service.base_url);
    println!("  project_id = {}", settings.service.project_id);
    match (
        std::env::var(TOKEN_ENV).is_ok(),
        settings.service.token.is_some(),
    ) {
        (true, _) => println!("  token = <from {TOKEN_ENV}>"),
        (false, true) => println!("  token = <redacted>"),
        (false, false) => println!("  token = <not set>"),
    }
    println!();

    println!("[content]");
    println!(
        "  description_file = \"{}\"",
        settings.content.description_file.display()
    );
    println!();

    println!("[folders]");
    println!(
        "  template_dir = \"{}\"",
        settings.folders.template_dir.display()
    );
    println!(
        "  destination_root = \"{}\"",
        settings.folders.destination_root.display()
    );
    println!();

    println!("[notifications]");
    println!("  enabled = {}", settings.notifications.enabled);
    println!();

    if settings.issues.is_empty() {
        println!("No [[issues]] configured.");
    } else {
        for issue in &settings.issues {
            println!("[[issues]]");
            println!("  title = \"{}\"", issue.title);
            println!("  labels = {:?}", issue.labels);
            println!("  estimate_hours = {}", issue.estimate_hours);
            println!();
        }
    }

    Ok(())
}

fn validate(config_path: &Path) -> Result<()> {
    let settings = Settings::load(config_path)?;
    let problems = settings.validate();

    if problems.is_empty() {
        println!(
            "{} {} is valid",
            console::style("✓").green(),
            config_path.display()
        );
        if settings.issues.is_empty() {
            println!("  Note: no [[issues]] configured, 'run' will do nothing.");
        }
        return Ok(());
    }

    println!("{}", console::style("Configuration problems:").red().bold());
    for problem in &problems {
        println!("  - {problem}");
    }
    bail!("{} problem(s) found", problems.len());
}

fn init(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        bail!(
            "Refusing to overwrite existing config at {}",
            config_path.display()
        );
    }
    std::fs::write(config_path, SAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Wrote sample configuration to {}", config_path.display());
    println!("Edit it, then check it with 'ticketsmith config validate'.");
    Ok(())
}
