//! Batch execution — `ticketsmith run`.

use anyhow::{Result, bail};
use dialoguer::Confirm;
use std::path::Path;

use ticketsmith::client::GitLabClient;
use ticketsmith::notify::{DesktopNotifier, NoopNotifier, Notifier};
use ticketsmith::orchestrator::{Orchestrator, RunReport, SpecOutcome};
use ticketsmith::settings::Settings;

pub async fn cmd_run(config_path: &Path, yes: bool) -> Result<()> {
    let settings = Settings::load(config_path)?;

    let problems = settings.validate();
    if !problems.is_empty() {
        println!("{}", console::style("Configuration problems:").red().bold());
        for problem in &problems {
            println!("  - {problem}");
        }
        bail!("Fix the configuration before running");
    }

    if settings.issues.is_empty() {
        println!("Nothing to do: no [[issues]] configured.");
        return Ok(());
    }

    // Validation already established the token and description file exist.
    let Some(token) = settings.resolve_token() else {
        bail!("No API token available");
    };
    let description = settings.read_description()?;

    println!(
        "{} issue(s) will be created in project {} at {}",
        settings.issues.len(),
        settings.service.project_id,
        settings.service.base_url
    );
    for spec in &settings.issues {
        println!("  - {}", spec.title);
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Create {} issue(s)?", settings.issues.len()))
            .default(true)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let client = GitLabClient::new(
        &settings.service.base_url,
        settings.service.project_id,
        &token,
        description,
    );

    let report = if settings.notifications.enabled {
        run_with_notifier(&settings, client, DesktopNotifier).await
    } else {
        run_with_notifier(&settings, client, NoopNotifier).await
    };

    println!();
    for outcome in &report.outcomes {
        match outcome {
            SpecOutcome::Completed { title, iid, folder } => {
                println!(
                    "  {} {} → #{} ({})",
                    console::style("✓").green(),
                    title,
                    iid,
                    folder.display()
                );
            }
            SpecOutcome::Failed { title, error } => {
                println!("  {} {}: {}", console::style("✗").red(), title, error);
            }
        }
    }
    println!();
    println!(
        "{} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );

    if report.failed() > 0 {
        bail!(
            "{} of {} issue specs failed",
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(())
}

async fn run_with_notifier<N: Notifier>(
    settings: &Settings,
    client: GitLabClient,
    notifier: N,
) -> RunReport {
    Orchestrator::new(settings, client, notifier).run().await
}
