mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use tagfarm_core::catalog::StashClient;
use tagfarm_core::config::{load_configuration, write_sample_config};
use tagfarm_core::linkfarm::Tally;
use tagfarm_core::{BuildSummary, CleanSummary, TagFarm};
use tracing::{debug, error};

fn main() -> ExitCode {
    dotenv().ok();

    let args = Cli::parse();
    let _guard = logging::init_logger(args.verbose);
    debug!("Using config file: {}", args.config.display());

    let result = match args.command {
        Some(Commands::Build { dry_run }) => run_build(&args.config, dry_run),
        Some(Commands::Clean { dry_run }) => run_clean(&args.config, dry_run),
        Some(Commands::Init { output, force }) => run_init(&output, force),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Error: {:#}", err);
            if matches!(
                err.downcast_ref::<tagfarm_core::Error>(),
                Some(tagfarm_core::Error::ConfigNotFound(_))
            ) {
                eprintln!("Run 'tagfarm init' to create a sample configuration file.");
            }
            ExitCode::FAILURE
        }
    }
}

fn run_build(config_path: &Path, dry_run: bool) -> Result<()> {
    let config = load_configuration(config_path)?;
    debug!("Farm path: {}", config.farm_path.display());
    debug!("Use title: {}", config.use_title);

    let client = StashClient::new(&config.stash_url, config.api_key.as_deref())
        .context("Error creating StashApp client")?;
    let tagfarm = TagFarm::new(config);

    println!("{}", "Building linkfarm...".bold().green());
    let summary = tagfarm.build(&client, dry_run, &CliReporter::new())?;
    print_build_summary(&summary);
    Ok(())
}

fn run_clean(config_path: &Path, dry_run: bool) -> Result<()> {
    let config = load_configuration(config_path)?;
    let tagfarm = TagFarm::new(config);

    println!("{}", "Cleaning linkfarm...".bold().yellow());
    let summary = tagfarm.clean(dry_run, &CliReporter::new())?;
    print_clean_summary(&summary);
    Ok(())
}

fn run_init(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        let prompt = format!(
            "Configuration file '{}' already exists. Overwrite?",
            output.display()
        );
        if !prompt_confirm(&prompt, Some(false))? {
            println!("{}", "Configuration file creation cancelled.".yellow());
            return Ok(());
        }
    }

    write_sample_config(output)
        .with_context(|| format!("Error writing {}", output.display()))?;
    println!(
        "{} Sample configuration created at '{}'",
        "✓".green(),
        output.display()
    );
    println!("{}", "Edit the configuration file to match your setup.".dimmed());
    Ok(())
}

fn format_tally(tally: &Tally, dry_run: bool) -> String {
    let mut parts = Vec::new();
    if dry_run {
        parts.push(format!("{} planned", tally.planned).cyan().to_string());
    } else {
        parts.push(format!("{} created", tally.created).green().to_string());
        if tally.overwritten > 0 {
            parts.push(format!("{} overwritten", tally.overwritten).yellow().to_string());
        }
        parts.push(format!("{} unchanged", tally.unchanged));
    }
    if tally.skipped > 0 {
        parts.push(format!("{} skipped", tally.skipped).dimmed().to_string());
    }
    if tally.warnings > 0 {
        parts.push(format!("{} warnings", tally.warnings).yellow().to_string());
    }
    if tally.errors > 0 {
        parts.push(format!("{} errors", tally.errors).red().to_string());
    }
    parts.join(", ")
}

fn print_build_summary(summary: &BuildSummary) {
    for category in &summary.categories {
        println!("{}", category.category.dir_name().blue().bold());
        for item in &category.items {
            println!("  {}: {}", item.item_name, format_tally(&item.tally(), summary.dry_run));
        }
        for name in &category.not_found {
            println!("  {}: {}", name, "not found".yellow());
        }
    }

    println!(
        "Total: {}",
        format_tally(&summary.tally(), summary.dry_run)
    );
    if summary.dry_run {
        println!("{}", "Dry run - no changes were made".dimmed());
    } else {
        println!("{}", "✓ Linkfarm build complete!".bold().green());
    }
}

fn print_clean_summary(summary: &CleanSummary) {
    if summary.dangling.is_empty() {
        println!("{}", "✓ No dangling links found".green());
        return;
    }

    println!(
        "{}",
        format!("Found {} dangling links", summary.dangling.len()).yellow()
    );

    if summary.dry_run {
        println!("{}", "Dry run - would remove:".dimmed());
        for link in &summary.dangling {
            println!("  {}", format!("- {}", link.display()).red());
        }
        return;
    }

    let tally = summary.removal.tally();
    for failure in summary.removal.failures() {
        println!(
            "  {} {}: {}",
            "✗".red(),
            failure.path.display(),
            failure.outcome
        );
    }
    println!(
        "{}",
        format!("✓ Removed {} dangling links", tally.removed).green()
    );
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
