use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use keyreplay::backend::{InjectionBackend, RecordingBackend};
use keyreplay::cli::{CliArgs, RunMode, RunPlan};
use keyreplay::sequence::load_sequence;
use keyreplay::{CancelToken, ReplayConfig, ReplaySession, SessionState};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = CliArgs::parse();
    keyreplay::tracing::init(args.verbose);

    let config = ReplayConfig::load();

    if args.init_config {
        let path = args
            .effective_config(&config)
            .save()
            .map_err(anyhow::Error::msg)?;
        println!("Wrote {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let plan = args.into_plan(&config, &cwd).map_err(anyhow::Error::msg)?;

    match plan.mode {
        RunMode::Check => check(&plan),
        RunMode::Replay => replay(plan),
    }
}

/// Parse and validate only
fn check(plan: &RunPlan) -> Result<ExitCode> {
    let parsed = load_sequence(&plan.sequence)
        .with_context(|| format!("Invalid sequence file {}", plan.sequence.display()))?;

    let planned = parsed.sequence.planned_duration();
    if plan.json {
        let summary = serde_json::json!({
            "source": plan.sequence,
            "events": parsed.sequence.len(),
            "warnings": parsed.warnings,
            "planned_ms": planned.as_millis() as u64,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{}: {} events, {} warning(s), planned duration {:.2}s",
            plan.sequence.display(),
            parsed.sequence.len(),
            parsed.warnings.len(),
            planned.as_secs_f64()
        );
        for warning in &parsed.warnings {
            println!("  skipped {}", warning);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn replay(plan: RunPlan) -> Result<ExitCode> {
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || cancel.cancel()).context("Failed to set Ctrl+C handler")?;
    }

    let mut session = ReplaySession::new(plan.options.clone(), cancel);
    // A load error still ends in a Failed report below
    let _ = session.load_file(&plan.sequence);

    // Nothing is sent in measurement-only mode, and a failed load never runs
    let backend = if plan.options.measurement_only || session.state() == SessionState::Failed {
        Box::new(RecordingBackend::new()) as Box<dyn InjectionBackend>
    } else {
        os_backend(&plan.sequence)?
    };

    if !plan.options.measurement_only
        && plan.options.pre_roll.is_none()
        && session.state() == SessionState::Loaded
    {
        tracing::warn!("Replaying immediately; use --wait-focus to get time to focus a window");
    }

    let report = session.run_with_progress(backend, |progress| {
        if !plan.json {
            eprintln!(
                "[{:>3.0}%] {}/{} events",
                progress.percent(),
                progress.processed,
                progress.total
            );
        }
    });

    if plan.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(ExitCode::from(report.exit_code() as u8))
}

#[cfg(feature = "os-inject")]
fn os_backend(_sequence: &Path) -> Result<Box<dyn InjectionBackend>> {
    let backend = keyreplay::backend::EnigoBackend::new()
        .context("Failed to initialize key injection")?;
    Ok(Box::new(backend))
}

#[cfg(not(feature = "os-inject"))]
fn os_backend(sequence: &Path) -> Result<Box<dyn InjectionBackend>> {
    anyhow::bail!(
        "This build cannot inject key events (built without the `os-inject` feature); \
         run `keyreplay --simulate {}` to measure timing instead",
        sequence.display()
    )
}
