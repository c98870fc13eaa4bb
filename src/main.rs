use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ising_sim::{BatchRunner, Settings, TableExporter, TerminalVisualizer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load(&cli.settings)
        .with_context(|| format!("could not load settings from {}", cli.settings.display()))?;
    if cli.seed.is_some() {
        settings.initial_conditions.seed = cli.seed;
    }
    if cli.visualize {
        settings.display.enable_visualization = true;
    }

    let exporter = TableExporter::new(&settings.data.saves_folder, &settings.data.filename_pattern);
    exporter
        .prepare_output()
        .context("filesave location is invalid")?;
    let folder = exporter.folder().to_path_buf();

    let visualizer = settings
        .display
        .enable_visualization
        .then(|| Arc::new(TerminalVisualizer::new()));

    let mut runner = BatchRunner::new(settings, Arc::new(exporter));
    if let Some(viz) = &visualizer {
        runner = runner.with_visualizer(viz.clone());
    }

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(runner.total_steps())
    };
    pb.set_style(
        ProgressStyle::with_template(
            "{msg} [{bar:40}] {pos}/{len} [{elapsed_precise} < {eta_precise}, {per_sec}]",
        )?
        .progress_chars("=> "),
    );
    pb.set_message("macro-steps");

    let summary = runner.run(&|| pb.inc(1))?;
    pb.finish_and_clear();

    if let Some(viz) = &visualizer {
        viz.join();
    }

    if summary.export_failures() > 0 {
        warn!(
            failed = summary.export_failures(),
            folder = %folder.display(),
            "some runs could not be saved"
        );
    } else {
        info!(runs = summary.completed(), folder = %folder.display(), "all results saved");
    }
    Ok(())
}
