// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Notenband: turn a horizontally scrolling score, delivered as numbered page
// images, into a paginated PDF with whole measures per line.

mod cli;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use notenband_core::NotenbandConfig;
use notenband_core::error::Result;

use crate::cli::Cli;
use crate::pipeline::Outputs;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.options.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("Notenband starting");

    match execute(cli).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "run failed");
            eprintln!("notenband: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<PathBuf> {
    let mut config = match &cli.options.config {
        Some(path) => NotenbandConfig::load(path)?,
        None => NotenbandConfig::default(),
    };
    cli.options.apply(&mut config);

    let outputs = Outputs {
        pdf: cli.options.output.clone(),
        canvas_dump: cli.options.dump_canvas.clone(),
        overlay_dump: cli.options.dump_overlay.clone(),
    };
    pipeline::run(cli.command.input(), config, outputs).await
}
