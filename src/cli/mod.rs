// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod conditions;
pub mod demo;
pub mod porter;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Condition-based encryption demo
#[derive(Parser, Debug)]
#[command(name = "cbd-demo")]
#[command(version)]
#[command(about = "Compose access conditions, encrypt under them and decrypt through a node cohort", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full encrypt/decrypt round trip against an in-process cohort
    Demo(demo::DemoArgs),

    /// Build a condition and print its summary and wire JSON
    Preview(conditions::PreviewArgs),

    /// List condition kinds, methods, parameters and comparators
    Taxonomy,

    /// Ask a Porter instance for service nodes
    Ursulas(porter::UrsulasArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Demo(args) => demo::run_demo(args).await,
        Commands::Preview(args) => conditions::preview(args),
        Commands::Taxonomy => {
            conditions::print_taxonomy();
            Ok(())
        }
        Commands::Ursulas(args) => porter::list_ursulas(args).await,
    }
}
