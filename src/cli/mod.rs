//! CLI module for CityPulse
//!
//! Provides commands:
//! - `cities`: list the city catalog
//! - `activate`: run the activation pipeline for a city
//! - `costs`: show the cost breakdown
//! - `stream`: show or follow the live stream
//! - `scenarios`: manage and run agent scenarios

use clap::{Parser, Subcommand};

pub mod activate;
pub mod cities;
pub mod costs;
pub mod scenarios;
pub mod stream;

use crate::app::App;
use crate::settings::load_config;

/// CityPulse dashboard CLI
#[derive(Parser, Debug)]
#[command(name = "citypulse")]
#[command(about = "City operations dashboard: activation, live stream, scenarios")]
#[command(version)]
pub struct Cli {
    /// Backend URL (overrides config and CITYPULSE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the cities that can be activated
    Cities,
    /// Activate a city: select, process zones, process EIA
    Activate {
        /// City identifier (e.g. nyc)
        city_id: String,
        /// Do not remember the city as active afterwards
        #[arg(long)]
        no_persist: bool,
    },
    /// Show the cost breakdown
    Costs {
        /// City to show (defaults to the active city)
        #[arg(long)]
        city: Option<String>,
    },
    /// Show the live stream
    Stream {
        /// Refresh once and exit instead of polling
        #[arg(long)]
        once: bool,
    },
    /// Manage agent test scenarios
    Scenarios {
        #[command(subcommand)]
        command: scenarios::ScenarioCommands,
    },
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let app = App::build(load_config()?, cli.api_url)?;
    match command {
        Commands::Cities => cities::run(&app).await,
        Commands::Activate {
            city_id,
            no_persist,
        } => activate::run(&app, &city_id, !no_persist).await,
        Commands::Costs { city } => costs::run(&app, city.as_deref()).await,
        Commands::Stream { once } => stream::run(&app, once).await,
        Commands::Scenarios { command } => scenarios::run(&app, command).await,
    }
}

/// Turn a core error into a printable anyhow error
pub(crate) fn report(error: citypulse_core::Error) -> anyhow::Error {
    anyhow::anyhow!(citypulse_core::format_error_for_cli(&error).trim_end().to_string())
}
