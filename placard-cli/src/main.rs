// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Placard CLI
//!
//! Command-line client for the Placard publisher API: session opens,
//! placement content, click-through links and signature checks.

mod commands;
mod config;
mod display;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "placard")]
#[command(version, about = "Placard publisher API client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory (default: platform data dir + /placard)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Publisher API host
    #[arg(
        long,
        global = true,
        env = "PLACARD_API_URL",
        default_value = "https://api.placard.app"
    )]
    api_url: String,

    /// Publisher token
    #[arg(long, global = true, env = "PLACARD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Publisher secret
    #[arg(long, global = true, env = "PLACARD_SECRET", hide_env_values = true)]
    secret: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report a session open and precache listed resources
    Open {
        /// Do not download the precache list
        #[arg(long)]
        skip_precache: bool,
    },

    /// Request content for a placement
    Content {
        /// Placement identifier
        placement: String,

        /// Stop after preloading
        #[arg(long)]
        preload_only: bool,
    },

    /// Follow a click-through URL to its destination
    Click {
        /// Click URL
        url: String,

        /// Hand the final URL to the system instead of only printing it
        #[arg(long)]
        launch: bool,
    },

    /// Print a signed request URL
    Sign {
        /// Endpoint slug (e.g. /v3/publisher/content/)
        endpoint: String,

        /// Extra parameters as key=value
        params: Vec<String>,

        /// Print the signed parameters as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify reward or purchase signatures
    #[command(subcommand)]
    Verify(VerifyCommands),

    /// Inspect persisted session totals
    #[command(subcommand)]
    Session(SessionCommands),
}

#[derive(Subcommand)]
enum VerifyCommands {
    /// Verify a reward signature
    Reward {
        reward: String,
        quantity: String,
        receipt: String,
        signature: String,
    },

    /// Verify a purchase signature
    Purchase {
        product: String,
        name: String,
        quantity: String,
        receipt: String,
        signature: String,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Show total foreground time and session count
    Show,

    /// Clear the persisted totals
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Resolve data directory
    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("placard")
    });

    let config = CliConfig {
        data_dir,
        api_url: cli.api_url,
        token: cli.token,
        secret: cli.secret,
    };

    let result = match cli.command {
        Commands::Open { skip_precache } => commands::open::run(&config, skip_precache).await,
        Commands::Content {
            placement,
            preload_only,
        } => commands::content::run(&config, &placement, preload_only).await,
        Commands::Click { url, launch } => commands::click::run(&config, &url, launch).await,
        Commands::Sign {
            endpoint,
            params,
            json,
        } => commands::sign::run(&config, &endpoint, &params, json),
        Commands::Verify(cmd) => match cmd {
            VerifyCommands::Reward {
                reward,
                quantity,
                receipt,
                signature,
            } => commands::verify::reward(&config, &reward, &quantity, &receipt, &signature),
            VerifyCommands::Purchase {
                product,
                name,
                quantity,
                receipt,
                signature,
            } => commands::verify::purchase(
                &config, &product, &name, &quantity, &receipt, &signature,
            ),
        },
        Commands::Session(cmd) => match cmd {
            SessionCommands::Show => commands::session::show(&config),
            SessionCommands::Reset => commands::session::reset(&config),
        },
    };

    if let Err(e) = result {
        display::error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
