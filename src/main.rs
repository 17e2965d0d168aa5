mod client;
mod commands;
mod render;
mod utils;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use owo_colors::OwoColorize;
use thws_scheduler_core::ScheduleError;
use thws_scheduler_core::config::AppConfig;
use thws_scheduler_core::export::ExportFormat;
use thws_scheduler_core::request::RequestConfiguration;
use tracing_subscriber::EnvFilter;

use commands::fetch::FetchArgs;

#[derive(Parser)]
#[command(name = "thws-scheduler")]
#[command(about = "Fetch THWS lecture schedules and export them as JSON, CSV or ICS")]
struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Use this config file instead of ~/.config/thws-scheduler/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the schedule API
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Remove the stored session
    Logout,
    /// Show the current semester and the selectable programs
    Info {
        /// Only show this program (e.g. "INF")
        #[arg(short, long)]
        program: Option<String>,
    },
    /// Fetch the schedule for one or more plans
    Fetch {
        /// PROGRAM:SEMESTER[:GROUP]:MODULE,MODULE (repeatable)
        #[arg(long = "plan", value_name = "SPEC")]
        plans: Vec<RequestConfiguration>,

        /// TOML file with [[plan]] tables
        #[arg(long = "plans", value_name = "FILE")]
        plan_file: Option<PathBuf>,

        /// Also show the result as a calendar agenda
        #[arg(long)]
        calendar: bool,

        /// Write the result as json, csv and/or ics
        #[arg(short, long, value_delimiter = ',', value_name = "FMT")]
        export: Vec<ExportFormat>,

        /// Output directory for exports
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Show a .csv or .json schedule file and optionally convert it
    Import {
        file: PathBuf,

        #[arg(short, long, value_delimiter = ',', value_name = "FMT")]
        export: Vec<ExportFormat>,

        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            if let Some(err) = e.downcast_ref::<ScheduleError>()
                && err.is_retryable()
            {
                eprintln!("{}", "The request can be retried.".dimmed());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        Commands::Login { username } => commands::login::run(&config, username).await,
        Commands::Logout => commands::logout::run(),
        Commands::Info { program } => commands::info::run(&config, program).await,
        Commands::Fetch {
            plans,
            plan_file,
            calendar,
            export,
            out,
        } => {
            let args = FetchArgs {
                plans,
                plan_file,
                calendar,
                export,
                out,
            };
            commands::fetch::run(&config, args).await
        }
        Commands::Import { file, export, out } => {
            commands::import::run(&config, &file, &export, out)
        }
    }
}
