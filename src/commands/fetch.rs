use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use thws_scheduler_core::config::{AppConfig, Session};
use thws_scheduler_core::export::ExportFormat;
use thws_scheduler_core::normalize::build_result_set;
use thws_scheduler_core::request::{PlanFile, RequestConfiguration, compile_requests};
use thws_scheduler_core::state::AppState;

use super::{show_result, write_exports};
use crate::client::ApiClient;
use crate::utils::tui;

pub struct FetchArgs {
    pub plans: Vec<RequestConfiguration>,
    pub plan_file: Option<PathBuf>,
    pub calendar: bool,
    pub export: Vec<ExportFormat>,
    pub out: Option<PathBuf>,
}

pub async fn run(config: &AppConfig, args: FetchArgs) -> Result<()> {
    let tz = config.tz()?;

    let mut configs = args.plans;
    if let Some(path) = &args.plan_file {
        let file = PlanFile::load(path)
            .with_context(|| format!("Failed to read plan file {}", path.display()))?;
        configs.extend(file.plans);
    }

    if configs.is_empty() {
        anyhow::bail!(
            "No plans given.\n\n\
            Select one with:\n  \
            thws-scheduler fetch --plan PROGRAM:SEMESTER[:GROUP]:MODULE,MODULE\n\n\
            Run `thws-scheduler info` to list programs and modules."
        );
    }

    let mut state = AppState::new(Session::load()?, config.failure_policy());
    let token = state.require_session()?.token.clone();
    let client = ApiClient::new(&config.api_base_url, config.request_timeout())?.with_token(token);

    let spinner = tui::create_spinner("Loading course metadata".to_string());
    let metadata = client.metadata().await;
    spinner.finish_and_clear();
    state.set_metadata(metadata?);

    let Some(snapshot) = state.metadata() else {
        anyhow::bail!("Course metadata is not available");
    };
    // Fails before any schedule request when nothing resolves
    let requests = compile_requests(snapshot, &configs)?;

    for request in &requests {
        println!("{} {}", "→".dimmed(), request.label);
    }

    let ticket = state.begin_fetch();
    let spinner = tui::create_spinner(format!("Fetching {} plan(s)", requests.len()));
    let outcome = match client.schedule(&requests).await {
        Ok(raw) => build_result_set(&raw, tz),
        Err(e) => Err(e),
    };
    spinner.finish_and_clear();

    state.complete_fetch(ticket, outcome)?;
    println!();
    show_result(state.result(), args.calendar);

    let out = args.out.unwrap_or_else(|| config.output_dir());
    if !args.export.is_empty() {
        println!();
    }
    write_exports(state.result(), &args.export, &out)?;

    Ok(())
}
