use anyhow::Result;
use thws_scheduler_core::config::{AppConfig, Session};
use thws_scheduler_core::state::AppState;

use crate::client::ApiClient;
use crate::render::Render;
use crate::utils::tui;

/// Show the semester info and the programs that can be selected.
pub async fn run(config: &AppConfig, program: Option<String>) -> Result<()> {
    let state = AppState::new(Session::load()?, config.failure_policy());
    let session = state.require_session()?;

    let client =
        ApiClient::new(&config.api_base_url, config.request_timeout())?.with_token(&session.token);

    let spinner = tui::create_spinner("Loading course metadata".to_string());
    let result = client.metadata().await;
    spinner.finish_and_clear();
    let snapshot = result?;

    match program {
        Some(name) => match snapshot.program(&name) {
            Some(program) => println!("{}", program.render()),
            None => {
                let available: Vec<&str> =
                    snapshot.programs.iter().map(|p| p.name.as_str()).collect();
                anyhow::bail!(
                    "Program '{}' not found. Available: {}",
                    name,
                    available.join(", ")
                );
            }
        },
        None => println!("{}", snapshot.render()),
    }

    Ok(())
}
