use anyhow::{Context, Result};
use dialoguer::Input;
use owo_colors::OwoColorize;
use thws_scheduler_core::config::AppConfig;

use crate::client::ApiClient;
use crate::utils::tui;

pub async fn run(config: &AppConfig, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => Input::<String>::new()
            .with_prompt("  Username")
            .interact_text()?,
    };

    let password =
        rpassword::prompt_password("  Password: ").context("Failed to read password")?;

    let client = ApiClient::new(&config.api_base_url, config.request_timeout())?;

    let spinner = tui::create_spinner("Logging in".to_string());
    let result = client.authenticate(&username, &password).await;
    spinner.finish_and_clear();

    let session = result?;
    session.save().context("Failed to store session")?;

    println!("{} Logged in as {}", "✓".green(), session.display_name().bold());
    Ok(())
}
