use anyhow::Result;
use owo_colors::OwoColorize;
use thws_scheduler_core::config::Session;

pub fn run() -> Result<()> {
    let name = Session::load()?.map(|s| s.display_name().to_string());

    if Session::clear()? {
        println!("{} Logged out {}", "✓".green(), name.unwrap_or_default().bold());
    } else {
        println!("{}", "Not logged in".dimmed());
    }

    Ok(())
}
