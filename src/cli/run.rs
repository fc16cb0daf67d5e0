use dialoguer::{theme::ColorfulTheme, Select};

use crate::{
    cli::cli::MenuAction,
    models::{CliApp, Result},
};
use tracing::error;

impl CliApp {
    pub async fn run(&self) -> Result<()> {
        println!("\n🚀 Welcome to Registry Scraper!");
        println!("═══════════════════════════════════════");

        loop {
            let actions = vec![
                MenuAction::RunCrawler,
                MenuAction::RunEntityResolution,
                MenuAction::ViewGraphInBrowser,
                MenuAction::Exit,
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("\nSelect an action")
                .default(0)
                .items(&actions)
                .interact()?;

            match &actions[selection] {
                MenuAction::RunCrawler => {
                    if let Err(e) = self.run_crawler().await {
                        error!("Crawler failed: {}", e);
                    }
                }
                MenuAction::RunEntityResolution => {
                    if let Err(e) = self.run_entity_resolution().await {
                        error!("Entity resolution failed: {}", e);
                    }
                }
                MenuAction::ViewGraphInBrowser => {
                    if let Err(e) = self.view_graph_in_browser().await {
                        error!("Failed to open graph: {}", e);
                    }
                }
                MenuAction::Exit => {
                    println!("\n👋 Thanks for using Registry Scraper!");
                    break;
                }
            }
        }

        Ok(())
    }
}
