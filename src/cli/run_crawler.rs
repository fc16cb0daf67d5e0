// src/cli/run_crawler.rs
use dialoguer::{theme::ColorfulTheme, Input};
use std::path::Path;
use tracing::info;

use crate::models::{CliApp, Result};
use crate::registry_crawler::{feed, FeedFormat, RegistryCrawler};

impl CliApp {
    pub async fn run_crawler(&self) -> Result<()> {
        println!("\n🕷️  Registry Crawler");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let search_param: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Search for active companies starting with")
            .default(self.config.crawler.default_search_term.clone())
            .interact_text()?;

        let output_dir: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Output directory")
            .default(self.default_output_dir())
            .interact_text()?;

        let file_name: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Output file name")
            .default(self.config.output.file_name.clone())
            .interact_text()?;

        let file_format: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Output format (csv or json)")
            .default(self.config.output.file_format.clone())
            .interact_text()?;
        let format = FeedFormat::parse(&file_format)?;

        let feed_path = feed::feed_path(&output_dir, &file_name, &search_param, format);
        let mut feed = feed::open_feed(&feed_path, format)?;

        let crawler = RegistryCrawler::new(self.config.crawler.clone(), &self.config.retry)?;
        let outcome = match crawler.run(&search_param, feed.as_mut()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Close the feed so the partial crawl is still readable.
                let _ = feed.finish().await;
                return Err(e);
            }
        };
        feed.finish().await?;

        if let Some(latest) = &self.config.output.latest_feed_path {
            let latest = Path::new(latest);
            if let Some(parent) = latest.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::copy(&feed_path, latest)?;
            info!("📎 Feed copied to {}", latest.display());
        }

        println!("\n🎉 Crawl Complete!");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("  🏢 Companies matched: {}", outcome.companies_matched);
        println!("  📋 Records scraped: {}", outcome.records_scraped);
        println!("  ⚠️  Branches dropped: {}", outcome.branches_dropped);
        println!("  ⏱️  Duration: {}ms", outcome.duration_ms);
        println!("  💾 Feed: {}", feed_path.display());

        Ok(())
    }
}
