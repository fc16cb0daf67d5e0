// src/cli/view_graph.rs
use dialoguer::{theme::ColorfulTheme, Input};
use std::path::Path;

use crate::models::{CliApp, Result};

impl CliApp {
    pub async fn view_graph_in_browser(&self) -> Result<()> {
        let plot_path: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Plot to open")
            .default(self.default_plot_path())
            .interact_text()?;

        if !Path::new(&plot_path).exists() {
            println!("❌ No plot found at {}", plot_path);
            println!("💡 Run entity resolution first to generate one.");
            return Ok(());
        }

        // Try to open the plot in the default browser
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd")
            .args(["/C", "start", plot_path.as_str()])
            .spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&plot_path).spawn();
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&plot_path).spawn();

        println!("🌐 Opened {} in your browser", plot_path);
        Ok(())
    }
}
