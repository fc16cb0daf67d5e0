// src/cli/run_entity_resolution.rs
use dialoguer::{theme::ColorfulTheme, Input};

use crate::entity_resolution::EntityResolutionRunner;
use crate::models::{CliApp, Result};

impl CliApp {
    pub async fn run_entity_resolution(&self) -> Result<()> {
        println!("\n🔗 Entity Resolution");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let in_file_path: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Input dataset (crawler CSV feed)")
            .default(self.default_feed_path())
            .interact_text()?;

        let out_plot_path: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Output plot path")
            .default(self.default_plot_path())
            .interact_text()?;

        let runner = EntityResolutionRunner::new(
            &in_file_path,
            &out_plot_path,
            &self.config.entity_resolution.publish_path,
        );
        let summary = runner.run_er()?;

        println!("\n🎉 Entity Resolution Complete!");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!(
            "  📊 Rows resolved: {} of {}",
            summary.resolved_rows, summary.total_rows
        );
        println!(
            "  🕸️  Graph: {} nodes, {} edges ({} same-address)",
            summary.node_count, summary.edge_count, summary.same_address_edges
        );
        println!("  🎨 Connected components: {}", summary.component_count);
        println!("  💾 Plot: {}", summary.plot_path.display());
        println!("  🌐 Published: {}", summary.publish_path.display());

        Ok(())
    }
}
