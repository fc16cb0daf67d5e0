use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::entity_resolution::graph::build_graph;
use crate::entity_resolution::preparer::load_prepared_records;
use crate::entity_resolution::renderer::render_network;
use crate::models::Result;

/// Numbers reported back to the CLI after an ER run.
#[derive(Debug, Clone)]
pub struct ErSummary {
    pub total_rows: usize,
    pub resolved_rows: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub same_address_edges: usize,
    pub component_count: usize,
    pub plot_path: PathBuf,
    pub publish_path: PathBuf,
}

/// One entity-resolution run: load the feed, build the graph, render the
/// plot, write it to the requested path and to the fixed publishing path.
pub struct EntityResolutionRunner {
    in_file_path: String,
    out_plot_path: PathBuf,
    publish_path: PathBuf,
}

impl EntityResolutionRunner {
    pub fn new(in_file_path: &str, out_plot_path: &str, publish_path: &str) -> Self {
        Self {
            in_file_path: in_file_path.to_string(),
            out_plot_path: PathBuf::from(out_plot_path),
            publish_path: PathBuf::from(publish_path),
        }
    }

    pub fn run_er(&self) -> Result<ErSummary> {
        info!("🔗 Running ER pipeline...");

        let prepared = load_prepared_records(&self.in_file_path)?;
        let entity_graph = build_graph(&prepared.records);
        let rendered = render_network(&entity_graph)?;

        write_html(&self.out_plot_path, &rendered.html)?;
        write_html(&self.publish_path, &rendered.html)?;
        info!(
            "💾 Graph written to {} and published to {}",
            self.out_plot_path.display(),
            self.publish_path.display()
        );
        info!("Done...");

        Ok(ErSummary {
            total_rows: prepared.total_rows,
            resolved_rows: prepared.records.len(),
            node_count: entity_graph.graph().node_count(),
            edge_count: entity_graph.graph().edge_count(),
            same_address_edges: entity_graph.same_address_edge_count(),
            component_count: rendered.component_count,
            plot_path: self.out_plot_path.clone(),
            publish_path: self.publish_path.clone(),
        })
    }
}

fn write_html(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, html)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_the_full_pipeline_and_writes_both_copies() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("feed.csv");
        std::fs::write(
            &input,
            "company_id,company_name,owner_name,registered_agent,commercial_registered_agent,principal_address\n\
             1,Acme LLC,Jane Doe,,,1 Main St\n\
             2,Beta Inc,,,Corp Agents LLC,1 Main St\n\
             3,Gamma Co,,,,\n",
        )
        .unwrap();

        let plot = dir.path().join("plot/graph.html");
        let publish = dir.path().join("docs/index.html");
        let runner = EntityResolutionRunner::new(
            input.to_str().unwrap(),
            plot.to_str().unwrap(),
            publish.to_str().unwrap(),
        );

        let summary = runner.run_er().unwrap();
        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.resolved_rows, 2);
        // Jane Doe, Acme LLC, Corp Agents LLC, Beta Inc.
        assert_eq!(summary.node_count, 4);
        assert_eq!(summary.same_address_edges, 1);
        assert_eq!(summary.component_count, 1);

        let written = std::fs::read_to_string(&plot).unwrap();
        let published = std::fs::read_to_string(&publish).unwrap();
        assert_eq!(written, published);
        assert!(written.contains("vis.Network"));
    }

    #[test]
    fn missing_input_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let runner = EntityResolutionRunner::new(
            dir.path().join("absent.csv").to_str().unwrap(),
            dir.path().join("plot.html").to_str().unwrap(),
            dir.path().join("index.html").to_str().unwrap(),
        );
        assert!(runner.run_er().is_err());
    }
}
