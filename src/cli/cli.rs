use chrono::Local;

use crate::config::Config;
use crate::models::CliApp;

#[derive(Debug, Clone)]
pub enum MenuAction {
    RunCrawler,
    RunEntityResolution,
    ViewGraphInBrowser,
    Exit,
}

impl std::fmt::Display for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuAction::RunCrawler => {
                write!(f, "🕷️  Crawl the registry for active companies")
            }
            MenuAction::RunEntityResolution => {
                write!(f, "🔗 Entity resolution: build the relationship graph")
            }
            MenuAction::ViewGraphInBrowser => write!(f, "🌐 View graph in browser"),
            MenuAction::Exit => write!(f, "🚪 Exit"),
        }
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

impl CliApp {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Dated output directory, so repeated runs never clobber each other.
    pub(crate) fn default_output_dir(&self) -> String {
        format!("{}/{}", self.config.output.data_dir, today())
    }

    pub(crate) fn default_feed_path(&self) -> String {
        format!(
            "{}/{}_{}.{}",
            self.default_output_dir(),
            self.config.output.file_name,
            self.config.crawler.default_search_term,
            self.config.output.file_format
        )
    }

    pub(crate) fn default_plot_path(&self) -> String {
        format!(
            "{}/{}/{}_{}.{}",
            self.config.entity_resolution.plot_dir,
            today(),
            self.config.output.file_name,
            self.config.crawler.default_search_term,
            self.config.entity_resolution.plot_format
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_are_dated_and_parameterized() {
        let app = CliApp::new(Config::default());
        let date = today();

        assert_eq!(app.default_output_dir(), format!("tmp/data/{date}"));
        assert_eq!(
            app.default_feed_path(),
            format!("tmp/data/{date}/active_companies_X.csv")
        );
        assert_eq!(
            app.default_plot_path(),
            format!("tmp/plot/{date}/active_companies_X.html")
        );
    }
}
