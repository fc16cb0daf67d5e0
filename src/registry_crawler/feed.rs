use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::{CompanyRecord, Result};

/// Output format of the crawl feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Csv,
    Json,
}

impl FeedFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "csv" => Ok(FeedFormat::Csv),
            "json" => Ok(FeedFormat::Json),
            other => Err(format!("unsupported feed format '{}', expected csv or json", other).into()),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FeedFormat::Csv => "csv",
            FeedFormat::Json => "json",
        }
    }
}

/// Builds the feed path `{dir}/{file_name}_{search_param}.{ext}`.
pub fn feed_path(dir: &str, file_name: &str, search_param: &str, format: FeedFormat) -> PathBuf {
    Path::new(dir).join(format!(
        "{}_{}.{}",
        file_name,
        search_param,
        format.extension()
    ))
}

/// Incremental, single-writer sink for scraped records. Records are flushed
/// as they arrive so a partial crawl still leaves a readable feed behind.
#[async_trait::async_trait]
pub trait FeedExporter: Send {
    async fn write_record(&mut self, record: &CompanyRecord) -> Result<()>;
    async fn finish(&mut self) -> Result<()>;
    fn path(&self) -> &Path;
}

pub fn open_feed(path: &Path, format: FeedFormat) -> Result<Box<dyn FeedExporter>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    match format {
        FeedFormat::Csv => Ok(Box::new(CsvFeedExporter::create(path)?)),
        FeedFormat::Json => Ok(Box::new(JsonFeedExporter::create(path)?)),
    }
}

pub struct CsvFeedExporter {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvFeedExporter {
    pub fn create(path: &Path) -> Result<Self> {
        let writer = csv::Writer::from_path(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }
}

#[async_trait::async_trait]
impl FeedExporter for CsvFeedExporter {
    async fn write_record(&mut self, record: &CompanyRecord) -> Result<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// JSON array feed, one record per element.
pub struct JsonFeedExporter {
    path: PathBuf,
    file: File,
    written: usize,
}

impl JsonFeedExporter {
    pub fn create(path: &Path) -> Result<Self> {
        let mut file = File::create(path)?;
        file.write_all(b"[")?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            written: 0,
        })
    }
}

#[async_trait::async_trait]
impl FeedExporter for JsonFeedExporter {
    async fn write_record(&mut self, record: &CompanyRecord) -> Result<()> {
        if self.written > 0 {
            self.file.write_all(b",\n")?;
        } else {
            self.file.write_all(b"\n")?;
        }
        let line = serde_json::to_string(record)?;
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        self.written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        self.file.write_all(b"\n]\n")?;
        self.file.flush()?;
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
