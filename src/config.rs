use crate::error::AppError;
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_STORAGE_DIRECTORY: &str = "gallery_images";
pub const DEFAULT_INDEX_FILE: &str = "gallery_metadata.json";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub storage_directory: String,
    pub index_file: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, AppError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("storage_directory", DEFAULT_STORAGE_DIRECTORY)?
            .set_default("index_file", DEFAULT_INDEX_FILE)?
            .set_default("log_level", "info")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("GALLERY"))
            .build()?;

        Ok(s.try_deserialize()?)
    }

    /// Applies command line overrides on top of the layered sources.
    pub fn with_overrides(mut self, storage_directory: Option<String>, index_file: Option<String>) -> Self {
        if let Some(dir) = storage_directory {
            self.storage_directory = dir;
        }
        if let Some(file) = index_file {
            self.index_file = file;
        }
        self
    }
}
