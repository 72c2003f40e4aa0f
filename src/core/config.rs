use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::project::chunker::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::project::index::DEFAULT_ALLOWED_EXTENSIONS;
use crate::project::retriever::{DEFAULT_CHAR_BUDGET, DEFAULT_FALLBACK_BLOCKS};
use crate::project::symbols::DEFAULT_FILE_SCOPE_LIMIT;
use crate::project::{IndexOptions, Retriever, ScoreWeights};

pub const DEFAULT_API_URL: &str = "http://localhost:11434/api/chat";
pub const DEFAULT_MODEL: &str = "deepseek-coder:6.7b";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat endpoint of the model server.
    pub api_url: String,
    pub model: String,
    /// Persona key or number; prompts at startup when unset.
    pub persona: Option<String>,
    /// History length at which the context bar reads 100%.
    pub max_context_messages: usize,
    /// Delay between characters when printing prose.
    pub typing_delay_ms: u64,
    pub request_timeout_secs: u64,
    /// Directory for daily transcript files.
    pub log_dir: Option<PathBuf>,
    /// Maximum characters sent by `/file`.
    pub file_char_limit: usize,
    pub project: ProjectSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            persona: None,
            max_context_messages: 100,
            typing_delay_ms: 5,
            request_timeout_secs: 20,
            log_dir: None,
            file_char_limit: 15000,
            project: ProjectSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub allowed_extensions: Vec<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub file_scope_limit: usize,
    pub char_budget: usize,
    pub fallback_blocks: usize,
    pub weights: WeightSettings,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            file_scope_limit: DEFAULT_FILE_SCOPE_LIMIT,
            char_budget: DEFAULT_CHAR_BUDGET,
            fallback_blocks: DEFAULT_FALLBACK_BLOCKS,
            weights: WeightSettings::default(),
        }
    }
}

impl ProjectSettings {
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            allowed_extensions: self.allowed_extensions.clone(),
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            file_scope_limit: self.file_scope_limit,
        }
    }

    pub fn retriever(&self) -> Retriever {
        Retriever {
            weights: self.weights.into(),
            char_budget: self.char_budget,
            fallback_blocks: self.fallback_blocks,
        }
    }
}

/// Scoring weights as they appear in `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightSettings {
    pub token: u64,
    pub name: u64,
    pub raise: u64,
    pub traceback_file: u64,
}

impl Default for WeightSettings {
    fn default() -> Self {
        let weights = ScoreWeights::default();
        Self {
            token: weights.token,
            name: weights.name,
            raise: weights.raise,
            traceback_file: weights.traceback_file,
        }
    }
}

impl From<WeightSettings> for ScoreWeights {
    fn from(settings: WeightSettings) -> Self {
        ScoreWeights {
            token: settings.token,
            name: settings.name,
            raise: settings.raise,
            traceback_file: settings.traceback_file,
        }
    }
}

impl Config {
    /// Load from the platform config directory; defaults when absent.
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        match Self::default_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Where transcripts go: the configured directory, else the platform
    /// data directory.
    pub fn resolved_log_dir(&self) -> Option<PathBuf> {
        self.log_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join("logs")))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "ferret", "ferret")
}
