//! INI file configuration adapter.

use crate::domain::error::TradebenchError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::{Path, PathBuf};

pub struct FileConfigAdapter {
    config: Ini,
    base_dir: PathBuf,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TradebenchError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| TradebenchError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self { config, base_dir })
    }

    pub fn from_string(content: &str) -> Result<Self, TradebenchError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TradebenchError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self {
            config,
            base_dir: PathBuf::new(),
        })
    }

    /// Directory relative paths in the file are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Required string value; a missing or blank key is `ConfigMissing`.
    pub fn require(&self, section: &str, key: &str) -> Result<String, TradebenchError> {
        self.get_string(section, key)
            .ok_or_else(|| TradebenchError::ConfigMissing {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

/// Drop a trailing `; comment` or `# comment` preceded by whitespace.
fn strip_inline_comment(value: &str) -> &str {
    let cut = value
        .char_indices()
        .find(|&(i, c)| {
            (c == ';' || c == '#')
                && value[..i].ends_with(|p: char| p.is_whitespace())
        })
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..cut].trim()
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| strip_inline_comment(&v).to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_string(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }

    fn keys(&self, section: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .config
            .get_map_ref()
            .get(&section.to_lowercase())
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}
