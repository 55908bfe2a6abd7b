use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const WIKIDYN_DIR_NAME: &str = ".wikidyn";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_PAGEVIEW_ENDPOINT: &str = "http://stats.grok.se/json/";
pub const DEFAULT_DUMP_BASE_URL: &str = "http://dumps.wikimedia.org/other/pagecounts-raw/";
pub const DEFAULT_DATA_DIR: &str = "./Data/";
pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const LIVING_PEOPLE_CATEGORY: &str = "Category:Living people";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WikidynConfig {
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub pageviews: PageviewConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default = "default_language")]
    pub language: String,
    /// Lower bound for full-history revision queries.
    #[serde(default = "default_epoch_start")]
    pub epoch_start: NaiveDate,
    #[serde(default = "default_talk_prefixes")]
    pub talk_prefixes: BTreeMap<String, String>,
    #[serde(default = "default_excluded_categories")]
    pub excluded_categories: Vec<String>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            epoch_start: default_epoch_start(),
            talk_prefixes: default_talk_prefixes(),
            excluded_categories: default_excluded_categories(),
        }
    }
}

impl CollectionConfig {
    pub fn talk_prefix(&self, language: &str) -> Option<&str> {
        self.talk_prefixes.get(language).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageviewConfig {
    #[serde(default = "default_pageview_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_dump_base_url")]
    pub dump_base_url: String,
    /// Earliest day covered by the raw pagecount dumps.
    #[serde(default = "default_dump_floor")]
    pub dump_floor: NaiveDate,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for PageviewConfig {
    fn default() -> Self {
        Self {
            endpoint: default_pageview_endpoint(),
            dump_base_url: default_dump_base_url(),
            dump_floor: default_dump_floor(),
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("failed to serialize config TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub fn wikidyn_dir(workspace_root: impl AsRef<Path>) -> PathBuf {
    workspace_root.as_ref().join(WIKIDYN_DIR_NAME)
}

pub fn config_path(workspace_root: impl AsRef<Path>) -> PathBuf {
    wikidyn_dir(workspace_root).join(CONFIG_FILE_NAME)
}

pub fn load_workspace_config(
    workspace_root: impl AsRef<Path>,
) -> Result<WikidynConfig, ConfigError> {
    let path = config_path(workspace_root);
    if !path.exists() {
        return Ok(WikidynConfig::default());
    }

    let raw = fs::read_to_string(path)?;
    let parsed: WikidynConfig = toml::from_str(&raw)?;
    Ok(normalize_config(parsed))
}

pub fn ensure_workspace_config(
    workspace_root: impl AsRef<Path>,
) -> Result<WikidynConfig, ConfigError> {
    let workspace_root = workspace_root.as_ref();
    fs::create_dir_all(wikidyn_dir(workspace_root))?;

    let path = config_path(workspace_root);
    if path.exists() {
        return load_workspace_config(workspace_root);
    }

    let config = WikidynConfig::default();
    let content = toml::to_string_pretty(&config)?;
    fs::write(path, content)?;

    Ok(config)
}

pub fn validate_config(config: &WikidynConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let collection = &config.collection;

    if collection.talk_prefix(&collection.language).is_none() {
        warnings.push(ConfigWarning {
            code: "missing_talk_prefix",
            message: format!(
                "no talk prefix configured for language '{}'; talk activity will be empty",
                collection.language
            ),
        });
    }

    if collection.epoch_start > Utc::now().date_naive() {
        warnings.push(ConfigWarning {
            code: "epoch_in_future",
            message: format!(
                "collection.epoch_start {} is in the future; revision queries will be empty",
                collection.epoch_start
            ),
        });
    }

    if !config.pageviews.endpoint.ends_with('/') {
        warnings.push(ConfigWarning {
            code: "endpoint_without_slash",
            message: format!(
                "pageviews.endpoint '{}' does not end with '/'; request paths are appended verbatim",
                config.pageviews.endpoint
            ),
        });
    }

    warnings
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_owned()
}

fn default_epoch_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2001, 1, 1).unwrap_or_default()
}

fn default_talk_prefixes() -> BTreeMap<String, String> {
    [("en", "Talk:"), ("pt", "Discussão:"), ("es", "Discusión:")]
        .into_iter()
        .map(|(lang, prefix)| (lang.to_owned(), prefix.to_owned()))
        .collect()
}

fn default_excluded_categories() -> Vec<String> {
    vec![LIVING_PEOPLE_CATEGORY.to_owned()]
}

fn default_pageview_endpoint() -> String {
    DEFAULT_PAGEVIEW_ENDPOINT.to_owned()
}

fn default_dump_base_url() -> String {
    DEFAULT_DUMP_BASE_URL.to_owned()
}

fn default_dump_floor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2007, 12, 10).unwrap_or_default()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn normalize_required(input: &str, fallback: fn() -> String) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        fallback()
    } else {
        trimmed.to_owned()
    }
}

fn normalize_config(mut config: WikidynConfig) -> WikidynConfig {
    config.collection.language =
        normalize_required(&config.collection.language, default_language).to_ascii_lowercase();
    config.collection.talk_prefixes = config
        .collection
        .talk_prefixes
        .into_iter()
        .map(|(lang, prefix)| (lang.trim().to_ascii_lowercase(), prefix.trim().to_owned()))
        .filter(|(lang, prefix)| !lang.is_empty() && !prefix.is_empty())
        .collect();
    config.collection.excluded_categories = config
        .collection
        .excluded_categories
        .into_iter()
        .map(|category| category.trim().to_owned())
        .filter(|category| !category.is_empty())
        .collect();

    config.pageviews.endpoint =
        normalize_required(&config.pageviews.endpoint, default_pageview_endpoint);
    config.pageviews.dump_base_url =
        normalize_required(&config.pageviews.dump_base_url, default_dump_base_url);
    if config.pageviews.data_dir.as_os_str().is_empty() {
        config.pageviews.data_dir = default_data_dir();
    }
    if config.output.dir.as_os_str().is_empty() {
        config.output.dir = default_output_dir();
    }

    config
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn ensure_workspace_config_creates_default_file() {
        let temp = tempdir().expect("tempdir");
        let workspace = temp.path();

        let config = ensure_workspace_config(workspace).expect("ensure config");

        assert_eq!(config.collection.language, DEFAULT_LANGUAGE);
        assert_eq!(
            config.collection.epoch_start,
            NaiveDate::from_ymd_opt(2001, 1, 1).expect("date")
        );
        assert!(config_path(workspace).exists());

        let content = fs::read_to_string(config_path(workspace)).expect("read config file");
        assert!(content.contains("[collection]"));
        assert!(content.contains("language = \"en\""));
        assert!(content.contains("epoch_start = \"2001-01-01\""));
    }

    #[test]
    fn load_workspace_config_parses_section_values() {
        let temp = tempdir().expect("tempdir");
        let workspace = temp.path();
        fs::create_dir_all(wikidyn_dir(workspace)).expect("create .wikidyn");

        let raw = r#"
[collection]
language = " PT "
epoch_start = "2004-06-01"
excluded_categories = ["Category:Stubs", "  "]

[collection.talk_prefixes]
pt = "Discussão:"

[pageviews]
endpoint = "http://127.0.0.1:8080/json/"
dump_floor = "2008-01-01"
data_dir = "/tmp/dumps"

[output]
dir = "frames"
"#;
        fs::write(config_path(workspace), raw).expect("write config");

        let config = load_workspace_config(workspace).expect("load config");

        assert_eq!(config.collection.language, "pt");
        assert_eq!(
            config.collection.epoch_start,
            NaiveDate::from_ymd_opt(2004, 6, 1).expect("date")
        );
        assert_eq!(config.collection.talk_prefix("pt"), Some("Discussão:"));
        assert_eq!(config.collection.talk_prefix("en"), None);
        assert_eq!(
            config.collection.excluded_categories,
            vec!["Category:Stubs".to_owned()]
        );
        assert_eq!(config.pageviews.endpoint, "http://127.0.0.1:8080/json/");
        assert_eq!(config.pageviews.dump_base_url, DEFAULT_DUMP_BASE_URL);
        assert_eq!(config.pageviews.data_dir, PathBuf::from("/tmp/dumps"));
        assert_eq!(config.output.dir, PathBuf::from("frames"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().expect("tempdir");
        let config = load_workspace_config(temp.path()).expect("load config");
        assert_eq!(config, WikidynConfig::default());
        assert_eq!(config.collection.talk_prefix("es"), Some("Discusión:"));
        assert_eq!(
            config.collection.excluded_categories,
            vec![LIVING_PEOPLE_CATEGORY.to_owned()]
        );
    }

    #[test]
    fn validate_config_flags_missing_talk_prefix() {
        let mut config = WikidynConfig::default();
        assert!(validate_config(&config).is_empty());

        config.collection.language = "de".to_owned();
        let warnings = validate_config(&config);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "missing_talk_prefix");
    }
}
