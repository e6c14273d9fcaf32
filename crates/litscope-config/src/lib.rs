//! Configuration loading for litscope.
//! Reads litscope.toml from the current directory or the path in the LITSCOPE_CONFIG env var.

use chrono::NaiveDate;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Env var naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "LITSCOPE_CONFIG";
/// Comma-separated Scopus API keys; takes precedence over `scopus.api_keys`.
pub const API_KEYS_ENV: &str = "LITSCOPE_SCOPUS_API_KEYS";

const DEFAULT_CONFIG_FILE: &str = "litscope.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}\nCopy litscope.example.toml to litscope.toml and edit it.")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scopus: ScopusConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub charts: ChartsConfig,
}

// ── Scopus ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScopusConfig {
    /// Access keys, rotated in order when the current one is rate limited.
    #[serde(default, deserialize_with = "deserialize_secrets")]
    pub api_keys: Vec<SecretString>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Detail level requested from the abstract retrieval API.
    #[serde(default = "default_view")]
    pub view: String,
    /// Subscribers page with cursors; everyone else is capped at 5000 results.
    #[serde(default)]
    pub subscriber: bool,
    /// Stop after this many EIDs; `None` fetches every result.
    pub max_entries: Option<usize>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url()     -> String { "https://api.elsevier.com".to_string() }
fn default_view()         -> String { "META".to_string() }
fn default_page_size()    -> usize  { 25 }
fn default_timeout_secs() -> u64    { 30 }

impl Default for ScopusConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            base_url: default_base_url(),
            view: default_view(),
            subscriber: false,
            max_entries: None,
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ScopusConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn deserialize_secrets<'de, D>(deserializer: D) -> Result<Vec<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(SecretString::from).collect())
}

/// Split a comma-separated key list, dropping blanks.
pub fn parse_key_list(raw: &str) -> Vec<SecretString> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| SecretString::from(k.to_string()))
        .collect()
}

// ── Retry ─────────────────────────────────────────────────────────────────────

/// Bounded retry for rate-limited requests.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the initial one).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Backoff is capped here, and so is any server-sent Retry-After.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts()  -> u32 { 5 }
fn default_base_delay_ms() -> u64 { 500 }
fn default_max_delay_ms()  -> u64 { 30_000 }

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

// ── Search pipeline ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_records_csv")]
    pub records_csv: PathBuf,
    #[serde(default = "default_year_counts_csv")]
    pub year_counts_csv: PathBuf,
    #[serde(default = "default_year_chart")]
    pub year_chart: PathBuf,
    /// Only this aggregation type is counted in the per-year chart.
    #[serde(default = "default_publication_type")]
    pub publication_type: String,
    #[serde(default = "default_chart_title")]
    pub chart_title: String,
    #[serde(default = "default_source_note")]
    pub chart_source_note: String,
}

fn default_records_csv()      -> PathBuf { PathBuf::from("data/scopus_results.csv") }
fn default_year_counts_csv()  -> PathBuf { PathBuf::from("data/publications_per_year.csv") }
fn default_year_chart()       -> PathBuf { PathBuf::from("figs/publications_per_year.png") }
fn default_publication_type() -> String  { "Journal".to_string() }
fn default_chart_title()      -> String  { "Publications per year".to_string() }
fn default_source_note()      -> String  { "Source: Scopus database".to_string() }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: String::new(),
            records_csv: default_records_csv(),
            year_counts_csv: default_year_counts_csv(),
            year_chart: default_year_chart(),
            publication_type: default_publication_type(),
            chart_title: default_chart_title(),
            chart_source_note: default_source_note(),
        }
    }
}

// ── Schedule pipeline ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_schedule_input")]
    pub input: PathBuf,
    #[serde(default = "default_schedule_output")]
    pub output: PathBuf,
    #[serde(default = "default_activity_column")]
    pub activity_column: String,
    #[serde(default = "default_start_column")]
    pub start_column: String,
    #[serde(default = "default_end_column")]
    pub end_column: String,
    #[serde(default = "default_phase_column")]
    pub phase_column: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Hex colors assigned to phases in order of first appearance.
    #[serde(default = "default_colors")]
    pub colors: Vec<String>,
    /// Quoted `YYYY-MM-DD` strings; the x axis is derived from the data when unset.
    pub range_start: Option<NaiveDate>,
    pub range_end: Option<NaiveDate>,
    #[serde(default = "default_schedule_title")]
    pub title: String,
}

fn default_schedule_input()  -> PathBuf { PathBuf::from("data/schedule.xlsx") }
fn default_schedule_output() -> PathBuf { PathBuf::from("figs/schedule.png") }
fn default_activity_column() -> String  { "Activity".to_string() }
fn default_start_column()    -> String  { "Start".to_string() }
fn default_end_column()      -> String  { "End".to_string() }
fn default_phase_column()    -> String  { "Phase".to_string() }
fn default_date_format()     -> String  { "%d-%m-%Y".to_string() }
fn default_schedule_title()  -> String  { "Activity schedule".to_string() }

pub fn default_colors() -> Vec<String> {
    ["#173F5F", "#20639B", "#3CAEA3", "#F6D55C", "#ED553B"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            input: default_schedule_input(),
            output: default_schedule_output(),
            activity_column: default_activity_column(),
            start_column: default_start_column(),
            end_column: default_end_column(),
            phase_column: default_phase_column(),
            date_format: default_date_format(),
            colors: default_colors(),
            range_start: None,
            range_end: None,
            title: default_schedule_title(),
        }
    }
}

// ── Charts ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ChartsConfig {
    /// TrueType font used for all chart text; common system fonts are probed when unset.
    pub font_path: Option<PathBuf>,
    #[serde(default = "default_bar_width")]
    pub bar_width: u32,
    #[serde(default = "default_bar_height")]
    pub bar_height: u32,
    #[serde(default = "default_gantt_width")]
    pub gantt_width: u32,
    #[serde(default = "default_gantt_height")]
    pub gantt_height: u32,
}

fn default_bar_width()    -> u32 { 1344 }
fn default_bar_height()   -> u32 { 672 }
fn default_gantt_width()  -> u32 { 960 }
fn default_gantt_height() -> u32 { 500 }

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            bar_width: default_bar_width(),
            bar_height: default_bar_height(),
            gantt_width: default_gantt_width(),
            gantt_height: default_gantt_height(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl Config {
    /// Load configuration from litscope.toml.
    /// Checks the LITSCOPE_CONFIG env var first, then the current directory.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = Self::load_from(&path)?;
        config.apply_key_override(std::env::var(API_KEYS_ENV).ok().as_deref());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the configured keys with a comma-separated list, if one is given and non-empty.
    pub fn apply_key_override(&mut self, raw: Option<&str>) {
        if let Some(raw) = raw {
            let keys = parse_key_list(raw);
            if !keys.is_empty() {
                tracing::debug!(n_keys = keys.len(), "Scopus API keys taken from {}", API_KEYS_ENV);
                self.scopus.api_keys = keys;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".into()));
        }
        if self.scopus.page_size == 0 || self.scopus.page_size > 200 {
            return Err(ConfigError::Invalid("scopus.page_size must be within 1..=200".into()));
        }
        if self.schedule.colors.is_empty() {
            return Err(ConfigError::Invalid("schedule.colors must not be empty".into()));
        }
        if let (Some(start), Some(end)) = (self.schedule.range_start, self.schedule.range_end) {
            if end <= start {
                return Err(ConfigError::Invalid(
                    "schedule.range_end must be after schedule.range_start".into(),
                ));
            }
        }
        Ok(())
    }
}
