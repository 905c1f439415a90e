// Settings - YAML work preferences layered with JOBSCOUT__* environment overrides

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use config::{Config, ConfigError, Environment, File, FileFormat, Value, ValueKind};
use jobscout_core::application::constants::{DEFAULT_MAX_PAGES, DEFAULT_MAX_RETRIES};
use jobscout_core::application::RetryPolicy;
use jobscout_core::domain::{Blacklist, DatePosted, SearchSettings};
use jobscout_infra_web::{BrowserSettings, HttpSettings};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "./configs/work_preferences.yaml";
const DEFAULT_DATABASE_PATH: &str = "~/.jobscout/jobs.db";
const ENV_PREFIX: &str = "JOBSCOUT";

/// Boards the binary knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[value(name = "linkedin")]
    LinkedIn,
    #[value(name = "topcv")]
    TopCv,
    #[value(name = "itviec")]
    ItViec,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::LinkedIn => write!(f, "linkedin"),
            SourceKind::TopCv => write!(f, "topcv"),
            SourceKind::ItViec => write!(f, "itviec"),
        }
    }
}

/// Recency flags; the first enabled one (broadest first) wins
#[derive(Debug, Clone, Deserialize)]
pub struct DateFlags {
    pub all_time: bool,
    pub month: bool,
    pub week: bool,
    #[serde(rename = "24_hours")]
    pub day: bool,
    #[serde(rename = "6_hours", default)]
    pub six_hours: bool,
    #[serde(rename = "2_hours", default)]
    pub two_hours: bool,
    #[serde(default)]
    pub hour: bool,
}

impl DateFlags {
    pub fn date_posted(&self) -> DatePosted {
        [
            (self.all_time, DatePosted::AllTime),
            (self.month, DatePosted::Month),
            (self.week, DatePosted::Week),
            (self.day, DatePosted::Day),
            (self.six_hours, DatePosted::SixHours),
            (self.two_hours, DatePosted::TwoHours),
            (self.hour, DatePosted::Hour),
        ]
        .into_iter()
        .find_map(|(enabled, date_posted)| enabled.then_some(date_posted))
        .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub user_agent: Option<String>,
    pub accept_language: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            user_agent: None,
            accept_language: None,
            timeout_secs: 30,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSection {
    pub user_data_dir: Option<String>,
    pub executable: Option<String>,
    pub headless: bool,
    pub navigation_timeout_secs: u64,
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            user_data_dir: Some("~/.jobscout/chrome-profile".to_string()),
            executable: None,
            headless: false,
            navigation_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub positions: Vec<String>,
    pub locations: Vec<String>,
    pub date: DateFlags,
    #[serde(default)]
    pub title_blacklist: Vec<String>,
    #[serde(default)]
    pub company_blacklist: Vec<String>,
    #[serde(default = "all_sources")]
    pub sources: Vec<SourceKind>,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default)]
    pub http: HttpSection,
    #[serde(default)]
    pub browser: BrowserSection,
}

fn all_sources() -> Vec<SourceKind> {
    vec![SourceKind::LinkedIn, SourceKind::TopCv, SourceKind::ItViec]
}

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

impl Settings {
    /// Load the YAML file at `path`, then apply environment overrides
    /// (`JOBSCOUT__MAX_PAGES=3`, `JOBSCOUT__DATE__WEEK=true`, ...)
    pub fn load(path: &Path) -> Result<Self> {
        let source = Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml).required(true))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_config(source)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn from_config(source: Config) -> Result<Self> {
        check_raw_kinds(&source)?;
        let settings: Settings = source.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.positions.iter().all(|p| p.trim().is_empty()) {
            bail!("'positions' must list at least one search term");
        }
        if self.locations.iter().all(|l| l.trim().is_empty()) {
            bail!("'locations' must list at least one location");
        }
        if self.sources.is_empty() {
            bail!("'sources' must enable at least one board");
        }
        if self.max_pages == 0 {
            bail!("'max_pages' must be at least 1");
        }
        Ok(())
    }

    pub fn search(&self) -> Result<SearchSettings> {
        Ok(SearchSettings::new(
            self.positions.clone(),
            self.locations.clone(),
            self.date.date_posted(),
        )?)
    }

    pub fn blacklist(&self) -> Result<Blacklist> {
        Ok(Blacklist::compile(
            &self.title_blacklist,
            &self.company_blacklist,
        )?)
    }

    /// sqlx connection URL for the tilde-expanded database path
    pub fn database_url(&self) -> String {
        if self.database_path.starts_with("sqlite:") {
            return self.database_path.clone();
        }
        format!("sqlite://{}?mode=rwc", shellexpand::tilde(&self.database_path))
    }

    /// Directory holding the database file (created before the pool opens)
    pub fn database_dir(&self) -> Option<PathBuf> {
        if self.database_path.starts_with("sqlite:") {
            return None;
        }
        let path = PathBuf::from(shellexpand::tilde(&self.database_path).into_owned());
        path.parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }

    pub fn http(&self) -> HttpSettings {
        let defaults = HttpSettings::default();
        HttpSettings {
            user_agent: self.http.user_agent.clone().unwrap_or(defaults.user_agent),
            accept_language: self
                .http
                .accept_language
                .clone()
                .unwrap_or(defaults.accept_language),
            timeout: Duration::from_secs(self.http.timeout_secs),
            retry: RetryPolicy::new(self.http.max_retries, defaults.retry.backoff()),
            ..defaults
        }
    }

    pub fn retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.http.max_retries, RetryPolicy::default().backoff())
    }

    pub fn browser(&self) -> BrowserSettings {
        let expand = |p: &String| PathBuf::from(shellexpand::tilde(p).into_owned());
        BrowserSettings {
            user_data_dir: self.browser.user_data_dir.as_ref().map(expand),
            executable: self.browser.executable.as_ref().map(expand),
            headless: self.browser.headless,
            navigation_timeout: Duration::from_secs(self.browser.navigation_timeout_secs),
        }
    }
}

/// Deserialization coerces scalars (`1`, `"on"`, `42`); the file must carry real
/// booleans for date flags and strings for search terms
fn check_raw_kinds(source: &Config) -> Result<()> {
    if let Some(date) = raw_value(source, "date")? {
        let flags = date
            .into_table()
            .context("'date' must be a mapping of boolean flags")?;
        for (flag, value) in flags {
            if !matches!(value.kind, ValueKind::Boolean(_)) {
                bail!("Date filter '{}' must be a boolean, got {:?}", flag, value.kind);
            }
        }
    }

    for key in ["positions", "locations"] {
        let Some(list) = raw_value(source, key)? else {
            continue;
        };
        let entries = list
            .into_array()
            .with_context(|| format!("'{}' must be a list of strings", key))?;
        if let Some(entry) = entries
            .iter()
            .find(|v| !matches!(v.kind, ValueKind::String(_)))
        {
            bail!("'{}' must be a list of strings, got {:?}", key, entry.kind);
        }
    }
    Ok(())
}

fn raw_value(source: &Config, key: &str) -> Result<Option<Value>> {
    match source.get::<Value>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
positions:
  - Rust Developer
  - Backend Engineer
locations:
  - Vietnam
date:
  all_time: false
  month: false
  week: true
  24_hours: false
"#;

    fn parse(yaml: &str) -> Result<Settings> {
        let source = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?;
        Settings::from_config(source)
    }

    #[test]
    fn test_defaults() {
        let settings = parse(MINIMAL).unwrap();

        assert_eq!(settings.positions.len(), 2);
        assert!(settings.title_blacklist.is_empty());
        assert!(settings.company_blacklist.is_empty());
        assert_eq!(settings.sources, all_sources());
        assert_eq!(settings.max_pages, DEFAULT_MAX_PAGES);
        assert_eq!(settings.date.date_posted(), DatePosted::Week);
        assert!(settings.database_url().starts_with("sqlite://"));
        assert!(settings.database_url().ends_with("/.jobscout/jobs.db?mode=rwc"));
    }

    #[test]
    fn test_first_enabled_date_flag_wins() {
        let flags = DateFlags {
            all_time: false,
            month: true,
            week: true,
            day: false,
            six_hours: false,
            two_hours: false,
            hour: true,
        };
        assert_eq!(flags.date_posted(), DatePosted::Month);

        let none = DateFlags {
            month: false,
            week: false,
            hour: false,
            ..flags
        };
        assert_eq!(none.date_posted(), DatePosted::AllTime);
    }

    #[test]
    fn test_optional_date_flags() {
        let yaml = MINIMAL.replace("week: true", "week: false") + "  hour: true\n";
        let settings = parse(&yaml).unwrap();
        assert_eq!(settings.date.date_posted(), DatePosted::Hour);
    }

    #[test]
    fn test_missing_positions_rejected() {
        let yaml = MINIMAL.replace("  - Rust Developer\n  - Backend Engineer\n", "");
        let yaml = yaml.replace("positions:\n", "");
        assert!(parse(&yaml).is_err());
    }

    #[test]
    fn test_empty_locations_rejected() {
        let yaml = MINIMAL.replace("locations:\n  - Vietnam\n", "locations: []\n");
        assert!(parse(&yaml).is_err());
    }

    #[test]
    fn test_missing_required_date_flag_rejected() {
        let yaml = MINIMAL.replace("  24_hours: false\n", "");
        assert!(parse(&yaml).is_err());
    }

    #[test]
    fn test_non_boolean_date_flag_rejected() {
        let yaml = MINIMAL.replace("week: true", "week: sometimes");
        assert!(parse(&yaml).is_err());
    }

    #[test]
    fn test_coercible_date_flags_rejected() {
        for value in ["1", "0", "\"true\"", "\"on\""] {
            let yaml = MINIMAL.replace("week: true", &format!("week: {}", value));
            assert!(parse(&yaml).is_err(), "week: {} should be rejected", value);
        }
    }

    #[test]
    fn test_non_string_positions_rejected() {
        let yaml = MINIMAL.replace("  - Rust Developer\n  - Backend Engineer\n", "  - 42\n");
        assert!(parse(&yaml).is_err());

        let yaml = MINIMAL.replace("  - Vietnam\n", "  - true\n");
        assert!(parse(&yaml).is_err());
    }

    #[test]
    fn test_blacklists_and_sources() {
        let yaml = format!(
            "{}title_blacklist:\n  - Senior\ncompany_blacklist:\n  - Acme\nsources:\n  - topcv\n",
            MINIMAL
        );
        let settings = parse(&yaml).unwrap();

        assert_eq!(settings.sources, vec![SourceKind::TopCv]);
        let blacklist = settings.blacklist().unwrap();
        assert!(blacklist.is_blacklisted("Senior Rust Developer", "Globex"));
        assert!(blacklist.is_blacklisted("Rust Developer", "Acme"));
    }

    #[test]
    fn test_explicit_database_url_kept() {
        let yaml = format!("{}database_path: \"sqlite::memory:\"\n", MINIMAL);
        let settings = parse(&yaml).unwrap();

        assert_eq!(settings.database_url(), "sqlite::memory:");
        assert!(settings.database_dir().is_none());
    }
}
