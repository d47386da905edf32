use crate::Result;
use crate::facts::{Blacklist, YearRange};
use camino::{Utf8Path, Utf8PathBuf};
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Name of the configuration file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "starcheck.toml";

/// Smallest sample that still covers a full page of stargazers.
const MIN_STARS: usize = 20;

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Stargazers to sample from large repositories
    #[serde(default = "default_stars")]
    pub stars: usize,

    /// Oldest year whose contributions are fetched
    #[serde(default = "default_until_year")]
    pub until_year: i32,

    /// Logins whose stargazer pages are never fetched
    #[serde(default)]
    pub blacklist: Vec<String>,
}

const fn default_stars() -> usize {
    1000
}

const fn default_until_year() -> i32 {
    YearRange::DEFAULT_OLDEST
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `starcheck.toml` is read from `search_dir` if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(search_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading starcheck configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = search_dir.join(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
                Err(e) => return Err(e).into_app_err_with(|| format!("reading starcheck configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    #[must_use]
    pub fn blacklist(&self) -> Blacklist {
        self.blacklist.iter().map(String::as_str).collect()
    }

    fn validate(&self) -> Result<()> {
        if self.stars < MIN_STARS {
            return Err(app_err!("stars must be at least {MIN_STARS}, got {}", self.stars));
        }

        if self.blacklist.iter().any(|login| login.trim().is_empty()) {
            return Err(app_err!("blacklist entries must not be empty"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stars: default_stars(),
            until_year: default_until_year(),
            blacklist: Vec::new(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn utf8_dir(tmp: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_default_config_toml_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        config.validate().unwrap();
        assert_eq!(config.stars, 1000);
        assert_eq!(config.until_year, 2013);
        assert!(config.blacklist().is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.stars, 1000);
        assert_eq!(config.until_year, YearRange::DEFAULT_OLDEST);
        assert!(config.blacklist().is_empty());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = toml::from_str("blacklist = [\"octocat\"]").unwrap();
        assert_eq!(config.stars, 1000);
        assert_eq!(config.blacklist().len(), 1);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let _ = toml::from_str::<Config>("contribution_page_size = 50").unwrap_err();
    }

    #[test]
    fn test_validate_small_stars() {
        let config = Config { stars: 19, ..Config::default() };
        let _ = config.validate().unwrap_err();
    }

    #[test]
    fn test_validate_empty_blacklist_entry() {
        let config = Config {
            blacklist: vec!["  ".to_string()],
            ..Config::default()
        };
        let _ = config.validate().unwrap_err();
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_save_default_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let output_path = utf8_dir(&tmp).join(DEFAULT_CONFIG_FILE);
        Config::save_default(&output_path).unwrap();

        let loaded = Config::load(&utf8_dir(&tmp), Some(&output_path)).unwrap();
        assert_eq!(loaded.stars, 1000);
        assert!(loaded.blacklist().is_empty());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_from_search_dir() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(DEFAULT_CONFIG_FILE), "stars = 500\nuntil_year = 2020\n").unwrap();

        let config = Config::load(&utf8_dir(&tmp), None).unwrap();
        assert_eq!(config.stars, 500);
        assert_eq!(config.until_year, 2020);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_missing_config_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&utf8_dir(&tmp), None).unwrap();
        assert_eq!(config.stars, 1000);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_missing_explicit_config_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = utf8_dir(&tmp).join("nope.toml");
        let _ = Config::load(&utf8_dir(&tmp), Some(&path)).unwrap_err();
    }
}
