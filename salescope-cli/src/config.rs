use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use salescope_analytics::{CatalogSource, HttpCatalog};

use crate::state::{ensure_salescope_home, salescope_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputSection,
    pub output: OutputSection,
    pub catalog: CatalogSection,
    pub report: ReportSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub enriched_path: PathBuf,
    pub report_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    pub enabled: bool,
    pub url: String,
    /// Sent as `?limit=`; 0 leaves the server default.
    pub limit: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub currency_symbol: String,
    /// IANA name, e.g. "Asia/Kolkata"
    pub timezone: String,
    pub top_n: usize,
    pub low_performer_threshold: i64,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/sales_data.txt"),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            enriched_path: PathBuf::from("data/enriched_sales_data.txt"),
            report_path: PathBuf::from("output/sales_report.txt"),
        }
    }
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://dummyjson.com/products".to_string(),
            limit: 100,
            timeout_secs: 10,
        }
    }
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            timezone: "UTC".to_string(),
            top_n: 5,
            low_performer_threshold: 10,
        }
    }
}

impl CatalogSection {
    pub fn http(&self) -> HttpCatalog {
        let http = HttpCatalog::new(self.url.clone()).with_timeout(Duration::from_secs(self.timeout_secs));
        if self.limit > 0 { http.with_limit(self.limit) } else { http }
    }

    /// Resolve the catalog source; an explicit file wins, `offline` disables the network.
    pub fn source(&self, file: Option<PathBuf>, offline: bool) -> CatalogSource {
        match file {
            Some(path) => CatalogSource::File(path),
            None if offline || !self.enabled => CatalogSource::Disabled,
            None => CatalogSource::Remote(self.http()),
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(salescope_home()?.join("config.toml"))
}

/// Load `path`, or the default location when `None`. A missing file yields defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => ensure_salescope_home()?.join("config.toml"),
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[report]\ncurrency_symbol = \"₹\"\ntimezone = \"Asia/Kolkata\"\n").unwrap();

        let cfg = load_config(Some(&p)).unwrap();
        assert_eq!(cfg.report.currency_symbol, "₹");
        assert_eq!(cfg.report.top_n, 5);
        assert_eq!(cfg.catalog.timeout_secs, 10);
        assert_eq!(cfg.input.path, PathBuf::from("data/sales_data.txt"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.catalog.enabled = false;
        save_config(&cfg, &p).unwrap();
        assert_eq!(load_config(Some(&p)).unwrap(), cfg);
    }

    #[test]
    fn test_catalog_source_resolution() {
        let section = CatalogSection::default();
        assert!(matches!(section.source(None, false), CatalogSource::Remote(_)));
        assert!(matches!(section.source(None, true), CatalogSource::Disabled));
        assert!(matches!(
            section.source(Some(PathBuf::from("c.json")), true),
            CatalogSource::File(_)
        ));

        let http = section.http();
        assert_eq!(http.limit, Some(100));
        assert_eq!(http.timeout, Duration::from_secs(10));
    }
}
