//! Client configuration stored as TOML (default `portal.toml`).

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Client configuration (TOML).
///
/// Missing fields take their defaults; a missing file is the default config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PortalConfig {
    /// Backend root, without a trailing slash (e.g. `http://localhost:8080`).
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Period of the clock that reclassifies courses, in milliseconds.
    pub clock_period_ms: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            clock_period_ms: 1000,
        }
    }
}

impl PortalConfig {
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(self.base_url.trim())
            .with_context(|| format!("base_url `{}` is not a url", self.base_url))?;
        if base.cannot_be_a_base() {
            bail!("base_url `{}` cannot carry a path", self.base_url);
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be > 0");
        }
        if self.clock_period_ms == 0 {
            bail!("clock_period_ms must be > 0");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn clock_period(&self) -> Duration {
        Duration::from_millis(self.clock_period_ms)
    }
}

/// Read and validate the config at `path`; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<PortalConfig> {
    let cfg = match fs::read_to_string(path) {
        Ok(contents) => {
            toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => PortalConfig::default(),
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Write a fresh config file for `cfg`.
///
/// An existing file is kept unless `overwrite` is set. The file is written
/// beside its final location and renamed into place.
pub fn init_config(path: &Path, cfg: &PortalConfig, overwrite: bool) -> Result<()> {
    cfg.validate()?;
    if path.exists() && !overwrite {
        bail!("{} already exists", path.display());
    }
    let rendered = toml::to_string_pretty(cfg).context("render config")?;
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let staged = path.with_extension("toml.partial");
    fs::write(&staged, rendered).with_context(|| format!("write {}", staged.display()))?;
    fs::rename(&staged, path).with_context(|| format!("install {}", path.display()))?;
    info!(path = %path.display(), "config written");
    Ok(())
}
