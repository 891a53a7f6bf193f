use std::{fs, io, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "teacher-admin.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub api_token: Option<String>,
    pub page_size: u32,
    pub request_timeout: Duration,
    pub default_theme: String,
    /// Stored light/dark preference; anything but `dark` means light.
    pub theme_mode: Option<String>,
    pub default_password: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:3000/api".into(),
            api_token: None,
            page_size: client_core::controller::DEFAULT_PAGE_SIZE,
            request_timeout: client_core::transport::DEFAULT_REQUEST_TIMEOUT,
            default_theme: client_core::layout::ChromeConfig::default().default_theme,
            theme_mode: None,
            default_password: "1234".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    api_token: Option<String>,
    page_size: Option<u32>,
    request_timeout_secs: Option<u64>,
    default_theme: Option<String>,
    theme_mode: Option<String>,
    default_password: Option<String>,
}

/// Flags given on the command line; they win over file and environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub page_size: Option<u32>,
}

pub fn load_settings(path: &Path, overrides: &Overrides) -> anyhow::Result<Settings> {
    load_settings_with(path, overrides, |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_with(
    path: &Path,
    overrides: &Overrides,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("invalid config file {}", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    }

    if let Some(v) = env("API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("API_TOKEN") {
        settings.api_token = Some(v);
    }
    if let Some(v) = env("APP__API_TOKEN") {
        settings.api_token = Some(v);
    }

    if let Some(v) = env("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.trim().parse::<u32>() {
            settings.page_size = parsed;
        }
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout = Duration::from_secs(parsed);
        }
    }
    if let Some(v) = env("APP__DEFAULT_THEME") {
        settings.default_theme = v;
    }
    if let Some(v) = env("APP__THEME_MODE") {
        settings.theme_mode = Some(v);
    }
    if let Some(v) = env("APP__DEFAULT_PASSWORD") {
        settings.default_password = v;
    }

    if let Some(v) = &overrides.api_url {
        settings.api_url = v.clone();
    }
    if let Some(v) = &overrides.api_token {
        settings.api_token = Some(v.clone());
    }
    if let Some(v) = overrides.page_size {
        settings.page_size = v;
    }

    settings.api_url = normalize_api_url(&settings.api_url)?;
    settings.api_token = settings
        .api_token
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());
    if settings.page_size == 0 {
        settings.page_size = Settings::default().page_size;
    }
    if settings.request_timeout.is_zero() {
        settings.request_timeout = Settings::default().request_timeout;
    }

    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.api_token {
        settings.api_token = Some(v);
    }
    if let Some(v) = file_cfg.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout = Duration::from_secs(v);
    }
    if let Some(v) = file_cfg.default_theme {
        settings.default_theme = v;
    }
    if let Some(v) = file_cfg.theme_mode {
        settings.theme_mode = Some(v);
    }
    if let Some(v) = file_cfg.default_password {
        settings.default_password = v;
    }
}

pub(crate) fn normalize_api_url(raw_api_url: &str) -> anyhow::Result<String> {
    let raw_api_url = raw_api_url.trim();
    if raw_api_url.is_empty() {
        return Ok(Settings::default().api_url);
    }

    let parsed =
        Url::parse(raw_api_url).with_context(|| format!("invalid API url '{raw_api_url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "API url must use http or https, got '{}'",
            parsed.scheme()
        );
    }
    if parsed.host_str().is_none() {
        bail!("API url '{raw_api_url}' has no host");
    }

    Ok(raw_api_url.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
