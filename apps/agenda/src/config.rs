use std::{fs, io, path::Path};

use anyhow::Context;
use client_core::import::DEFAULT_IMPORT_CONCURRENCY;
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "agenda.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub projector_id: i64,
    pub import_concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            projector_id: 1,
            import_concurrency: DEFAULT_IMPORT_CONCURRENCY,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    server_url: Option<String>,
    projector_id: Option<i64>,
    import_concurrency: Option<usize>,
}

/// Defaults, then the settings file (if present), then the environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file.projector_id {
        settings.projector_id = v;
    }
    if let Some(v) = file.import_concurrency {
        settings.import_concurrency = v.max(1);
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("AGENDA_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("APP__PROJECTOR_ID") {
        if let Ok(parsed) = v.parse::<i64>() {
            settings.projector_id = parsed;
        }
    }

    if let Some(v) = var("APP__IMPORT_CONCURRENCY") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.import_concurrency = parsed.max(1);
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
