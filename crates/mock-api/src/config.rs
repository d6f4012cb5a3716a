use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub bind_addr: String,
    pub cookie_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            cookie_name: "classify_sid".into(),
        }
    }
}

/// Defaults, then the TOML file, then environment variables
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("MOCK_API_BIND") {
        settings.bind_addr = v;
    }
    if let Ok(v) = std::env::var("MOCK_API_COOKIE") {
        settings.cookie_name = v;
    }

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    match toml::from_str::<HashMap<String, String>>(raw) {
        Ok(file_cfg) => {
            if let Some(v) = file_cfg.get("bind_addr") {
                settings.bind_addr = v.clone();
            }
            if let Some(v) = file_cfg.get("cookie_name") {
                settings.cookie_name = v.clone();
            }
        }
        Err(error) => tracing::warn!(%error, "ignoring unreadable settings file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let mut settings = Settings::default();
        apply_file(&mut settings, "bind_addr = \"0.0.0.0:9000\"\n");
        assert_eq!(settings.bind_addr, "0.0.0.0:9000");
        assert_eq!(settings.cookie_name, "classify_sid");
    }

    #[test]
    fn broken_file_keeps_defaults() {
        let mut settings = Settings::default();
        apply_file(&mut settings, "bind_addr = [");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let settings = load_settings(Path::new("/nonexistent/mock-api.toml"));
        assert_eq!(settings.cookie_name, Settings::default().cookie_name);
    }
}
