use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::CrierConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["crier.toml", "crier.yaml", "crier.yml", "crier.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<CrierConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./crier.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/crier/crier.{toml,yaml,yml,json}` (user-global)
///
/// Returns `CrierConfig::default()` if no config file is found.
pub fn discover_and_load() -> CrierConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    CrierConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/crier/
    if let Some(dirs) = directories::ProjectDirs::from("", "", "crier") {
        let config_dir = dirs.config_dir();
        for name in CONFIG_FILENAMES {
            let p = config_dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// Returns the user-global config directory (`~/.config/crier/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "crier").map(|d| d.config_dir().to_path_buf())
}

/// Returns the user-global data directory, home of the default connection
/// store file.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "crier").map(|d| d.data_dir().to_path_buf())
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crier.toml")
}

/// Serialize `config` to TOML and write it to the user-global config path.
///
/// Creates parent directories if needed. Returns the path written to.
pub fn save_config(config: &CrierConfig) -> anyhow::Result<PathBuf> {
    let path = find_or_default_config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("serialize config: {e}"))?;
    std::fs::write(&path, toml_str)?;
    debug!(path = %path.display(), "saved config");
    Ok(path)
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<CrierConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(unsafe_code, clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_toml_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crier.toml");
        std::fs::write(&path, "[callback]\nport = 9100\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.callback.port, 9100);
    }

    #[test]
    fn loads_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crier.json");
        std::fs::write(&path, r#"{"scheduler": {"url": "http://127.0.0.1:7000"}}"#).unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.scheduler.url.as_deref(), Some("http://127.0.0.1:7000"));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crier.ini");
        std::fs::write(&path, "port=1").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn env_placeholders_resolve_in_config_values() {
        // Unique name so parallel tests cannot collide on it.
        unsafe { std::env::set_var("CRIER_LOADER_TEST_SECRET", "from-env") };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crier.toml");
        std::fs::write(
            &path,
            "[platforms.twitter]\nclient_id = \"id\"\nclient_secret = \"${CRIER_LOADER_TEST_SECRET}\"\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        let creds = cfg.platforms.get("twitter").unwrap();
        assert_eq!(
            secrecy::ExposeSecret::expose_secret(&creds.client_secret),
            "from-env"
        );
    }
}
