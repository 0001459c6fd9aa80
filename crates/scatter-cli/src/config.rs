use std::path::{Path, PathBuf};

use scatter_core::config::ScatterConfig;

/// Default config file location, used when `--config` is not given.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("scatter").join("config.json"))
}

/// Build the effective configuration: defaults, then the config file (if
/// any), then the process environment. Flags are applied by the caller.
///
/// An explicit `path` must exist. Without one the default location is used
/// only when a file is present there.
pub fn load(path: Option<&Path>) -> eyre::Result<ScatterConfig> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => read_config(&path)?,
            None => ScatterConfig::default(),
        },
    };

    config.apply_env(|name| std::env::var(name).ok())?;
    Ok(config)
}

pub fn read_config(path: &Path) -> eyre::Result<ScatterConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .map_or(0, |v| u32::try_from(v).unwrap_or(u32::MAX));

    let migrated = migrate(json, on_disk_version)?;
    let config: ScatterConfig = serde_json::from_value(migrated)?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Run sequential migrations from `from_version` up to
/// [`ScatterConfig::VERSION`]. Each step is a pure transform on raw JSON.
pub fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > ScatterConfig::VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({}). \
             Please update scatter.",
            ScatterConfig::VERSION
        ));
    }

    // v0 → v1: `file_system` renamed to `container_name`
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        if let Some(name) = obj.remove("file_system") {
            obj.entry("container_name").or_insert(name);
        }
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (file_system → container_name)");
    }

    Ok(json)
}

/// Write `config` to `path`, stamped with the current version.
pub fn save(config: &ScatterConfig, path: &Path) -> eyre::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let mut stamped = config.clone();
    stamped.config_version = ScatterConfig::VERSION;
    let json = serde_json::to_string_pretty(&stamped)?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;
    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
