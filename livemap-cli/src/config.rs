//! Configuration loading and parsing
//!
//! Every section is optional; an empty file describes the on-device deployment
//! (logcat source, `/data/params/d`, JSON lines on stdout).

use anyhow::{bail, Context, Result};
use livemap_decoder::{EngineConfig, LogcatConfig, RunnerConfig, DEFAULT_PARAMS_DIR};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from livemapd.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub params: ParamsConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub process: ProcessConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    Logcat(LogcatConfig),
    File { path: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Logcat(LogcatConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParamsConfig {
    #[serde(default = "default_params_dir")]
    pub dir: PathBuf,
}

fn default_params_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PARAMS_DIR)
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            dir: default_params_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PublishConfig {
    #[default]
    Stdout,
    Udp { address: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProcessConfig {
    /// Scheduling priority (nice value); 0 leaves the priority alone
    #[serde(default = "default_nice")]
    pub nice: i32,
}

fn default_nice() -> i32 {
    -15
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            nice: default_nice(),
        }
    }
}

impl AppConfig {
    /// Reject configurations the daemon cannot run with
    pub fn validate(&self) -> Result<()> {
        let tags = &self.engine.tags;
        for (role, tag) in [
            ("speed_sign_distance", &tags.speed_sign_distance),
            ("speed_limit", &tags.speed_limit),
            ("sign_type", &tags.sign_type),
            ("audio_noise", &tags.audio_noise),
            ("turn_info", &tags.turn_info),
            ("turn_distance", &tags.turn_distance),
            ("road_curvature", &tags.road_curvature),
            ("idle_heartbeat", &tags.idle_heartbeat),
        ] {
            if tag.is_empty() {
                bail!("engine.tags.{} must not be empty", role);
            }
        }

        let keys = &self.engine.keys;
        if keys.map_enable.is_empty() || keys.map_valid.is_empty() || keys.speed_bump.is_empty() {
            bail!("engine.keys entries must not be empty");
        }

        if self.runner.topic.is_empty() {
            bail!("runner.topic must not be empty");
        }

        if let SourceConfig::Logcat(logcat) = &self.source {
            if logcat.buffers.is_empty() {
                bail!("source.buffers must name at least one log buffer");
            }
        }

        if !(-20..=19).contains(&self.process.nice) {
            bail!("process.nice must be between -20 and 19, got {}", self.process.nice);
        }

        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [source]
            kind = "file"
            path = "/tmp/replay.log"

            [publish]
            kind = "udp"
            address = "127.0.0.1:8021"

            [runner]
            pause_ms = 250

            [engine.tags]
            idle_heartbeat = "NaviTick"

            [process]
            nice = -5
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(
            config.source,
            SourceConfig::File {
                path: PathBuf::from("/tmp/replay.log")
            }
        );
        assert_eq!(
            config.publish,
            PublishConfig::Udp {
                address: "127.0.0.1:8021".to_string()
            }
        );
        assert_eq!(config.runner.pause_ms, 250);
        assert_eq!(config.runner.topic, "liveMapData");
        assert_eq!(config.engine.tags.idle_heartbeat, "NaviTick");
        assert_eq!(config.engine.tags.speed_limit, "opkrspdlimit");
        assert_eq!(config.process.nice, -5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_is_device_default() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.source, SourceConfig::Logcat(LogcatConfig::default()));
        assert_eq!(config.params.dir, PathBuf::from("/data/params/d"));
        assert_eq!(config.publish, PublishConfig::Stdout);
        assert_eq!(config.process.nice, -15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_logcat_section() {
        let toml_content = r#"
            [source]
            kind = "logcat"
            binary = "/system/bin/logcat"
            buffers = ["main", "system"]
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        match config.source {
            SourceConfig::Logcat(logcat) => {
                assert_eq!(logcat.binary, PathBuf::from("/system/bin/logcat"));
                assert_eq!(logcat.buffers, vec!["main", "system"]);
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_empty_tag() {
        let toml_content = r#"
            [engine.tags]
            sign_type = ""
        "#;
        let config: AppConfig = toml::from_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sign_type"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("livemapd.toml");
        fs::write(&path, "[process]\nnice = 40\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("process.nice"));
        assert!(load_config(&dir.path().join("missing.toml")).is_err());
    }
}
