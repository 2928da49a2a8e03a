use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::session::SessionConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Directory recordings are written to and served from
    pub recordings_path: String,
    /// Initial state of the administrative recording switch
    #[serde(default = "default_recording_enabled")]
    pub recording_enabled: bool,
    /// Seconds between supervisor checks
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// WAV file fed through the file-backed capture device
    pub source_path: String,
}

fn default_recording_enabled() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    10
}

impl AudioConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(PathBuf::from(&self.recordings_path))
    }
}

impl Config {
    /// Load `path` (any extension the `config` crate understands), then apply
    /// `COCKPIT_AUDIO__SECTION__KEY` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("COCKPIT_AUDIO").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_with_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "cockpit-audio"

[service.http]
bind = "127.0.0.1"
port = 8080

[audio]
recordings_path = "/tmp/recordings"
source_path = "/tmp/cockpit.wav"
"#
        )
        .unwrap();

        let path = file.path().with_extension("");
        let cfg = Config::load(path.to_str().unwrap()).unwrap();

        assert_eq!(cfg.service.http.port, 8080);
        assert!(cfg.audio.recording_enabled);
        assert_eq!(cfg.audio.poll_interval(), Duration::from_secs(10));
        assert_eq!(
            cfg.audio.session_config().recordings_dir,
            PathBuf::from("/tmp/recordings")
        );
    }
}
