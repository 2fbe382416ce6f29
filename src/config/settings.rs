//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::playback::{DecodeFailurePolicy, VolumePresets};

/// Environment variable that overrides [`SpeechConfig::subscription_key`].
pub const API_KEY_ENV: &str = "AZURE_API_KEY";

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the recognition endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Regional endpoint the recognition path is resolved against.
    pub endpoint: String,
    /// Recognition locale sent as the `language` query parameter.
    pub language: String,
    /// Subscription key.  `None` means "read it from `AZURE_API_KEY`".
    pub subscription_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://japaneast.stt.speech.microsoft.com".into(),
            language: "ja-JP".into(),
            subscription_key: None,
            timeout_secs: 30,
        }
    }
}

impl SpeechConfig {
    /// The subscription key, preferring the `AZURE_API_KEY` environment
    /// variable over the configured value.  Empty keys count as missing.
    pub fn subscription_key(&self) -> Option<String> {
        resolve_key(std::env::var(API_KEY_ENV).ok(), self.subscription_key.as_deref())
    }

    /// Parsed [`endpoint`](Self::endpoint).
    pub fn endpoint_url(&self) -> Result<url::Url, url::ParseError> {
        url::Url::parse(&self.endpoint)
    }
}

fn resolve_key(from_env: Option<String>, configured: Option<&str>) -> Option<String> {
    from_env
        .filter(|k| !k.trim().is_empty())
        .or_else(|| {
            configured
                .filter(|k| !k.trim().is_empty())
                .map(str::to_string)
        })
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for microphone capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate of the recorded WAV sent for recognition (Hz).
    pub sample_rate: u32,
    /// Maximum recording length in seconds; later audio is discarded.
    pub max_recording_secs: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            max_recording_secs: 60.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Settings for the playback queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Gain applied by `attenuate` (0.0 – 1.0).
    pub attenuated_volume: f32,
    /// Gain applied by `restore`.
    pub full_volume: f32,
    /// Whether an undecodable payload is skipped or halts the queue.
    pub on_decode_failure: DecodeFailurePolicy,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        let presets = VolumePresets::default();
        Self {
            attenuated_volume: presets.attenuated,
            full_volume: presets.full,
            on_decode_failure: DecodeFailurePolicy::default(),
        }
    }
}

impl PlaybackConfig {
    pub fn volume_presets(&self) -> VolumePresets {
        VolumePresets {
            attenuated: self.attenuated_volume,
            full: self.full_volume,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// Sections missing from the file take their defaults.
///
/// ```rust,no_run
/// use speech_recognizer::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// println!("recognizing {}", config.speech.language);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Recognition endpoint settings.
    pub speech: SpeechConfig,
    /// Microphone capture settings.
    pub audio: AudioConfig,
    /// Playback queue settings.
    pub playback: PlaybackConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(original, loaded);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.speech.endpoint, "https://japaneast.stt.speech.microsoft.com");
        assert_eq!(cfg.speech.language, "ja-JP");
        assert!(cfg.speech.subscription_key.is_none());
        assert_eq!(cfg.speech.timeout_secs, 30);
        assert_eq!(cfg.audio.sample_rate, 16_000);
        assert_eq!(cfg.playback.attenuated_volume, 0.1);
        assert_eq!(cfg.playback.full_volume, 1.0);
        assert_eq!(cfg.playback.on_decode_failure, DecodeFailurePolicy::Skip);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.speech.endpoint = "https://westus.stt.speech.microsoft.com".into();
        cfg.speech.language = "en-US".into();
        cfg.speech.subscription_key = Some("key-123".into());
        cfg.audio.max_recording_secs = 15.0;
        cfg.playback.attenuated_volume = 0.25;
        cfg.playback.on_decode_failure = DecodeFailurePolicy::Halt;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            r#"
[playback]
attenuated_volume = 0.2
full_volume = 0.9
on_decode_failure = "halt"
"#,
        )
        .unwrap();

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(loaded.speech, SpeechConfig::default());
        assert_eq!(loaded.playback.on_decode_failure, DecodeFailurePolicy::Halt);
        assert_eq!(
            loaded.playback.volume_presets(),
            VolumePresets {
                attenuated: 0.2,
                full: 0.9
            }
        );
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "speech = [not toml").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn env_key_wins_over_configured_key() {
        assert_eq!(
            resolve_key(Some("env".into()), Some("file")),
            Some("env".to_string())
        );
    }

    #[test]
    fn blank_keys_count_as_missing() {
        assert_eq!(resolve_key(Some("  ".into()), Some("file")), Some("file".into()));
        assert_eq!(resolve_key(None, Some("")), None);
        assert_eq!(resolve_key(None, None), None);
    }

    #[test]
    fn endpoint_url_parses() {
        let url = SpeechConfig::default().endpoint_url().unwrap();
        assert_eq!(url.host_str(), Some("japaneast.stt.speech.microsoft.com"));
    }
}
