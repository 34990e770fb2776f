use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, ReframeError};

/// Name of the config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "reframe.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ffmpeg: FfmpegConfig,
    pub reencode: ReencodeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Additional options placed right before the output path
    /// Common options: ["-c:v", "libx264", "-preset", "medium", "-crf", "23"]
    pub extra_options: Vec<String>,
    /// Pass `-y` so existing outputs are replaced without prompting
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReencodeConfig {
    /// Frame rate used when none is given on the command line
    pub default_fps: u32,
    /// File extensions treated as video when scanning a directory
    pub video_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the daily rotated log file
    pub directory: PathBuf,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            extra_options: vec![
                // Example encoding options users can customize:
                // "-c:v".to_string(), "libx264".to_string(),   // Video encoder
                // "-preset".to_string(), "medium".to_string(), // Encoding speed (ultrafast, fast, medium, slow, veryslow)
                // "-crf".to_string(), "23".to_string(),        // Quality (0-51, lower = better quality)
            ],
            overwrite: false,
        }
    }
}

impl Default for ReencodeConfig {
    fn default() -> Self {
        Self {
            default_fps: 10,
            video_extensions: ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(".reframe").join("log"),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReframeError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ReframeError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ReframeError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ReframeError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Load `explicit` if given, else `reframe.toml` in `dir` when present, else defaults
    pub fn discover<P: AsRef<Path>>(explicit: Option<&Path>, dir: P) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidate = dir.as_ref().join(DEFAULT_CONFIG_FILE);
        if candidate.exists() {
            tracing::info!("Found {} in {}, loading...", DEFAULT_CONFIG_FILE, dir.as_ref().display());
            Self::from_file(candidate)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.ffmpeg.binary_path.trim().is_empty() {
            return Err(ReframeError::Config("ffmpeg.binary_path must not be empty".to_string()));
        }
        if self.reencode.default_fps == 0 {
            return Err(ReframeError::Config("reencode.default_fps must be greater than zero".to_string()));
        }
        Ok(())
    }
}
