use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisOptions,
    pub provider: ProviderConfig,
    pub tts: TtsConfig,
    pub server: ServerConfig,
    pub upload: UploadConfig,
}

/// Sizes (in chars) steering the chunk / merge / refine path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub target_chunk_size: usize,
    pub max_chunk_size: usize,
    pub chunk_trigger_size: usize,
    pub refine_field_cap: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            target_chunk_size: 8000,
            max_chunk_size: 10000,
            chunk_trigger_size: 12000,
            refine_field_cap: 8000,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("target_chunk_size ({target}) must not exceed max_chunk_size ({max})")]
    TargetAboveMax { target: usize, max: usize },
}

impl AnalysisOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        for (name, value) in [
            ("target_chunk_size", self.target_chunk_size),
            ("max_chunk_size", self.max_chunk_size),
            ("refine_field_cap", self.refine_field_cap),
        ] {
            if value == 0 {
                return Err(OptionsError::Zero(name));
            }
        }
        if self.target_chunk_size > self.max_chunk_size {
            return Err(OptionsError::TargetAboveMax {
                target: self.target_chunk_size,
                max: self.max_chunk_size,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// anthropic | groq | xai; the PROVIDER environment variable wins over this.
    pub preferred: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            preferred: None,
            temperature: 0.7,
            max_tokens: 1200,
            request_timeout_secs: Some(120),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub language: String,
    pub voice: Option<String>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            voice: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            body_limit_mb: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_file_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Loads the config file (explicit path, else optional `config/default`),
/// then `MEMO_*` environment overrides such as `MEMO_ANALYSIS__CHUNK_TRIGGER_SIZE`.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("MEMO")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    let cfg: AppConfig = settings.build()?.try_deserialize()?;
    cfg.analysis.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_sizes() {
        let opts = AnalysisOptions::default();
        assert_eq!(opts.target_chunk_size, 8000);
        assert_eq!(opts.max_chunk_size, 10000);
        assert_eq!(opts.chunk_trigger_size, 12000);
        assert_eq!(opts.refine_field_cap, 8000);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_sizes() {
        let mut opts = AnalysisOptions {
            target_chunk_size: 11000,
            ..Default::default()
        };
        assert_eq!(
            opts.validate(),
            Err(OptionsError::TargetAboveMax {
                target: 11000,
                max: 10000
            })
        );
        opts.target_chunk_size = 0;
        assert_eq!(opts.validate(), Err(OptionsError::Zero("target_chunk_size")));
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[analysis]\nchunk_trigger_size = 500\n\n[server]\nport = 8080").unwrap();
        let cfg = load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(cfg.analysis.chunk_trigger_size, 500);
        assert_eq!(cfg.analysis.max_chunk_size, 10000);
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.tts.language, "en-US");
    }

    #[test]
    fn invalid_sizes_in_file_fail_to_load() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[analysis]\ntarget_chunk_size = 20000").unwrap();
        assert!(load(Some(file.path().to_str().unwrap())).is_err());
    }
}
