use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub youtube_creds: String,
    #[serde(rename = "openai_api_key")]
    #[serde(default)]
    pub openai_key: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_bg_videos_dir")]
    pub bg_videos_dir: String,
    #[serde(default = "default_bg_music_dir")]
    pub bg_music_dir: String,
    #[serde(default = "default_tts_lang")]
    pub tts_lang: String,
    #[serde(default = "default_daily_reels")]
    pub daily_reels: u32,
}

fn default_openai_model() -> String {
    "gpt-5.2".to_string()
}

fn default_bg_videos_dir() -> String {
    "assets/gaming_videos".to_string()
}

fn default_bg_music_dir() -> String {
    "assets/horror_music".to_string()
}

fn default_tts_lang() -> String {
    "ur".to_string()
}

fn default_daily_reels() -> u32 {
    1
}

impl Config {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
        let config: Config = serde_json::from_str(&content)?;

        if config.youtube_creds.is_empty() {
            anyhow::bail!("config.json: youtube_creds missing");
        }

        Ok(config)
    }

    pub fn use_openai_scripts(&self) -> bool {
        !self.openai_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg: Config = serde_json::from_str(r#"{"youtube_creds": "{}"}"#).unwrap();
        assert_eq!(cfg.openai_key, "");
        assert_eq!(cfg.openai_model, "gpt-5.2");
        assert_eq!(cfg.bg_videos_dir, "assets/gaming_videos");
        assert_eq!(cfg.bg_music_dir, "assets/horror_music");
        assert_eq!(cfg.tts_lang, "ur");
        assert_eq!(cfg.daily_reels, 1);
        assert!(!cfg.use_openai_scripts());
    }

    #[test]
    fn openai_scripts_enabled_by_key() {
        let cfg: Config = serde_json::from_str(
            r#"{"youtube_creds": "{}", "openai_api_key": "sk-test", "daily_reels": 3}"#,
        )
        .unwrap();
        assert!(cfg.use_openai_scripts());
        assert_eq!(cfg.daily_reels, 3);
    }
}
