use crate::api::{tts, youtube};
use crate::assets;
use crate::composer::{self, ComposeError, ComposeSettings, RenderArtifact};
use crate::config::Config;
use crate::init;
use crate::script::{OpenAiScripts, PredefinedScripts, ScriptProvider};
use crate::{logi, logok, logw};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::ffi::OsStr;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

fn now_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn short_name(path: &Path) -> &str {
    path.file_name().and_then(OsStr::to_str).unwrap_or("?")
}

async fn create_reel(
    cfg: &Config,
    client: &reqwest::Client,
    rng: &mut StdRng,
    narration: &str,
    part_num: u32,
    settings: &ComposeSettings,
) -> Result<RenderArtifact, ComposeError> {
    logi(format!("Creating reel {}...", part_num));

    // asset selection fails fast, before any synthesis call
    let bg_video = assets::pick_random(
        Path::new(&cfg.bg_videos_dir),
        assets::VIDEO_EXTENSIONS,
        rng,
    )?;
    let bg_music = assets::pick_random(
        Path::new(&cfg.bg_music_dir),
        assets::MUSIC_EXTENSIONS,
        rng,
    )?;
    logi(format!(
        "Using video: {}, music: {}",
        short_name(&bg_video),
        short_name(&bg_music)
    ));

    // voice scratch is dropped on every exit path, taking the file with it
    let voice_scratch = tempfile::tempdir().map_err(|e| ComposeError::MediaProcessing {
        stage: "scratch setup",
        cause: e.into(),
    })?;
    let voice_path =
        tts::synthesize_voice(client, narration, &cfg.tts_lang, voice_scratch.path()).await?;

    composer::compose(&voice_path, &bg_video, &bg_music, part_num, settings).await
}

fn log_compose_failure(part_num: u32, err: &ComposeError) {
    match err {
        ComposeError::NoAssetAvailable { dir } => {
            logw(format!("Skipping reel {}: no assets in {}", part_num, dir.display()));
        }
        ComposeError::VoiceSynthesis { reason } => {
            logw(format!("Skipping reel {}: voice synthesis failed: {}", part_num, reason));
        }
        ComposeError::VoiceDecode { path, .. } => {
            logw(format!(
                "Skipping reel {}: voice file unreadable: {}",
                part_num,
                path.display()
            ));
        }
        ComposeError::InsufficientVideoDuration { actual, target } => {
            logw(format!(
                "Skipping reel {}: background video is {:.2}s, need at least {:.2}s",
                part_num, actual, target
            ));
        }
        ComposeError::MediaProcessing { stage, cause } => {
            logw(format!(
                "Skipping reel {}: {} failed: {}",
                part_num, stage, cause
            ));
        }
    }
}

pub async fn run_generation() -> Result<i32> {
    let cfg = Config::load("config.json").await?;
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .context("Failed to build HTTP client")?;

    init::ensure_directories(&cfg).await?;

    logi(format!(
        "Run started {} ({} reel(s) planned)",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        cfg.daily_reels
    ));

    let mut provider: Box<dyn ScriptProvider> = if cfg.use_openai_scripts() {
        Box::new(OpenAiScripts::new(client.clone(), cfg.clone()))
    } else {
        logi("No OpenAI key configured; using predefined scripts.".to_string());
        Box::new(PredefinedScripts::new(StdRng::seed_from_u64(now_seed())))
    };

    let mut rng = StdRng::seed_from_u64(now_seed());
    let settings = ComposeSettings::default();

    let mut published = 0;
    for part in 1..=cfg.daily_reels {
        logi(format!("--- Processing reel {}/{} ---", part, cfg.daily_reels));

        let narration = match provider.narration().await {
            Ok(text) => text,
            Err(err) => {
                logw(format!("Skipping reel {}: script generation failed: {:#}", part, err));
                continue;
            }
        };

        let artifact = match create_reel(&cfg, &client, &mut rng, &narration, part, &settings).await
        {
            Ok(artifact) => artifact,
            Err(err) => {
                log_compose_failure(part, &err);
                continue;
            }
        };

        match youtube::upload_reel(&client, &cfg, &artifact.path, part).await {
            Ok(Some(id)) => {
                logok(format!("Published Part {}: {}", part, id));
                published += 1;
            }
            Ok(None) => logw(format!("Upload failed for Part {}", part)),
            Err(err) => logw(format!("Upload error for Part {}: {:#}", part, err)),
        }

        // artifact is consumed once handed to the uploader
        let _ = fs::remove_file(&artifact.path).await;
    }

    logi(format!("All done. Published: {}", published));
    Ok(published)
}
