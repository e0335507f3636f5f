use crate::ffmpeg;
use crate::{logi, logok};
use anyhow::Result;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("no usable assets in {}", .dir.display())]
    NoAssetAvailable { dir: PathBuf },
    #[error("voice synthesis failed: {reason}")]
    VoiceSynthesis { reason: String },
    #[error("voice decode failed for {}: {}", .path.display(), .cause)]
    VoiceDecode { path: PathBuf, cause: anyhow::Error },
    #[error("video is {actual:.2}s, shorter than the {target:.2}s target")]
    InsufficientVideoDuration { actual: f64, target: f64 },
    #[error("{stage} failed: {cause}")]
    MediaProcessing {
        stage: &'static str,
        cause: anyhow::Error,
    },
}

#[derive(Debug, Clone)]
pub struct MediaClip {
    pub path: PathBuf,
    pub duration: f64,
}

impl MediaClip {
    pub async fn probe(path: &Path) -> Result<Self> {
        let duration = ffmpeg::ffprobe_duration_seconds(path).await?;
        Ok(Self {
            path: path.to_path_buf(),
            duration,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VoiceOp {
    Pad { silence: f64 },
    Truncate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MusicOp {
    pub extra_loops: u32,
    pub gain: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan {
    pub voice: VoiceOp,
    pub music: MusicOp,
    pub target: f64,
}

#[derive(Debug, Clone)]
pub struct ComposeSettings {
    pub target_duration: f64,
    pub music_volume: f64,
    pub fps: u32,
    pub encode_threads: u32,
    pub output_dir: PathBuf,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            target_duration: 60.0,
            music_volume: 0.3,
            fps: 24,
            encode_threads: 4,
            output_dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderArtifact {
    pub path: PathBuf,
    pub part_num: u32,
    pub duration: f64,
}

pub fn plan_composition(
    voice: &MediaClip,
    music: &MediaClip,
    video: &MediaClip,
    settings: &ComposeSettings,
) -> Result<CompositionPlan, ComposeError> {
    let target = settings.target_duration;

    if video.duration < target {
        return Err(ComposeError::InsufficientVideoDuration {
            actual: video.duration,
            target,
        });
    }

    let voice_op = if voice.duration < target {
        VoiceOp::Pad {
            silence: target - voice.duration,
        }
    } else {
        VoiceOp::Truncate
    };

    // total copies = floor(target / m) + 1, the first play counts as one
    let extra_loops = if music.duration < target {
        (target / music.duration).floor() as u32
    } else {
        0
    };

    Ok(CompositionPlan {
        voice: voice_op,
        music: MusicOp {
            extra_loops,
            gain: settings.music_volume,
        },
        target,
    })
}

fn stage_error(stage: &'static str, result: Result<bool>) -> Result<(), ComposeError> {
    match result {
        Ok(true) => Ok(()),
        Ok(false) => Err(ComposeError::MediaProcessing {
            stage,
            cause: anyhow::anyhow!("output file was not produced"),
        }),
        Err(cause) => Err(ComposeError::MediaProcessing { stage, cause }),
    }
}

pub async fn compose(
    voice_path: &Path,
    video_path: &Path,
    music_path: &Path,
    part_num: u32,
    settings: &ComposeSettings,
) -> Result<RenderArtifact, ComposeError> {
    // scratch dir is unique per invocation and removed on every exit path
    let scratch = tempfile::tempdir().map_err(|e| ComposeError::MediaProcessing {
        stage: "scratch setup",
        cause: e.into(),
    })?;

    let voice = MediaClip::probe(voice_path)
        .await
        .map_err(|cause| ComposeError::VoiceDecode {
            path: voice_path.to_path_buf(),
            cause,
        })?;
    let music = MediaClip::probe(music_path)
        .await
        .map_err(|cause| ComposeError::MediaProcessing {
            stage: "music decode",
            cause,
        })?;
    let video = MediaClip::probe(video_path)
        .await
        .map_err(|cause| ComposeError::MediaProcessing {
            stage: "video decode",
            cause,
        })?;

    let plan = plan_composition(&voice, &music, &video, settings)?;
    logi(format!(
        "Voice duration: {:.2}s (target {:.2}s)",
        voice.duration, plan.target
    ));

    let voice_norm = scratch.path().join("voice_norm.m4a");
    let result = match plan.voice {
        VoiceOp::Pad { silence } => {
            logi(format!("Extending voice with {:.2}s of silence", silence));
            ffmpeg::ffmpeg_pad_audio(&voice.path, silence, plan.target, &voice_norm).await
        }
        VoiceOp::Truncate => {
            logi(format!(
                "Trimming voice from {:.2}s to {:.2}s",
                voice.duration, plan.target
            ));
            ffmpeg::ffmpeg_trim_audio(&voice.path, plan.target, &voice_norm).await
        }
    };
    stage_error("voice normalize", result)?;

    if plan.music.extra_loops > 0 {
        logi(format!(
            "Looping music ({:.2}s) {} extra time(s) to cover {:.2}s",
            music.duration, plan.music.extra_loops, plan.target
        ));
    }
    let music_norm = scratch.path().join("music_norm.m4a");
    let result = ffmpeg::ffmpeg_loop_music(
        &music.path,
        plan.music.extra_loops,
        plan.target,
        plan.music.gain,
        &music_norm,
    )
    .await;
    stage_error("music normalize", result)?;

    let video_cut = scratch.path().join("video_cut.mp4");
    let result = ffmpeg::ffmpeg_cut_video(&video.path, plan.target, &video_cut).await;
    stage_error("video trim", result)?;

    let mix = scratch.path().join("mix.m4a");
    let result = ffmpeg::ffmpeg_mix_tracks(&voice_norm, &music_norm, &mix).await;
    stage_error("audio mix", result)?;

    let out_mp4 = settings.output_dir.join(format!("reel_{}.mp4", part_num));
    logi(format!("Writing reel: {}", out_mp4.display()));
    let result = ffmpeg::ffmpeg_export_reel(
        &video_cut,
        &mix,
        plan.target,
        settings.fps,
        settings.encode_threads,
        &out_mp4,
    )
    .await;
    if let Err(err) = stage_error("export", result) {
        // never leave a partial file behind
        let _ = tokio::fs::remove_file(&out_mp4).await;
        return Err(err);
    }

    if let Ok(final_dur) = ffmpeg::ffprobe_duration_seconds(&out_mp4).await {
        logok(format!("Rendered {} ({:.2}s)", out_mp4.display(), final_dur));
    }

    Ok(RenderArtifact {
        path: out_mp4,
        part_num,
        duration: plan.target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(duration: f64) -> MediaClip {
        MediaClip {
            path: PathBuf::from("clip"),
            duration,
        }
    }

    fn settings() -> ComposeSettings {
        ComposeSettings::default()
    }

    #[test]
    fn short_voice_is_padded_with_the_missing_seconds() {
        let plan = plan_composition(&clip(10.0), &clip(70.0), &clip(90.0), &settings()).unwrap();
        assert_eq!(plan.voice, VoiceOp::Pad { silence: 50.0 });
    }

    #[test]
    fn long_voice_is_truncated() {
        let plan = plan_composition(&clip(75.0), &clip(70.0), &clip(90.0), &settings()).unwrap();
        assert_eq!(plan.voice, VoiceOp::Truncate);
    }

    #[test]
    fn exact_voice_is_neither_padded_nor_double_trimmed() {
        let plan = plan_composition(&clip(60.0), &clip(70.0), &clip(90.0), &settings()).unwrap();
        // trimming an exactly-sized clip to the same bound is the identity
        assert_eq!(plan.voice, VoiceOp::Truncate);
    }

    #[test]
    fn short_music_gets_enough_copies_to_cover_target() {
        let plan = plan_composition(&clip(10.0), &clip(25.0), &clip(90.0), &settings()).unwrap();
        // 1 + 2 extra copies = 75s of material before the trim to 60s
        assert_eq!(plan.music.extra_loops, 2);
        let total = 25.0 * f64::from(plan.music.extra_loops + 1);
        assert!(total >= plan.target);
    }

    #[test]
    fn exact_music_is_not_looped() {
        let plan = plan_composition(&clip(10.0), &clip(60.0), &clip(90.0), &settings()).unwrap();
        assert_eq!(plan.music.extra_loops, 0);
    }

    #[test]
    fn music_divisor_of_target_still_covers() {
        // 20s track: floor(60/20) = 3 extras, 80s of material
        let plan = plan_composition(&clip(10.0), &clip(20.0), &clip(90.0), &settings()).unwrap();
        assert_eq!(plan.music.extra_loops, 3);
    }

    #[test]
    fn music_gain_comes_from_settings() {
        let mut s = settings();
        s.music_volume = 0.5;
        let plan = plan_composition(&clip(10.0), &clip(70.0), &clip(90.0), &s).unwrap();
        assert_eq!(plan.music.gain, 0.5);
    }

    #[test]
    fn short_video_is_rejected() {
        let err = plan_composition(&clip(10.0), &clip(70.0), &clip(45.0), &settings()).unwrap_err();
        match err {
            ComposeError::InsufficientVideoDuration { actual, target } => {
                assert_eq!(actual, 45.0);
                assert_eq!(target, 60.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn scenario_padded_voice_looped_music() {
        // voice 10s, music 25s, video 90s, target 60s
        let plan = plan_composition(&clip(10.0), &clip(25.0), &clip(90.0), &settings()).unwrap();
        assert_eq!(plan.voice, VoiceOp::Pad { silence: 50.0 });
        assert_eq!(plan.music.extra_loops, 2);
        assert_eq!(plan.target, 60.0);
    }

    #[test]
    fn scenario_trimmed_voice_exact_music() {
        // voice 75s, music 60s, video 60s, target 60s
        let plan = plan_composition(&clip(75.0), &clip(60.0), &clip(60.0), &settings()).unwrap();
        assert_eq!(plan.voice, VoiceOp::Truncate);
        assert_eq!(plan.music.extra_loops, 0);
    }
}
