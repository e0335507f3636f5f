use anyhow::{Context, Result};
use std::path::Path;
use tokio::process::Command;

async fn run_cmd(args: &[String]) -> Result<()> {
    if args.is_empty() {
        return Ok(());
    }

    let mut cmd = Command::new(&args[0]);
    if args.len() > 1 {
        cmd.args(&args[1..]);
    }

    let status = cmd.status().await.context("Command execution failed")?;
    if !status.success() {
        return Err(anyhow::anyhow!("Command failed: {:?}", args));
    }

    Ok(())
}

pub async fn ffprobe_duration_seconds(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .context("ffprobe duration failed")?;

    if !output.status.success() {
        return Err(anyhow::anyhow!("ffprobe failed"));
    }

    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let duration = text.parse::<f64>().unwrap_or(-1.0);
    if duration <= 0.0 {
        return Err(anyhow::anyhow!("Invalid duration"));
    }
    Ok(duration)
}

pub(crate) fn pad_audio_args(in_audio: &Path, pad_s: f64, total_s: f64, out_m4a: &Path) -> Vec<String> {
    vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        in_audio.display().to_string(),
        "-af".to_string(),
        format!("apad=pad_dur={:.3}", pad_s),
        "-t".to_string(),
        format!("{:.3}", total_s),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        out_m4a.display().to_string(),
    ]
}

pub(crate) fn trim_audio_args(in_audio: &Path, dur_s: f64, out_m4a: &Path) -> Vec<String> {
    vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        in_audio.display().to_string(),
        "-t".to_string(),
        format!("{:.3}", dur_s),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        out_m4a.display().to_string(),
    ]
}

pub(crate) fn loop_music_args(
    in_audio: &Path,
    extra_loops: u32,
    dur_s: f64,
    volume: f64,
    out_m4a: &Path,
) -> Vec<String> {
    vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-stream_loop".to_string(),
        extra_loops.to_string(),
        "-i".to_string(),
        in_audio.display().to_string(),
        "-t".to_string(),
        format!("{:.3}", dur_s),
        "-af".to_string(),
        format!("volume={:.2}", volume),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        out_m4a.display().to_string(),
    ]
}

pub(crate) fn cut_video_args(in_mp4: &Path, dur_s: f64, out_mp4: &Path) -> Vec<String> {
    vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        in_mp4.display().to_string(),
        "-t".to_string(),
        format!("{:.3}", dur_s),
        "-an".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        out_mp4.display().to_string(),
    ]
}

pub(crate) fn mix_tracks_args(voice_in: &Path, music_in: &Path, out_m4a: &Path) -> Vec<String> {
    vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        voice_in.display().to_string(),
        "-i".to_string(),
        music_in.display().to_string(),
        "-filter_complex".to_string(),
        "[0:a][1:a]amix=inputs=2:duration=first:dropout_transition=2[a]".to_string(),
        "-map".to_string(),
        "[a]".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        out_m4a.display().to_string(),
    ]
}

pub(crate) fn export_reel_args(
    video_in: &Path,
    audio_in: &Path,
    dur_s: f64,
    fps: u32,
    threads: u32,
    out_mp4: &Path,
) -> Vec<String> {
    vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        video_in.display().to_string(),
        "-i".to_string(),
        audio_in.display().to_string(),
        "-map".to_string(),
        "0:v".to_string(),
        "-map".to_string(),
        "1:a".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-crf".to_string(),
        "22".to_string(),
        "-r".to_string(),
        fps.to_string(),
        "-threads".to_string(),
        threads.to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        "-t".to_string(),
        format!("{:.3}", dur_s),
        "-movflags".to_string(),
        "+faststart".to_string(),
        out_mp4.display().to_string(),
    ]
}

pub(crate) fn concat_audio_args(list_txt: &Path, out_audio: &Path) -> Vec<String> {
    vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        list_txt.display().to_string(),
        "-c".to_string(),
        "copy".to_string(),
        out_audio.display().to_string(),
    ]
}

pub async fn ffmpeg_pad_audio(in_audio: &Path, pad_s: f64, total_s: f64, out_m4a: &Path) -> Result<bool> {
    run_cmd(&pad_audio_args(in_audio, pad_s, total_s, out_m4a)).await?;
    Ok(out_m4a.exists())
}

pub async fn ffmpeg_trim_audio(in_audio: &Path, dur_s: f64, out_m4a: &Path) -> Result<bool> {
    run_cmd(&trim_audio_args(in_audio, dur_s, out_m4a)).await?;
    Ok(out_m4a.exists())
}

pub async fn ffmpeg_loop_music(
    in_audio: &Path,
    extra_loops: u32,
    dur_s: f64,
    volume: f64,
    out_m4a: &Path,
) -> Result<bool> {
    run_cmd(&loop_music_args(in_audio, extra_loops, dur_s, volume, out_m4a)).await?;
    Ok(out_m4a.exists())
}

pub async fn ffmpeg_cut_video(in_mp4: &Path, dur_s: f64, out_mp4: &Path) -> Result<bool> {
    run_cmd(&cut_video_args(in_mp4, dur_s, out_mp4)).await?;
    Ok(out_mp4.exists())
}

pub async fn ffmpeg_mix_tracks(voice_in: &Path, music_in: &Path, out_m4a: &Path) -> Result<bool> {
    run_cmd(&mix_tracks_args(voice_in, music_in, out_m4a)).await?;
    Ok(out_m4a.exists())
}

pub async fn ffmpeg_export_reel(
    video_in: &Path,
    audio_in: &Path,
    dur_s: f64,
    fps: u32,
    threads: u32,
    out_mp4: &Path,
) -> Result<bool> {
    run_cmd(&export_reel_args(video_in, audio_in, dur_s, fps, threads, out_mp4)).await?;
    Ok(out_mp4.exists())
}

pub async fn ffmpeg_concat_audio(list_txt: &Path, out_audio: &Path) -> Result<bool> {
    run_cmd(&concat_audio_args(list_txt, out_audio)).await?;
    Ok(out_audio.exists())
}
