use ai_horror_reels::generator::run_generation;
use ai_horror_reels::init;
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    if !init::check_ffmpeg().await {
        eprintln!("[WARNING] FFmpeg not found in PATH. Please install FFmpeg.");
    }

    let code = run_generation().await?;
    std::process::exit(code);
}
