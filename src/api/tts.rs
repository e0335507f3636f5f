use crate::composer::ComposeError;
use crate::ffmpeg;
use crate::logi;
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

const TTS_URL: &str = "https://translate.google.com/translate_tts";
const MAX_CHUNK_CHARS: usize = 180;
const FETCH_ATTEMPTS: u32 = 2;
const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";

fn synthesis_error(reason: impl Into<String>) -> ComposeError {
    ComposeError::VoiceSynthesis {
        reason: reason.into(),
    }
}

fn sentence_regex() -> Result<&'static Regex> {
    static SENTENCE_RE: OnceCell<Regex> = OnceCell::new();
    SENTENCE_RE.get_or_try_init(|| {
        Regex::new(r"(?s)([^.!?]+[.!?]+)|([^.!?]+$)")
            .context("failed to compile sentence regex")
    })
}

pub(crate) fn chunk_narration(text: &str, max_chars: usize) -> Result<Vec<String>, ComposeError> {
    let re = sentence_regex().map_err(|e| synthesis_error(format!("{e:#}")))?;
    let mut sentences = Vec::new();
    for cap in re.captures_iter(text) {
        let s = cap.get(0).map(|m| m.as_str().trim()).unwrap_or("");
        if !s.is_empty() {
            sentences.push(s.to_string());
        }
    }
    if sentences.is_empty() {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![trimmed.to_string()]);
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for s in sentences {
        if current.is_empty() {
            current.push_str(&s);
        } else if current.chars().count() + 1 + s.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(&s);
        } else {
            chunks.push(current);
            current = s;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    Ok(chunks)
}

async fn fetch_tts_chunk(
    client: &Client,
    text: &str,
    lang: &str,
    out_mp3: &Path,
) -> Result<(), ComposeError> {
    let mut last_err = synthesis_error("no fetch attempted");
    for attempt in 1..=FETCH_ATTEMPTS {
        match fetch_tts_chunk_once(client, text, lang, out_mp3).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                if attempt < FETCH_ATTEMPTS {
                    warn!("TTS chunk fetch failed ({err}), retrying");
                }
                last_err = err;
            }
        }
    }
    Err(last_err)
}

async fn fetch_tts_chunk_once(
    client: &Client,
    text: &str,
    lang: &str,
    out_mp3: &Path,
) -> Result<(), ComposeError> {
    let resp = client
        .get(TTS_URL)
        .query(&[("ie", "UTF-8"), ("client", "tw-ob"), ("tl", lang), ("q", text)])
        .header("User-Agent", USER_AGENT)
        .timeout(std::time::Duration::from_secs(60))
        .send()
        .await
        .map_err(|e| synthesis_error(format!("request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(synthesis_error(format!("HTTP {}", resp.status().as_u16())));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| synthesis_error(format!("response read failed: {e}")))?;
    if bytes.is_empty() {
        return Err(synthesis_error("empty audio response"));
    }

    fs::write(out_mp3, &bytes)
        .await
        .map_err(|e| synthesis_error(format!("write failed: {e}")))?;
    Ok(())
}

pub async fn synthesize_voice(
    client: &Client,
    text: &str,
    lang: &str,
    scratch: &Path,
) -> Result<PathBuf, ComposeError> {
    let chunks = chunk_narration(text, MAX_CHUNK_CHARS)?;
    if chunks.is_empty() {
        return Err(synthesis_error("empty narration"));
    }

    logi(format!(
        "Synthesizing voice ({} chunk(s), lang={})",
        chunks.len(),
        lang
    ));

    let mut parts = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let part = scratch.join(format!("voice_part_{}.mp3", i + 1));
        fetch_tts_chunk(client, chunk, lang, &part).await?;
        parts.push(part);
    }

    if parts.len() == 1 {
        return Ok(parts.remove(0));
    }

    let list_txt = scratch.join("voice_parts.txt");
    let mut listf = fs::File::create(&list_txt)
        .await
        .map_err(|e| synthesis_error(format!("concat list failed: {e}")))?;
    for part in &parts {
        let name = part
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| synthesis_error("bad part filename"))?;
        listf
            .write_all(format!("file '{}'\n", name).as_bytes())
            .await
            .map_err(|e| synthesis_error(format!("concat list failed: {e}")))?;
    }
    listf
        .flush()
        .await
        .map_err(|e| synthesis_error(format!("concat list failed: {e}")))?;

    let voice_mp3 = scratch.join("voice.mp3");
    match ffmpeg::ffmpeg_concat_audio(&list_txt, &voice_mp3).await {
        Ok(true) => Ok(voice_mp3),
        Ok(false) => Err(synthesis_error("chunk concat produced no file")),
        Err(e) => Err(synthesis_error(format!("chunk concat failed: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_narration("Raat andheri thi. Sab so gaye.", 180).unwrap();
        assert_eq!(chunks, vec!["Raat andheri thi. Sab so gaye.".to_string()]);
    }

    #[test]
    fn long_text_splits_on_sentences_in_order() {
        let text = "Pehla jumla hai. Doosra jumla hai! Teesra jumla hai? Chautha jumla hai.";
        let chunks = chunk_narration(text, 40).unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 40, "oversized chunk: {chunk}");
        }
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn text_without_punctuation_still_chunks() {
        let chunks = chunk_narration("ek do teen chaar", 180).unwrap();
        assert_eq!(chunks, vec!["ek do teen chaar".to_string()]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_narration("   ", 180).unwrap().is_empty());
    }
}
