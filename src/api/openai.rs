use crate::config::Config;
use crate::{logi, logw};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::json;

const NARRATION_PROMPT: &str = "Write a short horror story narration in Roman Urdu (Urdu in Latin letters).\n- It should take about 55 seconds to read aloud at a normal pace.\n- Simple spoken language, present-day setting, one chilling twist at the end.\n- Finish with exactly: Part 2 ke liye follow karo!\n- Return the narration text only: no title, no quotes, no hashtags.";

fn extract_output_text(resp_json: &str) -> Option<String> {
    let root: serde_json::Value = serde_json::from_str(resp_json).ok()?;

    if let Some(err) = root.get("error") {
        if let Some(msg) = err.get("message").and_then(|v| v.as_str()) {
            logw(format!("OpenAI error message: {}", msg));
        }
        if let Some(code) = err.get("code").and_then(|v| v.as_str()) {
            logw(format!("OpenAI error code: {}", code));
        }
        return None;
    }

    let output = root.get("output")?.as_array()?;
    for item in output {
        let content = item.get("content").and_then(|v| v.as_array());
        if let Some(content) = content {
            for entry in content {
                let typ = entry.get("type").and_then(|v| v.as_str());
                let text = entry.get("text").and_then(|v| v.as_str());
                if typ == Some("output_text") {
                    if let Some(text) = text {
                        return Some(text.to_string());
                    }
                }
            }
        }
    }

    None
}

pub async fn generate_narration(client: &Client, cfg: &Config) -> Result<Option<String>> {
    let body = json!({
        "model": cfg.openai_model,
        "input": [
            {"role": "system", "content": "You write narrations for short vertical videos."},
            {"role": "user", "content": NARRATION_PROMPT},
        ],
    });

    let resp = client
        .post("https://api.openai.com/v1/responses")
        .bearer_auth(&cfg.openai_key)
        .json(&body)
        .timeout(std::time::Duration::from_secs(300))
        .send()
        .await
        .context("OpenAI request failed")?;

    let status = resp.status();
    let raw = resp.text().await.unwrap_or_default();

    if !status.is_success() {
        logw(format!("OpenAI HTTP {}", status.as_u16()));
        if !raw.is_empty() {
            let snippet = raw.chars().take(800).collect::<String>();
            logw(format!("OpenAI raw body: {}", snippet));
        }
        return Ok(None);
    }

    match extract_output_text(&raw) {
        Some(text) => {
            logi(format!("Narration received ({} chars)", text.len()));
            Ok(Some(text))
        }
        None => {
            logw("OpenAI response parse failed.".to_string());
            if !raw.is_empty() {
                let snippet = raw.chars().take(800).collect::<String>();
                logw(format!("OpenAI raw body: {}", snippet));
            }
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_text_is_extracted_from_response_envelope() {
        let raw = r#"{"output":[{"content":[{"type":"output_text","text":"Raat andheri thi."}]}]}"#;
        assert_eq!(
            extract_output_text(raw),
            Some("Raat andheri thi.".to_string())
        );
    }

    #[test]
    fn error_envelope_yields_none() {
        let raw = r#"{"error":{"message":"bad request","code":"invalid_request"}}"#;
        assert_eq!(extract_output_text(raw), None);
    }

    #[test]
    fn non_text_content_is_skipped() {
        let raw = r#"{"output":[{"content":[{"type":"reasoning"},{"type":"output_text","text":"ok"}]}]}"#;
        assert_eq!(extract_output_text(raw), Some("ok".to_string()));
    }
}
