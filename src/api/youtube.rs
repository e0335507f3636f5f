use crate::config::Config;
use crate::{logok, logw};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tokio::fs;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_URL: &str =
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=multipart&part=snippet,status";
const FALLBACK_HASHTAGS: &str = "#Horror #Story #Shorts #RomanUrdu #Scary";

#[derive(Debug, Deserialize)]
struct AuthorizedUser {
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub(crate) fn reel_title(part_num: u32) -> String {
    format!("Horror Part {} | Roman Urdu", part_num)
}

async fn refresh_access_token(client: &Client, creds_json: &str) -> Result<String> {
    let creds: AuthorizedUser = serde_json::from_str(creds_json)
        .context("youtube_creds is not valid authorized-user JSON")?;

    let resp = client
        .post(TOKEN_URL)
        .form(&[
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("refresh_token", creds.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ])
        .timeout(std::time::Duration::from_secs(60))
        .send()
        .await
        .context("token refresh request failed")?;

    if !resp.status().is_success() {
        anyhow::bail!("token refresh HTTP {}", resp.status().as_u16());
    }

    let token: TokenResponse = resp.json().await.context("token response parse failed")?;
    Ok(token.access_token)
}

async fn read_hashtags() -> String {
    match fs::read_to_string("hashtags.txt").await {
        Ok(text) if !text.trim().is_empty() => text,
        _ => FALLBACK_HASHTAGS.to_string(),
    }
}

pub async fn upload_reel(
    client: &Client,
    cfg: &Config,
    video_path: &Path,
    part_num: u32,
) -> Result<Option<String>> {
    if fs::metadata(video_path).await.is_err() {
        logw(format!("Video file missing: {}", video_path.display()));
        return Ok(None);
    }

    let token = refresh_access_token(client, &cfg.youtube_creds).await?;
    let description = read_hashtags().await;

    let metadata = json!({
        "snippet": {
            "title": reel_title(part_num),
            "description": description,
            "categoryId": "24",
            "tags": ["horror", "story", "shorts", "roman urdu", "scary"],
        },
        "status": {"privacyStatus": "public"},
    });

    let video_bytes = fs::read(video_path)
        .await
        .with_context(|| format!("Failed to read {}", video_path.display()))?;

    let file_name = video_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("reel.mp4")
        .to_string();

    let form = reqwest::multipart::Form::new()
        .part(
            "metadata",
            reqwest::multipart::Part::text(metadata.to_string())
                .mime_str("application/json")
                .context("metadata part failed")?,
        )
        .part(
            "media",
            reqwest::multipart::Part::bytes(video_bytes)
                .file_name(file_name)
                .mime_str("video/mp4")
                .context("media part failed")?,
        );

    let resp = client
        .post(UPLOAD_URL)
        .bearer_auth(&token)
        .multipart(form)
        .timeout(std::time::Duration::from_secs(600))
        .send()
        .await
        .context("upload request failed")?;

    let status = resp.status();
    let raw = resp.text().await.unwrap_or_default();

    if !status.is_success() {
        logw(format!("YouTube upload HTTP {}", status.as_u16()));
        if !raw.is_empty() {
            let snippet = raw.chars().take(800).collect::<String>();
            logw(format!("YouTube raw body: {}", snippet));
        }
        return Ok(None);
    }

    let root: serde_json::Value = serde_json::from_str(&raw).unwrap_or_default();
    match root.get("id").and_then(|v| v.as_str()) {
        Some(id) => {
            logok(format!("Upload successful! Video ID: {}", id));
            Ok(Some(id.to_string()))
        }
        None => {
            logw("Upload response had no video id.".to_string());
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_carries_the_part_number() {
        assert_eq!(reel_title(3), "Horror Part 3 | Roman Urdu");
    }

    #[test]
    fn authorized_user_json_parses() {
        let creds: AuthorizedUser = serde_json::from_str(
            r#"{"client_id":"id","client_secret":"secret","refresh_token":"tok","type":"authorized_user"}"#,
        )
        .unwrap();
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.refresh_token, "tok");
    }
}
