//! OpenAI-compatible speech synthesis adapter.
//!
//! Targets the `/audio/speech` endpoint shape (OpenAI and compatible
//! gateways): POST `{model, input, voice, response_format}` → raw audio
//! bytes in the response body, content type carried in the response's
//! `Content-Type` header.

use crate::traits::{TtsRenderer, TtsRequest, TtsResponse};
use hg_domain::error::{Error, Result};

pub struct OpenAiCompatTts {
    base_url: String,
    api_key: String,
    default_voice: String,
    client: reqwest::Client,
}

impl OpenAiCompatTts {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, default_voice: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .map_err(Error::Http)?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            default_voice: default_voice.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl TtsRenderer for OpenAiCompatTts {
    async fn synthesize(&self, req: &TtsRequest) -> Result<TtsResponse> {
        let url = format!("{}/audio/speech", self.base_url);
        let voice = req.voice_id.as_deref().unwrap_or(&self.default_voice);
        let format = req.format.as_deref().unwrap_or("mp3");

        let body = serde_json::json!({
            "model": "tts-1",
            "input": req.text,
            "voice": voice,
            "response_format": format,
        });

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(Error::Internal(format!("tts provider: HTTP {} - {detail}", status.as_u16())));
        }

        let mime_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();
        let audio = resp.bytes().await.map_err(classify)?.to_vec();

        Ok(TtsResponse { audio, mime_type })
    }
}

fn classify(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructs_with_trimmed_base_url() {
        let tts = OpenAiCompatTts::new("https://api.openai.com/v1/", "key", "alloy").unwrap();
        assert_eq!(tts.base_url, "https://api.openai.com/v1");
    }
}
