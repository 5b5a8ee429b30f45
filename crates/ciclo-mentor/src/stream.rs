use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::types::MentorConfig;

// ─── ChatStream ───────────────────────────────────────────────────────────

/// An async stream of mentor reply chunks.
///
/// Backed by a Tokio mpsc channel. A background task owns the HTTP
/// response and forwards text chunks as they arrive; the stream ends at
/// end-of-response. Transport and service errors surface as a single
/// in-band error chunk appended to the conversation — the stream itself
/// never yields `Err`, matching the contract that chat failures are
/// conversation content, not control flow.
pub struct ChatStream {
    rx: mpsc::Receiver<String>,
}

impl ChatStream {
    pub(crate) fn new(
        http: reqwest::Client,
        cfg: MentorConfig,
        payload: serde_json::Value,
    ) -> Self {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let resp = http
                .post(cfg.stream_url())
                .query(&[("key", cfg.api_key.as_str())])
                .json(&payload)
                .send()
                .await;

            let resp = match resp {
                Ok(r) => r,
                Err(e) => {
                    let _ = tx.send(in_band_error(&e.to_string())).await;
                    return;
                }
            };

            if !resp.status().is_success() {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                debug!(status, "mentor stream request rejected");
                let _ = tx.send(in_band_error(&format!("HTTP {status}: {body}"))).await;
                return;
            }

            let mut body = resp.bytes_stream();
            let mut buf = String::new();
            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.send(in_band_error(&e.to_string())).await;
                        return;
                    }
                };
                buf.push_str(&String::from_utf8_lossy(&chunk));

                // Process complete lines; keep the partial tail buffered.
                while let Some(pos) = buf.find('\n') {
                    let line = buf[..pos].to_string();
                    buf.drain(..=pos);
                    if let Some(text) = chunk_text(&line) {
                        if tx.send(text).await.is_err() {
                            return; // Receiver dropped
                        }
                    }
                }
            }
            if let Some(text) = chunk_text(buf.trim_end()) {
                let _ = tx.send(text).await;
            }
        });

        ChatStream { rx }
    }

    /// Test-only constructor: wrap a raw receiver as a `ChatStream`.
    #[cfg(test)]
    pub(crate) fn from_channel(rx: mpsc::Receiver<String>) -> Self {
        Self { rx }
    }

    /// Drain the stream to completion and return the concatenated reply.
    pub async fn collect_text(mut self) -> String {
        let mut out = String::new();
        while let Some(chunk) = self.rx.recv().await {
            out.push_str(&chunk);
        }
        out
    }
}

impl Stream for ChatStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

// ─── SSE parsing ──────────────────────────────────────────────────────────

/// Extract the reply text carried by one SSE line, if any. Non-data
/// lines, keep-alives and the `[DONE]` marker yield nothing.
fn chunk_text(line: &str) -> Option<String> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(data).ok()?;
    let parts = value
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Format a transport/service failure as conversation content.
fn in_band_error(message: &str) -> String {
    format!("... [ERROR: {message}. Verifica tu conexión o API Key] ...")
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sse_line(text: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": text}]}}]
            })
        )
    }

    fn client_stream(url: String) -> ChatStream {
        let cfg = MentorConfig {
            api_key: "k".into(),
            model: "gemini-flash-latest".into(),
            base_url: url,
        };
        ChatStream::new(reqwest::Client::new(), cfg, serde_json::json!({}))
    }

    #[tokio::test]
    async fn chunks_arrive_in_order() {
        let mut server = mockito::Server::new_async().await;
        let body = format!("{}{}{}", sse_line("Mira, "), sse_line("te estás "), sse_line("mintiendo."));
        server
            .mock(
                "POST",
                "/models/gemini-flash-latest:streamGenerateContent",
            )
            .match_query(mockito::Matcher::Regex("alt=sse".into()))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let text = client_stream(server.url()).collect_text().await;
        assert_eq!(text, "Mira, te estás mintiendo.");
    }

    #[tokio::test]
    async fn service_error_is_single_in_band_chunk() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "POST",
                "/models/gemini-flash-latest:streamGenerateContent",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .with_body("quota exceeded")
            .create_async()
            .await;

        let chunks: Vec<String> = client_stream(server.url()).collect().await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].contains("[ERROR:"));
        assert!(chunks[0].contains("429"));
    }

    #[tokio::test]
    async fn connection_failure_is_in_band() {
        // Nothing listens here; the request errors fast.
        let text = client_stream("http://127.0.0.1:9".into()).collect_text().await;
        assert!(text.contains("[ERROR:"));
    }

    #[test]
    fn non_data_lines_are_skipped() {
        assert_eq!(chunk_text(""), None);
        assert_eq!(chunk_text(": keep-alive"), None);
        assert_eq!(chunk_text("data: [DONE]"), None);
        assert_eq!(chunk_text("data: not-json"), None);
    }

    #[test]
    fn multi_part_chunks_concatenate() {
        let line = format!(
            "data: {}",
            serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "a"}, {"text": "b"}]}}]
            })
        );
        assert_eq!(chunk_text(&line).as_deref(), Some("ab"));
    }

    #[tokio::test]
    async fn from_channel_passes_through() {
        let (tx, rx) = mpsc::channel(4);
        tx.send("hola".to_string()).await.unwrap();
        drop(tx);
        let text = ChatStream::from_channel(rx).collect_text().await;
        assert_eq!(text, "hola");
    }
}
