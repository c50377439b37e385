//! Server-sent event decoding for streamed chat completions.
//!
//! The general-knowledge backend answers with `data: {json}` lines, one
//! token delta each, terminated by `data: [DONE]`. [`SseDecoder`] turns raw
//! byte chunks (which may split lines or UTF-8 sequences anywhere) into
//! [`StreamEvent`]s; [`collect_text`] folds a channel of events into the
//! final answer.

use anyhow::{bail, Result};
use serde_json::Value;
use tokio::sync::mpsc;

/// One step of a token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Token(String),
    Done,
    Failed(String),
}

/// Incremental line-oriented SSE decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk, returning the events completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = decode_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let line = std::mem::take(&mut self.buffer);
        decode_line(&line)
    }
}

fn decode_line(raw: &[u8]) -> Option<StreamEvent> {
    let line = String::from_utf8_lossy(raw);
    let data = line.trim().strip_prefix("data:")?.trim();

    if data == "[DONE]" {
        return Some(StreamEvent::Done);
    }

    let json: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "skipping malformed stream chunk");
            return None;
        }
    };

    if let Some(err) = json.get("error") {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Some(StreamEvent::Failed(message));
    }

    json["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|t| !t.is_empty())
        .map(|t| StreamEvent::Token(t.to_string()))
}

/// Fold a token stream into one string.
///
/// A `Failed` event aborts with an error even if tokens arrived, so callers
/// never show a half-written answer. A stream that closes without `[DONE]`
/// keeps what it received, unless that is nothing.
pub async fn collect_text(mut rx: mpsc::Receiver<StreamEvent>) -> Result<String> {
    let mut text = String::new();
    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::Token(t) => text.push_str(&t),
            StreamEvent::Done => return Ok(text),
            StreamEvent::Failed(e) => bail!("stream failed: {}", e),
        }
    }
    if text.is_empty() {
        bail!("stream closed before any content arrived");
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(token: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({ "choices": [{ "delta": { "content": token } }] })
        )
    }

    #[test]
    fn test_decodes_tokens_and_done() {
        let mut decoder = SseDecoder::new();
        let body = format!("{}{}data: [DONE]\n\n", delta("Kali"), delta("mera"));
        let events = decoder.push(body.as_bytes());
        assert_eq!(
            events,
            vec![
                StreamEvent::Token("Kali".into()),
                StreamEvent::Token("mera".into()),
                StreamEvent::Done
            ]
        );
    }

    #[test]
    fn test_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let body = delta("Σίφνος");
        let bytes = body.as_bytes();
        // split inside the multi-byte sigma
        let cut = body.find('Σ').unwrap() + 1;
        assert!(decoder.push(&bytes[..cut]).is_empty());
        assert_eq!(
            decoder.push(&bytes[cut..]),
            vec![StreamEvent::Token("Σίφνος".into())]
        );
    }

    #[test]
    fn test_malformed_chunk_skipped() {
        let mut decoder = SseDecoder::new();
        let body = format!("data: {{not json\n{}: keep-alive\nevent: ping\n{}", delta("a"), delta("b"));
        assert_eq!(
            decoder.push(body.as_bytes()),
            vec![StreamEvent::Token("a".into()), StreamEvent::Token("b".into())]
        );
    }

    #[test]
    fn test_role_only_delta_ignored() {
        let mut decoder = SseDecoder::new();
        let line = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n";
        assert!(decoder.push(line.as_bytes()).is_empty());
    }

    #[test]
    fn test_error_payload() {
        let mut decoder = SseDecoder::new();
        let line = "data: {\"error\":{\"message\":\"rate limited\"}}\n";
        assert_eq!(
            decoder.push(line.as_bytes()),
            vec![StreamEvent::Failed("rate limited".into())]
        );
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: [DONE]").is_empty());
        assert_eq!(decoder.finish(), Some(StreamEvent::Done));
        assert_eq!(decoder.finish(), None);
    }

    #[tokio::test]
    async fn test_collect_text() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Token("Hello ".into())).await.unwrap();
        tx.send(StreamEvent::Token("Sifnos".into())).await.unwrap();
        tx.send(StreamEvent::Done).await.unwrap();
        tx.send(StreamEvent::Token("ignored".into())).await.unwrap();
        assert_eq!(collect_text(rx).await.unwrap(), "Hello Sifnos");
    }

    #[tokio::test]
    async fn test_collect_text_failure_discards_partial() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Token("Half an ans".into())).await.unwrap();
        tx.send(StreamEvent::Failed("connection reset".into())).await.unwrap();
        let err = collect_text(rx).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_collect_text_closed_channel() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Token("partial".into())).await.unwrap();
        drop(tx);
        assert_eq!(collect_text(rx).await.unwrap(), "partial");

        let (tx, rx) = mpsc::channel::<StreamEvent>(1);
        drop(tx);
        assert!(collect_text(rx).await.is_err());
    }
}
