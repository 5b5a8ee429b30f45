//! `ciclo-mentor` — streamed mentor chat client.
//!
//! The mentor receives the conversation history plus a metadata-only
//! context block (identity, recent confession labels, goal percentages,
//! a stats one-liner) and streams its reply back chunk by chunk:
//!
//! ```text
//! build_context(identity, confessions, goals, stats)
//!     │
//!     ▼
//! MentorClient::send   ← POST streamGenerateContent?alt=sse
//!     │
//!     ▼
//! ChatStream           ← implements futures::Stream<Item = String>
//! ```
//!
//! Failures are conversation content: the stream yields a single in-band
//! error chunk and ends, so the UI appends it like any other reply.

pub mod context;
pub mod error;
pub mod stream;
pub mod types;

pub use context::{build_context, COACH_SYSTEM_INSTRUCTION};
pub use error::MentorError;
pub use stream::ChatStream;
pub use types::{ChatTurn, MentorConfig, Role};

// ─── MentorClient ─────────────────────────────────────────────────────────

/// Client for the mentor completion service.
#[derive(Debug, Clone)]
pub struct MentorClient {
    http: reqwest::Client,
    cfg: MentorConfig,
}

impl MentorClient {
    pub fn new(cfg: MentorConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            cfg,
        }
    }

    /// Send one user message with its conversation history and context
    /// block. Returns a [`ChatStream`] of reply chunks.
    pub fn send(&self, user_message: &str, history: &[ChatTurn], context: &str) -> ChatStream {
        let payload = build_payload(user_message, history, context);
        ChatStream::new(self.http.clone(), self.cfg.clone(), payload)
    }
}

/// Assemble the completion request: context priming exchange, prior
/// turns, then the new user message.
fn build_payload(
    user_message: &str,
    history: &[ChatTurn],
    context: &str,
) -> serde_json::Value {
    let mut contents = Vec::with_capacity(history.len() + 3);
    contents.push(turn(
        Role::User,
        &format!("INICIALIZANDO CONTEXTO SEGURO: {context}"),
    ));
    contents.push(turn(
        Role::Model,
        "Terminal activa. Historial del operador cargado.",
    ));
    for t in history {
        contents.push(turn(t.role, &t.text));
    }
    contents.push(turn(Role::User, user_message));

    serde_json::json!({
        "contents": contents,
        "systemInstruction": { "parts": [{ "text": COACH_SYSTEM_INSTRUCTION }] },
        "generationConfig": { "temperature": 0.7, "topP": 0.9 },
    })
}

fn turn(role: Role, text: &str) -> serde_json::Value {
    serde_json::json!({ "role": role.as_str(), "parts": [{ "text": text }] })
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_orders_context_history_message() {
        let history = vec![
            ChatTurn::user("no puedo más"),
            ChatTurn::model("¿Qué estás evitando hoy?"),
        ];
        let payload = build_payload("tengo miedo", &history, "[OPERADOR_ID]: Ana");
        let contents = payload["contents"].as_array().unwrap();

        assert_eq!(contents.len(), 5);
        assert!(contents[0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("INICIALIZANDO CONTEXTO SEGURO"));
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "no puedo más");
        assert_eq!(contents[4]["parts"][0]["text"], "tengo miedo");
    }

    #[test]
    fn payload_carries_persona_and_sampling() {
        let payload = build_payload("hola", &[], "ctx");
        assert!(payload["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Rompe el Ciclo"));
        assert_eq!(payload["generationConfig"]["temperature"], 0.7);
        assert_eq!(payload["generationConfig"]["topP"], 0.9);
    }
}
