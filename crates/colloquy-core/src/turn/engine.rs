//! Conversation turn engine.
//!
//! Given a scenario, the prior transcript, and a new participant
//! utterance, obtains the character's next line from the language model.
//! Stateless: it neither reads nor writes the store -- the caller persists
//! the new turns afterward through the session service.

use std::sync::Arc;

use colloquy_types::llm::{ChatMessage, ChatRole, CompletionRequest, LlmError};
use colloquy_types::scenario::Scenario;
use colloquy_types::session::{MessageRole, TranscriptMessage};

use crate::llm::provider::LlmProvider;

/// Appended to every scenario's system prompt so replies stay natural
/// when spoken aloud by the voice layer.
const BREVITY_CONSTRAINT: &str = "Stay in character at all times. Keep every reply brief and \
conversational -- no more than two or three spoken sentences. Never use lists, headings, or \
stage directions.";

/// Output cap for a single in-character reply.
const MAX_REPLY_TOKENS: u32 = 300;

/// Produces the character's next utterance for a session turn.
pub struct TurnEngine<P: LlmProvider> {
    provider: Arc<P>,
    model: String,
}

impl<P: LlmProvider> TurnEngine<P> {
    pub fn new(provider: Arc<P>, model: String) -> Self {
        Self { provider, model }
    }

    /// Generate the assistant reply to `participant_message` given the
    /// conversation so far.
    ///
    /// Returns the text of the model's reply; an empty string is a valid
    /// reply, not an error -- the caller decides how to handle it.
    #[tracing::instrument(name = "next_turn", skip_all, fields(scenario_id = %scenario.id))]
    pub async fn next_turn(
        &self,
        scenario: &Scenario,
        prior_transcript: &[TranscriptMessage],
        participant_message: &str,
    ) -> Result<String, LlmError> {
        let mut messages: Vec<ChatMessage> = prior_transcript
            .iter()
            .map(|m| ChatMessage {
                role: match m.role {
                    MessageRole::Participant => ChatRole::User,
                    MessageRole::Assistant => ChatRole::Assistant,
                },
                content: m.content.clone(),
            })
            .collect();
        messages.push(ChatMessage {
            role: ChatRole::User,
            content: participant_message.to_string(),
        });

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            system: Some(format!(
                "{}\n\n{BREVITY_CONSTRAINT}",
                scenario.system_prompt
            )),
            max_tokens: MAX_REPLY_TOKENS,
            temperature: Some(0.8),
        };

        let response = self.provider.complete(&request).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_types::llm::{CompletionResponse, StopReason, Usage};
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Records the last request and replies with a canned string.
    struct RecordingProvider {
        reply: String,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl RecordingProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                last_request: Mutex::new(None),
            }
        }
    }

    impl LlmProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(CompletionResponse {
                id: "msg_test".to_string(),
                content: self.reply.clone(),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    fn scenario() -> Scenario {
        Scenario {
            id: "workplace-conflict".to_string(),
            name: "Workplace Conflict".to_string(),
            description: String::new(),
            system_prompt: "You are Jordan, upset about a missed handoff.".to_string(),
            character_name: "Jordan".to_string(),
            opening_message: "Hey, can we chat?".to_string(),
        }
    }

    fn message(role: MessageRole, content: &str, position: i64) -> TranscriptMessage {
        TranscriptMessage {
            id: Uuid::now_v7(),
            session_id: Uuid::now_v7(),
            role,
            content: content.to_string(),
            position,
        }
    }

    #[tokio::test]
    async fn next_turn_builds_system_from_scenario_and_brevity() {
        let provider = Arc::new(RecordingProvider::new("I get that, but it stung."));
        let engine = TurnEngine::new(Arc::clone(&provider), "test-model".to_string());

        let reply = engine
            .next_turn(&scenario(), &[], "I'm sorry about the handoff.")
            .await
            .unwrap();
        assert_eq!(reply, "I get that, but it stung.");

        let request = provider.last_request.lock().unwrap().clone().unwrap();
        let system = request.system.unwrap();
        assert!(system.contains("You are Jordan"));
        assert!(system.contains("two or three spoken sentences"));
        assert_eq!(request.max_tokens, MAX_REPLY_TOKENS);
    }

    #[tokio::test]
    async fn next_turn_maps_transcript_roles_and_appends_message() {
        let provider = Arc::new(RecordingProvider::new("ok"));
        let engine = TurnEngine::new(Arc::clone(&provider), "test-model".to_string());

        let prior = vec![
            message(MessageRole::Assistant, "Hey, can we chat?", 0),
            message(MessageRole::Participant, "Sure.", 1),
        ];
        engine
            .next_turn(&scenario(), &prior, "What's on your mind?")
            .await
            .unwrap();

        let request = provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].role, ChatRole::Assistant);
        assert_eq!(request.messages[1].role, ChatRole::User);
        assert_eq!(request.messages[2].role, ChatRole::User);
        assert_eq!(request.messages[2].content, "What's on your mind?");
    }

    #[tokio::test]
    async fn next_turn_passes_through_empty_reply() {
        let provider = Arc::new(RecordingProvider::new(""));
        let engine = TurnEngine::new(provider, "test-model".to_string());

        let reply = engine
            .next_turn(&scenario(), &[], "Hello?")
            .await
            .unwrap();
        assert_eq!(reply, "");
    }
}
