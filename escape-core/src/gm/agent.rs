//! Claude-backed game master.
//!
//! Owns the system prompt and the conversation with the model. Turns a
//! [`GenerationRequest`] into a Messages API call and hands back the raw
//! narration, tags included.

use async_trait::async_trait;
use claude::{Claude, Request};
use tracing::{debug, warn};

use super::memory::GmMemory;
use crate::generator::{GenerationError, GenerationRequest, Generator};

/// Configuration for the game master.
#[derive(Debug, Clone)]
pub struct GmConfig {
    /// The model to use (defaults to the client's model).
    pub model: Option<String>,

    /// Maximum tokens for responses.
    pub max_tokens: usize,

    /// Temperature for generation.
    pub temperature: Option<f32>,

    /// Extra instructions appended to the system prompt.
    pub custom_system_prompt: Option<String>,
}

impl Default for GmConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 4096,
            temperature: Some(0.8),
            custom_system_prompt: None,
        }
    }
}

impl GmConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_system_prompt = Some(prompt.into());
        self
    }
}

/// The AI game master.
pub struct GameMaster {
    client: Claude,
    config: GmConfig,
    memory: GmMemory,
}

impl GameMaster {
    /// Create a game master with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Claude::new(api_key))
    }

    /// Create a game master from the ANTHROPIC_API_KEY environment variable.
    pub fn from_env() -> Result<Self, GenerationError> {
        Ok(Self::with_client(Claude::from_env()?))
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Claude) -> Self {
        Self {
            client,
            config: GmConfig::default(),
            memory: GmMemory::new(),
        }
    }

    /// Configure the game master.
    pub fn with_config(mut self, config: GmConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GmConfig {
        &self.config
    }

    /// The model narration is requested from.
    pub fn model(&self) -> &str {
        self.config.model.as_deref().unwrap_or(self.client.model())
    }

    /// Get the current memory.
    pub fn memory(&self) -> &GmMemory {
        &self.memory
    }

    fn build_system_prompt(&self) -> String {
        let mut prompt = String::from(include_str!("prompts/game_master.txt"));

        if let Some(ref custom) = self.config.custom_system_prompt {
            prompt.push_str("\n\n## Additional Instructions\n");
            prompt.push_str(custom);
        }

        prompt
    }

    fn build_request(&self, prompt: &str) -> Request {
        let mut request = Request::new(self.memory.messages_with(prompt))
            .with_system(self.build_system_prompt())
            .with_max_tokens(self.config.max_tokens);

        if let Some(ref model) = self.config.model {
            request = request.with_model(model);
        }

        if let Some(temp) = self.config.temperature {
            request = request.with_temperature(temp);
        }

        request
    }
}

#[async_trait]
impl Generator for GameMaster {
    async fn generate(&mut self, request: GenerationRequest) -> Result<String, GenerationError> {
        let prompt = request.prompt();
        debug!(
            kind = ?request.kind,
            model = self.model(),
            history = self.memory.message_count(),
            "requesting narration"
        );

        let response = self
            .client
            .complete(self.build_request(&prompt))
            .await
            .inspect_err(|err| warn!(kind = ?request.kind, error = %err, "narration request failed"))?;

        let narrative = response.text();
        self.memory.add_exchange(&prompt, &narrative);
        Ok(narrative)
    }

    fn reset(&mut self) {
        self.memory.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::HINT_INSTRUCTION;

    #[test]
    fn test_default_config() {
        let config = GmConfig::default();
        assert_eq!(config.model, None);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.temperature, Some(0.8));
    }

    #[test]
    fn test_model_prefers_config_over_client() {
        let gm = GameMaster::with_client(Claude::new("test-key").with_model("client-model"));
        assert_eq!(gm.model(), "client-model");

        let gm = gm.with_config(GmConfig::default().with_model("config-model"));
        assert_eq!(gm.model(), "config-model");
    }

    #[test]
    fn test_system_prompt_describes_tags() {
        let gm = GameMaster::new("test-key");
        let prompt = gm.build_system_prompt();
        for tag in ["ITEM_ADD", "CLUE_ADD", "LOCATION_UPDATE", "PUZZLE_SOLVED", "GAME_WIN"] {
            assert!(prompt.contains(tag), "missing {tag}");
        }
        assert!(!prompt.contains("Additional Instructions"));
    }

    #[test]
    fn test_custom_prompt_appended() {
        let gm = GameMaster::new("test-key")
            .with_config(GmConfig::default().with_custom_prompt("Answer in Korean."));
        assert!(gm.build_system_prompt().ends_with("Answer in Korean."));
    }

    #[test]
    fn test_build_request_applies_config() {
        let gm = GameMaster::new("test-key").with_config(
            GmConfig::default()
                .with_model("claude-test")
                .with_max_tokens(512)
                .with_temperature(0.2),
        );
        let request = gm.build_request(HINT_INSTRUCTION);
        assert_eq!(request.model.as_deref(), Some("claude-test"));
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].text, HINT_INSTRUCTION);
    }

    #[test]
    fn test_reset_clears_memory() {
        let mut gm = GameMaster::new("test-key");
        gm.memory.add_exchange("a", "b");
        gm.reset();
        assert_eq!(gm.memory().message_count(), 0);
    }
}
