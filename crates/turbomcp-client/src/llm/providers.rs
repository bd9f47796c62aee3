//! LLM provider implementations
//!
//! This module contains concrete implementations of the LLMProvider trait
//! for various LLM services.

use crate::llm::core::{
    LLMCapabilities, LLMMessage, LLMProvider, LLMProviderConfig, LLMRequest, LLMResponse,
    LLMResult, ModelInfo, TokenUsage,
};
use async_trait::async_trait;

// Placeholder implementations - will be fully implemented in future phases

/// OpenAI provider implementation
#[derive(Debug)]
pub struct OpenAIProvider {
    #[allow(dead_code)]
    config: LLMProviderConfig,
    capabilities: LLMCapabilities,
}

impl OpenAIProvider {
    /// Create new OpenAI provider
    pub fn new(config: LLMProviderConfig) -> LLMResult<Self> {
        config.validate()?;

        let capabilities = LLMCapabilities {
            streaming: true,
            vision: true,
            function_calling: true,
            json_mode: true,
            max_context_tokens: Some(128000),
            max_output_tokens: Some(4096),
            content_types: vec!["text".to_string(), "image".to_string()],
        };

        Ok(Self {
            config,
            capabilities,
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, _request: &LLMRequest) -> LLMResult<LLMResponse> {
        // TODO: Implement actual OpenAI API integration
        let message = LLMMessage::assistant("This is a placeholder response from OpenAI provider");
        let usage = TokenUsage::new(10, 20);
        Ok(LLMResponse::new(message, "gpt-4", usage))
    }

    async fn list_models(&self) -> LLMResult<Vec<ModelInfo>> {
        // TODO: Implement actual model listing
        Ok(vec![ModelInfo {
            name: "gpt-4".to_string(),
            display_name: "GPT-4".to_string(),
            description: Some("Most capable GPT-4 model".to_string()),
            capabilities: self.capabilities.clone(),
            version: Some("gpt-4-0613".to_string()),
            pricing: None,
            available: true,
        }])
    }

    fn capabilities(&self) -> &LLMCapabilities {
        &self.capabilities
    }
}

/// Anthropic provider implementation
#[derive(Debug)]
pub struct AnthropicProvider {
    #[allow(dead_code)]
    config: LLMProviderConfig,
    capabilities: LLMCapabilities,
}

impl AnthropicProvider {
    /// Create new Anthropic provider
    pub fn new(config: LLMProviderConfig) -> LLMResult<Self> {
        config.validate()?;

        let capabilities = LLMCapabilities {
            streaming: true,
            vision: true,
            function_calling: true,
            json_mode: false,
            max_context_tokens: Some(200000),
            max_output_tokens: Some(4096),
            content_types: vec!["text".to_string(), "image".to_string()],
        };

        Ok(Self {
            config,
            capabilities,
        })
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, _request: &LLMRequest) -> LLMResult<LLMResponse> {
        // TODO: Implement actual Anthropic API integration
        let message =
            LLMMessage::assistant("This is a placeholder response from Anthropic provider");
        let usage = TokenUsage::new(15, 25);
        Ok(LLMResponse::new(message, "claude-3-sonnet-20240229", usage))
    }

    async fn list_models(&self) -> LLMResult<Vec<ModelInfo>> {
        // TODO: Implement actual model listing
        Ok(vec![ModelInfo {
            name: "claude-3-sonnet-20240229".to_string(),
            display_name: "Claude 3 Sonnet".to_string(),
            description: Some("Balanced performance and speed".to_string()),
            capabilities: self.capabilities.clone(),
            version: Some("20240229".to_string()),
            pricing: None,
            available: true,
        }])
    }

    fn capabilities(&self) -> &LLMCapabilities {
        &self.capabilities
    }
}

/// Ollama provider implementation (for local models)
#[derive(Debug)]
pub struct OllamaProvider {
    config: LLMProviderConfig,
    capabilities: LLMCapabilities,
}

impl OllamaProvider {
    /// Create new Ollama provider
    pub fn new(config: LLMProviderConfig) -> LLMResult<Self> {
        let mut validated_config = config;
        if validated_config.base_url.is_none() {
            validated_config.base_url = Some("http://localhost:11434".to_string());
        }

        let capabilities = LLMCapabilities {
            streaming: true,
            vision: false,
            function_calling: false,
            json_mode: false,
            max_context_tokens: Some(4096),
            max_output_tokens: Some(2048),
            content_types: vec!["text".to_string()],
        };

        Ok(Self {
            config: validated_config,
            capabilities,
        })
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, _request: &LLMRequest) -> LLMResult<LLMResponse> {
        // TODO: Implement actual Ollama API integration
        let message = LLMMessage::assistant("This is a placeholder response from Ollama provider");
        let usage = TokenUsage::new(8, 15);
        Ok(LLMResponse::new(message, &self.config.model, usage))
    }

    async fn list_models(&self) -> LLMResult<Vec<ModelInfo>> {
        // TODO: Implement actual model listing via Ollama API
        Ok(vec![ModelInfo {
            name: self.config.model.clone(),
            display_name: self.config.model.clone(),
            description: Some("Local Ollama model".to_string()),
            capabilities: self.capabilities.clone(),
            version: None,
            pricing: None,
            available: true,
        }])
    }

    fn capabilities(&self) -> &LLMCapabilities {
        &self.capabilities
    }
}
