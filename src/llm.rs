use anyhow::Result;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
    CreateChatCompletionRequestArgs,
};
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::{LLMClient, LLMParams, TARGET_LLM_REQUEST};

const LLM_TIMEOUT: Duration = Duration::from_secs(120);

async fn single_completion(prompt: &str, params: &LLMParams) -> Result<String> {
    match &params.llm_client {
        LLMClient::Ollama(ollama) => {
            let mut request = GenerationRequest::new(params.model.clone(), prompt.to_string());
            request.options = Some(GenerationOptions::default().temperature(params.temperature));

            let response = ollama
                .generate(request)
                .await
                .map_err(|e| anyhow::anyhow!("Ollama request failed: {}", e))?;
            Ok(response.response)
        }
        LLMClient::OpenAI(client) => {
            let request = CreateChatCompletionRequestArgs::default()
                .model(params.model.clone())
                .temperature(params.temperature)
                .messages(vec![ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(prompt.to_string()),
                )])
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to build request: {}", e))?;

            let response = client
                .chat()
                .create(request)
                .await
                .map_err(|e| anyhow::anyhow!("OpenAI API error: {}", e))?;

            response
                .choices
                .first()
                .and_then(|choice| choice.message.content.clone())
                .ok_or_else(|| anyhow::anyhow!("No response from OpenAI"))
        }
    }
}

pub async fn generate_llm_response(prompt: &str, params: &LLMParams) -> Option<String> {
    let max_retries = 3;
    let mut response_text = String::new();
    let mut backoff = 2;

    debug!(target: TARGET_LLM_REQUEST, "Starting LLM response generation with model {}", params.model);

    for retry_count in 0..max_retries {
        match timeout(LLM_TIMEOUT, single_completion(prompt, params)).await {
            Ok(Ok(response)) => {
                response_text = response;
                debug!(target: TARGET_LLM_REQUEST, "LLM response received: {}", response_text);
                break;
            }
            Ok(Err(e)) => {
                warn!(target: TARGET_LLM_REQUEST, "Error generating response: {}", e);
                if retry_count < max_retries - 1 {
                    info!(target: TARGET_LLM_REQUEST, "Retrying LLM request... ({}/{})", retry_count + 1, max_retries);
                } else {
                    error!(target: TARGET_LLM_REQUEST, "Failed to generate response after {} retries", max_retries);
                }
            }
            Err(_) => {
                warn!(target: TARGET_LLM_REQUEST, "LLM request timed out");
                if retry_count < max_retries - 1 {
                    info!(target: TARGET_LLM_REQUEST, "Retrying LLM request... ({}/{})", retry_count + 1, max_retries);
                } else {
                    error!(target: TARGET_LLM_REQUEST, "Failed to generate response after {} retries due to timeouts", max_retries);
                }
            }
        }

        if retry_count < max_retries - 1 {
            debug!(target: TARGET_LLM_REQUEST, "Backing off for {} seconds before retry", backoff);
            sleep(Duration::from_secs(backoff)).await;
            backoff *= 2; // Exponential backoff
        }
    }

    if response_text.is_empty() {
        error!(target: TARGET_LLM_REQUEST, "No response generated after all retries");
        None
    } else {
        Some(response_text)
    }
}
