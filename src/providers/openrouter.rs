use crate::providers::traits::{ChatMessage, Provider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct OpenRouterProvider {
    api_key: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenRouterProvider {
    pub fn new(api_key: Option<&str>) -> Self {
        Self {
            api_key: api_key.map(ToString::to_string),
            client: super::http_client(),
        }
    }
}

#[async_trait]
impl Provider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn chat_with_history(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> anyhow::Result<String> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "OpenRouter API key not set. Add api_key to ~/.verdant/config.toml or set VERDANT_API_KEY."
            )
        })?;

        let api_messages: Vec<Message> = messages
            .iter()
            .map(|m| Message {
                role: m.role.clone(),
                content: m.content.clone(),
            })
            .collect();

        let request = ChatRequest {
            model: model.to_string(),
            messages: api_messages,
        };

        let response = self
            .client
            .post("https://openrouter.ai/api/v1/chat/completions")
            .header("Authorization", format!("Bearer {api_key}"))
            .header("HTTP-Referer", "http://localhost")
            .header("X-Title", "Verdant")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(super::api_error("OpenRouter", response).await);
        }

        let chat_response: ApiChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| anyhow::anyhow!("No response from OpenRouter"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_body_parses_choice_content() {
        let body = r#"{"choices":[{"message":{"content":"Hello 🌱"}}]}"#;
        let parsed: ApiChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Hello 🌱")
        );
    }

    #[test]
    fn response_body_tolerates_null_content() {
        let body = r#"{"choices":[{"message":{"content":null}}]}"#;
        let parsed: ApiChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, None);
    }

    #[test]
    fn request_body_shape_is_model_plus_messages() {
        let request = ChatRequest {
            model: "deepseek/deepseek-r1:free".into(),
            messages: vec![Message {
                role: "user".into(),
                content: "hi".into(),
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "deepseek/deepseek-r1:free");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
