pub mod compatible;
pub mod openrouter;
pub mod traits;

pub use traits::{ChatMessage, Provider};

use compatible::{AuthStyle, OpenAiCompatibleProvider};
use reqwest::Client;
use std::time::Duration;

/// Total budget for one completion request. The caller blocks for at most
/// this long; there is no cancellation and no retry.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

pub(crate) async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    anyhow::anyhow!("{provider} API error ({status}): {body}")
}

/// Factory: create the right provider from config.
pub fn create_provider(name: &str, api_key: Option<&str>) -> anyhow::Result<Box<dyn Provider>> {
    match name {
        "openrouter" => Ok(Box::new(openrouter::OpenRouterProvider::new(api_key))),

        // ── OpenAI-compatible providers ──────────────────────
        "openai" => Ok(Box::new(OpenAiCompatibleProvider::new(
            "OpenAI",
            "https://api.openai.com",
            api_key,
            AuthStyle::Bearer,
        ))),
        "deepseek" => Ok(Box::new(OpenAiCompatibleProvider::new(
            "DeepSeek",
            "https://api.deepseek.com",
            api_key,
            AuthStyle::Bearer,
        ))),
        "groq" => Ok(Box::new(OpenAiCompatibleProvider::new(
            "Groq",
            "https://api.groq.com/openai",
            api_key,
            AuthStyle::Bearer,
        ))),
        "mistral" => Ok(Box::new(OpenAiCompatibleProvider::new(
            "Mistral",
            "https://api.mistral.ai",
            api_key,
            AuthStyle::Bearer,
        ))),

        // ── Bring Your Own Provider (custom URL) ─────────────
        // Format: "custom:https://your-api.com"
        name if name.starts_with("custom:") => {
            let base_url = name.strip_prefix("custom:").unwrap_or("");
            if base_url.is_empty() {
                anyhow::bail!("Custom provider requires a URL. Format: custom:https://your-api.com");
            }
            Ok(Box::new(OpenAiCompatibleProvider::new(
                "Custom",
                base_url,
                api_key,
                AuthStyle::Bearer,
            )))
        }

        _ => anyhow::bail!(
            "Unknown provider: {name}. Supported: openrouter, openai, deepseek, groq, mistral, \
             or \"custom:https://your-api.com\" for any OpenAI-compatible endpoint."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_openrouter() {
        assert!(create_provider("openrouter", Some("sk-test")).is_ok());
        assert!(create_provider("openrouter", None).is_ok());
    }

    #[test]
    fn factory_compatible_providers() {
        for name in ["openai", "deepseek", "groq", "mistral"] {
            assert!(
                create_provider(name, Some("key")).is_ok(),
                "provider '{name}' should create successfully"
            );
        }
    }

    #[test]
    fn factory_custom_url() {
        assert!(create_provider("custom:https://my-llm.example.com", Some("key")).is_ok());
        assert!(create_provider("custom:http://localhost:1234", None).is_ok());
    }

    #[test]
    fn factory_custom_empty_url_errors() {
        match create_provider("custom:", None) {
            Err(e) => assert!(
                e.to_string().contains("requires a URL"),
                "expected 'requires a URL', got: {e}"
            ),
            Ok(_) => panic!("expected error for empty custom URL"),
        }
    }

    #[test]
    fn factory_unknown_provider_errors() {
        let result = create_provider("nonexistent", None);
        assert!(result.is_err());
        let msg = result.err().unwrap().to_string();
        assert!(msg.contains("Unknown provider"));
        assert!(msg.contains("nonexistent"));
    }

    #[test]
    fn request_timeout_is_twenty_seconds() {
        assert_eq!(REQUEST_TIMEOUT, Duration::from_secs(20));
    }
}
