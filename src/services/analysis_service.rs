use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::errors::LlmError;
use crate::models::{AnalysisOutcome, MarketAnalysis, PortfolioStock, Sentiment};

/// Configuration for the analysis forwarder
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl AnalysisConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            max_tokens: 300,
            temperature: 0.7,
        }
    }
}

/// Trait for completion providers
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn generate_completion(&self, prompt: String) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: String,
}

/// OpenAI chat-completions provider
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: String, config: &AnalysisConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client,
        })
    }

    async fn call_with_retry(&self, request: OpenAiRequest) -> Result<OpenAiResponse, LlmError> {
        let mut retry_count = 0;
        let max_retries = 3;
        let mut delay = Duration::from_secs(1);

        loop {
            match self.call_openai(&request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    retry_count += 1;
                    if retry_count >= max_retries {
                        error!("Completion call failed after {} attempts: {}", max_retries, e);
                        return Err(e);
                    }
                    warn!(
                        "Completion call failed (attempt {}/{}): {}. Retrying in {:?}",
                        retry_count, max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    async fn call_openai(&self, request: &OpenAiRequest) -> Result<OpenAiResponse, LlmError> {
        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status == 429 {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        response
            .json::<OpenAiResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn generate_completion(&self, prompt: String) -> Result<String, LlmError> {
        let request = OpenAiRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAiMessage {
                    role: "system".to_string(),
                    content: "You are a financial analyst AI assistant. Provide concise, \
                              professional analysis of market news and portfolio impact. Keep \
                              responses under 200 words and focus on actionable insights."
                        .to_string(),
                },
                OpenAiMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self.call_with_retry(request).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))
    }
}

/// Model reply parsed with every field optional; absent or malformed
/// fields fall back to typed defaults one by one.
#[derive(Debug, Deserialize)]
struct PartialAnalysis {
    overall_sentiment: Option<String>,
    market_outlook: Option<String>,
    portfolio_impact: Option<String>,
    recommendations: Option<Vec<String>>,
}

/// Forwards headlines and holdings to the completion provider and reshapes
/// the reply into a fixed schema. The contract is "always return something
/// usable": every failure path degrades to fallback copy, never an error.
pub struct AnalysisService {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl AnalysisService {
    pub fn new(config: AnalysisConfig) -> Self {
        let provider: Option<Arc<dyn CompletionProvider>> = match &config.api_key {
            Some(api_key) => match OpenAiProvider::new(api_key.clone(), &config) {
                Ok(provider) => Some(Arc::new(provider)),
                Err(e) => {
                    warn!("Failed to build completion client: {}", e);
                    None
                }
            },
            None => {
                info!("No OPENAI_API_KEY configured; analysis serves fallback copy only");
                None
            }
        };

        Self { provider }
    }

    #[cfg(test)]
    fn with_provider(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    pub async fn analyze(
        &self,
        headlines: &[String],
        portfolio: &[PortfolioStock],
    ) -> AnalysisOutcome {
        let Some(provider) = &self.provider else {
            return AnalysisOutcome::Fallback(fallback_analysis());
        };

        let prompt = build_analysis_prompt(headlines, portfolio);

        match provider.generate_completion(prompt).await {
            Ok(reply) => match coerce_analysis(&reply, !portfolio.is_empty()) {
                Some(analysis) => AnalysisOutcome::Parsed(analysis),
                None => {
                    warn!("Model reply was not parseable as analysis JSON");
                    AnalysisOutcome::Fallback(fallback_analysis())
                }
            },
            Err(e) => {
                error!("Completion provider failed: {}", e);
                AnalysisOutcome::Fallback(fallback_analysis())
            }
        }
    }
}

fn build_analysis_prompt(headlines: &[String], portfolio: &[PortfolioStock]) -> String {
    let portfolio_text = if portfolio.is_empty() {
        "No portfolio information available".to_string()
    } else {
        let stocks = portfolio
            .iter()
            .map(|s| format!("{} ({})", s.symbol, s.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("User's Portfolio: {}", stocks)
    };

    let headlines_text = if headlines.is_empty() {
        "No recent news available".to_string()
    } else {
        let lines = headlines
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{}. {}", i + 1, h))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Recent News Headlines:\n{}", lines)
    };

    format!(
        "{portfolio_text}\n\n{headlines_text}\n\n\
         Based on the above news headlines and portfolio information, provide:\n\
         1. Overall market sentiment (positive/negative/neutral)\n\
         2. Brief market outlook (2-3 sentences)\n\
         3. Portfolio impact analysis (if portfolio provided)\n\
         4. 2-3 actionable recommendations\n\n\
         Format your response as a JSON object with keys: overall_sentiment, \
         market_outlook, portfolio_impact, recommendations (array of strings)."
    )
}

/// Parse the model reply into the fixed schema, substituting a typed
/// default for each missing field. Returns None when the reply is not
/// JSON at all.
fn coerce_analysis(reply: &str, has_portfolio: bool) -> Option<MarketAnalysis> {
    let partial: PartialAnalysis = serde_json::from_str(reply.trim()).ok()?;

    let overall_sentiment = partial
        .overall_sentiment
        .map(|s| match s.to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        })
        .unwrap_or(Sentiment::Neutral);

    let market_outlook = partial.market_outlook.unwrap_or_else(|| {
        "Market conditions are mixed with various factors influencing performance.".to_string()
    });

    let portfolio_impact = partial.portfolio_impact.unwrap_or_else(|| {
        if has_portfolio {
            "Your portfolio positioning appears reasonable given current market conditions."
                .to_string()
        } else {
            "Consider building a diversified portfolio across different sectors.".to_string()
        }
    });

    let recommendations = match partial.recommendations {
        Some(recs) if !recs.is_empty() => recs,
        _ => vec![
            "Monitor key economic indicators".to_string(),
            "Maintain appropriate risk management".to_string(),
            "Stay informed about sector-specific developments".to_string(),
        ],
    };

    Some(MarketAnalysis {
        overall_sentiment,
        market_outlook,
        portfolio_impact,
        recommendations,
    })
}

/// Served whenever the provider is unavailable, errors out, or replies
/// with something unusable
fn fallback_analysis() -> MarketAnalysis {
    MarketAnalysis {
        overall_sentiment: Sentiment::Neutral,
        market_outlook: "Unable to generate AI analysis at this time. Market conditions remain \
                         mixed with various factors at play."
            .to_string(),
        portfolio_impact: "Please try again later for detailed portfolio analysis.".to_string(),
        recommendations: vec![
            "Monitor market developments closely".to_string(),
            "Maintain diversified holdings".to_string(),
            "Consider consulting with financial advisors".to_string(),
        ],
    }
}
