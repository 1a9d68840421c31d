use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::models::Sentiment;

/// Request body for the analysis endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub headlines: Vec<String>,
    #[serde(default)]
    pub portfolio: Vec<PortfolioStock>,
}

/// Holding summary as supplied by the analysis caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioStock {
    pub symbol: String,
    pub name: String,
    pub quantity: BigDecimal,
    pub average_price: BigDecimal,
}

/// Fully populated market analysis. Every field is always present, even
/// when the upstream model call failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub overall_sentiment: Sentiment,
    pub market_outlook: String,
    pub portfolio_impact: String,
    pub recommendations: Vec<String>,
}

/// Whether the analysis came from the model reply or from fallback copy
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Parsed(MarketAnalysis),
    Fallback(MarketAnalysis),
}

impl AnalysisOutcome {
    pub fn into_inner(self) -> MarketAnalysis {
        match self {
            AnalysisOutcome::Parsed(a) | AnalysisOutcome::Fallback(a) => a,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AnalysisOutcome::Fallback(_))
    }
}
