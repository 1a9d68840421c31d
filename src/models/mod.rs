mod analysis;
mod holding;
mod news;

pub use analysis::{AnalysisOutcome, AnalysisRequest, MarketAnalysis, PortfolioStock};
pub use holding::{CreateHolding, Holding, UpdateHolding};
pub use news::{CreateNewsItem, IngestSummary, NewsItem, NewsQueryParams, RawArticle, Sentiment};
