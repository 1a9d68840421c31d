pub mod holding_queries;
pub mod news_queries;
