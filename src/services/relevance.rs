use crate::models::NewsItem;

/// Broad-market tags that are relevant to every portfolio
pub const MARKET_SYMBOLS: [&str; 2] = ["NIFTY", "SENSEX"];

/// Narrow a news list to items relevant to the given holdings: items whose
/// symbol is held, plus index-level items. An empty holdings set means
/// "show everything", not "show nothing".
pub fn filter_by_portfolio(news: Vec<NewsItem>, held_symbols: &[String]) -> Vec<NewsItem> {
    if held_symbols.is_empty() {
        return news;
    }

    news.into_iter()
        .filter(|item| {
            held_symbols.iter().any(|s| s == &item.symbol)
                || MARKET_SYMBOLS.contains(&item.symbol.as_str())
        })
        .collect()
}
