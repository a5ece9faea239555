//! Yahoo Finance endpoint constants and URL helpers.

/// Quote endpoint of the Yahoo v7 finance API.
pub const QUOTES_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
/// Fixed query suffix sent with every quote request.
pub const QUOTES_QUERY: &str = "&range=1d&interval=5m&indicators=close&includeTimestamps=false&includePrePost=false&corsDomain=finance.yahoo.com&.tsrc=finance";
/// HTTP timeout for a single request, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Symbols and labels of the market summary, in display order.
pub const MARKET_SYMBOLS: &[(&str, &str)] = &[
    ("^DJI", "Dow"),
    ("^GSPC", "S&P 500"),
    ("^IXIC", "NASDAQ"),
    ("^TNX", "10-Year Yield"),
    ("CL=F", "Oil"),
    ("GC=F", "Gold"),
    ("JPY=X", "Yen"),
    ("EUR=X", "Euro"),
];

/// Builds the quote request URL for `symbols`, percent-encoding the
/// characters Yahoo uses for indices and currencies.
pub fn quotes_url<S: AsRef<str>>(symbols: &[S]) -> String {
    let list: Vec<String> = symbols
        .iter()
        .map(|s| s.as_ref().replace('^', "%5E").replace('=', "%3D"))
        .collect();
    format!("{}?symbols={}{}", QUOTES_URL, list.join(","), QUOTES_QUERY)
}
