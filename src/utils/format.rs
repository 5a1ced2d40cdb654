// Display formatting shared by the dashboard widgets.

/// Market cap reported in millions, shown in billions: `2950000.0` → `$2950.00B`.
pub fn format_market_cap_millions(value: f64) -> String {
    format!("${:.2}B", value / 1000.0)
}

pub fn format_price(value: f64) -> String {
    format!("${:.2}", value)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Signed percent with explicit `+` for gains: `+4.96%`, `-6.90%`.
pub fn format_signed_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

pub fn format_ratio(value: f64) -> String {
    format!("{:.2}", value)
}

/// Ticker symbols are compared upper-cased and without surrounding whitespace.
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let ticker = raw.trim().to_ascii_uppercase();
    if ticker.is_empty() {
        None
    } else {
        Some(ticker)
    }
}
