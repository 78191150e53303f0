//! Analysis-prompt construction for the generation endpoint

/// Analysis type tag stored alongside model-generated opinions
pub const AI_ANALYSIS_TYPE: &str = "ai_analysis";

/// Build the investment-opinion prompt for one currency
///
/// `current_price` is `None` when the ticker was unavailable; the prompt
/// states that explicitly instead of pretending a price of zero.
pub fn build_analysis_prompt(currency: &str, current_price: Option<f64>, news_text: &str) -> String {
    let price_line = match current_price {
        Some(price) => format!("{:.0} KRW", price),
        None => "unavailable".to_string(),
    };

    format!(
        "You are a cryptocurrency investment analyst. Based on the information below, \
give an investment opinion on {currency}.\n\n\
Current price: {price_line}\n\n\
{news_text}\n\n\
Please cover:\n\
1. Current market conditions\n\
2. Technical outlook\n\
3. Recommendation (buy/sell/hold)\n\
4. Reasoning\n"
    )
}
