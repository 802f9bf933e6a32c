use rust_decimal::Decimal;
use showpro_core::calculations::{CommissionPreset, DisplayAmounts};
use showpro_core::form::parse_amount;

/// Parses a decimal command-line argument. Thousands separators are accepted.
pub fn parse_decimal_arg(s: &str) -> Result<Decimal, String> {
    match parse_amount(s) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err("value is empty".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Parses a commission preset name: `standard` (15%) or `reduced` (7.5%).
pub fn parse_preset(s: &str) -> Result<CommissionPreset, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "standard" | "15" => Ok(CommissionPreset::Standard),
        "reduced" | "7.5" => Ok(CommissionPreset::Reduced),
        other => Err(format!(
            "unknown preset '{other}', expected 'standard' (15%) or 'reduced' (7.5%)"
        )),
    }
}

/// Formats a money amount with thousands separators, e.g. `1,234.50`.
/// The value is expected to be rounded already.
pub fn format_money(amount: Decimal) -> String {
    let text = format!("{:.2}", amount.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

/// Formats a percentage with one decimal place, e.g. `92.5%`.
pub fn format_percent(percent: Decimal) -> String {
    format!("{:.1}%", percent)
}

/// Renders the fee breakdown shown after every edit.
pub fn render_breakdown(amounts: &DisplayAmounts) -> String {
    let rows = [
        ("Total rate", format_money(amounts.total_rate)),
        (
            "Split",
            format!(
                "{} artist / {} commission",
                format_percent(amounts.artist_percent),
                format_percent(amounts.commission_percent)
            ),
        ),
        ("Artist net", format_money(amounts.artist_net)),
        ("Artist VAT", format_money(amounts.artist_vat)),
        ("Artist total", format_money(amounts.artist_total)),
        ("Agency net", format_money(amounts.agency_net)),
        ("Agency VAT", format_money(amounts.agency_vat)),
        ("Agency total", format_money(amounts.agency_total)),
    ];

    rows.iter()
        .map(|(label, value)| format!("{label:<14}{value:>32}"))
        .collect::<Vec<_>>()
        .join("\n")
}
