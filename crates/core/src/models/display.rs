//! Amount formatting for presentation layers: Brazilian reais with pt-BR
//! grouping, and a privacy mask that hides every figure.

pub const HIDDEN_AMOUNT: &str = "••••••";
pub const HIDDEN_PERCENT: &str = "•••";

/// `R$ 1.234,56`, or the privacy mask when `hidden`.
///
/// Two fraction digits minimum, three at most (a third one only shows when
/// it is significant).
pub fn format_amount(value: f64, hidden: bool) -> String {
    if hidden {
        return HIDDEN_AMOUNT.to_string();
    }
    format!("R$ {}", group_pt_br(value))
}

/// `70%` (rounded), or the short privacy mask when `hidden`.
pub fn format_percent(value: f64, hidden: bool) -> String {
    if hidden {
        return HIDDEN_PERCENT.to_string();
    }
    format!("{}%", value.round() as i64)
}

fn group_pt_br(value: f64) -> String {
    if !value.is_finite() {
        return "0,00".to_string();
    }
    let thousandths = (value.abs() * 1000.0).round() as u64;
    let whole = (thousandths / 1000).to_string();
    let mut fraction = format!("{:03}", thousandths % 1000);
    if fraction.ends_with('0') {
        fraction.pop();
    }

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && thousandths > 0 { "-" } else { "" };
    format!("{sign}{grouped},{fraction}")
}
