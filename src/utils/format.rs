//! Compact number formatting for chat replies.

const UNITS: [(f64, &str); 4] = [(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

// compact notation leaves four-digit integer parts ungrouped ("1000T")
fn render_one_decimal(value: f64, group: bool) -> String {
    let text = if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    };
    let (int, frac) = match text.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (text.as_str(), None),
    };
    if !group || int.len() < 5 {
        return text;
    }
    match frac {
        Some(frac) => format!("{}.{}", group_digits(int, ','), frac),
        None => group_digits(int, ','),
    }
}

/// en-US compact notation with at most one fraction digit: 1234567 => "1.2M".
pub fn abbreviate(number: f64) -> String {
    if number.is_nan() {
        return "NaN".to_string();
    }
    if number.is_infinite() {
        return if number > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }

    let magnitude = number.abs();
    // index into UNITS, None below one thousand
    let mut unit = UNITS.iter().rposition(|(size, _)| magnitude >= *size);

    let mut scaled = match unit {
        Some(i) => round_one_decimal(magnitude / UNITS[i].0),
        None => round_one_decimal(magnitude),
    };

    // 999_960 rounds to 1000K, which is shown as 1M
    while scaled >= 1000.0 {
        let next = unit.map_or(0, |i| i + 1);
        if next >= UNITS.len() {
            break;
        }
        unit = Some(next);
        scaled = round_one_decimal(magnitude / UNITS[next].0);
    }

    if scaled == 0.0 {
        let zero = if number.is_sign_negative() { "-0" } else { "0" };
        return zero.to_string();
    }

    let sign = if number < 0.0 { "-" } else { "" };
    match unit {
        Some(i) => format!("{}{}{}", sign, render_one_decimal(scaled, true), UNITS[i].1),
        None => format!("{}{}", sign, render_one_decimal(scaled, false)),
    }
}

/// Parses "1.2M" back to 1200000. Without a K/M/B/T suffix the whole string is
/// read as a plain number.
pub fn unabbreviate(shorthand: &str) -> Option<f64> {
    let text: String = shorthand.trim().chars().filter(|c| *c != ',').collect();
    let last = text.chars().last()?;

    let multiplier = match last.to_ascii_uppercase() {
        'K' => Some(1e3),
        'M' => Some(1e6),
        'B' => Some(1e9),
        'T' => Some(1e12),
        _ => None,
    };

    let value = match multiplier {
        Some(multiplier) => {
            let prefix = text[..text.len() - last.len_utf8()].trim();
            prefix.parse::<f64>().ok()? * multiplier
        }
        None => text.parse::<f64>().ok()?,
    };

    value.is_finite().then_some(value)
}

/// en-US locale rendering: comma grouping and up to three fraction digits
/// ("12345.6789" => "12,345.679").
pub fn format_locale(number: f64) -> String {
    if !number.is_finite() {
        return abbreviate(number);
    }
    let text = format!("{:.3}", number.abs());
    let (int, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac = frac.trim_end_matches('0');
    let sign = if number.is_sign_negative() { "-" } else { "" };
    if frac.is_empty() {
        format!("{}{}", sign, group_digits(int, ','))
    } else {
        format!("{}{}.{}", sign, group_digits(int, ','), frac)
    }
}

/// Rounds to an integer and groups thousands with dots ("1.234.567").
pub fn format_grouped(number: f64) -> String {
    let rounded = number.round();
    let digits = format!("{:.0}", rounded.abs());
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{}", sign, group_digits(&digits, '.'))
}
