use crate::indicators::BullishPattern;

// Comma-separated pattern names for log lines
pub fn format_patterns(patterns: &[BullishPattern]) -> String {
    patterns
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(", ")
}

// Mask a secret for display, keeping only the last few characters
pub fn redact(secret: &str) -> String {
    const VISIBLE: usize = 4;

    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= VISIBLE * 2 {
        return "*".repeat(chars.len());
    }

    let tail: String = chars[chars.len() - VISIBLE..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - VISIBLE), tail)
}

// Utility to truncate long strings for logging
pub fn truncate_string(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
