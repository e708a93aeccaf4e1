//! Lexical detectors: code and math heuristics over the raw prompt text.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"```[\s\S]*?```").unwrap(),
        Regex::new(r"`[^`\n]+`").unwrap(),
        Regex::new(r"(?i)function\s+\w+\s*\(").unwrap(),
        Regex::new(r"(?i)class\s+\w+").unwrap(),
        Regex::new(r"(?i)import\s+.+\s+from").unwrap(),
        Regex::new(r"(?i)def\s+\w+\s*\(").unwrap(),
        Regex::new(r"(?i)const\s+\w+\s*=").unwrap(),
        Regex::new(r"(?i)let\s+\w+\s*=").unwrap(),
    ]
});

static MATH_SYMBOL_SET: &[char] = &['∫', '∑', '∏', '√', '∞', '≤', '≥', '≠', '±', '×', '÷'];

static MATH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\$[^$]+\$").unwrap(),
        Regex::new(r"\\\([^)]*\\\)").unwrap(),
        Regex::new(r"\\\[[^\]]*\\\]").unwrap(),
        Regex::new(r"\d(\.\d+)?[eE][+-]?\d+").unwrap(),
    ]
});

static MATH_WORDS: &[&str] = &["matrix", "vector", "derivative", "integral"];

/// Case-insensitive code detection: fenced blocks, inline backticks,
/// common declaration shapes.
pub fn has_code(text: &str) -> bool {
    CODE_PATTERNS.iter().any(|re| re.is_match(text))
}

/// Case-insensitive math detection: LaTeX delimiters, the math symbol
/// set, scientific notation, or a small vocabulary of math terms.
pub fn has_math(text: &str) -> bool {
    if MATH_PATTERNS.iter().any(|re| re.is_match(text)) {
        return true;
    }
    if text.chars().any(|c| MATH_SYMBOL_SET.contains(&c)) {
        return true;
    }
    let lower = text.to_lowercase();
    MATH_WORDS.iter().any(|w| lower.contains(w))
}
