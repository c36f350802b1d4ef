//! Size token parsing for values reported by `softnas-cmd`.
//!
//! The appliance reports capacities as human-readable tokens such as
//! `44.8G`, `480.0K` or `1,002.9M`. This module turns them into byte counts.

/// Error type for size token parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeParseError {
    pub input: String,
    pub message: String,
}

impl std::fmt::Display for SizeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse size '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for SizeParseError {}

const KIB: f64 = 1024.0;

/// Parses a size token into a byte count.
///
/// # Supported formats
///
/// | Token | Bytes |
/// |-------|-------|
/// | `1000` | 1000 |
/// | `1,000K` | 1000 × 1024 |
/// | `44.8M` | 44.8 × 1024² |
/// | `1.5G` | 1.5 × 1024³ |
/// | `2T` | 2 × 1024⁴ |
///
/// Commas are thousands separators and are removed before parsing.
/// Suffixes are case-sensitive and only recognized as the last character.
///
/// # Examples
///
/// ```
/// use softnas::units::parse_size;
///
/// assert_eq!(parse_size("1,000K").unwrap(), 1_024_000.0);
/// assert_eq!(parse_size("512").unwrap(), 512.0);
/// ```
pub fn parse_size(token: &str) -> Result<f64, SizeParseError> {
    let cleaned: String = token.trim().chars().filter(|&c| c != ',').collect();
    if cleaned.is_empty() {
        return Err(SizeParseError {
            input: token.to_string(),
            message: "empty size token".to_string(),
        });
    }

    let (number, multiplier) = match cleaned.chars().last() {
        Some('K') => (&cleaned[..cleaned.len() - 1], KIB),
        Some('M') => (&cleaned[..cleaned.len() - 1], KIB.powi(2)),
        Some('G') => (&cleaned[..cleaned.len() - 1], KIB.powi(3)),
        Some('T') => (&cleaned[..cleaned.len() - 1], KIB.powi(4)),
        _ => (cleaned.as_str(), 1.0),
    };

    let value = number.parse::<f64>().map_err(|e| SizeParseError {
        input: token.to_string(),
        message: e.to_string(),
    })?;

    if !value.is_finite() || value < 0.0 {
        return Err(SizeParseError {
            input: token.to_string(),
            message: "size must be a finite, non-negative number".to_string(),
        });
    }

    Ok(value * multiplier)
}

/// Returns the leading token of a descriptor such as `"44.8G Free\n(100.0%)"`.
///
/// Tokens are separated by spaces or newlines.
pub fn first_token(descriptor: &str) -> &str {
    descriptor.split_whitespace().next().unwrap_or("")
}
