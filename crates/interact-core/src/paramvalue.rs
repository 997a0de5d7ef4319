//! Shared parameter-value parser, driven by `inputSchema[param].type`.
//!
//! Used identically by the settings menu (§4.3) and the tweak manager
//! (§4.4) so a parsing rule only needs to be changed in one place.

use crate::types::ParamType;

const TRUE_TOKENS: &[&str] = &["true", "yes", "1", "on"];
const FALSE_TOKENS: &[&str] = &["false", "no", "0", "off"];

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Number(f64),
    Integer(i64),
    Boolean(bool),
    String(String),
}

impl ParsedValue {
    pub fn into_json(self) -> serde_json::Value {
        match self {
            ParsedValue::Number(n) => serde_json::json!(n),
            ParsedValue::Integer(n) => serde_json::json!(n),
            ParsedValue::Boolean(b) => serde_json::json!(b),
            ParsedValue::String(s) => serde_json::json!(s),
        }
    }
}

/// Human-readable validation error, suitable for the inline reply sent back
/// to the user (§4.3, §7 "Validation failures").
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse `raw` (trimmed user text) according to `param_type`.
pub fn parse(raw: &str, param_type: ParamType) -> Result<ParsedValue, ParseError> {
    let raw = raw.trim();
    match param_type {
        ParamType::Number => raw
            .parse::<f64>()
            .map(ParsedValue::Number)
            .map_err(|_| ParseError("Invalid number. Please provide a valid number.".to_string())),
        ParamType::Integer => raw
            .parse::<i64>()
            .map(ParsedValue::Integer)
            .map_err(|_| ParseError("Invalid number. Please provide a valid number.".to_string())),
        ParamType::Boolean => {
            let lower = raw.to_lowercase();
            if TRUE_TOKENS.contains(&lower.as_str()) {
                Ok(ParsedValue::Boolean(true))
            } else if FALSE_TOKENS.contains(&lower.as_str()) {
                Ok(ParsedValue::Boolean(false))
            } else {
                Err(ParseError(format!(
                    "Invalid boolean. Use one of: {} (true) or {} (false).",
                    TRUE_TOKENS.join("/"),
                    FALSE_TOKENS.join("/")
                )))
            }
        }
        ParamType::String => Ok(ParsedValue::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_integer() {
        assert_eq!(
            parse("30", ParamType::Integer).unwrap(),
            ParsedValue::Integer(30)
        );
    }

    #[test]
    fn rejects_non_numeric_integer() {
        let err = parse("thirty", ParamType::Integer).unwrap_err();
        assert_eq!(err.0, "Invalid number. Please provide a valid number.");
    }

    #[test]
    fn parses_number_with_decimal() {
        assert_eq!(
            parse("7.5", ParamType::Number).unwrap(),
            ParsedValue::Number(7.5)
        );
    }

    #[test]
    fn boolean_accepts_documented_token_sets() {
        for tok in ["true", "yes", "1", "on", "TRUE", "On"] {
            assert_eq!(parse(tok, ParamType::Boolean).unwrap(), ParsedValue::Boolean(true));
        }
        for tok in ["false", "no", "0", "off", "OFF"] {
            assert_eq!(parse(tok, ParamType::Boolean).unwrap(), ParsedValue::Boolean(false));
        }
    }

    #[test]
    fn boolean_rejects_unknown_token() {
        assert!(parse("maybe", ParamType::Boolean).is_err());
    }

    #[test]
    fn string_passes_through_trimmed() {
        assert_eq!(
            parse("  a cat  ", ParamType::String).unwrap(),
            ParsedValue::String("a cat".to_string())
        );
    }
}
