use std::env;
use std::str::FromStr;

/// Strip surrounding whitespace and one layer of matching quotes.
///
/// `.env` files and shell exports frequently leave values wrapped in `"` or
/// `'`; Azure rejects keys that still carry them.
pub fn clean_value(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}

/// Read an environment variable, cleaned. Empty values are treated as unset.
pub fn env_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| clean_value(&v))
        .filter(|v| !v.is_empty())
}

/// Read an environment variable, falling back to `default`.
pub fn env_var_or(name: &str, default: &str) -> String {
    env_var(name).unwrap_or_else(|| default.to_string())
}

/// Read and parse an environment variable.
pub fn env_parse<T>(name: &str) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid value for {name} '{raw}': {e}").into()),
    }
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Return `None` for empty strings, otherwise the cleaned value.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| clean_value(&v)).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_value() {
        assert_eq!(clean_value("  plain  "), "plain");
        assert_eq!(clean_value("\"quoted\""), "quoted");
        assert_eq!(clean_value("'single'"), "single");
        assert_eq!(clean_value("\"mismatched'"), "\"mismatched'");
        assert_eq!(clean_value(" \" padded \" "), "padded");
        assert_eq!(clean_value(""), "");
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some("'x'".into())), Some("x".into()));
        assert_eq!(non_empty(None), None);
    }
}
