use chrono::NaiveDateTime;

const FRACTION_DIGITS: usize = 9;
const SECONDS_PREFIX_LEN: usize = 19;

type ParseAttempt = fn(&str) -> Option<NaiveDateTime>;

// Tried in order; the first attempt that yields a value wins.
const ATTEMPTS: [ParseAttempt; 3] = [parse_fractional, parse_iso_local, parse_seconds_prefix];

/// Parses a stored timestamp string, accepting the shapes SQLite and older
/// rows have produced over time:
///
/// - `2024-03-05 14:07:09` / `2024-03-05T14:07:09`
/// - any fractional precision (`.5`, `.123456`, more than nine digits is truncated)
/// - trailing zone or junk after the seconds (only the first 19 characters are used)
///
/// Returns `None` for blank input or when nothing matches. Never fails.
pub fn parse_lenient(raw: Option<&str>) -> Option<NaiveDateTime> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    ATTEMPTS.iter().find_map(|attempt| attempt(s))
}

fn with_t_separator(s: &str) -> String {
    s.replacen(' ', "T", 1)
}

fn parse_fractional(s: &str) -> Option<NaiveDateTime> {
    let dot = s.find('.').filter(|&i| i > 0)?;
    let head = with_t_separator(&s[..dot]);

    let mut frac: String = s[dot + 1..]
        .chars()
        .filter(char::is_ascii_digit)
        .take(FRACTION_DIGITS)
        .collect();
    while frac.len() < FRACTION_DIGITS {
        frac.push('0');
    }

    NaiveDateTime::parse_from_str(&format!("{head}.{frac}"), "%Y-%m-%dT%H:%M:%S%.9f").ok()
}

fn parse_iso_local(s: &str) -> Option<NaiveDateTime> {
    let s = with_t_separator(s);
    NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M"))
        .ok()
}

fn parse_seconds_prefix(s: &str) -> Option<NaiveDateTime> {
    let prefix: String = with_t_separator(s).chars().take(SECONDS_PREFIX_LEN).collect();
    NaiveDateTime::parse_from_str(&prefix, "%Y-%m-%dT%H:%M:%S").ok()
}
