//! Scalar parsers for export field values
//!
//! Each parser takes one raw cell and returns `None` when the value cannot be
//! parsed; callers decide how a missing value is substituted and reported.

use chrono::Duration;
use regex::Regex;

/// Remove every occurrence of the grouping character
pub fn strip_grouping(value: &str, grouping: char) -> String {
    value.chars().filter(|c| *c != grouping).collect()
}

/// Parse a thousands-grouped number such as "1,234" or "3.52"
pub fn parse_grouped_number(value: &str, grouping: char) -> Option<f64> {
    let cleaned = strip_grouping(value.trim(), grouping);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a percentage such as "45.67%" into a fraction (0.4567)
pub fn parse_percentage(value: &str, grouping: char) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
    parse_grouped_number(number, grouping).map(|v| v / 100.0)
}

/// Parse a colon-delimited duration, `H:MM:SS` or `M:SS`
///
/// A leading `<` (exports write "<00:00:01" for sub-second averages) and
/// surrounding whitespace are ignored. The leading component is unbounded;
/// the following components must be below 60.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let trimmed = value.trim();
    let body = trimmed.strip_prefix('<').unwrap_or(trimmed).trim();

    let parts: Vec<&str> = body.split(':').collect();
    let numbers = parts
        .iter()
        .map(|part| parse_component(part))
        .collect::<Option<Vec<i64>>>()?;

    let seconds = match numbers.as_slice() {
        [hours, minutes, seconds] if *minutes < 60 && *seconds < 60 => {
            hours * 3600 + minutes * 60 + seconds
        }
        [minutes, seconds] if *seconds < 60 => minutes * 60 + seconds,
        _ => return None,
    };

    Duration::try_seconds(seconds)
}

fn parse_component(part: &str) -> Option<i64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse::<i64>().ok()
}

/// Pattern matching a cell that is entirely a thousands-grouped number,
/// such as "2,000" or "1,234,567.5"
pub fn grouped_number_pattern(grouping: char) -> Result<Regex, regex::Error> {
    let sep = regex::escape(&grouping.to_string());
    Regex::new(&format!(r"^-?\d{{1,3}}(?:{}\d{{3}})+(?:\.\d+)?$", sep))
}

/// Render a duration in milliseconds as `HH:MM:SS`
pub fn format_duration_ms(millis: i64) -> String {
    let total = millis.div_euclid(1000);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_parse_grouped_number() {
        assert_eq!(parse_grouped_number("1,234", ','), Some(1234.0));
        assert_eq!(parse_grouped_number("1,234,567", ','), Some(1_234_567.0));
        assert_eq!(parse_grouped_number(" 3.52 ", ','), Some(3.52));
        assert_eq!(parse_grouped_number("0", ','), Some(0.0));
        assert_eq!(parse_grouped_number("abc", ','), None);
        assert_eq!(parse_grouped_number("", ','), None);
        assert_eq!(parse_grouped_number(",", ','), None);
        assert_eq!(parse_grouped_number("inf", ','), None);
    }

    #[test]
    fn test_parse_percentage() {
        assert!(approx(parse_percentage("45.67%", ',').unwrap(), 0.4567));
        assert!(approx(parse_percentage("100.00%", ',').unwrap(), 1.0));
        assert!(approx(parse_percentage("0%", ',').unwrap(), 0.0));
        // No percent sign still parses as a percentage
        assert!(approx(parse_percentage("12.5", ',').unwrap(), 0.125));
        assert_eq!(parse_percentage("n/a%", ','), None);
        assert_eq!(parse_percentage("%", ','), None);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("00:01:23"), Some(Duration::seconds(83)));
        assert_eq!(parse_duration("1:02:03"), Some(Duration::seconds(3723)));
        assert_eq!(parse_duration("1:00"), Some(Duration::seconds(60)));
        assert_eq!(parse_duration("<1:00"), Some(Duration::seconds(60)));
        assert_eq!(parse_duration(" < 00:00:01 "), Some(Duration::seconds(1)));
        assert_eq!(parse_duration("125:00:00"), Some(Duration::hours(125)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration("90"), None);
        assert_eq!(parse_duration("1:2:3:4"), None);
        assert_eq!(parse_duration("00:61:00"), None);
        assert_eq!(parse_duration("1:60"), None);
        assert_eq!(parse_duration("-1:00"), None);
        assert_eq!(parse_duration("1::00"), None);
    }

    #[test]
    fn test_grouped_number_pattern() {
        let pattern = grouped_number_pattern(',').unwrap();
        assert!(pattern.is_match("2,000"));
        assert!(pattern.is_match("1,234,567.5"));
        assert!(pattern.is_match("-12,000"));
        assert!(!pattern.is_match("2000"));
        assert!(!pattern.is_match("20,00"));
        assert!(!pattern.is_match("1,2345"));
        assert!(!pattern.is_match("/blog/1,000-tips"));

        let dotted = grouped_number_pattern('.').unwrap();
        assert!(dotted.is_match("2.000"));
        assert!(!dotted.is_match("2,000"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration_ms(0), "00:00:00");
        assert_eq!(format_duration_ms(83_000), "00:01:23");
        assert_eq!(format_duration_ms(3_723_000), "01:02:03");
        assert_eq!(format_duration_ms(450_000_000), "125:00:00");
    }
}
