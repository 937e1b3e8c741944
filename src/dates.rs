use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

fn year_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{4})\s*[-/.年]\s*(\d{1,2})(?:\s*[-/.月]\s*(\d{1,2}))?").unwrap()
    })
}

fn month_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2})\s*月").unwrap())
}

fn valid_month(m: u32) -> Option<u32> {
    (1..=12).contains(&m).then_some(m)
}

/// Parse a full calendar date: `2025-03-14`, `2025/3/14`, `2025.03.14`,
/// `2025年3月14日`, or an RFC 3339 timestamp (date part only).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let caps = year_month_re().captures(raw.trim())?;
    let y: i32 = caps[1].parse().ok()?;
    let m: u32 = caps[2].parse().ok()?;
    let d: u32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Month of a date-ish string. Accepts everything `parse_date` does plus
/// year-month forms like `2025-03` or `2025年3月`.
pub fn month_of_date(raw: &str) -> Option<u32> {
    let caps = year_month_re().captures(raw.trim())?;
    let m: u32 = caps[2].parse().ok()?;
    if caps.get(3).is_some() {
        return parse_date(raw).map(|d| chrono::Datelike::month(&d));
    }
    valid_month(m)
}

/// Month from a Chinese month token such as `3月` (Arabic digits only).
/// The first token in the text wins.
pub fn month_token(raw: &str) -> Option<u32> {
    let caps = month_token_re().captures(raw)?;
    valid_month(caps[1].parse().ok()?)
}

/// Free-text month: a date or year-month first, else a month token.
pub fn month_of_text(raw: &str) -> Option<u32> {
    month_of_date(raw).or_else(|| month_token(raw))
}

/// Last calendar day of `month` in `year`.
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (y, m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
}
