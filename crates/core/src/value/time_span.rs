//! Canonical text form of time spans: `[-][d.]hh:mm:ss[.fffffffff]`.

use chrono::TimeDelta;

const SECONDS_PER_DAY: i64 = 86_400;

/// Formats a time span in its canonical form.
///
/// The day group is omitted when zero and the fraction is trimmed of
/// trailing zeros.
pub fn format(span: &TimeDelta) -> String {
    let negative = *span < TimeDelta::zero();
    let magnitude = if negative { -*span } else { *span };

    let seconds = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos();
    let days = seconds / SECONDS_PER_DAY;
    let hours = seconds % SECONDS_PER_DAY / 3600;
    let minutes = seconds % 3600 / 60;
    let secs = seconds % 60;

    let mut out = String::with_capacity(24);
    if negative {
        out.push('-');
    }
    if days > 0 {
        out.push_str(&format!("{days}."));
    }
    out.push_str(&format!("{hours:02}:{minutes:02}:{secs:02}"));
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

/// Parses the canonical form, plus `hh:mm` and a bare day count.
pub fn parse(text: &str) -> Result<TimeDelta, &'static str> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if body.is_empty() {
        return Err("empty time span");
    }

    let span = if body.contains(':') {
        parse_clock(body)?
    } else {
        let days = parse_number(body).ok_or("expected a day count")?;
        TimeDelta::try_days(days).ok_or("day count out of range")?
    };

    Ok(if negative { -span } else { span })
}

fn parse_clock(body: &str) -> Result<TimeDelta, &'static str> {
    let mut groups = body.split(':');
    let head = groups.next().ok_or("missing hours")?;
    let (days, hours) = match head.split_once('.') {
        Some((days, hours)) => (parse_number(days).ok_or("invalid day count")?, hours),
        None => (0, head),
    };
    let hours = parse_component(hours, 23).ok_or("hours must be 00-23")?;
    let minutes = parse_component(groups.next().ok_or("missing minutes")?, 59)
        .ok_or("minutes must be 00-59")?;

    let (seconds, nanos) = match groups.next() {
        None => (0, 0),
        Some(group) => {
            let (whole, fraction) = match group.split_once('.') {
                Some((whole, fraction)) => (whole, Some(fraction)),
                None => (group, None),
            };
            let seconds = parse_component(whole, 59).ok_or("seconds must be 00-59")?;
            let nanos = match fraction {
                Some(fraction) => parse_fraction(fraction).ok_or("fraction must be 1-9 digits")?,
                None => 0,
            };
            (seconds, nanos)
        }
    };
    if groups.next().is_some() {
        return Err("too many ':' separated groups");
    }

    let total = days
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|s| s.checked_add(hours * 3600 + minutes * 60 + seconds))
        .ok_or("time span out of range")?;
    TimeDelta::new(total, nanos).ok_or("time span out of range")
}

fn parse_number(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_component(text: &str, max: i64) -> Option<i64> {
    if text.len() != 2 {
        return None;
    }
    parse_number(text).filter(|n| *n <= max)
}

fn parse_fraction(text: &str) -> Option<u32> {
    if text.is_empty() || text.len() > 9 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{text:0<9}");
    padded.parse().ok()
}
