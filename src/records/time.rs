use crate::error::TimeError;

const MS_PER_MINUTE: u32 = 60_000;
const MS_PER_SECOND: u32 = 1_000;

// players paste times from all kinds of keyboards and chat clients
const DOUBLE_QUOTES: [char; 3] = ['\u{201C}', '\u{201D}', '\u{2033}'];
const SINGLE_QUOTES: [char; 3] = ['\u{2018}', '\u{2019}', '\u{2032}'];

fn normalize(time_str: &str) -> String {
    time_str
        .trim()
        .chars()
        .map(|c| match c {
            c if DOUBLE_QUOTES.contains(&c) => '"',
            c if SINGLE_QUOTES.contains(&c) => '\'',
            c => c,
        })
        .collect()
}

#[inline]
fn digits(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}

fn parse_field(field: &str, original: &str) -> Result<u32, TimeError> {
    if !digits(field) {
        return Err(TimeError::InvalidFormat(original.to_owned()));
    }
    field
        .parse::<u32>()
        .map_err(|_| TimeError::InvalidFormat(original.to_owned()))
}

/// Splits a normalized time into its minute, second and millisecond fields.
fn split_fields(normalized: &str) -> Option<(&str, &str, &str)> {
    let (minutes, rest) = normalized.split_once('\'')?;
    let (seconds, millis) = match rest.split_once('"') {
        Some((s, ms)) if s.len() == 2 && !ms.is_empty() => (s, ms),
        Some(_) => return None,
        // legacy submissions without the quote: two digits of seconds then millis
        None if rest.len() >= 2 && rest.is_char_boundary(2) => rest.split_at(2),
        None => return None,
    };

    Some((minutes, seconds, millis))
}

/// Converts `M'SS"mmm` into a millisecond count.
pub fn decode(time_str: &str) -> Result<u32, TimeError> {
    let normalized = normalize(time_str);
    let (m, s, ms) = split_fields(&normalized)
        .ok_or_else(|| TimeError::InvalidFormat(time_str.to_owned()))?;
    let minutes = parse_field(m, time_str)?;
    let seconds = parse_field(s, time_str)?;
    let millis = parse_field(ms, time_str)?;

    total_ms(minutes, seconds, millis)
}

fn total_ms(minutes: u32, seconds: u32, millis: u32) -> Result<u32, TimeError> {
    minutes
        .checked_mul(MS_PER_MINUTE)
        .and_then(|total| total.checked_add(seconds.checked_mul(MS_PER_SECOND)?))
        .and_then(|total| total.checked_add(millis))
        .ok_or(TimeError::TooLong {
            minutes,
            seconds,
            millis,
        })
}

/// The stricter shape required of new submissions: `\d+'\d{2}"?\d{3}` with
/// seconds below a minute.
pub fn validate_submission(time_str: &str) -> Result<u32, TimeError> {
    let normalized = normalize(time_str);
    let (m, s, ms) = split_fields(&normalized)
        .ok_or_else(|| TimeError::InvalidFormat(time_str.to_owned()))?;
    if !digits(m) || !digits(s) || !digits(ms) || ms.len() != 3 {
        return Err(TimeError::InvalidFormat(time_str.to_owned()));
    }
    let seconds = parse_field(s, time_str)?;
    if seconds > 59 {
        return Err(TimeError::OutOfRange {
            seconds,
            millis: parse_field(ms, time_str)?,
        });
    }

    decode(&normalized)
}

pub fn encode(minutes: u32, seconds: u32, millis: u32) -> Result<String, TimeError> {
    if seconds > 59 || millis > 999 {
        return Err(TimeError::OutOfRange { seconds, millis });
    }
    // anything encoded has to decode again
    total_ms(minutes, seconds, millis)?;

    Ok(format!("{}'{:0>2}\"{:0>3}", minutes, seconds, millis))
}

pub fn format_ms(ms: u32) -> String {
    let minutes = ms / MS_PER_MINUTE;
    let rem = ms % MS_PER_MINUTE;

    format!(
        "{}'{:0>2}\"{:0>3}",
        minutes,
        rem / MS_PER_SECOND,
        rem % MS_PER_SECOND
    )
}
