//! Membership lifetimes written as `<n>d <n>h <n>m <n>s` tokens.

use chrono::{DateTime, Duration, Utc};

use crate::{Error, Result};

/// Sum every token into one duration; tokens may repeat (`1h 30m 1h`).
pub fn parse_lifetime<'a>(
  tokens: impl IntoIterator<Item = &'a str>,
) -> Result<Duration> {
  let mut total = Duration::zero();
  let mut seen = false;

  for token in tokens.into_iter().flat_map(str::split_whitespace) {
    total = total
      .checked_add(&parse_token(token)?)
      .ok_or_else(|| Error::InvalidDuration(token.to_owned()))?;
    seen = true;
  }

  if !seen {
    return Err(Error::InvalidDuration(String::new()));
  }
  Ok(total)
}

/// Expiry timestamp `lifetime` after `from`.
///
/// A lifetime reaching past the representable range is an invalid duration.
pub fn expiry_after<'a>(
  from: DateTime<Utc>,
  tokens: impl IntoIterator<Item = &'a str>,
) -> Result<DateTime<Utc>> {
  let tokens: Vec<&str> = tokens.into_iter().collect();
  from
    .checked_add_signed(parse_lifetime(tokens.iter().copied())?)
    .ok_or_else(|| Error::InvalidDuration(tokens.join(" ")))
}

fn parse_token(token: &str) -> Result<Duration> {
  let invalid = || Error::InvalidDuration(token.to_owned());

  let unit = token.chars().last().ok_or_else(invalid)?;
  let amount: i64 = token[..token.len() - unit.len_utf8()]
    .parse()
    .map_err(|_| invalid())?;
  if amount < 0 {
    return Err(invalid());
  }

  let lifetime = match unit.to_ascii_lowercase() {
    'd' => Duration::try_days(amount),
    'h' => Duration::try_hours(amount),
    'm' => Duration::try_minutes(amount),
    's' => Duration::try_seconds(amount),
    _ => None,
  };
  lifetime.ok_or_else(invalid)
}
