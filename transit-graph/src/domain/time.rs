//! Timetable time handling.
//!
//! The timetable feed gives times as `HHMM` tokens, optionally suffixed with
//! `H` for a half minute (`0930H` is 09:30:30). Times only carry the time of
//! day, so a schedule that runs past midnight appears to go backwards; the
//! normalizer turns one schedule's tokens into a non-decreasing sequence of
//! minute offsets.

/// Minutes in one day.
pub const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Tolerance when comparing against the previously emitted value.
const EPSILON: f64 = 1e-6;

/// Suffix marking a half-minute time.
const HALF_MINUTE_SUFFIX: char = 'H';

/// Parse one `HHMM[H]` token into minutes since midnight of its own day.
///
/// Returns `None` for an empty token or anything that is not 3-4 digits
/// (after removing a trailing `H`).
///
/// ```
/// use transit_graph::domain::parse_time_token;
///
/// assert_eq!(parse_time_token("0930"), Some(570.0));
/// assert_eq!(parse_time_token("930"), Some(570.0));
/// assert_eq!(parse_time_token("0930H"), Some(570.5));
/// assert_eq!(parse_time_token(""), None);
/// assert_eq!(parse_time_token("09:30"), None);
/// ```
pub fn parse_time_token(raw: &str) -> Option<f64> {
    let token = raw.trim();
    let (digits, half) = match token.strip_suffix(HALF_MINUTE_SUFFIX) {
        Some(rest) => (rest, true),
        None => (token, false),
    };

    if !(3..=4).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let split = digits.len() - 2;
    let hours: u32 = digits[..split].parse().ok()?;
    let minutes: u32 = digits[split..].parse().ok()?;

    let base = f64::from(hours * 60 + minutes);
    Some(if half { base + 0.5 } else { base })
}

/// Reduce an absolute minute offset to a time of day.
pub fn time_of_day(minutes: f64) -> f64 {
    minutes.rem_euclid(MINUTES_PER_DAY)
}

/// Turns the time tokens of one schedule into non-decreasing minute offsets.
///
/// Whenever a freshly parsed time would fall before the last value returned,
/// the schedule is assumed to have crossed midnight and a day is added. State
/// is per schedule: build a new normalizer for each one.
///
/// # Examples
///
/// ```
/// use transit_graph::domain::TimeNormalizer;
///
/// let mut normalizer = TimeNormalizer::new();
/// assert_eq!(normalizer.parse("2350"), Some(1430.0));
/// assert_eq!(normalizer.parse("0010"), Some(1450.0));
/// assert_eq!(normalizer.parse("0015H"), Some(1455.5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimeNormalizer {
    day_offset: u32,
    last_value: Option<f64>,
}

impl TimeNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a token, adding whole days as needed to stay non-decreasing.
    ///
    /// Empty or malformed tokens return `None` and leave the state untouched.
    pub fn parse(&mut self, raw: &str) -> Option<f64> {
        let base = parse_time_token(raw)?;
        let mut minutes = self.offset(base);

        if let Some(last) = self.last_value {
            while minutes + EPSILON < last {
                self.day_offset += 1;
                minutes = self.offset(base);
            }
        }

        if self.last_value.is_none_or(|last| minutes > last) {
            self.last_value = Some(minutes);
        }
        Some(minutes)
    }

    /// Convenience for optional tokens straight from the feed.
    pub fn parse_opt(&mut self, raw: Option<&str>) -> Option<f64> {
        raw.and_then(|token| self.parse(token))
    }

    /// Number of midnights crossed so far.
    pub fn day_offset(&self) -> u32 {
        self.day_offset
    }

    fn offset(&self, base: f64) -> f64 {
        base + f64::from(self.day_offset) * MINUTES_PER_DAY
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn token() -> impl Strategy<Value = String> {
        (0u32..24, 0u32..60, any::<bool>()).prop_map(|(h, m, half)| {
            format!("{:02}{:02}{}", h, m, if half { "H" } else { "" })
        })
    }

    proptest! {
        /// Output of one normalizer never decreases
        #[test]
        fn non_decreasing(tokens in prop::collection::vec(token(), 0..40)) {
            let mut n = TimeNormalizer::new();
            let mut prev: Option<f64> = None;
            for t in &tokens {
                let value = n.parse(t).unwrap();
                if let Some(p) = prev {
                    prop_assert!(value + EPSILON >= p);
                }
                prev = Some(value);
            }
        }

        /// Time of day of each output equals the parsed token
        #[test]
        fn preserves_time_of_day(tokens in prop::collection::vec(token(), 1..40)) {
            let mut n = TimeNormalizer::new();
            for t in &tokens {
                let value = n.parse(t).unwrap();
                let expected = parse_time_token(t).unwrap();
                prop_assert!((time_of_day(value) - expected).abs() < EPSILON);
            }
        }
    }
}
