use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

/// Time slots offered by the table reservation form
pub const STANDARD_SLOTS: [&str; 14] = [
    "09:00-10:00",
    "10:00-11:00",
    "11:00-12:00",
    "12:00-13:00",
    "13:00-14:00",
    "14:00-15:00",
    "15:00-16:00",
    "16:00-17:00",
    "17:00-18:00",
    "18:00-19:00",
    "19:00-20:00",
    "20:00-21:00",
    "21:00-22:00",
    "22:00-23:00",
];

/// A time-like value exactly as the datastore driver or a form field handed
/// it back. TIME columns come back in several shapes depending on the driver,
/// so the shape is made explicit here instead of being sniffed at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTime {
    /// Duration elapsed since midnight
    Elapsed(TimeDelta),
    /// Combined date and time; only the time-of-day is kept
    Stamp(NaiveDateTime),
    /// Already a bare time-of-day
    Clock(NaiveTime),
    /// Raw text from a form field or a stringly-typed column
    Text(String),
    /// NULL column or absent field
    Missing,
}

impl From<NaiveTime> for RawTime {
    fn from(t: NaiveTime) -> Self {
        RawTime::Clock(t)
    }
}

/// Fallback used whenever a value cannot be read as a time-of-day.
///
/// Midnight is also a legal real value; callers cannot tell "unset" apart
/// from an actual 00:00.
pub fn fallback_time() -> NaiveTime {
    NaiveTime::MIN
}

/// Reduce any raw time shape to a canonical time-of-day. Total: every parse
/// failure maps to [`fallback_time`], nothing is ever raised to the caller.
pub fn normalize(raw: RawTime) -> NaiveTime {
    match raw {
        RawTime::Elapsed(delta) => {
            let total_seconds = delta.num_seconds();
            // Durations of a day or more do not fit a time-of-day and are not
            // wrapped; they land on the fallback like any other bad value.
            if !(0..86_400).contains(&total_seconds) {
                return fallback_time();
            }
            let hours = (total_seconds / 3600) as u32;
            let minutes = ((total_seconds % 3600) / 60) as u32;
            NaiveTime::from_hms_opt(hours, minutes, 0).unwrap_or_else(fallback_time)
        }
        RawTime::Stamp(stamp) => stamp.time(),
        RawTime::Clock(time) => time,
        RawTime::Text(text) => parse_text(&text).unwrap_or_else(fallback_time),
        RawTime::Missing => fallback_time(),
    }
}

/// Strict fixed-width parse of a textual time.
///
/// Digits-only input is an hour ("9" becomes "09:00"); otherwise exactly
/// five characters are read as HH:MM and exactly eight as HH:MM:SS.
pub fn parse_text(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let padded;
    let text = if text.chars().all(|c| c.is_ascii_digit()) {
        padded = format!("{:0>2}:00", text);
        padded.as_str()
    } else {
        text
    };

    match text.len() {
        5 => NaiveTime::parse_from_str(text, "%H:%M").ok(),
        8 => NaiveTime::parse_from_str(text, "%H:%M:%S").ok(),
        _ => None,
    }
}

/// Format a time for showing to a person (24-hour HH:MM)
pub fn to_display(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Format a time for persisting to the datastore (HH:MM:SS)
pub fn to_storage(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// A reservation's reserved period, persisted as a "HH:MM-HH:MM" token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    /// The pair substituted for any malformed slot token
    pub fn fallback() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_else(fallback_time),
            end: NaiveTime::from_hms_opt(13, 0, 0).unwrap_or_else(fallback_time),
        }
    }

    /// Decode a slot token. The token must contain exactly one hyphen and
    /// both sides must parse strictly, otherwise the fallback pair is
    /// returned. Never errors.
    pub fn decode(token: &str) -> Self {
        if token.matches('-').count() != 1 {
            return Self::fallback();
        }
        let (start, end) = match token.split_once('-') {
            Some(parts) => parts,
            None => return Self::fallback(),
        };
        match (parse_text(start), parse_text(end)) {
            (Some(start), Some(end)) => Self { start, end },
            _ => Self::fallback(),
        }
    }

    /// Encode the slot back to its token form. The start is not required to
    /// precede the end; an inverted pair round-trips untouched.
    pub fn encode(&self) -> String {
        format!("{}-{}", to_display(self.start), to_display(self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_parse_text() {
        // Valid cases
        assert_eq!(parse_text("00:00"), Some(hm(0, 0)));
        assert_eq!(parse_text("12:30"), Some(hm(12, 30)));
        assert_eq!(parse_text("23:59"), Some(hm(23, 59)));
        assert_eq!(parse_text("08:15:45"), NaiveTime::from_hms_opt(8, 15, 45));
        assert_eq!(parse_text("  09:00  "), Some(hm(9, 0)));

        // Digits-only input is an hour
        assert_eq!(parse_text("9"), Some(hm(9, 0)));
        assert_eq!(parse_text("23"), Some(hm(23, 0)));

        // Invalid cases
        assert_eq!(parse_text(""), None);
        assert_eq!(parse_text("24:00"), None); // Hour out of range
        assert_eq!(parse_text("12:60"), None); // Minute out of range
        assert_eq!(parse_text("9:30"), None); // Not fixed-width
        assert_eq!(parse_text("123"), None); // Padded to "123:00", wrong width
        assert_eq!(parse_text("garbage!"), None);
        assert_eq!(parse_text("12:ab"), None);
    }

    #[test]
    fn test_normalize_elapsed() {
        // 90 minutes since midnight
        assert_eq!(
            normalize(RawTime::Elapsed(TimeDelta::seconds(5400))),
            hm(1, 30)
        );
        // Seconds are dropped
        assert_eq!(
            normalize(RawTime::Elapsed(TimeDelta::seconds(5459))),
            hm(1, 30)
        );
        assert_eq!(normalize(RawTime::Elapsed(TimeDelta::seconds(0))), hm(0, 0));
        assert_eq!(
            normalize(RawTime::Elapsed(TimeDelta::seconds(23 * 3600 + 59 * 60))),
            hm(23, 59)
        );

        // A day or more is not wrapped
        assert_eq!(
            normalize(RawTime::Elapsed(TimeDelta::hours(25))),
            fallback_time()
        );
        assert_eq!(
            normalize(RawTime::Elapsed(TimeDelta::seconds(-1))),
            fallback_time()
        );
        // Huge durations must not alias back into range either
        assert_eq!(
            normalize(RawTime::Elapsed(TimeDelta::seconds(
                ((1_i64 << 32) + 9) * 3600
            ))),
            fallback_time()
        );
    }

    #[test]
    fn test_normalize_stamp_and_clock() {
        let stamp =
            NaiveDateTime::parse_from_str("2024-05-01 18:45:10", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(
            normalize(RawTime::Stamp(stamp)),
            NaiveTime::from_hms_opt(18, 45, 10).unwrap()
        );
        assert_eq!(normalize(RawTime::Clock(hm(7, 5))), hm(7, 5));
    }

    #[test]
    fn test_normalize_text_and_missing() {
        assert_eq!(normalize(RawTime::Text("14:30".to_string())), hm(14, 30));
        assert_eq!(normalize(RawTime::Text("9".to_string())), hm(9, 0));
        assert_eq!(normalize(RawTime::Text(String::new())), fallback_time());
        assert_eq!(
            normalize(RawTime::Text("not a time".to_string())),
            fallback_time()
        );
        assert_eq!(normalize(RawTime::Missing), fallback_time());
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["00:00", "09:05", "13:37", "23:59"] {
            let time = normalize(RawTime::Text(text.to_string()));
            assert_eq!(to_display(time), text);
        }
    }

    #[test]
    fn test_storage_round_trip() {
        for text in ["00:00:00", "09:05:30", "23:59:59"] {
            let time = normalize(RawTime::Text(text.to_string()));
            assert_eq!(to_storage(time), text);
        }
        // HH:MM input persists with zero seconds
        let time = normalize(RawTime::Text("10:15".to_string()));
        assert_eq!(to_storage(time), "10:15:00");
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = vec![
            RawTime::Elapsed(TimeDelta::seconds(5400)),
            RawTime::Text("22:10".to_string()),
            RawTime::Text("junk".to_string()),
            RawTime::Clock(hm(6, 0)),
            RawTime::Missing,
        ];
        for raw in inputs {
            let once = normalize(raw.clone());
            let twice = normalize(RawTime::Text(to_storage(once)));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_slot_decode() {
        let slot = TimeSlot::decode("09:00-10:00");
        assert_eq!(slot.start, hm(9, 0));
        assert_eq!(slot.end, hm(10, 0));

        // Malformed tokens fall back to 12:00-13:00
        assert_eq!(TimeSlot::decode("garbage"), TimeSlot::fallback());
        assert_eq!(TimeSlot::decode("09:00"), TimeSlot::fallback()); // no hyphen
        assert_eq!(TimeSlot::decode("09:00-10:00-11:00"), TimeSlot::fallback());
        assert_eq!(TimeSlot::decode("09:00-junk"), TimeSlot::fallback());
        assert_eq!(TimeSlot::fallback().start, hm(12, 0));
        assert_eq!(TimeSlot::fallback().end, hm(13, 0));
    }

    #[test]
    fn test_slot_encode() {
        let slot = TimeSlot {
            start: hm(18, 30),
            end: hm(20, 0),
        };
        assert_eq!(slot.encode(), "18:30-20:00");
        assert_eq!(TimeSlot::decode(&slot.encode()), slot);

        // No ordering is enforced
        let inverted = TimeSlot {
            start: hm(20, 0),
            end: hm(18, 30),
        };
        assert_eq!(inverted.encode(), "20:00-18:30");
        assert_eq!(TimeSlot::decode(&inverted.encode()), inverted);
    }

    #[test]
    fn test_standard_slots_round_trip() {
        for token in STANDARD_SLOTS {
            assert_eq!(TimeSlot::decode(token).encode(), token);
        }
    }
}
