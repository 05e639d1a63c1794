use core::fmt;
use core::str::FromStr;

/// Prefix carried by every number issued by the archive.
pub const NUMBER_PREFIX: &str = "AGB";

/// Width of the zero-padded serial component.
pub const SERIAL_WIDTH: usize = 6;

/// A unique archive document number.
///
/// The canonical rendering is
/// `AGB [drilling_depth] {matrix} {serial:06} {yy:02}`, e.g.
/// `AGB 05-07 HQ 000001 25` or `AGB PQ 000002 25` when the classification
/// carries no drilling-depth band.
///
/// The serial is the post-increment value of the per-year counter that
/// produced this number; the year suffix is the last two digits of that
/// counter's year. Parsing via [`FromStr`] recovers the exact components, so
/// `format -> parse -> format` round-trips.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentNumber {
    drilling_depth: Option<String>,
    matrix: String,
    serial: u64,
    year_suffix: u8,
}

impl DocumentNumber {
    /// Builds a number from an allocation in `year`.
    ///
    /// The year suffix is `year % 100`; the caller guarantees `serial` came
    /// out of the counter row for that same year.
    pub fn new(
        year: i32,
        serial: u64,
        matrix: impl Into<String>,
        drilling_depth: Option<&str>,
    ) -> Self {
        Self {
            drilling_depth: drilling_depth.map(str::to_owned),
            matrix: matrix.into(),
            serial,
            year_suffix: (year.rem_euclid(100)) as u8,
        }
    }

    /// The monotonic serial component.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Last two digits of the allocation year.
    pub fn year_suffix(&self) -> u8 {
        self.year_suffix
    }

    /// The classification's matrix code.
    pub fn matrix(&self) -> &str {
        &self.matrix
    }

    /// The classification's drilling-depth band, when present.
    pub fn drilling_depth(&self) -> Option<&str> {
        self.drilling_depth.as_deref()
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.drilling_depth {
            Some(depth) => write!(
                f,
                "{NUMBER_PREFIX} {depth} {} {:0width$} {:02}",
                self.matrix,
                self.serial,
                self.year_suffix,
                width = SERIAL_WIDTH
            ),
            None => write!(
                f,
                "{NUMBER_PREFIX} {} {:0width$} {:02}",
                self.matrix,
                self.serial,
                self.year_suffix,
                width = SERIAL_WIDTH
            ),
        }
    }
}

/// Why a string failed to parse as a [`DocumentNumber`].
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseNumberError {
    /// The string does not start with the `AGB` prefix.
    #[error("missing `{NUMBER_PREFIX}` prefix")]
    MissingPrefix,

    /// The string has too few or too many whitespace-separated parts.
    #[error("expected 4 or 5 parts, found {found}")]
    PartCount { found: usize },

    /// The serial part is not a zero-padded integer.
    #[error("malformed serial: {part}")]
    Serial { part: String },

    /// The year suffix is not exactly two digits.
    #[error("malformed year suffix: {part}")]
    YearSuffix { part: String },
}

impl FromStr for DocumentNumber {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.first().copied() != Some(NUMBER_PREFIX) {
            return Err(ParseNumberError::MissingPrefix);
        }
        let (drilling_depth, matrix) = match parts.len() {
            4 => (None, parts[1]),
            5 => (Some(parts[1].to_owned()), parts[2]),
            found => return Err(ParseNumberError::PartCount { found }),
        };
        let serial_part = parts[parts.len() - 2];
        let suffix_part = parts[parts.len() - 1];

        if serial_part.len() < SERIAL_WIDTH || !serial_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseNumberError::Serial {
                part: serial_part.to_owned(),
            });
        }
        let serial = serial_part
            .parse::<u64>()
            .map_err(|_| ParseNumberError::Serial {
                part: serial_part.to_owned(),
            })?;

        if suffix_part.len() != 2 || !suffix_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseNumberError::YearSuffix {
                part: suffix_part.to_owned(),
            });
        }
        let year_suffix = suffix_part.parse::<u8>().map_err(|_| {
            ParseNumberError::YearSuffix {
                part: suffix_part.to_owned(),
            }
        })?;

        Ok(Self {
            drilling_depth,
            matrix: matrix.to_owned(),
            serial,
            year_suffix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_drilling_depth() {
        let n = DocumentNumber::new(2025, 1, "HQ", Some("05-07"));
        assert_eq!(n.to_string(), "AGB 05-07 HQ 000001 25");
    }

    #[test]
    fn formats_without_drilling_depth() {
        let n = DocumentNumber::new(2025, 2, "PQ", None);
        assert_eq!(n.to_string(), "AGB PQ 000002 25");
    }

    #[test]
    fn serial_wider_than_padding_is_not_truncated() {
        let n = DocumentNumber::new(2030, 1_234_567, "NQ", None);
        assert_eq!(n.to_string(), "AGB NQ 1234567 30");
    }

    #[test]
    fn round_trips_both_shapes() {
        for rendered in ["AGB 05-07 HQ 000123 25", "AGB PQ 004200 99"] {
            let parsed: DocumentNumber = rendered.parse().unwrap();
            assert_eq!(parsed.to_string(), rendered);
        }
    }

    #[test]
    fn parse_recovers_components() {
        let parsed: DocumentNumber = "AGB 10-12 NQ 000042 26".parse().unwrap();
        assert_eq!(parsed.drilling_depth(), Some("10-12"));
        assert_eq!(parsed.matrix(), "NQ");
        assert_eq!(parsed.serial(), 42);
        assert_eq!(parsed.year_suffix(), 26);
    }

    #[test]
    fn rejects_foreign_prefix() {
        let err = "XYZ HQ 000001 25".parse::<DocumentNumber>().unwrap_err();
        assert_eq!(err, ParseNumberError::MissingPrefix);
    }

    #[test]
    fn rejects_wrong_part_count() {
        let err = "AGB 000001 25".parse::<DocumentNumber>().unwrap_err();
        assert_eq!(err, ParseNumberError::PartCount { found: 3 });
    }

    #[test]
    fn rejects_short_serial() {
        let err = "AGB HQ 0001 25".parse::<DocumentNumber>().unwrap_err();
        assert!(matches!(err, ParseNumberError::Serial { .. }));
    }

    #[test]
    fn rejects_long_year_suffix() {
        let err = "AGB HQ 000001 2025".parse::<DocumentNumber>().unwrap_err();
        assert!(matches!(err, ParseNumberError::YearSuffix { .. }));
    }
}
