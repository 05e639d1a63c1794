use chrono::{DateTime, Datelike, Utc};

/// Calendar time source for issuance.
///
/// Numbers embed the allocation year, and documents carry creation
/// timestamps; both come from here so tests can pin time (and exercise year
/// rollover) without touching the wall clock.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar year used for counter selection and the number's year suffix.
    fn current_year(&self) -> i32 {
        self.now().year()
    }
}

/// Wall-clock [`Clock`] backed by `chrono::Utc`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A [`Clock`] pinned to a fixed instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Midnight UTC, January 1st of `year`.
    ///
    /// # Panics
    ///
    /// Panics if `year` is outside `0..=9999`.
    pub fn start_of_year(year: i32) -> Self {
        Self(
            DateTime::parse_from_rfc3339(&format!("{year:04}-01-01T00:00:00Z"))
                .expect("valid year")
                .with_timezone(&Utc),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
