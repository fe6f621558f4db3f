//! Julian Day and calendar date conversion
//!
//! Closed-form integer conversions between Julian Day numbers and calendar
//! dates, in either the Julian or Gregorian calendar, following the
//! Explanatory Supplement to the Astronomical Almanac (pp. 604, 606). The
//! integer-division truncation in these published formulas is load-bearing;
//! both directions reproduce them arithmetically.

/// Which calendar to use for a conversion
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalendarKind {
    /// Julian calendar unconditionally
    Julian,
    /// Gregorian calendar unconditionally
    Gregorian,
    /// Julian before the 15 Oct 1582 reform, Gregorian from it onward
    Automatic,
}

/// A calendar date with time of day, to one-second resolution
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarDate {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

/// Three-letter month abbreviations used in regenerated title lines
pub const MONTH_ABBREV: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Last Julian-calendar day of the Gregorian reform, as an integer JD
const GREGORIAN_CUTOVER_JD: i64 = 2299160;

/// Convert a Julian Day to a calendar date, rounding to the nearest second
pub fn jd_to_calendar(tjd: f64, kind: CalendarKind) -> CalendarDate {
    let mut t = tjd + 0.5 + 0.5 / 86400.0; // Round to nearest second
    let j = t as i64; // Integer Julian Day
    t = (t - j as f64) * 24.0;
    let hour = t as i32;
    t = (t - hour as f64) * 60.0;
    let minute = t as i32;
    t = (t - minute as f64) * 60.0;
    let second = t as i32;

    let use_julian = match kind {
        CalendarKind::Julian => true,
        CalendarKind::Gregorian => false,
        CalendarKind::Automatic => j <= GREGORIAN_CUTOVER_JD,
    };

    let (year, month, day) = if use_julian {
        // Explanatory Supplement p. 606
        let jj = j + 1402;
        let k = (jj - 1) / 1461;
        let l = jj - 1461 * k;
        let n = (l - 1) / 365 - l / 1461;
        let i = l - 365 * n + 30;
        let jm = (80 * i) / 2447;
        let day = i - (2447 * jm) / 80;
        let im = jm / 11;
        let month = jm + 2 - 12 * im;
        let year = 4 * k + n + im - 4716;
        (year, month, day)
    } else {
        // Explanatory Supplement p. 604
        let mut l = j + 68569;
        let n = (4 * l) / 146097;
        l -= (146097 * n + 3) / 4;
        let i = (4000 * (l + 1)) / 1461001;
        l = l - (1461 * i) / 4 + 31;
        let jm = (80 * l) / 2447;
        let day = l - (2447 * jm) / 80;
        let lm = jm / 11;
        let month = jm + 2 - 12 * lm;
        let year = 100 * (n - 49) + i + lm;
        (year, month, day)
    };

    CalendarDate {
        year: year as i32,
        month: month as i32,
        day: day as i32,
        hour,
        minute,
        second,
    }
}

/// Convert a calendar date to a Julian Day
pub fn calendar_to_jd(date: &CalendarDate, kind: CalendarKind) -> f64 {
    let frac = (date.hour as f64 + (date.minute as f64 + date.second as f64 / 60.0) / 60.0) / 24.0
        - 0.5;

    let use_julian = match kind {
        CalendarKind::Julian => true,
        CalendarKind::Gregorian => false,
        // Keyed off the literal calendar date, not the resulting JD
        CalendarKind::Automatic => {
            date.year < 1582
                || (date.year == 1582
                    && (date.month < 10 || (date.month == 10 && date.day < 15)))
        }
    };

    let (y, m, d) = (date.year as i64, date.month as i64, date.day as i64);
    let jd = if use_julian {
        // Explanatory Supplement p. 606
        367 * y - (7 * (y + 5001 + (m - 9) / 7)) / 4 + (275 * m) / 9 + d + 1729777
    } else {
        // Explanatory Supplement p. 604
        (1461 * (y + 4800 + (m - 14) / 12)) / 4
            + (367 * (m - 2 - 12 * ((m - 14) / 12))) / 12
            - (3 * ((y + 4900 + (m - 14) / 12) / 100)) / 4
            + d
            - 32075
    };

    jd as f64 + frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) -> CalendarDate {
        CalendarDate {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    #[test]
    fn test_j2000_epoch() {
        let d = jd_to_calendar(2451545.0, CalendarKind::Automatic);
        assert_eq!(d, date(2000, 1, 1, 12, 0, 0));
        assert_eq!(
            calendar_to_jd(&date(2000, 1, 1, 12, 0, 0), CalendarKind::Automatic),
            2451545.0
        );
    }

    #[test]
    fn test_gregorian_reform_boundary() {
        // The day before the reform is 4 Oct 1582 in the Julian calendar,
        // the day of the reform is 15 Oct 1582 in the Gregorian calendar.
        assert_eq!(
            jd_to_calendar(2299159.5, CalendarKind::Automatic),
            date(1582, 10, 4, 0, 0, 0)
        );
        assert_eq!(
            jd_to_calendar(2299160.5, CalendarKind::Automatic),
            date(1582, 10, 15, 0, 0, 0)
        );
        assert_eq!(
            calendar_to_jd(&date(1582, 10, 4, 0, 0, 0), CalendarKind::Automatic),
            2299159.5
        );
        assert_eq!(
            calendar_to_jd(&date(1582, 10, 15, 0, 0, 0), CalendarKind::Automatic),
            2299160.5
        );
    }

    #[rstest]
    #[case(2305424.5, CalendarKind::Automatic)] // DE405 start epoch, 1599 DEC 09
    #[case(2525008.5, CalendarKind::Automatic)] // DE405 final epoch, 2201 FEB 20
    #[case(2299159.5, CalendarKind::Julian)]
    #[case(2299160.5, CalendarKind::Gregorian)]
    #[case(2299161.5, CalendarKind::Automatic)]
    #[case(2440423.25, CalendarKind::Automatic)] // fractional day survives
    fn test_round_trip(#[case] jd: f64, #[case] kind: CalendarKind) {
        let d = jd_to_calendar(jd, kind);
        assert_eq!(calendar_to_jd(&d, kind), jd);
    }

    #[test]
    fn test_de405_start_epoch_date() {
        let d = jd_to_calendar(2305424.5, CalendarKind::Automatic);
        assert_eq!(d, date(1599, 12, 9, 0, 0, 0));
        assert_eq!(MONTH_ABBREV[(d.month - 1) as usize], "DEC");
    }

    #[test]
    fn test_time_of_day_extraction() {
        let d = jd_to_calendar(2451545.25, CalendarKind::Automatic);
        assert_eq!((d.hour, d.minute, d.second), (18, 0, 0));
    }
}
