/*!
Small calendar helpers for the proleptic Gregorian calendar.

These deliberately never lean on date arithmetic from Jiff. Adding a month to
`2025-01-31` in Jiff constrains the result to `2025-02-28`, but a repeat rule
anchored on the 31st must *skip* February instead. So candidate dates are
assembled from their components here, and a day that doesn't exist in a given
month is reported as missing instead of being clamped or rolled over.
*/

use jiff::civil::Date;

/// The smallest year supported by `jiff::civil::Date`.
const MIN_YEAR: i64 = -9999;
/// The largest year supported by `jiff::civil::Date`.
const MAX_YEAR: i64 = 9999;

/// Returns true if and only if `year` is a leap year.
pub fn is_leap_year(year: i16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns the number of days in the given month of the given year.
///
/// The value returned is always in the range `28..=31`.
///
/// # Panics
///
/// When `month` is not in the range `1..=12`.
pub fn days_in_month(year: i16, month: i8) -> i8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => panic!("invalid month `{month}` (must be in range 1..=12)"),
    }
}

/// Returns the date with the given components, but only if the day actually
/// exists in that month.
///
/// `None` is returned when the year is out of Jiff's supported range, when
/// the month is invalid or when the day is outside of
/// `1..=days_in_month(year, month)`.
pub fn date(year: i16, month: i8, day: i8) -> Option<Date> {
    if !(1..=12).contains(&month) {
        return None;
    }
    if !(1..=days_in_month(year, month)).contains(&day) {
        return None;
    }
    Date::new(year, month, day).ok()
}

/// Adds the given number of months to a year and month pair.
///
/// `None` is returned if the resulting year falls outside of Jiff's supported
/// range of years.
pub fn add_months(year: i16, month: i8, months: i64) -> Option<(i16, i8)> {
    let index = i64::from(year)
        .checked_mul(12)?
        .checked_add(i64::from(month) - 1)?
        .checked_add(months)?;
    let year = index.div_euclid(12);
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    let month = index.rem_euclid(12) + 1;
    Some((i16::try_from(year).ok()?, i8::try_from(month).ok()?))
}

/// Adds the given number of years to `year`.
///
/// `None` is returned if the resulting year falls outside of Jiff's supported
/// range of years.
pub fn add_years(year: i16, years: i64) -> Option<i16> {
    let year = i64::from(year).checked_add(years)?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    i16::try_from(year).ok()
}

#[cfg(test)]
mod tests {
    use jiff::civil;

    use super::*;

    #[test]
    fn leap_years() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(is_leap_year(0));
        assert!(is_leap_year(-4));
        assert!(!is_leap_year(2025));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2100));
    }

    #[test]
    fn month_lengths() {
        let lengths: Vec<i8> =
            (1..=12).map(|month| days_in_month(2025, month)).collect();
        assert_eq!(lengths, [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
    }

    // Every month length must agree with Jiff's own notion of the calendar.
    #[test]
    fn month_lengths_agree_with_jiff() {
        for year in [1600, 1900, 1999, 2000, 2023, 2024, 2100] {
            for month in 1..=12 {
                let first = civil::date(year, month, 1);
                assert_eq!(
                    days_in_month(year, month),
                    first.days_in_month(),
                    "{year:04}-{month:02}",
                );
            }
        }
    }

    #[test]
    #[should_panic]
    fn month_out_of_range() {
        days_in_month(2025, 13);
    }

    #[test]
    fn date_rejects_missing_days() {
        assert_eq!(date(2025, 1, 31), Some(civil::date(2025, 1, 31)));
        assert_eq!(date(2025, 2, 29), None);
        assert_eq!(date(2024, 2, 29), Some(civil::date(2024, 2, 29)));
        assert_eq!(date(2025, 4, 31), None);
        assert_eq!(date(2025, 4, 0), None);
        assert_eq!(date(2025, 0, 1), None);
        assert_eq!(date(2025, 13, 1), None);
    }

    #[test]
    fn month_arithmetic() {
        assert_eq!(add_months(2025, 1, 0), Some((2025, 1)));
        assert_eq!(add_months(2025, 1, 1), Some((2025, 2)));
        assert_eq!(add_months(2025, 11, 2), Some((2026, 1)));
        assert_eq!(add_months(2025, 12, 13), Some((2027, 1)));
        assert_eq!(add_months(2025, 1, -1), Some((2024, 12)));
        assert_eq!(add_months(9999, 12, 1), None);
        assert_eq!(add_months(-9999, 1, -1), None);
        assert_eq!(add_months(2025, 1, i64::MAX), None);
    }

    #[test]
    fn year_arithmetic() {
        assert_eq!(add_years(2024, 4), Some(2028));
        assert_eq!(add_years(9998, 1), Some(9999));
        assert_eq!(add_years(9999, 1), None);
        assert_eq!(add_years(2024, i64::MAX), None);
    }
}
