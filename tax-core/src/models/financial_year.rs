use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Australian financial year (1 July to 30 June).
///
/// The value is the calendar year the financial year ends in, so
/// `FinancialYear(2025)` is 2024-25.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinancialYear(pub i32);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid financial year '{0}': expected e.g. 2024-25 or 2025")]
pub struct ParseFinancialYearError(String);

impl FinancialYear {
    /// Financial year containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        if date.month() >= 7 {
            FinancialYear(date.year() + 1)
        } else {
            FinancialYear(date.year())
        }
    }

    /// 1 July of the previous calendar year.
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0 - 1, 7, 1)
    }

    /// 30 June.
    pub fn end_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, 6, 30)
    }

    pub fn previous(&self) -> Self {
        FinancialYear(self.0 - 1)
    }

    /// Saturates at the largest representable year.
    pub fn offset(
        &self,
        years: i32,
    ) -> Self {
        FinancialYear(self.0.saturating_add(years))
    }

    /// "2024-25" style label.
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.0 - 1, self.0.rem_euclid(100))
    }
}

impl fmt::Display for FinancialYear {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for FinancialYear {
    type Err = ParseFinancialYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseFinancialYearError(s.to_string());

        match s.split_once(['-', '/']) {
            Some((start, end)) => {
                let start: i32 = start.parse().map_err(|_| err())?;
                let end: i32 = end.parse().map_err(|_| err())?;
                let year = FinancialYear(start + 1);
                let expected_end = if end < 100 { year.0.rem_euclid(100) } else { year.0 };
                if end != expected_end {
                    return Err(err());
                }
                Ok(year)
            }
            None => s.parse().map(FinancialYear).map_err(|_| err()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn from_date_before_july_is_current_year() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();

        assert_eq!(FinancialYear::from_date(date), FinancialYear(2025));
    }

    #[test]
    fn from_date_from_july_is_next_year() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

        assert_eq!(FinancialYear::from_date(date), FinancialYear(2025));
    }

    #[test]
    fn start_and_end_dates() {
        let year = FinancialYear(2025);

        assert_eq!(year.start_date(), NaiveDate::from_ymd_opt(2024, 7, 1));
        assert_eq!(year.end_date(), NaiveDate::from_ymd_opt(2025, 6, 30));
    }

    #[test]
    fn label_uses_two_digit_end_year() {
        assert_eq!(FinancialYear(2025).label(), "2024-25");
        assert_eq!(FinancialYear(2000).to_string(), "1999-00");
    }

    #[test]
    fn parses_label_and_plain_year() {
        assert_eq!("2024-25".parse(), Ok(FinancialYear(2025)));
        assert_eq!("2024/2025".parse(), Ok(FinancialYear(2025)));
        assert_eq!("2025".parse(), Ok(FinancialYear(2025)));
    }

    #[test]
    fn rejects_mismatched_label() {
        assert!("2024-26".parse::<FinancialYear>().is_err());
        assert!("twenty".parse::<FinancialYear>().is_err());
    }
}
