pub mod admin;
pub mod manager;

use chrono::NaiveDate;

/// Date filtering shared by the list screens: everything, a single day, or
/// an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    All,
    On(NaiveDate),
    Between(NaiveDate, NaiveDate),
}

impl DateFilter {
    /// The inclusive range this filter selects
    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        match *self {
            DateFilter::All => (NaiveDate::MIN, NaiveDate::MAX),
            DateFilter::On(date) => (date, date),
            DateFilter::Between(start, end) => (start, end),
        }
    }
}
