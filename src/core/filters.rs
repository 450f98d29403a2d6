//! Filters for the cross-user time entry listing.
//!
//! Filters arrive either as raw query-string values (parsed with
//! [`TimeEntryFilters::parse`]) or as a deserialized body (checked with
//! [`TimeEntryFilters::validate`]).

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw, unparsed filter values as they appear in a query string.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawFilters<'a> {
    /// Free-text query
    pub query: Option<&'a str>,
    /// Comma separated category ids
    pub category_ids: Option<&'a str>,
    /// Comma separated user ids
    pub user_ids: Option<&'a str>,
    /// Inclusive lower date bound, `YYYY-MM-DD`
    pub from_date: Option<&'a str>,
    /// Inclusive upper date bound, `YYYY-MM-DD`
    pub to_date: Option<&'a str>,
}

/// Parsed filters for `time_entry::list`. Empty fields do not filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeEntryFilters {
    /// Matched against entry description, user name and category title
    pub query: String,
    /// Only entries logged against these categories
    pub category_ids: Vec<i64>,
    /// Only entries logged by these users
    pub user_ids: Vec<i64>,
    /// Earliest date, inclusive
    pub from_date: Option<NaiveDate>,
    /// Latest date, inclusive
    pub to_date: Option<NaiveDate>,
}

/// Parses an ISO calendar date, naming the offending field on failure.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn parse_ids(raw: Option<&str>, invalid: fn(String) -> Error) -> Result<Vec<i64>> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.parse().map_err(|_| invalid(segment.to_string())))
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl TimeEntryFilters {
    /// Parses raw query-string values.
    ///
    /// # Errors
    /// `InvalidCategoryId`/`InvalidUserId` for ids that are not integers,
    /// `InvalidDate` for malformed dates, `InvalidDateRange` when the from date
    /// is after the to date.
    pub fn parse(raw: &RawFilters<'_>) -> Result<Self> {
        let filters = Self {
            query: non_empty(raw.query).unwrap_or_default().to_string(),
            category_ids: parse_ids(raw.category_ids, |value| Error::InvalidCategoryId {
                value,
            })?,
            user_ids: parse_ids(raw.user_ids, |value| Error::InvalidUserId { value })?,
            from_date: non_empty(raw.from_date)
                .map(|v| parse_date("from date", v))
                .transpose()?,
            to_date: non_empty(raw.to_date)
                .map(|v| parse_date("to date", v))
                .transpose()?,
        };
        filters.validate()?;
        Ok(filters)
    }

    /// Checks that the date range is not inverted.
    pub fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.from_date, self.to_date) {
            if from > to {
                return Err(Error::InvalidDateRange { from, to });
            }
        }
        Ok(())
    }
}
