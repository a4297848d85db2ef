use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{BurndownError, Result};

/// Inclusive calendar range a sprint is tracked over.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SprintWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SprintWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let window = Self { start, end };
        window.duration_days()?;
        Ok(window)
    }

    /// Number of calendar days in the window, both ends included.
    pub fn duration_days(&self) -> Result<usize> {
        if self.end < self.start {
            return Err(BurndownError::InvalidWindow {
                start: self.start,
                end: self.end,
            });
        }
        let days = self.end.signed_duration_since(self.start).num_days() + 1;
        Ok(days as usize)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for SprintWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
