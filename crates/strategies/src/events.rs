use crate::error::StrategyError;
use chrono::{Days, NaiveDate};
use std::collections::BTreeSet;
use std::path::Path;

/// Calendar days an event stays investable, begin date included.
pub const DEFAULT_WINDOW_DAYS: u32 = 5;

/// The set of dates that fall inside at least one event window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventWindows {
    investable: BTreeSet<NaiveDate>,
}

impl EventWindows {
    /// Expands every begin date `D` into the closed range
    /// `[D, D + window_days - 1]` and takes the union.
    pub fn from_begin_dates(
        begin_dates: impl IntoIterator<Item = NaiveDate>,
        window_days: u32,
    ) -> Result<Self, StrategyError> {
        if window_days == 0 {
            return Err(StrategyError::InvalidParameters(
                "event window must span at least one day".to_string(),
            ));
        }

        let mut investable = BTreeSet::new();
        for begin in begin_dates {
            for offset in 0..u64::from(window_days) {
                let Some(day) = begin.checked_add_days(Days::new(offset)) else {
                    break;
                };
                investable.insert(day);
            }
        }
        Ok(Self { investable })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.investable.contains(&date)
    }

    pub fn investable_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.investable.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.investable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.investable.is_empty()
    }
}

/// Loads event begin dates from the first sheet of a spreadsheet.
pub fn load_event_windows(
    path: &Path,
    begin_column: &str,
    window_days: u32,
) -> Result<EventWindows, StrategyError> {
    let begin_dates = workbook::read_date_column(path, begin_column)?;
    let windows = EventWindows::from_begin_dates(begin_dates.iter().copied(), window_days)?;
    tracing::info!(
        events = begin_dates.len(),
        investable_days = windows.len(),
        path = %path.display(),
        "Event calendar loaded"
    );
    Ok(windows)
}
