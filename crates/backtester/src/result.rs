use crate::error::BacktestError;
use analytics::PerformanceReport;
use core_types::{PriceTable, WeightTable};
use std::path::{Path, PathBuf};
use workbook::{Cell, Sheet, WorkbookWriter};

/// Everything a finished simulation produces.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub name: String,
    pub stats: PerformanceReport,
    /// Portfolio value rebased to 100, one column named after the run.
    pub prices: PriceTable,
    /// Realised weights: position value over equity at each date's close.
    pub weights: WeightTable,
}

impl BacktestResult {
    pub fn file_name(&self) -> String {
        format!("backtest_data_{}.xlsx", self.name)
    }

    /// Writes `backtest_data_<name>.xlsx` under `dir` with sheets `Stats`,
    /// `Prices` and `Weights`. Returns the written path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, BacktestError> {
        let path = dir.join(self.file_name());

        let mut writer = WorkbookWriter::new();
        writer
            .add_sheet(self.stats_sheet())
            .add_sheet(Sheet::from_frame("Prices", "Date", &self.prices))
            .add_sheet(Sheet::from_frame("Weights", "Date", &self.weights));
        writer.save(&path)?;

        tracing::info!(run = %self.name, path = %path.display(), "Backtest results written");
        Ok(path)
    }

    fn stats_sheet(&self) -> Sheet {
        let mut sheet = Sheet::new("Stats", vec!["Stat".to_string(), self.name.clone()]);
        sheet.push_row(vec![Cell::from("Start"), Cell::from(self.stats.start)]);
        sheet.push_row(vec![Cell::from("End"), Cell::from(self.stats.end)]);
        for (label, value) in self.stats.metrics() {
            sheet.push_row(vec![Cell::from(label), Cell::from(value)]);
        }
        sheet
    }
}
