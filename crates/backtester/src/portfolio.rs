/// Cash plus a signed quantity per ticker.
///
/// Quantities are aligned to the price-table columns. A negative quantity is a
/// short position; selling it short adds its notional to cash.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub cash: f64,
    pub quantities: Vec<f64>,
}

impl Portfolio {
    /// Creates a flat `Portfolio` for `tickers` columns.
    pub fn new(initial_capital: f64, tickers: usize) -> Self {
        Self {
            cash: initial_capital,
            quantities: vec![0.0; tickers],
        }
    }

    /// Cash plus the market value of every position at `marks`.
    ///
    /// Only a ticker that has traded can hold a quantity, and a traded ticker
    /// always has a mark.
    pub fn equity(&self, marks: &[Option<f64>]) -> f64 {
        self.cash + self.position_values(marks).sum::<f64>()
    }

    /// Market value of each position at `marks`.
    pub fn position_values<'a>(
        &'a self,
        marks: &'a [Option<f64>],
    ) -> impl Iterator<Item = f64> + 'a {
        self.quantities
            .iter()
            .zip(marks)
            .map(|(q, mark)| mark.map_or(0.0, |p| q * p))
    }

    /// Trades to `targets` (fractions of equity) at today's prices.
    ///
    /// Equity is measured at `marks` before any trade. A ticker without a
    /// price today keeps its quantity. Commission is charged on the absolute
    /// traded notional. Returns the traded notional.
    pub fn rebalance(
        &mut self,
        targets: &[f64],
        marks: &[Option<f64>],
        today: &[Option<f64>],
        commission_pct: f64,
    ) -> f64 {
        let equity = self.equity(marks);
        let mut turnover = 0.0;

        for ((quantity, target), price) in self.quantities.iter_mut().zip(targets).zip(today) {
            let Some(price) = *price else {
                continue;
            };
            let target_quantity = target * equity / price;
            let notional = (target_quantity - *quantity) * price;
            self.cash -= notional;
            turnover += notional.abs();
            *quantity = target_quantity;
        }

        self.cash -= turnover * commission_pct;
        turnover
    }
}
