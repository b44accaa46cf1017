//! Weight tables built from price availability.
//!
//! A ticker is eligible on a date when it has a price that date. Every builder
//! returns a table with the same index as its input and a weight (possibly 0)
//! in every cell.

use crate::error::StrategyError;
use crate::events::EventWindows;
use core_types::{Frame, PriceTable, WeightTable};

/// `1` where a price is present, `0` where it is missing.
pub fn presence(prices: &PriceTable) -> WeightTable {
    prices.map_cells(|v| Some(if v.is_some() { 1.0 } else { 0.0 }))
}

/// Equal weight across the tickers with a price each date.
///
/// Each eligible ticker gets `1 / count` where `count` is the number of
/// eligible tickers that date. A date without any price is all zeros.
pub fn equal_weight(prices: &PriceTable) -> WeightTable {
    signed_equal_weight(prices, prices.n_cols())
}

/// Equal-magnitude long and short legs.
///
/// Longs present on a date get `+1 / count` and shorts present get
/// `-1 / count`, with `count` the number of present longs plus present shorts.
/// Columns are the long tickers followed by the short tickers; the index is
/// the union of both. A ticker listed on both sides is rejected.
pub fn long_short_weight(
    long_prices: &PriceTable,
    short_prices: &PriceTable,
) -> Result<WeightTable, StrategyError> {
    if let Some(ticker) = long_prices
        .columns()
        .iter()
        .find(|c| short_prices.columns().contains(*c))
    {
        return Err(StrategyError::OverlappingTickers(ticker.clone()));
    }

    let joined = long_prices.outer_join(short_prices)?;
    Ok(signed_equal_weight(&joined, long_prices.n_cols()))
}

/// Equal weight inside event windows, zero everywhere else.
pub fn event_weight(prices: &PriceTable, windows: &EventWindows) -> WeightTable {
    equal_weight(prices).map_rows(|date, row| {
        if windows.contains(date) {
            row.to_vec()
        } else {
            vec![Some(0.0); row.len()]
        }
    })
}

/// Columns before `long_cols` are long, the rest short.
fn signed_equal_weight(prices: &Frame, long_cols: usize) -> WeightTable {
    prices.map_rows(|_, row| {
        let count = row.iter().filter(|v| v.is_some()).count();
        row.iter()
            .enumerate()
            .map(|(c, price)| match price {
                Some(_) if count > 0 => {
                    let sign = if c < long_cols { 1.0 } else { -1.0 };
                    Some(sign / count as f64)
                }
                _ => Some(0.0),
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn frame(dates: &[NaiveDate], columns: &[&str], rows: Vec<Vec<Option<f64>>>) -> Frame {
        Frame::new(
            dates.to_vec(),
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        )
        .unwrap()
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-12)
    }

    #[test]
    fn presence_marks_available_prices() {
        let prices = frame(&[date(2021, 1, 4)], &["A", "B"], vec![vec![Some(3.0), None]]);
        assert_eq!(presence(&prices).row(0), &[Some(1.0), Some(0.0)]);
    }

    #[test]
    fn equal_weight_splits_across_present_prices() {
        let prices = frame(
            &[date(2021, 1, 4), date(2021, 1, 5), date(2021, 1, 6)],
            &["A", "B", "C", "D"],
            vec![
                vec![Some(1.0), Some(2.0), None, Some(4.0)],
                vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
                vec![None, None, None, None],
            ],
        );

        let weights = equal_weight(&prices);

        for (r, (_, row)) in weights.rows().enumerate() {
            let eligible = prices.present_count(r);
            let non_zero = row.iter().filter(|w| **w != Some(0.0)).count();
            assert_eq!(non_zero, eligible);
            for (c, w) in row.iter().enumerate() {
                if prices.get(r, c).is_some() {
                    assert!(approx(*w, 1.0 / eligible as f64));
                }
            }
        }
        assert_eq!(weights.row(2), &[Some(0.0); 4]);
    }

    #[test]
    fn three_longs_and_one_short_get_quarters() {
        let d = [date(2021, 1, 4)];
        let long = frame(&d, &["L1", "L2", "L3"], vec![vec![Some(1.0), Some(2.0), Some(3.0)]]);
        let short = frame(&d, &["S1"], vec![vec![Some(4.0)]]);

        let weights = long_short_weight(&long, &short).unwrap();

        assert_eq!(weights.columns(), &["L1", "L2", "L3", "S1"]);
        assert!(approx(weights.get(0, 0), 0.25));
        assert!(approx(weights.get(0, 1), 0.25));
        assert!(approx(weights.get(0, 2), 0.25));
        assert!(approx(weights.get(0, 3), -0.25));
        let net: f64 = weights.row(0).iter().flatten().sum();
        assert!((net - (3.0 - 1.0) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn two_longs_and_one_short_get_thirds() {
        let d = [date(2021, 1, 4)];
        let long = frame(&d, &["A", "B"], vec![vec![Some(10.0), Some(20.0)]]);
        let short = frame(&d, &["C"], vec![vec![Some(30.0)]]);

        let weights = long_short_weight(&long, &short).unwrap();

        assert!(approx(weights.get(0, 0), 1.0 / 3.0));
        assert!(approx(weights.get(0, 1), 1.0 / 3.0));
        assert!(approx(weights.get(0, 2), -1.0 / 3.0));
    }

    #[test]
    fn long_short_counts_only_present_prices_on_each_date() {
        let long = frame(
            &[date(2021, 1, 4), date(2021, 1, 5)],
            &["A", "B"],
            vec![vec![Some(1.0), None], vec![Some(1.0), Some(2.0)]],
        );
        let short = frame(&[date(2021, 1, 5), date(2021, 1, 6)], &["C"], vec![vec![Some(3.0)], vec![Some(3.0)]]);

        let weights = long_short_weight(&long, &short).unwrap();

        assert_eq!(weights.index(), &[date(2021, 1, 4), date(2021, 1, 5), date(2021, 1, 6)]);
        // Only A trades on the 4th.
        assert_eq!(weights.row(0), &[Some(1.0), Some(0.0), Some(0.0)]);
        assert!(approx(weights.get(1, 2), -1.0 / 3.0));
        // Only the short leg trades on the 6th.
        assert_eq!(weights.row(2), &[Some(0.0), Some(0.0), Some(-1.0)]);
    }

    #[test]
    fn ticker_on_both_sides_is_rejected() {
        let d = [date(2021, 1, 4)];
        let long = frame(&d, &["A", "X"], vec![vec![Some(1.0), Some(2.0)]]);
        let short = frame(&d, &["X"], vec![vec![Some(2.0)]]);

        let result = long_short_weight(&long, &short);

        assert!(matches!(result, Err(StrategyError::OverlappingTickers(t)) if t == "X"));
    }

    #[test]
    fn event_weight_invests_only_inside_windows() {
        let dates: Vec<NaiveDate> = (0..8).map(|i| date(2020, 2, 27) + chrono::Days::new(i)).collect();
        let rows = dates.iter().map(|_| vec![Some(1.0), Some(2.0)]).collect();
        let prices = frame(&dates, &["A", "B"], rows);
        let windows = EventWindows::from_begin_dates([date(2020, 3, 1)], 5).unwrap();

        let weights = event_weight(&prices, &windows);

        for (d, row) in weights.rows() {
            if d >= date(2020, 3, 1) && d <= date(2020, 3, 5) {
                assert_eq!(row, &[Some(0.5), Some(0.5)], "{d} should be invested");
            } else {
                assert_eq!(row, &[Some(0.0), Some(0.0)], "{d} should be flat");
            }
        }
    }
}
