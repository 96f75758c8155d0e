//! Price series and price tables

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single observation. `price` is `None` on days the symbol did not trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Option<f64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: Option<f64>) -> Self {
        Self { date, price }
    }
}

/// Adjusted closing prices for one symbol, ordered by date
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, checking that dates strictly increase and that every
    /// present price is finite and positive
    pub fn new(points: Vec<PricePoint>) -> Result<Self, ValidationError> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ValidationError::UnorderedDates {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }

        for point in &points {
            if let Some(value) = point.price {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ValidationError::InvalidPrice {
                        date: point.date,
                        value,
                    });
                }
            }
        }

        Ok(Self { points })
    }

    /// Build a series with no missing values
    pub fn from_prices<I>(prices: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            prices
                .into_iter()
                .map(|(date, price)| PricePoint::new(date, Some(price)))
                .collect(),
        )
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Observations with a price, missing days dropped
    pub fn valid(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.price.map(|price| (p.date, price)))
    }

    /// Prices only, missing days dropped
    pub fn valid_prices(&self) -> Vec<f64> {
        self.valid().map(|(_, price)| price).collect()
    }

    pub fn valid_count(&self) -> usize {
        self.valid().count()
    }

    pub fn first_valid(&self) -> Option<(NaiveDate, f64)> {
        self.valid().next()
    }

    pub fn last_valid(&self) -> Option<(NaiveDate, f64)> {
        self.points
            .iter()
            .rev()
            .find_map(|p| p.price.map(|price| (p.date, price)))
    }

    /// Price on a given date, if the symbol traded that day
    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by(|p| p.date.cmp(&date))
            .ok()
            .and_then(|idx| self.points[idx].price)
    }

    /// Observations on or after `date`
    pub fn since(&self, date: NaiveDate) -> Self {
        Self {
            points: self.points.iter().copied().filter(|p| p.date >= date).collect(),
        }
    }

    /// Rescale so the first valid price equals `base`
    ///
    /// Missing days stay missing. A series with no valid price is returned
    /// unchanged.
    pub fn rebased(&self, base: f64) -> Result<Self, ValidationError> {
        let base = ValidationError::ensure_finite("rebase level", base)?;
        if base <= 0.0 {
            return Err(ValidationError::InvalidConfig(format!(
                "rebase level must be positive, got {base}"
            )));
        }

        let Some((_, first)) = self.first_valid() else {
            return Ok(self.clone());
        };

        let points = self
            .points
            .iter()
            .map(|p| PricePoint::new(p.date, p.price.map(|price| price / first * base)))
            .collect();

        Ok(Self { points })
    }
}

/// Price series for several symbols, keyed and ordered by symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceTable {
    series: BTreeMap<String, PriceSeries>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, series: PriceSeries) {
        self.series.insert(symbol.into(), series);
    }

    pub fn get(&self, symbol: &str) -> Option<&PriceSeries> {
        self.series.get(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PriceSeries)> {
        self.series.iter().map(|(s, series)| (s.as_str(), series))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Sorted union of every date that appears in any series
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.series
            .values()
            .flat_map(|s| s.points().iter().map(|p| p.date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Keep only `symbols` (all when empty) and drop observations before `since`
    ///
    /// Requested symbols absent from the table are returned separately so the
    /// caller can report them.
    pub fn restrict(&self, symbols: &[String], since: NaiveDate) -> (Self, Vec<String>) {
        let missing = symbols
            .iter()
            .filter(|s| !self.series.contains_key(s.as_str()))
            .cloned()
            .collect();

        let series = self
            .series
            .iter()
            .filter(|(symbol, _)| symbols.is_empty() || symbols.iter().any(|s| s == *symbol))
            .map(|(symbol, s)| (symbol.clone(), s.since(since)))
            .collect();

        (Self { series }, missing)
    }

    /// Rebase every series to start at `base`
    pub fn rebased(&self, base: f64) -> Result<Self, ValidationError> {
        let series = self
            .series
            .iter()
            .map(|(symbol, s)| Ok((symbol.clone(), s.rebased(base)?)))
            .collect::<Result<BTreeMap<_, _>, ValidationError>>()?;
        Ok(Self { series })
    }
}

impl FromIterator<(String, PriceSeries)> for PriceTable {
    fn from_iter<T: IntoIterator<Item = (String, PriceSeries)>>(iter: T) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    #[test]
    fn test_rejects_unordered_dates() {
        let result = PriceSeries::from_prices(vec![(day(2), 10.0), (day(1), 11.0)]);
        assert_eq!(
            result,
            Err(ValidationError::UnorderedDates {
                previous: day(2),
                next: day(1)
            })
        );

        let duplicate = PriceSeries::from_prices(vec![(day(1), 10.0), (day(1), 11.0)]);
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_rejects_non_positive_price() {
        assert!(PriceSeries::from_prices(vec![(day(1), 0.0)]).is_err());
        assert!(PriceSeries::from_prices(vec![(day(1), -3.0)]).is_err());
        assert!(PriceSeries::from_prices(vec![(day(1), f64::NAN)]).is_err());
    }

    #[test]
    fn test_missing_values_dropped() {
        let series = PriceSeries::new(vec![
            PricePoint::new(day(1), None),
            PricePoint::new(day(2), Some(100.0)),
            PricePoint::new(day(3), None),
            PricePoint::new(day(4), Some(105.0)),
            PricePoint::new(day(5), None),
        ])
        .unwrap();

        assert_eq!(series.len(), 5);
        assert_eq!(series.valid_count(), 2);
        assert_eq!(series.valid_prices(), vec![100.0, 105.0]);
        assert_eq!(series.first_valid(), Some((day(2), 100.0)));
        assert_eq!(series.last_valid(), Some((day(4), 105.0)));
        assert_eq!(series.price_on(day(4)), Some(105.0));
        assert_eq!(series.price_on(day(3)), None);
    }

    #[test]
    fn test_rebased_starts_at_base() {
        let series = PriceSeries::new(vec![
            PricePoint::new(day(1), None),
            PricePoint::new(day(2), Some(50.0)),
            PricePoint::new(day(3), Some(75.0)),
        ])
        .unwrap();

        let rebased = series.rebased(100.0).unwrap();
        assert_eq!(rebased.points()[0].price, None);
        assert_eq!(rebased.points()[1].price, Some(100.0));
        assert_eq!(rebased.points()[2].price, Some(150.0));

        assert!(series.rebased(0.0).is_err());
    }

    #[test]
    fn test_rebased_all_missing_is_unchanged() {
        let series = PriceSeries::new(vec![PricePoint::new(day(1), None)]).unwrap();
        assert_eq!(series.rebased(100.0).unwrap(), series);
    }

    #[test]
    fn test_table_dates_union() {
        let mut table = PriceTable::new();
        table.insert("SPY", PriceSeries::from_prices(vec![(day(1), 1.0), (day(3), 1.0)]).unwrap());
        table.insert("QQQ", PriceSeries::from_prices(vec![(day(2), 1.0), (day(3), 1.0)]).unwrap());

        assert_eq!(table.dates(), vec![day(1), day(2), day(3)]);
        assert_eq!(table.symbols().collect::<Vec<_>>(), vec!["QQQ", "SPY"]);
    }

    #[test]
    fn test_restrict() {
        let mut table = PriceTable::new();
        table.insert("SPY", PriceSeries::from_prices(vec![(day(1), 1.0), (day(3), 2.0)]).unwrap());
        table.insert("QQQ", PriceSeries::from_prices(vec![(day(2), 1.0), (day(3), 1.0)]).unwrap());

        let wanted = vec!["SPY".to_string(), "VTI".to_string()];
        let (restricted, missing) = table.restrict(&wanted, day(2));
        assert_eq!(restricted.len(), 1);
        assert_eq!(restricted.get("SPY").unwrap().valid_prices(), vec![2.0]);
        assert_eq!(missing, vec!["VTI".to_string()]);

        let (all, missing) = table.restrict(&[], day(1));
        assert_eq!(all, table);
        assert!(missing.is_empty());
    }
}
