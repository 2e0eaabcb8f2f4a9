//! Per-sector snapshot of the latest closing prices.

use std::collections::BTreeMap;

use crate::domain::price::PriceSeries;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectorSummary {
    pub sector: String,
    /// Sector members that have a latest close, in configured order.
    pub tickers: Vec<String>,
    pub avg_price: f64,
    pub count: usize,
}

/// One summary per sector, ordered by sector name. Members without a price
/// series (or with an empty one) are left out; a sector with no priced
/// member is omitted entirely.
pub fn sector_summary(
    sectors: &BTreeMap<String, Vec<String>>,
    prices: &BTreeMap<String, PriceSeries>,
) -> Vec<SectorSummary> {
    sectors
        .iter()
        .filter_map(|(sector, members)| {
            let priced: Vec<(&String, f64)> = members
                .iter()
                .filter_map(|t| Some((t, prices.get(t)?.last_close()?)))
                .collect();
            if priced.is_empty() {
                return None;
            }
            let count = priced.len();
            let avg_price = priced.iter().map(|(_, c)| c).sum::<f64>() / count as f64;
            Some(SectorSummary {
                sector: sector.clone(),
                tickers: priced.into_iter().map(|(t, _)| t.clone()).collect(),
                avg_price,
                count,
            })
        })
        .collect()
}
