//! Detection of the columns holding geographic positions.
//!
//! Every encoding has its own match-maker. They all look at the same
//! [`CellSampler`] and the [`decider`] merges what they found.

use super::confidence::{Confidence, ValueWithConfidence};
use super::parsing::is_decimal_number;
use super::sampler::CellSampler;
use header_names::{GeoType, name_weight};
use serde::Serialize;
use std::cmp::Ordering;

pub mod decider;
pub mod decimal;
pub mod dms;
pub mod header_names;
pub mod mgrs;
pub mod position;
pub mod wkt;

pub use decider::LocationDecider;
pub use decimal::DecimalLatLonMatchMaker;
pub use dms::DmsLatLonMatchMaker;
pub use mgrs::MgrsMatchMaker;
pub use position::PositionMatchMaker;
pub use wkt::WktMatchMaker;

/// Minimum confidence for a candidate to be reported.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationKind {
    Lat,
    Lon,
    Position,
    Mgrs,
    WktGeometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoordFormat {
    Decimal,
    Dms,
    Mgrs,
    Wkt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PotentialLocationColumn {
    pub column_index: u32,
    pub column_name: String,
    pub kind: LocationKind,
    pub format_hint: Option<CoordFormat>,
    pub confidence: Confidence,
    /// Share of the cells written as decimal numbers. Breaks ties between
    /// equally confident pairs, so that identifier columns rank last.
    #[serde(skip)]
    pub decimal_ratio: Confidence,
}

impl PotentialLocationColumn {
    pub fn new(
        sampler: &CellSampler,
        column_index: usize,
        kind: LocationKind,
        format_hint: CoordFormat,
        confidence: Confidence,
    ) -> Self {
        Self {
            column_index: column_index as u32,
            column_name: sampler.column_name(column_index),
            kind,
            format_hint: Some(format_hint),
            confidence,
            decimal_ratio: column_ratio(sampler, column_index, is_decimal_number),
        }
    }
}

/// A latitude column and a longitude column that go together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatLonColumnResults {
    pub lat: PotentialLocationColumn,
    pub lon: PotentialLocationColumn,
    pub confidence: Confidence,
}

impl LatLonColumnResults {
    /// Pairs two columns. The pair is never more confident than its weakest
    /// member.
    pub fn new(lat: PotentialLocationColumn, lon: PotentialLocationColumn) -> Self {
        debug_assert_eq!(lat.kind, LocationKind::Lat);
        debug_assert_eq!(lon.kind, LocationKind::Lon);
        let confidence = lat.confidence.min(lon.confidence);
        Self {
            lat,
            lon,
            confidence,
        }
    }

    pub fn column_indexes(&self) -> (u32, u32) {
        (self.lat.column_index, self.lon.column_index)
    }

    fn decimal_ratio(&self) -> Confidence {
        self.lat.decimal_ratio.min(self.lon.decimal_ratio)
    }
}

/// Everything found in a sample, most confident first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LocationResults {
    pub lat_lon_pairs: Vec<LatLonColumnResults>,
    pub standalone_columns: Vec<PotentialLocationColumn>,
    pub overall_confidence: Confidence,
}

impl LocationResults {
    pub fn new(
        mut lat_lon_pairs: Vec<LatLonColumnResults>,
        mut standalone_columns: Vec<PotentialLocationColumn>,
    ) -> Self {
        lat_lon_pairs.sort_by(compare_pairs);
        standalone_columns.sort_by(compare_columns);
        let overall_confidence = lat_lon_pairs
            .iter()
            .map(|pair| pair.confidence)
            .chain(standalone_columns.iter().map(|column| column.confidence))
            .max()
            .unwrap_or(Confidence::NONE);
        Self {
            lat_lon_pairs,
            standalone_columns,
            overall_confidence,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lat_lon_pairs.is_empty() && self.standalone_columns.is_empty()
    }

    pub fn best_pair(&self) -> Option<&LatLonColumnResults> {
        self.lat_lon_pairs.first()
    }

    pub fn into_ranked(self) -> ValueWithConfidence<LocationResults> {
        let confidence = self.overall_confidence;
        ValueWithConfidence::new(self, confidence)
    }
}

/// Higher confidence first, then pairs of decimal columns, then by column
/// indexes.
pub(crate) fn compare_pairs(a: &LatLonColumnResults, b: &LatLonColumnResults) -> Ordering {
    b.confidence
        .cmp(&a.confidence)
        .then_with(|| b.decimal_ratio().cmp(&a.decimal_ratio()))
        .then_with(|| a.column_indexes().cmp(&b.column_indexes()))
}

/// Higher confidence first, then by column index and kind.
pub(crate) fn compare_columns(a: &PotentialLocationColumn, b: &PotentialLocationColumn) -> Ordering {
    b.confidence
        .cmp(&a.confidence)
        .then_with(|| a.column_index.cmp(&b.column_index))
        .then_with(|| a.kind.cmp(&b.kind))
}

/// A detector for one way of writing locations in a column.
///
/// Match-makers hold no state, so they can run in any order or at the same
/// time on the same sampler.
pub trait LocationMatchMaker: Send + Sync {
    fn name(&self) -> &'static str;

    fn detect(&self, sampler: &CellSampler) -> ValueWithConfidence<LocationResults>;
}

/// Share of the non-empty cells of a column accepted by `predicate`.
pub fn column_ratio(
    sampler: &CellSampler,
    column_index: usize,
    predicate: impl Fn(&str) -> bool,
) -> Confidence {
    let mut total = 0_usize;
    let mut successes = 0_usize;
    for value in sampler.column_values(column_index) {
        if value.is_empty() {
            continue;
        }
        total += 1;
        if predicate(value) {
            successes += 1;
        }
    }
    Confidence::ratio(successes, total)
}

/// Columns accepted by `predicate`, scored by their parse ratio weighted by
/// how much their header looks like a `geo_type` column name.
pub(crate) fn axis_candidates(
    sampler: &CellSampler,
    geo_type: GeoType,
    kind: LocationKind,
    format: CoordFormat,
    predicate: impl Fn(&str) -> bool,
) -> Vec<PotentialLocationColumn> {
    (0..sampler.max_column_count())
        .filter_map(|column_index| {
            let ratio = column_ratio(sampler, column_index, &predicate);
            if ratio.is_none() {
                return None;
            }
            let weight = name_weight(geo_type, sampler.header_name(column_index));
            Some(PotentialLocationColumn::new(
                sampler,
                column_index,
                kind,
                format,
                ratio.scale(weight),
            ))
        })
        .collect()
}

/// Pairs every latitude candidate with every longitude candidate from
/// another column, keeping the pairs at or above `min_confidence`.
pub(crate) fn pair_lat_lon_columns(
    lat_candidates: &[PotentialLocationColumn],
    lon_candidates: &[PotentialLocationColumn],
    min_confidence: Confidence,
) -> Vec<LatLonColumnResults> {
    let mut pairs = Vec::new();
    for lat in lat_candidates {
        for lon in lon_candidates {
            if lat.column_index == lon.column_index {
                continue;
            }
            let pair = LatLonColumnResults::new(lat.clone(), lon.clone());
            if !pair.confidence.is_none() && pair.confidence >= min_confidence {
                pairs.push(pair);
            }
        }
    }
    pairs
}
