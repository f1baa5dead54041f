use super::header_names::GeoType;
use super::{
    CoordFormat, DEFAULT_MIN_CONFIDENCE, LocationKind, LocationMatchMaker, LocationResults,
    axis_candidates, pair_lat_lon_columns,
};
use crate::infer::confidence::{Confidence, ValueWithConfidence};
use crate::infer::parsing::parse_number;
use crate::infer::sampler::CellSampler;
use tracing::trace;

pub fn parse_decimal_latitude(value: &str) -> Option<f64> {
    parse_number(value).filter(|lat| (-90.0..=90.0).contains(lat))
}

pub fn parse_decimal_longitude(value: &str) -> Option<f64> {
    parse_number(value).filter(|lon| (-180.0..=180.0).contains(lon))
}

/// Latitude and longitude written as plain decimal degrees in two columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecimalLatLonMatchMaker {
    pub min_confidence: Confidence,
}

impl Default for DecimalLatLonMatchMaker {
    fn default() -> Self {
        Self {
            min_confidence: Confidence::new(DEFAULT_MIN_CONFIDENCE),
        }
    }
}

impl LocationMatchMaker for DecimalLatLonMatchMaker {
    fn name(&self) -> &'static str {
        "decimal"
    }

    fn detect(&self, sampler: &CellSampler) -> ValueWithConfidence<LocationResults> {
        let lat_candidates = axis_candidates(
            sampler,
            GeoType::Latitude,
            LocationKind::Lat,
            CoordFormat::Decimal,
            |value| parse_decimal_latitude(value).is_some(),
        );
        let lon_candidates = axis_candidates(
            sampler,
            GeoType::Longitude,
            LocationKind::Lon,
            CoordFormat::Decimal,
            |value| parse_decimal_longitude(value).is_some(),
        );
        trace!(
            "Decimal candidates: {} latitudes, {} longitudes",
            lat_candidates.len(),
            lon_candidates.len()
        );
        let pairs = pair_lat_lon_columns(&lat_candidates, &lon_candidates, self.min_confidence);
        LocationResults::new(pairs, vec![]).into_ranked()
    }
}
