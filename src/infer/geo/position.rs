use super::header_names::{GeoType, name_weight};
use super::{
    CoordFormat, DEFAULT_MIN_CONFIDENCE, LocationKind, LocationMatchMaker, LocationResults,
    PotentialLocationColumn, column_ratio,
};
use crate::infer::confidence::{Confidence, ValueWithConfidence};
use crate::infer::parsing::parse_number;
use crate::infer::sampler::CellSampler;
use geo::Coord;
use tracing::trace;

fn unwrap_brackets(value: &str) -> Option<&str> {
    value
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .or_else(|| {
            value
                .strip_prefix('[')
                .and_then(|inner| inner.strip_suffix(']'))
        })
}

fn split_pair(text: &str, wrapped: bool) -> Option<(&str, &str)> {
    if text.contains(';') {
        return text.split_once(';').filter(|(_, b)| !b.contains(';'));
    }
    if text.matches(',').count() == 1 {
        let (a, b) = text.split_once(',')?;
        // "59,91" alone is a number with a decimal comma.
        let unambiguous =
            wrapped || b.starts_with(char::is_whitespace) || (a.contains('.') && b.contains('.'));
        return unambiguous.then_some((a, b));
    }
    let mut parts = text.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => Some((a, b)),
        _ => None,
    }
}

/// Parses a latitude and longitude written together in one cell, as
/// `(59.91, 10.75)`, `[10.75, 59.91]`, `59.91 10.75` or `59.91;10.75`.
///
/// The latitude first reading is preferred when both orders are in range.
/// The coordinate has the longitude as `x` and the latitude as `y`.
pub fn parse_position(value: &str) -> Option<Coord<f64>> {
    let trimmed = value.trim();
    let (text, wrapped) = match unwrap_brackets(trimmed) {
        Some(inner) => (inner.trim(), true),
        None => (trimmed, false),
    };
    let (a, b) = split_pair(text, wrapped)?;
    let first = parse_number(a)?;
    let second = parse_number(b)?;

    let is_lat = |v: f64| (-90.0..=90.0).contains(&v);
    let is_lon = |v: f64| (-180.0..=180.0).contains(&v);
    if is_lat(first) && is_lon(second) {
        Some(Coord {
            x: second,
            y: first,
        })
    } else if is_lon(first) && is_lat(second) {
        Some(Coord {
            x: first,
            y: second,
        })
    } else {
        None
    }
}

/// Columns holding both coordinates in each cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionMatchMaker {
    pub min_confidence: Confidence,
}

impl Default for PositionMatchMaker {
    fn default() -> Self {
        Self {
            min_confidence: Confidence::new(DEFAULT_MIN_CONFIDENCE),
        }
    }
}

impl LocationMatchMaker for PositionMatchMaker {
    fn name(&self) -> &'static str {
        "position"
    }

    fn detect(&self, sampler: &CellSampler) -> ValueWithConfidence<LocationResults> {
        let columns = (0..sampler.max_column_count())
            .filter_map(|column_index| {
                let ratio = column_ratio(sampler, column_index, |value| {
                    parse_position(value).is_some()
                });
                let weight = name_weight(GeoType::Position, sampler.header_name(column_index));
                let confidence = ratio.scale(weight);
                trace!("Position column {}: {}", column_index, confidence);
                (!confidence.is_none() && confidence >= self.min_confidence).then(|| {
                    PotentialLocationColumn::new(
                        sampler,
                        column_index,
                        LocationKind::Position,
                        CoordFormat::Decimal,
                        confidence,
                    )
                })
            })
            .collect();
        LocationResults::new(vec![], columns).into_ranked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::format::StructuralFormat;
    use crate::infer::sample::Sample;

    fn coord(lon: f64, lat: f64) -> Option<Coord<f64>> {
        Some(Coord { x: lon, y: lat })
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("(59.91, 10.75)"), coord(10.75, 59.91));
        assert_eq!(parse_position("(59.91 10.75)"), coord(10.75, 59.91));
        assert_eq!(parse_position("[59.91,10.75]"), coord(10.75, 59.91));
        assert_eq!(parse_position("59.91 10.75"), coord(10.75, 59.91));
        assert_eq!(parse_position("59.91;10.75"), coord(10.75, 59.91));
        assert_eq!(parse_position("59.91,10.75"), coord(10.75, 59.91));
        assert_eq!(parse_position(" 59, 10 "), coord(10.0, 59.0));
        assert_eq!(parse_position("59,91 10,75"), coord(10.75, 59.91));
    }

    #[test]
    fn test_lon_lat_order() {
        assert_eq!(parse_position("(120.5 45.2)"), coord(120.5, 45.2));
        assert_eq!(parse_position("-170.1,-80.2"), coord(-170.1, -80.2));
    }

    #[test]
    fn test_not_positions() {
        assert_eq!(parse_position("59,91"), None);
        assert_eq!(parse_position("59.91"), None);
        assert_eq!(parse_position("(120 100)"), None);
        assert_eq!(parse_position("1 2 3"), None);
        assert_eq!(parse_position("a b"), None);
        assert_eq!(parse_position("(59.91 10.75"), None);
        assert_eq!(parse_position(""), None);
    }

    #[test]
    fn test_position_column() {
        let sample = Sample::from_text(
            "NAME;POSITION\nOslo;(59.91 10.75)\nBergen;(60.39 5.32)\nNowhere;unknown\n",
        );
        let format = StructuralFormat::Delimited {
            token_delimiter: ';',
            text_delimiter: Some('"'),
            min_columns: 2,
        };
        let sampler = CellSampler::new(&sample, &format);
        let result = PositionMatchMaker::default().detect(&sampler);
        let column = &result.value.standalone_columns[0];
        assert_eq!(column.column_index, 1);
        assert_eq!(column.kind, LocationKind::Position);
        assert_eq!(column.format_hint, Some(CoordFormat::Decimal));
        assert!((result.confidence.value() - 2.0 / 3.0).abs() < 1e-9);
    }
}
