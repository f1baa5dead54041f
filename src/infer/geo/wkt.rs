use super::{
    CoordFormat, DEFAULT_MIN_CONFIDENCE, LocationKind, LocationMatchMaker, LocationResults,
    PotentialLocationColumn, column_ratio,
};
use crate::infer::confidence::{Confidence, ValueWithConfidence};
use crate::infer::neutralize::{GEOMETRY_KEYWORDS, matching_parenthesis_end};
use crate::infer::sampler::CellSampler;
use regex::Regex;
use tracing::trace;

static WKT_PREFIX_REGEX: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:SRID=\d+;\s*)?({})\s*(?:ZM|Z|M)?\s*",
        GEOMETRY_KEYWORDS.join("|")
    ))
    .expect("Failed to compile WKT regex")
});

fn is_coordinate_text(c: char) -> bool {
    c.is_ascii_digit()
        || c.is_whitespace()
        || matches!(c, ',' | '.' | '+' | '-' | 'e' | 'E' | '(' | ')')
}

/// Whether a cell is a Well-Known Text geometry, optionally with the EWKT
/// `SRID=4326;` prefix.
pub fn is_wkt(value: &str) -> bool {
    let value = value.trim();
    let Some(captures) = WKT_PREFIX_REGEX.captures(value) else {
        return false;
    };
    let Some(prefix) = captures.get(0) else {
        return false;
    };
    let is_collection = captures
        .get(1)
        .is_some_and(|keyword| keyword.as_str().eq_ignore_ascii_case("GEOMETRYCOLLECTION"));

    let body = &value[prefix.end()..];
    if body.eq_ignore_ascii_case("EMPTY") {
        return true;
    }
    if !body.starts_with('(') || matching_parenthesis_end(body, 0) != Some(body.len()) {
        return false;
    }
    if is_collection {
        // Members are checked loosely, they are geometries of their own.
        body.len() > 2
    } else {
        body.chars().all(is_coordinate_text) && body.chars().any(|c| c.is_ascii_digit())
    }
}

/// Columns of WKT geometries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WktMatchMaker {
    pub min_confidence: Confidence,
}

impl Default for WktMatchMaker {
    fn default() -> Self {
        Self {
            min_confidence: Confidence::new(DEFAULT_MIN_CONFIDENCE),
        }
    }
}

impl LocationMatchMaker for WktMatchMaker {
    fn name(&self) -> &'static str {
        "wkt"
    }

    fn detect(&self, sampler: &CellSampler) -> ValueWithConfidence<LocationResults> {
        let columns = (0..sampler.max_column_count())
            .filter_map(|column_index| {
                let confidence = column_ratio(sampler, column_index, is_wkt);
                trace!("WKT column {}: {}", column_index, confidence);
                (!confidence.is_none() && confidence >= self.min_confidence).then(|| {
                    PotentialLocationColumn::new(
                        sampler,
                        column_index,
                        LocationKind::WktGeometry,
                        CoordFormat::Wkt,
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

    #[test]
    fn test_is_wkt() {
        assert!(is_wkt("POINT(10.75 59.91)"));
        assert!(is_wkt("point (10.75 59.91)"));
        assert!(is_wkt("POINT Z (1 2 3)"));
        assert!(is_wkt("PointZM(1 2 3 4)"));
        assert!(is_wkt("LINESTRING(0 0, 1 1, 2 1e-3)"));
        assert!(is_wkt("POLYGON((1,3,5,6))"));
        assert!(is_wkt("MULTIPOLYGON(((0 0,1 0,1 1,0 0)),((5 5,6 5,6 6,5 5)))"));
        assert!(is_wkt("GEOMETRYCOLLECTION(POINT(1 2),LINESTRING(0 0,1 1))"));
        assert!(is_wkt("POINT EMPTY"));
        assert!(is_wkt("SRID=4326;POINT(10.75 59.91)"));
    }

    #[test]
    fn test_not_wkt() {
        assert!(!is_wkt("POINT"));
        assert!(!is_wkt("POINT()"));
        assert!(!is_wkt("POINT(1 2"));
        assert!(!is_wkt("POINT(1 2) extra"));
        assert!(!is_wkt("POINT(a b)"));
        assert!(!is_wkt("CHECKPOINT(1 2)"));
        assert!(!is_wkt("SRID=x;POINT(1 2)"));
        assert!(!is_wkt("59.91"));
    }

    #[test]
    fn test_wkt_column() {
        let sample = Sample::from_text(
            "id;geom\n1;POINT(10.75 59.91)\n2;LINESTRING(0 0,1 1)\n3;not a geometry\n4;POINT(5.32 60.39)\n",
        );
        let format = StructuralFormat::Delimited {
            token_delimiter: ';',
            text_delimiter: Some('"'),
            min_columns: 2,
        };
        let sampler = CellSampler::new(&sample, &format);
        let result = WktMatchMaker::default().detect(&sampler);
        assert!((result.confidence.value() - 0.75).abs() < 1e-9);
        let column = &result.value.standalone_columns[0];
        assert_eq!(column.column_index, 1);
        assert_eq!(column.column_name, "geom");
        assert_eq!(column.kind, LocationKind::WktGeometry);
        assert_eq!(column.format_hint, Some(CoordFormat::Wkt));
    }
}
