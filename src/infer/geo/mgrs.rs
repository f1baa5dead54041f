use super::{
    CoordFormat, DEFAULT_MIN_CONFIDENCE, LocationKind, LocationMatchMaker, LocationResults,
    PotentialLocationColumn, column_ratio,
};
use crate::infer::confidence::{Confidence, ValueWithConfidence};
use crate::infer::sampler::CellSampler;
use nom::{
    IResult, Parser,
    bytes::complete::take_while_m_n,
    character::complete::{digit0, one_of, satisfy},
    combinator::{all_consuming, map_res},
};
use tracing::trace;

/// Latitude bands, from 80°S to 84°N.
const BANDS: &str = "CDEFGHJKLMNPQRSTUVWX";

/// A Military Grid Reference System reference, such as `33V WN 97363 31962`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MgrsReference {
    pub zone: u8,
    pub band: char,
    /// The 100 km square: column letter then row letter.
    pub square: (char, char),
    pub easting: u32,
    pub northing: u32,
    /// Digits per axis, 0 for a reference to the 100 km square only.
    pub precision: usize,
}

fn zone(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(1, 2, |c: char| c.is_ascii_digit()), str::parse::<u8>).parse(input)
}

fn band(input: &str) -> IResult<&str, char> {
    one_of(BANDS).parse(input)
}

fn square_letter(input: &str) -> IResult<&str, char> {
    satisfy(|c: char| c.is_ascii_uppercase() && c != 'I' && c != 'O').parse(input)
}

/// Column letters repeat every three zones: A-H, J-R, then S-Z.
fn is_valid_column_letter(zone: u8, letter: char) -> bool {
    let range = match zone % 3 {
        1 => 'A'..='H',
        2 => 'J'..='R',
        _ => 'S'..='Z',
    };
    range.contains(&letter)
}

fn is_valid_row_letter(letter: char) -> bool {
    ('A'..='V').contains(&letter)
}

fn reference(input: &str) -> IResult<&str, (u8, char, char, char, &str)> {
    all_consuming((zone, band, square_letter, square_letter, digit0)).parse(input)
}

/// Parses an MGRS reference. Blanks between the parts are allowed and
/// letters may be lower-case.
pub fn parse_mgrs(value: &str) -> Option<MgrsReference> {
    let compact = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    let (_, (zone, band, column, row, digits)) = reference(&compact).ok()?;

    if !(1..=60).contains(&zone)
        || !is_valid_column_letter(zone, column)
        || !is_valid_row_letter(row)
        || digits.len() % 2 != 0
        || digits.len() > 10
    {
        return None;
    }

    let precision = digits.len() / 2;
    let (easting, northing) = digits.split_at(precision);
    Some(MgrsReference {
        zone,
        band,
        square: (column, row),
        easting: easting.parse().unwrap_or(0),
        northing: northing.parse().unwrap_or(0),
        precision,
    })
}

pub fn is_mgrs(value: &str) -> bool {
    parse_mgrs(value).is_some()
}

/// Columns of MGRS references.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MgrsMatchMaker {
    pub min_confidence: Confidence,
}

impl Default for MgrsMatchMaker {
    fn default() -> Self {
        Self {
            min_confidence: Confidence::new(DEFAULT_MIN_CONFIDENCE),
        }
    }
}

impl LocationMatchMaker for MgrsMatchMaker {
    fn name(&self) -> &'static str {
        "mgrs"
    }

    fn detect(&self, sampler: &CellSampler) -> ValueWithConfidence<LocationResults> {
        let columns = (0..sampler.max_column_count())
            .filter_map(|column_index| {
                let confidence = column_ratio(sampler, column_index, is_mgrs);
                trace!("MGRS column {}: {}", column_index, confidence);
                (!confidence.is_none() && confidence >= self.min_confidence).then(|| {
                    PotentialLocationColumn::new(
                        sampler,
                        column_index,
                        LocationKind::Mgrs,
                        CoordFormat::Mgrs,
                        confidence,
                    )
                })
            })
            .collect();
        LocationResults::new(vec![], columns).into_ranked()
    }
}
