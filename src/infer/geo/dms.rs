use super::header_names::GeoType;
use super::{
    CoordFormat, LocationKind, LocationMatchMaker, LocationResults, axis_candidates,
    pair_lat_lon_columns,
};
use crate::infer::confidence::{Confidence, ValueWithConfidence};
use crate::infer::sampler::CellSampler;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{char, digit1, one_of, space0},
    combinator::{eof, map, opt, recognize},
    sequence::{pair, preceded, terminated},
};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    fn is_latitude(self) -> bool {
        matches!(self, Hemisphere::North | Hemisphere::South)
    }

    fn is_negative(self) -> bool {
        matches!(self, Hemisphere::South | Hemisphere::West)
    }
}

/// A coordinate written with degrees, minutes and seconds, or with a
/// hemisphere letter or degree sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DmsValue {
    /// Signed decimal degrees.
    pub degrees: f64,
    pub hemisphere: Option<Hemisphere>,
}

#[derive(Debug, Clone, PartialEq)]
struct Components<'a> {
    negative: bool,
    degrees: &'a str,
    degree_mark: bool,
    minutes: Option<&'a str>,
    seconds: Option<&'a str>,
}

fn hemisphere(input: &str) -> IResult<&str, Hemisphere> {
    map(one_of("NSEWnsew"), |c| match c.to_ascii_uppercase() {
        'N' => Hemisphere::North,
        'S' => Hemisphere::South,
        'E' => Hemisphere::East,
        _ => Hemisphere::West,
    })
    .parse(input)
}

fn unsigned_number(input: &str) -> IResult<&str, &str> {
    recognize(pair(digit1, opt(pair(one_of(".,"), digit1)))).parse(input)
}

fn degree_mark(input: &str) -> IResult<&str, &str> {
    alt((
        tag("°"),
        tag("º"),
        tag("˚"),
        tag_no_case("deg"),
        tag_no_case("d"),
    ))
    .parse(input)
}

fn minute_mark(input: &str) -> IResult<&str, &str> {
    alt((tag("′"), tag("’"), tag("'"))).parse(input)
}

fn second_mark(input: &str) -> IResult<&str, &str> {
    alt((tag("''"), tag("″"), tag("\""), tag("”"))).parse(input)
}

fn separator(input: &str) -> IResult<&str, &str> {
    recognize((space0, opt(char(':')), space0)).parse(input)
}

fn sign(input: &str) -> IResult<&str, Option<char>> {
    opt(one_of("+-")).parse(input)
}

fn optional_degree_mark(input: &str) -> IResult<&str, Option<&str>> {
    opt(preceded(space0, degree_mark)).parse(input)
}

fn minutes(input: &str) -> IResult<&str, &str> {
    preceded(
        separator,
        terminated(unsigned_number, opt(preceded(space0, minute_mark))),
    )
    .parse(input)
}

fn seconds(input: &str) -> IResult<&str, &str> {
    preceded(
        separator,
        terminated(unsigned_number, opt(preceded(space0, second_mark))),
    )
    .parse(input)
}

fn components(input: &str) -> IResult<&str, Components<'_>> {
    let (input, sign) = sign(input)?;
    let (input, degrees) = unsigned_number(input)?;
    let (input, degree_mark) = optional_degree_mark(input)?;
    let (input, minutes) = opt(minutes).parse(input)?;
    let (input, seconds) = if minutes.is_some() {
        opt(seconds).parse(input)?
    } else {
        (input, None)
    };

    Ok((
        input,
        Components {
            negative: sign == Some('-'),
            degrees,
            degree_mark: degree_mark.is_some(),
            minutes,
            seconds,
        },
    ))
}

type DmsParts<'a> = (Option<Hemisphere>, Components<'a>, Option<Hemisphere>);

fn dms_parts(input: &str) -> IResult<&str, DmsParts<'_>> {
    terminated(
        (
            preceded(space0, opt(terminated(hemisphere, space0))),
            components,
            preceded(space0, opt(hemisphere)),
        ),
        (space0, eof),
    )
    .parse(input)
}

fn to_f64(number: &str) -> Option<f64> {
    number.replace(',', ".").parse::<f64>().ok()
}

fn is_integral(number: &str) -> bool {
    number.bytes().all(|b| b.is_ascii_digit())
}

/// Reads `DDMMSS[.s]`, `DDDMMSS[.s]`, `DDMM[.m]` and `DDDMM[.m]`.
fn compact_degrees(number: &str) -> Option<f64> {
    let integer_part = number.split(['.', ',']).next()?;
    let fraction = &number[integer_part.len()..];
    let (degree_digits, has_seconds) = match integer_part.len() {
        4 | 5 => (integer_part.len() - 2, false),
        6 | 7 => (integer_part.len() - 4, true),
        _ => return None,
    };
    let degrees = to_f64(&integer_part[..degree_digits])?;
    if has_seconds {
        let minutes = to_f64(&integer_part[degree_digits..degree_digits + 2])?;
        let seconds = to_f64(&format!("{}{}", &integer_part[degree_digits + 2..], fraction))?;
        combine(degrees, Some(minutes), Some(seconds))
    } else {
        let minutes = to_f64(&format!("{}{}", &integer_part[degree_digits..], fraction))?;
        combine(degrees, Some(minutes), None)
    }
}

fn combine(degrees: f64, minutes: Option<f64>, seconds: Option<f64>) -> Option<f64> {
    let minutes = minutes.unwrap_or(0.0);
    let seconds = seconds.unwrap_or(0.0);
    if minutes >= 60.0 || seconds >= 60.0 {
        return None;
    }
    Some(degrees + minutes / 60.0 + seconds / 3600.0)
}

/// Parses a coordinate in one of the usual textual layouts:
/// `N 59° 54' 36.5"`, `59°54'36.5"N`, `59:54:36.5 N`, `59 54.6 N`,
/// `-59.91°`, `59.91N`, `595436.5N`, `5954.6N`.
///
/// Plain decimal numbers are refused, they belong to the decimal match-maker.
pub fn parse_dms(value: &str) -> Option<DmsValue> {
    let (_, (prefix, components, suffix)) = dms_parts(value).ok()?;

    let hemisphere = match (prefix, suffix) {
        (Some(_), Some(_)) => return None,
        (prefix, suffix) => prefix.or(suffix),
    };
    if hemisphere.is_some() && components.negative {
        return None;
    }
    if hemisphere.is_none() && !components.degree_mark && components.minutes.is_none() {
        return None;
    }

    let magnitude = if components.minutes.is_none()
        && !components.degree_mark
        && components.degrees.split(['.', ',']).next().map_or(0, str::len) >= 4
    {
        compact_degrees(components.degrees)?
    } else {
        if components.minutes.is_some() && !is_integral(components.degrees) {
            return None;
        }
        if components.seconds.is_some() && !components.minutes.is_some_and(is_integral) {
            return None;
        }
        combine(
            to_f64(components.degrees)?,
            components.minutes.and_then(to_f64),
            components.seconds.and_then(to_f64),
        )?
    };

    let negative = components.negative || hemisphere.is_some_and(Hemisphere::is_negative);
    Some(DmsValue {
        degrees: if negative { -magnitude } else { magnitude },
        hemisphere,
    })
}

pub fn parse_dms_latitude(value: &str) -> Option<f64> {
    let dms = parse_dms(value)?;
    if dms.hemisphere.is_some_and(|h| !h.is_latitude()) || dms.degrees.abs() > 90.0 {
        return None;
    }
    Some(dms.degrees)
}

pub fn parse_dms_longitude(value: &str) -> Option<f64> {
    let dms = parse_dms(value)?;
    if dms.hemisphere.is_some_and(Hemisphere::is_latitude) || dms.degrees.abs() > 180.0 {
        return None;
    }
    Some(dms.degrees)
}

/// Latitude and longitude columns written in degrees, minutes and seconds.
#[derive(Debug, Clone, Copy)]
pub struct DmsLatLonMatchMaker {
    pub min_confidence: Confidence,
}

impl Default for DmsLatLonMatchMaker {
    fn default() -> Self {
        Self {
            min_confidence: Confidence::new(super::DEFAULT_MIN_CONFIDENCE),
        }
    }
}

impl LocationMatchMaker for DmsLatLonMatchMaker {
    fn name(&self) -> &'static str {
        "dms"
    }

    fn detect(&self, sampler: &CellSampler) -> ValueWithConfidence<LocationResults> {
        let lat_candidates = axis_candidates(
            sampler,
            GeoType::Latitude,
            LocationKind::Lat,
            CoordFormat::Dms,
            |value| parse_dms_latitude(value).is_some(),
        );
        let lon_candidates = axis_candidates(
            sampler,
            GeoType::Longitude,
            LocationKind::Lon,
            CoordFormat::Dms,
            |value| parse_dms_longitude(value).is_some(),
        );
        trace!(
            "DMS candidates: {} latitudes, {} longitudes",
            lat_candidates.len(),
            lon_candidates.len()
        );
        let pairs = pair_lat_lon_columns(&lat_candidates, &lon_candidates, self.min_confidence);
        LocationResults::new(pairs, vec![]).into_ranked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(value: Option<f64>, expected: f64) -> bool {
        value.is_some_and(|v| (v - expected).abs() < 1e-6)
    }

    #[test]
    fn test_hemisphere_prefix_and_suffix() {
        let expected = 59.0 + 54.0 / 60.0 + 36.5 / 3600.0;
        assert!(close(parse_dms_latitude("N 59° 54' 36.5\""), expected));
        assert!(close(parse_dms_latitude("59°54'36.5\"N"), expected));
        assert!(close(parse_dms_latitude("59:54:36.5 N"), expected));
        assert!(close(parse_dms_latitude("59 54 36.5 n"), expected));
        assert!(close(parse_dms_latitude("59d 54' 36.5'' S"), -expected));
        assert!(close(parse_dms_longitude("W10°45′12″"), -(10.0 + 45.0 / 60.0 + 12.0 / 3600.0)));
    }

    #[test]
    fn test_decimal_minutes_and_degrees() {
        assert!(close(parse_dms_latitude("59 54.6 N"), 59.91));
        assert!(close(parse_dms_latitude("-59.91°"), -59.91));
        assert!(close(parse_dms_latitude("59.91N"), 59.91));
        assert!(close(parse_dms_longitude("10.75 E"), 10.75));
        assert!(close(parse_dms_latitude("59°54'"), 59.9));
    }

    #[test]
    fn test_compact_forms() {
        let expected = 59.0 + 54.0 / 60.0 + 36.5 / 3600.0;
        assert!(close(parse_dms_latitude("595436.5N"), expected));
        assert!(close(parse_dms_longitude("0104512E"), 10.0 + 45.0 / 60.0 + 12.0 / 3600.0));
        assert!(close(parse_dms_latitude("5954.6N"), 59.91));
        assert!(close(parse_dms_longitude("01045W"), -10.75));
    }

    #[test]
    fn test_axis_and_range() {
        assert_eq!(parse_dms_latitude("10°45'12\"E"), None);
        assert_eq!(parse_dms_longitude("59°54'36\"N"), None);
        assert_eq!(parse_dms_latitude("95°00'00\"N"), None);
        assert!(parse_dms_longitude("175°00'00\"W").is_some());
        // Without hemisphere both axes are possible.
        assert!(parse_dms_latitude("45°30'").is_some());
        assert!(parse_dms_longitude("45°30'").is_some());
    }

    #[test]
    fn test_refused_values() {
        assert_eq!(parse_dms("59.91"), None);
        assert_eq!(parse_dms("59"), None);
        assert_eq!(parse_dms("59.9 10.7"), None);
        assert_eq!(parse_dms("59°75'N"), None);
        assert_eq!(parse_dms("59°10'75\"N"), None);
        assert_eq!(parse_dms("N59S"), None);
        assert_eq!(parse_dms("-59N"), None);
        assert_eq!(parse_dms("Oslo"), None);
        assert_eq!(parse_dms(""), None);
        assert_eq!(parse_dms("123N"), Some(DmsValue { degrees: 123.0, hemisphere: Some(Hemisphere::North) }));
        assert_eq!(parse_dms_latitude("123N"), None);
    }
}
