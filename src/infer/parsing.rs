use nom::{
    IResult, Parser,
    character::complete::{i64, multispace0},
    combinator::{eof, map},
    number::complete::double,
    sequence::{delimited, terminated},
};

#[derive(Debug, Clone, PartialEq)]
pub enum InferedValue {
    Integer(i64),
    Float(f64),
    String(String),
    Empty,
}

pub fn parse_integer(data: &str) -> IResult<&str, InferedValue> {
    map(i64, InferedValue::Integer).parse(data)
}

pub fn parse_float(data: &str) -> IResult<&str, InferedValue> {
    // We use the "double" parser from nom, that returns a f64.
    // The parser named "float" from nom returns a f32.
    map(double, InferedValue::Float).parse(data)
}

pub fn infer_type_with_trim(data: &str) -> InferedValue {
    if data.trim().is_empty() {
        return InferedValue::Empty;
    }
    let parsed = terminated(delimited(multispace0, parse_integer, multispace0), eof)
        .parse(data)
        .or_else(|_| terminated(delimited(multispace0, parse_float, multispace0), eof).parse(data));
    match parsed {
        // nom's double also accepts "inf" and "nan", which are words here.
        Ok((_, InferedValue::Float(f))) if !f.is_finite() => InferedValue::String(data.to_string()),
        Ok((_, value)) => value,
        Err(_) => InferedValue::String(data.to_string()),
    }
}

/// Parses a cell as a finite number, accepting surrounding blanks and a
/// decimal comma ("59,91") when there is no decimal point.
pub fn parse_number(data: &str) -> Option<f64> {
    let trimmed = data.trim();
    let normalized;
    let text = if !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
        normalized = trimmed.replace(',', ".");
        normalized.as_str()
    } else {
        trimmed
    };
    match infer_type_with_trim(text) {
        InferedValue::Integer(i) => Some(i as f64),
        InferedValue::Float(f) => Some(f),
        _ => None,
    }
}

pub fn is_number(data: &str) -> bool {
    parse_number(data).is_some()
}

/// A number written with a decimal separator, as coordinates usually are and
/// row identifiers are not.
pub fn is_decimal_number(data: &str) -> bool {
    data.contains(['.', ',']) && is_number(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::Err;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), Ok(("", InferedValue::Integer(42))));
        assert_eq!(parse_integer("-42"), Ok(("", InferedValue::Integer(-42))));
        assert_eq!(
            parse_integer("123456789123456789123456789"),
            Err(Err::Error(nom::error::Error::new(
                "123456789123456789123456789",
                nom::error::ErrorKind::Digit
            )))
        );
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("42"), Ok(("", InferedValue::Float(42.0))));
        assert_eq!(parse_float("-42.5"), Ok(("", InferedValue::Float(-42.5))));
        assert_eq!(parse_float("42.0\n"), Ok(("\n", InferedValue::Float(42.0))));
    }

    #[test]
    fn test_infer_type_with_trim() {
        assert_eq!(infer_type_with_trim(" 42 "), InferedValue::Integer(42));
        assert_eq!(infer_type_with_trim("-42.23"), InferedValue::Float(-42.23));
        assert_eq!(infer_type_with_trim(" \t"), InferedValue::Empty);
        assert_eq!(
            infer_type_with_trim(" abcd\n"),
            InferedValue::String(" abcd\n".to_string())
        );
        assert_eq!(
            infer_type_with_trim("NaN"),
            InferedValue::String("NaN".to_string())
        );
        assert_eq!(
            infer_type_with_trim("inf"),
            InferedValue::String("inf".to_string())
        );
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("59.91"), Some(59.91));
        assert_eq!(parse_number(" -10 "), Some(-10.0));
        assert_eq!(parse_number("59,91"), Some(59.91));
        assert_eq!(parse_number("1,000,000"), None);
        assert_eq!(parse_number("12a"), None);
        assert_eq!(parse_number(""), None);
        assert!(is_number("1e3"));
        assert!(!is_number("N59"));
    }
}
