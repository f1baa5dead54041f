use super::geo::dms::parse_dms;
use super::geo::mgrs::is_mgrs;
use super::geo::position::parse_position;
use super::geo::wkt::is_wkt;
use super::parsing::{InferedValue, infer_type_with_trim, parse_number};

/// A cell holding data rather than a name: a number or any location token.
pub fn looks_like_value(cell: &str) -> bool {
    parse_number(cell).is_some()
        || is_wkt(cell)
        || is_mgrs(cell)
        || parse_dms(cell).is_some()
        || parse_position(cell).is_some()
}

pub fn is_header(cells: &[String]) -> bool {
    if cells.is_empty() {
        return false;
    }
    cells.iter().all(|cell| match infer_type_with_trim(cell) {
        InferedValue::String(_) => !looks_like_value(cell),
        _ => false,
    })
}

/// Whether the first row names the columns of the following ones.
///
/// A row of words followed by more rows of words is more likely data, so a
/// later row must hold at least one value.
pub fn detect_header(rows: &[Vec<String>]) -> bool {
    let Some(first) = rows.first() else {
        return false;
    };
    if !is_header(first) {
        return false;
    }
    rows.len() == 1
        || rows[1..]
            .iter()
            .any(|row| row.iter().any(|cell| looks_like_value(cell)))
}
