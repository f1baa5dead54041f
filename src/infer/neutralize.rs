use regex::Regex;

/// Keywords of WKT geometries, longest first.
pub const GEOMETRY_KEYWORDS: [&str; 7] = [
    "GEOMETRYCOLLECTION",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "MULTIPOINT",
    "LINESTRING",
    "POLYGON",
    "POINT",
];

// MULTIPOINT must not be read as POINT, hence the longest keywords first.
// A glued dimension marker ("POINTZM") is part of the keyword token.
static GEOMETRY_KEYWORD_REGEX: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b({})(?:ZM|Z|M)?\b",
        GEOMETRY_KEYWORDS.join("|")
    ))
    .expect("Failed to compile geometry keyword regex")
});

static TRAILING_GEOMETRY_KEYWORD_REGEX: once_cell::sync::Lazy<Regex> =
    once_cell::sync::Lazy::new(|| {
        Regex::new(&format!(
            r"(?i)\b({})(\s*(ZM|Z|M))?\s*$",
            GEOMETRY_KEYWORDS.join("|")
        ))
        .expect("Failed to compile trailing geometry keyword regex")
    });

/// Whether `text` ends with a geometry keyword, so that a following
/// parenthesis opens a coordinate body.
pub(crate) fn ends_with_geometry_keyword(text: &str) -> bool {
    TRAILING_GEOMETRY_KEYWORD_REGEX.is_match(text)
}

const QUOTE_CHARACTERS: [char; 2] = ['"', '\''];

/// Byte offset just after the closing parenthesis matching the one at `open`.
pub(crate) fn matching_parenthesis_end(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0_usize;
    for (offset, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte offset of the opening parenthesis of a geometry body starting at
/// `from`, skipping blanks and an optional `Z`, `M` or `ZM` dimension marker.
pub(crate) fn geometry_body_start(text: &str, from: usize) -> Option<usize> {
    let rest = &text[from..];
    let trimmed = rest.trim_start();
    let mut offset = from + (rest.len() - trimmed.len());

    let upper = trimmed.get(..2).map(str::to_ascii_uppercase);
    let dimension_len = match upper.as_deref() {
        Some("ZM") => 2,
        _ if trimmed.starts_with(['Z', 'z', 'M', 'm']) => 1,
        _ => 0,
    };
    if dimension_len > 0 {
        let after = &trimmed[dimension_len..];
        // "POINTM(" and "POINT M (" are fine, "POINT MORE" is not a dimension.
        if !after.starts_with(|c: char| c == '(' || c.is_whitespace()) {
            return None;
        }
        let after_trimmed = after.trim_start();
        offset += dimension_len + (after.len() - after_trimmed.len());
    }

    text[offset..].starts_with('(').then_some(offset)
}

fn body_end(text: &str, from: usize) -> Option<usize> {
    geometry_body_start(text, from).and_then(|open| matching_parenthesis_end(text, open))
}

fn is_quoted(line: &str, start: usize, end: usize) -> bool {
    let before = line[..start].trim_end().chars().next_back();
    let after = line[end..].trim_start().chars().next();
    match (before, after) {
        (Some(open), Some(close)) => open == close && QUOTE_CHARACTERS.contains(&open),
        _ => false,
    }
}

/// Replaces the geometry literals of a raw line by their bare keyword, so
/// that the commas and parentheses of their coordinates are not mistaken for
/// structure.
///
/// An unquoted literal upper-cases the whole line, a quoted one only keeps
/// its keyword between the quotes. A keyword without a (balanced) coordinate
/// body is only upper-cased. Calling it twice changes nothing more.
pub fn neutralize(line: &str) -> String {
    let mut output = String::with_capacity(line.len());
    let mut position = 0_usize;
    let mut has_unquoted_literal = false;

    while let Some(captures) = GEOMETRY_KEYWORD_REGEX.captures_at(line, position) {
        let Some(token) = captures.get(0) else {
            break;
        };
        output.push_str(&line[position..token.start()]);

        let literal_end = body_end(line, token.end()).map(|mut end| {
            // Groups glued to the literal go with it, another pass would
            // read them as the body of the emitted keyword.
            while let Some(next) = body_end(line, end) {
                end = next;
            }
            end
        });

        position = match literal_end {
            Some(end) => {
                let keyword = captures.get(1).map_or(token.as_str(), |k| k.as_str());
                output.push_str(&keyword.to_ascii_uppercase());
                if !is_quoted(line, token.start(), end) {
                    has_unquoted_literal = true;
                }
                end
            }
            None => {
                output.push_str(&token.as_str().to_ascii_uppercase());
                token.end()
            }
        };
    }
    output.push_str(&line[position..]);

    if has_unquoted_literal {
        output.to_uppercase()
    } else {
        output
    }
}
