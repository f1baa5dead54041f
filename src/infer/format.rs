use super::neutralize::ends_with_geometry_keyword;
use serde::Serialize;

/// How the lines of a tabular text file are split into columns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructuralFormat {
    Delimited {
        token_delimiter: char,
        text_delimiter: Option<char>,
        min_columns: u32,
    },
    /// Character offsets where each column begins, the first one being 0.
    FixedWidth { column_boundaries: Vec<u32> },
}

impl StructuralFormat {
    /// A single column spanning the whole line.
    pub fn single_column() -> Self {
        StructuralFormat::FixedWidth {
            column_boundaries: vec![0],
        }
    }

    pub fn column_count(&self) -> u32 {
        match self {
            StructuralFormat::Delimited { min_columns, .. } => *min_columns,
            StructuralFormat::FixedWidth { column_boundaries } => column_boundaries.len() as u32,
        }
    }

    /// Splits a line into trimmed cells.
    pub fn split_line(&self, line: &str) -> Vec<String> {
        match self {
            StructuralFormat::Delimited {
                token_delimiter,
                text_delimiter,
                ..
            } => split_delimited(line, *token_delimiter, *text_delimiter, true)
                .into_iter()
                .map(|field| field.text.trim().to_string())
                .collect(),
            StructuralFormat::FixedWidth { column_boundaries } => {
                split_fixed_width(line, column_boundaries)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitField {
    pub text: String,
    /// The field was wrapped in the quote character.
    pub quoted: bool,
}

/// Splits a delimited line.
///
/// A field opening with `quote` (leading blanks allowed) runs until the
/// matching quote, delimiters inside do not split it and a doubled quote
/// stands for one literal quote. With `geometry_aware`, delimiters inside the
/// parentheses of an unquoted geometry literal do not split either.
/// Runs of spaces count as one delimiter when the delimiter is a space.
pub fn split_delimited(
    line: &str,
    delimiter: char,
    quote: Option<char>,
    geometry_aware: bool,
) -> Vec<SplitField> {
    let collapse_spaces = delimiter == ' ';
    let line = if collapse_spaces { line.trim() } else { line };

    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut depth = 0_usize;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if Some(c) == quote {
                if chars.peek() == Some(&c) {
                    field.push(c);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        if c == delimiter && depth == 0 {
            if collapse_spaces && field.is_empty() && !quoted {
                continue;
            }
            fields.push(SplitField {
                text: std::mem::take(&mut field),
                quoted,
            });
            quoted = false;
        } else if Some(c) == quote && !quoted && field.trim().is_empty() {
            field.clear();
            in_quotes = true;
            quoted = true;
        } else if c == '(' && geometry_aware && (depth > 0 || ends_with_geometry_keyword(&field)) {
            depth += 1;
            field.push(c);
        } else if c == ')' && depth > 0 {
            depth -= 1;
            field.push(c);
        } else {
            field.push(c);
        }
    }

    if !(collapse_spaces && field.is_empty() && !quoted && !fields.is_empty()) {
        fields.push(SplitField {
            text: field,
            quoted,
        });
    }
    fields
}

/// Cuts a line at the given character offsets. Columns starting past the end
/// of the line are not returned, a column whose next boundary does not come
/// after its start is empty.
pub fn split_fixed_width(line: &str, column_boundaries: &[u32]) -> Vec<String> {
    let chars = line.chars().collect::<Vec<_>>();
    column_boundaries
        .iter()
        .enumerate()
        .filter(|(_, start)| (**start as usize) < chars.len())
        .map(|(index, start)| {
            let start = *start as usize;
            let end = column_boundaries
                .get(index + 1)
                .map_or(chars.len(), |next| (*next as usize).min(chars.len()))
                .max(start);
            chars[start..end]
                .iter()
                .collect::<String>()
                .trim()
                .to_string()
        })
        .collect()
}
