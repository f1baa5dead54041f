use super::confidence::{Confidence, ValueWithConfidence};
use super::format::{StructuralFormat, split_delimited};
use super::neutralize::neutralize;
use super::sample::Sample;
use std::collections::BTreeMap;
use tracing::{Level, debug, event};

pub const DEFAULT_DELIMITERS: [char; 5] = [',', '\t', ' ', ';', '|'];
pub const DEFAULT_QUOTES: [char; 2] = ['"', '\''];
pub const DEFAULT_MAX_JUNK_LINES: usize = 5;
pub const DEFAULT_MIN_DELIMITER_SCORE: f64 = 0.5;

/// Confidence factor applied when only one line could vote.
const SINGLE_LINE_PENALTY: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct DetectorOptions {
    /// Candidate delimiters, by order of preference on equal scores.
    pub delimiters: Vec<char>,
    /// Candidate quote characters. Having no quote character is always tried.
    pub quotes: Vec<char>,
    /// How many leading lines may be ignored as banners or comments.
    pub max_junk_lines: usize,
    /// Below this score, delimiters are abandoned for fixed-width columns.
    pub min_delimiter_score: f64,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            delimiters: DEFAULT_DELIMITERS.to_vec(),
            quotes: DEFAULT_QUOTES.to_vec(),
            max_junk_lines: DEFAULT_MAX_JUNK_LINES,
            min_delimiter_score: DEFAULT_MIN_DELIMITER_SCORE,
        }
    }
}

/// Most frequent value, the largest one on ties.
pub fn modal_count(counts: &[usize]) -> Option<usize> {
    let mut frequencies = BTreeMap::new();
    for count in counts {
        *frequencies.entry(*count).or_insert(0_usize) += 1;
    }
    frequencies
        .into_iter()
        .max_by_key(|(count, frequency)| (*frequency, *count))
        .map(|(count, _)| count)
}

/// Number of lines at the top that have fewer columns than the modal count,
/// up to `max_junk_lines`. At least one line is always kept.
pub fn leading_junk_lines(counts: &[usize], modal: usize, max_junk_lines: usize) -> usize {
    counts
        .iter()
        .take(max_junk_lines.min(counts.len().saturating_sub(1)))
        .take_while(|count| **count < modal)
        .count()
}

#[derive(Debug, Clone, PartialEq)]
struct DelimiterScore {
    delimiter: char,
    quote: Option<char>,
    modal: usize,
    score: f64,
    voters: usize,
    quoted_fields: usize,
}

fn score_delimiter(
    lines: &[String],
    delimiter: char,
    quote: Option<char>,
    max_junk_lines: usize,
) -> DelimiterScore {
    let mut quoted_fields = 0_usize;
    let counts = lines
        .iter()
        .map(|line| {
            let fields = split_delimited(line, delimiter, quote, false);
            quoted_fields += fields.iter().filter(|field| field.quoted).count();
            fields.len()
        })
        .collect::<Vec<_>>();

    let modal = modal_count(&counts).unwrap_or(1);
    let junk = leading_junk_lines(&counts, modal, max_junk_lines);
    let voters = &counts[junk..];
    let agreeing = voters.iter().filter(|count| **count == modal).count();

    let score = if modal <= 1 || voters.is_empty() {
        0.0
    } else {
        agreeing as f64 / voters.len() as f64
    };

    DelimiterScore {
        delimiter,
        quote,
        modal,
        score,
        voters: voters.len(),
        quoted_fields,
    }
}

/// Best quote for a delimiter: the highest score, then a quote that actually
/// wraps fields, then the order of the candidates (no quote last).
fn best_quote_for_delimiter(
    lines: &[String],
    delimiter: char,
    options: &DetectorOptions,
) -> DelimiterScore {
    let candidates = options
        .quotes
        .iter()
        .copied()
        .map(Some)
        .chain(std::iter::once(None));

    let mut best: Option<DelimiterScore> = None;
    for quote in candidates {
        let candidate = score_delimiter(lines, delimiter, quote, options.max_junk_lines);
        let better = match &best {
            None => true,
            Some(current) => {
                candidate.score > current.score
                    || (candidate.score == current.score
                        && candidate.quoted_fields > 0
                        && current.quoted_fields == 0)
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    best.unwrap_or(DelimiterScore {
        delimiter,
        quote: None,
        modal: 1,
        score: 0.0,
        voters: 0,
        quoted_fields: 0,
    })
}

fn is_blank_at(row: &[char], offset: usize) -> bool {
    row.get(offset).is_none_or(|c| c.is_whitespace())
}

/// Column starts of a set of lines: 0, then every offset where a column of
/// blanks shared by all lines ends.
pub fn fixed_width_boundaries(rows: &[Vec<char>]) -> Vec<u32> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let blank = (0..width)
        .map(|offset| rows.iter().all(|row| is_blank_at(row, offset)))
        .collect::<Vec<_>>();

    let mut boundaries = vec![0_u32];
    for offset in 1..width {
        if blank[offset - 1] && !blank[offset] {
            boundaries.push(offset as u32);
        }
    }
    boundaries
}

fn populates_every_column(row: &[char], boundaries: &[u32]) -> bool {
    boundaries.iter().enumerate().all(|(index, start)| {
        let start = *start as usize;
        let end = boundaries
            .get(index + 1)
            .map_or(row.len(), |next| (*next as usize).min(row.len()));
        start < end && row[start..end].iter().any(|c| !c.is_whitespace())
    })
}

fn fixed_width_candidate(lines: &[&str], max_junk_lines: usize) -> (Vec<u32>, f64) {
    let rows = lines
        .iter()
        .map(|line| line.chars().collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut best = (vec![0_u32], 0.0_f64);
    if rows.is_empty() {
        return best;
    }

    for skip in 0..=max_junk_lines.min(rows.len() - 1) {
        let body = &rows[skip..];
        let boundaries = fixed_width_boundaries(body);
        if boundaries.len() < 2 {
            continue;
        }
        let consistent = body
            .iter()
            .filter(|row| populates_every_column(row, &boundaries))
            .count();
        let score = consistent as f64 / rows.len() as f64;
        if score > best.1 {
            best = (boundaries, score);
        }
    }

    if rows.len() == 1 {
        best.1 *= SINGLE_LINE_PENALTY;
    }
    best
}

/// Guesses the structure of a sample with the default options.
pub fn detect(sample: &Sample) -> ValueWithConfidence<StructuralFormat> {
    detect_with(sample, &DetectorOptions::default())
}

/// Guesses whether the sample is delimited or fixed-width, and its parameters.
///
/// Never fails: an empty sample gives a single fixed-width column with no
/// confidence.
pub fn detect_with(
    sample: &Sample,
    options: &DetectorOptions,
) -> ValueWithConfidence<StructuralFormat> {
    let raw_lines = sample
        .lines()
        .iter()
        .map(String::as_str)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>();

    if raw_lines.is_empty() {
        event!(Level::DEBUG, "Empty sample, falling back to a single column");
        return ValueWithConfidence::new(StructuralFormat::single_column(), Confidence::NONE);
    }

    let lines = raw_lines
        .iter()
        .map(|line| neutralize(line))
        .collect::<Vec<_>>();

    let mut best_delimited: Option<DelimiterScore> = None;
    for delimiter in options.delimiters.iter().copied() {
        let candidate = best_quote_for_delimiter(&lines, delimiter, options);
        debug!(
            "Delimiter {:?} quote {:?}: {} columns, score {:.3} over {} lines",
            candidate.delimiter,
            candidate.quote,
            candidate.modal,
            candidate.score,
            candidate.voters
        );
        // On equal scores, the delimiter that explains more lines wins.
        let better = best_delimited.as_ref().is_none_or(|current| {
            candidate.score > current.score
                || (candidate.score == current.score && candidate.voters > current.voters)
        });
        if better {
            best_delimited = Some(candidate);
        }
    }

    let (boundaries, fixed_width_score) = fixed_width_candidate(&raw_lines, options.max_junk_lines);
    debug!(
        "Fixed width: {} columns, score {:.3}",
        boundaries.len(),
        fixed_width_score
    );

    if let Some(delimited) = best_delimited {
        let mut score = delimited.score;
        if delimited.voters < 2 {
            score *= SINGLE_LINE_PENALTY;
        }
        if score > 0.0 && score >= options.min_delimiter_score && score >= fixed_width_score {
            // No field was quoted: keep the conventional double quote unless
            // it broke the column count.
            let text_delimiter = if delimited.quoted_fields == 0 {
                let double_quote_score = score_delimiter(&lines, delimited.delimiter, Some('"'), options.max_junk_lines);
                if double_quote_score.score >= delimited.score {
                    Some('"')
                } else {
                    delimited.quote
                }
            } else {
                delimited.quote
            };
            let format = StructuralFormat::Delimited {
                token_delimiter: delimited.delimiter,
                text_delimiter,
                min_columns: delimited.modal.max(1) as u32,
            };
            event!(Level::DEBUG, "Detected {:?} with confidence {:.3}", format, score);
            return ValueWithConfidence::new(format, score);
        }
    }

    let format = StructuralFormat::FixedWidth {
        column_boundaries: boundaries,
    };
    event!(
        Level::DEBUG,
        "Detected {:?} with confidence {:.3}",
        format,
        fixed_width_score
    );
    ValueWithConfidence::new(format, fixed_width_score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(lines: &[&str]) -> Sample {
        Sample::from(lines)
    }

    fn delimiter_of(format: &StructuralFormat) -> Option<(char, Option<char>, u32)> {
        match format {
            StructuralFormat::Delimited {
                token_delimiter,
                text_delimiter,
                min_columns,
            } => Some((*token_delimiter, *text_delimiter, *min_columns)),
            StructuralFormat::FixedWidth { .. } => None,
        }
    }

    #[test]
    fn test_modal_count() {
        assert_eq!(modal_count(&[3, 3, 4]), Some(3));
        assert_eq!(modal_count(&[3, 4]), Some(4));
        assert_eq!(modal_count(&[]), None);
    }

    #[test]
    fn test_leading_junk_lines() {
        assert_eq!(leading_junk_lines(&[1, 1, 4, 4, 1], 4, 5), 2);
        assert_eq!(leading_junk_lines(&[1, 1, 4], 4, 1), 1);
        assert_eq!(leading_junk_lines(&[1], 4, 5), 0);
        assert_eq!(leading_junk_lines(&[4, 1, 4], 4, 5), 0);
    }

    #[test]
    fn test_comma_delimiter() {
        let result = detect(&sample(&["v1,v2,v3,v4"; 5]));
        assert_eq!(delimiter_of(&result.value), Some((',', Some('"'), 4)));
        assert_eq!(result.confidence, Confidence::FULL);
    }

    #[test]
    fn test_other_delimiters() {
        let result = detect(&sample(&["a;b;c", "1;2;3", "4;5;6"]));
        assert_eq!(delimiter_of(&result.value).map(|d| d.0), Some(';'));

        let result = detect(&sample(&["a\tb", "1\t2", "3\t4"]));
        assert_eq!(delimiter_of(&result.value).map(|d| d.0), Some('\t'));

        let result = detect(&sample(&["a|b|c|d", "1|2|3|4"]));
        assert_eq!(delimiter_of(&result.value), Some(('|', Some('"'), 4)));
    }

    #[test]
    fn test_geometry_commas_are_not_delimiters() {
        let result = detect(&sample(&[
            "id,name,geom,flag",
            "1,alpha,POLYGON((1 2,3 4,5 6,1 2)),yes",
            "2,beta,POINT(10 59),no",
            "3,gamma,LINESTRING(1 2,3 4,5 6,7 8,9 10),no",
        ]));
        assert_eq!(delimiter_of(&result.value).map(|d| d.2), Some(4));
        assert_eq!(result.confidence, Confidence::FULL);
    }

    #[test]
    fn test_quoting_styles() {
        let sparse = detect(&sample(&[
            "name,city,value",
            "a,\"Oslo, Norway\",1",
            "b,Bergen,2",
            "c,\"Paris, France\",3",
        ]));
        assert_eq!(delimiter_of(&sparse.value), Some((',', Some('"'), 3)));
        assert_eq!(sparse.confidence, Confidence::FULL);

        let excessive = detect(&sample(&[
            "'name','city','value'",
            "'a','Oslo, Norway','1'",
            "'b','Bergen','2'",
        ]));
        assert_eq!(delimiter_of(&excessive.value), Some((',', Some('\''), 3)));
        assert_eq!(excessive.confidence, Confidence::FULL);
    }

    #[test]
    fn test_junk_lines_are_ignored() {
        let result = detect(&sample(&[
            "Exported by the weather service",
            "station,lat,lon",
            "a,59.9,10.7",
            "b,60.3,5.3",
            "c,63.4,10.4",
        ]));
        assert_eq!(delimiter_of(&result.value).map(|d| d.2), Some(3));
        assert_eq!(result.confidence, Confidence::FULL);
    }

    #[test]
    fn test_header_is_not_junk_for_the_right_delimiter() {
        let result = detect(&sample(&[
            "name;position",
            "Oslo;(59.91, 10.75)",
            "Bergen;(60.39, 5.32)",
        ]));
        assert_eq!(delimiter_of(&result.value).map(|d| d.0), Some(';'));
        assert_eq!(result.confidence, Confidence::FULL);
    }

    #[test]
    fn test_fixed_width() {
        let result = detect(&sample(&[
            "ID  NAME        LAT",
            "1   New York    40.7",
            "2   Los Angeles 34.1",
            "3   Oslo        59.9",
        ]));
        assert_eq!(
            result.value,
            StructuralFormat::FixedWidth {
                column_boundaries: vec![0, 4, 16]
            }
        );
        assert_eq!(result.confidence, Confidence::FULL);
    }

    #[test]
    fn test_fixed_width_boundaries() {
        let rows = ["ab  cd", "a   c  e"]
            .iter()
            .map(|line| line.chars().collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(fixed_width_boundaries(&rows), vec![0, 4, 7]);
        assert_eq!(fixed_width_boundaries(&[]), vec![0]);
    }

    #[test]
    fn test_single_line_has_reduced_confidence() {
        let result = detect(&sample(&["a,b,c"]));
        assert_eq!(delimiter_of(&result.value).map(|d| d.0), Some(','));
        assert_eq!(result.confidence, Confidence::new(0.5));
    }

    #[test]
    fn test_empty_sample() {
        let result = detect(&sample(&[]));
        assert_eq!(result.value, StructuralFormat::single_column());
        assert_eq!(result.confidence, Confidence::NONE);

        let result = detect(&sample(&["", "   "]));
        assert_eq!(result.confidence, Confidence::NONE);
    }

    #[test]
    fn test_no_structure() {
        let result = detect(&sample(&["hello", "world", "again"]));
        assert_eq!(result.value, StructuralFormat::single_column());
        assert_eq!(result.confidence, Confidence::NONE);
    }

    #[test]
    fn test_custom_options() {
        let options = DetectorOptions {
            delimiters: vec![';'],
            ..DetectorOptions::default()
        };
        let result = detect_with(&sample(&["a,b", "c,d"]), &options);
        assert!(matches!(result.value, StructuralFormat::FixedWidth { .. }));
    }
}
