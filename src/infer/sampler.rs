use super::format::{StructuralFormat, split_delimited, split_fixed_width};
use super::format_detector::{DEFAULT_MAX_JUNK_LINES, leading_junk_lines, modal_count};
use super::is_header::detect_header;
use super::sample::Sample;
use tracing::trace;

/// The cells of a sample, split according to a structural format.
///
/// Blank lines and leading junk lines are dropped. When the first remaining
/// row looks like a header it names the columns and is not part of the data.
/// Line indexes passed to [`CellSampler::cell`] count data rows only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSampler {
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    skipped_lines: usize,
}

impl CellSampler {
    pub fn new(sample: &Sample, format: &StructuralFormat) -> Self {
        Self::with_max_junk_lines(sample, format, DEFAULT_MAX_JUNK_LINES)
    }

    pub fn with_max_junk_lines(
        sample: &Sample,
        format: &StructuralFormat,
        max_junk_lines: usize,
    ) -> Self {
        let mut rows = sample
            .lines()
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| split_row(line, format))
            .collect::<Vec<_>>();

        let counts = rows
            .iter()
            .map(|row| junk_column_count(row, format))
            .collect::<Vec<_>>();
        let skipped_lines = modal_count(&counts)
            .map_or(0, |modal| leading_junk_lines(&counts, modal, max_junk_lines));
        rows.drain(..skipped_lines);

        let header = if detect_header(&rows) {
            Some(rows.remove(0))
        } else {
            None
        };
        trace!(
            "Sampled {} data rows, header: {}, skipped {} junk lines",
            rows.len(),
            header.is_some(),
            skipped_lines
        );

        Self {
            header,
            rows,
            skipped_lines,
        }
    }

    /// A cell of a data row, `None` when out of range.
    pub fn cell(&self, line_index: usize, column_index: usize) -> Option<&str> {
        self.rows
            .get(line_index)
            .and_then(|row| row.get(column_index))
            .map(String::as_str)
    }

    /// Number of cells in a data row, 0 when out of range.
    pub fn column_count(&self, line_index: usize) -> u32 {
        self.rows.get(line_index).map_or(0, |row| row.len() as u32)
    }

    pub fn max_column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(self.header.as_ref().map(Vec::len))
            .max()
            .unwrap_or(0)
    }

    pub fn data_line_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// The header cell of a column. `None` without header row.
    pub fn header_name(&self, column_index: usize) -> Option<&str> {
        self.header
            .as_ref()
            .map(|header| header.get(column_index).map_or("", String::as_str))
    }

    /// The header cell, or `column1`, `column2`… when there is none.
    pub fn column_name(&self, column_index: usize) -> String {
        match self.header_name(column_index) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("column{}", column_index + 1),
        }
    }

    /// The cells of a column in every data row that reaches it.
    pub fn column_values(&self, column_index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .filter_map(move |row| row.get(column_index))
            .map(String::as_str)
    }
}

/// Columns of a row as seen when looking for junk lines. Delimited rows count
/// every field like the format detector does, empty trailing ones included.
/// A fixed-width banner line is cut into as many cells as a data row, so only
/// its populated cells count.
fn junk_column_count(row: &[String], format: &StructuralFormat) -> usize {
    match format {
        StructuralFormat::Delimited { .. } => row.len(),
        StructuralFormat::FixedWidth { .. } => row.iter().filter(|cell| !cell.is_empty()).count(),
    }
}

fn split_row(line: &str, format: &StructuralFormat) -> Vec<String> {
    match format {
        StructuralFormat::Delimited {
            token_delimiter,
            text_delimiter,
            ..
        } => split_delimited(line, *token_delimiter, *text_delimiter, true)
            .into_iter()
            .map(|field| {
                if field.quoted {
                    field.text
                } else {
                    field.text.trim().to_string()
                }
            })
            .collect(),
        StructuralFormat::FixedWidth { column_boundaries } => {
            split_fixed_width(line, column_boundaries)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comma() -> StructuralFormat {
        StructuralFormat::Delimited {
            token_delimiter: ',',
            text_delimiter: Some('"'),
            min_columns: 3,
        }
    }

    #[test]
    fn test_cells_and_header() {
        let sample = Sample::from_text("LAT,LON,NAME\n59.91,10.75,Oslo\n\n60.39,5.32,\"Bergen, Norway\"\n");
        let sampler = CellSampler::new(&sample, &comma());
        assert!(sampler.has_header());
        assert_eq!(sampler.data_line_count(), 2);
        assert_eq!(sampler.cell(0, 0), Some("59.91"));
        assert_eq!(sampler.cell(1, 2), Some("Bergen, Norway"));
        assert_eq!(sampler.cell(2, 0), None);
        assert_eq!(sampler.cell(0, 7), None);
        assert_eq!(sampler.column_count(1), 3);
        assert_eq!(sampler.column_count(9), 0);
        assert_eq!(sampler.column_name(1), "LON");
        assert_eq!(sampler.column_name(5), "column6");
        assert_eq!(sampler.header_name(0), Some("LAT"));
        assert_eq!(
            sampler.column_values(0).collect::<Vec<_>>(),
            vec!["59.91", "60.39"]
        );
    }

    #[test]
    fn test_doubled_quotes() {
        let sample = Sample::from_text("1,\"say \"\"hi\"\", then go\",3\n");
        let sampler = CellSampler::new(&sample, &comma());
        assert!(!sampler.has_header());
        assert_eq!(sampler.cell(0, 1), Some("say \"hi\", then go"));
        assert_eq!(sampler.column_name(0), "column1");
        assert_eq!(sampler.header_name(0), None);
    }

    #[test]
    fn test_geometry_cells_are_kept_whole() {
        let sample = Sample::from_text("1,POLYGON((1 2,3 4,1 2)),x\n2,POINT(1 2),y\n");
        let sampler = CellSampler::new(&sample, &comma());
        assert_eq!(sampler.cell(0, 1), Some("POLYGON((1 2,3 4,1 2))"));
        assert_eq!(sampler.max_column_count(), 3);
    }

    #[test]
    fn test_junk_lines_are_skipped() {
        let sample = Sample::from_text("Exported data\nLAT,LON\n1,2\n3,4\n");
        let sampler = CellSampler::new(&sample, &comma());
        assert_eq!(sampler.skipped_lines(), 1);
        assert!(sampler.has_header());
        assert_eq!(sampler.data_line_count(), 2);
    }

    #[test]
    fn test_rows_with_empty_cells_are_not_junk() {
        let sample = Sample::from_text(
            "59.91,10.75,\n60.39,5.32,\n63.43,10.39,x\n61.00,9.00,y\n62.00,8.00,z\n",
        );
        let sampler = CellSampler::new(&sample, &comma());
        assert_eq!(sampler.skipped_lines(), 0);
        assert!(!sampler.has_header());
        assert_eq!(sampler.data_line_count(), 5);
        assert_eq!(sampler.cell(0, 2), Some(""));
        assert_eq!(sampler.cell(1, 0), Some("60.39"));
    }

    #[test]
    fn test_fixed_width_banner_is_junk() {
        let sample = Sample::from_text("Export\n1   59.91  10.75\n2   60.39  5.32\n");
        let format = StructuralFormat::FixedWidth {
            column_boundaries: vec![0, 4, 11],
        };
        let sampler = CellSampler::new(&sample, &format);
        assert_eq!(sampler.skipped_lines(), 1);
        assert_eq!(sampler.data_line_count(), 2);
        assert_eq!(sampler.cell(0, 1), Some("59.91"));
    }

    #[test]
    fn test_fixed_width() {
        let sample = Sample::from_text("ID  LAT    LON\n1   59.91  10.75\n2   60.39  5.32\n");
        let format = StructuralFormat::FixedWidth {
            column_boundaries: vec![0, 4, 11],
        };
        let sampler = CellSampler::new(&sample, &format);
        assert!(sampler.has_header());
        assert_eq!(sampler.cell(1, 2), Some("5.32"));
        assert_eq!(sampler.column_name(2), "LON");
    }

    #[test]
    fn test_empty_sample() {
        let sampler = CellSampler::new(&Sample::default(), &StructuralFormat::single_column());
        assert_eq!(sampler.data_line_count(), 0);
        assert_eq!(sampler.max_column_count(), 0);
        assert_eq!(sampler.cell(0, 0), None);
        assert_eq!(sampler.column_values(0).count(), 0);
    }
}
