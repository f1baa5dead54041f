use crate::error::SniffError;
use std::io::BufRead;

/// The first lines of a file, as read by whoever opened it.
///
/// Line terminators are stripped. A sample is never modified once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    lines: Vec<String>,
}

impl Sample {
    pub fn new(lines: Vec<String>) -> Self {
        let lines = lines
            .into_iter()
            .map(|line| strip_line_terminator(&line).to_string())
            .collect();
        Self { lines }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines().map(str::to_string).collect())
    }

    /// Reads at most `max_lines` lines after skipping `skip_lines` lines.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, a sample is only a hint.
    pub fn from_reader<R: BufRead>(
        mut reader: R,
        max_lines: usize,
        skip_lines: usize,
    ) -> Result<Self, SniffError> {
        let mut lines = Vec::with_capacity(max_lines.min(1024));
        let mut buffer = Vec::new();
        let mut line_number = 0_usize;

        while lines.len() < max_lines {
            buffer.clear();
            let read = reader.read_until(b'\n', &mut buffer)?;
            if read == 0 {
                break;
            }
            line_number += 1;
            if line_number <= skip_lines {
                continue;
            }
            let line = String::from_utf8_lossy(&buffer);
            let line = line.strip_prefix('\u{feff}').unwrap_or(&line);
            lines.push(strip_line_terminator(line).to_string());
        }

        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<Vec<String>> for Sample {
    fn from(lines: Vec<String>) -> Self {
        Sample::new(lines)
    }
}

impl From<&[&str]> for Sample {
    fn from(lines: &[&str]) -> Self {
        Sample::new(lines.iter().map(|line| line.to_string()).collect())
    }
}

fn strip_line_terminator(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_from_text() {
        let sample = Sample::from_text("a,b\r\n1,2\n3,4");
        assert_eq!(sample.lines(), &["a,b", "1,2", "3,4"]);
        assert_eq!(sample.len(), 3);
        assert!(!sample.is_empty());
        assert!(Sample::from_text("").is_empty());
    }

    #[test]
    fn test_from_reader_skips_and_bounds() {
        let data = "# exported\n# by someone\nlat,lon\n1,2\n3,4\n5,6\n";
        let sample = Sample::from_reader(Cursor::new(data), 3, 2).unwrap();
        assert_eq!(sample.lines(), &["lat,lon", "1,2", "3,4"]);
    }

    #[test]
    fn test_from_reader_strips_bom_and_invalid_utf8() {
        let mut data = "\u{feff}name\r\n".as_bytes().to_vec();
        data.extend_from_slice(&[b'a', 0xff, b'\n']);
        let sample = Sample::from_reader(Cursor::new(data), 10, 0).unwrap();
        assert_eq!(sample.lines()[0], "name");
        assert_eq!(sample.lines()[1], "a\u{fffd}");
    }

    #[test]
    fn test_from_slice() {
        let sample = Sample::from(&["a\n", "b"][..]);
        assert_eq!(sample.lines(), &["a", "b"]);
    }
}
