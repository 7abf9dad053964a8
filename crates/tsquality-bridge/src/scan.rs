//! Dimension discovery over normalized text
//!
//! A single left-to-right pass that produces the byte sequence handed to
//! the analysis module together with the dimensions every foreign region
//! is sized from.
//!
//! # Conventions
//!
//! - Carriage-return bytes are dropped from the encoded bytes.
//! - A row is counted for every `\n`. In CRLF files this equals the number
//!   of carriage returns.
//! - A final line without a terminator is **not** counted as a row.
//! - The column count of a line is its number of separator bytes, i.e.
//!   the number of value columns after the leading time column. The
//!   maximum over all lines, including an unterminated final line, wins.

use serde::{Deserialize, Serialize};

const CARRIAGE_RETURN: u8 = b'\r';
const LINE_FEED: u8 = b'\n';

/// Normalized, carriage-return-free input plus its dimensions
///
/// Built once per file and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDataset {
    bytes: Vec<u8>,
    row_count: usize,
    max_columns: usize,
}

impl RawDataset {
    /// Scan normalized text with the given separator byte
    pub fn scan(text: &str, separator: u8) -> Self {
        let input = text.as_bytes();
        let mut bytes = Vec::with_capacity(input.len());
        let mut row_count = 0;
        let mut line_columns = 0;
        let mut max_columns = 0;

        for (i, &byte) in input.iter().enumerate() {
            if byte != CARRIAGE_RETURN {
                bytes.push(byte);
            }

            if byte == separator {
                line_columns += 1;
            }

            if byte == LINE_FEED {
                row_count += 1;
            }

            if byte == LINE_FEED || i == input.len() - 1 {
                max_columns = max_columns.max(line_columns);
                line_columns = 0;
            }
        }

        tracing::debug!(
            len = bytes.len(),
            row_count,
            max_columns,
            "scanned dataset dimensions"
        );

        Self {
            bytes,
            row_count,
            max_columns,
        }
    }

    /// Encoded bytes, exactly as written to the input region
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of logical rows
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Maximum number of value columns over all lines
    pub fn max_columns(&self) -> usize {
        self.max_columns
    }

    /// Whether nothing follows the first line
    ///
    /// With a header row this means the file holds no data at all, even
    /// though its terminated header line counts as a row.
    pub fn header_only(&self) -> bool {
        match self.bytes.iter().position(|&b| b == LINE_FEED) {
            Some(end) => end + 1 == self.bytes.len(),
            None => true,
        }
    }

    /// `(row_count, max_columns)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.row_count, self.max_columns)
    }

    /// Number of series points per coordinate region
    pub fn point_count(&self) -> usize {
        self.row_count * self.max_columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_reference_scenario() {
        let ds = RawDataset::scan("a,b,c\n1672531200000,1,2\n1672617600000,3,4", b',');
        assert_eq!(ds.dimensions(), (2, 2));
        assert_eq!(ds.point_count(), 4);
    }

    #[test]
    fn test_scan_terminated_final_line() {
        let ds = RawDataset::scan("t,v\n1,2\n3,4\n", b',');
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.max_columns(), 1);
    }

    #[test]
    fn test_scan_strips_carriage_returns() {
        let ds = RawDataset::scan("t,v\r\n1,2\r\n3,4\r\n", b',');
        assert_eq!(ds.bytes(), b"t,v\n1,2\n3,4\n");
        assert_eq!(ds.len(), 12);
        assert_eq!(ds.row_count(), 3);
    }

    #[test]
    fn test_scan_ragged_rows_use_maximum() {
        let ds = RawDataset::scan("t,a\n1,2,3,4\n5,6\n", b',');
        assert_eq!(ds.max_columns(), 3);
    }

    #[test]
    fn test_scan_final_line_counts_toward_columns() {
        let ds = RawDataset::scan("t,a\n1,2\n3,4,5,6", b',');
        assert_eq!(ds.max_columns(), 3);
        assert_eq!(ds.row_count(), 2);
    }

    #[test]
    fn test_scan_custom_separator() {
        let ds = RawDataset::scan("t;a;b\n1;2;3\n", b';');
        assert_eq!(ds.dimensions(), (2, 2));

        // Commas are ordinary bytes when the separator is ';'
        let ds = RawDataset::scan("1,5;2\n", b';');
        assert_eq!(ds.max_columns(), 1);
    }

    #[test]
    fn test_scan_empty_input() {
        let ds = RawDataset::scan("", b',');
        assert!(ds.is_empty());
        assert_eq!(ds.dimensions(), (0, 0));
    }

    #[test]
    fn test_scan_header_only() {
        let ds = RawDataset::scan("time,value", b',');
        assert_eq!(ds.dimensions(), (0, 1));
    }

    #[test]
    fn test_header_only_with_terminator() {
        assert!(RawDataset::scan("time,value", b',').header_only());
        assert!(RawDataset::scan("time,value\n", b',').header_only());
        assert!(RawDataset::scan("time,value\r\n", b',').header_only());
        assert!(!RawDataset::scan("time,value\n1,2", b',').header_only());
        assert!(!RawDataset::scan("time,value\n\n", b',').header_only());
    }

    #[test]
    fn test_rescan_is_stable() {
        let text = "t,a,b\n1,2\n3,4,5\n6";
        assert_eq!(
            RawDataset::scan(text, b','),
            RawDataset::scan(text, b',')
        );
    }
}
