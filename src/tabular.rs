//! GEO-EAS tabular file reading and writing.
//!
//! Layout: a title line, a line whose first token is the variable count `v`,
//! `v` variable-name lines, then one whitespace-delimited numeric record per
//! non-blank line. Every record must carry exactly `v` values.

use crate::error::{FileFormat, Result, VisimError};
use crate::models::TabularDataset;
use crate::numeric::{format_fixed, parse_real};
use crate::scanner::LineScanner;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Decode the text of a GEO-EAS file
pub fn decode_tabular(text: &str) -> Result<TabularDataset> {
    decode_tabular_as(text, FileFormat::Tabular)
}

/// Decode with errors attributed to `format`, for formats sharing this grammar
pub(crate) fn decode_tabular_as(text: &str, format: FileFormat) -> Result<TabularDataset> {
    let mut scanner = LineScanner::new(text, format);

    let (_, title) = scanner.next_raw("title")?;
    let variable_count: usize = scanner.next_record("variable count", 1)?.integer(0)?;

    let mut variable_names = Vec::new();
    for _ in 0..variable_count {
        let (_, name) = scanner.next_raw("variable name")?;
        variable_names.push(name.trim().to_string());
    }

    let mut dataset = TabularDataset::empty(title, variable_names);
    for (line, text) in scanner.drain_remaining() {
        if text.trim().is_empty() {
            continue;
        }
        dataset.push_row(parse_row(text, line, variable_count, format)?)?;
    }

    debug!(
        "Decoded {}: '{}' with {} variables and {} records",
        format,
        dataset.title,
        dataset.variable_count(),
        dataset.row_count()
    );

    Ok(dataset)
}

/// Encode a dataset with fixed 10-decimal values
pub fn encode_tabular(dataset: &TabularDataset) -> String {
    let mut out = String::new();
    out.push_str(&dataset.title);
    out.push('\n');
    out.push_str(&dataset.variable_count().to_string());
    out.push('\n');
    for name in dataset.variable_names() {
        out.push_str(name);
        out.push('\n');
    }
    for row in dataset.rows() {
        let values: Vec<String> = row.iter().map(|&v| format_fixed(v)).collect();
        out.push_str(&values.join(" "));
        out.push('\n');
    }
    out
}

/// Read and decode a GEO-EAS file from disk
pub fn read_tabular_file(path: &Path) -> Result<TabularDataset> {
    let text = fs::read_to_string(path)?;
    decode_tabular(&text)
}

/// Encode and write a GEO-EAS file to disk
pub fn write_tabular_file(path: &Path, dataset: &TabularDataset) -> Result<()> {
    fs::write(path, encode_tabular(dataset))?;
    debug!(
        "Wrote {} records to {}",
        dataset.row_count(),
        path.display()
    );
    Ok(())
}

fn parse_row(text: &str, line: usize, expected: usize, format: FileFormat) -> Result<Vec<f64>> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != expected {
        return Err(VisimError::FieldCountMismatch {
            format,
            line,
            field: "data record".to_string(),
            expected,
            found: tokens.len(),
        });
    }

    tokens
        .into_iter()
        .map(|token| {
            parse_real(token).ok_or_else(|| VisimError::NumericParse {
                format,
                line,
                field: "data record".to_string(),
                token: token.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summarize;

    const POINTS: &str = "Conditioning data\n4\nx\ny\nz\nvalue\n0 0 0 1.0\n\n1 0 0 2.0\n";

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_decode_header_and_rows() {
        let dataset = decode_tabular(POINTS).unwrap();
        assert_eq!(dataset.title, "Conditioning data");
        assert_eq!(dataset.variable_names(), ["x", "y", "z", "value"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.row(1), Some(&[1.0, 0.0, 0.0, 2.0][..]));
    }

    #[test]
    fn test_value_column_statistics() {
        let dataset = decode_tabular(POINTS).unwrap();
        let summary = summarize(&dataset.column_by_name("value").unwrap()).unwrap();
        assert_eq!(summary.mean, 1.5);
        assert_eq!(summary.variance, 0.25);
        assert_eq!(summary.std, 0.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 2.0);
    }

    #[test]
    fn test_header_only_dataset() {
        let dataset = decode_tabular("Empty\n2\na\nb\n").unwrap();
        assert_eq!(dataset.variable_count(), 2);
        assert_eq!(dataset.row_count(), 0);
    }

    #[test]
    fn test_empty_title_and_extra_count_tokens() {
        let dataset = decode_tabular("\n1 40 30 1\nvalue\n1.5\n-2e3\n").unwrap();
        assert_eq!(dataset.title, "");
        assert_eq!(dataset.column(0), Some(vec![1.5, -2000.0]));
    }

    #[test]
    fn test_row_with_wrong_token_count() {
        let text = "T\n2\na\nb\n1 2\n3\n";
        match decode_tabular(text) {
            Err(VisimError::FieldCountMismatch {
                format,
                line,
                expected,
                found,
                ..
            }) => {
                assert_eq!(format, FileFormat::Tabular);
                assert_eq!(line, 6);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("Expected FieldCountMismatch, got {:?}", other),
        }

        assert!(decode_tabular("T\n1\na\n1 2\n").is_err());
    }

    #[test]
    fn test_non_numeric_value() {
        match decode_tabular("T\n1\na\n1.0\nNA\n") {
            Err(VisimError::NumericParse { line, token, .. }) => {
                assert_eq!(line, 5);
                assert_eq!(token, "NA");
            }
            other => panic!("Expected NumericParse, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_variable_count() {
        assert!(matches!(
            decode_tabular("T\nfour\n"),
            Err(VisimError::NumericParse { line: 2, .. })
        ));
        assert!(matches!(
            decode_tabular("T\n3\nx\ny\n"),
            Err(VisimError::FieldCountMismatch { line: 5, .. })
        ));
    }

    #[test]
    fn test_oversized_variable_count_is_an_error() {
        let text = format!("T\n{}\nx\n", usize::MAX);
        match decode_tabular(&text) {
            Err(VisimError::FieldCountMismatch {
                line, field, found, ..
            }) => {
                assert_eq!(line, 4);
                assert_eq!(field, "variable name");
                assert_eq!(found, 0);
            }
            other => panic!("Expected FieldCountMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_layout() {
        let dataset = TabularDataset::new(
            "My Data",
            names(&["x", "value"]),
            vec![vec![1.0, 10.5], vec![4.0, -12.3]],
        )
        .unwrap();

        let text = encode_tabular(&dataset);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "My Data");
        assert_eq!(lines[1], "2");
        assert_eq!(lines[2], "x");
        assert_eq!(lines[3], "value");
        assert_eq!(lines[4], "1.0000000000 10.5000000000");
        assert_eq!(lines[5], "4.0000000000 -12.3000000000");
    }

    #[test]
    fn test_round_trip_preserves_dataset() {
        let rows = vec![
            vec![0.0, 0.0, 0.0, 1.0],
            vec![1.25, 2.5, 0.1, -3.0000000001],
            vec![1234.5678901234, -0.0000000001, 99.0, 7.0],
        ];
        let dataset = TabularDataset::new("Points", names(&["x", "y", "z", "value"]), rows).unwrap();
        assert_eq!(decode_tabular(&encode_tabular(&dataset)).unwrap(), dataset);

        let header_only = TabularDataset::empty("", names(&["a"]));
        assert_eq!(decode_tabular(&encode_tabular(&header_only)).unwrap(), header_only);
    }

    #[test]
    fn test_single_column_round_trip() {
        let dataset = TabularDataset::from_column("Values", "z", &[0.5, 1.5, 2.5]);
        let text = encode_tabular(&dataset);
        assert!(text.ends_with("0.5000000000\n1.5000000000\n2.5000000000\n"));
        assert_eq!(decode_tabular(&text).unwrap(), dataset);
    }
}
