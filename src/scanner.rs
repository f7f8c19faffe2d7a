//! Positional line scanner used by the decoders.
//!
//! The legacy formats are not self-describing: a field is identified only by
//! the line it sits on and its token position within that line. The scanner
//! owns the cursor so that every consumed line, including skipped ones,
//! advances it exactly once.

use crate::error::{FileFormat, Result, VisimError};
use crate::numeric::{parse_integer, parse_real};

/// Cursor over the lines of one input text
pub(crate) struct LineScanner<'a> {
    lines: Vec<&'a str>,
    position: usize,
    format: FileFormat,
}

impl<'a> LineScanner<'a> {
    pub fn new(text: &'a str, format: FileFormat) -> Self {
        Self {
            lines: text.lines().collect(),
            position: 0,
            format,
        }
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// 1-based number of the next line to be read
    pub fn next_line_number(&self) -> usize {
        self.position + 1
    }

    /// Lines left up to and including the last non-blank one
    pub fn remaining_content_lines(&self) -> usize {
        self.lines[self.position.min(self.lines.len())..]
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .map_or(0, |last| last + 1)
    }

    /// Advance past the first line containing `marker`, ignoring case and whitespace
    pub fn seek_past_marker(&mut self, marker: &'static str) -> Result<()> {
        let wanted = squash(marker);
        let found = self.lines[self.position..]
            .iter()
            .position(|line| squash(line).contains(&wanted));

        match found {
            Some(offset) => {
                self.position += offset + 1;
                Ok(())
            }
            None => Err(VisimError::SentinelNotFound {
                format: self.format,
                marker,
            }),
        }
    }

    /// Consume the next line verbatim
    pub fn next_raw(&mut self, field: &str) -> Result<(usize, &'a str)> {
        match self.lines.get(self.position) {
            Some(line) => {
                self.position += 1;
                Ok((self.position, line))
            }
            None => Err(self.missing_line(field, 1)),
        }
    }

    /// Consume the next line as a record of at least `required` tokens.
    ///
    /// Tokens past `required` are trailing comment text and are kept only so
    /// callers can inspect them; they are never an error.
    pub fn next_record(&mut self, field: &'static str, required: usize) -> Result<Record<'a>> {
        let (line, text) = self.next_raw(field)?;
        let tokens: Vec<&'a str> = text.split_whitespace().collect();

        if tokens.len() < required {
            return Err(VisimError::FieldCountMismatch {
                format: self.format,
                line,
                field: field.to_string(),
                expected: required,
                found: tokens.len(),
            });
        }

        Ok(Record {
            line,
            field,
            format: self.format,
            tokens,
        })
    }

    /// Consume `count` lines without looking at them
    pub fn skip(&mut self, count: usize, field: &str) -> Result<()> {
        let available = self.lines.len().saturating_sub(self.position);
        if available < count {
            self.position = self.lines.len();
            return Err(self.missing_line(field, 1));
        }
        self.position += count;
        Ok(())
    }

    /// Remaining lines with their 1-based line numbers, consuming them
    pub fn drain_remaining(&mut self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        let start = self.position;
        self.position = self.lines.len();
        self.lines[start..]
            .iter()
            .enumerate()
            .map(move |(offset, line)| (start + offset + 1, *line))
    }

    fn missing_line(&self, field: &str, expected: usize) -> VisimError {
        VisimError::FieldCountMismatch {
            format: self.format,
            line: self.position + 1,
            field: field.to_string(),
            expected,
            found: 0,
        }
    }
}

/// One line's whitespace-delimited tokens
#[derive(Debug)]
pub(crate) struct Record<'a> {
    pub line: usize,
    pub field: &'static str,
    format: FileFormat,
    tokens: Vec<&'a str>,
}

impl<'a> Record<'a> {
    pub fn text(&self, index: usize) -> &'a str {
        self.tokens[index]
    }

    pub fn real(&self, index: usize) -> Result<f64> {
        let token = self.tokens[index];
        parse_real(token).ok_or_else(|| self.numeric_error(token))
    }

    pub fn integer<T: std::str::FromStr>(&self, index: usize) -> Result<T> {
        let token = self.tokens[index];
        parse_integer(token).ok_or_else(|| self.numeric_error(token))
    }

    pub fn reals<const N: usize>(&self) -> Result<[f64; N]> {
        let mut values = [0.0; N];
        for (index, value) in values.iter_mut().enumerate() {
            *value = self.real(index)?;
        }
        Ok(values)
    }

    fn numeric_error(&self, token: &str) -> VisimError {
        VisimError::NumericParse {
            format: self.format,
            line: self.line,
            field: self.field.to_string(),
            token: token.to_string(),
        }
    }
}

fn squash(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "banner\n  start of   parameters:\n1 2 3  - comment\nname.eas\n";

    #[test]
    fn test_marker_is_case_and_whitespace_insensitive() {
        let mut scanner = LineScanner::new(TEXT, FileFormat::Parameter);
        scanner.seek_past_marker("START OF PARAMETERS").unwrap();
        assert_eq!(scanner.next_line_number(), 3);
    }

    #[test]
    fn test_missing_marker() {
        let mut scanner = LineScanner::new("a\nb\n", FileFormat::Parameter);
        let err = scanner.seek_past_marker("START OF PARAMETERS").unwrap_err();
        assert!(matches!(err, VisimError::SentinelNotFound { .. }));
    }

    #[test]
    fn test_record_ignores_trailing_comment() {
        let mut scanner = LineScanner::new(TEXT, FileFormat::Parameter);
        scanner.skip(2, "banner").unwrap();
        let record = scanner.next_record("columns", 3).unwrap();
        assert_eq!(record.line, 3);
        assert_eq!(record.reals::<3>().unwrap(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_short_record_reports_line_and_field() {
        let mut scanner = LineScanner::new(TEXT, FileFormat::Parameter);
        scanner.skip(3, "banner").unwrap();
        match scanner.next_record("nx,xmn,xsiz", 3) {
            Err(VisimError::FieldCountMismatch {
                line,
                field,
                expected,
                found,
                ..
            }) => {
                assert_eq!(line, 4);
                assert_eq!(field, "nx,xmn,xsiz");
                assert_eq!(expected, 3);
                assert_eq!(found, 1);
            }
            _ => panic!("Expected FieldCountMismatch"),
        }
    }

    #[test]
    fn test_non_numeric_token_is_reported_raw() {
        let mut scanner = LineScanner::new(TEXT, FileFormat::Parameter);
        scanner.skip(3, "banner").unwrap();
        let record = scanner.next_record("nsim", 1).unwrap();
        match record.integer::<usize>(0) {
            Err(VisimError::NumericParse { token, line, .. }) => {
                assert_eq!(token, "name.eas");
                assert_eq!(line, 4);
            }
            _ => panic!("Expected NumericParse"),
        }
    }

    #[test]
    fn test_remaining_content_ignores_trailing_blanks() {
        let mut scanner = LineScanner::new("a\n\nb\n\n  \n", FileFormat::Parameter);
        assert_eq!(scanner.remaining_content_lines(), 3);
        scanner.skip(3, "all").unwrap();
        assert_eq!(scanner.remaining_content_lines(), 0);
    }

    #[test]
    fn test_reading_past_end() {
        let mut scanner = LineScanner::new("only\n", FileFormat::Tabular);
        scanner.next_raw("title").unwrap();
        assert_eq!(scanner.remaining_content_lines(), 0);
        let err = scanner.next_record("variable count", 1).unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(scanner.skip(1, "anything").is_err());
    }
}
