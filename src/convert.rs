//! TXT → CSV line conversion
//!
//! Source lines look like `VEHICLE_NUMBER - PHONE_NUMBER` with an optional
//! third ` - `-separated segment that is ignored entirely. Each retained line
//! becomes one `(phone, plate)` row under a fixed two-column header.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Output column header, written literally as the first row.
pub const OUTPUT_HEADER: &str = "Number,Vehicle Number";

/// The separator between segments of a source line.
const SEPARATOR: &str = " - ";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("The TXT file is empty")]
    EmptyInput,
    #[error("No valid data found. Expected format: VEHICLE_NUMBER - PHONE_NUMBER")]
    NoValidRecords,
    #[error("failed to read or write conversion data: {0}")]
    Io(#[from] io::Error),
}

/// Result statistics for a completed conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertStats {
    pub records: u64,
    pub bytes: u64,
}

/// Parse one source line into `(plate, phone)`.
///
/// Returns `None` for blank lines, lines without the separator, lines with an
/// empty segment after trimming. A third segment, if present, is dropped.
pub fn parse_record(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || !line.contains(SEPARATOR) {
        return None;
    }

    let mut parts = line.splitn(3, SEPARATOR);
    let plate = parts.next()?.trim();
    let phone = parts.next()?.trim();
    if plate.is_empty() || phone.is_empty() {
        return None;
    }
    Some((plate, phone))
}

/// Convert a stream of source lines, writing CSV rows to `out`.
///
/// Returns the number of retained records. Input order is preserved.
pub fn convert_lines<I, W>(lines: I, out: &mut W) -> Result<u64, ConvertError>
where
    I: IntoIterator<Item = io::Result<String>>,
    W: Write,
{
    writeln!(out, "{OUTPUT_HEADER}")?;

    let mut saw_line = false;
    let mut records = 0u64;
    for line in lines {
        let line = line?;
        saw_line = true;
        if let Some((plate, phone)) = parse_record(&line) {
            writeln!(out, "{},{}", csv_field(phone), csv_field(plate))?;
            records += 1;
        }
    }

    if !saw_line {
        return Err(ConvertError::EmptyInput);
    }
    if records == 0 {
        return Err(ConvertError::NoValidRecords);
    }
    Ok(records)
}

/// Convert `source` into `dest`, returning record count and output size.
///
/// On error the partially written `dest` is left for the caller's temp-file
/// guard to remove.
pub fn convert_file(source: &Path, dest: &Path) -> Result<ConvertStats, ConvertError> {
    let reader = BufReader::new(File::open(source)?);
    let mut writer = BufWriter::new(File::create(dest)?);

    let records = convert_lines(reader.lines(), &mut writer)?;
    writer.flush()?;
    drop(writer);

    let bytes = std::fs::metadata(dest)?.len();
    Ok(ConvertStats { records, bytes })
}

/// Quote a CSV field if it embeds a delimiter, quote, or line break.
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Default output name: source name with its extension replaced by `.csv`.
pub fn default_output_name(source_name: &str) -> String {
    let stem = source_name
        .rsplit_once('.')
        .map_or(source_name, |(stem, _)| stem);
    format!("{stem}.csv")
}

/// Clean a user-supplied output name: strip characters invalid in filenames
/// and force the `.csv` extension. Returns `None` if nothing usable remains.
pub fn sanitize_file_name(input: &str) -> Option<String> {
    const INVALID: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut name: String = trimmed
        .chars()
        .map(|c| if INVALID.contains(&c) { '_' } else { c })
        .collect();
    if !name.to_ascii_lowercase().ends_with(".csv") {
        name.push_str(".csv");
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &[&str]) -> Vec<io::Result<String>> {
        input.iter().map(|l| Ok((*l).to_string())).collect()
    }

    fn convert_to_string(input: &[&str]) -> Result<(String, u64), ConvertError> {
        let mut out = Vec::new();
        let records = convert_lines(lines(input), &mut out)?;
        Ok((String::from_utf8(out).unwrap(), records))
    }

    #[test]
    fn parses_two_segment_lines() {
        assert_eq!(
            parse_record("CG13AA0010 - 7389247318"),
            Some(("CG13AA0010", "7389247318"))
        );
    }

    #[test]
    fn third_segment_is_dropped_entirely() {
        assert_eq!(
            parse_record("AB12CD0001 - 555 - extra"),
            Some(("AB12CD0001", "555"))
        );
        // Even a segment containing the separator again is ignored.
        assert_eq!(
            parse_record("AB12CD0001 - 555 - x - y"),
            Some(("AB12CD0001", "555"))
        );
    }

    #[test]
    fn rejects_blank_and_malformed_lines() {
        assert_eq!(parse_record(""), None);
        assert_eq!(parse_record("   "), None);
        assert_eq!(parse_record("bad line"), None);
        assert_eq!(parse_record(" - 555"), None);
        assert_eq!(parse_record("AB12CD0001 - "), None);
    }

    #[test]
    fn converts_in_input_order_with_header() {
        let (out, records) = convert_to_string(&[
            "AB12CD0001 - 555 - extra",
            "",
            "bad line",
            "XY99ZZ0002 - 777",
        ])
        .unwrap();

        assert_eq!(records, 2);
        let rows: Vec<&str> = out.lines().collect();
        assert_eq!(
            rows,
            vec!["Number,Vehicle Number", "555,AB12CD0001", "777,XY99ZZ0002"]
        );
    }

    #[test]
    fn zero_lines_is_empty_input() {
        let err = convert_to_string(&[]).unwrap_err();
        assert!(matches!(err, ConvertError::EmptyInput));
    }

    #[test]
    fn all_blank_input_is_no_valid_records() {
        let err = convert_to_string(&["", "   ", "\t"]).unwrap_err();
        assert!(matches!(err, ConvertError::NoValidRecords));
    }

    #[test]
    fn quotes_embedded_delimiters() {
        let (out, _) = convert_to_string(&["AB12CD0001 - 5,55"]).unwrap();
        assert!(out.contains("\"5,55\",AB12CD0001"));

        let (out, _) = convert_to_string(&["AB\"12 - 555"]).unwrap();
        assert!(out.contains("555,\"AB\"\"12\""));
    }

    #[test]
    fn default_name_replaces_extension() {
        assert_eq!(default_output_name("numbers.txt"), "numbers.csv");
        assert_eq!(default_output_name("archive.data.txt"), "archive.data.csv");
        assert_eq!(default_output_name("noext"), "noext.csv");
    }

    #[test]
    fn sanitize_strips_invalid_characters() {
        assert_eq!(
            sanitize_file_name("my<file>:name").unwrap(),
            "my_file__name.csv"
        );
        assert_eq!(sanitize_file_name("plain").unwrap(), "plain.csv");
        assert_eq!(sanitize_file_name("done.CSV").unwrap(), "done.CSV");
        assert_eq!(sanitize_file_name("   "), None);
    }
}
