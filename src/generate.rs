//! Plate-number sequence generation
//!
//! Numbers have the shape `[2 letters][2 digits][2 letters][4 digits]`, e.g.
//! `AB12CD0001`. Sequences are streamed straight to a spool file so very
//! large ranges never materialize in memory.

use crate::validate::{self, ValidationError};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::{NamedTempFile, TempPath};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{0}")]
    InvalidField(#[from] ValidationError),
    #[error("Start digits ({start}) must be less than or equal to end digits ({end})")]
    InvalidRange { start: String, end: String },
    #[error("No series provided")]
    EmptySeries,
    #[error("failed to write spool file: {0}")]
    Io(#[from] io::Error),
}

/// A generated spool file pending delivery.
///
/// `path` is a drop-guarded temp path: the file is removed when the artifact
/// is dropped, on every exit path.
#[derive(Debug)]
pub struct Artifact {
    pub path: TempPath,
    pub file_name: String,
    pub records: u64,
    pub bytes: u64,
}

/// Generate the inclusive sequence for one series.
///
/// `{prefix}{code}{series}{n:04}` for `n` in `start..=end`, one per line.
pub fn generate_single(
    spool_dir: &Path,
    prefix: &str,
    code: &str,
    series: &str,
    start: &str,
    end: &str,
) -> Result<Artifact, GenerateError> {
    let prefix = validate::letter_pair(prefix)?;
    let code = validate::digit_pair(code)?;
    let series = validate::letter_pair(series)?;
    let (start_num, end_num) = parse_range(start, end)?;

    let stem = format!("{prefix}{code}{series}");
    write_spool(spool_dir, &format!("vehicle_numbers_{stem}"), |out| {
        write_series(out, &prefix, &code, &series, start_num, end_num)
    })
}

/// Generate the concatenation of single sequences for each series, in list
/// order. Total length is `(end - start + 1) * series.len()`.
pub fn generate_batch(
    spool_dir: &Path,
    prefix: &str,
    code: &str,
    series: &[String],
    start: &str,
    end: &str,
) -> Result<Artifact, GenerateError> {
    let prefix = validate::letter_pair(prefix)?;
    let code = validate::digit_pair(code)?;
    if series.is_empty() {
        return Err(GenerateError::EmptySeries);
    }
    let series: Vec<String> = series
        .iter()
        .map(|s| validate::letter_pair(s))
        .collect::<Result<_, _>>()?;
    let (start_num, end_num) = parse_range(start, end)?;

    let stem = format!("{prefix}{code}");
    write_spool(spool_dir, &format!("vehicle_numbers_batch_{stem}"), |out| {
        let mut total = 0u64;
        for s in &series {
            total += write_series(out, &prefix, &code, s, start_num, end_num)?;
        }
        Ok(total)
    })
}

fn parse_range(start: &str, end: &str) -> Result<(u32, u32), GenerateError> {
    let start = validate::digit_quad(start)?;
    let end = validate::digit_quad(end)?;
    // Four validated digits always parse.
    let start_num: u32 = start.parse().unwrap_or(0);
    let end_num: u32 = end.parse().unwrap_or(0);
    if start_num > end_num {
        return Err(GenerateError::InvalidRange { start, end });
    }
    Ok((start_num, end_num))
}

fn write_series<W: Write>(
    out: &mut W,
    prefix: &str,
    code: &str,
    series: &str,
    start: u32,
    end: u32,
) -> io::Result<u64> {
    for n in start..=end {
        writeln!(out, "{prefix}{code}{series}{n:04}")?;
    }
    Ok(u64::from(end - start) + 1)
}

fn write_spool<F>(spool_dir: &Path, stem: &str, body: F) -> Result<Artifact, GenerateError>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> io::Result<u64>,
{
    let mut file = tempfile::Builder::new()
        .prefix(&format!("{stem}_"))
        .suffix(".txt")
        .tempfile_in(spool_dir)?;

    let mut writer = BufWriter::new(&mut file);
    let records = body(&mut writer)?;
    writer.flush()?;
    drop(writer);

    let bytes = file.as_file().metadata()?.len();
    Ok(Artifact {
        path: file.into_temp_path(),
        file_name: format!("{stem}.txt"),
        records,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(artifact: &Artifact) -> Vec<String> {
        std::fs::read_to_string(&artifact.path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn single_yields_inclusive_contiguous_range() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = generate_single(dir.path(), "AB", "12", "CD", "0001", "0005").unwrap();

        let lines = read_lines(&artifact);
        assert_eq!(artifact.records, 5);
        assert_eq!(
            lines,
            vec!["AB12CD0001", "AB12CD0002", "AB12CD0003", "AB12CD0004", "AB12CD0005"]
        );
        assert_eq!(artifact.file_name, "vehicle_numbers_AB12CD.txt");
    }

    #[test]
    fn single_normalizes_letter_case() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = generate_single(dir.path(), "ab", "12", "cd", "0009", "0009").unwrap();
        assert_eq!(read_lines(&artifact), vec!["AB12CD0009"]);
    }

    #[test]
    fn single_rejects_inverted_range_without_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate_single(dir.path(), "AB", "12", "CD", "0005", "0001").unwrap_err();
        assert!(matches!(err, GenerateError::InvalidRange { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn single_rejects_bad_field_shapes() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            generate_single(dir.path(), "A1", "12", "CD", "0001", "0002"),
            Err(GenerateError::InvalidField(ValidationError::LetterPair))
        ));
        assert!(matches!(
            generate_single(dir.path(), "AB", "12", "CD", "001", "0002"),
            Err(GenerateError::InvalidField(ValidationError::DigitQuad))
        ));
    }

    #[test]
    fn batch_concatenates_series_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let series = vec!["CD".to_string(), "EF".to_string()];
        let artifact = generate_batch(dir.path(), "AB", "12", &series, "0001", "0003").unwrap();

        assert_eq!(artifact.records, 6);
        assert_eq!(
            read_lines(&artifact),
            vec![
                "AB12CD0001", "AB12CD0002", "AB12CD0003",
                "AB12EF0001", "AB12EF0002", "AB12EF0003",
            ]
        );
    }

    #[test]
    fn batch_rejects_empty_series_list() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate_batch(dir.path(), "AB", "12", &[], "0001", "0003").unwrap_err();
        assert!(matches!(err, GenerateError::EmptySeries));
    }

    #[test]
    fn artifact_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = generate_single(dir.path(), "AB", "12", "CD", "0001", "0001").unwrap();
        let path = artifact.path.to_path_buf();
        assert!(path.exists());
        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn byte_size_matches_line_width() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = generate_single(dir.path(), "AB", "12", "CD", "0001", "0010").unwrap();
        // 10 plates, 10 chars each plus newline.
        assert_eq!(artifact.bytes, 110);
    }
}
