//! Property-based tests for the state machine and engines
//!
//! These tests verify key invariants hold across all possible inputs.

use super::event::{Command, Event};
use super::state::{
    ArtifactInfo, BatchStep, ConvertStep, SessionState, SingleStep,
};
use super::transition::transition;
use crate::{convert, generate};
use proptest::prelude::*;
use std::io;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_letter_pair() -> impl Strategy<Value = String> {
    "[A-Z]{2}"
}

fn arb_digit_pair() -> impl Strategy<Value = String> {
    "[0-9]{2}"
}

/// A valid `(start, end)` digit-quad pair with `start <= end` and a bounded
/// width so generation stays cheap.
fn arb_range() -> impl Strategy<Value = (String, String)> {
    (0u32..=9999, 0u32..=60).prop_map(|(start, len)| {
        let end = (start + len).min(9999);
        (format!("{start:04}"), format!("{end:04}"))
    })
}

fn arb_artifact_info() -> impl Strategy<Value = ArtifactInfo> {
    ("[a-z]{1,8}\\.csv", 1u64..10_000, 1u64..1_000_000).prop_map(
        |(file_name, records, bytes)| ArtifactInfo {
            file_name,
            records,
            bytes,
        },
    )
}

fn arb_session_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::Idle),
        Just(SessionState::Single(SingleStep::Prefix)),
        (arb_letter_pair(), arb_digit_pair()).prop_map(|(prefix, code)| {
            SessionState::Single(SingleStep::Series { prefix, code })
        }),
        Just(SessionState::Batch(BatchStep::Prefix)),
        (arb_letter_pair(), arb_digit_pair()).prop_map(|(prefix, code)| {
            SessionState::Batch(BatchStep::SeriesList { prefix, code })
        }),
        Just(SessionState::Convert(ConvertStep::WaitingFile)),
        arb_artifact_info()
            .prop_map(|info| SessionState::Convert(ConvertStep::AskRename { info })),
        arb_artifact_info()
            .prop_map(|info| SessionState::Convert(ConvertStep::WaitingRename { info })),
        Just(SessionState::Delivering),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Every valid input yields exactly `end - start + 1` plates, strictly
    /// increasing by numeric suffix, all sharing the stem.
    #[test]
    fn single_generation_counts_and_stems(
        prefix in arb_letter_pair(),
        code in arb_digit_pair(),
        series in arb_letter_pair(),
        (start, end) in arb_range(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let artifact =
            generate::generate_single(dir.path(), &prefix, &code, &series, &start, &end).unwrap();

        let contents = std::fs::read_to_string(&artifact.path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        let expected = end.parse::<u64>().unwrap() - start.parse::<u64>().unwrap() + 1;

        prop_assert_eq!(artifact.records, expected);
        prop_assert_eq!(lines.len() as u64, expected);

        let stem = format!("{prefix}{code}{series}");
        let suffixes: Vec<u64> = lines
            .iter()
            .map(|line| line.strip_prefix(&stem).expect("stem").parse().unwrap())
            .collect();
        prop_assert!(suffixes.windows(2).all(|w| w[1] == w[0] + 1));
        prop_assert_eq!(suffixes[0], start.parse::<u64>().unwrap());
    }

    /// An inverted range fails and leaves nothing behind in the spool dir.
    #[test]
    fn inverted_ranges_never_produce_artifacts(
        prefix in arb_letter_pair(),
        code in arb_digit_pair(),
        series in arb_letter_pair(),
        start in 1u32..=9999,
        delta in 1u32..=500,
    ) {
        let end = start - delta.min(start);
        prop_assume!(end < start);

        let dir = tempfile::tempdir().unwrap();
        let result = generate::generate_single(
            dir.path(),
            &prefix,
            &code,
            &series,
            &format!("{start:04}"),
            &format!("{end:04}"),
        );
        prop_assert!(matches!(result, Err(generate::GenerateError::InvalidRange { .. })));
        prop_assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    /// Generated output formatted as `<plate> - <digits>` converts back to
    /// one record per plate, with the plate in the second column.
    #[test]
    fn generated_output_round_trips_through_converter(
        prefix in arb_letter_pair(),
        code in arb_digit_pair(),
        series in arb_letter_pair(),
        (start, end) in arb_range(),
        phone in "[0-9]{1,10}",
    ) {
        let dir = tempfile::tempdir().unwrap();
        let artifact =
            generate::generate_single(dir.path(), &prefix, &code, &series, &start, &end).unwrap();
        let plates: Vec<String> = std::fs::read_to_string(&artifact.path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();

        let source: Vec<io::Result<String>> = plates
            .iter()
            .map(|plate| Ok(format!("{plate} - {phone}")))
            .collect();
        let mut out = Vec::new();
        let records = convert::convert_lines(source, &mut out).unwrap();
        prop_assert_eq!(records, artifact.records);

        let csv = String::from_utf8(out).unwrap();
        let rows: Vec<&str> = csv.lines().skip(1).collect();
        prop_assert_eq!(rows.len(), plates.len());
        for (row, plate) in rows.iter().zip(&plates) {
            prop_assert_eq!(*row, format!("{phone},{plate}").as_str());
        }
    }

    /// Cancel resets any session to idle.
    #[test]
    fn cancel_always_resets(state in arb_session_state()) {
        let result = transition(&state, Event::Command(Command::Cancel));
        prop_assert_eq!(result.new_state, SessionState::Idle);
    }

    /// Help never moves the session.
    #[test]
    fn help_never_changes_state(state in arb_session_state()) {
        let result = transition(&state, Event::Command(Command::Help));
        prop_assert_eq!(result.new_state, state);
    }

    /// A workflow start lands on that workflow's first step, whatever came
    /// before.
    #[test]
    fn workflow_start_enters_first_step(state in arb_session_state()) {
        let result = transition(&state, Event::Command(Command::Single));
        prop_assert_eq!(result.new_state, SessionState::Single(SingleStep::Prefix));

        let result = transition(&state, Event::Command(Command::Convert));
        prop_assert_eq!(
            result.new_state,
            SessionState::Convert(ConvertStep::WaitingFile)
        );
    }
}
