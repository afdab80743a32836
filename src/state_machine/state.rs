//! Session state types
//!
//! One session per chat. The workflow and its current step form a tagged
//! union; each step variant carries exactly the fields validated so far, so
//! an out-of-order field or a step from the wrong workflow cannot be
//! represented.

/// Validated parameters for a single-series generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleSpec {
    pub prefix: String,
    pub code: String,
    pub series: String,
    pub start: String,
    pub end: String,
}

impl SingleSpec {
    pub fn stem(&self) -> String {
        format!("{}{}{}", self.prefix, self.code, self.series)
    }

    /// Sequence length, bounds inclusive.
    pub fn count(&self) -> u64 {
        range_count(&self.start, &self.end)
    }
}

/// Validated parameters for a multi-series generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSpec {
    pub prefix: String,
    pub code: String,
    pub series: Vec<String>,
    pub start: String,
    pub end: String,
}

impl BatchSpec {
    pub fn stem(&self) -> String {
        format!("{}{}", self.prefix, self.code)
    }

    pub fn count_per_series(&self) -> u64 {
        range_count(&self.start, &self.end)
    }

    pub fn count(&self) -> u64 {
        self.count_per_series() * self.series.len() as u64
    }
}

fn range_count(start: &str, end: &str) -> u64 {
    // Both fields are validated digit quads by construction.
    let start: u64 = start.parse().unwrap_or(0);
    let end: u64 = end.parse().unwrap_or(0);
    end.saturating_sub(start) + 1
}

/// Display stats for a converted file awaiting delivery. The spool paths
/// themselves are owned by the runtime, which guards their cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    /// Derived default output name (source name with `.csv` extension).
    pub file_name: String,
    pub records: u64,
    pub bytes: u64,
}

/// Per-chat conversation state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No workflow active.
    #[default]
    Idle,

    Single(SingleStep),
    Batch(BatchStep),
    Convert(ConvertStep),

    /// Generation or delivery running in the owning session's turn; resolves
    /// to `Idle` when the pipeline reports back.
    Delivering,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleStep {
    Prefix,
    Code {
        prefix: String,
    },
    Series {
        prefix: String,
        code: String,
    },
    RangeStart {
        prefix: String,
        code: String,
        series: String,
    },
    RangeEnd {
        prefix: String,
        code: String,
        series: String,
        start: String,
    },
    Confirm {
        spec: SingleSpec,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStep {
    Prefix,
    Code {
        prefix: String,
    },
    SeriesList {
        prefix: String,
        code: String,
    },
    RangeStart {
        prefix: String,
        code: String,
        series: Vec<String>,
    },
    RangeEnd {
        prefix: String,
        code: String,
        series: Vec<String>,
        start: String,
    },
    Confirm {
        spec: BatchSpec,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertStep {
    WaitingFile,
    /// Download + conversion in flight; the runtime reports back with a
    /// `ConversionReady` or `ConversionFailed` event.
    Converting,
    AskRename { info: ArtifactInfo },
    WaitingRename { info: ArtifactInfo },
}

impl SessionState {
    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Single(_) => "single",
            SessionState::Batch(_) => "batch",
            SessionState::Convert(_) => "convert",
            SessionState::Delivering => "delivering",
        }
    }

    /// Whether the session currently references a materialized artifact that
    /// must be discarded when the workflow is abandoned.
    pub fn holds_artifact(&self) -> bool {
        matches!(
            self,
            SessionState::Convert(
                ConvertStep::Converting
                    | ConvertStep::AskRename { .. }
                    | ConvertStep::WaitingRename { .. }
            )
        )
    }
}
