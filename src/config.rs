/**
This module contains the configuration of the evaluation. The flags mirror the command line
surface: the two listing flags ask for the label assignment and the substituted predictions
to be kept in the report (and persisted when evaluating files), `verbose` turns on the
per-word diagnostic logging and `terse` reduces the printed result to a single
tab-separated line.
*/
use std::fmt::Display;

/// Flags controlling what the evaluation reports beside the scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvalConfig {
    /// Keep the gold-to-predicted label assignment in the report.
    pub save_assignment: bool,
    /// Keep the predictions rewritten with their assigned gold labels in the report.
    pub save_result: bool,
    /// Log the per-word contributions and the label assignment.
    pub verbose: bool,
    /// Print the scores as a single tab-separated line instead of the block format.
    pub terse: bool,
}

impl Display for EvalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EvalConfig {{ save_assignment: {}, save_result: {}, verbose: {}, terse: {} }}",
            self.save_assignment, self.save_result, self.verbose, self.terse
        )
    }
}

/// Builder of the `EvalConfig` struct. Every flag defaults to `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvalConfigBuilder {
    save_assignment: bool,
    save_result: bool,
    verbose: bool,
    terse: bool,
}

impl EvalConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_assignment(mut self, save_assignment: bool) -> Self {
        self.save_assignment = save_assignment;
        self
    }

    pub fn save_result(mut self, save_result: bool) -> Self {
        self.save_result = save_result;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn terse(mut self, terse: bool) -> Self {
        self.terse = terse;
        self
    }

    pub fn build(self) -> EvalConfig {
        EvalConfig {
            save_assignment: self.save_assignment,
            save_result: self.save_result,
            verbose: self.verbose,
            terse: self.terse,
        }
    }
}
