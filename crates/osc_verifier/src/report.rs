use {
    crate::LedgerEntry,
    colorful::{Color, Colorful},
    osc_core::{Datatype, Operator},
    std::fmt::{Display, Formatter},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Passed,
    Failed,
    Skipped,
}

impl Status {
    fn color(self) -> Color {
        match self {
            Status::Passed => Color::Green,
            Status::Failed => Color::Red,
            Status::Skipped => Color::Yellow,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SummaryLine {
    pub status: Status,
    pub text: String,
}

/// The human-readable pass/fail report produced by draining a ledger.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Summary {
    lines: Vec<SummaryLine>,
    passed: bool,
}

impl Summary {
    /// One line per combination followed by a closing total. Skipped combinations count as
    /// failures of the run, an empty ledger counts as a pass.
    pub fn from_entries(entries: impl IntoIterator<Item = (Datatype, Operator, LedgerEntry)>) -> Self {
        let mut lines = Vec::new();
        let mut combinations = 0;
        let mut failures = 0;
        for (datatype, operator, entry) in entries {
            combinations += 1;
            let test = format!("{operator} on {datatype}");
            let line = if entry.passed() {
                SummaryLine {
                    status: Status::Passed,
                    text: format!("PASSED: {test} passed {} trials.", entry.trials),
                }
            } else if entry.validation_failures > 0 {
                SummaryLine {
                    status: Status::Failed,
                    text: format!(
                        "FAILED: {test} had {} of {} tests fail data validation.\n\
                         \t\tFirst failure at trial {}, last failure at trial {}.",
                        entry.validation_failures,
                        entry.trials,
                        entry.first_failure.unwrap_or_default(),
                        entry.last_failure.unwrap_or_default(),
                    ),
                }
            } else {
                SummaryLine {
                    status: Status::Skipped,
                    text: format!("SKIPPED: Data validation not available for {test}"),
                }
            };
            if line.status != Status::Passed {
                failures += 1;
            }
            lines.push(line);
        }

        if combinations == 0 {
            return Summary {
                lines: vec![SummaryLine {
                    status: Status::Skipped,
                    text: "SKIPPED: No validations were performed!".to_string(),
                }],
                passed: true,
            };
        }
        let passed = failures == 0;
        lines.push(if passed {
            SummaryLine {
                status: Status::Passed,
                text: format!(
                    "PASSED: All {combinations} combinations of ops and datatypes tested passed."
                ),
            }
        } else {
            SummaryLine {
                status: Status::Failed,
                text: format!(
                    "FAILED: {failures} of the {combinations} combinations of ops and datatypes tested failed."
                ),
            }
        });
        Summary { lines, passed }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn lines(&self) -> &[SummaryLine] {
        &self.lines
    }

    /// The report with ANSI colors for terminals.
    pub fn colored(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{}\n", line.text.clone().color(line.status.color())))
            .collect()
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(trials: usize, performed: usize, failures: &[usize]) -> LedgerEntry {
        LedgerEntry {
            trials,
            validations_performed: performed,
            validation_failures: failures.len(),
            first_failure: failures.first().copied(),
            last_failure: failures.last().copied(),
        }
    }

    #[test]
    fn empty_ledger_passes() {
        let summary = Summary::from_entries(Vec::new());
        assert!(summary.passed());
        assert_eq!(summary.to_string(), "SKIPPED: No validations were performed!\n");
    }

    #[test]
    fn all_passed() {
        let summary = Summary::from_entries(vec![
            (Datatype::Int, Operator::Sum, entry(4, 4, &[])),
            (Datatype::Double, Operator::Max, entry(2, 2, &[])),
        ]);
        assert!(summary.passed());
        assert_eq!(
            summary.to_string(),
            "PASSED: MPI_SUM on MPI_INT passed 4 trials.\n\
             PASSED: MPI_MAX on MPI_DOUBLE passed 2 trials.\n\
             PASSED: All 2 combinations of ops and datatypes tested passed.\n"
        );
    }

    #[test]
    fn failures_and_skips_fail_the_run() {
        let summary = Summary::from_entries(vec![
            (Datatype::LongLong, Operator::Sum, entry(10, 10, &[3, 7])),
            (Datatype::Float, Operator::Min, entry(1, 0, &[])),
            (Datatype::Int, Operator::Prod, entry(1, 1, &[])),
        ]);
        assert!(!summary.passed());
        let statuses: Vec<_> = summary.lines().iter().map(|l| l.status).collect();
        assert_eq!(
            statuses,
            vec![Status::Failed, Status::Skipped, Status::Passed, Status::Failed]
        );
        assert_eq!(
            summary.lines()[0].text,
            "FAILED: MPI_SUM on MPI_LONG_LONG had 2 of 10 tests fail data validation.\n\
             \t\tFirst failure at trial 3, last failure at trial 7."
        );
        assert_eq!(
            summary.lines()[1].text,
            "SKIPPED: Data validation not available for MPI_MIN on MPI_FLOAT"
        );
        assert_eq!(
            summary.lines()[3].text,
            "FAILED: 2 of the 3 combinations of ops and datatypes tested failed."
        );
    }

    #[test]
    fn colored_keeps_the_text() {
        let summary = Summary::from_entries(vec![(Datatype::Int, Operator::Sum, entry(1, 1, &[]))]);
        assert!(summary.colored().contains("PASSED: MPI_SUM on MPI_INT passed 1 trials."));
    }
}
