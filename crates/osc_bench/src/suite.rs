use {
    crate::{BenchError, BenchOptions, Driver},
    osc_core::{is_operator_allowed, Datatype, Operator, Rank, RmaWindow},
    osc_verifier::{bridge_for, Summary, Validator},
    std::io::Write,
    tracing::{debug, warn},
};

const FIELD_WIDTH: usize = 20;
const RULE: &str = "-------------------------------------------";

/// Mean latency of one (datatype, operator) pair, measured by the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatencyRow {
    pub datatype: Datatype,
    pub operator: Operator,
    pub size: usize,
    pub micros: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SuiteOutcome {
    /// Whether this rank's validation summary passed.
    pub passed: bool,
    pub summary: Summary,
    /// Empty on the target.
    pub latencies: Vec<LatencyRow>,
}

impl SuiteOutcome {
    pub fn exit_code(&self) -> i32 {
        if self.passed {
            0
        } else {
            1
        }
    }
}

/// Runs the configured protocol for every selected pair the registry allows, writing latency
/// rows from the origin and then each rank's validation summary in rank order.
///
/// Every rank of the window must call this with the same options.
pub fn run_suite<W: RmaWindow>(
    win: &mut W,
    options: &BenchOptions,
    out: &mut dyn Write,
) -> Result<SuiteOutcome, BenchError> {
    options.validate()?;
    let rank = win.rank();
    let mut validator = Validator::new(bridge_for(options.accelerator));
    let mut latencies = Vec::new();

    for &datatype in &options.datatypes {
        for &operator in &options.operators {
            if !is_operator_allowed(datatype, operator) {
                debug!(%datatype, %operator, "combination not allowed; not run");
                continue;
            }
            if rank == Rank::ZERO {
                write_header(out, options, datatype, operator)?;
            }
            let driver = Driver::from_options(options, datatype, operator);
            let latency = driver.run(win, options.validate.then_some(&mut validator))?;
            if let Some(micros) = latency {
                writeln!(
                    out,
                    "{:<10}{:>width$.2}",
                    datatype.size(),
                    micros,
                    width = FIELD_WIDTH
                )?;
                latencies.push(LatencyRow {
                    datatype,
                    operator,
                    size: datatype.size(),
                    micros,
                });
            }
        }
    }

    let summary = validator.summary();
    for turn in [Rank::ZERO, Rank::ONE] {
        if turn == rank {
            writeln!(out, "{RULE}")?;
            writeln!(out, "Atomic Data Validation results for Rank={}:", rank.index())?;
            if options.colored {
                write!(out, "{}", summary.colored())?;
            } else {
                write!(out, "{summary}")?;
            }
            writeln!(out, "{RULE}")?;
            out.flush()?;
        }
        win.barrier()?;
    }
    if !summary.passed() {
        warn!(%rank, "atomic data validation failed");
    }

    Ok(SuiteOutcome {
        passed: summary.passed(),
        summary,
        latencies,
    })
}

fn write_header(
    out: &mut dyn Write,
    options: &BenchOptions,
    datatype: Datatype,
    operator: Operator,
) -> std::io::Result<()> {
    writeln!(out, "# MPI_Fetch_and_op latency test")?;
    writeln!(out, "# Synchronization: {}", options.protocol)?;
    writeln!(out, "# Datatype: {datatype}, Operator: {operator}")?;
    writeln!(out, "{:<10}{:>width$}", "# Size", "Latency (us)", width = FIELD_WIDTH)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn header_lines_up_with_rows() {
        let mut out = Vec::new();
        write_header(
            &mut out,
            &BenchOptions::default(),
            Datatype::Int,
            Operator::Sum,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[1], "# Synchronization: MPI_Win_flush");
        assert_eq!(lines[2], "# Datatype: MPI_INT, Operator: MPI_SUM");
        assert_eq!(lines[3].len(), 30);
        assert!(lines[3].ends_with("Latency (us)"));
    }

    #[test]
    fn exit_code_follows_the_summary() {
        let outcome = SuiteOutcome {
            passed: false,
            summary: Summary::from_entries(Vec::new()),
            latencies: Vec::new(),
        };
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(
            SuiteOutcome {
                passed: true,
                ..outcome
            }
            .exit_code(),
            0
        );
    }
}
