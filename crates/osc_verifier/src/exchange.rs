use {
    atomic_model::Value,
    osc_core::{Datatype, Operator, Rank},
    std::fmt::{Display, Formatter},
};

/// Snapshot of one validation check, kept only when the check fails.
#[derive(Clone, Debug, PartialEq)]
pub struct Exchange {
    pub datatype: Datatype,
    pub operator: Operator,
    pub rank: Rank,
    /// 1-based trial number of the `(datatype, operator)` pair.
    pub trial: usize,
    /// The peer operating on this rank's window.
    pub inbound: Direction,
    /// This rank operating on the peer's window, as seen through the fetched result.
    pub outbound: Direction,
    pub disturbed: Option<Disturbance>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Direction {
    /// Initial content of the target location.
    pub target: Value,
    pub operand: Value,
    pub compare: Value,
    pub expected: Value,
    /// `None` when this direction was not verified.
    pub observed: Option<Value>,
}

impl Direction {
    pub fn failed(&self) -> bool {
        matches!(self.observed, Some(observed) if !observed.exact_eq(&self.expected))
    }
}

/// An atom past the first that no longer holds the rank's seed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Disturbance {
    pub buffer: Buffer,
    pub atom: usize,
    pub observed: Value,
    pub expected: Value,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Buffer {
    Window,
    Result,
}

impl Display for Buffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Buffer::Window => "window",
            Buffer::Result => "result",
        })
    }
}

impl Exchange {
    pub fn failed(&self) -> bool {
        self.inbound.failed() || self.outbound.failed() || self.disturbed.is_some()
    }
}

impl Display for Exchange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (op, dt) = (self.operator, self.datatype);
        if let (true, Some(observed)) = (self.inbound.failed(), self.inbound.observed) {
            let d = &self.inbound;
            writeln!(
                f,
                "Remote atomic operation {op} on {dt} failed validation of the window at atom index 0."
            )?;
            writeln!(
                f,
                "Initial Values: [local]window={}, [remote]operand={}, [remote]compare={}",
                d.target, d.operand, d.compare
            )?;
            writeln!(f, "Observed Final Value: window={observed}")?;
            writeln!(f, "Expected Final Value: window={}", d.expected)?;
        }
        if let (true, Some(observed)) = (self.outbound.failed(), self.outbound.observed) {
            let d = &self.outbound;
            writeln!(
                f,
                "Local atomic operation {op} on {dt} failed validation of the result at atom index 0."
            )?;
            writeln!(
                f,
                "Initial Values: [remote]window={}, [local]operand={}, [local]compare={}",
                d.target, d.operand, d.compare
            )?;
            writeln!(f, "Observed Final Value: result={observed}")?;
            writeln!(f, "Expected Final Value: result={}", d.expected)?;
        }
        if let Some(d) = &self.disturbed {
            writeln!(
                f,
                "Atomic operation {op} on {dt} disturbed the {} at atom index {}: observed {}, expected {}.",
                d.buffer, d.atom, d.observed, d.expected
            )?;
        }
        Ok(())
    }
}
