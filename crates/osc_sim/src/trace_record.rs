use {
    crate::{CausalClock, Command, Event},
    osc_core::Rank,
    std::fmt::{Display, Formatter},
};

/// One resolved primitive: the command a rank issued and the event that resumed it.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceRecord {
    pub rank: Rank,
    pub command: Command,
    pub event: Event,
    pub clock: CausalClock,
}

impl Display for TraceRecord {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        formatter.write_fmt(format_args!(
            "{:?}@{} → {} → {:?}",
            self.command, self.clock, self.rank, self.event
        ))
    }
}
