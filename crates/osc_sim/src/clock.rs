use {
    osc_core::Rank,
    std::{
        cmp::{max, Ordering},
        fmt::{self, Display, Formatter},
    },
};

/// A vector clock over the ranks of one simulated window. Provides the happens-before order the
/// race checks rely on.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CausalClock(Vec<u32>);

impl CausalClock {
    pub fn new(ranks: usize) -> Self {
        CausalClock(vec![0; ranks])
    }

    /// Advances the component owned by `rank`.
    pub fn tick(&mut self, rank: Rank) {
        let index = rank.index();
        if index >= self.0.len() {
            self.0.resize(1 + index, 0);
        }
        self.0[index] += 1;
    }

    pub fn merge_in(&mut self, other: &Self) {
        if other.0.len() > self.0.len() {
            self.0.resize(other.0.len(), 0);
        }
        for (mine, theirs) in self.0.iter_mut().zip(&other.0) {
            *mine = max(*mine, *theirs);
        }
    }

    /// Whether everything `self` has seen is also known to `other`.
    pub fn precedes(&self, other: &Self) -> bool {
        matches!(
            self.partial_cmp(other),
            Some(Ordering::Less | Ordering::Equal)
        )
    }

    fn get(&self, index: usize) -> u32 {
        self.0.get(index).copied().unwrap_or(0)
    }
}

impl PartialOrd for CausalClock {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        let mut ordering = Ordering::Equal;
        for i in 0..max(self.0.len(), rhs.0.len()) {
            match (ordering, self.get(i).cmp(&rhs.get(i))) {
                (_, Ordering::Equal) => {}
                (Ordering::Equal, next) => ordering = next,
                (current, next) if current != next => return None,
                _ => {}
            }
        }
        Some(ordering)
    }
}

impl Display for CausalClock {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("<")?;
        for (i, element) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{element}")?;
        }
        f.write_str(">")
    }
}
