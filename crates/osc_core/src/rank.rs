use core::fmt::{Debug, Display, Formatter};
use std::ops::{Index, IndexMut};

/// Identifies one of the two participants of a window.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Rank(usize);

impl Rank {
    pub const ZERO: Rank = Rank(0);
    pub const ONE: Rank = Rank(1);

    /// The other party of the two-rank exchange.
    pub fn peer(self) -> Rank {
        Rank(self.0 ^ 1)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl Debug for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(":")?;
        Display::fmt(&self.0, f)
    }
}

impl From<Rank> for usize {
    fn from(rank: Rank) -> Self {
        rank.0
    }
}

impl From<usize> for Rank {
    fn from(n: usize) -> Self {
        Rank(n)
    }
}

impl<T> Index<Rank> for [T] {
    type Output = T;
    fn index(&self, rank: Rank) -> &Self::Output {
        self.index(usize::from(rank))
    }
}

impl<T> IndexMut<Rank> for [T] {
    fn index_mut(&mut self, rank: Rank) -> &mut Self::Output {
        self.index_mut(usize::from(rank))
    }
}

impl<T> Index<Rank> for Vec<T> {
    type Output = T;
    fn index(&self, rank: Rank) -> &Self::Output {
        self.index(usize::from(rank))
    }
}

impl<T> IndexMut<Rank> for Vec<T> {
    fn index_mut(&mut self, rank: Rank) -> &mut Self::Output {
        self.index_mut(usize::from(rank))
    }
}
