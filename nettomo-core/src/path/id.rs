use std::{fmt, num::ParseIntError, str};

/// The identifier of a monitored path
///
/// This is the number written on the left hand side of the path file
/// (`id -> n1 n2 ...`). In the probe log the same number shows up as
/// the UDP source port the probes of that path were sent from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathId(u32);

impl PathId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_u32(self) -> u32 {
        self.0
    }
}

impl str::FromStr for PathId {
    type Err = ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
