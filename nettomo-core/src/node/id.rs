use anyhow::anyhow;
use std::{fmt, str};

/// The identifier of a switch in the monitored topology
///
/// Path files number the switches from `1`, the value is kept as
/// written so that the reports use the same names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(C)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_u64(self) -> u64 {
        self.0
    }
}

impl str::FromStr for NodeId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .map(Self)
            .map_err(|error| anyhow!("invalid node `{s}': {error}"))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print() {
        assert_eq!(format!("{}", NodeId(42)), "42")
    }

    #[test]
    fn parse() {
        assert_eq!("42".parse::<NodeId>().unwrap(), NodeId(42));
    }

    #[test]
    fn parse_rejects_negative() {
        assert!("-1".parse::<NodeId>().is_err());
        assert!("s1".parse::<NodeId>().is_err());
    }
}
