mod id;

pub use self::id::PathId;
use crate::{link::LinkId, node::NodeId};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// An ordered sequence of switches a probe travels through.
///
/// A path always has at least two nodes and never stays on the same
/// node between two consecutive hops, so every consecutive pair is a
/// real [`LinkId`].
///
/// ```
/// # use nettomo_core::path::Path;
/// let path: Path = "1 2 3 2".parse().unwrap();
/// assert_eq!(path.len(), 4);
/// assert_eq!(path.links().count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    nodes: Vec<NodeId>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("a path needs at least 2 nodes, got {len}")]
    TooShort { len: usize },
    #[error("node {node} is repeated at hop {hop}, a link needs two distinct nodes")]
    SelfLoop { node: NodeId, hop: usize },
    #[error("{0}")]
    InvalidNode(String),
}

impl Path {
    pub fn new(nodes: Vec<NodeId>) -> Result<Self, PathError> {
        if nodes.len() < 2 {
            return Err(PathError::TooShort { len: nodes.len() });
        }

        if let Some(hop) = nodes.windows(2).position(|pair| pair[0] == pair[1]) {
            return Err(PathError::SelfLoop {
                node: nodes[hop],
                hop,
            });
        }

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// number of nodes in the path (the hop count used by the
    /// hop analysis).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// iterate the links traversed by this path, in order.
    ///
    /// The same [`LinkId`] is returned more than once if the path
    /// crosses the same link more than once.
    pub fn links(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.nodes
            .windows(2)
            .map(|pair| LinkId::new((pair[0], pair[1])))
    }

    /// The nodes of the path without the final hop.
    pub fn prefix(&self) -> &[NodeId] {
        &self.nodes[..self.nodes.len() - 1]
    }

    /// The link crossed by the final hop.
    pub fn last_link(&self) -> LinkId {
        let n = self.nodes.len();
        LinkId::new((self.nodes[n - 2], self.nodes[n - 1]))
    }
}

impl FromStr for Path {
    type Err = PathError;

    /// Parses a whitespace separated list of node identifiers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let nodes = s
            .split_whitespace()
            .map(|node| {
                node.parse::<NodeId>()
                    .map_err(|error| PathError::InvalidNode(error.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(nodes)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes = self.nodes.iter();
        if let Some(first) = nodes.next() {
            write!(f, "{first}")?;
        }
        for node in nodes {
            write!(f, " {node}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(ids: &[u64]) -> Vec<NodeId> {
        ids.iter().copied().map(NodeId::new).collect()
    }

    #[test]
    fn too_short() {
        assert_eq!(
            Path::new(nodes(&[1])).unwrap_err(),
            PathError::TooShort { len: 1 }
        );
        assert!(Path::new(Vec::new()).is_err());
    }

    #[test]
    fn self_loop() {
        assert_eq!(
            Path::new(nodes(&[1, 2, 2, 3])).unwrap_err(),
            PathError::SelfLoop {
                node: NodeId::new(2),
                hop: 1
            }
        );
    }

    #[test]
    fn out_and_back_links() {
        let path = Path::new(nodes(&[1, 2, 1])).unwrap();
        let links: Vec<_> = path.links().collect();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0], links[1]);
    }

    #[test]
    fn prefix_and_last_link() {
        let path: Path = "4 5 6".parse().unwrap();

        assert_eq!(path.prefix(), nodes(&[4, 5]).as_slice());
        assert_eq!(
            path.last_link(),
            LinkId::new((NodeId::new(6), NodeId::new(5)))
        );
    }

    #[test]
    fn parse_invalid_node() {
        assert!(matches!(
            "1 x 3".parse::<Path>(),
            Err(PathError::InvalidNode(_))
        ));
    }

    #[test]
    fn display() {
        let path: Path = " 1  2 3 ".parse().unwrap();
        assert_eq!(path.to_string(), "1 2 3");
    }
}
