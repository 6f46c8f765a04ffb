//! The monitored topology: the set of paths probes travel along and
//! the links they cover.
//!
//! The topology is read once, at start up, from a path file where each
//! line maps a path identifier to its node sequence:
//!
//! ```text
//! # id -> nodes
//! 3 -> 1 2 3
//! 4 -> 2 3
//! ```
//!
//! Paths are indexed in the order they are declared. Links are indexed
//! the first time a path crosses them, walking the paths in that same
//! order.

use crate::{
    Registry,
    link::LinkId,
    node::NodeId,
    path::{Path, PathError, PathId},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Topology {
    paths: Vec<Path>,
    path_ids: Registry<PathId>,
    links: Registry<LinkId>,
}

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("path {0} is declared more than once")]
    DuplicatePath(PathId),
    #[error("the topology has no monitored path")]
    Empty,
    #[error("line {line}: expecting `<id> -> <node> <node> ...', got `{content}'")]
    Syntax { line: usize, content: String },
    #[error("line {line}: invalid path identifier `{content}'")]
    InvalidPathId { line: usize, content: String },
    #[error("line {line}: {source}")]
    Path {
        line: usize,
        #[source]
        source: PathError,
    },
}

impl Topology {
    /// build the topology from the monitored paths, in the order given.
    pub fn from_paths<I>(paths: I) -> Result<Self, TopologyError>
    where
        I: IntoIterator<Item = (PathId, Path)>,
    {
        let mut topology = Self {
            paths: Vec::new(),
            path_ids: Registry::new(),
            links: Registry::new(),
        };

        for (id, path) in paths {
            topology.insert(id, path)?;
        }

        if topology.paths.is_empty() {
            return Err(TopologyError::Empty);
        }

        debug!(
            paths = topology.path_count(),
            links = topology.link_count(),
            "topology loaded"
        );

        Ok(topology)
    }

    /// parse the content of a path file.
    ///
    /// Blank lines and lines starting with `#` are ignored. The file
    /// may open with a single `<name>:` header line (the controller
    /// writes `id_path:`). Any other line must follow the
    /// `<id> -> <node> <node> ...` format.
    pub fn parse(content: &str) -> Result<Self, TopologyError> {
        let mut paths = Vec::new();
        let mut header_allowed = true;

        for (index, raw) in content.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if std::mem::take(&mut header_allowed) && is_header(trimmed) {
                debug!(line, header = trimmed, "path file header skipped");
                continue;
            }

            let Some((id, nodes)) = trimmed.split_once("->") else {
                return Err(TopologyError::Syntax {
                    line,
                    content: trimmed.to_owned(),
                });
            };

            let id = id
                .parse::<PathId>()
                .map_err(|_| TopologyError::InvalidPathId {
                    line,
                    content: id.trim().to_owned(),
                })?;
            let path = nodes
                .parse::<Path>()
                .map_err(|source| TopologyError::Path { line, source })?;

            paths.push((id, path));
        }

        Self::from_paths(paths)
    }

    fn insert(&mut self, id: PathId, path: Path) -> Result<(), TopologyError> {
        if self.path_ids.get(&id).is_some() {
            return Err(TopologyError::DuplicatePath(id));
        }

        self.path_ids.get_or_create_id(id);
        for link in path.links() {
            self.links.get_or_create_id(link);
        }
        self.paths.push(path);

        Ok(())
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// the monitored paths with their identifier, ordered by path index.
    pub fn paths(&self) -> impl Iterator<Item = (PathId, &Path)> + '_ {
        self.path_ids.keys().iter().copied().zip(self.paths.iter())
    }

    pub fn path(&self, index: usize) -> Option<&Path> {
        self.paths.get(index)
    }

    pub fn path_ids(&self) -> &[PathId] {
        self.path_ids.keys()
    }

    pub fn path_index(&self, id: PathId) -> Option<usize> {
        self.path_ids.get(&id)
    }

    /// all the links, ordered by link index.
    pub fn links(&self) -> &[LinkId] {
        self.links.keys()
    }

    pub fn link_index(&self, link: LinkId) -> Option<usize> {
        self.links.get(&link)
    }

    /// find the monitored path that follows exactly `nodes`.
    pub fn find_path(&self, nodes: &[NodeId]) -> Option<usize> {
        self.paths.iter().position(|path| path.nodes() == nodes)
    }
}

/// `id_path:`, `did_path:`...
fn is_header(line: &str) -> bool {
    line.strip_suffix(':').is_some_and(|name| {
        !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATHS: &str = "\
# id -> nodes
3 -> 1 2 3

4 -> 2 3
";

    fn link(a: u64, b: u64) -> LinkId {
        LinkId::new((NodeId::new(a), NodeId::new(b)))
    }

    #[test]
    fn parse() {
        let topology = Topology::parse(PATHS).unwrap();

        assert_eq!(topology.path_count(), 2);
        assert_eq!(topology.link_count(), 2);
        assert_eq!(topology.path_ids(), &[PathId::new(3), PathId::new(4)]);
        assert_eq!(topology.links(), &[link(1, 2), link(2, 3)]);
        assert_eq!(topology.link_index(link(3, 2)), Some(1));
        assert_eq!(topology.path_index(PathId::new(4)), Some(1));
    }

    #[test]
    fn links_indexed_in_encounter_order() {
        let topology = Topology::parse("1 -> 5 4\n2 -> 4 3 4 5\n3 -> 3 2").unwrap();

        assert_eq!(
            topology.links(),
            &[link(4, 5), link(3, 4), link(2, 3)],
            "the reverse of an already seen link must reuse its index"
        );
    }

    #[test]
    fn controller_header() {
        let topology = Topology::parse("id_path:\n 10001 -> 1 2 3 \n 10002 -> 2 3 \n").unwrap();

        assert_eq!(topology.path_count(), 2);
        assert_eq!(topology.path_ids(), &[PathId::new(10_001), PathId::new(10_002)]);
        assert_eq!(topology.links(), &[link(1, 2), link(2, 3)]);
    }

    #[test]
    fn header_only_before_first_path() {
        let error = Topology::parse("10001 -> 1 2\nid_path:\n10002 -> 2 3\n").unwrap_err();
        assert!(matches!(error, TopologyError::Syntax { line: 2, .. }));

        let error = Topology::parse("id_path:\ndid_path:\n10001 -> 1 2\n").unwrap_err();
        assert!(matches!(error, TopologyError::Syntax { line: 2, .. }));
    }

    #[test]
    fn duplicate_path() {
        assert!(matches!(
            Topology::parse("1 -> 1 2\n1 -> 2 3"),
            Err(TopologyError::DuplicatePath(id)) if id == PathId::new(1)
        ));
    }

    #[test]
    fn syntax_error_reports_line() {
        let error = Topology::parse("1 -> 1 2\n\n2 = 2 3").unwrap_err();
        assert!(matches!(error, TopologyError::Syntax { line: 3, .. }));
    }

    #[test]
    fn invalid_path() {
        let error = Topology::parse("1 -> 1").unwrap_err();
        assert!(matches!(
            error,
            TopologyError::Path {
                line: 1,
                source: PathError::TooShort { len: 1 }
            }
        ));
    }

    #[test]
    fn invalid_path_id() {
        let error = Topology::parse("port -> 1 2").unwrap_err();
        assert!(matches!(error, TopologyError::InvalidPathId { line: 1, .. }));
    }

    #[test]
    fn empty() {
        assert!(matches!(
            Topology::parse("# nothing\n"),
            Err(TopologyError::Empty)
        ));
    }

    #[test]
    fn find_path() {
        let topology = Topology::parse(PATHS).unwrap();
        let nodes = [NodeId::new(2), NodeId::new(3)];

        assert_eq!(topology.find_path(&nodes), Some(1));
        assert_eq!(topology.find_path(&nodes[..1]), None);
    }
}
