//! In-process coordination service.
//!
//! [`MemoryEnsemble`] keeps a node tree in memory and hands out
//! [`MemorySession`]s with the same liveness rules as ZooKeeper: ephemeral
//! nodes belong to the session that created them and vanish when that
//! session closes or is dropped. Sequential nodes get a 10-digit zero-padded
//! suffix taken from a per-parent counter.
//!
//! Sessions are synchronous; [`super::Session`] adds the async boundary.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{parent_path, validate_path, NodeMode};
use crate::error::{CoordinationError, Result};

#[derive(Debug, Default)]
struct Node {
    data: Vec<u8>,
    ephemeral_owner: Option<u64>,
    /// Counts child creations, like ZooKeeper's cversion
    next_sequence: u32,
}

#[derive(Debug, Default)]
struct Tree {
    nodes: BTreeMap<String, Node>,
    next_session: u64,
}

impl Tree {
    fn with_root() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::default());
        Self {
            nodes,
            next_session: 1,
        }
    }
}

/// Shared in-process node tree. Clones share the same tree.
#[derive(Debug, Clone)]
pub struct MemoryEnsemble {
    tree: Arc<Mutex<Tree>>,
}

impl Default for MemoryEnsemble {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEnsemble {
    pub fn new() -> Self {
        Self {
            tree: Arc::new(Mutex::new(Tree::with_root())),
        }
    }

    /// Opens a new session against this ensemble.
    pub fn connect(&self) -> MemorySession {
        let id = {
            let mut tree = self.lock();
            let id = tree.next_session;
            tree.next_session += 1;
            id
        };
        tracing::debug!(session_id = id, "Memory coordination session opened");

        MemorySession {
            id,
            tree: self.tree.clone(),
        }
    }

    /// Number of nodes currently in the tree, the root included.
    pub fn node_count(&self) -> usize {
        self.lock().nodes.len()
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A session on a [`MemoryEnsemble`]. Dropping it ends the session.
#[derive(Debug)]
pub struct MemorySession {
    id: u64,
    tree: Arc<Mutex<Tree>>,
}

impl MemorySession {
    pub fn id(&self) -> u64 {
        self.id
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn exists(&self, path: &str) -> Result<bool> {
        validate_path(path)?;
        Ok(self.lock().nodes.contains_key(path))
    }

    pub fn create(&self, path: &str, data: &[u8], mode: NodeMode) -> Result<String> {
        validate_path(path)?;
        let parent = parent_path(path)
            .ok_or_else(|| CoordinationError::NodeExists(path.to_string()))?;

        let mut tree = self.lock();

        match tree.nodes.get(parent) {
            None => return Err(CoordinationError::NoNode(parent.to_string())),
            Some(node) if node.ephemeral_owner.is_some() => {
                return Err(CoordinationError::Backend(format!(
                    "ephemeral node {} cannot have children",
                    parent
                )))
            }
            Some(_) => {}
        }

        let created = match mode {
            NodeMode::Persistent | NodeMode::Ephemeral => path.to_string(),
            NodeMode::EphemeralSequential => {
                let sequence = tree
                    .nodes
                    .get(parent)
                    .map(|node| node.next_sequence)
                    .unwrap_or_default();
                format!("{}{:010}", path, sequence)
            }
        };

        if tree.nodes.contains_key(&created) {
            return Err(CoordinationError::NodeExists(created));
        }
        // Only successful creations advance the parent's counter
        if let Some(node) = tree.nodes.get_mut(parent) {
            node.next_sequence = node.next_sequence.wrapping_add(1);
        }

        let ephemeral_owner = match mode {
            NodeMode::Persistent => None,
            NodeMode::Ephemeral | NodeMode::EphemeralSequential => Some(self.id),
        };
        tree.nodes.insert(
            created.clone(),
            Node {
                data: data.to_vec(),
                ephemeral_owner,
                next_sequence: 0,
            },
        );

        Ok(created)
    }

    /// Child names (not full paths) in sorted order.
    pub fn children(&self, path: &str) -> Result<Vec<String>> {
        validate_path(path)?;
        let tree = self.lock();
        if !tree.nodes.contains_key(path) {
            return Err(CoordinationError::NoNode(path.to_string()));
        }

        let prefix = if path == "/" {
            "/".to_string()
        } else {
            format!("{}/", path)
        };

        Ok(tree
            .nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| &key[prefix.len()..])
            .filter(|name| !name.is_empty() && !name.contains('/'))
            .map(str::to_string)
            .collect())
    }

    pub fn data(&self, path: &str) -> Result<Vec<u8>> {
        validate_path(path)?;
        self.lock()
            .nodes
            .get(path)
            .map(|node| node.data.clone())
            .ok_or_else(|| CoordinationError::NoNode(path.to_string()))
    }

    /// Ends the session, removing every ephemeral node it owns.
    pub fn close(&self) {
        let mut tree = self.lock();
        let before = tree.nodes.len();
        tree.nodes
            .retain(|_, node| node.ephemeral_owner != Some(self.id));
        let removed = before - tree.nodes.len();

        if removed > 0 {
            tracing::debug!(
                session_id = self.id,
                removed,
                "Memory session closed, ephemeral nodes removed"
            );
        }
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistent_create_and_read() {
        let ensemble = MemoryEnsemble::new();
        let session = ensemble.connect();

        assert!(!session.exists("/minidubbo").unwrap());
        let path = session.create("/minidubbo", b"", NodeMode::Persistent).unwrap();
        assert_eq!(path, "/minidubbo");
        assert!(session.exists("/minidubbo").unwrap());
        assert_eq!(session.data("/minidubbo").unwrap(), b"");
    }

    #[test]
    fn test_duplicate_create_is_node_exists() {
        let session = MemoryEnsemble::new().connect();
        session.create("/a", b"", NodeMode::Persistent).unwrap();
        let err = session.create("/a", b"", NodeMode::Persistent).unwrap_err();
        assert!(matches!(err, CoordinationError::NodeExists(p) if p == "/a"));
    }

    #[test]
    fn test_missing_parent_is_no_node() {
        let session = MemoryEnsemble::new().connect();
        let err = session.create("/a/b", b"", NodeMode::Persistent).unwrap_err();
        assert!(matches!(err, CoordinationError::NoNode(p) if p == "/a"));
    }

    #[test]
    fn test_sequential_suffixes_are_padded_and_increasing() {
        let session = MemoryEnsemble::new().connect();
        session.create("/svc", b"", NodeMode::Persistent).unwrap();

        let first = session.create("/svc/server", b"1", NodeMode::EphemeralSequential).unwrap();
        let second = session.create("/svc/server", b"2", NodeMode::EphemeralSequential).unwrap();

        assert_eq!(first, "/svc/server0000000000");
        assert_eq!(second, "/svc/server0000000001");
        assert_eq!(
            session.children("/svc").unwrap(),
            vec!["server0000000000", "server0000000001"]
        );
    }

    #[test]
    fn test_children_are_direct_only() {
        let session = MemoryEnsemble::new().connect();
        session.create("/a", b"", NodeMode::Persistent).unwrap();
        session.create("/a/b", b"", NodeMode::Persistent).unwrap();
        session.create("/a/b/c", b"", NodeMode::Persistent).unwrap();
        session.create("/ab", b"", NodeMode::Persistent).unwrap();

        assert_eq!(session.children("/a").unwrap(), vec!["b"]);
        assert_eq!(session.children("/").unwrap(), vec!["a", "ab"]);
        assert!(matches!(
            session.children("/missing"),
            Err(CoordinationError::NoNode(_))
        ));
    }

    #[test]
    fn test_ephemeral_nodes_vanish_with_session() {
        let ensemble = MemoryEnsemble::new();
        let owner = ensemble.connect();
        let observer = ensemble.connect();

        owner.create("/svc", b"", NodeMode::Persistent).unwrap();
        let provider = owner
            .create("/svc/server", b"127.0.0.1:9001", NodeMode::EphemeralSequential)
            .unwrap();
        assert!(observer.exists(&provider).unwrap());

        drop(owner);

        assert!(!observer.exists(&provider).unwrap());
        assert!(observer.exists("/svc").unwrap());
        assert!(observer.children("/svc").unwrap().is_empty());
    }

    #[test]
    fn test_ephemeral_node_cannot_have_children() {
        let session = MemoryEnsemble::new().connect();
        session.create("/e", b"", NodeMode::Ephemeral).unwrap();
        let err = session.create("/e/child", b"", NodeMode::Persistent).unwrap_err();
        assert!(matches!(err, CoordinationError::Backend(_)));
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let ensemble = MemoryEnsemble::new();
        assert_ne!(ensemble.connect().id(), ensemble.connect().id());
    }
}
