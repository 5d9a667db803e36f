//! Two-level toggle tree: containers with their entries.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. An entry keeps its
//! container's id only to recompute the rollup; the container owns the list
//! of children. Removed nodes are tombstoned, so an id is never reused and a
//! stale id reports [`TreeError::UnknownNode`] instead of hitting another node.
//!
//! A container's flag is always the AND of its children's flags, and `false`
//! when it has no children.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::domain::{ContainerRecord, EntryRecord, TitleId};

/// Handle to a node in a [`ToggleTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Errors from tree operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("Node {0:?} is not an entry")]
    NotAnEntry(NodeId),

    #[error("Node {0:?} is not a container")]
    NotAContainer(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Container {
        path: PathBuf,
        children: Vec<NodeId>,
    },
    Entry {
        parent: NodeId,
        title_id: TitleId,
        path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    enabled: bool,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Entry preference, or the rollup for a container
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container { .. })
    }

    /// Archive path for a container, entry path for an entry
    pub fn path(&self) -> &Path {
        match &self.kind {
            NodeKind::Container { path, .. } => path,
            NodeKind::Entry { path, .. } => Path::new(path),
        }
    }

    pub fn title_id(&self) -> Option<TitleId> {
        match self.kind {
            NodeKind::Entry { title_id, .. } => Some(title_id),
            NodeKind::Container { .. } => None,
        }
    }
}

/// What [`ToggleTree::remove_entry`] took out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Just the entry; its container remains
    Entry,

    /// The whole container with every entry under it
    Container(NodeId),
}

/// In-memory edit state for one title's DLC
#[derive(Debug, Clone, Default)]
pub struct ToggleTree {
    nodes: Vec<Option<Node>>,
    roots: Vec<NodeId>,
}

impl ToggleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// One container node per record, one entry node per record entry
    pub fn build(records: impl IntoIterator<Item = ContainerRecord>) -> Self {
        let mut tree = Self::new();
        for record in records {
            tree.push_container(record.path, record.entries);
        }
        tree
    }

    /// Append a container with every entry enabled
    pub fn import_container(
        &mut self,
        path: impl Into<PathBuf>,
        entries: impl IntoIterator<Item = EntryRecord>,
    ) -> NodeId {
        let entries = entries
            .into_iter()
            .map(|mut e| {
                e.enabled = true;
                e
            })
            .collect();
        self.push_container(path.into(), entries)
    }

    /// Flip an entry and recompute its container's rollup
    ///
    /// Returns the entry's new flag.
    pub fn toggle_entry(&mut self, id: NodeId) -> Result<bool, TreeError> {
        let node = self.node_mut(id)?;
        let parent = match node.kind {
            NodeKind::Entry { parent, .. } => parent,
            NodeKind::Container { .. } => return Err(TreeError::NotAnEntry(id)),
        };

        node.enabled = !node.enabled;
        let enabled = node.enabled;
        self.refresh_rollup(parent)?;

        debug!(?id, enabled, "Toggled entry");
        Ok(enabled)
    }

    /// Flip a container and set every child to the new value
    ///
    /// Returns the container's flag afterwards. A container without children
    /// stays disabled.
    pub fn toggle_container(&mut self, id: NodeId) -> Result<bool, TreeError> {
        let node = self.node(id).ok_or(TreeError::UnknownNode(id))?;
        let children = match &node.kind {
            NodeKind::Container { children, .. } => children.clone(),
            NodeKind::Entry { .. } => return Err(TreeError::NotAContainer(id)),
        };
        let value = !node.enabled;

        for child in children {
            self.node_mut(child)?.enabled = value;
        }
        let enabled = self.refresh_rollup(id)?;

        debug!(?id, enabled, "Toggled container");
        Ok(enabled)
    }

    /// Remove an entry, or its whole container if it was the last one
    ///
    /// Passing a container id removes that container and all its entries.
    pub fn remove_entry(&mut self, id: NodeId) -> Result<Removal, TreeError> {
        let parent = match self.node(id).ok_or(TreeError::UnknownNode(id))?.kind {
            NodeKind::Entry { parent, .. } => parent,
            NodeKind::Container { .. } => {
                self.remove_container(id)?;
                return Ok(Removal::Container(id));
            }
        };

        if self.children(parent)?.len() <= 1 {
            self.remove_container(parent)?;
            return Ok(Removal::Container(parent));
        }

        if let NodeKind::Container { children, .. } = &mut self.node_mut(parent)?.kind {
            children.retain(|c| *c != id);
        }
        self.nodes[id.0] = None;
        self.refresh_rollup(parent)?;

        Ok(Removal::Entry)
    }

    /// Drop every container and entry
    pub fn remove_all(&mut self) {
        for slot in &mut self.nodes {
            *slot = None;
        }
        self.roots.clear();
    }

    /// Containers, top to bottom
    pub fn containers(&self) -> &[NodeId] {
        &self.roots
    }

    /// Entries of a container, top to bottom
    pub fn children(&self, container: NodeId) -> Result<&[NodeId], TreeError> {
        match &self.node(container).ok_or(TreeError::UnknownNode(container))?.kind {
            NodeKind::Container { children, .. } => Ok(children),
            NodeKind::Entry { .. } => Err(TreeError::NotAContainer(container)),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn is_enabled(&self, id: NodeId) -> Result<bool, TreeError> {
        self.node(id)
            .map(Node::enabled)
            .ok_or(TreeError::UnknownNode(id))
    }

    /// First container whose archive path is `path`
    pub fn find_container(&self, path: &Path) -> Option<NodeId> {
        self.roots
            .iter()
            .copied()
            .find(|id| self.node(*id).is_some_and(|n| n.path() == path))
    }

    /// First entry of `container` with the given title id
    pub fn find_entry(&self, container: NodeId, title_id: TitleId) -> Option<NodeId> {
        self.children(container)
            .ok()?
            .iter()
            .copied()
            .find(|id| self.node(*id).and_then(Node::title_id) == Some(title_id))
    }

    /// Number of containers
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn push_container(&mut self, path: PathBuf, entries: Vec<EntryRecord>) -> NodeId {
        let container = self.alloc(Node {
            kind: NodeKind::Container {
                path,
                children: Vec::with_capacity(entries.len()),
            },
            enabled: false,
        });

        let children: Vec<NodeId> = entries
            .into_iter()
            .map(|e| {
                self.alloc(Node {
                    kind: NodeKind::Entry {
                        parent: container,
                        title_id: e.title_id,
                        path: e.path,
                    },
                    enabled: e.enabled,
                })
            })
            .collect();

        let enabled = rollup(children.iter().map(|c| self.nodes[c.0].as_ref()));
        if let Some(Node {
            kind: NodeKind::Container { children: slot, .. },
            enabled: flag,
        }) = self.nodes[container.0].as_mut()
        {
            *slot = children;
            *flag = enabled;
        }

        self.roots.push(container);
        container
    }

    fn remove_container(&mut self, id: NodeId) -> Result<(), TreeError> {
        for child in self.children(id)?.to_vec() {
            self.nodes[child.0] = None;
        }
        self.nodes[id.0] = None;
        self.roots.retain(|r| *r != id);

        debug!(?id, "Removed container");
        Ok(())
    }

    fn refresh_rollup(&mut self, container: NodeId) -> Result<bool, TreeError> {
        let enabled = rollup(self.children(container)?.iter().map(|c| self.node(*c)));
        self.node_mut(container)?.enabled = enabled;
        Ok(enabled)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(Some(node));
        NodeId(self.nodes.len() - 1)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(TreeError::UnknownNode(id))
    }
}

/// AND over the children, false when there are none
fn rollup<'a>(children: impl Iterator<Item = Option<&'a Node>>) -> bool {
    let mut any = false;
    for child in children {
        match child {
            Some(node) if node.enabled => any = true,
            _ => return false,
        }
    }
    any
}
