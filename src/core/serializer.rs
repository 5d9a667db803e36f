//! Flattening an edited tree back into catalog records.

use crate::domain::{ContainerRecord, EntryRecord};

use super::tree::{NodeKind, ToggleTree};

/// Containers top to bottom, entries top to bottom within each
///
/// Containers that hold no entries are left out.
pub fn flatten(tree: &ToggleTree) -> Vec<ContainerRecord> {
    tree.containers()
        .iter()
        .filter_map(|id| tree.node(*id))
        .filter_map(|container| match container.kind() {
            NodeKind::Container { path, children } if !children.is_empty() => {
                let entries = children
                    .iter()
                    .filter_map(|c| tree.node(*c))
                    .filter_map(|entry| match entry.kind() {
                        NodeKind::Entry { title_id, path, .. } => {
                            Some(EntryRecord::new(path.clone(), *title_id, entry.enabled()))
                        }
                        NodeKind::Container { .. } => None,
                    })
                    .collect();
                Some(ContainerRecord::new(path.clone(), entries))
            }
            _ => None,
        })
        .collect()
}
