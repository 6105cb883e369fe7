use std::collections::HashSet;

use crate::error::InputError;
use crate::model::{GraphInput, Node};

impl GraphInput {
    /// Eagerly check the composition preconditions.
    ///
    /// Composition itself tolerates every problem reported here; this is for
    /// callers that would rather reject malformed documents than lay out a
    /// degraded graph. Returns the first problem found.
    pub fn validate(&self) -> Result<(), InputError> {
        let node_ids = unique_ids("nodes", self.nodes.iter())?;
        let c1_ids = unique_ids("c1Categories", self.c1_categories.iter())?;
        unique_ids(
            "c2Categories",
            self.c2_categories.iter().map(|category| &category.node),
        )?;

        for category in &self.c2_categories {
            if !c1_ids.contains(category.c1_category_id.as_str()) {
                return Err(InputError::UnknownCategory {
                    c2: category.id().to_string(),
                    c1: category.c1_category_id.clone(),
                });
            }
            if let Some(missing) = category
                .node_ids
                .iter()
                .find(|id| !node_ids.contains(id.as_str()))
            {
                return Err(InputError::UnknownMember {
                    c2: category.id().to_string(),
                    node: missing.clone(),
                });
            }
        }
        Ok(())
    }
}

fn unique_ids<'a>(
    collection: &'static str,
    nodes: impl Iterator<Item = &'a Node>,
) -> Result<HashSet<&'a str>, InputError> {
    let mut seen = HashSet::new();
    for (index, node) in nodes.enumerate() {
        if node.id.is_empty() {
            return Err(InputError::EmptyId { collection, index });
        }
        if !seen.insert(node.id.as_str()) {
            return Err(InputError::DuplicateId {
                collection,
                id: node.id.clone(),
            });
        }
    }
    Ok(seen)
}
