use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::iter::FusedIterator;

use super::types::{Category, CategoryId};
use crate::error::TreeError;

// ============================================================================
// Tree Storage
// ============================================================================

#[derive(Debug, Clone)]
struct Node {
    category: Category,
    parent: Option<usize>,
    /// Child indices, sorted with [`sibling_order`].
    children: Vec<usize>,
    depth: usize,
}

/// An immutable category forest built once per request.
///
/// Nodes live in an arena indexed by position; lookups by id and slug are
/// O(1). The subtree id set of every category is computed at build time so
/// that membership tests during content selection never re-walk the tree.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: Vec<Node>,
    roots: Vec<usize>,
    by_id: HashMap<CategoryId, usize>,
    by_slug: HashMap<String, usize>,
    subtrees: Vec<HashSet<CategoryId>>,
}

/// Siblings sort by name, then by id so the order is total.
fn sibling_order(a: &Category, b: &Category) -> Ordering {
    a.name.cmp(&b.name).then(a.id.cmp(&b.id))
}

impl CategoryTree {
    /// Build a tree from category records given in any order.
    ///
    /// # Errors
    ///
    /// - [`TreeError::DuplicateId`] / [`TreeError::DuplicateSlug`] when ids or slugs collide
    /// - [`TreeError::DanglingParent`] when a parent id is not in the input
    /// - [`TreeError::Cycle`] when some categories cannot be reached from a root
    ///
    /// No partial tree is ever returned.
    pub fn build<I>(categories: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = Category>,
    {
        let mut nodes: Vec<Node> = Vec::new();
        let mut by_id = HashMap::new();
        let mut by_slug = HashMap::new();

        for category in categories {
            let idx = nodes.len();
            if by_id.insert(category.id, idx).is_some() {
                return Err(TreeError::DuplicateId(category.id));
            }
            if by_slug.insert(category.slug.clone(), idx).is_some() {
                return Err(TreeError::DuplicateSlug(category.slug));
            }
            nodes.push(Node {
                category,
                parent: None,
                children: Vec::new(),
                depth: 0,
            });
        }

        // Link parents and children
        let mut roots = Vec::new();
        for idx in 0..nodes.len() {
            let Some(parent_id) = nodes[idx].category.parent_id else {
                roots.push(idx);
                continue;
            };
            let parent = *by_id
                .get(&parent_id)
                .ok_or_else(|| TreeError::DanglingParent {
                    id: nodes[idx].category.id,
                    parent_id,
                })?;
            nodes[idx].parent = Some(parent);
            nodes[parent].children.push(idx);
        }

        for idx in 0..nodes.len() {
            let mut children = std::mem::take(&mut nodes[idx].children);
            children.sort_by(|&a, &b| sibling_order(&nodes[a].category, &nodes[b].category));
            nodes[idx].children = children;
        }
        roots.sort_by(|&a, &b| sibling_order(&nodes[a].category, &nodes[b].category));

        // Every node has exactly one parent, so a walk from the roots visits each
        // node at most once. Whatever it misses sits on a cycle.
        let mut preorder = Vec::with_capacity(nodes.len());
        let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            preorder.push(idx);
            let depth = nodes[idx].depth + 1;
            for pos in (0..nodes[idx].children.len()).rev() {
                let child = nodes[idx].children[pos];
                nodes[child].depth = depth;
                stack.push(child);
            }
        }

        if preorder.len() != nodes.len() {
            let mut visited = vec![false; nodes.len()];
            for &idx in &preorder {
                visited[idx] = true;
            }
            let id = (0..nodes.len())
                .filter(|&idx| !visited[idx])
                .map(|idx| nodes[idx].category.id)
                .min()
                .unwrap_or_default();
            tracing::warn!(category_id = id, "Cycle detected in category hierarchy");
            return Err(TreeError::Cycle { id });
        }

        // Children finish before their parents in reverse pre-order.
        let mut subtrees: Vec<HashSet<CategoryId>> = vec![HashSet::new(); nodes.len()];
        for &idx in preorder.iter().rev() {
            let mut ids = HashSet::with_capacity(1 + nodes[idx].children.len());
            ids.insert(nodes[idx].category.id);
            for &child in &nodes[idx].children {
                ids.extend(subtrees[child].iter().copied());
            }
            subtrees[idx] = ids;
        }

        tracing::debug!(
            categories = nodes.len(),
            roots = roots.len(),
            "Built category tree"
        );

        Ok(Self {
            nodes,
            roots,
            by_id,
            by_slug,
            subtrees,
        })
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Pre-order walk yielding `(category, depth)`, roots at depth 0.
    ///
    /// Each call starts a fresh walk, so the sequence can be replayed.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Root categories in sibling order.
    pub fn roots(&self) -> impl Iterator<Item = &Category> + '_ {
        self.roots.iter().map(|&idx| &self.nodes[idx].category)
    }

    /// Direct children of a category in sibling order. Empty for unknown ids.
    pub fn children(&self, id: CategoryId) -> impl Iterator<Item = &Category> + '_ {
        self.by_id
            .get(&id)
            .map(|&idx| self.nodes[idx].children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&idx| &self.nodes[idx].category)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Resolve a slug to its category.
    pub fn find(&self, slug: &str) -> Result<&Category, TreeError> {
        self.by_slug
            .get(slug)
            .map(|&idx| &self.nodes[idx].category)
            .ok_or_else(|| TreeError::NotFound {
                slug: slug.to_string(),
            })
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.by_id.get(&id).map(|&idx| &self.nodes[idx].category)
    }

    /// Depth of a category (0 for roots).
    pub fn depth(&self, id: CategoryId) -> Option<usize> {
        self.by_id.get(&id).map(|&idx| self.nodes[idx].depth)
    }

    /// Ancestors ordered root first, ending with the direct parent.
    ///
    /// The category itself is excluded. Unknown ids yield an empty list.
    pub fn ancestors(&self, id: CategoryId) -> Vec<&Category> {
        let mut chain = Vec::new();
        let mut current = self.by_id.get(&id).and_then(|&idx| self.nodes[idx].parent);
        while let Some(idx) = current {
            chain.push(&self.nodes[idx].category);
            current = self.nodes[idx].parent;
        }
        chain.reverse();
        chain
    }

    /// Path from a root down to and including the category.
    pub fn breadcrumb(&self, id: CategoryId) -> Vec<&Category> {
        let Some(category) = self.get(id) else {
            return Vec::new();
        };
        let mut path = self.ancestors(id);
        path.push(category);
        path
    }

    /// Ids of the category and all of its descendants.
    pub fn subtree_ids(&self, id: CategoryId) -> Option<&HashSet<CategoryId>> {
        self.by_id.get(&id).map(|&idx| &self.subtrees[idx])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Lazy pre-order iterator returned by [`CategoryTree::traverse`].
#[derive(Debug, Clone)]
pub struct Traverse<'a> {
    tree: &'a CategoryTree,
    stack: Vec<usize>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = (&'a Category, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = &self.tree.nodes[idx];
        self.stack.extend(node.children.iter().rev().copied());
        Some((&node.category, node.depth))
    }
}

impl FusedIterator for Traverse<'_> {}
