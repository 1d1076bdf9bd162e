//! Flat category list to ordered forest.
//!
//! # Design
//! Records are sorted once into a canonical order and every later step works
//! on positions in that order, so nodes are built in an index arena and only
//! turned into owned `CategoryNode`s at the end. Parents that do not resolve
//! (null or dangling) make a node a root. Parent chains that loop back on
//! themselves cannot come from a validating server, but the builder still
//! breaks them so consumers can walk the result without recursing forever.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::types::Category;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Depth-first, pre-order walk of this subtree; the node itself is depth 0.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }

    pub fn find(&self, id: Uuid) -> Option<&CategoryNode> {
        self.walk().map(|(_, node)| node).find(|node| node.category.id == id)
    }

    /// Number of nodes in this subtree, including itself.
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl Drop for CategoryNode {
    // Flattens descendants into one list first; the default drop recurses
    // once per level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Iterator returned by `CategoryNode::walk` and `walk_forest`.
pub struct Walk<'a> {
    stack: Vec<(usize, &'a CategoryNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a CategoryNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

/// Walks every root in order, each depth-first.
pub fn walk_forest(forest: &[CategoryNode]) -> Walk<'_> {
    Walk {
        stack: forest.iter().rev().map(|root| (0, root)).collect(),
    }
}

pub fn find_in_forest(forest: &[CategoryNode], id: Uuid) -> Option<&CategoryNode> {
    walk_forest(forest)
        .map(|(_, node)| node)
        .find(|node| node.category.id == id)
}

/// Locale-style name ordering: case-insensitive first, lower case before
/// upper case on otherwise equal names, code points last.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded
        .then_with(|| lower_case_first(a, b))
        .then_with(|| a.cmp(b))
}

fn lower_case_first(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

/// Canonical order of categories: by name, then by id, then by the remaining
/// fields so records sharing an id still have a single order.
pub fn compare_categories(a: &Category, b: &Category) -> Ordering {
    compare_names(&a.name, &b.name)
        .then_with(|| a.id.cmp(&b.id))
        .then_with(|| a.parent_category_id.cmp(&b.parent_category_id))
        .then_with(|| a.project_id.cmp(&b.project_id))
        .then_with(|| a.description.cmp(&b.description))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.updated_at.cmp(&b.updated_at))
}

/// Build the forest for `categories`. Every record appears exactly once; the
/// root list and every child list are name-sorted.
pub fn build_tree(categories: &[Category]) -> Vec<CategoryNode> {
    let mut sorted: Vec<&Category> = categories.iter().collect();
    sorted.sort_by(|a, b| compare_categories(a, b));

    let mut index: HashMap<Uuid, usize> = HashMap::with_capacity(sorted.len());
    for (pos, category) in sorted.iter().enumerate() {
        index.entry(category.id).or_insert(pos);
    }

    // Positions follow canonical order, so sorting positions sorts by name.
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); sorted.len()];
    let mut parent_of: Vec<Option<usize>> = vec![None; sorted.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (pos, category) in sorted.iter().enumerate() {
        match category.parent_category_id.and_then(|p| index.get(&p).copied()) {
            Some(parent) => {
                children[parent].push(pos);
                children[parent].sort_unstable();
                parent_of[pos] = Some(parent);
            }
            None => roots.push(pos),
        }
    }

    let mut visited = vec![false; sorted.len()];
    for &root in &roots {
        mark_reachable(root, &children, &mut visited);
    }
    while let Some(pos) = visited.iter().position(|seen| !seen) {
        if let Some(parent) = parent_of[pos].take() {
            children[parent].retain(|&child| child != pos);
        }
        tracing::warn!(
            category_id = %sorted[pos].id,
            name = %sorted[pos].name,
            "category parent chain forms a cycle; placing it at the root"
        );
        roots.push(pos);
        mark_reachable(pos, &children, &mut visited);
    }
    roots.sort_unstable();

    assemble(&roots, &sorted, &children)
}

fn mark_reachable(start: usize, children: &[Vec<usize>], visited: &mut [bool]) {
    let mut stack = vec![start];
    while let Some(pos) = stack.pop() {
        if visited[pos] {
            continue;
        }
        visited[pos] = true;
        stack.extend(children[pos].iter().copied().filter(|&c| !visited[c]));
    }
}

/// Builds owned nodes children-first with an explicit stack, so chain depth
/// is bounded by memory rather than by the thread's stack.
fn assemble(roots: &[usize], sorted: &[&Category], children: &[Vec<usize>]) -> Vec<CategoryNode> {
    let mut built: Vec<Option<CategoryNode>> = (0..sorted.len()).map(|_| None).collect();
    let mut stack: Vec<(usize, bool)> = roots.iter().map(|&root| (root, false)).collect();
    while let Some((pos, expanded)) = stack.pop() {
        if expanded {
            let kids = children[pos]
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            built[pos] = Some(CategoryNode {
                category: sorted[pos].clone(),
                children: kids,
            });
        } else {
            stack.push((pos, true));
            stack.extend(children[pos].iter().map(|&child| (child, false)));
        }
    }
    roots.iter().filter_map(|&root| built[root].take()).collect()
}
