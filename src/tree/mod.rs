//! Section hierarchy.
//!
//! The backend returns a template's sections as a flat list where each record
//! may point at its parent. The views want a forest.

use crate::models::{Section, SectionNode};
use std::collections::HashMap;

/// Build the section forest from a flat, ordered list.
///
/// - A section whose `parent_id` is missing or does not match any id in `sections`
///   becomes a root.
/// - Siblings keep the order they had in the input.
/// - Sections caught in a parent cycle (including self-parenting) are never reachable
///   from a root and are left out of the result.
pub(crate) fn build_section_tree(sections: &[Section]) -> Vec<SectionNode> {
    // First occurrence wins when ids repeat.
    let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(sections.len());
    for (i, s) in sections.iter().enumerate() {
        index_of.entry(s.id.as_str()).or_insert(i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); sections.len()];
    let mut roots: Vec<usize> = Vec::new();

    for (i, s) in sections.iter().enumerate() {
        match s.parent_id.as_deref().and_then(|p| index_of.get(p)) {
            Some(&parent) => children[parent].push(i),
            None => roots.push(i),
        }
    }

    fn assemble(i: usize, sections: &[Section], children: &[Vec<usize>]) -> SectionNode {
        SectionNode {
            section: sections[i].clone(),
            children: children[i]
                .iter()
                .map(|&c| assemble(c, sections, children))
                .collect(),
        }
    }

    roots
        .into_iter()
        .map(|i| assemble(i, sections, &children))
        .collect()
}

/// Total number of nodes in a forest.
pub(crate) fn count_nodes(nodes: &[SectionNode]) -> usize {
    nodes
        .iter()
        .map(|n| 1 + count_nodes(&n.children))
        .sum()
}

/// Depth-first lookup by section id.
pub(crate) fn find_node<'a>(nodes: &'a [SectionNode], id: &str) -> Option<&'a SectionNode> {
    for n in nodes {
        if n.id() == id {
            return Some(n);
        }
        if let Some(found) = find_node(&n.children, id) {
            return Some(found);
        }
    }
    None
}
