use std::borrow::Cow;

use crate::tree::{ProjectNode, ProjectTree};

/// Prunes `tree` to the builds whose display name contains `term`, ignoring case.
///
/// A blank term borrows the tree unchanged. `None` means nothing matched.
/// The returned tree shares build records with `tree`.
pub fn filter<'a>(tree: &'a ProjectTree, term: &str) -> Option<Cow<'a, ProjectTree>> {
    let term = term.trim();
    if term.is_empty() {
        return Some(Cow::Borrowed(tree));
    }
    let needle = term.to_lowercase();
    filter_node(tree.root(), &needle).map(|root| Cow::Owned(ProjectTree::new(root)))
}

fn filter_node(node: &ProjectNode, needle: &str) -> Option<ProjectNode> {
    let children: Vec<ProjectNode> = node
        .children
        .iter()
        .filter_map(|child| filter_node(child, needle))
        .collect();
    let builds: Vec<_> = node
        .builds
        .iter()
        .filter(|build| build.display_name.to_lowercase().contains(needle))
        .cloned()
        .collect();

    if children.is_empty() && builds.is_empty() {
        return None;
    }
    Some(ProjectNode {
        name: node.name.clone(),
        children,
        builds,
    })
}
