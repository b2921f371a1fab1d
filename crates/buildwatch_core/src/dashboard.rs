use std::sync::Arc;

use crate::record::{BuildRecord, DisplayStatus};
use crate::selection::SelectionStore;
use crate::tree::{NodePath, ProjectNode, ProjectTree};

/// Live dashboard: one column per top-level project holding selected builds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardView {
    pub columns: Vec<DashboardColumn>,
    pub totals: StatusTotals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardColumn {
    pub title: String,
    pub groups: Vec<ProjectGroup>,
    pub build_count: usize,
}

/// Selected builds attached directly to one node, titled by the node's full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGroup {
    pub title: String,
    pub builds: Vec<Arc<BuildRecord>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusTotals {
    pub running: usize,
    pub success: usize,
    pub failure: usize,
    pub unknown: usize,
}

impl StatusTotals {
    fn record(&mut self, status: DisplayStatus) {
        match status {
            DisplayStatus::Running => self.running += 1,
            DisplayStatus::Success => self.success += 1,
            DisplayStatus::Failure => self.failure += 1,
            DisplayStatus::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.running + self.success + self.failure + self.unknown
    }
}

/// Projects the selected builds of `tree` into columns. Nothing selected means no columns.
pub fn project(tree: &ProjectTree, selection: &SelectionStore) -> DashboardView {
    let mut view = DashboardView::default();
    for project in tree.projects() {
        let path = NodePath::new([project.name.clone()]);
        let mut groups = Vec::new();
        collect_groups(project, &path, selection, &mut groups);
        if groups.is_empty() {
            continue;
        }
        let build_count = groups.iter().map(|group| group.builds.len()).sum();
        for build in groups.iter().flat_map(|group| group.builds.iter()) {
            view.totals.record(build.display_status());
        }
        view.columns.push(DashboardColumn {
            title: project.name.clone(),
            groups,
            build_count,
        });
    }
    view
}

fn collect_groups(
    node: &ProjectNode,
    path: &NodePath,
    selection: &SelectionStore,
    out: &mut Vec<ProjectGroup>,
) {
    let builds: Vec<_> = node
        .builds
        .iter()
        .filter(|build| selection.is_selected(&build.id))
        .cloned()
        .collect();
    if !builds.is_empty() {
        out.push(ProjectGroup {
            title: path.to_string(),
            builds,
        });
    }
    for child in &node.children {
        collect_groups(child, &path.child(&child.name), selection, out);
    }
}
