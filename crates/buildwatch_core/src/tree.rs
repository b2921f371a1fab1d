use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::classify::Classifier;
use crate::record::{BuildId, BuildRecord};

/// Separator used by the CI server in grouped project names.
pub const PROJECT_NAME_SEPARATOR: &str = " / ";

/// Address of a node: the names from the first project level down to the node.
/// The empty path is the synthetic root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parses `"A/B/C"` or `"A / B / C"`; blank segments are dropped.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split('/')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
        )
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(PROJECT_NAME_SEPARATOR))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectNode {
    pub name: String,
    /// Sub-projects in first-seen order; names are unique among siblings.
    pub children: Vec<ProjectNode>,
    /// Builds classified directly under this node.
    pub builds: Vec<Arc<BuildRecord>>,
}

impl ProjectNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            builds: Vec::new(),
        }
    }

    pub fn child(&self, name: &str) -> Option<&ProjectNode> {
        self.children.iter().find(|child| child.name == name)
    }

    fn child_or_insert(&mut self, name: &str) -> &mut ProjectNode {
        let index = match self.children.iter().position(|child| child.name == name) {
            Some(index) => index,
            None => {
                self.children.push(ProjectNode::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// Every build at or below this node, own builds first, then children depth-first.
    pub fn leaves(&self) -> Vec<&Arc<BuildRecord>> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Arc<BuildRecord>>) {
        out.extend(self.builds.iter());
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    pub fn leaf_ids(&self) -> Vec<&str> {
        self.leaves().into_iter().map(|build| build.id.as_str()).collect()
    }

    pub fn build_count(&self) -> usize {
        self.builds.len()
            + self
                .children
                .iter()
                .map(ProjectNode::build_count)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty() && self.children.is_empty()
    }
}

/// Classified build hierarchy for one inventory refresh.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectTree {
    root: ProjectNode,
    locations: BTreeMap<BuildId, NodePath>,
}

impl ProjectTree {
    pub fn new(root: ProjectNode) -> Self {
        let mut locations = BTreeMap::new();
        index_locations(&root, &NodePath::root(), &mut locations);
        Self { root, locations }
    }

    pub fn root(&self) -> &ProjectNode {
        &self.root
    }

    /// Top-level projects in first-seen order.
    pub fn projects(&self) -> &[ProjectNode] {
        &self.root.children
    }

    pub fn find(&self, path: &NodePath) -> Option<&ProjectNode> {
        let mut node = &self.root;
        for segment in path.segments() {
            node = node.child(segment)?;
        }
        Some(node)
    }

    pub fn contains_build(&self, id: &str) -> bool {
        self.locations.contains_key(id)
    }

    /// Node a build was attached to.
    pub fn location_of(&self, id: &str) -> Option<&NodePath> {
        self.locations.get(id)
    }

    pub fn build(&self, id: &str) -> Option<&Arc<BuildRecord>> {
        let node = self.find(self.locations.get(id)?)?;
        node.builds.iter().find(|build| build.id == id)
    }

    pub fn total_builds(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Paths of every non-root node, parents before children.
    pub fn node_paths(&self) -> Vec<NodePath> {
        let mut out = Vec::new();
        collect_paths(&self.root, &NodePath::root(), &mut out);
        out
    }
}

fn index_locations(node: &ProjectNode, path: &NodePath, out: &mut BTreeMap<BuildId, NodePath>) {
    for build in &node.builds {
        out.entry(build.id.clone()).or_insert_with(|| path.clone());
    }
    for child in &node.children {
        index_locations(child, &path.child(&child.name), out);
    }
}

fn collect_paths(node: &ProjectNode, path: &NodePath, out: &mut Vec<NodePath>) {
    for child in &node.children {
        let child_path = path.child(&child.name);
        out.push(child_path.clone());
        collect_paths(child, &child_path, out);
    }
}

/// Where a record's path comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupingMode {
    /// Always derive the path from the id.
    #[default]
    Classified,
    /// Use the record's `project_name` when present, else classify.
    ProjectName,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeBuilder {
    classifier: Classifier,
    grouping: GroupingMode,
}

impl TreeBuilder {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            grouping: GroupingMode::Classified,
        }
    }

    pub fn with_grouping(mut self, grouping: GroupingMode) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn grouping(&self) -> GroupingMode {
        self.grouping
    }

    /// Path a record would be attached under.
    pub fn path_for(&self, record: &BuildRecord) -> Vec<String> {
        if self.grouping == GroupingMode::ProjectName {
            if let Some(grouped) = record.project_name.as_deref().and_then(split_project_name) {
                return grouped;
            }
        }
        self.classifier.classify(&record.id)
    }

    /// Folds records into a tree. Sibling order follows first appearance in `records`.
    /// A repeated id keeps its first occurrence.
    pub fn build<I>(&self, records: I) -> ProjectTree
    where
        I: IntoIterator<Item = BuildRecord>,
    {
        let mut root = ProjectNode::new("");
        let mut seen = HashSet::new();
        for record in records {
            if !seen.insert(record.id.clone()) {
                continue;
            }
            let path = self.path_for(&record);
            let mut node = &mut root;
            for segment in &path {
                node = node.child_or_insert(segment);
            }
            node.builds.push(Arc::new(record));
        }
        ProjectTree::new(root)
    }
}

fn split_project_name(raw: &str) -> Option<Vec<String>> {
    let segments: Vec<String> = raw
        .split(PROJECT_NAME_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}
