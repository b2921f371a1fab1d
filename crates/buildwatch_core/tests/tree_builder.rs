use buildwatch_core::{BuildRecord, Classifier, GroupingMode, NodePath, TreeBuilder, OTHER};
use pretty_assertions::assert_eq;

fn records() -> Vec<BuildRecord> {
    vec![
        BuildRecord::new("Go2VersionNew_ProductInstall_Meca_InstallGO2cam", "Install GO2cam"),
        BuildRecord::new("Go2Version612_ProductInstall_Meca_InstallGO2cam", "Install GO2cam 612"),
        BuildRecord::new("Go2Version612_ProductCompil_GO2cam_BuildRelease", "Build Release"),
        BuildRecord::new("Go2Version612_ProductInstall_Meca_TestGO2cam", "Test GO2cam"),
        BuildRecord::new("Sandbox_Experiment", "Experiment"),
        BuildRecord::new("WebServices_GObot_Deploy", "Deploy GObot"),
    ]
}

fn names(nodes: &[buildwatch_core::ProjectNode]) -> Vec<&str> {
    nodes.iter().map(|node| node.name.as_str()).collect()
}

#[test]
fn siblings_keep_first_seen_order() {
    let tree = TreeBuilder::default().build(records());

    assert_eq!(
        names(tree.projects()),
        vec!["GO2 Version New", "GO2 Version 612", OTHER, "Web Services"]
    );
    let v612 = tree.find(&NodePath::new(["GO2 Version 612"])).unwrap();
    assert_eq!(names(&v612.children), vec!["Product Install", "Product Compil"]);
}

#[test]
fn builds_attach_only_to_final_node() {
    let tree = TreeBuilder::default().build(records());

    let meca = tree
        .find(&NodePath::new(["GO2 Version 612", "Product Install", "Meca"]))
        .unwrap();
    let ids: Vec<_> = meca.builds.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "Go2Version612_ProductInstall_Meca_InstallGO2cam",
            "Go2Version612_ProductInstall_Meca_TestGO2cam",
        ]
    );

    let install = tree
        .find(&NodePath::new(["GO2 Version 612", "Product Install"]))
        .unwrap();
    assert!(install.builds.is_empty());
    assert_eq!(install.build_count(), 2);
    assert_eq!(tree.total_builds(), 6);
}

#[test]
fn building_twice_is_deterministic() {
    let builder = TreeBuilder::default();
    let first = builder.build(records());
    let second = builder.build(records());
    assert_eq!(first, second);
    assert_eq!(first.node_paths(), second.node_paths());
}

#[test]
fn every_record_lands_in_exactly_one_node() {
    let tree = TreeBuilder::default().build(records());
    let leaves = tree.root().leaf_ids();
    assert_eq!(leaves.len(), records().len());
    for record in records() {
        assert_eq!(leaves.iter().filter(|id| **id == record.id).count(), 1);
        let location = tree.location_of(&record.id).unwrap();
        assert!(tree.find(location).unwrap().builds.iter().any(|b| b.id == record.id));
    }
}

#[test]
fn repeated_ids_keep_first_occurrence() {
    let tree = TreeBuilder::default().build(vec![
        BuildRecord::new("Sandbox_A", "first"),
        BuildRecord::new("Sandbox_A", "second"),
    ]);
    assert_eq!(tree.total_builds(), 1);
    assert_eq!(tree.build("Sandbox_A").unwrap().display_name, "first");
}

#[test]
fn project_name_grouping_uses_source_hierarchy() {
    let builder = TreeBuilder::new(Classifier::default()).with_grouping(GroupingMode::ProjectName);
    let tree = builder.build(vec![
        BuildRecord::new("Anything_1", "One").with_project_name("Root / Team A /  / Nightly"),
        BuildRecord::new("Sandbox_Two", "Two").with_project_name("   "),
    ]);

    assert!(tree
        .find(&NodePath::new(["Root", "Team A", "Nightly"]))
        .is_some_and(|node| node.builds.len() == 1));
    assert_eq!(tree.location_of("Sandbox_Two"), Some(&NodePath::new([OTHER])));
}

#[test]
fn empty_inventory_gives_empty_tree() {
    let tree = TreeBuilder::default().build(Vec::new());
    assert!(tree.is_empty());
    assert_eq!(tree.total_builds(), 0);
    assert!(tree.find(&NodePath::root()).is_some());
}
