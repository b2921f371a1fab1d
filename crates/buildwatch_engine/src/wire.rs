//! JSON shapes spoken by the build server.

use buildwatch_core::{BuildId, BuildRecord, BuildStatus, RunState, PROJECT_NAME_SEPARATOR};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub(crate) struct WireBuild {
    #[serde(default, rename = "buildTypeId")]
    build_type_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default, rename = "webUrl")]
    web_url: Option<String>,
    #[serde(default, rename = "projectName")]
    project_name: Option<String>,
}

impl WireBuild {
    /// `None` when the entry carries no usable identifier.
    fn into_record(self, project_override: Option<String>) -> Option<BuildRecord> {
        let id = self
            .build_type_id
            .or(self.id)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())?;
        let name = self
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| id.clone());
        let mut record = BuildRecord::new(id, name)
            .with_status(self.status.as_deref().map(BuildStatus::parse).unwrap_or_default())
            .with_run_state(self.state.as_deref().map(RunState::parse).unwrap_or_default());
        if let Some(url) = self.web_url.filter(|url| !url.is_empty()) {
            record = record.with_url(url);
        }
        if let Some(project) = project_override.or(self.project_name) {
            record = record.with_project_name(project);
        }
        Some(record)
    }
}

/// Inventory responses come either flat or already grouped into nested projects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireInventory {
    List(Vec<WireBuild>),
    Flat { builds: Vec<WireBuild> },
    Grouped { projects: Map<String, Value> },
}

#[derive(Debug, Deserialize)]
struct WireProject {
    #[serde(default)]
    subprojects: Map<String, Value>,
    #[serde(default)]
    builds: Vec<WireBuild>,
}

impl WireInventory {
    pub(crate) fn into_records(self) -> Result<Vec<BuildRecord>, serde_json::Error> {
        match self {
            WireInventory::List(builds) | WireInventory::Flat { builds } => {
                Ok(builds.into_iter().filter_map(|build| build.into_record(None)).collect())
            }
            WireInventory::Grouped { projects } => {
                let mut records = Vec::new();
                flatten_projects(projects, &mut Vec::new(), &mut records)?;
                Ok(records)
            }
        }
    }
}

// Nested groups become a " / " joined project name so grouping by name reproduces them.
fn flatten_projects(
    projects: Map<String, Value>,
    path: &mut Vec<String>,
    out: &mut Vec<BuildRecord>,
) -> Result<(), serde_json::Error> {
    for (name, value) in projects {
        let project: WireProject = serde_json::from_value(value)?;
        path.push(name);
        let joined = path.join(PROJECT_NAME_SEPARATOR);
        out.extend(
            project
                .builds
                .into_iter()
                .filter_map(|build| build.into_record(Some(joined.clone()))),
        );
        flatten_projects(project.subprojects, path, out)?;
        path.pop();
    }
    Ok(())
}

/// Reads tolerate every layout the server has used for the stored selection.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireSelection {
    List(Vec<BuildId>),
    Document(SelectionDocument),
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SelectionDocument {
    #[serde(default, rename = "selectedBuilds")]
    selected_builds: Option<Vec<BuildId>>,
    #[serde(default)]
    builds: Option<SelectionSection>,
    #[serde(default)]
    config: Option<ConfigSection>,
    #[serde(default, rename = "selected_builds")]
    legacy_selected_builds: Option<Vec<BuildId>>,
}

#[derive(Debug, Default, Deserialize)]
struct SelectionSection {
    #[serde(default, rename = "selectedBuilds")]
    selected_builds: Option<Vec<BuildId>>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigSection {
    #[serde(default)]
    builds: Option<SelectionSection>,
}

impl WireSelection {
    pub(crate) fn into_ids(self) -> Vec<BuildId> {
        match self {
            WireSelection::List(ids) => ids,
            WireSelection::Document(doc) => doc
                .selected_builds
                .or_else(|| doc.builds.and_then(|section| section.selected_builds))
                .or_else(|| {
                    doc.config
                        .and_then(|config| config.builds)
                        .and_then(|section| section.selected_builds)
                })
                .or(doc.legacy_selected_builds)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SelectionPayload<'a> {
    #[serde(rename = "selectedBuilds")]
    pub selected_builds: &'a [BuildId],
}
