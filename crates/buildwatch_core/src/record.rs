use std::fmt;

pub type BuildId = String;

/// Last known outcome of a build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildStatus {
    Success,
    Failure,
    #[default]
    Unknown,
}

impl BuildStatus {
    /// Case-insensitive; anything unrecognised is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" => BuildStatus::Success,
            "FAILURE" => BuildStatus::Failure,
            _ => BuildStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

impl RunState {
    /// `running` and `building` both count as in progress.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "running" | "building" => RunState::Running,
            _ => RunState::Idle,
        }
    }
}

/// What a dashboard tile shows: a running build overrides its last status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStatus {
    Running,
    Success,
    Failure,
    Unknown,
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayStatus::Running => write!(f, "running"),
            DisplayStatus::Success => write!(f, "success"),
            DisplayStatus::Failure => write!(f, "failure"),
            DisplayStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// One build configuration as reported by the CI server. Replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRecord {
    pub id: BuildId,
    pub display_name: String,
    pub status: BuildStatus,
    pub run_state: RunState,
    pub url: String,
    /// Source-side grouping such as `"GO2 Version New / Product Install / Meca"`.
    pub project_name: Option<String>,
}

impl BuildRecord {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            status: BuildStatus::Unknown,
            run_state: RunState::Idle,
            url: String::new(),
            project_name: None,
        }
    }

    pub fn with_status(mut self, status: BuildStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_run_state(mut self, run_state: RunState) -> Self {
        self.run_state = run_state;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_project_name(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = Some(project_name.into());
        self
    }

    pub fn display_status(&self) -> DisplayStatus {
        if self.run_state == RunState::Running {
            return DisplayStatus::Running;
        }
        match self.status {
            BuildStatus::Success => DisplayStatus::Success,
            BuildStatus::Failure => DisplayStatus::Failure,
            BuildStatus::Unknown => DisplayStatus::Unknown,
        }
    }
}
