//! Context of the currently opened project.
//!
//! Unlike `SessionState`, nothing here is persisted: a fresh process has no
//! open project until one is set.

use serde::{Deserialize, Serialize};

/// The caller's role within a project, ordered from most to least privileged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Manager,
    Assignee,
    /// Also the fallback for any unrecognized role name.
    #[default]
    Observer,
}

impl Role {
    /// Map a role name to a role. Unknown names, including the empty
    /// string, map to [`Role::Observer`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "owner" => Self::Owner,
            "manager" => Self::Manager,
            "assignee" => Self::Assignee,
            _ => Self::Observer,
        }
    }

    /// Numeric code used by the UI: owner=0 through observer=3.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Owner => 0,
            Self::Manager => 1,
            Self::Assignee => 2,
            Self::Observer => 3,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Manager => "manager",
            Self::Assignee => "assignee",
            Self::Observer => "observer",
        }
    }
}

/// Descriptive fields of the open project.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectInfo {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub img_url: Option<String>,
    /// Free-form project type.
    pub kind: Option<String>,
}

/// Project payload as returned by the gateway's project endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub img_url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Default)]
pub struct ProjectState {
    info: ProjectInfo,
    role: Option<Role>,
}

impl ProjectState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_project_info(
        &mut self,
        id: Option<String>,
        name: Option<String>,
        description: Option<String>,
        color: Option<String>,
        img_url: Option<String>,
        kind: Option<String>,
    ) {
        self.info = ProjectInfo { id, name, description, color, img_url, kind };
    }

    #[must_use]
    pub fn project_info(&self) -> ProjectInfo {
        self.info.clone()
    }

    pub fn set_role(&mut self, name: &str) {
        self.role = Some(Role::from_name(name));
    }

    /// The stored role, or `None` if no role was ever set.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Apply a project payload and the caller's role name in one step.
    pub fn open(&mut self, project: ProjectSummary, role_name: &str) {
        tracing::debug!(project_id = %project.id, role = role_name, "opening project");
        self.set_project_info(
            Some(project.id),
            Some(project.name),
            Some(project.description),
            Some(project.color),
            Some(project.img_url),
            Some(project.kind),
        );
        self.set_role(role_name);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
