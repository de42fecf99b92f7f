use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Format used for the human-readable timestamp stored on every entry.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything that can go wrong with a tracking operation, short of I/O.
/// The display text doubles as the message shown to the user.
#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("No projects yet. Create one first with `create --project <name>`.")]
    EmptyStore,
    #[error("Project \"{0}\" was not found. Check the name with `summary`.")]
    ProjectNotFound(String),
    #[error("Project \"{0}\" already exists.")]
    ProjectExists(String),
    #[error("A project name cannot be empty.")]
    EmptyName,
    #[error("Tracking for project \"{0}\" is already running.")]
    AlreadyRunning(String),
    #[error("No tracking is running for project \"{0}\".")]
    NotRunning(String),
    #[error("Cannot archive project \"{0}\" while its timer is running.")]
    ArchivedWhileRunning(String),
    #[error("Project \"{0}\" is not archived.")]
    NotArchived(String),
}

/// One completed tracking session. Entries are append-only and never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub time_spent: u64, // in seconds
    pub description: String,
    pub date: String,
}

/// A named bucket of tracked time. While a timer runs, `start_time` holds the
/// start moment as epoch seconds; it is absent when the project is idle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub archived: bool,
}

impl Project {
    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    /// Sum of all entry durations, in seconds.
    pub fn total_time(&self) -> u64 {
        self.entries.iter().map(|entry| entry.time_spent).sum()
    }
}

/// The full persisted state: project name mapped to project, in insertion
/// order. The order is part of the format, which is why this is an IndexMap
/// and not a BTreeMap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    projects: IndexMap<String, Project>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Projects in stored order, archived ones included.
    pub fn projects(&self) -> impl Iterator<Item = (&String, &Project)> {
        self.projects.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Project> {
        self.projects.get(name)
    }

    /// Names offered for interactive selection: everything not archived,
    /// sorted for a stable prompt.
    pub fn selectable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .projects
            .iter()
            .filter(|(_, project)| !project.archived)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Add a new empty project under `name`.
    pub fn create(&mut self, name: &str) -> Result<(), TrackerError> {
        if name.is_empty() {
            return Err(TrackerError::EmptyName);
        }
        if self.projects.contains_key(name) {
            return Err(TrackerError::ProjectExists(name.to_owned()));
        }
        self.projects.insert(name.to_owned(), Project::default());
        Ok(())
    }

    /// Start the timer for `name` at `now`.
    pub fn start(&mut self, name: &str, now: DateTime<Local>) -> Result<(), TrackerError> {
        let project = self.project_mut(name)?;
        if project.is_running() {
            return Err(TrackerError::AlreadyRunning(name.to_owned()));
        }
        project.start_time = Some(now.timestamp());
        Ok(())
    }

    /// Stop the timer for `name` at `now`, appending an entry with the
    /// elapsed whole seconds and `description`. Returns the appended entry.
    pub fn stop(
        &mut self,
        name: &str,
        description: &str,
        now: DateTime<Local>,
    ) -> Result<Entry, TrackerError> {
        let project = self.project_mut(name)?;
        let started_at = match project.start_time.take() {
            Some(started_at) => started_at,
            None => return Err(TrackerError::NotRunning(name.to_owned())),
        };
        // A clock jumping backwards must not produce a negative duration.
        let elapsed = (now.timestamp() - started_at).max(0) as u64;
        let entry = Entry {
            time_spent: elapsed,
            description: description.to_owned(),
            date: now.format(DATE_FORMAT).to_string(),
        };
        project.entries.push(entry.clone());
        Ok(entry)
    }

    /// Hide `name` from selection lists. Its data stays in the document.
    pub fn archive(&mut self, name: &str) -> Result<(), TrackerError> {
        let project = self.project_mut(name)?;
        if project.is_running() {
            return Err(TrackerError::ArchivedWhileRunning(name.to_owned()));
        }
        project.archived = true;
        Ok(())
    }

    /// Bring an archived project back.
    pub fn restore(&mut self, name: &str) -> Result<(), TrackerError> {
        let project = self.project_mut(name)?;
        if !project.archived {
            return Err(TrackerError::NotArchived(name.to_owned()));
        }
        project.archived = false;
        Ok(())
    }

    fn project_mut(&mut self, name: &str) -> Result<&mut Project, TrackerError> {
        if self.projects.is_empty() {
            return Err(TrackerError::EmptyStore);
        }
        self.projects
            .get_mut(name)
            .ok_or_else(|| TrackerError::ProjectNotFound(name.to_owned()))
    }
}
