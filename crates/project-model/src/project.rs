//! Project metadata: `project.json` (schema v1, spec §6.2).
//!
//! A project is the single mutable aggregate edited by the UI (§9); camera
//! tracks, timeline visuals, and cursor samples are all derived from it and
//! never stored back.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::timeline::Timeline;

pub const PROJECT_SCHEMA_VERSION: u32 = 1;

/// Top-level project file (`project.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub schema_version: u32,
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub video_path: String,
    pub events_path: String,
    pub duration_ms: u64,
    pub video_width: u32,
    pub video_height: u32,
    pub timeline: Timeline,
    pub settings: ProjectSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    pub cursor: CursorSettings,
    pub background: String,
    pub export: ExportSettings,
}

/// Mirrors the teacher's `ExportConfig`, trimmed to what the synthesis core
/// itself needs: the encoder collaborator (§6.4) owns everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorSettings {
    pub size: f64,
    pub color: String,
    pub smoothing_factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: String,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            size: 1.0,
            color: "#ffffff".to_string(),
            smoothing_factor: 0.5,
        }
    }
}

impl Project {
    /// Create a new project with defaults, the way the teacher's
    /// `Project::new` seeds a fresh recording.
    pub fn new(
        name: impl Into<String>,
        video_path: impl Into<String>,
        events_path: impl Into<String>,
        video_width: u32,
        video_height: u32,
        fps: u32,
    ) -> Self {
        Self {
            schema_version: PROJECT_SCHEMA_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            video_path: video_path.into(),
            events_path: events_path.into(),
            duration_ms: 0,
            video_width,
            video_height,
            timeline: Timeline::default(),
            settings: ProjectSettings {
                cursor: CursorSettings::default(),
                background: "#000000".to_string(),
                export: ExportSettings {
                    width: video_width,
                    height: video_height,
                    fps,
                    codec: "h264".to_string(),
                },
            },
        }
    }

    /// Parse `project.json`, rejecting any schema version but the one this
    /// crate understands (§7 `SchemaMismatch`), then run the one-way
    /// `panTrajectory` migration shim (§9) before returning.
    pub fn parse(json: &str) -> Result<Self, ProjectError> {
        let mut project: Project =
            serde_json::from_str(json).map_err(|source| ProjectError::Parse { source })?;
        if project.schema_version != PROJECT_SCHEMA_VERSION {
            return Err(ProjectError::SchemaMismatch {
                expected: PROJECT_SCHEMA_VERSION,
                found: project.schema_version,
            });
        }
        project.timeline.migrate_legacy_fields();
        Ok(project)
    }

    pub fn to_json_pretty(&self) -> Result<String, ProjectError> {
        serde_json::to_string_pretty(self).map_err(|source| ProjectError::Parse { source })
    }
}

/// The complete in-memory representation of a loaded project directory.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub root: PathBuf,
    pub project: Project,
}

impl LoadedProject {
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();
        let project_path = root.join("project.json");
        let json = std::fs::read_to_string(&project_path).map_err(|source| ProjectError::Io {
            path: project_path.clone(),
            source,
        })?;
        let project = Project::parse(&json)?;
        Ok(Self { root, project })
    }

    pub fn save(&self) -> Result<(), ProjectError> {
        std::fs::create_dir_all(&self.root).map_err(|source| ProjectError::Io {
            path: self.root.clone(),
            source,
        })?;
        let project_path = self.root.join("project.json");
        let json = self.project.to_json_pretty()?;
        std::fs::write(&project_path, json).map_err(|source| ProjectError::Io {
            path: project_path,
            source,
        })
    }

    /// Validate that the referenced video and events files exist on disk,
    /// relative to the project root (§6.2: `videoPath`/`eventsPath` are
    /// project-relative).
    pub fn validate_sources(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let video_path = self.root.join(&self.project.video_path);
        if !video_path.exists() {
            errors.push(format!("video source missing: {}", self.project.video_path));
        }
        let events_path = self.root.join(&self.project.events_path);
        if !events_path.exists() {
            errors.push(format!(
                "events source missing: {}",
                self.project.events_path
            ));
        }
        errors
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse {
        #[from]
        source: serde_json::Error,
    },

    #[error("project.json schema version {found} is not supported (expected {expected})")]
    SchemaMismatch { expected: u32, found: u32 },

    #[error("invalid project: {message}")]
    Validation { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_project_has_defaults() {
        let project = Project::new("Demo", "raw.mp4", "events.json", 1920, 1080, 30);
        assert_eq!(project.schema_version, PROJECT_SCHEMA_VERSION);
        assert_eq!(project.settings.export.fps, 30);
        assert!(project.timeline.zoom_segments.is_empty());
    }

    #[test]
    fn roundtrips_through_json() {
        let project = Project::new("Demo", "raw.mp4", "events.json", 1920, 1080, 30);
        let json = project.to_json_pretty().unwrap();
        let parsed = Project::parse(&json).unwrap();
        assert_eq!(parsed.id, project.id);
        assert_eq!(parsed.name, project.name);
    }

    #[test]
    fn rejects_unsupported_schema_version() {
        let project = Project::new("Demo", "raw.mp4", "events.json", 1920, 1080, 30);
        let mut value = serde_json::to_value(&project).unwrap();
        value["schemaVersion"] = serde_json::json!(2);
        let json = serde_json::to_string(&value).unwrap();
        assert!(matches!(
            Project::parse(&json),
            Err(ProjectError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn migrates_legacy_pan_trajectory_on_parse() {
        let project = Project::new("Demo", "raw.mp4", "events.json", 1920, 1080, 30);
        let mut value = serde_json::to_value(&project).unwrap();
        value["timeline"]["zoomSegments"] = serde_json::json!([{
            "id": "seg-1",
            "startTs": 0,
            "endTs": 1000,
            "initialRect": {"x": 0.0, "y": 0.0, "w": 1.0, "h": 1.0},
            "spring": {"mass": 1.0, "stiffness": 170.0, "damping": 26.0},
            "mode": "follow-cursor",
            "trigger": "auto-click",
            "isAuto": true,
            "panTrajectory": [
                {"ts": 50, "rect": {"x": 0.1, "y": 0.1, "w": 0.4, "h": 0.4}}
            ]
        }]);
        let json = serde_json::to_string(&value).unwrap();
        let parsed = Project::parse(&json).unwrap();
        let segment = &parsed.timeline.zoom_segments[0];
        assert_eq!(segment.target_points.len(), 1);
        assert!(segment.pan_trajectory.is_empty());
    }

    #[test]
    fn validate_sources_reports_missing_files() {
        let dir = std::env::temp_dir().join("nsc_test_validate_sources");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let loaded = LoadedProject {
            root: dir.clone(),
            project: Project::new("Demo", "raw.mp4", "events.json", 1920, 1080, 30),
        };
        let errors = loaded.validate_sources();
        assert_eq!(errors.len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("nsc_test_save_load");
        let _ = std::fs::remove_dir_all(&dir);

        let loaded = LoadedProject {
            root: dir.clone(),
            project: Project::new("Demo", "raw.mp4", "events.json", 1920, 1080, 30),
        };
        loaded.save().unwrap();

        let reloaded = LoadedProject::load(&dir).unwrap();
        assert_eq!(reloaded.project.id, loaded.project.id);

        std::fs::remove_dir_all(&dir).ok();
    }
}
