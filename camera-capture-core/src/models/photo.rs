use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::capability::{CameraPosition, FlashMode};

/// A finished still capture: upright JPEG bytes plus metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPhoto {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub metadata: PhotoMetadata,
}

/// Metadata stamped on every captured photo.
///
/// Serializable for JSON export across the dispatch boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMetadata {
    pub id: String,
    pub captured_at: String,
    pub position: CameraPosition,
    pub flash_mode: FlashMode,
    pub zoom_factor: f32,
}

impl PhotoMetadata {
    pub fn new(position: CameraPosition, flash_mode: FlashMode, zoom_factor: f32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            captured_at: chrono::Utc::now().to_rfc3339(),
            position,
            flash_mode,
            zoom_factor,
        }
    }
}

/// Result returned when a video recording stops.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoArtifact {
    pub path: PathBuf,
    pub duration_secs: f64,
}

/// Metadata stored as a JSON sidecar alongside a recorded video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub id: String,
    pub file_path: String,
    pub duration_secs: f64,
    pub position: CameraPosition,
    pub created_at: String,
}

impl VideoMetadata {
    pub fn for_artifact(artifact: &VideoArtifact, position: CameraPosition) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: artifact.path.to_string_lossy().into_owned(),
            duration_secs: artifact.duration_secs,
            position,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
