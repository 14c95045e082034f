use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::CameraError;
use crate::models::photo::VideoMetadata;

/// Path of the JSON sidecar written next to a recording.
pub fn sidecar_path(recording_path: &Path) -> PathBuf {
    recording_path.with_extension("metadata.json")
}

/// Write recording metadata as a JSON sidecar file alongside the recording.
pub fn write_metadata(metadata: &VideoMetadata, recording_path: &Path) -> Result<(), CameraError> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CameraError::unknown(format!("failed to serialize metadata: {e}")))?;
    fs::write(sidecar_path(recording_path), json)
        .map_err(|e| CameraError::unknown(format!("failed to write metadata: {e}")))?;
    Ok(())
}

/// Read recording metadata back from its JSON sidecar file.
pub fn read_metadata(recording_path: &Path) -> Result<VideoMetadata, CameraError> {
    let json = fs::read_to_string(sidecar_path(recording_path))
        .map_err(|e| CameraError::unknown(format!("failed to read metadata: {e}")))?;
    serde_json::from_str(&json)
        .map_err(|e| CameraError::unknown(format!("failed to parse metadata: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::capability::CameraPosition;
    use crate::models::photo::VideoArtifact;

    #[test]
    fn metadata_round_trips_through_sidecar() {
        let path = std::env::temp_dir().join(format!("recording_{}.mp4", uuid::Uuid::new_v4()));
        let artifact = VideoArtifact {
            path: path.clone(),
            duration_secs: 1.25,
        };
        let metadata = VideoMetadata::for_artifact(&artifact, CameraPosition::Rear);
        write_metadata(&metadata, &path).unwrap();
        let read_back = read_metadata(&path).unwrap();
        assert_eq!(read_back, metadata);
        fs::remove_file(sidecar_path(&path)).unwrap();
    }
}
