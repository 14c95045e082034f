use std::sync::Arc;

use crate::models::capability::CameraPosition;
use crate::models::error::CameraError;
use crate::models::frame::CapturedFrame;
use crate::models::photo::{CapturedPhoto, PhotoMetadata, VideoArtifact, VideoMetadata};
use crate::processing::completion::CompletionSlot;
use crate::processing::image_ops;
use crate::session::shared::SessionShared;
use crate::storage::metadata;
use crate::traits::camera_device::StillSettings;

/// Turns one running session plus one capture request into an asynchronous
/// result, tracking each in-flight operation in its own single-shot slot.
pub struct CaptureCoordinator {
    shared: Arc<SessionShared>,
}

impl CaptureCoordinator {
    pub(crate) fn new(shared: Arc<SessionShared>) -> Self {
        Self { shared }
    }

    /// Trigger a dedicated hardware still capture and block until its single
    /// completion arrives. The returned image is upright and JPEG-encoded at
    /// `quality`.
    ///
    /// Fails immediately with `CaptureSessionIsMissing` when the session is
    /// not running — no hardware is touched. Re-entrant calls each get their
    /// own completion slot and are fulfilled independently.
    pub fn capture_still(&self, quality: u8) -> Result<CapturedPhoto, CameraError> {
        let slot = Arc::new(CompletionSlot::new());
        let position;
        let flash_mode;
        let zoom_factor;
        {
            let mut inner = self.shared.inner.lock();
            if !inner.phase.is_running() {
                return Err(CameraError::CaptureSessionIsMissing);
            }
            position = match inner.device.as_ref() {
                Some(device) => device.descriptor().position,
                None => return Err(CameraError::CaptureSessionIsMissing),
            };
            let settings = StillSettings {
                flash_mode: inner.active.flash_mode,
                rotation: inner.rotation,
                picture_size: inner.still_size,
            };
            flash_mode = inner.active.flash_mode;
            zoom_factor = inner.active.zoom_factor;

            inner.diagnostics.stills_requested += 1;
            self.shared.pending.register(Arc::clone(&slot));

            let completion_slot = Arc::clone(&slot);
            let triggered = match inner.device.as_mut() {
                Some(device) => device.trigger_still(
                    settings,
                    Box::new(move |result| {
                        completion_slot.fulfill(result);
                    }),
                ),
                None => Err(CameraError::CaptureSessionIsMissing),
            };
            if let Err(e) = triggered {
                inner.diagnostics.stills_failed += 1;
                self.shared.pending.unregister(&slot);
                return Err(e);
            }
        }

        // The session lock is released while we wait for the hardware.
        let result = slot.wait();
        self.shared.pending.unregister(&slot);
        let captured = match result {
            Ok(captured) => captured,
            Err(e) => return Err(self.fail_still(e)),
        };

        let (data, width, height) = match image_ops::encode_upright_jpeg(&captured, quality) {
            Ok(encoded) => encoded,
            Err(e) => return Err(self.fail_still(e)),
        };

        let metadata = PhotoMetadata::new(position, flash_mode, zoom_factor);
        self.shared.inner.lock().diagnostics.stills_completed += 1;
        self.shared.notify(|d| d.on_photo_captured(&metadata));
        Ok(CapturedPhoto {
            data,
            width,
            height,
            metadata,
        })
    }

    /// Capture from the continuously delivered preview frame stream instead
    /// of triggering a dedicated hardware capture.
    ///
    /// Blocks until a preview frame is available; a session stop resolves the
    /// wait with `CaptureSessionIsMissing`.
    pub fn capture_sample(&self, quality: u8) -> Result<CapturedPhoto, CameraError> {
        let (position, flash_mode, zoom_factor, rotation) = {
            let inner = self.shared.inner.lock();
            if !inner.phase.is_running() {
                return Err(CameraError::CaptureSessionIsMissing);
            }
            let position = match inner.device.as_ref() {
                Some(device) => device.descriptor().position,
                None => return Err(CameraError::CaptureSessionIsMissing),
            };
            (
                position,
                inner.active.flash_mode,
                inner.active.zoom_factor,
                inner.rotation,
            )
        };

        let frame = self.shared.preview.next_frame()?;
        let captured = CapturedFrame { frame, rotation };
        let (data, width, height) = image_ops::encode_upright_jpeg(&captured, quality)?;

        let metadata = PhotoMetadata::new(position, flash_mode, zoom_factor);
        self.shared.inner.lock().diagnostics.samples_served += 1;
        Ok(CapturedPhoto {
            data,
            width,
            height,
            metadata,
        })
    }

    /// Begin recording a video segment. Starting while already recording is
    /// rejected.
    pub fn start_record_video(&self) -> Result<(), CameraError> {
        let mut inner = self.shared.inner.lock();
        if !inner.phase.is_running() {
            return Err(CameraError::CaptureSessionIsMissing);
        }
        if inner.recording {
            return Err(CameraError::invalid_operation(
                "recording is already in progress",
            ));
        }
        match inner.device.as_mut() {
            Some(device) => device.begin_recording()?,
            None => return Err(CameraError::CaptureSessionIsMissing),
        }
        inner.recording = true;
        Ok(())
    }

    /// Stop recording. A no-op reporting success (`Ok(None)`) when no
    /// recording is in progress.
    pub fn stop_record_video(&self) -> Result<Option<VideoArtifact>, CameraError> {
        let (artifact, position) = {
            let mut inner = self.shared.inner.lock();
            if !inner.recording {
                return Ok(None);
            }
            let position = inner
                .device
                .as_ref()
                .map(|d| d.descriptor().position)
                .unwrap_or(CameraPosition::Unspecified);
            let result = match inner.device.as_mut() {
                Some(device) => device.end_recording(),
                None => Ok(None),
            };
            inner.recording = false;
            let artifact = result?;
            if artifact.is_some() {
                inner.diagnostics.recordings_finished += 1;
            }
            (artifact, position)
        };

        if let Some(ref artifact) = artifact {
            let video_metadata = VideoMetadata::for_artifact(artifact, position);
            if let Err(e) = metadata::write_metadata(&video_metadata, &artifact.path) {
                log::warn!("failed to write recording metadata sidecar: {e}");
            }
        }
        Ok(artifact)
    }

    fn fail_still(&self, error: CameraError) -> CameraError {
        self.shared.inner.lock().diagnostics.stills_failed += 1;
        self.shared.notify(|d| d.on_error(&error));
        error
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::capability::FlashMode;
    use crate::models::config::SessionConfig;
    use crate::session::controller::SessionController;
    use crate::testing::{SimulatedBehavior, SimulatedProvider};

    struct Harness {
        shared: Arc<SessionShared>,
        controller: SessionController,
        coordinator: CaptureCoordinator,
        provider: Arc<SimulatedProvider>,
    }

    fn harness(provider: SimulatedProvider) -> Harness {
        let shared = SessionShared::new();
        let provider = Arc::new(provider);
        Harness {
            shared: Arc::clone(&shared),
            controller: SessionController::new(Arc::clone(&shared), provider.clone()),
            coordinator: CaptureCoordinator::new(shared),
            provider,
        }
    }

    #[test]
    fn capture_requires_running_session() {
        let h = harness(SimulatedProvider::dual_camera());
        assert_eq!(
            h.coordinator.capture_still(85).unwrap_err(),
            CameraError::CaptureSessionIsMissing
        );
        // No hardware side effect.
        assert_eq!(h.provider.log().still_triggers(), 0);
    }

    #[test]
    fn capture_still_returns_upright_jpeg() {
        let h = harness(SimulatedProvider::dual_camera());
        h.controller.prepare(&SessionConfig::default()).unwrap();
        let photo = h.coordinator.capture_still(85).unwrap();
        assert!(photo.data.starts_with(&[0xFF, 0xD8]));
        assert!(photo.width > 0 && photo.height > 0);
        assert_eq!(h.provider.log().still_triggers(), 1);
        assert_eq!(h.shared.inner.lock().diagnostics.stills_completed, 1);
    }

    #[test]
    fn capture_uses_current_flash_mode() {
        let h = harness(SimulatedProvider::dual_camera());
        h.controller.prepare(&SessionConfig::default()).unwrap();
        let mediator = crate::control::mediator::ConfigurationMediator::new(Arc::clone(&h.shared));
        mediator.set_flash_mode(FlashMode::On).unwrap();
        h.coordinator.capture_still(85).unwrap();
        let settings = h.provider.log().last_still_settings().unwrap();
        assert_eq!(settings.flash_mode, FlashMode::On);
    }

    #[test]
    fn hardware_failure_is_forwarded_once() {
        let h = harness(SimulatedProvider::dual_camera());
        h.provider.set_behavior(SimulatedBehavior {
            fail_still_captures: true,
            ..Default::default()
        });
        h.controller.prepare(&SessionConfig::default()).unwrap();
        match h.coordinator.capture_still(85) {
            Err(CameraError::InvalidOperation(_)) => {}
            other => panic!("expected forwarded hardware error, got {other:?}"),
        }
        assert_eq!(h.shared.inner.lock().diagnostics.stills_failed, 1);
    }

    #[test]
    fn undecodable_capture_is_unknown() {
        let h = harness(SimulatedProvider::dual_camera());
        h.provider.set_behavior(SimulatedBehavior {
            produce_undecodable_frames: true,
            ..Default::default()
        });
        h.controller.prepare(&SessionConfig::default()).unwrap();
        match h.coordinator.capture_still(85) {
            Err(CameraError::Unknown(_)) => {}
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn stop_fails_pending_captures() {
        let h = harness(SimulatedProvider::dual_camera());
        h.provider.set_behavior(SimulatedBehavior {
            stall_still_captures: true,
            ..Default::default()
        });
        h.controller.prepare(&SessionConfig::default()).unwrap();

        let coordinator = CaptureCoordinator::new(Arc::clone(&h.shared));
        let waiter = std::thread::spawn(move || coordinator.capture_still(85));
        // Give the capture a moment to register its pending slot.
        while h.shared.pending.len() == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
        h.controller.stop();
        assert_eq!(
            waiter.join().unwrap().unwrap_err(),
            CameraError::CaptureSessionIsMissing
        );
    }

    #[test]
    fn capture_sample_serves_preview_frames() {
        let h = harness(SimulatedProvider::dual_camera());
        h.controller.prepare(&SessionConfig::default()).unwrap();
        let photo = h.coordinator.capture_sample(85).unwrap();
        assert!(photo.data.starts_with(&[0xFF, 0xD8]));
        assert_eq!(h.shared.inner.lock().diagnostics.samples_served, 1);
        // No dedicated hardware capture was issued.
        assert_eq!(h.provider.log().still_triggers(), 0);
    }

    #[test]
    fn recording_toggles_follow_reject_and_noop_contract() {
        let h = harness(SimulatedProvider::dual_camera());
        assert_eq!(
            h.coordinator.start_record_video().unwrap_err(),
            CameraError::CaptureSessionIsMissing
        );
        h.controller.prepare(&SessionConfig::default()).unwrap();

        assert_eq!(h.coordinator.stop_record_video().unwrap(), None);

        h.coordinator.start_record_video().unwrap();
        match h.coordinator.start_record_video() {
            Err(CameraError::InvalidOperation(_)) => {}
            other => panic!("expected InvalidOperation, got {other:?}"),
        }

        let artifact = h.coordinator.stop_record_video().unwrap().unwrap();
        assert!(artifact.duration_secs >= 0.0);
        let sidecar = metadata::read_metadata(&artifact.path).unwrap();
        assert_eq!(sidecar.duration_secs, artifact.duration_secs);
        std::fs::remove_file(&artifact.path).ok();
        std::fs::remove_file(metadata::sidecar_path(&artifact.path)).ok();
    }
}
