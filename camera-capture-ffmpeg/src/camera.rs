//! Camera device backed by an external `ffmpeg` process.
//!
//! Preview streaming reads raw rgb24 frames from the child's stdout; video
//! recording tees the same input into an mp4 output of the one pipeline, so
//! the device is never opened twice. The child is shut down with SIGTERM
//! first so ffmpeg can finalize its output file.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use camera_capture_core::models::capability::{
    DeviceDescriptor, ExposureMode, FlashMode, FocusMode, PictureSize, PointOfInterest, TorchMode,
    WhiteBalanceMode,
};
use camera_capture_core::models::error::CameraError;
use camera_capture_core::models::frame::{CapturedFrame, Frame};
use camera_capture_core::models::orientation::VideoRotation;
use camera_capture_core::models::photo::VideoArtifact;
use camera_capture_core::processing::frame_tap::FrameTap;
use camera_capture_core::traits::camera_device::{
    CameraDevice, DeviceControl, FrameSink, PhotoCompletion, StillSettings,
};

use crate::probe;

/// Preview stream geometry requested from ffmpeg.
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

struct PipelineWorker {
    child: Child,
    stop: Arc<AtomicBool>,
    reader: Option<thread::JoinHandle<()>>,
}

struct RecordingInfo {
    path: PathBuf,
    started: Instant,
}

/// The desktop webcam exposes none of the optional optics, so every control
/// mutation outside the degenerate supported set is a hardware rejection.
/// The mediator validates against the capability snapshot first, so these
/// rejections only fire on misuse.
struct FfmpegControls {
    rotation: VideoRotation,
}

impl DeviceControl for FfmpegControls {
    fn set_flash(&mut self, mode: FlashMode) -> Result<(), CameraError> {
        if mode == FlashMode::Off {
            Ok(())
        } else {
            Err(CameraError::invalid_operation("no flash on this device"))
        }
    }

    fn set_torch(&mut self, _mode: TorchMode) -> Result<(), CameraError> {
        Err(CameraError::invalid_operation("no torch on this device"))
    }

    fn set_zoom(&mut self, factor: f32) -> Result<(), CameraError> {
        if (factor - 1.0).abs() < 1e-3 {
            Ok(())
        } else {
            Err(CameraError::invalid_operation("no zoom optics on this device"))
        }
    }

    fn set_exposure_mode(&mut self, mode: ExposureMode) -> Result<(), CameraError> {
        if mode == ExposureMode::ContinuousAuto {
            Ok(())
        } else {
            Err(CameraError::invalid_operation("exposure is fixed to continuous auto"))
        }
    }

    fn set_exposure_bias(&mut self, bias: f32) -> Result<(), CameraError> {
        if bias.abs() < 1e-3 {
            Ok(())
        } else {
            Err(CameraError::invalid_operation("exposure bias is not adjustable"))
        }
    }

    fn set_white_balance_mode(&mut self, mode: WhiteBalanceMode) -> Result<(), CameraError> {
        if mode == WhiteBalanceMode::ContinuousAuto {
            Ok(())
        } else {
            Err(CameraError::invalid_operation("white balance is fixed to continuous auto"))
        }
    }

    fn set_focus_mode(&mut self, mode: FocusMode) -> Result<(), CameraError> {
        if mode == FocusMode::ContinuousAuto {
            Ok(())
        } else {
            Err(CameraError::invalid_operation("focus is fixed to continuous auto"))
        }
    }

    fn set_focus_point(&mut self, _point: PointOfInterest) -> Result<(), CameraError> {
        Err(CameraError::invalid_operation("focus point of interest is unsupported"))
    }

    fn set_exposure_point(&mut self, _point: PointOfInterest) -> Result<(), CameraError> {
        Err(CameraError::invalid_operation("exposure point of interest is unsupported"))
    }

    fn set_rotation(&mut self, rotation: VideoRotation) -> Result<(), CameraError> {
        self.rotation = rotation;
        Ok(())
    }
}

/// One physical capture input driven through ffmpeg.
pub struct FfmpegCamera {
    descriptor: DeviceDescriptor,
    config: StreamConfig,
    controls: FfmpegControls,
    sink: Option<FrameSink>,
    tap: Arc<FrameTap>,
    pipeline: Option<PipelineWorker>,
    recording: Option<RecordingInfo>,
}

impl FfmpegCamera {
    pub fn new(descriptor: DeviceDescriptor, config: StreamConfig) -> Self {
        Self {
            descriptor,
            config,
            controls: FfmpegControls {
                rotation: VideoRotation::Deg0,
            },
            sink: None,
            tap: Arc::new(FrameTap::new()),
            pipeline: None,
            recording: None,
        }
    }

    /// Tear down the current child and reader thread, if any.
    fn shutdown_pipeline(&mut self) {
        if let Some(mut worker) = self.pipeline.take() {
            worker.stop.store(true, Ordering::SeqCst);
            stop_child(worker.child);
            if let Some(reader) = worker.reader.take() {
                let _ = reader.join();
            }
        }
    }

    /// Relaunch ffmpeg to match the current streaming/recording state.
    fn restart_pipeline(&mut self) -> Result<(), CameraError> {
        self.shutdown_pipeline();

        let record_to = self.recording.as_ref().map(|r| r.path.clone());
        let streaming = self.sink.is_some();
        if !streaming && record_to.is_none() {
            return Ok(());
        }

        let mut child = spawn_pipeline(
            &self.descriptor.id,
            &self.config,
            record_to.as_deref(),
            streaming,
        )?;

        let stop = Arc::new(AtomicBool::new(false));
        let reader = match self.sink.clone() {
            Some(sink) if streaming => {
                let stdout = match child.stdout.take() {
                    Some(stdout) => stdout,
                    None => {
                        stop_child(child);
                        return Err(CameraError::unknown("ffmpeg stdout was not piped"));
                    }
                };
                self.tap.open();
                let tap = Arc::clone(&self.tap);
                let worker_stop = Arc::clone(&stop);
                let (width, height) = (self.config.width, self.config.height);
                let spawned = thread::Builder::new()
                    .name("ffmpeg-preview".into())
                    .spawn(move || reader_loop(stdout, width, height, worker_stop, sink, tap));
                match spawned {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        stop_child(child);
                        return Err(CameraError::unknown(format!(
                            "failed to spawn preview thread: {e}"
                        )));
                    }
                }
            }
            _ => None,
        };

        self.pipeline = Some(PipelineWorker {
            child,
            stop,
            reader,
        });
        Ok(())
    }
}

impl CameraDevice for FfmpegCamera {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn configure(
        &mut self,
        apply: &mut dyn FnMut(&mut dyn DeviceControl) -> Result<(), CameraError>,
    ) -> Result<(), CameraError> {
        apply(&mut self.controls)
    }

    fn start_streaming(&mut self, sink: FrameSink) -> Result<(), CameraError> {
        if self.sink.is_some() {
            return Err(CameraError::invalid_operation("preview already streaming"));
        }
        self.sink = Some(sink);
        if let Err(e) = self.restart_pipeline() {
            self.sink = None;
            return Err(e);
        }
        Ok(())
    }

    fn stop_streaming(&mut self) -> Result<(), CameraError> {
        if self.sink.take().is_none() {
            return Ok(());
        }
        self.tap.close();
        self.restart_pipeline()
    }

    fn trigger_still(
        &mut self,
        settings: StillSettings,
        completion: PhotoCompletion,
    ) -> Result<(), CameraError> {
        if self.sink.is_some() {
            // The device is busy with the preview pipeline: serve the still
            // from the live frame stream.
            let tap = Arc::clone(&self.tap);
            thread::Builder::new()
                .name("ffmpeg-still".into())
                .spawn(move || {
                    let result = tap.next_frame().map(|frame| CapturedFrame {
                        frame,
                        rotation: settings.rotation,
                    });
                    completion(result);
                })
                .map_err(|e| CameraError::unknown(format!("failed to spawn capture thread: {e}")))?;
            return Ok(());
        }

        let input = self.descriptor.id.clone();
        let fps = self.config.fps;
        thread::Builder::new()
            .name("ffmpeg-still".into())
            .spawn(move || {
                let result =
                    capture_single_frame(&input, settings.picture_size, fps).map(|frame| {
                        CapturedFrame {
                            frame,
                            rotation: settings.rotation,
                        }
                    });
                completion(result);
            })
            .map_err(|e| CameraError::unknown(format!("failed to spawn capture thread: {e}")))?;
        Ok(())
    }

    fn begin_recording(&mut self) -> Result<(), CameraError> {
        if self.recording.is_some() {
            return Err(CameraError::invalid_operation("already recording"));
        }
        let path = std::env::temp_dir().join(format!("recording_{}.mp4", uuid::Uuid::new_v4()));
        self.recording = Some(RecordingInfo {
            path,
            started: Instant::now(),
        });
        if let Err(e) = self.restart_pipeline() {
            self.recording = None;
            // Put the preview-only pipeline back.
            if let Err(restore) = self.restart_pipeline() {
                log::error!("failed to restore preview after recording failure: {restore}");
            }
            return Err(e);
        }
        Ok(())
    }

    fn end_recording(&mut self) -> Result<Option<VideoArtifact>, CameraError> {
        let info = match self.recording.take() {
            Some(info) => info,
            None => return Ok(None),
        };
        // Dropping the recording output and restarting terminates the tee'd
        // child via SIGTERM, letting ffmpeg finalize the mp4.
        self.restart_pipeline()?;
        Ok(Some(VideoArtifact {
            path: info.path,
            duration_secs: info.started.elapsed().as_secs_f64(),
        }))
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        self.tap.close();
        self.shutdown_pipeline();
    }
}

fn reader_loop(
    stdout: std::process::ChildStdout,
    width: u32,
    height: u32,
    stop: Arc<AtomicBool>,
    sink: FrameSink,
    tap: Arc<FrameTap>,
) {
    let stride = width * 3;
    let frame_size = (stride as usize) * (height as usize);
    let mut reader = std::io::BufReader::new(stdout);

    while !stop.load(Ordering::SeqCst) {
        let mut buf = vec![0u8; frame_size];
        match reader.read_exact(&mut buf) {
            Ok(()) => {
                let frame = Frame::new_rgb8(buf, width, height, stride);
                sink(frame.clone());
                tap.push(frame);
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => {
                log::error!("ffmpeg preview read failed: {e}");
                break;
            }
        }
    }
}

/// Capture exactly one frame at the requested picture size.
fn capture_single_frame(input: &str, size: PictureSize, fps: u32) -> Result<Frame, CameraError> {
    let config = StreamConfig {
        width: size.width,
        height: size.height,
        fps,
    };
    let mut child = spawn_still(input, &config)?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| CameraError::unknown("ffmpeg stdout was not piped"))?;

    let frame_size = (size.width * size.height * 3) as usize;
    let mut buf = vec![0u8; frame_size];
    let read = stdout.read_exact(&mut buf);
    let _ = child.wait();
    read.map_err(|e| CameraError::unknown(format!("ffmpeg produced no frame: {e}")))?;
    Ok(Frame::new_rgb8(buf, size.width, size.height, size.width * 3))
}

fn base_args(input: &str, config: &StreamConfig) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-hide_banner".into(),
        "-nostdin".into(),
        "-nostats".into(),
        "-y".into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        probe::input_format().into(),
        "-video_size".into(),
        format!("{}x{}", config.width, config.height),
        "-framerate".into(),
        config.fps.to_string(),
    ];

    #[cfg(target_os = "macos")]
    {
        args.push("-pixel_format".into());
        args.push("0rgb".into());
    }

    args.push("-i".into());
    args.push(probe::input_device(input));
    args
}

fn spawn_pipeline(
    input: &str,
    config: &StreamConfig,
    record_to: Option<&Path>,
    stream: bool,
) -> Result<Child, CameraError> {
    let mut args = base_args(input, config);

    if let Some(path) = record_to {
        args.extend([
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            "veryfast".into(),
            "-f".into(),
            "mp4".into(),
            path.to_string_lossy().into_owned(),
        ]);
    }
    if stream {
        args.extend([
            "-pix_fmt".into(),
            "rgb24".into(),
            "-f".into(),
            "rawvideo".into(),
            "pipe:1".into(),
        ]);
    }

    Command::new("ffmpeg")
        .args(&args)
        .stdout(if stream { Stdio::piped() } else { Stdio::null() })
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CameraError::InputsAreInvalid(format!("failed to launch ffmpeg: {e}")))
}

fn spawn_still(input: &str, config: &StreamConfig) -> Result<Child, CameraError> {
    let mut args = base_args(input, config);
    args.extend([
        "-frames:v".into(),
        "1".into(),
        "-pix_fmt".into(),
        "rgb24".into(),
        "-f".into(),
        "rawvideo".into(),
        "pipe:1".into(),
    ]);

    Command::new("ffmpeg")
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CameraError::InputsAreInvalid(format!("failed to launch ffmpeg: {e}")))
}

fn stop_child(mut child: Child) {
    #[cfg(unix)]
    {
        unsafe {
            let _ = libc::kill(child.id() as i32, libc::SIGTERM);
        }
        let start = Instant::now();
        while start.elapsed() < Duration::from_millis(900) {
            if let Ok(Some(_)) = child.try_wait() {
                return;
            }
            thread::sleep(Duration::from_millis(20));
        }
        let _ = child.kill();
        let _ = child.wait();
    }
    #[cfg(not(unix))]
    {
        let _ = child.kill();
        let _ = child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::descriptor_for_input;

    #[test]
    fn controls_accept_only_the_degenerate_set() {
        let mut controls = FfmpegControls {
            rotation: VideoRotation::Deg0,
        };
        assert!(controls.set_flash(FlashMode::Off).is_ok());
        assert!(controls.set_flash(FlashMode::On).is_err());
        assert!(controls.set_zoom(1.0).is_ok());
        assert!(controls.set_zoom(2.0).is_err());
        assert!(controls.set_exposure_mode(ExposureMode::ContinuousAuto).is_ok());
        assert!(controls.set_exposure_mode(ExposureMode::Locked).is_err());
        assert!(controls.set_torch(TorchMode::On).is_err());
        assert!(controls.set_rotation(VideoRotation::Deg90).is_ok());
        assert_eq!(controls.rotation, VideoRotation::Deg90);
    }

    #[test]
    fn end_recording_without_begin_is_a_noop() {
        let mut camera =
            FfmpegCamera::new(descriptor_for_input("0", "Test"), StreamConfig::default());
        assert_eq!(camera.end_recording().unwrap(), None);
    }

    #[test]
    fn stop_streaming_is_idempotent_without_a_stream() {
        let mut camera =
            FfmpegCamera::new(descriptor_for_input("0", "Test"), StreamConfig::default());
        camera.stop_streaming().unwrap();
        camera.stop_streaming().unwrap();
    }

    #[test]
    fn still_pipeline_args_request_one_raw_frame() {
        let args = {
            let mut args = base_args("0", &StreamConfig::default());
            args.extend(["-frames:v".into(), "1".into()]);
            args
        };
        assert!(args.contains(&"-video_size".to_string()));
        assert!(args.contains(&"640x480".to_string()));
        assert!(args.contains(&"-frames:v".to_string()));
    }
}
