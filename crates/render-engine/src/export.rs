//! Export driver (C8): precomputes the camera track at the output fps,
//! composes every frame, and pushes each to an `Encoder` collaborator.
//!
//! Grounded in the teacher's `ExportJob`/`RenderBackend`/`ExportStage`
//! shapes, generalized from an ffmpeg-subprocess backend to a push-frame
//! trait — the file encoder is out of scope here, so the driver is
//! tested against a fake `Encoder` instead of a real media pipeline.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use nsc_common::error::{NscError, NscResult};
use nsc_processing_core::camera_track::CameraTrack;
use nsc_processing_core::cursor::CursorSample;
use nsc_project_model::event::TimestampMs;
use nsc_project_model::timeline::ZoomSegment;

use crate::compositor::{compose_all, FrameComposition};

/// Everything the driver needs to render one export; independent of any
/// project-file I/O so it can be constructed directly in tests.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration_ms: u64,
    pub cursor_size_setting: f64,
    pub segments: Vec<ZoomSegment>,
    pub cursor_samples: Vec<CursorSample>,
    pub click_timestamps: Vec<TimestampMs>,
}

/// A collaborator that turns composed frames into an encoded file on disk.
/// The out-of-scope "file encoder" of the capture/encode pipeline,
/// represented as a trait so this crate never shells out to a real codec.
pub trait Encoder {
    fn begin(&mut self, width: u32, height: u32, fps: u32, path: &Path) -> NscResult<()>;
    fn push_frame(&mut self, frame: &FrameComposition) -> NscResult<()>;
    fn finish(&mut self) -> NscResult<()>;
}

/// A point-in-time snapshot of an in-flight or finished export. Fields
/// exactly match the external status contract: `isRunning`, `progress`,
/// `message`, `outputPath?`, `error?`, `startedAtMs?`, `finishedAtMs?`.
#[derive(Debug, Clone, Default)]
pub struct ExportStatus {
    pub is_running: bool,
    pub progress: f64,
    pub message: String,
    pub output_path: Option<PathBuf>,
    pub error: Option<String>,
    pub started_at_ms: Option<u64>,
    pub finished_at_ms: Option<u64>,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Run an export to completion (or cancellation). `cancel` is polled once
/// per frame — the single atomic flag the concurrency model calls for, no
/// lock contention. `on_status` is called after every state change so a
/// caller can publish the snapshot to a UI; the final `ExportStatus` is
/// also the return value. Encoder failures are terminal — this function
/// never retries.
pub fn run_export(
    job: &ExportJob,
    encoder: &mut dyn Encoder,
    cancel: &AtomicBool,
    mut on_status: impl FnMut(&ExportStatus),
) -> ExportStatus {
    let started_at_ms = now_ms();
    let mut status = ExportStatus {
        is_running: true,
        progress: 0.0,
        message: "preparing export".to_string(),
        started_at_ms: Some(started_at_ms),
        ..Default::default()
    };
    on_status(&status);

    let step_ms = (1000.0 / job.fps.max(1) as f64).round().max(1.0) as u64;
    let track = CameraTrack::build(&job.segments, job.duration_ms, step_ms);
    let frames = match compose_all(
        &track,
        &job.cursor_samples,
        &job.click_timestamps,
        job.cursor_size_setting,
        job.width,
        job.height,
        job.fps,
        job.duration_ms,
    ) {
        Ok(frames) => frames,
        Err(err) => return fail(status, err, &mut on_status),
    };

    if let Err(err) = encoder.begin(job.width, job.height, job.fps, &job.output_path) {
        return fail(status, err, &mut on_status);
    }

    let total_frames = frames.len().max(1);
    for (index, frame) in frames.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            let _ = std::fs::remove_file(&job.output_path);
            status.is_running = false;
            status.progress = index as f64 / total_frames as f64;
            status.message = "export cancelled".to_string();
            status.error = Some("cancelled".to_string());
            status.finished_at_ms = Some(now_ms());
            on_status(&status);
            return status;
        }

        if let Err(err) = encoder.push_frame(frame) {
            return fail(status, err, &mut on_status);
        }

        status.progress = (index + 1) as f64 / total_frames as f64;
        status.message = format!("encoding frame {}/{}", index + 1, total_frames);
        on_status(&status);
    }

    if let Err(err) = encoder.finish() {
        return fail(status, err, &mut on_status);
    }

    status.is_running = false;
    status.progress = 1.0;
    status.message = "export complete".to_string();
    status.output_path = Some(job.output_path.clone());
    status.finished_at_ms = Some(now_ms());
    on_status(&status);
    status
}

fn fail(mut status: ExportStatus, err: NscError, on_status: &mut impl FnMut(&ExportStatus)) -> ExportStatus {
    status.is_running = false;
    status.message = "export failed".to_string();
    status.error = Some(err.to_string());
    status.finished_at_ms = Some(now_ms());
    on_status(&status);
    status
}
