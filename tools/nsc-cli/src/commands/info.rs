//! Show project information and a derived camera-track summary. Adapted
//! from the teacher's `info` command, which printed project/recording/
//! timeline/export sections; the track/transport sections are replaced
//! with the camera track and visual-bounds summary this core derives.

use std::path::PathBuf;

use nsc_processing_core::camera_track::CameraTrack;
use nsc_project_model::LoadedProject;

const INFO_STEP_MS: u64 = 16;

pub fn run(project_path: PathBuf) -> anyhow::Result<bool> {
    let loaded = LoadedProject::load(&project_path)
        .map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let p = &loaded.project;

    println!("Project: {}", p.name);
    println!("  ID: {}", p.id);
    println!("  Created: {}", p.created_at);
    println!("  Schema version: {}", p.schema_version);
    println!();

    println!("Recording:");
    println!(
        "  Resolution: {}x{} @ {}fps",
        p.video_width, p.video_height, p.settings.export.fps
    );
    println!("  Duration: {}ms", p.duration_ms);
    println!("  Video path: {}", p.video_path);
    println!("  Events path: {}", p.events_path);
    println!();

    println!("Timeline:");
    println!("  Zoom segments: {}", p.timeline.zoom_segments.len());
    for segment in &p.timeline.zoom_segments {
        println!(
            "    [{:>7} .. {:<7}] {:?} / {:?} (auto={})",
            segment.start_ts, segment.end_ts, segment.mode, segment.trigger, segment.is_auto
        );
    }
    println!();

    println!("Settings:");
    println!(
        "  Cursor: size={} color={} smoothing={}",
        p.settings.cursor.size, p.settings.cursor.color, p.settings.cursor.smoothing_factor
    );
    println!(
        "  Export: {}x{} @ {}fps ({})",
        p.settings.export.width, p.settings.export.height, p.settings.export.fps, p.settings.export.codec
    );
    println!();

    let track = CameraTrack::build(&p.timeline.zoom_segments, p.duration_ms, INFO_STEP_MS);
    println!("Camera track:");
    println!("  Samples: {}", track.samples.len());
    match track.visual_bounds() {
        Some((start, end)) => println!("  Visually active: {start}ms .. {end}ms"),
        None => println!("  Visually active: never zoomed"),
    }

    let source_errors = loaded.validate_sources();
    if source_errors.is_empty() {
        println!("\nSources: all present");
    } else {
        println!("\nSource issues:");
        for error in &source_errors {
            println!("  - {error}");
        }
    }

    Ok(true)
}
