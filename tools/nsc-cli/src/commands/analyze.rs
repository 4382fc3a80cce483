//! Run the Smart Camera Engine over a project's `events.json` and print
//! the resulting zoom segments. Adapted from the teacher's `analyze`
//! command, which drove `AutoZoomAnalyzer` the same way: load, run the
//! analyzer, print a summary, persist the updated timeline.

use std::path::PathBuf;

use nsc_processing_core::auto_director::{analyze, AutoDirectorConfig, TriggerPolicy};
use nsc_project_model::event::EventsFile;
use nsc_project_model::LoadedProject;

pub fn run(project_path: PathBuf) -> anyhow::Result<bool> {
    println!("Analyzing project at: {}", project_path.display());

    let mut loaded =
        LoadedProject::load(&project_path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    let events_path = loaded.root.join(&loaded.project.events_path);
    let events_content = std::fs::read_to_string(&events_path)
        .map_err(|_| anyhow::anyhow!("Events file not found: {}", events_path.display()))?;
    let events = EventsFile::parse(&events_content)
        .map_err(|e| anyhow::anyhow!("Failed to parse events: {e}"))?;

    println!("  Loaded {} event(s)", events.events.len());

    let config = AutoDirectorConfig {
        trigger_policy: TriggerPolicy::SingleClick,
        video_width: loaded.project.video_width,
        video_height: loaded.project.video_height,
    };

    let segments = analyze(&events, &config);
    println!("  Generated {} zoom segment(s)", segments.len());
    for segment in &segments {
        println!(
            "    [{:>7} .. {:<7}] {:?} / {:?} zoom={:.2}",
            segment.start_ts,
            segment.end_ts,
            segment.mode,
            segment.trigger,
            segment.initial_zoom_strength()
        );
    }

    loaded.project.timeline.zoom_segments = segments;
    loaded
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save timeline: {e}"))?;

    println!(
        "  Timeline saved to: {}",
        project_path.join("project.json").display()
    );
    println!("\nAnalysis complete.");

    Ok(true)
}
