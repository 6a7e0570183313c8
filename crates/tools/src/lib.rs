//! Offline helpers behind the `flightmap` binary: reading a route from disk,
//! summarizing it, and replaying the animation headlessly.

use std::path::{Path, PathBuf};

use flight::{
    AnimationConfig, AnimationDirector, MATERIAL_OVERRIDE_NAMES, ModeKind, NODE_OVERRIDE_NAMES,
    PartFeatureState, RecordingScene, RouteDescription, RouteLoadError, RouteSource,
    SceneCommand,
};
use foundation::math::initial_bearing_deg;
use serde::Serialize;

/// Route document on the local file system.
#[derive(Debug, Clone)]
pub struct FileRouteSource {
    path: PathBuf,
}

impl FileRouteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RouteSource for FileRouteSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String, RouteLoadError> {
        std::fs::read_to_string(&self.path)
            .map_err(|e| RouteLoadError::Fetch(format!("{}: {e}", self.path.display())))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStats {
    pub waypoints: usize,
    pub length_m: f64,
    pub max_elevation_m: f64,
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub departure_bearing_deg: f64,
}

pub fn inspect(route: &RouteDescription) -> RouteStats {
    let points = route.waypoints();
    let first = points[0];
    let last = points[points.len() - 1];
    RouteStats {
        waypoints: points.len(),
        length_m: route.total_length(),
        max_elevation_m: route.max_elevation(),
        start: first.as_array(),
        end: last.as_array(),
        departure_bearing_deg: initial_bearing_deg(first, points[1]),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayOptions {
    pub fps: f64,
    pub seconds: f64,
    /// Keep only camera commands.
    pub camera_only: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            fps: 60.0,
            seconds: 60.0,
            camera_only: false,
        }
    }
}

/// One emitted command, stamped with the frame that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayLine {
    pub frame: u64,
    pub time_ms: f64,
    pub mode: String,
    pub command: SceneCommand,
}

fn validate(options: &ReplayOptions) -> Result<(), String> {
    if !options.fps.is_finite() || options.fps <= 0.0 {
        return Err(format!("fps must be a positive number, got {}", options.fps));
    }
    if !options.seconds.is_finite() || options.seconds < 0.0 {
        return Err(format!(
            "seconds must be a finite, non-negative number, got {}",
            options.seconds
        ));
    }
    Ok(())
}

/// Drives a director at a fixed frame rate and hands each command to `emit`
/// as it is produced. A `None` route replays the frozen aircraft. Returns the
/// number of frames run.
pub fn replay_into<F>(
    route: Option<RouteDescription>,
    config: AnimationConfig,
    options: ReplayOptions,
    mut emit: F,
) -> Result<u64, String>
where
    F: FnMut(ReplayLine) -> Result<(), String>,
{
    validate(&options)?;

    let mut director = AnimationDirector::new(config, flight::MODEL_ASSET);
    director.install_route(route);

    let frame_ms = 1000.0 / options.fps;
    let frames = (options.seconds * options.fps).ceil() as u64;
    let mut scene = RecordingScene::new();

    for i in 0..frames {
        let frame = director.tick(i as f64 * frame_ms, &mut scene);
        let mode = director.mode_kind().to_string();
        for command in scene.take() {
            if options.camera_only && !matches!(command, SceneCommand::Camera(_)) {
                continue;
            }
            emit(ReplayLine {
                frame: frame.index,
                time_ms: frame.time_ms,
                mode: mode.clone(),
                command,
            })?;
        }
    }
    Ok(frames)
}

/// [`replay_into`], collected.
pub fn replay(
    route: Option<RouteDescription>,
    config: AnimationConfig,
    options: ReplayOptions,
) -> Result<Vec<ReplayLine>, String> {
    let mut lines = Vec::new();
    replay_into(route, config, options, |line| {
        lines.push(line);
        Ok(())
    })?;
    Ok(lines)
}

/// What one named model part receives from a feature state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartRow {
    pub part: &'static str,
    pub emission: f64,
    pub opacity: f64,
    pub rotation: [f64; 3],
}

/// Resolves every overridable material and node of the aircraft model.
pub fn part_table(state: &PartFeatureState) -> Vec<PartRow> {
    MATERIAL_OVERRIDE_NAMES
        .iter()
        .chain(NODE_OVERRIDE_NAMES)
        .map(|&part| PartRow {
            part,
            emission: state.emission_for(part),
            opacity: state.opacity_for(part),
            rotation: state.rotation_for(part),
        })
        .collect()
}

/// Part table of the last feature state pushed within `seconds`.
pub fn parts_at(
    route: Option<RouteDescription>,
    config: AnimationConfig,
    fps: f64,
    seconds: f64,
) -> Result<Vec<PartRow>, String> {
    let options = ReplayOptions {
        fps,
        seconds,
        camera_only: false,
    };
    let mut last = None;
    replay_into(route, config, options, |line| {
        if let SceneCommand::FeatureState(state) = line.command {
            last = Some(state);
        }
        Ok(())
    })?;
    last.map(|state| part_table(&state))
        .ok_or_else(|| format!("no feature state within {seconds} s"))
}

/// Mode switches in a replay, as `(frame, new mode)`.
pub fn mode_switches(lines: &[ReplayLine]) -> Vec<(u64, String)> {
    let mut out: Vec<(u64, String)> = Vec::new();
    let mut current = ModeKind::Transit.to_string();
    for line in lines {
        if line.mode != current {
            current = line.mode.clone();
            out.push((line.frame, current.clone()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flight::{CameraCommand, parse_route};
    use pretty_assertions::assert_eq;

    const DEMO_ROUTE: &str = include_str!("../../apps/viewer_web/assets/flightpath.json");

    fn demo() -> RouteDescription {
        parse_route(DEMO_ROUTE).expect("demo route")
    }

    #[test]
    fn inspect_summarizes_demo_route() {
        let stats = inspect(&demo());
        assert_eq!(stats.waypoints, 20);
        assert_eq!(stats.max_elevation_m, 3200.0);
        assert!(stats.length_m > 20_000.0 && stats.length_m < 30_000.0);
        assert!((stats.departure_bearing_deg + 62.0).abs() < 1.0);
    }

    #[test]
    fn file_source_reads_and_reports_missing_files() {
        let path = std::env::temp_dir().join(format!("flightmap-route-{}.json", std::process::id()));
        std::fs::write(&path, DEMO_ROUTE).expect("write fixture");

        let source = FileRouteSource::new(&path);
        let route = pollster::block_on(flight::load_route(&source));
        assert_eq!(route.map(|r| r.waypoints().len()), Some(20));
        let _ = std::fs::remove_file(&path);

        let missing = FileRouteSource::new(path.with_extension("missing"));
        let err = pollster::block_on(missing.fetch()).unwrap_err();
        assert!(matches!(err, RouteLoadError::Fetch(_)));
    }

    #[test]
    fn replay_cycles_through_both_fly_tos() {
        let config = AnimationConfig {
            transit_duration_ms: 500.0,
            static_dwell_ms: 500.0,
            ..AnimationConfig::default()
        };
        let options = ReplayOptions {
            fps: 60.0,
            seconds: 120.0,
            camera_only: true,
        };
        let lines = replay(Some(demo()), config.clone(), options).expect("replay");
        assert!(lines.iter().all(|l| matches!(l.command, SceneCommand::Camera(_))));

        let targets: Vec<[f64; 2]> = lines
            .iter()
            .filter_map(|l| match l.command {
                SceneCommand::Camera(CameraCommand::FlyTo { center, .. }) => Some(center),
                _ => None,
            })
            .take(2)
            .collect();
        assert_eq!(
            targets,
            vec![config.static_viewpoint.center, config.transit_viewpoint.center]
        );

        let switches = mode_switches(&lines);
        assert_eq!(switches[0].1, "static-scene");
        assert_eq!(switches[1].1, "transit");
    }

    #[test]
    fn replay_without_route_never_switches() {
        let lines = replay(None, AnimationConfig::default(), ReplayOptions {
            fps: 30.0,
            seconds: 5.0,
            camera_only: false,
        })
        .expect("replay");
        assert!(mode_switches(&lines).is_empty());
        assert_eq!(lines.last().map(|l| l.frame), Some(149));
    }

    #[test]
    fn replay_rejects_bad_rates() {
        let bad = [
            (0.0, 1.0),
            (f64::NAN, 1.0),
            (f64::INFINITY, 1.0),
            (60.0, f64::INFINITY),
            (60.0, -1.0),
        ];
        for (fps, seconds) in bad {
            let opts = ReplayOptions {
                fps,
                seconds,
                camera_only: true,
            };
            assert!(
                replay(None, AnimationConfig::default(), opts).is_err(),
                "accepted fps={fps} seconds={seconds}"
            );
        }
    }

    #[test]
    fn replay_stops_when_the_sink_fails() {
        let mut seen = 0;
        let err = replay_into(None, AnimationConfig::default(), ReplayOptions::default(), |_| {
            seen += 1;
            if seen == 3 { Err("broken pipe".to_string()) } else { Ok(()) }
        })
        .unwrap_err();
        assert_eq!(err, "broken pipe");
        assert_eq!(seen, 3);
    }

    #[test]
    fn parts_on_the_ground_show_taxi_lights_and_lowered_gear() {
        let rows = parts_at(Some(demo()), AnimationConfig::default(), 60.0, 1.0).expect("parts");
        assert_eq!(
            rows.len(),
            MATERIAL_OVERRIDE_NAMES.len() + NODE_OVERRIDE_NAMES.len()
        );

        let row = |name: &str| rows.iter().find(|r| r.part == name).expect("part");
        assert_eq!(row("lights_taxi_white").emission, 1.0);
        assert_eq!(row("lights_taxi_white").opacity, 0.25);
        assert_eq!(row("propeller_blur").opacity, 0.2);
        assert_eq!(row("front_gear").rotation, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn parts_need_at_least_one_frame() {
        assert!(parts_at(None, AnimationConfig::default(), 60.0, 0.0).is_err());
    }
}
