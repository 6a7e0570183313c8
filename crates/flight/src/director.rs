//! Two-mode animation state machine.
//!
//! `Transit` flies the aircraft along the route with a chase camera.
//! `StaticScene` holds a slowly rotating view over the floor plan. Each mode
//! has one tick function that either stays or asks to switch; the switch
//! itself is resolved by [`transition_to`], which is the only place that
//! decides what gets reset.

use foundation::math::{clamp01, mix};
use runtime::{EventBus, Frame, FrameClock};
use tracing::info;

use crate::config::{AnimationConfig, Viewpoint};
use crate::route::{RouteDescription, RouteSampler};
use crate::scene::{CameraCommand, ModelPlacement, PartFeatureState, SceneAdapter};
use crate::vehicle::VehicleState;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ModeKind {
    Transit,
    StaticScene,
}

impl std::fmt::Display for ModeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModeKind::Transit => write!(f, "transit"),
            ModeKind::StaticScene => write!(f, "static-scene"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct TransitState {
    /// Fraction of the route covered, `[0, 1]`.
    pub progress: f64,
    /// Altitude of the most recent route sample; drives time scaling.
    pub last_altitude: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct StaticSceneState {
    pub elapsed_ms: f64,
    pub rotation: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Mode {
    Transit(TransitState),
    StaticScene(StaticSceneState),
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Transit(_) => ModeKind::Transit,
            Mode::StaticScene(_) => ModeKind::StaticScene,
        }
    }
}

/// What entering a mode does.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transition {
    /// Fresh state for the mode being entered. All mode-local accumulators
    /// (progress, last altitude, rotation, dwell time) start from zero.
    pub enter: Mode,
    pub reset_vehicle_pose: bool,
    pub fly_to: Viewpoint,
}

/// The reset table: one row per destination mode.
pub fn transition_to(kind: ModeKind, config: &AnimationConfig) -> Transition {
    match kind {
        ModeKind::StaticScene => Transition {
            enter: Mode::StaticScene(StaticSceneState::default()),
            reset_vehicle_pose: false,
            fly_to: config.static_viewpoint,
        },
        ModeKind::Transit => Transition {
            enter: Mode::Transit(TransitState::default()),
            reset_vehicle_pose: true,
            fly_to: config.transit_viewpoint,
        },
    }
}

enum Step {
    Stay(Mode),
    Switch(ModeKind),
}

/// How far `altitude` sits between the travel thresholds, `[0, 1]`.
pub fn altitude_fade(altitude: f64, config: &AnimationConfig) -> f64 {
    clamp01(
        (altitude - config.min_travel_altitude)
            / (config.max_travel_altitude - config.min_travel_altitude),
    )
}

/// Transit speed multiplier: nearly paused near the ground, fast at cruise.
pub fn time_scale(fade: f64, config: &AnimationConfig) -> f64 {
    mix(config.min_time_scale, config.max_time_scale, fade * fade)
}

/// Owns all animation state and advances it once per rendered frame.
#[derive(Debug)]
pub struct AnimationDirector {
    config: AnimationConfig,
    model_uri: String,
    route: RouteSampler,
    vehicle: VehicleState,
    mode: Mode,
    clock: FrameClock,
    events: EventBus,
}

impl AnimationDirector {
    /// Starts in transit with a zeroed aircraft and no route.
    pub fn new(config: AnimationConfig, model_uri: impl Into<String>) -> Self {
        Self {
            config,
            model_uri: model_uri.into(),
            route: RouteSampler::new(),
            vehicle: VehicleState::new(),
            mode: Mode::Transit(TransitState::default()),
            clock: FrameClock::new(),
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn route(&self) -> &RouteSampler {
        &self.route
    }

    pub fn route_mut(&mut self) -> &mut RouteSampler {
        &mut self.route
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Completion handler for the asynchronous route load. `None` (failed
    /// load) leaves the director running with a frozen aircraft.
    pub fn install_route(&mut self, route: Option<RouteDescription>) {
        if let Some(route) = route {
            self.route.publish(route);
        }
    }

    /// Advances the animation to host time `time_ms`.
    pub fn tick(&mut self, time_ms: f64, scene: &mut dyn SceneAdapter) -> Frame {
        let frame = self.clock.tick(time_ms);

        let step = match self.mode {
            Mode::Transit(state) => self.tick_transit(state, frame, scene),
            Mode::StaticScene(state) => self.tick_static(state, frame, scene),
        };

        match step {
            Step::Stay(mode) => self.mode = mode,
            Step::Switch(kind) => self.enter(kind, frame, scene),
        }
        frame
    }

    fn tick_transit(
        &mut self,
        mut state: TransitState,
        frame: Frame,
        scene: &mut dyn SceneAdapter,
    ) -> Step {
        let fade = altitude_fade(state.last_altitude, &self.config);
        let scale = time_scale(fade, &self.config);
        state.progress += frame.dt_ms * scale / self.config.transit_duration_ms;

        if state.progress > 1.0 {
            return Step::Switch(ModeKind::StaticScene);
        }

        let total = self.route.total_length();
        if total > 0.0 {
            if let Some(sample) = self.route.sample(total * state.progress) {
                state.last_altitude = sample.altitude;
                self.vehicle.advance(Some(&sample), frame.dt_ms);
            }
        }

        scene.place_model(&ModelPlacement::for_vehicle(&self.model_uri, &self.vehicle));
        scene.set_feature_state(&PartFeatureState::from_vehicle(&self.vehicle));
        scene.camera(&self.chase_camera(fade, state.last_altitude));

        Step::Stay(Mode::Transit(state))
    }

    /// Camera trailing the aircraft. Near the ground it sits just behind and
    /// above; as `fade` rises it pulls up toward an overview.
    fn chase_camera(&self, fade: f64, route_altitude: f64) -> CameraCommand {
        let cfg = &self.config;
        let t = route_altitude / cfg.camera_offset_fade_altitude;
        let offset_lon = mix(-cfg.camera_offset_deg, 0.0, t);
        let offset_lat = mix(cfg.camera_offset_deg, 0.0, t);

        let v = &self.vehicle;
        CameraCommand::FreeCamera {
            position: v.position.offset(offset_lon, offset_lat).as_array(),
            altitude_m: v.altitude
                + cfg.camera_height_above_vehicle
                + mix(0.0, cfg.camera_overview_height, fade),
            look_at: v.position.as_array(),
            look_at_altitude_m: v.altitude,
        }
    }

    fn tick_static(
        &mut self,
        mut state: StaticSceneState,
        frame: Frame,
        scene: &mut dyn SceneAdapter,
    ) -> Step {
        state.elapsed_ms += frame.dt_ms;
        state.rotation += frame.dt_ms * self.config.static_rotation_rate;
        scene.camera(&CameraCommand::RotateTo {
            bearing: state.rotation * self.config.static_rotation_bearing_scale,
            duration_ms: 0.0,
        });

        if state.elapsed_ms > self.config.static_dwell_ms {
            Step::Switch(ModeKind::Transit)
        } else {
            Step::Stay(Mode::StaticScene(state))
        }
    }

    fn enter(&mut self, kind: ModeKind, frame: Frame, scene: &mut dyn SceneAdapter) {
        let from = self.mode.kind();
        let transition = transition_to(kind, &self.config);

        if transition.reset_vehicle_pose {
            self.vehicle.reset_pose();
        }
        scene.camera(&CameraCommand::fly_to(
            transition.fly_to,
            self.config.fly_to_duration_ms,
        ));
        self.mode = transition.enter;

        info!(frame = frame.index, %from, to = %kind, "animation mode changed");
        self.events.emit(frame, "mode", format!("{from} -> {kind}"));
    }
}
