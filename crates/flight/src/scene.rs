//! Boundary to the external map renderer.
//!
//! The director never talks to a renderer directly. It produces the payloads
//! in this module and hands them to a [`SceneAdapter`]: a model placement, a
//! feature-state update for the model's named parts, and camera commands.

use serde::Serialize;

use crate::config::Viewpoint;
use crate::vehicle::VehicleState;

/// Model source the aircraft lives in.
pub const MODEL_SOURCE_ID: &str = "3d-model-source";
/// Model (and feature-state) id of the aircraft.
pub const PLANE_MODEL_ID: &str = "plane";

/// Materials whose paint properties read feature state.
pub const MATERIAL_OVERRIDE_NAMES: &[&str] = &[
    "propeller_blur",
    "lights_position_white",
    "lights_position_white_volume",
    "lights_position_red",
    "lights_position_red_volume",
    "lights_position_green",
    "lights_position_green_volume",
    "lights_anti_collision_red",
    "lights_anti_collision_red_volume",
    "lights_taxi_white",
    "lights_taxi_white_volume",
];

/// Nodes whose transforms read feature state.
pub const NODE_OVERRIDE_NAMES: &[&str] = &[
    "front_gear",
    "rear_gears",
    "propeller_left_inner",
    "propeller_left_outer",
    "propeller_right_inner",
    "propeller_right_outer",
    "propeller_left_inner_blur",
    "propeller_left_outer_blur",
    "propeller_right_inner_blur",
    "propeller_right_outer_blur",
];

/// Placement of the aircraft model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPlacement {
    #[serde(skip)]
    pub id: &'static str,
    pub uri: String,
    pub position: [f64; 2],
    /// `[roll, pitch, heading]` in degrees; heading is bearing + 90 because
    /// the model's nose points along +x.
    pub orientation: [f64; 3],
    pub material_override_names: &'static [&'static str],
    pub node_override_names: &'static [&'static str],
}

impl ModelPlacement {
    pub fn for_vehicle(uri: &str, vehicle: &VehicleState) -> Self {
        Self {
            id: PLANE_MODEL_ID,
            uri: uri.to_string(),
            position: vehicle.position.as_array(),
            orientation: [vehicle.roll, vehicle.pitch, vehicle.bearing + 90.0],
            material_override_names: MATERIAL_OVERRIDE_NAMES,
            node_override_names: NODE_OVERRIDE_NAMES,
        }
    }
}

/// Per-frame feature state of the aircraft's parts.
///
/// Field names serialize to the keys the model layer's paint expressions read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PartFeatureState {
    pub z_elevation: f64,
    pub front_gear_rotation: [f64; 3],
    pub rear_gear_rotation: [f64; 3],
    pub propeller_rotation: [f64; 3],
    pub propeller_rotation_blur: [f64; 3],
    pub light_emission: f64,
    pub light_emission_strobe: f64,
    pub light_emission_taxi: f64,
}

impl PartFeatureState {
    pub fn from_vehicle(vehicle: &VehicleState) -> Self {
        Self {
            z_elevation: vehicle.altitude,
            front_gear_rotation: [0.0, 0.0, vehicle.front_gear_angle],
            rear_gear_rotation: [0.0, 0.0, vehicle.rear_gear_angle],
            propeller_rotation: [0.0, 0.0, vehicle.propeller_rotation_deg()],
            propeller_rotation_blur: [0.0, 0.0, vehicle.propeller_blur_rotation_deg()],
            light_emission: vehicle.beacon_phase,
            light_emission_strobe: vehicle.strobe_phase,
            light_emission_taxi: vehicle.taxi_light_phase,
        }
    }

    /// Emissive strength a named part receives.
    pub fn emission_for(&self, part: &str) -> f64 {
        match part.strip_suffix("_volume").unwrap_or(part) {
            "lights_position_white" | "lights_anti_collision_red" => self.light_emission_strobe,
            "lights_position_red" | "lights_position_green" => self.light_emission,
            "lights_taxi_white" => self.light_emission_taxi,
            _ => 0.0,
        }
    }

    /// Rotation a named node receives.
    pub fn rotation_for(&self, part: &str) -> [f64; 3] {
        match part {
            "front_gear" => self.front_gear_rotation,
            "rear_gears" => self.rear_gear_rotation,
            "propeller_left_outer" | "propeller_left_inner" | "propeller_right_outer"
            | "propeller_right_inner" => self.propeller_rotation,
            "propeller_left_outer_blur"
            | "propeller_left_inner_blur"
            | "propeller_right_outer_blur"
            | "propeller_right_inner_blur" => self.propeller_rotation_blur,
            _ => [0.0, 0.0, 0.0],
        }
    }

    /// Opacity a named part receives; light volumes glow with their light.
    pub fn opacity_for(&self, part: &str) -> f64 {
        match part {
            "lights_position_white_volume" => self.light_emission_strobe * 0.25,
            "lights_anti_collision_red_volume" => self.light_emission_strobe * 0.45,
            "lights_position_green_volume" | "lights_position_red_volume" => {
                self.light_emission * 0.25
            }
            "lights_taxi_white" | "lights_taxi_white_volume" => self.light_emission_taxi * 0.25,
            "propeller_blur" => 0.2,
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraCommand {
    /// Animated move to a viewpoint.
    FlyTo {
        center: [f64; 2],
        zoom: f64,
        pitch: f64,
        bearing: f64,
        duration_ms: f64,
    },
    /// Free camera placed at `position` (meters above ground) looking at
    /// `look_at`.
    FreeCamera {
        position: [f64; 2],
        altitude_m: f64,
        look_at: [f64; 2],
        look_at_altitude_m: f64,
    },
    RotateTo { bearing: f64, duration_ms: f64 },
}

impl CameraCommand {
    pub fn fly_to(view: Viewpoint, duration_ms: f64) -> Self {
        CameraCommand::FlyTo {
            center: view.center,
            zoom: view.zoom,
            pitch: view.pitch,
            bearing: view.bearing,
            duration_ms,
        }
    }
}

/// The rendering capability, as seen by the director.
pub trait SceneAdapter {
    fn place_model(&mut self, placement: &ModelPlacement);
    fn set_feature_state(&mut self, state: &PartFeatureState);
    fn camera(&mut self, command: &CameraCommand);
}

/// Everything a [`SceneAdapter`] can be told, as one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum SceneCommand {
    PlaceModel(ModelPlacement),
    FeatureState(PartFeatureState),
    Camera(CameraCommand),
}

/// Adapter that keeps every command, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingScene {
    pub commands: Vec<SceneCommand>,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<SceneCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn camera_commands(&self) -> impl Iterator<Item = &CameraCommand> {
        self.commands.iter().filter_map(|c| match c {
            SceneCommand::Camera(cmd) => Some(cmd),
            _ => None,
        })
    }
}

impl SceneAdapter for RecordingScene {
    fn place_model(&mut self, placement: &ModelPlacement) {
        self.commands.push(SceneCommand::PlaceModel(placement.clone()));
    }

    fn set_feature_state(&mut self, state: &PartFeatureState) {
        self.commands.push(SceneCommand::FeatureState(state.clone()));
    }

    fn camera(&mut self, command: &CameraCommand) {
        self.commands.push(SceneCommand::Camera(command.clone()));
    }
}
