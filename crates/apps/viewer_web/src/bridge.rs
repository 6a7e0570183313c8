//! JS side of the renderer boundary.
//!
//! The host page passes in a `MapHandle`: a thin object over its map
//! instance exposing
//!
//! - `setModels(sourceId, models)`
//! - `setFeatureState(sourceId, featureId, state)`
//! - `flyTo(options)` with `{center, zoom, pitch, bearing, duration}`
//! - `setFreeCamera(lng, lat, altitude, lookAtLng, lookAtLat, lookAtAltitude)`
//! - `rotateTo(bearing, durationMs)`

use flight::{
    CameraCommand, MODEL_SOURCE_ID, ModelPlacement, PLANE_MODEL_ID, PartFeatureState,
    SceneAdapter,
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::mark_not_ready;

#[wasm_bindgen]
extern "C" {
    pub type MapHandle;

    #[wasm_bindgen(method, catch, js_name = setModels)]
    fn set_models(this: &MapHandle, source_id: &str, models: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setFeatureState)]
    fn set_feature_state(
        this: &MapHandle,
        source_id: &str,
        feature_id: &str,
        state: JsValue,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = flyTo)]
    fn fly_to(this: &MapHandle, options: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setFreeCamera)]
    fn set_free_camera(
        this: &MapHandle,
        lng: f64,
        lat: f64,
        altitude: f64,
        look_at_lng: f64,
        look_at_lat: f64,
        look_at_altitude: f64,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = rotateTo)]
    fn rotate_to(this: &MapHandle, bearing: f64, duration_ms: f64) -> Result<(), JsValue>;
}

/// `{ "<model id>": placement }`, the shape `setModels` expects.
pub fn models_payload(placement: &ModelPlacement) -> Result<Value, serde_json::Error> {
    let mut models = Map::new();
    models.insert(placement.id.to_string(), serde_json::to_value(placement)?);
    Ok(Value::Object(models))
}

pub fn fly_to_options(
    center: [f64; 2],
    zoom: f64,
    pitch: f64,
    bearing: f64,
    duration_ms: f64,
) -> Value {
    json!({
        "center": center,
        "zoom": zoom,
        "pitch": pitch,
        "bearing": bearing,
        "duration": duration_ms,
    })
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, String> {
    let payload = serde_json::to_string(value).map_err(|e| e.to_string())?;
    js_sys::JSON::parse(&payload).map_err(|e| format!("{e:?}"))
}

/// Outcome of one call into the map. A JS exception is logged and drops
/// readiness; the frame loop carries on.
pub(crate) fn report_render(op: &str, result: Result<(), String>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("map rejected {op}: {e}");
            mark_not_ready();
            false
        }
    }
}

fn js_err(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

/// [`SceneAdapter`] that forwards to a JS [`MapHandle`].
pub struct JsScene {
    map: MapHandle,
}

impl JsScene {
    pub fn new(map: MapHandle) -> Self {
        Self { map }
    }
}

impl SceneAdapter for JsScene {
    fn place_model(&mut self, placement: &ModelPlacement) {
        let models = models_payload(placement).map_err(|e| e.to_string());
        let result = models.and_then(|m| to_js(&m)).and_then(|models| {
            self.map
                .set_models(MODEL_SOURCE_ID, models)
                .map_err(js_err)
        });
        report_render("model placement", result);
    }

    fn set_feature_state(&mut self, state: &PartFeatureState) {
        let result = to_js(state).and_then(|state| {
            self.map
                .set_feature_state(MODEL_SOURCE_ID, PLANE_MODEL_ID, state)
                .map_err(js_err)
        });
        report_render("feature state", result);
    }

    fn camera(&mut self, command: &CameraCommand) {
        let result = match *command {
            CameraCommand::FlyTo {
                center,
                zoom,
                pitch,
                bearing,
                duration_ms,
            } => to_js(&fly_to_options(center, zoom, pitch, bearing, duration_ms))
                .and_then(|options| self.map.fly_to(options).map_err(js_err)),
            CameraCommand::FreeCamera {
                position,
                altitude_m,
                look_at,
                look_at_altitude_m,
            } => self
                .map
                .set_free_camera(
                    position[0],
                    position[1],
                    altitude_m,
                    look_at[0],
                    look_at[1],
                    look_at_altitude_m,
                )
                .map_err(js_err),
            CameraCommand::RotateTo {
                bearing,
                duration_ms,
            } => self.map.rotate_to(bearing, duration_ms).map_err(js_err),
        };
        report_render("camera command", result);
    }
}
