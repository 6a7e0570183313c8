use serde::{Deserialize, Serialize};

/// Environment variable holding the map access token.
pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_TOKEN";

/// Used when no token is supplied by the environment.
pub const FALLBACK_ACCESS_TOKEN: &str = "pk.flightmap-public-demo-token";

/// Where the route and aircraft model live by default.
pub const DEFAULT_ASSET_BASE: &str = "https://docs.mapbox.com/mapbox-gl-js/assets/";

pub const ROUTE_ASSET: &str = "flightpath.json";
pub const MODEL_ASSET: &str = "airplane.glb";

/// Picks the access token: a non-blank environment value, else the fallback.
pub fn resolve_access_token(env_value: Option<&str>) -> String {
    match env_value.map(str::trim) {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => FALLBACK_ACCESS_TOKEN.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUrls {
    pub base: String,
}

impl Default for AssetUrls {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_BASE)
    }
}

impl AssetUrls {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    pub fn asset(&self, name: &str) -> String {
        format!("{}{name}", self.base)
    }

    pub fn route_url(&self) -> String {
        self.asset(ROUTE_ASSET)
    }

    pub fn model_uri(&self) -> String {
        self.asset(MODEL_ASSET)
    }
}

/// A camera destination for fly-to transitions.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewpoint {
    pub center: [f64; 2],
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

/// Tunables for the two-mode map animation.
///
/// Distances and altitudes are meters, durations milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Nominal transit length before time scaling.
    pub transit_duration_ms: f64,
    /// How long the static scene is held before returning to transit.
    pub static_dwell_ms: f64,
    /// Altitude below which transit runs at `min_time_scale`.
    pub min_travel_altitude: f64,
    /// Altitude at and above which transit runs at `max_time_scale`.
    pub max_travel_altitude: f64,
    pub min_time_scale: f64,
    pub max_time_scale: f64,
    pub fly_to_duration_ms: f64,
    /// Static-scene rotation accumulated per millisecond.
    pub static_rotation_rate: f64,
    /// Multiplier from accumulated rotation to issued camera bearing.
    pub static_rotation_bearing_scale: f64,
    /// Chase-camera lon/lat offset at ground level (degrees).
    pub camera_offset_deg: f64,
    /// Altitude over which the chase offset shrinks to zero.
    pub camera_offset_fade_altitude: f64,
    pub camera_height_above_vehicle: f64,
    /// Extra camera height added at full altitude fade.
    pub camera_overview_height: f64,
    pub transit_viewpoint: Viewpoint,
    pub static_viewpoint: Viewpoint,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            transit_duration_ms: 50_000.0,
            static_dwell_ms: 10_000.0,
            min_travel_altitude: 200.0,
            max_travel_altitude: 3000.0,
            min_time_scale: 0.001,
            max_time_scale: 10.0,
            fly_to_duration_ms: 2000.0,
            static_rotation_rate: 0.0001,
            static_rotation_bearing_scale: 10.0,
            camera_offset_deg: 0.0014,
            camera_offset_fade_altitude: 200.0,
            camera_height_above_vehicle: 50.0,
            camera_overview_height: 10_000_000.0,
            // San Francisco International, where the demo route departs.
            transit_viewpoint: Viewpoint {
                center: [-122.372_046_476_332_36, 37.619_836_883_832_306],
                zoom: 19.0,
                pitch: 45.0,
                bearing: 0.0,
            },
            // Chicago, over the extruded floor plan.
            static_viewpoint: Viewpoint {
                center: [-87.61694, 41.86625],
                zoom: 15.99,
                pitch: 40.0,
                bearing: 0.0,
            },
        }
    }
}
