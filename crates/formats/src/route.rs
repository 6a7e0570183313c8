use foundation::math::LonLat;
use serde_json::Value;

/// A flight path read from GeoJSON: the line geometry of one feature plus its
/// per-vertex `elevation` property.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFeature {
    pub coordinates: Vec<LonLat>,
    pub elevation: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteParseError {
    Json(String),
    NotAFeatureCollection,
    EmptyCollection,
    InvalidFeature(String),
}

impl std::fmt::Display for RouteParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteParseError::Json(msg) => write!(f, "JSON parse error: {msg}"),
            RouteParseError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection or Feature")
            }
            RouteParseError::EmptyCollection => write!(f, "FeatureCollection has no features"),
            RouteParseError::InvalidFeature(reason) => write!(f, "invalid route feature: {reason}"),
        }
    }
}

impl std::error::Error for RouteParseError {}

impl RouteFeature {
    pub fn from_geojson_str(payload: &str) -> Result<Self, RouteParseError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| RouteParseError::Json(e.to_string()))?;
        Self::from_geojson_value(&value)
    }

    /// Reads the route from a `FeatureCollection` (first feature wins) or from
    /// a bare `Feature`.
    pub fn from_geojson_value(value: &Value) -> Result<Self, RouteParseError> {
        let obj = value
            .as_object()
            .ok_or(RouteParseError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(RouteParseError::NotAFeatureCollection)?;

        match ty {
            "FeatureCollection" => {
                let first = obj
                    .get("features")
                    .and_then(|v| v.as_array())
                    .ok_or(RouteParseError::NotAFeatureCollection)?
                    .first()
                    .ok_or(RouteParseError::EmptyCollection)?;
                parse_feature(first)
            }
            "Feature" => parse_feature(value),
            _ => Err(RouteParseError::NotAFeatureCollection),
        }
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

fn invalid(reason: impl Into<String>) -> RouteParseError {
    RouteParseError::InvalidFeature(reason.into())
}

fn parse_feature(value: &Value) -> Result<RouteFeature, RouteParseError> {
    let feat = value
        .as_object()
        .ok_or_else(|| invalid("feature must be an object"))?;

    let geometry = feat
        .get("geometry")
        .and_then(|v| v.as_object())
        .ok_or_else(|| invalid("feature missing geometry"))?;
    match geometry.get("type").and_then(|v| v.as_str()) {
        Some("LineString") => {}
        Some(other) => return Err(invalid(format!("unsupported geometry type: {other}"))),
        None => return Err(invalid("geometry missing type")),
    }
    let coords = geometry
        .get("coordinates")
        .and_then(|v| v.as_array())
        .ok_or_else(|| invalid("geometry missing coordinates"))?;

    let mut coordinates = Vec::with_capacity(coords.len());
    for (i, c) in coords.iter().enumerate() {
        coordinates.push(parse_position(c).map_err(|r| invalid(format!("coordinate {i}: {r}")))?);
    }

    let elevation_val = feat
        .get("properties")
        .and_then(|v| v.get("elevation"))
        .and_then(|v| v.as_array())
        .ok_or_else(|| invalid("properties.elevation must be an array"))?;
    let mut elevation = Vec::with_capacity(elevation_val.len());
    for (i, e) in elevation_val.iter().enumerate() {
        let e = e
            .as_f64()
            .ok_or_else(|| invalid(format!("elevation {i} must be a number")))?;
        elevation.push(e);
    }

    Ok(RouteFeature {
        coordinates,
        elevation,
    })
}

// Extra ordinates (altitude, measure) are ignored.
fn parse_position(value: &Value) -> Result<LonLat, &'static str> {
    let arr = value.as_array().ok_or("position must be an array")?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]");
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number")?;
    let lat = arr[1].as_f64().ok_or("lat must be a number")?;
    Ok(LonLat::new(lon, lat))
}
