use std::future::Future;

use formats::{RouteFeature, RouteParseError};
use tracing::{error, info};

use crate::route::RouteDescription;

#[derive(Debug, Clone, PartialEq)]
pub enum RouteLoadError {
    /// Transport failed (network, file system).
    Fetch(String),
    Parse(RouteParseError),
    TooShort { waypoints: usize },
}

impl std::fmt::Display for RouteLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteLoadError::Fetch(msg) => write!(f, "failed to fetch route: {msg}"),
            RouteLoadError::Parse(e) => write!(f, "failed to parse route: {e}"),
            RouteLoadError::TooShort { waypoints } => {
                write!(f, "route needs at least 2 waypoints, found {waypoints}")
            }
        }
    }
}

impl std::error::Error for RouteLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteLoadError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RouteParseError> for RouteLoadError {
    fn from(e: RouteParseError) -> Self {
        RouteLoadError::Parse(e)
    }
}

/// Somewhere a route document can be read from.
pub trait RouteSource {
    /// Human-readable location, used in logs.
    fn location(&self) -> String;

    fn fetch(&self) -> impl Future<Output = Result<String, RouteLoadError>>;
}

/// Parses a GeoJSON payload into a ready-to-sample route.
pub fn parse_route(payload: &str) -> Result<RouteDescription, RouteLoadError> {
    let feature = RouteFeature::from_geojson_str(payload)?;
    RouteDescription::from_feature(feature)
}

/// Fetches and parses a route. Errors are logged, never returned; there is
/// no retry.
pub async fn load_route<S: RouteSource>(source: &S) -> Option<RouteDescription> {
    let result = match source.fetch().await {
        Ok(payload) => parse_route(&payload),
        Err(e) => Err(e),
    };

    match result {
        Ok(route) => {
            info!(
                location = %source.location(),
                waypoints = route.waypoints().len(),
                length_m = route.total_length(),
                "route loaded"
            );
            Some(route)
        }
        Err(e) => {
            error!(location = %source.location(), "error loading flight path data: {e}");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{RouteLoadError, RouteSource, load_route, parse_route};
    use crate::route::RouteSampler;
    use formats::RouteParseError;

    /// In-memory source for tests.
    pub(crate) struct StaticSource(pub Result<String, RouteLoadError>);

    impl RouteSource for StaticSource {
        fn location(&self) -> String {
            "memory".to_string()
        }

        async fn fetch(&self) -> Result<String, RouteLoadError> {
            self.0.clone()
        }
    }

    const TWO_POINTS: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"elevation": [0, 120]},
         "geometry": {"type": "LineString", "coordinates": [[-122.38, 37.61], [-122.39, 37.62]]}}
    ]}"#;

    #[test]
    fn parse_route_builds_description() {
        let route = parse_route(TWO_POINTS).expect("parse");
        assert_eq!(route.waypoints().len(), 2);
        assert!(route.total_length() > 0.0);
    }

    #[test]
    fn parse_errors_are_wrapped() {
        let err = parse_route(r#"{"type":"FeatureCollection","features":[]}"#)
            .expect_err("empty collection");
        assert_eq!(err, RouteLoadError::Parse(RouteParseError::EmptyCollection));
    }

    #[test]
    fn load_succeeds_from_source() {
        let source = StaticSource(Ok(TWO_POINTS.to_string()));
        let route = pollster::block_on(load_route(&source));
        assert!(route.is_some());
    }

    #[test]
    fn failed_fetch_leaves_sampler_unloaded() {
        let source = StaticSource(Err(RouteLoadError::Fetch("404".to_string())));
        let mut sampler = RouteSampler::new();
        let loaded = pollster::block_on(sampler.load(&source));
        assert!(!loaded);
        assert!(!sampler.is_loaded());
    }

    #[test]
    fn malformed_payload_leaves_sampler_unloaded() {
        let source = StaticSource(Ok("{]".to_string()));
        let mut sampler = RouteSampler::new();
        assert!(!pollster::block_on(sampler.load(&source)));
        assert_eq!(sampler.sample(0.0), None);
    }
}
