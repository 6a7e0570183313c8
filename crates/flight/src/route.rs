use foundation::math::{LonLat, great_circle_distance_m, initial_bearing_deg, mix};
use formats::RouteFeature;
use tracing::warn;

use crate::loader::{RouteLoadError, RouteSource, load_route};

/// Instantaneous placement along a route.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PoseSample {
    pub position: LonLat,
    pub altitude: f64,
    /// Great-circle bearing of the current segment (degrees).
    pub bearing: f64,
    /// Climb angle of the current segment (degrees).
    pub pitch: f64,
}

/// Where a distance lands on the route: segment `index` spans waypoints
/// `index` and `index + 1`, and `fraction` is the position within it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SegmentPosition {
    pub index: usize,
    pub fraction: f64,
}

/// A fully-built route. Always has at least two waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescription {
    waypoints: Vec<LonLat>,
    elevations: Vec<f64>,
    cumulative_distances: Vec<f64>,
    max_elevation: f64,
}

impl RouteDescription {
    /// Builds the distance table.
    ///
    /// If `elevations` and `waypoints` disagree in length, both are cut to the
    /// shorter one and a warning is logged.
    pub fn new(
        mut waypoints: Vec<LonLat>,
        mut elevations: Vec<f64>,
    ) -> Result<Self, RouteLoadError> {
        if waypoints.len() != elevations.len() {
            warn!(
                waypoints = waypoints.len(),
                elevations = elevations.len(),
                "elevation sample count does not match coordinate count; truncating route"
            );
            let n = waypoints.len().min(elevations.len());
            waypoints.truncate(n);
            elevations.truncate(n);
        }
        if waypoints.len() < 2 {
            return Err(RouteLoadError::TooShort {
                waypoints: waypoints.len(),
            });
        }

        let mut cumulative_distances = Vec::with_capacity(waypoints.len());
        cumulative_distances.push(0.0);
        let mut max_elevation = 0.0f64;
        for i in 1..waypoints.len() {
            let seg = great_circle_distance_m(waypoints[i - 1], waypoints[i]);
            cumulative_distances.push(cumulative_distances[i - 1] + seg);
            max_elevation = max_elevation.max(elevations[i]);
        }

        Ok(Self {
            waypoints,
            elevations,
            cumulative_distances,
            max_elevation,
        })
    }

    pub fn from_feature(feature: RouteFeature) -> Result<Self, RouteLoadError> {
        Self::new(feature.coordinates, feature.elevation)
    }

    pub fn waypoints(&self) -> &[LonLat] {
        &self.waypoints
    }

    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    pub fn cumulative_distances(&self) -> &[f64] {
        &self.cumulative_distances
    }

    pub fn max_elevation(&self) -> f64 {
        self.max_elevation
    }

    pub fn total_length(&self) -> f64 {
        self.cumulative_distances.last().copied().unwrap_or(0.0)
    }

    /// Finds the segment containing `distance`, clamped to the route.
    pub fn locate(&self, distance: f64) -> SegmentPosition {
        let total = self.total_length();
        let distance = if distance.is_nan() {
            0.0
        } else {
            distance.clamp(0.0, total)
        };

        let last_segment = self.waypoints.len() - 2;
        // Smallest i with cumulative[i] >= distance; the segment ends there.
        let i = self.cumulative_distances.partition_point(|&d| d < distance);
        let index = i.saturating_sub(1).min(last_segment);

        let start = self.cumulative_distances[index];
        let len = self.cumulative_distances[index + 1] - start;
        let fraction = if len > 0.0 {
            ((distance - start) / len).clamp(0.0, 1.0)
        } else {
            0.0
        };

        SegmentPosition { index, fraction }
    }

    pub fn sample(&self, distance: f64) -> PoseSample {
        let SegmentPosition { index, fraction } = self.locate(distance);
        let p1 = self.waypoints[index];
        let p2 = self.waypoints[index + 1];
        let e1 = self.elevations[index];
        let e2 = self.elevations[index + 1];
        let seg_len = self.cumulative_distances[index + 1] - self.cumulative_distances[index];

        PoseSample {
            position: p1.lerp(p2, fraction),
            altitude: mix(e1, e2, fraction),
            bearing: initial_bearing_deg(p1, p2),
            pitch: (e2 - e1).atan2(seg_len).to_degrees(),
        }
    }
}

/// Holds the route once it has arrived. Sampling an unloaded route yields
/// nothing.
#[derive(Debug, Default, Clone)]
pub struct RouteSampler {
    route: Option<RouteDescription>,
}

impl RouteSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches and installs a route. Failures are logged and leave the
    /// sampler as it was.
    pub async fn load<S: RouteSource>(&mut self, source: &S) -> bool {
        match load_route(source).await {
            Some(route) => {
                self.publish(route);
                true
            }
            None => false,
        }
    }

    pub fn publish(&mut self, route: RouteDescription) {
        self.route = Some(route);
    }

    pub fn is_loaded(&self) -> bool {
        self.route.is_some()
    }

    pub fn route(&self) -> Option<&RouteDescription> {
        self.route.as_ref()
    }

    pub fn total_length(&self) -> f64 {
        self.route.as_ref().map_or(0.0, RouteDescription::total_length)
    }

    pub fn sample(&self, distance: f64) -> Option<PoseSample> {
        self.route.as_ref().map(|r| r.sample(distance))
    }
}

#[cfg(test)]
mod tests {
    use super::{RouteDescription, RouteSampler};
    use crate::loader::RouteLoadError;
    use foundation::math::{EARTH_MEAN_RADIUS_M, LonLat};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    /// Degrees of longitude on the equator spanning `m` meters.
    fn equator_deg(m: f64) -> f64 {
        (m / EARTH_MEAN_RADIUS_M).to_degrees()
    }

    /// Three waypoints along the equator at cumulative distances 0, 100, 250.
    fn three_point_route() -> RouteDescription {
        RouteDescription::new(
            vec![
                LonLat::new(0.0, 0.0),
                LonLat::new(equator_deg(100.0), 0.0),
                LonLat::new(equator_deg(250.0), 0.0),
            ],
            vec![0.0, 10.0, 40.0],
        )
        .expect("valid route")
    }

    fn climbing_route() -> RouteDescription {
        RouteDescription::new(
            vec![
                LonLat::new(-122.384, 37.618),
                LonLat::new(-122.390, 37.621),
                LonLat::new(-122.420, 37.640),
                LonLat::new(-122.500, 37.700),
            ],
            vec![0.0, 0.0, 300.0, 1500.0],
        )
        .expect("valid route")
    }

    #[test]
    fn cumulative_distances_start_at_zero_and_grow() {
        let route = three_point_route();
        let d = route.cumulative_distances();
        assert_eq!(d[0], 0.0);
        assert_close(d[1], 100.0, 1e-6);
        assert_close(d[2], 250.0, 1e-6);
        assert_close(route.total_length(), 250.0, 1e-6);
    }

    #[test]
    fn locates_scenario_segments() {
        let route = three_point_route();

        let a = route.locate(50.0);
        assert_eq!(a.index, 0);
        assert_close(a.fraction, 0.5, 1e-6);

        let b = route.locate(200.0);
        assert_eq!(b.index, 1);
        assert_close(b.fraction, 100.0 / 150.0, 1e-6);
    }

    #[test]
    fn boundaries_are_exact() {
        let route = climbing_route();
        let first = route.sample(0.0);
        assert_eq!(first.position, route.waypoints()[0]);
        assert_eq!(first.altitude, route.elevations()[0]);

        let last = route.sample(route.total_length());
        assert_eq!(last.position, route.waypoints()[3]);
        assert_eq!(last.altitude, route.elevations()[3]);
    }

    #[test]
    fn out_of_range_distances_clamp() {
        let route = climbing_route();
        assert_eq!(route.sample(-500.0), route.sample(0.0));
        assert_eq!(
            route.sample(route.total_length() + 1e6),
            route.sample(route.total_length())
        );
        assert_eq!(route.sample(f64::NAN), route.sample(0.0));
    }

    #[test]
    fn positions_stay_on_their_segment() {
        let route = climbing_route();
        let total = route.total_length();
        for step in 0..=100 {
            let d = total * f64::from(step) / 100.0;
            let seg = route.locate(d);
            assert!((0.0..=1.0).contains(&seg.fraction));

            let p = route.sample(d).position;
            let a = route.waypoints()[seg.index];
            let b = route.waypoints()[seg.index + 1];
            let lo_lon = a.lon_deg.min(b.lon_deg) - 1e-12;
            let hi_lon = a.lon_deg.max(b.lon_deg) + 1e-12;
            let lo_lat = a.lat_deg.min(b.lat_deg) - 1e-12;
            let hi_lat = a.lat_deg.max(b.lat_deg) + 1e-12;
            assert!((lo_lon..=hi_lon).contains(&p.lon_deg), "lon off segment at {d}");
            assert!((lo_lat..=hi_lat).contains(&p.lat_deg), "lat off segment at {d}");
        }
    }

    #[test]
    fn bearing_and_pitch_follow_segment() {
        let route = three_point_route();
        let s = route.sample(200.0);
        // Due east along the equator.
        assert_close(s.bearing, 90.0, 1e-9);
        assert_close(s.pitch, (30.0f64).atan2(150.0).to_degrees(), 1e-6);
    }

    #[test]
    fn zero_length_segment_uses_zero_fraction() {
        let route = RouteDescription::new(
            vec![LonLat::new(1.0, 1.0), LonLat::new(1.0, 1.0)],
            vec![5.0, 9.0],
        )
        .expect("valid route");
        assert_eq!(route.total_length(), 0.0);
        let s = route.sample(10.0);
        assert_eq!(route.locate(10.0).fraction, 0.0);
        assert_eq!(s.altitude, 5.0);
    }

    #[test]
    fn mismatched_elevations_truncate() {
        let route = RouteDescription::new(
            vec![
                LonLat::new(0.0, 0.0),
                LonLat::new(0.0, 0.01),
                LonLat::new(0.0, 0.02),
            ],
            vec![0.0, 50.0],
        )
        .expect("two usable waypoints");
        assert_eq!(route.waypoints().len(), 2);
        assert_eq!(route.sample(route.total_length()).altitude, 50.0);
    }

    #[test]
    fn rejects_routes_shorter_than_two() {
        let err = RouteDescription::new(vec![LonLat::new(0.0, 0.0)], vec![0.0])
            .expect_err("single waypoint");
        assert_eq!(err, RouteLoadError::TooShort { waypoints: 1 });
    }

    #[test]
    fn max_elevation_tracks_peak() {
        assert_eq!(climbing_route().max_elevation(), 1500.0);
    }

    #[test]
    fn unloaded_sampler_yields_nothing() {
        let sampler = RouteSampler::new();
        assert!(!sampler.is_loaded());
        assert_eq!(sampler.total_length(), 0.0);
        assert_eq!(sampler.sample(0.0), None);
    }

    #[test]
    fn published_route_is_sampled() {
        let mut sampler = RouteSampler::new();
        sampler.publish(three_point_route());
        assert!(sampler.is_loaded());
        let s = sampler.sample(50.0).expect("sample");
        assert_close(s.altitude, 5.0, 1e-6);
    }
}
