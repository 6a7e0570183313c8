/// Mean Earth radius (meters) used for great-circle math.
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_008.8;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    pub fn as_array(self) -> [f64; 2] {
        [self.lon_deg, self.lat_deg]
    }

    /// Component-wise linear interpolation in degree space. Exact at
    /// `t == 0` and `t == 1`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            self.lon_deg * (1.0 - t) + other.lon_deg * t,
            self.lat_deg * (1.0 - t) + other.lat_deg * t,
        )
    }

    pub fn offset(self, d_lon_deg: f64, d_lat_deg: f64) -> Self {
        Self::new(self.lon_deg + d_lon_deg, self.lat_deg + d_lat_deg)
    }
}

impl From<[f64; 2]> for LonLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

/// Haversine distance between two positions, in meters.
pub fn great_circle_distance_m(a: LonLat, b: LonLat) -> f64 {
    let lat1 = a.lat_deg.to_radians();
    let lat2 = b.lat_deg.to_radians();
    let d_lat = (b.lat_deg - a.lat_deg).to_radians();
    let d_lon = (b.lon_deg - a.lon_deg).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_MEAN_RADIUS_M * c
}

/// Initial great-circle bearing from `a` toward `b`, degrees in `(-180, 180]`
/// clockwise from north.
pub fn initial_bearing_deg(a: LonLat, b: LonLat) -> f64 {
    let lat1 = a.lat_deg.to_radians();
    let lat2 = b.lat_deg.to_radians();
    let d_lon = (b.lon_deg - a.lon_deg).to_radians();

    let x = d_lon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    x.atan2(y).to_degrees()
}
