use foundation::math::{LonLat, mix, sin_phase};

use crate::route::PoseSample;

/// Smoothing rate for position and altitude (per millisecond).
pub const POSITION_RESPONSE: f64 = 0.05;
/// Smoothing rate for bearing and pitch (per millisecond).
pub const ROTATION_RESPONSE: f64 = 0.01;

/// Altitude at which the landing gear is fully retracted.
pub const GEAR_RETRACT_ALTITUDE: f64 = 50.0;
pub const GEAR_RETRACTED_DEG: f64 = 90.0;

/// Altitude at which the taxi light has faded out.
pub const TAXI_LIGHT_FADE_ALTITUDE: f64 = 100.0;
pub const BEACON_PERIOD_S: f64 = 2.0;
pub const STROBE_PERIOD_S: f64 = 1.0;

pub const ROLL_AMPLITUDE_RAD: f64 = 0.1;
/// Roll starts fading in at this altitude...
pub const ROLL_FADE_START: f64 = 50.0;
/// ...and reaches full amplitude this much higher.
pub const ROLL_FADE_SPAN: f64 = 100.0;

/// Simulated aircraft, eased toward route samples every frame.
///
/// Angles are degrees, altitude meters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VehicleState {
    pub position: LonLat,
    pub altitude: f64,
    pub bearing: f64,
    pub pitch: f64,
    pub roll: f64,
    pub front_gear_angle: f64,
    pub rear_gear_angle: f64,
    /// Position/navigation lights, 0.75..1.0 on a 2 s cycle.
    pub beacon_phase: f64,
    /// Anti-collision strobe, 0..1 on a 1 s cycle.
    pub strobe_phase: f64,
    pub taxi_light_phase: f64,
    /// Animation clock (seconds).
    pub elapsed_s: f64,
}

impl VehicleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Eases toward `target` over `dt_ms`. Does nothing without a target, so
    /// the last pose holds while data is missing.
    pub fn advance(&mut self, target: Option<&PoseSample>, dt_ms: f64) {
        let Some(target) = target else {
            return;
        };

        let fp = dt_ms * POSITION_RESPONSE;
        let fr = dt_ms * ROTATION_RESPONSE;
        self.position = LonLat::new(
            mix(self.position.lon_deg, target.position.lon_deg, fp),
            mix(self.position.lat_deg, target.position.lat_deg, fp),
        );
        self.altitude = mix(self.altitude, target.altitude, fp);
        self.bearing = mix(self.bearing, target.bearing, fr);
        self.pitch = mix(self.pitch, target.pitch, fr);

        self.front_gear_angle = front_gear_angle(self.altitude);
        self.rear_gear_angle = rear_gear_angle(self.altitude);

        let t = self.elapsed_s;
        self.beacon_phase = sin_phase(t, BEACON_PERIOD_S) * 0.25 + 0.75;
        self.strobe_phase = sin_phase(t, STROBE_PERIOD_S);
        self.taxi_light_phase = mix(1.0, 0.0, self.altitude / TAXI_LIGHT_FADE_ALTITUDE);

        let bank = (t * std::f64::consts::PI * 0.2).sin() * ROLL_AMPLITUDE_RAD;
        let fade = (self.altitude - ROLL_FADE_START) / ROLL_FADE_SPAN;
        self.roll = mix(0.0, bank, fade).to_degrees();

        self.elapsed_s += dt_ms / 1000.0;
    }

    /// Returns the aircraft to the origin and restarts its animation clock.
    pub fn reset_pose(&mut self) {
        self.position = LonLat::default();
        self.altitude = 0.0;
        self.bearing = 0.0;
        self.pitch = 0.0;
        self.elapsed_s = 0.0;
    }

    /// Main propeller spin (degrees about the hub), two turns per second.
    pub fn propeller_rotation_deg(&self) -> f64 {
        -(self.elapsed_s % 0.5) * 2.0 * 360.0
    }

    /// Motion-blur disc spin, ten turns per second.
    pub fn propeller_blur_rotation_deg(&self) -> f64 {
        (self.elapsed_s % 0.1) * 10.0 * 360.0
    }
}

pub fn front_gear_angle(altitude: f64) -> f64 {
    mix(0.0, GEAR_RETRACTED_DEG, altitude / GEAR_RETRACT_ALTITUDE)
}

pub fn rear_gear_angle(altitude: f64) -> f64 {
    mix(0.0, -GEAR_RETRACTED_DEG, altitude / GEAR_RETRACT_ALTITUDE)
}

#[cfg(test)]
mod tests {
    use super::{VehicleState, front_gear_angle, rear_gear_angle};
    use crate::route::PoseSample;
    use foundation::math::LonLat;
    use pretty_assertions::assert_eq;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn target(altitude: f64) -> PoseSample {
        PoseSample {
            position: LonLat::new(-122.4, 37.6),
            altitude,
            bearing: 120.0,
            pitch: 8.0,
        }
    }

    #[test]
    fn gear_angles_depend_on_altitude_only() {
        assert_eq!(front_gear_angle(0.0), 0.0);
        assert_eq!(rear_gear_angle(0.0), 0.0);
        assert_eq!(front_gear_angle(50.0), 90.0);
        assert_eq!(rear_gear_angle(50.0), -90.0);
        assert_eq!(front_gear_angle(25.0), 45.0);
        assert_eq!(front_gear_angle(4000.0), 90.0);
        assert_eq!(front_gear_angle(-10.0), 0.0);
    }

    #[test]
    fn missing_target_is_a_no_op() {
        let mut v = VehicleState::new();
        v.advance(Some(&target(80.0)), 16.0);
        let before = v.clone();
        for dt in [0.0, 16.0, 1e6] {
            v.advance(None, dt);
        }
        assert_eq!(v, before);
    }

    #[test]
    fn zero_dt_keeps_smoothed_fields() {
        let mut v = VehicleState::new();
        v.advance(Some(&target(300.0)), 10.0);
        let (pos, alt, brg, pitch, t) = (v.position, v.altitude, v.bearing, v.pitch, v.elapsed_s);
        for _ in 0..5 {
            v.advance(Some(&target(900.0)), 0.0);
        }
        assert_eq!(v.position, pos);
        assert_eq!(v.altitude, alt);
        assert_eq!(v.bearing, brg);
        assert_eq!(v.pitch, pitch);
        assert_eq!(v.elapsed_s, t);
    }

    #[test]
    fn position_responds_faster_than_rotation() {
        let mut v = VehicleState::new();
        v.advance(Some(&target(100.0)), 10.0);
        // 10 ms: position factor 0.5, rotation factor 0.1.
        assert_close(v.altitude, 50.0, 1e-12);
        assert_close(v.position.lon_deg, -61.2, 1e-9);
        assert_close(v.bearing, 12.0, 1e-12);
        assert_close(v.pitch, 0.8, 1e-12);
    }

    #[test]
    fn large_dt_snaps_without_overshoot() {
        let mut v = VehicleState::new();
        v.advance(Some(&target(500.0)), 1000.0);
        assert_eq!(v.altitude, 500.0);
        assert_eq!(v.bearing, 120.0);
        assert_eq!(v.position, LonLat::new(-122.4, 37.6));
    }

    #[test]
    fn lights_follow_clock_and_altitude() {
        let mut v = VehicleState::new();
        v.advance(Some(&target(0.0)), 1000.0);
        // Phases come from the clock before this step (t = 0).
        assert_close(v.beacon_phase, 0.875, 1e-12);
        assert_close(v.strobe_phase, 0.5, 1e-12);
        assert_eq!(v.taxi_light_phase, 1.0);
        assert_eq!(v.elapsed_s, 1.0);

        v.advance(Some(&target(200.0)), 1000.0);
        assert_eq!(v.altitude, 200.0);
        assert_eq!(v.taxi_light_phase, 0.0);
        for phase in [v.beacon_phase, v.strobe_phase] {
            assert!((0.0..=1.0).contains(&phase));
        }
        assert!(v.beacon_phase >= 0.75);
    }

    #[test]
    fn roll_only_banks_above_fade_start() {
        let mut low = VehicleState::new();
        low.elapsed_s = 2.5;
        low.advance(Some(&target(40.0)), 1000.0);
        assert_eq!(low.roll, 0.0);

        let mut high = VehicleState::new();
        high.elapsed_s = 2.5;
        high.advance(Some(&target(1000.0)), 1000.0);
        // sin(2.5 * pi * 0.2) = 1, full amplitude.
        assert_close(high.roll, 0.1f64.to_degrees(), 1e-12);
    }

    #[test]
    fn reset_pose_zeroes_kinematics() {
        let mut v = VehicleState::new();
        v.advance(Some(&target(300.0)), 100.0);
        v.reset_pose();
        assert_eq!(v.position, LonLat::default());
        assert_eq!(v.altitude, 0.0);
        assert_eq!(v.bearing, 0.0);
        assert_eq!(v.pitch, 0.0);
        assert_eq!(v.elapsed_s, 0.0);
    }

    #[test]
    fn propeller_rotations_wrap() {
        let mut v = VehicleState::new();
        v.elapsed_s = 0.25;
        assert_close(v.propeller_rotation_deg(), -180.0, 1e-9);
        v.elapsed_s = 0.55;
        assert_close(v.propeller_rotation_deg(), -36.0, 1e-9);
        v.elapsed_s = 0.05;
        assert_close(v.propeller_blur_rotation_deg(), 180.0, 1e-9);
    }
}
