//! Built-in per-frame motion.
//!
//! Motion is frame-stepped, not time-scaled: every eligible Update adds the
//! acceleration to the velocity and the velocity to the position. Integrate
//! later commits the position into `previous_position` and records the
//! frame's displacement in `delta`, which edge-interpolating geometry and
//! bounds predicates read on the next frame.

use glam::DVec2;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Kinematics {
    pub position: DVec2,
    /// Position as of the last Integrate.
    pub previous_position: DVec2,
    pub velocity: DVec2,
    pub acceleration: DVec2,
    /// Displacement committed by the last Integrate.
    pub delta: DVec2,
}

impl Kinematics {
    pub fn at(position: DVec2) -> Self {
        Self {
            position,
            previous_position: position,
            ..Self::default()
        }
    }

    /// One frame of built-in motion.
    pub fn advance(&mut self) {
        self.velocity += self.acceleration;
        self.position += self.velocity;
    }

    /// Commit the current position as the previous-frame position.
    pub fn commit(&mut self) {
        self.delta = self.position - self.previous_position;
        self.previous_position = self.position;
    }

    /// Teleport without producing a displacement on the next commit.
    pub fn warp(&mut self, position: DVec2) {
        self.position = position;
        self.previous_position = position;
    }

    /// Set speed while keeping the current heading. No-op on a zero velocity.
    pub fn set_speed(&mut self, speed: f64) {
        let current = self.velocity.length();
        if current > 0.0 {
            self.velocity *= speed / current;
        }
    }

    /// Set velocity from polar form (angle in radians).
    pub fn set_polar_velocity(&mut self, speed: f64, angle: f64) {
        self.velocity = DVec2::new(angle.cos(), angle.sin()) * speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn advance_applies_acceleration_then_velocity() {
        let mut k = Kinematics::at(DVec2::ZERO);
        k.velocity = DVec2::new(1.0, 0.0);
        k.acceleration = DVec2::new(0.5, -1.0);
        k.advance();
        assert!(approx_eq(k.velocity.x, 1.5));
        assert!(approx_eq(k.position.x, 1.5));
        assert!(approx_eq(k.position.y, -1.0));
    }

    #[test]
    fn commit_records_delta() {
        let mut k = Kinematics::at(DVec2::new(2.0, 2.0));
        k.velocity = DVec2::new(3.0, 4.0);
        k.advance();
        k.commit();
        assert_eq!(k.delta, DVec2::new(3.0, 4.0));
        assert_eq!(k.previous_position, k.position);
        k.commit();
        assert_eq!(k.delta, DVec2::ZERO);
    }

    #[test]
    fn warp_produces_no_delta() {
        let mut k = Kinematics::at(DVec2::ZERO);
        k.warp(DVec2::new(50.0, 50.0));
        k.commit();
        assert_eq!(k.delta, DVec2::ZERO);
    }

    #[test]
    fn set_speed_keeps_heading() {
        let mut k = Kinematics::default();
        k.velocity = DVec2::new(3.0, 4.0);
        k.set_speed(10.0);
        assert!(approx_eq(k.velocity.x, 6.0));
        assert!(approx_eq(k.velocity.y, 8.0));

        let mut still = Kinematics::default();
        still.set_speed(5.0);
        assert_eq!(still.velocity, DVec2::ZERO);
    }

    #[test]
    fn polar_velocity() {
        let mut k = Kinematics::default();
        k.set_polar_velocity(2.0, std::f64::consts::FRAC_PI_2);
        assert!(approx_eq(k.velocity.x, 0.0));
        assert!(approx_eq(k.velocity.y, 2.0));
    }
}
