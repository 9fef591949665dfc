use super::config::IntegratorConfig;
use super::state::AtomDynamics;
use nalgebra::{Point3, Vector3};

/// Damped explicit Euler step with a clamped time step and a hard bounding box.
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    config: IntegratorConfig,
}

impl Integrator {
    pub fn new(config: &IntegratorConfig) -> Self {
        Self { config: *config }
    }

    /// Time step for a tick, `min(elapsed, max_time_step)`.
    ///
    /// Negative or non-finite elapsed times give a zero step.
    pub fn time_step(&self, elapsed: f64) -> f64 {
        if elapsed.is_finite() && elapsed > 0.0 {
            elapsed.min(self.config.max_time_step)
        } else {
            0.0
        }
    }

    /// Advances one atom and returns its new position and dynamics.
    ///
    /// The velocity is not altered when a coordinate is clamped to the box.
    pub fn advance(
        &self,
        position: Point3<f64>,
        dynamics: &AtomDynamics,
        force: Vector3<f64>,
        dt: f64,
    ) -> (Point3<f64>, AtomDynamics) {
        let velocity = (dynamics.velocity + force * dt) * self.config.damping;
        let moved = position + velocity * dt;
        (
            self.config.bounds.clamp(moved),
            AtomDynamics { velocity, force },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integrator() -> Integrator {
        Integrator::new(&IntegratorConfig::default())
    }

    #[test]
    fn time_step_is_capped() {
        let integrator = integrator();
        assert_eq!(integrator.time_step(1.0 / 60.0), 0.016);
        assert_eq!(integrator.time_step(0.01), 0.01);
        assert_eq!(integrator.time_step(-0.5), 0.0);
        assert_eq!(integrator.time_step(f64::NAN), 0.0);
        assert_eq!(integrator.time_step(f64::INFINITY), 0.0);
    }

    #[test]
    fn advance_applies_force_then_damping_then_drift() {
        let (position, dynamics) = integrator().advance(
            Point3::origin(),
            &AtomDynamics::with_velocity(Vector3::new(1.0, 0.0, 0.0)),
            Vector3::new(10.0, 0.0, 0.0),
            0.01,
        );

        let expected_v = (1.0 + 10.0 * 0.01) * 0.99;
        assert!((dynamics.velocity.x - expected_v).abs() < 1e-12);
        assert!((position.x - expected_v * 0.01).abs() < 1e-12);
        assert_eq!(dynamics.force, Vector3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn zero_step_only_damps() {
        let (position, dynamics) = integrator().advance(
            Point3::new(1.0, 2.0, 3.0),
            &AtomDynamics::with_velocity(Vector3::new(0.0, 2.0, 0.0)),
            Vector3::new(5.0, 5.0, 5.0),
            0.0,
        );
        assert_eq!(position, Point3::new(1.0, 2.0, 3.0));
        assert!((dynamics.velocity.y - 1.98).abs() < 1e-12);
    }

    #[test]
    fn clamped_coordinates_keep_velocity() {
        let (position, dynamics) = integrator().advance(
            Point3::new(9.99, -4.99, 0.0),
            &AtomDynamics::with_velocity(Vector3::new(100.0, -100.0, 0.0)),
            Vector3::zeros(),
            0.016,
        );
        assert_eq!(position, Point3::new(10.0, -5.0, 0.0));
        assert!((dynamics.velocity.x - 99.0).abs() < 1e-12);
        assert!((dynamics.velocity.y + 99.0).abs() < 1e-12);
    }
}
