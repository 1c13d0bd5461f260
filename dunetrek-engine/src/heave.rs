//! Heave-rig physics collaborator: fixed-step RK4 integration and the
//! power-takeoff damping sweep.
//!
//! This module is the external physics companion to the traversal engines: a
//! two-body heave rig (a buoyant float coupled to an internal oscillator by a
//! spring and a damped power takeoff) driven by a sinusoidal wave force. The
//! traversal core never depends on it; the CLI exposes it for displacement,
//! velocity, and mean-power series and for the damping-coefficient ×
//! damping-exponent grid sweep.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// State vector dimension: float position, oscillator position, float
/// velocity, oscillator velocity.
pub const HEAVE_DIM: usize = 4;

/// One integration sample, ordered `[float_pos, osc_pos, float_vel, osc_vel]`.
pub type HeaveState = [f64; HEAVE_DIM];

/// Damping law applied by the power takeoff to the relative velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DampingLaw {
    /// Force proportional to relative velocity.
    Linear,
    /// Force proportional to `|v|^exponent · v`.
    Power { exponent: f64 },
}

/// Physical parameters of the float/oscillator pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeaveRig {
    pub float_mass: f64,
    pub osc_mass: f64,
    /// Hydrodynamic added mass acting on the float in heave.
    pub added_mass: f64,
    pub spring_k: f64,
    /// Power-takeoff damping coefficient between float and oscillator.
    pub pto_damping: f64,
    /// Radiation damping acting on the float alone.
    pub radiation_damping: f64,
    /// Wave excitation amplitude.
    pub wave_force: f64,
    /// Wave angular frequency.
    pub wave_freq: f64,
    pub water_density: f64,
    pub gravity: f64,
    /// Cylinder section height of the float.
    pub cyl_height: f64,
    /// Cone section height of the float.
    pub cone_height: f64,
    pub radius: f64,
    /// Float displacement at which the cylinder section submerges fully.
    pub draft_full: f64,
    /// Float displacement at which the cylinder section clears the water.
    pub draft_free: f64,
}

impl Default for HeaveRig {
    fn default() -> Self {
        Self {
            float_mass: 4866.0,
            osc_mass: 2433.0,
            added_mass: 1335.535,
            spring_k: 80000.0,
            pto_damping: 100.0,
            radiation_damping: 656.3616,
            wave_force: 6250.0,
            wave_freq: 1.4005,
            water_density: 1025.0,
            gravity: 9.81,
            cyl_height: 0.5,
            cone_height: 0.3,
            radius: 0.1,
            draft_full: 0.2,
            draft_free: -0.1,
        }
    }
}

/// Faults in the rig parameters or the integration window.
#[derive(Debug, Error, PartialEq)]
pub enum HeaveError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("integration step must be positive (got {step})")]
    StepInvalid { step: f64 },
    #[error("integration window is reversed ({t_start} .. {t_end})")]
    WindowReversed { t_start: f64, t_end: f64 },
}

/// Grid definition for the damping sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DampingSweep {
    pub damping_max: f64,
    pub damping_step: f64,
    pub exponent_max: f64,
    pub exponent_step: f64,
    /// Number of wave periods to integrate per grid point.
    pub cycles: f64,
    /// Integration step size.
    pub step: f64,
}

impl Default for DampingSweep {
    fn default() -> Self {
        Self {
            damping_max: 100_000.0,
            damping_step: 1_000.0,
            exponent_max: 1.0,
            exponent_step: 0.1,
            cycles: 40.0,
            step: 0.2,
        }
    }
}

/// Best grid point found by a damping sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepOutcome {
    pub best_power: f64,
    pub best_damping: f64,
    pub best_exponent: f64,
    pub evaluations: usize,
}

impl HeaveRig {
    /// Validate the physical parameters.
    ///
    /// # Errors
    ///
    /// Returns `HeaveError::NonPositive` for the first mass, frequency, or
    /// geometry term that is not strictly positive.
    pub fn validate(&self) -> Result<(), HeaveError> {
        for (field, value) in [
            ("float_mass", self.float_mass),
            ("osc_mass", self.osc_mass),
            ("wave_freq", self.wave_freq),
            ("radius", self.radius),
        ] {
            if !(value > 0.0) {
                return Err(HeaveError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    /// Hydrostatic restoring term acting on the float at displacement
    /// `float_pos`; piecewise in the cylinder submergence.
    #[must_use]
    pub fn buoyancy_term(&self, float_pos: f64) -> f64 {
        let column = self.water_density * self.gravity * std::f64::consts::PI * self.radius
            * self.radius;
        if float_pos >= self.draft_full {
            let submerged_frac =
                (float_pos - self.draft_full) / (self.draft_free - self.draft_full);
            column * (self.cyl_height + self.cone_height * submerged_frac)
        } else {
            column * self.cyl_height
        }
    }

    fn pto_force(&self, rel_vel: f64, law: DampingLaw) -> f64 {
        match law {
            DampingLaw::Linear => self.pto_damping * rel_vel,
            DampingLaw::Power { exponent } => {
                self.pto_damping * rel_vel.abs().powf(exponent) * rel_vel
            }
        }
    }

    /// Time derivative of the state vector at time `t`.
    #[must_use]
    pub fn derivatives(&self, state: &HeaveState, t: f64, law: DampingLaw) -> HeaveState {
        let [float_pos, osc_pos, float_vel, osc_vel] = *state;
        let rel_vel = float_vel - osc_vel;
        let pto = self.pto_force(rel_vel, law);
        let excitation = self.wave_force * (self.wave_freq * t).cos();
        let restoring = self.spring_k * (float_pos - osc_pos);
        let float_accel = (excitation
            - pto
            - self.radiation_damping * float_vel
            - restoring
            - self.buoyancy_term(float_pos))
            / (self.float_mass + self.added_mass);
        let osc_accel = (-self.spring_k * (osc_pos - float_pos) - pto) / self.osc_mass;
        [float_vel, osc_vel, float_accel, osc_accel]
    }

    /// Integrate the rig with classical fourth-order Runge-Kutta at a fixed
    /// step, returning one sample per step including the initial state.
    ///
    /// # Errors
    ///
    /// Returns `HeaveError` when the parameters, step, or window are invalid.
    pub fn integrate(
        &self,
        initial: HeaveState,
        t_start: f64,
        t_end: f64,
        step: f64,
        law: DampingLaw,
    ) -> Result<Vec<HeaveState>, HeaveError> {
        self.validate()?;
        if !(step > 0.0) {
            return Err(HeaveError::StepInvalid { step });
        }
        if t_end < t_start {
            return Err(HeaveError::WindowReversed { t_start, t_end });
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = ((t_end - t_start) / step) as usize;
        let mut samples = Vec::with_capacity(steps + 1);
        let mut state = initial;
        samples.push(state);

        for i in 0..steps {
            #[allow(clippy::cast_precision_loss)]
            let t = step.mul_add(i as f64, t_start);
            let k1 = self.derivatives(&state, t, law);
            let k2 = self.derivatives(&advance(&state, &k1, step / 2.0), t + step / 2.0, law);
            let k3 = self.derivatives(&advance(&state, &k2, step / 2.0), t + step / 2.0, law);
            let k4 = self.derivatives(&advance(&state, &k3, step), t + step, law);
            for j in 0..HEAVE_DIM {
                state[j] += (step / 6.0) * (k1[j] + 2.0 * k2[j] + 2.0 * k3[j] + k4[j]);
            }
            samples.push(state);
        }
        Ok(samples)
    }

    /// Mean power absorbed by the power takeoff over a sample series.
    #[must_use]
    pub fn mean_power(&self, samples: &[HeaveState], law: DampingLaw) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let total: f64 = samples
            .iter()
            .map(|state| {
                let rel_vel = state[2] - state[3];
                match law {
                    DampingLaw::Linear => self.pto_damping * rel_vel * rel_vel,
                    DampingLaw::Power { exponent } => {
                        self.pto_damping * (rel_vel.abs() + 1e-10).powf(exponent) * rel_vel
                            * rel_vel
                    }
                }
            })
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let count = samples.len() as f64;
        total / count
    }

    /// Grid search over the damping coefficient and exponent for the point
    /// that maximizes mean absorbed power.
    ///
    /// # Errors
    ///
    /// Returns `HeaveError` when the rig parameters or the sweep's
    /// integration settings are invalid.
    pub fn sweep_damping(&self, sweep: &DampingSweep) -> Result<SweepOutcome, HeaveError> {
        if !(sweep.damping_step > 0.0) {
            return Err(HeaveError::StepInvalid {
                step: sweep.damping_step,
            });
        }
        if !(sweep.exponent_step > 0.0) {
            return Err(HeaveError::StepInvalid {
                step: sweep.exponent_step,
            });
        }
        let t_end = sweep.cycles * 2.0 * std::f64::consts::PI / self.wave_freq;
        let mut best = SweepOutcome {
            best_power: 0.0,
            best_damping: 0.0,
            best_exponent: 0.0,
            evaluations: 0,
        };

        let mut damping = 0.0;
        while damping <= sweep.damping_max {
            let mut exponent = 0.0;
            while exponent <= sweep.exponent_max {
                let mut rig = *self;
                rig.pto_damping = damping;
                let law = DampingLaw::Power { exponent };
                let samples = rig.integrate([0.0; HEAVE_DIM], 0.0, t_end, sweep.step, law)?;
                let power = rig.mean_power(&samples, law);
                best.evaluations += 1;
                if power > best.best_power {
                    best.best_power = power;
                    best.best_damping = damping;
                    best.best_exponent = exponent;
                }
                exponent += sweep.exponent_step;
            }
            damping += sweep.damping_step;
        }
        Ok(best)
    }
}

fn advance(state: &HeaveState, slope: &HeaveState, dt: f64) -> HeaveState {
    let mut next = *state;
    for j in 0..HEAVE_DIM {
        next[j] += dt * slope[j];
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rig with no forcing, damping, or buoyancy so the dynamics reduce to
    /// the bare two-mass spring.
    fn quiescent_rig() -> HeaveRig {
        HeaveRig {
            pto_damping: 0.0,
            radiation_damping: 0.0,
            wave_force: 0.0,
            water_density: 0.0,
            ..HeaveRig::default()
        }
    }

    #[test]
    fn sample_count_covers_the_window_inclusively() {
        let rig = HeaveRig::default();
        let samples = rig
            .integrate([0.0; HEAVE_DIM], 0.0, 2.0, 0.5, DampingLaw::Linear)
            .expect("valid window");
        assert_eq!(samples.len(), 5);
    }

    #[test]
    fn equal_displacements_with_no_forcing_stay_put() {
        let rig = quiescent_rig();
        let samples = rig
            .integrate([1.0, 1.0, 0.0, 0.0], 0.0, 2.0, 0.1, DampingLaw::Linear)
            .expect("valid window");
        for state in samples {
            for value in state.iter().zip([1.0, 1.0, 0.0, 0.0]) {
                assert!((value.0 - value.1).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn integration_is_deterministic() {
        let rig = HeaveRig::default();
        let a = rig
            .integrate([0.0; HEAVE_DIM], 0.0, 5.0, 0.2, DampingLaw::Linear)
            .expect("valid window");
        let b = rig
            .integrate([0.0; HEAVE_DIM], 0.0, 5.0, 0.2, DampingLaw::Linear)
            .expect("valid window");
        assert_eq!(a, b);
    }

    #[test]
    fn linear_mean_power_matches_constant_relative_velocity() {
        let rig = HeaveRig {
            pto_damping: 3.0,
            ..HeaveRig::default()
        };
        let samples = vec![[0.0, 0.0, 2.0, 0.0]; 8];
        let power = rig.mean_power(&samples, DampingLaw::Linear);
        assert!((power - 12.0).abs() < 1e-12);
    }

    #[test]
    fn mean_power_of_empty_series_is_zero() {
        let rig = HeaveRig::default();
        assert_eq!(rig.mean_power(&[], DampingLaw::Linear), 0.0);
    }

    #[test]
    fn zero_mass_is_rejected() {
        let rig = HeaveRig {
            osc_mass: 0.0,
            ..HeaveRig::default()
        };
        assert!(matches!(
            rig.validate(),
            Err(HeaveError::NonPositive {
                field: "osc_mass",
                ..
            })
        ));
    }

    #[test]
    fn reversed_window_is_rejected() {
        let rig = HeaveRig::default();
        let result = rig.integrate([0.0; HEAVE_DIM], 1.0, 0.0, 0.1, DampingLaw::Linear);
        assert!(matches!(result, Err(HeaveError::WindowReversed { .. })));
    }

    #[test]
    fn sweep_covers_the_whole_grid() {
        let rig = HeaveRig::default();
        let sweep = DampingSweep {
            damping_max: 2_000.0,
            damping_step: 1_000.0,
            exponent_max: 0.5,
            exponent_step: 0.5,
            cycles: 1.0,
            step: 0.5,
        };
        let outcome = rig.sweep_damping(&sweep).expect("valid sweep");
        assert_eq!(outcome.evaluations, 6);
        assert!(outcome.best_damping <= sweep.damping_max);
        assert!(outcome.best_exponent <= sweep.exponent_max);
        assert!(outcome.best_power >= 0.0);
    }

    #[test]
    fn zero_grid_step_is_rejected() {
        let rig = HeaveRig::default();
        let sweep = DampingSweep {
            damping_step: 0.0,
            ..DampingSweep::default()
        };
        assert!(matches!(
            rig.sweep_damping(&sweep),
            Err(HeaveError::StepInvalid { .. })
        ));
    }
}
