//! Resolved-rate inverse kinematics along a straight Cartesian line.
//!
//! The flange position is interpolated linearly between the current and the target pose. At
//! every step the Cartesian velocity towards the next interpolated point is mapped to joint
//! velocities through the pseudoinverse of the analytic Jacobian and integrated (Euler) over
//! the time step. The integration is open loop: forward kinematics is never consulted, so the
//! remaining error shrinks with the step size rather than being corrected.
//!
//! With [Tracking::Position] (the default) only the position is commanded and the orientation
//! of the flange is free to change along the path. [Tracking::HoldOrientation] additionally
//! commands zero angular velocity.

use nalgebra::{Matrix6, Vector6};
use tracing::{debug, warn};
use crate::jacobian::{analytic_jacobian, Jacobian, PSEUDO_INVERSE_EPSILON};
use crate::kinematic_traits::{Joints, Pose, Trajectory};
use crate::kinematics_error::KinematicsError;
use crate::parameters::dh_kinematics::DHParams;

/// Travel below this distance (meters) is treated as no travel at all.
pub const ZERO_TRAVEL: f64 = 1e-12;

/// Upper bound on the number of integration steps of a single call.
pub const MAX_STEPS: usize = 1_000_000;

/// What the integrator commands at each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tracking {
    /// Linear velocity only, 3 x 6 Jacobian
    #[default]
    Position,
    /// Linear velocity and zero angular velocity, 6 x 6 Jacobian
    HoldOrientation,
}

impl Tracking {
    /// Rank of the task Jacobian when the arm is not in a singular configuration
    pub fn full_rank(&self) -> usize {
        match self {
            Tracking::Position => 3,
            Tracking::HoldOrientation => 6,
        }
    }
}

/// Step size and behaviour of the integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkConfig {
    /// Integration time step
    pub delta_time: f64,

    /// Advance of the interpolation parameter per time unit. The parameter advances by
    /// `step_rate * delta_time` per step and the path is complete when it reaches 1.
    pub step_rate: f64,

    pub tracking: Tracking,

    /// Singular values of the Jacobian not above this are dropped when inverting
    pub pseudo_inverse_epsilon: f64,
}

impl Default for IkConfig {
    /// 100 steps per path, position tracking
    fn default() -> Self {
        IkConfig {
            delta_time: 0.01,
            step_rate: 1.0,
            tracking: Tracking::Position,
            pseudo_inverse_epsilon: PSEUDO_INVERSE_EPSILON,
        }
    }
}

impl IkConfig {
    /// Configuration that covers the path in the given number of equal steps.
    pub fn with_steps(steps: usize) -> Result<Self, KinematicsError> {
        if steps == 0 {
            return Err(KinematicsError::NonTermination("zero steps requested".to_string()));
        }
        let config = IkConfig {
            delta_time: 1.0 / steps as f64,
            step_rate: 1.0,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn tracking(self, tracking: Tracking) -> Self {
        IkConfig { tracking, ..self }
    }

    /// Advance of the interpolation parameter per step
    pub fn phi_increment(&self) -> f64 {
        self.step_rate * self.delta_time
    }

    /// Number of steps needed for the interpolation parameter to reach 1.
    pub fn steps(&self) -> usize {
        // Tolerate rounding in 1 / increment, as with 1 / 0.01
        ((1.0 / self.phi_increment()) - 1e-9).ceil().max(1.0) as usize
    }

    /// Rejects configurations where the interpolation would never complete.
    pub fn validate(&self) -> Result<(), KinematicsError> {
        if !self.delta_time.is_finite() || self.delta_time <= 0.0 {
            return Err(KinematicsError::NonTermination(format!(
                "delta_time must be finite and positive (got {})", self.delta_time
            )));
        }
        if !self.step_rate.is_finite() || self.step_rate <= 0.0 {
            return Err(KinematicsError::NonTermination(format!(
                "step_rate must be finite and positive (got {})", self.step_rate
            )));
        }
        let increment = self.phi_increment();
        if !increment.is_finite() || increment <= 0.0 || 1.0 / increment > MAX_STEPS as f64 {
            return Err(KinematicsError::NonTermination(format!(
                "step_rate * delta_time = {} needs more than {} steps", increment, MAX_STEPS
            )));
        }
        if !self.pseudo_inverse_epsilon.is_finite() || self.pseudo_inverse_epsilon < 0.0 {
            return Err(KinematicsError::InvalidParameter(format!(
                "pseudo_inverse_epsilon must be finite and not negative (got {})",
                self.pseudo_inverse_epsilon
            )));
        }
        Ok(())
    }
}

/// Trajectory with diagnostics of the integration.
#[derive(Debug, Clone)]
pub struct IkReport {
    /// One configuration per step, the initial configuration not included
    pub trajectory: Trajectory,

    /// Steps where the task Jacobian (the 3x6 linear rows when tracking position, the full
    /// 6x6 matrix when holding orientation) was rank deficient. The minimum norm joint
    /// velocities were used there.
    pub rank_deficient_steps: usize,

    /// Lowest rank of the task Jacobian seen along the path
    pub min_rank: usize,

    /// Steps where the full 6x6 Jacobian had rank below 6, whatever was tracked
    pub singular_steps: usize,

    /// Lowest rank of the full 6x6 Jacobian seen along the path
    pub min_full_rank: usize,
}

impl IkReport {
    /// Last configuration of the trajectory
    pub fn final_joints(&self) -> Option<&Joints> {
        self.trajectory.last()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InverseKinematics {
    parameters: DHParams,
    initial_joints: Joints,
    config: IkConfig,
}

impl InverseKinematics {
    /// Solver starting from the given joints, with the default configuration.
    pub fn new(parameters: DHParams, initial_joints: Joints) -> Self {
        InverseKinematics {
            parameters,
            initial_joints,
            config: IkConfig::default(),
        }
    }

    /// Solver with explicit step configuration. Fails if the configuration would not let
    /// the interpolation complete.
    pub fn with_config(parameters: DHParams, initial_joints: Joints, config: IkConfig)
                       -> Result<Self, KinematicsError> {
        config.validate()?;
        Ok(InverseKinematics { parameters, initial_joints, config })
    }

    pub fn initial_joints(&self) -> &Joints {
        &self.initial_joints
    }

    pub fn config(&self) -> &IkConfig {
        &self.config
    }

    /// Analytic Jacobian at the given joints. Joint 6 does not affect it.
    pub fn get_jacobian(&self, joints: &Joints) -> Matrix6<f64> {
        analytic_jacobian(&self.parameters, joints)
    }

    /// Joint trajectory that moves the flange on a straight line from the position of
    /// `current_pose` to the position of `target_pose`. The initial joints of the solver must
    /// correspond to `current_pose`. See the module documentation on orientation.
    pub fn linear_ik(&self, current_pose: &Pose, target_pose: &Pose) -> Result<Trajectory, KinematicsError> {
        Ok(self.linear_ik_report(current_pose, target_pose)?.trajectory)
    }

    /// As [InverseKinematics::linear_ik], also reporting singular configurations met on the way.
    pub fn linear_ik_report(&self, current_pose: &Pose, target_pose: &Pose) -> Result<IkReport, KinematicsError> {
        let start = current_pose.translation.vector;
        let end = target_pose.translation.vector;
        let tracking = self.config.tracking;

        if (end - start).norm() <= ZERO_TRAVEL {
            debug!("No travel between current and target pose");
            return Ok(IkReport {
                trajectory: vec![self.initial_joints],
                rank_deficient_steps: 0,
                min_rank: tracking.full_rank(),
                singular_steps: 0,
                min_full_rank: 6,
            });
        }

        let steps = self.config.steps();
        let increment = self.config.phi_increment();
        let delta_time = self.config.delta_time;

        let mut trajectory = Vec::with_capacity(steps);
        let mut rank_deficient_steps = 0;
        let mut min_rank = tracking.full_rank();
        let mut singular_steps = 0;
        let mut min_full_rank = 6;
        let mut joints = self.initial_joints;
        let mut previous = start;

        for step in 1..=steps {
            let phi = if step == steps { 1.0 } else { step as f64 * increment };
            let next = start.lerp(&end, phi);
            let velocity = (next - previous) / delta_time;

            let jacobian = Jacobian::new(self.get_jacobian(&joints), self.config.pseudo_inverse_epsilon);
            let (joint_velocities, rank, full_rank) = match tracking {
                Tracking::Position => {
                    let (joint_velocities, rank) = jacobian.solve_linear(&velocity)?;
                    (joint_velocities, rank, jacobian.rank()?)
                }
                Tracking::HoldOrientation => {
                    let (joint_velocities, rank) = jacobian.solve(
                        &Vector6::new(velocity.x, velocity.y, velocity.z, 0.0, 0.0, 0.0))?;
                    (joint_velocities, rank, rank)
                }
            };

            if rank < tracking.full_rank() {
                rank_deficient_steps += 1;
                debug!("step {step}: task Jacobian rank {rank} at {joints:?}");
            }
            if full_rank < 6 {
                singular_steps += 1;
                debug!("step {step}: Jacobian rank {full_rank} of 6 at {joints:?}");
            }
            min_rank = min_rank.min(rank);
            min_full_rank = min_full_rank.min(full_rank);

            for (q, dq) in joints.iter_mut().zip(joint_velocities.iter()) {
                *q += dq * delta_time;
            }
            trajectory.push(joints);
            previous = next;
        }

        if rank_deficient_steps > 0 {
            warn!("{rank_deficient_steps} of {steps} steps passed a singular configuration (rank down to {min_rank}), minimum norm solution used");
        } else if singular_steps > 0 {
            warn!("{singular_steps} of {steps} steps passed a singular configuration (Jacobian rank down to {min_full_rank} of 6)");
        }

        Ok(IkReport { trajectory, rank_deficient_steps, min_rank, singular_steps, min_full_rank })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use crate::forward_kinematics::ForwardKinematics;
    use crate::kinematic_traits::JOINTS_AT_ZERO;
    use crate::utils::{is_valid, translated};

    fn solver(initial: Joints, config: IkConfig) -> InverseKinematics {
        InverseKinematics::with_config(DHParams::a3c(), initial, config).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = IkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.steps(), 100);
        assert_eq!(config.tracking, Tracking::Position);
    }

    #[test]
    fn test_with_steps() {
        assert_eq!(IkConfig::with_steps(1).unwrap().steps(), 1);
        assert_eq!(IkConfig::with_steps(7).unwrap().steps(), 7);
        assert_eq!(IkConfig::with_steps(250).unwrap().steps(), 250);
        assert!(matches!(IkConfig::with_steps(0), Err(KinematicsError::NonTermination(_))));
    }

    #[test]
    fn test_steps_round_up() {
        let config = IkConfig { delta_time: 0.3, ..IkConfig::default() };
        assert_eq!(config.steps(), 4);
    }

    #[test]
    fn test_rejects_non_advancing_configuration() {
        for (delta_time, step_rate) in [(0.0, 1.0), (-0.1, 1.0), (0.1, 0.0), (0.1, -2.0),
                                        (f64::NAN, 1.0), (0.1, f64::INFINITY), (1e-300, 1e-300)] {
            let config = IkConfig { delta_time, step_rate, ..IkConfig::default() };
            let result = InverseKinematics::with_config(DHParams::a3c(), JOINTS_AT_ZERO, config);
            assert!(matches!(result, Err(KinematicsError::NonTermination(_))),
                    "delta_time {} step_rate {} accepted", delta_time, step_rate);
        }
    }

    #[test]
    fn test_rejects_negative_epsilon() {
        let config = IkConfig { pseudo_inverse_epsilon: -1e-6, ..IkConfig::default() };
        assert!(matches!(config.validate(), Err(KinematicsError::InvalidParameter(_))));
    }

    #[test]
    fn test_get_jacobian_at_home() {
        let ik = InverseKinematics::new(DHParams::a3c(), JOINTS_AT_ZERO);
        let jacobian = ik.get_jacobian(&JOINTS_AT_ZERO);
        let row0 = [-0.163, 0.626, 0.396, -0.1635, 0.166, 0.0];
        let row4 = [0.0, 1.0, 1.0, 0.0, 1.0, 0.0];
        let row5 = [1.0, 0.0, 0.0, 1.0, 0.0, 1.0];
        for j in 0..6 {
            assert!((jacobian[(0, j)] - row0[j]).abs() < 1e-2);
            assert!((jacobian[(4, j)] - row4[j]).abs() < 1e-2);
            assert!((jacobian[(5, j)] - row5[j]).abs() < 1e-2);
        }
    }

    #[test]
    fn test_zero_travel_is_single_step() {
        let initial = [0.2, 0.4, -0.9, 0.3, 0.6, 0.1];
        let fk = ForwardKinematics::default();
        let pose = fk.fk(&initial);
        let ik = InverseKinematics::new(DHParams::a3c(), initial);
        let trajectory = ik.linear_ik(&pose, &pose).unwrap();
        assert_eq!(trajectory, vec![initial]);
    }

    #[test]
    fn test_trajectory_length_follows_steps() {
        let initial = [0.2, 0.4, -0.9, 0.3, 0.6, 0.1];
        let fk = ForwardKinematics::default();
        let current = fk.fk(&initial);
        let target = translated(&current, &Vector3::new(0.01, 0.0, 0.0));

        let default_ik = InverseKinematics::new(DHParams::a3c(), initial);
        assert_eq!(default_ik.linear_ik(&current, &target).unwrap().len(), 100);

        let single = solver(initial, IkConfig::with_steps(1).unwrap());
        assert_eq!(single.linear_ik(&current, &target).unwrap().len(), 1);

        let odd = solver(initial, IkConfig { delta_time: 0.5, step_rate: 0.7, ..IkConfig::default() });
        assert_eq!(odd.linear_ik(&current, &target).unwrap().len(), 3);
    }

    #[test]
    fn test_reaches_target_position() {
        let initial = [0.2, 0.4, -0.9, 0.3, 0.6, 0.1];
        let fk = ForwardKinematics::default();
        let current = fk.fk(&initial);
        let target = translated(&current, &Vector3::new(0.03, -0.02, 0.025));

        let ik = InverseKinematics::new(DHParams::a3c(), initial);
        let report = ik.linear_ik_report(&current, &target).unwrap();
        assert_eq!(report.rank_deficient_steps, 0);
        assert_eq!(report.min_rank, 3);

        let reached = fk.fk(report.final_joints().unwrap());
        let error = (reached.translation.vector - target.translation.vector).norm();
        assert!(error < 1e-3, "Target missed by {}", error);
    }

    #[test]
    fn test_path_stays_on_line() {
        let initial = [0.2, 0.4, -0.9, 0.3, 0.6, 0.1];
        let fk = ForwardKinematics::default();
        let current = fk.fk(&initial);
        let delta = Vector3::new(0.03, -0.02, 0.025);
        let target = translated(&current, &delta);

        let ik = InverseKinematics::new(DHParams::a3c(), initial);
        let trajectory = ik.linear_ik(&current, &target).unwrap();
        let start = current.translation.vector;
        let direction = delta.normalize();
        for joints in &trajectory {
            let offset = fk.fk(joints).translation.vector - start;
            let off_line = (offset - direction * offset.dot(&direction)).norm();
            assert!(off_line < 1e-3, "Left the line by {}", off_line);
        }
    }

    #[test]
    fn test_finer_steps_are_more_accurate() {
        let initial = [0.2, 0.4, -0.9, 0.3, 0.6, 0.1];
        let fk = ForwardKinematics::default();
        let current = fk.fk(&initial);
        let target = translated(&current, &Vector3::new(0.03, -0.02, 0.025));

        let error = |steps: usize| {
            let ik = solver(initial, IkConfig::with_steps(steps).unwrap());
            let trajectory = ik.linear_ik(&current, &target).unwrap();
            let reached = fk.fk(trajectory.last().unwrap());
            (reached.translation.vector - target.translation.vector).norm()
        };
        assert!(error(100) < error(10));
        assert!(error(10) < error(1));
    }

    #[test]
    fn test_hold_orientation() {
        let initial = [0.3, -0.5, 1.2, 0.4, 1.0, 0.2];
        let fk = ForwardKinematics::default();
        let current = fk.fk(&initial);
        let target = translated(&current, &Vector3::new(0.03, -0.02, 0.025));

        let config = IkConfig::default().tracking(Tracking::HoldOrientation);
        let ik = solver(initial, config);
        let report = ik.linear_ik_report(&current, &target).unwrap();
        assert_eq!(report.min_rank, 6);
        // Holding orientation the task Jacobian is the full one
        assert_eq!(report.min_full_rank, report.min_rank);
        assert_eq!(report.singular_steps, report.rank_deficient_steps);

        let reached = fk.fk(report.final_joints().unwrap());
        let error = (reached.translation.vector - target.translation.vector).norm();
        assert!(error < 1e-3, "Target missed by {}", error);
        assert!(reached.rotation.angle_to(&current.rotation) < 5e-3);
    }

    #[test]
    fn test_singular_start_is_finite() {
        // Arm pointing straight up: only x translation is available at the first step
        let fk = ForwardKinematics::default();
        let current = fk.fk(&JOINTS_AT_ZERO);
        let target = translated(&current, &Vector3::new(0.02, 0.0, 0.0));

        let ik = InverseKinematics::new(DHParams::a3c(), JOINTS_AT_ZERO);
        let report = ik.linear_ik_report(&current, &target).unwrap();
        assert_eq!(report.trajectory.len(), 100);
        assert!(report.trajectory.iter().all(is_valid));
        assert!(report.rank_deficient_steps >= 1);
        assert_eq!(report.min_rank, 1);
        // The first step is taken at home where the full Jacobian has rank 3
        assert!(report.singular_steps >= report.rank_deficient_steps);
        assert!(report.min_full_rank <= 3);
    }

    #[test]
    fn test_singular_start_hold_orientation_is_finite() {
        let fk = ForwardKinematics::default();
        let current = fk.fk(&JOINTS_AT_ZERO);
        let target = translated(&current, &Vector3::new(0.0, 0.0, -0.05));

        let config = IkConfig::default().tracking(Tracking::HoldOrientation);
        let ik = solver(JOINTS_AT_ZERO, config);
        let report = ik.linear_ik_report(&current, &target).unwrap();
        assert!(report.trajectory.iter().all(is_valid));
        assert!(report.min_rank < 6);
    }
}
