//! Jacobian of the A3C arm: the closed form expression used by the inverse kinematics,
//! a numerical (finite difference) variant for any [Kinematics] implementation, and the
//! pseudo-inverse based mapping from end-effector velocities to joint velocities.

extern crate nalgebra as na;
use na::{Isometry3, Matrix3x6, Matrix6, Vector3, Vector6};
use na::linalg::SVD;
use rayon::prelude::*;
use crate::kinematic_traits::{Joints, Kinematics};
use crate::kinematics_error::KinematicsError;
use crate::parameters::dh_kinematics::DHParams;

/// Default threshold below which singular values are treated as zero
pub const PSEUDO_INVERSE_EPSILON: f64 = 1e-6;

/// Struct representing the Jacobian matrix
#[derive(Debug, Clone, Copy)]
pub struct Jacobian {
    /// A 6x6 matrix representing the Jacobian
    ///
    /// The Jacobian matrix maps the joint velocities to the end-effector velocities.
    /// Each column corresponds to a joint, rows 0..3 are the linear velocity and
    /// rows 3..6 the angular velocity of the flange.
    matrix: Matrix6<f64>,

    /// Singular values not above this value are dropped when inverting
    epsilon: f64,
}

impl Jacobian {
    pub fn new(matrix: Matrix6<f64>, epsilon: f64) -> Self {
        Self { matrix, epsilon }
    }

    /// Closed form Jacobian of the arm with the given parameters, see [analytic_jacobian].
    pub fn analytic(parameters: &DHParams, qs: &Joints) -> Self {
        Self::new(analytic_jacobian(parameters, qs), PSEUDO_INVERSE_EPSILON)
    }

    /// Jacobian obtained by perturbing the joints of any robot, see [compute_jacobian].
    pub fn numerical(robot: &(impl Kinematics + Sync), qs: &Joints, disturbance: f64) -> Self {
        Self::new(compute_jacobian(robot, qs, disturbance), PSEUDO_INVERSE_EPSILON)
    }

    pub fn matrix(&self) -> &Matrix6<f64> {
        &self.matrix
    }

    /// Numerical rank of the full Jacobian. Below 6 means the configuration is singular.
    pub fn rank(&self) -> Result<usize, KinematicsError> {
        let epsilon = self.checked_epsilon()?;
        Ok(SVD::new(self.matrix, false, false).rank(epsilon))
    }

    /// Numerical rank of the linear velocity rows. Below 3 means some flange
    /// translation directions cannot be produced from this configuration.
    pub fn linear_rank(&self) -> Result<usize, KinematicsError> {
        let epsilon = self.checked_epsilon()?;
        Ok(SVD::new(self.linear_rows(), false, false).rank(epsilon))
    }

    /// Computes the joint velocities required to achieve a desired end-effector velocity
    ///
    /// # Arguments
    ///
    /// * `desired_end_effector_velocity` - An Isometry3 representing the desired linear and angular velocity of the end-effector
    ///
    /// # Returns
    ///
    /// Joint positions, with values representing joint velocities rather than angles,
    /// or an error if the computation fails.
    pub fn velocities(&self, desired_end_effector_velocity: &Isometry3<f64>) -> Result<Joints, KinematicsError> {
        self.velocities_from_vector(&twist(desired_end_effector_velocity))
    }

    /// Computes the joint velocities required to achieve a desired end-effector velocity,
    /// given as a 6D vector (linear, then angular). The pseudoinverse gives the minimum norm
    /// solution also when the Jacobian is singular.
    pub fn velocities_from_vector(&self, desired_end_effector_velocity: &Vector6<f64>) -> Result<Joints, KinematicsError> {
        Ok(self.solve(desired_end_effector_velocity)?.0)
    }

    /// Joint velocities that produce the given linear velocity of the flange while leaving
    /// its angular velocity unconstrained.
    pub fn linear_velocities(&self, desired_linear_velocity: &Vector3<f64>) -> Result<Joints, KinematicsError> {
        Ok(self.solve_linear(desired_linear_velocity)?.0)
    }

    /// Computes the joint torques required to achieve a desired end-effector force/torque
    ///
    /// # Arguments
    ///
    /// * `desired_force_torque` - isometry structure representing forces and torques
    ///                            rather than dimensions and angles.
    pub fn torques(&self, desired_force_torque: &Isometry3<f64>) -> Joints {
        self.torques_from_vector(&twist(desired_force_torque))
    }

    /// Computes the joint torques required to achieve a desired end-effector force/torque,
    /// given as a 6D vector (force, then torque).
    pub fn torques_from_vector(&self, desired_force_torque: &Vector6<f64>) -> Joints {
        let joint_torques = self.matrix.transpose() * desired_force_torque;
        vector6_to_joints(joint_torques)
    }

    /// Joint velocities and the rank of the full Jacobian.
    pub(crate) fn solve(&self, velocity: &Vector6<f64>) -> Result<(Joints, usize), KinematicsError> {
        let epsilon = self.checked_epsilon()?;
        let svd = SVD::new(self.matrix, true, true);
        let rank = svd.rank(epsilon);
        let pseudoinverse = svd
            .pseudo_inverse(epsilon)
            .map_err(|e| KinematicsError::PseudoInverse(e.to_string()))?;
        Ok((vector6_to_joints(pseudoinverse * velocity), rank))
    }

    /// Joint velocities and the rank of the linear rows.
    pub(crate) fn solve_linear(&self, velocity: &Vector3<f64>) -> Result<(Joints, usize), KinematicsError> {
        let epsilon = self.checked_epsilon()?;
        let svd = SVD::new(self.linear_rows(), true, true);
        let rank = svd.rank(epsilon);
        let pseudoinverse = svd
            .pseudo_inverse(epsilon)
            .map_err(|e| KinematicsError::PseudoInverse(e.to_string()))?;
        Ok((vector6_to_joints(pseudoinverse * velocity), rank))
    }

    /// SVD rank and pseudo-inverse both need a non-negative threshold.
    fn checked_epsilon(&self) -> Result<f64, KinematicsError> {
        if self.epsilon >= 0.0 {
            Ok(self.epsilon)
        } else {
            Err(KinematicsError::PseudoInverse(format!(
                "epsilon must be non-negative, got {}", self.epsilon)))
        }
    }

    fn linear_rows(&self) -> Matrix3x6<f64> {
        self.matrix.fixed_rows::<3>(0).into_owned()
    }
}

/// Closed form geometric Jacobian of the arm at the given joint angles.
///
/// The expression follows from the DH table (see [crate::dh_table]) and only depends on
/// `a2`, `d4`, `d5`, `d6` and the lateral offset `d3 - d2`; the base height `d1` and joint 6 do
/// not enter. Column 6 of the linear rows is zero as the flange origin lies on the joint 6 axis.
pub fn analytic_jacobian(p: &DHParams, qs: &Joints) -> Matrix6<f64> {
    let (s1, c1) = qs[0].sin_cos();
    let (s2, c2) = qs[1].sin_cos();
    let (s23, c23) = (qs[1] + qs[2]).sin_cos();
    let (s4, c4) = qs[3].sin_cos();
    let (s5, c5) = qs[4].sin_cos();

    // Reach of the forearm and wrist beyond joint 3, in the arm plane, and its
    // derivative in height
    let reach = p.d4 * c23 + p.d6 * c5 * c23 + p.d5 * s4 * s23 - p.d6 * s5 * c4 * s23;
    let drop = p.d5 * s4 * c23 - p.d6 * s5 * c4 * c23 - p.d6 * s23 * c5 - p.d4 * s23;
    // Sideways offset of the flange from the arm plane
    let lateral = p.lateral_offset() - p.d5 * c4 - p.d6 * s4 * s5;

    let shoulder_drop = drop - p.a2 * s2;
    let shoulder_reach = reach + p.a2 * c2;

    let u = p.d5 * c4 + p.d6 * s4 * s5;
    let w = p.d5 * s4 - p.d6 * s5 * c4;
    let k = c4 * c5 * c23 - s5 * s23;
    let m = c4 * c23 * s5 + s23 * c5;

    #[rustfmt::skip]
    let jacobian = Matrix6::new(
        // Linear velocity
        s1 * shoulder_drop + c1 * lateral, c1 * shoulder_reach, c1 * reach,
        s1 * w - c1 * c23 * u, p.d6 * (c1 * k - s1 * s4 * c5), 0.0,

        s1 * lateral - c1 * shoulder_drop, s1 * shoulder_reach, s1 * reach,
        -s1 * c23 * u - c1 * w, p.d6 * (s1 * k + c1 * s4 * c5), 0.0,

        0.0, shoulder_drop, drop,
        s23 * u, -p.d6 * (s5 * c23 + s23 * c4 * c5), 0.0,

        // Angular velocity, the joint axes in the base frame
        0.0, -s1, -s1,
        s23 * c1, -c1 * c23 * s4 - s1 * c4, c1 * m - s1 * s4 * s5,

        0.0, c1, c1,
        s1 * s23, -s1 * c23 * s4 + c1 * c4, s1 * m + c1 * s4 * s5,

        1.0, 0.0, 0.0,
        c23, s23 * s4, c5 * c23 - s5 * s23 * c4,
    );
    jacobian
}

/// Function to compute the Jacobian matrix for a given robot and joint configuration
///
/// # Arguments
///
/// * `robot` - A reference to the robot implementing the Kinematics trait
/// * `joints` - A reference to the joint configuration
/// * `epsilon` - A small value used for numerical differentiation
///
/// # Returns
///
/// A 6x6 matrix representing the Jacobian
pub fn compute_jacobian(robot: &(impl Kinematics + Sync), joints: &Joints, epsilon: f64) -> Matrix6<f64> {
    let mut jacobian = Matrix6::zeros();
    let current_pose = robot.forward(joints);
    let current_position = current_pose.translation.vector;
    let current_orientation = current_pose.rotation;

    let jacobian_columns: Vec<_> = (0..6).into_par_iter().map(|i| {
        let mut perturbed_qs = *joints;
        perturbed_qs[i] += epsilon;
        let perturbed_pose = robot.forward(&perturbed_qs);
        let perturbed_position = perturbed_pose.translation.vector;
        let perturbed_orientation = perturbed_pose.rotation;

        let delta_position = (perturbed_position - current_position) / epsilon;
        let delta_orientation = (perturbed_orientation * current_orientation.inverse()).scaled_axis() / epsilon;

        (delta_position, delta_orientation)
    }).collect();

    for (i, (delta_position, delta_orientation)) in jacobian_columns.into_iter().enumerate() {
        jacobian.fixed_view_mut::<3, 1>(0, i).copy_from(&delta_position);
        jacobian.fixed_view_mut::<3, 1>(3, i).copy_from(&delta_orientation);
    }

    jacobian
}

fn twist(isometry: &Isometry3<f64>) -> Vector6<f64> {
    let linear = isometry.translation.vector;
    let angular = isometry.rotation.scaled_axis();
    Vector6::new(linear.x, linear.y, linear.z, angular.x, angular.y, angular.z)
}

fn vector6_to_joints(v: Vector6<f64>) -> Joints {
    [v[0], v[1], v[2], v[3], v[4], v[5]]
}
