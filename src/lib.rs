//! Forward kinematics and resolved-rate inverse kinematics for the A3C six-axis serial arm.
//!
//! The arm is described by seven Denavit-Hartenberg constants (`d1` .. `d6` and `a2`, see
//! [DHParams](parameters::dh_kinematics::DHParams)). Forward kinematics chains the six joint
//! transforms of the DH table; inverse kinematics follows a straight Cartesian line by
//! integrating joint velocities obtained from the pseudoinverse of the closed form Jacobian.
//!
//! # Features
//!
//! - Forward kinematics returns the flange pose as `nalgebra::Isometry3` (position and unit quaternion).
//! - Analytic 6x6 geometric Jacobian, derived from the same DH parameters as the forward kinematics,
//!   and a numerical Jacobian for cross-checking.
//! - Straight line inverse kinematics with configurable step size. Position is tracked by default,
//!   orientation can optionally be held.
//! - Singular configurations do not fail: the minimum norm joint velocities are used and the
//!   rank deficiency is reported.
//! - Parameters and integrator settings can be read from YAML (feature `allow_filesystem`).
//!
//! ```
//! use nalgebra::Vector3;
//! use a3c_kinematics::forward_kinematics::ForwardKinematics;
//! use a3c_kinematics::inverse_kinematics::InverseKinematics;
//! use a3c_kinematics::parameters::dh_kinematics::DHParams;
//! use a3c_kinematics::utils::translated;
//!
//! let fk = ForwardKinematics::new(DHParams::a3c());
//! let joints = [0.2, 0.4, -0.9, 0.3, 0.6, 0.1];
//! let current = fk.fk(&joints);
//! let target = translated(&current, &Vector3::new(0.03, -0.02, 0.025));
//!
//! let ik = InverseKinematics::new(DHParams::a3c(), joints);
//! let trajectory = ik.linear_ik(&current, &target).unwrap();
//! let reached = fk.fk(trajectory.last().unwrap());
//! assert!((reached.translation.vector - target.translation.vector).norm() < 1e-3);
//! ```

pub mod parameters;

#[cfg(feature = "allow_filesystem")]
pub mod parameters_from_file;

pub mod kinematics_error;
pub mod utils;
pub mod kinematic_traits;

pub mod dh_table;
pub mod forward_kinematics;

pub mod jacobian;
pub mod inverse_kinematics;

#[cfg(test)]
#[cfg(feature = "allow_filesystem")]
mod tests;
