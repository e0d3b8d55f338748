//! Common types and the forward kinematics trait

extern crate nalgebra as na;

use na::Isometry3;

/// Pose is used a pose of the robot flange. It contains both Cartesian position and rotation quaternion
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(0.0, 0.163, 0.8175);
/// // The quaternion should be normalized to represent a valid rotation.
/// let rotation = UnitQuaternion::from_quaternion(na::Quaternion::new(1.0, 0.0, 0.0, 1.0).normalize());
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Rotation angles of the six revolute joints, in radians. Index 0 is the base joint.
pub type Joints = [f64; 6];

/// Sequence of joint configurations produced by the inverse kinematics integrator.
pub type Trajectory = Vec<Joints>;

/// The home position of the arm, all joints at zero (arm pointing straight up).
#[allow(dead_code)]
pub const JOINTS_AT_ZERO: Joints = [0.0; 6];

pub trait Kinematics {
    /// Computes the pose of the robot flange for the given joint angles.
    fn forward(&self, qs: &Joints) -> Pose;
}
