//! Helper functions

use nalgebra::{Translation3, Vector3};
use crate::kinematic_traits::{Joints, Pose, Trajectory};
use crate::kinematics_error::KinematicsError;

/// Checks if all elements in the array are finite
pub fn is_valid(qs: &Joints) -> bool {
    qs.iter().all(|&q| q.is_finite())
}

/// Converts a slice into joints. Only slices of exactly six values are accepted.
pub fn joints_from_slice(values: &[f64]) -> Result<Joints, KinematicsError> {
    values.try_into().map_err(|_| KinematicsError::InvalidLength {
        expected: 6,
        found: values.len(),
    })
}

/// Same pose with the position shifted by the Cartesian delta. Orientation is kept.
pub fn translated(pose: &Pose, delta: &Vector3<f64>) -> Pose {
    Pose::from_parts(
        Translation3::from(pose.translation.vector + delta),
        pose.rotation,
    )
}

/// Print joint values, converting radians to degrees.
#[allow(dead_code)]
pub fn dump_joints(joints: &Joints) {
    println!("{}", format_joints(joints));
}

/// Print all configurations of the trajectory, converting radians to degrees.
#[allow(dead_code)]
pub fn dump_trajectory(trajectory: &Trajectory) {
    if trajectory.is_empty() {
        println!("Empty trajectory");
    }
    for joints in trajectory {
        println!("{}", format_joints(joints));
    }
}

pub(crate) fn format_joints(joints: &Joints) -> String {
    let mut row_str = String::new();
    for joint_idx in 0..6 {
        let computed = joints[joint_idx];
        row_str.push_str(&format!("{:5.2} ", computed.to_degrees()));
    }
    format!("[{}]", row_str.trim_end())
}

/// Allows to specify joint values in degrees (converts to radians)
#[allow(dead_code)]
pub fn as_radians(degrees: [i32; 6]) -> Joints {
    std::array::from_fn(|i| (degrees[i] as f64).to_radians())
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use super::*;

    #[test]
    fn test_is_valid_with_all_finite() {
        let qs = [0.0, 1.0, -1.0, 0.5, -0.5, PI];
        assert!(is_valid(&qs));
    }

    #[test]
    fn test_is_valid_with_nan() {
        let qs = [0.0, f64::NAN, 1.0, -1.0, 0.5, -0.5];
        assert!(!is_valid(&qs));
    }

    #[test]
    fn test_is_valid_with_infinity() {
        let qs = [0.0, 1.0, f64::INFINITY, -1.0, 0.5, -0.5];
        assert!(!is_valid(&qs));
    }

    #[test]
    fn test_joints_from_slice() {
        let joints = joints_from_slice(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]).unwrap();
        assert_eq!(joints, [0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);

        match joints_from_slice(&[0.1; 7]) {
            Err(KinematicsError::InvalidLength { expected: 6, found: 7 }) => {}
            other => panic!("Expected InvalidLength, got {:?}", other),
        }
        assert!(joints_from_slice(&[]).is_err());
    }

    #[test]
    fn test_translated_keeps_rotation() {
        let pose = Pose::new(Vector3::new(0.1, 0.2, 0.3), Vector3::new(0.0, 0.0, 1.0));
        let moved = translated(&pose, &Vector3::new(0.01, -0.02, 0.03));
        assert_eq!(moved.rotation, pose.rotation);
        assert!((moved.translation.vector - Vector3::new(0.11, 0.18, 0.33)).norm() < 1e-12);
    }

    #[test]
    fn test_as_radians() {
        let joints = as_radians([0, 90, -90, 180, 0, 45]);
        assert_eq!(joints[0], 0.0);
        assert!((joints[1] - PI / 2.0).abs() < 1e-12);
        assert!((joints[3] - PI).abs() < 1e-12);
    }

    #[test]
    fn test_format_joints() {
        assert_eq!(format_joints(&[0.0, PI / 2.0, 0.0, 0.0, 0.0, 0.0]),
                   "[ 0.00 90.00  0.00  0.00  0.00  0.00]");
    }
}
