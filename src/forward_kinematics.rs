//! Forward kinematics of the A3C arm over its DH table

use nalgebra::{Matrix4, Rotation3, Translation3, UnitQuaternion};
use crate::dh_table::{DHRow, DHTable};
use crate::kinematic_traits::{Joints, Kinematics, Pose};
use crate::kinematics_error::KinematicsError;
use crate::parameters::dh_kinematics::DHParams;
use crate::utils::joints_from_slice;

#[derive(Debug, Clone, Copy)]
pub struct ForwardKinematics {
    parameters: DHParams,
    table: DHTable,
}

impl ForwardKinematics {
    /// Creates a new `ForwardKinematics` instance with the given parameters.
    pub fn new(parameters: DHParams) -> Self {
        ForwardKinematics {
            parameters,
            table: DHTable::new(&parameters),
        }
    }

    pub fn parameters(&self) -> &DHParams {
        &self.parameters
    }

    pub fn table(&self) -> &DHTable {
        &self.table
    }

    /// Pose of the flange for the given joint angles (radians).
    pub fn fk(&self, joints: &Joints) -> Pose {
        pose_from_transform(&self.fk_transform(joints))
    }

    /// As [ForwardKinematics::fk], for joint values that come as a slice (files, command line).
    /// Anything but six values is rejected before computing.
    pub fn fk_from_slice(&self, joints: &[f64]) -> Result<Pose, KinematicsError> {
        Ok(self.fk(&joints_from_slice(joints)?))
    }

    /// Homogeneous transform from the base to the flange.
    pub fn fk_transform(&self, joints: &Joints) -> Matrix4<f64> {
        self.table
            .rotated(joints)
            .iter()
            .fold(Matrix4::identity(), |t, row| t * self.transformation_matrix(row))
    }

    /// Transforms from the base to each joint frame, joint 1 first. The last one is the flange.
    pub fn link_transforms(&self, joints: &Joints) -> [Matrix4<f64>; 6] {
        let rows = self.table.rotated(joints);
        let mut frames = [Matrix4::identity(); 6];
        let mut t = Matrix4::identity();
        for (i, row) in rows.iter().enumerate() {
            t *= self.transformation_matrix(row);
            frames[i] = t;
        }
        frames
    }

    /// Homogeneous transform of a single DH row.
    pub fn transformation_matrix(&self, row: &DHRow) -> Matrix4<f64> {
        row.transform()
    }
}

impl Default for ForwardKinematics {
    fn default() -> Self {
        Self::new(DHParams::a3c())
    }
}

impl Kinematics for ForwardKinematics {
    fn forward(&self, qs: &Joints) -> Pose {
        self.fk(qs)
    }
}

/// Builds the pose from the translation column and the rotation block of a homogeneous transform.
pub fn pose_from_transform(t: &Matrix4<f64>) -> Pose {
    let translation = Translation3::new(t[(0, 3)], t[(1, 3)], t[(2, 3)]);
    let rotation = Rotation3::from_matrix_unchecked(t.fixed_view::<3, 3>(0, 0).into_owned());
    Pose::from_parts(translation, UnitQuaternion::from_rotation_matrix(&rotation))
}
