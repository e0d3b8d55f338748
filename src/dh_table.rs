//! Denavit-Hartenberg table of the arm and the per-joint homogeneous transform.
//!
//! The table uses the modified (Craig) convention: the transform of a row is
//! `Rx(alpha) * Tx(a) * Rz(theta) * Tz(d)`, so that the joint axis of row `i` is the z axis
//! of the frame obtained after applying rows `0..=i`.

use std::f64::consts::FRAC_PI_2;
use nalgebra::Matrix4;
use crate::kinematic_traits::Joints;
use crate::parameters::dh_kinematics::DHParams;

/// One row of the DH table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DHRow {
    /// Twist about the previous x axis
    pub alpha: f64,
    /// Link length along the previous x axis
    pub a: f64,
    /// Offset along the joint (z) axis
    pub d: f64,
    /// Rotation about the joint axis. Holds the constant zero offset of the joint in the table.
    pub theta: f64,
}

impl DHRow {
    pub const fn new(alpha: f64, a: f64, d: f64, theta: f64) -> Self {
        DHRow { alpha, a, d, theta }
    }

    /// Copy of this row with the joint angle added to theta.
    pub fn rotated(&self, joint_angle: f64) -> Self {
        DHRow { theta: self.theta + joint_angle, ..*self }
    }

    /// Homogeneous transform of this row. Defined for any real angles.
    pub fn transform(&self) -> Matrix4<f64> {
        let (st, ct) = self.theta.sin_cos();
        let (sa, ca) = self.alpha.sin_cos();

        Matrix4::new(
            ct, -st, 0.0, self.a,
            st * ca, ct * ca, -sa, -sa * self.d,
            st * sa, ct * sa, ca, ca * self.d,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

/// The six rows of the arm, joint 1 first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DHTable {
    rows: [DHRow; 6],
}

impl DHTable {
    pub fn new(p: &DHParams) -> Self {
        DHTable {
            rows: [
                DHRow::new(0.0, 0.0, p.d1, 0.0),
                DHRow::new(-FRAC_PI_2, 0.0, p.d2, -FRAC_PI_2),
                DHRow::new(0.0, p.a2, -p.d3, FRAC_PI_2),
                DHRow::new(FRAC_PI_2, 0.0, p.d4, 0.0),
                DHRow::new(-FRAC_PI_2, 0.0, p.d5, 0.0),
                DHRow::new(FRAC_PI_2, 0.0, p.d6, FRAC_PI_2),
            ],
        }
    }

    pub fn rows(&self) -> &[DHRow; 6] {
        &self.rows
    }

    pub fn row(&self, joint: usize) -> &DHRow {
        &self.rows[joint]
    }

    /// Rows with the given joint angles applied. The table itself stays untouched.
    pub fn rotated(&self, joints: &Joints) -> [DHRow; 6] {
        std::array::from_fn(|i| self.rows[i].rotated(joints[i]))
    }
}
