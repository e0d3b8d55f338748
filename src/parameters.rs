//! Defines the DH parameter data structure

pub mod dh_kinematics {
    use crate::kinematics_error::KinematicsError;

    /// Link geometry of the arm, in meters. The Denavit-Hartenberg table of
    /// [ForwardKinematics](crate::forward_kinematics::ForwardKinematics) is built from these values
    /// and the analytic Jacobian of [InverseKinematics](crate::inverse_kinematics::InverseKinematics)
    /// is evaluated from the same values.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct DHParams {
        /// Height of the shoulder (joint 2) above the base plate, along the joint 1 axis.
        pub d1: f64,

        /// Offset along the joint 2 axis, from the base column to the upper arm plane.
        pub d2: f64,

        /// Offset along the joint 3 axis, back from the upper arm towards the forearm plane.
        pub d3: f64,

        /// Forearm length, from joint 3 to the wrist (joint 5).
        pub d4: f64,

        /// Offset along the joint 5 axis.
        pub d5: f64,

        /// Distance from joint 5 to the flange, along the joint 6 axis.
        pub d6: f64,

        /// Upper arm length, from joint 2 to joint 3.
        pub a2: f64,
    }

    impl DHParams {
        /// Parameters of the A3C arm.
        pub fn a3c() -> Self {
            DHParams {
                d1: 0.1915,
                d2: 0.1405,
                d3: 0.141,
                d4: 0.230,
                d5: 0.1635,
                d6: 0.166,
                a2: 0.230,
            }
        }

        /// Builds parameters and checks they describe a usable arm (see [DHParams::validate]).
        pub fn new(d1: f64, d2: f64, d3: f64, d4: f64, d5: f64, d6: f64, a2: f64)
                   -> Result<Self, KinematicsError> {
            let parameters = DHParams { d1, d2, d3, d4, d5, d6, a2 };
            parameters.validate()?;
            Ok(parameters)
        }

        /// All link constants must be finite and strictly positive.
        pub fn validate(&self) -> Result<(), KinematicsError> {
            for (name, value) in self.named() {
                if !value.is_finite() || value <= 0.0 {
                    return Err(KinematicsError::InvalidParameter(format!(
                        "{} must be finite and positive (got {})", name, value
                    )));
                }
            }
            Ok(())
        }

        /// Sideways offset of the wrist from the base axis that the joint 2 and
        /// joint 3 offsets leave uncompensated (d3 - d2). Joint 5 offset d5 comes on top of it.
        pub fn lateral_offset(&self) -> f64 {
            self.d3 - self.d2
        }

        /// Convert to string yaml representation (quick viewing, etc).
        pub fn to_yaml(&self) -> String {
            format!(
                "dh_parameters:\n  \
              d1: {}\n  \
              d2: {}\n  \
              d3: {}\n  \
              d4: {}\n  \
              d5: {}\n  \
              d6: {}\n  \
              a2: {}\n",
                self.d1, self.d2, self.d3, self.d4, self.d5, self.d6, self.a2
            )
        }

        pub(crate) fn named(&self) -> [(&'static str, f64); 7] {
            [
                ("d1", self.d1), ("d2", self.d2), ("d3", self.d3),
                ("d4", self.d4), ("d5", self.d5), ("d6", self.d6),
                ("a2", self.a2),
            ]
        }
    }

    impl Default for DHParams {
        fn default() -> Self {
            Self::a3c()
        }
    }
}
