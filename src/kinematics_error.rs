//! Error handling for kinematics, inverse kinematics configuration and parameter loading

use std::io;

/// Unified error for invalid input, unusable solver configuration and parameter file failures.
#[derive(Debug)]
pub enum KinematicsError {
    IoError(io::Error),
    ParseError(String),
    MissingField(String),
    InvalidParameter(String),
    InvalidLength { expected: usize, found: usize },
    NonTermination(String),
    PseudoInverse(String),
}

impl std::fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            KinematicsError::IoError(ref err) =>
                write!(f, "IO Error: {}", err),
            KinematicsError::ParseError(ref msg) =>
                write!(f, "Parse Error: {}", msg),
            KinematicsError::MissingField(ref field) =>
                write!(f, "Missing Field: {}", field),
            KinematicsError::InvalidParameter(ref msg) =>
                write!(f, "Invalid Parameter: {}", msg),
            KinematicsError::InvalidLength { expected, found } =>
                write!(f, "Invalid Length: expected {}, found {}", expected, found),
            KinematicsError::NonTermination(ref msg) =>
                write!(f, "Interpolation would not terminate: {}", msg),
            KinematicsError::PseudoInverse(ref msg) =>
                write!(f, "Pseudoinverse Error: {}", msg),
        }
    }
}

impl std::error::Error for KinematicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KinematicsError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for KinematicsError {
    fn from(err: io::Error) -> Self {
        KinematicsError::IoError(err)
    }
}
