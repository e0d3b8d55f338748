//! Supports extracting DH parameters and integrator settings from YAML file (optional)

use std::path::Path;
use yaml_rust2::{Yaml, YamlLoader};

use crate::inverse_kinematics::{IkConfig, Tracking};
use crate::kinematics_error::KinematicsError;
use crate::parameters::dh_kinematics::DHParams;

const DH_SECTION: &str = "dh_parameters";
const IK_SECTION: &str = "inverse_kinematics";

impl DHParams {
    /// Read the robot geometry from YAML file. YAML file like this is supported:
    /// ```yaml
    /// # A3C arm, meters
    /// dh_parameters:
    ///   d1: 0.1915
    ///   d2: 0.1405
    ///   d3: 0.141
    ///   d4: 0.230
    ///   d5: 0.1635
    ///   d6: 0.166
    ///   a2: 0.230
    /// ```
    /// All seven values are required and must be positive.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, KinematicsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, KinematicsError> {
        let doc = load_document(contents)?;
        let section = &doc[DH_SECTION];
        if section.is_badvalue() {
            return Err(KinematicsError::MissingField(DH_SECTION.to_string()));
        }

        let field = |name: &str| -> Result<f64, KinematicsError> {
            let value = &section[name];
            if value.is_badvalue() {
                return Err(KinematicsError::MissingField(format!("{}.{}", DH_SECTION, name)));
            }
            as_number(value).ok_or_else(|| KinematicsError::ParseError(format!(
                "{}.{} must be a number (got {:?})", DH_SECTION, name, value
            )))
        };

        DHParams::new(
            field("d1")?, field("d2")?, field("d3")?,
            field("d4")?, field("d5")?, field("d6")?,
            field("a2")?,
        )
    }
}

impl IkConfig {
    /// Read the integrator settings from the `inverse_kinematics` section of a YAML file:
    /// ```yaml
    /// inverse_kinematics:
    ///   delta_time: 0.01
    ///   step_rate: 1.0
    ///   tracking: position # or hold_orientation
    ///   pseudo_inverse_epsilon: 1.0e-6
    /// ```
    /// The section and each of its values are optional, defaults are used for what is missing.
    /// The resulting configuration is validated.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, KinematicsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, KinematicsError> {
        let doc = load_document(contents)?;
        let section = &doc[IK_SECTION];
        let mut config = IkConfig::default();
        if section.is_badvalue() {
            return Ok(config);
        }

        let optional = |name: &str| -> Result<Option<f64>, KinematicsError> {
            let value = &section[name];
            if value.is_badvalue() {
                return Ok(None);
            }
            as_number(value).map(Some).ok_or_else(|| KinematicsError::ParseError(format!(
                "{}.{} must be a number (got {:?})", IK_SECTION, name, value
            )))
        };

        if let Some(delta_time) = optional("delta_time")? {
            config.delta_time = delta_time;
        }
        if let Some(step_rate) = optional("step_rate")? {
            config.step_rate = step_rate;
        }
        if let Some(epsilon) = optional("pseudo_inverse_epsilon")? {
            config.pseudo_inverse_epsilon = epsilon;
        }
        let tracking = &section["tracking"];
        if !tracking.is_badvalue() {
            config.tracking = match tracking.as_str() {
                Some("position") => Tracking::Position,
                Some("hold_orientation") => Tracking::HoldOrientation,
                _ => return Err(KinematicsError::ParseError(format!(
                    "{}.tracking must be 'position' or 'hold_orientation' (got {:?})", IK_SECTION, tracking
                ))),
            };
        }

        config.validate()?;
        Ok(config)
    }
}

fn load_document(contents: &str) -> Result<Yaml, KinematicsError> {
    let mut docs = YamlLoader::load_from_str(contents)
        .map_err(|e| KinematicsError::ParseError(format!("{}", e)))?;
    if docs.is_empty() {
        return Err(KinematicsError::ParseError("empty YAML document".to_string()));
    }
    Ok(docs.swap_remove(0))
}

/// YAML integers (like `1`) are accepted where reals are expected.
fn as_number(value: &Yaml) -> Option<f64> {
    value.as_f64().or_else(|| value.as_i64().map(|i| i as f64))
}
