use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use yaml_rust2::{Yaml, YamlLoader};

// ---- Domain types ----

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pose {
    /// Translation in meters: [x, y, z]
    pub translation: [f64; 3],
    /// Quaternion in [x, y, z, w] ordering
    pub quaternion: [f64; 4],
}

#[derive(Debug, Clone)]
pub struct Case {
    pub id: i64,
    pub(crate) joints: [f64; 6], // degrees
    pub(crate) pose: Pose,
    /// Cartesian offset for the inverse kinematics check, if the case has one
    pub(crate) ik_delta: Option<[f64; 3]>,
}

impl Case {
    /// Returns joints converted from degrees to radians.
    #[inline]
    pub fn joints_in_radians(&self) -> [f64; 6] {
        std::array::from_fn(|i| self.joints[i].to_radians())
    }
}

// ---- Pose conversions ----

impl Pose {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        let translation = Translation3::new(self.translation[0], self.translation[1], self.translation[2]);

        // Adjusting quaternion creation to match [x, y, z, w] ordering
        let quaternion = UnitQuaternion::from_quaternion(Quaternion::new(
            self.quaternion[3], // w
            self.quaternion[0], // x
            self.quaternion[1], // y
            self.quaternion[2], // z
        ));

        Isometry3::from_parts(translation, quaternion)
    }
}

// ---- YAML I/O ----

fn numbers<const N: usize>(yaml: &Yaml, what: &str) -> Result<[f64; N]> {
    let items = yaml.as_vec().ok_or_else(|| anyhow!("{} must be a list", what))?;
    if items.len() != N {
        bail!("{} must have {} values, found {}", what, N, items.len());
    }
    let mut out = [0.0; N];
    for (i, item) in items.iter().enumerate() {
        out[i] = item
            .as_f64()
            .or_else(|| item.as_i64().map(|v| v as f64))
            .ok_or_else(|| anyhow!("{}[{}] is not a number", what, i))?;
    }
    Ok(out)
}

/// Load test cases from YAML.
/// - `file_path`: path to a YAML with a `cases` list of id, joints, pose and optional ik_delta.
pub(crate) fn load_yaml(file_path: impl AsRef<Path>) -> Result<Vec<Case>> {
    let p = file_path.as_ref();
    let contents = std::fs::read_to_string(p)
        .with_context(|| format!("Failed to read YAML file: {}", p.display()))?;

    let docs = YamlLoader::load_from_str(&contents).context("Failed to parse YAML")?;
    let root = docs.first().ok_or_else(|| anyhow!("Empty YAML file: {}", p.display()))?;
    let entries = root["cases"].as_vec().ok_or_else(|| anyhow!("No 'cases' list"))?;

    let mut cases = Vec::with_capacity(entries.len());
    for c in entries {
        let id = c["id"].as_i64().ok_or_else(|| anyhow!("Case without id"))?;
        let ik_delta = match &c["ik_delta"] {
            Yaml::BadValue => None,
            delta => Some(numbers(delta, "ik_delta").with_context(|| format!("case {}", id))?),
        };
        cases.push(Case {
            id,
            joints: numbers(&c["joints"], "joints").with_context(|| format!("case {}", id))?,
            pose: Pose {
                translation: numbers(&c["pose"]["translation"], "translation")
                    .with_context(|| format!("case {}", id))?,
                quaternion: numbers(&c["pose"]["quaternion"], "quaternion")
                    .with_context(|| format!("case {}", id))?,
            },
            ik_delta,
        });
    }
    Ok(cases)
}
