//! JSON scene descriptions.
//!
//! ```json
//! {
//!   "camera": { "image_width": 400, "look_from": [0, 0, 0] },
//!   "materials": {
//!     "ground": { "type": "lambertian", "albedo": [0.8, 0.8, 0.0] },
//!     "glass": { "type": "dielectric", "refraction_index": 1.5 }
//!   },
//!   "spheres": [
//!     { "center": [0, -100.5, -1], "radius": 100, "material": "ground" },
//!     { "center": [0, 0, -1], "radius": 0.5, "material": "glass" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use ember_renderer::{
    CameraConfig, Color, Dielectric, HittableList, Lambertian, Material, Metal, Point3, Sphere,
};
use serde::Deserialize;
use thiserror::Error;

use crate::scenes::Scene;

/// Errors that can occur while loading a scene file.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Sphere {index} references unknown material '{name}'")]
    UnknownMaterial { index: usize, name: String },

    #[error("Material '{name}' is invalid: {reason}")]
    InvalidMaterial { name: String, reason: String },
}

/// Material entry in a scene file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDesc {
    Lambertian {
        albedo: Color,
    },
    Metal {
        albedo: Color,
        #[serde(default)]
        fuzz: f64,
    },
    Dielectric {
        refraction_index: f64,
    },
}

impl MaterialDesc {
    fn build(&self, name: &str) -> Result<Arc<dyn Material>, SceneError> {
        let material: Arc<dyn Material> = match *self {
            MaterialDesc::Lambertian { albedo } => Arc::new(Lambertian::new(albedo)),
            MaterialDesc::Metal { albedo, fuzz } => Arc::new(Metal::new(albedo, fuzz)),
            MaterialDesc::Dielectric { refraction_index } => {
                let dielectric = Dielectric::try_new(refraction_index).map_err(|err| {
                    SceneError::InvalidMaterial {
                        name: name.to_string(),
                        reason: err.to_string(),
                    }
                })?;
                Arc::new(dielectric)
            }
        };
        Ok(material)
    }
}

/// Sphere entry in a scene file.
#[derive(Debug, Clone, Deserialize)]
pub struct SphereDesc {
    pub center: Point3,
    pub radius: f64,
    pub material: String,
}

/// Top level of a scene file.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDesc {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialDesc>,
    #[serde(default)]
    pub spheres: Vec<SphereDesc>,
}

impl SceneDesc {
    /// Resolve material names and build the world.
    pub fn build(&self) -> Result<Scene, SceneError> {
        let materials = self
            .materials
            .iter()
            .map(|(name, desc)| -> Result<_, SceneError> { Ok((name.as_str(), desc.build(name)?)) })
            .collect::<Result<BTreeMap<_, _>, SceneError>>()?;

        let mut world = HittableList::new();
        for (index, sphere) in self.spheres.iter().enumerate() {
            let material = materials
                .get(sphere.material.as_str())
                .ok_or_else(|| SceneError::UnknownMaterial {
                    index,
                    name: sphere.material.clone(),
                })?;
            world.add(Box::new(Sphere::new(sphere.center, sphere.radius, Arc::clone(material))));
        }

        log::debug!(
            "Built scene with {} materials and {} spheres",
            materials.len(),
            world.len()
        );

        Ok(Scene {
            camera: self.camera.clone(),
            world,
        })
    }
}

/// Parse a scene from JSON text.
pub fn parse_scene(json: &str) -> Result<Scene, SceneError> {
    let desc: SceneDesc = serde_json::from_str(json)?;
    desc.build()
}

/// Load a scene from a JSON file.
pub fn load_scene(path: impl AsRef<Path>) -> Result<Scene, SceneError> {
    let path = path.as_ref();
    log::info!("Loading scene file {}", path.display());
    let json = std::fs::read_to_string(path)?;
    parse_scene(&json)
}
