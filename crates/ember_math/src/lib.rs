//! Ember math types.
//!
//! Double precision vectors (glam's `DVec3`), rays, intervals and the
//! sampling helpers shared by the renderer.

pub use glam;
pub use glam::DVec3;

mod interval;
mod ray;
mod vec3;

pub use interval::Interval;
pub use ray::Ray;
pub use vec3::{
    random_f64, random_f64_range, random_in_unit_disk, random_on_hemisphere, random_unit_vector,
    random_vec3, random_vec3_range, reflect, refract, Vec3Ext,
};

/// 3-component vector.
pub type Vec3 = DVec3;

/// A position in world space.
pub type Point3 = DVec3;
