//! Ember renderer - CPU path tracing.
//!
//! A Monte Carlo ray tracer for scenes built from spheres with Lambertian,
//! metal and dielectric materials.
//!
//! The core is single-threaded and takes its random source explicitly, so a
//! seeded generator reproduces a render bit for bit. [`render_parallel`]
//! layers rayon bucket rendering on top without changing per-sample logic.

mod bucket;
mod camera;
mod hittable;
mod material;
mod renderer;
mod sphere;

pub use bucket::{
    generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, DEFAULT_BUCKET_SIZE,
};
pub use camera::{Camera, CameraConfig, CameraError};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Color, Dielectric, Lambertian, Material, MaterialError, Metal, ScatterResult};
pub use renderer::{color_to_rgb, linear_to_gamma, ray_color, render, render_pixel, ImageBuffer};
pub use sphere::Sphere;

/// Re-export common math types from ember_math
pub use ember_math::{Interval, Point3, Ray, Vec3};
