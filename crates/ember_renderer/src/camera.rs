//! Camera for ray generation.

use crate::{renderer, Hittable, ImageBuffer};
use ember_math::{random_f64, random_in_unit_disk, Point3, Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a camera is built from an invalid configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("aspect ratio must be positive, got {0}")]
    InvalidAspectRatio(f64),

    #[error("image width must be positive, got {0}")]
    InvalidImageWidth(u32),

    #[error("samples per pixel must be positive, got {0}")]
    InvalidSamplesPerPixel(u32),

    #[error("max depth must be positive, got {0}")]
    InvalidMaxDepth(u32),

    #[error("vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f64),

    #[error("focus distance must be positive, got {0}")]
    InvalidFocusDistance(f64),

    #[error("defocus angle must be non-negative, got {0}")]
    InvalidDefocusAngle(f64),

    #[error("look_from and look_at must be distinct points")]
    DegenerateView,

    #[error("up vector must not be parallel to the view direction")]
    DegenerateUpVector,
}

/// User-facing camera settings.
///
/// Missing fields fall back to [`CameraConfig::default`] when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Ratio of image width over height
    pub aspect_ratio: f64,
    /// Rendered image width in pixels
    pub image_width: u32,
    /// Count of random samples for each pixel
    pub samples_per_pixel: u32,
    /// Maximum number of ray bounces into the scene
    pub max_depth: u32,

    /// Vertical field of view in degrees
    pub vfov: f64,
    /// Point the camera is looking from
    pub look_from: Point3,
    /// Point the camera is looking at
    pub look_at: Point3,
    /// Camera-relative "up" direction
    pub vup: Vec3,

    /// Variation angle of rays through each pixel (0 disables lens blur)
    pub defocus_angle: f64,
    /// Distance from camera to plane of perfect focus
    pub focus_dist: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let look_from = Point3::new(-2.0, 2.0, 1.0);
        let look_at = Point3::new(0.0, 0.0, -1.0);
        Self {
            aspect_ratio: 16.0 / 9.0,
            image_width: 400,
            samples_per_pixel: 100,
            max_depth: 50,
            vfov: 20.0,
            look_from,
            look_at,
            vup: Vec3::Y,
            defocus_angle: 0.0,
            focus_dist: (look_from - look_at).length(),
        }
    }
}

impl CameraConfig {
    /// Set image shape.
    pub fn with_resolution(mut self, aspect_ratio: f64, image_width: u32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.image_width = image_width;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    ///
    /// The focus distance is reset to the distance between the two points,
    /// matching a pinhole camera focused on `look_at`.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.focus_dist = (look_from - look_at).length();
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, defocus_angle: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    fn validate(&self) -> Result<(), CameraError> {
        if !(self.aspect_ratio > 0.0 && self.aspect_ratio.is_finite()) {
            return Err(CameraError::InvalidAspectRatio(self.aspect_ratio));
        }
        if self.image_width == 0 {
            return Err(CameraError::InvalidImageWidth(self.image_width));
        }
        if self.samples_per_pixel == 0 {
            return Err(CameraError::InvalidSamplesPerPixel(self.samples_per_pixel));
        }
        if self.max_depth == 0 {
            return Err(CameraError::InvalidMaxDepth(self.max_depth));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(CameraError::InvalidFieldOfView(self.vfov));
        }
        if !(self.focus_dist > 0.0 && self.focus_dist.is_finite()) {
            return Err(CameraError::InvalidFocusDistance(self.focus_dist));
        }
        if !(self.defocus_angle >= 0.0 && self.defocus_angle.is_finite()) {
            return Err(CameraError::InvalidDefocusAngle(self.defocus_angle));
        }
        Ok(())
    }
}

/// Camera for generating rays into the scene.
///
/// Built once from a validated [`CameraConfig`]; all viewport state is
/// derived at construction and never changes afterwards.
#[derive(Debug, Clone)]
pub struct Camera {
    config: CameraConfig,
    image_height: u32,

    center: Point3,
    pixel00_loc: Point3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
    samples_scale: f64,
}

impl Camera {
    /// Validate `config` and derive the viewport.
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        config.validate()?;

        let image_height = ((config.image_width as f64 / config.aspect_ratio) as u32).max(1);
        let center = config.look_from;

        // Calculate viewport dimensions
        let theta = config.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * config.focus_dist;
        let viewport_width = viewport_height * (config.image_width as f64 / image_height as f64);

        // Calculate camera basis vectors
        let w = (config.look_from - config.look_at)
            .try_normalize()
            .ok_or(CameraError::DegenerateView)?;
        let u = config
            .vup
            .cross(w)
            .try_normalize()
            .ok_or(CameraError::DegenerateUpVector)?;
        let v = w.cross(u);

        // Image rows run down the viewport
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / config.image_width as f64;
        let pixel_delta_v = viewport_v / image_height as f64;

        let viewport_upper_left =
            center - config.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = config.focus_dist * (config.defocus_angle / 2.0).to_radians().tan();

        log::debug!(
            "Camera initialized: {}x{}, vfov {}, defocus angle {}",
            config.image_width,
            image_height,
            config.vfov,
            config.defocus_angle
        );

        Ok(Self {
            image_height,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            w,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
            samples_scale: 1.0 / config.samples_per_pixel as f64,
            config,
        })
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn image_width(&self) -> u32 {
        self.config.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.config.samples_per_pixel
    }

    pub fn max_depth(&self) -> u32 {
        self.config.max_depth
    }

    /// Get the samples scale factor (1 / samples_per_pixel).
    pub fn samples_scale(&self) -> f64 {
        self.samples_scale
    }

    /// Camera basis `(u, v, w)`: right, up, and backwards from the view.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    /// Render `world` into an image, one pixel at a time.
    pub fn render(&self, world: &dyn Hittable, rng: &mut dyn RngCore) -> ImageBuffer {
        renderer::render(self, world, rng)
    }

    /// Generate a ray for pixel (i, j) with random sampling.
    ///
    /// The ray starts at the camera center (or a random point on the defocus
    /// disk) and passes through a random point inside the pixel.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((i as f64) + offset.x) * self.pixel_delta_u
            + ((j as f64) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.config.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Point3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

/// Sample a random point in the unit square [-0.5, 0.5] x [-0.5, 0.5].
fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(random_f64(rng) - 0.5, random_f64(rng) - 0.5, 0.0)
}
