//! Material trait for surface scattering.

use crate::hittable::HitRecord;
use ember_math::{random_f64, random_unit_vector, reflect, refract, Ray, Vec3, Vec3Ext};
use rand::RngCore;
use thiserror::Error;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Errors raised when a material is built from invalid parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaterialError {
    #[error("refraction index must be positive and finite, got {0}")]
    InvalidRefractionIndex(f64),
}

/// Outcome of a successful scatter.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Per-channel fraction of the continued ray's light that survives
    pub attenuation: Color,
    /// Ray leaving the surface
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns the attenuation and continued ray, or `None` if the ray is
    /// absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult>;
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if scatter_direction.near_zero() {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f64,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    pub fn fuzz(&self) -> f64 {
        self.fuzz
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let scattered_dir = reflected + self.fuzz * random_unit_vector(rng);

        // Fuzz can push the reflection below the surface; absorb it
        if scattered_dir.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                attenuation: self.albedo,
                scattered: Ray::new(rec.p, scattered_dir),
            })
        } else {
            None
        }
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Refractive index in vacuum or air, or the ratio of the material's
    /// index over the index of the enclosing medium
    refraction_index: f64,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `refraction_index`: 1.0 = air, 1.5 = glass, 2.4 = diamond
    ///
    /// An index that is not positive and finite falls back to 1.0, which
    /// lets rays pass straight through. Use [`Dielectric::try_new`] to reject
    /// it instead.
    pub fn new(refraction_index: f64) -> Self {
        Self::try_new(refraction_index).unwrap_or_else(|err| {
            log::warn!("{err}; using 1.0");
            Self {
                refraction_index: 1.0,
            }
        })
    }

    /// Create a new Dielectric material, rejecting indices that are not
    /// positive and finite.
    pub fn try_new(refraction_index: f64) -> Result<Self, MaterialError> {
        if refraction_index > 0.0 && refraction_index.is_finite() {
            Ok(Self { refraction_index })
        } else {
            Err(MaterialError::InvalidRefractionIndex(refraction_index))
        }
    }

    pub fn refraction_index(&self) -> f64 {
        self.refraction_index
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f64, refraction_index: f64) -> f64 {
        let r0 = (1.0 - refraction_index) / (1.0 + refraction_index);
        let r0 = r0 * r0;
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let ri = if rec.front_face {
            1.0 / self.refraction_index
        } else {
            self.refraction_index
        };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Check for total internal reflection
        let cannot_refract = ri * sin_theta > 1.0;

        let direction = if cannot_refract || Self::reflectance(cos_theta, ri) > random_f64(rng) {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, ri)
        };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_math::{random_vec3_range, Point3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record<'a>(ray: &Ray, outward_normal: Vec3, material: &'a dyn Material) -> HitRecord<'a> {
        HitRecord::new(ray, 1.0, outward_normal, material)
    }

    fn assert_finite(v: Vec3) {
        assert!(v.is_finite(), "non-finite direction {v:?}");
    }

    #[test]
    fn test_lambertian_scatters_into_normal_hemisphere() {
        let mut rng = StdRng::seed_from_u64(42);
        let material = Lambertian::new(Color::new(0.1, 0.2, 0.5));
        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = record(&ray, Vec3::Z, &material);

        for _ in 0..1000 {
            let result = material
                .scatter(&ray, &rec, &mut rng)
                .expect("lambertian always scatters");
            assert_eq!(result.attenuation, material.albedo());
            assert_eq!(result.scattered.origin(), rec.p);
            assert!(result.scattered.direction().dot(rec.normal) >= 0.0);
            assert!(!result.scattered.direction().near_zero());
        }
    }

    /// Replays a fixed list of 64-bit draws.
    struct ScriptedRng {
        draws: Vec<u64>,
        next: usize,
    }

    impl ScriptedRng {
        fn new(draws: &[u64]) -> Self {
            Self {
                draws: draws.to_vec(),
                next: 0,
            }
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            (self.next_u64() >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            let value = self.draws[self.next % self.draws.len()];
            self.next += 1;
            value
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn test_lambertian_degenerate_direction_falls_back_to_normal() {
        // 0 maps to -1 and 2^63 to 0 in [-1, 1), so the unit vector is -X
        let mut rng = ScriptedRng::new(&[0, 1 << 63, 1 << 63]);
        assert_eq!(random_unit_vector(&mut rng), Vec3::new(-1.0, 0.0, 0.0));

        let material = Lambertian::new(Color::splat(0.5));
        let ray = Ray::new(Point3::new(2.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let rec = record(&ray, Vec3::X, &material);
        assert!(rec.front_face);

        let mut rng = ScriptedRng::new(&[0, 1 << 63, 1 << 63]);
        let result = material.scatter(&ray, &rec, &mut rng).expect("lambertian always scatters");
        assert_eq!(result.scattered.direction(), rec.normal);
        assert_eq!(result.scattered.origin(), rec.p);
    }

    #[test]
    fn test_metal_mirror_reflection() {
        let mut rng = StdRng::seed_from_u64(42);
        let material = Metal::new(Color::new(0.8, 0.6, 0.2), 0.0);
        let ray = Ray::new(Point3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let rec = record(&ray, Vec3::Y, &material);

        let result = material
            .scatter(&ray, &rec, &mut rng)
            .expect("mirror reflection leaves the surface");
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((result.scattered.direction() - expected).length() < 1e-12);
        assert_eq!(result.attenuation, Color::new(0.8, 0.6, 0.2));
    }

    #[test]
    fn test_metal_fuzz_clamped() {
        assert_eq!(Metal::new(Color::ONE, 3.0).fuzz(), 1.0);
        assert_eq!(Metal::new(Color::ONE, -1.0).fuzz(), 0.0);
        assert_eq!(Metal::new(Color::ONE, 0.3).fuzz(), 0.3);
    }

    #[test]
    fn test_metal_absorbs_below_surface() {
        let mut rng = StdRng::seed_from_u64(1);
        let material = Metal::new(Color::ONE, 1.0);
        // Grazing ray: the mirror direction barely leaves the surface, so a
        // fuzzy perturbation often pushes it below
        let ray = Ray::new(Point3::new(-1.0, 1e-3, 0.0), Vec3::new(1.0, -1e-3, 0.0));
        let rec = record(&ray, Vec3::Y, &material);

        let mut absorbed = 0;
        for _ in 0..1000 {
            match material.scatter(&ray, &rec, &mut rng) {
                Some(result) => assert!(result.scattered.direction().dot(rec.normal) > 0.0),
                None => absorbed += 1,
            }
        }
        assert!(absorbed > 0);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let mut rng = StdRng::seed_from_u64(42);
        let material = Dielectric::new(1.5);
        // Leaving glass at a steep angle: ri * sin_theta = 1.5 * sin(60deg) > 1
        let direction = Vec3::new(60f64.to_radians().sin(), 60f64.to_radians().cos(), 0.0);
        let ray = Ray::new(Point3::ZERO, direction);
        let rec = record(&ray, Vec3::Y, &material);
        assert!(!rec.front_face);

        for _ in 0..100 {
            let result = material.scatter(&ray, &rec, &mut rng).expect("never absorbs");
            let expected = reflect(direction, rec.normal);
            assert!((result.scattered.direction() - expected).length() < 1e-12);
            assert_eq!(result.attenuation, Color::ONE);
        }
    }

    #[test]
    fn test_dielectric_head_on_mostly_refracts() {
        let mut rng = StdRng::seed_from_u64(42);
        let material = Dielectric::new(1.5);
        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = record(&ray, Vec3::Z, &material);

        // Schlick reflectance at normal incidence is 0.04 for glass
        let (mut refracted, mut reflected) = (0, 0);
        for _ in 0..1000 {
            let result = material.scatter(&ray, &rec, &mut rng).expect("never absorbs");
            if result.scattered.direction().z < 0.0 {
                refracted += 1;
            } else {
                assert!((result.scattered.direction() - Vec3::Z).length() < 1e-12);
                reflected += 1;
            }
        }
        assert!(refracted > 900, "refracted {refracted} of 1000");
        assert!((15..=80).contains(&reflected), "reflected {reflected} of 1000");
    }

    #[test]
    fn test_dielectric_reflects_more_at_grazing_angles() {
        let material = Dielectric::new(1.5);
        let count_reflections = |direction: Vec3| {
            let mut rng = StdRng::seed_from_u64(7);
            let ray = Ray::new(Point3::ZERO - direction, direction);
            let rec = record(&ray, Vec3::Z, &material);
            assert!(rec.front_face);
            (0..2000)
                .filter(|_| {
                    let result = material.scatter(&ray, &rec, &mut rng).expect("never absorbs");
                    result.scattered.direction().z > 0.0
                })
                .count()
        };

        let head_on = count_reflections(Vec3::new(0.0, 0.0, -1.0));
        let grazing = count_reflections(Vec3::new(1.0, 0.0, -0.05).normalize());
        assert!(grazing > 4 * head_on, "grazing {grazing}, head-on {head_on}");
    }

    #[test]
    fn test_dielectric_rejects_invalid_index() {
        assert_eq!(
            Dielectric::try_new(0.0).unwrap_err(),
            MaterialError::InvalidRefractionIndex(0.0)
        );
        assert!(Dielectric::try_new(-1.5).is_err());
        assert!(Dielectric::try_new(f64::NAN).is_err());
        assert!(Dielectric::try_new(f64::INFINITY).is_err());
        assert_eq!(Dielectric::try_new(1.5).map(|d| d.refraction_index()), Ok(1.5));
    }

    #[test]
    fn test_dielectric_invalid_index_scatters_finite() {
        let mut rng = StdRng::seed_from_u64(5);
        for ri in [0.0, -2.0, f64::NAN] {
            let material = Dielectric::new(ri);
            assert_eq!(material.refraction_index(), 1.0);

            let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
            let rec = record(&ray, Vec3::Z, &material);
            let result = material.scatter(&ray, &rec, &mut rng).expect("never absorbs");
            assert_finite(result.scattered.direction());
            assert!((result.scattered.direction() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
        }
    }

    #[test]
    fn test_schlick_reflectance() {
        let r0 = Dielectric::reflectance(1.0, 1.5);
        assert!((r0 - 0.04).abs() < 1e-12);
        assert!((Dielectric::reflectance(0.0, 1.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scatter_directions_are_finite() {
        let mut rng = StdRng::seed_from_u64(99);
        let materials: Vec<Box<dyn Material>> = vec![
            Box::new(Lambertian::new(Color::splat(0.5))),
            Box::new(Metal::new(Color::splat(0.5), 0.3)),
            Box::new(Dielectric::new(1.5)),
            Box::new(Dielectric::new(1.0 / 1.33)),
        ];

        for material in &materials {
            for _ in 0..500 {
                let normal = random_unit_vector(&mut rng);
                let direction = random_vec3_range(&mut rng, -1.0, 1.0);
                if direction.near_zero() {
                    continue;
                }
                let ray = Ray::new(Point3::ZERO, direction);
                let rec = record(&ray, normal, material.as_ref());

                if let Some(result) = material.scatter(&ray, &rec, &mut rng) {
                    assert_finite(result.scattered.direction());
                    assert_finite(result.attenuation);
                }
            }
        }
    }
}
