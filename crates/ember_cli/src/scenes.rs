//! Built-in scenes.

use std::sync::Arc;

use clap::ValueEnum;
use ember_renderer::{
    CameraConfig, Color, Dielectric, HittableList, Lambertian, Material, Metal, Point3, Sphere,
    Vec3,
};
use rand::{Rng, RngCore};

/// A world plus the camera settings it was designed for.
pub struct Scene {
    pub camera: CameraConfig,
    pub world: HittableList,
}

/// Scenes that ship with the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BuiltinScene {
    /// Ground plane with diffuse, hollow glass and brushed metal spheres
    Basic,
    /// Field of small random spheres around three large ones, with lens blur
    Cover,
}

impl BuiltinScene {
    pub fn build(self, rng: &mut dyn RngCore) -> Scene {
        match self {
            BuiltinScene::Basic => basic(),
            BuiltinScene::Cover => cover(rng),
        }
    }
}

fn sphere(center: Point3, radius: f64, material: &Arc<dyn Material>) -> Box<Sphere> {
    Box::new(Sphere::new(center, radius, Arc::clone(material)))
}

/// Three spheres resting on a large ground sphere.
pub fn basic() -> Scene {
    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.8, 0.8, 0.0)));
    let center: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.1, 0.2, 0.5)));
    let left: Arc<dyn Material> = Arc::new(Dielectric::new(1.50));
    let bubble: Arc<dyn Material> = Arc::new(Dielectric::new(1.00 / 1.50));
    let right: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 1.0));

    let mut world = HittableList::new();
    world.add(sphere(Point3::new(0.0, -100.5, -1.0), 100.0, &ground));
    world.add(sphere(Point3::new(0.0, 0.0, -1.2), 0.5, &center));
    world.add(sphere(Point3::new(-1.0, 0.0, -1.0), 0.5, &left));
    world.add(sphere(Point3::new(-1.0, 0.0, -1.0), 0.4, &bubble));
    world.add(sphere(Point3::new(1.0, 0.0, -1.0), 0.5, &right));

    Scene {
        camera: CameraConfig::default(),
        world,
    }
}

/// Random field of small spheres around three large ones.
pub fn cover(rng: &mut dyn RngCore) -> Scene {
    let mut world = HittableList::new();

    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    world.add(sphere(Point3::new(0.0, -1000.0, 0.0), 1000.0, &ground));

    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f64 = rng.gen();
            let center = Point3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );

            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let material: Arc<dyn Material> = if choose_mat < 0.8 {
                // Diffuse
                let albedo = random_color(rng, 0.0, 1.0) * random_color(rng, 0.0, 1.0);
                Arc::new(Lambertian::new(albedo))
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = random_color(rng, 0.5, 1.0);
                let fuzz = rng.gen_range(0.0..0.5);
                Arc::new(Metal::new(albedo, fuzz))
            } else {
                Arc::clone(&glass)
            };
            world.add(Box::new(Sphere::new(center, 0.2, material)));
        }
    }

    let diffuse: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1)));
    let metal: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0));
    world.add(sphere(Point3::new(0.0, 1.0, 0.0), 1.0, &glass));
    world.add(sphere(Point3::new(-4.0, 1.0, 0.0), 1.0, &diffuse));
    world.add(sphere(Point3::new(4.0, 1.0, 0.0), 1.0, &metal));

    log::debug!("Cover scene built with {} spheres", world.len());

    let camera = CameraConfig::default()
        .with_resolution(16.0 / 9.0, 400)
        .with_quality(100, 50)
        .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0);

    Scene { camera, world }
}

fn random_color(rng: &mut dyn RngCore, min: f64, max: f64) -> Color {
    Color::new(
        rng.gen_range(min..max),
        rng.gen_range(min..max),
        rng.gen_range(min..max),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_renderer::{Hittable, Interval, Ray};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_basic_scene() {
        let scene = basic();
        assert_eq!(scene.world.len(), 5);

        // Looking straight down behind the spheres lands on the ground
        let ray = Ray::new(Point3::new(0.0, 5.0, -3.0), -Vec3::Y);
        let rec = scene
            .world
            .hit(&ray, Interval::new(0.001, f64::INFINITY))
            .expect("ground below");
        assert!(((rec.p - Point3::new(0.0, -100.5, -1.0)).length() - 100.0).abs() < 1e-9);
        assert!(rec.front_face);
    }

    #[test]
    fn test_cover_scene_reproducible() {
        let a = cover(&mut StdRng::seed_from_u64(3));
        let b = cover(&mut StdRng::seed_from_u64(3));
        assert_eq!(a.world.len(), b.world.len());
        assert!(a.world.len() > 4);
        assert_eq!(a.camera.look_from, Point3::new(13.0, 2.0, 3.0));
        assert_eq!(a.camera.focus_dist, 10.0);
    }
}
