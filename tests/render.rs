use std::time::Duration;

use glam::Vec3A;
use glint::{
    camera::Camera,
    color::{self, Color},
    film::FilmDescriptor,
    hittables::{AxisRect, Sphere},
    material::Material,
    render::{Phase, RenderConfig, Renderer},
    scene,
    world::{World, WorldBuilder},
};
use rand::{rngs::SmallRng, SeedableRng};

fn config(threads: usize, seed: u64) -> RenderConfig {
    RenderConfig {
        threads,
        max_depth: 10,
        seed: Some(seed),
        poll_interval: Duration::from_millis(1),
        show_progress: false,
    }
}

/// A lit sphere on a glass-and-metal stage, enough variety to exercise every lobe.
fn showcase() -> (World, Camera, FilmDescriptor) {
    let mut builder = WorldBuilder::new();
    let sky = builder.add_texture(Color::new(0.1, 0.1, 0.2));
    builder.set_background(sky);

    let grey = builder.add_texture(Color::splat(0.6));
    let white = builder.add_texture(Color::ONE);
    let matte = builder.add_material(Material::Lambertian { albedo: grey });
    let polish = builder.add_texture(Color::splat(0.05));
    let mirror = builder.add_material(Material::Metal {
        albedo: white,
        roughness: polish,
    });
    let glass = builder.add_material(Material::Dielectric {
        refract_index: 1.5,
        roughness: 0.0,
    });
    let five = builder.add_texture(Color::splat(5.0));
    let lamp = builder.add_material(Material::DiffuseLight {
        emit: white,
        strength: five,
    });

    builder.add_object(Sphere::new(Vec3A::new(0.0, -100.5, -1.0), 100.0, matte));
    builder.add_object(Sphere::new(Vec3A::new(-1.0, 0.0, -1.0), 0.5, mirror));
    builder.add_object(Sphere::new(Vec3A::new(1.0, 0.0, -1.0), 0.5, glass));
    builder.add_object(AxisRect::xz((-1.0, 1.0), (-2.0, 0.0), 2.0, lamp));
    let world = builder.build(&mut SmallRng::seed_from_u64(0));

    let film = FilmDescriptor::new(32, 18, 4, "showcase.png");
    let camera = Camera::new(
        Vec3A::new(0.0, 0.5, 2.0),
        Vec3A::new(0.0, 0.0, -1.0),
        Vec3A::Y,
        50.0,
        film.aspect_ratio(),
        0.0,
        3.0,
    );
    (world, camera, film)
}

#[test]
fn fixed_seed_is_reproducible() {
    let (world, camera, film) = showcase();
    let first = Renderer::new(config(2, 42)).render(&world, &camera, &film).unwrap();
    let second = Renderer::new(config(2, 42)).render(&world, &camera, &film).unwrap();
    assert_eq!(first.bytes(), second.bytes());

    let other_seed = Renderer::new(config(2, 43)).render(&world, &camera, &film).unwrap();
    assert_ne!(first.bytes(), other_seed.bytes());
}

#[test]
fn thread_count_does_not_change_the_image() {
    let (world, camera, film) = showcase();
    let single = Renderer::new(config(1, 7)).render(&world, &camera, &film).unwrap();
    let quad = Renderer::new(config(4, 7)).render(&world, &camera, &film).unwrap();
    assert_eq!(single.bytes(), quad.bytes());
}

#[test]
fn empty_scene_shows_background_everywhere() {
    let mut builder = WorldBuilder::new();
    let sky = Color::new(0.3, 0.5, 0.8);
    let texture = builder.add_texture(sky);
    builder.set_background(texture);
    let world = builder.build(&mut SmallRng::seed_from_u64(0));

    let film = FilmDescriptor::new(8, 6, 2, "sky.png");
    let camera = Camera::new(Vec3A::ZERO, -Vec3A::Z, Vec3A::Y, 60.0, film.aspect_ratio(), 0.0, 1.0);
    let fb = Renderer::new(config(3, 1)).render(&world, &camera, &film).unwrap();

    let expected = color::encode(sky);
    for y in 0..film.height {
        for x in 0..film.width {
            assert_eq!(fb.pixel(x, y), Some(expected), "pixel ({x}, {y})");
        }
    }
}

#[test]
fn progress_reports_every_row() {
    let (world, camera, film) = showcase();
    let renderer = Renderer::new(config(4, 3));
    let progress = renderer.progress();

    std::thread::scope(|scope| {
        let render = scope.spawn(|| renderer.render_with_progress(&world, &camera, &film, &progress));

        // observers only ever see the counters grow
        let mut last = 0;
        while progress.phase() != Phase::Done && !render.is_finished() {
            let rows = progress.rows_done();
            assert!(rows >= last && rows <= film.height);
            last = rows;
            std::thread::sleep(Duration::from_millis(1));
        }
        render.join().unwrap().unwrap();
    });

    assert_eq!(progress.phase(), Phase::Done);
    assert!(progress.all_done());
    assert_eq!(progress.rows_done(), film.height);
}

#[test]
fn scene_file_renders() {
    let dir = std::env::temp_dir().join("glint-scene-file-renders");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("scene.json");
    std::fs::write(
        &path,
        r#"{
            "film": { "width": 12, "height": 8, "samples": 2, "output": "out.png" },
            "camera": { "position": [0, 0, 4], "look_at": [0, 0, 0], "fov": 45,
                        "background": [0.8, 0.9, 1.0] },
            "materials": [ { "name": "red", "type": "lambertian", "albedo": [0.8, 0.1, 0.1] } ],
            "objects": [ { "type": "sphere", "center": [0, 0, 0], "radius": 1, "material": "red" } ]
        }"#,
    )
    .unwrap();

    let loaded = scene::load(&path).unwrap();
    assert_eq!(loaded.film.width, 12);

    let fb = Renderer::new(config(2, 5))
        .render(&loaded.world, &loaded.camera, &loaded.film)
        .unwrap();
    let out = dir.join(&loaded.film.output);
    fb.save(&out).unwrap();
    let decoded = image::open(&out).unwrap().into_rgb8();
    assert_eq!(decoded.dimensions(), (12, 8));
    assert_eq!(decoded.as_raw(), fb.bytes());

    // the corner sees sky, the centre sees the red sphere
    assert_eq!(fb.pixel(0, 0), Some(color::encode(Color::new(0.8, 0.9, 1.0))));
    let [r, g, b] = fb.pixel(6, 4).unwrap();
    assert!(r > g && r > b, "centre pixel {:?}", [r, g, b]);
}

#[test]
fn diffuse_sphere_matches_single_bounce_shading() {
    // a convex diffuse object under a flat sky: every path bounces once, then escapes
    let sky = Color::new(0.4, 0.6, 0.9);
    let mut builder = WorldBuilder::new();
    let texture = builder.add_texture(sky);
    builder.set_background(texture);
    let grey = builder.add_texture(Color::splat(0.5));
    let matte = builder.add_material(Material::Lambertian { albedo: grey });
    builder.add_object(Sphere::new(Vec3A::ZERO, 1.0, matte));
    let world = builder.build(&mut SmallRng::seed_from_u64(0));

    let camera = Camera::new(Vec3A::new(0.0, 0.0, 5.0), Vec3A::ZERO, Vec3A::Y, 40.0, 1.0, 0.0, 5.0);
    let close = |a: [u8; 3], b: [u8; 3]| a.iter().zip(b).all(|(&x, y)| x.abs_diff(y) <= 1);

    for samples in [1, 2, 8] {
        let film = FilmDescriptor::new(9, 9, samples, "sphere.png");
        let fb = Renderer::new(config(2, 11)).render(&world, &camera, &film).unwrap();

        let centre = fb.pixel(4, 4).unwrap();
        assert!(close(centre, color::encode(0.5 * sky)), "{samples} spp: {centre:?}");
        let corner = fb.pixel(0, 8).unwrap();
        assert!(close(corner, color::encode(sky)), "{samples} spp: {corner:?}");
    }
}
