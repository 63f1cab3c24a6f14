use std::sync::Arc;

use whitted::{
    Camera, FlatShader, Light, Mesh, PhongShader, ReflectiveShader, RenderOptions, Scene,
    SceneObject, SceneParser, Sphere, Vec3,
};

const BACKGROUND: Vec3 = Vec3 {
    x: 0.1,
    y: 0.2,
    z: 0.4,
};

fn small_camera() -> Camera {
    let mut camera = Camera::look_at(Vec3::new(0.3, 1.2, 9.0), Vec3::new(0.0, 0.4, 0.0));
    camera.set_resolution(24, 18);
    camera
}

/// A scene exercising every object and shader kind, with positions nudged
/// off any symmetry so no two surfaces tie for the closest hit.
fn test_scene() -> Scene {
    let mut scene = Scene::new();
    scene.background_shader = Arc::new(FlatShader { color: BACKGROUND });
    scene.ambient_intensity = 0.1;
    scene.recursion_depth_limit = 4;
    scene
        .lights
        .push(Light::new(Vec3::new(5.3, 7.1, 6.2), Vec3::one(), 1200.0));

    scene.objects.push(SceneObject {
        geometry: Box::new(Sphere::new(Vec3::new(-1.3, 0.4, 0.2), 0.9)),
        shader: Arc::new(PhongShader {
            color_ambient: Vec3::new(1.0, 0.1, 0.1),
            color_diffuse: Vec3::new(1.0, 0.1, 0.1),
            color_specular: Vec3::one(),
            specular_power: 40.0,
        }),
    });
    scene.objects.push(SceneObject {
        geometry: Box::new(Sphere::new(Vec3::new(1.4, 0.6, -0.7), 1.1)),
        shader: Arc::new(ReflectiveShader {
            shader: Arc::new(FlatShader {
                color: Vec3::one() * 0.2,
            }),
            reflectivity: 0.7,
        }),
    });
    scene.objects.push(SceneObject {
        geometry: Box::new(Mesh::new(
            vec![
                Vec3::new(-6.0, -0.5, -6.0),
                Vec3::new(6.0, -0.5, -6.0),
                Vec3::new(6.0, -0.5, 6.0),
                Vec3::new(-6.0, -0.5, 6.0),
            ],
            vec![[0, 2, 1], [0, 3, 2]],
        )),
        shader: Arc::new(PhongShader {
            color_ambient: Vec3::one() * 0.4,
            color_diffuse: Vec3::one() * 0.4,
            color_specular: Vec3::zero(),
            specular_power: 1.0,
        }),
    });
    scene
}

#[test]
fn test_zero_object_scene_renders_pure_background() {
    let mut scene = Scene::new();
    scene.background_shader = Arc::new(FlatShader { color: BACKGROUND });
    let mut camera = small_camera();
    scene.render(&mut camera, &RenderOptions::default());

    let (width, height) = camera.number_pixels();
    for j in 0..height {
        for i in 0..width {
            assert_eq!(camera.pixel((i, j)), BACKGROUND);
        }
    }
}

#[test]
fn test_hierarchy_render_matches_linear_scan_render() {
    let options_tree = RenderOptions {
        use_hierarchy: true,
        sample_rate: 1,
    };
    let options_scan = RenderOptions {
        use_hierarchy: false,
        sample_rate: 1,
    };

    let mut scene = test_scene();
    let mut with_tree = small_camera();
    scene.render(&mut with_tree, &options_tree);
    let mut with_scan = small_camera();
    scene.render(&mut with_scan, &options_scan);

    let (width, height) = with_tree.number_pixels();
    let mut covered = 0;
    for j in 0..height {
        for i in 0..width {
            assert_eq!(
                with_tree.pixel((i, j)),
                with_scan.pixel((i, j)),
                "pixel ({}, {}) differs between hierarchy and linear scan",
                i,
                j
            );
            if with_tree.pixel((i, j)) != BACKGROUND {
                covered += 1;
            }
        }
    }
    // the scene must actually show up in the frame for the test to mean much
    assert!(covered > 0);
}

#[test]
fn test_demo_scene_parses_and_renders() {
    let content = std::fs::read_to_string("scenes/demo.txt").unwrap();
    let mut parsed = SceneParser::new(&content).parse_scene().unwrap();
    assert_eq!(parsed.camera.number_pixels(), (640, 480));

    // render a thumbnail instead of the full frame
    parsed.camera.set_resolution(48, 36);
    parsed
        .scene
        .render(&mut parsed.camera, &RenderOptions::default());

    let background = Vec3::new(0.05, 0.07, 0.12);
    // sky in the top corner, geometry in the middle of the frame
    assert_eq!(parsed.camera.pixel((0, 0)), background);
    assert!(parsed.camera.pixel((24, 18)) != background);
}
