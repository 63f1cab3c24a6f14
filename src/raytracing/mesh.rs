use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use super::math::{Aabb, Ray, Vec3};
use super::object::{Intersection, Object, Part, SMALL_T};

/// Barycentric weights may dip this far below zero before a hit is
/// rejected, so two triangles sharing an edge never leave a seam between
/// them from floating point error.
pub const WEIGHT_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("failed to read mesh file: {0}")]
    Read(#[from] std::io::Error),
    #[error("malformed '{kind}' statement at line {line}")]
    Malformed { kind: char, line: usize },
    #[error("face at line {line} references vertex {index} but the mesh has {count}")]
    BadIndex {
        line: usize,
        index: usize,
        count: usize,
    },
}

/// Indexed triangle mesh. Every triangle is an independently intersectable
/// part; the whole-mesh bounding box is accumulated once at construction.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[usize; 3]>,
    bounds: Aabb,
}

/// A ray-triangle intersection together with the barycentric weights of the
/// hit point, ordered as (weight of A, weight of B, weight of C).
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    pub dist: f64,
    pub weights: [f64; 3],
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[usize; 3]>) -> Mesh {
        let mut bounds = Aabb::empty();
        for vertex in &vertices {
            bounds.include(*vertex);
        }
        Mesh {
            vertices,
            triangles,
            bounds,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Mesh, MeshError> {
        let reader = BufReader::new(File::open(path)?);
        Mesh::from_reader(reader)
    }

    /// Read the line oriented mesh format: `v x y z` appends a vertex,
    /// `f i j k` appends a triangle of one-based vertex indices, every other
    /// line is ignored. Indices are converted to zero-based and validated
    /// against the final vertex count.
    pub fn from_reader(reader: impl BufRead) -> Result<Mesh, MeshError> {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let number = number + 1;
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    let mut coordinate = || {
                        tokens
                            .next()
                            .and_then(|token| token.parse::<f64>().ok())
                            .ok_or(MeshError::Malformed {
                                kind: 'v',
                                line: number,
                            })
                    };
                    let x = coordinate()?;
                    let y = coordinate()?;
                    let z = coordinate()?;
                    vertices.push(Vec3::new(x, y, z));
                }
                Some("f") => {
                    let mut index = || {
                        tokens
                            .next()
                            .and_then(|token| token.parse::<usize>().ok())
                            .filter(|index| *index >= 1)
                            .ok_or(MeshError::Malformed {
                                kind: 'f',
                                line: number,
                            })
                    };
                    let triangle = [index()? - 1, index()? - 1, index()? - 1];
                    faces.push((number, triangle));
                }
                _ => {}
            }
        }

        let mut triangles = Vec::with_capacity(faces.len());
        for (line, triangle) in faces {
            for index in triangle {
                if index >= vertices.len() {
                    return Err(MeshError::BadIndex {
                        line,
                        index: index + 1,
                        count: vertices.len(),
                    });
                }
            }
            triangles.push(triangle);
        }
        Ok(Mesh::new(vertices, triangles))
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    fn triangle(&self, index: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[index];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Intersect the ray with one triangle via the plane of the triangle:
    /// solve for the ray parameter of the plane crossing, then accept the
    /// hit only when all three barycentric weights of the crossing point
    /// exceed `-WEIGHT_TOLERANCE`.
    pub fn intersect_triangle(&self, ray: &Ray, index: usize) -> Option<TriangleHit> {
        let [a, b, c] = self.triangle(index);
        let u = ray.direction;
        let v = b - a;
        let w = c - a;
        let y = ray.origin - a;

        // both triple products below share this denominator; it vanishes
        // when the ray is parallel to the plane or the triangle is degenerate
        let denom = u.cross(v).dot(w);
        if denom.abs() < 1e-12 {
            return None;
        }

        let dist = -v.cross(w).dot(y) / denom;
        if !(dist > SMALL_T) {
            return None;
        }

        let beta = w.cross(u).dot(y) / denom;
        let gamma = u.cross(v).dot(y) / denom;
        let alpha = 1.0 - beta - gamma;
        if alpha > -WEIGHT_TOLERANCE && beta > -WEIGHT_TOLERANCE && gamma > -WEIGHT_TOLERANCE {
            Some(TriangleHit {
                dist,
                weights: [alpha, beta, gamma],
            })
        } else {
            None
        }
    }
}

impl Object for Mesh {
    fn intersect(&self, ray: &Ray, part: Part) -> Option<Intersection> {
        if let Some(index) = part {
            return self.intersect_triangle(ray, index).map(|hit| Intersection {
                dist: hit.dist,
                part: Some(index),
            });
        }
        // scan every triangle keeping the closest hit, ties resolved in
        // favor of the first triangle encountered
        let mut closest: Option<Intersection> = None;
        for index in 0..self.triangles.len() {
            if let Some(hit) = self.intersect_triangle(ray, index) {
                if closest.map_or(true, |best| hit.dist < best.dist) {
                    closest = Some(Intersection {
                        dist: hit.dist,
                        part: Some(index),
                    });
                }
            }
        }
        closest
    }

    fn normal(&self, _point: Vec3, part: Part) -> Vec3 {
        // flat shading: the normal is constant over the triangle
        let index = part.expect("mesh normal is only defined per triangle");
        let [a, b, c] = self.triangle(index);
        (b - a).cross(c - a).normalize()
    }

    fn bounding_box(&self, part: Part) -> Aabb {
        match part {
            Some(index) => {
                let [a, b, c] = self.triangle(index);
                let mut aabb = Aabb::from_point(a);
                aabb.include(b);
                aabb.include(c);
                aabb
            }
            None => self.bounds,
        }
    }

    fn number_parts(&self) -> usize {
        self.triangles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_triangle() -> Mesh {
        Mesh::new(
            vec![Vec3::zero(), Vec3::x_axis(), Vec3::y_axis()],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_ray_hits_unit_triangle() {
        let mesh = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::z_axis() * -1.0);
        let intersection = mesh.intersect(&ray, None).unwrap();
        assert!((intersection.dist - 1.0).abs() < 1e-10);
        assert_eq!(intersection.part, Some(0));

        let hit = mesh.intersect_triangle(&ray, 0).unwrap();
        let [alpha, beta, gamma] = hit.weights;
        assert!((alpha - 0.5).abs() < 1e-10);
        assert!((beta - 0.25).abs() < 1e-10);
        assert!((gamma - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_hit_behind_origin_is_rejected() {
        let mesh = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::z_axis());
        assert!(mesh.intersect(&ray, None).is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let mesh = unit_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::x_axis());
        assert!(mesh.intersect(&ray, None).is_none());
    }

    #[test]
    fn test_degenerate_triangle_misses() {
        // two coincident vertices, zero area
        let mesh = Mesh::new(
            vec![Vec3::zero(), Vec3::zero(), Vec3::y_axis()],
            vec![[0, 1, 2]],
        );
        let ray = Ray::new(Vec3::new(0.1, 0.1, 1.0), Vec3::z_axis() * -1.0);
        assert!(mesh.intersect(&ray, None).is_none());
    }

    #[test]
    fn test_weight_tolerance_slack() {
        let mesh = unit_triangle();
        // just barely outside the x = 0 edge, within the tolerance band
        let inside = Ray::new(Vec3::new(-0.5e-4, 0.25, 1.0), Vec3::z_axis() * -1.0);
        assert!(mesh.intersect(&inside, None).is_some());
        // clearly outside the tolerance band
        let outside = Ray::new(Vec3::new(-1e-3, 0.25, 1.0), Vec3::z_axis() * -1.0);
        assert!(mesh.intersect(&outside, None).is_none());
    }

    #[test]
    fn test_closest_triangle_wins() {
        // two stacked triangles, the ray must report the nearer one
        let mesh = Mesh::new(
            vec![
                Vec3::zero(),
                Vec3::x_axis(),
                Vec3::y_axis(),
                Vec3::new(0.0, 0.0, 0.5),
                Vec3::new(1.0, 0.0, 0.5),
                Vec3::new(0.0, 1.0, 0.5),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        );
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::z_axis() * -1.0);
        let intersection = mesh.intersect(&ray, None).unwrap();
        assert_eq!(intersection.part, Some(1));
        assert!((intersection.dist - 0.5).abs() < 1e-10);

        // restricting to one part only tests that part
        let lower = mesh.intersect(&ray, Some(0)).unwrap();
        assert_eq!(lower.part, Some(0));
        assert!((lower.dist - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_flat_normal() {
        let mesh = unit_triangle();
        let normal = mesh.normal(Vec3::new(0.25, 0.25, 0.0), Some(0));
        assert!((normal - Vec3::z_axis()).len() < 1e-12);
    }

    #[test]
    fn test_bounding_boxes() {
        let mesh = Mesh::new(
            vec![
                Vec3::zero(),
                Vec3::x_axis(),
                Vec3::y_axis(),
                Vec3::new(0.0, 0.0, 2.0),
            ],
            vec![[0, 1, 2], [0, 1, 3]],
        );
        let whole = mesh.bounding_box(None);
        assert_eq!(whole.min, Vec3::zero());
        assert_eq!(whole.max, Vec3::new(1.0, 1.0, 2.0));

        // the whole-mesh box is the union of the per-triangle boxes
        let union = mesh
            .bounding_box(Some(0))
            .union(&mesh.bounding_box(Some(1)));
        assert_eq!(union.min, whole.min);
        assert_eq!(union.max, whole.max);

        let first = mesh.bounding_box(Some(0));
        assert_eq!(first.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_reads_vertices_and_faces() {
        let source = "\
# a lonely square
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1 2 3
f 1 3 4
";
        let mesh = Mesh::from_reader(source.as_bytes()).unwrap();
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.triangles(), &[[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.bounding_box(None).max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_malformed_vertex_line() {
        let result = Mesh::from_reader("v 0 zero 0\n".as_bytes());
        assert!(matches!(
            result,
            Err(MeshError::Malformed { kind: 'v', line: 1 })
        ));
    }

    #[test]
    fn test_zero_face_index_is_malformed() {
        let result = Mesh::from_reader("v 0 0 0\nf 0 1 1\n".as_bytes());
        assert!(matches!(
            result,
            Err(MeshError::Malformed { kind: 'f', line: 2 })
        ));
    }

    #[test]
    fn test_out_of_range_face_index() {
        let result = Mesh::from_reader("v 0 0 0\nv 1 0 0\nf 1 2 3\n".as_bytes());
        assert!(matches!(
            result,
            Err(MeshError::BadIndex {
                line: 3,
                index: 3,
                count: 2
            })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Mesh::load("does/not/exist.obj"),
            Err(MeshError::Read(_))
        ));
    }

    proptest! {
        /// Shooting at a point constructed from known barycentric weights
        /// recovers those weights, and they always stay above the tolerance
        /// and sum to one.
        #[test]
        fn test_barycentric_weights_are_recovered(
            ax in -5.0f64..5.0, ay in -5.0f64..5.0, az in -5.0f64..5.0,
            bx in -5.0f64..5.0, by in -5.0f64..5.0, bz in -5.0f64..5.0,
            cx in -5.0f64..5.0, cy in -5.0f64..5.0, cz in -5.0f64..5.0,
            beta in 0.05f64..0.9, gamma in 0.05f64..0.9,
            height in 0.5f64..5.0,
        ) {
            prop_assume!(beta + gamma < 0.95);
            let a = Vec3::new(ax, ay, az);
            let b = Vec3::new(bx, by, bz);
            let c = Vec3::new(cx, cy, cz);
            let normal = (b - a).cross(c - a);
            prop_assume!(normal.len() > 1e-2);

            let mesh = Mesh::new(vec![a, b, c], vec![[0, 1, 2]]);
            let alpha = 1.0 - beta - gamma;
            let target = a * alpha + b * beta + c * gamma;
            let origin = target + normal.normalize() * height;
            let ray = Ray::new(origin, target - origin);

            let hit = mesh.intersect_triangle(&ray, 0);
            prop_assert!(hit.is_some());
            let hit = hit.unwrap();
            let sum: f64 = hit.weights.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-6);
            for weight in hit.weights {
                prop_assert!(weight > -WEIGHT_TOLERANCE);
            }
            prop_assert!((hit.weights[1] - beta).abs() < 1e-4);
            prop_assert!((hit.weights[2] - gamma).abs() < 1e-4);
        }
    }
}
