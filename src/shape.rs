use crate::aggregate::AABB;
use crate::interval::Interval;
use crate::material::Material;
use crate::matrix::Matrix4;
use crate::point::Point3;
use crate::ray::Ray;
use crate::vector::{Axis, Vector3};

use std::f64;
use std::sync::Arc;

pub struct HitRecord {
    pub point: Point3,
    pub normal: Vector3,
    pub front_face: bool,
    pub material: Arc<dyn Material>,
    pub t: f64,
    pub u: f64,
    pub v: f64,
}

// Not deserialized as a trait object directly: a mesh expands into many
// Triangle shapes during scene loading, which doesn't fit typetag's
// one-JSON-value-per-implementor model. Scene assembly builds these
// through explicit constructors instead (see scene.rs).
pub trait Shape: Send + Sync {
    fn intersect(&self, r: &Ray, interval: Interval) -> Option<HitRecord>;
    fn bounds(&self) -> AABB;
}

pub struct Sphere {
    local_to_world: Matrix4,
    world_to_local: Matrix4,
    radius: f64,
    material: Arc<dyn Material>,
}

impl Sphere {
    pub fn new(
        local_to_world: &Matrix4,
        radius: f64,
        material: Arc<dyn Material>,
    ) -> Result<Sphere, &'static str> {
        Ok(Sphere {
            local_to_world: local_to_world.clone(),
            world_to_local: local_to_world.inverse()?,
            radius: radius,
            material: material,
        })
    }
}

const TWO_PI: f64 = 2.0_f64 * f64::consts::PI;

impl Shape for Sphere {
    fn intersect(&self, r: &Ray, interval: Interval) -> Option<HitRecord> {
        let local_ray = &self.world_to_local * r;
        let origin_to_center = Point3::origin() - local_ray.origin;

        let a = local_ray.dir.dot(local_ray.dir);
        let h = local_ray.dir.dot(origin_to_center);
        let c = origin_to_center.dot(origin_to_center) - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0_f64 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();

        let mut root = (h - sqrt_d) / a;
        if !interval.surrounds(root) {
            root = (h + sqrt_d) / a;
            if !interval.surrounds(root) {
                return None;
            }
        }

        let local_point = local_ray.point_at(root);
        let outward_normal_local = (local_point - Point3::origin()) / self.radius;
        let front_face = local_ray.dir.dot(outward_normal_local) < 0.0_f64;
        let oriented_local_normal = if front_face {
            outward_normal_local
        } else {
            -outward_normal_local
        };

        Some(HitRecord {
            point: r.point_at(root),
            normal: (&self.local_to_world * oriented_local_normal).normalized(),
            front_face: front_face,
            material: Arc::clone(&self.material),
            t: root,
            u: (-outward_normal_local.z())
                .atan2(outward_normal_local.x())
                / TWO_PI
                + 0.5_f64,
            v: (-outward_normal_local.y()).acos() / f64::consts::PI,
        })
    }

    fn bounds(&self) -> AABB {
        &self.local_to_world
            * &AABB::new(
                Point3::origin() - Vector3::new(self.radius, self.radius, self.radius),
                Point3::origin() + Vector3::new(self.radius, self.radius, self.radius),
            )
    }
}

pub struct TriangleMesh {
    pub vertices: Vec<Point3>,
    pub material: Arc<dyn Material>,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<Point3>, material: Arc<dyn Material>) -> TriangleMesh {
        TriangleMesh {
            vertices: vertices,
            material: material,
        }
    }
}

pub struct Triangle {
    mesh: Arc<TriangleMesh>,
    v0: usize,
    v1: usize,
    v2: usize,
}

impl Triangle {
    pub fn new(mesh: Arc<TriangleMesh>, v0: usize, v1: usize, v2: usize) -> Result<Triangle, String> {
        let len = mesh.vertices.len();
        if len == 0 || v0 >= len || v1 >= len || v2 >= len {
            return Err(format!(
                "Triangle mesh has {} vertices but attempted to make a Triangle with indices {}, {}, {}.",
                len, v0, v1, v2
            ));
        }
        Ok(Triangle {
            mesh: mesh,
            v0: v0,
            v1: v1,
            v2: v2,
        })
    }
}

fn max_abs_axis(v: Vector3) -> Axis {
    let (ax, ay, az) = (v.x().abs(), v.y().abs(), v.z().abs());
    if ax > ay && ax > az {
        Axis::X
    } else if ay > az {
        Axis::Y
    } else {
        Axis::Z
    }
}

fn next_axis(axis: Axis) -> Axis {
    match axis {
        Axis::X => Axis::Y,
        Axis::Y => Axis::Z,
        Axis::Z => Axis::X,
    }
}

fn permute(v: Vector3, kx: Axis, ky: Axis, kz: Axis) -> Vector3 {
    Vector3::new(v[kx], v[ky], v[kz])
}

impl Shape for Triangle {
    // Watertight intersection (Pharr/Jakob/Humphreys): translate to the ray
    // origin, permute so the ray direction's dominant axis becomes z, shear
    // the ray onto +z, then test the origin against the triangle's edge
    // functions in the sheared frame. Never produces false misses on
    // shared edges the way a naive Moller-Trumbore test can.
    fn intersect(&self, r: &Ray, interval: Interval) -> Option<HitRecord> {
        let p0 = self.mesh.vertices[self.v0];
        let p1 = self.mesh.vertices[self.v1];
        let p2 = self.mesh.vertices[self.v2];

        let kz = max_abs_axis(r.dir);
        let kx = next_axis(kz);
        let ky = next_axis(kx);

        let d = permute(r.dir, kx, ky, kz);
        let sx = -d.x() / d.z();
        let sy = -d.y() / d.z();
        let sz = 1.0_f64 / d.z();

        let shear = |p: Point3| -> Vector3 {
            let translated = permute(p - r.origin, kx, ky, kz);
            Vector3::new(
                translated.x() + sx * translated.z(),
                translated.y() + sy * translated.z(),
                translated.z() * sz,
            )
        };
        let p0t = shear(p0);
        let p1t = shear(p1);
        let p2t = shear(p2);

        let e0 = p1t.x() * p2t.y() - p1t.y() * p2t.x();
        let e1 = p2t.x() * p0t.y() - p2t.y() * p0t.x();
        let e2 = p0t.x() * p1t.y() - p0t.y() * p1t.x();

        let all_non_negative = e0 >= 0.0_f64 && e1 >= 0.0_f64 && e2 >= 0.0_f64;
        let all_non_positive = e0 <= 0.0_f64 && e1 <= 0.0_f64 && e2 <= 0.0_f64;
        if !all_non_negative && !all_non_positive {
            return None;
        }
        let sum = e0 + e1 + e2;
        if sum == 0.0_f64 {
            return None;
        }

        let b0 = e0 / sum;
        let b1 = e1 / sum;
        let b2 = e2 / sum;
        let t = b0 * p0t.z() + b1 * p1t.z() + b2 * p2t.z();
        if !interval.surrounds(t) {
            return None;
        }

        let outward_normal = (p1 - p0).cross(p2 - p0).normalized();
        let front_face = outward_normal.dot(r.dir) < 0.0_f64;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Some(HitRecord {
            point: r.point_at(t),
            normal: normal,
            front_face: front_face,
            material: Arc::clone(&self.mesh.material),
            t: t,
            u: b1,
            v: b2,
        })
    }

    fn bounds(&self) -> AABB {
        let p0 = self.mesh.vertices[self.v0];
        let p1 = self.mesh.vertices[self.v1];
        let p2 = self.mesh.vertices[self.v2];
        AABB::new(
            Point3::min(p0, Point3::min(p1, p2)),
            Point3::max(p0, Point3::max(p1, p2)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Specular;
    use crate::color::RGB;

    fn white_material() -> Arc<dyn Material> {
        Arc::new(Specular {
            albedo: RGB::new(1.0, 1.0, 1.0),
        })
    }

    #[test]
    fn ray_sphere_hit_matches_known_scenario() {
        let sphere = Sphere::new(
            &Matrix4::new_translation(&Vector3::new(0.0, 0.0, -1.0)),
            0.5,
            white_material(),
        )
        .unwrap();
        let r = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
        let hit = sphere.intersect(&r, Interval::primary()).unwrap();
        assert!((hit.t - 0.5).abs() < 1e-9);
        assert!((hit.point.z() - (-0.5)).abs() < 1e-9);
        assert!((hit.normal.z() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ray_sphere_miss() {
        let sphere = Sphere::new(
            &Matrix4::new_translation(&Vector3::new(0.0, 0.0, -1.0)),
            0.5,
            white_material(),
        )
        .unwrap();
        let r = Ray::new(Point3::origin(), Vector3::new(1.0, 0.0, 0.0));
        assert!(sphere.intersect(&r, Interval::primary()).is_none());
    }

    #[test]
    fn watertight_triangle_matches_known_scenario() {
        let mesh = Arc::new(TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            white_material(),
        ));
        let tri = Triangle::new(mesh, 0, 1, 2).unwrap();
        let r = Ray::new(Point3::new(0.25, 0.25, -1.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = tri.intersect(&r, Interval::primary()).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-9);
        assert!((hit.point.x() - 0.25).abs() < 1e-9);
        assert!((hit.point.y() - 0.25).abs() < 1e-9);
        let b0 = 1.0 - hit.u - hit.v;
        assert!((b0 - 0.5).abs() < 1e-9);
        assert!((hit.u - 0.25).abs() < 1e-9);
        assert!((hit.v - 0.25).abs() < 1e-9);
    }
}
