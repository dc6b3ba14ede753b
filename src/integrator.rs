use crate::aggregate::{Aggregate, SyncAggregate, Workspace};
use crate::color::RGB;
use crate::interval::Interval;
use crate::material::Material;
use crate::ray::Ray;

// Background sky gradient used when a ray escapes the scene entirely.
fn background(r: &Ray) -> RGB {
    let unit_dir = r.dir.normalized();
    let a = 0.5_f64 * (unit_dir.y() + 1.0_f64);
    RGB::new(1.0, 1.0, 1.0) * (1.0_f64 - a) + RGB::new(0.5, 0.7, 1.0) * a
}

// Recursive Monte-Carlo radiance estimator. depth counts remaining
// bounces; it reaches zero at the bottom of the recursion, not the top.
pub fn trace(
    r: &Ray,
    shape_aggregate: &SyncAggregate,
    workspace: &mut Workspace,
    depth: u32,
) -> RGB {
    if depth == 0 {
        return RGB::black();
    }

    match shape_aggregate.hit(r, Interval::primary(), workspace) {
        Some(hit) => match hit.material.scatter(r, &hit) {
            Some((attenuation, scattered)) => {
                attenuation * trace(&scattered, shape_aggregate, workspace, depth - 1)
            }
            None => hit.material.emitted(hit.u, hit.v, &hit.point),
        },
        None => background(r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::new_bvh;
    use crate::material::Specular;
    use crate::matrix::Matrix4;
    use crate::point::Point3;
    use crate::shape::{Shape, Sphere};
    use crate::vector::Vector3;

    use std::sync::Arc;

    #[test]
    fn ray_that_hits_nothing_returns_background() {
        let shapes: Vec<Arc<dyn Shape>> = Vec::new();
        let agg = new_bvh(shapes);
        let mut workspace = agg.get_workspace();
        let r = Ray::new(Point3::origin(), Vector3::new(0.0, 1.0, 0.0));
        let color = trace(&r, &*agg, &mut workspace, 50);
        let expected = background(&r);
        assert!((color.r() - expected.r()).abs() < 1e-12);
    }

    #[test]
    fn zero_depth_returns_black_even_on_a_hit() {
        let sphere: Arc<dyn Shape> = Arc::new(
            Sphere::new(
                &Matrix4::new_translation(&Vector3::new(0.0, 0.0, -1.0)),
                0.5,
                Arc::new(Specular {
                    albedo: RGB::new(1.0, 1.0, 1.0),
                }),
            )
            .unwrap(),
        );
        let agg = new_bvh(vec![sphere]);
        let mut workspace = agg.get_workspace();
        let r = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
        let color = trace(&r, &*agg, &mut workspace, 0);
        assert_eq!((color.r(), color.g(), color.b()), (0.0, 0.0, 0.0));
    }
}
