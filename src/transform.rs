use crate::matrix::Matrix4;
use crate::vector::Vector3;

use serde::Deserialize;

// Note on usage of Transforms: All calculations in this program are typically
// done in terms of world space. If an object can cache data in terms of
// world space and still function correctly, that is the approach that is
// preferred. Most Transforms, therefore, will not make it past the
// deserialization and loading step before being consumed. For any objects
// that require Transformations during runtime, this should be handled
// internally in the implementation of that object, and all inputs and
// outputs should be assumed to be world space unless otherwise specified.
#[derive(Deserialize)]
pub struct Transform {
    #[serde(default = "Vector3::new_empty")]
    translate: Vector3,
    #[serde(default = "default_rotation_axis")]
    rotate_axis: Vector3,
    #[serde(default)]
    rotate_angle_degrees: f64,
    #[serde(default = "default_scale")]
    scale: Vector3,
}

fn default_rotation_axis() -> Vector3 {
    Vector3::new(0.0, 1.0, 0.0)
}

fn default_scale() -> Vector3 {
    Vector3::new(1.0, 1.0, 1.0)
}

impl Transform {
    pub fn new() -> Transform {
        Transform {
            translate: Vector3::new_empty(),
            rotate_axis: default_rotation_axis(),
            rotate_angle_degrees: 0.0,
            scale: default_scale(),
        }
    }

    pub fn create_matrix(&self) -> Matrix4 {
        Matrix4::new_translation(&self.translate)
            * Matrix4::new_rotation(&self.rotate_axis, self.rotate_angle_degrees.to_radians())
            * Matrix4::new_scale(&self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transform_is_identity_translation() {
        let t = Transform::new();
        let m = t.create_matrix();
        let p = crate::point::Point3::new(1.0, 2.0, 3.0);
        let p2 = &m * p;
        assert!((p2.x() - 1.0).abs() < 1e-9);
        assert!((p2.y() - 2.0).abs() < 1e-9);
        assert!((p2.z() - 3.0).abs() < 1e-9);
    }
}
