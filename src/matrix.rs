use crate::aggregate::AABB;
use crate::point::Point3;
use crate::ray::Ray;
use crate::vector::Vector3;

use std::ops;

pub struct Matrix4 {
    // Row first ordering
    data: [[f64; 4]; 4],
}

impl Clone for Matrix4 {
    fn clone(&self) -> Matrix4 {
        Matrix4 { data: self.data }
    }
}

impl Matrix4 {
    pub fn new() -> Matrix4 {
        Matrix4 {
            data: [[0_f64; 4]; 4],
        }
    }

    pub fn new_identity() -> Matrix4 {
        let mut data = [[0_f64; 4]; 4];
        data[0][0] = 1.0_f64;
        data[1][1] = 1.0_f64;
        data[2][2] = 1.0_f64;
        data[3][3] = 1.0_f64;
        Matrix4 { data: data }
    }

    pub fn new_translation(translate: &Vector3) -> Matrix4 {
        let mut m = Matrix4::new_identity();
        m.data[0][3] = translate.x();
        m.data[1][3] = translate.y();
        m.data[2][3] = translate.z();
        m
    }

    pub fn new_scale(scale: &Vector3) -> Matrix4 {
        let mut m = Matrix4::new_identity();
        m.data[0][0] = scale.x();
        m.data[1][1] = scale.y();
        m.data[2][2] = scale.z();
        m
    }

    // Rodrigues' rotation formula: rotates by `angle_radians` about an
    // arbitrary, not-necessarily-axis-aligned unit axis. This is the form
    // the camera uses to tilt its viewport deltas about the view direction.
    pub fn new_rotation(axis: &Vector3, angle_radians: f64) -> Matrix4 {
        let a = axis.normalized();
        let s = angle_radians.sin();
        let c = angle_radians.cos();
        let one_minus_c = 1.0_f64 - c;

        let mut m = Matrix4::new_identity();
        m.data[0][0] = c + a.x() * a.x() * one_minus_c;
        m.data[0][1] = a.x() * a.y() * one_minus_c - a.z() * s;
        m.data[0][2] = a.x() * a.z() * one_minus_c + a.y() * s;

        m.data[1][0] = a.y() * a.x() * one_minus_c + a.z() * s;
        m.data[1][1] = c + a.y() * a.y() * one_minus_c;
        m.data[1][2] = a.y() * a.z() * one_minus_c - a.x() * s;

        m.data[2][0] = a.z() * a.x() * one_minus_c - a.y() * s;
        m.data[2][1] = a.z() * a.y() * one_minus_c + a.x() * s;
        m.data[2][2] = c + a.z() * a.z() * one_minus_c;

        m
    }

    // World-to-camera basis transform: places the camera at `eye` looking
    // toward `target` with `up` completing the basis. Not consumed by the
    // camera itself (which derives its basis directly), but provided as a
    // general affine utility for placing other objects.
    pub fn new_look_at(eye: &Point3, target: &Point3, up: &Vector3) -> Matrix4 {
        let forward = (*target - *eye).normalized();
        let right = forward.cross(*up).normalized();
        let true_up = right.cross(forward);

        let mut m = Matrix4::new_identity();
        m.data[0][0] = right.x();
        m.data[0][1] = right.y();
        m.data[0][2] = right.z();
        m.data[1][0] = true_up.x();
        m.data[1][1] = true_up.y();
        m.data[1][2] = true_up.z();
        m.data[2][0] = -forward.x();
        m.data[2][1] = -forward.y();
        m.data[2][2] = -forward.z();
        m.data[0][3] = -right.dot(*eye - Point3::origin());
        m.data[1][3] = -true_up.dot(*eye - Point3::origin());
        m.data[2][3] = forward.dot(*eye - Point3::origin());
        m
    }

    // Standard right-handed perspective projection matrix, fov given in
    // radians, mapping view-space z onto [-1, 1] for z in [near, far].
    pub fn new_perspective(fov_y_radians: f64, aspect: f64, near: f64, far: f64) -> Matrix4 {
        let mut m = Matrix4::new();
        let tan_half_fov = (fov_y_radians / 2.0_f64).tan();

        m.data[0][0] = 1.0_f64 / (aspect * tan_half_fov);
        m.data[1][1] = 1.0_f64 / tan_half_fov;
        m.data[2][2] = (far + near) / (near - far);
        m.data[2][3] = (2.0_f64 * far * near) / (near - far);
        m.data[3][2] = -1.0_f64;
        m
    }

    // Gauss-Jordan Elimination
    // from https://www.scratchapixel.com/lessons/mathematics-physics-for-computer-graphics/matrix-inverse
    pub fn inverse(&self) -> Result<Matrix4, &'static str> {
        let mut temp = self.clone();
        let mut res = Matrix4::new_identity();
        for col in 0..4 {
            if temp.data[col][col] == 0.0_f64 {
                let mut big = col;
                for row in 0..4 {
                    if temp.data[row][col].abs() > temp.data[big][col].abs() {
                        big = row;
                    }
                }
                if big == col {
                    return Err("Singular matrix");
                } else {
                    for j in 0..4 {
                        // mem::swap does not work here because we cannot have
                        // two mutable references to the array at once
                        let t = temp.data[col][j];
                        temp.data[col][j] = temp.data[big][j];
                        temp.data[big][j] = t;

                        let t = res.data[col][j];
                        res.data[col][j] = res.data[big][j];
                        res.data[big][j] = t;
                    }
                }
            }
            for row in 0..4 {
                if row != col {
                    let coeff = temp.data[row][col] / temp.data[col][col];
                    if coeff != 0.0_f64 {
                        for j in 0..4 {
                            temp.data[row][j] -= coeff * temp.data[col][j];
                            res.data[row][j] -= coeff * res.data[col][j];
                        }
                        temp.data[row][col] = 0.0_f64;
                    }
                }
            }
        }
        for row in 0..4 {
            for col in 0..4 {
                res.data[row][col] /= temp.data[row][row];
            }
        }
        Ok(res)
    }
}

impl ops::Mul for Matrix4 {
    type Output = Matrix4;
    fn mul(self, rhs: Matrix4) -> Matrix4 {
        let mut m = Matrix4::new();
        for row in 0..4 {
            for col in 0..4 {
                m.data[row][col] = self.data[row][0] * rhs.data[0][col]
                    + self.data[row][1] * rhs.data[1][col]
                    + self.data[row][2] * rhs.data[2][col]
                    + self.data[row][3] * rhs.data[3][col];
            }
        }
        m
    }
}

impl ops::Mul<Vector3> for &Matrix4 {
    type Output = Vector3;
    fn mul(self, rhs: Vector3) -> Vector3 {
        Vector3::new(
            self.data[0][0] * rhs.x() + self.data[0][1] * rhs.y() + self.data[0][2] * rhs.z(),
            self.data[1][0] * rhs.x() + self.data[1][1] * rhs.y() + self.data[1][2] * rhs.z(),
            self.data[2][0] * rhs.x() + self.data[2][1] * rhs.y() + self.data[2][2] * rhs.z(),
        )
    }
}

impl ops::Mul<Point3> for &Matrix4 {
    type Output = Point3;
    fn mul(self, rhs: Point3) -> Point3 {
        Point3::new(
            self.data[0][0] * rhs.x()
                + self.data[0][1] * rhs.y()
                + self.data[0][2] * rhs.z()
                + self.data[0][3],
            self.data[1][0] * rhs.x()
                + self.data[1][1] * rhs.y()
                + self.data[1][2] * rhs.z()
                + self.data[1][3],
            self.data[2][0] * rhs.x()
                + self.data[2][1] * rhs.y()
                + self.data[2][2] * rhs.z()
                + self.data[2][3],
        )
    }
}

impl ops::Mul<&Ray> for &Matrix4 {
    type Output = Ray;
    fn mul(self, rhs: &Ray) -> Ray {
        Ray::new(self * rhs.origin, self * rhs.dir)
    }
}

impl ops::Mul<&AABB> for &Matrix4 {
    type Output = AABB;
    fn mul(self, rhs: &AABB) -> AABB {
        AABB::new(self * rhs.min, self * rhs.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_times_point_is_unchanged() {
        let m = Matrix4::new_identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        let p2 = &m * p;
        assert_eq!((p2.x(), p2.y(), p2.z()), (1.0, 2.0, 3.0));
    }

    #[test]
    fn rotation_about_z_by_90_degrees_maps_x_to_y() {
        let m = Matrix4::new_rotation(&Vector3::new(0.0, 0.0, 1.0), std::f64::consts::FRAC_PI_2);
        let v = &m * Vector3::new(1.0, 0.0, 0.0);
        assert!((v.x()).abs() < 1e-9);
        assert!((v.y() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn inverse_of_translation_undoes_it() {
        let t = Vector3::new(3.0, -2.0, 1.0);
        let m = Matrix4::new_translation(&t);
        let inv = m.inverse().unwrap();
        let p = &inv * (&m * Point3::origin());
        assert!((p.x()).abs() < 1e-9);
        assert!((p.y()).abs() < 1e-9);
        assert!((p.z()).abs() < 1e-9);
    }
}
