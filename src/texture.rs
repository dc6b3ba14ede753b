use crate::color::RGB;
use crate::point::Point3;

use serde::Deserialize;
use std::sync::Arc;

// Closed variant set dispatched dynamically so that scene JSON can name a
// texture by `type` and nest child textures (Checker's odd/even) the same
// way Materials nest Textures.
#[typetag::serde(tag = "type")]
pub trait Texture: Send + Sync {
    fn value(&self, u: f64, v: f64, p: &Point3) -> RGB;
}

#[derive(Deserialize)]
pub struct Constant {
    color: RGB,
}

#[typetag::serde]
impl Texture for Constant {
    fn value(&self, _u: f64, _v: f64, _p: &Point3) -> RGB {
        self.color
    }
}

#[derive(Deserialize)]
pub struct Checker {
    scale: f64,
    odd: Arc<dyn Texture>,
    even: Arc<dyn Texture>,
}

#[typetag::serde]
impl Texture for Checker {
    fn value(&self, u: f64, v: f64, p: &Point3) -> RGB {
        let sines =
            (self.scale * p.x()).sin() * (self.scale * p.y()).sin() * (self.scale * p.z()).sin();
        if sines < 0.0_f64 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_ignores_uv_and_position() {
        let t = Constant {
            color: RGB::new(0.1, 0.2, 0.3),
        };
        let a = t.value(0.0, 0.0, &Point3::origin());
        let b = t.value(1.0, 1.0, &Point3::new(9.0, 9.0, 9.0));
        assert_eq!((a.r(), a.g(), a.b()), (b.r(), b.g(), b.b()));
    }
}
