use crate::base::BasicThreeTuple;
use crate::utils::clamp;

use serde::Deserialize;
use std::ops;

#[derive(Deserialize)]
pub struct RGB(pub BasicThreeTuple<f64>);

impl Copy for RGB {}
impl Clone for RGB {
    fn clone(&self) -> RGB {
        *self
    }
}

const GAMMA_EXPONENT: f64 = 1.0 / 2.0;
const QUANTIZE_CLAMP_MAX: f64 = 0.999;
const COLOR_SPACE: f64 = 256.0;

impl RGB {
    pub fn new(r: f64, g: f64, b: f64) -> RGB {
        RGB(BasicThreeTuple::new(r, g, b))
    }

    pub fn black() -> RGB {
        RGB(BasicThreeTuple::new(0_f64, 0_f64, 0_f64))
    }

    pub fn r(&self) -> f64 {
        self.0.x
    }
    pub fn g(&self) -> f64 {
        self.0.y
    }
    pub fn b(&self) -> f64 {
        self.0.z
    }

    // The reference gamma-corrects with exponent 1/2 (a plain square root),
    // not the conventional 1/2.2.
    pub fn gamma_corrected(&self) -> RGB {
        RGB::new(
            self.r().powf(GAMMA_EXPONENT),
            self.g().powf(GAMMA_EXPONENT),
            self.b().powf(GAMMA_EXPONENT),
        )
    }

    // Produces the (r, g, b) byte triple written to the PPM body:
    // gamma-correct, clamp to [0, 0.999], quantize to [0, 255].
    pub fn to_ppm_triple(&self) -> (u8, u8, u8) {
        let gamma = self.gamma_corrected();
        (
            quantize(gamma.r()),
            quantize(gamma.g()),
            quantize(gamma.b()),
        )
    }
}

fn quantize(c: f64) -> u8 {
    (COLOR_SPACE * clamp(c, 0.0, QUANTIZE_CLAMP_MAX)).floor() as u8
}

impl ops::Mul for RGB {
    type Output = RGB;
    fn mul(self, rhs: RGB) -> RGB {
        RGB(self.0.mul(rhs.0))
    }
}

impl ops::Add for RGB {
    type Output = RGB;
    fn add(self, rhs: RGB) -> RGB {
        RGB(self.0.add(rhs.0))
    }
}

impl ops::Mul<f64> for RGB {
    type Output = RGB;
    fn mul(self, rhs: f64) -> RGB {
        RGB(self.0.mul(rhs))
    }
}

impl ops::Div<f64> for RGB {
    type Output = RGB;
    fn div(self, rhs: f64) -> RGB {
        RGB(self.0.div(rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_round_trip() {
        let c = 0.64_f64;
        let squared = c.powi(2);
        let roundtrip = squared.powf(0.5);
        assert!((roundtrip - c).abs() < 1e-9);
    }

    #[test]
    fn quantize_clamps_above_one() {
        let (r, g, b) = RGB::new(10.0, 10.0, 10.0).to_ppm_triple();
        assert_eq!((r, g, b), (255, 255, 255));
    }

    #[test]
    fn quantize_black_is_zero() {
        assert_eq!(RGB::black().to_ppm_triple(), (0, 0, 0));
    }
}
