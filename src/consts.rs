//! Numeric constants shared by lights and BSDFs that don't already live on
//! `std::f32::consts` under the name pbrt-derived code expects.

use crate::Float;

pub const PI: Float = std::f32::consts::PI;
pub const FRAC_1_PI: Float = std::f32::consts::FRAC_1_PI;
pub const FRAC_PI_2: Float = std::f32::consts::FRAC_PI_2;
pub const FRAC_PI_4: Float = std::f32::consts::FRAC_PI_4;
pub const INV_2_PI: Float = 1.0 / (2.0 * std::f32::consts::PI);
pub const INV_4_PI: Float = 1.0 / (4.0 * std::f32::consts::PI);
