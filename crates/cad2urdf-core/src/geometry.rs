//! Geometry primitives
//!
//! Occurrence transforms arrive from the host as a flat 16-element row-major
//! array. They are kept in that shape and only lifted into a `glam` matrix when
//! a point has to be transformed.

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

/// Tolerance used for approximate vector comparison
pub const APPROX_TOLERANCE: f64 = 1e-6;

/// Affine transform stored as a row-major 4x4 array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transform(pub [f64; 16]);

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Pure translation
    pub fn from_translation(t: DVec3) -> Self {
        let mut m = Self::IDENTITY.0;
        m[3] = t.x;
        m[7] = t.y;
        m[11] = t.z;
        Self(m)
    }

    /// Rotation about Z followed by a translation
    pub fn from_rotation_z_translation(angle: f64, t: DVec3) -> Self {
        let (s, c) = angle.sin_cos();
        Self([
            c, -s, 0.0, t.x, //
            s, c, 0.0, t.y, //
            0.0, 0.0, 1.0, t.z, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Translation column (indices 3, 7, 11)
    pub fn translation(&self) -> DVec3 {
        DVec3::new(self.0[3], self.0[7], self.0[11])
    }

    /// Lift into a column-major `glam` matrix
    pub fn to_dmat4(&self) -> DMat4 {
        DMat4::from_cols_array(&self.0).transpose()
    }

    /// `p.x * ex + p.y * ey + p.z * ez + translation`
    pub fn transform_point(&self, p: DVec3) -> DVec3 {
        self.to_dmat4().transform_point3(p)
    }
}

/// Apply `m` to the point `p`
pub fn transform_point(m: &Transform, p: DVec3) -> DVec3 {
    m.transform_point(p)
}

/// True if the largest component-wise difference is below `tol`
pub fn approx_equal(a: DVec3, b: DVec3, tol: f64) -> bool {
    (a - b).abs().max_element() < tol
}

/// Round to a fixed number of fractional digits
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor;
    // Normalize -0.0 so it never leaks into output
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Round every component of a vector
pub fn round_vec(v: DVec3, precision: u32) -> DVec3 {
    DVec3::new(
        round_to(v.x, precision),
        round_to(v.y, precision),
        round_to(v.z, precision),
    )
}

/// Conversion from CAD linear units to meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Units {
    /// CAD length units per meter (100 for centimeters)
    pub length_scale: f64,
    /// Fractional digits kept after rounding
    pub precision: u32,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            length_scale: 100.0,
            precision: 6,
        }
    }
}

impl Units {
    pub fn round(&self, value: f64) -> f64 {
        round_to(value, self.precision)
    }

    pub fn round_vec(&self, v: DVec3) -> DVec3 {
        round_vec(v, self.precision)
    }

    /// CAD length to rounded meters
    pub fn to_meters(&self, value: f64) -> f64 {
        self.round(value / self.length_scale)
    }

    pub fn to_meters_vec(&self, v: DVec3) -> DVec3 {
        self.round_vec(v / self.length_scale)
    }
}
