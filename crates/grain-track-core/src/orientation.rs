//! Euler-Bunge orientations and the symmetry-reduced misorientation metric.
//!
//! An [`Orientation`] is a passive rotation from the sample frame to the
//! crystal frame, composed intrinsically as Z (φ1), X′ (Φ), Z″ (φ2).

use crate::symmetry::{CrystalClass, SymmetryTable};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Error returned for orientations the metric cannot handle.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum OrientationError {
    #[error("non-finite Euler angles ({phi1}, {phi}, {phi2})")]
    NonFinite { phi1: f64, phi: f64, phi2: f64 },
}

/// Euler-Bunge triple in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub phi1: f64,
    pub phi: f64,
    pub phi2: f64,
}

impl Orientation {
    pub const IDENTITY: Orientation = Orientation {
        phi1: 0.0,
        phi: 0.0,
        phi2: 0.0,
    };

    pub fn new(phi1: f64, phi: f64, phi2: f64) -> Self {
        Self { phi1, phi, phi2 }
    }

    pub fn from_degrees(phi1: f64, phi: f64, phi2: f64) -> Self {
        Self::new(phi1.to_radians(), phi.to_radians(), phi2.to_radians())
    }

    #[inline]
    pub fn to_array(&self) -> [f64; 3] {
        [self.phi1, self.phi, self.phi2]
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.phi1.is_finite() && self.phi.is_finite() && self.phi2.is_finite()
    }

    fn check_finite(&self) -> Result<(), OrientationError> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(OrientationError::NonFinite {
                phi1: self.phi1,
                phi: self.phi,
                phi2: self.phi2,
            })
        }
    }

    /// Bunge rotation matrix `g` mapping sample coordinates to crystal coordinates.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        let (s1, c1) = self.phi1.sin_cos();
        let (s, c) = self.phi.sin_cos();
        let (s2, c2) = self.phi2.sin_cos();

        Matrix3::new(
            c1 * c2 - s1 * s2 * c,
            s1 * c2 + c1 * s2 * c,
            s2 * s,
            -c1 * s2 - s1 * c2 * c,
            -s1 * s2 + c1 * c2 * c,
            c2 * s,
            s1 * s,
            -c1 * s,
            c,
        )
    }

    /// Recover Euler-Bunge angles from a rotation matrix.
    ///
    /// When Φ is 0 or π only φ1 ± φ2 is defined; φ2 is then set to zero.
    pub fn from_matrix(g: &Matrix3<f64>) -> Self {
        let phi = g[(2, 2)].clamp(-1.0, 1.0).acos();
        if phi.sin().abs() > 1e-9 {
            let phi1 = g[(2, 0)].atan2(-g[(2, 1)]);
            let phi2 = g[(0, 2)].atan2(g[(1, 2)]);
            Self::new(wrap_two_pi(phi1), phi, wrap_two_pi(phi2))
        } else {
            let phi1 = g[(0, 1)].atan2(g[(0, 0)]);
            Self::new(wrap_two_pi(phi1), phi, 0.0)
        }
    }

    /// Minimum rotation angle (radians) between `self` and `other` over all
    /// pairs of symmetry operators in `table`.
    pub fn misorientation(
        &self,
        other: &Orientation,
        table: &SymmetryTable,
    ) -> Result<f64, OrientationError> {
        self.check_finite()?;
        other.check_finite()?;

        let g1 = self.rotation_matrix();
        let g2 = other.rotation_matrix();
        let equiv1: Vec<Matrix3<f64>> = table.operators().iter().map(|s| s * g1).collect();
        let equiv2: Vec<Matrix3<f64>> = table.operators().iter().map(|s| s * g2).collect();

        // trace(A·Bᵀ) is the element-wise dot product of A and B.
        let mut best_cos = -1.0f64;
        for a in &equiv2 {
            for b in &equiv1 {
                let cos = 0.5 * (a.dot(b) - 1.0);
                if cos > best_cos {
                    best_cos = cos;
                }
            }
        }
        Ok(best_cos.clamp(-1.0, 1.0).acos())
    }
}

/// Symmetry-reduced misorientation angle (radians) for a built-in crystal class.
pub fn misorientation(
    e1: &Orientation,
    e2: &Orientation,
    crystal_class: CrystalClass,
) -> Result<f64, OrientationError> {
    e1.misorientation(e2, &SymmetryTable::for_class(crystal_class))
}

fn wrap_two_pi(angle: f64) -> f64 {
    angle.rem_euclid(std::f64::consts::TAU)
}
