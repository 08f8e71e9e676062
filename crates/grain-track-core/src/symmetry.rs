//! Crystallographic point-group symmetry tables.
//!
//! Each table lists the proper rotations (orthogonal, det = +1) that leave
//! the lattice invariant. The identity is always the first operator.

use crate::orientation::{Orientation, OrientationError};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors produced while selecting or validating a symmetry table.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SymmetryError {
    #[error("unsupported crystal class `{0}`")]
    UnsupportedCrystalClass(String),
    #[error("symmetry table is empty")]
    EmptyTable,
    #[error("symmetry operator {index} is not a proper rotation")]
    InvalidOperator { index: usize },
}

/// Crystal classes with a built-in symmetry table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrystalClass {
    /// Cubic holohedry `m-3m`, 24 proper rotations.
    #[default]
    Cubic,
    /// Hexagonal holohedry `6/mmm`, 12 proper rotations.
    Hexagonal,
    /// Tetrahedral `23`, 12 proper rotations.
    Tetrahedral,
}

impl CrystalClass {
    pub const ALL: [CrystalClass; 3] = [
        CrystalClass::Cubic,
        CrystalClass::Hexagonal,
        CrystalClass::Tetrahedral,
    ];

    /// Literal operator rows for this class.
    fn operators(self) -> &'static [[[f64; 3]; 3]] {
        match self {
            CrystalClass::Cubic => &CUBIC,
            CrystalClass::Hexagonal => &HEXAGONAL,
            CrystalClass::Tetrahedral => &TETRAHEDRAL,
        }
    }
}

impl fmt::Display for CrystalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrystalClass::Cubic => "cubic",
            CrystalClass::Hexagonal => "hexagonal",
            CrystalClass::Tetrahedral => "tetrahedral",
        };
        f.write_str(name)
    }
}

impl FromStr for CrystalClass {
    type Err = SymmetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cubic" | "m-3m" | "m3m" => Ok(CrystalClass::Cubic),
            "hexagonal" | "6/mmm" => Ok(CrystalClass::Hexagonal),
            "tetrahedral" | "23" => Ok(CrystalClass::Tetrahedral),
            _ => Err(SymmetryError::UnsupportedCrystalClass(s.to_string())),
        }
    }
}

/// A set of symmetry operators used by the misorientation metric.
///
/// Built-in tables come from [`SymmetryTable::for_class`]; a custom group can
/// be swapped in with [`SymmetryTable::from_matrices`].
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetryTable {
    operators: Vec<Matrix3<f64>>,
}

impl SymmetryTable {
    /// Built-in table for a crystal class.
    pub fn for_class(class: CrystalClass) -> Self {
        Self {
            operators: class.operators().iter().map(from_rows).collect(),
        }
    }

    /// Custom table. Every matrix must be orthogonal with determinant +1.
    pub fn from_matrices(operators: Vec<Matrix3<f64>>) -> Result<Self, SymmetryError> {
        if operators.is_empty() {
            return Err(SymmetryError::EmptyTable);
        }
        for (index, op) in operators.iter().enumerate() {
            if !is_proper_rotation(op) {
                return Err(SymmetryError::InvalidOperator { index });
            }
        }
        Ok(Self { operators })
    }

    #[inline]
    pub fn operators(&self) -> &[Matrix3<f64>] {
        &self.operators
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Misorientation angle (radians) between `a` and `b` under this group.
    pub fn misorientation(
        &self,
        a: &Orientation,
        b: &Orientation,
    ) -> Result<f64, OrientationError> {
        a.misorientation(b, self)
    }
}

impl Default for SymmetryTable {
    fn default() -> Self {
        Self::for_class(CrystalClass::Cubic)
    }
}

/// Look up the symmetry matrices for a crystal class by name.
pub fn get_symmetry_matrices(crystal_class: &str) -> Result<Vec<Matrix3<f64>>, SymmetryError> {
    let class: CrystalClass = crystal_class.parse()?;
    Ok(SymmetryTable::for_class(class).operators)
}

fn from_rows(rows: &[[f64; 3]; 3]) -> Matrix3<f64> {
    Matrix3::new(
        rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
        rows[2][1], rows[2][2],
    )
}

fn is_proper_rotation(m: &Matrix3<f64>) -> bool {
    const TOL: f64 = 1e-6;
    if !m.iter().all(|v| v.is_finite()) {
        return false;
    }
    let ortho = (m.transpose() * m - Matrix3::identity()).abs().max();
    ortho < TOL && (m.determinant() - 1.0).abs() < TOL
}

/// √3 / 2
const H: f64 = 0.866_025_403_784_438_6;

#[rustfmt::skip]
const CUBIC: [[[f64; 3]; 3]; 24] = [
    [[ 1.0,  0.0,  0.0], [ 0.0,  1.0,  0.0], [ 0.0,  0.0,  1.0]],
    // 90° about <100>
    [[ 1.0,  0.0,  0.0], [ 0.0,  0.0, -1.0], [ 0.0,  1.0,  0.0]],
    [[ 1.0,  0.0,  0.0], [ 0.0,  0.0,  1.0], [ 0.0, -1.0,  0.0]],
    [[ 0.0, -1.0,  0.0], [ 1.0,  0.0,  0.0], [ 0.0,  0.0,  1.0]],
    [[ 0.0,  1.0,  0.0], [-1.0,  0.0,  0.0], [ 0.0,  0.0,  1.0]],
    [[ 0.0,  0.0, -1.0], [ 0.0,  1.0,  0.0], [ 1.0,  0.0,  0.0]],
    [[ 0.0,  0.0,  1.0], [ 0.0,  1.0,  0.0], [-1.0,  0.0,  0.0]],
    // 120° about <111>
    [[ 0.0, -1.0,  0.0], [ 0.0,  0.0, -1.0], [ 1.0,  0.0,  0.0]],
    [[ 0.0, -1.0,  0.0], [ 0.0,  0.0,  1.0], [-1.0,  0.0,  0.0]],
    [[ 0.0,  1.0,  0.0], [ 0.0,  0.0, -1.0], [-1.0,  0.0,  0.0]],
    [[ 0.0,  1.0,  0.0], [ 0.0,  0.0,  1.0], [ 1.0,  0.0,  0.0]],
    [[ 0.0,  0.0, -1.0], [-1.0,  0.0,  0.0], [ 0.0,  1.0,  0.0]],
    [[ 0.0,  0.0, -1.0], [ 1.0,  0.0,  0.0], [ 0.0, -1.0,  0.0]],
    [[ 0.0,  0.0,  1.0], [-1.0,  0.0,  0.0], [ 0.0, -1.0,  0.0]],
    [[ 0.0,  0.0,  1.0], [ 1.0,  0.0,  0.0], [ 0.0,  1.0,  0.0]],
    // 180° about <100>
    [[-1.0,  0.0,  0.0], [ 0.0, -1.0,  0.0], [ 0.0,  0.0,  1.0]],
    [[-1.0,  0.0,  0.0], [ 0.0,  1.0,  0.0], [ 0.0,  0.0, -1.0]],
    [[ 1.0,  0.0,  0.0], [ 0.0, -1.0,  0.0], [ 0.0,  0.0, -1.0]],
    // 180° about <110>
    [[-1.0,  0.0,  0.0], [ 0.0,  0.0, -1.0], [ 0.0, -1.0,  0.0]],
    [[-1.0,  0.0,  0.0], [ 0.0,  0.0,  1.0], [ 0.0,  1.0,  0.0]],
    [[ 0.0, -1.0,  0.0], [-1.0,  0.0,  0.0], [ 0.0,  0.0, -1.0]],
    [[ 0.0,  1.0,  0.0], [ 1.0,  0.0,  0.0], [ 0.0,  0.0, -1.0]],
    [[ 0.0,  0.0, -1.0], [ 0.0, -1.0,  0.0], [-1.0,  0.0,  0.0]],
    [[ 0.0,  0.0,  1.0], [ 0.0, -1.0,  0.0], [ 1.0,  0.0,  0.0]],
];

#[rustfmt::skip]
const HEXAGONAL: [[[f64; 3]; 3]; 12] = [
    // k·60° about [0001]
    [[ 1.0,  0.0,  0.0], [ 0.0,  1.0,  0.0], [ 0.0,  0.0,  1.0]],
    [[ 0.5,   -H,  0.0], [   H,  0.5,  0.0], [ 0.0,  0.0,  1.0]],
    [[-0.5,   -H,  0.0], [   H, -0.5,  0.0], [ 0.0,  0.0,  1.0]],
    [[-1.0,  0.0,  0.0], [ 0.0, -1.0,  0.0], [ 0.0,  0.0,  1.0]],
    [[-0.5,    H,  0.0], [  -H, -0.5,  0.0], [ 0.0,  0.0,  1.0]],
    [[ 0.5,    H,  0.0], [  -H,  0.5,  0.0], [ 0.0,  0.0,  1.0]],
    // 180° about basal axes at m·30°
    [[ 1.0,  0.0,  0.0], [ 0.0, -1.0,  0.0], [ 0.0,  0.0, -1.0]],
    [[ 0.5,    H,  0.0], [   H, -0.5,  0.0], [ 0.0,  0.0, -1.0]],
    [[-0.5,    H,  0.0], [   H,  0.5,  0.0], [ 0.0,  0.0, -1.0]],
    [[-1.0,  0.0,  0.0], [ 0.0,  1.0,  0.0], [ 0.0,  0.0, -1.0]],
    [[-0.5,   -H,  0.0], [  -H,  0.5,  0.0], [ 0.0,  0.0, -1.0]],
    [[ 0.5,   -H,  0.0], [  -H, -0.5,  0.0], [ 0.0,  0.0, -1.0]],
];

#[rustfmt::skip]
const TETRAHEDRAL: [[[f64; 3]; 3]; 12] = [
    [[ 1.0,  0.0,  0.0], [ 0.0,  1.0,  0.0], [ 0.0,  0.0,  1.0]],
    // 120° about <111>
    [[ 0.0, -1.0,  0.0], [ 0.0,  0.0, -1.0], [ 1.0,  0.0,  0.0]],
    [[ 0.0, -1.0,  0.0], [ 0.0,  0.0,  1.0], [-1.0,  0.0,  0.0]],
    [[ 0.0,  1.0,  0.0], [ 0.0,  0.0, -1.0], [-1.0,  0.0,  0.0]],
    [[ 0.0,  1.0,  0.0], [ 0.0,  0.0,  1.0], [ 1.0,  0.0,  0.0]],
    [[ 0.0,  0.0, -1.0], [-1.0,  0.0,  0.0], [ 0.0,  1.0,  0.0]],
    [[ 0.0,  0.0, -1.0], [ 1.0,  0.0,  0.0], [ 0.0, -1.0,  0.0]],
    [[ 0.0,  0.0,  1.0], [-1.0,  0.0,  0.0], [ 0.0, -1.0,  0.0]],
    [[ 0.0,  0.0,  1.0], [ 1.0,  0.0,  0.0], [ 0.0,  1.0,  0.0]],
    // 180° about <100>
    [[-1.0,  0.0,  0.0], [ 0.0, -1.0,  0.0], [ 0.0,  0.0,  1.0]],
    [[-1.0,  0.0,  0.0], [ 0.0,  1.0,  0.0], [ 0.0,  0.0, -1.0]],
    [[ 1.0,  0.0,  0.0], [ 0.0, -1.0,  0.0], [ 0.0,  0.0, -1.0]],
];
