//! Optimal rigid superposition via the Kabsch algorithm.
//!
//! Computes the rotation and translation minimizing the sum of squared
//! distances between a moving point set and a fixed point set of equal
//! size: centroid removal, cross-covariance accumulation, SVD, and a
//! determinant correction guaranteeing a proper rotation (det +1, never a
//! reflection).

use super::geometry;
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SuperpositionError {
    #[error("Point set sizes differ: {moving} (moving) vs {fixed} (fixed)")]
    SizeMismatch { moving: usize, fixed: usize },

    #[error("Cannot superpose empty point sets")]
    Empty,

    #[error("Singular value decomposition of the covariance matrix failed")]
    Decomposition,
}

/// A rigid-body transform: rotation followed by translation.
///
/// The transform found on one point set (e.g. stem Cα atoms) can be applied
/// to any other point set sharing the same local frame, which is how a
/// superposition found on stems is carried over to the residues between
/// them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl RigidTransform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            rotation: Rotation3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Maps a single point through the transform.
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.rotation * point + self.translation
    }

    /// Maps a whole point set through the transform.
    pub fn apply_all(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        points.iter().map(|p| self.apply(p)).collect()
    }

    /// The inverse transform, undoing this one.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }
}

/// The result of an optimal superposition: the transform and the RMSD of
/// the transformed moving set against the fixed set.
#[derive(Debug, Clone, Copy)]
pub struct Superposition {
    pub transform: RigidTransform,
    pub rmsd: f64,
}

/// Finds the least-squares rigid transform mapping `moving` onto `fixed`.
///
/// Requires equal-size, non-empty point sets. Fewer than 3 non-collinear
/// points yields an ill-conditioned but still-computed transform; callers
/// are responsible for supplying anchor sets with enough points.
pub fn superpose(
    moving: &[Point3<f64>],
    fixed: &[Point3<f64>],
) -> Result<Superposition, SuperpositionError> {
    if moving.len() != fixed.len() {
        return Err(SuperpositionError::SizeMismatch {
            moving: moving.len(),
            fixed: fixed.len(),
        });
    }
    let centroid_moving = geometry::centroid(moving).ok_or(SuperpositionError::Empty)?;
    let centroid_fixed = geometry::centroid(fixed).ok_or(SuperpositionError::Empty)?;

    // Cross-covariance H = sum over pairs of (moving - cm) (fixed - cf)^T.
    let mut h = Matrix3::zeros();
    for (m, f) in moving.iter().zip(fixed.iter()) {
        let mc = m - centroid_moving;
        let fc = f - centroid_fixed;
        h += mc * fc.transpose();
    }

    let svd = h.svd(true, true);
    let u = svd.u.ok_or(SuperpositionError::Decomposition)?;
    let v_t = svd.v_t.ok_or(SuperpositionError::Decomposition)?;
    let mut v = v_t.transpose();

    let mut rotation_matrix = v * u.transpose();
    if rotation_matrix.determinant() < 0.0 {
        // Reflection correction: negate the column of V paired with the
        // smallest singular value (last column, nalgebra sorts descending).
        v.set_column(2, &(-v.column(2)));
        rotation_matrix = v * u.transpose();
    }

    let rotation = Rotation3::from_matrix_unchecked(rotation_matrix);
    let translation = centroid_fixed.coords - rotation * centroid_moving.coords;
    let transform = RigidTransform {
        rotation,
        translation,
    };

    let transformed = transform.apply_all(moving);
    let rmsd = geometry::calculate_rmsd(&transformed, fixed).ok_or(SuperpositionError::Empty)?;

    Ok(Superposition { transform, rmsd })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_tetrahedron() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn identical_sets_superpose_with_zero_rmsd() {
        let points = unit_tetrahedron();
        let result = superpose(&points, &points).unwrap();
        assert_relative_eq!(result.rmsd, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn pure_translation_is_recovered_exactly() {
        let fixed = unit_tetrahedron();
        let shift = Vector3::new(10.0, -20.0, 30.0);
        let moving: Vec<_> = fixed.iter().map(|p| p + shift).collect();
        let result = superpose(&moving, &fixed).unwrap();
        assert_relative_eq!(result.rmsd, 0.0, epsilon = 1e-9);
        assert_relative_eq!(result.transform.translation, -shift, epsilon = 1e-9);
    }

    #[test]
    fn rotation_about_z_is_recovered() {
        let fixed = unit_tetrahedron();
        let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        let moving: Vec<_> = fixed.iter().map(|p| rot * p).collect();
        let result = superpose(&moving, &fixed).unwrap();
        assert_relative_eq!(result.rmsd, 0.0, epsilon = 1e-9);
        assert_relative_eq!(
            result.transform.rotation.matrix().determinant(),
            1.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn alignment_never_increases_rmsd() {
        let fixed = unit_tetrahedron();
        let moving = vec![
            Point3::new(0.1, 0.0, 0.2),
            Point3::new(1.1, -0.1, 0.0),
            Point3::new(0.0, 0.9, 0.1),
            Point3::new(-0.1, 0.0, 1.1),
        ];
        let before = geometry::calculate_rmsd(&moving, &fixed).unwrap();
        let result = superpose(&moving, &fixed).unwrap();
        assert!(result.rmsd <= before + 1e-12);
    }

    #[test]
    fn transform_round_trips_through_inverse() {
        let fixed = unit_tetrahedron();
        let rot = Rotation3::from_axis_angle(&Vector3::y_axis(), 0.7);
        let moving: Vec<_> = fixed
            .iter()
            .map(|p| rot * p + Vector3::new(3.0, -1.0, 2.0))
            .collect();
        let result = superpose(&moving, &fixed).unwrap();

        let forward = result.transform.apply_all(&moving);
        let back = result.transform.inverse().apply_all(&forward);
        for (original, returned) in moving.iter().zip(back.iter()) {
            assert_relative_eq!(original, returned, epsilon = 1e-9);
        }
    }

    #[test]
    fn reflected_set_gets_proper_rotation_not_mirror() {
        // A mirrored tetrahedron cannot be matched by a proper rotation, so
        // the RMSD stays positive and the determinant stays +1.
        let fixed = unit_tetrahedron();
        let moving: Vec<_> = fixed
            .iter()
            .map(|p| Point3::new(-p.x, p.y, p.z))
            .collect();
        let result = superpose(&moving, &fixed).unwrap();
        assert_relative_eq!(
            result.transform.rotation.matrix().determinant(),
            1.0,
            epsilon = 1e-9
        );
        assert!(result.rmsd > 0.1);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let a = unit_tetrahedron();
        let b = &a[..3];
        assert_eq!(
            superpose(&a, b).unwrap_err(),
            SuperpositionError::SizeMismatch {
                moving: 4,
                fixed: 3
            }
        );
    }

    #[test]
    fn empty_sets_are_rejected() {
        assert_eq!(superpose(&[], &[]).unwrap_err(), SuperpositionError::Empty);
    }
}
