use nalgebra::Point3;

/// Squared Euclidean distance between two points.
pub fn distance_squared(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm_squared()
}

/// Geometric centroid of a point set, or `None` for an empty set.
pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Root-mean-square deviation between two equal-size, paired point sets.
///
/// Does not perform any alignment; callers superpose first if they want the
/// optimal value. Returns `None` on size mismatch or empty input.
pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn distance_squared_matches_hand_computation() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(4.0, 6.0, 3.0);
        assert_relative_eq!(distance_squared(&a, &b), 25.0);
    }

    #[test]
    fn centroid_of_symmetric_points_is_origin() {
        let points = vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, -2.0, 0.0),
        ];
        let c = centroid(&points).unwrap();
        assert_relative_eq!(c.coords.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn centroid_of_empty_set_is_none() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn rmsd_of_identical_sets_is_zero() {
        let points = vec![Point3::new(1.0, 1.0, 1.0), Point3::new(2.0, 2.0, 2.0)];
        assert_relative_eq!(calculate_rmsd(&points, &points).unwrap(), 0.0);
    }

    #[test]
    fn rmsd_rejects_mismatched_sizes() {
        let a = vec![Point3::origin()];
        let b = vec![Point3::origin(), Point3::origin()];
        assert!(calculate_rmsd(&a, &b).is_none());
        assert!(calculate_rmsd(&[], &[]).is_none());
    }

    #[test]
    fn rmsd_of_uniformly_shifted_set() {
        let a = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let b = vec![Point3::new(0.0, 3.0, 0.0), Point3::new(1.0, 3.0, 0.0)];
        assert_relative_eq!(calculate_rmsd(&a, &b).unwrap(), 3.0);
    }
}
