//! Re-express arbitrary point lists through a base pose.

use nalgebra::Point3;

use crate::rigid_pose::{transform_points, transformation_matrix};
use crate::types::Pose;

/// Maps `vertices` given in `base`'s local frame through `base`'s transform.
///
/// The matrix is built once; output order matches input order.
pub fn relativize(vertices: &[Point3<f64>], base: &Pose) -> Vec<Point3<f64>> {
    let matrix = transformation_matrix(base);
    transform_points(&matrix, vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_zero_pose_is_identity() {
        let vertices = vec![
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(-4.5, 0.0, 9.25),
            Point3::origin(),
        ];
        assert_eq!(relativize(&vertices, &Pose::zero()), vertices);
    }

    #[test]
    fn test_half_turn_about_z() {
        let base = Pose::zero().with_offset(1.0, 1.0, 0.0).with_orientation(0.0, 0.0, PI);
        let out = relativize(&[Point3::new(2.0, 0.0, 5.0)], &base);
        assert_relative_eq!(out[0], Point3::new(-1.0, 1.0, 5.0), epsilon = 1e-12);
    }

    #[test]
    fn test_empty_input() {
        let base = Pose::zero().with_orientation(0.3, 0.2, 0.1);
        assert!(relativize(&[], &base).is_empty());
    }

    proptest! {
        #[test]
        fn prop_zero_pose_identity(coords in prop::collection::vec((-1e4..1e4f64, -1e4..1e4f64, -1e4..1e4f64), 0..32)) {
            let vertices: Vec<Point3<f64>> = coords.iter().map(|&(x, y, z)| Point3::new(x, y, z)).collect();
            let out = relativize(&vertices, &Pose::zero());
            prop_assert_eq!(out.len(), vertices.len());
            for (a, b) in out.iter().zip(&vertices) {
                prop_assert!((a - b).norm() < 1e-9);
            }
        }
    }
}
