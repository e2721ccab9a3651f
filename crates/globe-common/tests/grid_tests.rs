//! Tests for grid axes, masking and bounding boxes.

use globe_common::grid::{arange_len, axis_overshoot, build_axis, Grid, MaskedArray};
use test_utils::assert_axis_steps;

// ============================================================================
// Axis construction
// ============================================================================

#[test]
fn test_axis_length_always_matches_dimension() {
    for len in [1usize, 2, 7, 360] {
        // Exclusive endpoint
        assert_eq!(build_axis(0.0, len as f64, 1.0, len).len(), len);
        // Inclusive endpoint (one extra step)
        assert_eq!(build_axis(0.0, len as f64 + 1.0, 1.0, len).len(), len);
        // Descending
        assert_eq!(build_axis(90.0, 90.0 - len as f64, -1.0, len).len(), len);
    }
}

#[test]
fn test_axis_fractional_resolution() {
    let axis = build_axis(-130.0, -60.0, 0.125, 560);
    assert_eq!(axis.len(), 560);
    assert_eq!(axis[0], -130.0);
    assert_axis_steps!(axis, -130.0, 0.125, 1e-9);
    assert_eq!(arange_len(-130.0, -60.0, 0.125), 560);
}

#[test]
fn test_axis_zero_length() {
    assert!(build_axis(0.0, 10.0, 1.0, 0).is_empty());
}

#[test]
fn test_axis_overshoot_past_far_edge() {
    // Fits inside [0, 10)
    assert_eq!(axis_overshoot(0.0, 10.0, 1.0, 10), None);
    // Truncated axes never overshoot
    assert_eq!(axis_overshoot(0.0, 10.0, 1.0, 4), None);

    // Five samples of a three-cell range end one cell past the edge
    let axis = build_axis(0.0, 3.0, 1.0, 5);
    assert_axis_steps!(axis, 0.0, 1.0, 0.0);
    assert_eq!(axis_overshoot(0.0, 3.0, 1.0, 5), Some(1.0));

    // Descending latitude axes measure along the step
    assert_eq!(axis_overshoot(90.0, 87.0, -1.0, 5), Some(1.0));
    assert_eq!(axis_overshoot(90.0, 87.0, -1.0, 3), None);
}

// ============================================================================
// Grid invariants
// ============================================================================

#[test]
fn test_grid_from_descending_y() {
    let values = MaskedArray::from_values(3, 2, vec![1.0; 6], |_| false).unwrap();
    let grid = Grid::new(
        build_axis(0.0, 2.0, 1.0, 2),
        build_axis(3.0, 0.0, -1.0, 3),
        values,
        "Temperature [C]",
    )
    .unwrap();

    assert_eq!(grid.shape(), (3, 2));
    assert_eq!(grid.x(), &[0.0, 1.0]);
    assert_eq!(grid.y(), &[3.0, 2.0, 1.0]);
    assert_eq!(grid.label(), "Temperature [C]");
}

#[test]
fn test_grid_rejects_axis_with_nan() {
    let values = MaskedArray::from_values(1, 2, vec![1.0; 2], |_| false).unwrap();
    assert!(Grid::new(vec![0.0, f64::NAN], vec![1.0], values, "t").is_err());
}

#[test]
fn test_nan_filled_marks_masked_cells() {
    let values = MaskedArray::from_values(1, 3, vec![0.0, 2.0, 3.0], |v| v == 0.0).unwrap();
    let filled = values.to_nan_filled();
    assert!(filled[0].is_nan());
    assert_eq!(&filled[1..], &[2.0, 3.0]);
}
