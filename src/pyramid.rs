use crate::coord::IntCoord;
use crate::error::{HoleFillError, Result};

/// `patchWidth` must be an odd integer in `[3, 50]`.
pub fn patch_width_valid(patch_width: i32) -> bool {
    (3..=50).contains(&patch_width) && patch_width % 2 == 1
}

/// The ratio `k_smallest` applied at the coarsest pyramid level: the
/// larger of the hard minimum forced by `patchWidth` and the ideal
/// minimum dimension of ~50px, per §3 "Pyramid level".
pub fn smallest_pyramid_level_ratio(
    target_original: IntCoord,
    source_original: IntCoord,
    patch_width: i32,
) -> Result<f64> {
    if !patch_width_valid(patch_width) {
        return Err(HoleFillError::invalid_input("patch width must be an odd integer in [3, 50]"));
    }
    if target_original.x() < patch_width
        || target_original.y() < patch_width
        || source_original.x() < patch_width
        || source_original.y() < patch_width
    {
        return Err(HoleFillError::invalid_input("image dimensions must be at least patchWidth"));
    }

    let min_dim = target_original
        .x()
        .min(target_original.y())
        .min(source_original.x())
        .min(source_original.y()) as f64;
    let max_target_dim = target_original.x().max(target_original.y()) as f64;

    let k_hard_min = patch_width as f64 / min_dim;
    let k_ideal = 50.0 / max_target_dim;
    Ok(k_hard_min.max(k_ideal))
}

/// Derives `(targetSize, sourceSize)` at pyramid `level`. Level 0 returns
/// the originals verbatim; the coarsest level (`numLevels - 1`) scales by
/// `k_smallest`; intermediate levels scale by `k_smallest^(level / (numLevels-1))`
/// via `k = exp(log(k_smallest) / (numLevels - 1))`.
pub fn pyramid_level_sizes(
    level: i32,
    num_levels: i32,
    patch_width: i32,
    target_original: IntCoord,
    source_original: IntCoord,
) -> Result<(IntCoord, IntCoord)> {
    if num_levels < 1 {
        return Err(HoleFillError::invalid_input("numPyramidLevels must be >= 1"));
    }
    if level < 0 || level > num_levels - 1 {
        return Err(HoleFillError::invalid_input("pyramid level out of range"));
    }

    if num_levels == 1 {
        return Ok((target_original, source_original));
    }

    let k_smallest = smallest_pyramid_level_ratio(target_original, source_original, patch_width)?;

    if level == num_levels - 1 {
        return Ok((
            scale_truncating(target_original, k_smallest),
            scale_truncating(source_original, k_smallest),
        ));
    }
    if level == 0 {
        return Ok((target_original, source_original));
    }

    let k = (k_smallest.ln() / ((num_levels - 1) as f64)).exp();
    let scale = k.powi(level);
    Ok((scale_truncating(target_original, scale), scale_truncating(source_original, scale)))
}

fn scale_truncating(size: IntCoord, scale: f64) -> IntCoord {
    IntCoord::new(
        ((size.x() as f64) * scale) as i32,
        ((size.y() as f64) * scale) as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_is_identity() {
        let target = IntCoord::new(64, 64);
        let source = IntCoord::new(64, 64);
        let (t, s) = pyramid_level_sizes(0, 3, 5, target, source).unwrap();
        assert_eq!(t, target);
        assert_eq!(s, source);
    }

    #[test]
    fn coarsest_level_at_least_patch_width() {
        let target = IntCoord::new(64, 64);
        let source = IntCoord::new(64, 64);
        let (t, s) = pyramid_level_sizes(2, 3, 5, target, source).unwrap();
        assert!(t.x() >= 5 && t.y() >= 5);
        assert!(s.x() >= 5 && s.y() >= 5);
    }

    #[test]
    fn rejects_bad_patch_width() {
        let target = IntCoord::new(64, 64);
        assert!(pyramid_level_sizes(0, 3, 4, target, target).is_err());
        assert!(pyramid_level_sizes(0, 3, 51, target, target).is_err());
    }

    #[test]
    fn rejects_undersized_images() {
        let small = IntCoord::new(3, 3);
        assert!(pyramid_level_sizes(0, 3, 5, small, small).is_err());
    }

    #[test]
    fn single_level_is_always_identity() {
        let target = IntCoord::new(17, 23);
        let source = IntCoord::new(40, 41);
        let (t, s) = pyramid_level_sizes(0, 1, 5, target, source).unwrap();
        assert_eq!(t, target);
        assert_eq!(s, source);
    }
}
