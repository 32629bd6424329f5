use crate::color::Rgb;
use crate::coord::IntCoord;
use crate::image::Image;

/// Weighted sum-of-squared-differences between the patch centered at
/// `source_anchor` in `source` and the patch centered at `target_anchor`
/// in `target`, weighted per target pixel by `anchor_weights`. Both
/// anchors must be possible anchor positions (the caller is responsible
/// for having checked this; patches are never allowed to straddle the
/// image border). Exits early, returning the partial sum, as soon as the
/// running sum exceeds `cost_not_to_exceed`.
pub fn patch_cost(
    source_anchor: IntCoord,
    target_anchor: IntCoord,
    patch_width: i32,
    source: &Image<Rgb>,
    target: &Image<Rgb>,
    anchor_weights: &Image<f64>,
    cost_not_to_exceed: f64,
) -> f64 {
    let half = patch_width / 2;
    let mut sum = 0.0;
    for dy in -half..=half {
        for dx in -half..=half {
            let offset = IntCoord::new(dx, dy);
            let target_coord = target_anchor + offset;
            let source_coord = source_anchor + offset;

            let source_color = *source.get(source_coord);
            let target_color = *target.get(target_coord);
            let contribution = source_color.squared_diff(target_color) * anchor_weights.get(target_coord);

            sum += contribution;
            if sum > cost_not_to_exceed {
                return sum;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_patches_cost_zero() {
        let source = Image::new(10, 10, Rgb::new(0.3, 0.4, 0.5));
        let target = source.clone();
        let weights = Image::new(10, 10, 1.0);
        let cost = patch_cost(IntCoord::new(5, 5), IntCoord::new(5, 5), 5, &source, &target, &weights, f64::MAX);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn early_exit_returns_partial_sum() {
        let mut source = Image::new(10, 10, Rgb::new(0.0, 0.0, 0.0));
        let mut target = Image::new(10, 10, Rgb::new(0.0, 0.0, 0.0));
        for y in 0..10 {
            for x in 0..10 {
                source.set(IntCoord::new(x, y), Rgb::new(1.0, 0.0, 0.0));
            }
        }
        let weights = Image::new(10, 10, 1.0);
        let full_cost = patch_cost(IntCoord::new(5, 5), IntCoord::new(5, 5), 5, &source, &target, &weights, f64::MAX);
        let partial = patch_cost(IntCoord::new(5, 5), IntCoord::new(5, 5), 5, &source, &target, &weights, 0.5);
        assert!(partial <= full_cost);
        assert!(partial > 0.5 || partial == full_cost);
        let _ = &mut target;
    }

    #[test]
    fn weights_scale_contribution() {
        let source = Image::new(10, 10, Rgb::new(1.0, 0.0, 0.0));
        let target = Image::new(10, 10, Rgb::new(0.0, 0.0, 0.0));
        let low_weights = Image::new(10, 10, 0.01);
        let high_weights = Image::new(10, 10, 100.0);
        let low = patch_cost(IntCoord::new(5, 5), IntCoord::new(5, 5), 3, &source, &target, &low_weights, f64::MAX);
        let high = patch_cost(IntCoord::new(5, 5), IntCoord::new(5, 5), 3, &source, &target, &high_weights, f64::MAX);
        assert!(high > low);
    }
}
