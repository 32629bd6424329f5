use crate::distance::distance_map_bidirectional;
use crate::image::Image;

/// Weight assigned to every pixel outside the hole (`d < 0`).
pub const OUTSIDE_HOLE_WEIGHT: f64 = 100.0;

/// Base of the geometric decay applied to interior (in-hole) weights.
pub const GAMMA: f64 = 2.0;

/// Builds the anchor-weight field from the current-level target mask:
/// pixels outside the hole get a flat weight of 100 (so that exterior
/// participants still contribute meaningfully to patch cost); pixels
/// inside the hole decay geometrically with depth (`gamma^-d`), doubled
/// within the rim band `0 <= d <= patchWidth/2`.
pub fn anchor_weight_field(target_mask: &Image<bool>, patch_width: i32) -> Image<f64> {
    let dist = distance_map_bidirectional(target_mask);
    let overlap_dist = (patch_width / 2) as f64;

    let mut weights = Image::new(dist.width(), dist.height(), 0.0);
    for (coord, &d) in dist.iter_coords() {
        let weight = if d < 0.0 {
            OUTSIDE_HOLE_WEIGHT
        } else {
            let mut w = GAMMA.powf(-d);
            if d <= overlap_dist {
                w *= 2.0;
            }
            w
        };
        weights.set(coord, weight);
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::IntCoord;

    /// P8: exterior weight is exactly 100; weight strictly decays with
    /// depth beyond the rim band.
    #[test]
    fn exterior_weight_is_exactly_100() {
        let mask = Image::new(10, 10, false);
        let weights = anchor_weight_field(&mask, 5);
        for (_, &w) in weights.iter_coords() {
            assert_eq!(w, OUTSIDE_HOLE_WEIGHT);
        }
    }

    #[test]
    fn deep_hole_weight_decays_below_shallow_weight() {
        let mut mask = Image::new(20, 20, false);
        for y in 2..18 {
            for x in 2..18 {
                mask.set(IntCoord::new(x, y), true);
            }
        }
        let weights = anchor_weight_field(&mask, 5);
        let shallow = *weights.get(IntCoord::new(3, 9));
        let deep = *weights.get(IntCoord::new(9, 9));
        assert!(deep < shallow);
        assert!(deep < 1.0);
    }

    #[test]
    fn rim_band_is_doubled_relative_to_plain_decay() {
        let mut mask = Image::new(20, 20, false);
        for y in 2..18 {
            for x in 2..18 {
                mask.set(IntCoord::new(x, y), true);
            }
        }
        let weights = anchor_weight_field(&mask, 5);
        // d=1 is within the rim band (<=2), so weight should be 2*gamma^-1 = 1.0.
        let rim = *weights.get(IntCoord::new(3, 9));
        assert!((rim - 1.0).abs() < 1e-9);
    }
}
