use crate::color::Rgb;
use crate::coord::IntCoord;
use crate::image::Image;
use crate::nnf::Nnf;
use crate::parallel::for_each_row;

/// Composites the current NNF into a color image (§4.7). Every pixel not
/// in the target mask keeps its current target color unchanged. Every
/// masked pixel is a weighted average over every overlapping patch
/// anchor whose source anchor (after applying the coherence fix below)
/// is still a valid, unmasked source position; the weight is the
/// anchor-weight field value plus a coherence bonus rewarding source
/// anchors that agree with their own neighbors' implied offsets.
///
/// Unlike the original implementation this compares neighbor offsets
/// `(i, j)`, not `(i, i)` — the latter was a transcription bug that
/// collapsed the 3x3 coherence window onto its diagonal.
pub fn blend(
    nnf: &Nnf,
    target_mask: &Image<bool>,
    source_mask: &Image<bool>,
    source: &Image<Rgb>,
    current_target: &Image<Rgb>,
    anchor_weights: &Image<f64>,
    patch_width: i32,
) -> Image<Rgb> {
    let width = current_target.width();
    let height = current_target.height();
    let half = patch_width / 2;
    let mut dest = Image::new(width, height, Rgb::BLACK);
    let dest_ptr = &mut dest as *mut Image<Rgb> as usize;

    for_each_row(height, |y| {
        // SAFETY: each row is produced by exactly one worker and rows are
        // disjoint regions of `dest`.
        let dest = unsafe { &mut *(dest_ptr as *mut Image<Rgb>) };
        for x in 0..width {
            let t = IntCoord::new(x, y);
            if !*target_mask.get(t) {
                dest.set(t, *current_target.get(t));
                continue;
            }

            let mut sum = Rgb::new(0.0, 0.0, 0.0);
            let mut weight_sum = 0.0;
            let mut any_contributor = false;

            for patch_x in -half..=half {
                for patch_y in -half..=half {
                    let anchor_x = x + patch_x;
                    let anchor_y = y + patch_y;
                    if anchor_x < half
                        || anchor_y < half
                        || anchor_x > width - 1 - half
                        || anchor_y > height - 1 - half
                    {
                        continue;
                    }
                    let anchor = IntCoord::new(anchor_x, anchor_y);
                    if !*target_mask.get(anchor) {
                        continue;
                    }

                    let source_anchor = nnf.get_source(anchor);
                    let source_coord = source_anchor - IntCoord::new(patch_x, patch_y);
                    if !source_mask.is_valid_coord(source_coord) || !*source_mask.get(source_coord) {
                        continue;
                    }

                    let color = *source.get(source_coord);

                    let mut coherence = 0.0;
                    for i in -1..=1 {
                        for j in -1..=1 {
                            if i == 0 && j == 0 {
                                continue;
                            }
                            let neighbor = IntCoord::new(anchor_x + i, anchor_y + j);
                            if !target_mask.is_valid_coord(neighbor) {
                                continue;
                            }
                            let other_source_anchor = nnf.get_source(neighbor);
                            if other_source_anchor == source_anchor + IntCoord::new(i, j) {
                                coherence += 1.0;
                            }
                        }
                    }

                    let weight = *anchor_weights.get(anchor) + coherence * coherence * 0.5;
                    sum = sum + color * weight;
                    weight_sum += weight;
                    any_contributor = true;
                }
            }

            if any_contributor && weight_sum > 0.0 {
                dest.set(t, sum * (1.0 / weight_sum));
            } else {
                dest.set(t, Rgb::BLACK);
            }
        }
    });

    dest
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pixels outside the target mask are passed through unchanged.
    #[test]
    fn unmasked_pixels_pass_through() {
        let size = 12;
        let patch_width = 5;
        let mut target_mask = Image::new(size, size, true);
        target_mask.set(IntCoord::new(0, 0), false);
        let source_mask = Image::new(size, size, true);
        let source = Image::new(size, size, Rgb::new(0.4, 0.5, 0.6));
        let current_target = Image::new(size, size, Rgb::new(0.9, 0.1, 0.2));
        let weights = Image::new(size, size, 1.0);
        let nnf = Nnf::init(size, size);

        let dest = blend(&nnf, &target_mask, &source_mask, &source, &current_target, &weights, patch_width);
        assert_eq!(*dest.get(IntCoord::new(0, 0)), Rgb::new(0.9, 0.1, 0.2));
    }

    /// A uniform NNF pointing everywhere at the same flat-colored source
    /// patch reproduces that color exactly (no aliasing/weight bugs).
    #[test]
    fn uniform_source_reproduces_flat_color() {
        let size = 16;
        let patch_width = 5;
        let half = patch_width / 2;
        let target_mask = Image::new(size, size, true);
        let source_mask = Image::new(size, size, true);
        let flat = Rgb::new(0.3, 0.3, 0.3);
        let source = Image::new(size, size, flat);
        let current_target = Image::new(size, size, Rgb::new(0.0, 0.0, 0.0));
        let weights = Image::new(size, size, 1.0);

        let mut nnf = Nnf::init(size, size);
        for y in half..(size - half) {
            for x in half..(size - half) {
                nnf.set(IntCoord::new(x, y), IntCoord::new(x, y), 0.0);
            }
        }

        let dest = blend(&nnf, &target_mask, &source_mask, &source, &current_target, &weights, patch_width);
        for y in (half + 1)..(size - half - 1) {
            for x in (half + 1)..(size - half - 1) {
                let c = *dest.get(IntCoord::new(x, y));
                assert!((c.0.x - flat.0.x).abs() < 1e-9);
                assert!((c.0.y - flat.0.y).abs() < 1e-9);
                assert!((c.0.z - flat.0.z).abs() < 1e-9);
            }
        }
    }
}
