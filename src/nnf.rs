use rand::Rng;

use crate::color::Rgb;
use crate::coord::{is_possible_anchor_position, IntCoord};
use crate::image::Image;
use crate::patchcost::patch_cost;
use crate::rng::rng_for_pixel;

/// Dense spatial correspondence from every valid target coordinate to a
/// source-patch anchor, plus the last computed match cost. Steady-state
/// invariant (P1): for every target coordinate `t` that is both a
/// possible anchor position and masked `true`, `source_coords[t]` is a
/// possible anchor position in the source image, `match_costs[t]` equals
/// the last computed `patch_cost` between the two patches (or the
/// sentinel `f64::MAX` if unknown).
pub struct Nnf {
    source_coords: Image<IntCoord>,
    match_costs: Image<f64>,
}

impl Nnf {
    /// Zeros the coordinate image and costs image for a target of the
    /// given dimensions.
    pub fn init(width: i32, height: i32) -> Self {
        Nnf {
            source_coords: Image::new(width, height, IntCoord::new(0, 0)),
            match_costs: Image::new(width, height, 0.0),
        }
    }

    pub fn width(&self) -> i32 {
        self.source_coords.width()
    }

    pub fn height(&self) -> i32 {
        self.source_coords.height()
    }

    pub fn size(&self) -> IntCoord {
        self.source_coords.size()
    }

    #[inline]
    pub fn get_source(&self, target: IntCoord) -> IntCoord {
        *self.source_coords.get(target)
    }

    #[inline]
    pub fn get_cost(&self, target: IntCoord) -> f64 {
        *self.match_costs.get(target)
    }

    #[inline]
    pub fn set(&mut self, target: IntCoord, source: IntCoord, cost: f64) {
        self.source_coords.set(target, source);
        self.match_costs.set(target, cost);
    }
}

/// Randomly initializes the NNF at the coarsest pyramid level: for every
/// possible-anchor, masked-true target coordinate, up to
/// `10 * max(targetSize.x, targetSize.y)` random draws of source anchors
/// are attempted; the first draw landing on an unmasked source position
/// wins. If every draw lands on a masked position, the last draw is
/// stored with cost `+inf`.
pub fn initial_random_fill(
    nnf: &mut Nnf,
    target_mask: &Image<bool>,
    source_mask: &Image<bool>,
    source: &Image<Rgb>,
    target: &Image<Rgb>,
    anchor_weights: &Image<f64>,
    patch_width: i32,
    base_seed: u64,
) {
    let target_size = nnf.size();
    let source_size = source_mask.size();
    let max_tries = 10 * target_size.x().max(target_size.y());
    let half = patch_width / 2;

    for y in half..(target_size.y() - half) {
        for x in half..(target_size.x() - half) {
            let t = IntCoord::new(x, y);
            if !*target_mask.get(t) {
                continue;
            }

            let mut rng = rng_for_pixel(base_seed, t, target_size.x());
            let mut last_draw = IntCoord::new(half, half);
            let mut found = false;
            for _ in 0..max_tries.max(1) {
                let sx = half + rng.gen_range(0..(source_size.x() - patch_width + 1).max(1));
                let sy = half + rng.gen_range(0..(source_size.y() - patch_width + 1).max(1));
                let candidate = IntCoord::new(sx, sy);
                last_draw = candidate;
                if *source_mask.get(candidate) {
                    let cost = patch_cost(candidate, t, patch_width, source, target, anchor_weights, f64::MAX);
                    nnf.set(t, candidate, cost);
                    found = true;
                    break;
                }
            }
            if !found {
                nnf.set(t, last_draw, f64::MAX);
            }
        }
    }
}

/// Upsamples `prev` (an NNF over the coarser level) into a fresh NNF over
/// the finer `new_target_size`/`new_source_size`. For each fine target
/// coordinate, the corresponding coarse coordinate is the nearest
/// neighbor, scaled linearly; if that coarse coordinate was a valid,
/// masked anchor and its stored source anchor scales into a valid,
/// unmasked fine source anchor, that anchor is reused; otherwise a
/// random source anchor is drawn.
///
/// Every entry this function produces carries the cost sentinel `+inf`:
/// the finer level's target image does not exist yet (it is built from
/// this very NNF, by `blend`, immediately afterward), so no real
/// `patch_cost` can be computed here. The caller is responsible for a
/// follow-up pass recomputing real costs once the finer target image
/// exists.
#[allow(clippy::too_many_arguments)]
pub fn upsample(
    prev: &Nnf,
    prev_target_mask: &Image<bool>,
    prev_source_size: IntCoord,
    new_target_mask: &Image<bool>,
    new_source_mask: &Image<bool>,
    new_target_size: IntCoord,
    new_source_size: IntCoord,
    patch_width: i32,
    base_seed: u64,
) -> Nnf {
    let mut next = Nnf::init(new_target_size.x(), new_target_size.y());
    let old_size = prev.size();

    let half = patch_width / 2;
    for y in half..(new_target_size.y() - half) {
        for x in half..(new_target_size.x() - half) {
            let t = IntCoord::new(x, y);
            if !*new_target_mask.get(t) {
                continue;
            }

            let old_x = ((x as f64) / ((new_target_size.x() - 1) as f64) * ((old_size.x() - 1) as f64)) as i32;
            let old_y = ((y as f64) / ((new_target_size.y() - 1) as f64) * ((old_size.y() - 1) as f64)) as i32;
            let old_coord = IntCoord::new(old_x, old_y);

            let mut used_upsampled = false;
            if is_possible_anchor_position(old_coord, patch_width, old_size) && *prev_target_mask.get(old_coord) {
                let old_source = prev.get_source(old_coord);
                let scaled = IntCoord::new(
                    ((old_source.x() as f64) / ((prev_source_size.x() - 1) as f64) * ((new_source_size.x() - 1) as f64))
                        as i32,
                    ((old_source.y() as f64) / ((prev_source_size.y() - 1) as f64) * ((new_source_size.y() - 1) as f64))
                        as i32,
                );
                if is_possible_anchor_position(scaled, patch_width, new_source_size) && *new_source_mask.get(scaled) {
                    next.set(t, scaled, f64::MAX);
                    used_upsampled = true;
                }
            }

            if !used_upsampled {
                random_assign_one(&mut next, t, new_source_mask, new_target_size, new_source_size, patch_width, base_seed);
            }
        }
    }
    next
}

/// Draws up to `10 * max(targetSize)` random source anchors, stopping at
/// the first that lands on an unmasked position; every draw (successful
/// or not) is stored with cost sentinel `+inf`, matching the original's
/// "guarantee valid, best-effort unmasked" loop.
fn random_assign_one(
    nnf: &mut Nnf,
    t: IntCoord,
    source_mask: &Image<bool>,
    target_size: IntCoord,
    source_size: IntCoord,
    patch_width: i32,
    base_seed: u64,
) {
    let half = patch_width / 2;
    let max_tries = (10 * target_size.x().max(target_size.y())).max(1);
    let mut rng = rng_for_pixel(base_seed, t, target_size.x());
    for _ in 0..max_tries {
        let sx = half + rng.gen_range(0..(source_size.x() - patch_width + 1).max(1));
        let sy = half + rng.gen_range(0..(source_size.y() - patch_width + 1).max(1));
        let candidate = IntCoord::new(sx, sy);
        nnf.set(t, candidate, f64::MAX);
        if *source_mask.get(candidate) {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_zeros_everything() {
        let nnf = Nnf::init(4, 4);
        assert_eq!(nnf.get_source(IntCoord::new(1, 1)), IntCoord::new(0, 0));
        assert_eq!(nnf.get_cost(IntCoord::new(1, 1)), 0.0);
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut nnf = Nnf::init(4, 4);
        nnf.set(IntCoord::new(1, 1), IntCoord::new(2, 2), 3.5);
        assert_eq!(nnf.get_source(IntCoord::new(1, 1)), IntCoord::new(2, 2));
        assert_eq!(nnf.get_cost(IntCoord::new(1, 1)), 3.5);
    }

    /// P1 (partial): after initial random fill, every masked/anchorable
    /// target maps to a possible anchor in the source, and when the
    /// source is entirely unmasked, a finite cost is always found.
    #[test]
    fn initial_fill_lands_on_unmasked_source_when_available() {
        let size = 20;
        let patch_width = 5;
        let target_mask = Image::new(size, size, true);
        let source_mask = Image::new(size, size, true);
        let source = Image::new(size, size, Rgb::new(0.2, 0.3, 0.4));
        let target = Image::new(size, size, Rgb::new(0.2, 0.3, 0.4));
        let weights = Image::new(size, size, 1.0);
        let mut nnf = Nnf::init(size, size);

        initial_random_fill(&mut nnf, &target_mask, &source_mask, &source, &target, &weights, patch_width, 42);

        let half = patch_width / 2;
        for y in half..(size - half) {
            for x in half..(size - half) {
                let t = IntCoord::new(x, y);
                let s = nnf.get_source(t);
                assert!(is_possible_anchor_position(s, patch_width, IntCoord::new(size, size)));
                assert!(nnf.get_cost(t) < f64::MAX);
            }
        }
    }

    #[test]
    fn upsample_produces_valid_anchors_everywhere() {
        let coarse_size = 10;
        let fine_size = 20;
        let patch_width = 5;

        let coarse_mask = Image::new(coarse_size, coarse_size, true);
        let coarse_source_mask = Image::new(coarse_size, coarse_size, true);
        let coarse_source = Image::new(coarse_size, coarse_size, Rgb::new(0.1, 0.1, 0.1));
        let coarse_target = Image::new(coarse_size, coarse_size, Rgb::new(0.1, 0.1, 0.1));
        let coarse_weights = Image::new(coarse_size, coarse_size, 1.0);
        let mut coarse_nnf = Nnf::init(coarse_size, coarse_size);
        initial_random_fill(
            &mut coarse_nnf,
            &coarse_mask,
            &coarse_source_mask,
            &coarse_source,
            &coarse_target,
            &coarse_weights,
            patch_width,
            42,
        );

        let fine_mask = Image::new(fine_size, fine_size, true);
        let fine_source_mask = Image::new(fine_size, fine_size, true);

        let fine_nnf = upsample(
            &coarse_nnf,
            &coarse_mask,
            IntCoord::new(coarse_size, coarse_size),
            &fine_mask,
            &fine_source_mask,
            IntCoord::new(fine_size, fine_size),
            IntCoord::new(fine_size, fine_size),
            patch_width,
            42,
        );

        let half = patch_width / 2;
        for y in half..(fine_size - half) {
            for x in half..(fine_size - half) {
                let t = IntCoord::new(x, y);
                let s = fine_nnf.get_source(t);
                assert!(is_possible_anchor_position(s, patch_width, IntCoord::new(fine_size, fine_size)));
            }
        }
    }
}
