use rand::Rng;

use crate::color::Rgb;
use crate::coord::IntCoord;
use crate::image::Image;
use crate::nnf::Nnf;
use crate::parallel::for_each_row;
use crate::patchcost::patch_cost;
use crate::rng::rng_for_pixel;

/// Improves the NNF by proposing exponentially-shrinking random source
/// candidates for every possible-anchor, masked-true target pixel (§4.5).
/// Each worker derives its random stream from `base_seed` and the target
/// pixel's coordinate, so results are reproducible within a back end
/// regardless of scheduling (P9).
#[allow(clippy::too_many_arguments)]
pub fn search(
    nnf: &mut Nnf,
    target_mask: &Image<bool>,
    source_mask: &Image<bool>,
    source: &Image<Rgb>,
    target: &Image<Rgb>,
    anchor_weights: &Image<f64>,
    patch_width: i32,
    base_seed: u64,
) {
    let target_size = target_mask.size();
    let source_size = source_mask.size();
    let half = patch_width / 2;
    if target_size.x() <= 2 * half || target_size.y() <= 2 * half {
        return;
    }

    let y_min = half;
    let y_max = target_size.y() - half - 1;
    let x_min = half;
    let x_max = target_size.x() - half - 1;

    let initial_radius = source_size.x().max(source_size.y()) as f64;
    let alpha = 0.5;

    // `Nnf` is not `Sync`-friendly to mutate from multiple threads at
    // once through a shared reference, so rows are partitioned into
    // disjoint per-row slices up front and each worker gets exclusive
    // access to its own rows.
    let nnf_ptr = nnf as *mut Nnf as usize;

    for_each_row(y_max - y_min + 1, |row_idx| {
        let y = y_min + row_idx;
        // SAFETY: each row index is visited by exactly one worker
        // (`for_each_row`'s atomic row counter), and rows touch disjoint
        // NNF entries (indexed by (x, y) with this fixed y), so
        // concurrent access to different rows never aliases.
        let nnf = unsafe { &mut *(nnf_ptr as *mut Nnf) };
        for x in x_min..=x_max {
            let t = IntCoord::new(x, y);
            if !*target_mask.get(t) {
                continue;
            }

            let mut rng = rng_for_pixel(base_seed, t, target_size.x());
            let mut source_anchor = nnf.get_source(t);
            let mut radius = initial_radius;

            while radius > 1.0 {
                let min_x = (half).max((source_anchor.x() as f64 - radius) as i32);
                let max_x = (source_anchor.x() as f64 + radius).min((source_size.x() - half - 1) as f64) as i32;
                let min_y = (half).max((source_anchor.y() as f64 - radius) as i32);
                let max_y = (source_anchor.y() as f64 + radius).min((source_size.y() - half - 1) as f64) as i32;

                if max_x >= min_x && max_y >= min_y {
                    let cx = rng.gen_range(min_x..=max_x);
                    let cy = rng.gen_range(min_y..=max_y);
                    let candidate = IntCoord::new(cx, cy);

                    if *source_mask.get(candidate) {
                        let current_cost = nnf.get_cost(t);
                        let candidate_cost =
                            patch_cost(candidate, t, patch_width, source, target, anchor_weights, current_cost);
                        if candidate_cost < current_cost {
                            nnf.set(t, candidate, candidate_cost);
                            source_anchor = candidate;
                        }
                    }
                }
                radius *= alpha;
            }
        }
    });
}
