use crate::color::Rgb;
use crate::coord::{is_possible_anchor_position, IntCoord};
use crate::image::Image;
use crate::nnf::Nnf;
use crate::patchcost::patch_cost;

/// Selects which propagation scheme the CPU driver runs (§4.6). Line
/// order is the spec's default; jump flood is the parallel-friendly
/// alternative, runtime-selectable here rather than compile-time-only
/// (see SPEC_FULL.md's propagation supplement).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Propagation {
    LineOrder,
    JumpFlood,
}

impl Default for Propagation {
    fn default() -> Self {
        Propagation::LineOrder
    }
}

pub fn propagate(
    nnf: &mut Nnf,
    target_mask: &Image<bool>,
    source_mask: &Image<bool>,
    source: &Image<Rgb>,
    target: &Image<Rgb>,
    anchor_weights: &Image<f64>,
    patch_width: i32,
    scheme: Propagation,
) {
    match scheme {
        Propagation::LineOrder => {
            propagate_line_order(nnf, target_mask, source_mask, source, target, anchor_weights, patch_width, true);
            propagate_line_order(nnf, target_mask, source_mask, source, target, anchor_weights, patch_width, false);
        }
        Propagation::JumpFlood => {
            propagate_jump_flood(nnf, target_mask, source_mask, source, target, anchor_weights, patch_width);
        }
    }
}

/// One sequential pass: forward (`top_to_bottom = true`) examines
/// neighbor offsets `(-1, 0)` and `(0, -1)`; reverse negates both the
/// scan direction and the offsets. Strictly sequential within a pass;
/// the two passes are ordered (forward then reverse), per §5.
#[allow(clippy::too_many_arguments)]
fn propagate_line_order(
    nnf: &mut Nnf,
    target_mask: &Image<bool>,
    source_mask: &Image<bool>,
    source: &Image<Rgb>,
    target: &Image<Rgb>,
    anchor_weights: &Image<f64>,
    patch_width: i32,
    top_to_bottom: bool,
) {
    let half = patch_width / 2;
    let target_size = target_mask.size();
    let source_size = source_mask.size();
    if target_size.x() <= 2 * half || target_size.y() <= 2 * half {
        return;
    }

    let inc: i32 = if top_to_bottom { 1 } else { -1 };
    let (y_start, y_end_exclusive) = if top_to_bottom {
        (half, target_size.y() - half)
    } else {
        (target_size.y() - half - 1, half - 1)
    };
    let (x_start, x_end_exclusive) = if top_to_bottom {
        (half, target_size.x() - half)
    } else {
        (target_size.x() - half - 1, half - 1)
    };

    let offsets = [IntCoord::new(-inc, 0), IntCoord::new(0, -inc)];

    let mut y = y_start;
    while y != y_end_exclusive {
        let mut x = x_start;
        while x != x_end_exclusive {
            let anchor = IntCoord::new(x, y);
            if *target_mask.get(anchor) {
                for (c, &offset) in offsets.iter().enumerate() {
                    if c == 0 && x == x_start {
                        continue;
                    }
                    if c == 1 && y == y_start {
                        continue;
                    }
                    let neighbor = anchor + offset;
                    if !*target_mask.get(neighbor) {
                        continue;
                    }

                    let candidate = nnf.get_source(neighbor) - offset;
                    if !is_possible_anchor_position(candidate, patch_width, source_size) {
                        continue;
                    }
                    if !*source_mask.get(candidate) {
                        continue;
                    }

                    let current_cost = nnf.get_cost(anchor);
                    let candidate_cost =
                        patch_cost(candidate, anchor, patch_width, source, target, anchor_weights, current_cost);
                    if candidate_cost < current_cost {
                        nnf.set(anchor, candidate, candidate_cost);
                    }
                }
            }
            x += inc;
        }
        y += inc;
    }
}

/// Parallel-friendly jump-flood propagation: radius `k` starts at
/// `ceil(log2(max(W, H)))` and halves each round until it reaches 0. A
/// read buffer / write buffer pair avoids read-after-write hazards
/// within a round; the buffers are swapped (by toggling which is "read")
/// between rounds, with no data copy beyond the swap itself.
#[allow(clippy::too_many_arguments)]
fn propagate_jump_flood(
    nnf: &mut Nnf,
    target_mask: &Image<bool>,
    source_mask: &Image<bool>,
    source: &Image<Rgb>,
    target: &Image<Rgb>,
    anchor_weights: &Image<f64>,
    patch_width: i32,
) {
    let target_size = target_mask.size();
    let source_size = source_mask.size();
    let half = patch_width / 2;
    if target_size.x() <= 2 * half || target_size.y() <= 2 * half {
        return;
    }

    let target_dim = target_size.x().max(target_size.y()) as f64;
    let mut k = target_dim.log2().ceil() as i32;

    let mut read = Nnf::init(target_size.x(), target_size.y());
    std::mem::swap(&mut read, nnf);
    let mut write = Nnf::init(target_size.x(), target_size.y());

    let y_min = half;
    let y_max = target_size.y() - half - 1;
    let x_min = half;
    let x_max = target_size.x() - half - 1;

    while k > 0 {
        for y in y_min..=y_max {
            for x in x_min..=x_max {
                let t = IntCoord::new(x, y);
                let mut best_cost = read.get_cost(t);
                let mut best_coord = read.get_source(t);

                for i in [-k, 0, k] {
                    for j in [-k, 0, k] {
                        if i == 0 && j == 0 {
                            continue;
                        }
                        let voting_neighbor = t + IntCoord::new(i, j);
                        if !is_possible_anchor_position(voting_neighbor, patch_width, target_size) {
                            continue;
                        }
                        if !*target_mask.get(voting_neighbor) {
                            continue;
                        }
                        let candidate = read.get_source(voting_neighbor) - IntCoord::new(i, j);
                        if !is_possible_anchor_position(candidate, patch_width, source_size) {
                            continue;
                        }
                        if !*source_mask.get(candidate) {
                            continue;
                        }
                        let cost = patch_cost(candidate, t, patch_width, source, target, anchor_weights, best_cost);
                        if cost < best_cost {
                            best_cost = cost;
                            best_coord = candidate;
                        }
                    }
                }
                write.set(t, best_coord, best_cost);
            }
        }
        std::mem::swap(&mut read, &mut write);
        k /= 2;
    }

    *nnf = read;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nnf::initial_random_fill;

    fn checker_setup(size: i32) -> (Image<bool>, Image<bool>, Image<Rgb>, Image<Rgb>, Image<f64>) {
        let target_mask = Image::new(size, size, true);
        let source_mask = Image::new(size, size, true);
        let mut img = Image::new(size, size, Rgb::new(0.0, 0.0, 0.0));
        for y in 0..size {
            for x in 0..size {
                let v = (((x / 4) + (y / 4)) % 2) as f64;
                img.set(IntCoord::new(x, y), Rgb::new(v, v, v));
            }
        }
        let target = img.clone();
        let weights = Image::new(size, size, 1.0);
        (target_mask, source_mask, img, target, weights)
    }

    /// P2: propagate never increases cost.
    #[test]
    fn line_order_never_increases_cost() {
        let size = 24;
        let patch_width = 5;
        let (target_mask, source_mask, source, target, weights) = checker_setup(size);

        let mut nnf = Nnf::init(size, size);
        initial_random_fill(&mut nnf, &target_mask, &source_mask, &source, &target, &weights, patch_width, 42);

        let half = patch_width / 2;
        let before: Vec<f64> = (half..(size - half))
            .flat_map(|y| (half..(size - half)).map(move |x| (x, y)))
            .map(|(x, y)| nnf.get_cost(IntCoord::new(x, y)))
            .collect();

        propagate(&mut nnf, &target_mask, &source_mask, &source, &target, &weights, patch_width, Propagation::LineOrder);

        let mut i = 0;
        for y in half..(size - half) {
            for x in half..(size - half) {
                assert!(nnf.get_cost(IntCoord::new(x, y)) <= before[i] + 1e-9);
                i += 1;
            }
        }
    }

    #[test]
    fn jump_flood_never_increases_cost() {
        let size = 24;
        let patch_width = 5;
        let (target_mask, source_mask, source, target, weights) = checker_setup(size);

        let mut nnf = Nnf::init(size, size);
        initial_random_fill(&mut nnf, &target_mask, &source_mask, &source, &target, &weights, patch_width, 42);

        let half = patch_width / 2;
        let before: Vec<f64> = (half..(size - half))
            .flat_map(|y| (half..(size - half)).map(move |x| (x, y)))
            .map(|(x, y)| nnf.get_cost(IntCoord::new(x, y)))
            .collect();

        propagate(&mut nnf, &target_mask, &source_mask, &source, &target, &weights, patch_width, Propagation::JumpFlood);

        let mut i = 0;
        for y in half..(size - half) {
            for x in half..(size - half) {
                assert!(nnf.get_cost(IntCoord::new(x, y)) <= before[i] + 1e-9);
                i += 1;
            }
        }
    }
}
