use crate::coord::IntCoord;
use crate::image::Image;

/// Two-pass chamfer-like bidirectional distance map. Pixels marked `true`
/// in `mask` (inside the hole) receive positive values (interior depth,
/// `+1.0` at the boundary, increasing inward); pixels marked `false`
/// receive negative values (`-1.0` just outside the boundary, decreasing
/// outward). The forward pass propagates from the top-left, the backward
/// pass from the bottom-right, exactly mirroring
/// `core::imageUtility::getDistanceMapBidirectional` in the original
/// implementation.
pub fn distance_map_bidirectional(mask: &Image<bool>) -> Image<f64> {
    let (w, h) = (mask.width(), mask.height());
    let mut dist = Image::new(w, h, 0.0);

    // First pass: forward scan, top-left to bottom-right.
    for y in 0..h {
        for x in 0..w {
            let coord = IntCoord::new(x, y);
            if *mask.get(coord) {
                let above = if y == 0 { 0.0 } else { dist.get(IntCoord::new(x, y - 1)).max(0.0) };
                let left = if x == 0 { 0.0 } else { dist.get(IntCoord::new(x - 1, y)).max(0.0) };
                dist.set(coord, above.min(left) + 1.0);
            } else {
                let left = if x == 0 { -(w as f64) } else { dist.get(IntCoord::new(x - 1, y)).min(0.0) };
                let up = if y == 0 { -(h as f64) } else { dist.get(IntCoord::new(x, y - 1)).min(0.0) };
                dist.set(coord, left.max(up) - 1.0);
            }
        }
    }

    // Second pass: backward scan, bottom-right to top-left.
    for y in (0..h).rev() {
        for x in (0..w).rev() {
            let coord = IntCoord::new(x, y);
            if !*mask.get(coord) {
                let val_here = *dist.get(coord);
                let right = if x < w - 1 { dist.get(IntCoord::new(x + 1, y)).min(1.0) } else { val_here - 1.0 };
                let down = if y < h - 1 { dist.get(IntCoord::new(x, y + 1)).min(1.0) } else { val_here - 1.0 };
                let candidate = (right - 1.0).max(down - 1.0);
                dist.set(coord, candidate.max(*dist.get(coord)));
            } else {
                let val_here = *dist.get(coord);
                let right = if x < w - 1 { dist.get(IntCoord::new(x + 1, y)).max(0.0) } else { 0.0 };
                let down = if y < h - 1 { dist.get(IntCoord::new(x, y + 1)).max(0.0) } else { 0.0 };
                dist.set(coord, val_here.min((right + 1.0).min(down + 1.0)));
            }
        }
    }

    dist
}
