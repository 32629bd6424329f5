use crate::coord::IntCoord;
use crate::error::{HoleFillError, Result};
use crate::image::Image;

/// Binary dilation of `source` by a `structure` structuring element
/// anchored at `structure_anchor`. For each output pixel, the pixel is
/// marked `true` if any `true`-marked cell of `structure`, when
/// translated so its anchor sits at that output pixel, lands on a
/// `true`-marked cell of `source`.
///
/// `structure` must have odd width and height; fails with
/// `InternalInvariantViolated` otherwise (this is a fatal programmer
/// error, not a recoverable input condition).
pub fn dilate(structure: &Image<bool>, structure_anchor: IntCoord, source: &Image<bool>) -> Result<Image<bool>> {
    if structure.width() % 2 == 0 || structure.height() % 2 == 0 {
        return Err(HoleFillError::internal_invariant("structuring element must have odd dimensions"));
    }

    let mut target = Image::new(source.width(), source.height(), false);
    for y in 0..source.height() {
        for x in 0..source.width() {
            let here = IntCoord::new(x, y);
            let mut mark = false;
            'search: for sy in 0..structure.height() {
                for sx in 0..structure.width() {
                    if !*structure.get(IntCoord::new(sx, sy)) {
                        continue;
                    }
                    let to_check = here - (IntCoord::new(sx, sy) - structure_anchor);
                    if !source.is_valid_coord(to_check) {
                        continue;
                    }
                    if *source.get(to_check) {
                        mark = true;
                        break 'search;
                    }
                }
            }
            target.set(here, mark);
        }
    }
    Ok(target)
}
