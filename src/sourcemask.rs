use crate::coord::IntCoord;
use crate::dilate::dilate;
use crate::error::Result;
use crate::image::Image;

/// `sourceMask = complement(dilate(targetMask, fullPatchStructuringElement))`.
/// Prevents the NNF from copying from source patches that already touch
/// the hole (P6).
pub fn source_mask(target_mask: &Image<bool>, patch_width: i32) -> Result<Image<bool>> {
    let structure = Image::new(patch_width, patch_width, true);
    let anchor = IntCoord::new(patch_width / 2, patch_width / 2);
    let dilated = dilate(&structure, anchor, target_mask)?;

    let mut mask = Image::new(dilated.width(), dilated.height(), false);
    for (coord, &v) in dilated.iter_coords() {
        mask.set(coord, !v);
    }
    Ok(mask)
}
