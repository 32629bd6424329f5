use crate::color::Rgb;
use crate::coord::IntCoord;
use crate::image::Image;

/// Downsamples a color image to `new_size` by averaging, box-filter
/// style, all source pixels whose coordinates fall in the half-open box
/// `[ceil(x*W/n), ceil((x+1)*W/n)) x [ceil(y*H/m), ceil((y+1)*H/m))`.
/// A no-op clone when `new_size == source.size()`. When a box is empty
/// (can happen when upsampling), the output pixel takes the single
/// nearest source pixel, per §4.2.
pub fn downsample(source: &Image<Rgb>, new_size: IntCoord) -> Image<Rgb> {
    if new_size == source.size() {
        return source.clone();
    }

    let (src_w, src_h) = (source.width() as f64, source.height() as f64);
    let (new_w, new_h) = (new_size.x(), new_size.y());
    let mut dest = Image::new(new_w, new_h, Rgb::BLACK);

    for y in 0..new_h {
        for x in 0..new_w {
            let left = ((x as f64) * src_w / (new_w as f64)).ceil() as i32;
            let right = (((x + 1) as f64) * src_w / (new_w as f64)).ceil() as i32;
            let top = ((y as f64) * src_h / (new_h as f64)).ceil() as i32;
            let bottom = (((y + 1) as f64) * src_h / (new_h as f64)).ceil() as i32;

            if right > left && bottom > top {
                let mut sum = Rgb::new(0.0, 0.0, 0.0);
                let mut count = 0.0;
                for sy in top..bottom {
                    for sx in left..right {
                        sum += *source.get(IntCoord::new(sx, sy));
                        count += 1.0;
                    }
                }
                dest.set(IntCoord::new(x, y), sum / count);
            } else {
                // Empty box: fall back to the single nearest source pixel.
                let nx = (((x as f64 + 0.5) * src_w / (new_w as f64)) as i32).clamp(0, source.width() - 1);
                let ny = (((y as f64 + 0.5) * src_h / (new_h as f64)) as i32).clamp(0, source.height() - 1);
                dest.set(IntCoord::new(x, y), *source.get(IntCoord::new(nx, ny)));
            }
        }
    }
    dest
}

/// Downsamples a boolean image by logical OR (`trues_prevail = true`) or
/// logical AND (`trues_prevail = false`) over the same box as
/// [`downsample`].
pub fn downsample_boolean(source: &Image<bool>, new_size: IntCoord, trues_prevail: bool) -> Image<bool> {
    if new_size == source.size() {
        return source.clone();
    }

    let (src_w, src_h) = (source.width(), source.height());
    let (new_w, new_h) = (new_size.x(), new_size.y());
    let mut dest = Image::new(new_w, new_h, !trues_prevail);

    for y_new in 0..new_h {
        for x_new in 0..new_w {
            let left = ((x_new as f64) / (new_w as f64) * ((src_w - 1) as f64)).ceil() as i32;
            let right = (((x_new + 1) as f64) / (new_w as f64) * ((src_w - 1) as f64)).ceil() as i32;
            let top = ((y_new as f64) / (new_h as f64) * ((src_h - 1) as f64)).ceil() as i32;
            let bottom = (((y_new + 1) as f64) / (new_h as f64) * ((src_h - 1) as f64)).ceil() as i32;

            let mut result = !trues_prevail;
            'outer: for sy in top..bottom {
                for sx in left..right {
                    if *source.get(IntCoord::new(sx, sy)) == trues_prevail {
                        result = trues_prevail;
                        break 'outer;
                    }
                }
            }
            dest.set(IntCoord::new(x_new, y_new), result);
        }
    }
    dest
}
