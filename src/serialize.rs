//! Hole-mask persistence (§6, §9 SUPPLEMENT).
//!
//! §6 leaves the exact encoding to "the serializer collaborator"; the
//! original's closest analog, `qdatastreamutility.cpp`, writes a
//! `TwoDArray<bool>` as `width`, `height`, then one value per pixel in
//! row-major order through a `QDataStream`. This module reproduces that
//! shape directly over `std::io::{Read, Write}`: a 4-byte big-endian
//! width, a 4-byte big-endian height, then one byte per pixel (`1` for
//! `true`, `0` for `false`), row-major.

use std::io::{self, Read, Write};

use crate::coord::IntCoord;
use crate::image::Image;

/// Writes `mask` as width, height, then row-major one-byte-per-pixel.
pub fn write_hole_mask<W: Write>(writer: &mut W, mask: &Image<bool>) -> io::Result<()> {
    writer.write_all(&mask.width().to_be_bytes())?;
    writer.write_all(&mask.height().to_be_bytes())?;
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            let byte: u8 = if *mask.get(IntCoord::new(x, y)) { 1 } else { 0 };
            writer.write_all(&[byte])?;
        }
    }
    Ok(())
}

/// Reads back a mask written by [`write_hole_mask`]. Any stored byte
/// other than `0` is treated as `true`, matching `QDataStream`'s `bool`
/// read, which normalizes any nonzero byte to `true`.
pub fn read_hole_mask<R: Read>(reader: &mut R) -> io::Result<Image<bool>> {
    let mut dim_buf = [0u8; 4];
    reader.read_exact(&mut dim_buf)?;
    let width = i32::from_be_bytes(dim_buf);
    reader.read_exact(&mut dim_buf)?;
    let height = i32::from_be_bytes(dim_buf);

    if width < 0 || height < 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "negative mask dimension"));
    }

    let mut mask = Image::new(width, height, false);
    let mut byte = [0u8; 1];
    for y in 0..height {
        for x in 0..width {
            reader.read_exact(&mut byte)?;
            mask.set(IntCoord::new(x, y), byte[0] != 0);
        }
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// P9/scenario 6: a mask with an irregular hole shape round-trips
    /// byte for byte through write then read.
    #[test]
    fn round_trips_an_irregular_mask() {
        let width = 17;
        let height = 11;
        let mut mask = Image::new(width, height, false);
        for y in 0..height {
            for x in 0..width {
                let in_hole = (x * 3 + y * 7) % 5 == 0;
                mask.set(IntCoord::new(x, y), in_hole);
            }
        }

        let mut buf = Vec::new();
        write_hole_mask(&mut buf, &mask).unwrap();

        let read_back = read_hole_mask(&mut buf.as_slice()).unwrap();
        assert_eq!(read_back.width(), width);
        assert_eq!(read_back.height(), height);
        for y in 0..height {
            for x in 0..width {
                let t = IntCoord::new(x, y);
                assert_eq!(*read_back.get(t), *mask.get(t));
            }
        }
    }

    #[test]
    fn wire_format_matches_documented_layout() {
        let mask = Image::new(2, 1, true);
        let mut buf = Vec::new();
        write_hole_mask(&mut buf, &mask).unwrap();
        assert_eq!(buf.len(), 4 + 4 + 2);
        assert_eq!(&buf[0..4], &2i32.to_be_bytes());
        assert_eq!(&buf[4..8], &1i32.to_be_bytes());
        assert_eq!(&buf[8..10], &[1, 1]);
    }

    #[test]
    fn rejects_truncated_input() {
        let bytes = [0, 0, 0, 2, 0, 0, 0, 2, 1];
        let err = read_hole_mask(&mut &bytes[..]);
        assert!(err.is_err());
    }
}
