//! Plain-text PPM (P3) image output.

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder, ImageResult, Rgb, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tree_core::RgbaBuffer;
use tree_core::color::Rgba;

/// Copies the color channels of `buffer` into an 8-bit RGB image.
pub fn to_rgb_image(buffer: &RgbaBuffer) -> RgbImage {
    let mut image = RgbImage::new(buffer.width() as u32, buffer.height() as u32);
    for (y, row) in buffer.rows().enumerate() {
        for (x, &px) in row.iter().enumerate() {
            let c = Rgba::from_packed(px);
            image.put_pixel(x as u32, y as u32, Rgb([c.r, c.g, c.b]));
        }
    }
    image
}

/// Writes `buffer` as an ASCII PPM image. Alpha is dropped.
///
/// ### Parameters
/// - `buffer` - Rendered tree.
/// - `out` - Destination stream.
pub fn write_ppm<W: Write>(buffer: &RgbaBuffer, out: W) -> ImageResult<()> {
    let image = to_rgb_image(buffer);
    PnmEncoder::new(out)
        .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Ascii))
        .write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgb8)
}

/// Writes `buffer` to a PPM file at `path`, replacing any existing file.
pub fn save_ppm(buffer: &RgbaBuffer, path: &Path) -> ImageResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_ppm(buffer, &mut out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(bytes: Vec<u8>) -> Vec<String> {
        String::from_utf8(bytes)
            .expect("ascii")
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn header_and_pixels_are_text() {
        let mut buf = RgbaBuffer::new(2, 1);
        buf.set(0, 0, Rgba::new(255, 0, 10, 128).to_packed()).expect("in bounds");

        let mut out = Vec::new();
        write_ppm(&buf, &mut out).expect("write to vec");

        assert_eq!(tokens(out), ["P3", "2", "1", "255", "255", "0", "10", "0", "0", "0"]);
    }

    #[test]
    fn rgb_image_drops_alpha_and_keeps_layout() {
        let mut buf = RgbaBuffer::new(3, 4);
        buf.set(2, 3, Rgba::new(9, 8, 7, 0).to_packed()).expect("in bounds");

        let image = to_rgb_image(&buf);
        assert_eq!(image.dimensions(), (3, 4));
        assert_eq!(image.get_pixel(2, 3), &Rgb([9, 8, 7]));
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn sample_count_matches_dimensions() {
        let buf = RgbaBuffer::new(3, 4);
        let mut out = Vec::new();
        write_ppm(&buf, &mut out).expect("write to vec");

        assert_eq!(tokens(out).len(), 4 + 3 * 4 * 3);
    }

    #[test]
    fn save_creates_file() {
        let path = std::env::temp_dir().join(format!("pixel-tree-export-{}.ppm", std::process::id()));
        let buf = RgbaBuffer::new(16, 16);

        save_ppm(&buf, &path).expect("save");
        let written = std::fs::read(&path).expect("read back");
        std::fs::remove_file(&path).ok();

        assert_eq!(tokens(written)[..4], ["P3", "16", "16", "255"]);
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let buf = RgbaBuffer::new(16, 16);
        assert!(save_ppm(&buf, Path::new("/nonexistent/dir/tree.ppm")).is_err());
    }
}
