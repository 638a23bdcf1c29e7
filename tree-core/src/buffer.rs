use crate::color::{Rgba, blend_over};
use thiserror::Error;

/// Failure of a checked pixel access.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// A dense, row-major 2D grid of pixels.
///
/// The dimensions are fixed for the lifetime of the allocation; the only
/// way to change them is [`PixelBuffer::resize`], which reallocates and
/// clears.
///
/// Two kinds of access are offered:
///
/// - [`PixelBuffer::get`] / [`PixelBuffer::set`] check the coordinates and
///   report [`BufferError::OutOfBounds`] on misuse.
/// - [`PixelBuffer::get_unchecked`] / [`PixelBuffer::set_unchecked`] skip
///   the check for hot loops that have already tested
///   [`PixelBuffer::contains`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer<P> {
    data: Vec<P>,
    width: usize,
    height: usize,
}

/// Packed RGBA pixels, see [`crate::color`] for the bit layout.
pub type RgbaBuffer = PixelBuffer<u32>;
/// 8-bit grayscale pixels.
pub type LumaBuffer = PixelBuffer<u8>;

impl<P: Copy + Default> PixelBuffer<P> {
    /// Creates a `width × height` buffer filled with `P::default()`.
    ///
    /// ### Parameters
    /// - `width` - Number of columns.
    /// - `height` - Number of rows.
    ///
    /// ### Returns
    /// A cleared buffer; for [`RgbaBuffer`] every pixel is fully transparent.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![P::default(); width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[P] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [P] {
        &mut self.data
    }

    /// Iterates over rows, top to bottom; always yields `height` rows.
    pub fn rows(&self) -> impl Iterator<Item = &[P]> + '_ {
        let width = self.width;
        (0..self.height).map(move |y| &self.data[y * width..(y + 1) * width])
    }

    /// Returns `true` if `(x, y)` addresses a pixel of this buffer.
    ///
    /// Takes signed coordinates so callers can test points that fall left
    /// of or above the buffer.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Reads a pixel, checking bounds.
    ///
    /// ### Returns
    /// The pixel value, or [`BufferError::OutOfBounds`] if `x >= width`
    /// or `y >= height`.
    pub fn get(&self, x: usize, y: usize) -> Result<P, BufferError> {
        self.check(x, y)?;
        Ok(self.data[y * self.width + x])
    }

    /// Writes a pixel, checking bounds.
    ///
    /// ### Returns
    /// `Ok(())` on success, or [`BufferError::OutOfBounds`] if the
    /// coordinates are outside the buffer. Nothing is written on error.
    pub fn set(&mut self, x: usize, y: usize, value: P) -> Result<(), BufferError> {
        self.check(x, y)?;
        self.data[y * self.width + x] = value;
        Ok(())
    }

    /// Reads a pixel without checking bounds.
    ///
    /// # Safety
    /// The caller guarantees `x < width` and `y < height`.
    #[inline]
    pub unsafe fn get_unchecked(&self, x: usize, y: usize) -> P {
        debug_assert!(x < self.width && y < self.height);
        // SAFETY: in-bounds per the caller's contract.
        unsafe { *self.data.get_unchecked(y * self.width + x) }
    }

    /// Writes a pixel without checking bounds.
    ///
    /// # Safety
    /// The caller guarantees `x < width` and `y < height`.
    #[inline]
    pub unsafe fn set_unchecked(&mut self, x: usize, y: usize, value: P) {
        debug_assert!(x < self.width && y < self.height);
        // SAFETY: in-bounds per the caller's contract.
        unsafe {
            *self.data.get_unchecked_mut(y * self.width + x) = value;
        }
    }

    /// Sets every pixel to `value`.
    pub fn clear(&mut self, value: P) {
        self.data.fill(value);
    }

    /// Reallocates to `width × height` and clears to `P::default()`.
    ///
    /// Does nothing if the dimensions are unchanged.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        }
    }

    /// Copies `source` into this buffer with its top-left corner at
    /// `(x, y)`. Pixels that land outside this buffer are dropped.
    pub fn blit(&mut self, source: &PixelBuffer<P>, x: i32, y: i32) {
        self.blit_with(source, x, y, |_, src| src);
    }

    fn blit_with(&mut self, source: &PixelBuffer<P>, x: i32, y: i32, op: impl Fn(P, P) -> P) {
        for sy in 0..source.height {
            for sx in 0..source.width {
                let dx = x + sx as i32;
                let dy = y + sy as i32;
                if self.contains(dx, dy) {
                    let (dx, dy) = (dx as usize, dy as usize);
                    let src = source.data[sy * source.width + sx];
                    let idx = dy * self.width + dx;
                    self.data[idx] = op(self.data[idx], src);
                }
            }
        }
    }

    fn check(&self, x: usize, y: usize) -> Result<(), BufferError> {
        if x >= self.width || y >= self.height {
            return Err(BufferError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl RgbaBuffer {
    /// Like [`PixelBuffer::blit`], but composites each source pixel over
    /// the destination with [`blend_over`].
    pub fn blit_with_alpha(&mut self, source: &RgbaBuffer, x: i32, y: i32) {
        self.blit_with(source, x, y, blend_over);
    }

    /// Converts to grayscale using [`Rgba::luma`]; alpha is dropped.
    pub fn to_luma(&self) -> LumaBuffer {
        PixelBuffer {
            data: self
                .data
                .iter()
                .map(|&px| Rgba::from_packed(px).luma())
                .collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Unpacks into `R, G, B, A` bytes, row-major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|px| px.to_be_bytes()).collect()
    }
}
