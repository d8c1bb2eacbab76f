use crate::models::error::TranscodeError;
use crate::models::media::{OutputGeometry, VideoFrame};

const BYTES_PER_PIXEL: usize = 4;

/// Fixed-size RGBA raster the render loop paints into and the encoder captures.
///
/// One writer (the render loop, via `draw`) and one reader (the encoder, via
/// `pixels`). Every `draw` overwrites the whole surface and bumps
/// `generation`, which lets the encoder tell fresh paints from repeats.
#[derive(Debug)]
pub struct FrameSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    generation: u64,
}

impl FrameSurface {
    /// Acquire a surface of the given size.
    ///
    /// Fails with `TranscodeError::Context` for empty geometries and for
    /// sizes the allocator refuses.
    pub fn allocate(geometry: OutputGeometry) -> Result<Self, TranscodeError> {
        if geometry.width == 0 || geometry.height == 0 {
            return Err(TranscodeError::Context(format!(
                "cannot create a {}x{} surface",
                geometry.width, geometry.height
            )));
        }

        let len = geometry
            .pixel_count()
            .and_then(|p| p.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| {
                TranscodeError::Context(format!(
                    "surface {}x{} exceeds addressable memory",
                    geometry.width, geometry.height
                ))
            })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|e| TranscodeError::Context(format!("surface allocation failed: {}", e)))?;
        pixels.resize(len, 0);

        Ok(Self {
            width: geometry.width,
            height: geometry.height,
            pixels,
            generation: 0,
        })
    }

    pub fn geometry(&self) -> OutputGeometry {
        OutputGeometry::new(self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of completed `draw` calls.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Paint `frame` over the whole surface, scaling with bilinear filtering.
    ///
    /// Same-size frames are copied verbatim.
    pub fn draw(&mut self, frame: &VideoFrame) -> Result<(), String> {
        if frame.width == 0 || frame.height == 0 || !frame.is_well_formed() {
            return Err(format!(
                "malformed {}x{} frame ({} bytes)",
                frame.width,
                frame.height,
                frame.data.len()
            ));
        }

        if frame.width == self.width && frame.height == self.height {
            self.pixels.copy_from_slice(&frame.data);
        } else {
            self.scale_from(frame);
        }
        self.generation += 1;
        Ok(())
    }

    fn scale_from(&mut self, frame: &VideoFrame) {
        let src_w = frame.width as usize;
        let src_h = frame.height as usize;
        let dst_w = self.width as usize;
        let dst_h = self.height as usize;
        let x_ratio = src_w as f32 / dst_w as f32;
        let y_ratio = src_h as f32 / dst_h as f32;

        for y in 0..dst_h {
            // Sample at pixel centers so edges don't shift when downscaling.
            let sy = ((y as f32 + 0.5) * y_ratio - 0.5).clamp(0.0, (src_h - 1) as f32);
            let y0 = sy as usize;
            let y1 = (y0 + 1).min(src_h - 1);
            let fy = sy - y0 as f32;

            for x in 0..dst_w {
                let sx = ((x as f32 + 0.5) * x_ratio - 0.5).clamp(0.0, (src_w - 1) as f32);
                let x0 = sx as usize;
                let x1 = (x0 + 1).min(src_w - 1);
                let fx = sx - x0 as f32;

                let p00 = (y0 * src_w + x0) * BYTES_PER_PIXEL;
                let p01 = (y0 * src_w + x1) * BYTES_PER_PIXEL;
                let p10 = (y1 * src_w + x0) * BYTES_PER_PIXEL;
                let p11 = (y1 * src_w + x1) * BYTES_PER_PIXEL;
                let out = (y * dst_w + x) * BYTES_PER_PIXEL;

                for c in 0..BYTES_PER_PIXEL {
                    let top = frame.data[p00 + c] as f32 * (1.0 - fx) + frame.data[p01 + c] as f32 * fx;
                    let bottom = frame.data[p10 + c] as f32 * (1.0 - fx) + frame.data[p11 + c] as f32 * fx;
                    let value = top * (1.0 - fy) + bottom * fy;
                    self.pixels[out + c] = value.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }
}
