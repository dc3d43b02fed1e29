//! Offscreen surface shared between a view host and its engine view.
//!
//! A [`Surface`] is owned by exactly one [`ViewHost`](crate::host::ViewHost).
//! The engine never sees the surface itself: it receives a [`SurfaceSink`]
//! through [`EngineView::set_surface`](crate::engine::EngineView::set_surface)
//! and uses it to write pixels and announce the region it changed. Those
//! announcements are queued on a channel and drained by the host on its own
//! event-loop turn, so a repaint is never triggered from inside the engine's
//! write.
//!
//! ```
//! use gosub_viewhost::geometry::Rect;
//! use gosub_viewhost::render::Surface;
//!
//! let mut surface = Surface::new();
//! let sink = surface.sink();
//!
//! sink.resize(4, 4);
//! sink.fill(Rect::from_xywh(0, 0, 2, 2), [255, 0, 0, 255]);
//!
//! let dirty = surface.take_dirty();
//! assert_eq!(dirty.len(), 2);
//! assert!(surface.has_image());
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;

use crate::geometry::Rect;

/// Largest width or height a [`PixelBuffer`] accepts.
pub const MAX_DIMENSION: u32 = 16384;

/// Stride and byte length of a tightly packed 4-byte-per-pixel buffer.
fn buffer_layout(width: u32, height: u32) -> Result<(u32, usize)> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(anyhow!("{width}x{height} exceeds the maximum surface size of {MAX_DIMENSION}"));
    }

    let stride = width
        .checked_mul(4)
        .ok_or_else(|| anyhow!("stride overflows for width {width}"))?;
    let len = (stride as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| anyhow!("{width}x{height} pixel buffer does not fit in memory"))?;
    Ok((stride, len))
}

/// Byte layout of a [`PixelBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8,
    Bgra8,
}

/// CPU pixel buffer, 4 bytes per pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub format: PixelFormat,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("len", &self.pixels.len())
            .finish()
    }
}

impl PixelBuffer {
    /// Creates a zeroed (fully transparent) buffer. Fails when a side exceeds
    /// [`MAX_DIMENSION`].
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let (stride, len) = buffer_layout(width, height)?;
        Ok(Self {
            pixels: vec![0u8; len],
            width,
            height,
            stride,
            format,
        })
    }

    pub fn from_raw(pixels: Vec<u8>, width: u32, height: u32, stride: u32, format: PixelFormat) -> Result<Self> {
        let (min_stride, _) = buffer_layout(width, height)?;
        if stride < min_stride {
            return Err(anyhow!("stride {stride} too small for width {width}"));
        }
        let len = (stride as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| anyhow!("{stride}x{height} pixel buffer does not fit in memory"))?;
        if pixels.len() < len {
            return Err(anyhow!("pixel buffer too small for image dimensions"));
        }

        Ok(Self { pixels, width, height, stride, format })
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_xywh(0, 0, self.width as i32, self.height as i32)
    }

    /// Returns the pixel at `(x, y)` in the buffer's own byte order.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let offset = y as usize * self.stride as usize + x as usize * 4;
        let px = self.pixels.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Fills `region` (clipped to the buffer) with `color`, given in RGBA order.
    /// Returns the region actually written.
    pub fn fill_rect(&mut self, region: Rect, color: [u8; 4]) -> Option<Rect> {
        let clipped = region.intersect(&self.bounds())?;
        let px = match self.format {
            PixelFormat::Rgba8 => color,
            PixelFormat::Bgra8 => [color[2], color[1], color[0], color[3]],
        };

        for y in clipped.origin.y..clipped.origin.y + clipped.size.height {
            let row = y as usize * self.stride as usize;
            for x in clipped.origin.x..clipped.origin.x + clipped.size.width {
                let offset = row + (x as usize) * 4;
                self.pixels[offset..offset + 4].copy_from_slice(&px);
            }
        }

        Some(clipped)
    }

    /// Tightly packed RGBA8 copy of the buffer.
    pub fn to_rgba(&self) -> Vec<u8> {
        let row_len = self.width as usize * 4;
        let mut out = Vec::with_capacity(row_len * self.height as usize);
        for y in 0..self.height as usize {
            let start = y * self.stride as usize;
            let row = &self.pixels[start..start + row_len];
            match self.format {
                PixelFormat::Rgba8 => out.extend_from_slice(row),
                PixelFormat::Bgra8 => {
                    for px in row.chunks_exact(4) {
                        out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
                    }
                }
            }
        }
        out
    }

    /// Writes the buffer to `path` as an RGBA PNG.
    pub fn write_png(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.to_rgba())?;
        Ok(())
    }
}

#[derive(Default)]
struct SurfaceState {
    buffer: Option<PixelBuffer>,
}

/// Host side of an offscreen surface: read at paint time, plus the queue of
/// regions the engine changed since the last drain.
pub struct Surface {
    state: Arc<RwLock<SurfaceState>>,
    dirty_tx: mpsc::UnboundedSender<Rect>,
    dirty_rx: mpsc::UnboundedReceiver<Rect>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    pub fn new() -> Self {
        let (dirty_tx, dirty_rx) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(RwLock::new(SurfaceState::default())),
            dirty_tx,
            dirty_rx,
        }
    }

    /// Returns the engine-side handle of this surface.
    pub fn sink(&self) -> SurfaceSink {
        SurfaceSink {
            state: self.state.clone(),
            dirty_tx: self.dirty_tx.clone(),
        }
    }

    /// Drains every region announced since the last call, in arrival order.
    pub fn take_dirty(&mut self) -> Vec<Rect> {
        let mut regions = Vec::new();
        while let Ok(region) = self.dirty_rx.try_recv() {
            regions.push(region);
        }
        regions
    }

    pub fn has_image(&self) -> bool {
        self.state.read().map(|s| s.buffer.is_some()).unwrap_or(false)
    }

    /// Runs `f` against the current pixel buffer, if the engine painted one.
    pub fn with_image<R>(&self, f: impl FnOnce(&PixelBuffer) -> R) -> Option<R> {
        let state = self.state.read().ok()?;
        state.buffer.as_ref().map(f)
    }

    /// Owned copy of the current pixel buffer.
    pub fn snapshot(&self) -> Option<PixelBuffer> {
        self.with_image(PixelBuffer::clone)
    }
}

/// Engine side of a [`Surface`]. Cloneable; every clone writes to the same
/// buffer and announces to the same host.
#[derive(Clone)]
pub struct SurfaceSink {
    state: Arc<RwLock<SurfaceState>>,
    dirty_tx: mpsc::UnboundedSender<Rect>,
}

impl std::fmt::Debug for SurfaceSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceSink")
            .field("host_alive", &!self.dirty_tx.is_closed())
            .finish()
    }
}

impl SurfaceSink {
    /// Reallocates the buffer to `width` x `height` and announces it as dirty.
    /// A size the buffer cannot hold is logged and ignored; the previous
    /// buffer stays in place.
    pub fn resize(&self, width: u32, height: u32) {
        let Ok(mut state) = self.state.write() else {
            log::warn!("Surface lock poisoned, dropping resize to {width}x{height}");
            return;
        };

        let buffer = match PixelBuffer::new(width, height, PixelFormat::Bgra8) {
            Ok(buffer) => buffer,
            Err(e) => {
                log::warn!("Surface: dropping resize: {e:#}");
                return;
            }
        };
        let bounds = buffer.bounds();
        state.buffer = Some(buffer);
        drop(state);

        self.notify(bounds);
    }

    /// Lets `f` write into the buffer, then announces `region` (clipped to the
    /// buffer) as changed. Returns false when no buffer is allocated.
    pub fn paint(&self, region: Rect, f: impl FnOnce(&mut PixelBuffer)) -> bool {
        let clipped = {
            let Ok(mut state) = self.state.write() else {
                log::warn!("Surface lock poisoned, dropping paint");
                return false;
            };
            let Some(buffer) = state.buffer.as_mut() else {
                return false;
            };
            f(buffer);
            region.intersect(&buffer.bounds())
        };

        if let Some(clipped) = clipped {
            self.notify(clipped);
        }
        true
    }

    /// Fills `region` with an RGBA `color` and announces it.
    pub fn fill(&self, region: Rect, color: [u8; 4]) -> bool {
        self.paint(region, |buffer| {
            buffer.fill_rect(region, color);
        })
    }

    fn notify(&self, region: Rect) {
        // The host may already be gone; the region is simply lost then.
        let _ = self.dirty_tx.send(region);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_image_until_engine_paints() {
        let surface = Surface::new();
        assert!(!surface.has_image());
        assert!(surface.snapshot().is_none());
    }

    #[test]
    fn dirty_regions_drain_in_order_and_are_clipped() {
        let mut surface = Surface::new();
        let sink = surface.sink();
        sink.resize(10, 10);
        sink.fill(Rect::from_xywh(5, 5, 20, 20), [0, 255, 0, 255]);

        let dirty = surface.take_dirty();
        assert_eq!(dirty, vec![Rect::from_xywh(0, 0, 10, 10), Rect::from_xywh(5, 5, 5, 5)]);
        assert!(surface.take_dirty().is_empty());
    }

    #[test]
    fn paint_without_buffer_is_rejected() {
        let mut surface = Surface::new();
        let sink = surface.sink();
        assert!(!sink.fill(Rect::from_xywh(0, 0, 1, 1), [0, 0, 0, 255]));
        assert!(surface.take_dirty().is_empty());
    }

    #[test]
    fn bgra_buffers_convert_to_rgba() {
        let mut buffer = PixelBuffer::new(2, 1, PixelFormat::Bgra8).unwrap();
        buffer.fill_rect(Rect::from_xywh(0, 0, 1, 1), [10, 20, 30, 255]);
        assert_eq!(buffer.pixel(0, 0), Some([30, 20, 10, 255]));
        assert_eq!(&buffer.to_rgba()[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn from_raw_rejects_short_buffers() {
        assert!(PixelBuffer::from_raw(vec![0; 8], 2, 2, 8, PixelFormat::Rgba8).is_err());
        assert!(PixelBuffer::from_raw(vec![0; 16], 2, 2, 8, PixelFormat::Rgba8).is_ok());
    }

    #[test]
    fn oversized_buffers_are_rejected() {
        assert!(PixelBuffer::new(40000, 40000, PixelFormat::Bgra8).is_err());
        assert!(PixelBuffer::new(u32::MAX, 1, PixelFormat::Bgra8).is_err());
        assert!(PixelBuffer::new(MAX_DIMENSION, 1, PixelFormat::Bgra8).is_ok());
        assert!(PixelBuffer::from_raw(vec![0; 16], u32::MAX, 1, 16, PixelFormat::Rgba8).is_err());
        assert!(PixelBuffer::from_raw(vec![0; 16], 2, 2, u32::MAX, PixelFormat::Rgba8).is_err());
    }

    #[test]
    fn oversized_resize_keeps_previous_buffer() {
        let mut surface = Surface::new();
        let sink = surface.sink();
        sink.resize(8, 6);
        surface.take_dirty();

        sink.resize(40000, 40000);
        assert!(surface.take_dirty().is_empty());
        let snapshot = surface.snapshot().unwrap();
        assert_eq!((snapshot.width, snapshot.height), (8, 6));
    }

    #[test]
    fn write_png_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        let mut buffer = PixelBuffer::new(3, 2, PixelFormat::Rgba8).unwrap();
        buffer.fill_rect(buffer.bounds(), [1, 2, 3, 255]);
        buffer.write_png(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
