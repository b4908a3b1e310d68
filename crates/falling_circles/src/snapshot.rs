//! Render the animation off-screen and save a frame as an image. Useful for previews and for
//! checking the animation without a terminal.

use color_eyre::eyre::{ContextCompat as _, Result};

use particle_animator::canvas::{Canvas, Size};
use particle_animator::host::{Host, HostEvent};

/// `SnapshotHost`
///
/// Delivers a fixed number of frames as fast as they can be drawn, then tears down. Only the
/// most recent frame is kept.
pub(crate) struct SnapshotHost {
    /// The size of the image, in pixels
    size: Size,
    /// Frames still to be drawn
    frames_remaining: u64,
    /// The opaque colour that the frame is flattened onto
    background: palette::Srgb<f32>,
    /// The last presented frame
    last_frame: Option<image::RgbaImage>,
}

impl SnapshotHost {
    /// Instantiate
    pub const fn new(size: Size, frames: u64, background: palette::Srgb<f32>) -> Self {
        Self {
            size,
            frames_remaining: frames,
            background,
            last_frame: None,
        }
    }

    /// The last presented frame.
    pub const fn last_frame(&self) -> Option<&image::RgbaImage> {
        self.last_frame.as_ref()
    }

    /// Save the last frame. The image format is chosen from the path's extension.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let frame = self
            .last_frame()
            .context("No frames were rendered, so there's nothing to save")?;
        frame.save(path)?;
        tracing::info!("Saved snapshot to {}", path.display());
        Ok(())
    }

    /// Flatten a canvas onto the background and convert it to an image.
    fn to_image(&self, canvas: &Canvas) -> Result<image::RgbaImage> {
        let size = canvas.size();
        let mut raw = Vec::with_capacity(size.width * size.height * 4);
        for pixel in canvas.rows().flatten() {
            let opaque: palette::Srgb<u8> =
                particle_animator::canvas::composite_over(*pixel, self.background).into_format();
            raw.extend([opaque.red, opaque.green, opaque.blue, u8::MAX]);
        }

        image::RgbaImage::from_raw(size.width.try_into()?, size.height.try_into()?, raw)
            .context("Canvas and image sizes don't match")
    }
}

impl Host for SnapshotHost {
    type Error = color_eyre::eyre::Report;

    fn container_size(&mut self) -> Result<Size> {
        Ok(self.size)
    }

    async fn next_event(&mut self) -> Result<HostEvent> {
        if self.frames_remaining == 0 {
            return Ok(HostEvent::Teardown);
        }
        self.frames_remaining -= 1;
        Ok(HostEvent::Frame)
    }

    fn present(&mut self, canvas: &Canvas) -> Result<()> {
        self.last_frame = Some(self.to_image(canvas)?);
        Ok(())
    }
}
