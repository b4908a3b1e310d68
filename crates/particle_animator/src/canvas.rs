//! The drawing surface. An RGBA pixel buffer with just enough drawing primitives for filled
//! circles and a horizontal line.

/// The colour of a single pixel. Alpha is straight, not premultiplied.
pub type Pixel = palette::Srgba<f32>;

/// The pixel dimensions of a surface or of the container that it fills.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[expect(
    clippy::exhaustive_structs,
    reason = "It's very unlikely that this is going to have any more fields added to it"
)]
pub struct Size {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl Size {
    /// Instantiate
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// A surface with no area can't show anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A fully transparent pixel.
#[must_use]
pub fn transparent() -> Pixel {
    Pixel::new(0.0, 0.0, 0.0, 0.0)
}

/// Paint `above` on top of `below` using "source-over" compositing.
#[must_use]
pub fn blend_over(below: Pixel, above: Pixel) -> Pixel {
    let remaining = below.alpha * (1.0 - above.alpha);
    let alpha = above.alpha + remaining;
    if alpha <= 0.0 {
        return transparent();
    }

    let mix = |top: f32, bottom: f32| (top * above.alpha + bottom * remaining) / alpha;
    Pixel::new(
        mix(above.red, below.red),
        mix(above.green, below.green),
        mix(above.blue, below.blue),
        alpha,
    )
}

/// Flatten a translucent pixel onto an opaque background, for displays that can't show
/// translucency.
#[must_use]
pub fn composite_over(pixel: Pixel, background: palette::Srgb<f32>) -> palette::Srgb<f32> {
    let mix = |top: f32, bottom: f32| top * pixel.alpha + bottom * (1.0 - pixel.alpha);
    palette::Srgb::new(
        mix(pixel.red, background.red),
        mix(pixel.green, background.green),
        mix(pixel.blue, background.blue),
    )
}

/// Convert a span of fractional pixel indices into the whole indices between them, clipped to
/// `0..limit`.
#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The values are clamped to the surface's bounds before casting"
)]
fn pixel_span(first: f32, end: f32, limit: usize) -> std::ops::Range<usize> {
    let first = first.max(0.0);
    let end = end.min(limit as f32);
    if end <= first {
        return 0..0;
    }

    (first as usize)..(end as usize)
}

/// The pixel buffer that the animation is drawn onto.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    /// The surface's dimensions
    size: Size,
    /// Row-major pixels, `width * height` of them
    pixels: Vec<Pixel>,
}

impl Canvas {
    /// Instantiate a transparent canvas.
    #[must_use]
    pub fn new(size: Size) -> Self {
        let mut canvas = Self::default();
        canvas.set_size(size);
        canvas
    }

    /// The surface's current dimensions.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Change the dimensions of the pixel buffer. Like resizing any real drawing surface, this
    /// also wipes its contents.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.pixels.clear();
        self.pixels
            .resize(size.width.saturating_mul(size.height), transparent());
    }

    /// Make every pixel transparent again.
    pub fn clear(&mut self) {
        self.pixels.fill(transparent());
    }

    /// Get the colour of the pixel at the given coordinates.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Pixel> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.pixels.get(y * self.size.width + x).copied()
    }

    /// Iterate over the rows of pixels, from the top of the surface down.
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        self.pixels.chunks(self.size.width.max(1))
    }

    /// Paint a colour over an existing pixel.
    fn blend_pixel(&mut self, x: usize, y: usize, colour: Pixel) {
        let index = y * self.size.width + x;
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = blend_over(*pixel, colour);
        }
    }

    /// Stroke a line across the full width of the surface. The line covers every row whose
    /// centre is within `[y - line_width / 2, y + line_width / 2)`.
    pub fn stroke_horizontal_line(&mut self, y: f32, line_width: f32, colour: Pixel) {
        let half = line_width / 2.0;
        let rows = pixel_span(
            (y - half - 0.5).ceil(),
            (y + half - 0.5).ceil(),
            self.size.height,
        );
        for row in rows {
            for column in 0..self.size.width {
                self.blend_pixel(column, row, colour);
            }
        }
    }

    /// The pixels whose centres are within `radius` of `centre` along one axis.
    fn circle_span(centre: f32, radius: f32, limit: usize) -> std::ops::Range<usize> {
        pixel_span(
            (centre - radius - 0.5).ceil(),
            (centre + radius - 0.5).floor() + 1.0,
            limit,
        )
    }

    /// Fill a circle. A pixel is painted when its centre falls inside the circle.
    #[expect(
        clippy::as_conversions,
        clippy::cast_precision_loss,
        reason = "Pixel indices are far smaller than an f32's precise integer range"
    )]
    pub fn fill_circle(&mut self, centre_x: f32, centre_y: f32, radius: f32, colour: Pixel) {
        if radius <= 0.0 || self.size.is_empty() {
            return;
        }

        let radius_squared = radius * radius;
        let rows = Self::circle_span(centre_y, radius, self.size.height);
        let columns = Self::circle_span(centre_x, radius, self.size.width);
        for row in rows {
            let delta_y = row as f32 + 0.5 - centre_y;
            for column in columns.clone() {
                let delta_x = column as f32 + 0.5 - centre_x;
                if delta_x * delta_x + delta_y * delta_y <= radius_squared {
                    self.blend_pixel(column, row, colour);
                }
            }
        }
    }
}
