//! Convert the animation's pixels into terminal cells.

use particle_animator::canvas::{Canvas, Pixel, Size};
use termwiz::surface::Change as TermwizChange;
use termwiz::surface::Position as TermwizPosition;

/// The character used to show 2 pixels in 1 cell.
const UPPER_HALF_BLOCK: &str = "▀";

/// `Surface`
///
/// Every terminal cell shows 2 vertically stacked pixels using the upper half block. The upper
/// "pixel" is rendered with the cell's foreground colour and the lower "pixel" with the cell's
/// background colour. Terminals can't show translucency, so pixels are first blended onto an
/// opaque background colour.
pub(crate) struct Surface {
    /// The terminal's width
    pub width: usize,
    /// The terminal's height
    pub height: usize,
    /// The colour that translucent pixels are blended onto.
    pub background: palette::Srgb<f32>,
    /// A surface of terminal cells
    pub surface: termwiz::surface::Surface,
}

impl Surface {
    /// Instantiate
    #[must_use]
    pub fn new(width: usize, height: usize, background: palette::Srgb<f32>) -> Self {
        Self {
            width,
            height,
            background,
            surface: termwiz::surface::Surface::new(width, height),
        }
    }

    /// The size of the pixel surface that exactly fills a terminal of the given size.
    #[must_use]
    pub const fn pixel_size(columns: usize, rows: usize) -> Size {
        Size::new(columns, rows * 2)
    }

    /// Draw every pixel of a canvas. Anywhere the canvas doesn't reach, for instance just after
    /// the terminal has grown, is filled with the background.
    pub fn draw_canvas(&mut self, canvas: &Canvas) {
        for row in 0..self.height {
            for column in 0..self.width {
                let upper = self.flatten(canvas.pixel(column, row * 2));
                let lower = self.flatten(canvas.pixel(column, row * 2 + 1));
                self.surface.add_changes(vec![
                    TermwizChange::CursorPosition {
                        x: TermwizPosition::Absolute(column),
                        y: TermwizPosition::Absolute(row),
                    },
                    Self::make_fg_colour(upper),
                    Self::make_bg_colour(lower),
                ]);
                self.surface.add_change(UPPER_HALF_BLOCK);
            }
        }
    }

    /// Blend a pixel onto the opaque background.
    fn flatten(&self, maybe_pixel: Option<Pixel>) -> palette::Srgb<f32> {
        maybe_pixel.map_or(self.background, |pixel| {
            particle_animator::canvas::composite_over(pixel, self.background)
        })
    }

    /// Make a Termwiz colour attribute
    #[must_use]
    pub const fn make_colour_attribute(
        colour: palette::Srgb<f32>,
    ) -> termwiz::color::ColorAttribute {
        // Colours with an alpha below 1.0 seem to get ignored when they're finally rendered to
        // the user's terminal, so the alpha is always full.
        termwiz::color::ColorAttribute::TrueColorWithDefaultFallback(termwiz::color::SrgbaTuple(
            colour.red,
            colour.green,
            colour.blue,
            1.0,
        ))
    }

    /// Make a Termwiz background colour
    #[must_use]
    pub const fn make_bg_colour(colour: palette::Srgb<f32>) -> TermwizChange {
        let colour_attribute = Self::make_colour_attribute(colour);
        TermwizChange::Attribute(termwiz::cell::AttributeChange::Background(colour_attribute))
    }

    /// Make a Termwiz foreground colour
    #[must_use]
    pub const fn make_fg_colour(colour: palette::Srgb<f32>) -> TermwizChange {
        let colour_attribute = Self::make_colour_attribute(colour);
        TermwizChange::Attribute(termwiz::cell::AttributeChange::Foreground(colour_attribute))
    }
}

#[cfg(test)]
#[expect(
    clippy::indexing_slicing,
    clippy::shadow_unrelated,
    reason = "Tests aren't so strict"
)]
mod test {
    use super::*;

    fn white() -> palette::Srgb<f32> {
        palette::Srgb::new(1.0, 1.0, 1.0)
    }

    fn red() -> Pixel {
        Pixel::new(1.0, 0.0, 0.0, 1.0)
    }

    #[test]
    fn each_cell_holds_two_pixels() {
        assert_eq!(Surface::pixel_size(80, 24), Size::new(80, 48));
    }

    #[test]
    fn upper_pixel_is_the_foreground() {
        let mut canvas = Canvas::new(Size::new(1, 2));
        canvas.stroke_horizontal_line(0.5, 1.0, red());

        let mut surface = Surface::new(1, 1, white());
        surface.draw_canvas(&canvas);

        let cell = &surface.surface.screen_cells()[0][0];
        assert_eq!(cell.str(), "▀");
        assert_eq!(
            cell.attrs().foreground(),
            Surface::make_colour_attribute(palette::Srgb::new(1.0, 0.0, 0.0))
        );
        assert_eq!(
            cell.attrs().background(),
            Surface::make_colour_attribute(white())
        );
    }

    #[test]
    fn lower_pixel_is_the_background() {
        let mut canvas = Canvas::new(Size::new(2, 4));
        canvas.stroke_horizontal_line(3.5, 1.0, red());

        let mut surface = Surface::new(2, 2, white());
        surface.draw_canvas(&canvas);

        let cells = surface.surface.screen_cells();
        let cell = &cells[1][1];
        assert_eq!(
            cell.attrs().foreground(),
            Surface::make_colour_attribute(white())
        );
        assert_eq!(
            cell.attrs().background(),
            Surface::make_colour_attribute(palette::Srgb::new(1.0, 0.0, 0.0))
        );
        let cell = &cells[0][0];
        assert_eq!(
            cell.attrs().background(),
            Surface::make_colour_attribute(white())
        );
    }

    #[test]
    fn translucent_pixels_are_blended_with_the_background() {
        let mut canvas = Canvas::new(Size::new(1, 2));
        canvas.stroke_horizontal_line(0.5, 1.0, Pixel::new(0.0, 0.0, 0.0, 0.5));

        let mut surface = Surface::new(1, 1, white());
        surface.draw_canvas(&canvas);

        let cell = &surface.surface.screen_cells()[0][0];
        assert_eq!(
            cell.attrs().foreground(),
            Surface::make_colour_attribute(palette::Srgb::new(0.5, 0.5, 0.5))
        );
    }

    #[test]
    fn cells_beyond_the_canvas_are_background() {
        let canvas = Canvas::new(Size::new(0, 0));
        let mut surface = Surface::new(3, 2, white());
        surface.draw_canvas(&canvas);

        let cells = surface.surface.screen_cells();
        let cell = &cells[1][2];
        assert_eq!(cell.str(), "▀");
        assert_eq!(
            cell.attrs().foreground(),
            Surface::make_colour_attribute(white())
        );
    }
}
