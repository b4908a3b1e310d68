//! The animation itself. Owns the particles and the surface that they're drawn on.

use rand::SeedableRng as _;

use crate::canvas::{Canvas, Pixel, Size};
use crate::config::AnimatorConfig;
use crate::errors::AnimatorError;
use crate::particle::Particle;

/// `Animator`
///
/// Holds a fixed number of particles. Every frame they fall a little and are then redrawn. A
/// particle that falls off the bottom is reset to just above the top, so the number of
/// particles never changes.
#[derive(Debug)]
pub struct Animator<R: rand::Rng = rand::rngs::StdRng> {
    /// The animation's config
    config: AnimatorConfig,
    /// The surface that everything is drawn on
    canvas: Canvas,
    /// All the particles, in the order that they're drawn
    particles: Vec<Particle>,
    /// The source of all randomness
    rng: R,
    /// The number of frames that have been drawn
    frame_count: u64,
}

impl Animator<rand::rngs::StdRng> {
    /// Instantiate, seeding randomness from the OS.
    ///
    /// # Errors
    /// When the config is invalid.
    pub fn from_entropy(config: AnimatorConfig) -> Result<Self, AnimatorError> {
        Self::new(config, rand::rngs::StdRng::from_entropy())
    }

    /// Instantiate with reproducible randomness.
    ///
    /// # Errors
    /// When the config is invalid.
    pub fn seeded(config: AnimatorConfig, seed: u64) -> Result<Self, AnimatorError> {
        Self::new(config, rand::rngs::StdRng::seed_from_u64(seed))
    }
}

impl<R: rand::Rng> Animator<R> {
    /// Instantiate. There's nothing to see until [`Self::start`] is called with the size of the
    /// container.
    ///
    /// # Errors
    /// When the config is invalid.
    pub fn new(config: AnimatorConfig, rng: R) -> Result<Self, AnimatorError> {
        config.validate()?;
        Ok(Self {
            config,
            canvas: Canvas::default(),
            particles: Vec::new(),
            rng,
            frame_count: 0,
        })
    }

    /// Size the surface to its container and create all the particles.
    pub fn start(&mut self, container: Size) {
        self.resize(container);
        self.spawn_all(self.config.particle_count);
        tracing::debug!(
            "Animator started with {} particles on a {}x{} surface",
            self.particles.len(),
            container.width,
            container.height
        );
    }

    /// Make the drawing surface the same size as its container. Until the next render the
    /// surface is blank.
    pub fn resize(&mut self, container: Size) {
        tracing::debug!(
            "Resizing surface to {}x{}",
            container.width,
            container.height
        );
        self.canvas.set_size(container);
    }

    /// Replace all the particles with `count` new ones. Their starting heights are spread over
    /// the whole surface so that they don't all appear at the top at the same time.
    pub fn spawn_all(&mut self, count: usize) {
        let (width, height) = self.surface_dimensions();
        self.particles.clear();
        for _ in 0..count {
            let mut particle = Particle::spawn(&mut self.rng, &self.config, width);
            particle.y = self.rng.gen::<f32>() * height;
            self.particles.push(particle);
        }
    }

    /// Move every particle down by its speed. Any particle that has completely fallen out of
    /// the bottom of the surface is reset to start again just above the top.
    pub fn tick(&mut self) {
        let (width, height) = self.surface_dimensions();
        for particle in &mut self.particles {
            particle.advance();
            if particle.has_left_surface(height) {
                particle.reset(&mut self.rng, &self.config, width);
                tracing::trace!("Respawned particle at x: {}", particle.x);
            }
        }
    }

    /// Redraw the whole surface from scratch.
    pub fn render(&mut self) {
        if self.canvas.size().is_empty() {
            return;
        }

        self.canvas.clear();

        let line = &self.config.reference_line;
        if line.enabled {
            let [red, green, blue] = line.colour;
            let colour: palette::Srgb<f32> = palette::Srgb::new(red, green, blue).into_format();
            self.canvas.stroke_horizontal_line(
                line.y,
                line.width,
                Pixel::new(colour.red, colour.green, colour.blue, line.opacity),
            );
        }

        for particle in &self.particles {
            self.canvas.fill_circle(
                particle.x,
                particle.y,
                particle.radius,
                particle.fill_colour(),
            );
        }
    }

    /// A single frame of the animation.
    pub fn frame(&mut self) {
        self.tick();
        self.render();
        self.frame_count += 1;
    }

    /// Swap in a new config and start all the particles again.
    ///
    /// # Errors
    /// When the new config is invalid, in which case the current config is kept.
    pub fn reconfigure(&mut self, config: AnimatorConfig) -> Result<(), AnimatorError> {
        config.validate()?;
        self.config = config;
        self.spawn_all(self.config.particle_count);
        tracing::debug!("Animator reconfigured: {:?}", self.config);
        Ok(())
    }

    /// The current config.
    pub const fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    /// The drawing surface, as it was left by the last render.
    pub const fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// All the particles, in drawing order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Put particles into exact positions for tests.
    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// How many frames have been drawn.
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The surface's width and height as floats, for positioning particles.
    #[expect(
        clippy::as_conversions,
        clippy::cast_precision_loss,
        reason = "Surface dimensions are far smaller than an f32's precise integer range"
    )]
    fn surface_dimensions(&self) -> (f32, f32) {
        let size = self.canvas.size();
        (size.width as f32, size.height as f32)
    }
}

#[cfg(test)]
#[expect(
    clippy::indexing_slicing,
    clippy::float_cmp,
    reason = "Tests aren't so strict"
)]
mod test {
    use super::*;

    fn make_animator(count: usize, size: Size) -> Animator {
        let config = AnimatorConfig {
            particle_count: count,
            ..AnimatorConfig::default()
        };
        let mut animator = Animator::seeded(config, 1).unwrap();
        animator.start(size);
        animator
    }

    #[test]
    fn starts_with_the_configured_number_of_particles() {
        let animator = make_animator(30, Size::new(800, 500));
        assert_eq!(animator.particles().len(), 30);
        assert_eq!(animator.canvas().size(), Size::new(800, 500));
    }

    #[test]
    fn initial_positions_are_spread_over_the_surface() {
        let animator = make_animator(30, Size::new(800, 500));
        let heights: Vec<f32> = animator.particles().iter().map(|p| p.y).collect();
        let highest = heights.iter().copied().fold(f32::INFINITY, f32::min);
        let lowest = heights.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        assert!(heights.iter().all(|y| (0.0..500.0).contains(y)));
        assert!(lowest - highest > 500.0 * 0.05);
    }

    #[test]
    fn particle_is_reset_only_once_its_top_edge_has_passed_the_bottom() {
        let mut animator = make_animator(1, Size::new(100, 500));
        let particle = &mut animator.particles_mut()[0];
        particle.y = 495.0;
        particle.speed = 2.0;
        particle.radius = 10.0;

        let expected = [497.0, 499.0, 501.0, 503.0, 505.0, 507.0, 509.0];
        for y in expected {
            animator.tick();
            assert_eq!(animator.particles()[0].y, y);
        }

        // 511 - 10 = 501, which is finally further than the 500 pixel high surface.
        animator.tick();
        assert_eq!(animator.particles()[0].y, -20.0);
    }

    #[test]
    fn particles_never_drift_far_below_the_surface() {
        let mut animator = make_animator(30, Size::new(200, 300));
        for _ in 0..5_000 {
            animator.tick();
            assert_eq!(animator.particles().len(), 30);
            for particle in animator.particles() {
                assert!(particle.y - particle.radius <= 300.0 + particle.speed);
            }
        }
    }

    #[test]
    fn respawned_particles_start_above_the_surface() {
        let mut animator = make_animator(1, Size::new(100, 100));
        animator.particles_mut()[0].y = 1_000.0;
        animator.tick();

        let particle = &animator.particles()[0];
        assert_eq!(particle.y, -20.0);
        assert!((5.0..=20.0).contains(&particle.radius));
        assert!((1.0..=3.0).contains(&particle.speed));
        assert!((0.3..=0.8).contains(&particle.opacity));
    }

    #[test]
    fn resize_is_idempotent() {
        let mut animator = make_animator(30, Size::new(100, 100));
        animator.resize(Size::new(640, 480));
        let first = animator.canvas().size();
        animator.resize(Size::new(640, 480));
        assert_eq!(animator.canvas().size(), first);
        assert_eq!(animator.particles().len(), 30);
    }

    #[test]
    fn zero_sized_surface_draws_nothing() {
        let mut animator = make_animator(30, Size::new(0, 0));
        animator.frame();
        assert_eq!(animator.canvas().rows().count(), 0);
        assert_eq!(animator.particles().len(), 30);

        animator.resize(Size::new(50, 100));
        animator.frame();
        assert_eq!(animator.canvas().rows().count(), 100);
    }

    #[test]
    fn zero_sized_surface_still_ticks() {
        let mut animator = make_animator(30, Size::new(0, 0));
        let before: Vec<f32> = animator.particles().iter().map(|p| p.y).collect();
        animator.frame();

        for (particle, y) in animator.particles().iter().zip(before) {
            assert!(particle.y > y || particle.y == -20.0);
        }
        for _ in 0..100 {
            animator.tick();
        }
        for particle in animator.particles() {
            assert!(particle.y - particle.radius <= 0.0);
            assert_eq!(particle.x, 0.0);
        }
    }

    #[test]
    fn renders_the_reference_line() {
        let mut animator = make_animator(0, Size::new(10, 100));
        animator.render();

        let pixel = animator.canvas().pixel(0, 49).unwrap();
        assert!((pixel.alpha - 0.2).abs() < 1e-6);
        assert_eq!(pixel.red, 0.0);
        assert_eq!(animator.canvas().pixel(9, 50).unwrap(), pixel);
        assert_eq!(animator.canvas().pixel(0, 51).unwrap().alpha, 0.0);
    }

    #[test]
    fn reference_line_can_be_disabled() {
        let mut config = AnimatorConfig {
            particle_count: 0,
            ..AnimatorConfig::default()
        };
        config.reference_line.enabled = false;
        let mut animator = Animator::seeded(config, 1).unwrap();
        animator.start(Size::new(10, 100));
        animator.render();
        assert_eq!(animator.canvas().pixel(0, 49).unwrap().alpha, 0.0);
    }

    #[test]
    fn later_particles_are_drawn_over_earlier_ones() {
        let mut animator = make_animator(2, Size::new(100, 100));
        for (index, particle) in animator.particles_mut().iter_mut().enumerate() {
            particle.x = 50.0;
            particle.y = 80.0;
            particle.radius = 10.0;
            particle.opacity = 1.0;
            particle.colour = if index == 0 {
                palette::Srgb::new(255, 0, 0)
            } else {
                palette::Srgb::new(0, 0, 255)
            };
        }

        animator.render();
        let pixel = animator.canvas().pixel(50, 80).unwrap();
        assert_eq!(pixel, Pixel::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn a_frame_is_a_tick_then_a_render() {
        let mut animator = make_animator(5, Size::new(100, 100));
        let before: Vec<f32> = animator.particles().iter().map(|p| p.y).collect();
        animator.frame();
        assert_eq!(animator.frame_count(), 1);
        for (particle, y) in animator.particles().iter().zip(before) {
            assert!(particle.y > y || particle.y == -20.0);
        }
        assert!(animator
            .canvas()
            .rows()
            .flatten()
            .any(|pixel| pixel.alpha > 0.0));
    }

    #[test]
    fn reconfiguring_respawns_with_the_new_count() {
        let mut animator = make_animator(30, Size::new(100, 100));
        let mut config = animator.config().clone();
        config.particle_count = 3;
        animator.reconfigure(config).unwrap();
        assert_eq!(animator.particles().len(), 3);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut animator = make_animator(30, Size::new(100, 100));
        let mut config = animator.config().clone();
        config.radius = crate::config::ValueRange::new(20.0, 5.0);
        assert!(animator.reconfigure(config.clone()).is_err());
        assert_eq!(animator.particles().len(), 30);
        assert!(Animator::seeded(config, 1).is_err());
    }
}
