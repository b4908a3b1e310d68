//! A single falling circle

use crate::config::AnimatorConfig;

/// One falling circle.
///
/// Everything apart from the position is fixed for the lifetime of the particle. A particle
/// never dies, it just gets reset back to the top of the surface with fresh attributes.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Particle {
    /// Horizontal position of the centre, in pixels
    pub x: f32,
    /// Vertical position of the centre, in pixels. Negative when above the surface.
    pub y: f32,
    /// Radius, in pixels
    pub radius: f32,
    /// How far the particle falls every frame, in pixels
    pub speed: f32,
    /// How see-through the particle is
    pub opacity: f32,
    /// The particle's colour, each channel 0-255
    pub colour: palette::Srgb<u8>,
}

impl Particle {
    /// Create a particle just above the top of the surface.
    pub fn spawn<R: rand::Rng>(rng: &mut R, config: &AnimatorConfig, surface_width: f32) -> Self {
        let mut particle = Self {
            x: 0.0,
            y: 0.0,
            radius: 0.0,
            speed: 0.0,
            opacity: 0.0,
            colour: palette::Srgb::new(0, 0, 0),
        };
        particle.reset(rng, config, surface_width);
        particle
    }

    /// Give the particle a fresh set of random attributes and move it back to just above the
    /// surface.
    pub fn reset<R: rand::Rng>(
        &mut self,
        rng: &mut R,
        config: &AnimatorConfig,
        surface_width: f32,
    ) {
        self.x = rng.gen::<f32>() * surface_width;
        self.y = config.respawn_y;
        self.radius = config.radius.sample(rng);
        self.speed = config.speed.sample(rng);
        self.opacity = config.opacity.sample(rng);
        self.colour = palette::Srgb::new(rng.gen(), rng.gen(), rng.gen());
    }

    /// Fall by one frame's worth of movement.
    pub fn advance(&mut self) {
        self.y += self.speed;
    }

    /// Has the top edge of the circle fully passed the bottom of the surface?
    #[must_use]
    pub fn has_left_surface(&self, surface_height: f32) -> bool {
        self.y - self.radius > surface_height
    }

    /// The colour to fill the particle's circle with, including its opacity.
    #[must_use]
    pub fn fill_colour(&self) -> crate::canvas::Pixel {
        let colour: palette::Srgb<f32> = self.colour.into_format();
        crate::canvas::Pixel::new(colour.red, colour.green, colour.blue, self.opacity)
    }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng as _;

    use super::*;

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(42)
    }

    #[test]
    fn spawned_particles_start_above_the_surface() {
        let config = AnimatorConfig::default();
        let particle = Particle::spawn(&mut rng(), &config, 800.0);
        assert!((particle.y - -20.0).abs() < f32::EPSILON);
        assert!((0.0..800.0).contains(&particle.x));
    }

    #[test]
    fn attributes_are_within_their_ranges() {
        let config = AnimatorConfig::default();
        let mut rng = rng();
        for _ in 0..1000 {
            let particle = Particle::spawn(&mut rng, &config, 100.0);
            assert!((5.0..=20.0).contains(&particle.radius));
            assert!((1.0..=3.0).contains(&particle.speed));
            assert!((0.3..=0.8).contains(&particle.opacity));
        }
    }

    #[test]
    fn zero_width_surface_puts_particles_at_the_left_edge() {
        let particle = Particle::spawn(&mut rng(), &AnimatorConfig::default(), 0.0);
        assert!(particle.x.abs() < f32::EPSILON);
    }

    #[test]
    fn only_position_changes_when_falling() {
        let mut particle = Particle::spawn(&mut rng(), &AnimatorConfig::default(), 100.0);
        let before = particle.clone();
        particle.advance();
        assert!((particle.y - (before.y + before.speed)).abs() < f32::EPSILON);
        assert_eq!(
            Particle {
                y: before.y,
                ..particle
            },
            before
        );
    }

    #[test]
    fn leaving_the_surface_is_measured_from_the_top_edge() {
        let mut particle = Particle::spawn(&mut rng(), &AnimatorConfig::default(), 100.0);
        particle.radius = 10.0;

        particle.y = 510.0;
        assert!(!particle.has_left_surface(500.0));

        particle.y = 510.5;
        assert!(particle.has_left_surface(500.0));
    }

    #[test]
    fn fill_colour_carries_opacity() {
        let mut particle = Particle::spawn(&mut rng(), &AnimatorConfig::default(), 100.0);
        particle.colour = palette::Srgb::new(255, 0, 0);
        particle.opacity = 0.5;
        let fill = particle.fill_colour();
        assert!((fill.red - 1.0).abs() < f32::EPSILON);
        assert!(fill.green.abs() < f32::EPSILON);
        assert!((fill.alpha - 0.5).abs() < f32::EPSILON);
    }
}
