//! All the variables that can be configured for the animation

use crate::errors::{AnimatorError, InvalidConfigSnafu};

/// An inclusive range that particle attributes are randomly picked from.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
#[expect(
    clippy::exhaustive_structs,
    reason = "A range is only ever going to have a start and an end"
)]
pub struct ValueRange {
    /// The smallest value
    pub min: f32,
    /// The largest value
    pub max: f32,
}

impl ValueRange {
    /// Instantiate
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Pick a random value from the range. Never panics, even for an empty range, because it
    /// scales a unit random number rather than sampling between the bounds.
    pub fn sample<R: rand::Rng>(&self, rng: &mut R) -> f32 {
        self.min + rng.gen::<f32>() * (self.max - self.min)
    }

    /// Is the value within the range?
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Check that the range isn't inverted and lies within the given bounds.
    fn validate(&self, field: &str, lowest: f32, highest: f32) -> Result<(), AnimatorError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return InvalidConfigSnafu {
                field,
                message: "range bounds must be finite numbers",
            }
            .fail();
        }
        if self.min > self.max {
            return InvalidConfigSnafu {
                field,
                message: format!("min ({}) is larger than max ({})", self.min, self.max),
            }
            .fail();
        }
        if self.min < lowest || self.max > highest {
            return InvalidConfigSnafu {
                field,
                message: format!("range must lie within {lowest}..={highest}"),
            }
            .fail();
        }

        Ok(())
    }
}

/// The faint horizontal line drawn across the top of the surface.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct ReferenceLine {
    /// Whether to draw the line at all
    pub enabled: bool,
    /// Distance of the line's centre from the top of the surface, in pixels
    pub y: f32,
    /// The thickness of the line, in pixels
    pub width: f32,
    /// Red, green and blue
    pub colour: [u8; 3],
    /// How see-through the line is. 0.0 is invisible, 1.0 is solid.
    pub opacity: f32,
}

impl Default for ReferenceLine {
    fn default() -> Self {
        Self {
            enabled: true,
            y: 50.0,
            width: 2.0,
            colour: [0, 0, 0],
            opacity: 0.2,
        }
    }
}

/// All the config for the animation
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct AnimatorConfig {
    /// The number of particles. It never changes during the lifetime of an animator, unless the
    /// animator is explicitly reconfigured.
    pub particle_count: usize,
    /// Circle radius, in pixels
    pub radius: ValueRange,
    /// How far a particle falls every frame, in pixels
    pub speed: ValueRange,
    /// Particle transparency
    pub opacity: ValueRange,
    /// The vertical position that respawned particles start from. Negative so that they start
    /// just above the visible surface.
    pub respawn_y: f32,
    /// The line drawn across the top of the surface
    pub reference_line: ReferenceLine,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            particle_count: 30,
            radius: ValueRange::new(5.0, 20.0),
            speed: ValueRange::new(1.0, 3.0),
            opacity: ValueRange::new(0.3, 0.8),
            respawn_y: -20.0,
            reference_line: ReferenceLine::default(),
        }
    }
}

impl AnimatorConfig {
    /// Make sure that every randomly generated attribute will be in a sensible range.
    ///
    /// # Errors
    /// When any of the ranges are inverted, not finite, or outside of what can be drawn.
    pub fn validate(&self) -> Result<(), AnimatorError> {
        self.radius.validate("radius", 0.0, f32::MAX)?;
        self.speed.validate("speed", 0.0, f32::MAX)?;
        self.opacity.validate("opacity", 0.0, 1.0)?;

        if !self.respawn_y.is_finite() {
            return InvalidConfigSnafu {
                field: "respawn_y",
                message: "must be a finite number",
            }
            .fail();
        }

        let line = &self.reference_line;
        if !(0.0..=1.0).contains(&line.opacity) {
            return InvalidConfigSnafu {
                field: "reference_line.opacity",
                message: format!("{} is not within 0.0..=1.0", line.opacity),
            }
            .fail();
        }
        if !line.width.is_finite() || line.width < 0.0 || !line.y.is_finite() {
            return InvalidConfigSnafu {
                field: "reference_line",
                message: "`y` must be finite and `width` must be a positive number",
            }
            .fail();
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng as _;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        AnimatorConfig::default().validate().unwrap();
    }

    #[test]
    fn samples_stay_within_range() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let range = ValueRange::new(0.3, 0.8);
        for _ in 0..10_000 {
            assert!(range.contains(range.sample(&mut rng)));
        }
    }

    #[test]
    fn empty_range_samples_its_only_value() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let range = ValueRange::new(2.0, 2.0);
        assert!((range.sample(&mut rng) - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let config = AnimatorConfig {
            speed: ValueRange::new(3.0, 1.0),
            ..AnimatorConfig::default()
        };
        let error = config.validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid animation config for `speed`: min (3) is larger than max (1)"
        );
    }

    #[test]
    fn opacity_above_one_is_rejected() {
        let config = AnimatorConfig {
            opacity: ValueRange::new(0.5, 1.5),
            ..AnimatorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnimatorError::InvalidConfig { .. })
        ));
    }
}
