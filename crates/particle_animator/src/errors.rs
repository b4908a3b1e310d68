//! Errors for this library

/// All the known errors returned by this crate.
#[derive(Debug, snafu::Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum AnimatorError {
    /// The host couldn't provide anything to draw on. There is no fallback rendering path, so
    /// this is fatal at startup.
    #[snafu(display("Drawing surface unavailable: {reason}"))]
    SurfaceUnavailable {
        /// Why the surface couldn't be obtained
        reason: String,
    },

    /// A config value that would break the animation's invariants.
    #[snafu(display("Invalid animation config for `{field}`: {message}"))]
    InvalidConfig {
        /// The offending config field
        field: String,
        /// What's wrong with it
        message: String,
    },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn surface_unavailable_message() {
        let error = SurfaceUnavailableSnafu {
            reason: "no terminal",
        }
        .build();
        assert_eq!(error.to_string(), "Drawing surface unavailable: no terminal");
    }
}
