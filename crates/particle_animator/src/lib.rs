//! # Particle Animator
//! A fixed-size collection of falling circles, advanced and redrawn once per frame onto an
//! in-memory RGBA pixel surface.
//!
//! The [`animator::Animator`] owns everything it needs: its config, its particles, its drawing
//! surface and its source of randomness. Nothing is global, so any number of animators can run
//! side by side, and tests can step them deterministically with a seeded RNG.
//!
//! Whatever displays the animation (a terminal, an image file, a window) implements
//! [`host::Host`]. The host reports the size of the container that the surface should fill,
//! delivers resize and frame notifications, and receives each finished frame.
//! [`host::run`] is the frame loop that ties the two together.

pub mod animator;
pub mod canvas;
pub mod config;
pub mod errors;
pub mod host;
pub mod particle;
