//! Whatever displays the animation and drives its frames.

use crate::animator::Animator;
use crate::canvas::{Canvas, Size};
use crate::config::AnimatorConfig;

/// Notifications from the host to the animator.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum HostEvent {
    /// The display is ready for the next frame.
    Frame,
    /// The container has changed size.
    Resize,
    /// The animation's config has changed.
    Reconfigure(AnimatorConfig),
    /// The host is shutting down, the animation should stop.
    Teardown,
}

/// The environment that an animator runs in.
///
/// The animator never waits on real time itself. Instead the host decides when the next frame
/// is due, which makes the animation just as easy to run against a terminal's refresh rate as
/// against a test that steps through frames one by one.
#[expect(
    async_fn_in_trait,
    reason = "Hosts are only ever used through generics, never as trait objects"
)]
pub trait Host {
    /// The host's own error type. It must be able to carry the animator's errors too.
    type Error: From<crate::errors::AnimatorError>;

    /// The current rendered size of the container that the drawing surface should fill.
    ///
    /// # Errors
    /// When the container can't be measured.
    fn container_size(&mut self) -> Result<Size, Self::Error>;

    /// Wait for the next notification.
    ///
    /// # Errors
    /// When the host can no longer deliver notifications.
    async fn next_event(&mut self) -> Result<HostEvent, Self::Error>;

    /// Display a finished frame.
    ///
    /// # Errors
    /// When the frame couldn't be displayed.
    fn present(&mut self, canvas: &Canvas) -> Result<(), Self::Error>;
}

/// The animation's frame loop. Runs until the host tears itself down.
///
/// # Errors
/// When the host fails, or a config update from the host is invalid.
pub async fn run<H: Host, R: rand::Rng>(
    animator: &mut Animator<R>,
    host: &mut H,
) -> Result<(), H::Error> {
    animator.start(host.container_size()?);

    loop {
        match host.next_event().await? {
            HostEvent::Frame => {
                animator.frame();
                host.present(animator.canvas())?;
            }
            HostEvent::Resize => animator.resize(host.container_size()?),
            HostEvent::Reconfigure(config) => animator.reconfigure(config)?,
            HostEvent::Teardown => break,
        }
    }

    tracing::debug!("Frame loop ended after {} frames", animator.frame_count());
    Ok(())
}
