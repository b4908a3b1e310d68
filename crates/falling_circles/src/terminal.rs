//! Run the animation in the user's terminal.

use color_eyre::eyre::Result;
use termwiz::input::{InputEvent, KeyCode, KeyEvent, Modifiers};
use termwiz::surface::Change as TermwizChange;
use termwiz::terminal::buffered::BufferedTerminal;
use termwiz::terminal::Terminal as TermwizTerminal;
use tokio::sync::mpsc;

use particle_animator::canvas::{Canvas, Size};
use particle_animator::errors::AnimatorError;
use particle_animator::host::{Host, HostEvent};

use crate::config::Config;
use crate::surface::Surface;

/// Microseconds in a second.
const ONE_MICROSECOND: u64 = 1_000_000;

/// `TerminalHost`
///
/// Takes over the whole of the user's terminal: raw mode, the alternate screen and a hidden
/// cursor. Call [`TerminalHost::restore`] to give the terminal back.
pub(crate) struct TerminalHost<T: TermwizTerminal> {
    /// The user's terminal, with a buffer so that only changed cells are redrawn
    terminal: BufferedTerminal<T>,
    /// The half-block version of the latest frame
    surface: Surface,
    /// Target frame rate
    frame_rate: u32,
    /// When the last frame was due
    last_frame_tick: tokio::time::Instant,
    /// Freshly reloaded config
    config_updates: mpsc::Receiver<Config>,
}

impl TerminalHost<termwiz::terminal::SystemTerminal> {
    /// Take over the user's terminal. No animation is possible without it, so any failure here
    /// is reported as an unavailable surface.
    pub fn new(config: &Config, config_updates: mpsc::Receiver<Config>) -> Result<Self> {
        let terminal = Self::setup_terminal().map_err(|error| {
            AnimatorError::SurfaceUnavailable {
                reason: format!("{error}"),
            }
        })?;
        let (width, height) = terminal.dimensions();

        Ok(Self {
            terminal,
            surface: Surface::new(width, height, config.background_colour()),
            frame_rate: config.frame_rate,
            last_frame_tick: tokio::time::Instant::now(),
            config_updates,
        })
    }

    /// The platform's concrete terminal, so that it can be named in `TerminalHost`'s type.
    fn get_termwiz_terminal() -> Result<termwiz::terminal::SystemTerminal> {
        let capabilities = termwiz::caps::Capabilities::new_from_env()?;
        Ok(termwiz::terminal::SystemTerminal::new(capabilities)?)
    }

    /// Put the terminal into raw mode on the alternate screen.
    fn setup_terminal() -> Result<BufferedTerminal<termwiz::terminal::SystemTerminal>> {
        tracing::debug!("Putting user's terminal into raw mode");
        let mut terminal = Self::get_termwiz_terminal()?;
        terminal.set_raw_mode()?;
        terminal.enter_alternate_screen()?;

        let mut buffered = BufferedTerminal::new(terminal)?;
        buffered.add_change(TermwizChange::CursorVisibility(
            termwiz::surface::CursorVisibility::Hidden,
        ));
        buffered.flush()?;
        Ok(buffered)
    }
}

impl<T: TermwizTerminal> TerminalHost<T> {
    /// Put the user's terminal back how we found it.
    pub fn restore(&mut self) -> Result<()> {
        tracing::debug!("Setting user's terminal to cooked mode");
        self.terminal.add_change(TermwizChange::CursorVisibility(
            termwiz::surface::CursorVisibility::Visible,
        ));
        self.terminal.flush()?;
        self.terminal.terminal().exit_alternate_screen()?;
        self.terminal.terminal().set_cooked_mode()?;
        Ok(())
    }

    /// How long until the next frame is due.
    fn time_until_next_frame_tick(&self) -> std::time::Duration {
        let target = ONE_MICROSECOND.wrapping_div(self.frame_rate.max(1).into());
        let target_frame_rate_micro = std::time::Duration::from_micros(target);
        target_frame_rate_micro
            .checked_sub(self.last_frame_tick.elapsed())
            .unwrap_or_default()
    }

    /// Check for any waiting user input without blocking.
    fn poll_input(&mut self) -> Result<Option<HostEvent>> {
        while let Some(input) = self
            .terminal
            .terminal()
            .poll_input(Some(std::time::Duration::ZERO))?
        {
            if let Some(event) = self.handle_input(&input)? {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    /// Convert user input into a host event, if it's one we care about.
    fn handle_input(&mut self, input: &InputEvent) -> Result<Option<HostEvent>> {
        #[expect(
            clippy::wildcard_enum_match_arm,
            reason = "All other input is ignored"
        )]
        match input {
            InputEvent::Resized { .. } => {
                self.terminal.check_for_resize()?;
                self.terminal.repaint()?;
                let (width, height) = self.terminal.dimensions();
                tracing::debug!("Terminal resized to {width}x{height}");
                self.surface = Surface::new(width, height, self.surface.background);
                Ok(Some(HostEvent::Resize))
            }
            InputEvent::Key(key) if Self::is_quit_key(key) => {
                tracing::debug!("Quit key pressed");
                Ok(Some(HostEvent::Teardown))
            }
            _ => Ok(None),
        }
    }

    /// The keys that stop the animation: `q`, `Escape` and `Ctrl-C`.
    #[expect(clippy::wildcard_enum_match_arm, reason = "Every other key is ignored")]
    fn is_quit_key(key: &KeyEvent) -> bool {
        match key.key {
            KeyCode::Char('q') | KeyCode::Escape => true,
            KeyCode::Char('c') => key.modifiers.contains(Modifiers::CTRL),
            _ => false,
        }
    }

    /// Apply the parts of a new config that only the terminal cares about.
    fn apply_config(&mut self, config: &Config) {
        self.frame_rate = config.frame_rate;
        self.surface.background = config.background_colour();
    }
}

impl<T: TermwizTerminal> Host for TerminalHost<T> {
    type Error = color_eyre::eyre::Report;

    fn container_size(&mut self) -> Result<Size> {
        let (columns, rows) = self.terminal.dimensions();
        Ok(Surface::pixel_size(columns, rows))
    }

    async fn next_event(&mut self) -> Result<HostEvent> {
        if let Some(event) = self.poll_input()? {
            return Ok(event);
        }

        let wait = self.time_until_next_frame_tick();
        #[expect(
            clippy::integer_division_remainder_used,
            reason = "`tokio::select! generates this.`"
        )]
        let event = tokio::select! {
            () = tokio::time::sleep(wait) => {
                self.last_frame_tick = tokio::time::Instant::now();
                HostEvent::Frame
            }
            Some(config) = self.config_updates.recv() => {
                tracing::debug!("Applying reloaded config");
                self.apply_config(&config);
                HostEvent::Reconfigure(config.animation)
            }
        };

        Ok(event)
    }

    fn present(&mut self, canvas: &Canvas) -> Result<()> {
        self.surface.draw_canvas(canvas);
        self.terminal.draw_from_screen(&self.surface.surface, 0, 0);
        self.terminal.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn key(key: KeyCode, modifiers: Modifiers) -> KeyEvent {
        KeyEvent { key, modifiers }
    }

    #[test]
    fn quit_keys() {
        type SystemHost = TerminalHost<termwiz::terminal::SystemTerminal>;
        assert!(SystemHost::is_quit_key(&key(KeyCode::Char('q'), Modifiers::NONE)));
        assert!(SystemHost::is_quit_key(&key(KeyCode::Escape, Modifiers::NONE)));
        assert!(SystemHost::is_quit_key(&key(KeyCode::Char('c'), Modifiers::CTRL)));
        assert!(!SystemHost::is_quit_key(&key(KeyCode::Char('c'), Modifiers::NONE)));
        assert!(!SystemHost::is_quit_key(&key(KeyCode::Enter, Modifiers::NONE)));
    }
}
