use std::io;

use crossterm::cursor::SetCursorStyle;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerminalSessionError {
	#[error("enable raw mode failed")]
	EnableRawMode {
		#[source]
		source: io::Error,
	},
	#[error("enter alternate screen failed")]
	EnterAlternateScreen {
		#[source]
		source: io::Error,
	},
	#[error("create terminal backend failed")]
	CreateTerminal {
		#[source]
		source: io::Error,
	},
	#[error("terminal draw failed")]
	Draw {
		#[source]
		source: io::Error,
	},
	#[error("set cursor style failed")]
	SetCursorStyle {
		#[source]
		source: io::Error,
	},
}

struct TerminalModeGuard;

impl Drop for TerminalModeGuard {
	fn drop(&mut self) {
		let _ = disable_raw_mode();
		let mut stdout = io::stdout();
		let _ = execute!(stdout, SetCursorStyle::DefaultUserShape, LeaveAlternateScreen);
	}
}

/// Raw mode plus alternate screen for as long as the value lives.
pub(crate) struct TerminalSession {
	terminal:    Terminal<CrosstermBackend<io::Stdout>>,
	typing:      Option<bool>,
	_mode_guard: TerminalModeGuard,
}

impl TerminalSession {
	pub(crate) fn enter(title: &str) -> Result<Self, TerminalSessionError> {
		enable_raw_mode().map_err(|source| TerminalSessionError::EnableRawMode { source })?;
		let mode_guard = TerminalModeGuard;
		let mut stdout = io::stdout();
		execute!(stdout, EnterAlternateScreen, SetTitle(title))
			.map_err(|source| TerminalSessionError::EnterAlternateScreen { source })?;
		let backend = CrosstermBackend::new(stdout);
		let terminal =
			Terminal::new(backend).map_err(|source| TerminalSessionError::CreateTerminal { source })?;
		Ok(Self { terminal, typing: None, _mode_guard: mode_guard })
	}

	pub(crate) fn draw(
		&mut self,
		render: impl FnOnce(&mut ratatui::Frame<'_>),
	) -> Result<(), TerminalSessionError> {
		self.terminal.draw(render).map_err(|source| TerminalSessionError::Draw { source })?;
		Ok(())
	}

	/// Bar cursor while text is being typed, block otherwise.
	pub(crate) fn sync_cursor_style(&mut self, typing: bool) -> Result<(), TerminalSessionError> {
		if self.typing == Some(typing) {
			return Ok(());
		}
		let style = if typing { SetCursorStyle::SteadyBar } else { SetCursorStyle::SteadyBlock };
		execute!(self.terminal.backend_mut(), style)
			.map_err(|source| TerminalSessionError::SetCursorStyle { source })?;
		self.typing = Some(typing);
		Ok(())
	}
}
