use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use super::{DisplayState, Palette};
use crate::engine::Engine;
use crate::ports::ViewSurface;
use crate::view::TerminalView;

/// Current URI on the left; pending buffer and tab position on the right.
pub(super) struct StatusBarWidget {
	uri:   String,
	right: String,
	style: Style,
}

impl StatusBarWidget {
	pub(super) fn from_state(
		engine: &Engine,
		view: &TerminalView,
		display: &DisplayState,
		palette: &Palette,
	) -> Self {
		let uri = view.current_uri().unwrap_or_else(|| "[No page]".to_string());
		let uri = if engine.proxy_enabled() { format!("{uri} [proxy]") } else { uri };
		let position = match view.current_tab() {
			Some(index) => format!("[{}/{}]", index + 1, view.tab_count()),
			None => "[0/0]".to_string(),
		};
		let right =
			if display.buffer.is_empty() { position } else { format!("{}  {position}", display.buffer) };
		Self { uri, right, style: palette.statusbar }
	}
}

impl Widget for StatusBarWidget {
	fn render(self, area: Rect, buf: &mut Buffer) {
		buf.set_style(area, self.style);
		let right_width = u16::try_from(self.right.width() + 1).unwrap_or(u16::MAX).min(area.width);
		let chunks = Layout::horizontal([Constraint::Min(1), Constraint::Length(right_width)]).split(area);
		Paragraph::new(Line::raw(format!(" {}", self.uri))).render(chunks[0], buf);
		Paragraph::new(Line::raw(self.right)).render(chunks[1], buf);
	}
}
