use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use super::{DisplayState, Palette};
use crate::engine::Engine;
use crate::ports::NotifyLevel;

/// The bottom line: the inputbar while it is shown, otherwise the latest
/// notification, otherwise the mode label.
pub(super) struct InputbarLineWidget {
	text:  String,
	style: Style,
}

impl InputbarLineWidget {
	pub(super) fn from_state(
		engine: &Engine,
		display: &DisplayState,
		palette: &Palette,
		area: Rect,
	) -> (Self, Option<Position>) {
		let inputbar = engine.inputbar();
		if inputbar.is_visible() {
			let cursor = inputbar.is_focused().then(|| {
				let before = inputbar.text().chars().take(inputbar.cursor()).collect::<String>();
				let column = u16::try_from(before.width()).unwrap_or(u16::MAX);
				Position::new(area.x.saturating_add(column).min(area.right().saturating_sub(1)), area.y)
			});
			return (Self { text: inputbar.text().to_string(), style: palette.inputbar }, cursor);
		}

		let (text, style) = match &display.notification {
			Some((NotifyLevel::Error, message)) => (message.clone(), palette.notification_error),
			Some((NotifyLevel::Warning, message)) => (message.clone(), palette.notification_warning),
			Some((NotifyLevel::Default, message)) => (message.clone(), palette.inputbar),
			None => (display.mode_label.clone(), palette.inputbar),
		};
		(Self { text, style }, None)
	}
}

impl Widget for InputbarLineWidget {
	fn render(self, area: Rect, buf: &mut Buffer) {
		buf.set_style(area, self.style);
		Paragraph::new(Line::raw(self.text)).render(area, buf);
	}
}
