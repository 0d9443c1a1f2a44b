use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use super::{Palette, truncate_to_width};
use crate::view::TerminalView;

/// One label per tab, the focused one highlighted.
pub(super) struct TopBarWidget {
	spans: Vec<Span<'static>>,
	fill:  Style,
}

impl TopBarWidget {
	pub(super) fn from_view(view: &TerminalView, palette: &Palette, width: u16) -> Self {
		let tabs = view.tabs();
		let per_tab = if tabs.is_empty() { 0 } else { usize::from(width) / tabs.len() };

		let mut spans = Vec::new();
		for (index, tab) in tabs.iter().enumerate() {
			let style = if index == view.current_index() {
				palette.tabbar_focus.add_modifier(Modifier::BOLD)
			} else {
				palette.tabbar
			};
			let title = tab.uri.split_once("://").map_or(tab.uri.as_str(), |(_, rest)| rest);
			let prefix = format!(" {}: ", index + 1);
			let room = per_tab.saturating_sub(prefix.len() + 1);
			spans.push(Span::styled(format!("{prefix}{} ", truncate_to_width(title, room)), style));
		}
		Self { spans, fill: palette.tabbar }
	}
}

impl Widget for TopBarWidget {
	fn render(self, area: Rect, buf: &mut Buffer) {
		buf.set_style(area, self.fill);
		Paragraph::new(Line::from(self.spans)).render(area, buf);
	}
}
