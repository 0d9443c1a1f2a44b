use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget, Wrap};

use super::Palette;
use crate::ports::{Axis, SearchDirection, ViewSurface};
use crate::view::TerminalView;

/// What the page would show: its address and the state the engine drove.
pub(super) struct ViewPaneWidget {
	lines: Vec<Line<'static>>,
	style: Style,
}

impl ViewPaneWidget {
	pub(super) fn from_view(view: &TerminalView, palette: &Palette) -> Self {
		let style = palette.default;
		let dim = style.add_modifier(Modifier::DIM);
		let Some(tab) = view.current() else {
			return Self { lines: vec![Line::styled("No page open", dim)], style };
		};

		let mut lines = Vec::new();
		let mut title = vec![Span::styled(tab.uri.clone(), style.add_modifier(Modifier::BOLD))];
		if tab.loading {
			title.push(Span::styled("  loading", dim));
		}
		if tab.source_view {
			title.push(Span::styled("  [source]", dim));
		}
		lines.push(Line::from(title));
		lines.push(Line::default());

		let percent = view
			.viewport(Axis::Vertical)
			.map(|viewport| if viewport.max() > 0.0 { viewport.value / viewport.max() * 100.0 } else { 0.0 })
			.unwrap_or(0.0);
		lines.push(Line::styled(format!("scroll {percent:.0}%   zoom {:.0}%", tab.zoom * 100.0), style));
		lines.push(Line::styled(
			format!("history {} back, {} forward", tab.back.len(), tab.forward.len()),
			style,
		));

		if let Some(hint) = view.hint() {
			let target = if hint.new_tab { " (new tab)" } else { "" };
			lines.push(Line::styled(format!("hint: {}_{target}", hint.typed), style));
		}
		if let Some((query, direction)) = view.last_search() {
			let arrow = match direction {
				SearchDirection::Forward => '/',
				SearchDirection::Backward => '?',
			};
			lines.push(Line::styled(format!("search: {arrow}{query}"), style));
		}
		if let Some(key) = view.last_key() {
			lines.push(Line::styled(format!("page received {key}"), style));
		}
		if let Some(proxy) = view.proxy() {
			lines.push(Line::styled(format!("proxy: {proxy}"), style));
		}
		if !view.last_event().is_empty() {
			lines.push(Line::default());
			lines.push(Line::styled(view.last_event().to_string(), dim));
		}
		Self { lines, style }
	}
}

impl Widget for ViewPaneWidget {
	fn render(self, area: Rect, buf: &mut Buffer) {
		Paragraph::new(self.lines).style(self.style).wrap(Wrap { trim: false }).render(area, buf);
	}
}
