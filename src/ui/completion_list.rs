use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use super::{Palette, truncate_to_width};
use crate::completion::{CompletionView, Row};

/// The rows of an open completion session that fit the configured height.
pub(super) struct CompletionListWidget {
	rows: Vec<(Row, Style)>,
}

impl CompletionListWidget {
	pub(super) fn new(view: &CompletionView, limit: usize, palette: &Palette) -> Self {
		let window = view.window(limit);
		let rows = view.rows[window.clone()]
			.iter()
			.zip(window)
			.map(|(row, index)| {
				let style = if row.is_group {
					palette.completion_group.add_modifier(Modifier::BOLD)
				} else if view.current == Some(index) {
					palette.completion_highlight
				} else {
					palette.completion
				};
				(row.clone(), style)
			})
			.collect();
		Self { rows }
	}

	pub(super) fn height(&self) -> u16 {
		u16::try_from(self.rows.len()).unwrap_or(u16::MAX)
	}
}

impl Widget for CompletionListWidget {
	fn render(self, area: Rect, buf: &mut Buffer) {
		let width = usize::from(area.width);
		for (offset, (row, style)) in self.rows.into_iter().enumerate() {
			let Ok(offset) = u16::try_from(offset) else {
				break;
			};
			if offset >= area.height {
				break;
			}
			let line_area = Rect { y: area.y + offset, height: 1, ..area };
			buf.set_style(line_area, style);

			let label = truncate_to_width(&row.label, width.saturating_sub(1));
			let mut spans = vec![Span::raw(format!(" {label}"))];
			if let Some(description) = row.description {
				let used = label.width() + 1;
				let description = truncate_to_width(&description, width.saturating_sub(used + 2));
				let gap = width.saturating_sub(used + description.width() + 1);
				if !description.is_empty() && gap > 0 {
					spans.push(Span::raw(" ".repeat(gap)));
					spans.push(Span::raw(description));
				}
			}
			Line::from(spans).style(style).render(line_area, buf);
		}
	}
}
