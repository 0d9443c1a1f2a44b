mod completion_list;
mod display;
mod inputbar_line;
mod status_bar;
mod terminal_session;
mod top_bar;
mod view_pane;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::engine::Engine;
use crate::settings::Settings;
use crate::view::TerminalView;
use completion_list::CompletionListWidget;
pub use display::DisplayState;
use inputbar_line::InputbarLineWidget;
use status_bar::StatusBarWidget;
pub(crate) use terminal_session::TerminalSession;
pub use terminal_session::TerminalSessionError;
use top_bar::TopBarWidget;
use view_pane::ViewPaneWidget;

/// Styles built from the color options.
#[derive(Debug, Clone, Copy)]
pub(super) struct Palette {
	pub default:              Style,
	pub completion:           Style,
	pub completion_group:     Style,
	pub completion_highlight: Style,
	pub inputbar:             Style,
	pub notification_warning: Style,
	pub notification_error:   Style,
	pub statusbar:            Style,
	pub tabbar:               Style,
	pub tabbar_focus:         Style,
}

impl Palette {
	pub fn from_settings(settings: &Settings) -> Self {
		let style = |prefix: &str| {
			Style::default()
				.fg(color(settings, &format!("{prefix}_fgcolor")))
				.bg(color(settings, &format!("{prefix}_bgcolor")))
		};
		Self {
			default:              style("default"),
			completion:           style("completion"),
			completion_group:     style("completion_g"),
			completion_highlight: style("completion_hl"),
			inputbar:             style("inputbar"),
			notification_warning: style("notification_w"),
			notification_error:   style("notification_e"),
			statusbar:            style("statusbar"),
			tabbar:               style("tabbar"),
			tabbar_focus:         style("tabbar_focus"),
		}
	}
}

/// `#rrggbb` option value, or the terminal default when it does not parse.
fn color(settings: &Settings, name: &str) -> Color {
	settings.string(name).parse().unwrap_or(Color::Reset)
}

/// Cuts `text` to `max` columns, marking the cut with an ellipsis.
pub(super) fn truncate_to_width(text: &str, max: usize) -> String {
	if text.width() <= max {
		return text.to_string();
	}
	if max == 0 {
		return String::new();
	}
	let mut out = String::new();
	let mut used = 0;
	for ch in text.chars() {
		let width = ch.width().unwrap_or(0);
		if used + width + 1 > max {
			break;
		}
		used += width;
		out.push(ch);
	}
	out.push('…');
	out
}

pub struct Renderer {
	last_view_area: Option<Rect>,
}

impl Renderer {
	pub fn new() -> Self {
		Self { last_view_area: None }
	}

	/// Draws one frame and keeps the view's page size in step with its pane.
	pub fn render(
		&mut self,
		frame: &mut ratatui::Frame<'_>,
		engine: &Engine,
		view: &mut TerminalView,
		display: &DisplayState,
	) {
		let settings = engine.settings();
		let palette = Palette::from_settings(settings);
		let limit = usize::try_from(settings.int("n_completion_items")).unwrap_or(0);
		let completion = display
			.completion
			.as_ref()
			.map(|completion| CompletionListWidget::new(completion, limit, &palette));
		let completion_height = completion.as_ref().map_or(0, CompletionListWidget::height);

		let chunks = Layout::vertical([
			Constraint::Length(u16::from(display.tabbar)),
			Constraint::Min(1),
			Constraint::Length(completion_height),
			Constraint::Length(u16::from(display.statusbar)),
			Constraint::Length(1),
		])
		.split(frame.area());

		if self
			.last_view_area
			.map(|last| last.width != chunks[1].width || last.height != chunks[1].height)
			.unwrap_or(true)
		{
			view.resize(chunks[1].width, chunks[1].height);
			self.last_view_area = Some(chunks[1]);
		}

		if display.tabbar {
			frame.render_widget(TopBarWidget::from_view(view, &palette, chunks[0].width), chunks[0]);
		}
		frame.render_widget(ViewPaneWidget::from_view(view, &palette), chunks[1]);
		if let Some(completion) = completion {
			frame.render_widget(completion, chunks[2]);
		}
		if display.statusbar {
			frame.render_widget(StatusBarWidget::from_state(engine, view, display, &palette), chunks[3]);
		}
		let (inputbar, cursor) = InputbarLineWidget::from_state(engine, display, &palette, chunks[4]);
		frame.render_widget(inputbar, chunks[4]);
		if let Some(cursor) = cursor {
			frame.set_cursor_position(cursor);
		}
	}

	pub fn mark_layout_dirty(&mut self) {
		self.last_view_area = None;
	}
}

impl Default for Renderer {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use ratatui::style::Color;

	use super::{Palette, truncate_to_width};
	use crate::settings::Settings;

	#[test]
	fn truncate_should_keep_short_text_and_mark_cuts() {
		assert_eq!(truncate_to_width("example.com", 20), "example.com");
		assert_eq!(truncate_to_width("example.com", 5), "exam…");
		assert_eq!(truncate_to_width("日本語", 4), "日…");
		assert_eq!(truncate_to_width("abc", 0), "");
	}

	#[test]
	fn palette_should_follow_color_options() {
		let mut settings = Settings::new();
		settings.set(&["statusbar_bgcolor", "#102030"]).expect("set");
		settings.set(&["tabbar_fgcolor", "not-a-color"]).expect("set");
		let palette = Palette::from_settings(&settings);
		assert_eq!(palette.statusbar.bg, Some(Color::Rgb(0x10, 0x20, 0x30)));
		assert_eq!(palette.tabbar.fg, Some(Color::Reset));
	}
}
