use crate::completion::CompletionView;
use crate::ports::{DisplaySink, NotifyLevel};

/// Everything the engine asked the screen to show, kept until the next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
	pub mode_label:   String,
	pub buffer:       String,
	pub notification: Option<(NotifyLevel, String)>,
	pub completion:   Option<CompletionView>,
	pub statusbar:    bool,
	pub tabbar:       bool,
}

impl DisplayState {
	pub fn new() -> Self {
		Self {
			mode_label:   String::new(),
			buffer:       String::new(),
			notification: None,
			completion:   None,
			statusbar:    true,
			tabbar:       true,
		}
	}

	pub fn clear_notification(&mut self) {
		self.notification = None;
	}
}

impl Default for DisplayState {
	fn default() -> Self {
		Self::new()
	}
}

impl DisplaySink for DisplayState {
	/// An empty message clears the line.
	fn notify(&mut self, level: NotifyLevel, message: &str) {
		self.notification = (!message.is_empty()).then(|| (level, message.to_string()));
	}

	fn show_mode(&mut self, label: &str) {
		self.mode_label = label.to_string();
	}

	fn show_buffer(&mut self, buffer: &str) {
		self.buffer = buffer.to_string();
	}

	fn show_completion(&mut self, view: &CompletionView) {
		self.completion = Some(view.clone());
	}

	fn hide_completion(&mut self) {
		self.completion = None;
	}

	fn set_statusbar_visible(&mut self, visible: bool) {
		self.statusbar = visible;
	}

	fn set_tabbar_visible(&mut self, visible: bool) {
		self.tabbar = visible;
	}
}
