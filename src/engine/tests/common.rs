use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use crate::action::{ActionKind, Argument};
use crate::completion::CompletionView;
use crate::engine::{Engine, KeyOutcome};
use crate::key::{KeyChord, KeyCode, Modifiers};
use crate::persistence::PersistenceError;
use crate::ports::{
	Axis, DisplaySink, FollowStep, HistoryDirection, NotifyLevel, OpenTarget, PersistenceSink, Ports,
	SearchDirection, SurfaceError, ViewSurface, Viewport,
};
use crate::settings::SettingValue;

pub(super) const START_URI: &str = "http://example.com/docs/guide/intro";

/// Records every call the engine makes on the view.
#[derive(Debug)]
pub(super) struct FakeView {
	pub tabs:           Vec<String>,
	pub current:        usize,
	pub opened:         Vec<(String, OpenTarget)>,
	pub history_moves:  Vec<HistoryDirection>,
	pub reloads:        Vec<bool>,
	pub stops:          usize,
	pub vertical:       Viewport,
	pub horizontal:     Viewport,
	pub zoom:           f64,
	pub searches:       Vec<(String, SearchDirection)>,
	pub follow:         Vec<FollowStep>,
	pub source_toggles: usize,
	pub scripts:        Vec<String>,
	pub saved:          Vec<PathBuf>,
	pub clipboard:      Option<String>,
	pub proxy:          Option<String>,
	pub settings:       Vec<(String, SettingValue)>,
	pub forwarded:      Vec<KeyChord>,
}

impl FakeView {
	pub fn with_tabs(uris: &[&str]) -> Self {
		Self {
			tabs:           uris.iter().map(|uri| uri.to_string()).collect(),
			current:        0,
			opened:         Vec::new(),
			history_moves:  Vec::new(),
			reloads:        Vec::new(),
			stops:          0,
			vertical:       Viewport { value: 0.0, page_size: 100.0, upper: 1100.0 },
			horizontal:     Viewport { value: 0.0, page_size: 80.0, upper: 80.0 },
			zoom:           1.0,
			searches:       Vec::new(),
			follow:         Vec::new(),
			source_toggles: 0,
			scripts:        Vec::new(),
			saved:          Vec::new(),
			clipboard:      None,
			proxy:          None,
			settings:       Vec::new(),
			forwarded:      Vec::new(),
		}
	}

	pub fn empty() -> Self {
		Self::with_tabs(&[])
	}

	pub fn setting(&self, property: &str) -> Option<&SettingValue> {
		self.settings.iter().rev().find(|(name, _)| name == property).map(|(_, value)| value)
	}
}

impl ViewSurface for FakeView {
	fn tab_count(&self) -> usize {
		self.tabs.len()
	}

	fn current_tab(&self) -> Option<usize> {
		(!self.tabs.is_empty()).then_some(self.current)
	}

	fn switch_tab(&mut self, index: usize) {
		self.current = index;
	}

	fn close_tab(&mut self) {
		self.tabs.remove(self.current);
		self.current = self.current.min(self.tabs.len().saturating_sub(1));
	}

	fn current_uri(&self) -> Option<String> {
		self.tabs.get(self.current).cloned()
	}

	fn open(&mut self, uri: &str, target: OpenTarget) {
		self.opened.push((uri.to_string(), target));
		match target {
			OpenTarget::Current if !self.tabs.is_empty() => self.tabs[self.current] = uri.to_string(),
			_ => {
				self.tabs.push(uri.to_string());
				self.current = self.tabs.len() - 1;
			}
		}
	}

	fn navigate_history(&mut self, direction: HistoryDirection) {
		self.history_moves.push(direction);
	}

	fn reload(&mut self, bypass_cache: bool) {
		self.reloads.push(bypass_cache);
	}

	fn reload_all(&mut self) {
		self.reloads.extend(std::iter::repeat_n(false, self.tabs.len()));
	}

	fn stop_loading(&mut self) {
		self.stops += 1;
	}

	fn viewport(&self, axis: Axis) -> Option<Viewport> {
		if self.tabs.is_empty() {
			return None;
		}
		Some(match axis {
			Axis::Horizontal => self.horizontal,
			Axis::Vertical => self.vertical,
		})
	}

	fn set_scroll(&mut self, axis: Axis, value: f64) {
		match axis {
			Axis::Horizontal => self.horizontal.value = value,
			Axis::Vertical => self.vertical.value = value,
		}
	}

	fn zoom_level(&self) -> Option<f64> {
		(!self.tabs.is_empty()).then_some(self.zoom)
	}

	fn set_zoom_level(&mut self, level: f64) {
		self.zoom = level;
	}

	fn search(&mut self, query: &str, direction: SearchDirection) {
		self.searches.push((query.to_string(), direction));
	}

	fn follow_link(&mut self, step: FollowStep) {
		self.follow.push(step);
	}

	fn toggle_source_view(&mut self) {
		self.source_toggles += 1;
	}

	fn run_script(&mut self, source: &str) -> Result<(), SurfaceError> {
		if source.contains("throw") {
			return Err(SurfaceError::Rejected("script threw".to_string()));
		}
		self.scripts.push(source.to_string());
		Ok(())
	}

	fn save_as(&mut self, path: &Path) -> Result<(), SurfaceError> {
		if self.tabs.is_empty() {
			return Err(SurfaceError::NoDocument);
		}
		self.saved.push(path.to_path_buf());
		Ok(())
	}

	fn clipboard_text(&mut self) -> Option<String> {
		self.clipboard.clone()
	}

	fn set_clipboard_text(&mut self, text: &str) {
		self.clipboard = Some(text.to_string());
	}

	fn set_proxy(&mut self, proxy: Option<&str>) {
		self.proxy = proxy.map(str::to_string);
	}

	fn apply_setting(&mut self, property: &str, value: &SettingValue) {
		self.settings.push((property.to_string(), value.clone()));
	}

	fn forward_key(&mut self, key: KeyChord) {
		self.forwarded.push(key);
	}
}

#[derive(Debug, Default)]
pub(super) struct FakeDisplay {
	pub notifications: Vec<(NotifyLevel, String)>,
	pub modes:         Vec<String>,
	pub buffer:        String,
	pub completion:    Option<CompletionView>,
	pub statusbar:     Option<bool>,
	pub tabbar:        Option<bool>,
}

impl FakeDisplay {
	/// Last non-empty notification.
	pub fn last_message(&self) -> Option<(NotifyLevel, &str)> {
		self.notifications
			.iter()
			.rev()
			.find(|(_, message)| !message.is_empty())
			.map(|(level, message)| (*level, message.as_str()))
	}
}

impl DisplaySink for FakeDisplay {
	fn notify(&mut self, level: NotifyLevel, message: &str) {
		self.notifications.push((level, message.to_string()));
	}

	fn show_mode(&mut self, label: &str) {
		self.modes.push(label.to_string());
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
		self.statusbar = Some(visible);
	}

	fn set_tabbar_visible(&mut self, visible: bool) {
		self.tabbar = Some(visible);
	}
}

#[derive(Debug, Default)]
pub(super) struct FakePersistence {
	pub history:   Option<Vec<String>>,
	pub bookmarks: Option<Vec<String>>,
}

impl PersistenceSink for FakePersistence {
	fn save_history(&mut self, entries: &[String]) -> Result<(), PersistenceError> {
		self.history = Some(entries.to_vec());
		Ok(())
	}

	fn save_bookmarks(&mut self, entries: &[String]) -> Result<(), PersistenceError> {
		self.bookmarks = Some(entries.to_vec());
		Ok(())
	}
}

/// An engine wired to recording fakes.
pub(super) struct Harness {
	pub engine:      Engine,
	pub view:        FakeView,
	pub display:     FakeDisplay,
	pub persistence: FakePersistence,
}

impl Harness {
	pub fn with_view(view: FakeView) -> Self {
		Self {
			engine: Engine::new().expect("default buffer patterns compile"),
			view,
			display: FakeDisplay::default(),
			persistence: FakePersistence::default(),
		}
	}

	/// Sends one key and hands back the raw outcome.
	pub fn dispatch(&mut self, key: KeyChord) -> ControlFlow<(), KeyOutcome> {
		let mut ports = Ports::new(&mut self.view, &mut self.display, &mut self.persistence);
		self.engine.handle_key(&mut ports, key)
	}

	/// Sends one key that must not end the session.
	pub fn press(&mut self, key: KeyChord) {
		let flow = self.dispatch(key);
		assert!(flow.is_continue(), "{key:?} ended the session");
	}

	pub fn press_code(&mut self, code: KeyCode) {
		self.press(KeyChord::plain(code));
	}

	pub fn press_ctrl(&mut self, ch: char) {
		self.press(KeyChord::ctrl(ch));
	}

	pub fn press_shifted(&mut self, code: KeyCode) {
		self.press(KeyChord::new(Modifiers::SHIFT, code));
	}

	pub fn type_keys(&mut self, keys: &str) {
		assert!(self.try_type_keys(keys).is_continue(), "{keys:?} ended the session");
	}

	/// Presses each character as a plain key. Stops at the first `Break`.
	pub fn try_type_keys(&mut self, keys: &str) -> ControlFlow<()> {
		for ch in keys.chars() {
			if self.dispatch(KeyChord::ch(ch)).is_break() {
				return ControlFlow::Break(());
			}
		}
		ControlFlow::Continue(())
	}

	pub fn submit(&mut self, line: &str) {
		assert!(self.try_submit(line).is_continue(), "{line:?} ended the session");
	}

	/// Opens the inputbar on `line` and presses Return.
	pub fn try_submit(&mut self, line: &str) -> ControlFlow<()> {
		self.try_apply(ActionKind::FocusInputbar, &Argument::text(line), None)?;
		match self.dispatch(KeyChord::plain(KeyCode::RETURN)) {
			ControlFlow::Break(()) => ControlFlow::Break(()),
			ControlFlow::Continue(_) => ControlFlow::Continue(()),
		}
	}

	pub fn try_apply(&mut self, action: ActionKind, argument: &Argument, buffer: Option<&str>) -> ControlFlow<()> {
		let mut ports = Ports::new(&mut self.view, &mut self.display, &mut self.persistence);
		self.engine.apply(&mut ports, action, argument, buffer)
	}

	pub fn apply_config(&mut self, text: &str) -> usize {
		let mut ports = Ports::new(&mut self.view, &mut self.display, &mut self.persistence);
		self.engine.apply_config(&mut ports, text)
	}
}

pub(super) fn test_harness() -> Harness {
	Harness::with_view(FakeView::with_tabs(&[START_URI]))
}
