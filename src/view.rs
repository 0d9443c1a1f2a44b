//! The terminal host's view surface.
//!
//! There is no page engine behind it: each tab is a URI with back and forward
//! stacks, a scroll position over a fixed-height document and a zoom level.
//! Searches, hints and forwarded keys are recorded so the renderer can show
//! what the page would have received.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::key::{KeyChord, KeyCode};
use crate::ports::{
	Axis, FollowStep, HistoryDirection, OpenTarget, SearchDirection, SurfaceError, ViewSurface, Viewport,
};
use crate::settings::SettingValue;

/// Height of the stand-in document, in surface units.
pub const DOCUMENT_HEIGHT: f64 = 4000.0;
/// Surface units per terminal row.
pub const ROW_HEIGHT: f64 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
	pub uri:         String,
	pub back:        Vec<String>,
	pub forward:     Vec<String>,
	pub scroll_x:    f64,
	pub scroll_y:    f64,
	pub zoom:        f64,
	pub source_view: bool,
	pub loading:     bool,
}

impl Tab {
	fn new(uri: &str) -> Self {
		Self {
			uri:         uri.to_string(),
			back:        Vec::new(),
			forward:     Vec::new(),
			scroll_x:    0.0,
			scroll_y:    0.0,
			zoom:        1.0,
			source_view: false,
			loading:     true,
		}
	}

	fn navigate(&mut self, uri: &str) {
		let previous = std::mem::replace(&mut self.uri, uri.to_string());
		self.back.push(previous);
		self.forward.clear();
		self.scroll_x = 0.0;
		self.scroll_y = 0.0;
		self.loading = true;
	}
}

/// Link hint entry in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hint {
	pub new_tab: bool,
	pub typed:   String,
}

pub struct TerminalView {
	tabs:        Vec<Tab>,
	current:     usize,
	page_width:  f64,
	page_height: f64,
	clipboard:   Option<arboard::Clipboard>,
	local_clip:  Option<String>,
	proxy:       Option<String>,
	properties:  Vec<(String, SettingValue)>,
	hint:        Option<Hint>,
	last_search: Option<(String, SearchDirection)>,
	last_key:    Option<KeyChord>,
	last_event:  String,
}

impl TerminalView {
	/// A view backed by the system clipboard when one is reachable.
	pub fn new() -> Self {
		let clipboard = match arboard::Clipboard::new() {
			Ok(clipboard) => Some(clipboard),
			Err(err) => {
				warn!("system clipboard unavailable, using a local one: {}", err);
				None
			}
		};
		Self::with_clipboard(clipboard)
	}

	/// A view that never touches the system clipboard.
	pub fn detached() -> Self {
		Self::with_clipboard(None)
	}

	fn with_clipboard(clipboard: Option<arboard::Clipboard>) -> Self {
		Self {
			tabs: Vec::new(),
			current: 0,
			page_width: 80.0,
			page_height: 24.0 * ROW_HEIGHT,
			clipboard,
			local_clip: None,
			proxy: None,
			properties: Vec::new(),
			hint: None,
			last_search: None,
			last_key: None,
			last_event: String::new(),
		}
	}

	/// Updates the page size from the pane the renderer gave the view.
	pub fn resize(&mut self, columns: u16, rows: u16) {
		self.page_width = f64::from(columns);
		self.page_height = f64::from(rows) * ROW_HEIGHT;
	}

	pub fn tabs(&self) -> &[Tab] {
		&self.tabs
	}

	pub fn current(&self) -> Option<&Tab> {
		self.tabs.get(self.current)
	}

	pub fn current_index(&self) -> usize {
		self.current
	}

	pub fn hint(&self) -> Option<&Hint> {
		self.hint.as_ref()
	}

	pub fn last_search(&self) -> Option<(&str, SearchDirection)> {
		self.last_search.as_ref().map(|(query, direction)| (query.as_str(), *direction))
	}

	pub fn last_key(&self) -> Option<KeyChord> {
		self.last_key
	}

	pub fn last_event(&self) -> &str {
		&self.last_event
	}

	pub fn proxy(&self) -> Option<&str> {
		self.proxy.as_deref()
	}

	pub fn property(&self, name: &str) -> Option<&SettingValue> {
		self.properties.iter().find(|(property, _)| property == name).map(|(_, value)| value)
	}

	/// Marks every tab as loaded. Called once per frame.
	pub fn settle(&mut self) {
		for tab in &mut self.tabs {
			tab.loading = false;
		}
	}

	fn current_mut(&mut self) -> Option<&mut Tab> {
		self.tabs.get_mut(self.current)
	}

	fn record(&mut self, event: String) {
		debug!("view: {}", event);
		self.last_event = event;
	}
}

impl Default for TerminalView {
	fn default() -> Self {
		Self::new()
	}
}

impl ViewSurface for TerminalView {
	fn tab_count(&self) -> usize {
		self.tabs.len()
	}

	fn current_tab(&self) -> Option<usize> {
		(!self.tabs.is_empty()).then_some(self.current)
	}

	fn switch_tab(&mut self, index: usize) {
		if index < self.tabs.len() {
			self.current = index;
		}
	}

	fn close_tab(&mut self) {
		if self.tabs.is_empty() {
			return;
		}
		let closed = self.tabs.remove(self.current);
		self.current = self.current.min(self.tabs.len().saturating_sub(1));
		self.record(format!("closed {}", closed.uri));
	}

	fn current_uri(&self) -> Option<String> {
		self.current().map(|tab| tab.uri.clone())
	}

	/// Windows are tabs here.
	fn open(&mut self, uri: &str, target: OpenTarget) {
		info!("open {} ({:?})", uri, target);
		match target {
			OpenTarget::Current if !self.tabs.is_empty() => {
				let current = self.current;
				self.tabs[current].navigate(uri);
			}
			_ => {
				let index = if self.tabs.is_empty() { 0 } else { self.current + 1 };
				self.tabs.insert(index, Tab::new(uri));
				self.current = index;
			}
		}
		self.record(format!("loading {uri}"));
	}

	fn navigate_history(&mut self, direction: HistoryDirection) {
		let Some(tab) = self.current_mut() else {
			return;
		};
		let (from, to) = match direction {
			HistoryDirection::Back => (&mut tab.back, &mut tab.forward),
			HistoryDirection::Forward => (&mut tab.forward, &mut tab.back),
		};
		let Some(uri) = from.pop() else {
			return;
		};
		to.push(std::mem::replace(&mut tab.uri, uri));
		tab.loading = true;
		let uri = tab.uri.clone();
		self.record(format!("loading {uri}"));
	}

	fn reload(&mut self, bypass_cache: bool) {
		let Some(tab) = self.current_mut() else {
			return;
		};
		tab.loading = true;
		let uri = tab.uri.clone();
		let how = if bypass_cache { "reloading (no cache)" } else { "reloading" };
		self.record(format!("{how} {uri}"));
	}

	fn reload_all(&mut self) {
		for tab in &mut self.tabs {
			tab.loading = true;
		}
		self.record(format!("reloading {} tabs", self.tabs.len()));
	}

	fn stop_loading(&mut self) {
		if let Some(tab) = self.current_mut() {
			tab.loading = false;
			self.record("stopped".to_string());
		}
	}

	fn viewport(&self, axis: Axis) -> Option<Viewport> {
		let tab = self.current()?;
		Some(match axis {
			Axis::Horizontal => Viewport { value: tab.scroll_x, page_size: self.page_width, upper: self.page_width },
			Axis::Vertical => Viewport {
				value:     tab.scroll_y,
				page_size: self.page_height,
				upper:     DOCUMENT_HEIGHT * tab.zoom,
			},
		})
	}

	fn set_scroll(&mut self, axis: Axis, value: f64) {
		if let Some(tab) = self.current_mut() {
			match axis {
				Axis::Horizontal => tab.scroll_x = value,
				Axis::Vertical => tab.scroll_y = value,
			}
		}
	}

	fn zoom_level(&self) -> Option<f64> {
		self.current().map(|tab| tab.zoom)
	}

	fn set_zoom_level(&mut self, level: f64) {
		if let Some(tab) = self.current_mut() {
			tab.zoom = level.max(0.1);
		}
	}

	fn search(&mut self, query: &str, direction: SearchDirection) {
		self.last_search = Some((query.to_string(), direction));
		self.record(format!("search {direction:?} for '{query}'"));
	}

	fn follow_link(&mut self, step: FollowStep) {
		match step {
			FollowStep::Start { new_tab } => {
				self.hint = Some(Hint { new_tab, typed: String::new() });
			}
			FollowStep::Backspace => {
				if let Some(hint) = &mut self.hint {
					hint.typed.pop();
				}
			}
			FollowStep::Confirm => {
				if let Some(hint) = self.hint.take() {
					self.record(format!("followed hint '{}'", hint.typed));
				}
			}
			FollowStep::Cancel => self.hint = None,
		}
	}

	fn toggle_source_view(&mut self) {
		if let Some(tab) = self.current_mut() {
			tab.source_view = !tab.source_view;
		}
	}

	fn run_script(&mut self, source: &str) -> Result<(), SurfaceError> {
		if self.tabs.is_empty() {
			return Err(SurfaceError::NoDocument);
		}
		self.record(format!("ran {} bytes of script", source.len()));
		Ok(())
	}

	/// Writes the tab's URI, the only content this view has.
	fn save_as(&mut self, path: &Path) -> Result<(), SurfaceError> {
		let uri = self.current_uri().ok_or(SurfaceError::NoDocument)?;
		if let Some(parent) = path.parent()
			&& !parent.as_os_str().is_empty()
		{
			std::fs::create_dir_all(parent).map_err(|source| SurfaceError::Io { source })?;
		}
		std::fs::write(path, format!("{uri}\n")).map_err(|source| SurfaceError::Io { source })?;
		self.record(format!("saved {}", path.display()));
		Ok(())
	}

	fn clipboard_text(&mut self) -> Option<String> {
		if let Some(clipboard) = &mut self.clipboard {
			match clipboard.get_text() {
				Ok(text) => return Some(text),
				Err(err) => debug!("system clipboard read failed: {}", err),
			}
		}
		self.local_clip.clone()
	}

	fn set_clipboard_text(&mut self, text: &str) {
		self.local_clip = Some(text.to_string());
		if let Some(clipboard) = &mut self.clipboard
			&& let Err(err) = clipboard.set_text(text.to_string())
		{
			warn!("system clipboard write failed: {}", err);
		}
	}

	fn set_proxy(&mut self, proxy: Option<&str>) {
		self.proxy = proxy.map(str::to_string);
	}

	fn apply_setting(&mut self, property: &str, value: &SettingValue) {
		match self.properties.iter_mut().find(|(name, _)| name == property) {
			Some((_, existing)) => *existing = value.clone(),
			None => self.properties.push((property.to_string(), value.clone())),
		}
	}

	fn forward_key(&mut self, key: KeyChord) {
		if let Some(hint) = &mut self.hint
			&& let Some(ch) = key.code.to_char()
			&& key.code != KeyCode::SPACE
		{
			hint.typed.push(ch);
		}
		self.last_key = Some(key);
	}
}
