//! Narrow contracts between the engine and the application around it.
//!
//! The engine never renders, fetches or stores anything itself. It drives a
//! [`ViewSurface`] (tabs, navigation, scrolling, zoom), reports through a
//! [`DisplaySink`] and flushes state through a [`PersistenceSink`]. Operations
//! on a surface without an open tab are expected to be harmless no-ops.

use std::path::Path;

use thiserror::Error;

use crate::completion::CompletionView;
use crate::key::KeyChord;
use crate::persistence::PersistenceError;
use crate::settings::SettingValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenTarget {
	Current,
	NewTab,
	NewWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
	Back,
	Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
	Horizontal,
	Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchDirection {
	Forward,
	Backward,
}

impl SearchDirection {
	pub fn reversed(self) -> Self {
		match self {
			SearchDirection::Forward => SearchDirection::Backward,
			SearchDirection::Backward => SearchDirection::Forward,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowStep {
	Start { new_tab: bool },
	Confirm,
	Backspace,
	Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
	Default,
	Warning,
	Error,
}

/// Scroll position along one axis, in surface units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
	pub value:     f64,
	pub page_size: f64,
	pub upper:     f64,
}

impl Viewport {
	pub fn max(&self) -> f64 {
		(self.upper - self.page_size).max(0.0)
	}

	pub fn clamp(&self, value: f64) -> f64 {
		value.clamp(0.0, self.max())
	}
}

#[derive(Debug, Error)]
pub enum SurfaceError {
	#[error("no document is open")]
	NoDocument,
	#[error("{0}")]
	Rejected(String),
	#[error("surface io failed")]
	Io {
		#[source]
		source: std::io::Error,
	},
}

pub trait ViewSurface {
	fn tab_count(&self) -> usize;
	fn current_tab(&self) -> Option<usize>;
	fn switch_tab(&mut self, index: usize);
	fn close_tab(&mut self);

	fn current_uri(&self) -> Option<String>;
	fn open(&mut self, uri: &str, target: OpenTarget);
	fn navigate_history(&mut self, direction: HistoryDirection);
	fn reload(&mut self, bypass_cache: bool);
	fn reload_all(&mut self);
	fn stop_loading(&mut self);

	fn viewport(&self, axis: Axis) -> Option<Viewport>;
	fn set_scroll(&mut self, axis: Axis, value: f64);
	fn zoom_level(&self) -> Option<f64>;
	fn set_zoom_level(&mut self, level: f64);

	fn search(&mut self, query: &str, direction: SearchDirection);
	fn follow_link(&mut self, step: FollowStep);
	fn toggle_source_view(&mut self);
	fn run_script(&mut self, source: &str) -> Result<(), SurfaceError>;
	fn save_as(&mut self, path: &Path) -> Result<(), SurfaceError>;

	fn clipboard_text(&mut self) -> Option<String>;
	fn set_clipboard_text(&mut self, text: &str);
	fn set_proxy(&mut self, proxy: Option<&str>);
	/// Forwarded option change, keyed by the surface's own property name.
	fn apply_setting(&mut self, property: &str, value: &SettingValue);
	/// A key no binding claimed while the mode hands input to the page.
	fn forward_key(&mut self, key: KeyChord);
}

pub trait DisplaySink {
	fn notify(&mut self, level: NotifyLevel, message: &str);
	fn show_mode(&mut self, label: &str);
	fn show_buffer(&mut self, buffer: &str);
	fn show_completion(&mut self, view: &CompletionView);
	fn hide_completion(&mut self);
	fn set_statusbar_visible(&mut self, visible: bool);
	fn set_tabbar_visible(&mut self, visible: bool);
}

pub trait PersistenceSink {
	fn save_history(&mut self, entries: &[String]) -> Result<(), PersistenceError>;
	fn save_bookmarks(&mut self, entries: &[String]) -> Result<(), PersistenceError>;
}

/// The three collaborators handed to every engine entry point.
pub struct Ports<'a> {
	pub view:        &'a mut dyn ViewSurface,
	pub display:     &'a mut dyn DisplaySink,
	pub persistence: &'a mut dyn PersistenceSink,
}

impl<'a> Ports<'a> {
	pub fn new(
		view: &'a mut dyn ViewSurface,
		display: &'a mut dyn DisplaySink,
		persistence: &'a mut dyn PersistenceSink,
	) -> Self {
		Self { view, display, persistence }
	}

	pub fn has_view(&self) -> bool {
		self.view.current_tab().is_some()
	}
}
