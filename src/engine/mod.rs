//! The modal input and dispatch engine.
//!
//! One [`Engine`] owns every piece of interpreter state: the mode, the pending
//! buffer, the binding table, the line commands, completion, history and the
//! inputbar. Hosts feed it key chords and hand it the [`Ports`] it should act
//! on; it never fails across that boundary. Problems surface as notifications.

use std::ops::ControlFlow;

use tracing::{debug, trace};

use crate::command::{CommandTable, Completer};
use crate::completion::{ArgumentSource, CompletionEngine, CompletionModel, Element, Group};
use crate::history::CommandHistory;
use crate::inputbar::Inputbar;
use crate::key::{KeyChord, Modifiers};
use crate::mode::{Mode, ModeState};
use crate::ports::{OpenTarget, Ports, SearchDirection};
use crate::sequence::{BufferMatcher, SequenceError};
use crate::settings::Settings;
use crate::shortcut::ShortcutRegistry;
use crate::uri::SearchEngines;

mod actions;
mod commands;
mod inputbar_keys;
#[cfg(test)]
mod tests;

pub use commands::CommandError;

/// What became of a key given to [`Engine::handle_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
	/// A binding, buffer sequence or the inputbar consumed it.
	Handled,
	/// Passed on to the view surface.
	Forwarded,
	Ignored,
}

pub struct Engine {
	mode:           ModeState,
	buffer:         String,
	shortcuts:      ShortcutRegistry,
	matcher:        BufferMatcher,
	commands:       CommandTable,
	completion:     CompletionEngine,
	history:        CommandHistory,
	inputbar:       Inputbar,
	settings:       Settings,
	search_engines: SearchEngines,
	bookmarks:      Vec<String>,
	last_search:    Option<(String, SearchDirection)>,
	proxy_enabled:  bool,
}

impl Engine {
	pub fn new() -> Result<Self, SequenceError> {
		Ok(Self {
			mode:           ModeState::new(),
			buffer:         String::new(),
			shortcuts:      ShortcutRegistry::with_defaults(),
			matcher:        BufferMatcher::with_defaults()?,
			commands:       CommandTable::with_defaults(),
			completion:     CompletionEngine::new(),
			history:        CommandHistory::new(),
			inputbar:       Inputbar::new(),
			settings:       Settings::new(),
			search_engines: SearchEngines::new(),
			bookmarks:      Vec::new(),
			last_search:    None,
			proxy_enabled:  false,
		})
	}

	/// Seeds history and bookmarks saved by an earlier session.
	pub fn restore(&mut self, history: Vec<String>, bookmarks: Vec<String>) {
		debug!("restored {} history entries and {} bookmarks", history.len(), bookmarks.len());
		self.history = CommandHistory::from_entries(history);
		self.bookmarks = bookmarks;
	}

	/// Pushes the initial option values to the collaborators and opens `uris`,
	/// or the home page when there are none.
	pub fn start(&mut self, ports: &mut Ports<'_>, uris: &[String]) {
		for (property, value) in self.settings.view_properties() {
			ports.view.apply_setting(property, value);
		}
		ports.display.set_statusbar_visible(self.settings.bool("statusbar"));
		ports.display.set_tabbar_visible(self.settings.bool("tabbar"));
		ports.display.show_mode(self.mode.current().label());

		if uris.is_empty() {
			let home = self.settings.string("homepage").to_string();
			ports.view.open(&home, OpenTarget::Current);
			return;
		}
		for (index, text) in uris.iter().enumerate() {
			let target = if index == 0 { OpenTarget::Current } else { OpenTarget::NewTab };
			self.open_resolved(ports, text, target);
		}
	}

	pub fn mode(&self) -> Mode {
		self.mode.current()
	}

	pub fn buffer(&self) -> &str {
		&self.buffer
	}

	pub fn inputbar(&self) -> &Inputbar {
		&self.inputbar
	}

	pub fn history(&self) -> &CommandHistory {
		&self.history
	}

	pub fn bookmarks(&self) -> &[String] {
		&self.bookmarks
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	pub fn shortcuts(&self) -> &ShortcutRegistry {
		&self.shortcuts
	}

	pub fn commands(&self) -> &CommandTable {
		&self.commands
	}

	pub fn completion(&self) -> &CompletionEngine {
		&self.completion
	}

	pub fn search_engines(&self) -> &SearchEngines {
		&self.search_engines
	}

	pub fn last_search(&self) -> Option<(&str, SearchDirection)> {
		self.last_search.as_ref().map(|(query, direction)| (query.as_str(), *direction))
	}

	pub fn proxy_enabled(&self) -> bool {
		self.proxy_enabled
	}

	/// Routes one key press. `Break` means the session should end.
	///
	/// With the inputbar focused the key goes to the inputbar. Otherwise the
	/// binding table is consulted first, then marker and forwarding modes
	/// get their say, and finally visible characters extend the pending
	/// buffer, which fires the first buffer sequence it matches.
	pub fn handle_key(&mut self, ports: &mut Ports<'_>, key: KeyChord) -> ControlFlow<(), KeyOutcome> {
		if self.inputbar.is_focused() {
			return self.handle_inputbar_key(ports, key);
		}

		let mode = self.mode.current();
		let bound = self
			.shortcuts
			.lookup(key, mode, !self.buffer.is_empty())
			.map(|binding| (binding.action, binding.argument.clone()));
		if let Some((action, argument)) = bound {
			trace!("key {} bound to {}", key, action.name());
			self.apply(ports, action, &argument, None)?;
			return ControlFlow::Continue(KeyOutcome::Handled);
		}

		if mode.is_marker() {
			debug!("marker key {} ignored", key);
			self.set_mode(ports, Mode::Normal);
			return ControlFlow::Continue(KeyOutcome::Handled);
		}

		if mode.forwards_unclaimed_keys() {
			ports.view.forward_key(key);
			if mode == Mode::PassThroughNext {
				self.set_mode(ports, Mode::Normal);
			}
			return ControlFlow::Continue(KeyOutcome::Forwarded);
		}

		if !key.code.is_printable() || key.modifiers.clean().intersects(Modifiers::CONTROL | Modifiers::ALT) {
			return ControlFlow::Continue(KeyOutcome::Ignored);
		}
		let Some(ch) = key.code.to_char() else {
			return ControlFlow::Continue(KeyOutcome::Ignored);
		};
		self.buffer.push(ch);
		ports.display.show_buffer(&self.buffer);

		let matched = self.matcher.find(&self.buffer).map(|command| (command.action, command.argument.clone()));
		if let Some((action, argument)) = matched {
			let buffer = std::mem::take(&mut self.buffer);
			ports.display.show_buffer("");
			debug!("buffer '{}' fires {}", buffer, action.name());
			self.apply(ports, action, &argument, Some(&buffer))?;
		}
		ControlFlow::Continue(KeyOutcome::Handled)
	}

	fn set_mode(&mut self, ports: &mut Ports<'_>, mode: Mode) {
		let label = self.mode.set_mode(mode);
		ports.display.show_mode(label);
	}

	fn clear_buffer(&mut self, ports: &mut Ports<'_>) {
		if !self.buffer.is_empty() {
			self.buffer.clear();
			ports.display.show_buffer("");
		}
	}
}

/// Argument candidates drawn from the engine's own tables.
struct Candidates<'a> {
	search_engines: &'a SearchEngines,
	bookmarks:      &'a [String],
	settings:       &'a Settings,
}

impl ArgumentSource for Candidates<'_> {
	fn complete(&self, completer: Completer, input: &str) -> CompletionModel {
		match completer {
			Completer::Open => {
				let mut engines = Group::new(Some("Search engines"));
				for engine in self.search_engines.entries() {
					engines.push(Element::new(engine.name.as_str(), Some(engine.template.clone())));
				}
				let mut bookmarks = Group::new(Some("Bookmarks"));
				for bookmark in self.bookmarks {
					bookmarks.push(Element::new(bookmark.as_str(), None));
				}
				let mut model = CompletionModel::default();
				model.push_group(engines);
				model.push_group(bookmarks);
				model
			}
			Completer::Set => self.settings.completion(input),
		}
	}
}
