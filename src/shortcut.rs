use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::action::{ActionKind, ActionLookup, ArgTag, Argument};
use crate::key::{KeyChord, KeyCode, KeySpecError, Modifiers, parse_key_spec};
use crate::mode::Mode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
	pub chord:    KeyChord,
	pub mode:     Mode,
	pub action:   ActionKind,
	pub argument: Argument,
}

impl Binding {
	pub fn new(chord: KeyChord, mode: Mode, action: ActionKind, argument: Argument) -> Self {
		Self { chord, mode, action, argument }
	}

	/// Clean-mask comparison. A printable key also matches with Shift held,
	/// since the shifted character is already part of the key code. A binding
	/// that asks for Shift still needs it.
	fn accepts(&self, key: KeyChord) -> bool {
		if key.code != self.chord.code {
			return false;
		}
		let modifiers = key.modifiers.clean();
		modifiers == self.chord.modifiers
			|| (self.chord.code.is_printable() && modifiers.difference(Modifiers::SHIFT) == self.chord.modifiers)
	}

	/// Plain printable bindings yield to a pending buffer sequence.
	fn yields_to_buffer(&self) -> bool {
		self.chord.code.is_printable() && !self.chord.modifiers.contains(Modifiers::CONTROL)
	}
}

#[derive(Debug, Error)]
pub enum MapError {
	#[error("map needs at least a key and an action")]
	MissingArguments,
	#[error("no such shortcut function exists: {name}")]
	UnknownAction { name: String },
	#[error("shortcut function is reserved: {name}")]
	ReservedAction { name: String },
	#[error("invalid key binding '{spec}'")]
	InvalidKey {
		spec:   String,
		#[source]
		source: KeySpecError,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebound {
	Updated,
	Appended,
}

/// Ordered binding table. Earlier entries win.
#[derive(Debug, Clone, Default)]
pub struct ShortcutRegistry {
	bindings: Vec<Binding>,
}

impl ShortcutRegistry {
	pub fn new(bindings: Vec<Binding>) -> Self {
		Self { bindings }
	}

	pub fn with_defaults() -> Self {
		Self::new(default_bindings())
	}

	pub fn bindings(&self) -> &[Binding] {
		&self.bindings
	}

	pub fn len(&self) -> usize {
		self.bindings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}

	/// First binding for `key` active in `mode`. While a buffer is pending,
	/// plain printable bindings are skipped so the key can extend the buffer.
	pub fn lookup(&self, key: KeyChord, mode: Mode, buffer_pending: bool) -> Option<&Binding> {
		self.bindings.iter().find(|binding| {
			binding.accepts(key)
				&& binding.mode.admits(mode)
				&& !(buffer_pending && binding.yields_to_buffer())
		})
	}

	/// Replaces the action of the entry with the same chord and mode, else appends.
	pub fn rebind(&mut self, binding: Binding) -> Rebound {
		if let Some(existing) = self
			.bindings
			.iter_mut()
			.find(|existing| existing.chord == binding.chord && existing.mode == binding.mode)
		{
			debug!("binding updated: {} {:?} -> {}", binding.chord, binding.mode, binding.action.name());
			existing.action = binding.action;
			existing.argument = binding.argument;
			return Rebound::Updated;
		}

		debug!("binding appended: {} {:?} -> {}", binding.chord, binding.mode, binding.action.name());
		self.bindings.push(binding);
		Rebound::Appended
	}

	/// `map <key-spec> <action> [argument] [mode]`. Nothing changes on error.
	pub fn map(&mut self, args: &[&str]) -> Result<Rebound, MapError> {
		let [key_spec, action_name, rest @ ..] = args else {
			return Err(MapError::MissingArguments);
		};
		let binding = parse_binding(key_spec, action_name, rest.first().copied(), rest.get(1).copied())?;
		Ok(self.rebind(binding))
	}
}

pub fn parse_binding(
	key_spec: &str,
	action_name: &str,
	argument_spec: Option<&str>,
	mode_spec: Option<&str>,
) -> Result<Binding, MapError> {
	let action = match ActionKind::lookup(action_name) {
		ActionLookup::Bound(action) => action,
		ActionLookup::Reserved => {
			return Err(MapError::ReservedAction { name: action_name.to_string() });
		}
		ActionLookup::Unknown => return Err(MapError::UnknownAction { name: action_name.to_string() }),
	};

	let chord = parse_key_spec(key_spec)
		.map_err(|source| MapError::InvalidKey { spec: key_spec.to_string(), source })?;

	let argument = argument_spec.map(Argument::parse).unwrap_or_default();

	let mode = match mode_spec {
		None => Mode::Normal,
		Some(name) => Mode::from_name(name).unwrap_or_else(|| {
			warn!("unknown mode name in map, using normal: {}", name);
			Mode::Normal
		}),
	};

	Ok(Binding::new(chord, mode, action, argument))
}

fn bind(modifiers: Modifiers, code: KeyCode, action: ActionKind, mode: Mode, argument: Argument) -> Binding {
	Binding::new(KeyChord::new(modifiers, code), mode, action, argument)
}

fn key(ch: char) -> KeyCode {
	KeyCode::from_char(ch)
}

pub fn default_bindings() -> Vec<Binding> {
	use ActionKind as A;
	use ArgTag as T;

	let none = Modifiers::empty();
	let ctrl = Modifiers::CONTROL;
	let shift = Modifiers::SHIFT;

	vec![
		bind(ctrl, key('c'), A::Abort, Mode::All, Argument::NONE),
		bind(none, KeyCode::ESCAPE, A::Abort, Mode::All, Argument::NONE),
		bind(none, KeyCode::RETURN, A::FollowLink, Mode::Follow, Argument::tag(T::Confirm)),
		bind(none, KeyCode::BACKSPACE, A::FollowLink, Mode::Follow, Argument::tag(T::DeleteLastChar)),
		bind(none, KeyCode::BACKSPACE, A::ChangeBuffer, Mode::All, Argument::tag(T::DeleteLastChar)),
		bind(none, key('m'), A::ChangeMode, Mode::Normal, Argument::mode(Mode::AddMarker)),
		bind(none, key('\''), A::ChangeMode, Mode::Normal, Argument::mode(Mode::EvalMarker)),
		bind(none, key('v'), A::ChangeMode, Mode::Normal, Argument::mode(Mode::Visual)),
		bind(ctrl, key('z'), A::ChangeMode, Mode::Normal, Argument::mode(Mode::PassThrough)),
		bind(ctrl, key('v'), A::ChangeMode, Mode::Normal, Argument::mode(Mode::PassThroughNext)),
		bind(ctrl, key('w'), A::CloseTab, Mode::Normal, Argument::NONE),
		bind(none, key('d'), A::CloseTab, Mode::Normal, Argument::NONE),
		bind(none, key('/'), A::FocusInputbar, Mode::Normal, Argument::text("/")),
		bind(shift, key('/'), A::FocusInputbar, Mode::Normal, Argument::text("/")),
		bind(none, key('?'), A::FocusInputbar, Mode::Normal, Argument::text("?")),
		bind(none, key(':'), A::FocusInputbar, Mode::Normal, Argument::text(":")),
		bind(none, key('o'), A::FocusInputbar, Mode::Normal, Argument::text(":open ")),
		bind(none, key('O'), A::FocusInputbar, Mode::Normal, Argument::text_with_uri(":open ")),
		bind(none, key('t'), A::FocusInputbar, Mode::Normal, Argument::text(":tabopen ")),
		bind(none, key('T'), A::FocusInputbar, Mode::Normal, Argument::text_with_uri(":tabopen ")),
		bind(none, key('w'), A::FocusInputbar, Mode::Normal, Argument::text(":winopen ")),
		bind(none, key('W'), A::FocusInputbar, Mode::Normal, Argument::text_with_uri(":winopen ")),
		bind(none, key('f'), A::FollowLink, Mode::Normal, Argument::NONE),
		bind(none, key('F'), A::FollowLink, Mode::Normal, Argument::tag(T::NewTab)),
		bind(ctrl, key('i'), A::NavHistory, Mode::Normal, Argument::tag(T::Next)),
		bind(ctrl, key('o'), A::NavHistory, Mode::Normal, Argument::tag(T::Previous)),
		bind(none, key('L'), A::NavHistory, Mode::Normal, Argument::tag(T::Next)),
		bind(none, key('H'), A::NavHistory, Mode::Normal, Argument::tag(T::Previous)),
		bind(none, key('K'), A::NavTabs, Mode::Normal, Argument::tag(T::Next)),
		bind(none, key('J'), A::NavTabs, Mode::Normal, Argument::tag(T::Previous)),
		bind(ctrl, KeyCode::TAB, A::NavTabs, Mode::Normal, Argument::tag(T::Next)),
		bind(ctrl | shift, KeyCode::ISO_LEFT_TAB, A::NavTabs, Mode::Normal, Argument::tag(T::Previous)),
		bind(none, key('p'), A::Paste, Mode::Normal, Argument::NONE),
		bind(none, key('P'), A::Paste, Mode::Normal, Argument::tag(T::NewTab)),
		bind(none, key('r'), A::Reload, Mode::Normal, Argument::NONE),
		bind(none, key('R'), A::Reload, Mode::Normal, Argument::tag(T::BypassCache)),
		bind(none, key('h'), A::Scroll, Mode::Normal, Argument::tag(T::Left)),
		bind(none, key('j'), A::Scroll, Mode::Normal, Argument::tag(T::Down)),
		bind(none, key('k'), A::Scroll, Mode::Normal, Argument::tag(T::Up)),
		bind(none, key('l'), A::Scroll, Mode::Normal, Argument::tag(T::Right)),
		bind(none, KeyCode::LEFT, A::Scroll, Mode::Normal, Argument::tag(T::Left)),
		bind(none, KeyCode::UP, A::Scroll, Mode::Normal, Argument::tag(T::Up)),
		bind(none, KeyCode::DOWN, A::Scroll, Mode::Normal, Argument::tag(T::Down)),
		bind(none, KeyCode::RIGHT, A::Scroll, Mode::Normal, Argument::tag(T::Right)),
		bind(ctrl, key('d'), A::Scroll, Mode::Normal, Argument::tag(T::HalfDown)),
		bind(ctrl, key('u'), A::Scroll, Mode::Normal, Argument::tag(T::HalfUp)),
		bind(ctrl, key('f'), A::Scroll, Mode::Normal, Argument::tag(T::FullDown)),
		bind(ctrl, key('b'), A::Scroll, Mode::Normal, Argument::tag(T::FullUp)),
		bind(none, KeyCode::SPACE, A::Scroll, Mode::Normal, Argument::tag(T::FullDown)),
		bind(shift, KeyCode::SPACE, A::Scroll, Mode::Normal, Argument::tag(T::FullUp)),
		bind(none, key('n'), A::Search, Mode::Normal, Argument::tag(T::Forward)),
		bind(none, key('N'), A::Search, Mode::Normal, Argument::tag(T::Backward)),
		bind(ctrl, key('p'), A::Proxy, Mode::Normal, Argument::NONE),
		bind(ctrl, key('m'), A::ToggleStatusbar, Mode::Normal, Argument::NONE),
		bind(ctrl, key('n'), A::ToggleTabbar, Mode::Normal, Argument::NONE),
		bind(ctrl, key('s'), A::ToggleSourcecode, Mode::Normal, Argument::NONE),
		bind(ctrl, key('q'), A::Quit, Mode::All, Argument::NONE),
		bind(none, key('y'), A::Yank, Mode::Normal, Argument::NONE),
		bind(none, key('+'), A::Zoom, Mode::Normal, Argument::tag(T::ZoomIn)),
		bind(none, key('-'), A::Zoom, Mode::Normal, Argument::tag(T::ZoomOut)),
	]
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::{MapError, Rebound, ShortcutRegistry};
	use crate::action::{ActionKind, ArgTag, ArgValue, Argument};
	use crate::key::{KeyChord, KeyCode, Modifiers};
	use crate::mode::Mode;

	#[test]
	fn lookup_should_respect_mode_and_wildcard() {
		let registry = ShortcutRegistry::with_defaults();
		let j = registry.lookup(KeyChord::ch('j'), Mode::Normal, false).map(|b| b.action);
		assert_eq!(j, Some(ActionKind::Scroll));
		assert!(registry.lookup(KeyChord::ch('j'), Mode::Visual, false).is_none());

		let escape = registry.lookup(KeyChord::plain(KeyCode::ESCAPE), Mode::Insert, false);
		assert_eq!(escape.map(|b| b.action), Some(ActionKind::Abort));
	}

	#[test]
	fn lookup_should_skip_plain_printable_bindings_while_buffer_is_pending() {
		let registry = ShortcutRegistry::with_defaults();
		assert!(registry.lookup(KeyChord::ch('j'), Mode::Normal, true).is_none());

		let ctrl_d = registry.lookup(KeyChord::ctrl('d'), Mode::Normal, true);
		assert_eq!(ctrl_d.map(|b| b.argument.clone()), Some(Argument::tag(ArgTag::HalfDown)));

		let escape = registry.lookup(KeyChord::plain(KeyCode::ESCAPE), Mode::Normal, true);
		assert_eq!(escape.map(|b| b.action), Some(ActionKind::Abort));
	}

	#[test]
	fn lookup_should_accept_shift_for_printable_keys_and_ignore_lock_state() {
		let registry = ShortcutRegistry::with_defaults();
		let shifted = KeyChord::new(Modifiers::SHIFT, KeyCode::from_char('O'));
		let binding = registry.lookup(shifted, Mode::Normal, false).map(|b| b.argument.clone());
		assert_eq!(binding, Some(Argument::text_with_uri(":open ")));

		let with_lock = KeyChord::ctrl('w').with_modifiers(Modifiers::NUM_LOCK | Modifiers::BUTTON1);
		let binding = registry.lookup(with_lock, Mode::Normal, false).map(|b| b.action);
		assert_eq!(binding, Some(ActionKind::CloseTab));
	}

	#[test]
	fn shift_binding_should_not_fire_on_unshifted_key() {
		let mut registry = ShortcutRegistry::with_defaults();
		assert_eq!(registry.map(&["<S-g>", "quit"]).expect("map"), Rebound::Appended);

		assert!(registry.lookup(KeyChord::ch('g'), Mode::Normal, false).is_none());
		let shifted = KeyChord::new(Modifiers::SHIFT, KeyCode::from_char('g'));
		assert_eq!(registry.lookup(shifted, Mode::Normal, false).map(|b| b.action), Some(ActionKind::Quit));

		let question = registry.lookup(KeyChord::ch('?'), Mode::Normal, false).map(|b| b.argument.clone());
		assert_eq!(question, Some(Argument::text("?")));
		let shifted = KeyChord::new(Modifiers::SHIFT, KeyCode::from_char('?'));
		assert!(registry.lookup(shifted, Mode::Normal, false).is_some());
	}

	#[test]
	fn map_should_update_existing_binding_in_place() {
		let mut registry = ShortcutRegistry::with_defaults();
		let size = registry.len();

		let outcome = registry.map(&["j", "scroll", "half_down"]).expect("map should succeed");
		assert_eq!(outcome, Rebound::Updated);
		assert_eq!(registry.len(), size);
		let binding = registry.lookup(KeyChord::ch('j'), Mode::Normal, false).expect("binding");
		assert_eq!(binding.argument, Argument::tag(ArgTag::HalfDown));
	}

	#[test]
	fn map_should_update_the_last_entry_too() {
		let mut registry = ShortcutRegistry::with_defaults();
		let size = registry.len();
		assert_eq!(registry.map(&["-", "zoom", "in"]).expect("map"), Rebound::Updated);
		assert_eq!(registry.len(), size);
	}

	#[test]
	fn map_should_append_new_binding_with_text_payload_and_mode() {
		let mut registry = ShortcutRegistry::with_defaults();
		let size = registry.len();

		let outcome = registry.map(&["<C-g>", "focus_inputbar", ":set", "insert"]).expect("map");
		assert_eq!(outcome, Rebound::Appended);
		assert_eq!(registry.len(), size + 1);

		let binding = registry.lookup(KeyChord::ctrl('g'), Mode::Insert, false).expect("binding");
		assert_eq!(binding.action, ActionKind::FocusInputbar);
		assert_eq!(binding.argument.value, ArgValue::Text(":set".to_string()));
		assert!(registry.lookup(KeyChord::ctrl('g'), Mode::Normal, false).is_none());
	}

	#[test]
	fn map_should_reject_bad_input_without_mutation() {
		let mut registry = ShortcutRegistry::with_defaults();
		let before = registry.bindings().to_vec();

		assert!(matches!(registry.map(&["g"]), Err(MapError::MissingArguments)));
		assert!(matches!(registry.map(&["g", "teleport"]), Err(MapError::UnknownAction { .. })));
		assert!(matches!(registry.map(&["g", "goto"]), Err(MapError::ReservedAction { .. })));
		assert!(matches!(registry.map(&["<X-g>", "abort"]), Err(MapError::InvalidKey { .. })));
		assert!(matches!(registry.map(&["<Nope>", "abort"]), Err(MapError::InvalidKey { .. })));

		assert_eq!(registry.bindings(), before.as_slice());
	}

	#[test]
	fn map_with_unknown_mode_should_default_to_normal() {
		let mut registry = ShortcutRegistry::with_defaults();
		registry.map(&["g", "abort", "nothing", "sideways"]).expect("map");
		let binding = registry.lookup(KeyChord::ch('g'), Mode::Normal, false).expect("binding");
		assert_eq!(binding.action, ActionKind::Abort);
	}
}
