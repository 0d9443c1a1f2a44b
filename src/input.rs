use crossterm::event::{Event, KeyCode as TermKey, KeyEvent, KeyEventKind, KeyModifiers};

use crate::key::{KeyChord, KeyCode, Modifiers};

/// What the input pump hands the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
	Key(KeyChord),
	Resized { width: u16, height: u16 },
}

pub struct InputHandler;

impl InputHandler {
	pub fn new() -> Self {
		Self
	}

	pub fn event(&self, event: &Event) -> Option<HostEvent> {
		match event {
			Event::Resize(width, height) => Some(HostEvent::Resized { width: *width, height: *height }),
			Event::Key(key) => key_chord(key).map(HostEvent::Key),
			_ => None,
		}
	}
}

impl Default for InputHandler {
	fn default() -> Self {
		Self::new()
	}
}

/// Translates a terminal key press. Releases and keys with no counterpart in
/// the key domain yield `None`.
pub fn key_chord(key: &KeyEvent) -> Option<KeyChord> {
	if key.kind == KeyEventKind::Release {
		return None;
	}

	let mut modifiers = Modifiers::empty();
	if key.modifiers.contains(KeyModifiers::SHIFT) {
		modifiers |= Modifiers::SHIFT;
	}
	if key.modifiers.contains(KeyModifiers::CONTROL) {
		modifiers |= Modifiers::CONTROL;
	}
	if key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::META) {
		modifiers |= Modifiers::ALT;
	}
	if key.modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::HYPER) {
		modifiers |= Modifiers::SUPER;
	}

	let code = match key.code {
		TermKey::Char(ch) => {
			// Ctrl+letter arrives lowercase on most terminals, but not all.
			let ch = if modifiers.contains(Modifiers::CONTROL) { ch.to_ascii_lowercase() } else { ch };
			KeyCode::from_char(ch)
		}
		TermKey::Backspace => KeyCode::BACKSPACE,
		TermKey::Enter => KeyCode::RETURN,
		TermKey::Esc => KeyCode::ESCAPE,
		TermKey::Tab => KeyCode::TAB,
		TermKey::BackTab => {
			modifiers |= Modifiers::SHIFT;
			KeyCode::ISO_LEFT_TAB
		}
		TermKey::Left => KeyCode::LEFT,
		TermKey::Right => KeyCode::RIGHT,
		TermKey::Up => KeyCode::UP,
		TermKey::Down => KeyCode::DOWN,
		TermKey::Home => KeyCode::HOME,
		TermKey::End => KeyCode::END,
		TermKey::PageUp => KeyCode::PAGE_UP,
		TermKey::PageDown => KeyCode::PAGE_DOWN,
		TermKey::Insert => KeyCode::INSERT,
		TermKey::Delete => KeyCode::DELETE,
		TermKey::CapsLock => KeyCode::CAPS_LOCK,
		TermKey::F(n) => KeyCode::function(n)?,
		_ => return None,
	};
	Some(KeyChord::new(modifiers, code))
}
