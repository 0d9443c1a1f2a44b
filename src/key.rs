//! Platform-neutral key domain.
//!
//! Key codes follow the X11 keysym numbering: printable ASCII keys carry their
//! character value, named keys live in the `0xff00` page and any other Unicode
//! character is encoded as `0x0100_0000 + codepoint`. Frontends translate their
//! own key events into this domain before handing them to the engine.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

bitflags! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
	#[serde(transparent)]
	pub struct Modifiers: u16 {
		const SHIFT     = 1 << 0;
		const CAPS_LOCK = 1 << 1;
		const CONTROL   = 1 << 2;
		const ALT       = 1 << 3;
		const NUM_LOCK  = 1 << 4;
		const SUPER     = 1 << 6;
		const BUTTON1   = 1 << 8;
		const BUTTON2   = 1 << 9;
		const BUTTON3   = 1 << 10;
		const BUTTON4   = 1 << 11;
		const BUTTON5   = 1 << 12;
	}
}

impl Modifiers {
	const IGNORED: Modifiers = Modifiers::NUM_LOCK
		.union(Modifiers::BUTTON1)
		.union(Modifiers::BUTTON2)
		.union(Modifiers::BUTTON3)
		.union(Modifiers::BUTTON4)
		.union(Modifiers::BUTTON5);

	/// Strips mouse buttons and num lock, which never take part in a binding.
	pub fn clean(self) -> Self {
		self.difference(Self::IGNORED)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u32);

impl KeyCode {
	pub const SPACE: KeyCode = KeyCode(0x0020);
	pub const ISO_LEFT_TAB: KeyCode = KeyCode(0xfe20);
	pub const BACKSPACE: KeyCode = KeyCode(0xff08);
	pub const TAB: KeyCode = KeyCode(0xff09);
	pub const RETURN: KeyCode = KeyCode(0xff0d);
	pub const ESCAPE: KeyCode = KeyCode(0xff1b);
	pub const HOME: KeyCode = KeyCode(0xff50);
	pub const LEFT: KeyCode = KeyCode(0xff51);
	pub const UP: KeyCode = KeyCode(0xff52);
	pub const RIGHT: KeyCode = KeyCode(0xff53);
	pub const DOWN: KeyCode = KeyCode(0xff54);
	pub const PAGE_UP: KeyCode = KeyCode(0xff55);
	pub const PAGE_DOWN: KeyCode = KeyCode(0xff56);
	pub const END: KeyCode = KeyCode(0xff57);
	pub const INSERT: KeyCode = KeyCode(0xff63);
	pub const CAPS_LOCK: KeyCode = KeyCode(0xffe5);
	pub const DELETE: KeyCode = KeyCode(0xffff);

	const F1: u32 = 0xffbe;
	const UNICODE_OFFSET: u32 = 0x0100_0000;

	/// `F1` through `F35`.
	pub const fn function(n: u8) -> Option<KeyCode> {
		if n >= 1 && n <= 35 { Some(KeyCode(Self::F1 + n as u32 - 1)) } else { None }
	}

	pub fn from_char(ch: char) -> Self {
		if (' '..='~').contains(&ch) {
			KeyCode(ch as u32)
		} else {
			KeyCode(Self::UNICODE_OFFSET + ch as u32)
		}
	}

	/// The character this key inserts into a text field, if any.
	pub fn to_char(self) -> Option<char> {
		match self.0 {
			0x20..=0x7e => char::from_u32(self.0),
			code if code > Self::UNICODE_OFFSET => char::from_u32(code - Self::UNICODE_OFFSET),
			_ => None,
		}
	}

	/// Keys that feed the pending buffer: visible ASCII, space excluded.
	pub fn is_printable(self) -> bool {
		(0x21..=0x7e).contains(&self.0)
	}
}

const SPECIAL_KEYS: &[(&str, KeyCode)] = &[
	("BackSpace", KeyCode::BACKSPACE),
	("CapsLock", KeyCode::CAPS_LOCK),
	("Down", KeyCode::DOWN),
	("Esc", KeyCode::ESCAPE),
	("F1", KeyCode(0xffbe)),
	("F2", KeyCode(0xffbf)),
	("F3", KeyCode(0xffc0)),
	("F4", KeyCode(0xffc1)),
	("F5", KeyCode(0xffc2)),
	("F6", KeyCode(0xffc3)),
	("F7", KeyCode(0xffc4)),
	("F8", KeyCode(0xffc5)),
	("F9", KeyCode(0xffc6)),
	("F10", KeyCode(0xffc7)),
	("F11", KeyCode(0xffc8)),
	("F12", KeyCode(0xffc9)),
	("Left", KeyCode::LEFT),
	("PageDown", KeyCode::PAGE_DOWN),
	("PageUp", KeyCode::PAGE_UP),
	("Return", KeyCode::RETURN),
	("Right", KeyCode::RIGHT),
	("Space", KeyCode::SPACE),
	("Tab", KeyCode::TAB),
	("Up", KeyCode::UP),
];

fn special_key(name: &str) -> Option<KeyCode> {
	SPECIAL_KEYS.iter().find(|(special, _)| *special == name).map(|(_, code)| *code)
}

fn special_name(code: KeyCode) -> Option<&'static str> {
	SPECIAL_KEYS.iter().find(|(_, special)| *special == code).map(|(name, _)| *name)
}

/// A key press as seen by the dispatcher: modifier mask plus key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
	pub modifiers: Modifiers,
	pub code:      KeyCode,
}

impl KeyChord {
	pub const fn new(modifiers: Modifiers, code: KeyCode) -> Self {
		Self { modifiers, code }
	}

	pub const fn plain(code: KeyCode) -> Self {
		Self { modifiers: Modifiers::empty(), code }
	}

	pub fn ch(ch: char) -> Self {
		Self::plain(KeyCode::from_char(ch))
	}

	pub fn ctrl(ch: char) -> Self {
		Self::new(Modifiers::CONTROL, KeyCode::from_char(ch))
	}

	pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
		self.modifiers |= modifiers;
		self
	}
}

impl fmt::Display for KeyChord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let modifiers = self.modifiers.clean();
		let prefix = if modifiers.contains(Modifiers::CONTROL) {
			Some('C')
		} else if modifiers.contains(Modifiers::SHIFT) && !self.code.is_printable() {
			Some('S')
		} else {
			None
		};

		match (prefix, special_name(self.code), self.code.to_char()) {
			(Some(modifier), Some(name), _) => write!(f, "<{modifier}-{name}>"),
			(Some(modifier), None, Some(ch)) => write!(f, "<{modifier}-{ch}>"),
			(None, Some(name), _) => write!(f, "<{name}>"),
			(None, None, Some(ch)) => write!(f, "{ch}"),
			(_, None, None) => write!(f, "<0x{:x}>", self.code.0),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeySpecError {
	#[error("no key binding given")]
	Empty,
	#[error("no valid modifier given: '{0}'")]
	InvalidModifier(char),
	#[error("no valid key binding given: {0}")]
	UnknownKey(String),
}

/// Parses the key notation used by `map`: a single character such as `g`, or
/// `<` [modifier `-`] (character | special key name) `>` such as `<C-w>`,
/// `<Space>` or `<S-Tab>`.
pub fn parse_key_spec(spec: &str) -> Result<KeyChord, KeySpecError> {
	let mut chars = spec.chars();
	match (chars.next(), chars.next()) {
		(None, _) => return Err(KeySpecError::Empty),
		(Some(ch), None) => return Ok(KeyChord::ch(ch)),
		_ => {}
	}

	let Some(inner) = spec.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) else {
		return Err(KeySpecError::UnknownKey(spec.to_string()));
	};

	let mut inner_chars = inner.chars();
	let (modifiers, key) = match (inner_chars.next(), inner_chars.next()) {
		(Some(modifier), Some('-')) if inner.len() > 2 => {
			let modifiers = match modifier {
				'S' => Modifiers::SHIFT,
				'C' => Modifiers::CONTROL,
				other => return Err(KeySpecError::InvalidModifier(other)),
			};
			(modifiers, &inner[2..])
		}
		_ => (Modifiers::empty(), inner),
	};

	let mut key_chars = key.chars();
	let code = match (key_chars.next(), key_chars.next()) {
		(Some(ch), None) => KeyCode::from_char(ch),
		_ => special_key(key).ok_or_else(|| KeySpecError::UnknownKey(spec.to_string()))?,
	};

	Ok(KeyChord::new(modifiers, code))
}
