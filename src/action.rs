use serde::{Deserialize, Serialize};

use crate::mode::Mode;

/// Every operation a binding or buffer sequence can trigger. Applied by
/// [`crate::engine::Engine`] through a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
	Abort,
	ChangeBuffer,
	ChangeMode,
	CloseTab,
	FocusInputbar,
	FollowLink,
	NavHistory,
	NavTabs,
	Paste,
	Proxy,
	Reload,
	Script,
	Scroll,
	Search,
	ToggleStatusbar,
	ToggleTabbar,
	ToggleSourcecode,
	Quit,
	Yank,
	Zoom,
	GoHome,
	GoParent,
}

/// Names accepted by `map`. `goto` is reserved and has no action behind it.
const ACTION_NAMES: &[(&str, Option<ActionKind>)] = &[
	("abort", Some(ActionKind::Abort)),
	("change_buffer", Some(ActionKind::ChangeBuffer)),
	("change_mode", Some(ActionKind::ChangeMode)),
	("close_tab", Some(ActionKind::CloseTab)),
	("focus_inputbar", Some(ActionKind::FocusInputbar)),
	("follow_link", Some(ActionKind::FollowLink)),
	("goto", None),
	("nav_history", Some(ActionKind::NavHistory)),
	("nav_tabs", Some(ActionKind::NavTabs)),
	("paste", Some(ActionKind::Paste)),
	("proxy", Some(ActionKind::Proxy)),
	("reload", Some(ActionKind::Reload)),
	("script", Some(ActionKind::Script)),
	("scroll", Some(ActionKind::Scroll)),
	("search", Some(ActionKind::Search)),
	("toggle_statusbar", Some(ActionKind::ToggleStatusbar)),
	("toggle_sourcecode", Some(ActionKind::ToggleSourcecode)),
	("quit", Some(ActionKind::Quit)),
	("yank", Some(ActionKind::Yank)),
	("zoom", Some(ActionKind::Zoom)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionLookup {
	Bound(ActionKind),
	Reserved,
	Unknown,
}

impl ActionKind {
	pub fn lookup(name: &str) -> ActionLookup {
		match ACTION_NAMES.iter().find(|(action_name, _)| *action_name == name) {
			Some((_, Some(kind))) => ActionLookup::Bound(*kind),
			Some((_, None)) => ActionLookup::Reserved,
			None => ActionLookup::Unknown,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			ActionKind::ToggleTabbar => "toggle_tabbar",
			ActionKind::GoHome => "go_home",
			ActionKind::GoParent => "go_parent",
			kind => ACTION_NAMES
				.iter()
				.find(|(_, action)| *action == Some(kind))
				.map(|(name, _)| *name)
				.unwrap_or("unnamed"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgTag {
	AppendUrl,
	Backward,
	Bottom,
	BypassCache,
	Down,
	Forward,
	FullDown,
	FullUp,
	HalfDown,
	HalfUp,
	ZoomIn,
	Left,
	NewTab,
	Next,
	ZoomOriginal,
	ZoomOut,
	Previous,
	Right,
	Top,
	Up,
	DeleteLastChar,
	Specific,
	Confirm,
}

const ARGUMENT_NAMES: &[(&str, ArgTag)] = &[
	("append_url", ArgTag::AppendUrl),
	("backward", ArgTag::Backward),
	("bottom", ArgTag::Bottom),
	("bypass_cache", ArgTag::BypassCache),
	("down", ArgTag::Down),
	("forward", ArgTag::Forward),
	("full_down", ArgTag::FullDown),
	("full_up", ArgTag::FullUp),
	("half_down", ArgTag::HalfDown),
	("half_up", ArgTag::HalfUp),
	("in", ArgTag::ZoomIn),
	("left", ArgTag::Left),
	("new_tab", ArgTag::NewTab),
	("next", ArgTag::Next),
	("original", ArgTag::ZoomOriginal),
	("out", ArgTag::ZoomOut),
	("previous", ArgTag::Previous),
	("right", ArgTag::Right),
	("top", ArgTag::Top),
	("up", ArgTag::Up),
];

impl ArgTag {
	pub fn from_name(name: &str) -> Option<ArgTag> {
		ARGUMENT_NAMES.iter().find(|(tag_name, _)| *tag_name == name).map(|(_, tag)| *tag)
	}

	/// Numeric value used when an argument name is given to an integer option.
	pub fn code(self) -> Option<i64> {
		ARGUMENT_NAMES.iter().position(|(_, tag)| *tag == self).map(|idx| idx as i64)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgValue {
	#[default]
	None,
	Tag(ArgTag),
	Mode(Mode),
	Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Argument {
	pub value:      ArgValue,
	#[serde(default)]
	pub append_uri: bool,
}

impl Argument {
	pub const NONE: Argument = Argument { value: ArgValue::None, append_uri: false };

	pub const fn tag(tag: ArgTag) -> Self {
		Self { value: ArgValue::Tag(tag), append_uri: false }
	}

	pub const fn mode(mode: Mode) -> Self {
		Self { value: ArgValue::Mode(mode), append_uri: false }
	}

	pub fn text(text: impl Into<String>) -> Self {
		Self { value: ArgValue::Text(text.into()), append_uri: false }
	}

	pub fn text_with_uri(text: impl Into<String>) -> Self {
		Self { value: ArgValue::Text(text.into()), append_uri: true }
	}

	/// An argument name from the vocabulary, else an opaque payload.
	pub fn parse(spec: &str) -> Self {
		match ArgTag::from_name(spec) {
			Some(tag) => Self::tag(tag),
			None => Self::text(spec),
		}
	}

	pub fn as_tag(&self) -> Option<ArgTag> {
		match self.value {
			ArgValue::Tag(tag) => Some(tag),
			_ => None,
		}
	}

	pub fn is_tag(&self, tag: ArgTag) -> bool {
		self.as_tag() == Some(tag)
	}

	pub fn as_text(&self) -> Option<&str> {
		match &self.value {
			ArgValue::Text(text) => Some(text),
			_ => None,
		}
	}
}
