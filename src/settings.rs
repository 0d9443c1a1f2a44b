use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::action::ArgTag;
use crate::completion::{CompletionModel, Element, Group};
use self::DefaultValue::{Bool, Float, Int, Str};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
	Bool,
	Int,
	Float,
	Str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
}

impl SettingValue {
	pub fn kind(&self) -> SettingKind {
		match self {
			SettingValue::Bool(_) => SettingKind::Bool,
			SettingValue::Int(_) => SettingKind::Int,
			SettingValue::Float(_) => SettingKind::Float,
			SettingValue::Str(_) => SettingKind::Str,
		}
	}
}

impl fmt::Display for SettingValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SettingValue::Bool(value) => write!(f, "{value}"),
			SettingValue::Int(value) => write!(f, "{value}"),
			SettingValue::Float(value) => write!(f, "{value}"),
			SettingValue::Str(value) => f.write_str(value),
		}
	}
}

#[derive(Debug, Error)]
pub enum SettingError {
	#[error("set needs an option name")]
	MissingName,
	#[error("unknown option: {name}")]
	UnknownOption { name: String },
	#[error("option {name} takes exactly one value")]
	WrongArgumentCount { name: String },
	#[error("option {name} needs a value")]
	MissingValue { name: String },
	#[error("invalid integer for {name}: {value}")]
	InvalidInt {
		name:   String,
		value:  String,
		#[source]
		source: std::num::ParseIntError,
	},
	#[error("invalid number for {name}: {value}")]
	InvalidFloat {
		name:   String,
		value:  String,
		#[source]
		source: std::num::ParseFloatError,
	},
}

#[derive(Debug, Clone, Copy)]
pub struct SettingSpec {
	pub name:          &'static str,
	pub kind:          SettingKind,
	pub default:       DefaultValue,
	pub description:   &'static str,
	/// Property name on the view surface the value is forwarded to.
	pub view_property: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(&'static str),
}

impl DefaultValue {
	fn value(self) -> SettingValue {
		match self {
			DefaultValue::Bool(value) => SettingValue::Bool(value),
			DefaultValue::Int(value) => SettingValue::Int(value),
			DefaultValue::Float(value) => SettingValue::Float(value),
			DefaultValue::Str(value) => SettingValue::Str(value.to_string()),
		}
	}

	const fn kind(self) -> SettingKind {
		match self {
			DefaultValue::Bool(_) => SettingKind::Bool,
			DefaultValue::Int(_) => SettingKind::Int,
			DefaultValue::Float(_) => SettingKind::Float,
			DefaultValue::Str(_) => SettingKind::Str,
		}
	}
}

const fn spec(
	name: &'static str,
	default: DefaultValue,
	view_property: Option<&'static str>,
	description: &'static str,
) -> SettingSpec {
	SettingSpec { name, kind: default.kind(), default, description, view_property }
}

pub const SETTINGS: &[SettingSpec] = &[
	spec("96dpi", Bool(false), Some("enforce-96-dpi"), "Enforce a resolution of 96 DPI"),
	spec("auto_save", Int(0), None, "Autosave bookmarks and history every n seconds"),
	spec("auto_shrink_images", Bool(true), Some("auto-shrink-images"), "Shrink standalone images to fit"),
	spec("caret_browsing", Bool(false), Some("enable-caret-browsing"), "Whether to enable caret browsing mode"),
	spec("completion_bgcolor", Str("#232323"), None, "Completion background color"),
	spec("completion_fgcolor", Str("#DDDDDD"), None, "Completion foreground color"),
	spec("completion_g_bgcolor", Str("#000000"), None, "Completion (group) background color"),
	spec("completion_g_fgcolor", Str("#DEDEDE"), None, "Completion (group) foreground color"),
	spec("completion_hl_bgcolor", Str("#9FBC00"), None, "Completion (highlight) background color"),
	spec("completion_hl_fgcolor", Str("#232323"), None, "Completion (highlight) foreground color"),
	spec("default_bgcolor", Str("#000000"), None, "Default background color"),
	spec("default_fgcolor", Str("#DDDDDD"), None, "Default foreground color"),
	spec("download_dir", Str("~/dl/"), None, "The default download directory"),
	spec("encoding", Str("UTF-8"), Some("default-encoding"), "The default encoding to display text"),
	spec("font", Str("monospace normal 9"), None, "The used font"),
	spec("font_size", Int(12), Some("default-font-size"), "The default font size to display text"),
	spec("homepage", Str("http://www.pwmt.org"), None, "Home page"),
	spec("images", Bool(true), Some("auto-load-images"), "Load images automatically"),
	spec("inputbar_bgcolor", Str("#141414"), None, "Inputbar background color"),
	spec("inputbar_fgcolor", Str("#9FBC00"), None, "Inputbar foreground color"),
	spec("n_completion_items", Int(15), None, "Number of completion items"),
	spec("next_to_current", Bool(true), None, "Open new tab next to the current one"),
	spec("notification_e_bgcolor", Str("#FF1212"), None, "Notification (error) background color"),
	spec("notification_e_fgcolor", Str("#FFFFFF"), None, "Notification (error) foreground color"),
	spec("notification_w_bgcolor", Str("#FFF712"), None, "Notification (warning) background color"),
	spec("notification_w_fgcolor", Str("#000000"), None, "Notification (warning) foreground color"),
	spec("plugins", Bool(true), Some("enable-plugins"), "Enable embedded plugin objects"),
	spec("private_browsing", Bool(false), Some("enable-private-browsing"), "Enable private browsing"),
	spec("proxy", Str(""), None, "Set proxy"),
	spec("scripts", Bool(true), Some("enable-scripts"), "Enable embedded scripting languages"),
	spec("scroll_step", Float(40.0), None, "Scroll step"),
	spec("spell_checking", Bool(false), Some("enable-spell-checking"), "Enable spell checking while typing"),
	spec("statusbar", Bool(true), None, "Show statusbar"),
	spec("statusbar_bgcolor", Str("#000000"), None, "Statusbar background color"),
	spec("statusbar_fgcolor", Str("#FFFFFF"), None, "Statusbar foreground color"),
	spec("stylesheet", Str(""), Some("user-stylesheet-uri"), "Custom stylesheet"),
	spec("tabbar", Bool(true), None, "Show tabbar"),
	spec("tabbar_bgcolor", Str("#000000"), None, "Tabbar background color"),
	spec("tabbar_fgcolor", Str("#FFFFFF"), None, "Tabbar foreground color"),
	spec("tabbar_focus_bgcolor", Str("#000000"), None, "Tabbar (focus) background color"),
	spec("tabbar_focus_fgcolor", Str("#9FBC00"), None, "Tabbar (focus) foreground color"),
	spec("user_agent", Str("rove/0.1"), Some("user-agent"), "User agent"),
	spec("zoom_step", Float(10.0), Some("zoom-step"), "Zoom step"),
];

/// A value that changed through `set`.
#[derive(Debug, Clone, PartialEq)]
pub struct Changed {
	pub name:          &'static str,
	pub view_property: Option<&'static str>,
	pub value:         SettingValue,
}

/// Live option values, one per [`SETTINGS`] entry.
#[derive(Debug, Clone)]
pub struct Settings {
	values: Vec<(&'static SettingSpec, SettingValue)>,
}

impl Settings {
	pub fn new() -> Self {
		Self { values: SETTINGS.iter().map(|spec| (spec, spec.default.value())).collect() }
	}

	pub fn specs(&self) -> impl Iterator<Item = &'static SettingSpec> + '_ {
		self.values.iter().map(|(spec, _)| *spec)
	}

	pub fn get(&self, name: &str) -> Option<&SettingValue> {
		self.values.iter().find(|(spec, _)| spec.name == name).map(|(_, value)| value)
	}

	pub fn bool(&self, name: &str) -> bool {
		matches!(self.get(name), Some(SettingValue::Bool(true)))
	}

	pub fn int(&self, name: &str) -> i64 {
		match self.get(name) {
			Some(SettingValue::Int(value)) => *value,
			_ => 0,
		}
	}

	pub fn float(&self, name: &str) -> f64 {
		match self.get(name) {
			Some(SettingValue::Float(value)) => *value,
			Some(SettingValue::Int(value)) => *value as f64,
			_ => 0.0,
		}
	}

	pub fn string(&self, name: &str) -> &str {
		match self.get(name) {
			Some(SettingValue::Str(value)) => value,
			_ => "",
		}
	}

	/// Options whose value is forwarded to the view surface, with their value.
	pub fn view_properties(&self) -> impl Iterator<Item = (&'static str, &SettingValue)> + '_ {
		self.values.iter().filter_map(|(spec, value)| spec.view_property.map(|property| (property, value)))
	}

	/// `set <name> [value...]`.
	///
	/// Booleans toggle without a value; `false` and `0` clear them and any
	/// other value sets them. Integers and floats take exactly one value,
	/// integers also accept argument names. Strings join all values with
	/// single spaces.
	pub fn set(&mut self, args: &[&str]) -> Result<Changed, SettingError> {
		let (name, values) = args.split_first().ok_or(SettingError::MissingName)?;
		let (spec, current) = self
			.values
			.iter_mut()
			.find(|(spec, _)| spec.name == *name)
			.ok_or_else(|| SettingError::UnknownOption { name: name.to_string() })?;

		let value = match spec.kind {
			SettingKind::Bool => {
				let toggled = !matches!(current, SettingValue::Bool(true));
				SettingValue::Bool(match values.first() {
					None => toggled,
					Some(&"false") | Some(&"0") => false,
					Some(_) => true,
				})
			}
			SettingKind::Int => {
				let [value] = values else {
					return Err(SettingError::WrongArgumentCount { name: spec.name.to_string() });
				};
				let parsed = match ArgTag::from_name(value).and_then(ArgTag::code) {
					Some(code) => code,
					None => value.parse().map_err(|source| SettingError::InvalidInt {
						name: spec.name.to_string(),
						value: value.to_string(),
						source,
					})?,
				};
				SettingValue::Int(parsed)
			}
			SettingKind::Float => {
				let [value] = values else {
					return Err(SettingError::WrongArgumentCount { name: spec.name.to_string() });
				};
				SettingValue::Float(value.parse().map_err(|source| SettingError::InvalidFloat {
					name: spec.name.to_string(),
					value: value.to_string(),
					source,
				})?)
			}
			SettingKind::Str => {
				if values.is_empty() {
					return Err(SettingError::MissingValue { name: spec.name.to_string() });
				}
				SettingValue::Str(values.join(" "))
			}
		};

		debug!("option {} = {}", spec.name, value);
		*current = value.clone();
		Ok(Changed { name: spec.name, view_property: spec.view_property, value })
	}

	/// Option names prefixed by `input`, with descriptions, as one unlabeled group.
	pub fn completion(&self, input: &str) -> CompletionModel {
		let mut group = Group::new(None);
		for spec in self.specs().filter(|spec| spec.name.starts_with(input)) {
			group.push(Element::new(spec.name, Some(spec.description.to_string())));
		}
		let mut model = CompletionModel::default();
		model.push_group(group);
		model
	}
}

impl Default for Settings {
	fn default() -> Self {
		Self::new()
	}
}
