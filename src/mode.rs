use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
	#[default]
	Normal,
	Insert,
	Visual,
	Follow,
	PassThrough,
	PassThroughNext,
	AddMarker,
	EvalMarker,
	/// Binding scope wildcard; never the current mode.
	All,
}

const MODE_NAMES: &[(&str, Mode)] = &[
	("all", Mode::All),
	("insert", Mode::Insert),
	("visual", Mode::Visual),
	("follow", Mode::Follow),
	("pass_through", Mode::PassThrough),
	("normal", Mode::Normal),
];

impl Mode {
	pub fn from_name(name: &str) -> Option<Mode> {
		MODE_NAMES.iter().find(|(mode_name, _)| *mode_name == name).map(|(_, mode)| *mode)
	}

	pub fn label(self) -> &'static str {
		match self {
			Mode::Insert => "-- INSERT --",
			Mode::Visual => "-- VISUAL --",
			Mode::Follow => "-- FOLLOW --",
			Mode::PassThrough => "-- PASS THROUGH --",
			Mode::PassThroughNext => "-- PASS THROUGH (next) --",
			Mode::Normal | Mode::AddMarker | Mode::EvalMarker | Mode::All => "",
		}
	}

	/// Whether a binding declared for `self` is active while `current` is.
	pub fn admits(self, current: Mode) -> bool {
		self == Mode::All || self == current
	}

	/// Modes in which keys no binding claims go to the view.
	pub fn forwards_unclaimed_keys(self) -> bool {
		matches!(self, Mode::Insert | Mode::Follow | Mode::PassThrough | Mode::PassThroughNext)
	}

	pub fn is_marker(self) -> bool {
		matches!(self, Mode::AddMarker | Mode::EvalMarker)
	}
}

#[derive(Debug, Default)]
pub struct ModeState {
	current: Mode,
}

impl ModeState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn current(&self) -> Mode {
		self.current
	}

	/// Any mode may follow any mode. `All` is not a state and lands on `Normal`.
	pub fn set_mode(&mut self, mode: Mode) -> &'static str {
		let mode = if mode == Mode::All { Mode::Normal } else { mode };
		if self.current != mode {
			debug!("mode changed: {:?} -> {:?}", self.current, mode);
		}
		self.current = mode;
		mode.label()
	}
}
