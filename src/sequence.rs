use regex::Regex;
use thiserror::Error;
use tracing::trace;

use crate::action::{ActionKind, ArgTag, Argument};

#[derive(Debug, Clone)]
pub struct BufferCommandSpec {
	pub pattern:  &'static str,
	pub action:   ActionKind,
	pub argument: Argument,
}

impl BufferCommandSpec {
	pub const fn new(pattern: &'static str, action: ActionKind, argument: Argument) -> Self {
		Self { pattern, action, argument }
	}
}

#[derive(Debug, Clone)]
pub struct BufferCommand {
	pub pattern:  Regex,
	pub action:   ActionKind,
	pub argument: Argument,
}

#[derive(Debug, Error)]
pub enum SequenceError {
	#[error("invalid buffer pattern '{pattern}'")]
	InvalidPattern {
		pattern: &'static str,
		#[source]
		source:  regex::Error,
	},
}

/// Multi-key commands recognised against the pending buffer text.
/// Table order matters: the first matching pattern wins.
#[derive(Debug, Clone)]
pub struct BufferMatcher {
	commands: Vec<BufferCommand>,
}

impl BufferMatcher {
	pub fn new(specs: &[BufferCommandSpec]) -> Result<Self, SequenceError> {
		let commands = specs
			.iter()
			.map(|spec| -> Result<BufferCommand, SequenceError> {
				let pattern = Regex::new(spec.pattern)
					.map_err(|source| SequenceError::InvalidPattern { pattern: spec.pattern, source })?;
				Ok(BufferCommand { pattern, action: spec.action, argument: spec.argument.clone() })
			})
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self { commands })
	}

	pub fn with_defaults() -> Result<Self, SequenceError> {
		Self::new(&default_buffer_commands())
	}

	pub fn commands(&self) -> &[BufferCommand] {
		&self.commands
	}

	pub fn find(&self, buffer: &str) -> Option<&BufferCommand> {
		let found = self.commands.iter().find(|command| command.pattern.is_match(buffer));
		if let Some(command) = found {
			trace!("buffer '{}' matched {}", buffer, command.pattern.as_str());
		}
		found
	}
}

pub fn default_buffer_commands() -> Vec<BufferCommandSpec> {
	use ActionKind as A;
	use ArgTag as T;

	vec![
		BufferCommandSpec::new("^gh$", A::GoHome, Argument::NONE),
		BufferCommandSpec::new("^gH$", A::GoHome, Argument::tag(T::NewTab)),
		BufferCommandSpec::new("^[0-9]*gu$", A::GoParent, Argument::NONE),
		BufferCommandSpec::new("^gU$", A::GoParent, Argument::tag(T::Top)),
		BufferCommandSpec::new("^gt$", A::NavTabs, Argument::tag(T::Next)),
		BufferCommandSpec::new("^gT$", A::NavTabs, Argument::tag(T::Previous)),
		BufferCommandSpec::new("^gP$", A::Paste, Argument::tag(T::NewTab)),
		BufferCommandSpec::new("^[0-9]+gt$", A::NavTabs, Argument::tag(T::Specific)),
		BufferCommandSpec::new("^[0-9]+gT$", A::NavTabs, Argument::tag(T::Specific)),
		BufferCommandSpec::new("^ZZ$", A::Quit, Argument::NONE),
		BufferCommandSpec::new("^ZQ$", A::Quit, Argument::NONE),
		BufferCommandSpec::new("^[0-9]+%$", A::Scroll, Argument::tag(T::Specific)),
		BufferCommandSpec::new("^[0-9]+G$", A::Scroll, Argument::tag(T::Specific)),
		BufferCommandSpec::new("^gg$", A::Scroll, Argument::tag(T::Top)),
		BufferCommandSpec::new("^G$", A::Scroll, Argument::tag(T::Bottom)),
		BufferCommandSpec::new("^zI$", A::Zoom, Argument::tag(T::ZoomIn)),
		BufferCommandSpec::new("^zO$", A::Zoom, Argument::tag(T::ZoomOut)),
		BufferCommandSpec::new("^z0$", A::Zoom, Argument::tag(T::ZoomOriginal)),
		BufferCommandSpec::new("^[0-9]+Z$", A::Zoom, Argument::tag(T::Specific)),
	]
}

/// Leading decimal count of a buffer such as `12gt`.
pub fn leading_count(buffer: &str) -> Option<u32> {
	let digits = buffer.find(|ch: char| !ch.is_ascii_digit()).map_or(buffer, |end| &buffer[..end]);
	digits.parse().ok()
}
