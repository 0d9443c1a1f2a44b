use crate::ports::SearchDirection;

/// Character that introduces a named line command in the inputbar.
pub const COMMAND_PREFIX: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
	Back,
	Bookmark,
	Forward,
	Map,
	Open,
	Quit,
	QuitAll,
	Reload,
	ReloadAll,
	SaveAs,
	Script,
	SearchEngine,
	Set,
	Stop,
	TabOpen,
	WinOpen,
	Write,
}

/// Argument completion sources a command can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completer {
	Open,
	Set,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
	pub name:         &'static str,
	pub abbreviation: Option<&'static str>,
	pub id:           CommandId,
	pub completer:    Option<Completer>,
	pub description:  &'static str,
}

impl CommandSpec {
	const fn new(
		name: &'static str,
		abbreviation: Option<&'static str>,
		id: CommandId,
		completer: Option<Completer>,
		description: &'static str,
	) -> Self {
		Self { name, abbreviation, id, completer, description }
	}

	pub fn is_named(&self, token: &str) -> bool {
		self.name == token || self.abbreviation == Some(token)
	}

	/// Prefix match on the name or the abbreviation, case sensitive.
	pub fn completes(&self, partial: &str) -> bool {
		self.name.starts_with(partial) || self.abbreviation.is_some_and(|abbr| abbr.starts_with(partial))
	}
}

const DEFAULT_COMMANDS: &[CommandSpec] = &[
	CommandSpec::new("back", None, CommandId::Back, None, "Go back in the browser history"),
	CommandSpec::new("bmark", Some("b"), CommandId::Bookmark, None, "Add a bookmark"),
	CommandSpec::new("forward", Some("f"), CommandId::Forward, None, "Go forward in the browser history"),
	CommandSpec::new("map", Some("m"), CommandId::Map, None, "Map a key sequence"),
	CommandSpec::new("open", Some("o"), CommandId::Open, Some(Completer::Open), "Open URI in the current tab"),
	CommandSpec::new("quit", Some("q"), CommandId::Quit, None, "Quit current tab"),
	CommandSpec::new("quitall", None, CommandId::QuitAll, None, "Quit rove"),
	CommandSpec::new("reload", None, CommandId::Reload, None, "Reload the current web page"),
	CommandSpec::new("reloadall", None, CommandId::ReloadAll, None, "Reload all tab pages"),
	CommandSpec::new("saveas", None, CommandId::SaveAs, None, "Save current document to disk"),
	CommandSpec::new("script", None, CommandId::Script, None, "Load a javascript file"),
	CommandSpec::new("searchengine", None, CommandId::SearchEngine, None, "Add or replace a search engine"),
	CommandSpec::new("set", Some("s"), CommandId::Set, Some(Completer::Set), "Set an option"),
	CommandSpec::new("stop", Some("st"), CommandId::Stop, None, "Stop loading the current page"),
	CommandSpec::new("tabopen", Some("t"), CommandId::TabOpen, Some(Completer::Open), "Open URI in a new tab"),
	CommandSpec::new("winopen", Some("wo"), CommandId::WinOpen, Some(Completer::Open), "Open URI in a new window"),
	CommandSpec::new("write", Some("w"), CommandId::Write, None, "Write bookmark and history file"),
];

#[derive(Debug, Clone)]
pub struct CommandTable {
	specs: Vec<CommandSpec>,
}

impl CommandTable {
	pub fn new(specs: Vec<CommandSpec>) -> Self {
		let table = Self { specs };
		debug_assert!(
			table.duplicate_name().is_none(),
			"duplicate command name or abbreviation: {:?}",
			table.duplicate_name()
		);
		table
	}

	pub fn with_defaults() -> Self {
		Self::new(DEFAULT_COMMANDS.to_vec())
	}

	pub fn specs(&self) -> &[CommandSpec] {
		&self.specs
	}

	pub fn get(&self, index: usize) -> Option<&CommandSpec> {
		self.specs.get(index)
	}

	/// Exact match on name or abbreviation; the first entry wins.
	pub fn resolve(&self, token: &str) -> Option<(usize, &CommandSpec)> {
		self.specs.iter().enumerate().find(|(_, spec)| spec.is_named(token))
	}

	/// First name or abbreviation that appears twice in the table.
	pub fn duplicate_name(&self) -> Option<&'static str> {
		let mut seen: Vec<&'static str> = Vec::new();
		for spec in &self.specs {
			for name in std::iter::once(spec.name).chain(spec.abbreviation) {
				if seen.contains(&name) {
					return Some(name);
				}
				seen.push(name);
			}
		}
		None
	}
}

impl Default for CommandTable {
	fn default() -> Self {
		Self::with_defaults()
	}
}

/// Single character inputbar prefixes handled outside the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialCommand {
	pub identifier: char,
	pub direction:  SearchDirection,
	/// Fires on every text change instead of only on submission.
	pub always:     bool,
}

pub const SPECIAL_COMMANDS: &[SpecialCommand] = &[
	SpecialCommand { identifier: '/', direction: SearchDirection::Forward, always: true },
	SpecialCommand { identifier: '?', direction: SearchDirection::Backward, always: true },
];

pub fn special_command(identifier: char) -> Option<&'static SpecialCommand> {
	SPECIAL_COMMANDS.iter().find(|special| special.identifier == identifier)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
	Empty,
	Special { command: &'static SpecialCommand, input: &'a str },
	Command { name: &'a str, args: Vec<&'a str> },
}

/// Splits inputbar text into its identifier and the whitespace separated tokens
/// that follow. No quoting is supported.
pub fn parse_line(line: &str) -> LineKind<'_> {
	let mut chars = line.chars();
	let Some(identifier) = chars.next() else {
		return LineKind::Empty;
	};
	let input = chars.as_str();

	if let Some(command) = special_command(identifier) {
		return LineKind::Special { command, input };
	}

	let mut tokens = input.split_whitespace();
	let name = tokens.next().unwrap_or("");
	LineKind::Command { name, args: tokens.collect() }
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::{CommandId, CommandSpec, CommandTable, LineKind, parse_line};
	use crate::ports::SearchDirection;

	#[test]
	fn resolve_should_match_name_or_abbreviation_exactly() {
		let table = CommandTable::with_defaults();
		assert_eq!(table.resolve("tabopen").map(|(_, spec)| spec.id), Some(CommandId::TabOpen));
		assert_eq!(table.resolve("t").map(|(_, spec)| spec.id), Some(CommandId::TabOpen));
		assert_eq!(table.resolve("st").map(|(_, spec)| spec.id), Some(CommandId::Stop));
		assert!(table.resolve("tab").is_none());
	}

	#[test]
	fn default_table_should_have_unique_names() {
		assert_eq!(CommandTable::with_defaults().duplicate_name(), None);
	}

	#[test]
	fn duplicate_name_should_find_clashing_abbreviation() {
		let table = CommandTable {
			specs: vec![
				CommandSpec::new("winopen", Some("w"), CommandId::WinOpen, None, ""),
				CommandSpec::new("write", Some("w"), CommandId::Write, None, ""),
			],
		};
		assert_eq!(table.duplicate_name(), Some("w"));
	}

	#[test]
	fn completes_should_use_prefix_of_name_or_abbreviation() {
		let table = CommandTable::with_defaults();
		let names =
			table.specs().iter().filter(|spec| spec.completes("s")).map(|spec| spec.name).collect::<Vec<_>>();
		assert_eq!(names, vec!["saveas", "script", "searchengine", "set", "stop"]);
	}

	#[test]
	fn parse_line_should_split_command_and_arguments() {
		assert_eq!(
			parse_line(":open  example.com   now"),
			LineKind::Command { name: "open", args: vec!["example.com", "now"] }
		);
		assert_eq!(parse_line(":"), LineKind::Command { name: "", args: vec![] });
		assert_eq!(parse_line(""), LineKind::Empty);
	}

	#[test]
	fn parse_line_should_route_special_prefixes() {
		let LineKind::Special { command, input } = parse_line("?needle") else {
			panic!("expected special command");
		};
		assert_eq!(command.direction, SearchDirection::Backward);
		assert_eq!(input, "needle");
	}
}
