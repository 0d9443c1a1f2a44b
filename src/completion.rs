//! Incremental completion for the inputbar.
//!
//! A session is a flat list of rows built from either the command table or a
//! command's argument completer. Group labels are rows too: they are never
//! selected but fence the groups for group-wise navigation. A session stays
//! valid while the inputbar still matches the command, argument and length it
//! recorded at its last selection; any other edit destroys it.

use std::ops::Range;

use tracing::debug;

use crate::command::{COMMAND_PREFIX, CommandTable, Completer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	pub label:       String,
	pub description: Option<String>,
}

impl Element {
	pub fn new(label: impl Into<String>, description: Option<String>) -> Self {
		Self { label: label.into(), description }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Group {
	pub label:    Option<String>,
	pub elements: Vec<Element>,
}

impl Group {
	pub fn new(label: Option<&str>) -> Self {
		Self { label: label.map(str::to_string), elements: Vec::new() }
	}

	pub fn push(&mut self, element: Element) {
		self.elements.push(element);
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionModel {
	pub groups: Vec<Group>,
}

impl CompletionModel {
	pub fn push_group(&mut self, group: Group) {
		self.groups.push(group);
	}
}

/// Supplies candidates for a command's argument.
pub trait ArgumentSource {
	fn complete(&self, completer: Completer, input: &str) -> CompletionModel;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionRequest {
	Next,
	Previous,
	NextGroup,
	PreviousGroup,
	Hide,
}

impl CompletionRequest {
	fn is_forward(self) -> bool {
		matches!(self, CompletionRequest::Next | CompletionRequest::NextGroup)
	}

	fn is_group_wise(self) -> bool {
		matches!(self, CompletionRequest::NextGroup | CompletionRequest::PreviousGroup)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
	Idle,
	CommandList,
	ArgumentList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
	pub label:       String,
	pub description: Option<String>,
	pub is_group:    bool,
}

/// What a display needs to draw the open session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionView {
	pub rows:    Vec<Row>,
	pub current: Option<usize>,
}

impl CompletionView {
	/// Rows to show when at most `size` fit, keeping the current row visible.
	pub fn window(&self, size: usize) -> Range<usize> {
		let len = self.rows.len();
		if size == 0 {
			return 0..0;
		}
		if len <= size {
			return 0..len;
		}
		let start = self.current.map_or(0, |current| (current + 1).saturating_sub(size));
		start..start + size
	}
}

struct Input<'a> {
	identifier: char,
	command:    &'a str,
	parameter:  Option<&'a str>,
	length:     usize,
}

impl<'a> Input<'a> {
	fn parse(text: &'a str) -> Option<Self> {
		let mut chars = text.chars();
		let identifier = chars.next()?;
		let input = chars.as_str();
		let (command, parameter) = match input.split_once(' ') {
			Some((command, parameter)) => (command, Some(parameter)),
			None => (input, None),
		};
		Some(Self { identifier, command, parameter, length: input.len() })
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
	command:   String,
	parameter: Option<String>,
	length:    usize,
}

impl Snapshot {
	fn of(input: &Input<'_>) -> Self {
		Self {
			command:   input.command.to_string(),
			parameter: input.parameter.map(str::to_string),
			length:    input.length,
		}
	}

	fn invalidated_by(&self, input: &Input<'_>) -> bool {
		let parameter_changed = matches!(
			(self.parameter.as_deref(), input.parameter),
			(Some(previous), Some(current)) if previous != current
		);
		parameter_changed || self.command != input.command || self.length != input.length
	}
}

#[derive(Debug, Clone)]
struct SessionRow {
	row:     Row,
	command: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionKind {
	CommandList,
	ArgumentList { command: usize },
}

#[derive(Debug)]
struct Session {
	kind:     SessionKind,
	rows:     Vec<SessionRow>,
	current:  Option<usize>,
	snapshot: Snapshot,
}

impl Session {
	/// Moves the circular index and returns the newly selected element row.
	fn advance(&mut self, request: CompletionRequest) -> Option<usize> {
		let len = self.rows.len();
		if len == 0 {
			return None;
		}
		let forward = request.is_forward();
		let group_wise = request.is_group_wise() && matches!(self.kind, SessionKind::ArgumentList { .. });

		let mut index = self.current.unwrap_or(if forward { len - 1 } else { 0 });
		let mut crossed_group = false;
		for _ in 0..len {
			index = if forward { (index + 1) % len } else { (index + len - 1) % len };
			if self.rows[index].row.is_group {
				crossed_group |= group_wise;
				continue;
			}
			if group_wise && !crossed_group {
				continue;
			}
			break;
		}

		if self.rows[index].row.is_group {
			return None;
		}
		self.current = Some(index);
		Some(index)
	}

	fn view(&self) -> CompletionView {
		CompletionView {
			rows:    self.rows.iter().map(|row| row.row.clone()).collect(),
			current: self.current,
		}
	}
}

#[derive(Debug, Clone)]
struct Resolved {
	name:  String,
	index: usize,
}

#[derive(Debug, Default)]
pub struct CompletionEngine {
	session:  Option<Session>,
	resolved: Option<Resolved>,
}

impl CompletionEngine {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn state(&self) -> CompletionState {
		match self.session.as_ref().map(|session| session.kind) {
			None => CompletionState::Idle,
			Some(SessionKind::CommandList) => CompletionState::CommandList,
			Some(SessionKind::ArgumentList { .. }) => CompletionState::ArgumentList,
		}
	}

	pub fn is_active(&self) -> bool {
		self.session.is_some()
	}

	pub fn view(&self) -> Option<CompletionView> {
		self.session.as_ref().map(Session::view)
	}

	/// Handles a navigation request against the inputbar `text`. Returns the
	/// rewritten inputbar text when a row was selected.
	pub fn request(
		&mut self,
		text: &str,
		request: CompletionRequest,
		commands: &CommandTable,
		source: &dyn ArgumentSource,
	) -> Option<String> {
		if request == CompletionRequest::Hide {
			self.hide();
			return None;
		}

		let input = Input::parse(text)?;
		if input.identifier != COMMAND_PREFIX {
			return None;
		}

		if self.session.as_ref().is_some_and(|session| session.snapshot.invalidated_by(&input)) {
			self.destroy("input changed");
		}
		if self.session.is_none() {
			self.session = self.build(&input, commands, source);
		}

		let session = self.session.as_mut()?;
		let index = session.advance(request)?;
		let row = &session.rows[index];

		let (text, snapshot, resolved) = match session.kind {
			SessionKind::CommandList => {
				let mut text = format!("{COMMAND_PREFIX}{}", row.row.label);
				if let Some(parameter) = input.parameter {
					text.push(' ');
					text.push_str(parameter);
				}
				let snapshot = Snapshot {
					command:   row.row.label.clone(),
					parameter: input.parameter.map(str::to_string),
					length:    row.row.label.len() + (input.length - input.command.len()),
				};
				let resolved =
					row.command.map(|index| Resolved { name: row.row.label.clone(), index });
				(text, snapshot, resolved)
			}
			SessionKind::ArgumentList { command } => {
				let name = commands.get(command).map_or(input.command, |spec| spec.name);
				let text = format!("{COMMAND_PREFIX}{name} {}", row.row.label);
				let snapshot = Snapshot {
					command:   name.to_string(),
					parameter: Some(row.row.label.clone()),
					length:    name.len() + row.row.label.len() + 1,
				};
				let resolved = Some(Resolved { name: name.to_string(), index: command });
				(text, snapshot, resolved)
			}
		};

		session.snapshot = snapshot;
		if resolved.is_some() {
			self.resolved = resolved;
		}
		Some(text)
	}

	/// Re-checks an open session after the inputbar text changed. A session the
	/// edit invalidated is dropped and rebuilt without a selection. Returns
	/// whether the visible rows changed.
	pub fn refresh(&mut self, text: &str, commands: &CommandTable, source: &dyn ArgumentSource) -> bool {
		let Some(session) = &self.session else {
			return false;
		};
		let input = match Input::parse(text) {
			Some(input) if input.identifier == COMMAND_PREFIX => input,
			_ => {
				self.destroy("inputbar left command mode");
				return true;
			}
		};
		if !session.snapshot.invalidated_by(&input) {
			return false;
		}

		self.destroy("input changed");
		self.session = self.build(&input, commands, source);
		true
	}

	/// Drops the session. Idempotent.
	pub fn hide(&mut self) -> bool {
		if self.session.is_none() {
			return false;
		}
		self.destroy("hide requested");
		true
	}

	fn destroy(&mut self, reason: &str) {
		if self.session.take().is_some() {
			debug!("completion session destroyed: {}", reason);
		}
	}

	fn argument_command(&self, command: &str, commands: &CommandTable) -> Option<usize> {
		self.resolved
			.as_ref()
			.filter(|resolved| resolved.name == command)
			.map(|resolved| resolved.index)
			.or_else(|| commands.resolve(command).map(|(index, _)| index))
	}

	fn build(&self, input: &Input<'_>, commands: &CommandTable, source: &dyn ArgumentSource) -> Option<Session> {
		let snapshot = Snapshot::of(input);

		if let Some(parameter) = input.parameter
			&& let Some(command) = self.argument_command(input.command, commands)
		{
			let completer = commands.get(command)?.completer?;
			let rows = argument_rows(source.complete(completer, parameter), parameter);
			if rows.is_empty() {
				return None;
			}
			debug!("completion session built: {} argument rows for {}", rows.len(), input.command);
			return Some(Session {
				kind: SessionKind::ArgumentList { command },
				rows,
				current: None,
				snapshot,
			});
		}

		let rows = commands
			.specs()
			.iter()
			.enumerate()
			.filter(|(_, spec)| spec.completes(input.command))
			.map(|(index, spec)| SessionRow {
				row:     Row {
					label:       spec.name.to_string(),
					description: Some(spec.description.to_string()),
					is_group:    false,
				},
				command: Some(index),
			})
			.collect::<Vec<_>>();
		if rows.is_empty() {
			return None;
		}
		debug!("completion session built: {} command rows for '{}'", rows.len(), input.command);
		Some(Session { kind: SessionKind::CommandList, rows, current: None, snapshot })
	}
}

/// Flattens a model, keeping elements prefixed by `parameter`, labels first.
fn argument_rows(model: CompletionModel, parameter: &str) -> Vec<SessionRow> {
	let mut rows = Vec::new();
	for group in model.groups {
		let elements = group
			.elements
			.into_iter()
			.filter(|element| element.label.starts_with(parameter))
			.collect::<Vec<_>>();
		if elements.is_empty() {
			continue;
		}
		if let Some(label) = group.label {
			rows.push(SessionRow { row: Row { label, description: None, is_group: true }, command: None });
		}
		rows.extend(elements.into_iter().map(|element| SessionRow {
			row:     Row { label: element.label, description: element.description, is_group: false },
			command: None,
		}));
	}
	rows
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::{
		ArgumentSource, CompletionEngine, CompletionModel, CompletionRequest, CompletionState, CompletionView,
		Element, Group, Row,
	};
	use crate::command::{CommandTable, Completer};

	struct FixedSource;

	impl ArgumentSource for FixedSource {
		fn complete(&self, completer: Completer, _input: &str) -> CompletionModel {
			let mut model = CompletionModel::default();
			match completer {
				Completer::Open => {
					let mut engines = Group::new(Some("Search engines"));
					engines.push(Element::new("ddg", None));
					engines.push(Element::new("wiki", None));
					let mut bookmarks = Group::new(Some("Bookmarks"));
					bookmarks.push(Element::new("http://a.example", None));
					bookmarks.push(Element::new("http://b.example", None));
					model.push_group(engines);
					model.push_group(bookmarks);
				}
				Completer::Set => {
					let mut options = Group::new(None);
					for name in ["scroll_step", "statusbar", "zoom_step"] {
						options.push(Element::new(name, Some(format!("{name} option"))));
					}
					model.push_group(options);
				}
			}
			model
		}
	}

	fn labels(engine: &CompletionEngine) -> Vec<String> {
		engine.view().map(|view| view.rows.into_iter().map(|row| row.label).collect()).unwrap_or_default()
	}

	#[test]
	fn command_list_should_keep_table_order_and_wrap() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();

		let text = engine.request(":s", CompletionRequest::Next, &commands, &FixedSource);
		assert_eq!(engine.state(), CompletionState::CommandList);
		assert_eq!(labels(&engine), vec!["saveas", "script", "searchengine", "set", "stop"]);
		assert_eq!(text.as_deref(), Some(":saveas"));

		let text = engine.request(":saveas", CompletionRequest::Previous, &commands, &FixedSource);
		assert_eq!(text.as_deref(), Some(":stop"));
		assert_eq!(engine.view().and_then(|view| view.current), Some(4));
	}

	#[test]
	fn previous_from_no_selection_should_land_on_last_row() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();
		let text = engine.request(":re", CompletionRequest::Previous, &commands, &FixedSource);
		assert_eq!(text.as_deref(), Some(":reloadall"));
	}

	#[test]
	fn next_group_in_command_list_should_behave_like_next() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();
		assert_eq!(engine.request(":re", CompletionRequest::NextGroup, &commands, &FixedSource).as_deref(), Some(":reload"));
		assert_eq!(
			engine.request(":reload", CompletionRequest::NextGroup, &commands, &FixedSource).as_deref(),
			Some(":reloadall")
		);
	}

	#[test]
	fn command_selection_should_keep_existing_argument() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();
		let text = engine.request(":tab example.com", CompletionRequest::Next, &commands, &FixedSource);
		assert_eq!(text.as_deref(), Some(":tabopen example.com"));
	}

	#[test]
	fn argument_list_should_place_group_labels_before_elements() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();

		let text = engine.request(":open ", CompletionRequest::Next, &commands, &FixedSource);
		assert_eq!(engine.state(), CompletionState::ArgumentList);
		assert_eq!(
			labels(&engine),
			vec!["Search engines", "ddg", "wiki", "Bookmarks", "http://a.example", "http://b.example"]
		);
		assert_eq!(text.as_deref(), Some(":open ddg"));
	}

	#[test]
	fn argument_list_should_filter_by_prefix_and_drop_empty_groups() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();

		let text = engine.request(":open http", CompletionRequest::Next, &commands, &FixedSource);
		assert_eq!(labels(&engine), vec!["Bookmarks", "http://a.example", "http://b.example"]);
		assert_eq!(text.as_deref(), Some(":open http://a.example"));
	}

	#[test]
	fn argument_selection_should_spell_out_abbreviated_command() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();

		let text = engine.request(":o ", CompletionRequest::Next, &commands, &FixedSource).expect("engine");
		assert_eq!(text, ":open ddg");
		let text = engine.request(&text, CompletionRequest::Next, &commands, &FixedSource).expect("engine");
		assert_eq!(text, ":open wiki");
		assert_eq!(engine.view().and_then(|view| view.current), Some(2));
	}

	#[test]
	fn empty_argument_model_should_not_open_a_session() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();
		assert_eq!(engine.request(":open zzz", CompletionRequest::Next, &commands, &FixedSource), None);
		assert_eq!(engine.state(), CompletionState::Idle);

		assert_eq!(engine.request(":quit now", CompletionRequest::Next, &commands, &FixedSource), None);
		assert_eq!(engine.state(), CompletionState::Idle);
	}

	#[test]
	fn group_navigation_should_jump_between_labeled_groups() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();

		let text = engine.request(":open ", CompletionRequest::Next, &commands, &FixedSource).expect("ddg");
		let text = engine.request(&text, CompletionRequest::NextGroup, &commands, &FixedSource).expect("bookmark");
		assert_eq!(text, ":open http://a.example");

		let text = engine.request(&text, CompletionRequest::Next, &commands, &FixedSource).expect("second bookmark");
		let text = engine.request(&text, CompletionRequest::PreviousGroup, &commands, &FixedSource).expect("engine");
		assert_eq!(text, ":open wiki");

		let text = engine.request(&text, CompletionRequest::NextGroup, &commands, &FixedSource).expect("wrap");
		assert_eq!(text, ":open http://a.example");
	}

	#[test]
	fn argument_session_should_follow_command_selected_from_list() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();

		let text = engine.request(":se", CompletionRequest::Next, &commands, &FixedSource).expect("command");
		let text = engine.request(&text, CompletionRequest::Next, &commands, &FixedSource).expect("command");
		assert_eq!(text, ":set");

		assert!(engine.refresh(":set ", &commands, &FixedSource));
		assert_eq!(engine.state(), CompletionState::ArgumentList);
		assert_eq!(engine.view().and_then(|view| view.current), None);

		let text = engine.request(":set s", CompletionRequest::Next, &commands, &FixedSource);
		assert_eq!(labels(&engine), vec!["scroll_step", "statusbar"]);
		assert_eq!(text.as_deref(), Some(":set scroll_step"));
	}

	#[test]
	fn edit_changing_command_token_should_drop_stale_rows() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();

		let text = engine.request(":s", CompletionRequest::Next, &commands, &FixedSource).expect("row");
		assert_eq!(text, ":saveas");

		assert!(engine.refresh(":saveasx", &commands, &FixedSource));
		assert_eq!(engine.state(), CompletionState::Idle);
		assert!(labels(&engine).is_empty());

		let text = engine.request(":st", CompletionRequest::Next, &commands, &FixedSource);
		assert_eq!(labels(&engine), vec!["stop"]);
		assert_eq!(text.as_deref(), Some(":stop"));
	}

	#[test]
	fn refresh_should_keep_session_when_text_matches_selection() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();
		engine.request(":s", CompletionRequest::Next, &commands, &FixedSource);
		assert!(!engine.refresh(":saveas", &commands, &FixedSource));
		assert_eq!(engine.state(), CompletionState::CommandList);
	}

	#[test]
	fn hide_should_be_idempotent() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();
		assert!(!engine.hide());
		assert_eq!(engine.request("", CompletionRequest::Hide, &commands, &FixedSource), None);
		assert_eq!(engine.state(), CompletionState::Idle);

		engine.request(":s", CompletionRequest::Next, &commands, &FixedSource);
		assert!(engine.hide());
		assert!(!engine.hide());
		assert_eq!(engine.state(), CompletionState::Idle);
	}

	#[test]
	fn non_command_prefix_should_not_complete() {
		let commands = CommandTable::with_defaults();
		let mut engine = CompletionEngine::new();
		assert_eq!(engine.request("/needle", CompletionRequest::Next, &commands, &FixedSource), None);
		assert_eq!(engine.state(), CompletionState::Idle);
	}

	#[test]
	fn window_should_keep_current_row_visible() {
		let row = |label: &str| Row { label: label.to_string(), description: None, is_group: false };
		let view = CompletionView { rows: ["a", "b", "c", "d", "e"].map(row).to_vec(), current: Some(4) };
		assert_eq!(view.window(2), 3..5);
		assert_eq!(view.window(10), 0..5);
		let view = CompletionView { current: None, ..view };
		assert_eq!(view.window(2), 0..2);
	}
}
