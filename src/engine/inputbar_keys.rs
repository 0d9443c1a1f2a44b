use std::ops::ControlFlow;

use tracing::trace;

use super::{Candidates, Engine, KeyOutcome};
use crate::command::{LineKind, parse_line};
use crate::completion::CompletionRequest;
use crate::history::Recall;
use crate::key::{KeyChord, KeyCode, Modifiers};
use crate::ports::{NotifyLevel, Ports};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputbarAction {
	Abort,
	Recall(Recall),
	Complete(CompletionRequest),
	DeleteLastChar,
	DeleteLastWord,
	NextChar,
	PreviousChar,
	Submit,
}

const NONE: Modifiers = Modifiers::empty();
const CTRL: Modifiers = Modifiers::CONTROL;
const SHIFT: Modifiers = Modifiers::SHIFT;

const fn ascii(ch: u8) -> KeyCode {
	KeyCode(ch as u32)
}

/// Matched on the exact clean modifier mask.
const INPUTBAR_SHORTCUTS: &[(Modifiers, KeyCode, InputbarAction)] = &[
	(NONE, KeyCode::ESCAPE, InputbarAction::Abort),
	(CTRL, ascii(b'c'), InputbarAction::Abort),
	(NONE, KeyCode::UP, InputbarAction::Recall(Recall::Previous)),
	(NONE, KeyCode::DOWN, InputbarAction::Recall(Recall::Next)),
	(NONE, KeyCode::TAB, InputbarAction::Complete(CompletionRequest::Next)),
	(CTRL, KeyCode::TAB, InputbarAction::Complete(CompletionRequest::NextGroup)),
	(SHIFT, KeyCode::ISO_LEFT_TAB, InputbarAction::Complete(CompletionRequest::Previous)),
	(CTRL.union(SHIFT), KeyCode::ISO_LEFT_TAB, InputbarAction::Complete(CompletionRequest::PreviousGroup)),
	(NONE, KeyCode::BACKSPACE, InputbarAction::DeleteLastChar),
	(CTRL, ascii(b'h'), InputbarAction::DeleteLastChar),
	(CTRL, ascii(b'w'), InputbarAction::DeleteLastWord),
	(CTRL, ascii(b'f'), InputbarAction::NextChar),
	(CTRL, ascii(b'b'), InputbarAction::PreviousChar),
	(NONE, KeyCode::RETURN, InputbarAction::Submit),
];

fn inputbar_action(key: KeyChord) -> Option<InputbarAction> {
	let modifiers = key.modifiers.clean();
	INPUTBAR_SHORTCUTS
		.iter()
		.find(|(mask, code, _)| *code == key.code && *mask == modifiers)
		.map(|(_, _, action)| *action)
}

impl Engine {
	pub(super) fn handle_inputbar_key(&mut self, ports: &mut Ports<'_>, key: KeyChord) -> ControlFlow<(), KeyOutcome> {
		if let Some(action) = inputbar_action(key) {
			trace!("inputbar key {} -> {:?}", key, action);
			match action {
				InputbarAction::Abort => self.abort_inputbar(ports),
				InputbarAction::Recall(direction) => {
					if let Some(line) = self.history.recall(direction).map(str::to_string) {
						self.inputbar.set_text(&line);
						self.inputbar_changed(ports);
					}
				}
				InputbarAction::Complete(request) => self.request_completion(ports, request),
				InputbarAction::DeleteLastChar => {
					if self.inputbar.char_count() <= 1 {
						self.abort_inputbar(ports);
					} else if self.inputbar.delete_before_cursor() {
						self.inputbar_changed(ports);
					}
				}
				InputbarAction::DeleteLastWord => {
					if self.inputbar.delete_word() {
						self.inputbar_changed(ports);
					}
				}
				InputbarAction::NextChar => self.inputbar.move_right(),
				InputbarAction::PreviousChar => self.inputbar.move_left(),
				InputbarAction::Submit => self.submit(ports)?,
			}
			return ControlFlow::Continue(KeyOutcome::Handled);
		}

		if key.modifiers.clean().intersects(Modifiers::CONTROL | Modifiers::ALT) {
			return ControlFlow::Continue(KeyOutcome::Ignored);
		}
		let Some(ch) = key.code.to_char() else {
			return ControlFlow::Continue(KeyOutcome::Ignored);
		};
		self.inputbar.insert_char(ch);
		self.inputbar_changed(ports);
		ControlFlow::Continue(KeyOutcome::Handled)
	}

	/// Hides completion and the inputbar and hands focus back to the view.
	pub(super) fn abort_inputbar(&mut self, ports: &mut Ports<'_>) {
		self.hide_completion(ports);
		ports.display.notify(NotifyLevel::Default, "");
		self.inputbar.dismiss();
	}

	pub(super) fn hide_completion(&mut self, ports: &mut Ports<'_>) {
		self.completion.hide();
		ports.display.hide_completion();
	}

	/// Runs after every edit of the inputbar text: live search for special
	/// commands that ask for it, then a completion re-check.
	pub(super) fn inputbar_changed(&mut self, ports: &mut Ports<'_>) {
		if let LineKind::Special { command, input } = parse_line(self.inputbar.text())
			&& command.always
			&& !input.is_empty()
		{
			if ports.has_view() {
				ports.view.search(input, command.direction);
			}
			self.last_search = Some((input.to_string(), command.direction));
		}

		let source = Candidates {
			search_engines: &self.search_engines,
			bookmarks:      &self.bookmarks,
			settings:       &self.settings,
		};
		if self.completion.refresh(self.inputbar.text(), &self.commands, &source) {
			self.sync_completion(ports);
		}
	}

	fn request_completion(&mut self, ports: &mut Ports<'_>, request: CompletionRequest) {
		let source = Candidates {
			search_engines: &self.search_engines,
			bookmarks:      &self.bookmarks,
			settings:       &self.settings,
		};
		if let Some(text) = self.completion.request(self.inputbar.text(), request, &self.commands, &source) {
			self.inputbar.set_text(&text);
		}
		self.sync_completion(ports);
	}

	fn sync_completion(&mut self, ports: &mut Ports<'_>) {
		match self.completion.view() {
			Some(view) => ports.display.show_completion(&view),
			None => ports.display.hide_completion(),
		}
	}
}
