use std::ops::ControlFlow;

use pretty_assertions::assert_eq;

use super::common::{Harness, START_URI, test_harness};
use crate::completion::CompletionState;
use crate::engine::KeyOutcome;
use crate::key::{KeyChord, KeyCode, Modifiers};
use crate::ports::{NotifyLevel, SearchDirection};

fn completion_labels(h: &Harness) -> Vec<String> {
	h.display
		.completion
		.as_ref()
		.map(|view| view.rows.iter().map(|row| row.label.clone()).collect())
		.unwrap_or_default()
}

#[test]
fn colon_should_focus_inputbar_and_swallow_keys() {
	let mut h = test_harness();
	h.type_keys(":jk");
	assert!(h.engine.inputbar().is_focused());
	assert_eq!(h.engine.inputbar().text(), ":jk");
	assert_eq!(h.view.vertical.value, 0.0);
	assert_eq!(h.dispatch(KeyChord::ctrl('x')), ControlFlow::Continue(KeyOutcome::Ignored));
}

#[test]
fn shifted_open_should_prefill_current_uri() {
	let mut h = test_harness();
	h.press(KeyChord::new(Modifiers::SHIFT, KeyCode::from_char('O')));
	assert_eq!(h.engine.inputbar().text(), format!(":open {START_URI}"));
	assert_eq!(h.engine.inputbar().cursor(), h.engine.inputbar().char_count());
}

#[test]
fn history_keys_should_recall_submitted_lines() {
	let mut h = test_harness();
	h.submit(":open a.example");
	h.submit(":open b.example");

	h.type_keys(":");
	h.press_code(KeyCode::UP);
	assert_eq!(h.engine.inputbar().text(), ":open b.example");
	h.press_code(KeyCode::UP);
	assert_eq!(h.engine.inputbar().text(), ":open a.example");
	h.press_code(KeyCode::UP);
	assert_eq!(h.engine.inputbar().text(), ":open b.example");
	h.press_code(KeyCode::DOWN);
	assert_eq!(h.engine.inputbar().text(), ":open a.example");
}

#[test]
fn backspace_should_edit_and_abort_on_last_char() {
	let mut h = test_harness();
	h.type_keys(":ab");
	h.press_code(KeyCode::BACKSPACE);
	assert_eq!(h.engine.inputbar().text(), ":a");
	h.press_ctrl('h');
	assert_eq!(h.engine.inputbar().text(), ":");

	h.press_code(KeyCode::BACKSPACE);
	assert!(!h.engine.inputbar().is_visible());
	assert!(!h.engine.inputbar().is_focused());
	assert!(h.engine.history().is_empty());
}

#[test]
fn ctrl_w_should_delete_back_to_separator() {
	let mut h = test_harness();
	h.type_keys(":open http://example.com/docs");
	h.press_ctrl('w');
	assert_eq!(h.engine.inputbar().text(), ":open http://example.com/");
	h.press_ctrl('w');
	assert_eq!(h.engine.inputbar().text(), ":open http://example.");
}

#[test]
fn cursor_keys_should_move_insertion_point() {
	let mut h = test_harness();
	h.type_keys(":ab");
	h.press_ctrl('b');
	h.type_keys("X");
	assert_eq!(h.engine.inputbar().text(), ":aXb");
	h.press_ctrl('f');
	h.type_keys("é");
	assert_eq!(h.engine.inputbar().text(), ":aXbé");
}

#[test]
fn escape_should_abort_and_clear_notification() {
	let mut h = test_harness();
	h.type_keys(":open");
	h.press_code(KeyCode::ESCAPE);
	assert!(!h.engine.inputbar().is_visible());
	assert_eq!(h.display.notifications.last(), Some(&(NotifyLevel::Default, String::new())));
	assert_eq!(h.engine.inputbar().text(), "");
}

#[test]
fn tab_should_cycle_command_names_until_edited() {
	let mut h = test_harness();
	h.type_keys(":s");
	h.press_code(KeyCode::TAB);
	assert_eq!(h.engine.inputbar().text(), ":saveas");
	assert_eq!(completion_labels(&h), vec!["saveas", "script", "searchengine", "set", "stop"]);
	assert_eq!(h.display.completion.as_ref().and_then(|view| view.current), Some(0));

	h.press_code(KeyCode::TAB);
	assert_eq!(h.engine.inputbar().text(), ":script");
	h.press_shifted(KeyCode::ISO_LEFT_TAB);
	assert_eq!(h.engine.inputbar().text(), ":saveas");
	assert_eq!(h.engine.completion().state(), CompletionState::CommandList);

	h.type_keys("x");
	assert_eq!(h.engine.completion().state(), CompletionState::Idle);
	assert_eq!(h.display.completion, None);
}

#[test]
fn tab_should_complete_option_names() {
	let mut h = test_harness();
	h.type_keys(":set scr");
	h.press_code(KeyCode::TAB);
	assert_eq!(h.engine.inputbar().text(), ":set scripts");
	h.press_code(KeyCode::TAB);
	assert_eq!(h.engine.inputbar().text(), ":set scroll_step");
	assert_eq!(h.engine.completion().state(), CompletionState::ArgumentList);

	h.press_code(KeyCode::RETURN);
	assert_eq!(h.display.completion, None);
	assert_eq!(h.engine.completion().state(), CompletionState::Idle);
}

#[test]
fn group_navigation_should_jump_between_open_sources() {
	let mut h = test_harness();
	h.engine.restore(Vec::new(), vec!["http://a.example".to_string(), "http://b.example".to_string()]);
	h.submit(":searchengine ddg https://duckduckgo.com/?q=%s");

	h.type_keys("o");
	assert_eq!(h.engine.inputbar().text(), ":open ");
	h.press_code(KeyCode::TAB);
	assert_eq!(h.engine.inputbar().text(), ":open ddg");
	assert_eq!(
		completion_labels(&h),
		vec!["Search engines", "ddg", "Bookmarks", "http://a.example", "http://b.example"]
	);

	h.press(KeyChord::new(Modifiers::CONTROL, KeyCode::TAB));
	assert_eq!(h.engine.inputbar().text(), ":open http://a.example");
	h.press_code(KeyCode::TAB);
	assert_eq!(h.engine.inputbar().text(), ":open http://b.example");
}

#[test]
fn slash_should_search_live_and_arm_repeat() {
	let mut h = test_harness();
	h.type_keys("/foo");
	assert_eq!(
		h.view.searches,
		vec![
			("f".to_string(), SearchDirection::Forward),
			("fo".to_string(), SearchDirection::Forward),
			("foo".to_string(), SearchDirection::Forward),
		]
	);
	h.press_code(KeyCode::RETURN);
	assert!(!h.engine.inputbar().is_visible());
	assert_eq!(h.engine.history().entries(), ["/foo".to_string()]);
	assert_eq!(h.engine.last_search(), Some(("foo", SearchDirection::Forward)));

	h.type_keys("nN");
	assert_eq!(
		h.view.searches[3..],
		[("foo".to_string(), SearchDirection::Forward), ("foo".to_string(), SearchDirection::Backward)]
	);
}

#[test]
fn question_mark_should_search_backward() {
	let mut h = test_harness();
	h.type_keys("?bar");
	assert_eq!(h.view.searches.last(), Some(&("bar".to_string(), SearchDirection::Backward)));
	h.press_code(KeyCode::RETURN);
	h.type_keys("N");
	assert_eq!(h.view.searches.last(), Some(&("bar".to_string(), SearchDirection::Forward)));
}
