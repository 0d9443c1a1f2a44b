/// Characters that end a word for `delete_word`.
const WORD_SEPARATORS: &[char] = &[' ', '/', '.', '-', '=', '&', '#', '?'];

/// Text entry line under the view. The cursor is a char index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inputbar {
	text:    String,
	cursor:  usize,
	visible: bool,
	focused: bool,
}

impl Inputbar {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn cursor(&self) -> usize {
		self.cursor
	}

	pub fn is_visible(&self) -> bool {
		self.visible
	}

	pub fn is_focused(&self) -> bool {
		self.focused
	}

	pub fn char_count(&self) -> usize {
		self.text.chars().count()
	}

	/// Shows and focuses the bar with `text`, cursor at the end.
	pub fn open(&mut self, text: &str) {
		self.visible = true;
		self.focused = true;
		self.set_text(text);
	}

	pub fn show(&mut self) {
		self.visible = true;
	}

	/// Hides and clears the bar.
	pub fn dismiss(&mut self) {
		self.text.clear();
		self.cursor = 0;
		self.visible = false;
		self.focused = false;
	}

	pub fn unfocus(&mut self) {
		self.focused = false;
	}

	pub fn set_text(&mut self, text: &str) {
		self.text = text.to_string();
		self.cursor = self.char_count();
	}

	pub fn insert_char(&mut self, ch: char) {
		let at = self.byte_offset(self.cursor);
		self.text.insert(at, ch);
		self.cursor += 1;
	}

	/// Removes the char before the cursor. Returns false at the start.
	pub fn delete_before_cursor(&mut self) -> bool {
		if self.cursor == 0 {
			return false;
		}
		let at = self.byte_offset(self.cursor - 1);
		self.text.remove(at);
		self.cursor -= 1;
		true
	}

	/// Removes from the last word separator before the cursor up to the cursor,
	/// keeping the separator itself. Separators right before the cursor are
	/// skipped first.
	pub fn delete_word(&mut self) -> bool {
		if self.cursor == 0 {
			return false;
		}
		let before = self.text.chars().take(self.cursor).collect::<Vec<_>>();
		let mut start = before.len();
		while start > 0 && WORD_SEPARATORS.contains(&before[start - 1]) {
			start -= 1;
		}
		while start > 0 && !WORD_SEPARATORS.contains(&before[start - 1]) {
			start -= 1;
		}

		let from = self.byte_offset(start);
		let to = self.byte_offset(self.cursor);
		self.text.replace_range(from..to, "");
		self.cursor = start;
		true
	}

	pub fn move_left(&mut self) {
		self.cursor = self.cursor.saturating_sub(1);
	}

	pub fn move_right(&mut self) {
		self.cursor = (self.cursor + 1).min(self.char_count());
	}

	fn byte_offset(&self, char_index: usize) -> usize {
		self.text.char_indices().nth(char_index).map_or(self.text.len(), |(offset, _)| offset)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::Inputbar;

	#[test]
	fn open_should_focus_and_place_cursor_at_end() {
		let mut bar = Inputbar::new();
		bar.open(":open ");
		assert!(bar.is_visible());
		assert!(bar.is_focused());
		assert_eq!(bar.cursor(), 6);
	}

	#[test]
	fn insert_and_delete_should_follow_cursor() {
		let mut bar = Inputbar::new();
		bar.open(":sé");
		bar.move_left();
		bar.insert_char('x');
		assert_eq!(bar.text(), ":sxé");
		assert_eq!(bar.cursor(), 3);

		assert!(bar.delete_before_cursor());
		assert_eq!(bar.text(), ":sé");
		bar.move_right();
		bar.move_right();
		assert_eq!(bar.cursor(), 3);
	}

	#[test]
	fn delete_word_should_stop_at_separators() {
		let mut bar = Inputbar::new();
		bar.open(":open example.com/path");
		assert!(bar.delete_word());
		assert_eq!(bar.text(), ":open example.com/");
		assert!(bar.delete_word());
		assert_eq!(bar.text(), ":open example.");
		assert!(bar.delete_word());
		assert_eq!(bar.text(), ":open ");
		assert!(bar.delete_word());
		assert_eq!(bar.text(), "");
		assert!(!bar.delete_word());
	}

	#[test]
	fn dismiss_should_clear_and_hide() {
		let mut bar = Inputbar::new();
		bar.open(":set");
		bar.dismiss();
		assert_eq!(bar, Inputbar::new());
	}
}
