#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall {
	Previous,
	Next,
}

/// Submitted inputbar lines, oldest first. Never deduplicated.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
	entries: Vec<String>,
	cursor:  Option<usize>,
}

impl CommandHistory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_entries(entries: Vec<String>) -> Self {
		Self { entries, cursor: None }
	}

	pub fn entries(&self) -> &[String] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn push(&mut self, line: impl Into<String>) {
		self.entries.push(line.into());
		self.cursor = None;
	}

	/// Steps the recall cursor circularly. From rest, `Previous` lands on the
	/// newest entry and `Next` on the oldest.
	pub fn recall(&mut self, direction: Recall) -> Option<&str> {
		let len = self.entries.len();
		if len == 0 {
			return None;
		}
		let next = match (self.cursor, direction) {
			(None, Recall::Previous) => len - 1,
			(None, Recall::Next) => 0,
			(Some(current), Recall::Previous) => (current + len - 1) % len,
			(Some(current), Recall::Next) => (current + 1) % len,
		};
		self.cursor = Some(next);
		self.entries.get(next).map(String::as_str)
	}

	pub fn reset_cursor(&mut self) {
		self.cursor = None;
	}
}
