use thiserror::Error;
use tracing::debug;
use url::Url;
use url::form_urlencoded::byte_serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEngine {
	pub name:     String,
	/// Query URI with `%s` where the encoded search terms go.
	pub template: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registered {
	Added,
	Replaced,
}

#[derive(Debug, Error)]
pub enum ResolveError {
	#[error("nothing to open")]
	Empty,
	#[error("search engine {name} does not exist")]
	NoSearchEngine { name: String },
}

#[derive(Debug, Clone, Default)]
pub struct SearchEngines {
	entries: Vec<SearchEngine>,
}

impl SearchEngines {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn entries(&self) -> &[SearchEngine] {
		&self.entries
	}

	pub fn find(&self, name: &str) -> Option<&SearchEngine> {
		self.entries.iter().find(|engine| engine.name == name)
	}

	pub fn register(&mut self, name: &str, template: &str) -> Registered {
		if let Some(engine) = self.entries.iter_mut().find(|engine| engine.name == name) {
			debug!("search engine replaced: {}", name);
			engine.template = template.to_string();
			return Registered::Replaced;
		}
		debug!("search engine added: {}", name);
		self.entries.push(SearchEngine { name: name.to_string(), template: template.to_string() });
		Registered::Added
	}

	/// Turns inputbar text into something the view can load.
	///
	/// `name terms...` expands through the named engine. A single token is a
	/// URI when it has a scheme separator, else a host to reach over http.
	pub fn resolve(&self, text: &str) -> Result<String, ResolveError> {
		let text = text.trim_start_matches(' ');
		let mut tokens = text.split_whitespace();
		let first = tokens.next().ok_or(ResolveError::Empty)?;
		let rest = tokens.collect::<Vec<_>>();

		if !rest.is_empty() {
			let engine = self
				.find(first)
				.ok_or_else(|| ResolveError::NoSearchEngine { name: first.to_string() })?;
			let query = byte_serialize(rest.join(" ").as_bytes()).collect::<String>();
			return Ok(engine.template.replace("%s", &query));
		}

		if first.contains(':') { Ok(first.to_string()) } else { Ok(format!("http://{first}")) }
	}
}

/// `uri` with its last `levels` path segments removed, query and fragment
/// dropped. `None` when `uri` has no hierarchical path.
pub fn parent_uri(uri: &str, levels: usize) -> Option<String> {
	let mut url = Url::parse(uri).ok()?;
	let depth = url.path_segments()?.count();
	{
		let mut segments = url.path_segments_mut().ok()?;
		segments.pop_if_empty();
		for _ in 0..levels.min(depth) {
			segments.pop();
		}
	}
	url.set_query(None);
	url.set_fragment(None);
	Some(url.into())
}

pub fn site_root(uri: &str) -> Option<String> {
	let mut url = Url::parse(uri).ok()?;
	if url.cannot_be_a_base() {
		return None;
	}
	url.set_path("/");
	url.set_query(None);
	url.set_fragment(None);
	Some(url.into())
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::{Registered, ResolveError, SearchEngines, parent_uri, site_root};

	fn engines() -> SearchEngines {
		let mut engines = SearchEngines::new();
		engines.register("ddg", "https://duckduckgo.com/?q=%s");
		engines.register("wiki", "https://en.wikipedia.org/w/index.php?search=%s");
		engines
	}

	#[test]
	fn register_should_replace_in_place() {
		let mut engines = engines();
		assert_eq!(engines.register("ddg", "https://html.duckduckgo.com/?q=%s"), Registered::Replaced);
		assert_eq!(engines.register("gh", "https://github.com/search?q=%s"), Registered::Added);
		let names = engines.entries().iter().map(|e| e.name.as_str()).collect::<Vec<_>>();
		assert_eq!(names, vec!["ddg", "wiki", "gh"]);
		assert_eq!(engines.find("ddg").map(|e| e.template.as_str()), Some("https://html.duckduckgo.com/?q=%s"));
	}

	#[test]
	fn resolve_should_expand_search_engine_queries() {
		let uri = engines().resolve("ddg rust & tokio").expect("resolves");
		assert_eq!(uri, "https://duckduckgo.com/?q=rust+%26+tokio");
	}

	#[test]
	fn resolve_should_keep_schemes_and_prefix_hosts() {
		let engines = engines();
		assert_eq!(engines.resolve("  about:blank").expect("resolves"), "about:blank");
		assert_eq!(engines.resolve("example.com").expect("resolves"), "http://example.com");
		assert_eq!(engines.resolve("https://rust-lang.org").expect("resolves"), "https://rust-lang.org");
	}

	#[test]
	fn resolve_should_reject_unknown_engine_and_empty_text() {
		let engines = engines();
		assert!(matches!(engines.resolve("bing rust"), Err(ResolveError::NoSearchEngine { name }) if name == "bing"));
		assert!(matches!(engines.resolve("   "), Err(ResolveError::Empty)));
	}

	#[test]
	fn parent_uri_should_strip_trailing_segments() {
		let uri = "https://example.com/a/b/c/?page=2#top";
		assert_eq!(parent_uri(uri, 1).as_deref(), Some("https://example.com/a/b"));
		assert_eq!(parent_uri(uri, 2).as_deref(), Some("https://example.com/a"));
		assert_eq!(parent_uri(uri, 9).as_deref(), Some("https://example.com/"));
		assert_eq!(parent_uri("about:blank", 1), None);
	}

	#[test]
	fn parent_uri_should_stop_at_the_root_for_huge_counts() {
		let uri = "https://example.com/a/b";
		assert_eq!(parent_uri(uri, usize::MAX).as_deref(), Some("https://example.com/"));
		assert_eq!(parent_uri(uri, u32::MAX as usize).as_deref(), Some("https://example.com/"));
	}

	#[test]
	fn site_root_should_drop_path_query_and_fragment() {
		assert_eq!(site_root("https://example.com/a/b?x=1#y").as_deref(), Some("https://example.com/"));
		assert_eq!(site_root("mailto:someone@example.com"), None);
	}
}
