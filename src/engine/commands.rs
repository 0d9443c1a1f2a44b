use std::ops::ControlFlow;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::Engine;
use crate::command::{CommandId, LineKind, parse_line};
use crate::config::directives;
use crate::paths::expand_home;
use crate::persistence::PersistenceError;
use crate::ports::{HistoryDirection, NotifyLevel, OpenTarget, PersistenceSink, Ports, SurfaceError};
use crate::settings::SettingError;
use crate::shortcut::MapError;
use crate::uri::ResolveError;

#[derive(Debug, Error)]
pub enum CommandError {
	#[error("{0}")]
	Usage(&'static str),
	#[error(transparent)]
	Map(#[from] MapError),
	#[error(transparent)]
	Setting(#[from] SettingError),
	#[error(transparent)]
	Resolve(#[from] ResolveError),
	#[error("could not read script {path}")]
	ReadScript {
		path:   PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error(transparent)]
	Surface(#[from] SurfaceError),
	#[error(transparent)]
	Persistence(#[from] PersistenceError),
}

impl Engine {
	/// Executes the inputbar line.
	///
	/// The raw line always goes to history first. A handler that succeeds
	/// dismisses the inputbar; one that fails leaves it on screen with an
	/// error notification. Either way completion closes and focus returns to
	/// the view.
	pub fn submit(&mut self, ports: &mut Ports<'_>) -> ControlFlow<()> {
		let line = self.inputbar.text().to_string();
		// Nothing after the identifier: not even whitespace.
		if line.chars().nth(1).is_none() {
			self.abort_inputbar(ports);
			return ControlFlow::Continue(());
		}
		self.history.push(line.as_str());
		let kind = parse_line(&line);

		let flow = match kind {
			LineKind::Empty => ControlFlow::Continue(()),
			LineKind::Special { command, input } => {
				if !command.always {
					if ports.has_view() {
						ports.view.search(input, command.direction);
					}
					self.last_search = Some((input.to_string(), command.direction));
				}
				self.abort_inputbar(ports);
				return ControlFlow::Continue(());
			}
			LineKind::Command { name, args } => self.run_command(ports, name, &args),
		};

		self.hide_completion(ports);
		self.inputbar.unfocus();
		flow
	}

	fn run_command(&mut self, ports: &mut Ports<'_>, name: &str, args: &[&str]) -> ControlFlow<()> {
		let Some(id) = self.commands.resolve(name).map(|(_, spec)| spec.id) else {
			warn!("unknown command: {}", name);
			ports.display.notify(NotifyLevel::Error, &format!("Unknown command: {name}"));
			return ControlFlow::Continue(());
		};

		debug!("command {:?} with {} arguments", id, args.len());
		match self.execute(ports, id, args) {
			Ok(flow) => {
				self.inputbar.dismiss();
				flow
			}
			Err(err) => {
				warn!("command {} failed: {}", name, err);
				ports.display.notify(NotifyLevel::Error, &err.to_string());
				ControlFlow::Continue(())
			}
		}
	}

	/// Runs one line command with its residual tokens.
	pub fn execute(
		&mut self,
		ports: &mut Ports<'_>,
		id: CommandId,
		args: &[&str],
	) -> Result<ControlFlow<()>, CommandError> {
		match id {
			CommandId::Back | CommandId::Forward => {
				if ports.has_view() {
					let direction =
						if id == CommandId::Back { HistoryDirection::Back } else { HistoryDirection::Forward };
					ports.view.navigate_history(direction);
				}
			}
			CommandId::Bookmark => self.bookmark(ports, args)?,
			CommandId::Map => {
				self.shortcuts.map(args)?;
			}
			CommandId::Open | CommandId::TabOpen | CommandId::WinOpen => {
				if args.is_empty() {
					return Ok(ControlFlow::Continue(()));
				}
				let target = match id {
					CommandId::TabOpen => OpenTarget::NewTab,
					CommandId::WinOpen => OpenTarget::NewWindow,
					_ => OpenTarget::Current,
				};
				let uri = self.search_engines.resolve(&args.join(" "))?;
				ports.view.open(&uri, target);
			}
			CommandId::Quit => self.close_tab(ports),
			CommandId::QuitAll => {
				info!("quitall requested");
				return Ok(ControlFlow::Break(()));
			}
			CommandId::Reload => {
				if ports.has_view() {
					ports.view.reload(false);
				}
			}
			CommandId::ReloadAll => ports.view.reload_all(),
			CommandId::SaveAs => self.save_as(ports, args)?,
			CommandId::Script => {
				if args.is_empty() {
					return Err(CommandError::Usage("script needs a file name"));
				}
				let path = expand_home(&args.join(" "));
				let source = std::fs::read_to_string(&path)
					.map_err(|source| CommandError::ReadScript { path: path.clone(), source })?;
				if ports.has_view() {
					ports.view.run_script(&source)?;
				}
			}
			CommandId::SearchEngine => {
				let [name, template, ..] = args else {
					return Err(CommandError::Usage("searchengine needs a name and a URI template"));
				};
				self.search_engines.register(name, template);
			}
			CommandId::Set => {
				let changed = self.settings.set(args)?;
				self.apply_changed(ports, &changed);
			}
			CommandId::Stop => {
				if ports.has_view() {
					ports.view.stop_loading();
				}
			}
			CommandId::Write => self.write_state(ports.persistence)?,
		}
		Ok(ControlFlow::Continue(()))
	}

	fn bookmark(&mut self, ports: &mut Ports<'_>, args: &[&str]) -> Result<(), CommandError> {
		let uri = if args.is_empty() { ports.view.current_uri() } else { Some(args.join(" ")) };
		let Some(uri) = uri else {
			return Err(CommandError::Usage("bmark needs a URI"));
		};
		if !self.bookmarks.contains(&uri) {
			debug!("bookmark added: {}", uri);
			self.bookmarks.push(uri.clone());
		}
		ports.display.notify(NotifyLevel::Default, &format!("Bookmarked {uri}"));
		Ok(())
	}

	/// Relative paths land in the download directory.
	fn save_as(&mut self, ports: &mut Ports<'_>, args: &[&str]) -> Result<(), CommandError> {
		if args.is_empty() {
			return Err(CommandError::Usage("saveas needs a file name"));
		}
		let mut path = expand_home(&args.join(" "));
		if path.is_relative() {
			path = expand_home(self.settings.string("download_dir")).join(path);
		}
		ports.view.save_as(&path)?;
		ports.display.notify(NotifyLevel::Default, &format!("Saved {}", path.display()));
		Ok(())
	}

	/// Flushes command history and bookmarks.
	pub fn write_state(&self, persistence: &mut dyn PersistenceSink) -> Result<(), PersistenceError> {
		persistence.save_history(self.history.entries())?;
		persistence.save_bookmarks(&self.bookmarks)
	}

	/// Applies rc file text. Bad lines are reported and skipped. Returns the
	/// number of lines that failed.
	pub fn apply_config(&mut self, ports: &mut Ports<'_>, text: &str) -> usize {
		let mut failed = 0;
		for directive in directives(text) {
			let id = match directive.name {
				"set" => CommandId::Set,
				"map" => CommandId::Map,
				"searchengine" => CommandId::SearchEngine,
				other => {
					warn!("config line {}: unknown directive {}", directive.line, other);
					ports
						.display
						.notify(NotifyLevel::Warning, &format!("Unknown directive on line {}: {other}", directive.line));
					failed += 1;
					continue;
				}
			};
			if let Err(err) = self.execute(ports, id, &directive.args) {
				warn!("config line {}: {}", directive.line, err);
				ports.display.notify(NotifyLevel::Error, &format!("Line {}: {err}", directive.line));
				failed += 1;
			}
		}
		failed
	}
}
