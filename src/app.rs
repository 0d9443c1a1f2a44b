use std::ops::ControlFlow;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event;
use flume::RecvTimeoutError;
use thiserror::Error;
use tracing::{error, info, trace, warn};

use crate::config::{ConfigError, default_rc_path, load_rc};
use crate::engine::Engine;
use crate::input::{HostEvent, InputHandler};
use crate::mode::Mode;
use crate::persistence::{FilePersistence, PersistenceError};
use crate::paths::user_data_dir;
use crate::ports::{NotifyLevel, Ports};
use crate::sequence::SequenceError;
use crate::ui::{DisplayState, Renderer, TerminalSession, TerminalSessionError};
use crate::view::TerminalView;

#[derive(Debug, Error)]
pub enum AppError {
	#[error("build key sequence table failed")]
	Sequences {
		#[source]
		source: SequenceError,
	},
	#[error("load rc file failed")]
	Config {
		#[source]
		source: ConfigError,
	},
	#[error(transparent)]
	Terminal(#[from] TerminalSessionError),
	#[error("save history and bookmarks failed")]
	Persistence {
		#[source]
		source: PersistenceError,
	},
	#[error("event bus disconnected")]
	EventBus,
}

/// Startup choices taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
	pub config: Option<PathBuf>,
	pub uris:   Vec<String>,
}

pub struct App {
	engine:      Engine,
	view:        TerminalView,
	display:     DisplayState,
	persistence: FilePersistence,
	renderer:    Renderer,
	event_tx:    flume::Sender<HostEvent>,
	event_rx:    flume::Receiver<HostEvent>,
	save_timer:  AutoSaveTimer,
}

/// Deadline for the next `auto_save` flush, counted from the last one.
#[derive(Debug, Clone, Copy)]
struct AutoSaveTimer {
	last_save: Instant,
}

impl AutoSaveTimer {
	fn new(now: Instant) -> Self {
		Self { last_save: now }
	}

	/// `None` while auto save is off.
	fn deadline(&self, interval: i64) -> Option<Instant> {
		if interval <= 0 {
			return None;
		}
		self.last_save.checked_add(Duration::from_secs(interval.unsigned_abs()))
	}

	fn is_due(&self, now: Instant, interval: i64) -> bool {
		self.deadline(interval).is_some_and(|deadline| now >= deadline)
	}

	fn mark_saved(&mut self, now: Instant) {
		self.last_save = now;
	}
}

impl App {
	pub fn new() -> Result<Self, AppError> {
		let mut engine = Engine::new().map_err(|source| AppError::Sequences { source })?;
		let persistence = FilePersistence::new(user_data_dir());
		let history = persistence.load_history().unwrap_or_else(|err| {
			warn!("history not restored: {}", err);
			Vec::new()
		});
		let bookmarks = persistence.load_bookmarks().unwrap_or_else(|err| {
			warn!("bookmarks not restored: {}", err);
			Vec::new()
		});
		engine.restore(history, bookmarks);

		let (event_tx, event_rx) = flume::bounded(1024);
		Ok(Self {
			engine,
			view: TerminalView::new(),
			display: DisplayState::new(),
			persistence,
			renderer: Renderer::new(),
			event_tx,
			event_rx,
			save_timer: AutoSaveTimer::new(Instant::now()),
		})
	}

	pub fn run(mut self, options: LaunchOptions) -> Result<(), AppError> {
		let rc_path = options.config.unwrap_or_else(default_rc_path);
		let rc = load_rc(&rc_path).map_err(|source| AppError::Config { source })?;

		let mut session = TerminalSession::enter("rove")?;
		{
			let mut ports = Ports::new(&mut self.view, &mut self.display, &mut self.persistence);
			if let Some(text) = rc {
				let failed = self.engine.apply_config(&mut ports, &text);
				if failed > 0 {
					warn!("{} rc lines in {} failed", failed, rc_path.display());
				}
			}
			self.engine.start(&mut ports, &options.uris);
		}
		self.start_input_pump();

		loop {
			session.draw(|frame| self.renderer.render(frame, &self.engine, &mut self.view, &self.display))?;
			session.sync_cursor_style(self.typing())?;
			trace!("redraw");
			self.view.settle();

			let event = self.next_event()?;
			if self.save_timer.is_due(Instant::now(), self.auto_save_interval()) {
				self.auto_save();
			}
			let Some(event) = event else {
				continue;
			};
			match event {
				HostEvent::Key(key) => {
					self.display.clear_notification();
					let mut ports = Ports::new(&mut self.view, &mut self.display, &mut self.persistence);
					if let ControlFlow::Break(()) = self.engine.handle_key(&mut ports, key) {
						break;
					}
				}
				HostEvent::Resized { width, height } => {
					trace!("terminal resized to {}x{}", width, height);
					self.renderer.mark_layout_dirty();
				}
			}
		}

		drop(session);
		info!("session ended");
		self.engine
			.write_state(&mut self.persistence)
			.map_err(|source| AppError::Persistence { source })
	}

	fn auto_save_interval(&self) -> i64 {
		self.engine.settings().int("auto_save")
	}

	/// Waits for input, or until the next auto save is due (`None`).
	fn next_event(&self) -> Result<Option<HostEvent>, AppError> {
		let Some(deadline) = self.save_timer.deadline(self.auto_save_interval()) else {
			return self.event_rx.recv().map(Some).map_err(|err| {
				error!("event bus disconnected while waiting for next event: {}", err);
				AppError::EventBus
			});
		};
		match self.event_rx.recv_deadline(deadline) {
			Ok(event) => Ok(Some(event)),
			Err(RecvTimeoutError::Timeout) => Ok(None),
			Err(RecvTimeoutError::Disconnected) => {
				error!("event bus disconnected while waiting for next event");
				Err(AppError::EventBus)
			}
		}
	}

	fn auto_save(&mut self) {
		self.save_timer.mark_saved(Instant::now());
		if let Err(err) = self.engine.write_state(&mut self.persistence) {
			warn!("auto save failed: {}", err);
			self.display.notification = Some((NotifyLevel::Error, err.to_string()));
		}
	}

	fn typing(&self) -> bool {
		self.engine.inputbar().is_focused() || self.engine.mode() == Mode::Insert
	}

	fn start_input_pump(&self) {
		let event_tx = self.event_tx.clone();
		let input_handler = InputHandler::new();
		thread::spawn(move || {
			loop {
				let evt = match event::read() {
					Ok(evt) => evt,
					Err(err) => {
						error!("input pump stopped: failed to read terminal event: {}", err);
						break;
					}
				};
				let Some(host_event) = input_handler.event(&evt) else {
					continue;
				};
				if let Err(err) = event_tx.send(host_event) {
					error!("input pump stopped: failed to send event to event bus: {}", err);
					break;
				}
			}
		});
	}
}
