use std::ops::ControlFlow;

use tracing::{debug, info, trace, warn};

use super::Engine;
use crate::action::{ActionKind, ArgTag, ArgValue, Argument};
use crate::mode::Mode;
use crate::ports::{Axis, FollowStep, HistoryDirection, NotifyLevel, OpenTarget, Ports};
use crate::sequence::leading_count;
use crate::settings::Changed;
use crate::uri::{parent_uri, site_root};

impl Engine {
	/// Runs one action. `buffer` is the matched buffer text for actions fired
	/// by a buffer sequence, so counted variants can read their count.
	pub fn apply(
		&mut self,
		ports: &mut Ports<'_>,
		action: ActionKind,
		argument: &Argument,
		buffer: Option<&str>,
	) -> ControlFlow<()> {
		trace!("apply {} {:?}", action.name(), argument.value);
		match action {
			ActionKind::Abort => self.abort(ports),
			ActionKind::ChangeBuffer => self.change_buffer(ports),
			ActionKind::ChangeMode => self.change_mode(ports, argument),
			ActionKind::CloseTab => self.close_tab(ports),
			ActionKind::FocusInputbar => self.focus_inputbar(ports, argument),
			ActionKind::FollowLink => self.follow_link(ports, argument),
			ActionKind::NavHistory => nav_history(ports, argument),
			ActionKind::NavTabs => nav_tabs(ports, argument, buffer),
			ActionKind::Paste => self.paste(ports, argument),
			ActionKind::Proxy => self.toggle_proxy(ports),
			ActionKind::Reload => {
				if ports.has_view() {
					ports.view.reload(argument.is_tag(ArgTag::BypassCache));
				}
			}
			ActionKind::Script => run_script(ports, argument),
			ActionKind::Scroll => self.scroll(ports, argument, buffer),
			ActionKind::Search => self.repeat_search(ports, argument),
			ActionKind::ToggleStatusbar => self.toggle_option(ports, "statusbar"),
			ActionKind::ToggleTabbar => self.toggle_option(ports, "tabbar"),
			ActionKind::ToggleSourcecode => {
				if ports.has_view() {
					ports.view.toggle_source_view();
				}
			}
			ActionKind::Quit => {
				info!("quit requested");
				return ControlFlow::Break(());
			}
			ActionKind::Yank => yank(ports),
			ActionKind::Zoom => self.zoom(ports, argument, buffer),
			ActionKind::GoHome => self.go_home(ports, argument),
			ActionKind::GoParent => go_parent(ports, argument, buffer),
		}
		ControlFlow::Continue(())
	}

	/// Drops the pending buffer, leaves any mode for Normal and hides the
	/// inputbar.
	pub(super) fn abort(&mut self, ports: &mut Ports<'_>) {
		self.clear_buffer(ports);
		if self.mode.current() == Mode::Follow && ports.has_view() {
			ports.view.follow_link(FollowStep::Cancel);
		}
		self.set_mode(ports, Mode::Normal);
		if self.completion.hide() {
			ports.display.hide_completion();
		}
		self.inputbar.dismiss();
	}

	fn change_buffer(&mut self, ports: &mut Ports<'_>) {
		if self.buffer.pop().is_some() {
			ports.display.show_buffer(&self.buffer);
		}
	}

	fn change_mode(&mut self, ports: &mut Ports<'_>, argument: &Argument) {
		let mode = match &argument.value {
			ArgValue::Mode(mode) => *mode,
			ArgValue::Text(name) => match Mode::from_name(name) {
				Some(mode) => mode,
				None => {
					warn!("change_mode with unknown mode name: {}", name);
					ports.display.notify(NotifyLevel::Warning, &format!("Unknown mode: {name}"));
					return;
				}
			},
			ArgValue::Tag(_) | ArgValue::None => Mode::Normal,
		};
		self.set_mode(ports, mode);
	}

	/// Closes the current tab; the last tab goes back to the home page instead.
	pub(super) fn close_tab(&mut self, ports: &mut Ports<'_>) {
		if !ports.has_view() {
			return;
		}
		if ports.view.tab_count() > 1 {
			ports.view.close_tab();
		} else {
			ports.view.open(self.settings.string("homepage"), OpenTarget::Current);
		}
	}

	fn focus_inputbar(&mut self, ports: &mut Ports<'_>, argument: &Argument) {
		let Some(prefix) = argument.as_text() else {
			self.inputbar.show();
			return;
		};
		let mut text = prefix.to_string();
		if argument.append_uri
			&& let Some(uri) = ports.view.current_uri()
		{
			text.push_str(&uri);
		}
		self.inputbar.open(&text);
		self.inputbar_changed(ports);
	}

	fn follow_link(&mut self, ports: &mut Ports<'_>, argument: &Argument) {
		if !ports.has_view() {
			return;
		}
		match argument.as_tag() {
			None => {
				ports.view.follow_link(FollowStep::Start { new_tab: false });
				self.set_mode(ports, Mode::Follow);
			}
			Some(ArgTag::NewTab) => {
				ports.view.follow_link(FollowStep::Start { new_tab: true });
				self.set_mode(ports, Mode::Follow);
			}
			Some(ArgTag::Confirm) => {
				ports.view.follow_link(FollowStep::Confirm);
				self.set_mode(ports, Mode::Normal);
			}
			Some(ArgTag::DeleteLastChar) => ports.view.follow_link(FollowStep::Backspace),
			Some(tag) => debug!("follow_link ignores {:?}", tag),
		}
	}

	fn paste(&mut self, ports: &mut Ports<'_>, argument: &Argument) {
		let text = ports.view.clipboard_text().filter(|text| !text.trim().is_empty());
		let Some(text) = text else {
			ports.display.notify(NotifyLevel::Warning, "Clipboard is empty");
			return;
		};
		let target = if argument.is_tag(ArgTag::NewTab) { OpenTarget::NewTab } else { OpenTarget::Current };
		self.open_resolved(ports, &text, target);
	}

	fn toggle_proxy(&mut self, ports: &mut Ports<'_>) {
		if self.proxy_enabled {
			self.proxy_enabled = false;
			ports.view.set_proxy(None);
			ports.display.notify(NotifyLevel::Default, "Proxy disabled");
			return;
		}
		let proxy = self.settings.string("proxy");
		if proxy.is_empty() {
			ports.display.notify(NotifyLevel::Warning, "No proxy defined");
			return;
		}
		ports.view.set_proxy(Some(proxy));
		self.proxy_enabled = true;
		ports.display.notify(NotifyLevel::Default, "Proxy enabled");
	}

	fn scroll(&mut self, ports: &mut Ports<'_>, argument: &Argument, buffer: Option<&str>) {
		if !ports.has_view() {
			return;
		}
		let tag = argument.as_tag();

		if tag == Some(ArgTag::Specific) {
			let Some(viewport) = ports.view.viewport(Axis::Vertical) else {
				return;
			};
			let percent = buffer.and_then(leading_count).unwrap_or(0).min(100);
			ports.view.set_scroll(Axis::Vertical, viewport.max() * f64::from(percent) / 100.0);
			return;
		}

		let axis = match tag {
			Some(ArgTag::Left | ArgTag::Right) => Axis::Horizontal,
			_ => Axis::Vertical,
		};
		let Some(viewport) = ports.view.viewport(axis) else {
			return;
		};
		let step = self.settings.float("scroll_step");
		let page = viewport.page_size;
		let value = match tag {
			Some(ArgTag::FullUp) => viewport.value - page,
			Some(ArgTag::FullDown) => viewport.value + page,
			Some(ArgTag::HalfUp) => viewport.value - page / 2.0,
			Some(ArgTag::HalfDown) => viewport.value + page / 2.0,
			Some(ArgTag::Left | ArgTag::Up) => viewport.value - step,
			Some(ArgTag::Top) => 0.0,
			Some(ArgTag::Bottom) => viewport.max(),
			_ => viewport.value + step,
		};
		ports.view.set_scroll(axis, viewport.clamp(value));
	}

	/// Repeats the last inputbar search; `backward` flips its direction.
	fn repeat_search(&mut self, ports: &mut Ports<'_>, argument: &Argument) {
		let Some((query, direction)) = &self.last_search else {
			return;
		};
		let direction = if argument.is_tag(ArgTag::Backward) { direction.reversed() } else { *direction };
		if ports.has_view() {
			ports.view.search(query, direction);
		}
	}

	fn toggle_option(&mut self, ports: &mut Ports<'_>, name: &str) {
		match self.settings.set(&[name]) {
			Ok(changed) => self.apply_changed(ports, &changed),
			Err(err) => warn!("toggle {} failed: {}", name, err),
		}
	}

	/// Propagates a changed option to whoever renders or uses it.
	pub(super) fn apply_changed(&mut self, ports: &mut Ports<'_>, changed: &Changed) {
		match changed.name {
			"statusbar" => ports.display.set_statusbar_visible(self.settings.bool("statusbar")),
			"tabbar" => ports.display.set_tabbar_visible(self.settings.bool("tabbar")),
			"proxy" if self.proxy_enabled => {
				let proxy = self.settings.string("proxy");
				ports.view.set_proxy((!proxy.is_empty()).then_some(proxy));
			}
			_ => {}
		}
		if let Some(property) = changed.view_property {
			ports.view.apply_setting(property, &changed.value);
		}
	}

	fn zoom(&mut self, ports: &mut Ports<'_>, argument: &Argument, buffer: Option<&str>) {
		if !ports.has_view() {
			return;
		}
		let Some(level) = ports.view.zoom_level() else {
			return;
		};
		let step = self.settings.float("zoom_step") / 100.0;
		let level = match argument.as_tag() {
			Some(ArgTag::ZoomIn) => level + step,
			Some(ArgTag::ZoomOut) => level - step,
			Some(ArgTag::ZoomOriginal) => 1.0,
			Some(ArgTag::Specific) => match buffer.and_then(leading_count) {
				Some(percent) => f64::from(percent) / 100.0,
				None => return,
			},
			_ => return,
		};
		ports.view.set_zoom_level(level);
	}

	fn go_home(&mut self, ports: &mut Ports<'_>, argument: &Argument) {
		let target = if argument.is_tag(ArgTag::NewTab) { OpenTarget::NewTab } else { OpenTarget::Current };
		ports.view.open(self.settings.string("homepage"), target);
	}

	/// Resolves inputbar style text and opens it, reporting resolution errors.
	pub(super) fn open_resolved(&mut self, ports: &mut Ports<'_>, text: &str, target: OpenTarget) {
		match self.search_engines.resolve(text) {
			Ok(uri) => ports.view.open(&uri, target),
			Err(err) => {
				warn!("open '{}' failed: {}", text, err);
				ports.display.notify(NotifyLevel::Error, &err.to_string());
			}
		}
	}
}

fn nav_history(ports: &mut Ports<'_>, argument: &Argument) {
	if !ports.has_view() {
		return;
	}
	match argument.as_tag() {
		Some(ArgTag::Next) => ports.view.navigate_history(HistoryDirection::Forward),
		Some(ArgTag::Previous) => ports.view.navigate_history(HistoryDirection::Back),
		_ => {}
	}
}

/// Relative tab switch with wrap-around. `3gt` steps three tabs forward and
/// `3gT` three tabs back.
fn nav_tabs(ports: &mut Ports<'_>, argument: &Argument, buffer: Option<&str>) {
	let Some(current) = ports.view.current_tab() else {
		return;
	};
	let count = ports.view.tab_count();
	if count == 0 {
		return;
	}
	let step = match argument.as_tag() {
		Some(ArgTag::Previous) => -1,
		Some(ArgTag::Specific) => {
			let buffer = buffer.unwrap_or("");
			let times = i64::from(leading_count(buffer).unwrap_or(1));
			if buffer.ends_with('t') { times } else { -times }
		}
		_ => 1,
	};
	let target = (current as i64 + step).rem_euclid(count as i64) as usize;
	ports.view.switch_tab(target);
}

fn run_script(ports: &mut Ports<'_>, argument: &Argument) {
	let Some(source) = argument.as_text() else {
		return;
	};
	if !ports.has_view() {
		return;
	}
	if let Err(err) = ports.view.run_script(source) {
		warn!("script failed: {}", err);
		ports.display.notify(NotifyLevel::Error, &err.to_string());
	}
}

fn yank(ports: &mut Ports<'_>) {
	let Some(uri) = ports.view.current_uri() else {
		return;
	};
	ports.view.set_clipboard_text(&uri);
	ports.display.notify(NotifyLevel::Default, &format!("Yanked {uri}"));
}

/// `gu` climbs one path segment, `3gu` three, `gU` goes to the site root.
fn go_parent(ports: &mut Ports<'_>, argument: &Argument, buffer: Option<&str>) {
	let Some(uri) = ports.view.current_uri() else {
		return;
	};
	let parent = if argument.is_tag(ArgTag::Top) {
		site_root(&uri)
	} else {
		let levels = buffer.and_then(leading_count).unwrap_or(1);
		parent_uri(&uri, levels as usize)
	};
	match parent {
		Some(parent) if parent != uri => ports.view.open(&parent, OpenTarget::Current),
		Some(_) => trace!("already at the top of {}", uri),
		None => debug!("no parent for {}", uri),
	}
}
