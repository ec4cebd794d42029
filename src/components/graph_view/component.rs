use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Element, Event, HtmlCanvasElement, MouseEvent, WheelEvent, Window,
};

use super::render;
use super::state::{GraphViewState, Overlay};
use super::storage::LocalStorageStore;
use crate::graph::settings::load_or_default;
use crate::graph::{ColorScheme, GraphSettings, LayoutMode, NodeSizing, Note, SettingsStore};
use crate::interaction::{GraphHost, MenuAction};
use crate::layout::Viewport;

/// Pointer travel, in pixels, past which a press counts as a drag, not a click.
const CLICK_SLOP: f64 = 3.0;
const MENU_SELECTOR: &str = ".graph-context-menu";

/// Forwards graph requests to the embedding page.
#[derive(Clone, Copy)]
struct BrowserHost {
	on_open: Callback<String>,
	on_create: Option<Callback<String>>,
	on_delete: Option<Callback<String>>,
}

impl GraphHost for BrowserHost {
	fn open_note(&mut self, name: &str) {
		self.on_open.run(name.to_owned());
	}

	fn create_note(&mut self, suggested_name: &str) {
		match self.on_create {
			Some(cb) => cb.run(suggested_name.to_owned()),
			None => debug!("no create handler for {suggested_name}"),
		}
	}

	fn delete_note(&mut self, path_or_name: &str) {
		match self.on_delete {
			Some(cb) => cb.run(path_or_name.to_owned()),
			None => debug!("no delete handler for {path_or_name}"),
		}
	}

	fn confirm(&mut self, message: &str) -> bool {
		web_sys::window()
			.and_then(|w| w.confirm_with_message(message).ok())
			.unwrap_or(false)
	}

	fn prompt(&mut self, message: &str) -> Option<String> {
		web_sys::window()?.prompt_with_message(message).ok().flatten()
	}
}

/// Overlay button presses, applied to the view state by an effect.
#[derive(Clone, Debug, PartialEq)]
enum ViewCommand {
	Menu(MenuAction),
	Node(MenuAction, String),
	CloseDetails,
}

type SharedState = Rc<RefCell<Option<GraphViewState>>>;

fn measure(canvas: &HtmlCanvasElement, window: &Window, fullscreen: bool) -> Viewport {
	if fullscreen {
		let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
		return Viewport::new(dim(window.inner_width()), dim(window.inner_height()));
	}
	canvas.parent_element().map_or(Viewport::new(0.0, 0.0), |p| {
		Viewport::new(p.client_width() as f64, p.client_height() as f64)
	})
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn inside_menu(ev: &Event) -> bool {
	ev.target()
		.and_then(|t| t.dyn_into::<Element>().ok())
		.and_then(|el| el.closest(MENU_SELECTOR).ok().flatten())
		.is_some()
}

fn publish(overlay: RwSignal<Overlay>, state: &GraphViewState) {
	let next = state.overlay();
	if overlay.with_untracked(|o| *o != next) {
		overlay.set(next);
	}
}

/// Interactive graph of a note collection, with layout controls and overlays.
#[component]
pub fn GraphView(
	#[prop(into)] notes: Signal<Vec<Note>>,
	#[prop(into, optional)] current_file: Signal<Option<String>>,
	#[prop(into)] on_node_click: Callback<String>,
	#[prop(into, optional)] on_create_note: Option<Callback<String>>,
	#[prop(into, optional)] on_delete_note: Option<Callback<String>>,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let dismiss_cb: Rc<RefCell<Option<Closure<dyn FnMut(Event)>>>> = Rc::new(RefCell::new(None));
	let press: Rc<Cell<Option<(f64, f64)>>> = Rc::new(Cell::new(None));

	let host = BrowserHost {
		on_open: on_node_click,
		on_create: on_create_note,
		on_delete: on_delete_note,
	};
	let settings = RwSignal::new(load_or_default(&LocalStorageStore::default()));
	let overlay = RwSignal::new(Overlay::default());
	let command = RwSignal::new(None::<ViewCommand>);

	let (state_init, animate_init, resize_cb_init, dismiss_cb_init) = (
		state.clone(),
		animate.clone(),
		resize_cb.clone(),
		dismiss_cb.clone(),
	);
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let viewport = measure(&canvas, &window, fullscreen);
		canvas.set_width(viewport.width as u32);
		canvas.set_height(viewport.height as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("canvas 2d context unavailable");
			return;
		};

		let view_state = GraphViewState::new(
			&notes.get_untracked(),
			current_file.get_untracked(),
			settings.get_untracked(),
			viewport,
		);
		info!(
			"graph view mounted with {} notes ({}x{})",
			view_state.graph.nodes.len(),
			viewport.width,
			viewport.height
		);
		publish(overlay, &view_state);
		*state_init.borrow_mut() = Some(view_state);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let viewport = measure(&canvas_resize, &win, fullscreen);
			canvas_resize.set_width(viewport.width as u32);
			canvas_resize.set_height(viewport.height as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(viewport);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		// any click outside the context menu closes it
		let state_dismiss = state_init.clone();
		*dismiss_cb_init.borrow_mut() = Some(Closure::new(move |ev: Event| {
			if inside_menu(&ev) {
				return;
			}
			if let Some(ref mut s) = *state_dismiss.borrow_mut() {
				if s.dismiss_menu() {
					publish(overlay, s);
				}
			}
		}));
		if let (Some(cb), Some(document)) = (&*dismiss_cb_init.borrow(), window.document()) {
			let _ = document.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// later changes only; the first run happens at mount
	let state_notes = state.clone();
	Effect::new(move |prev: Option<()>| {
		let notes = notes.get();
		if prev.is_some() {
			if let Some(ref mut s) = *state_notes.borrow_mut() {
				debug!("notes changed, rebuilding graph");
				s.rebuild(&notes);
				publish(overlay, s);
			}
		}
	});

	let state_current = state.clone();
	Effect::new(move |_| {
		let current = current_file.get();
		if let Some(ref mut s) = *state_current.borrow_mut() {
			s.set_current(current);
		}
	});

	let state_settings = state.clone();
	Effect::new(move |prev: Option<()>| {
		let next = settings.get();
		if prev.is_none() {
			return;
		}
		if let Err(err) = LocalStorageStore::default().save(&next) {
			warn!("could not save graph settings: {err}");
		}
		if let Some(ref mut s) = *state_settings.borrow_mut() {
			s.apply_settings(next);
			publish(overlay, s);
		}
	});

	let state_cmd = state.clone();
	Effect::new(move |_| {
		let Some(cmd) = command.get() else {
			return;
		};
		command.set(None);
		let mut host = host;
		if let Some(ref mut s) = *state_cmd.borrow_mut() {
			match cmd {
				ViewCommand::Menu(action) => s.menu_action(action, &mut host),
				ViewCommand::Node(action, id) => s.node_action(action, &id, &mut host),
				ViewCommand::CloseDetails => s.controller.clear_selection(),
			}
			publish(overlay, s);
		}
	});

	let (state_md, press_md) = (state.clone(), press.clone());
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		press_md.set(Some((x, y)));
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
			publish(overlay, s);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
			publish(overlay, s);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer_up(ev.shift_key());
		}
	};

	let (state_click, press_click) = (state.clone(), press.clone());
	let on_click = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let dragged = press_click
			.take()
			.is_some_and(|(px, py)| (px - x).hypot(py - y) > CLICK_SLOP);
		if dragged {
			return;
		}
		let mut host = host;
		if let Some(ref mut s) = *state_click.borrow_mut() {
			s.click(x, y, &mut host);
			publish(overlay, s);
		}
	};

	let state_ctx = state.clone();
	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_ctx.borrow_mut() {
			s.context_menu(x, y, ev.client_x() as f64, ev.client_y() as f64);
			publish(overlay, s);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
			publish(overlay, s);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom(x, y, ev.delta_y());
		}
	};

	let is_force = move || settings.with(|s| s.layout_mode == LayoutMode::Force);

	view! {
		<div class="vault-graph" style="position: relative; width: 100%; height: 100%;">
			<div class="graph-toolbar">
				<select on:change=move |ev| {
					if let Some(mode) = LayoutMode::parse(&event_target_value(&ev)) {
						settings.update(|s| s.layout_mode = mode);
					}
				}>
					{LayoutMode::ALL
						.into_iter()
						.map(|mode| {
							view! {
								<option
									value={mode.as_str()}
									selected=move || settings.with(|s| s.layout_mode == mode)
								>
									{mode.as_str()}
								</option>
							}
						})
						.collect_view()}
				</select>

				<Show when=is_force>
					<label>
						"Link distance "
						<input
							type="range"
							min={GraphSettings::LINK_DISTANCE_RANGE.0}
							max={GraphSettings::LINK_DISTANCE_RANGE.1}
							prop:value=move || settings.with(|s| s.link_distance)
							on:change=move |ev| {
								if let Ok(v) = event_target_value(&ev).parse::<f64>() {
									settings.update(|s| s.link_distance = v);
								}
							}
						/>
					</label>
					<label>
						"Charge "
						<input
							type="range"
							min={GraphSettings::CHARGE_RANGE.0}
							max={GraphSettings::CHARGE_RANGE.1}
							prop:value=move || settings.with(|s| s.charge_strength)
							on:change=move |ev| {
								if let Ok(v) = event_target_value(&ev).parse::<f64>() {
									settings.update(|s| s.charge_strength = v);
								}
							}
						/>
					</label>
					<select on:change=move |ev| {
						let sizing = match event_target_value(&ev).as_str() {
							"uniform" => NodeSizing::Uniform,
							_ => NodeSizing::Connections,
						};
						settings.update(|s| s.node_size = sizing);
					}>
						<option
							value="connections"
							selected=move || settings.with(|s| s.node_size == NodeSizing::Connections)
						>
							"Size by connections"
						</option>
						<option
							value="uniform"
							selected=move || settings.with(|s| s.node_size == NodeSizing::Uniform)
						>
							"Uniform size"
						</option>
					</select>
					<label>
						<input
							type="checkbox"
							prop:checked=move || settings.with(|s| s.physics)
							on:change=move |ev| {
								let on = event_target_checked(&ev);
								settings.update(|s| s.physics = on);
							}
						/>
						"Physics"
					</label>
				</Show>

				<select on:change=move |ev| {
					let scheme = match event_target_value(&ev).as_str() {
						"cluster" => ColorScheme::Cluster,
						_ => ColorScheme::Category,
					};
					settings.update(|s| s.color_scheme = scheme);
				}>
					<option
						value="category"
						selected=move || settings.with(|s| s.color_scheme == ColorScheme::Category)
					>
						"Color by type"
					</option>
					<option
						value="cluster"
						selected=move || settings.with(|s| s.color_scheme == ColorScheme::Cluster)
					>
						"Color by cluster"
					</option>
				</select>
				<label>
					<input
						type="checkbox"
						prop:checked=move || settings.with(|s| s.show_labels)
						on:change=move |ev| {
							let on = event_target_checked(&ev);
							settings.update(|s| s.show_labels = on);
						}
					/>
					"Labels"
				</label>
				<label>
					<input
						type="checkbox"
						prop:checked=move || settings.with(|s| s.show_orphans)
						on:change=move |ev| {
							let on = event_target_checked(&ev);
							settings.update(|s| s.show_orphans = on);
						}
					/>
					"Orphans"
				</label>
			</div>

			<div class="graph-stats">
				<span class="badge">{move || format!("{} notes", overlay.with(|o| o.note_count))}</span>
				<span class="badge">
					{move || format!("{} connections", overlay.with(|o| o.link_count))}
				</span>
				{move || {
					overlay
						.with(|o| o.connecting.clone())
						.map(|source| {
							view! {
								<span class="badge connecting">
									{format!("Connecting from {source}: click a target")}
								</span>
							}
						})
				}}
			</div>

			<canvas
				node_ref=canvas_ref
				class="graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:click=on_click
				on:contextmenu=on_contextmenu
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>

			{move || {
				overlay
					.with(|o| o.tooltip.clone())
					.map(|tip| {
						view! {
							<div
								class="graph-tooltip"
								style=format!(
									"position: absolute; left: {}px; top: {}px; pointer-events: none;",
									tip.x,
									tip.y,
								)
							>
								<strong>{tip.title}</strong>
								<div>{format!("Connections: {}", tip.connections)}</div>
								<div>{format!("Type: {}", tip.node_type)}</div>
								<div>{format!("Tags: {}", tip.tags)}</div>
								<div>{format!("Modified: {}", tip.modified)}</div>
							</div>
						}
					})
			}}

			{move || {
				let menu = overlay.with(|o| o.menu.clone());
				menu.show
					.then(|| {
						view! {
							<div
								class="graph-context-menu"
								style=format!("position: fixed; left: {}px; top: {}px;", menu.x, menu.y)
							>
								{MenuAction::ALL
									.into_iter()
									.map(|action| {
										view! {
											<button
												class:danger={action.is_destructive()}
												on:click=move |_| command.set(Some(ViewCommand::Menu(action)))
											>
												{action.label()}
											</button>
										}
									})
									.collect_view()}
							</div>
						}
					})
			}}

			{move || {
				overlay
					.with(|o| o.details.clone())
					.map(|details| {
						let (open_id, create_id, delete_id) = (
							details.id.clone(),
							details.id.clone(),
							details.id.clone(),
						);
						view! {
							<div class="graph-details">
								<button
									class="close"
									on:click=move |_| command.set(Some(ViewCommand::CloseDetails))
								>
									"×"
								</button>
								<h3>{details.title}</h3>
								<div>{format!("Connections: {}", details.connections)}</div>
								<div>{format!("Type: {}", details.node_type)}</div>
								<div>{format!("Tags: {}", details.tags)}</div>
								<div>{format!("Size: {} chars", details.size)}</div>
								<div>{format!("Modified: {}", details.modified)}</div>
								<div class="actions">
									<button on:click=move |_| {
										command
											.set(Some(ViewCommand::Node(MenuAction::Open, open_id.clone())))
									}>"Open"</button>
									<button on:click=move |_| {
										command
											.set(
												Some(
													ViewCommand::Node(MenuAction::CreateConnected, create_id.clone()),
												),
											)
									}>"Create Connected"</button>
									<button
										class="danger"
										on:click=move |_| {
											command
												.set(Some(ViewCommand::Node(MenuAction::Delete, delete_id.clone())))
										}
									>
										"Delete"
									</button>
								</div>
							</div>
						}
					})
			}}
		</div>
	}
}
