use std::cell::RefCell;
use std::rc::Rc;

use leptos::html::{Canvas, Div};
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::config::{EngineConfig, FlowArgs};
use super::decorate::{Decorated, decorate};
use super::engine::{Effect as FlowEffect, FlowEngine};
use super::layout::{AutoLayout, LayoutEngine, LayoutRequest};
use super::menu::{
	EdgeAction, EdgePatch, MenuAction, MenuState, NodeAction, NodeDraft, NodePatch, PaneAction,
};
use super::render::{self, Scene};
use super::sync::{OutboundPayload, SystemClock};
use super::types::{Edge, HandleSide, Node, NodeKind, Position, ThemeBase};
use super::viewport::{Bounds, Viewport, handle_point, node_size};

/// Pointer travel (px) before a press becomes a drag.
const DRAG_THRESHOLD: f64 = 3.0;

#[derive(Clone, Debug, Default)]
enum Pointer {
	#[default]
	Idle,
	Pan {
		start: (f64, f64),
		origin: (f64, f64),
		moved: bool,
	},
	Drag {
		id: String,
		start: (f64, f64),
		origin: Position,
		moved: bool,
	},
	Connect {
		source: String,
		from: Position,
		to: Position,
	},
}

fn past_threshold(start: (f64, f64), now: (f64, f64)) -> bool {
	(now.0 - start.0).abs() > DRAG_THRESHOLD || (now.1 - start.1).abs() > DRAG_THRESHOLD
}

/// Render-side mirror of engine state.
#[derive(Clone, Copy)]
struct ViewSignals {
	nodes: RwSignal<Vec<Node>>,
	edges: RwSignal<Vec<Edge>>,
	menu: RwSignal<MenuState>,
	viewport: RwSignal<Viewport>,
	selected: RwSignal<Option<String>>,
}

#[derive(Clone, Copy)]
struct ChatBindings {
	on_text_change: Callback<String>,
	on_submit: Callback<()>,
}

/// Everything an event handler needs, all `Copy` handles.
#[derive(Clone, Copy)]
struct Ctx {
	engine: StoredValue<FlowEngine>,
	view: ViewSignals,
	pointer: StoredValue<Pointer>,
	mounted: StoredValue<bool>,
	container: NodeRef<Div>,
	args: Signal<FlowArgs>,
	on_change: Callback<OutboundPayload>,
}

impl Ctx {
	fn point(&self, ev: &MouseEvent) -> Option<(f64, f64)> {
		let rect = self.container.get_untracked()?.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	}

	fn refresh(&self) {
		self.engine.with_value(|e| {
			self.view.nodes.set(e.nodes().to_vec());
			self.view.edges.set(e.edges().to_vec());
			self.view.menu.set(e.menu().clone());
			self.view.viewport.set(*e.viewport());
			self.view.selected.set(e.selection().map(str::to_owned));
		});
	}

	fn refresh_viewport(&self) {
		self.view.viewport.set(self.engine.with_value(|e| *e.viewport()));
	}

	fn transition(&self, f: impl FnOnce(&mut FlowEngine) -> Vec<FlowEffect>) {
		let effects = self.engine.try_update_value(f).unwrap_or_default();
		self.refresh();
		self.execute(effects);
	}

	fn execute(&self, effects: Vec<FlowEffect>) {
		for effect in effects {
			match effect {
				FlowEffect::Publish(payload) => self.on_change.run(payload),
				FlowEffect::RunLayout(request) => {
					let ctx = *self;
					spawn_local(async move {
						let LayoutRequest {
							ticket,
							nodes,
							edges,
							options,
						} = request;
						let result = AutoLayout.layout(nodes, edges, &options).await;
						ctx.transition(move |e| e.layout_finished(ticket, result));
					});
				}
				FlowEffect::FitView => {
					self.engine.update_value(|e| e.fit_view());
					self.refresh_viewport();
				}
			}
		}
	}

	fn node_field<T>(&self, id: &str, f: impl FnOnce(&Node) -> T) -> Option<T> {
		self.view.nodes.with(|nodes| nodes.iter().find(|n| n.id == id).map(f))
	}

	fn edge_under(&self, x: f64, y: f64) -> Option<String> {
		self.engine.with_value(|e| {
			e.viewport()
				.edge_at(e.nodes(), e.edges(), x, y)
				.map(|edge| edge.id.clone())
		})
	}

	fn finish_drag(&self, id: String) {
		let Some(position) = self
			.view
			.nodes
			.with_untracked(|nodes| nodes.iter().find(|n| n.id == id).map(|n| n.position))
		else {
			return;
		};
		self.transition(move |e| e.node_drag_stop(&id, position));
	}
}

/// Interactive node-link editor. The host owns the graph and pushes it through
/// `args`; every settled edit comes back once through `on_change`.
#[component]
pub fn FlowCanvas(
	#[prop(into)] args: Signal<FlowArgs>,
	#[prop(into)] on_change: Callback<OutboundPayload>,
	#[prop(into, default = Signal::stored(ThemeBase::Light))] theme: Signal<ThemeBase>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(optional)] config: EngineConfig,
) -> impl IntoView {
	let engine: FlowEngine = FlowEngine::new(args.get_untracked(), SystemClock, config);
	let view = ViewSignals {
		nodes: RwSignal::new(engine.nodes().to_vec()),
		edges: RwSignal::new(engine.edges().to_vec()),
		menu: RwSignal::new(MenuState::None),
		viewport: RwSignal::new(*engine.viewport()),
		selected: RwSignal::new(None),
	};
	let ctx = Ctx {
		engine: StoredValue::new(engine),
		view,
		pointer: StoredValue::new(Pointer::Idle),
		mounted: StoredValue::new(false),
		container: NodeRef::new(),
		args,
		on_change,
	};
	let canvas_ref = NodeRef::<Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas;
		let Some(window) = web_sys::window() else {
			return;
		};
		let w = width.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.filter(|w| *w > 0.0)
				.unwrap_or(800.0)
		});
		let h = args.with_untracked(|a| a.options.height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx2d) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("2d canvas context unavailable");
			return;
		};

		ctx.engine.update_value(|e| e.viewport_mut().resize(w, h));
		ctx.mounted.set_value(true);
		// Node sizes are fixed per kind, so the surface is measured as soon as it exists.
		ctx.transition(|e| e.nodes_initialized());

		let animate_inner = animate.clone();
		let mut flow_time = 0.0;
		*animate.borrow_mut() = Some(Closure::new(move || {
			if ctx.view.nodes.is_disposed() {
				return;
			}
			flow_time += 0.016;
			let pending = match ctx.pointer.get_value() {
				Pointer::Connect { from, to, .. } => Some((from, to)),
				_ => None,
			};
			let viewport = ctx.view.viewport.get_untracked();
			ctx.view.nodes.with_untracked(|nodes| {
				ctx.view.edges.with_untracked(|edges| {
					ctx.view.selected.with_untracked(|selected| {
						let scene = Scene {
							nodes,
							edges,
							viewport: &viewport,
							theme: theme.get_untracked(),
							selected: selected.as_deref(),
							flow_time,
							pending,
						};
						render::render(&scene, &ctx2d);
					})
				})
			});
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// The engine was seeded from the first snapshot; only later pushes reconcile.
	Effect::new(move |seeded: Option<()>| {
		let incoming = args.get();
		if seeded.is_none() {
			return;
		}
		let mounted = ctx.mounted.get_value();
		ctx.transition(move |e| {
			let mut effects = e.host_push(incoming);
			if mounted {
				effects.extend(e.nodes_initialized());
			}
			effects
		});
	});

	Effect::new(move |_| {
		let theme = theme.get();
		ctx.engine.update_value(|e| e.set_theme(theme));
		ctx.refresh();
	});

	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(start) = ctx.point(&ev) else {
			return;
		};
		let vp = ctx.view.viewport.get_untracked();
		ctx.pointer.set_value(Pointer::Pan {
			start,
			origin: (vp.x, vp.y),
			moved: false,
		});
	};

	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = ctx.point(&ev) else {
			return;
		};
		match ctx.pointer.get_value() {
			Pointer::Idle => {}
			Pointer::Pan {
				start,
				origin,
				moved,
			} => {
				if !moved && !past_threshold(start, (x, y)) {
					return;
				}
				ctx.pointer.set_value(Pointer::Pan {
					start,
					origin,
					moved: true,
				});
				if !ctx.args.with_untracked(|a| a.options.pan_on_drag) {
					return;
				}
				ctx.engine.update_value(|e| {
					let vp = e.viewport_mut();
					vp.x = origin.0 + x - start.0;
					vp.y = origin.1 + y - start.1;
				});
				ctx.refresh_viewport();
			}
			Pointer::Drag {
				id,
				start,
				origin,
				moved,
			} => {
				if !moved {
					if !past_threshold(start, (x, y)) {
						return;
					}
					ctx.transition(|e| {
						e.drag_started();
						Vec::new()
					});
				}
				let k = ctx.view.viewport.get_untracked().k;
				let position = origin.offset((x - start.0) / k, (y - start.1) / k);
				ctx.view.nodes.update(|nodes| {
					if let Some(node) = nodes.iter_mut().find(|n| n.id == id) {
						node.position = position;
					}
				});
				ctx.pointer.set_value(Pointer::Drag {
					id,
					start,
					origin,
					moved: true,
				});
			}
			Pointer::Connect { source, from, .. } => {
				let to = ctx.view.viewport.get_untracked().screen_to_graph(x, y);
				ctx.pointer.set_value(Pointer::Connect { source, from, to });
			}
		}
	};

	let on_mouseup = move |ev: MouseEvent| {
		let pointer = ctx.pointer.get_value();
		ctx.pointer.set_value(Pointer::Idle);
		match pointer {
			Pointer::Pan { moved: false, .. } => {
				let hit = ctx.point(&ev).and_then(|(x, y)| ctx.edge_under(x, y));
				match hit {
					Some(id) => ctx.transition(move |e| e.edge_click(&id)),
					None => ctx.transition(|e| e.pane_click()),
				}
			}
			Pointer::Drag {
				id, moved: true, ..
			} => ctx.finish_drag(id),
			Pointer::Drag {
				id, moved: false, ..
			} => ctx.transition(move |e| e.node_click(&id)),
			_ => {}
		}
	};

	let on_mouseleave = move |_: MouseEvent| {
		let pointer = ctx.pointer.get_value();
		ctx.pointer.set_value(Pointer::Idle);
		if let Pointer::Drag {
			id, moved: true, ..
		} = pointer
		{
			ctx.finish_drag(id);
		}
	};

	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some((x, y)) = ctx.point(&ev) else {
			return;
		};
		let hit = ctx.edge_under(x, y);
		ctx.transition(move |e| {
			match hit {
				Some(id) => e.open_edge_menu(&id, x, y),
				None => e.open_pane_menu(x, y),
			};
			Vec::new()
		});
	};

	let on_wheel = move |ev: WheelEvent| {
		if !ctx.args.with_untracked(|a| a.options.allow_zoom) {
			return;
		}
		ev.prevent_default();
		let Some((x, y)) = ctx.point(&ev) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		ctx.engine.update_value(|e| {
			let min = e.options().min_zoom;
			let max = e.config().max_zoom.max(min);
			e.viewport_mut().zoom_at(x, y, factor, min, max);
		});
		ctx.refresh_viewport();
	};

	let container_style = move || {
		args.with(|a| {
			format!(
				"position: relative; overflow: hidden; height: {}px; {}",
				a.options.height,
				a.options.style_css()
			)
		})
	};

	view! {
		<div
			node_ref=ctx.container
			class="flow-canvas"
			style=container_style
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:contextmenu=on_contextmenu
			on:wheel=on_wheel
		>
			<canvas node_ref=canvas_ref style="display: block; position: absolute; inset: 0;" />
			<div class="flow-nodes">
				<For
					each=move || ctx.view.nodes.with(|nodes| decorate(nodes, |id| bindings(ctx, id)))
					key=|decorated| decorated.key()
					children=move |decorated| node_view(ctx, decorated)
				/>
			</div>
			{move || menu_view(ctx, ctx.view.menu.get())}
			{move || args.with(|a| a.options.show_controls).then(|| controls_view(ctx))}
			{move || args.with(|a| a.options.show_mini_map).then(|| minimap_view(ctx))}
			{move || {
				(!args.with(|a| a.options.hide_watermark))
					.then(|| view! { <div class="flow-attribution">"flow-canvas"</div> })
			}}
		</div>
	}
}

fn bindings(ctx: Ctx, id: &str) -> ChatBindings {
	let (change_id, submit_id) = (id.to_owned(), id.to_owned());
	ChatBindings {
		on_text_change: Callback::new(move |text: String| {
			let id = change_id.clone();
			ctx.transition(move |e| e.chat_text_changed(&id, text));
		}),
		on_submit: Callback::new(move |_: ()| {
			let id = submit_id.clone();
			ctx.transition(move |e| e.chat_submitted(&id));
		}),
	}
}

fn node_view(ctx: Ctx, decorated: Decorated<ChatBindings>) -> impl IntoView {
	let Decorated { node, chat } = decorated;
	let id = node.id.clone();
	let kind = node.kind;
	let connectable = node.connectable;
	let (w, h) = node_size(&node);

	let style = {
		let id = id.clone();
		move || {
			let vp = ctx.view.viewport.get();
			ctx.node_field(&id, |n| {
				let (sx, sy) = vp.graph_to_screen(n.position);
				format!(
					"position: absolute; left: {sx}px; top: {sy}px; width: {w}px; min-height: {h}px; \
					 transform: scale({}); transform-origin: 0 0;",
					vp.k
				)
			})
			.unwrap_or_default()
		}
	};
	let selected = {
		let id = id.clone();
		move || ctx.view.selected.with(|s| s.as_deref() == Some(id.as_str()))
	};
	let on_mousedown = {
		let id = id.clone();
		move |ev: MouseEvent| {
			ev.stop_propagation();
			if ev.button() != 0 {
				return;
			}
			let (Some(start), Some(origin)) = (ctx.point(&ev), ctx.node_field(&id, |n| n.position))
			else {
				return;
			};
			ctx.pointer.set_value(Pointer::Drag {
				id: id.clone(),
				start,
				origin,
				moved: false,
			});
		}
	};
	let on_contextmenu = {
		let id = id.clone();
		move |ev: MouseEvent| {
			ev.prevent_default();
			ev.stop_propagation();
			let Some((x, y)) = ctx.point(&ev) else {
				return;
			};
			let id = id.clone();
			ctx.transition(move |e| {
				e.open_node_menu(&id, x, y);
				Vec::new()
			});
		}
	};

	let body = match chat {
		Some(bindings) => chat_body(ctx, id.clone(), node.data.placeholder.clone(), bindings).into_any(),
		None => {
			let id = id.clone();
			let label = move || {
				ctx.node_field(&id, |n| n.data.content.clone().unwrap_or_else(|| n.id.clone()))
					.unwrap_or_default()
			};
			view! { <div class="flow-node-label">{label}</div> }.into_any()
		}
	};
	let target = kind
		.has_target_handle()
		.then(|| handle_view(ctx, id.clone(), node.target_side(), false, connectable));
	let source = kind
		.has_source_handle()
		.then(|| handle_view(ctx, id.clone(), node.source_side(), true, connectable));

	view! {
		<div
			class=format!("flow-node flow-node-{}", kind.as_str())
			class:selected=selected
			style=style
			on:mousedown=on_mousedown
			on:contextmenu=on_contextmenu
		>
			{target}
			{body}
			{source}
		</div>
	}
}

fn chat_body(ctx: Ctx, id: String, placeholder: Option<String>, bindings: ChatBindings) -> impl IntoView {
	let content = {
		let id = id.clone();
		move || ctx.node_field(&id, |n| n.data.content.clone().unwrap_or_default()).unwrap_or_default()
	};
	let submitted = move || ctx.node_field(&id, |n| n.data.submitted_content.clone()).flatten();
	let placeholder = placeholder.unwrap_or_else(|| "Enter your prompt here...".to_owned());

	view! {
		<div class="chat-form" on:mousedown=|ev: MouseEvent| ev.stop_propagation()>
			<textarea
				class="chat-input"
				placeholder=placeholder
				prop:value=content
				on:input=move |ev| bindings.on_text_change.run(event_target_value(&ev))
			></textarea>
			<button class="chat-submit" on:click=move |_| bindings.on_submit.run(())>
				"Submit"
			</button>
			{move || submitted().map(|text| view! { <div class="chat-output">{text}</div> })}
		</div>
	}
}

fn handle_view(ctx: Ctx, id: String, side: HandleSide, source: bool, connectable: bool) -> impl IntoView {
	let role = if source { "source" } else { "target" };
	let class = format!("flow-handle flow-handle-{role} flow-handle-{}", side.as_str());
	let on_mousedown = {
		let id = id.clone();
		move |ev: MouseEvent| {
			ev.stop_propagation();
			if !source || !connectable {
				return;
			}
			let from = ctx.engine.with_value(|e| {
				e.can_start_connect(&id)
					.then(|| e.store().node(&id))
					.flatten()
					.map(|n| handle_point(n, n.source_side()))
			});
			if let Some(from) = from {
				ctx.pointer.set_value(Pointer::Connect {
					source: id.clone(),
					from,
					to: from,
				});
			}
		}
	};
	let on_mouseup = move |ev: MouseEvent| {
		if source || !connectable {
			return;
		}
		if let Pointer::Connect { source, .. } = ctx.pointer.get_value() {
			ev.stop_propagation();
			ctx.pointer.set_value(Pointer::Idle);
			let target = id.clone();
			ctx.transition(move |e| e.connect(&source, &target));
		}
	};

	view! { <div class=class on:mousedown=on_mousedown on:mouseup=on_mouseup></div> }
}

fn menu_view(ctx: Ctx, state: MenuState) -> AnyView {
	let Some(anchor) = state.anchor() else {
		return ().into_any();
	};
	let act = move |action: MenuAction| ctx.transition(move |e| e.apply_menu_action(action));
	let body = match state {
		MenuState::Pane { .. } => pane_menu(act).into_any(),
		MenuState::Node { node, .. } => node_menu(node, act).into_any(),
		MenuState::Edge { edge, .. } => edge_menu(edge, act).into_any(),
		MenuState::None => ().into_any(),
	};
	view! {
		<div
			class="flow-menu"
			style=format!("position: absolute; {}", anchor.css())
			on:mousedown=|ev: MouseEvent| ev.stop_propagation()
			on:mouseup=|ev: MouseEvent| ev.stop_propagation()
			on:contextmenu=|ev: MouseEvent| {
				ev.prevent_default();
				ev.stop_propagation();
			}
		>
			{body}
		</div>
	}
	.into_any()
}

fn kind_select(kind: RwSignal<NodeKind>) -> impl IntoView {
	view! {
		<select on:change=move |ev| {
			if let Some(parsed) = NodeKind::parse(&event_target_value(&ev)) {
				kind.set(parsed);
			}
		}>
			{NodeKind::ALL
				.into_iter()
				.map(|k| {
					view! {
						<option value=k.as_str() selected=move || kind.get() == k>
							{k.as_str()}
						</option>
					}
				})
				.collect_view()}
		</select>
	}
}

fn side_select(label: &'static str, side: RwSignal<Option<HandleSide>>) -> impl IntoView {
	view! {
		<label>
			{label}
			<select on:change=move |ev| side.set(HandleSide::parse(&event_target_value(&ev)))>
				<option value="" selected=move || side.get().is_none()>"auto"</option>
				{HandleSide::ALL
					.into_iter()
					.map(|s| {
						view! {
							<option value=s.as_str() selected=move || side.get() == Some(s)>
								{s.as_str()}
							</option>
						}
					})
					.collect_view()}
			</select>
		</label>
	}
}

fn checkbox(label: &'static str, value: RwSignal<bool>) -> impl IntoView {
	view! {
		<label>
			<input
				type="checkbox"
				prop:checked=move || value.get()
				on:change=move |ev| value.set(event_target_checked(&ev))
			/>
			{label}
		</label>
	}
}

fn pane_menu(act: impl Fn(MenuAction) + Copy + 'static) -> impl IntoView {
	let draft = NodeDraft::default();
	let content = RwSignal::new(draft.content);
	let kind = RwSignal::new(draft.kind);
	let connectable = RwSignal::new(draft.connectable);
	let source_side = RwSignal::new(draft.source_position);
	let target_side = RwSignal::new(draft.target_position);
	let add = move |_| {
		act(MenuAction::Pane(PaneAction::AddNode(NodeDraft {
			content: content.get_untracked(),
			kind: kind.get_untracked(),
			connectable: connectable.get_untracked(),
			source_position: source_side.get_untracked(),
			target_position: target_side.get_untracked(),
		})))
	};

	view! {
		<div class="flow-menu-title">"New node"</div>
		<textarea
			placeholder="Content"
			prop:value=move || content.get()
			on:input=move |ev| content.set(event_target_value(&ev))
		></textarea>
		{kind_select(kind)}
		{checkbox("Connectable", connectable)}
		{side_select("Source handle", source_side)}
		{side_select("Target handle", target_side)}
		<button on:click=add>"Add node"</button>
		<button on:click=move |_| act(MenuAction::Pane(PaneAction::ResetLayout))>"Reset layout"</button>
	}
}

fn node_menu(node: Node, act: impl Fn(MenuAction) + Copy + 'static) -> impl IntoView {
	let content = RwSignal::new(node.data.content.clone().unwrap_or_default());
	let kind = RwSignal::new(node.kind);
	let connectable = RwSignal::new(node.connectable);
	let source_side = RwSignal::new(node.source_position);
	let target_side = RwSignal::new(node.target_position);
	let save = move |_| {
		act(MenuAction::Node(NodeAction::Edit(NodePatch {
			content: Some(content.get_untracked()),
			kind: Some(kind.get_untracked()),
			connectable: Some(connectable.get_untracked()),
			source_position: source_side.get_untracked(),
			target_position: target_side.get_untracked(),
		})))
	};

	view! {
		<div class="flow-menu-title">{format!("Node {}", node.id)}</div>
		<textarea
			prop:value=move || content.get()
			on:input=move |ev| content.set(event_target_value(&ev))
		></textarea>
		{kind_select(kind)}
		{checkbox("Connectable", connectable)}
		{side_select("Source handle", source_side)}
		{side_select("Target handle", target_side)}
		<button on:click=save>"Save"</button>
		<button on:click=move |_| act(MenuAction::Node(NodeAction::Duplicate))>"Duplicate"</button>
		<button on:click=move |_| act(MenuAction::Node(NodeAction::Delete))>"Delete"</button>
	}
}

fn edge_menu(edge: Edge, act: impl Fn(MenuAction) + Copy + 'static) -> impl IntoView {
	let label = RwSignal::new(edge.label.clone().unwrap_or_default());
	let animated = RwSignal::new(edge.animated);
	let label_show_bg = RwSignal::new(edge.label_show_bg);
	let save = move |_| {
		act(MenuAction::Edge(EdgeAction::Edit(EdgePatch {
			label: Some(label.get_untracked()),
			animated: Some(animated.get_untracked()),
			label_show_bg: Some(label_show_bg.get_untracked()),
		})))
	};

	view! {
		<div class="flow-menu-title">{format!("Edge {}", edge.id)}</div>
		<input
			type="text"
			placeholder="Label"
			prop:value=move || label.get()
			on:input=move |ev| label.set(event_target_value(&ev))
		/>
		{checkbox("Animated", animated)}
		{checkbox("Label background", label_show_bg)}
		<button on:click=save>"Save"</button>
		<button on:click=move |_| act(MenuAction::Edge(EdgeAction::Delete))>"Delete"</button>
	}
}

fn controls_view(ctx: Ctx) -> impl IntoView {
	let zoom = move |factor: f64| {
		ctx.engine.update_value(|e| {
			let Viewport { width, height, .. } = *e.viewport();
			let min = e.options().min_zoom;
			let max = e.config().max_zoom.max(min);
			e.viewport_mut()
				.zoom_at(width / 2.0, height / 2.0, factor, min, max);
		});
		ctx.refresh_viewport();
	};
	let fit = move |_| {
		ctx.engine.update_value(|e| e.fit_view());
		ctx.refresh_viewport();
	};

	view! {
		<div
			class="flow-controls"
			on:mousedown=|ev: MouseEvent| ev.stop_propagation()
			on:mouseup=|ev: MouseEvent| ev.stop_propagation()
		>
			<button title="zoom in" on:click=move |_| zoom(1.2)>"+"</button>
			<button title="zoom out" on:click=move |_| zoom(1.0 / 1.2)>"-"</button>
			<button title="fit view" on:click=fit>"[ ]"</button>
		</div>
	}
}

fn minimap_view(ctx: Ctx) -> impl IntoView {
	let view_box = move || {
		ctx.view.nodes.with(|nodes| {
			Bounds::of(nodes)
				.map(|b| {
					format!(
						"{} {} {} {}",
						b.min.x - 20.0,
						b.min.y - 20.0,
						b.width() + 40.0,
						b.height() + 40.0
					)
				})
				.unwrap_or_else(|| "0 0 100 100".to_owned())
		})
	};
	let rects = move || {
		ctx.view.nodes.with(|nodes| {
			nodes
				.iter()
				.map(|n| {
					let (w, h) = node_size(n);
					view! {
						<rect
							x=n.position.x.to_string()
							y=n.position.y.to_string()
							width=w.to_string()
							height=h.to_string()
							rx="4"
						/>
					}
				})
				.collect_view()
		})
	};

	view! {
		<svg class="flow-minimap" viewBox=view_box preserveAspectRatio="xMidYMid meet">
			{rects}
		</svg>
	}
}
