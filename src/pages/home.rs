use leptos::prelude::*;
use log::info;

use crate::components::flow::{
	Clock, Edge, FlowArgs, FlowCanvas, FlowOptions, Node, NodeKind, OutboundPayload, Position,
	SystemClock, ThemeBase, Timestamp,
};

/// A small chat pipeline: prompt in, assistant reply out.
fn sample_args(timestamp: Timestamp) -> FlowArgs {
	let mut prompt = Node::new("prompt", NodeKind::ChatInput, Position::default())
		.with_content("What is a force-directed layout?");
	prompt.data.placeholder = Some("Ask something...".to_owned());
	let nodes = vec![
		prompt,
		Node::new("router", NodeKind::Default, Position::default()).with_content("Router"),
		Node::new("answer", NodeKind::Output, Position::default()).with_content("Answer"),
	];
	let edges = vec![
		Edge::new("prompt-router", "prompt", "router"),
		Edge::new("router-answer", "router", "answer"),
	];
	FlowArgs {
		nodes,
		edges,
		timestamp,
		options: FlowOptions {
			fit_view: true,
			show_mini_map: true,
			allow_new_edges: true,
			animate_new_edges: true,
			get_node_on_click: true,
			get_edge_on_click: true,
			enable_pane_menu: true,
			enable_node_menu: true,
			enable_edge_menu: true,
			..FlowOptions::default()
		},
	}
}

/// Host-side reaction to a submit: attach a reply node to the prompt.
fn answer_submission(mut state: FlowArgs, payload: &OutboundPayload) -> Option<FlowArgs> {
	let id = payload.selected_id.as_deref()?;
	let node = payload.nodes.iter().find(|n| n.id == id && n.kind.is_chat())?;
	let question = node.data.submitted_content.clone()?;
	let reply_id = format!("{id}-reply");

	state.nodes = payload.nodes.clone();
	state.edges = payload.edges.clone();
	state.nodes.retain(|n| n.id != reply_id);
	state.edges.retain(|e| e.target != reply_id);
	state.nodes.push(
		Node::new(&reply_id, NodeKind::ChatOutput, node.position.offset(0.0, 160.0))
			.with_content(format!("You asked: {question}")),
	);
	state.edges.push(Edge::new(format!("{id}-to-reply"), id, &reply_id));
	// Must order after the widget's own timestamp or the push is ignored.
	state.timestamp = SystemClock.now().max(payload.timestamp.next());
	Some(state)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let args = RwSignal::new(sample_args(SystemClock.now()));
	let theme = RwSignal::new(ThemeBase::Light);
	let last = RwSignal::new(None::<OutboundPayload>);

	let on_change = Callback::new(move |payload: OutboundPayload| {
		info!(
			"flow changed at {}, selected {:?}",
			payload.timestamp, payload.selected_id
		);
		if let Some(next) = answer_submission(args.get_untracked(), &payload) {
			args.set(next);
		}
		last.set(Some(payload));
	});

	let reset = move |_| args.set(sample_args(SystemClock.now()));
	let toggle_theme = move |_| {
		theme.update(|t| {
			*t = match t {
				ThemeBase::Light => ThemeBase::Dark,
				ThemeBase::Dark => ThemeBase::Light,
			}
		})
	};
	let status = move || {
		last.with(|payload| match payload {
			Some(p) => format!(
				"{} nodes, {} edges, selected: {}",
				p.nodes.len(),
				p.edges.len(),
				p.selected_id.as_deref().unwrap_or("none")
			),
			None => "no changes yet".to_owned(),
		})
	};

	view! {
		<div class="flow-demo">
			<header>
				<h1>"Flow Canvas"</h1>
				<p class="subtitle">
					"Drag from a handle to connect. Right-click for menus. Submit a prompt to get a reply node."
				</p>
				<button on:click=reset>"Reset graph"</button>
				<button on:click=toggle_theme>"Toggle theme"</button>
				<span class="status">{status}</span>
			</header>
			<FlowCanvas args=args on_change=on_change theme=theme />
		</div>
	}
}
