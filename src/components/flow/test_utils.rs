use std::cell::Cell;
use std::rc::Rc;

use super::config::{EngineConfig, FlowArgs, FlowOptions};
use super::engine::{Effect, FlowEngine};
use super::layout::LayoutRequest;
use super::sync::{Clock, OutboundPayload};
use super::types::{Edge, Node, NodeKind, Position, Timestamp};

/// Clock shared between a test and the engine it drives.
#[derive(Clone, Default)]
pub(crate) struct ManualClock(Rc<Cell<i64>>);

impl ManualClock {
	pub(crate) fn at(millis: i64) -> Self {
		Self(Rc::new(Cell::new(millis)))
	}

	pub(crate) fn set(&self, millis: i64) {
		self.0.set(millis);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Timestamp {
		Timestamp(self.0.get())
	}
}

pub(crate) fn node(id: &str) -> Node {
	Node::new(id, NodeKind::Default, Position::default())
}

pub(crate) fn chat_node(id: &str, content: &str) -> Node {
	Node::new(id, NodeKind::ChatDefault, Position::default()).with_content(content)
}

pub(crate) fn args(nodes: Vec<Node>, edges: Vec<Edge>, timestamp: i64) -> FlowArgs {
	FlowArgs {
		nodes,
		edges,
		timestamp: Timestamp(timestamp),
		options: FlowOptions::default(),
	}
}

/// Engine seeded at `timestamp` with its clock reading the same value.
pub(crate) fn engine(
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	timestamp: i64,
) -> (FlowEngine<ManualClock>, ManualClock) {
	let clock = ManualClock::at(timestamp);
	let engine = FlowEngine::new(
		args(nodes, edges, timestamp),
		clock.clone(),
		EngineConfig::default(),
	);
	(engine, clock)
}

pub(crate) fn published(effects: &[Effect]) -> Vec<&OutboundPayload> {
	effects
		.iter()
		.filter_map(|effect| match effect {
			Effect::Publish(payload) => Some(payload),
			_ => None,
		})
		.collect()
}

pub(crate) fn layout_request(effects: &[Effect]) -> Option<LayoutRequest> {
	effects.iter().find_map(|effect| match effect {
		Effect::RunLayout(request) => Some(request.clone()),
		_ => None,
	})
}
