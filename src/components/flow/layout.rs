//! Automatic layout: the engine seam plus the bookkeeping that decides when a
//! pass runs and whether its result still applies.

use std::collections::{HashMap, VecDeque};
use std::f64::consts::PI;
use std::future::Future;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;
use serde::{Deserialize, Serialize};

use super::error::LayoutError;
use super::types::{Edge, Node, Position};
use super::viewport::node_size;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	#[default]
	Right,
	Down,
	Left,
	Up,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayeredOptions {
	pub direction: Direction,
	pub node_spacing: f64,
	pub layer_spacing: f64,
}

impl Default for LayeredOptions {
	fn default() -> Self {
		Self {
			direction: Direction::Right,
			node_spacing: 75.0,
			layer_spacing: 75.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForceOptions {
	pub iterations: u32,
	pub charge: f32,
	pub spring: f32,
	/// Multiplier from simulation units to graph pixels.
	pub scale: f64,
}

impl Default for ForceOptions {
	fn default() -> Self {
		Self {
			iterations: 300,
			charge: 150.0,
			spring: 0.05,
			scale: 3.0,
		}
	}
}

/// Free-form host layout options, tagged by `algorithm`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum LayoutOptions {
	/// Keep the positions the host sent.
	Manual,
	Layered(LayeredOptions),
	Force(ForceOptions),
}

impl Default for LayoutOptions {
	fn default() -> Self {
		LayoutOptions::Layered(LayeredOptions::default())
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutOutput {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}

/// Positions a graph. Must not touch caller state before the future resolves.
pub trait LayoutEngine {
	fn layout(
		&self,
		nodes: Vec<Node>,
		edges: Vec<Edge>,
		options: &LayoutOptions,
	) -> impl Future<Output = Result<LayoutOutput, LayoutError>>;
}

/// Picks the algorithm named by the options.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoLayout;

impl LayoutEngine for AutoLayout {
	async fn layout(
		&self,
		nodes: Vec<Node>,
		edges: Vec<Edge>,
		options: &LayoutOptions,
	) -> Result<LayoutOutput, LayoutError> {
		check_endpoints(&nodes, &edges)?;
		let nodes = match options {
			LayoutOptions::Manual => nodes,
			LayoutOptions::Layered(opts) => layered(nodes, &edges, opts),
			LayoutOptions::Force(opts) => force(nodes, &edges, opts),
		};
		Ok(LayoutOutput { nodes, edges })
	}
}

fn check_endpoints(nodes: &[Node], edges: &[Edge]) -> Result<(), LayoutError> {
	for edge in edges {
		for endpoint in [&edge.source, &edge.target] {
			if !nodes.iter().any(|n| &n.id == endpoint) {
				return Err(LayoutError::DanglingEdge {
					edge: edge.id.clone(),
					node: endpoint.clone(),
				});
			}
		}
	}
	Ok(())
}

/// Longest-path layering. Cycles are broken by releasing the earliest
/// remaining node.
fn assign_layers(nodes: &[Node], edges: &[Edge]) -> Vec<usize> {
	let index: HashMap<&str, usize> = nodes
		.iter()
		.enumerate()
		.map(|(i, n)| (n.id.as_str(), i))
		.collect();
	let mut outgoing = vec![Vec::new(); nodes.len()];
	let mut indegree = vec![0usize; nodes.len()];
	for edge in edges {
		if let (Some(&s), Some(&t)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
			if s != t {
				outgoing[s].push(t);
				indegree[t] += 1;
			}
		}
	}

	let mut layer = vec![0usize; nodes.len()];
	let mut done = vec![false; nodes.len()];
	let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| indegree[i] == 0).collect();
	let mut processed = 0;
	while processed < nodes.len() {
		let Some(current) = queue.pop_front().or_else(|| (0..nodes.len()).find(|&i| !done[i]))
		else {
			break;
		};
		if done[current] {
			continue;
		}
		done[current] = true;
		processed += 1;
		for &next in &outgoing[current] {
			if done[next] {
				continue;
			}
			layer[next] = layer[next].max(layer[current] + 1);
			indegree[next] = indegree[next].saturating_sub(1);
			if indegree[next] == 0 {
				queue.push_back(next);
			}
		}
	}
	layer
}

fn layered(mut nodes: Vec<Node>, edges: &[Edge], opts: &LayeredOptions) -> Vec<Node> {
	let layers = assign_layers(&nodes, edges);
	let depth = layers.iter().copied().max().map_or(0, |m| m + 1);
	let mut members: Vec<Vec<usize>> = vec![Vec::new(); depth];
	for (i, &l) in layers.iter().enumerate() {
		members[l].push(i);
	}

	let horizontal = matches!(opts.direction, Direction::Right | Direction::Left);
	let sizes: Vec<(f64, f64)> = nodes.iter().map(node_size).collect();
	let along = |i: usize| if horizontal { sizes[i].0 } else { sizes[i].1 };
	let across = |i: usize| if horizontal { sizes[i].1 } else { sizes[i].0 };

	// Extent along the flow axis is the widest/tallest node of each layer.
	let mut flow_offset = 0.0;
	for layer in &members {
		let thickness = layer.iter().map(|&i| along(i)).fold(0.0, f64::max);
		let span: f64 = layer.iter().map(|&i| across(i)).sum::<f64>()
			+ opts.node_spacing * layer.len().saturating_sub(1) as f64;

		let mut cross = -span / 2.0;
		for &i in layer {
			let size = across(i);
			let primary = match opts.direction {
				Direction::Right | Direction::Down => flow_offset,
				Direction::Left | Direction::Up => -flow_offset - along(i),
			};
			nodes[i].position = if horizontal {
				Position::new(primary, cross)
			} else {
				Position::new(cross, primary)
			};
			cross += size + opts.node_spacing;
		}
		flow_offset += thickness + opts.layer_spacing;
	}
	nodes
}

fn force(mut nodes: Vec<Node>, edges: &[Edge], opts: &ForceOptions) -> Vec<Node> {
	let mut graph: ForceGraph<usize, ()> = ForceGraph::new(SimulationParameters {
		force_charge: opts.charge,
		force_spring: opts.spring,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	});
	let mut id_to_idx = HashMap::new();
	let count = nodes.len().max(1) as f64;
	for (i, node) in nodes.iter().enumerate() {
		let angle = (i as f64) * 2.0 * PI / count;
		let idx = graph.add_node(NodeData {
			x: (100.0 * angle.cos()) as f32,
			y: (100.0 * angle.sin()) as f32,
			mass: 10.0,
			is_anchor: false,
			user_data: i,
		});
		id_to_idx.insert(node.id.clone(), idx);
	}
	for edge in edges {
		if let (Some(&src), Some(&tgt)) = (id_to_idx.get(&edge.source), id_to_idx.get(&edge.target)) {
			if src != tgt {
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}
	}
	for _ in 0..opts.iterations {
		graph.update(0.016);
	}
	graph.visit_nodes(|node| {
		let i = node.data.user_data;
		nodes[i].position = Position::new(
			node.x() as f64 * opts.scale,
			node.y() as f64 * opts.scale,
		);
	});
	nodes
}

/// Identifies one layout pass. A result only applies to the generation it was
/// computed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutTicket {
	pub generation: u64,
	pub sequence: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutRequest {
	pub ticket: LayoutTicket,
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	pub options: LayoutOptions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
	Stale,
	InFlight(LayoutTicket),
	Settled,
}

/// What to do with a finished layout pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
	Apply,
	/// Computed for a superseded graph; drop it.
	Discard,
}

#[derive(Clone, Debug)]
pub struct LayoutOrchestrator {
	phase: Phase,
	surface_ready: bool,
	sequence: u64,
	fitted_generation: Option<u64>,
}

impl Default for LayoutOrchestrator {
	fn default() -> Self {
		Self {
			phase: Phase::Stale,
			surface_ready: false,
			sequence: 0,
			fitted_generation: None,
		}
	}
}

impl LayoutOrchestrator {
	pub fn is_stale(&self) -> bool {
		self.phase == Phase::Stale
	}

	pub fn in_flight(&self) -> Option<LayoutTicket> {
		match self.phase {
			Phase::InFlight(ticket) => Some(ticket),
			_ => None,
		}
	}

	pub fn mark_stale(&mut self) {
		self.phase = Phase::Stale;
	}

	/// New nodes must be measured before layout can run again.
	pub fn reset_surface(&mut self) {
		self.surface_ready = false;
	}

	pub fn set_surface_ready(&mut self) {
		self.surface_ready = true;
	}

	/// Starts a pass when the surface is measured and the layout is stale.
	pub fn begin(&mut self, generation: u64) -> Option<LayoutTicket> {
		if !self.surface_ready || self.phase != Phase::Stale {
			return None;
		}
		self.sequence += 1;
		let ticket = LayoutTicket {
			generation,
			sequence: self.sequence,
		};
		self.phase = Phase::InFlight(ticket);
		Some(ticket)
	}

	pub fn complete(&mut self, ticket: LayoutTicket, generation: u64) -> Completion {
		let current = self.phase == Phase::InFlight(ticket);
		if current && ticket.generation == generation {
			self.phase = Phase::Settled;
			return Completion::Apply;
		}
		debug!("discarding layout {ticket:?} (generation now {generation})");
		if current {
			// The graph changed locally while this pass ran.
			self.phase = Phase::Stale;
		}
		Completion::Discard
	}

	/// No automatic retry after a failure.
	pub fn fail(&mut self, ticket: LayoutTicket) {
		if self.phase == Phase::InFlight(ticket) {
			self.phase = Phase::Settled;
		}
	}

	/// True at most once per generation.
	pub fn take_fit(&mut self, generation: u64) -> bool {
		if self.fitted_generation == Some(generation) {
			return false;
		}
		self.fitted_generation = Some(generation);
		true
	}
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;
	use rstest::rstest;

	use super::*;
	use crate::components::flow::types::NodeKind;

	fn chain() -> (Vec<Node>, Vec<Edge>) {
		let nodes = ["a", "b", "c"]
			.into_iter()
			.map(|id| Node::new(id, NodeKind::Default, Position::default()))
			.collect();
		let edges = vec![Edge::new("ab", "a", "b"), Edge::new("bc", "b", "c")];
		(nodes, edges)
	}

	fn pos(out: &LayoutOutput, id: &str) -> Position {
		out.nodes.iter().find(|n| n.id == id).unwrap().position
	}

	#[rstest]
	#[case(Direction::Right)]
	#[case(Direction::Down)]
	#[case(Direction::Left)]
	#[case(Direction::Up)]
	fn layered_layout_follows_direction(#[case] direction: Direction) {
		let (nodes, edges) = chain();
		let options = LayoutOptions::Layered(LayeredOptions {
			direction,
			..LayeredOptions::default()
		});
		let out = block_on(AutoLayout.layout(nodes, edges, &options)).unwrap();
		let (a, b, c) = (pos(&out, "a"), pos(&out, "b"), pos(&out, "c"));
		match direction {
			Direction::Right => assert!(a.x < b.x && b.x < c.x),
			Direction::Left => assert!(a.x > b.x && b.x > c.x),
			Direction::Down => assert!(a.y < b.y && b.y < c.y),
			Direction::Up => assert!(a.y > b.y && b.y > c.y),
		}
	}

	#[test]
	fn siblings_in_one_layer_do_not_overlap() {
		let nodes = ["root", "l", "r"]
			.into_iter()
			.map(|id| Node::new(id, NodeKind::Default, Position::default()))
			.collect();
		let edges = vec![Edge::new("1", "root", "l"), Edge::new("2", "root", "r")];
		let out = block_on(AutoLayout.layout(nodes, edges, &LayoutOptions::default())).unwrap();
		let (l, r) = (pos(&out, "l"), pos(&out, "r"));
		assert_eq!(l.x, r.x);
		assert!((l.y - r.y).abs() >= 40.0);
	}

	#[test]
	fn cycles_still_get_a_layering() {
		let (nodes, mut edges) = chain();
		edges.push(Edge::new("ca", "c", "a"));
		let layers = assign_layers(&nodes, &edges);
		assert_eq!(layers.len(), 3);
		assert!(layers.iter().all(|&l| l < 3));
	}

	#[test]
	fn manual_layout_keeps_positions() {
		let (mut nodes, edges) = chain();
		nodes[1].position = Position::new(42.0, 7.0);
		let out = block_on(AutoLayout.layout(nodes.clone(), edges, &LayoutOptions::Manual)).unwrap();
		assert_eq!(out.nodes, nodes);
	}

	#[test]
	fn force_layout_spreads_nodes_apart() {
		let (nodes, edges) = chain();
		let options = LayoutOptions::Force(ForceOptions {
			iterations: 50,
			..ForceOptions::default()
		});
		let out = block_on(AutoLayout.layout(nodes, edges, &options)).unwrap();
		let (a, c) = (pos(&out, "a"), pos(&out, "c"));
		assert!(a.x.is_finite() && a.y.is_finite());
		assert_ne!(a, c);
	}

	#[test]
	fn dangling_edges_are_rejected() {
		let (nodes, mut edges) = chain();
		edges.push(Edge::new("ax", "a", "x"));
		let err = block_on(AutoLayout.layout(nodes, edges, &LayoutOptions::default())).unwrap_err();
		assert_eq!(
			err,
			LayoutError::DanglingEdge {
				edge: "ax".into(),
				node: "x".into()
			}
		);
	}

	#[test]
	fn orchestrator_waits_for_surface_and_runs_once() {
		let mut orchestrator = LayoutOrchestrator::default();
		assert_eq!(orchestrator.begin(0), None);
		orchestrator.set_surface_ready();
		let ticket = orchestrator.begin(0).unwrap();
		assert_eq!(orchestrator.begin(0), None);
		assert_eq!(orchestrator.complete(ticket, 0), Completion::Apply);
		assert_eq!(orchestrator.begin(0), None);
	}

	#[test]
	fn superseded_results_are_discarded() {
		let mut orchestrator = LayoutOrchestrator::default();
		orchestrator.set_surface_ready();
		let first = orchestrator.begin(0).unwrap();
		orchestrator.mark_stale();
		let second = orchestrator.begin(1).unwrap();
		assert_eq!(orchestrator.complete(first, 1), Completion::Discard);
		assert_eq!(orchestrator.in_flight(), Some(second));
		assert_eq!(orchestrator.complete(second, 1), Completion::Apply);
	}

	#[test]
	fn failures_settle_without_retry() {
		let mut orchestrator = LayoutOrchestrator::default();
		orchestrator.set_surface_ready();
		let ticket = orchestrator.begin(0).unwrap();
		orchestrator.fail(ticket);
		assert!(!orchestrator.is_stale());
		assert_eq!(orchestrator.begin(0), None);
	}

	#[test]
	fn fit_happens_once_per_generation() {
		let mut orchestrator = LayoutOrchestrator::default();
		assert!(orchestrator.take_fit(3));
		assert!(!orchestrator.take_fit(3));
		assert!(orchestrator.take_fit(4));
	}
}
