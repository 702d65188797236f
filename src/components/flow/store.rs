//! Canonical node/edge collections. No policy lives here.

use super::error::FlowError;
use super::types::{Edge, LabelStyle, Node, Position};

/// Edge key under which a layout engine may leave routing points.
pub const WAYPOINTS_KEY: &str = "points";

#[derive(Clone, Debug, Default)]
pub struct GraphStore {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	generation: u64,
}

impl GraphStore {
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		Self {
			nodes,
			edges,
			generation: 0,
		}
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Structural generation: advances when nodes or edges are added, removed
	/// or replaced wholesale. Position and content edits leave it alone.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edges.iter().find(|e| e.id == id)
	}

	pub fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
		self.edges.iter_mut().find(|e| e.id == id)
	}

	pub fn edge_between(&self, source: &str, target: &str) -> Option<&Edge> {
		self.edges
			.iter()
			.find(|e| e.source == source && e.target == target)
	}

	pub fn replace(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
		self.nodes = nodes;
		self.edges = edges;
		self.generation += 1;
	}

	/// Apply a layout result. Only geometry is taken: node positions by id and
	/// edge waypoints by edge id. Everything else stays as it is now, since the
	/// result was computed from an older copy.
	pub fn apply_layout(&mut self, positioned: &[Node], routed: &[Edge]) {
		for node in &mut self.nodes {
			if let Some(placed) = positioned.iter().find(|p| p.id == node.id) {
				node.position = placed.position;
			}
		}
		for edge in &mut self.edges {
			let Some(points) = routed
				.iter()
				.find(|r| r.id == edge.id)
				.and_then(|r| r.extra.get(WAYPOINTS_KEY))
			else {
				continue;
			};
			edge.extra.insert(WAYPOINTS_KEY.to_owned(), points.clone());
		}
	}

	pub fn move_node(&mut self, id: &str, position: Position) -> bool {
		match self.node_mut(id) {
			Some(node) => {
				node.position = position;
				true
			}
			None => false,
		}
	}

	pub fn insert_node(&mut self, node: Node) -> Result<(), FlowError> {
		if self.node(&node.id).is_some() {
			return Err(FlowError::DuplicateNode(node.id));
		}
		self.nodes.push(node);
		self.generation += 1;
		Ok(())
	}

	/// Returns `false` when an edge with the same id is already present.
	pub fn insert_edge(&mut self, edge: Edge) -> bool {
		if self.edge(&edge.id).is_some() {
			return false;
		}
		self.edges.push(edge);
		self.generation += 1;
		true
	}

	/// Removes the node and every edge touching it.
	pub fn remove_node(&mut self, id: &str) -> Result<Node, FlowError> {
		let idx = self
			.nodes
			.iter()
			.position(|n| n.id == id)
			.ok_or_else(|| FlowError::UnknownNode(id.to_owned()))?;
		let node = self.nodes.remove(idx);
		self.edges.retain(|e| !e.touches(id));
		self.generation += 1;
		Ok(node)
	}

	pub fn remove_edge(&mut self, id: &str) -> Result<Edge, FlowError> {
		let idx = self
			.edges
			.iter()
			.position(|e| e.id == id)
			.ok_or_else(|| FlowError::UnknownEdge(id.to_owned()))?;
		self.generation += 1;
		Ok(self.edges.remove(idx))
	}

	/// `base` if free, otherwise `base-1`, `base-2`, ...
	pub fn unique_node_id(&self, base: &str) -> String {
		if self.node(base).is_none() {
			return base.to_owned();
		}
		(1..)
			.map(|n| format!("{base}-{n}"))
			.find(|candidate| self.node(candidate).is_none())
			.unwrap_or_else(|| base.to_owned())
	}

	pub fn restyle_edges(&mut self, style: &LabelStyle) {
		for edge in &mut self.edges {
			edge.label_style = Some(style.clone());
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::components::flow::types::NodeKind;

	fn store() -> GraphStore {
		GraphStore::new(
			vec![
				Node::new("a", NodeKind::Input, Position::default()),
				Node::new("b", NodeKind::Default, Position::new(0.0, 100.0)),
				Node::new("c", NodeKind::Output, Position::new(0.0, 200.0)),
			],
			vec![Edge::new("ab", "a", "b"), Edge::new("bc", "b", "c")],
		)
	}

	#[test]
	fn removing_a_node_drops_incident_edges() {
		let mut store = store();
		store.remove_node("b").unwrap();
		assert_eq!(store.nodes().len(), 2);
		assert!(store.edges().is_empty());
		assert_eq!(store.generation(), 1);
	}

	#[test]
	fn position_edits_keep_the_generation() {
		let mut store = store();
		assert!(store.move_node("a", Position::new(5.0, 5.0)));
		assert!(!store.move_node("zz", Position::new(5.0, 5.0)));
		assert_eq!(store.node("a").unwrap().position, Position::new(5.0, 5.0));
		assert_eq!(store.generation(), 0);
	}

	#[test]
	fn duplicate_node_ids_are_rejected() {
		let mut store = store();
		let err = store
			.insert_node(Node::new("a", NodeKind::Default, Position::default()))
			.unwrap_err();
		assert!(matches!(err, FlowError::DuplicateNode(id) if id == "a"));
		assert_eq!(store.unique_node_id("a"), "a-1");
		assert_eq!(store.unique_node_id("fresh"), "fresh");
	}

	#[test]
	fn edges_with_existing_ids_are_not_appended_twice() {
		let mut store = store();
		assert!(!store.insert_edge(Edge::new("ab", "a", "b")));
		assert!(store.insert_edge(Edge::new("ac", "a", "c")));
		assert_eq!(store.edges().len(), 3);
		assert_eq!(store.generation(), 1);
	}

	#[test]
	fn layout_result_only_moves_known_nodes() {
		let mut store = store();
		let placed = vec![
			Node::new("a", NodeKind::Input, Position::new(10.0, 20.0)),
			Node::new("ghost", NodeKind::Input, Position::new(1.0, 1.0)),
		];
		let edges = store.edges().to_vec();
		store.apply_layout(&placed, &edges);
		assert_eq!(store.node("a").unwrap().position, Position::new(10.0, 20.0));
		assert_eq!(store.node("b").unwrap().position, Position::new(0.0, 100.0));
		assert!(store.node("ghost").is_none());
		assert_eq!(store.generation(), 0);
	}

	#[test]
	fn layout_result_keeps_current_edge_fields() {
		let mut store = store();
		let mut routed = store.edges().to_vec();
		routed[0].extra.insert(WAYPOINTS_KEY.to_owned(), json!([[0, 50]]));

		let edge = store.edge_mut("ab").unwrap();
		edge.label = Some("calls".into());
		edge.animated = true;
		store.apply_layout(&[], &routed);

		let edge = store.edge("ab").unwrap();
		assert_eq!(edge.label.as_deref(), Some("calls"));
		assert!(edge.animated);
		assert_eq!(edge.extra.get(WAYPOINTS_KEY), Some(&json!([[0, 50]])));
	}
}
