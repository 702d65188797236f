//! Context menus: at most one open at a time, and every confirmed action is a
//! terminal transition back to [`MenuState::None`].

use log::{debug, warn};

use super::engine::{Effect, FlowEngine};
use super::sync::Clock;
use super::types::{Edge, HandleSide, Node, NodeData, NodeKind, Position};

/// Offset applied to a duplicated node so it does not hide the original.
const DUPLICATE_OFFSET: f64 = 30.0;

/// Screen anchor of a menu. Exactly one of `top`/`bottom` and one of
/// `left`/`right` is set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MenuAnchor {
	pub top: Option<f64>,
	pub left: Option<f64>,
	pub right: Option<f64>,
	pub bottom: Option<f64>,
}

impl MenuAnchor {
	/// Anchor from the bottom/right edge when the pointer is within `margin`
	/// of it, so the menu stays on screen.
	pub fn clamped(sx: f64, sy: f64, width: f64, height: f64, margin: f64) -> Self {
		let near_bottom = sy >= height - margin;
		let near_right = sx >= width - margin;
		Self {
			top: (!near_bottom).then_some(sy),
			left: (!near_right).then_some(sx),
			right: near_right.then_some(width - sx),
			bottom: near_bottom.then_some(height - sy),
		}
	}

	pub fn css(&self) -> String {
		[
			("top", self.top),
			("left", self.left),
			("right", self.right),
			("bottom", self.bottom),
		]
		.into_iter()
		.filter_map(|(side, value)| value.map(|v| format!("{side}: {v}px;")))
		.collect::<Vec<_>>()
		.join(" ")
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuKind {
	Pane,
	Node,
	Edge,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum MenuState {
	#[default]
	None,
	Pane {
		anchor: MenuAnchor,
		/// Where new nodes land, in graph coordinates.
		click_position: Position,
	},
	Node {
		anchor: MenuAnchor,
		node: Node,
	},
	Edge {
		anchor: MenuAnchor,
		edge: Edge,
	},
}

impl MenuState {
	pub fn kind(&self) -> Option<MenuKind> {
		match self {
			MenuState::None => None,
			MenuState::Pane { .. } => Some(MenuKind::Pane),
			MenuState::Node { .. } => Some(MenuKind::Node),
			MenuState::Edge { .. } => Some(MenuKind::Edge),
		}
	}

	pub fn is_open(&self) -> bool {
		self.kind().is_some()
	}

	pub fn anchor(&self) -> Option<MenuAnchor> {
		match self {
			MenuState::None => None,
			MenuState::Pane { anchor, .. }
			| MenuState::Node { anchor, .. }
			| MenuState::Edge { anchor, .. } => Some(*anchor),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeDraft {
	pub content: String,
	pub kind: NodeKind,
	pub connectable: bool,
	pub source_position: Option<HandleSide>,
	pub target_position: Option<HandleSide>,
}

impl Default for NodeDraft {
	fn default() -> Self {
		Self {
			content: String::new(),
			kind: NodeKind::Default,
			connectable: true,
			source_position: None,
			target_position: None,
		}
	}
}

impl NodeDraft {
	fn into_node(self, id: String, position: Position) -> Node {
		let mut node = Node::new(id, self.kind, position);
		node.data = NodeData::with_content(self.content);
		node.connectable = self.connectable;
		node.source_position = self.source_position;
		node.target_position = self.target_position;
		node
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodePatch {
	pub content: Option<String>,
	pub kind: Option<NodeKind>,
	pub connectable: Option<bool>,
	pub source_position: Option<HandleSide>,
	pub target_position: Option<HandleSide>,
}

impl NodePatch {
	fn apply(self, node: &mut Node) {
		if let Some(content) = self.content {
			node.data.content = Some(content);
		}
		if let Some(kind) = self.kind {
			node.kind = kind;
		}
		if let Some(connectable) = self.connectable {
			node.connectable = connectable;
		}
		if let Some(side) = self.source_position {
			node.source_position = Some(side);
		}
		if let Some(side) = self.target_position {
			node.target_position = Some(side);
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgePatch {
	/// `Some("")` clears the label.
	pub label: Option<String>,
	pub animated: Option<bool>,
	pub label_show_bg: Option<bool>,
}

impl EdgePatch {
	fn apply(self, edge: &mut Edge) {
		if let Some(label) = self.label {
			edge.label = (!label.is_empty()).then_some(label);
		}
		if let Some(animated) = self.animated {
			edge.animated = animated;
		}
		if let Some(show) = self.label_show_bg {
			edge.label_show_bg = show;
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum PaneAction {
	AddNode(NodeDraft),
	ResetLayout,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeAction {
	Edit(NodePatch),
	Duplicate,
	Delete,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EdgeAction {
	Edit(EdgePatch),
	Delete,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MenuAction {
	Pane(PaneAction),
	Node(NodeAction),
	Edge(EdgeAction),
}

impl<C: Clock> FlowEngine<C> {
	fn anchor_at(&self, sx: f64, sy: f64) -> MenuAnchor {
		MenuAnchor::clamped(
			sx,
			sy,
			self.viewport.width,
			self.viewport.height,
			self.config.menu_margin,
		)
	}

	/// Secondary activation on empty canvas. Returns whether a menu opened.
	pub fn open_pane_menu(&mut self, sx: f64, sy: f64) -> bool {
		if !self.options.enable_pane_menu {
			return false;
		}
		self.menu = MenuState::Pane {
			anchor: self.anchor_at(sx, sy),
			click_position: self.viewport.screen_to_graph(sx, sy),
		};
		true
	}

	pub fn open_node_menu(&mut self, node_id: &str, sx: f64, sy: f64) -> bool {
		if !self.options.enable_node_menu {
			return false;
		}
		let Some(node) = self.store.node(node_id).cloned() else {
			warn!("node menu requested for unknown node `{node_id}`");
			return false;
		};
		self.menu = MenuState::Node {
			anchor: self.anchor_at(sx, sy),
			node,
		};
		true
	}

	pub fn open_edge_menu(&mut self, edge_id: &str, sx: f64, sy: f64) -> bool {
		if !self.options.enable_edge_menu {
			return false;
		}
		let Some(edge) = self.store.edge(edge_id).cloned() else {
			warn!("edge menu requested for unknown edge `{edge_id}`");
			return false;
		};
		self.menu = MenuState::Edge {
			anchor: self.anchor_at(sx, sy),
			edge,
		};
		true
	}

	pub fn close_menu(&mut self) {
		self.menu = MenuState::None;
	}

	pub fn apply_menu_action(&mut self, action: MenuAction) -> Vec<Effect> {
		match (std::mem::take(&mut self.menu), action) {
			(MenuState::Pane { click_position, .. }, MenuAction::Pane(action)) => {
				self.apply_pane_action(click_position, action)
			}
			(MenuState::Node { node, .. }, MenuAction::Node(action)) => {
				self.apply_node_action(&node.id, action)
			}
			(MenuState::Edge { edge, .. }, MenuAction::Edge(action)) => {
				self.apply_edge_action(&edge.id, action)
			}
			(state, action) => {
				warn!("menu action {action:?} does not match open menu {:?}", state.kind());
				self.menu = state;
				Vec::new()
			}
		}
	}

	fn fresh_node_id(&self) -> String {
		self.store
			.unique_node_id(&format!("st-flow-node_{}", self.sync.now()))
	}

	fn apply_pane_action(&mut self, at: Position, action: PaneAction) -> Vec<Effect> {
		match action {
			PaneAction::AddNode(draft) => {
				let id = self.fresh_node_id();
				if let Err(err) = self.store.insert_node(draft.into_node(id.clone(), at)) {
					warn!("add node failed: {err}");
					return Vec::new();
				}
				vec![self.publish(Some(id))]
			}
			PaneAction::ResetLayout => {
				// Published when the pass completes.
				self.layout.mark_stale();
				self.request_layout().into_iter().collect()
			}
		}
	}

	fn apply_node_action(&mut self, node_id: &str, action: NodeAction) -> Vec<Effect> {
		match action {
			NodeAction::Edit(patch) => {
				let Some(node) = self.store.node_mut(node_id) else {
					debug!("edit on removed node `{node_id}` ignored");
					return Vec::new();
				};
				patch.apply(node);
				vec![self.publish(None)]
			}
			NodeAction::Duplicate => {
				let Some(original) = self.store.node(node_id).cloned() else {
					debug!("duplicate of removed node `{node_id}` ignored");
					return Vec::new();
				};
				let id = self.fresh_node_id();
				let mut copy = original;
				copy.id = id.clone();
				copy.position = copy.position.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
				if let Err(err) = self.store.insert_node(copy) {
					warn!("duplicate node failed: {err}");
					return Vec::new();
				}
				vec![self.publish(Some(id))]
			}
			NodeAction::Delete => match self.store.remove_node(node_id) {
				Ok(_) => vec![self.publish(None)],
				Err(err) => {
					debug!("delete ignored: {err}");
					Vec::new()
				}
			},
		}
	}

	fn apply_edge_action(&mut self, edge_id: &str, action: EdgeAction) -> Vec<Effect> {
		match action {
			EdgeAction::Edit(patch) => {
				let Some(edge) = self.store.edge_mut(edge_id) else {
					debug!("edit on removed edge `{edge_id}` ignored");
					return Vec::new();
				};
				patch.apply(edge);
				vec![self.publish(None)]
			}
			EdgeAction::Delete => match self.store.remove_edge(edge_id) {
				Ok(_) => vec![self.publish(None)],
				Err(err) => {
					debug!("delete ignored: {err}");
					Vec::new()
				}
			},
		}
	}
}
