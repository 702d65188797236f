//! Pointer and text interactions. Each handler closes any open menu, mutates
//! the store, then publishes with the selection it reports.

use log::{debug, warn};

use super::engine::{Effect, FlowEngine};
use super::sync::Clock;
use super::types::{Edge, Position};

/// Id given to an edge created by dragging from `source` to `target`.
pub fn connect_edge_id(source: &str, target: &str) -> String {
	format!("st-flow-edge_{source}-{target}")
}

impl<C: Clock> FlowEngine<C> {
	pub fn pane_click(&mut self) -> Vec<Effect> {
		self.close_menu();
		vec![self.publish(None)]
	}

	/// Reported to the host only when it opted in to node clicks.
	pub fn node_click(&mut self, node_id: &str) -> Vec<Effect> {
		self.close_menu();
		if !self.options.get_node_on_click {
			return Vec::new();
		}
		vec![self.publish(Some(node_id.to_owned()))]
	}

	pub fn edge_click(&mut self, edge_id: &str) -> Vec<Effect> {
		self.close_menu();
		if !self.options.get_edge_on_click {
			return Vec::new();
		}
		vec![self.publish(Some(edge_id.to_owned()))]
	}

	/// Whether dragging from `node_id`'s outgoing handle may begin a connection.
	/// Chat nodes are connectable on screen whatever the stored flag says.
	pub fn can_start_connect(&self, node_id: &str) -> bool {
		self.options.allow_new_edges
			&& self.store.node(node_id).is_some_and(|node| {
				node.kind.has_source_handle() && (node.connectable || node.kind.is_chat())
			})
	}

	pub fn connect(&mut self, source: &str, target: &str) -> Vec<Effect> {
		if !self.options.allow_new_edges {
			debug!("connect {source} -> {target} ignored, new edges disabled");
			return Vec::new();
		}
		self.close_menu();
		let id = match self.store.edge_between(source, target) {
			Some(existing) => existing.id.clone(),
			None => {
				let id = connect_edge_id(source, target);
				let mut edge = Edge::new(id.clone(), source, target);
				edge.animated = self.options.animate_new_edges;
				edge.label_show_bg = false;
				edge.label_style = Some(self.theme.label_style());
				self.store.insert_edge(edge);
				id
			}
		};
		vec![self.publish(Some(id))]
	}

	pub fn drag_started(&mut self) {
		self.close_menu();
	}

	/// Commits the final position of one dragged node. No layout pass follows.
	pub fn node_drag_stop(&mut self, node_id: &str, position: Position) -> Vec<Effect> {
		self.close_menu();
		if !self.store.move_node(node_id, position) {
			warn!("drag stop for unknown node `{node_id}`");
			return Vec::new();
		}
		vec![self.publish(None)]
	}

	/// Live text of a chat node, published on every change.
	pub fn chat_text_changed(&mut self, node_id: &str, text: String) -> Vec<Effect> {
		self.close_menu();
		let Some(node) = self
			.store
			.node_mut(node_id)
			.filter(|node| node.kind.is_chat())
		else {
			warn!("text change for non-chat node `{node_id}`");
			return Vec::new();
		};
		node.data.content = Some(text);
		vec![self.publish(None)]
	}

	/// Freezes the current content as `submittedContent` and reports the node.
	pub fn chat_submitted(&mut self, node_id: &str) -> Vec<Effect> {
		self.close_menu();
		let Some(node) = self
			.store
			.node_mut(node_id)
			.filter(|node| node.kind.is_chat())
		else {
			warn!("submit for non-chat node `{node_id}`");
			return Vec::new();
		};
		node.data.submitted_content = Some(node.data.content.clone().unwrap_or_default());
		vec![self.publish(Some(node_id.to_owned()))]
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow::menu::MenuKind;
	use crate::components::flow::test_utils::{chat_node, engine, node, published};
	use crate::components::flow::types::{Node, NodeKind, Timestamp};

	#[test]
	fn edge_ids_are_deterministic() {
		assert_eq!(connect_edge_id("a", "b"), "st-flow-edge_a-b");
	}

	#[test]
	fn pane_click_clears_selection() {
		let (mut engine, _) = engine(vec![node("a")], vec![], 100);
		engine.options.get_node_on_click = true;
		engine.node_click("a");
		assert_eq!(engine.selection(), Some("a"));
		let effects = engine.pane_click();
		assert_eq!(published(&effects)[0].selected_id, None);
		assert_eq!(engine.selection(), None);
	}

	#[test]
	fn clicks_are_reported_only_when_opted_in() {
		let (mut engine, _) = engine(
			vec![node("a"), node("b")],
			vec![Edge::new("ab", "a", "b")],
			100,
		);
		engine.options.enable_node_menu = true;
		engine.open_node_menu("a", 1.0, 1.0);
		assert!(engine.node_click("a").is_empty());
		assert!(!engine.menu().is_open());
		assert!(engine.edge_click("ab").is_empty());

		engine.options.get_edge_on_click = true;
		let effects = engine.edge_click("ab");
		assert_eq!(published(&effects)[0].selected_id.as_deref(), Some("ab"));
	}

	#[test]
	fn connect_requires_opt_in_and_does_not_duplicate() {
		let (mut engine, _) = engine(vec![node("a"), node("b")], vec![], 100);
		engine.options.enable_pane_menu = true;
		engine.open_pane_menu(1.0, 1.0);
		assert!(engine.connect("a", "b").is_empty());
		assert!(engine.edges().is_empty());
		assert_eq!(engine.menu().kind(), Some(MenuKind::Pane));

		engine.options.allow_new_edges = true;
		engine.options.animate_new_edges = true;
		engine.connect("a", "b");
		let effects = engine.connect("a", "b");
		assert_eq!(engine.edges().len(), 1);
		let edge = &engine.edges()[0];
		assert!(edge.animated);
		assert!(!edge.label_show_bg);
		assert_eq!(
			published(&effects)[0].selected_id.as_deref(),
			Some("st-flow-edge_a-b")
		);
	}

	#[test]
	fn connections_start_only_from_live_source_handles() {
		let mut locked = node("locked");
		locked.connectable = false;
		let mut chat = chat_node("chat", "");
		chat.connectable = false;
		let sink = Node::new("sink", NodeKind::Output, Position::default());
		let (mut engine, _) = engine(vec![node("a"), locked, chat, sink], vec![], 100);
		assert!(!engine.can_start_connect("a"));

		engine.options.allow_new_edges = true;
		assert!(engine.can_start_connect("a"));
		assert!(engine.can_start_connect("chat"));
		assert!(!engine.can_start_connect("locked"));
		assert!(!engine.can_start_connect("sink"));
		assert!(!engine.can_start_connect("missing"));
	}

	#[test]
	fn connect_reports_an_existing_link_by_its_own_id() {
		let (mut engine, _) = engine(
			vec![node("a"), node("b")],
			vec![Edge::new("host-ab", "a", "b")],
			100,
		);
		engine.options.allow_new_edges = true;
		let effects = engine.connect("a", "b");
		assert_eq!(engine.edges().len(), 1);
		assert_eq!(published(&effects)[0].selected_id.as_deref(), Some("host-ab"));
	}

	#[test]
	fn drag_stop_moves_one_node_in_place() {
		let (mut engine, _) = engine(vec![node("a"), node("b")], vec![], 100);
		let generation = engine.store().generation();
		let effects = engine.node_drag_stop("b", Position::new(12.0, 34.0));
		let payload = published(&effects)[0];
		assert_eq!(payload.selected_id, None);
		assert_eq!(payload.nodes[1].position, Position::new(12.0, 34.0));
		assert_eq!(payload.nodes[0].position, Position::default());
		assert_eq!(engine.store().generation(), generation);
		assert!(engine.node_drag_stop("zz", Position::default()).is_empty());
	}

	#[test]
	fn submit_freezes_content() {
		let (mut engine, _) = engine(vec![chat_node("c", "draft")], vec![], 100);
		let effects = engine.chat_submitted("c");
		let payload = published(&effects)[0];
		assert_eq!(payload.selected_id.as_deref(), Some("c"));
		assert_eq!(payload.nodes[0].data.submitted_content.as_deref(), Some("draft"));

		let effects = engine.chat_text_changed("c", "draft 2".into());
		let payload = published(&effects)[0];
		assert_eq!(payload.selected_id, None);
		assert_eq!(payload.nodes[0].data.content.as_deref(), Some("draft 2"));
		assert_eq!(payload.nodes[0].data.submitted_content.as_deref(), Some("draft"));

		let effects = engine.chat_submitted("c");
		assert_eq!(
			published(&effects)[0].nodes[0].data.submitted_content.as_deref(),
			Some("draft 2")
		);
	}

	#[test]
	fn chat_handlers_ignore_plain_nodes() {
		let (mut engine, _) = engine(vec![node("plain")], vec![], 100);
		assert!(engine.chat_text_changed("plain", "x".into()).is_empty());
		assert!(engine.chat_submitted("plain").is_empty());
		assert!(engine.nodes()[0].data.content.is_none());
	}

	#[test]
	fn every_publish_orders_after_the_last() {
		let (mut engine, clock) = engine(vec![chat_node("c", "")], vec![], 100);
		clock.set(0);
		let mut last = Timestamp(100);
		for text in ["h", "he", "hey"] {
			let effects = engine.chat_text_changed("c", text.into());
			let ts = published(&effects)[0].timestamp;
			assert!(ts > last);
			last = ts;
		}
	}
}
