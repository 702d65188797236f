//! Outbound sync channel: the only path by which state leaves the widget.

use log::debug;
use serde::{Deserialize, Serialize};

use super::types::{Edge, Node, Timestamp};

/// Keys the render layer may attach to node data. They are never persisted.
pub const TRANSIENT_DATA_KEYS: &[&str] = &["onTextChange", "onSubmit"];

/// Edge keys derived from the theme rather than owned by the host.
pub const DERIVED_EDGE_KEYS: &[&str] = &["labelStyle"];

pub trait Clock {
	fn now(&self) -> Timestamp;
}

/// Wall-clock milliseconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	#[cfg(target_arch = "wasm32")]
	fn now(&self) -> Timestamp {
		Timestamp(js_sys::Date::now() as i64)
	}

	#[cfg(not(target_arch = "wasm32"))]
	fn now(&self) -> Timestamp {
		use std::time::{SystemTime, UNIX_EPOCH};
		let millis = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_millis() as i64)
			.unwrap_or_default();
		Timestamp(millis)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundPayload {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	pub selected_id: Option<String>,
	pub timestamp: Timestamp,
}

pub struct SyncChannel<C> {
	clock: C,
	last_applied: Timestamp,
	published: u64,
}

impl<C: Clock> SyncChannel<C> {
	pub fn new(clock: C, last_applied: Timestamp) -> Self {
		Self {
			clock,
			last_applied,
			published: 0,
		}
	}

	pub fn last_applied(&self) -> Timestamp {
		self.last_applied
	}

	/// Number of payloads handed to the host so far.
	pub fn published(&self) -> u64 {
		self.published
	}

	pub fn record_applied(&mut self, timestamp: Timestamp) {
		self.last_applied = timestamp;
	}

	pub fn now(&self) -> Timestamp {
		self.clock.now()
	}

	/// Never earlier than anything already applied, even if the wall clock
	/// lags the host's.
	pub fn mint(&mut self) -> Timestamp {
		let timestamp = self.clock.now().max(self.last_applied.next());
		self.last_applied = timestamp;
		timestamp
	}

	pub fn publish(
		&mut self,
		nodes: &[Node],
		edges: &[Edge],
		selected_id: Option<String>,
	) -> OutboundPayload {
		let timestamp = self.mint();
		self.published += 1;
		debug!(
			"publishing {} nodes, {} edges at {timestamp} (selected: {selected_id:?})",
			nodes.len(),
			edges.len()
		);
		OutboundPayload {
			nodes: strip_transient(nodes),
			edges: strip_derived(edges),
			selected_id,
			timestamp,
		}
	}
}

pub fn strip_transient(nodes: &[Node]) -> Vec<Node> {
	nodes
		.iter()
		.map(|node| {
			let mut node = node.clone();
			node.data
				.extra
				.retain(|key, _| !TRANSIENT_DATA_KEYS.contains(&key.as_str()));
			node
		})
		.collect()
}

fn strip_derived(edges: &[Edge]) -> Vec<Edge> {
	edges
		.iter()
		.map(|edge| {
			let mut edge = edge.clone();
			edge.label_style = None;
			edge.extra
				.retain(|key, _| !DERIVED_EDGE_KEYS.contains(&key.as_str()));
			edge
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::components::flow::test_utils::ManualClock;
	use crate::components::flow::types::{NodeKind, Position, ThemeBase};

	#[test]
	fn minted_timestamps_never_go_backwards() {
		let clock = ManualClock::at(50);
		let mut sync = SyncChannel::new(clock.clone(), Timestamp(100));
		assert_eq!(sync.mint(), Timestamp(101));
		clock.set(500);
		assert_eq!(sync.mint(), Timestamp(500));
		assert_eq!(sync.last_applied(), Timestamp(500));
	}

	#[test]
	fn publish_strips_render_decorations() {
		let mut node = Node::new("chat", NodeKind::ChatInput, Position::default()).with_content("hi");
		node.data.extra.insert("onSubmit".into(), json!("<fn>"));
		node.data.extra.insert("onTextChange".into(), json!("<fn>"));
		node.data.extra.insert("output".into(), json!("kept"));
		let mut edge = Edge::new("e", "chat", "chat");
		edge.label_style = Some(ThemeBase::Dark.label_style());
		edge.extra.insert("labelStyle".into(), json!({"fill": "white"}));

		let mut sync = SyncChannel::new(ManualClock::at(10), Timestamp(0));
		let payload = sync.publish(&[node], &[edge], None);

		let data = &payload.nodes[0].data;
		assert!(!data.extra.contains_key("onSubmit"));
		assert!(!data.extra.contains_key("onTextChange"));
		assert_eq!(data.extra["output"], json!("kept"));
		assert_eq!(data.content.as_deref(), Some("hi"));
		assert!(payload.edges[0].label_style.is_none());
		assert!(payload.edges[0].extra.is_empty());
		assert_eq!(sync.published(), 1);
	}

	#[test]
	fn payload_uses_null_for_missing_selection() {
		let mut sync = SyncChannel::new(ManualClock::at(10), Timestamp(0));
		let payload = sync.publish(&[], &[], None);
		let value = serde_json::to_value(&payload).unwrap();
		assert_eq!(value["selectedId"], serde_json::Value::Null);
		assert_eq!(value["timestamp"], json!(10));
	}
}
