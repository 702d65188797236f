//! Deciding whether a host snapshot replaces canonical state.

use log::{debug, info};

use super::config::{EqualTimestampPolicy, FlowArgs};
use super::engine::{Effect, FlowEngine};
use super::sync::Clock;
use super::types::{Edge, Node, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
	Adopt,
	/// Older than what the widget already applied; local edits win.
	Stale,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Reconciler {
	equal: EqualTimestampPolicy,
}

impl Reconciler {
	pub fn new(equal: EqualTimestampPolicy) -> Self {
		Self { equal }
	}

	pub fn judge(&self, last_applied: Timestamp, incoming: Timestamp) -> Verdict {
		if incoming > last_applied {
			return Verdict::Adopt;
		}
		match (incoming == last_applied, self.equal) {
			(true, EqualTimestampPolicy::Adopt) => Verdict::Adopt,
			_ => Verdict::Stale,
		}
	}
}

impl<C: Clock> FlowEngine<C> {
	/// A host update: flags always take effect, the graph only if the
	/// snapshot is recent enough.
	pub fn host_push(&mut self, args: FlowArgs) -> Vec<Effect> {
		let FlowArgs {
			nodes,
			edges,
			timestamp,
			options,
		} = args;
		self.options = options;
		self.reconcile(nodes, edges, timestamp)
	}

	/// All-or-nothing adoption of a host snapshot.
	pub fn reconcile(&mut self, nodes: Vec<Node>, edges: Vec<Edge>, timestamp: Timestamp) -> Vec<Effect> {
		let last_applied = self.sync.last_applied();
		if self.reconciler.judge(last_applied, timestamp) == Verdict::Stale {
			debug!("ignoring host snapshot at {timestamp}, already applied {last_applied}");
			return Vec::new();
		}
		info!(
			"adopting host snapshot at {timestamp}: {} nodes, {} edges",
			nodes.len(),
			edges.len()
		);
		self.store.replace(nodes, edges);
		self.store.restyle_edges(&self.theme.label_style());
		self.sync.record_applied(timestamp);
		self.layout.mark_stale();
		self.layout.reset_surface();
		// Acknowledge the host's push.
		vec![self.publish(None)]
	}
}
