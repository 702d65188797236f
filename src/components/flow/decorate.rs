//! Per-render view decorations. Computed fresh for every render pass from the
//! canonical nodes and never written back to the store.

use super::types::{HandleSide, Node, NodeKind};
use super::viewport::node_size;

#[derive(Clone, Debug)]
pub struct Decorated<B> {
	pub node: Node,
	/// Input/submit bindings, only for chat nodes.
	pub chat: Option<B>,
}

/// Identity of a rendered node. Everything a node's markup is built from once
/// is part of it, so changing any of these rebuilds the node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey {
	id: String,
	kind: NodeKind,
	connectable: bool,
	source: HandleSide,
	target: HandleSide,
	size: (u64, u64),
}

impl<B> Decorated<B> {
	pub fn key(&self) -> NodeKey {
		let node = &self.node;
		let (w, h) = node_size(node);
		NodeKey {
			id: node.id.clone(),
			kind: node.kind,
			connectable: node.connectable,
			source: node.source_side(),
			target: node.target_side(),
			size: (w.to_bits(), h.to_bits()),
		}
	}
}

pub fn decorate<B>(nodes: &[Node], mut bind: impl FnMut(&str) -> B) -> Vec<Decorated<B>> {
	nodes
		.iter()
		.map(|node| {
			let mut node = node.clone();
			if !node.kind.is_chat() {
				return Decorated { node, chat: None };
			}
			// Chat nodes are always connectable on screen.
			node.connectable = true;
			let chat = Some(bind(&node.id));
			Decorated { node, chat }
		})
		.collect()
}
