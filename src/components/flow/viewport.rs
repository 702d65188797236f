use super::types::{Edge, HandleSide, Node, Position};

pub const NODE_SIZE: (f64, f64) = (150.0, 40.0);
pub const CHAT_NODE_SIZE: (f64, f64) = (220.0, 120.0);
/// Screen-space distance under which a pointer counts as over an edge.
pub const EDGE_HIT_TOLERANCE: f64 = 6.0;

/// Intrinsic size of a node. Host-provided dimensions win.
pub fn node_size(node: &Node) -> (f64, f64) {
	let (w, h) = if node.kind.is_chat() {
		CHAT_NODE_SIZE
	} else {
		NODE_SIZE
	};
	(node.width.unwrap_or(w), node.height.unwrap_or(h))
}

/// Graph-space anchor point of a handle on a node's border.
pub fn handle_point(node: &Node, side: HandleSide) -> Position {
	let (w, h) = node_size(node);
	let Position { x, y } = node.position;
	match side {
		HandleSide::Top => Position::new(x + w / 2.0, y),
		HandleSide::Right => Position::new(x + w, y + h / 2.0),
		HandleSide::Bottom => Position::new(x + w / 2.0, y + h),
		HandleSide::Left => Position::new(x, y + h / 2.0),
	}
}

/// Segment an edge is drawn along, from the source handle to the target handle.
pub fn edge_segment(nodes: &[Node], edge: &Edge) -> Option<(Position, Position)> {
	let source = nodes.iter().find(|n| n.id == edge.source)?;
	let target = nodes.iter().find(|n| n.id == edge.target)?;
	Some((
		handle_point(source, source.source_side()),
		handle_point(target, target.target_side()),
	))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min: Position,
	pub max: Position,
}

impl Bounds {
	pub fn of(nodes: &[Node]) -> Option<Self> {
		let mut iter = nodes.iter();
		let first = iter.next()?;
		let (w, h) = node_size(first);
		let mut bounds = Bounds {
			min: first.position,
			max: first.position.offset(w, h),
		};
		for node in iter {
			let (w, h) = node_size(node);
			bounds.min.x = bounds.min.x.min(node.position.x);
			bounds.min.y = bounds.min.y.min(node.position.y);
			bounds.max.x = bounds.max.x.max(node.position.x + w);
			bounds.max.y = bounds.max.y.max(node.position.y + h);
		}
		Some(bounds)
	}

	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}
}

/// Pan/zoom of the visible surface: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub x: f64,
	pub y: f64,
	pub k: f64,
	pub width: f64,
	pub height: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
			width: 800.0,
			height: 500.0,
		}
	}
}

impl Viewport {
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Position {
		Position::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn graph_to_screen(&self, p: Position) -> (f64, f64) {
		(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Zoom around a screen point so the graph point under it stays put.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, min_zoom: f64, max_zoom: f64) {
		let new_k = (self.k * factor).clamp(min_zoom, max_zoom);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}

	/// Center `nodes` with `padding` (fraction of the surface) around them.
	pub fn fit(&mut self, nodes: &[Node], padding: f64, min_zoom: f64, max_zoom: f64) {
		let Some(bounds) = Bounds::of(nodes) else {
			return;
		};
		let usable_w = self.width * (1.0 - 2.0 * padding);
		let usable_h = self.height * (1.0 - 2.0 * padding);
		let k = (usable_w / bounds.width().max(1.0))
			.min(usable_h / bounds.height().max(1.0))
			.clamp(min_zoom, max_zoom);
		let center = Position::new(
			bounds.min.x + bounds.width() / 2.0,
			bounds.min.y + bounds.height() / 2.0,
		);
		self.k = k;
		self.x = self.width / 2.0 - center.x * k;
		self.y = self.height / 2.0 - center.y * k;
	}

	pub fn edge_at<'a>(&self, nodes: &[Node], edges: &'a [Edge], sx: f64, sy: f64) -> Option<&'a Edge> {
		let p = self.screen_to_graph(sx, sy);
		// Tolerance is in screen pixels, so it shrinks in graph space as we zoom in.
		let tolerance = EDGE_HIT_TOLERANCE / self.k;
		edges.iter().rev().find(|edge| {
			edge_segment(nodes, edge)
				.is_some_and(|(a, b)| distance_to_segment(p, a, b) <= tolerance)
		})
	}
}

fn distance_to_segment(p: Position, a: Position, b: Position) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	let t = if len_sq < f64::EPSILON {
		0.0
	} else {
		(((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.x + t * dx, a.y + t * dy);
	((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}
