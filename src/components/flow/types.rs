use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_true() -> bool {
	true
}

/// Logical timestamp in wall-clock milliseconds. Only used for relative ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn next(self) -> Self {
		Self(self.0.saturating_add(1))
	}
}

impl fmt::Display for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn offset(self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + dx, self.y + dy)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
	Input,
	Output,
	#[default]
	Default,
	ChatInput,
	ChatOutput,
	ChatDefault,
}

impl NodeKind {
	pub const ALL: [NodeKind; 6] = [
		NodeKind::Input,
		NodeKind::Output,
		NodeKind::Default,
		NodeKind::ChatInput,
		NodeKind::ChatOutput,
		NodeKind::ChatDefault,
	];

	pub fn is_chat(self) -> bool {
		matches!(
			self,
			NodeKind::ChatInput | NodeKind::ChatOutput | NodeKind::ChatDefault
		)
	}

	/// Output nodes only accept incoming edges.
	pub fn has_source_handle(self) -> bool {
		!matches!(self, NodeKind::Output | NodeKind::ChatOutput)
	}

	/// Input nodes only emit outgoing edges.
	pub fn has_target_handle(self) -> bool {
		!matches!(self, NodeKind::Input | NodeKind::ChatInput)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Input => "input",
			NodeKind::Output => "output",
			NodeKind::Default => "default",
			NodeKind::ChatInput => "chatInput",
			NodeKind::ChatOutput => "chatOutput",
			NodeKind::ChatDefault => "chatDefault",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
	Top,
	Right,
	Bottom,
	Left,
}

impl HandleSide {
	pub const ALL: [HandleSide; 4] = [
		HandleSide::Top,
		HandleSide::Right,
		HandleSide::Bottom,
		HandleSide::Left,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			HandleSide::Top => "top",
			HandleSide::Right => "right",
			HandleSide::Bottom => "bottom",
			HandleSide::Left => "left",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|side| side.as_str() == raw)
	}
}

/// Display fields of a node. Keys the widget does not know are kept in `extra`
/// so the host gets them back untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub submitted_content: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub placeholder: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl NodeData {
	pub fn with_content(content: impl Into<String>) -> Self {
		Self {
			content: Some(content.into()),
			..Self::default()
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	pub id: String,
	#[serde(rename = "type", default)]
	pub kind: NodeKind,
	#[serde(default)]
	pub position: Position,
	#[serde(default)]
	pub data: NodeData,
	#[serde(default = "default_true")]
	pub connectable: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_position: Option<HandleSide>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target_position: Option<HandleSide>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub width: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub height: Option<f64>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl Node {
	pub fn new(id: impl Into<String>, kind: NodeKind, position: Position) -> Self {
		Self {
			id: id.into(),
			kind,
			position,
			data: NodeData::default(),
			connectable: true,
			source_position: None,
			target_position: None,
			width: None,
			height: None,
			extra: Map::new(),
		}
	}

	pub fn with_content(mut self, content: impl Into<String>) -> Self {
		self.data.content = Some(content.into());
		self
	}

	/// Side the outgoing handle sits on. Chat nodes read left to right.
	pub fn source_side(&self) -> HandleSide {
		self.source_position.unwrap_or(if self.kind.is_chat() {
			HandleSide::Right
		} else {
			HandleSide::Bottom
		})
	}

	pub fn target_side(&self) -> HandleSide {
		self.target_position.unwrap_or(if self.kind.is_chat() {
			HandleSide::Left
		} else {
			HandleSide::Top
		})
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
	pub fill: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	pub id: String,
	pub source: String,
	pub target: String,
	#[serde(default)]
	pub animated: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	#[serde(default = "default_true")]
	pub label_show_bg: bool,
	/// Derived from the active theme; never part of canonical state.
	#[serde(skip)]
	pub label_style: Option<LabelStyle>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl Edge {
	pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			animated: false,
			label: None,
			kind: None,
			label_show_bg: true,
			label_style: None,
			extra: Map::new(),
		}
	}

	pub fn touches(&self, node_id: &str) -> bool {
		self.source == node_id || self.target == node_id
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeBase {
	#[default]
	Light,
	Dark,
}

impl ThemeBase {
	pub fn label_style(self) -> LabelStyle {
		let fill = match self {
			ThemeBase::Light => "black",
			ThemeBase::Dark => "white",
		};
		LabelStyle { fill: fill.into() }
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn node_round_trips_host_wire_names() {
		let raw = json!({
			"id": "chat_in_1",
			"type": "chatInput",
			"position": {"x": 0.0, "y": 0.0},
			"data": {"content": "hi", "submittedContent": "hello", "output": "OUTPUT: hello"},
			"sourcePosition": "right",
			"deletable": true
		});
		let node: Node = serde_json::from_value(raw).unwrap();
		assert_eq!(node.kind, NodeKind::ChatInput);
		assert_eq!(node.data.submitted_content.as_deref(), Some("hello"));
		assert_eq!(node.data.extra["output"], json!("OUTPUT: hello"));
		assert_eq!(node.extra["deletable"], json!(true));
		assert!(node.connectable);

		let back = serde_json::to_value(&node).unwrap();
		assert_eq!(back["type"], json!("chatInput"));
		assert_eq!(back["sourcePosition"], json!("right"));
		assert_eq!(back["data"]["submittedContent"], json!("hello"));
	}

	#[test]
	fn edge_label_style_is_never_serialized() {
		let mut edge = Edge::new("e", "a", "b");
		edge.label_style = Some(ThemeBase::Dark.label_style());
		let value = serde_json::to_value(&edge).unwrap();
		assert!(value.get("labelStyle").is_none());
		assert_eq!(value["labelShowBg"], json!(true));
	}

	#[test]
	fn handle_sides_follow_node_kind() {
		let chat = Node::new("c", NodeKind::ChatDefault, Position::default());
		assert_eq!(chat.source_side(), HandleSide::Right);
		assert_eq!(chat.target_side(), HandleSide::Left);

		let plain = Node::new("p", NodeKind::Default, Position::default());
		assert_eq!(plain.source_side(), HandleSide::Bottom);
		assert_eq!(plain.target_side(), HandleSide::Top);

		assert!(!NodeKind::Output.has_source_handle());
		assert!(!NodeKind::ChatInput.has_target_handle());
		assert_eq!(NodeKind::parse("chatOutput"), Some(NodeKind::ChatOutput));
	}
}
