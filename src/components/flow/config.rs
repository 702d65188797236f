//! Host arguments and engine tuning.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::FlowError;
use super::layout::LayoutOptions;
use super::types::{Edge, Node, Timestamp};

/// Everything the host sends on each update: the graph snapshot plus feature flags.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowArgs {
	#[serde(default)]
	pub nodes: Vec<Node>,
	#[serde(default)]
	pub edges: Vec<Edge>,
	#[serde(default)]
	pub timestamp: Timestamp,
	#[serde(flatten)]
	pub options: FlowOptions,
}

impl FlowArgs {
	pub fn from_json(raw: &str) -> Result<Self, FlowError> {
		Ok(serde_json::from_str(raw)?)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowOptions {
	pub height: f64,
	pub fit_view: bool,
	pub layout_options: LayoutOptions,
	pub min_zoom: f64,
	pub style: Map<String, Value>,
	pub show_controls: bool,
	pub show_mini_map: bool,
	pub allow_new_edges: bool,
	pub allow_zoom: bool,
	pub pan_on_drag: bool,
	pub animate_new_edges: bool,
	pub get_node_on_click: bool,
	pub get_edge_on_click: bool,
	pub enable_pane_menu: bool,
	pub enable_node_menu: bool,
	pub enable_edge_menu: bool,
	pub hide_watermark: bool,
}

impl Default for FlowOptions {
	fn default() -> Self {
		Self {
			height: 500.0,
			fit_view: false,
			layout_options: LayoutOptions::default(),
			min_zoom: 0.5,
			style: Map::new(),
			show_controls: true,
			show_mini_map: false,
			allow_new_edges: false,
			allow_zoom: true,
			pan_on_drag: true,
			animate_new_edges: false,
			get_node_on_click: false,
			get_edge_on_click: false,
			enable_pane_menu: false,
			enable_node_menu: false,
			enable_edge_menu: false,
			hide_watermark: false,
		}
	}
}

impl FlowOptions {
	/// Inline CSS for the host-provided `style` map. camelCase keys become kebab-case.
	pub fn style_css(&self) -> String {
		self.style
			.iter()
			.filter_map(|(key, value)| {
				let value = match value {
					Value::String(s) => s.clone(),
					Value::Number(n) => n.to_string(),
					_ => return None,
				};
				let mut css_key = String::with_capacity(key.len() + 4);
				for ch in key.chars() {
					if ch.is_ascii_uppercase() {
						css_key.push('-');
						css_key.push(ch.to_ascii_lowercase());
					} else {
						css_key.push(ch);
					}
				}
				Some(format!("{css_key}: {value};"))
			})
			.collect::<Vec<_>>()
			.join(" ")
	}
}

/// What to do with a host push whose timestamp equals the last applied one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EqualTimestampPolicy {
	#[default]
	Adopt,
	Ignore,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
	/// Distance from the bottom/right surface edge under which a menu anchors
	/// from that edge instead.
	pub menu_margin: f64,
	pub equal_timestamp: EqualTimestampPolicy,
	/// Fraction of the surface left empty around the graph after a viewport fit.
	pub fit_padding: f64,
	pub max_zoom: f64,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			menu_margin: 200.0,
			equal_timestamp: EqualTimestampPolicy::Adopt,
			fit_padding: 0.1,
			max_zoom: 2.0,
		}
	}
}
