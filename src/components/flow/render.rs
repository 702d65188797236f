//! Canvas layer: background grid, edges, and the in-progress connection line.
//! Nodes are DOM elements layered on top (see the component).

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::types::{Edge, Node, Position, ThemeBase};
use super::viewport::{Viewport, edge_segment};

const GRID_GAP: f64 = 20.0;

pub struct Scene<'a> {
	pub nodes: &'a [Node],
	pub edges: &'a [Edge],
	pub viewport: &'a Viewport,
	pub theme: ThemeBase,
	pub selected: Option<&'a str>,
	/// Seconds since mount; drives the dash offset of animated edges.
	pub flow_time: f64,
	/// Source handle and current pointer (graph space) of a drag-to-connect.
	pub pending: Option<(Position, Position)>,
}

pub fn render(scene: &Scene<'_>, ctx: &CanvasRenderingContext2d) {
	let vp = scene.viewport;
	let (bg, dot) = match scene.theme {
		ThemeBase::Light => ("#ffffff", "#d0d0d8"),
		ThemeBase::Dark => ("#0e1117", "#2e3340"),
	};
	ctx.set_fill_style_str(bg);
	ctx.fill_rect(0.0, 0.0, vp.width, vp.height);
	draw_grid(vp, dot, ctx);

	ctx.save();
	let _ = ctx.translate(vp.x, vp.y);
	let _ = ctx.scale(vp.k, vp.k);
	draw_edges(scene, ctx);
	if let Some((from, to)) = scene.pending {
		ctx.set_stroke_style_str("#b1b1b7");
		ctx.set_line_width(1.5 / vp.k);
		ctx.begin_path();
		ctx.move_to(from.x, from.y);
		ctx.line_to(to.x, to.y);
		ctx.stroke();
	}
	ctx.restore();
}

fn draw_grid(vp: &Viewport, color: &str, ctx: &CanvasRenderingContext2d) {
	let gap = GRID_GAP * vp.k;
	if gap < 4.0 {
		return;
	}
	ctx.set_fill_style_str(color);
	let (ox, oy) = (vp.x.rem_euclid(gap), vp.y.rem_euclid(gap));
	let mut x = ox;
	while x < vp.width {
		let mut y = oy;
		while y < vp.height {
			ctx.fill_rect(x, y, 1.0, 1.0);
			y += gap;
		}
		x += gap;
	}
}

fn draw_edges(scene: &Scene<'_>, ctx: &CanvasRenderingContext2d) {
	let k = scene.viewport.k;
	let (dash, gap, arrow_size) = (5.0 / k, 5.0 / k, 8.0 / k);
	let dash_offset = -(scene.flow_time * 30.0) % (dash + gap);

	for edge in scene.edges {
		let Some((a, b)) = edge_segment(scene.nodes, edge) else {
			continue;
		};
		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let selected = scene.selected == Some(edge.id.as_str());
		let color = if selected { "#555566" } else { "#b1b1b7" };

		ctx.set_stroke_style_str(color);
		ctx.set_line_width(if selected { 2.0 / k } else { 1.0 / k });
		if edge.animated {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x - ux * arrow_size, b.y - uy * arrow_size);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		ctx.set_fill_style_str(color);
		let (back_x, back_y) = (b.x - ux * arrow_size, b.y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(b.x, b.y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		if let Some(label) = &edge.label {
			draw_label(edge, label, (a.x + b.x) / 2.0, (a.y + b.y) / 2.0, k, ctx);
		}
	}
}

fn draw_label(edge: &Edge, label: &str, x: f64, y: f64, k: f64, ctx: &CanvasRenderingContext2d) {
	let font_px = 10.0 / k.max(0.5);
	ctx.set_font(&format!("{font_px}px sans-serif"));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	if edge.label_show_bg {
		let width = ctx
			.measure_text(label)
			.map(|m| m.width())
			.unwrap_or(label.len() as f64 * font_px * 0.6);
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
		ctx.fill_rect(x - width / 2.0 - 2.0, y - font_px / 2.0 - 2.0, width + 4.0, font_px + 4.0);
	}
	let fill = edge
		.label_style
		.as_ref()
		.map_or("black", |style| style.fill.as_str());
	ctx.set_fill_style_str(fill);
	let _ = ctx.fill_text(label, x, y);
}
