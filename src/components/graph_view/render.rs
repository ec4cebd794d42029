use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{GraphViewState, HOVER_SCALE, PLACEHOLDER};
use crate::graph::LinkKind;
use crate::layout::heatmap::HeatmapLayout;
use crate::layout::timeline::TimelineLayout;
use crate::layout::tree::TreeLayout;
use crate::layout::{PlacedNode, Scene, link_segments};

const BACKGROUND: &str = "#1a1a2e";
const CURRENT_RING: &str = "#ff9500";
const LABEL_COLOR: &str = "rgba(255, 255, 255, 0.85)";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let (w, h) = (state.viewport.width, state.viewport.height);
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, w, h);

	match &state.scene {
		Scene::Empty => draw_placeholder(ctx, w, h),
		Scene::Force(_) => {
			ctx.save();
			let _ = ctx.translate(state.transform.x, state.transform.y);
			let _ = ctx.scale(state.transform.k, state.transform.k);
			draw_edges(state, ctx);
			draw_nodes(state, ctx);
			ctx.restore();
		}
		Scene::Timeline(t) => draw_timeline(state, t, ctx),
		Scene::Tree(t) => draw_tree(state, t, ctx),
		Scene::Heatmap(hm) => draw_heatmap(state, hm, ctx),
	}
}

fn draw_placeholder(ctx: &CanvasRenderingContext2d, w: f64, h: f64) {
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.5)");
	ctx.set_font("14px sans-serif");
	ctx.set_text_align("center");
	let _ = ctx.fill_text(PLACEHOLDER, w / 2.0, h / 2.0);
	ctx.set_text_align("start");
}

fn draw_label(ctx: &CanvasRenderingContext2d, text: &str, x: f64, y: f64, size: f64, alpha: f64) {
	ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", 0.85 * alpha));
	ctx.set_font(&format!("{size}px sans-serif"));
	ctx.set_text_align("center");
	let _ = ctx.fill_text(text, x, y);
	ctx.set_text_align("start");
}

fn draw_edges(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (dash, gap) = (8.0 / k, 4.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);

	for (link, s, e, edge) in link_segments(&state.graph) {
		let (a, b) = (&state.graph.nodes[s], &state.graph.nodes[e]);
		let highlighted = state.is_highlighted(&a.id) && state.is_highlighted(&b.id);

		// t=0: every edge at base alpha; t=1: highlighted edges brighten, the rest dim
		let (alpha, width) = if highlighted {
			(0.6 + 0.3 * t, edge.width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, edge.width * (1.0 - 0.3 * t))
		};

		ctx.set_stroke_style_str(&format!("rgba(153, 153, 153, {alpha})"));
		ctx.set_line_width(width / k);
		if link.kind == LinkKind::Manual {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}
		ctx.begin_path();
		ctx.move_to(edge.x1, edge.y1);
		ctx.line_to(edge.x2, edge.y2);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}
}

fn draw_nodes(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);
	let font = 10.0 / k.max(0.5);

	// dimmed nodes first so the highlighted ones draw on top
	for node in &state.graph.nodes {
		if has_highlight && state.is_highlighted(&node.id) {
			continue;
		}
		let alpha = if has_highlight { 1.0 - 0.7 * t } else { 1.0 };
		let radius = state.radius(node);
		ctx.set_global_alpha(alpha);
		draw_disc(ctx, node.x, node.y, radius, state.color(node), node.is_current, k);
		ctx.set_global_alpha(1.0);
		if state.settings.show_labels {
			draw_label(ctx, node.display_name(), node.x, node.y + radius + 12.0, font, alpha);
		}
	}

	if !has_highlight {
		return;
	}

	for node in &state.graph.nodes {
		if !state.is_highlighted(&node.id) {
			continue;
		}
		let (x, y) = (node.x, node.y);
		let hovered = state.is_hovered(&node.id);
		let base = state.radius(node);
		let radius = if hovered {
			base * (1.0 + (HOVER_SCALE - 1.0) * t)
		} else {
			base
		};

		if hovered && t > 0.01 {
			let glow = radius * (1.4 + 0.6 * t);
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow) {
				let alpha = 0.35 * t;
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {alpha})"));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		draw_disc(ctx, x, y, radius, state.color(node), node.is_current, k);
		if state.settings.show_labels || hovered {
			draw_label(ctx, node.display_name(), x, y + radius + 12.0, font, 1.0);
		}
	}
}

fn draw_disc(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	radius: f64,
	fill: &str,
	current: bool,
	k: f64,
) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(fill);
	ctx.fill();
	if current {
		ctx.set_stroke_style_str(CURRENT_RING);
		ctx.set_line_width(3.0 / k);
	} else {
		ctx.set_stroke_style_str("#fff");
		ctx.set_line_width(2.0 / k);
	}
	ctx.stroke();
}

fn placed_color<'a>(state: &'a GraphViewState, placed: &PlacedNode) -> (&'a str, bool) {
	placed
		.id
		.as_deref()
		.and_then(|id| state.graph.node(id))
		.map_or(("#888", false), |n| (state.color(n), n.is_current))
}

fn draw_placed(state: &GraphViewState, nodes: &[PlacedNode], ctx: &CanvasRenderingContext2d) {
	for placed in nodes {
		let (fill, current) = placed_color(state, placed);
		let hovered = placed.id.as_deref().is_some_and(|id| state.is_hovered(id));
		let radius = if hovered {
			placed.radius * HOVER_SCALE
		} else {
			placed.radius
		};
		draw_disc(ctx, placed.x, placed.y, radius, fill, current, 1.0);
	}
}

fn draw_timeline(state: &GraphViewState, t: &TimelineLayout, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.4)");
	ctx.set_line_width(1.0);
	ctx.begin_path();
	ctx.move_to(t.axis_span.0, t.axis_y);
	ctx.line_to(t.axis_span.1, t.axis_y);
	ctx.stroke();

	for (x, label) in &t.ticks {
		ctx.begin_path();
		ctx.move_to(*x, t.axis_y);
		ctx.line_to(*x, t.axis_y + 6.0);
		ctx.stroke();
		draw_label(ctx, label, *x, t.axis_y + 20.0, 10.0, 0.7);
	}

	draw_placed(state, &t.nodes, ctx);
	if state.settings.show_labels {
		for n in &t.nodes {
			draw_label(ctx, &n.label, n.x, n.y - n.radius - 6.0, 10.0, 1.0);
		}
	}
}

fn draw_tree(state: &GraphViewState, t: &TreeLayout, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str("rgba(153, 153, 153, 0.6)");
	ctx.set_line_width(1.5);
	for e in &t.edges {
		let mid = (e.x1 + e.x2) / 2.0;
		ctx.begin_path();
		ctx.move_to(e.x1, e.y1);
		ctx.bezier_curve_to(mid, e.y1, mid, e.y2, e.x2, e.y2);
		ctx.stroke();
	}

	draw_placed(state, &t.nodes, ctx);
	ctx.set_fill_style_str(LABEL_COLOR);
	ctx.set_font("10px sans-serif");
	for (n, depth) in t.nodes.iter().zip(&t.depths) {
		if n.id.is_some() && !state.settings.show_labels {
			continue;
		}
		// leaves label to the right, inner nodes to the left
		if *depth == 2 {
			ctx.set_text_align("start");
			let _ = ctx.fill_text(&n.label, n.x + 8.0, n.y + 3.0);
		} else {
			ctx.set_text_align("end");
			let _ = ctx.fill_text(&n.label, n.x - 8.0, n.y + 3.0);
		}
	}
	ctx.set_text_align("start");
}

fn draw_heatmap(state: &GraphViewState, hm: &HeatmapLayout, ctx: &CanvasRenderingContext2d) {
	for cell in &hm.cells {
		let hovered = cell.filled && state.is_hovered(&cell.note);
		ctx.set_fill_style_str(&cell.color);
		ctx.fill_rect(cell.x, cell.y, cell.width, cell.height);
		if hovered {
			ctx.set_stroke_style_str("#fff");
			ctx.set_line_width(1.0);
			ctx.stroke_rect(cell.x, cell.y, cell.width, cell.height);
		}
	}

	ctx.set_fill_style_str(LABEL_COLOR);
	ctx.set_font("10px sans-serif");
	ctx.set_text_align("end");
	let left = hm.cells.first().map_or(120.0, |c| c.x);
	for (y, tag) in &hm.rows {
		let _ = ctx.fill_text(&format!("#{tag}"), left - 6.0, y + 3.0);
	}
	ctx.set_text_align("start");
}
