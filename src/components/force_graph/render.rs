use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::ForceGraphState;
use super::types::NodeKind;

const BACKGROUND: &str = "#1a1a2e";
const LABEL_FONT: &str = "12px sans-serif";
const HUB_FONT: &str = "bold 14px sans-serif";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (dash, gap) = (8.0, 4.0);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);

	state.graph.visit_edges(|n1, n2, _| {
		let (x1, y1, x2, y2) = (n1.x() as f64, n1.y() as f64, n2.x() as f64, n2.y() as f64);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		let (r1, r2) = (n1.data.user_data.radius, n2.data.user_data.radius);
		if dist <= r1 + r2 {
			return;
		}

		let is_highlighted = state.is_highlighted(n1.index()) && state.is_highlighted(n2.index());
		let (alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, 1.5 * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 1.5 * (1.0 - 0.3 * t))
		};

		ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {})", alpha));
		ctx.set_line_width(width);
		if is_highlighted && t > 0.01 {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * r2, y2 - uy * r2);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	});
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
	);

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let lit = has_highlight && state.is_highlighted(idx);
		let hovered = state.is_hovered(idx);

		let (alpha, radius) = match (has_highlight, lit) {
			(false, _) => (1.0, info.radius),
			(true, true) if hovered => (1.0, info.radius * (1.0 + 0.3 * t)),
			(true, true) => (1.0, info.radius * (1.0 + 0.15 * t)),
			(true, false) => (1.0 - 0.7 * t, info.radius * (1.0 - 0.15 * t)),
		};

		if hovered && info.kind == NodeKind::Leaf && t > 0.01 {
			let glow = radius * (1.8 + 1.2 * t);
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow) {
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", 0.35 * t));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();

		if info.kind == NodeKind::Hub {
			ctx.set_stroke_style_str("rgba(100, 180, 255, 0.9)");
			ctx.set_line_width(2.0);
			ctx.stroke();
		}

		if let Some(label) = &info.label {
			ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.9));
			match info.kind {
				NodeKind::Hub => {
					ctx.set_font(HUB_FONT);
					let _ = ctx.fill_text(label, x - radius, y - radius - 6.0);
				}
				NodeKind::Leaf => {
					ctx.set_font(LABEL_FONT);
					let _ = ctx.fill_text(label, x + radius + 4.0, y + 4.0);
				}
			}
		}
		ctx.set_global_alpha(1.0);
	});
}
