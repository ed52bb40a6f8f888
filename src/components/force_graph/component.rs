use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use super::render;
use super::state::{ForceGraphState, LayoutConfig};
use super::types::{CanvasSizing, GraphData};

const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);
const FRAME_DT: f32 = 0.016;

type SharedState = Rc<RefCell<Option<ForceGraphState>>>;
type SharedClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn viewport_size(canvas: &HtmlCanvasElement, sizing: CanvasSizing) -> (f64, f64) {
	match sizing {
		CanvasSizing::Fixed { width, height } => (width, height),
		CanvasSizing::Responsive => canvas
			.parent_element()
			.map(|p| (p.client_width() as f64, p.client_height() as f64))
			.filter(|&(w, h)| w > 0.0 && h > 0.0)
			.unwrap_or(FALLBACK_SIZE),
	}
}

fn relayout(
	state: &SharedState,
	canvas: &HtmlCanvasElement,
	data: &GraphData,
	sizing: CanvasSizing,
	config: &LayoutConfig,
) {
	let (w, h) = viewport_size(canvas, sizing);
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	*state.borrow_mut() = Some(ForceGraphState::new(data, w, h, config.clone()));
}

/// Empty a shared slot. A value that captured its own slot is freed once the returned
/// value is dropped.
fn vacate<T>(slot: &Rc<RefCell<Option<T>>>) -> Option<T> {
	slot.borrow_mut().take()
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Star layout of one hub and its leaves, relaxed on a canvas.
///
/// Any change to `data` throws the current layout away and relaxes a fresh one. Clicking a
/// leaf calls `on_select` with its id; the hub ignores clicks.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional)] sizing: CanvasSizing,
	#[prop(optional, into)] on_select: Option<Callback<String>>,
	#[prop(default = false)] draggable: bool,
	#[prop(optional)] config: LayoutConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: SharedClosure = Rc::new(RefCell::new(None));
	let resize_cb: SharedClosure = Rc::new(RefCell::new(None));
	// on_cleanup wants Send + Sync, so the teardown flag can't be an Rc<Cell>
	let alive = Arc::new(AtomicBool::new(true));

	let alive_cleanup = alive.clone();
	on_cleanup(move || alive_cleanup.store(false, Ordering::Relaxed));

	let (state_init, animate_init, resize_cb_init, config_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), config.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if animate_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("No window; graph canvas not started");
			return;
		};
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("Canvas 2d context unavailable");
			return;
		};

		relayout(
			&state_init,
			&canvas,
			&data.get_untracked(),
			sizing,
			&config_init,
		);

		if sizing.tracks_window() {
			let (state_resize, canvas_resize, config_resize) =
				(state_init.clone(), canvas.clone(), config_init.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				debug!("Viewport resized, relaying out");
				relayout(
					&state_resize,
					&canvas_resize,
					&data.get_untracked(),
					sizing,
					&config_resize,
				);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner, resize_inner, alive_anim) = (
			state_init.clone(),
			animate_init.clone(),
			resize_cb_init.clone(),
			alive.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let Some(window) = web_sys::window() else {
				return;
			};
			if !alive_anim.load(Ordering::Relaxed) {
				if let Some(cb) = vacate(&resize_inner) {
					let _ = window
						.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				*state_anim.borrow_mut() = None;
				// this closure owns itself through animate_inner; hand it to a later
				// task so it is not dropped mid-call
				let this = vacate(&animate_inner);
				spawn_local(async move { drop(this) });
				debug!("Graph canvas torn down");
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(FRAME_DT);
				render::render(s, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_data = state.clone();
	Effect::new(move |prev: Option<GraphData>| {
		let next = data.get();
		if prev.as_ref().is_some_and(|p| *p != next) && state_data.borrow().is_some() {
			if let Some(canvas) = canvas_ref.get_untracked() {
				let canvas: HtmlCanvasElement = canvas.into();
				debug!("Eligible nodes changed ({} nodes)", next.nodes.len());
				relayout(&state_data, &canvas, &next, sizing, &config);
			}
		}
		next
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.press(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.drag.active {
				s.drag_to(x, y, draggable);
			} else {
				let hovered = s.node_at_position(x, y);
				s.set_hover(hovered);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		// release the borrow before the callback can trigger a relayout
		let clicked = state_mu.borrow_mut().as_mut().and_then(|s| s.release());
		if let Some(id) = clicked {
			info!("Node clicked: {id}");
			if let Some(cb) = on_select {
				cb.run(id);
			}
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.cancel_press();
			s.set_hover(None);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			style="display: block; cursor: pointer;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct SelfOwned(#[allow(dead_code)] Rc<RefCell<Option<SelfOwned>>>);

	#[test]
	fn vacating_a_self_owning_slot_frees_it() {
		let slot = Rc::new(RefCell::new(None));
		*slot.borrow_mut() = Some(SelfOwned(slot.clone()));
		assert_eq!(Rc::strong_count(&slot), 2);

		let taken = vacate(&slot);
		assert!(slot.borrow().is_none());
		assert!(vacate(&slot).is_none());
		drop(taken);
		assert_eq!(Rc::strong_count(&slot), 1);
	}
}
