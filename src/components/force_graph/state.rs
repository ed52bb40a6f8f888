use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::types::{GraphData, NodeKind};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];
const HUB_COLOR: &str = "#e8e8f0";

/// Extra screen distance around a node that still counts as a hit.
pub const HIT_SLOP: f64 = 4.0;
/// Pointer travel below which a press-release is a click rather than a drag.
pub const CLICK_SLOP: f64 = 4.0;

/// Simulation and geometry knobs for one layout.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	pub hub_radius: f64,
	pub leaf_radius: f64,
	/// Gap kept between node rims by the collision pass.
	pub collision_padding: f64,
	/// Fraction of the centroid offset removed per tick.
	pub center_strength: f64,
	/// Distance from the hub at which leaves are spawned.
	pub spawn_radius: f64,
	/// Largest per-tick movement still considered at rest.
	pub settle_epsilon: f64,
	/// Consecutive resting ticks before positions are pinned.
	pub settle_ticks: u32,
	/// Ticks after which the layout is pinned regardless.
	pub max_ticks: u32,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			hub_radius: 14.0,
			leaf_radius: 8.0,
			collision_padding: 6.0,
			center_strength: 0.1,
			spawn_radius: 120.0,
			settle_epsilon: 0.05,
			settle_ticks: 30,
			max_ticks: 600,
		}
	}
}

impl LayoutConfig {
	fn simulation(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: Option<String>,
	pub kind: NodeKind,
	pub color: String,
	pub radius: f64,
}

/// Screen offset of the graph origin, kept at the viewport center.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
}

/// One layout of one star graph. Rebuilt from scratch whenever its data or size changes.
pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub config: LayoutConfig,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	ticks: u32,
	calm_ticks: u32,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
}

impl ForceGraphState {
	pub fn new(data: &GraphData, width: f64, height: f64, config: LayoutConfig) -> Self {
		let mut graph = ForceGraph::new(config.simulation());
		let mut id_to_idx = HashMap::new();
		let mut edges = Vec::new();

		let leaf_count = data
			.nodes
			.iter()
			.filter(|n| n.kind == NodeKind::Leaf)
			.count()
			.max(1);
		let mut leaf_i = 0;

		for node in &data.nodes {
			let (x, y, radius, fallback) = match node.kind {
				NodeKind::Hub => (0.0, 0.0, config.hub_radius, HUB_COLOR),
				NodeKind::Leaf => {
					let angle = (leaf_i as f64) * 2.0 * PI / leaf_count as f64;
					leaf_i += 1;
					(
						config.spawn_radius * angle.cos(),
						config.spawn_radius * angle.sin(),
						config.leaf_radius,
						node.group
							.map(|g| COLORS[g as usize % COLORS.len()])
							.unwrap_or(COLORS[0]),
					)
				}
			};

			let idx = graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					kind: node.kind,
					color: node.color.clone().unwrap_or_else(|| fallback.into()),
					radius,
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
		}

		for link in &data.links {
			if let (Some(&src), Some(&tgt)) =
				(id_to_idx.get(&link.source), id_to_idx.get(&link.target))
			{
				graph.add_edge(src, tgt, EdgeData::default());
				edges.push((src, tgt));
			}
		}

		debug!(
			"Layout rebuilt: {} nodes, {} edges in {}x{}",
			data.nodes.len(),
			edges.len(),
			width,
			height
		);

		Self {
			graph,
			config,
			edges,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
			},
			drag: DragState::default(),
			hover: HoverState::default(),
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
			ticks: 0,
			calm_ticks: 0,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(sx - self.transform.x, sy - self.transform.y)
	}

	/// Closest node whose rim (plus slop) contains the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found: Option<(DefaultNodeIdx, f64)> = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist < node.data.user_data.radius + HIT_SLOP
				&& found.is_none_or(|(_, best)| dist < best)
			{
				found = Some((node.index(), dist));
			}
		});
		found.map(|(idx, _)| idx)
	}

	pub fn node_info(&self, idx: DefaultNodeIdx) -> Option<NodeInfo> {
		let mut info = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				info = Some(node.data.user_data.clone());
			}
		});
		info
	}

	/// Graph-space position of the node with `id`.
	#[cfg(test)]
	pub fn position_of(&self, id: &str) -> Option<(f64, f64)> {
		let mut pos = None;
		self.graph.visit_nodes(|node| {
			if node.data.user_data.id == id {
				pos = Some((node.x() as f64, node.y() as f64));
			}
		});
		pos
	}

	#[cfg(test)]
	pub fn is_settled(&self) -> bool {
		!self.animation_running
	}

	/// Start a press on whatever node is under the pointer.
	pub fn press(&mut self, sx: f64, sy: f64) -> bool {
		let Some(idx) = self.node_at_position(sx, sy) else {
			return false;
		};
		self.drag = DragState {
			active: true,
			moved: false,
			node_idx: Some(idx),
			start_x: sx,
			start_y: sy,
			..DragState::default()
		};
		let (mut nx, mut ny) = (0.0, 0.0);
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				(nx, ny) = (node.x(), node.y());
			}
		});
		self.drag.node_start_x = nx;
		self.drag.node_start_y = ny;
		true
	}

	/// Follow the pointer during a press. Only moves the node when `draggable`.
	pub fn drag_to(&mut self, sx: f64, sy: f64, draggable: bool) {
		if !self.drag.active {
			return;
		}
		let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
		if !self.drag.moved && (dx * dx + dy * dy).sqrt() < CLICK_SLOP {
			return;
		}
		self.drag.moved = true;
		if !draggable {
			return;
		}
		let Some(idx) = self.drag.node_idx else {
			return;
		};
		let (nx, ny) = (
			self.drag.node_start_x + dx as f32,
			self.drag.node_start_y + dy as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = nx;
				node.data.y = ny;
				node.data.is_anchor = true;
			}
		});
	}

	/// Finish a press. Returns the leaf id when the press was a click on a leaf.
	pub fn release(&mut self) -> Option<String> {
		let drag = std::mem::take(&mut self.drag);
		if !drag.active || drag.moved {
			return None;
		}
		let info = self.node_info(drag.node_idx?)?;
		match info.kind {
			NodeKind::Leaf => Some(info.id),
			NodeKind::Hub => None,
		}
	}

	/// Abandon a press without selecting anything.
	pub fn cancel_press(&mut self) {
		self.drag = DragState::default();
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}

		// keep the old highlight around while it fades out
		if self.hover.node.is_some() && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors = node
			.map(|idx| {
				self.edges
					.iter()
					.filter_map(|&(src, tgt)| match (src == idx, tgt == idx) {
						(true, _) => Some(tgt),
						(_, true) => Some(src),
						_ => None,
					})
					.collect()
			})
			.unwrap_or_default();
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.is_hovered(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Advance one frame: relax the layout until it settles, then fade highlights.
	pub fn tick(&mut self, dt: f32) {
		self.flow_time += dt as f64;

		if self.animation_running {
			let before = self.positions();
			self.graph.update(dt);
			self.apply_centering();
			self.resolve_collisions();

			let moved = self.max_displacement(&before);
			self.ticks += 1;
			self.calm_ticks = if moved < self.config.settle_epsilon {
				self.calm_ticks + 1
			} else {
				0
			};
			if self.calm_ticks >= self.config.settle_ticks || self.ticks >= self.config.max_ticks {
				self.settle();
			}
		}

		let target = if self.hover.node.is_some() { 1.0 } else { 0.0 };
		self.hover.highlight_t += (target - self.hover.highlight_t) * 1.8 * dt as f64;
		if self.hover.node.is_none() && self.hover.highlight_t < 0.01 {
			self.hover.highlight_t = 0.0;
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}
	}

	/// Pin every node where it is and stop relaxing.
	pub fn settle(&mut self) {
		self.graph.visit_nodes_mut(|node| node.data.is_anchor = true);
		self.animation_running = false;
		debug!("Layout settled after {} ticks", self.ticks);
	}

	fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	fn max_displacement(&self, before: &HashMap<DefaultNodeIdx, (f64, f64)>) -> f64 {
		let mut max: f64 = 0.0;
		self.graph.visit_nodes(|node| {
			if let Some(&(bx, by)) = before.get(&node.index()) {
				let (dx, dy) = (node.x() as f64 - bx, node.y() as f64 - by);
				max = max.max((dx * dx + dy * dy).sqrt());
			}
		});
		max
	}

	/// Pull the free nodes so the centroid drifts toward the origin.
	fn apply_centering(&mut self) {
		let (mut sx, mut sy, mut n) = (0.0, 0.0, 0usize);
		self.graph.visit_nodes(|node| {
			sx += node.x() as f64;
			sy += node.y() as f64;
			n += 1;
		});
		if n == 0 {
			return;
		}
		let strength = self.config.center_strength;
		let (ox, oy) = (
			(sx / n as f64 * strength) as f32,
			(sy / n as f64 * strength) as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				node.data.x -= ox;
				node.data.y -= oy;
			}
		});
	}

	/// Push overlapping nodes apart so their rims keep the configured padding.
	fn resolve_collisions(&mut self) {
		let mut bodies = Vec::new();
		self.graph.visit_nodes(|node| {
			bodies.push((
				node.index(),
				node.x() as f64,
				node.y() as f64,
				node.data.user_data.radius,
				node.data.is_anchor,
			));
		});

		let padding = self.config.collision_padding;
		let mut shifted = false;
		for i in 0..bodies.len() {
			for j in (i + 1)..bodies.len() {
				let (_, xi, yi, ri, pinned_i) = bodies[i];
				let (_, xj, yj, rj, pinned_j) = bodies[j];
				let min = ri + rj + padding;
				let (mut dx, mut dy) = (xj - xi, yj - yi);
				let mut dist = (dx * dx + dy * dy).sqrt();
				if dist >= min || (pinned_i && pinned_j) {
					continue;
				}
				if dist < 1e-6 {
					// coincident: split along a fixed angle per pair
					let angle = (i * 31 + j * 17) as f64;
					(dx, dy, dist) = (angle.cos(), angle.sin(), 1.0);
				}
				let overlap = min - dist;
				let (ux, uy) = (dx / dist, dy / dist);
				let (share_i, share_j) = match (pinned_i, pinned_j) {
					(true, _) => (0.0, 1.0),
					(_, true) => (1.0, 0.0),
					_ => (0.5, 0.5),
				};
				bodies[i].1 -= ux * overlap * share_i;
				bodies[i].2 -= uy * overlap * share_i;
				bodies[j].1 += ux * overlap * share_j;
				bodies[j].2 += uy * overlap * share_j;
				shifted = true;
			}
		}
		if !shifted {
			return;
		}

		let moved: HashMap<_, _> = bodies
			.into_iter()
			.map(|(idx, x, y, _, _)| (idx, (x as f32, y as f32)))
			.collect();
		self.graph.visit_nodes_mut(|node| {
			if let Some(&(x, y)) = moved.get(&node.index()) {
				node.data.x = x;
				node.data.y = y;
			}
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const W: f64 = 800.0;
	const H: f64 = 600.0;

	fn star(leaves: &[&str]) -> ForceGraphState {
		let data = GraphData::star("Key Players", leaves.iter().copied());
		ForceGraphState::new(&data, W, H, LayoutConfig::default())
	}

	fn settled(leaves: &[&str]) -> ForceGraphState {
		let mut state = star(leaves);
		for _ in 0..state.config.max_ticks {
			state.tick(0.016);
		}
		state
	}

	fn to_screen(state: &ForceGraphState, id: &str) -> (f64, f64) {
		let (x, y) = state.position_of(id).unwrap();
		(x + state.transform.x, y + state.transform.y)
	}

	fn anchored(state: &ForceGraphState) -> Vec<bool> {
		let mut out = Vec::new();
		state.graph.visit_nodes(|node| out.push(node.data.is_anchor));
		out
	}

	fn set_position(state: &mut ForceGraphState, id: &str, x: f32, y: f32) {
		state.graph.visit_nodes_mut(|node| {
			if node.data.user_data.id == id {
				node.data.x = x;
				node.data.y = y;
			}
		});
	}

	#[test]
	fn builds_a_star() {
		let state = star(&["ServiceNow", "BMC", "Splunk"]);
		let mut count = 0;
		state.graph.visit_nodes(|_| count += 1);
		assert_eq!(count, 4);
		assert_eq!(state.edges.len(), 3);
		assert_eq!(state.position_of("Key Players"), Some((0.0, 0.0)));
		assert_eq!((state.transform.x, state.transform.y), (W / 2.0, H / 2.0));
	}

	#[test]
	fn settles_and_pins_within_the_tick_cap() {
		let mut state = settled(&["ServiceNow", "BMC", "Splunk", "Datadog"]);
		assert!(state.is_settled());
		assert!(anchored(&state).iter().all(|&a| a));

		let before = state.position_of("BMC");
		state.tick(0.016);
		assert_eq!(state.position_of("BMC"), before);
	}

	#[test]
	fn rebuild_discards_pins() {
		let old = settled(&["ServiceNow", "BMC"]);
		assert!(old.is_settled());
		let fresh = star(&["ServiceNow", "BMC"]);
		assert!(!fresh.is_settled());
		assert!(anchored(&fresh).iter().all(|&a| !a));
	}

	#[test]
	fn collisions_restore_the_gap() {
		let mut state = star(&["A"]);
		set_position(&mut state, "A", 3.0, 0.0);
		state.resolve_collisions();
		let (x, y) = state.position_of("A").unwrap();
		let (hx, hy) = state.position_of("Key Players").unwrap();
		let dist = ((x - hx).powi(2) + (y - hy).powi(2)).sqrt();
		let cfg = &state.config;
		assert!(dist >= cfg.hub_radius + cfg.leaf_radius + cfg.collision_padding - 1e-3);
	}

	#[test]
	fn coincident_nodes_are_split() {
		let mut state = star(&["A"]);
		set_position(&mut state, "A", 0.0, 0.0);
		state.resolve_collisions();
		assert_ne!(state.position_of("A"), state.position_of("Key Players"));
	}

	#[test]
	fn centering_pulls_the_centroid_home() {
		let mut state = star(&["A"]);
		state.config.center_strength = 1.0;
		set_position(&mut state, "Key Players", 100.0, 50.0);
		set_position(&mut state, "A", 140.0, 50.0);
		state.apply_centering();
		let (hx, hy) = state.position_of("Key Players").unwrap();
		let (ax, ay) = state.position_of("A").unwrap();
		assert!(((hx + ax) / 2.0).abs() < 1e-3);
		assert!(((hy + ay) / 2.0).abs() < 1e-3);
	}

	#[test]
	fn clicking_a_leaf_reports_it() {
		let mut state = settled(&["ServiceNow", "BMC"]);
		let (x, y) = to_screen(&state, "BMC");
		assert!(state.press(x, y));
		state.drag_to(x + 1.0, y, true);
		assert_eq!(state.release().as_deref(), Some("BMC"));
		assert!(!state.drag.active);
	}

	#[test]
	fn clicking_the_hub_or_background_reports_nothing() {
		let mut state = settled(&["ServiceNow", "BMC"]);
		let (x, y) = to_screen(&state, "Key Players");
		assert!(state.press(x, y));
		assert_eq!(state.release(), None);

		assert!(!state.press(0.0, 0.0));
		assert_eq!(state.release(), None);
	}

	#[test]
	fn dragging_moves_and_pins_without_selecting() {
		let mut state = star(&["ServiceNow", "BMC"]);
		let (x, y) = to_screen(&state, "BMC");
		let (bx, by) = state.position_of("BMC").unwrap();
		assert!(state.press(x, y));
		state.drag_to(x + 40.0, y + 10.0, true);
		assert_eq!(state.release(), None);
		let (nx, ny) = state.position_of("BMC").unwrap();
		assert!((nx - (bx + 40.0)).abs() < 1e-3);
		assert!((ny - (by + 10.0)).abs() < 1e-3);
	}

	#[test]
	fn undraggable_press_that_moves_is_not_a_click() {
		let mut state = settled(&["ServiceNow", "BMC"]);
		let (x, y) = to_screen(&state, "ServiceNow");
		let before = state.position_of("ServiceNow");
		assert!(state.press(x, y));
		state.drag_to(x + 30.0, y, false);
		assert_eq!(state.release(), None);
		assert_eq!(state.position_of("ServiceNow"), before);
	}

	#[test]
	fn hovering_a_leaf_highlights_the_hub() {
		let mut state = settled(&["ServiceNow", "BMC"]);
		let (x, y) = to_screen(&state, "BMC");
		let leaf = state.node_at_position(x, y).unwrap();
		let (hx, hy) = to_screen(&state, "Key Players");
		let hub = state.node_at_position(hx, hy).unwrap();

		state.set_hover(Some(leaf));
		assert!(state.is_hovered(leaf));
		assert!(state.is_highlighted(hub));

		state.set_hover(None);
		assert!(state.has_active_highlight());
		for _ in 0..600 {
			state.tick(0.016);
		}
		assert!(!state.has_active_highlight());
	}
}
