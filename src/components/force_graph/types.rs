/// Role of a node in the star layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeKind {
	/// The category at the center; never selectable.
	Hub,
	/// A selectable item.
	#[default]
	Leaf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub label: Option<String>,
	pub kind: NodeKind,
	pub color: Option<String>,
	pub group: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
}

/// Nodes and links of one layout. Equality is what decides a relayout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// A hub linked to every leaf, with no leaf-to-leaf links.
	pub fn star<'a>(hub: &str, leaves: impl IntoIterator<Item = &'a str>) -> Self {
		let mut nodes = vec![GraphNode {
			id: hub.to_string(),
			label: Some(hub.to_string()),
			kind: NodeKind::Hub,
			color: None,
			group: Some(0),
		}];
		let mut links = Vec::new();

		for (i, leaf) in leaves.into_iter().enumerate() {
			if leaf == hub || nodes.iter().any(|n| n.id == leaf) {
				continue;
			}
			nodes.push(GraphNode {
				id: leaf.to_string(),
				label: Some(leaf.to_string()),
				kind: NodeKind::Leaf,
				color: None,
				group: Some(i as u32 + 1),
			});
			links.push(GraphLink {
				source: hub.to_string(),
				target: leaf.to_string(),
			});
		}

		Self { nodes, links }
	}

	/// Id of the hub node, if the data has one.
	#[cfg(test)]
	pub fn hub(&self) -> Option<&str> {
		self.nodes
			.iter()
			.find(|n| n.kind == NodeKind::Hub)
			.map(|n| n.id.as_str())
	}

	/// Ids of every leaf node.
	#[cfg(test)]
	pub fn leaves(&self) -> impl Iterator<Item = &str> {
		self.nodes
			.iter()
			.filter(|n| n.kind == NodeKind::Leaf)
			.map(|n| n.id.as_str())
	}
}

/// How the canvas picks its size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CanvasSizing {
	/// Always exactly this many pixels.
	Fixed { width: f64, height: f64 },
	/// Fill the parent element and follow window resizes.
	#[default]
	Responsive,
}

impl CanvasSizing {
	pub(crate) fn tracks_window(&self) -> bool {
		matches!(self, Self::Responsive)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn star_links_only_through_the_hub() {
		let data = GraphData::star("Key Players", ["ServiceNow", "BMC", "Splunk"]);
		assert_eq!(data.hub(), Some("Key Players"));
		assert_eq!(data.nodes.len(), 4);
		assert_eq!(data.links.len(), 3);
		for link in &data.links {
			assert_eq!(link.source, "Key Players");
		}
		assert_eq!(
			data.leaves().collect::<Vec<_>>(),
			vec!["ServiceNow", "BMC", "Splunk"]
		);
	}

	#[test]
	fn star_skips_repeats_and_the_hub_name() {
		let data = GraphData::star("Hub", ["A", "Hub", "A", "B"]);
		assert_eq!(data.leaves().collect::<Vec<_>>(), vec!["A", "B"]);
		assert_eq!(data.links.len(), 2);
	}

	#[test]
	fn empty_star_is_just_the_hub() {
		let data = GraphData::star("Hub", Vec::<&str>::new());
		assert_eq!(data.nodes.len(), 1);
		assert!(data.links.is_empty());
	}

	#[test]
	fn different_leaf_sets_are_different_layouts() {
		let all = GraphData::star("Hub", ["A", "B", "C"]);
		let fewer = GraphData::star("Hub", ["A", "C"]);
		assert_ne!(all, fewer);
		assert_eq!(all, GraphData::star("Hub", ["A", "B", "C"]));
	}
}
