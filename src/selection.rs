//! Selection state machine: up to two leaf items and the summary of their pair.
//!
//! Everything here is a pure function of the current [`Selection`] and the static
//! [`Taxonomy`], so the widget can be reasoned about without any rendering.

use log::debug;

use crate::taxonomy::{Category, PairingTable, Taxonomy};

/// Most items that can be chosen at once.
pub const MAX_SELECTED: usize = 2;

/// What a call to [`Selection::select_item`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
	/// First item chosen from an empty selection.
	Started,
	/// Second item completed a known pair; the summary is now set.
	Paired,
	/// An already chosen item was clicked again and removed.
	Deselected,
	/// The item is unlisted or has no pairing with the current one; nothing changed.
	Rejected,
	/// A full pair was replaced by the clicked item alone.
	Restarted,
}

/// Currently chosen items plus the summary for a complete pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
	items: Vec<String>,
	summary: String,
}

impl Selection {
	/// An empty selection.
	pub fn new() -> Self {
		Self::default()
	}

	/// Chosen items in click order.
	pub fn items(&self) -> &[String] {
		&self.items
	}

	/// Summary of the chosen pair; empty unless two items are chosen.
	pub fn summary(&self) -> &str {
		&self.summary
	}

	/// Whether nothing is chosen.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Whether a full pair is chosen.
	pub fn is_complete(&self) -> bool {
		self.items.len() == MAX_SELECTED
	}

	/// Whether `item` is currently chosen.
	pub fn contains(&self, item: &str) -> bool {
		self.items.iter().any(|i| i == item)
	}

	/// Apply a click on leaf `item`.
	///
	/// A name that no category lists is ignored like an unpaired one.
	pub fn select_item(&mut self, item: &str, taxonomy: &Taxonomy) -> SelectOutcome {
		let outcome = if taxonomy.category_of(item).is_none() {
			SelectOutcome::Rejected
		} else if let Some(pos) = self.items.iter().position(|i| i == item) {
			self.items.remove(pos);
			if self.items.len() != MAX_SELECTED {
				self.summary.clear();
			}
			SelectOutcome::Deselected
		} else {
			match self.items.as_slice() {
				[] => {
					self.items.push(item.to_string());
					SelectOutcome::Started
				}
				[first] => match taxonomy.pairings.lookup(first, item) {
					Some(summary) => {
						self.summary = summary.to_string();
						self.items.push(item.to_string());
						SelectOutcome::Paired
					}
					None => SelectOutcome::Rejected,
				},
				_ => {
					self.items.clear();
					self.items.push(item.to_string());
					self.summary.clear();
					SelectOutcome::Restarted
				}
			}
		};
		debug!("select {item:?}: {outcome:?} -> {:?}", self.items);
		outcome
	}

	/// Drop every chosen item and the summary.
	pub fn reset(&mut self) {
		self.items.clear();
		self.summary.clear();
	}

	/// Leaves of `category` that may be clicked next.
	pub fn eligible_items<'c>(
		&self,
		category: &'c Category,
		pairings: &PairingTable,
	) -> Vec<&'c str> {
		match self.items.as_slice() {
			[] => category.items.iter().map(String::as_str).collect(),
			[first] => category
				.items
				.iter()
				.map(String::as_str)
				.filter(|item| item != first && pairings.is_partner(first, item))
				.collect(),
			_ => Vec::new(),
		}
	}

	/// Categories that still offer at least one eligible leaf.
	pub fn eligible_categories<'t>(&self, taxonomy: &'t Taxonomy) -> Vec<&'t Category> {
		match self.items.len() {
			0 => taxonomy.categories.iter().collect(),
			1 => taxonomy
				.categories
				.iter()
				.filter(|c| !self.eligible_items(c, &taxonomy.pairings).is_empty())
				.collect(),
			_ => Vec::new(),
		}
	}
}
