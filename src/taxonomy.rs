//! Static categories and the pairing table loaded once at startup.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{Result, TaxonomyError};

/// Separator between the two item names of a pairing key.
pub const PAIR_SEPARATOR: &str = ",";

/// Reference dataset bundled with the app.
pub const BUNDLED_TAXONOMY: &str = include_str!("../data/taxonomy.json");

/// Canonical key for an unordered pair: both names sorted and joined.
pub fn pair_key(a: &str, b: &str) -> String {
	let (first, second) = if a <= b { (a, b) } else { (b, a) };
	format!("{first}{PAIR_SEPARATOR}{second}")
}

/// A named group of leaf items, rendered as one hub and its leaves.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Category {
	/// Category name, also used as the hub label.
	pub name: String,
	/// Leaf item names.
	pub items: Vec<String>,
}

impl Category {
	/// Whether `item` is one of this category's leaves.
	pub fn contains(&self, item: &str) -> bool {
		self.items.iter().any(|i| i == item)
	}
}

/// Summaries keyed by unordered item pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairingTable {
	entries: HashMap<String, String>,
}

impl PairingTable {
	/// Build a table, canonicalizing every key.
	///
	/// Keys may be authored in either order; `"B,A"` is stored as `"A,B"`. A key that does
	/// not name two distinct items, or that repeats an already defined pair, is refused.
	pub fn from_entries<I, K, V>(entries: I) -> Result<Self>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<String>,
	{
		let mut table = HashMap::new();
		for (raw, summary) in entries {
			let raw = raw.as_ref();
			let (a, b) = split_key(raw)?;
			let key = pair_key(a, b);
			if table.insert(key.clone(), summary.into()).is_some() {
				return Err(TaxonomyError::DuplicatePair { key });
			}
		}
		Ok(Self { entries: table })
	}

	/// Summary for the pair `{a, b}`, in either order.
	pub fn lookup(&self, a: &str, b: &str) -> Option<&str> {
		if a == b {
			return None;
		}
		self.entries.get(&pair_key(a, b)).map(String::as_str)
	}

	/// Whether `{a, b}` has an authored summary.
	pub fn is_partner(&self, a: &str, b: &str) -> bool {
		self.lookup(a, b).is_some()
	}

	/// Canonical keys, unordered.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// Number of authored pairs.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True when no pairs are defined.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

fn split_key(raw: &str) -> Result<(&str, &str)> {
	let malformed = || TaxonomyError::MalformedPairKey {
		key: raw.to_string(),
		separator: PAIR_SEPARATOR,
	};
	let mut parts = raw.split(PAIR_SEPARATOR).map(str::trim);
	let (Some(a), Some(b), None) = (parts.next(), parts.next(), parts.next()) else {
		return Err(malformed());
	};
	if a.is_empty() || b.is_empty() {
		return Err(malformed());
	}
	if a == b {
		return Err(TaxonomyError::SelfPair {
			key: raw.to_string(),
		});
	}
	Ok((a, b))
}

#[derive(Deserialize)]
struct RawTaxonomy {
	categories: Vec<Category>,
	#[serde(default)]
	pairings: HashMap<String, String>,
}

/// The immutable configuration: categories plus their pairing table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Taxonomy {
	/// Categories in display order.
	pub categories: Vec<Category>,
	/// Authored summaries for cross-category pairs.
	pub pairings: PairingTable,
}

impl Taxonomy {
	/// Assemble a taxonomy from already parsed parts.
	pub fn new(categories: Vec<Category>, pairings: PairingTable) -> Result<Self> {
		let mut seen = HashSet::new();
		for category in &categories {
			if !seen.insert(category.name.as_str()) {
				return Err(TaxonomyError::DuplicateCategory {
					name: category.name.clone(),
				});
			}
		}

		let taxonomy = Self {
			categories,
			pairings,
		};
		taxonomy.warn_unknown_items();
		Ok(taxonomy)
	}

	/// Parse the JSON configuration format.
	pub fn from_json(text: &str) -> Result<Self> {
		let raw: RawTaxonomy = serde_json::from_str(text)?;
		let pairings = PairingTable::from_entries(raw.pairings)?;
		let taxonomy = Self::new(raw.categories, pairings)?;
		debug!(
			"Loaded taxonomy: {} categories, {} pairings",
			taxonomy.categories.len(),
			taxonomy.pairings.len()
		);
		Ok(taxonomy)
	}

	/// The dataset compiled into the binary.
	pub fn bundled() -> Result<Self> {
		Self::from_json(BUNDLED_TAXONOMY)
	}

	/// Category by name.
	pub fn category(&self, name: &str) -> Option<&Category> {
		self.categories.iter().find(|c| c.name == name)
	}

	/// First category listing `item`.
	pub fn category_of(&self, item: &str) -> Option<&Category> {
		self.categories.iter().find(|c| c.contains(item))
	}

	fn warn_unknown_items(&self) {
		for key in self.pairings.keys() {
			for item in key.split(PAIR_SEPARATOR) {
				if self.category_of(item).is_none() {
					warn!("Pairing {key:?} mentions {item:?}, which no category lists");
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pair_key_is_order_independent() {
		assert_eq!(pair_key("ServiceNow", "AIOps"), "AIOps,ServiceNow");
		assert_eq!(pair_key("AIOps", "ServiceNow"), "AIOps,ServiceNow");
	}

	#[test]
	fn unsorted_keys_are_canonicalized() {
		let table = PairingTable::from_entries([("ServiceNow,AIOps", "text")]).unwrap();
		assert_eq!(table.keys().collect::<Vec<_>>(), vec!["AIOps,ServiceNow"]);
		assert_eq!(table.lookup("ServiceNow", "AIOps"), Some("text"));
		assert_eq!(table.lookup("AIOps", "ServiceNow"), Some("text"));
	}

	#[test]
	fn lookup_misses_and_self_pairs() {
		let table = PairingTable::from_entries([("AIOps,ServiceNow", "text")]).unwrap();
		assert_eq!(table.lookup("AIOps", "BMC"), None);
		assert_eq!(table.lookup("AIOps", "AIOps"), None);
		assert!(!table.is_partner("Nope", "ServiceNow"));
	}

	#[test]
	fn malformed_keys_are_refused() {
		for key in ["AIOps", "AIOps,", ",BMC", "A,B,C"] {
			let err = PairingTable::from_entries([(key, "x")]).unwrap_err();
			assert!(
				matches!(err, TaxonomyError::MalformedPairKey { .. }),
				"{key}: {err}"
			);
		}
		let err = PairingTable::from_entries([("BMC,BMC", "x")]).unwrap_err();
		assert!(matches!(err, TaxonomyError::SelfPair { .. }));
	}

	#[test]
	fn mirrored_duplicates_are_refused() {
		let err = PairingTable::from_entries([("A,B", "one"), ("B,A", "two")]).unwrap_err();
		match err {
			TaxonomyError::DuplicatePair { key } => assert_eq!(key, "A,B"),
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn duplicate_categories_are_refused() {
		let json = r#"{
			"categories": [
				{ "name": "Tech", "items": ["A"] },
				{ "name": "Tech", "items": ["B"] }
			]
		}"#;
		let err = Taxonomy::from_json(json).unwrap_err();
		assert!(matches!(err, TaxonomyError::DuplicateCategory { name } if name == "Tech"));
	}

	#[test]
	fn bad_json_is_reported() {
		let err = Taxonomy::from_json("{ not json").unwrap_err();
		assert!(matches!(err, TaxonomyError::Json(_)));
	}

	#[test]
	fn bundled_dataset_loads() {
		let taxonomy = Taxonomy::bundled().unwrap();
		assert!(taxonomy.categories.len() >= 2);
		assert!(!taxonomy.pairings.is_empty());
		assert_eq!(
			taxonomy.category_of("AIOps").map(|c| c.name.as_str()),
			Some("Technologies")
		);
		for key in taxonomy.pairings.keys() {
			let (a, b) = key.split_once(PAIR_SEPARATOR).unwrap();
			assert!(taxonomy.category_of(a).is_some(), "{a} has no category");
			assert!(taxonomy.category_of(b).is_some(), "{b} has no category");
		}
	}
}
