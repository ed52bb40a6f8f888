//! Errors raised while loading the startup taxonomy.

use thiserror::Error;

/// Result alias for taxonomy loading.
pub type Result<T> = std::result::Result<T, TaxonomyError>;

/// Reasons a taxonomy configuration is refused.
#[derive(Debug, Error)]
pub enum TaxonomyError {
	/// The configuration text is not valid JSON for the expected shape.
	#[error("invalid taxonomy json: {0}")]
	Json(#[from] serde_json::Error),

	/// A pairing key did not split into exactly two non-empty names.
	#[error("pairing key {key:?} must name exactly two items separated by {separator:?}")]
	MalformedPairKey {
		/// The key as authored.
		key: String,
		/// Separator the key was split on.
		separator: &'static str,
	},

	/// A pairing key names the same item twice.
	#[error("pairing key {key:?} pairs an item with itself")]
	SelfPair {
		/// The key as authored.
		key: String,
	},

	/// Two pairing keys collapse onto the same unordered pair.
	#[error("pair {key:?} is defined more than once")]
	DuplicatePair {
		/// Canonical key of the pair.
		key: String,
	},

	/// Two categories share a name.
	#[error("category {name:?} is defined more than once")]
	DuplicateCategory {
		/// The repeated category name.
		name: String,
	},
}
