use std::collections::BTreeMap;

/// 1-based position on a reconciled reference.
pub type RefPos = u64;

/// Reference position -> modification short name, ordered by position.
pub type PositionMap = BTreeMap<RefPos, String>;

// Fast hash maps using AHash instead of the default SipHash.
// Import these throughout the codebase with `use crate::types::{HashMap, HashMapExt}`.
pub(crate) type HashMap<K, V> = ahash::HashMap<K, V>;
pub(crate) use ahash::HashMapExt;
