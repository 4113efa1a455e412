//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use proptest::prelude::*;

/// Strategy for generating bucket names valid under every layout.
pub fn bucket_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating non-empty keys, including non-ASCII text.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::string::string_regex("[a-z0-9]{1,12}").expect("Invalid regex"),
        1 => "\\PC{1,16}",
    ]
}

/// Strategy for generating values (arbitrary bytes, possibly empty).
pub fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

/// A single bucket operation.
#[derive(Debug, Clone)]
pub enum BucketOperation {
    /// Store a value
    Put {
        /// Key
        key: String,
        /// Value
        value: Vec<u8>,
    },
    /// Delete a key
    Delete {
        /// Key
        key: String,
    },
    /// Read a key
    Get {
        /// Key
        key: String,
    },
}

impl BucketOperation {
    /// Returns the key this operation targets.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Put { key, .. } | Self::Delete { key } | Self::Get { key } => key,
        }
    }
}

/// Strategy for generating bucket operations over a small key space.
///
/// Keys are drawn from `k0`..`k7` so that puts, deletes, and gets collide.
pub fn bucket_operation_strategy() -> impl Strategy<Value = BucketOperation> {
    let key = (0u8..8).prop_map(|i| format!("k{i}"));
    prop_oneof![
        3 => (key.clone(), value_strategy())
            .prop_map(|(key, value)| BucketOperation::Put { key, value }),
        1 => key.clone().prop_map(|key| BucketOperation::Delete { key }),
        2 => key.prop_map(|key| BucketOperation::Get { key }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<BucketOperation>> {
    prop::collection::vec(bucket_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
