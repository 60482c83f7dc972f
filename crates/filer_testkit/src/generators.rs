//! Property-based test generators using proptest.
//!
//! Provides strategies for artifact names, payloads, registry records, and
//! sequences of lifecycle operations.

use chrono::{DateTime, TimeZone, Utc};
use filer_core::{ArtifactRecord, ArtifactStatus};
use proptest::prelude::*;

/// Strategy for artifact names that map cleanly to file names.
pub fn artifact_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9][a-zA-Z0-9_.-]{0,23}").expect("Invalid regex")
}

/// Strategy for names that exercise field quoting in the registry format.
///
/// These are only meant for the record format; some are not portable file
/// names.
pub fn awkward_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9 \t|\"é_]{0,15}").expect("Invalid regex")
}

/// Strategy for payload bytes.
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..512)
}

/// Strategy for timestamps at the precision the registry keeps.
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    // 2000-01-01 .. 2100-01-01
    (946_684_800i64..4_102_444_800i64, 0u32..1_000_000u32).prop_map(|(secs, micros)| {
        Utc.timestamp_opt(secs, micros * 1_000)
            .single()
            .unwrap_or_default()
    })
}

/// Strategy for valid registry records.
pub fn record_strategy() -> impl Strategy<Value = ArtifactRecord> {
    (
        awkward_name_strategy(),
        prop::option::of("[a-z0-9/_\\-|\t]{1,40}"),
        timestamp_strategy(),
    )
        .prop_map(|(name, address, timestamp)| {
            let status = if address.is_some() {
                ArtifactStatus::Synced
            } else {
                ArtifactStatus::Local
            };
            ArtifactRecord::new(name, status, address, timestamp)
                .expect("Generated record violates invariants")
        })
}

/// Strategy for a registry's worth of records with unique names.
pub fn registry_strategy(max_records: usize) -> impl Strategy<Value = Vec<ArtifactRecord>> {
    prop::collection::vec(record_strategy(), 0..max_records).prop_map(|mut records| {
        let mut seen = std::collections::HashSet::new();
        records.retain(|r| seen.insert(r.name().to_string()));
        records
    })
}

/// A lifecycle operation against a Filer.
#[derive(Debug, Clone)]
pub enum FilerOperation {
    /// Store a payload
    Store {
        /// Artifact name
        name: String,
        /// Payload bytes
        payload: Vec<u8>,
        /// Push right away
        push: bool,
        /// Overwrite if present
        overwrite: bool,
    },
    /// Push an artifact
    Push {
        /// Artifact name
        name: String,
    },
    /// Pull an artifact
    Pull {
        /// Artifact name
        name: String,
    },
    /// Load an artifact, pulling if needed
    Load {
        /// Artifact name
        name: String,
    },
    /// Delete the local payload behind the Filer's back
    DropLocal {
        /// Artifact name
        name: String,
    },
    /// Remove an artifact
    Remove {
        /// Artifact name
        name: String,
        /// Delete the remote object too
        remove_remote: bool,
    },
}

/// Names drawn from a small pool so operations collide often.
fn pooled_name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["alpha", "beta", "gamma", "delta"]).prop_map(str::to_string)
}

/// Strategy for generating lifecycle operations.
pub fn filer_operation_strategy() -> impl Strategy<Value = FilerOperation> {
    prop_oneof![
        4 => (pooled_name_strategy(), payload_strategy(), any::<bool>(), any::<bool>())
            .prop_map(|(name, payload, push, overwrite)| FilerOperation::Store {
                name,
                payload,
                push,
                overwrite,
            }),
        2 => pooled_name_strategy().prop_map(|name| FilerOperation::Push { name }),
        1 => pooled_name_strategy().prop_map(|name| FilerOperation::Pull { name }),
        2 => pooled_name_strategy().prop_map(|name| FilerOperation::Load { name }),
        1 => pooled_name_strategy().prop_map(|name| FilerOperation::DropLocal { name }),
        1 => (pooled_name_strategy(), any::<bool>())
            .prop_map(|(name, remove_remote)| FilerOperation::Remove { name, remove_remote }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<FilerOperation>> {
    prop::collection::vec(filer_operation_strategy(), min_ops..max_ops)
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

#[cfg(test)]
mod tests {
    use super::*;
    use filer_core::validate_name;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn artifact_names_are_valid(name in artifact_name_strategy()) {
            prop_assert!(validate_name(&name).is_ok());
        }

        #[test]
        fn timestamps_have_microsecond_precision(ts in timestamp_strategy()) {
            prop_assert_eq!(ts.timestamp_subsec_nanos() % 1_000, 0);
        }

        #[test]
        fn registries_have_unique_names(records in registry_strategy(16)) {
            let mut names: Vec<_> = records.iter().map(|r| r.name()).collect();
            names.sort_unstable();
            names.dedup();
            prop_assert_eq!(names.len(), records.len());
        }
    }
}
