//! Model-based property tests: the database must agree with a `HashMap`.

use kvite_core::{BucketLayout, Config, Database, KvResult};
use kvite_testkit::prelude::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(PropTestConfig::quick().to_proptest_config())]

    #[test]
    fn shared_layout_matches_model(
        batches in prop::collection::vec(
            (bucket_name_strategy(), operation_sequence_strategy(1, 12), any::<bool>()),
            1..6,
        )
    ) {
        let mut harness = ModelHarness::new();
        for (bucket, ops, commit) in &batches {
            harness.apply(bucket, ops, *commit);
        }
        harness.verify_all();
    }

    #[test]
    fn last_put_wins(
        key in key_strategy(),
        values in prop::collection::vec(value_strategy(), 1..5),
    ) {
        let test_db = TestDatabase::memory();
        test_db
            .transaction(|txn| -> KvResult<()> {
                let bucket = txn.bucket("test");
                for value in &values {
                    bucket.put(&key, value)?;
                }
                Ok(())
            })
            .unwrap();

        let txn = test_db.begin().unwrap();
        let all = txn.bucket("test").get_all().unwrap();
        prop_assert_eq!(all.len(), 1);
        prop_assert_eq!(all.get(&key), values.last());
    }

    #[test]
    fn for_each_visits_every_pair_once(count in 0usize..40) {
        let test_db = scenarios::populated_database(count);
        let txn = test_db.begin().unwrap();

        let mut seen = std::collections::HashSet::new();
        txn.bucket("test")
            .for_each(|key, _| -> KvResult<()> {
                assert!(seen.insert(key.to_string()), "visited {key} twice");
                Ok(())
            })
            .unwrap();
        prop_assert_eq!(seen.len(), count);
    }

    #[test]
    fn per_bucket_layout_matches_shared(
        ops in operation_sequence_strategy(1, 20),
    ) {
        let shared = Database::open_in_memory().unwrap();
        let tables = Database::open_in_memory_with_config(
            Config::new().layout(BucketLayout::TablePerBucket),
        )
        .unwrap();

        for db in [&shared, &tables] {
            db.transaction(|txn| -> KvResult<()> {
                let bucket = txn.create_bucket_if_not_exists("test")?;
                for op in &ops {
                    match op {
                        BucketOperation::Put { key, value } => bucket.put(key, value)?,
                        BucketOperation::Delete { key } => bucket.delete(key)?,
                        BucketOperation::Get { key } => {
                            bucket.get(key)?;
                        }
                    }
                }
                Ok(())
            })
            .unwrap();
        }

        let a = shared.begin().unwrap().bucket("test").get_all().unwrap();
        let b = tables.begin().unwrap().bucket("test").get_all().unwrap();
        prop_assert_eq!(a, b);
    }
}
