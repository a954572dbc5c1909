use meshx_merkle::{
    BatchCommitment, BatchMerkleTree, BatchRange, COMMITMENT_SCHEMES, CommitmentScheme,
    MerkleBatchError, OddNodePolicy, RecordLog, SCHEME_V2, SensorRecord, verify_proof,
};
use proptest::prelude::*;

fn record_strategy() -> impl Strategy<Value = SensorRecord> {
    (
        "[a-z0-9-]{1,12}",
        any::<u64>(),
        "\\PC{0,40}",
        "[a-z]{1,10}",
        "[a-z -]{0,16}",
    )
        .prop_map(|(device_id, timestamp, data, data_type, location)| {
            SensorRecord::new(device_id, timestamp, data, data_type, location)
        })
}

fn scheme_strategy() -> impl Strategy<Value = CommitmentScheme> {
    (
        proptest::sample::select(COMMITMENT_SCHEMES.to_vec()),
        prop_oneof![Just(OddNodePolicy::CarryUp), Just(OddNodePolicy::Duplicate)],
    )
        .prop_map(|(scheme, odd_node)| scheme.with_odd_node(odd_node))
}

proptest! {
    #[test]
    fn every_leaf_verifies_against_root(
        records in prop::collection::vec(record_strategy(), 1..48),
        first_index in 0u64..1_000,
        scheme in scheme_strategy(),
    ) {
        let tree = BatchMerkleTree::from_records(&records, first_index, &scheme).unwrap();
        for (offset, record) in records.iter().enumerate() {
            let leaf = scheme.leaf_hash(record, first_index + offset as u64);
            let proof = tree.proof(offset as u64).unwrap();
            prop_assert!(verify_proof(&leaf, &proof.siblings, &tree.root()));
        }
    }

    #[test]
    fn mutated_record_fails_old_proof(
        records in prop::collection::vec(record_strategy(), 1..24),
        pick in any::<prop::sample::Index>(),
        field in 0usize..5,
    ) {
        let tree = BatchMerkleTree::from_records(&records, 0, &SCHEME_V2).unwrap();
        let index = pick.index(records.len());
        let proof = tree.proof(index as u64).unwrap();

        let mut mutated = records[index].clone();
        match field {
            0 => mutated.device_id.push('x'),
            1 => mutated.timestamp = mutated.timestamp.wrapping_add(1),
            2 => mutated.data.push('x'),
            3 => mutated.data_type.push('x'),
            _ => mutated.location.push('x'),
        }
        let original_leaf = SCHEME_V2.leaf_hash(&records[index], index as u64);
        let mutated_leaf = SCHEME_V2.leaf_hash(&mutated, index as u64);
        prop_assert_ne!(original_leaf, mutated_leaf);
        prop_assert!(!proof.verify(&mutated_leaf, &tree.root()));
    }

    #[test]
    fn rebuild_is_deterministic(
        records in prop::collection::vec(record_strategy(), 1..32),
        scheme in scheme_strategy(),
    ) {
        let a = BatchMerkleTree::from_records(&records, 0, &scheme).unwrap();
        let b = BatchMerkleTree::from_records(&records, 0, &scheme).unwrap();
        prop_assert_eq!(a.root(), b.root());
    }

    #[test]
    fn salted_root_is_order_sensitive(
        records in prop::collection::vec(record_strategy(), 2..16),
        i in any::<prop::sample::Index>(),
        j in any::<prop::sample::Index>(),
    ) {
        let (i, j) = (i.index(records.len()), j.index(records.len()));
        prop_assume!(i != j && records[i] != records[j]);
        let mut swapped = records.clone();
        swapped.swap(i, j);

        let root = BatchMerkleTree::from_records(&records, 0, &SCHEME_V2).unwrap().root();
        let swapped_root = BatchMerkleTree::from_records(&swapped, 0, &SCHEME_V2).unwrap().root();
        prop_assert_ne!(root, swapped_root);
    }

    #[test]
    fn proof_fails_against_other_batch(
        a in prop::collection::vec(record_strategy(), 1..16),
        b in prop::collection::vec(record_strategy(), 1..16),
    ) {
        prop_assume!(a != b);
        let tree_a = BatchMerkleTree::from_records(&a, 0, &SCHEME_V2).unwrap();
        let tree_b = BatchMerkleTree::from_records(&b, 0, &SCHEME_V2).unwrap();
        let proof = tree_a.proof(0).unwrap();
        prop_assert!(!proof.verify(&tree_a.leaves()[0], &tree_b.root()));
    }

    #[test]
    fn log_batches_verify_every_member(
        records in prop::collection::vec(record_strategy(), 1..40),
        from in any::<prop::sample::Index>(),
    ) {
        let mut log = RecordLog::from_records(records);
        let from_index = from.index(log.record_count() as usize) as u64;
        let range = BatchRange::resolve(log.record_count(), from_index, None).unwrap();
        let commitment = BatchCommitment::from_log(log.records(), range, &SCHEME_V2).unwrap();
        let batch_id = log
            .create_batch(range.from_index, range.to_index, "prop", 0, &SCHEME_V2)
            .unwrap();

        for index in range.from_index..=range.to_index {
            let proof = commitment.proof_for(index).unwrap();
            prop_assert_eq!(log.verify_record(batch_id, index, &proof), Ok(true));
        }
        if range.to_index + 1 < log.record_count() {
            let proof = commitment.proof_for(range.to_index).unwrap();
            let outside = log.verify_record(batch_id, range.to_index + 1, &proof);
            let is_outside = matches!(outside, Err(MerkleBatchError::RecordOutsideBatch { .. }));
            prop_assert!(is_outside);
        }
    }
}
