#![cfg(test)]

// Property tests for ChainHashMap kept inside the crate so they can check
// the chain structure directly.

use crate::chain_hash_map::ChainHashMap;
use crate::strategy::{FnStrategy, KeyStrategy};
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Find(usize),
    Contains(Vec<u8>),
    Mutate(usize, i32),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<OpI>)> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..6), 1..=24).prop_flat_map(
        |pool| {
            let idxs: Vec<usize> = (0..pool.len()).collect();
            let idx = proptest::sample::select(idxs);
            let op = prop_oneof![
                3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
                1 => idx.clone().prop_map(OpI::Remove),
                1 => idx.clone().prop_map(OpI::Find),
                1 => proptest::collection::vec(any::<u8>(), 0..6).prop_map(OpI::Contains),
                1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            ];
            proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
        },
    )
}

// Runs one scenario against a std HashMap model.
// Invariants exercised after every op:
// - Upsert returns the model's previous value; size only grows on new keys.
// - `find`/`contains` parity with the model, including never-inserted keys.
// - `remove` returns the model's value and the key is gone afterwards.
// - Size parity, power-of-two bucket count, `len <= capacity`, and every
//   entry sits in the bucket its cached hash selects.
fn run_state_machine<S: KeyStrategy>(
    mut sut: ChainHashMap<i32, S>,
    pool: &[Vec<u8>],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Vec<u8>, i32> = HashMap::new();
    let mut buckets = sut.bucket_count();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = &pool[i];
                let prev = sut.insert(k, v).expect("insert of a small key");
                prop_assert_eq!(prev, model.insert(k.clone(), v));
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(k));
                prop_assert!(sut.find(k).is_none());
            }
            OpI::Find(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.find(k), model.get(k));
            }
            OpI::Contains(k) => {
                prop_assert_eq!(sut.contains(&k), model.contains_key(&k));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.find_mut(k), model.get_mut(k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.saturating_add(d);
                        *mv = mv.saturating_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "find_mut disagrees with model"),
                }
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.bucket_count().is_power_of_two());
        prop_assert!(sut.bucket_count() >= buckets, "bucket array never shrinks");
        prop_assert!(sut.len() <= sut.capacity().max(1));
        buckets = sut.bucket_count();
        sut.check_invariants();
    }

    for (k, v) in &model {
        prop_assert_eq!(sut.find(k), Some(v));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), hint in 0usize..40) {
        let sut = ChainHashMap::with_capacity(hint).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}

fn low_bits_hash(key: &[u8]) -> u32 {
    key.first().map_or(0, |b| u32::from(b & 0x3))
}

fn bytes_eq(a: &[u8], b: &[u8]) -> bool {
    a == b
}

// Property: same invariants when nearly every key collides (only four
// distinct hashes), stressing chain walking and unlinking.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let strategy = FnStrategy::new(Some(low_bits_hash), Some(bytes_eq)).unwrap();
        let sut = ChainHashMap::with_capacity_and_strategy(0, strategy).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}

// Property: size after N distinct inserts and M distinct removals is N - M,
// whatever order the keys arrive in.
proptest! {
    #[test]
    fn prop_size_accounting(keys in proptest::collection::hash_set(proptest::collection::vec(any::<u8>(), 0..8), 0..64), drop_every in 1usize..5) {
        let mut m = ChainHashMap::new();
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(m.insert(k, i).unwrap(), None);
        }
        let mut removed = 0;
        for (i, k) in keys.iter().enumerate() {
            if i % drop_every == 0 {
                prop_assert_eq!(m.remove(k), Some(i));
                removed += 1;
            }
        }
        prop_assert_eq!(m.len(), keys.len() - removed);
        m.check_invariants();
    }
}
