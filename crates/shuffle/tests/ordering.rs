use std::cmp::Ordering;

use grist_common::RuntimeConfig;
use grist_shuffle::{RawTupleComparator, GROUP_COMPARATOR_KEY};
use grist_tuple::{serialize_tuple, Tuple, Value};
use proptest::prelude::*;

fn default_comparator() -> RawTupleComparator {
    let mut config = RuntimeConfig::new();
    config.set(format!("{GROUP_COMPARATOR_KEY}.size"), "1");
    RawTupleComparator::configure(&config)
        .expect("configure")
        .expect("non-empty config")
}

#[test]
fn orders_serialized_records_by_first_field() {
    let mut cmp = default_comparator();

    let alice = serialize_tuple(&Tuple::new(vec![
        Value::Text("alice".into()),
        Value::Int(30),
    ]));
    let bob = serialize_tuple(&Tuple::new(vec![Value::Text("bob".into()), Value::Int(25)]));

    assert_eq!(cmp.compare_serialized(&alice, &bob).unwrap(), Ordering::Less);
    assert_eq!(
        cmp.compare_serialized(&bob, &alice).unwrap(),
        Ordering::Greater
    );
    assert_eq!(
        cmp.compare_serialized(&alice, &alice).unwrap(),
        Ordering::Equal
    );
}

#[test]
fn sorts_a_batch_of_serialized_records() {
    let mut cmp = default_comparator();

    let mut records: Vec<Vec<u8>> = ["delta", "alpha", "charlie", "bravo"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            serialize_tuple(&Tuple::new(vec![
                Value::Text((*name).into()),
                Value::Int(i as i32),
            ]))
        })
        .collect();

    records.sort_by(|a, b| cmp.compare_serialized(a, b).expect("comparable records"));

    let names: Vec<String> = records
        .iter()
        .map(|bytes| {
            match grist_tuple::deserialize_tuple(bytes).unwrap().get(0).unwrap() {
                Value::Text(name) => name.clone(),
                other => panic!("unexpected element: {other:?}"),
            }
        })
        .collect();
    assert_eq!(names, ["alpha", "bravo", "charlie", "delta"]);
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::Int),
        any::<i64>().prop_map(Value::Long),
        any::<f64>().prop_map(Value::Double),
        "[a-z]{0,6}".prop_map(Value::Text),
        proptest::collection::vec(any::<u8>(), 0..6).prop_map(Value::Bytes),
    ]
}

fn tuple_strategy() -> impl Strategy<Value = Tuple> {
    proptest::collection::vec(value_strategy(), 0..5).prop_map(Tuple::new)
}

proptest! {
    #[test]
    fn materialized_and_streamed_orderings_agree(a in tuple_strategy(), b in tuple_strategy()) {
        let mut cmp = default_comparator();
        let materialized = cmp.compare_tuples(&a, &b);
        let streamed = cmp
            .compare_serialized(&serialize_tuple(&a), &serialize_tuple(&b))
            .unwrap();
        prop_assert_eq!(materialized, streamed);
    }

    #[test]
    fn swapping_operands_negates_the_sign(a in tuple_strategy(), b in tuple_strategy()) {
        let mut cmp = default_comparator();
        let forward = cmp
            .compare_serialized(&serialize_tuple(&a), &serialize_tuple(&b))
            .unwrap();
        let backward = cmp
            .compare_serialized(&serialize_tuple(&b), &serialize_tuple(&a))
            .unwrap();
        prop_assert_eq!(forward, backward.reverse());
    }

    #[test]
    fn arity_difference_matches_length_sign(a in tuple_strategy(), b in tuple_strategy()) {
        prop_assume!(a.len() != b.len());
        let mut cmp = default_comparator();
        let ord = cmp
            .compare_serialized(&serialize_tuple(&a), &serialize_tuple(&b))
            .unwrap();
        prop_assert_eq!(ord, a.len().cmp(&b.len()));
    }
}
