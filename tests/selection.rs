use anyhow::Result;
use colagg::testing::{TableBuilder, assert_strictly_ascending_keys, pseudo_random_words};
use colagg::{AggOp, Column, EngineConfig, Value};

#[test]
fn top_two_strings_with_ties() {
    let c = Column::new("s", vec!["c", "a", "b", "a"]);
    assert_eq!(c.top_k(2), vec![0, 2]);

    let mut bottom = c.bottom_k(2);
    bottom.sort_unstable();
    assert_eq!(bottom, vec![1, 3]);
}

#[test]
fn ties_at_the_cut_are_all_kept() {
    let c = Column::new("n", vec![5i32, 9, 7, 9, 7, 7, 1]);
    let rows = c.top_k(2);
    let picked: Vec<_> = rows.iter().filter_map(|&r| c.get(r)).collect();
    assert_eq!(picked, [9, 9].map(Value::Int32).to_vec());

    let rows = c.top_k(3);
    let picked: Vec<_> = rows.iter().filter_map(|&r| c.get(r)).collect();
    assert_eq!(picked, [9, 9, 7, 7, 7].map(Value::Int32).to_vec());
}

#[test]
fn selection_does_not_reorder_the_column() {
    let c = Column::new("s", pseudo_random_words(300, 40));
    let before = c.clone();
    let _ = c.top_k_with(
        10,
        &EngineConfig {
            selection_sort_threshold: 3,
            ..EngineConfig::default()
        },
    );
    assert_eq!(c, before);
}

#[test]
fn large_selection_matches_full_sort() -> Result<()> {
    let words = pseudo_random_words(2_000, 300);
    let c = Column::new("w", words.clone());
    let cfg = EngineConfig {
        selection_sort_threshold: 5,
        ..EngineConfig::default()
    };
    for k in [1, 10, 150, 1_999] {
        let rows = c.bottom_k_with(k, &cfg);
        let mut sorted = words.clone();
        sorted.sort();
        let cut = &sorted[k - 1];
        let expected = sorted.iter().filter(|w| *w <= cut).count();
        assert_eq!(rows.len(), expected, "k = {k}");
        let picked: Vec<&str> = rows.iter().map(|&r| words[r].as_str()).collect();
        assert!(picked.windows(2).all(|w| w[0] <= w[1]), "k = {k}: not best-first");
        assert!(picked.iter().all(|w| *w <= cut.as_str()));
    }
    Ok(())
}

#[test]
fn zero_k_and_oversized_k() {
    let c = Column::new("n", vec![2u64, 1]);
    assert!(c.top_k(0).is_empty());
    assert_eq!(c.top_k(5), vec![0, 1]);
    assert!(Column::new("e", Vec::<u64>::new()).bottom_k(3).is_empty());
}

#[test]
fn truncate_keeps_window_in_order() {
    let mut c = Column::new("n", vec![10i8, 20, 30, 40, 50]);
    assert_eq!(c.truncate(2, 1), 2);
    assert_eq!(c.get(0), Some(Value::Int8(20)));
    assert_eq!(c.get(1), Some(Value::Int8(30)));

    let mut c = Column::new("n", vec![10i8, 20, 30]);
    assert_eq!(c.truncate(10, 1), 2);

    let mut c = Column::new("s", vec!["x", "y"]);
    assert_eq!(c.truncate(1, 2), 0);
    assert!(c.is_empty());
}

#[test]
fn table_limit_and_top_k_rows() -> Result<()> {
    let mut t = TableBuilder::new()
        .key("k", vec!["a", "b", "c", "d", "e"])
        .value("total", vec![7i64, 3, 9, 7, 1], AggOp::Sum)
        .build()?;
    assert_eq!(t.top_k_rows(1, 2)?, 3);
    assert_strictly_ascending_keys(&t);
    assert_eq!(t.row(0), Some(vec![Value::from("a"), Value::Int64(7)]));
    assert_eq!(t.row(2), Some(vec![Value::from("d"), Value::Int64(7)]));

    assert_eq!(t.truncate(1, 1), 1);
    assert_eq!(t.row(0), Some(vec![Value::from("c"), Value::Int64(9)]));

    let mut t = TableBuilder::new()
        .key("k", vec![1i32, 2, 3])
        .value("v", vec![3i32, 2, 1], AggOp::Min)
        .build()?;
    assert_eq!(t.bottom_k_rows(1, 1)?, 1);
    assert_eq!(t.row(0), Some(vec![Value::Int32(3), Value::Int32(1)]));
    Ok(())
}
