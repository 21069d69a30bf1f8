use anyhow::Result;
use colagg::testing::{
    TableBuilder, assert_strictly_ascending_keys, assert_tables_equal, partition_evenly,
    pseudo_random_i64, pseudo_random_words,
};
use colagg::{AggOp, Column, ColumnError, EngineConfig, GroupBy, Value, merge, merge_all};

#[test]
fn one_key_sum_and_max() -> Result<()> {
    for (op, want_3) in [(AggOp::Sum, 8i64), (AggOp::Max, 7)] {
        let a = TableBuilder::new()
            .key("k", vec![1i32, 3])
            .value("v", vec![5i64, 7], op)
            .build()?;
        let b = TableBuilder::new()
            .key("k", vec![2i32, 3])
            .value("v", vec![2i64, 1], op)
            .build()?;
        let m = merge(&a, &b)?;
        assert_eq!(m.rows(), 3);
        assert_eq!(m.row(0), Some(vec![Value::Int32(1), Value::Int64(5)]));
        assert_eq!(m.row(1), Some(vec![Value::Int32(2), Value::Int64(2)]));
        assert_eq!(m.row(2), Some(vec![Value::Int32(3), Value::Int64(want_3)]));
    }
    Ok(())
}

#[test]
fn string_keys_merge() -> Result<()> {
    let a = TableBuilder::new()
        .key("k", vec!["apple", "kiwi"])
        .value("n", vec![1u64, 2], AggOp::Cnt)
        .build()?;
    let b = TableBuilder::new()
        .key("k", vec!["banana", "kiwi", "zucchini"])
        .value("n", vec![4u64, 5, 6], AggOp::Cnt)
        .build()?;
    let m = merge(&a, &b)?;
    assert_strictly_ascending_keys(&m);
    let n: Vec<_> = (0..m.rows()).filter_map(|r| m.row(r)).map(|row| row[1].clone()).collect();
    assert_eq!(n, [1u64, 4, 7, 6].map(Value::UInt64).to_vec());
    Ok(())
}

#[test]
fn two_keys_of_mixed_types() -> Result<()> {
    let a = TableBuilder::new()
        .key("region", vec!["east", "east", "west"])
        .key("year", vec![2023i16, 2024, 2024])
        .value("lo", vec![5.0f64, 3.0, 9.0], AggOp::Min)
        .build()?;
    let b = TableBuilder::new()
        .key("region", vec!["east", "north", "west"])
        .key("year", vec![2024i16, 2023, 2024])
        .value("lo", vec![1.0f64, 4.0, 10.0], AggOp::Min)
        .build()?;
    let m = merge(&a, &b)?;
    assert_strictly_ascending_keys(&m);
    assert_eq!(m.rows(), 4);
    assert_eq!(
        m.row(1),
        Some(vec![Value::from("east"), Value::Int16(2024), Value::from(1.0f64)])
    );
    assert_eq!(
        m.row(3),
        Some(vec![Value::from("west"), Value::Int16(2024), Value::from(9.0f64)])
    );
    Ok(())
}

#[test]
fn nil_keeps_left_value() -> Result<()> {
    let a = TableBuilder::new()
        .key("k", vec![1u8])
        .value("label", vec!["left"], AggOp::Nil)
        .build()?;
    let b = TableBuilder::new()
        .key("k", vec![1u8])
        .value("label", vec!["right"], AggOp::Nil)
        .build()?;
    assert_eq!(merge(&a, &b)?.row(0), Some(vec![Value::UInt8(1), Value::from("left")]));
    Ok(())
}

#[test]
fn empty_side_copies_the_other() -> Result<()> {
    let a = TableBuilder::new()
        .key("k", Vec::<i64>::new())
        .value("v", Vec::<i64>::new(), AggOp::Sum)
        .build()?;
    let b = TableBuilder::new()
        .key("k", vec![4i64, 8])
        .value("v", vec![1i64, 1], AggOp::Sum)
        .build()?;
    assert_tables_equal(&merge(&a, &b)?, &b);
    assert_tables_equal(&merge(&b, &a)?, &b);
    Ok(())
}

#[test]
fn mismatched_operators_are_rejected() -> Result<()> {
    let a = TableBuilder::new()
        .key("k", vec![1i32])
        .value("v", vec![1i64], AggOp::Sum)
        .build()?;
    let b = TableBuilder::new()
        .key("k", vec![1i32])
        .value("v", vec![1i64], AggOp::Max)
        .build()?;
    assert!(matches!(merge(&a, &b), Err(ColumnError::NotMergeable(_))));

    let median = TableBuilder::new()
        .key("k", vec![1i32])
        .value("v", vec![1i64], AggOp::Median)
        .build()?;
    assert!(merge(&median, &median).is_err());
    Ok(())
}

#[test]
fn categorical_keys_need_the_same_dictionary() -> Result<()> {
    let a = TableBuilder::new()
        .key_column(Column::categorical("c", ["x", "y"]))
        .value("n", vec![1i64, 2], AggOp::Sum)
        .build()?;
    let same = a.clone();
    assert_eq!(merge(&a, &same)?.row(1), Some(vec![Value::UInt32(1), Value::Int64(4)]));

    let other = TableBuilder::new()
        .key_column(Column::categorical("c", ["y", "x"]))
        .value("n", vec![1i64, 2], AggOp::Sum)
        .build()?;
    assert!(merge(&a, &other).is_err());
    Ok(())
}

/// Grouping partitions separately and merging the partials gives the same table
/// as grouping everything at once.
#[test]
fn partial_aggregation_matches_single_pass() -> Result<()> {
    let n = 1_200;
    let keys = pseudo_random_words(n, 23);
    let vals = pseudo_random_i64(n, -100, 100);
    let plan = GroupBy::new([0])
        .aggregate(1, AggOp::Sum)
        .aggregate(1, AggOp::Cnt)
        .aggregate(1, AggOp::Min)
        .aggregate(1, AggOp::Max);

    let whole = plan.execute(&[Column::new("k", keys.clone()), Column::new("v", vals.clone())])?;

    let partials = partition_evenly(&keys, 5)
        .into_iter()
        .zip(partition_evenly(&vals, 5))
        .map(|(k, v)| plan.execute(&[Column::new("k", k), Column::new("v", v)]))
        .collect::<Result<Vec<_>>>()?;
    let merged = merge_all(partials.clone())?;
    assert_tables_equal(&merged, &whole);

    #[cfg(feature = "parallel")]
    {
        let cfg = EngineConfig {
            fan_in_threads: Some(2),
            ..EngineConfig::default()
        };
        let par = colagg::merge_all_par(partials, &cfg)?;
        assert_tables_equal(&par, &whole);
    }
    #[cfg(not(feature = "parallel"))]
    let _ = (partials, EngineConfig::default());
    Ok(())
}
