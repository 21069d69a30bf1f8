use std::sync::Arc;

use anyhow::Result;
use colagg::{Column, ColumnError, Dictionary, LogicalType, Value};

#[test]
fn float_to_int_truncates_toward_zero() -> Result<()> {
    let src = Column::new("f", vec![2.9f64, -2.9, 0.5, -0.5]);
    let out = Column::create("i", &src, LogicalType::Int32)?;
    let got: Vec<_> = (0..4).filter_map(|i| out.get(i)).collect();
    assert_eq!(got, [2, -2, 0, 0].map(Value::Int32).to_vec());
    Ok(())
}

#[test]
fn wide_to_narrow_keeps_low_bits() -> Result<()> {
    let src = Column::new("w", vec![0x1_2345i64, -129]);
    let out = Column::create("n", &src, LogicalType::Int16)?;
    assert_eq!(out.get(0), Some(Value::Int16(0x2345)));
    let out = Column::create("n", &src, LogicalType::Int8)?;
    assert_eq!(out.get(1), Some(Value::Int8(127)));
    Ok(())
}

#[test]
fn every_numeric_pairing_is_supported() -> Result<()> {
    let numeric: Vec<_> = LogicalType::ALL.iter().copied().filter(|t| t.is_numeric()).collect();
    for &from in &numeric {
        let src = Column::from_values("x", from, &[Value::Int8(1), Value::Int8(2)])?;
        for &to in &numeric {
            let out = Column::create("y", &src, to)?;
            assert_eq!(out.logical_type(), to);
            assert_eq!(out.sum(), Some(3.0), "{from} -> {to}");
        }
    }
    Ok(())
}

#[test]
fn strings_cannot_become_numbers() {
    let src = Column::new("s", vec!["12"]);
    let err = Column::create("n", &src, LogicalType::Float64).unwrap_err();
    assert!(matches!(err, ColumnError::IncompatibleType { .. }));
}

#[test]
fn equal_to_is_total() {
    let a = Column::new("a", vec!["x", "y"]);
    let b = Column::new("b", vec!["y"]);
    let n = Column::new("n", vec![1i32]);
    assert!(a.equal_to(&b, 1, 0));
    assert!(!a.equal_to(&b, 0, 0));
    assert!(!a.equal_to(&n, 0, 0));
    assert!(!a.equal_to(&b, 5, 0));
}

#[test]
fn accessors_never_panic_out_of_range() {
    let mut c = Column::new("c", vec![1.5f32]);
    assert_eq!(c.get(1), None);
    assert_eq!(c.compare(0, 1), None);
    assert!(matches!(c.swap(1, 0), Err(ColumnError::OutOfRange { index: 1, len: 1 })));
    assert!(c.gather(&[0, 2]).is_err());
    assert!(c.reorder(&[0, 0]).is_err());
    assert!(matches!(
        c.permute_range(usize::MAX, &[0, 1]),
        Err(ColumnError::InvalidPermutation(_))
    ));
}

#[test]
fn min_max_sum_on_numbers_only() {
    let c = Column::new("n", vec![4u64, 9, 1]);
    assert_eq!(c.min(), Some(Value::UInt64(1)));
    assert_eq!(c.max(), Some(Value::UInt64(9)));
    assert_eq!(c.sum(), Some(14.0));
    assert_eq!(Column::empty("e", LogicalType::Int8).min(), None);
    assert_eq!(Column::new("b", vec![b"x".to_vec()]).max(), None);
}

#[test]
fn dictionary_round_trip() -> Result<()> {
    let words = ["low", "high", "low", "mid"];
    let cat = Column::categorical("level", words);
    let dict = cat.dictionary().map(Arc::clone);
    assert_eq!(dict.as_deref().map(Dictionary::len), Some(3));
    assert_eq!(cat.get(2), Some(Value::UInt32(0)));

    let decoded = cat.decode()?;
    let got: Vec<_> = (0..4).filter_map(|i| decoded.get(i)).collect();
    assert_eq!(got, words.map(Value::from).to_vec());

    let widened = Column::create("w", &cat, LogicalType::UInt64)?;
    assert!(widened.dictionary().is_none());
    Ok(())
}

#[test]
fn push_and_gather() -> Result<()> {
    let mut c = Column::empty("s", LogicalType::Utf8);
    c.push(&Value::from("a"))?;
    c.push(&Value::from("b"))?;
    assert!(c.push(&Value::Int32(1)).is_err());
    let g = c.gather(&[1, 1, 0])?;
    assert_eq!(g.len(), 3);
    assert_eq!(g.get(0), Some(Value::from("b")));
    assert_eq!(g.name(), "s");
    Ok(())
}
