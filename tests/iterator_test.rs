//! Tests for view iteration over heterogeneous documents

use std::error::Error;

use curson::reader::{ReaderError, StructuralErrorKind, TextReader, ValueType};

type TestResult = Result<(), Box<dyn Error>>;

/// Collects the element texts of the root array; container elements appear as empty text
fn array_items(json: &str) -> Result<Vec<String>, ReaderError> {
    let mut reader = TextReader::new(json.as_bytes())?;
    let mut items = reader.array()?.iter();
    let mut values = Vec::new();
    while let Some(cell) = items.next_value()? {
        values.push(cell.as_str().to_owned());
    }
    Ok(values)
}

/// Collects the member names of the root object
fn object_keys(json: &str) -> Result<Vec<String>, ReaderError> {
    let mut reader = TextReader::new(json.as_bytes())?;
    let mut members = reader.object()?.iter();
    let mut keys = Vec::new();
    while let Some((key, _)) = members.next_member()? {
        keys.push(key.as_str().to_owned());
    }
    Ok(keys)
}

fn assert_kind_mismatch<T: std::fmt::Debug>(result: Result<T, ReaderError>) {
    match result {
        Err(ReaderError::Structural {
            kind: StructuralErrorKind::ContainerKindMismatch,
            ..
        }) => {}
        other => panic!("Expected container kind mismatch, got: {other:?}"),
    }
}

#[test]
fn homogeneous() -> TestResult {
    assert_eq!(
        vec!["1", "2", "3", "4", "5"],
        array_items("[1, 2, 3, 4, 5]")?
    );
    assert_kind_mismatch(object_keys("[1, 2, 3, 4, 5]"));

    assert_eq!(vec!["1", "3"], object_keys("{\"1\": 2, \"3\": 4}")?);
    assert_kind_mismatch(array_items("{\"1\": 2, \"3\": 4}"));
    Ok(())
}

#[test]
fn heterogeneous_ending() -> TestResult {
    // The nested containers appear as one empty placeholder each; their contents are
    // not flattened into the iteration
    assert_eq!(
        vec!["1", "2", "3", "4", ""],
        array_items("[1, 2, 3, 4, [5, 6, 7]]")?
    );
    assert_eq!(
        vec!["1", "2", "3", "", ""],
        array_items("[1, 2, 3, [8, 9], [5, 6, 7]]")?
    );
    assert_kind_mismatch(object_keys("[1, 2, 3, 4, [5, 6, 7]]"));

    assert_eq!(
        vec!["1", "3", "4"],
        object_keys("{\"1\": 2, \"3\": [5, 6], \"4\": [9, 8]}")?
    );
    assert_kind_mismatch(array_items("{\"1\": 2, \"3\": [5, 6], \"4\": [9, 8]}"));
    Ok(())
}

#[test]
fn heterogeneous_beginning() -> TestResult {
    assert_eq!(
        vec!["1", "2", "3", "4", "", "5"],
        array_items("[1, 2, 3, 4, [6, 7, 8], 5]")?
    );
    assert_kind_mismatch(object_keys("[1, 2, 3, 4, [6, 7, 8], 5]"));

    assert_eq!(
        vec!["1", "3", "6", "7", "10"],
        object_keys("{\"1\": 2, \"3\": [4, 5], \"6\": [], \"7\": [8, 9], \"10\": 11}")?
    );
    Ok(())
}

#[test]
fn nested_array_iteration() -> TestResult {
    let mut reader = TextReader::new("[[1, 2], [3, 4], [5, 6]]".as_bytes())?;
    let mut outer = reader.array()?.iter();
    let mut inner_values = Vec::new();

    while let Some(cell) = outer.next_value()? {
        assert_eq!(true, cell.is_container());
        let mut inner = outer.reader().array()?.iter();
        while let Some(cell) = inner.next_value()? {
            inner_values.push(cell.get::<u32>()?);
        }
    }
    assert_eq!(vec![1, 2, 3, 4, 5, 6], inner_values);
    Ok(())
}

#[test]
fn nested_object_iteration() -> TestResult {
    let mut reader = TextReader::new("{\"1\": [2, 3], \"4\": [5, 6]}".as_bytes())?;
    let mut outer = reader.object()?.iter();
    let mut keys = Vec::new();
    let mut inner_values = Vec::new();

    while let Some((key, value)) = outer.next_member()? {
        keys.push(key.as_str().to_owned());
        assert_eq!(ValueType::ArrayStart, value.value_type());
        let mut inner = outer.reader().array()?.iter();
        while let Some(cell) = inner.next_value()? {
            inner_values.push(cell.get::<u32>()?);
        }
    }
    assert_eq!(vec!["1", "4"], keys);
    assert_eq!(vec![2, 3, 5, 6], inner_values);
    Ok(())
}

#[test]
fn member_values() -> TestResult {
    let mut reader = TextReader::new(r#"{"a": 1, "b": "x", "c": null, "d": true}"#.as_bytes())?;
    let mut members = reader.object()?.iter();

    let (key, value) = members.next_member()?.unwrap();
    assert_eq!("a", key.as_str());
    assert_eq!(ValueType::Number, value.value_type());
    assert_eq!(1_u32, value.get()?);

    let (_, value) = members.next_member()?.unwrap();
    assert_eq!("x", value.get::<String>()?);

    let (_, value) = members.next_member()?.unwrap();
    assert_eq!(ValueType::Null, value.value_type());

    let (_, value) = members.next_member()?.unwrap();
    assert_eq!(true, value.get()?);

    assert_eq!(None, members.next_member()?);
    Ok(())
}

#[test]
fn empty_containers() -> TestResult {
    assert_eq!(true, array_items("[]")?.is_empty());
    assert_eq!(true, object_keys("{}")?.is_empty());
    assert_kind_mismatch(array_items("{}"));
    assert_kind_mismatch(object_keys("[]"));
    Ok(())
}

#[test]
fn malformed_document_fails_iteration() -> TestResult {
    let mut reader = TextReader::new("[1, 2,, 3]".as_bytes())?;
    let mut items = reader.array()?.iter();
    assert_eq!("1", items.next_value()?.unwrap().as_str());
    assert_eq!("2", items.next_value()?.unwrap().as_str());
    assert_eq!(true, items.next_value().is_err());
    // The reader failed, the iteration is detached afterwards
    assert_eq!(None, items.next_value()?);
    Ok(())
}
