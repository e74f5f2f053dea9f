//! Output correctness tests for the writer

use std::error::Error;

use curson::writer::{
    InfinitySpelling, StringTextWriter, TextWriter, Value, WriteStyle, WriterSettings,
};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn output_is_valid_json() -> TestResult {
    let mut writer = StringTextWriter::default();
    writer.start_object()?;
    writer.write_pair("null", Value::Null)?;
    writer.write_pair("bool", true)?;
    writer.write_pair("int", -42)?;
    writer.write_pair("float", 0.25)?;
    writer.write_pair("string", "a\"b\\c\nd\u{0}e𝄞")?;
    writer.write_key("nested")?;
    writer.start_array()?;
    writer.write_value(vec![1, 2])?;
    writer.write_value(Value::Object(vec![("k".into(), "v".into())]))?;
    writer.end_array()?;
    writer.end_object()?;

    // The output must be accepted by serde_json and decode to the same data
    let parsed: serde_json::Value = serde_json::from_str(writer.as_str())?;
    assert_eq!(serde_json::Value::Null, parsed["null"]);
    assert_eq!(true, parsed["bool"].as_bool().unwrap());
    assert_eq!(-42, parsed["int"].as_i64().unwrap());
    assert_eq!(0.25, parsed["float"].as_f64().unwrap());
    assert_eq!("a\"b\\c\nd\u{0}e𝄞", parsed["string"].as_str().unwrap());
    assert_eq!(1, parsed["nested"][0][0].as_i64().unwrap());
    assert_eq!("v", parsed["nested"][1]["k"].as_str().unwrap());
    Ok(())
}

#[test]
fn member_order_is_preserved() -> TestResult {
    let map = Value::Object(vec![
        ("z".into(), 1.into()),
        ("a".into(), 2.into()),
        ("m".into(), 3.into()),
    ]);
    let mut writer = StringTextWriter::default();
    writer.write_value(map)?;
    assert_eq!(r#"{"z":1,"a":2,"m":3}"#, writer.as_str());
    Ok(())
}

#[test]
fn keys_are_always_strings() -> TestResult {
    let map = Value::Object(vec![
        (1.into(), "int key".into()),
        (true.into(), "bool key".into()),
        (Value::Null, "null key".into()),
        (0.5.into(), "float key".into()),
        ("s".into(), "string key".into()),
    ]);
    let mut writer = StringTextWriter::default();
    writer.write_value(map)?;
    assert_eq!(
        r#"{"1":"int key","true":"bool key","null":"null key","0.5":"float key","s":"string key"}"#,
        writer.as_str()
    );
    Ok(())
}

#[test]
fn pretty_output_is_valid_json() -> TestResult {
    let mut writer = TextWriter::new_custom(
        Vec::new(),
        WriterSettings {
            style: WriteStyle::Pretty {
                indent: "\t".to_owned(),
            },
            ..Default::default()
        },
    );
    writer.start_array()?;
    writer.write_value(1)?;
    writer.write_value(Value::Object(vec![("a".into(), vec![2, 3].into())]))?;
    writer.end_array()?;

    let output = writer.into_string();
    assert_eq!("[\n\t1,\n\t{\n\t\t\"a\": [\n\t\t\t2,\n\t\t\t3\n\t\t]\n\t}\n]", output);

    let parsed: serde_json::Value = serde_json::from_str(&output)?;
    assert_eq!(2, parsed[1]["a"][0].as_i64().unwrap());
    Ok(())
}

#[test]
fn infinity_spelling_choices() -> TestResult {
    let mut writer = StringTextWriter::default();
    writer.write_value(f64::INFINITY)?;
    assert_eq!("inf", writer.as_str());

    let mut writer = TextWriter::new_custom(
        Vec::new(),
        WriterSettings {
            infinity: InfinitySpelling::Infinity,
            ..Default::default()
        },
    );
    writer.write_value(f64::NEG_INFINITY)?;
    assert_eq!("-Infinity", writer.as_str());
    Ok(())
}

#[test]
fn root_scalar_documents() -> TestResult {
    let mut writer = StringTextWriter::default();
    writer.write_value("x")?;
    assert_eq!(r#""x""#, writer.as_str());

    let mut writer = StringTextWriter::default();
    writer.write_value(Value::Null)?;
    assert_eq!("null", writer.as_str());
    Ok(())
}
