use super::*;
use crate::ast::{Assignment, Numeric};
use crate::config::Lookup;
use crate::error::ErrorCode;

fn parse_ok(input: &str) -> Module {
    parse_module(input, SourceId::Text, None).expect("expected a clean parse")
}

fn parse_err(input: &str) -> ParseFailure {
    match parse_module(input, SourceId::Text, None) {
        Ok(_) => panic!("expected parse to fail: {:?}", input),
        Err(failure) => failure,
    }
}

fn first_code(input: &str) -> ErrorCode {
    parse_err(input).errors[0].code
}

fn statement<'a>(module: &'a Module, key: &str) -> &'a Assignment {
    module
        .statements()
        .iter()
        .find(|s| s.key == key)
        .unwrap_or_else(|| panic!("no statement '{}'", key))
}

#[test]
fn test_scalar_statements() {
    let module = parse_ok(
        r#"
name := "Badkraft"
age := 42
admin := true
health := 20.0
id := badkraft
"#,
    );

    assert_eq!(module.keys(), vec!["name", "age", "admin", "health", "id"]);
    assert_eq!(
        statement(&module, "name").value,
        Value::String("Badkraft".into())
    );
    assert_eq!(
        statement(&module, "age").value,
        Value::Numeric(Numeric::Int(42))
    );
    assert_eq!(statement(&module, "admin").value, Value::Boolean(true));
    assert_eq!(
        statement(&module, "health").value,
        Value::Numeric(Numeric::Float(20.0))
    );
    assert_eq!(
        statement(&module, "id").value,
        Value::Bare("badkraft".into())
    );
}

#[test]
fn test_nested_object_tuple_array() {
    let module = parse_ok(
        r#"player := { name := "Grok", pos := (10, 64, -300), inventory := [ "a", "b" ] }"#,
    );

    let player = statement(&module, "player").value.as_object().unwrap();
    assert_eq!(player.get_string("name").unwrap(), "Grok");

    let pos = player.get_tuple("pos").unwrap();
    assert_eq!(pos.len(), 3);
    assert_eq!(pos.get(2).unwrap().as_long().unwrap(), -300);

    let inventory = player.get_array("inventory").unwrap();
    assert_eq!(inventory.len(), 2);
    assert_eq!(inventory.get(0).unwrap().as_string().unwrap(), "a");
}

#[test]
fn test_module_attributes_merge_in_order() {
    let module = parse_ok(
        "@[version=\"1.0.0\", mc_version=\"1.21.10\"]\n@[source=\"x\", debug=true, experimental]\nx := 1",
    );

    let keys: Vec<&str> = module
        .attributes()
        .iter()
        .map(|a| a.key.as_str())
        .collect();
    assert_eq!(
        keys,
        vec!["version", "mc_version", "source", "debug", "experimental"]
    );
    assert_eq!(module.attributes()[3].value, Some(Value::Boolean(true)));
    assert_eq!(module.attributes()[4].value, None); // tag form
}

#[test]
fn test_duplicate_top_level_key_fails_at_second_binding() {
    let failure = parse_err("a := 1\na := 2");
    assert_eq!(failure.total, 1);
    let err = failure.errors[0];
    assert_eq!(err.code, ErrorCode::DuplicateTopLevelKey);
    assert_eq!((err.line, err.column), (2, 1));
}

#[test]
fn test_tuple_arity_errors() {
    assert_eq!(first_code("x := (1)"), ErrorCode::TupleTooShort);
    assert_eq!(first_code("x := ()"), ErrorCode::EmptyTupleElement);
    assert_eq!(first_code("x := (1 2)"), ErrorCode::ExpectedCommaInTuple);
    assert_eq!(first_code("x := (1, 2"), ErrorCode::ExpectedTupleClose);
}

#[test]
fn test_nested_tuples() {
    let module = parse_ok("drop := (gold_ingot, (1, 3))");
    let drop = statement(&module, "drop").value.as_tuple().unwrap();
    assert_eq!(drop.get(0).unwrap().as_bare().unwrap(), "gold_ingot");
    let range = drop.get(1).unwrap().as_tuple().unwrap();
    assert_eq!(range.get(0).unwrap().as_long().unwrap(), 1);
    assert_eq!(range.get(1).unwrap().as_long().unwrap(), 3);
}

#[test]
fn test_rocket_after_tuple_is_rejected() {
    assert_eq!(first_code("x := (1, 2) => y"), ErrorCode::RocketOpNotValid);
}

#[test]
fn test_assignment_not_allowed_inside_containers() {
    assert_eq!(
        first_code("x := [1, := 2]"),
        ErrorCode::AssignmentNotAllowedHere
    );
}

#[test]
fn test_attribute_literal_restriction() {
    assert_eq!(
        first_code("x @[meta=[1,2]] := 1"),
        ErrorCode::InvalidValueInAttribute
    );
    assert_eq!(
        first_code("x @[meta={ a := 1 }] := 1"),
        ErrorCode::InvalidValueInAttribute
    );
    assert_eq!(
        first_code("x @[meta=(1, 2)] := 1"),
        ErrorCode::InvalidValueInAttribute
    );
    assert_eq!(
        first_code("x @[meta=@md`b`] := 1"),
        ErrorCode::InvalidValueInAttribute
    );
}

#[test]
fn test_attribute_scalars_stay_legal() {
    let module = parse_ok(r#"x @[level=3, rate=0.5, name="n", mode=fast, on=true, nothing=null, tag] := 1"#);
    let attrs = &statement(&module, "x").attributes;
    assert_eq!(attrs.len(), 7);
    assert_eq!(attrs[3].value, Some(Value::Bare("fast".into())));
    assert_eq!(attrs[6].value, None);
}

#[test]
fn test_attribute_block_errors() {
    assert_eq!(
        first_code("x @[a=1, a=2] := 1"),
        ErrorCode::DuplicateAttributeKey
    );
    assert_eq!(
        first_code("x @[a=1 b=2] := 1"),
        ErrorCode::MissingCommaInAttributes
    );
    assert_eq!(first_code("x @[a=1"), ErrorCode::ExpectedArrayClose);
    assert_eq!(first_code("x @[vars] := 1"), ErrorCode::AttributeIsKeyword);
    assert_eq!(first_code("x @[1] := 1"), ErrorCode::ExpectedIdentifier);
}

#[test]
fn test_object_rules() {
    assert_eq!(first_code("x := {}"), ErrorCode::EmptyObjectNotAllowed);
    assert_eq!(
        first_code("x := { a := 1, a := 2 }"),
        ErrorCode::DuplicateFieldInObject
    );
    assert_eq!(
        first_code("x := { true := 1 }"),
        ErrorCode::InvalidKeyInObject
    );
    assert_eq!(
        first_code("x := { 1 := 2 }"),
        ErrorCode::ExpectedObjectField
    );
    assert_eq!(first_code("x := { a 1 }"), ErrorCode::ExpectedAssign);
    assert_eq!(first_code("x := { a := 1"), ErrorCode::ExpectedObjectClose);
}

#[test]
fn test_object_comma_between_fields_is_optional() {
    let module = parse_ok("x := { a := 1 b := 2, c := 3 }");
    let object = statement(&module, "x").value.as_object().unwrap();
    assert_eq!(object.keys(), vec!["a", "b", "c"]);
}

#[test]
fn test_object_field_attributes() {
    let module = parse_ok(r#"x := { rare @[chance=0.1] := "loot" }"#);
    let object = statement(&module, "x").value.as_object().unwrap();
    let field = &object.fields()[0];
    assert_eq!(field.attributes.len(), 1);
    assert_eq!(field.attributes[0].key, "chance");
}

#[test]
fn test_array_rules() {
    let module = parse_ok("x := []");
    let array = statement(&module, "x").value.as_array().unwrap();
    assert!(array.is_empty());

    assert_eq!(first_code("x := [1 2]"), ErrorCode::MissingCommaInArray);
    assert_eq!(first_code("x := [1, 2,]"), ErrorCode::TrailingCommaInArray);
    assert_eq!(first_code("x := [1, 2"), ErrorCode::ExpectedArrayClose);
}

#[test]
fn test_mixed_type_array() {
    let module = parse_ok(r#"mixed := [ "hello", 42, true, 3.14, badkraft, @md`**bold**` ]"#);
    let mixed = statement(&module, "mixed").value.as_array().unwrap();
    assert_eq!(mixed.len(), 6);
    assert!(mixed.get(0).unwrap().is_string());
    assert!(mixed.get(1).unwrap().is_numeric());
    assert!(mixed.get(2).unwrap().is_boolean());
    assert!(mixed.get(4).unwrap().is_bare());
    assert!(mixed.get(5).unwrap().is_blob());
}

#[test]
fn test_string_escape_decoding() {
    let module = parse_ok(r#"s := "a\nb\tc\\d\"e\qf""#);
    // known escapes decode; unknown '\q' passes through with the backslash
    assert_eq!(
        statement(&module, "s").value.as_string().unwrap(),
        "a\nb\tc\\d\"e\\qf"
    );
}

#[test]
fn test_unterminated_string() {
    assert_eq!(first_code(r#"s := "abc"#), ErrorCode::UnterminatedString);
}

#[test]
fn test_blob_forms() {
    let module = parse_ok("a := @md`**bold**`\nb := @`plain`\nc := `tick`");
    let a = statement(&module, "a").value.as_blob().unwrap();
    assert_eq!(a.content, "**bold**");
    assert_eq!(a.tag.as_deref(), Some("md"));
    assert_eq!(statement(&module, "b").value.as_blob().unwrap().tag, None);
    assert_eq!(
        statement(&module, "c").value.as_blob().unwrap().content,
        "tick"
    );
}

#[test]
fn test_blob_escaped_backtick_stays_in_body() {
    let module = parse_ok(r"b := `a\`b`");
    let blob = statement(&module, "b").value.as_blob().unwrap();
    assert_eq!(blob.content, r"a\`b");
}

#[test]
fn test_blob_errors() {
    assert_eq!(first_code("b := @md \"x\""), ErrorCode::ExpectedBacktick);
    assert_eq!(first_code("b := @md`abc"), ErrorCode::UnterminatedFreeform);
    assert_eq!(first_code("b := @null`x`"), ErrorCode::AttributeIsKeyword);
}

#[test]
fn test_number_forms() {
    let module = parse_ok(
        "a := #FF\nb := 0xff\nc := 1_000_000\nd := 6.02e23\ne := -300\nf := -#10\ng := 2E+2",
    );
    assert_eq!(statement(&module, "a").value.as_long().unwrap(), 255);
    assert_eq!(statement(&module, "b").value.as_long().unwrap(), 255);
    assert_eq!(statement(&module, "c").value.as_long().unwrap(), 1_000_000);
    assert_eq!(
        statement(&module, "d").value.as_double().unwrap(),
        6.02e23
    );
    assert_eq!(statement(&module, "e").value.as_long().unwrap(), -300);
    assert_eq!(statement(&module, "f").value.as_long().unwrap(), -16);
    assert_eq!(statement(&module, "g").value.as_double().unwrap(), 200.0);
}

#[test]
fn test_integer_vs_float_is_decided_by_dot_or_exponent() {
    let module = parse_ok("i := 20\nf := 20.0\ne := 2e1");
    assert!(matches!(
        statement(&module, "i").value,
        Value::Numeric(Numeric::Int(20))
    ));
    assert!(matches!(
        statement(&module, "f").value,
        Value::Numeric(Numeric::Float(_))
    ));
    assert!(matches!(
        statement(&module, "e").value,
        Value::Numeric(Numeric::Float(_))
    ));
}

#[test]
fn test_number_errors() {
    assert_eq!(first_code("e := 2e+"), ErrorCode::InvalidExponent);
    assert_eq!(first_code("n := 0x"), ErrorCode::InvalidNumber);
    assert_eq!(
        first_code("n := 99999999999999999999"),
        ErrorCode::InvalidNumber
    );
}

#[test]
fn test_keyword_literals_and_bares() {
    let module = parse_ok("a := null\nb := nullary\nc := minecraft:diamond_sword\nd := a.b.c");
    assert!(statement(&module, "a").value.is_null());
    assert_eq!(
        statement(&module, "b").value.as_bare().unwrap(),
        "nullary"
    );
    assert_eq!(
        statement(&module, "c").value.as_bare().unwrap(),
        "minecraft:diamond_sword"
    );
    assert_eq!(statement(&module, "d").value.as_bare().unwrap(), "a.b.c");

    assert_eq!(first_code("x := vars"), ErrorCode::IdentifierIsKeyword);
    assert_eq!(first_code("x := include"), ErrorCode::IdentifierIsKeyword);
    assert_eq!(first_code("vars := 1"), ErrorCode::IdentifierIsKeyword);
}

#[test]
fn test_malformed_bare_separators() {
    assert_eq!(first_code("x := ns::y"), ErrorCode::UnexpectedToken);
    assert_eq!(first_code("x := trailing:"), ErrorCode::UnexpectedToken);
}

#[test]
fn test_parent_clause() {
    let module = parse_ok("child : base := { a := 1 }");
    let stmt = statement(&module, "child");
    assert_eq!(stmt.parent.as_deref(), Some("base"));

    assert_eq!(first_code("child : := 1"), ErrorCode::ExpectedIdentifier);
    assert_eq!(
        first_code("child : null := 1"),
        ErrorCode::IdentifierIsKeyword
    );
}

#[test]
fn test_statement_separators() {
    // commas between top-level statements are optional, same-line allowed
    let module = parse_ok("a := 1,\nb := 2\nc := 3, d := 4");
    assert_eq!(module.keys(), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_missing_assign() {
    assert_eq!(first_code("x 1"), ErrorCode::ExpectedAssign);
}

#[test]
fn test_comments_are_layout() {
    let module = parse_ok(
        "// leading\nx := 1 // trailing\n/* block /* nested */ still */ y := 2",
    );
    assert_eq!(module.keys(), vec!["x", "y"]);
}

#[test]
fn test_dialect_detection() {
    let module = parse_ok("#!aml\nx := 1");
    assert_eq!(module.dialect(), Dialect::Aml);

    let module = parse_ok("#!asl\nx := 1");
    assert_eq!(module.dialect(), Dialect::Asl);

    // extension hint applies when there is no shebang
    let module = parse_module("x := 1", SourceId::Text, Some(Dialect::Aml)).unwrap();
    assert_eq!(module.dialect(), Dialect::Aml);

    // shebang wins over the hint
    let module = parse_module("#!asl\nx := 1", SourceId::Text, Some(Dialect::Aml)).unwrap();
    assert_eq!(module.dialect(), Dialect::Asl);

    // permissive default
    let module = parse_ok("x := 1");
    assert_eq!(module.dialect(), Dialect::Asl);
}

#[test]
fn test_shebang_errors() {
    assert_eq!(first_code("#!aml\n#!aml\nx := 1"), ErrorCode::MultipleShebang);
    assert_eq!(
        first_code("x := 1\n#!aml"),
        ErrorCode::ShebangAfterStatements
    );
}

#[test]
fn test_recovery_collects_multiple_errors() {
    let failure = parse_err("x := (1)\ny := [1 2]\nz := \"open");
    let codes: Vec<ErrorCode> = failure.errors.iter().map(|e| e.code).collect();
    assert!(codes.contains(&ErrorCode::TupleTooShort));
    assert!(codes.contains(&ErrorCode::MissingCommaInArray));
    assert!(codes.contains(&ErrorCode::UnterminatedString));
}

#[test]
fn test_recovery_resumes_after_semicolon() {
    let failure = parse_err("x := ; y := 2");
    assert_eq!(failure.errors[0].code, ErrorCode::UnexpectedToken);
    // only the broken statement is lost
    assert_eq!(failure.total, 1);
}

#[test]
fn test_error_cap_limits_recording_not_counting() {
    let input = "?\n".repeat(30);
    let failure = parse_err(&input);
    assert_eq!(failure.errors.len(), 25);
    assert_eq!(failure.total, 30);
}

#[test]
fn test_error_positions_are_one_based() {
    let failure = parse_err("ok := 1\nbad := (2)");
    let err = failure.errors[0];
    assert_eq!(err.code, ErrorCode::TupleTooShort);
    assert_eq!(err.line, 2);
    assert!(err.column > 1);
}

#[test]
fn test_parse_is_deterministic() {
    let input = "@[v=\"1\"]\na := { x := (1, 2), y := [3] }\nb := @md`text`";
    let first = parse_ok(input);
    let second = parse_ok(input);
    // namespaces are generated per parse; the structure must be identical
    assert_eq!(first.statements(), second.statements());
    assert_eq!(first.attributes(), second.attributes());
    assert_eq!(first.dialect(), second.dialect());
    assert_eq!(first.keys(), second.keys());

    let bad = "a := (1)\nb := [2 3]";
    assert_eq!(parse_err(bad), parse_err(bad));
}

#[test]
fn test_composite_spans_reparse_to_equal_values() {
    let module = parse_ok(
        r#"player := { name := "Grok", pos := (10, 64, -300), inventory := [ "a", "b" ] }"#,
    );
    let value = &statement(&module, "player").value;
    let object = value.as_object().unwrap();
    assert!(object.span().starts_with('{'));
    assert!(object.span().ends_with('}'));

    let reparsed = parse_value_str(object.span()).expect("span should reparse");
    assert_eq!(&reparsed, value);

    let pos = object.get_tuple("pos").unwrap();
    let reparsed = parse_value_str(pos.span()).expect("tuple span should reparse");
    assert_eq!(reparsed.as_tuple().unwrap().len(), 3);
}

#[test]
fn test_parse_value_str_rejects_trailing_input() {
    assert!(parse_value_str("1 2").is_err());
    assert!(parse_value_str("(1, 2)").is_ok());
    assert!(parse_value_str("  42  ").is_ok());
}

#[test]
fn test_empty_source_is_an_empty_module() {
    let module = parse_ok("");
    assert!(module.statements().is_empty());
    assert!(module.attributes().is_empty());

    let module = parse_ok("  \n\t// only layout\n/* and comments */");
    assert!(module.statements().is_empty());
}
