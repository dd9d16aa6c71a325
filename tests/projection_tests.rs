use elastic_query::{
    Column, CompileError, CompilerOptions, MemberBinding, MemberRef, ProjectionCompiler,
    QueryNode, RecordType, ScalarType, TypeRef, Value,
};
use std::collections::HashMap;

fn info() -> TypeRef {
    RecordType::new("Info")
        .with_property("City", TypeRef::string())
        .into_type()
}

fn person() -> TypeRef {
    RecordType::new("Person")
        .with_property("Id", TypeRef::scalar(ScalarType::Int))
        .with_property("Name", TypeRef::string())
        .with_property("Info", info())
        .into_type()
}

fn it() -> QueryNode {
    QueryNode::parameter("$it", person())
}

fn col(name: &str) -> QueryNode {
    QueryNode::member(it(), name)
}

fn dynamic_options() -> CompilerOptions {
    CompilerOptions::new().dynamic_containers_named(["NamedProperty", "NamedPropertyWithNext"])
}

/// `new NamedProperty { Name = name, Value = value }`, chained through `Next`.
fn named(name: &str, value: QueryNode, next: Option<QueryNode>) -> QueryNode {
    let container_name = if next.is_some() {
        "NamedPropertyWithNext"
    } else {
        "NamedProperty"
    };
    let mut ty = RecordType::new(container_name)
        .with_property("Name", TypeRef::string())
        .with_property("Value", TypeRef::opaque("object"));
    if let Some(next) = &next {
        ty = ty.with_property("Next", next.type_of());
    }
    let mut bindings = vec![("Name", QueryNode::constant(name)), ("Value", value)];
    if let Some(next) = next {
        bindings.push(("Next", next));
    }
    QueryNode::new_record(ty.into_type(), bindings)
}

fn city_fallback() -> QueryNode {
    let info = col("Info");
    QueryNode::conditional(
        QueryNode::equal(info.clone(), QueryNode::constant(Value::Null)),
        QueryNode::constant(Value::Null),
        QueryNode::member(info, "City"),
    )
}

fn compile_with(
    options: &CompilerOptions,
    body: QueryNode,
) -> Result<(Vec<Column>, Vec<Value>), CompileError> {
    let row = person();
    let mut columns = Vec::new();
    let mut params = Vec::new();
    let lambda = QueryNode::lambda(&it(), body.type_of(), body);
    ProjectionCompiler::new(&row, options, &mut columns, &mut params).compile(&lambda)?;
    Ok((columns, params))
}

fn rendered(columns: &[Column]) -> Vec<String> {
    columns.iter().map(Column::to_string).collect()
}

#[test]
fn test_anonymous_record() {
    let ty = RecordType::new("<>f__AnonymousType0").into_type();
    let body = QueryNode::anonymous(
        ty,
        vec![("Id", col("Id")), ("Fixed", QueryNode::constant("x"))],
    );

    let (columns, params) = compile_with(&CompilerOptions::default(), body).unwrap();
    assert_eq!(rendered(&columns), vec!["Id AS Id", "? AS Fixed"]);
    assert_eq!(params, vec![Value::from("x")]);
}

#[test]
fn test_anonymous_record_renames_columns() {
    let ty = RecordType::new("<>f__AnonymousType1").into_type();
    let body = QueryNode::anonymous(ty, vec![("Key", col("Id")), ("Label", col("Name"))]);

    let (columns, _) = compile_with(&CompilerOptions::default(), body).unwrap();
    assert_eq!(rendered(&columns), vec!["Id AS Key", "Name AS Label"]);
}

#[test]
fn test_null_literal_column() {
    let ty = RecordType::new("<>f__AnonymousType2").into_type();
    let body = QueryNode::anonymous(ty, vec![("Missing", QueryNode::constant(Value::Null))]);

    let (columns, params) = compile_with(&CompilerOptions::default(), body).unwrap();
    assert_eq!(rendered(&columns), vec!["NULL AS Missing"]);
    assert!(params.is_empty());
}

#[test]
fn test_constructor_arity_mismatch() {
    let body = QueryNode::ConstructorCall {
        ty: RecordType::new("Pair").into_type(),
        args: vec![col("Id"), col("Name")],
        param_names: vec!["Id".to_string()],
    };

    let result = compile_with(&CompilerOptions::default(), body);
    assert!(matches!(result, Err(CompileError::MalformedQuery(_))));
}

#[test]
fn test_record_initialiser() {
    let dto = RecordType::new("PersonDto")
        .with_property("Key", TypeRef::scalar(ScalarType::Int))
        .with_property("Label", TypeRef::string())
        .into_type();
    let body = QueryNode::new_record(dto, vec![("Key", col("Id")), ("Label", col("Name"))]);

    let (columns, params) = compile_with(&CompilerOptions::default(), body).unwrap();
    assert_eq!(rendered(&columns), vec!["Id AS Key", "Name AS Label"]);
    assert!(params.is_empty());
}

#[test]
fn test_nested_record_initialiser() {
    let inner = RecordType::new("Inner")
        .with_property("Label", TypeRef::string())
        .into_type();
    let outer = RecordType::new("Outer")
        .with_property("Inner", inner.clone())
        .into_type();
    let body = QueryNode::new_record(
        outer,
        vec![("Inner", QueryNode::new_record(inner, vec![("Label", col("Name"))]))],
    );

    let (columns, _) = compile_with(&CompilerOptions::default(), body).unwrap();
    assert_eq!(rendered(&columns), vec!["Name AS Label"]);
}

#[test]
fn test_dynamic_member_uses_source_name() {
    let body = named("publicName", col("Name"), None);

    let (columns, params) = compile_with(&dynamic_options(), body).unwrap();
    assert_eq!(columns, vec![Column::identity("Name")]);
    assert!(params.is_empty());
}

#[test]
fn test_dynamic_conditional_nested_path() {
    let body = named("city", city_fallback(), None);

    let (columns, _) = compile_with(&dynamic_options(), body).unwrap();
    assert_eq!(rendered(&columns), vec!["Info.City AS Info_DOT_City"]);
}

#[test]
fn test_dynamic_custom_dot_separator() {
    let options = dynamic_options().with_dot_separator("__");
    let body = named("city", city_fallback(), None);

    let (columns, _) = compile_with(&options, body).unwrap();
    assert_eq!(rendered(&columns), vec!["Info.City AS Info__City"]);
}

#[test]
fn test_dynamic_other_value_uses_public_alias() {
    let body = named("Fixed", QueryNode::constant(5), None);

    let (columns, params) = compile_with(&dynamic_options(), body).unwrap();
    assert_eq!(rendered(&columns), vec!["Fixed AS Fixed"]);
    assert!(params.is_empty());
}

#[test]
fn test_dynamic_chain_in_order() {
    let body = named(
        "name",
        col("Name"),
        Some(named(
            "city",
            city_fallback(),
            Some(named("id", col("Id"), None)),
        )),
    );

    let (columns, _) = compile_with(&dynamic_options(), body).unwrap();
    assert_eq!(
        rendered(&columns),
        vec!["Name AS Name", "Info.City AS Info_DOT_City", "Id AS Id"]
    );
}

#[test]
fn test_dynamic_first_alias_wins() {
    let body = named(
        "dup",
        QueryNode::constant(1),
        Some(named("dup", QueryNode::constant(2), None)),
    );

    let (columns, _) = compile_with(&dynamic_options(), body).unwrap();
    assert_eq!(rendered(&columns), vec!["dup AS dup"]);
}

#[test]
fn test_dynamic_container_under_wrapper() {
    let container = named("name", col("Name"), None);
    let wrapper = RecordType::new("SelectSome")
        .with_property("Container", container.type_of())
        .into_type();
    let body = QueryNode::new_record(wrapper, vec![("Container", container)]);

    let (columns, _) = compile_with(&dynamic_options(), body).unwrap();
    assert_eq!(rendered(&columns), vec!["Name AS Name"]);
}

#[test]
fn test_dynamic_missing_value_binding() {
    let ty = RecordType::new("NamedProperty")
        .with_property("Name", TypeRef::string())
        .into_type();
    let body = QueryNode::new_record(ty, vec![("Name", QueryNode::constant("name"))]);

    let result = compile_with(&dynamic_options(), body);
    assert!(matches!(result, Err(CompileError::MalformedQuery(_))));
}

#[test]
fn test_dynamic_null_name_is_skipped() {
    let ty = RecordType::new("NamedProperty")
        .with_property("Name", TypeRef::string())
        .with_property("Value", TypeRef::opaque("object"))
        .into_type();
    let body = QueryNode::new_record(
        ty,
        vec![("Name", QueryNode::constant(Value::Null)), ("Value", col("Name"))],
    );

    let (columns, _) = compile_with(&dynamic_options(), body).unwrap();
    assert!(columns.is_empty());
}

#[test]
fn test_containers_ignored_without_predicate() {
    let body = named("publicName", col("Name"), None);

    let (columns, params) = compile_with(&CompilerOptions::default(), body).unwrap();
    assert_eq!(rendered(&columns), vec!["? AS Name"]);
    assert_eq!(params, vec![Value::from("publicName")]);
}

#[test]
fn test_container_declared_binding_becomes_alias() {
    let container = RecordType::new("NamedProperty")
        .with_property("Name", TypeRef::string())
        .into_type();
    let wrapper = RecordType::new("Wrapper").into_type();

    let mut closure = HashMap::new();
    closure.insert("alias".to_string(), Value::from("chosen"));
    let binding = |expr: QueryNode| MemberBinding {
        member: MemberRef::new("Name", container.clone(), TypeRef::string()),
        expr,
    };
    let body = QueryNode::NewRecord {
        ty: wrapper,
        bindings: vec![
            binding(QueryNode::captured(Value::Object(closure), "alias")),
            binding(QueryNode::constant("chosen")),
            binding(QueryNode::constant("  ")),
        ],
    };

    let (columns, params) = compile_with(&dynamic_options(), body).unwrap();
    assert_eq!(columns, vec![Column::identity("chosen")]);
    assert!(params.is_empty());
}
