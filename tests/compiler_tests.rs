use elastic_query::{
    BinOp, CompileError, CompilerOptions, OrderKey, QueryChain, QueryCompiler, QueryDescriptor,
    QueryNode, RecordType, RowFn, ScalarType, TypeRef, Value,
};
use serde_json::json;
use std::collections::HashMap;

fn person() -> TypeRef {
    RecordType::new("Person")
        .with_property("Id", TypeRef::scalar(ScalarType::Int))
        .with_property("Name", TypeRef::string())
        .with_property("Age", TypeRef::scalar(ScalarType::Int))
        .into_type()
}

fn people() -> QueryChain {
    QueryChain::from(QueryDescriptor::new("people", person()))
}

fn x() -> QueryNode {
    QueryNode::parameter("x", person())
}

fn col(name: &str) -> QueryNode {
    QueryNode::member(x(), name)
}

fn key(name: &str) -> QueryNode {
    let body = col(name);
    QueryNode::lambda(&x(), body.type_of(), body)
}

fn age_equals(age: i64) -> QueryNode {
    QueryNode::predicate(&x(), QueryNode::equal(col("Age"), QueryNode::constant(age)))
}

fn fixed_projection() -> QueryNode {
    let ty = RecordType::new("<>f__AnonymousType0").into_type();
    let body = QueryNode::anonymous(
        ty,
        vec![("Id", col("Id")), ("Fixed", QueryNode::constant("x"))],
    );
    QueryNode::lambda(&x(), body.type_of(), body)
}

fn row(pairs: Vec<(&str, Value)>) -> Value {
    let mut map = HashMap::new();
    for (k, v) in pairs {
        map.insert(k.to_string(), v);
    }
    Value::Object(map)
}

#[test]
fn test_selects_all_properties_without_projection() {
    let compiled = QueryCompiler::new().compile(people().expression()).unwrap();

    assert_eq!(compiled.sql, "SELECT Id AS Id, Name AS Name, Age AS Age FROM people");
    assert!(compiled.params.is_empty());
    assert_eq!(compiled.dataset_name, "people");
    assert!(compiled.projection().is_none());
}

#[test]
fn test_filter_and_null_check() {
    let predicate = QueryNode::predicate(
        &x(),
        QueryNode::and_also(
            QueryNode::equal(col("Age"), QueryNode::constant(30)),
            QueryNode::not_equal(col("Name"), QueryNode::constant(Value::Null)),
        ),
    );
    let chain = people().filter(predicate);

    let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT Id AS Id, Name AS Name, Age AS Age FROM people WHERE ((Age =  ? ) AND (Name IS NOT NULL))"
    );
    assert_eq!(compiled.params, vec![Value::Integer(30)]);
}

#[test]
fn test_projection_with_literal() {
    let chain = people().select(fixed_projection());

    let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
    assert_eq!(compiled.sql, "SELECT Id AS Id, ? AS Fixed FROM people");
    assert_eq!(compiled.params, vec![Value::from("x")]);
}

#[test]
fn test_projection_params_precede_filter_params() {
    let chain = people().filter(age_equals(30)).select(fixed_projection());

    let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT Id AS Id, ? AS Fixed FROM people WHERE (Age =  ? )"
    );
    assert_eq!(compiled.params, vec![Value::from("x"), Value::Integer(30)]);
}

#[test]
fn test_filters_joined_in_application_order() {
    let chain = people()
        .filter(QueryNode::predicate(
            &x(),
            QueryNode::binary(BinOp::GreaterThan, col("Age"), QueryNode::constant(30)),
        ))
        .filter(QueryNode::predicate(
            &x(),
            QueryNode::equal(col("Name"), QueryNode::constant("A")),
        ));

    let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
    assert!(compiled.sql.ends_with(" WHERE (Age >  ? ) AND (Name =  ? )"));
    assert_eq!(compiled.params, vec![Value::Integer(30), Value::from("A")]);
}

#[test]
fn test_non_boolean_filter_is_skipped() {
    let chain = people().filter(key("Age"));

    let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
    assert!(!compiled.sql.contains("WHERE"));
    assert!(compiled.params.is_empty());
}

#[test]
fn test_order_by() {
    let chain = people()
        .filter(age_equals(30))
        .order_by(key("Name"))
        .then_by_descending(key("Age"));

    let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
    assert!(compiled.sql.ends_with(" WHERE (Age =  ? ) ORDER BY Name, Age DESC"));
}

#[test]
fn test_order_by_resets_keys() {
    let chain = people()
        .order_by(key("Name"))
        .order_by_descending(key("Id"))
        .then_by(key("Age"));

    let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
    assert!(compiled.sql.ends_with(" FROM people ORDER BY Id DESC, Age"));
}

#[test]
fn test_order_by_disabled() {
    let chain = people().order_by(key("Name"));
    let compiler = QueryCompiler::with_options(CompilerOptions::new().with_order_by(false));

    let compiled = compiler.compile(chain.expression()).unwrap();
    assert_eq!(compiled.sql, "SELECT Id AS Id, Name AS Name, Age AS Age FROM people");
}

#[test]
fn test_order_by_non_member_is_skipped() {
    let body = QueryNode::binary(BinOp::Add, col("Age"), QueryNode::constant(1));
    let chain = people()
        .order_by(QueryNode::lambda(&x(), body.type_of(), body))
        .then_by(key("Name"));

    let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
    assert!(compiled.sql.ends_with(" FROM people ORDER BY Name"));
    assert!(compiled.params.is_empty());
}

#[test]
fn test_order_by_only_unrenderable_keys() {
    let body = QueryNode::constant(1);
    let chain = people().order_by(QueryNode::lambda(&x(), body.type_of(), body));

    let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
    assert_eq!(compiled.sql, "SELECT Id AS Id, Name AS Name, Age AS Age FROM people");
}

#[test]
fn test_order_by_nested_conditional_key() {
    let info = RecordType::new("Info")
        .with_property("City", TypeRef::string())
        .into_type();
    let row_type = RecordType::new("Person")
        .with_property("Id", TypeRef::scalar(ScalarType::Int))
        .with_property("Info", info)
        .into_type();
    let it = QueryNode::parameter("$it", row_type.clone());
    let info = QueryNode::member(it.clone(), "Info");
    let body = QueryNode::conditional(
        QueryNode::equal(info.clone(), QueryNode::constant(Value::Null)),
        QueryNode::constant(Value::Null),
        QueryNode::member(info, "City"),
    );
    let chain = QueryChain::from(QueryDescriptor::new("people", row_type))
        .order_by_descending(QueryNode::lambda(&it, TypeRef::string(), body));

    let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT Id AS Id, Info AS Info FROM people ORDER BY Info.City DESC"
    );
}

#[test]
fn test_order_key_display() {
    let key = OrderKey {
        column: "Age".to_string(),
        descending: true,
    };
    assert_eq!(key.to_string(), "Age DESC");
}

#[test]
fn test_multiple_selects_fail() {
    let chain = people().select(fixed_projection()).select(fixed_projection());

    let result = QueryCompiler::new().compile(chain.expression());
    assert!(matches!(result, Err(CompileError::Unsupported(_))));
}

#[test]
fn test_unknown_operator_fails() {
    let chain = QueryNode::MethodCall {
        declaring_type: TypeRef::queryable(),
        method: "Take".to_string(),
        args: vec![people().into_expression(), QueryNode::constant(10)],
    };

    let result = QueryCompiler::new().compile(&chain);
    assert!(matches!(result, Err(CompileError::Unsupported(_))));
}

#[test]
fn test_missing_descriptor() {
    let result = QueryCompiler::new().compile(&x());
    assert!(matches!(result, Err(CompileError::MalformedQuery(_))));

    let result = QueryCompiler::new().compile(&QueryNode::constant(5));
    assert!(matches!(result, Err(CompileError::MalformedQuery(_))));
}

#[test]
fn test_row_type_without_properties() {
    let empty = RecordType::new("Empty").into_type();
    let chain = QueryChain::from(QueryDescriptor::new("nothing", empty));

    let result = QueryCompiler::new().compile(chain.expression());
    assert!(matches!(result, Err(CompileError::MalformedQuery(_))));
}

#[test]
fn test_compile_is_repeatable() {
    let chain = people().filter(age_equals(30)).select(fixed_projection());
    let compiler = QueryCompiler::new();

    let first = compiler.compile(chain.expression()).unwrap();
    let second = compiler.compile(chain.expression()).unwrap();
    assert_eq!(first.sql, second.sql);
    assert_eq!(first.params, second.params);
    assert_eq!(first.columns, second.columns);
}

#[test]
fn test_compiler_recovers_after_error() {
    let compiler = QueryCompiler::new();
    let bad = people().filter(QueryNode::predicate(
        &x(),
        QueryNode::binary(BinOp::Multiply, col("Age"), QueryNode::constant(2)),
    ));
    assert!(compiler.compile(bad.expression()).is_err());

    let good = people().filter(age_equals(30));
    let compiled = compiler.compile(good.expression()).unwrap();
    let fresh = QueryCompiler::new().compile(good.expression()).unwrap();
    assert_eq!(compiled.sql, fresh.sql);
    assert_eq!(compiled.params, fresh.params);
}

#[test]
fn test_request_body() {
    let chain = people().filter(age_equals(30));

    let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
    assert_eq!(
        compiled.to_request_body(),
        json!({
            "query": "SELECT Id AS Id, Name AS Name, Age AS Age FROM people WHERE (Age =  ? )",
            "params": [30],
        })
    );
}

#[test]
fn test_projection_shapes_rows() {
    let body = col("Name");
    let projection = QueryNode::lambda(&x(), body.type_of(), body).with_func(RowFn::new(|row| {
        row.member("Name").cloned().unwrap_or(Value::Null)
    }));
    let chain = people().select(projection);

    let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
    let rows = vec![
        row(vec![("Name", Value::from("Ann"))]),
        row(vec![("Id", Value::Integer(2))]),
    ];
    let shaped = compiled.projection().unwrap().shape(&rows).unwrap();
    assert_eq!(shaped, vec![Value::from("Ann"), Value::Null]);
}

#[test]
fn test_projection_without_function_cannot_shape() {
    let chain = people().select(fixed_projection());

    let compiled = QueryCompiler::new().compile(chain.expression()).unwrap();
    let result = compiled.projection().unwrap().shape(&[]);
    assert!(matches!(result, Err(CompileError::Unsupported(_))));
}

#[test]
fn test_compile_for_known_descriptor() {
    let descriptor = QueryDescriptor::new("archive", person());
    let chain = people().filter(age_equals(1));

    let compiled = QueryCompiler::new()
        .compile_for(chain.expression(), &descriptor)
        .unwrap();
    assert!(compiled.sql.contains(" FROM archive WHERE "));
}
