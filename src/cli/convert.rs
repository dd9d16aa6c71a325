//! JSON query documents -> query trees

use std::{
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use regex::Regex;
use serde_json::{Map, Value as Json};

use super::CliError;
use crate::{
    ast::{BinOp, QueryChain, QueryDescriptor, QueryNode, RecordType, ScalarType, TypeRef},
    output::from_json,
    value::Value,
};

/// Container types produced for `select` given as a list of name/value pairs.
pub const DYNAMIC_CONTAINERS: [&str; 2] = ["NamedProperty", "NamedPropertyWithNext"];

/// Name of the lambda parameter used for every lambda in a document.
const ROW_PARAMETER: &str = "$it";

static LIST_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^list<\s*(.+?)\s*>$").expect("valid regex"));
static NULLABLE_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*\?$").expect("valid regex"));

/// A parsed query document: the operator chain plus what it was built from.
#[derive(Debug, Clone)]
pub struct QueryDocument {
    pub descriptor: QueryDescriptor,
    pub chain: QueryChain,
}

/// Parse a query document.
///
/// ```text
/// {
///   "dataset": "people",
///   "row_type": "Person",
///   "types": { "Person": { "properties": { "Id": "int", "Age": "int?" } } },
///   "captured": { "codes": [1, 2] },
///   "filters": [ { "op": ">", "left": { "col": "Age" }, "right": 30 } ],
///   "select": { "Id": { "col": "Id" }, "Fixed": "x" },
///   "order_by": [ "-Age" ]
/// }
/// ```
pub fn parse_document(json: &Json) -> Result<QueryDocument, CliError> {
    let doc = json
        .as_object()
        .ok_or_else(|| CliError::document("expected a JSON object"))?;

    let dataset = required_str(doc, "dataset")?;
    let row_type_name = required_str(doc, "row_type")?;

    let types = TypeTable::parse(doc.get("types"))?;
    let row_type = types.resolve(row_type_name);
    if row_type.as_record().is_none() {
        return Err(CliError::document(format!(
            "row type '{}' is not declared under \"types\"",
            row_type_name
        )));
    }

    let captured = match doc.get("captured") {
        Some(c @ Json::Object(_)) => from_json(c.clone()),
        Some(_) => return Err(CliError::document("\"captured\" must be an object")),
        None => Value::Object(HashMap::new()),
    };

    let builder = ExprBuilder {
        row: QueryNode::parameter(ROW_PARAMETER, row_type.clone()),
        row_type: row_type.clone(),
        captured,
    };

    let descriptor = QueryDescriptor::new(dataset, row_type);
    let mut chain = QueryChain::from(descriptor.clone());

    if let Some(filters) = doc.get("filters") {
        let filters = filters
            .as_array()
            .ok_or_else(|| CliError::document("\"filters\" must be an array"))?;
        for filter in filters {
            let body = builder.expr(filter)?;
            chain = chain.filter(QueryNode::lambda(&builder.row, body.type_of(), body));
        }
    }

    if let Some(select) = doc.get("select") {
        chain = chain.select(builder.projection(select)?);
    }

    if let Some(order) = doc.get("order_by") {
        let keys = order
            .as_array()
            .ok_or_else(|| CliError::document("\"order_by\" must be an array"))?;
        for (i, key) in keys.iter().enumerate() {
            let key = key
                .as_str()
                .ok_or_else(|| CliError::document("order_by keys must be strings"))?;
            let (column, descending) = match key.strip_prefix('-') {
                Some(column) => (column, true),
                None => (key, false),
            };
            let body = builder.column(column);
            let lambda = QueryNode::lambda(&builder.row, body.type_of(), body);
            chain = match (i, descending) {
                (0, false) => chain.order_by(lambda),
                (0, true) => chain.order_by_descending(lambda),
                (_, false) => chain.then_by(lambda),
                (_, true) => chain.then_by_descending(lambda),
            };
        }
    }

    Ok(QueryDocument { descriptor, chain })
}

fn required_str<'a>(doc: &'a Map<String, Json>, key: &str) -> Result<&'a str, CliError> {
    doc.get(key)
        .and_then(Json::as_str)
        .ok_or_else(|| CliError::document(format!("missing string field \"{}\"", key)))
}

/// Record types declared by a document.
struct TypeTable {
    declared: HashMap<String, Map<String, Json>>,
    resolved: HashMap<String, TypeRef>,
}

impl TypeTable {
    fn parse(types: Option<&Json>) -> Result<Self, CliError> {
        let mut table = TypeTable {
            declared: HashMap::new(),
            resolved: HashMap::new(),
        };
        let Some(types) = types else {
            return Ok(table);
        };
        let types = types
            .as_object()
            .ok_or_else(|| CliError::document("\"types\" must be an object"))?;

        for (name, def) in types {
            let def = def
                .as_object()
                .ok_or_else(|| CliError::document(format!("type '{}' must be an object", name)))?;
            table.declared.insert(name.clone(), def.clone());
        }

        let names: Vec<String> = table.declared.keys().cloned().collect();
        for name in names {
            let mut visiting = HashSet::new();
            let ty = table.build_record(&name, &mut visiting)?;
            table.resolved.insert(name, ty);
        }
        Ok(table)
    }

    fn build_record(
        &mut self,
        name: &str,
        visiting: &mut HashSet<String>,
    ) -> Result<TypeRef, CliError> {
        if let Some(ty) = self.resolved.get(name) {
            return Ok(ty.clone());
        }
        // self-referencing records fall back to an opaque reference
        if !visiting.insert(name.to_string()) {
            return Ok(TypeRef::opaque(name));
        }

        let def = self.declared.get(name).cloned().unwrap_or_default();
        let mut record = RecordType::new(name);

        if let Some(properties) = def.get("properties") {
            let properties = properties.as_object().ok_or_else(|| {
                CliError::document(format!("properties of '{}' must be an object", name))
            })?;
            for (property, spec) in properties {
                let spec = spec.as_str().ok_or_else(|| {
                    CliError::document(format!("type of {}.{} must be a string", name, property))
                })?;
                let ty = self.parse_spec(spec, visiting)?;
                record = record.with_property(property.as_str(), ty);
            }
        }

        if let Some(Json::Object(statics)) = def.get("statics") {
            for (member, value) in statics {
                record = record.with_static(member.as_str(), from_json(value.clone()));
            }
        }

        visiting.remove(name);
        let ty = record.into_type();
        self.resolved.insert(name.to_string(), ty.clone());
        Ok(ty)
    }

    /// `int`, `string?`, `list<int>`, or a declared record name.
    fn parse_spec(
        &mut self,
        spec: &str,
        visiting: &mut HashSet<String>,
    ) -> Result<TypeRef, CliError> {
        let spec = spec.trim();
        if let Some(caps) = LIST_TYPE.captures(spec) {
            return Ok(TypeRef::list(self.parse_spec(&caps[1], visiting)?));
        }
        if let Some(caps) = NULLABLE_TYPE.captures(spec) {
            let inner = self.parse_spec(&caps[1], visiting)?;
            return Ok(match inner {
                TypeRef::Scalar(ScalarType::String) => inner,
                other => TypeRef::nullable(other),
            });
        }
        if let Some(scalar) = ScalarType::from_name(spec) {
            return Ok(TypeRef::Scalar(scalar));
        }
        if self.declared.contains_key(spec) {
            return self.build_record(spec, visiting);
        }
        Ok(TypeRef::opaque(spec))
    }

    fn resolve(&self, name: &str) -> TypeRef {
        self.resolved
            .get(name)
            .cloned()
            .unwrap_or_else(|| TypeRef::opaque(name))
    }
}

struct ExprBuilder {
    row: QueryNode,
    row_type: TypeRef,
    captured: Value,
}

impl ExprBuilder {
    /// `Info.City` -> `$it.Info.City`
    fn column(&self, path: &str) -> QueryNode {
        path.split('.')
            .fold(self.row.clone(), |target, name| QueryNode::member(target, name))
    }

    /// `filter.min` -> closure.filter.min
    fn captured(&self, path: &str) -> QueryNode {
        let mut parts = path.split('.');
        let first = parts.next().unwrap_or_default();
        parts.fold(QueryNode::captured(self.captured.clone(), first), |target, name| {
            QueryNode::member(target, name)
        })
    }

    fn expr(&self, json: &Json) -> Result<QueryNode, CliError> {
        let obj = match json {
            Json::Object(obj) => obj,
            scalar => return Ok(QueryNode::Constant(from_json(scalar.clone()))),
        };

        if let Some(path) = obj.get("col").and_then(Json::as_str) {
            return Ok(self.column(path));
        }
        if let Some(path) = obj.get("captured").and_then(Json::as_str) {
            return Ok(self.captured(path));
        }
        if let Some(member) = obj.get("static").and_then(Json::as_str) {
            return Ok(QueryNode::static_member(&self.row_type, member));
        }
        if let Some(value) = obj.get("value") {
            return Ok(QueryNode::Constant(from_json(value.clone())));
        }
        if let Some(symbol) = obj.get("op").and_then(Json::as_str) {
            let op = BinOp::from_symbol(symbol)
                .ok_or_else(|| CliError::document(format!("unknown operator '{}'", symbol)))?;
            let left = self.expr(field(obj, "left")?)?;
            let right = self.expr(field(obj, "right")?)?;
            return Ok(match obj.get("compare") {
                Some(Json::Bool(true)) => QueryNode::binary(
                    op,
                    QueryNode::string_compare(left, right),
                    QueryNode::constant(0),
                ),
                _ => QueryNode::binary(op, left, right),
            });
        }
        if let Some(list) = obj.get("in") {
            let item = self.expr(field(obj, "item")?)?;
            return Ok(QueryNode::contains(self.expr(list)?, item));
        }
        if let Some(test) = obj.get("if") {
            return Ok(QueryNode::conditional(
                self.expr(test)?,
                self.expr(field(obj, "then")?)?,
                self.expr(field(obj, "else")?)?,
            ));
        }

        Err(CliError::document(format!(
            "cannot interpret expression {}",
            Json::Object(obj.clone())
        )))
    }

    /// An object selects an anonymous record; an array of `{name, value}`
    /// pairs selects through a chain of dynamic property containers.
    fn projection(&self, select: &Json) -> Result<QueryNode, CliError> {
        let body = match select {
            Json::Object(fields) => {
                let mut args = Vec::with_capacity(fields.len());
                for (name, expr) in fields {
                    args.push((name.as_str(), self.expr(expr)?));
                }
                let ty = RecordType::new("<>f__AnonymousType").into_type();
                QueryNode::anonymous(ty, args)
            }
            Json::Array(pairs) => self.dynamic_chain(pairs)?,
            _ => return Err(CliError::document("\"select\" must be an object or an array")),
        };
        Ok(QueryNode::lambda(&self.row, body.type_of(), body))
    }

    fn dynamic_chain(&self, pairs: &[Json]) -> Result<QueryNode, CliError> {
        let mut next: Option<QueryNode> = None;
        for pair in pairs.iter().rev() {
            let pair = pair
                .as_object()
                .ok_or_else(|| CliError::document("dynamic select entries must be objects"))?;
            let name = field(pair, "name")?
                .as_str()
                .ok_or_else(|| CliError::document("dynamic select names must be strings"))?;
            let value = self.expr(field(pair, "value")?)?;

            let container_name = if next.is_some() {
                DYNAMIC_CONTAINERS[1]
            } else {
                DYNAMIC_CONTAINERS[0]
            };
            let mut container = RecordType::new(container_name)
                .with_property("Name", TypeRef::string())
                .with_property("Value", TypeRef::opaque("object"));
            if let Some(next_ty) = next.as_ref().map(QueryNode::type_of) {
                container = container.with_property("Next", next_ty);
            }

            let mut bindings = vec![("Name", QueryNode::constant(name)), ("Value", value)];
            if let Some(next) = next.take() {
                bindings.push(("Next", next));
            }
            next = Some(QueryNode::new_record(container.into_type(), bindings));
        }

        let container = next.ok_or_else(|| CliError::document("dynamic select is empty"))?;
        let wrapper = RecordType::new("SelectSome")
            .with_property("Container", container.type_of())
            .into_type();
        Ok(QueryNode::new_record(wrapper, vec![("Container", container)]))
    }
}

fn field<'a>(obj: &'a Map<String, Json>, key: &str) -> Result<&'a Json, CliError> {
    obj.get(key)
        .ok_or_else(|| CliError::document(format!("missing field \"{}\"", key)))
}
