//! Documentation content for esql CLI

use super::CliError;

/// Available documentation topics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocTopic {
    Document,
    Expressions,
    Output,
}

impl DocTopic {
    /// Parse topic name from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "document" | "doc" | "documents" => Some(Self::Document),
            "expressions" | "expression" | "expr" => Some(Self::Expressions),
            "output" | "sql" => Some(Self::Output),
            _ => None,
        }
    }
}

/// Get the docs overview (topic listing)
pub fn get_docs_overview() -> &'static str {
    r#"ESQL DOCUMENTATION

esql compiles JSON query documents (filters, a projection, ordering) into a
single SQL query plus the positional parameters bound to its '?' placeholders.

DOCUMENTATION TOPICS

  document          Layout of a query document: dataset, types, captured values
  expressions       Filter and projection expressions
  output            Generated SQL and the request body

QUICK REFERENCE

  {"col": "Age"}                      Row column (dotted for nested members)
  {"captured": "codes"}               Captured variable
  {"op": ">", "left": .., "right": ..} Binary operator
  {"in": .., "item": ..}              List membership

Run 'esql doc <topic>' for detailed documentation.
"#
}

/// Get documentation for a specific topic
pub fn get_doc_topic(name: &str) -> Result<&'static str, CliError> {
    match DocTopic::parse(name) {
        Some(DocTopic::Document) => Ok(DOCUMENT_DOC),
        Some(DocTopic::Expressions) => Ok(EXPRESSIONS_DOC),
        Some(DocTopic::Output) => Ok(OUTPUT_DOC),
        None => Err(CliError::UnknownTopic(name.to_string())),
    }
}

const DOCUMENT_DOC: &str = r#"DOCUMENT - Query Document Layout

  {
    "dataset": "people",
    "row_type": "Person",
    "types": {
      "Person": {
        "properties": { "Id": "int", "Name": "string", "Age": "int?", "Info": "Info" },
        "statics": { "MinAge": 18 }
      },
      "Info": { "properties": { "City": "string" } }
    },
    "captured": { "codes": [1, 2, null], "filter": { "min": 30 } },
    "filters": [ ... ],
    "select": { ... } | [ ... ],
    "order_by": [ "Name", "-Age" ]
  }

TYPES
  Scalars: bool, char, int, uint, float, decimal, string, datetime,
  datetimeoffset, guid. Suffix '?' for nullable, 'list<T>' for lists, or the
  name of another declared type.

FILTERS
  Each entry is one predicate; predicates are joined with AND. Entries that
  are not boolean are skipped.

SELECT
  An object selects an anonymous record, one column per key:
    "select": { "Id": {"col": "Id"}, "Fixed": "x" }

  An array selects through dynamic name/value containers:
    "select": [ {"name": "city", "value": {"if": .., "then": null, "else": {"col": "Info.City"}}} ]

ORDER BY
  Column names; prefix '-' for descending.
"#;

const EXPRESSIONS_DOC: &str = r#"EXPRESSIONS

LITERALS
  30, "x", true, null
  {"value": [1, 2]}                 Literal of any JSON shape

COLUMNS
  {"col": "Age"}                    Column of the row
  {"col": "Info.City"}              Nested member (renders NULL in filters)

CAPTURED VALUES
  {"captured": "codes"}             Top-level captured variable
  {"captured": "filter.min"}        Member of a captured object
  {"static": "MinAge"}              Static member of the row type

OPERATORS
  {"op": "==", "left": .., "right": ..}
    == != < <= > >=     comparison (== null renders IS NULL)
    && ||               AND / OR
    & |                 bitwise
  {"op": ">", "left": {"col": "Name"}, "right": "M", "compare": true}
    String comparison: Name > ?

MEMBERSHIP
  {"in": {"captured": "codes"}, "item": {"col": "Code"}}
    (Code = ? OR Code = ? OR Code = NULL)

CONDITIONAL
  {"if": .., "then": .., "else": ..}
    As the left operand of a comparison, renders the 'else' member path.
"#;

const OUTPUT_DOC: &str = r#"OUTPUT

SQL
  SELECT <value AS alias, ...> FROM <dataset> [WHERE <f1> AND <f2>] [ORDER BY <k1>, <k2> DESC]

  Without a select, every property of the row type is selected under its
  own name.

PARAMETERS
  Projection parameters come first, then filter parameters, matching the
  '?' placeholders from left to right.

REQUEST BODY (--body)
  {"query": "<sql>", "params": [ ... ]}
"#;
