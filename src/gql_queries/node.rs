use crate::error::{Error, Result};
use crate::gql_queries::vocabulary::{
    is_known_argument, ARG_AFTER, ARG_FIRST, FIELD_END_CURSOR, FIELD_HAS_NEXT_PAGE,
    FIELD_TOTAL_COUNT, NODE_NODES, NODE_PAGE_INFO,
};

/// Value of a node argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Int(i64),
    Bool(bool),
    /// Rendered as an escaped string literal.
    Str(String),
    /// Rendered bare, e.g. `CREATED_AT`.
    Enum(String),
    List(Vec<ArgValue>),
    /// Input object such as `{field: SIZE, direction: DESC}`.
    Object(Vec<(&'static str, ArgValue)>),
}

impl ArgValue {
    pub fn string(value: impl Into<String>) -> Self {
        ArgValue::Str(value.into())
    }

    pub fn enumeration(value: impl Into<String>) -> Self {
        ArgValue::Enum(value.into())
    }

    fn validate(&self) -> Result<()> {
        match self {
            ArgValue::Enum(token) => {
                if !is_enum_token(token) {
                    return Err(Error::configuration(format!(
                        "'{token}' is not a valid enum value"
                    )));
                }
            }
            ArgValue::List(values) => {
                for value in values {
                    value.validate()?;
                }
            }
            ArgValue::Object(entries) => validate_args(entries)?,
            ArgValue::Int(_) | ArgValue::Bool(_) | ArgValue::Str(_) => {}
        }
        Ok(())
    }

    fn write_to(&self, out: &mut String) {
        match self {
            ArgValue::Int(value) => out.push_str(&value.to_string()),
            ArgValue::Bool(value) => out.push_str(&value.to_string()),
            ArgValue::Str(value) => write_string_literal(value, out),
            ArgValue::Enum(token) => out.push_str(token),
            ArgValue::List(values) => {
                out.push('[');
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    value.write_to(out);
                }
                out.push(']');
            }
            ArgValue::Object(entries) => {
                out.push('{');
                write_args(entries, out);
                out.push('}');
            }
        }
    }
}

fn is_enum_token(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn write_string_literal(value: &str, out: &mut String) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn validate_args(args: &[(&'static str, ArgValue)]) -> Result<()> {
    for (i, (name, value)) in args.iter().enumerate() {
        if !is_known_argument(name) {
            return Err(Error::configuration(format!("unknown argument '{name}'")));
        }
        if args[..i].iter().any(|(seen, _)| seen == name) {
            return Err(Error::configuration(format!("duplicate argument '{name}'")));
        }
        value.validate()?;
    }
    Ok(())
}

fn write_args(args: &[(&'static str, ArgValue)], out: &mut String) {
    for (i, (name, value)) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(name);
        out.push_str(": ");
        value.write_to(out);
    }
}

/// A child of a node: either a scalar leaf or another selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Leaf(&'static str),
    Nested(QueryNode),
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Leaf(name) => *name,
            Field::Nested(node) => node.name,
        }
    }
}

impl From<QueryNode> for Field {
    fn from(node: QueryNode) -> Self {
        Field::Nested(node)
    }
}

/// Present on nodes that select a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page_size: u32,
}

/// A named selection with ordered arguments and ordered child fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryNode {
    name: &'static str,
    args: Vec<(&'static str, ArgValue)>,
    fields: Vec<Field>,
    paging: Option<Paging>,
}

impl QueryNode {
    pub fn new(
        name: &'static str,
        args: Vec<(&'static str, ArgValue)>,
        fields: Vec<Field>,
    ) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::configuration(format!(
                "node '{name}' must select at least one field"
            )));
        }
        validate_args(&args)?;
        Ok(QueryNode {
            name,
            args,
            fields,
            paging: None,
        })
    }

    /// Builds a connection node: `name(first: N, ...) { totalCount nodes { ... }
    /// pageInfo { endCursor hasNextPage } }`.
    pub fn paginated(
        name: &'static str,
        page_size: i64,
        page_size_ceiling: u32,
        extra_args: Vec<(&'static str, ArgValue)>,
        entity_fields: Vec<Field>,
    ) -> Result<Self> {
        if page_size <= 0 || page_size > i64::from(page_size_ceiling) {
            return Err(Error::configuration(format!(
                "page size {page_size} for '{name}' must be between 1 and {page_size_ceiling}"
            )));
        }
        if let Some((arg, _)) = extra_args
            .iter()
            .find(|(arg, _)| *arg == ARG_FIRST || *arg == ARG_AFTER)
        {
            return Err(Error::configuration(format!(
                "'{arg}' is managed by the paginator of '{name}'"
            )));
        }

        let mut args = Vec::with_capacity(extra_args.len() + 1);
        args.push((ARG_FIRST, ArgValue::Int(page_size)));
        args.extend(extra_args);

        let fields = vec![
            Field::Leaf(FIELD_TOTAL_COUNT),
            QueryNode::new(NODE_NODES, vec![], entity_fields)?.into(),
            QueryNode::new(
                NODE_PAGE_INFO,
                vec![],
                vec![
                    Field::Leaf(FIELD_END_CURSOR),
                    Field::Leaf(FIELD_HAS_NEXT_PAGE),
                ],
            )?
            .into(),
        ];

        let mut node = QueryNode::new(name, args, fields)?;
        node.paging = Some(Paging {
            page_size: page_size as u32,
        });
        Ok(node)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn args(&self) -> &[(&'static str, ArgValue)] {
        &self.args
    }

    pub fn arg(&self, name: &str) -> Option<&ArgValue> {
        self.args
            .iter()
            .find(|(arg, _)| *arg == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn child(&self, name: &str) -> Option<&QueryNode> {
        self.fields.iter().find_map(|field| match field {
            Field::Nested(node) if node.name == name => Some(node),
            _ => None,
        })
    }

    pub fn paging(&self) -> Option<Paging> {
        self.paging
    }

    pub fn is_paginated(&self) -> bool {
        self.paging.is_some()
    }

    pub fn cursor(&self) -> Option<&str> {
        match self.arg(ARG_AFTER) {
            Some(ArgValue::Str(cursor)) => Some(cursor),
            _ => None,
        }
    }

    /// Points the connection at the page after `cursor`.
    ///
    /// This is the only mutation a node allows once built.
    pub fn set_cursor(&mut self, cursor: impl Into<String>) -> Result<()> {
        if self.paging.is_none() {
            return Err(Error::configuration(format!(
                "node '{}' is not a connection and has no cursor",
                self.name
            )));
        }
        let cursor = ArgValue::Str(cursor.into());
        match self.args.iter_mut().find(|(arg, _)| *arg == ARG_AFTER) {
            Some((_, value)) => *value = cursor,
            None => self.args.push((ARG_AFTER, cursor)),
        }
        Ok(())
    }

    /// Path of names from this node down to the first connection node,
    /// this node included.
    pub(crate) fn connection_path(&self) -> Option<Vec<&'static str>> {
        if self.is_paginated() {
            return Some(vec![self.name]);
        }
        self.fields.iter().find_map(|field| match field {
            Field::Nested(node) => node.connection_path().map(|mut path| {
                path.insert(0, self.name);
                path
            }),
            Field::Leaf(_) => None,
        })
    }

    /// Connection nodes anywhere in this subtree, this node included.
    pub(crate) fn connection_count(&self) -> usize {
        let nested: usize = self
            .fields
            .iter()
            .map(|field| match field {
                Field::Nested(node) => node.connection_count(),
                Field::Leaf(_) => 0,
            })
            .sum();
        nested + usize::from(self.is_paginated())
    }

    pub(crate) fn connection_mut(&mut self) -> Option<&mut QueryNode> {
        if self.is_paginated() {
            return Some(self);
        }
        self.fields.iter_mut().find_map(|field| match field {
            Field::Nested(node) => node.connection_mut(),
            Field::Leaf(_) => None,
        })
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        out.push_str(self.name);
        if !self.args.is_empty() {
            out.push('(');
            write_args(&self.args, out);
            out.push(')');
        }
        out.push_str(" {");
        for field in &self.fields {
            out.push(' ');
            match field {
                Field::Leaf(name) => out.push_str(name),
                Field::Nested(node) => node.write_to(out),
            }
        }
        out.push_str(" }");
    }
}
