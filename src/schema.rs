//! Defines the [`Schema`] which content metadata must conform to, and the
//! typed [`Metadata`] a node carries once it passes validation. A node that
//! fails validation aborts the whole build; the later stages assume every
//! document they see has a validated shape.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::PathBuf,
};

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use log::debug;
use serde_yaml::Value;

use crate::node::ContentNode;

/// A point in time parsed from a `date` field.
pub type Date = DateTime<FixedOffset>;

/// The type a declared metadata field must have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    String,
    Date,
    StringList,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "a string"),
            FieldType::Date => write!(f, "a date"),
            FieldType::StringList => write!(f, "a list of strings"),
        }
    }
}

/// Declares the recognized metadata fields and their types, plus the fields
/// which are required for a given `type`. A schema is built once per build and
/// passed explicitly to the pipeline.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: BTreeMap<String, FieldType>,
    required: HashMap<String, Vec<String>>,
}

impl Schema {
    /// Returns the schema for the site's content: every field is optional
    /// except `title` and `date`, which blog posts must have.
    pub fn site() -> Schema {
        Schema::default()
            .field("title", FieldType::String)
            .field("description", FieldType::String)
            .field("date", FieldType::Date)
            .field("category", FieldType::String)
            .field("tags", FieldType::StringList)
            .field("type", FieldType::String)
            .field("path", FieldType::String)
            .field("short", FieldType::String)
            .field("img", FieldType::String)
            .require("blog", "title")
            .require("blog", "date")
    }

    /// Declares a field.
    pub fn field(mut self, name: &str, field_type: FieldType) -> Schema {
        self.fields.insert(name.to_owned(), field_type);
        self
    }

    /// Marks `field` as required for documents whose `type` is `kind`.
    pub fn require(mut self, kind: &str, field: &str) -> Schema {
        self.required
            .entry(kind.to_owned())
            .or_insert_with(Vec::new)
            .push(field.to_owned());
        self
    }

    /// Checks `node`'s metadata against the schema and returns its typed
    /// [`Metadata`]. Undeclared fields are ignored; `null` values count as
    /// absent.
    pub fn validate<'a>(&self, node: &'a ContentNode) -> Result<Document<'a>> {
        let violation = |field: &str, rule: Rule| SchemaViolation {
            source_path: node.source_path.clone(),
            field: field.to_owned(),
            rule,
        };

        let mut fields: HashMap<String, Field> = HashMap::new();
        for (key, value) in node.metadata.iter() {
            let key = match key {
                Value::String(key) => key,
                _ => {
                    return Err(violation(
                        &format!("{:?}", key),
                        Rule::NonStringKey,
                    ))
                }
            };
            let field_type = match self.fields.get(key) {
                Some(field_type) => *field_type,
                None => {
                    debug!(
                        "`{}`: ignoring undeclared field `{}`",
                        node.source_path.display(),
                        key
                    );
                    continue;
                }
            };
            if let Value::Null = value {
                continue;
            }
            let field =
                check(field_type, value).map_err(|rule| violation(key, rule))?;
            fields.insert(key.clone(), field);
        }

        if let Some(Field::String(kind)) = fields.get("type") {
            for required in self.required.get(kind).into_iter().flatten() {
                if !fields.contains_key(required) {
                    return Err(violation(
                        required,
                        Rule::Missing { kind: kind.clone() },
                    ));
                }
            }
        }

        let metadata = Metadata::from_fields(fields);
        Ok(Document { node, metadata })
    }
}

// A value which conforms to its declared field type.
enum Field {
    String(String),
    Date(Date),
    StringList(Vec<String>),
}

fn check(field_type: FieldType, value: &Value) -> std::result::Result<Field, Rule> {
    let wrong_type = |found: &Value| Rule::WrongType {
        expected: field_type,
        found: kind_of(found),
    };
    match (field_type, value) {
        (FieldType::String, Value::String(s)) => Ok(Field::String(s.clone())),
        (FieldType::Date, Value::String(s)) => match parse_date(s) {
            Some(date) => Ok(Field::Date(date)),
            None => Err(Rule::InvalidDate(s.clone())),
        },
        (FieldType::StringList, Value::Sequence(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(wrong_type(other)),
            })
            .collect::<std::result::Result<Vec<String>, Rule>>()
            .map(Field::StringList),
        _ => Err(wrong_type(value)),
    }
}

/// Parses `YYYY-MM-DD` (taken as midnight UTC) or an RFC 3339 timestamp.
pub fn parse_date(s: &str) -> Option<Date> {
    let s = s.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date);
    }
    let naive = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let utc = FixedOffset::east_opt(0)?;
    Some(utc.from_utc_datetime(&naive.and_hms_opt(0, 0, 0)?))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
    }
}

/// The typed metadata of a validated node. Missing optional fields take their
/// documented defaults: no tags is an empty list, everything else is `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<Date>,
    pub category: Option<String>,
    pub tags: Vec<String>,

    /// The `type` field.
    pub kind: Option<String>,

    /// The explicit route override (`path` field).
    pub path: Option<String>,
    pub short: Option<String>,
    pub img: Option<String>,
}

impl Metadata {
    fn from_fields(mut fields: HashMap<String, Field>) -> Metadata {
        let mut string = |name: &str| match fields.remove(name) {
            Some(Field::String(s)) => Some(s),
            _ => None,
        };
        let mut metadata = Metadata {
            title: string("title"),
            description: string("description"),
            category: string("category"),
            kind: string("type"),
            path: string("path"),
            short: string("short"),
            img: string("img"),
            ..Metadata::default()
        };
        if let Some(Field::Date(date)) = fields.remove("date") {
            metadata.date = Some(date);
        }
        if let Some(Field::StringList(tags)) = fields.remove("tags") {
            metadata.tags = tags;
        }
        metadata
    }
}

/// A [`ContentNode`] that passed validation, together with its typed
/// metadata.
#[derive(Clone, Debug)]
pub struct Document<'a> {
    pub node: &'a ContentNode,
    pub metadata: Metadata,
}

/// The rule a [`SchemaViolation`] broke.
#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    /// A value is present but has the wrong type.
    WrongType {
        expected: FieldType,
        found: &'static str,
    },

    /// A date field holds a string which isn't a date.
    InvalidDate(String),

    /// A field required for documents of type `kind` is absent.
    Missing { kind: String },

    /// A frontmatter key isn't a string.
    NonStringKey,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rule::WrongType { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            Rule::InvalidDate(s) => write!(f, "`{}` is not a valid date", s),
            Rule::Missing { kind } => {
                write!(f, "required for documents of type `{}`", kind)
            }
            Rule::NonStringKey => write!(f, "field names must be strings"),
        }
    }
}

/// Returned when a node's metadata doesn't conform to the [`Schema`].
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaViolation {
    pub source_path: PathBuf,
    pub field: String,
    pub rule: Rule,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "schema violation in `{}`: field `{}`: {}",
            self.source_path.display(),
            self.field,
            self.rule
        )
    }
}

impl std::error::Error for SchemaViolation {}

pub type Result<T> = std::result::Result<T, SchemaViolation>;
