//! Conversions from the pipeline's types into template [`Value`]s.

use std::collections::HashMap;

use gtmpl_value::Value;

use crate::{
    collection::Entry,
    context::{Context, ContextValue},
    markdown,
};

impl From<&ContextValue> for Value {
    fn from(v: &ContextValue) -> Value {
        match v {
            ContextValue::Null => Value::Nil,
            ContextValue::Bool(b) => Value::Bool(*b),
            ContextValue::Int(i) => Value::from(*i),
            ContextValue::String(s) => Value::String(s.clone()),
            ContextValue::List(items) => {
                Value::Array(items.iter().map(Value::from).collect())
            }
            ContextValue::Map(context) => context_to_value(context),
        }
    }
}

/// Converts a page context into a [`Value::Object`].
pub fn context_to_value(context: &Context) -> Value {
    Value::Object(
        context
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v)))
            .collect(),
    )
}

fn option_to_value(opt: &Option<String>) -> Value {
    match opt {
        Some(s) => Value::String(s.clone()),
        None => Value::Nil,
    }
}

/// Converts an [`Entry`] into the [`Value`] its own page renders: the
/// metadata, the route, and the body rendered to HTML.
pub fn entry_to_value(entry: &Entry) -> Value {
    let mut m = entry_fields(entry);
    m.insert(
        "html".to_owned(),
        Value::String(markdown::to_html(&entry.document.node.body)),
    );
    Value::Object(m)
}

/// Converts an [`Entry`] into the [`Value`] a listing renders for it. This has
/// the same fields as [`entry_to_value`] except that `html` is replaced by a
/// `summary` and a `summarized` flag.
pub fn entry_to_summary(entry: &Entry) -> Value {
    let mut m = entry_fields(entry);
    let (summary, summarized) = markdown::excerpt(&entry.document.node.body);
    m.insert("summary".to_owned(), Value::String(summary));
    m.insert("summarized".to_owned(), Value::Bool(summarized));
    Value::Object(m)
}

fn entry_fields(entry: &Entry) -> HashMap<String, Value> {
    let metadata = entry.metadata();
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("id".to_owned(), Value::String(entry.id().to_string()));
    m.insert("path".to_owned(), Value::String(entry.path.clone()));
    m.insert("slug".to_owned(), Value::String(entry.slug.to_string()));
    m.insert("title".to_owned(), option_to_value(&metadata.title));
    m.insert(
        "description".to_owned(),
        option_to_value(&metadata.description),
    );
    m.insert(
        "date".to_owned(),
        option_to_value(
            &metadata.date.map(|d| d.format("%Y-%m-%d").to_string()),
        ),
    );
    m.insert("category".to_owned(), option_to_value(&metadata.category));
    m.insert("type".to_owned(), option_to_value(&metadata.kind));
    m.insert("short".to_owned(), option_to_value(&metadata.short));
    m.insert("img".to_owned(), option_to_value(&metadata.img));
    m.insert(
        "tags".to_owned(),
        Value::Array(
            metadata
                .tags
                .iter()
                .map(|t| Value::String(t.clone()))
                .collect(),
        ),
    );
    m
}
