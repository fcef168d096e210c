//! Defines [`Context`], the mapping a page descriptor hands to its template.
//! The pipeline treats it as opaque data; it only needs to be deterministic
//! (hence the ordered map) and serializable.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::node::NodeId;

/// A page's template context.
pub type Context = BTreeMap<String, ContextValue>;

/// A value in a [`Context`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<ContextValue>),
    Map(Context),
}

impl ContextValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContextValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ContextValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ContextValue]> {
        match self {
            ContextValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ContextValue::Null)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> ContextValue {
        ContextValue::Bool(b)
    }
}

impl From<usize> for ContextValue {
    fn from(n: usize) -> ContextValue {
        ContextValue::Int(n as i64)
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> ContextValue {
        ContextValue::String(s.to_owned())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> ContextValue {
        ContextValue::String(s)
    }
}

impl From<&String> for ContextValue {
    fn from(s: &String) -> ContextValue {
        ContextValue::String(s.clone())
    }
}

impl From<&NodeId> for ContextValue {
    fn from(id: &NodeId) -> ContextValue {
        ContextValue::String(id.as_str().to_owned())
    }
}

impl<T: Into<ContextValue>> From<Option<T>> for ContextValue {
    fn from(opt: Option<T>) -> ContextValue {
        match opt {
            Some(value) => value.into(),
            None => ContextValue::Null,
        }
    }
}

impl<T: Into<ContextValue>> From<Vec<T>> for ContextValue {
    fn from(items: Vec<T>) -> ContextValue {
        ContextValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// Builds a [`Context`] from key/value pairs, e.g.
/// `context! { "id" => id, "next_id" => next }`.
#[macro_export]
macro_rules! context {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut context = $crate::context::Context::new();
        $(
            context.insert(
                ($key).to_owned(),
                $crate::context::ContextValue::from($value),
            );
        )*
        context
    }};
}
