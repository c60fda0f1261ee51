//! Parameter map passed to named queries.

use super::named::{ParamKind, ParamSpec};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One parameter value as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Integer(i64),
    Text(String),
}

/// Named parameters for one query execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams(BTreeMap<String, QueryValue>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), QueryValue::Text(value.into()));
        self
    }

    pub fn integer(mut self, name: impl Into<String>, value: i64) -> Self {
        self.0.insert(name.into(), QueryValue::Integer(value));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: QueryValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.0.get(name)
    }

    /// Parses `name=value` input. Values stay text; integer parameters
    /// accept numeric text at bind time.
    pub fn parse_pair(pair: &str) -> Option<(String, QueryValue)> {
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name.to_string(), QueryValue::Text(value.to_string())))
    }

    /// Produces positional bind values in declaration order.
    pub(crate) fn bind(&self, query: &'static str, specs: &[ParamSpec]) -> RepoResult<Vec<Value>> {
        specs
            .iter()
            .map(|spec| {
                let value = self.get(spec.name).ok_or(RepoError::MissingParameter {
                    query,
                    parameter: spec.name,
                })?;
                coerce(query, spec, value)
            })
            .collect()
    }
}

impl FromIterator<(String, QueryValue)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, QueryValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn coerce(query: &'static str, spec: &ParamSpec, value: &QueryValue) -> RepoResult<Value> {
    let invalid = || RepoError::InvalidParameter {
        query,
        parameter: spec.name,
        expected: match spec.kind {
            ParamKind::Text => "text",
            ParamKind::Integer => "an integer",
        },
    };

    match (spec.kind, value) {
        (ParamKind::Text, QueryValue::Text(text)) => Ok(Value::Text(text.clone())),
        (ParamKind::Integer, QueryValue::Integer(number)) => Ok(Value::Integer(*number)),
        (ParamKind::Integer, QueryValue::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| invalid()),
        (ParamKind::Text, QueryValue::Integer(_)) => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::{QueryParams, QueryValue};
    use crate::query::named::NamedQuery;
    use crate::repo::RepoError;
    use rusqlite::types::Value;

    #[test]
    fn parse_pair_splits_on_first_equals() {
        assert_eq!(
            QueryParams::parse_pair("code=a=b"),
            Some(("code".to_string(), QueryValue::Text("a=b".to_string())))
        );
        assert_eq!(QueryParams::parse_pair("novalue"), None);
        assert_eq!(QueryParams::parse_pair(" =x"), None);
    }

    #[test]
    fn bind_reports_missing_parameter_by_name() {
        let definition = NamedQuery::FindClassByCode.definition();
        let err = QueryParams::new()
            .text("name", "Algebra")
            .bind(definition.name, definition.params)
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::MissingParameter {
                query: "Class.findClassByCode",
                parameter: "code"
            }
        ));
    }

    #[test]
    fn integer_parameter_accepts_numeric_text() {
        let definition = NamedQuery::FindStudentById.definition();
        let bound = QueryParams::new()
            .text("id", " 1000 ")
            .bind(definition.name, definition.params)
            .unwrap();
        assert_eq!(bound, vec![Value::Integer(1000)]);
    }

    #[test]
    fn mismatched_value_types_are_rejected() {
        let by_id = NamedQuery::FindStudentById.definition();
        let err = QueryParams::new()
            .text("id", "dohdoh")
            .bind(by_id.name, by_id.params)
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidParameter { parameter: "id", .. }));

        let by_code = NamedQuery::FindClassByCode.definition();
        let err = QueryParams::new()
            .integer("code", 17)
            .bind(by_code.name, by_code.params)
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidParameter { parameter: "code", .. }));
    }
}
