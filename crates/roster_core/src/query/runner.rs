//! Executes named queries against a migrated connection.

use super::named::{Cardinality, EntityKind, NamedQuery, QueryDefinition};
use super::params::QueryParams;
use crate::db::schema::ensure_schema_ready;
use crate::model::class::Class;
use crate::model::student::Student;
use crate::repo::class_repo::parse_class_row;
use crate::repo::student_repo::parse_student_row;
use crate::repo::{EntityKey, RepoError, RepoResult};
use log::debug;
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;

/// One mapped result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum Entity {
    Class(Class),
    Student(Student),
}

impl Entity {
    pub fn into_class(self) -> Option<Class> {
        match self {
            Self::Class(class) => Some(class),
            Self::Student(_) => None,
        }
    }

    pub fn into_student(self) -> Option<Student> {
        match self {
            Self::Student(student) => Some(student),
            Self::Class(_) => None,
        }
    }
}

/// Query output shaped by the query's cardinality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Single(Entity),
    Many(Vec<Entity>),
}

impl QueryResult {
    pub fn into_single(self) -> Option<Entity> {
        match self {
            Self::Single(entity) => Some(entity),
            Self::Many(_) => None,
        }
    }

    pub fn into_many(self) -> Vec<Entity> {
        match self {
            Self::Single(entity) => vec![entity],
            Self::Many(entities) => entities,
        }
    }
}

/// Named-query executor bound to one connection.
pub struct NamedQueryRunner<'conn> {
    conn: &'conn Connection,
}

impl<'conn> NamedQueryRunner<'conn> {
    /// Creates runner from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    /// Resolves `name` and executes it with `params`.
    pub fn execute(&self, name: &str, params: &QueryParams) -> RepoResult<QueryResult> {
        let query = NamedQuery::from_name(name)
            .ok_or_else(|| RepoError::UnknownQueryName(name.to_string()))?;
        self.execute_query(query, params)
    }

    pub fn execute_query(
        &self,
        query: NamedQuery,
        params: &QueryParams,
    ) -> RepoResult<QueryResult> {
        self.execute_definition(query.definition(), params)
    }

    fn execute_definition(
        &self,
        definition: &QueryDefinition,
        params: &QueryParams,
    ) -> RepoResult<QueryResult> {
        let bind_values = params.bind(definition.name, definition.params)?;

        let mut stmt = self.conn.prepare(definition.sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            let entity = match definition.entity {
                EntityKind::Class => Entity::Class(parse_class_row(row)?),
                EntityKind::Student => Entity::Student(parse_student_row(row)?),
            };
            entities.push(entity);
        }

        debug!(
            "event=named_query module=query status=ok query={} rows={}",
            definition.name,
            entities.len()
        );

        match definition.cardinality {
            Cardinality::Many => Ok(QueryResult::Many(entities)),
            Cardinality::Single => {
                if entities.len() > 1 {
                    return Err(RepoError::MultipleResults {
                        query: definition.name,
                        count: entities.len(),
                    });
                }
                entities
                    .pop()
                    .map(QueryResult::Single)
                    .ok_or(RepoError::NotFound(EntityKey::Query(definition.name)))
            }
        }
    }

    /// Typed shortcut for `Class.findClassByCode`.
    pub fn find_class_by_code(&self, code: &str) -> RepoResult<Class> {
        let params = QueryParams::new().text("code", code);
        self.execute_query(NamedQuery::FindClassByCode, &params)
            .map_err(|err| match err {
                RepoError::NotFound(EntityKey::Query(_)) => {
                    RepoError::NotFound(EntityKey::Class(code.to_string()))
                }
                other => other,
            })?
            .into_single()
            .and_then(Entity::into_class)
            .ok_or_else(|| {
                RepoError::InvalidData("Class.findClassByCode returned no class".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{Entity, NamedQueryRunner, QueryResult};
    use crate::db::open_db_in_memory;
    use crate::query::named::{Cardinality, EntityKind, QueryDefinition};
    use crate::query::params::QueryParams;
    use crate::repo::RepoError;

    const ALL_CLASSES_AS_SINGLE: QueryDefinition = QueryDefinition {
        name: "Class.anyClass",
        sql: "SELECT code, name FROM classes ORDER BY code;",
        params: &[],
        cardinality: Cardinality::Single,
        entity: EntityKind::Class,
    };

    #[test]
    fn single_result_query_rejects_multiple_rows() {
        let conn = open_db_in_memory().unwrap();
        conn.execute_batch(
            "INSERT INTO classes (code, name) VALUES ('math17', 'Algebra and Trigonometry');
             INSERT INTO classes (code, name) VALUES ('comm01', 'Communication 1');",
        )
        .unwrap();
        let runner = NamedQueryRunner::try_new(&conn).unwrap();

        let err = runner
            .execute_definition(&ALL_CLASSES_AS_SINGLE, &QueryParams::new())
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::MultipleResults {
                query: "Class.anyClass",
                count: 2
            }
        ));
    }

    #[test]
    fn single_result_query_returns_the_only_row() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO classes (code, name) VALUES ('comm01', 'Communication 1');",
            [],
        )
        .unwrap();
        let runner = NamedQueryRunner::try_new(&conn).unwrap();

        let result = runner
            .execute_definition(&ALL_CLASSES_AS_SINGLE, &QueryParams::new())
            .unwrap();
        match result {
            QueryResult::Single(Entity::Class(class)) => assert_eq!(class.code, "comm01"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
