//! Static query definitions addressable by name.

/// Expected row count of a named query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Many,
}

/// Entity type each result row is mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Class,
    Student,
}

/// Value type accepted for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Text,
    Integer,
}

/// One required parameter, bound positionally in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDefinition {
    pub name: &'static str,
    pub sql: &'static str,
    pub params: &'static [ParamSpec],
    pub cardinality: Cardinality,
    pub entity: EntityKind,
}

/// Closed set of queries known to the roster store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedQuery {
    FindClassByCode,
    FindStudentById,
    FindClassesByStudent,
    FindStudentsByClass,
}

const FIND_CLASS_BY_CODE: QueryDefinition = QueryDefinition {
    name: "Class.findClassByCode",
    sql: "SELECT code, name FROM classes WHERE code = ?1;",
    params: &[ParamSpec {
        name: "code",
        kind: ParamKind::Text,
    }],
    cardinality: Cardinality::Single,
    entity: EntityKind::Class,
};

const FIND_STUDENT_BY_ID: QueryDefinition = QueryDefinition {
    name: "Student.findStudentById",
    sql: "SELECT id, first_name, last_name FROM students WHERE id = ?1;",
    params: &[ParamSpec {
        name: "id",
        kind: ParamKind::Integer,
    }],
    cardinality: Cardinality::Single,
    entity: EntityKind::Student,
};

const FIND_CLASSES_BY_STUDENT: QueryDefinition = QueryDefinition {
    name: "Class.findClassesByStudent",
    sql: "SELECT
            c.code AS code,
            c.name AS name
         FROM class_students cs
         INNER JOIN classes c ON c.code = cs.class_code
         WHERE cs.student_id = ?1
         ORDER BY cs.seq ASC;",
    params: &[ParamSpec {
        name: "studentId",
        kind: ParamKind::Integer,
    }],
    cardinality: Cardinality::Many,
    entity: EntityKind::Class,
};

const FIND_STUDENTS_BY_CLASS: QueryDefinition = QueryDefinition {
    name: "Student.findStudentsByClass",
    sql: "SELECT
            s.id AS id,
            s.first_name AS first_name,
            s.last_name AS last_name
         FROM class_students cs
         INNER JOIN students s ON s.id = cs.student_id
         WHERE cs.class_code = ?1
         ORDER BY cs.seq ASC;",
    params: &[ParamSpec {
        name: "code",
        kind: ParamKind::Text,
    }],
    cardinality: Cardinality::Many,
    entity: EntityKind::Student,
};

impl NamedQuery {
    pub const ALL: [Self; 4] = [
        Self::FindClassByCode,
        Self::FindStudentById,
        Self::FindClassesByStudent,
        Self::FindStudentsByClass,
    ];

    pub fn definition(self) -> &'static QueryDefinition {
        match self {
            Self::FindClassByCode => &FIND_CLASS_BY_CODE,
            Self::FindStudentById => &FIND_STUDENT_BY_ID,
            Self::FindClassesByStudent => &FIND_CLASSES_BY_STUDENT,
            Self::FindStudentsByClass => &FIND_STUDENTS_BY_CLASS,
        }
    }

    pub fn name(self) -> &'static str {
        self.definition().name
    }

    /// Resolves a symbolic name. Matching is exact and case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|query| query.name() == name)
    }
}
