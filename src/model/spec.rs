//! Declarative entity model: field kinds, constraints, and per-entity specs.
//! The registry of these specs drives validation, DDL, SQL building, and the
//! generic handlers.

use serde_json::{Map, Value};

/// Tagged field type. Validation dispatches over exactly this set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Bool,
    /// JSON array of objects (e.g. the SMS recipient list).
    Array,
    Enum(&'static [&'static str]),
}

/// Extra per-field constraint, checked after the kind check.
#[derive(Clone, Copy, Debug)]
pub enum Constraint {
    Email,
    /// Digit-only string with an inclusive length range.
    Digits { min: u32, max: u32 },
    MinLength(u32),
}

#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub unique: bool,
    /// Stripped from every API response (password hashes).
    pub sensitive: bool,
    /// bcrypt-hashed before persistence on create and update.
    pub hashed: bool,
    pub constraints: &'static [Constraint],
    /// SQL default literal, e.g. `'center'` or `TRUE`.
    pub default: Option<&'static str>,
    /// Hard foreign key: referenced table (soft references stay plain text).
    pub references: Option<&'static str>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldSpec {
            name,
            kind,
            required: true,
            unique: false,
            sensitive: false,
            hashed: false,
            constraints: &[],
            default: None,
            references: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub const fn number(name: &'static str) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub const fn date(name: &'static str) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn secret(mut self) -> Self {
        self.sensitive = true;
        self.hashed = true;
        self
    }

    pub const fn check(mut self, constraints: &'static [Constraint]) -> Self {
        self.constraints = constraints;
        self
    }

    pub const fn default_sql(mut self, literal: &'static str) -> Self {
        self.default = Some(literal);
        self
    }

    pub const fn fk(mut self, table: &'static str) -> Self {
        self.references = Some(table);
        self
    }
}

/// Operations exposed through the generic routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Create,
    Read,
    Update,
    Delete,
    Toggle,
}

pub struct EntitySpec {
    /// Human label used in response messages ("Student created successfully").
    pub label: &'static str,
    /// URL segment under /v1.
    pub path_segment: &'static str,
    pub table: &'static str,
    /// Declared fields, in validation order: the first violation reported is
    /// the first field in this list that fails.
    pub fields: &'static [FieldSpec],
    /// Columns covered by the case-insensitive list search (OR-combined).
    pub search_fields: &'static [&'static str],
    pub operations: &'static [Op],
    /// Recomputes server-derived fields before validation and persistence
    /// (fee records: pendingAmount and Paid/Pending status).
    pub prepare: Option<fn(&mut Map<String, Value>)>,
}

impl EntitySpec {
    pub fn allows(&self, op: Op) -> bool {
        self.operations.contains(&op)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the entity carries the boolean active/suspended flag. Fee
    /// records instead derive a Paid/Pending text status.
    pub fn has_bool_status(&self) -> bool {
        match self.field("status") {
            Some(f) => matches!(f.kind, FieldKind::Bool),
            None => false,
        }
    }
}
