pub mod registry;
pub mod spec;

pub use registry::Registry;
pub use spec::{Constraint, EntitySpec, FieldKind, FieldSpec, Op};
