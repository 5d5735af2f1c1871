//! The twelve entity definitions and path-segment lookup.
//!
//! Column and JSON names are camelCase because that is the wire contract the
//! existing frontend speaks; identifiers are quoted everywhere in SQL.

use crate::model::spec::{Constraint, EntitySpec, FieldKind, FieldSpec, Op};
use serde_json::{Map, Value};
use std::collections::HashMap;

const GENDERS: &[&str] = &["Male", "Female", "Other"];
const FEE_STATES: &[&str] = &["Paid", "Pending"];

const ALL_OPS: &[Op] = &[Op::Create, Op::Read, Op::Update, Op::Delete, Op::Toggle];
const NO_TOGGLE: &[Op] = &[Op::Create, Op::Read, Op::Update, Op::Delete];

const fn status_flag() -> FieldSpec {
    FieldSpec::new("status", FieldKind::Bool)
        .optional()
        .default_sql("TRUE")
}

const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name"),
    FieldSpec::text("roleName"),
    FieldSpec::text("email").unique().check(&[Constraint::Email]),
    FieldSpec::text("password")
        .secret()
        .check(&[Constraint::MinLength(6)]),
    FieldSpec::text("address").optional(),
    FieldSpec::text("phone").check(&[Constraint::Digits { min: 10, max: 15 }]),
    status_flag(),
];

const CENTER_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("centerId").unique(),
    FieldSpec::text("centerName"),
    FieldSpec::text("ownerName"),
    FieldSpec::text("mobileNo").check(&[Constraint::Digits { min: 10, max: 10 }]),
    FieldSpec::text("emailId").unique().check(&[Constraint::Email]),
    FieldSpec::text("password")
        .secret()
        .check(&[Constraint::MinLength(6)]),
    FieldSpec::text("address"),
    FieldSpec::text("roleName").optional().default_sql("'center'"),
    status_flag(),
];

const COURSE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("courseName"),
    FieldSpec::text("duration"),
    FieldSpec::text("courseFee"),
    status_flag(),
];

const BATCH_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("batchName"),
    FieldSpec::text("timing"),
    FieldSpec::text("course"),
    FieldSpec::text("startsAt"),
    status_flag(),
];

const STUDENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("centerName"),
    FieldSpec::text("firstName"),
    FieldSpec::text("lastName"),
    FieldSpec::text("email").unique().check(&[Constraint::Email]),
    FieldSpec::text("phone").unique(),
    FieldSpec::date("dob"),
    FieldSpec::text("address").optional(),
    FieldSpec::text("fatherName").optional(),
    FieldSpec::text("motherName").optional(),
    FieldSpec::text("course"),
    FieldSpec::text("batch"),
    FieldSpec::text("previousEducation").optional(),
    FieldSpec::text("emergencyContact").optional(),
    FieldSpec::new("gender", FieldKind::Enum(GENDERS)),
    FieldSpec::date("admissionDate"),
    FieldSpec::number("fee"),
    FieldSpec::text("counsellorName").optional(),
    FieldSpec::text("reference").optional(),
    FieldSpec::text("paymentTerm"),
    FieldSpec::text("collegeName").optional(),
    status_flag(),
];

const TRAINER_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("trainerName"),
    FieldSpec::date("dob"),
    FieldSpec::new("gender", FieldKind::Enum(GENDERS)),
    FieldSpec::text("email").unique().check(&[Constraint::Email]),
    FieldSpec::text("phoneNo").unique(),
    FieldSpec::text("address").optional(),
    FieldSpec::text("subject").optional(),
    FieldSpec::text("experience").optional(),
    FieldSpec::number("salary"),
    status_flag(),
];

const SYLLABUS_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("batch"),
    FieldSpec::text("course"),
    FieldSpec::text("topics"),
    status_flag(),
];

const FEE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("centerName"),
    FieldSpec::text("course"),
    FieldSpec::text("batch"),
    FieldSpec::text("studentName"),
    FieldSpec::text("phone"),
    FieldSpec::text("modeOfPayment"),
    FieldSpec::number("totalAmount"),
    FieldSpec::number("receivedAmount"),
    FieldSpec::number("pendingAmount").optional(),
    FieldSpec::new("status", FieldKind::Enum(FEE_STATES))
        .optional()
        .default_sql("'Pending'"),
];

const ENQUIRY_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("centerName"),
    FieldSpec::text("firstName"),
    FieldSpec::text("lastName"),
    FieldSpec::text("email").unique().check(&[Constraint::Email]),
    FieldSpec::text("phone").unique(),
    FieldSpec::date("dob"),
    FieldSpec::text("address").optional(),
    FieldSpec::text("course"),
    FieldSpec::text("batch"),
    FieldSpec::new("gender", FieldKind::Enum(GENDERS)),
    FieldSpec::text("collegeName").optional(),
    FieldSpec::text("counsellorName").optional(),
    FieldSpec::text("professional").optional(),
    FieldSpec::text("preferTiming"),
    status_flag(),
];

const REMARK_FIELDS: &[FieldSpec] = &[
    FieldSpec::number("enquiryId").fk("enquiries"),
    FieldSpec::text("remarks"),
    status_flag(),
];

const SMS_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("centerName"),
    FieldSpec::text("course"),
    FieldSpec::text("batch"),
    FieldSpec::new("selectStudent", FieldKind::Array),
    FieldSpec::text("message"),
    status_flag(),
];

const SKILL_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("centerName"),
    FieldSpec::text("course"),
    FieldSpec::text("batch"),
    FieldSpec::text("studentName").unique(),
    FieldSpec::text("phone").unique(),
    FieldSpec::text("resumeCreation"),
    FieldSpec::text("presentation"),
    FieldSpec::text("groupDiscussion"),
    FieldSpec::text("technical"),
    FieldSpec::text("mockInterview"),
    status_flag(),
];

/// Fee-record derivation: pendingAmount and Paid/Pending status are always
/// recomputed server-side, overwriting anything the client sent.
fn prepare_fee(body: &mut Map<String, Value>) {
    let total = body.get("totalAmount").and_then(Value::as_f64).unwrap_or(0.0);
    let received = body
        .get("receivedAmount")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let pending = total - received;
    let pending_value = serde_json::Number::from_f64(pending)
        .map(Value::Number)
        .unwrap_or(Value::Null);
    body.insert("pendingAmount".into(), pending_value);
    let status = if pending == 0.0 { "Paid" } else { "Pending" };
    body.insert("status".into(), Value::String(status.into()));
}

pub static ENTITIES: &[EntitySpec] = &[
    EntitySpec {
        label: "User",
        path_segment: "user",
        table: "users",
        fields: USER_FIELDS,
        search_fields: &["name", "email", "phone"],
        operations: ALL_OPS,
        prepare: None,
    },
    EntitySpec {
        label: "Center",
        path_segment: "centers",
        table: "centers",
        fields: CENTER_FIELDS,
        search_fields: &["centerName", "ownerName"],
        operations: ALL_OPS,
        prepare: None,
    },
    EntitySpec {
        label: "Course",
        path_segment: "courses",
        table: "courses",
        fields: COURSE_FIELDS,
        search_fields: &["courseName"],
        operations: ALL_OPS,
        prepare: None,
    },
    EntitySpec {
        label: "Batch",
        path_segment: "batches",
        table: "batches",
        fields: BATCH_FIELDS,
        search_fields: &["batchName", "course"],
        operations: ALL_OPS,
        prepare: None,
    },
    EntitySpec {
        label: "Student",
        path_segment: "students",
        table: "students",
        fields: STUDENT_FIELDS,
        search_fields: &["firstName", "lastName", "phone"],
        operations: ALL_OPS,
        prepare: None,
    },
    EntitySpec {
        label: "Trainer",
        path_segment: "trainers",
        table: "trainers",
        fields: TRAINER_FIELDS,
        search_fields: &["trainerName", "phoneNo"],
        operations: ALL_OPS,
        prepare: None,
    },
    EntitySpec {
        label: "Syllabus",
        path_segment: "syllabuses",
        table: "syllabuses",
        fields: SYLLABUS_FIELDS,
        search_fields: &["batch", "course"],
        operations: ALL_OPS,
        prepare: None,
    },
    EntitySpec {
        label: "Fee update",
        path_segment: "feeUpdates",
        table: "fee_updates",
        fields: FEE_FIELDS,
        search_fields: &["centerName", "batch", "course", "studentName", "phone"],
        // Status is derived from the amounts, so there is nothing to toggle.
        operations: NO_TOGGLE,
        prepare: Some(prepare_fee),
    },
    EntitySpec {
        label: "Enquiry",
        path_segment: "enquiries",
        table: "enquiries",
        fields: ENQUIRY_FIELDS,
        search_fields: &["firstName", "lastName", "phone"],
        operations: ALL_OPS,
        prepare: None,
    },
    EntitySpec {
        label: "Remark",
        path_segment: "remarks",
        table: "remarks",
        fields: REMARK_FIELDS,
        search_fields: &[],
        // Served by the dedicated per-enquiry routes, not the generic ones.
        operations: &[],
        prepare: None,
    },
    EntitySpec {
        label: "SMS",
        path_segment: "sms",
        table: "sms_logs",
        fields: SMS_FIELDS,
        search_fields: &["centerName", "course", "batch"],
        operations: ALL_OPS,
        prepare: None,
    },
    EntitySpec {
        label: "Skill mark",
        path_segment: "skills",
        table: "skill_marks",
        fields: SKILL_FIELDS,
        search_fields: &["studentName", "phone"],
        operations: ALL_OPS,
        prepare: None,
    },
];

/// Path-segment lookup over the static entity set.
pub struct Registry {
    by_path: HashMap<&'static str, &'static EntitySpec>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            by_path: ENTITIES.iter().map(|e| (e.path_segment, e)).collect(),
        }
    }

    pub fn by_path(&self, path: &str) -> Option<&'static EntitySpec> {
        self.by_path.get(path).copied()
    }

    pub fn entities(&self) -> impl Iterator<Item = &'static EntitySpec> {
        ENTITIES.iter()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
