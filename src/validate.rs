//! Request validation against an entity's field specs.
//!
//! Fails closed and reports only the first violation, naming the field and
//! the rule. Fields are checked in their declared order, then any keys the
//! entity does not declare are rejected.

use crate::error::AppError;
use crate::model::{Constraint, EntitySpec, FieldKind, FieldSpec};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern"));

/// Keys accepted on every entity without being declared fields. `id` is
/// ignored on write (server-assigned), timestamps are server-managed.
const IMPLICIT_KEYS: &[&str] = &["id", "createdAt", "updatedAt"];

pub fn validate(body: &Map<String, Value>, entity: &EntitySpec) -> Result<(), AppError> {
    for field in entity.fields {
        let val = body.get(field.name);
        match val {
            None | Some(Value::Null) => {
                if field.required {
                    return Err(violation(field.name, "is a required field"));
                }
            }
            Some(v) => validate_field(field, v)?,
        }
    }
    for key in body.keys() {
        if entity.field(key).is_none() && !IMPLICIT_KEYS.contains(&key.as_str()) {
            return Err(violation(key, "is not allowed"));
        }
    }
    Ok(())
}

fn validate_field(field: &FieldSpec, v: &Value) -> Result<(), AppError> {
    match field.kind {
        FieldKind::Text => {
            let s = v
                .as_str()
                .ok_or_else(|| violation(field.name, "should be a type of string"))?;
            if s.is_empty() && field.required {
                return Err(violation(field.name, "cannot be an empty field"));
            }
            for c in field.constraints {
                check_constraint(field.name, s, c)?;
            }
        }
        FieldKind::Number => {
            if !v.is_number() {
                return Err(violation(field.name, "should be a type of number"));
            }
        }
        FieldKind::Date => {
            let s = v
                .as_str()
                .ok_or_else(|| violation(field.name, "should be a valid date"))?;
            if !is_date(s) {
                return Err(violation(field.name, "should be a valid date"));
            }
        }
        FieldKind::Bool => {
            if !v.is_boolean() {
                return Err(violation(field.name, "should be a type of boolean"));
            }
        }
        FieldKind::Array => {
            let items = v
                .as_array()
                .ok_or_else(|| violation(field.name, "must be an array"))?;
            if items.iter().any(|i| !i.is_object()) {
                return Err(violation(field.name, "must be an array of objects"));
            }
        }
        FieldKind::Enum(allowed) => {
            let ok = v.as_str().map(|s| allowed.contains(&s)).unwrap_or(false);
            if !ok {
                return Err(AppError::Validation(format!(
                    "{} must be one of [{}]",
                    field.name,
                    allowed.join(", ")
                )));
            }
        }
    }
    Ok(())
}

fn check_constraint(name: &str, s: &str, c: &Constraint) -> Result<(), AppError> {
    match c {
        Constraint::Email => {
            if !EMAIL_RE.is_match(s) {
                return Err(violation(name, "must be a valid email"));
            }
        }
        Constraint::Digits { min, max } => {
            let all_digits = !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
            let len = s.len() as u32;
            if !all_digits || len < *min || len > *max {
                let rule = if min == max {
                    format!("must be a {} digit number", min)
                } else {
                    format!("must be {} to {} digits", min, max)
                };
                return Err(violation(name, &rule));
            }
        }
        Constraint::MinLength(n) => {
            if (s.chars().count() as u32) < *n {
                return Err(violation(
                    name,
                    &format!("length must be at least {} characters", n),
                ));
            }
        }
    }
    Ok(())
}

/// Accepts RFC 3339 timestamps or plain YYYY-MM-DD dates.
fn is_date(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
        || chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn violation(field: &str, rule: &str) -> AppError {
    AppError::Validation(format!("{} {}", field, rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::registry::ENTITIES;
    use serde_json::json;

    fn entity(path: &str) -> &'static EntitySpec {
        ENTITIES.iter().find(|e| e.path_segment == path).unwrap()
    }

    fn course_body() -> Map<String, Value> {
        json!({
            "courseName": "Rust Systems",
            "duration": "3 months",
            "courseFee": "15000"
        })
        .as_object()
        .unwrap()
        .clone()
    }

    fn msg(r: Result<(), AppError>) -> String {
        r.unwrap_err().to_string()
    }

    #[test]
    fn valid_body_passes() {
        assert!(validate(&course_body(), entity("courses")).is_ok());
    }

    #[test]
    fn missing_required_field_is_first_violation() {
        let mut body = course_body();
        body.remove("courseName");
        body.remove("duration");
        // courseName is declared before duration, so it is reported first.
        assert_eq!(
            msg(validate(&body, entity("courses"))),
            "courseName is a required field"
        );
    }

    #[test]
    fn wrong_type_names_field_and_rule() {
        let mut body = course_body();
        body.insert("courseName".into(), json!(42));
        assert_eq!(
            msg(validate(&body, entity("courses"))),
            "courseName should be a type of string"
        );
    }

    #[test]
    fn empty_required_string_is_rejected() {
        let mut body = course_body();
        body.insert("duration".into(), json!(""));
        assert_eq!(
            msg(validate(&body, entity("courses"))),
            "duration cannot be an empty field"
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut body = course_body();
        body.insert("adminOverride".into(), json!(true));
        assert_eq!(
            msg(validate(&body, entity("courses"))),
            "adminOverride is not allowed"
        );
    }

    #[test]
    fn id_and_timestamps_are_tolerated() {
        let mut body = course_body();
        body.insert("id".into(), json!(7));
        assert!(validate(&body, entity("courses")).is_ok());
    }

    fn user_body() -> Map<String, Value> {
        json!({
            "name": "Asha",
            "roleName": "admin",
            "email": "asha@example.com",
            "password": "hunter22",
            "phone": "9876543210"
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn invalid_email_is_rejected() {
        let mut body = user_body();
        body.insert("email".into(), json!("not-an-email"));
        assert_eq!(msg(validate(&body, entity("user"))), "email must be a valid email");
    }

    #[test]
    fn short_password_is_rejected() {
        let mut body = user_body();
        body.insert("password".into(), json!("abc"));
        assert_eq!(
            msg(validate(&body, entity("user"))),
            "password length must be at least 6 characters"
        );
    }

    #[test]
    fn phone_range_is_enforced() {
        let mut body = user_body();
        body.insert("phone".into(), json!("123"));
        assert_eq!(msg(validate(&body, entity("user"))), "phone must be 10 to 15 digits");
        body.insert("phone".into(), json!("98765abc10"));
        assert_eq!(msg(validate(&body, entity("user"))), "phone must be 10 to 15 digits");
    }

    #[test]
    fn fixed_width_phone_is_enforced() {
        let mut body = json!({
            "centerId": "C-001",
            "centerName": "Pune Center",
            "ownerName": "R. Kulkarni",
            "mobileNo": "123",
            "emailId": "pune@example.com",
            "password": "secret123",
            "address": "FC Road"
        })
        .as_object()
        .unwrap()
        .clone();
        assert_eq!(
            msg(validate(&body, entity("centers"))),
            "mobileNo must be a 10 digit number"
        );
        body.insert("mobileNo".into(), json!("9876543210"));
        assert!(validate(&body, entity("centers")).is_ok());
    }

    #[test]
    fn gender_enum_is_enforced() {
        let mut body = json!({
            "trainerName": "Meera",
            "dob": "1990-04-12",
            "gender": "Unknown",
            "email": "meera@example.com",
            "phoneNo": "9123456780",
            "salary": 42000.0
        })
        .as_object()
        .unwrap()
        .clone();
        assert_eq!(
            msg(validate(&body, entity("trainers"))),
            "gender must be one of [Male, Female, Other]"
        );
        body.insert("gender".into(), json!("Female"));
        assert!(validate(&body, entity("trainers")).is_ok());
    }

    #[test]
    fn dates_accept_plain_and_rfc3339() {
        let mut body = json!({
            "trainerName": "Meera",
            "dob": "1990-04-12T00:00:00Z",
            "gender": "Female",
            "email": "meera@example.com",
            "phoneNo": "9123456780",
            "salary": 42000.0
        })
        .as_object()
        .unwrap()
        .clone();
        assert!(validate(&body, entity("trainers")).is_ok());
        body.insert("dob".into(), json!("12-04-1990"));
        assert_eq!(msg(validate(&body, entity("trainers"))), "dob should be a valid date");
    }

    #[test]
    fn sms_recipients_must_be_objects() {
        let mut body = json!({
            "centerName": "Pune Center",
            "course": "Rust",
            "batch": "B1",
            "selectStudent": [{"id": 1, "name": "Asha"}],
            "message": "Class moved to 10am"
        })
        .as_object()
        .unwrap()
        .clone();
        assert!(validate(&body, entity("sms")).is_ok());
        body.insert("selectStudent".into(), json!(["asha"]));
        assert_eq!(
            msg(validate(&body, entity("sms"))),
            "selectStudent must be an array of objects"
        );
        body.insert("selectStudent".into(), json!("asha"));
        assert_eq!(msg(validate(&body, entity("sms"))), "selectStudent must be an array");
    }
}
