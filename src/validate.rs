use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::ApiError;

/// One failed field check, reported in rule declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: &'static str,
}

/// A declarative field check. Each request type carries a table of these;
/// the table runs before any handler logic touches the payload.
pub struct Rule<T> {
    pub field: &'static str,
    pub message: &'static str,
    pub check: fn(&T) -> bool,
}

/// Run every rule against the payload, collecting all violations rather
/// than stopping at the first.
pub fn check<T>(value: &T, rules: &[Rule<T>]) -> Result<(), ApiError> {
    let violations: Vec<Violation> = rules
        .iter()
        .filter(|rule| !(rule.check)(value))
        .map(|rule| Violation {
            field: rule.field,
            message: rule.message,
        })
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(violations))
    }
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Form {
        name: String,
        email: String,
    }

    const RULES: &[Rule<Form>] = &[
        Rule {
            field: "name",
            message: "Please provide a name.",
            check: |f: &Form| !f.name.is_empty(),
        },
        Rule {
            field: "email",
            message: "Please provide a valid email.",
            check: |f: &Form| is_valid_email(&f.email),
        },
    ];

    #[test]
    fn passes_when_all_rules_hold() {
        let form = Form {
            name: "ada".into(),
            email: "ada@example.com".into(),
        };
        assert!(check(&form, RULES).is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let form = Form {
            name: String::new(),
            email: "not-an-email".into(),
        };
        let err = check(&form, RULES).unwrap_err();
        match err {
            ApiError::Validation(violations) => {
                assert_eq!(violations.len(), 2);
                assert_eq!(violations[0].field, "name");
                assert_eq!(violations[1].field, "email");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn email_regex_accepts_and_rejects() {
        assert!(is_valid_email("user@host.org"));
        assert!(!is_valid_email("user@host"));
        assert!(!is_valid_email("user host@x.y"));
        assert!(!is_valid_email(""));
    }
}
