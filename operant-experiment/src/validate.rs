use operant_core::TrialConfiguration;

use crate::error::{MissingField, ValidationError};

/// Form fields that go through validation.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Name,
    Duration,
    Goal,
    Cooldown,
}

impl FieldKind {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, FieldKind::Name)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Name => "test name",
            FieldKind::Duration => "trial duration",
            FieldKind::Goal => "goal",
            FieldKind::Cooldown => "cooldown",
        }
    }
}

/// Sanitized value plus the message to show next to the field, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub value: String,
    pub error: Option<ValidationError>,
}

impl Validated {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

const RESTRICTED: &[char] = &[
    '<', '>', '&', '"', '\'', '/', '-', ';', '\\', '^', '%', '+', ':', '(', ')', '{', '}', '[',
    ']',
];

fn is_restricted(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{1f}' | '\u{7f}') || c.is_whitespace() || RESTRICTED.contains(&c)
}

/// Fails on the first of `fields` that is empty in `config`.
pub fn require_filled(config: &TrialConfiguration, fields: &[FieldKind]) -> Result<(), MissingField> {
    for kind in fields {
        let empty = match kind {
            FieldKind::Name => config.name.is_empty(),
            FieldKind::Duration => config.duration_minutes.is_empty(),
            FieldKind::Goal => config.goal_count.is_empty(),
            FieldKind::Cooldown => config.cooldown_seconds.is_empty(),
        };
        if empty {
            return Err(MissingField(kind.label()));
        }
    }
    Ok(())
}

pub fn sanitize_name(raw: &str) -> String {
    raw.chars().filter(|&c| !is_restricted(c)).collect()
}

pub fn sanitize_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Strip disallowed characters from `raw` for the given field.
///
/// Input that is emptied by sanitization is reported as an error, empty
/// input is not.
pub fn validate_field(kind: FieldKind, raw: &str) -> Validated {
    let (value, failure) = match kind {
        FieldKind::Name => (sanitize_name(raw), ValidationError::EmptyName),
        FieldKind::Duration | FieldKind::Goal | FieldKind::Cooldown => {
            (sanitize_digits(raw), ValidationError::NotNumeric)
        }
    };
    let error = (value.is_empty() && !raw.is_empty()).then_some(failure);
    Validated { value, error }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_strips_restricted_characters() {
        let v = validate_field(FieldKind::Name, "rat <1> (left) cage:3");
        assert_eq!(v.value, "rat1leftcage3");
        assert!(v.is_ok());
    }

    #[test]
    fn name_strips_control_characters() {
        let v = validate_field(FieldKind::Name, "a\u{0}b\u{7f}c\td");
        assert_eq!(v.value, "abcd");
    }

    #[test]
    fn name_emptied_by_sanitizing_is_an_error() {
        let v = validate_field(FieldKind::Name, "<>  ;");
        assert_eq!(v.value, "");
        assert_eq!(v.error, Some(ValidationError::EmptyName));
        assert_eq!(
            v.error.unwrap().to_string(),
            "Test name cannot be empty after removing restricted characters"
        );
    }

    #[test]
    fn empty_input_is_not_an_error() {
        for kind in [FieldKind::Name, FieldKind::Duration, FieldKind::Goal, FieldKind::Cooldown] {
            assert_eq!(validate_field(kind, "").error, None);
        }
    }

    #[test]
    fn numeric_fields_keep_only_digits() {
        let inputs = ["12", "1a2b", " 3 ", "-5", "4.5", "٣7", "x9y", "0"];
        for kind in [FieldKind::Duration, FieldKind::Goal, FieldKind::Cooldown] {
            for raw in inputs {
                let v = validate_field(kind, raw);
                assert!(v.value.bytes().all(|b| b.is_ascii_digit()), "{raw:?} -> {:?}", v.value);
                assert!(v.is_ok());
            }
        }
        assert_eq!(validate_field(FieldKind::Goal, "4.5").value, "45");
    }

    #[test]
    fn require_filled_names_first_empty_field() {
        let config = TrialConfiguration::default().with_name("a");
        assert_eq!(
            require_filled(&config, &[FieldKind::Name, FieldKind::Goal, FieldKind::Cooldown]),
            Err(MissingField("goal"))
        );
        assert!(require_filled(&config, &[FieldKind::Name]).is_ok());
    }

    #[test]
    fn numeric_field_without_digits_is_an_error() {
        let v = validate_field(FieldKind::Cooldown, "ten");
        assert_eq!(v.value, "");
        assert_eq!(v.error.unwrap().to_string(), "Only numbers are allowed");
    }
}
