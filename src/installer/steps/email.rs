//! Step 3: outgoing mail settings. No side effect.

use std::collections::BTreeMap;

use super::{FieldKind, FieldSchema, InstallStep, StepKind};

pub(super) fn step(index: usize) -> InstallStep {
    InstallStep {
        index,
        key: "email",
        title: "Email Configuration",
        template: "install/email.html",
        kind: StepKind::Email,
        fields: vec![
            FieldSchema::new("mailer_from_name", "From Name", FieldKind::Text).required(),
            FieldSchema::new("mailer_from_email", "From Address", FieldKind::Email).required(),
            FieldSchema::new("mailer_transport", "Transport", FieldKind::Choice)
                .required()
                .default_value("smtp")
                .choices(&["smtp", "sendmail"]),
            FieldSchema::new("mailer_host", "SMTP Host", FieldKind::Text)
                .default_value("localhost"),
            FieldSchema::new("mailer_port", "SMTP Port", FieldKind::Integer).default_value("25"),
        ],
    }
}

/// Map submitted mailer settings to `mailer_*` configuration parameters
pub(super) fn parameters(
    step: &InstallStep,
    payload: &BTreeMap<String, String>,
) -> BTreeMap<String, toml::Value> {
    let mut params = BTreeMap::new();

    for field in &step.fields {
        let value = step.value(field, payload).unwrap_or_default();
        let value = match field.kind {
            FieldKind::Integer => {
                toml::Value::Integer(value.parse::<i64>().unwrap_or_default())
            }
            _ => toml::Value::String(value.to_string()),
        };
        params.insert(field.name.to_string(), value);
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parameters_keep_field_names() {
        let step = step(3);
        let params = parameters(
            &step,
            &payload(&[
                ("mailer_from_name", "Campaigner"),
                ("mailer_from_email", "noreply@example.com"),
            ]),
        );

        assert_eq!(
            params["mailer_from_email"],
            toml::Value::String("noreply@example.com".into())
        );
        assert_eq!(params["mailer_transport"], toml::Value::String("smtp".into()));
        assert_eq!(params["mailer_port"], toml::Value::Integer(25));
    }
}
