//! Step 1: database connection settings and schema provisioning.

use std::collections::BTreeMap;

use super::{bool_value, FieldKind, FieldSchema, InstallStep, StepKind};

pub(super) fn step(index: usize) -> InstallStep {
    InstallStep {
        index,
        key: "database",
        title: "Database Setup",
        template: "install/database.html",
        kind: StepKind::Database,
        fields: vec![
            FieldSchema::new("driver", "Driver", FieldKind::Choice)
                .required()
                .default_value("file")
                .choices(&["file"]),
            FieldSchema::new("host", "Host", FieldKind::Text).default_value("localhost"),
            FieldSchema::new("port", "Port", FieldKind::Integer).default_value("3306"),
            FieldSchema::new("name", "Database Name", FieldKind::Text)
                .required()
                .default_value("campaigner"),
            FieldSchema::new("user", "Database User", FieldKind::Text),
            FieldSchema::new("password", "Database Password", FieldKind::Password),
            FieldSchema::new("table_prefix", "Table Prefix", FieldKind::Text),
            FieldSchema::new("backup_tables", "Backup Existing Tables", FieldKind::Boolean)
                .default_value("false"),
        ],
    }
}

/// Map submitted connection settings to `db_*` configuration parameters
pub(super) fn parameters(
    step: &InstallStep,
    payload: &BTreeMap<String, String>,
) -> BTreeMap<String, toml::Value> {
    let mut params = BTreeMap::new();

    for field in &step.fields {
        let value = step.value(field, payload).unwrap_or_default();
        let key = format!("db_{}", field.name);
        let value = match field.kind {
            FieldKind::Integer => {
                toml::Value::Integer(value.parse::<i64>().unwrap_or_default())
            }
            FieldKind::Boolean => toml::Value::Boolean(bool_value(value)),
            _ => toml::Value::String(value.to_string()),
        };
        params.insert(key, value);
    }

    params
}
