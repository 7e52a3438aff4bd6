//! Step 2: administrative user details.
//!
//! The submitted credentials feed the user-creation side effect directly;
//! nothing from this step lands in the settings file.

use super::{FieldKind, FieldSchema, InstallStep, StepKind};

pub(super) fn step(index: usize) -> InstallStep {
    InstallStep {
        index,
        key: "user",
        title: "Administrative User",
        template: "install/user.html",
        kind: StepKind::User,
        fields: vec![
            FieldSchema::new("firstname", "First Name", FieldKind::Text).required(),
            FieldSchema::new("lastname", "Last Name", FieldKind::Text).required(),
            FieldSchema::new("username", "Username", FieldKind::Text).required(),
            FieldSchema::new("email", "Email Address", FieldKind::Email).required(),
            FieldSchema::new("password", "Password", FieldKind::Password).required(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_required() {
        let step = step(2);
        assert_eq!(step.fields.len(), 5);
        assert!(step.fields.iter().all(|f| f.required));
    }
}
