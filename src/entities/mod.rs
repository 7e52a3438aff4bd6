//! Platform entities and their schema metadata.

use crate::storage::EntityMetadata;

pub mod asset;
pub mod field;
pub mod role;
pub mod user;

pub use asset::Asset;
pub use field::ContactField;
pub use role::Role;
pub use user::User;

/// Schema metadata for every entity the platform knows about.
///
/// This is the introspection surface the installer feeds to schema creation;
/// an empty list means there is nothing to install.
pub fn platform_metadata() -> Vec<EntityMetadata> {
    vec![
        EntityMetadata::new(
            Role::ENTITY,
            &["id", "name", "description", "is_admin", "created_at"],
        ),
        EntityMetadata::new(
            User::ENTITY,
            &[
                "id",
                "first_name",
                "last_name",
                "username",
                "email",
                "password_hash",
                "role_id",
                "created_at",
            ],
        )
        .with_reference("role_id", Role::ENTITY),
        EntityMetadata::new(
            Asset::ENTITY,
            &[
                "id",
                "title",
                "alias",
                "storage_location",
                "path",
                "created_by",
                "created_at",
            ],
        )
        .with_reference("created_by", User::ENTITY),
        EntityMetadata::new(
            ContactField::ENTITY,
            &[
                "alias",
                "label",
                "field_type",
                "field_group",
                "is_required",
                "is_unique",
                "order",
            ],
        ),
    ]
}
