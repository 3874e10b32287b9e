//! List — the collection descriptor queries are built against.
//!
//! Supplies collection identity (optionally per environment), the field
//! mapping used to decode raw records into entities, the generated view-field
//! projection, and the list-wide permission slot that is set at most once
//! from the first fetched record.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::error::{ConfigError, DecodeError};
use crate::permissions::{self, UserPermissions};
use crate::types::{Entity, EntityId, RawRecord};

/// Maps one raw field name onto the name the application uses.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Field name as the remote source returns it.
    pub static_name: String,
    /// Field name entities carry after decoding.
    pub mapped_name: String,
    pub read_only: bool,
}

impl FieldDefinition {
    pub fn new(static_name: &str, mapped_name: &str, read_only: bool) -> Self {
        Self {
            static_name: static_name.to_string(),
            mapped_name: mapped_name.to_string(),
            read_only,
        }
    }
}

/// Read-only fields present on every list, merged ahead of custom fields.
pub fn default_fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("ID", "id", true),
        FieldDefinition::new("Modified", "modified", true),
        FieldDefinition::new("Created", "created", true),
        FieldDefinition::new("Author", "author", true),
        FieldDefinition::new("Editor", "editor", true),
        FieldDefinition::new("PermMask", "permMask", true),
        FieldDefinition::new("UniqueId", "uniqueId", true),
        FieldDefinition::new("FileRef", "fileRef", true),
    ]
}

/// Construction parameters for a `List`.
#[derive(Debug, Clone, Default)]
pub struct ListConfig {
    pub title: String,
    /// Collection id used when `environments` has no entry for the active
    /// environment name "production".
    pub guid: String,
    /// Per-environment collection ids. Defaults to `{production: guid}`.
    pub environments: HashMap<String, String>,
    /// Application fields merged after the defaults.
    pub custom_fields: Vec<FieldDefinition>,
    /// Overrides the deployment-wide service URL for this list.
    pub web_url: Option<String>,
}

#[derive(Debug)]
pub struct List {
    pub title: String,
    environments: HashMap<String, String>,
    /// static name -> mapped name
    mapping: HashMap<String, String>,
    view_fields: String,
    web_url: Option<String>,
    /// Set at most once from the first fetched record, immutable afterwards.
    permissions: RwLock<Option<UserPermissions>>,
    /// Completion time of the most recent cycle against this list.
    last_server_update: RwLock<Option<DateTime<Utc>>>,
}

impl List {
    pub fn new(config: ListConfig) -> Self {
        let mut environments = config.environments;
        if environments.is_empty() {
            environments.insert("production".to_string(), config.guid.clone());
        }

        let mut fields = default_fields();
        fields.extend(config.custom_fields);

        let mut mapping = HashMap::new();
        let mut view_fields = String::from("<ViewFields>");
        for field in &fields {
            mapping.insert(field.static_name.clone(), field.mapped_name.clone());
            view_fields.push_str(&format!("<FieldRef Name=\"{}\"/>", field.static_name));
        }
        view_fields.push_str("</ViewFields>");

        Self {
            title: config.title,
            environments,
            mapping,
            view_fields,
            web_url: config.web_url,
            permissions: RwLock::new(None),
            last_server_update: RwLock::new(None),
        }
    }

    /// Resolve the collection id for the active environment.
    pub fn list_id(&self, environment: &str) -> Result<String, ConfigError> {
        self.environments
            .get(environment)
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnvironment {
                environment: environment.to_string(),
                list: self.title.clone(),
            })
    }

    /// The generated field projection requested on every fetch.
    pub fn view_fields(&self) -> &str {
        &self.view_fields
    }

    /// The service URL for this list, falling back to the supplied default.
    pub fn identify_web_url(&self, default_url: Option<&str>) -> Option<String> {
        self.web_url
            .clone()
            .or_else(|| default_url.map(str::to_string))
    }

    /// Decode a raw record into an entity.
    ///
    /// Keys present in the field mapping are renamed to their mapped names;
    /// unknown keys pass through unchanged, so records captured in snapshots
    /// (already mapped) decode identically to fresh remote records.
    pub fn decode(&self, raw: &RawRecord) -> Result<Entity, DecodeError> {
        let mut fields = Map::new();
        for (key, value) in raw {
            let name = self.mapping.get(key).map(String::as_str).unwrap_or(key);
            fields.insert(name.to_string(), value.clone());
        }

        let id = fields
            .get("id")
            .and_then(value_to_id)
            .ok_or(DecodeError::MissingId)?;
        let version = fields
            .get("version")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32;
        let perm_mask = fields
            .get("permMask")
            .and_then(Value::as_str)
            .and_then(permissions::parse_mask);

        Ok(Entity {
            id,
            version,
            perm_mask,
            fields,
        })
    }

    pub fn permissions(&self) -> Option<UserPermissions> {
        *self.permissions.read()
    }

    /// Resolve and store list permissions from a fetched entity's mask.
    ///
    /// First writer wins; later calls are ignored so the resolved state stays
    /// immutable for the life of the descriptor.
    pub fn extend_permissions_from_entity(&self, entity: &Entity) {
        let Some(mask) = entity.perm_mask else {
            return;
        };
        self.extend_permissions_from_mask(mask);
    }

    /// Resolve and store list permissions from the effective-perm-mask name
    /// carried on a change response's list element. Unknown names are logged
    /// and ignored. Same set-once rule as the entity path.
    pub fn extend_permissions_from_mask_name(&self, name: &str) {
        match permissions::mask_for_name(name) {
            Some(mask) => self.extend_permissions_from_mask(mask),
            None => {
                tracing::warn!(list = %self.title, name, "unknown effective-perm-mask name");
            }
        }
    }

    fn extend_permissions_from_mask(&self, mask: u64) {
        let mut slot = self.permissions.write();
        if slot.is_none() {
            *slot = Some(permissions::resolve(mask));
        }
    }

    pub fn last_server_update(&self) -> Option<DateTime<Utc>> {
        *self.last_server_update.read()
    }

    pub fn set_last_server_update(&self, when: DateTime<Utc>) {
        *self.last_server_update.write() = Some(when);
    }
}

fn value_to_id(value: &Value) -> Option<EntityId> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| EntityId::try_from(n).ok()),
        Value::String(s) => s.parse::<EntityId>().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
