//! Process-wide cache of per-type field tables.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use super::{Align, FieldMeta, GridRow};

static REGISTRY: OnceLock<RwLock<HashMap<TypeId, FieldTable>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<TypeId, FieldTable>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Ordered field metadata of one row type.
///
/// Cheap to clone. Single-field lookups never fail: a name that is not in
/// the table answers with [`FieldMeta::DEFAULT`] values.
#[derive(Debug, Clone)]
pub struct FieldTable {
    type_name: &'static str,
    fields: Arc<[FieldMeta]>,
}

impl FieldTable {
    fn derive<T: GridRow>() -> Self {
        Self {
            type_name: T::type_name(),
            fields: T::fields().iter().map(|f| f.meta).collect(),
        }
    }

    /// Row type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All fields, in declaration order.
    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    /// Field names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Whether the table declares `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Metadata for `name`, or the safe default.
    pub fn meta(&self, name: &str) -> FieldMeta {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .copied()
            .unwrap_or(FieldMeta::DEFAULT)
    }

    pub fn show_in_grid(&self, name: &str) -> bool {
        self.meta(name).show_in_grid
    }

    pub fn sortable(&self, name: &str) -> bool {
        self.meta(name).sortable
    }

    pub fn filterable(&self, name: &str) -> bool {
        self.meta(name).filterable
    }

    pub fn align(&self, name: &str) -> Align {
        self.meta(name).align
    }

    pub fn format(&self, name: &str) -> Option<&'static str> {
        self.meta(name).format
    }

    /// Fields with `show_in_grid` set, in declaration order.
    pub fn visible(&self) -> impl Iterator<Item = &FieldMeta> + '_ {
        self.fields.iter().filter(|f| f.show_in_grid)
    }
}

/// Global cache of field tables keyed by row type.
///
/// Tables are derived on first use and never invalidated; a type's shape is
/// fixed for the process lifetime. Reads after the first are lock-shared.
pub struct FieldRegistry;

impl FieldRegistry {
    /// Field table for `T`, deriving and caching it on first call.
    pub fn field_metadata<T: GridRow>() -> FieldTable {
        let type_id = TypeId::of::<T>();
        if let Some(table) = registry().read().get(&type_id) {
            return table.clone();
        }

        let mut map = registry().write();
        map.entry(type_id)
            .or_insert_with(|| {
                tracing::debug!(
                    target: "trellis_core::meta",
                    type_name = T::type_name(),
                    field_count = T::fields().len(),
                    "caching field table"
                );
                FieldTable::derive::<T>()
            })
            .clone()
    }

    /// Eagerly cache `T`'s table, e.g. during application startup.
    pub fn register<T: GridRow>() {
        let _ = Self::field_metadata::<T>();
    }

    /// Whether `T` already has a cached table.
    pub fn is_registered<T: GridRow>() -> bool {
        registry().read().contains_key(&TypeId::of::<T>())
    }

    /// Number of cached row types.
    pub fn type_count() -> usize {
        registry().read().len()
    }
}
