//! Column descriptors.
//!
//! A [`ColumnDescriptor`] is the read-only metadata the engine consumes for
//! each column: its semantic type, preprocessing flags, projection visibility,
//! default-value source, allowed-values set, and optional per-column hook
//! strategies. Descriptors are built once (by whatever defines the schema)
//! and shared read-only afterwards.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::types::ColumnType;
use crate::value::Value;

/// Where a column's default value comes from.
///
/// Providers are re-resolved on every read, so time-based or counter-based
/// defaults stay fresh.
#[derive(Clone)]
pub enum DefaultSource {
    /// A fixed value.
    Static(Value),
    /// A provider strategy resolved at read time.
    Provider(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultSource {
    /// Resolve the default value now.
    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            DefaultSource::Static(v) => v.clone(),
            DefaultSource::Provider(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultSource::Static(v) => f.debug_tuple("Static").field(v).finish(),
            DefaultSource::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Where a column's allowed-values set comes from.
#[derive(Clone)]
pub enum AllowedValues {
    /// A fixed set.
    Static(Vec<Value>),
    /// A provider strategy resolved at validation time.
    Provider(Arc<dyn Fn() -> Vec<Value> + Send + Sync>),
}

impl AllowedValues {
    /// Resolve the allowed set now.
    #[must_use]
    pub fn resolve(&self) -> Vec<Value> {
        match self {
            AllowedValues::Static(v) => v.clone(),
            AllowedValues::Provider(f) => f(),
        }
    }

    /// Membership check against the resolved set.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.resolve().iter().any(|v| v == value)
    }
}

impl fmt::Debug for AllowedValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowedValues::Static(v) => f.debug_tuple("Static").field(v).finish(),
            AllowedValues::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Per-column save/delete side-effect hooks.
///
/// Implementations conform to this narrow interface and are registered on the
/// descriptor; the record runs them during `save`/`delete`. Both hooks default
/// to no-ops.
pub trait ColumnHooks: Send + Sync {
    /// Runs before the column is persisted.
    fn before_save(&self, column: &str, value: Option<&Value>) -> Result<()> {
        let _ = (column, value);
        Ok(())
    }

    /// Runs before the owning row is deleted.
    fn before_delete(&self, column: &str, value: Option<&Value>) -> Result<()> {
        let _ = (column, value);
        Ok(())
    }
}

/// Read-only metadata about one column.
#[derive(Clone)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Semantic type.
    pub column_type: ColumnType,
    /// Whether NULL is a legal stored value.
    pub nullable: bool,
    /// Convert empty-string input to NULL before validation.
    pub empty_to_null: bool,
    /// Trim surrounding whitespace from text input.
    pub trim: bool,
    /// Lowercase text input.
    pub lowercase: bool,
    /// Whether this column is the primary key.
    pub primary_key: bool,
    /// Excluded from bulk fetch and wildcard projection (e.g. large blobs).
    pub heavy: bool,
    /// Excluded from projection unless explicitly requested (e.g. secrets).
    pub private: bool,
    /// Not backed by storage; value comes from defaults/hooks only.
    pub computed: bool,
    /// Default value source, if any.
    pub default: Option<DefaultSource>,
    /// Allowed-values set, if restricted.
    pub allowed: Option<AllowedValues>,
    /// Save/delete side-effect hooks, if registered.
    pub hooks: Option<Arc<dyn ColumnHooks>>,
}

impl ColumnDescriptor {
    /// Create a descriptor with minimal required data.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            empty_to_null: false,
            trim: false,
            lowercase: false,
            primary_key: false,
            heavy: false,
            private: false,
            computed: false,
            default: None,
            allowed: None,
            hooks: None,
        }
    }

    /// Mark as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Convert empty-string input to NULL before validation.
    #[must_use]
    pub fn empty_to_null(mut self) -> Self {
        self.empty_to_null = true;
        self
    }

    /// Trim surrounding whitespace from text input.
    #[must_use]
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Lowercase text input.
    #[must_use]
    pub fn lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    /// Mark as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Exclude from bulk fetch and wildcard projection.
    #[must_use]
    pub fn heavy(mut self) -> Self {
        self.heavy = true;
        self
    }

    /// Exclude from projection unless explicitly requested.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Mark as computed (no storage backing).
    #[must_use]
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// Set a static default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultSource::Static(value.into()));
        self
    }

    /// Set a provider-based default value.
    #[must_use]
    pub fn with_default_provider(
        mut self,
        provider: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        self.default = Some(DefaultSource::Provider(Arc::new(provider)));
        self
    }

    /// Restrict to a static allowed-values set.
    #[must_use]
    pub fn with_allowed(mut self, values: Vec<Value>) -> Self {
        self.allowed = Some(AllowedValues::Static(values));
        self
    }

    /// Restrict to a provider-based allowed-values set.
    #[must_use]
    pub fn with_allowed_provider(
        mut self,
        provider: impl Fn() -> Vec<Value> + Send + Sync + 'static,
    ) -> Self {
        self.allowed = Some(AllowedValues::Provider(Arc::new(provider)));
        self
    }

    /// Register save/delete hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn ColumnHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Resolve the default value, if a source is configured.
    #[must_use]
    pub fn resolve_default(&self) -> Option<Value> {
        self.default.as_ref().map(DefaultSource::resolve)
    }
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("name", &self.name)
            .field("column_type", &self.column_type)
            .field("nullable", &self.nullable)
            .field("primary_key", &self.primary_key)
            .field("heavy", &self.heavy)
            .field("private", &self.private)
            .field("computed", &self.computed)
            .field("default", &self.default)
            .field("allowed", &self.allowed)
            .field("hooks", &self.hooks.as_ref().map(|_| ".."))
            .finish()
    }
}
