//! Projections: the read-side transformation of a record into a selectable,
//! aliasable, nested output structure (the `toArray` equivalent).
//!
//! A [`Projection`] selects columns (wildcard or an explicit ordered list of
//! picks: plain names, `column -> alias` pairs, computed transforms, and a
//! wildcard-with-exclusions entry) and nests further projections per relation
//! name. Wildcard expansion follows descriptor order and skips heavy and
//! private columns; explicit picks always include them. Columns without a
//! container fall back to the descriptor default, re-resolved on every call,
//! except primary keys, which are simply absent when they hold no value.

use std::fmt;
use std::sync::Arc;

use activerow_core::{Error, Result, TableGateway, Value};

use crate::record::Record;
use crate::related::Related;

/// Computed-field strategy: receives the column's resolved value (when the
/// output name matches a column) and the owning record.
pub type Transform = Arc<dyn Fn(Option<&Value>, &Record) -> Value + Send + Sync>;

/// One entry of an explicit column selection.
#[derive(Clone)]
pub enum Pick {
    /// Project a column under its own name.
    Name(String),
    /// Project a column under a different output name.
    Alias {
        /// Source column.
        column: String,
        /// Output name.
        alias: String,
    },
    /// Project a computed value produced by a transform.
    Computed {
        /// Output name (may or may not be backed by a column).
        name: String,
        /// The transform strategy.
        transform: Transform,
    },
    /// All remaining wildcard columns, minus an exclusion list.
    Rest {
        /// Column names to leave out of the expansion.
        exclude: Vec<String>,
    },
}

impl Pick {
    /// Project a column under its own name.
    pub fn name(column: impl Into<String>) -> Self {
        Pick::Name(column.into())
    }

    /// Project a column under an alias.
    pub fn alias(column: impl Into<String>, alias: impl Into<String>) -> Self {
        Pick::Alias {
            column: column.into(),
            alias: alias.into(),
        }
    }

    /// Project a computed value.
    pub fn computed(
        name: impl Into<String>,
        transform: impl Fn(Option<&Value>, &Record) -> Value + Send + Sync + 'static,
    ) -> Self {
        Pick::Computed {
            name: name.into(),
            transform: Arc::new(transform),
        }
    }

    /// All remaining wildcard columns.
    #[must_use]
    pub fn rest() -> Self {
        Pick::Rest {
            exclude: Vec::new(),
        }
    }

    /// All remaining wildcard columns except the given names.
    #[must_use]
    pub fn rest_except(exclude: Vec<String>) -> Self {
        Pick::Rest { exclude }
    }
}

impl fmt::Debug for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pick::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Pick::Alias { column, alias } => f
                .debug_struct("Alias")
                .field("column", column)
                .field("alias", alias)
                .finish(),
            Pick::Computed { name, .. } => {
                f.debug_struct("Computed").field("name", name).finish()
            }
            Pick::Rest { exclude } => f.debug_struct("Rest").field("exclude", exclude).finish(),
        }
    }
}

/// Column selection: everything, or an explicit ordered pick list.
#[derive(Debug, Clone, Default)]
pub enum ColumnSelect {
    /// All wildcard columns in descriptor order.
    #[default]
    All,
    /// An explicit ordered list of picks.
    Columns(Vec<Pick>),
}

/// A recursive projection specification.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub(crate) columns: ColumnSelect,
    pub(crate) relations: Vec<(String, Projection)>,
    pub(crate) autoload: bool,
}

impl Projection {
    /// Project all wildcard columns.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Project an explicit ordered pick list.
    #[must_use]
    pub fn columns(picks: Vec<Pick>) -> Self {
        Self {
            columns: ColumnSelect::Columns(picks),
            relations: Vec::new(),
            autoload: false,
        }
    }

    /// Nest a projection under a relation name.
    #[must_use]
    pub fn with_relation(mut self, name: impl Into<String>, projection: Projection) -> Self {
        self.relations.push((name.into(), projection));
        self
    }

    /// Resolve unattached relations through the gateway instead of failing.
    #[must_use]
    pub fn autoload(mut self) -> Self {
        self.autoload = true;
        self
    }
}

/// A projected value: scalar, nested row, or nested collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Projected {
    /// A scalar column or computed value.
    Value(Value),
    /// A to-one relation's projected row.
    One(ProjectedRow),
    /// A to-many relation's projected rows.
    Many(Vec<ProjectedRow>),
}

impl Projected {
    /// The scalar value, if this entry is one.
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Projected::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// An ordered `(output name, projected entry)` map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectedRow {
    entries: Vec<(String, Projected)>,
}

impl ProjectedRow {
    fn push(&mut self, name: String, entry: Projected) {
        self.entries.push((name, entry));
    }

    /// Entry by output name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Projected> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entry)| entry)
    }

    /// Scalar value by output name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Projected::as_value)
    }

    /// Whether an output name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the row holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in projection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Projected)> {
        self.entries.iter().map(|(n, entry)| (n.as_str(), entry))
    }
}

impl Record {
    /// Project this record without a gateway; requesting an unattached
    /// relation fails `RelatedNotAttached` even when the projection asks for
    /// autoload.
    pub fn project(&mut self, projection: &Projection) -> Result<ProjectedRow> {
        self.project_with(projection, None)
    }

    /// Project this record, resolving autoload relations through the gateway.
    pub fn project_with(
        &mut self,
        projection: &Projection,
        mut gateway: Option<&mut (dyn TableGateway + '_)>,
    ) -> Result<ProjectedRow> {
        let mut out = ProjectedRow::default();

        match &projection.columns {
            ColumnSelect::All => self.project_wildcard(&mut out, &[]),
            ColumnSelect::Columns(picks) => {
                for pick in picks {
                    match pick {
                        Pick::Name(column) => self.project_column(&mut out, column, column)?,
                        Pick::Alias { column, alias } => {
                            self.project_column(&mut out, column, alias)?;
                        }
                        Pick::Computed { name, transform } => {
                            let current = self
                                .schema()
                                .find_column(name)
                                .map(|descriptor| self.resolve_value(descriptor));
                            let value = transform(current.as_ref(), self);
                            out.push(name.clone(), Projected::Value(value));
                        }
                        Pick::Rest { exclude } => self.project_wildcard(&mut out, exclude),
                    }
                }
            }
        }

        for (name, nested) in &projection.relations {
            self.schema().relation(name)?;
            if !self.related.is_attached(name) {
                if projection.autoload {
                    let Some(gw) = gateway.as_deref_mut() else {
                        return Err(Error::RelatedNotAttached(name.clone()));
                    };
                    self.related_autoload(name, gw)?;
                } else {
                    return Err(Error::RelatedNotAttached(name.clone()));
                }
            }
            let Some(related) = self.related.get_mut(name) else {
                return Err(Error::RelatedNotAttached(name.clone()));
            };
            let entry = match related {
                Related::One(record) => {
                    Projected::One(record.project_with(nested, gateway.as_deref_mut())?)
                }
                Related::Many(records) => {
                    let mut rows = Vec::with_capacity(records.len());
                    for record in records.iter_mut() {
                        rows.push(record.project_with(nested, gateway.as_deref_mut())?);
                    }
                    Projected::Many(rows)
                }
            };
            out.push(name.clone(), entry);
        }

        Ok(out)
    }

    /// Project one explicitly requested column. Explicit requests include
    /// heavy and private columns; a primary key with no value stays absent.
    fn project_column(&self, out: &mut ProjectedRow, column: &str, output: &str) -> Result<()> {
        let descriptor = self.schema().column(column)?;
        if descriptor.primary_key && self.container_value(column).is_none() {
            return Ok(());
        }
        let value = self.resolve_value(descriptor);
        out.push(output.to_string(), Projected::Value(value));
        Ok(())
    }

    /// Expand the wildcard: stored columns in descriptor order, skipping
    /// heavy/private columns, already-projected names, the exclusion list,
    /// primary keys without a value, and columns with neither a value nor a
    /// default source.
    fn project_wildcard(&self, out: &mut ProjectedRow, exclude: &[String]) {
        let picked: Vec<String> = self
            .schema()
            .stored_columns()
            .filter(|descriptor| !descriptor.heavy && !descriptor.private)
            .filter(|descriptor| !out.contains(&descriptor.name))
            .filter(|descriptor| !exclude.contains(&descriptor.name))
            .filter(|descriptor| {
                self.container_value(&descriptor.name).is_some() ||
                    (!descriptor.primary_key && descriptor.default.is_some())
            })
            .map(|descriptor| descriptor.name.clone())
            .collect();
        for name in picked {
            let descriptor = self.schema().find_column(&name).expect("picked from schema");
            let value = self.resolve_value(descriptor);
            out.push(name, Projected::Value(value));
        }
    }
}
