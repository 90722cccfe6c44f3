//! Tree-shaped mutable values
//!
//! A [`Gene`] is a named node carrying one of the closed set of variants in
//! [`GeneKind`]. Children are owned exclusively by their parent, so a gene
//! tree never contains back-references: references that would form a cycle
//! are represented by the [`CycleGene`] sentinel and data materialized
//! elsewhere by an [`ImmutableHolderGene`] snapshot.

mod composite;
mod mutation;
mod placeholder;
mod scalar;

#[cfg(test)]
mod tests;

pub use composite::{ChoiceGene, CollectionGene, ObjectGene, OptionalGene};
pub use mutation::MutationContext;
pub use placeholder::{CycleGene, ImmutableHolderGene};
pub use scalar::{BooleanGene, DateGene, FloatGene, IntegerGene, StringGene};

use crate::error::{GeneError, GeneResult};
use crate::randomness::Randomness;
use serde::{Deserialize, Serialize};

/// Behaviour shared by every gene variant
pub trait GeneValue {
    /// Assign a random value from the domain.
    ///
    /// With `force_new_value`, the new value must differ from the previous one
    /// whenever the domain has more than one value.
    fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) -> GeneResult<()>;

    /// Local-search mutation. Always changes the value when the domain allows it.
    fn mutate(&mut self, rng: &mut Randomness, ctx: &MutationContext) -> GeneResult<()>;

    /// Weight used when selecting genes to mutate; 0 means "never select"
    fn mutation_weight(&self) -> f64;

    /// Structural value equality, independent of mutation history
    fn contains_same_value_as(&self, other: &Self) -> bool;

    /// Whether the current value lies inside the gene's domain
    fn is_locally_valid(&self) -> bool;

    /// Canonical printable value
    fn value_string(&self) -> GeneResult<String>;
}

/// The closed set of gene variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneKind {
    /// Bounded integer
    Integer(IntegerGene),
    /// Bounded floating point number
    Float(FloatGene),
    /// Boolean flag
    Boolean(BooleanGene),
    /// String with length bounds
    String(StringGene),
    /// Calendar date
    Date(DateGene),
    /// Value that may be absent
    Optional(OptionalGene),
    /// Ordered homogeneous elements
    Collection(CollectionGene),
    /// Named fixed fields
    Object(ObjectGene),
    /// One active alternative among several
    Choice(ChoiceGene),
    /// Snapshot of data materialized elsewhere; never mutated
    ImmutableHolder(ImmutableHolderGene),
    /// Detected reference cycle; cannot be materialized
    Cycle(CycleGene),
}

macro_rules! dispatch {
    ($kind:expr, $g:ident => $body:expr) => {
        match $kind {
            GeneKind::Integer($g) => $body,
            GeneKind::Float($g) => $body,
            GeneKind::Boolean($g) => $body,
            GeneKind::String($g) => $body,
            GeneKind::Date($g) => $body,
            GeneKind::Optional($g) => $body,
            GeneKind::Collection($g) => $body,
            GeneKind::Object($g) => $body,
            GeneKind::Choice($g) => $body,
            GeneKind::ImmutableHolder($g) => $body,
            GeneKind::Cycle($g) => $body,
        }
    };
}

impl GeneKind {
    /// Short name of the variant, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            GeneKind::Integer(_) => "integer",
            GeneKind::Float(_) => "float",
            GeneKind::Boolean(_) => "boolean",
            GeneKind::String(_) => "string",
            GeneKind::Date(_) => "date",
            GeneKind::Optional(_) => "optional",
            GeneKind::Collection(_) => "collection",
            GeneKind::Object(_) => "object",
            GeneKind::Choice(_) => "choice",
            GeneKind::ImmutableHolder(_) => "immutable_holder",
            GeneKind::Cycle(_) => "cycle",
        }
    }
}

impl GeneValue for GeneKind {
    fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) -> GeneResult<()> {
        dispatch!(self, g => g.randomize(rng, force_new_value))
    }

    fn mutate(&mut self, rng: &mut Randomness, ctx: &MutationContext) -> GeneResult<()> {
        dispatch!(self, g => g.mutate(rng, ctx))
    }

    fn mutation_weight(&self) -> f64 {
        dispatch!(self, g => g.mutation_weight())
    }

    fn contains_same_value_as(&self, other: &Self) -> bool {
        match (self, other) {
            (GeneKind::Integer(a), GeneKind::Integer(b)) => a.contains_same_value_as(b),
            (GeneKind::Float(a), GeneKind::Float(b)) => a.contains_same_value_as(b),
            (GeneKind::Boolean(a), GeneKind::Boolean(b)) => a.contains_same_value_as(b),
            (GeneKind::String(a), GeneKind::String(b)) => a.contains_same_value_as(b),
            (GeneKind::Date(a), GeneKind::Date(b)) => a.contains_same_value_as(b),
            (GeneKind::Optional(a), GeneKind::Optional(b)) => a.contains_same_value_as(b),
            (GeneKind::Collection(a), GeneKind::Collection(b)) => a.contains_same_value_as(b),
            (GeneKind::Object(a), GeneKind::Object(b)) => a.contains_same_value_as(b),
            (GeneKind::Choice(a), GeneKind::Choice(b)) => a.contains_same_value_as(b),
            (GeneKind::ImmutableHolder(a), GeneKind::ImmutableHolder(b)) => {
                a.contains_same_value_as(b)
            }
            (GeneKind::Cycle(a), GeneKind::Cycle(b)) => a.contains_same_value_as(b),
            _ => false,
        }
    }

    fn is_locally_valid(&self) -> bool {
        dispatch!(self, g => g.is_locally_valid())
    }

    fn value_string(&self) -> GeneResult<String> {
        dispatch!(self, g => g.value_string())
    }
}

/// A named node of a gene tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    name: String,
    mutable: bool,
    kind: GeneKind,
}

impl Gene {
    /// Wrap an already validated variant
    pub fn new(name: impl Into<String>, kind: GeneKind) -> Self {
        let mutable = !matches!(kind, GeneKind::ImmutableHolder(_) | GeneKind::Cycle(_));
        Self {
            name: name.into(),
            mutable,
            kind,
        }
    }

    /// Integer gene with value in `[min, max]`
    pub fn integer(name: impl Into<String>, value: i64, min: i64, max: i64) -> GeneResult<Self> {
        let name = name.into();
        let gene = IntegerGene::new(value, min, max).map_err(|reason| GeneError::InvalidDomain {
            name: name.clone(),
            reason,
        })?;
        Ok(Self::new(name, GeneKind::Integer(gene)))
    }

    /// Float gene with value in `[min, max]`
    pub fn float(name: impl Into<String>, value: f64, min: f64, max: f64) -> GeneResult<Self> {
        let name = name.into();
        let gene = FloatGene::new(value, min, max).map_err(|reason| GeneError::InvalidDomain {
            name: name.clone(),
            reason,
        })?;
        Ok(Self::new(name, GeneKind::Float(gene)))
    }

    /// Boolean gene
    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, GeneKind::Boolean(BooleanGene::new(value)))
    }

    /// String gene whose length stays in `[min_length, max_length]`
    pub fn string(
        name: impl Into<String>,
        value: impl Into<String>,
        min_length: usize,
        max_length: usize,
    ) -> GeneResult<Self> {
        let name = name.into();
        let gene = StringGene::new(value.into(), min_length, max_length).map_err(|reason| {
            GeneError::InvalidDomain {
                name: name.clone(),
                reason,
            }
        })?;
        Ok(Self::new(name, GeneKind::String(gene)))
    }

    /// Date gene with the year in `[min_year, max_year]`
    pub fn date(
        name: impl Into<String>,
        year: i32,
        month: u32,
        day: u32,
        min_year: i32,
        max_year: i32,
    ) -> GeneResult<Self> {
        let name = name.into();
        let gene = DateGene::new(year, month, day, min_year, max_year).map_err(|reason| {
            GeneError::InvalidDomain {
                name: name.clone(),
                reason,
            }
        })?;
        Ok(Self::new(name, GeneKind::Date(gene)))
    }

    /// Optional wrapper around `gene`
    pub fn optional(name: impl Into<String>, gene: Gene, active: bool) -> Self {
        Self::new(name, GeneKind::Optional(OptionalGene::new(gene, active)))
    }

    /// Collection of elements built from `template`
    pub fn collection(
        name: impl Into<String>,
        template: Gene,
        elements: Vec<Gene>,
        min_size: usize,
        max_size: usize,
    ) -> GeneResult<Self> {
        let name = name.into();
        let gene = CollectionGene::new(template, elements, min_size, max_size).map_err(
            |reason| GeneError::InvalidDomain {
                name: name.clone(),
                reason,
            },
        )?;
        Ok(Self::new(name, GeneKind::Collection(gene)))
    }

    /// Object with named fields; field names must be unique
    pub fn object(name: impl Into<String>, fields: Vec<Gene>) -> GeneResult<Self> {
        let name = name.into();
        let gene = ObjectGene::new(fields).map_err(|reason| GeneError::InvalidDomain {
            name: name.clone(),
            reason,
        })?;
        Ok(Self::new(name, GeneKind::Object(gene)))
    }

    /// Choice among `choices`, with `active` selected
    pub fn choice(name: impl Into<String>, choices: Vec<Gene>, active: usize) -> GeneResult<Self> {
        let name = name.into();
        let gene = ChoiceGene::new(choices, active, None).map_err(|reason| {
            GeneError::InvalidDomain {
                name: name.clone(),
                reason,
            }
        })?;
        Ok(Self::new(name, GeneKind::Choice(gene)))
    }

    /// Choice whose random selection follows `probabilities`
    pub fn weighted_choice(
        name: impl Into<String>,
        choices: Vec<Gene>,
        active: usize,
        probabilities: Vec<f64>,
    ) -> GeneResult<Self> {
        let name = name.into();
        let gene = ChoiceGene::new(choices, active, Some(probabilities)).map_err(|reason| {
            GeneError::InvalidDomain {
                name: name.clone(),
                reason,
            }
        })?;
        Ok(Self::new(name, GeneKind::Choice(gene)))
    }

    /// Snapshot of a value resolved elsewhere (e.g. a foreign key)
    pub fn immutable_holder(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            name,
            GeneKind::ImmutableHolder(ImmutableHolderGene::new(value.into())),
        )
    }

    /// Placeholder for a reference back to `target`
    pub fn cycle(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, GeneKind::Cycle(CycleGene::new(target.into())))
    }

    /// Mark this gene as immutable
    pub fn immutable(mut self) -> Self {
        self.mutable = false;
        self
    }

    /// Gene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variant data
    pub fn kind(&self) -> &GeneKind {
        &self.kind
    }

    /// Mutable variant data
    pub fn kind_mut(&mut self) -> &mut GeneKind {
        &mut self.kind
    }

    /// Whether the gene is a placeholder sentinel
    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, GeneKind::ImmutableHolder(_) | GeneKind::Cycle(_))
    }

    /// Whether the gene is the cycle sentinel
    pub fn is_cycle(&self) -> bool {
        matches!(self.kind, GeneKind::Cycle(_))
    }

    /// Mutation weight; 0 for immutable genes, placeholders and single-value domains
    pub fn mutation_weight(&self) -> f64 {
        if !self.mutable {
            return 0.0;
        }
        self.kind.mutation_weight()
    }

    /// Whether the mutator may select this gene
    pub fn is_mutable(&self) -> bool {
        self.mutation_weight() > 0.0
    }

    fn check_changeable(&self) -> GeneResult<()> {
        match self.kind {
            GeneKind::Cycle(_) => Err(GeneError::CycleMaterialization {
                name: self.name.clone(),
            }),
            GeneKind::ImmutableHolder(_) => Err(GeneError::ImmutableGene {
                name: self.name.clone(),
            }),
            _ if !self.mutable => Err(GeneError::ImmutableGene {
                name: self.name.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Randomize the value. Fails on immutable genes and placeholders.
    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) -> GeneResult<()> {
        self.check_changeable()?;
        tracing::trace!(gene = %self.name, force_new_value, "randomizing gene");
        self.kind.randomize(rng, force_new_value)
    }

    /// Apply a local-search mutation. Fails on immutable genes and placeholders.
    pub fn mutate(&mut self, rng: &mut Randomness, ctx: &MutationContext) -> GeneResult<()> {
        self.check_changeable()?;
        tracing::trace!(gene = %self.name, kind = self.kind.kind_name(), "mutating gene");
        self.kind.mutate(rng, ctx)
    }

    /// Same name, same structure and same value
    pub fn contains_same_value_as(&self, other: &Gene) -> bool {
        self.name == other.name && self.kind.contains_same_value_as(&other.kind)
    }

    /// Whether this gene and all its children satisfy their domains
    pub fn is_locally_valid(&self) -> bool {
        self.kind.is_locally_valid()
    }

    /// Canonical printable value. Cycle placeholders cannot be printed.
    pub fn value_string(&self) -> GeneResult<String> {
        if self.is_cycle() {
            return Err(GeneError::CycleMaterialization {
                name: self.name.clone(),
            });
        }
        self.kind.value_string()
    }

    /// Direct children
    pub fn children(&self) -> Vec<&Gene> {
        match &self.kind {
            GeneKind::Optional(g) => vec![g.gene()],
            GeneKind::Collection(g) => g.elements().iter().collect(),
            GeneKind::Object(g) => g.fields().iter().collect(),
            GeneKind::Choice(g) => g.choices().iter().collect(),
            _ => Vec::new(),
        }
    }

    /// This gene followed by all its descendants, depth first
    pub fn flat_view(&self) -> Vec<&Gene> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.flat_view());
        }
        out
    }

    /// Integer value, if this is an integer gene
    pub fn as_i64(&self) -> Option<i64> {
        match &self.kind {
            GeneKind::Integer(g) => Some(g.value()),
            _ => None,
        }
    }

    /// Float value, if this is a float gene
    pub fn as_f64(&self) -> Option<f64> {
        match &self.kind {
            GeneKind::Float(g) => Some(g.value()),
            _ => None,
        }
    }

    /// Boolean value, if this is a boolean gene
    pub fn as_bool(&self) -> Option<bool> {
        match &self.kind {
            GeneKind::Boolean(g) => Some(g.value()),
            _ => None,
        }
    }

    /// String value, if this is a string gene
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            GeneKind::String(g) => Some(g.value()),
            _ => None,
        }
    }

    /// Field of an object gene
    pub fn field(&self, name: &str) -> Option<&Gene> {
        match &self.kind {
            GeneKind::Object(g) => g.field(name),
            _ => None,
        }
    }

    /// Set the value of an integer gene, keeping it inside its domain
    pub fn set_i64(&mut self, value: i64) -> GeneResult<()> {
        match &mut self.kind {
            GeneKind::Integer(g) => g.set_value(value).map_err(|reason| GeneError::InvalidDomain {
                name: self.name.clone(),
                reason,
            }),
            other => Err(GeneError::TypeMismatch {
                expected: "integer".to_string(),
                found: other.kind_name().to_string(),
            }),
        }
    }
}
