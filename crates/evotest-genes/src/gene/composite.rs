//! Composite gene variants: optional, collection, object and choice

use super::{Gene, GeneValue, MutationContext};
use crate::error::GeneResult;
use crate::randomness::Randomness;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Largest size used when randomizing a collection with a generous `max_size`
const DEFAULT_RANDOM_MAX_SIZE: usize = 5;

/// Probability of mutating the wrapped gene rather than deactivating an active optional
const PROBABILITY_OF_INNER_MUTATION: f64 = 0.8;

/// Value that may be absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionalGene {
    active: bool,
    gene: Box<Gene>,
}

impl OptionalGene {
    pub(crate) fn new(gene: Gene, active: bool) -> Self {
        // a cycle can never be materialized, so it can never be switched on
        let active = active && !gene.is_cycle();
        Self {
            active,
            gene: Box::new(gene),
        }
    }

    /// Whether the wrapped value is present
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Wrapped gene
    pub fn gene(&self) -> &Gene {
        &self.gene
    }

    /// Present/absent switch; ignored for wrapped cycle placeholders
    pub fn set_active(&mut self, active: bool) {
        self.active = active && !self.gene.is_cycle();
    }
}

impl GeneValue for OptionalGene {
    fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) -> GeneResult<()> {
        if self.gene.is_cycle() {
            self.active = false;
            return Ok(());
        }
        let previous = force_new_value.then(|| self.clone());

        self.active = rng.next_bool();
        if self.gene.is_mutable() {
            self.gene.randomize(rng, false)?;
        }

        if let Some(previous) = previous {
            if self.contains_same_value_as(&previous) {
                self.mutate(rng, &MutationContext::default())?;
            }
        }
        Ok(())
    }

    fn mutate(&mut self, rng: &mut Randomness, ctx: &MutationContext) -> GeneResult<()> {
        if self.gene.is_cycle() {
            return Ok(());
        }
        if !self.active {
            self.active = true;
            return Ok(());
        }
        if self.gene.is_mutable() && rng.next_bool_with(PROBABILITY_OF_INNER_MUTATION) {
            self.gene.mutate(rng, ctx)
        } else {
            self.active = false;
            Ok(())
        }
    }

    fn mutation_weight(&self) -> f64 {
        if self.gene.is_cycle() {
            0.0
        } else {
            1.0 + self.gene.mutation_weight()
        }
    }

    fn contains_same_value_as(&self, other: &Self) -> bool {
        self.active == other.active
            && (!self.active || self.gene.contains_same_value_as(&other.gene))
    }

    fn is_locally_valid(&self) -> bool {
        !self.active || (!self.gene.is_cycle() && self.gene.is_locally_valid())
    }

    fn value_string(&self) -> GeneResult<String> {
        if self.active {
            self.gene.value_string()
        } else {
            Ok("null".to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectionEdit {
    Add,
    Remove,
    MutateElement,
}

/// Ordered elements built from a template, with bounded size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionGene {
    template: Box<Gene>,
    elements: Vec<Gene>,
    min_size: usize,
    max_size: usize,
}

impl CollectionGene {
    pub(crate) fn new(
        template: Gene,
        elements: Vec<Gene>,
        min_size: usize,
        max_size: usize,
    ) -> Result<Self, String> {
        if template.is_cycle() {
            // elements of a cyclic type cannot exist: the collection is forced empty
            return Ok(Self {
                template: Box::new(template),
                elements: Vec::new(),
                min_size: 0,
                max_size: 0,
            });
        }
        if min_size > max_size {
            return Err(format!(
                "min size ({min_size}) is greater than max size ({max_size})"
            ));
        }
        if elements.len() < min_size || elements.len() > max_size {
            return Err(format!(
                "{} elements outside [{min_size}, {max_size}]",
                elements.len()
            ));
        }
        Ok(Self {
            template: Box::new(template),
            elements,
            min_size,
            max_size,
        })
    }

    /// Current elements
    pub fn elements(&self) -> &[Gene] {
        &self.elements
    }

    /// Template new elements are cloned from
    pub fn template(&self) -> &Gene {
        &self.template
    }

    /// Size bounds `(min, max)`
    pub fn size_bounds(&self) -> (usize, usize) {
        (self.min_size, self.max_size)
    }

    fn new_element(&self, rng: &mut Randomness) -> GeneResult<Gene> {
        let mut element = (*self.template).clone();
        if element.is_mutable() {
            element.randomize(rng, false)?;
        }
        Ok(element)
    }

    fn random_upper_size(&self) -> usize {
        self.max_size
            .min(self.min_size.max(DEFAULT_RANDOM_MAX_SIZE))
    }
}

impl GeneValue for CollectionGene {
    fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) -> GeneResult<()> {
        if self.max_size == 0 {
            return Ok(());
        }
        let previous = force_new_value.then(|| self.clone());

        let n = rng.next_usize(self.min_size, self.random_upper_size());
        let mut elements = Vec::with_capacity(n);
        for _ in 0..n {
            elements.push(self.new_element(rng)?);
        }
        self.elements = elements;

        if let Some(previous) = previous {
            if self.contains_same_value_as(&previous) {
                self.mutate(rng, &MutationContext::default())?;
            }
        }
        Ok(())
    }

    fn mutate(&mut self, rng: &mut Randomness, ctx: &MutationContext) -> GeneResult<()> {
        let mutable: Vec<usize> = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_mutable())
            .map(|(i, _)| i)
            .collect();

        let mut edits = Vec::with_capacity(3);
        if self.elements.len() < self.max_size {
            edits.push(CollectionEdit::Add);
        }
        if self.elements.len() > self.min_size {
            edits.push(CollectionEdit::Remove);
        }
        if !mutable.is_empty() {
            edits.push(CollectionEdit::MutateElement);
        }

        match rng.choose(&edits).copied() {
            Some(CollectionEdit::Add) => {
                let element = self.new_element(rng)?;
                let idx = rng.next_usize(0, self.elements.len());
                self.elements.insert(idx, element);
            }
            Some(CollectionEdit::Remove) => {
                if let Some(idx) = rng.next_index(self.elements.len()) {
                    self.elements.remove(idx);
                }
            }
            Some(CollectionEdit::MutateElement) => {
                if let Some(&idx) = rng.choose(&mutable) {
                    self.elements[idx].mutate(rng, ctx)?;
                }
            }
            None => {}
        }
        Ok(())
    }

    fn mutation_weight(&self) -> f64 {
        if self.max_size == 0 {
            return 0.0;
        }
        let resizable = self.min_size < self.max_size;
        let elements: f64 = self.elements.iter().map(Gene::mutation_weight).sum();
        if resizable {
            1.0 + elements
        } else {
            elements
        }
    }

    fn contains_same_value_as(&self, other: &Self) -> bool {
        self.elements.len() == other.elements.len()
            && self
                .elements
                .iter()
                .zip(other.elements.iter())
                .all(|(a, b)| a.contains_same_value_as(b))
    }

    fn is_locally_valid(&self) -> bool {
        self.elements.len() >= self.min_size
            && self.elements.len() <= self.max_size
            && self.elements.iter().all(Gene::is_locally_valid)
    }

    fn value_string(&self) -> GeneResult<String> {
        let values = self
            .elements
            .iter()
            .map(Gene::value_string)
            .collect::<GeneResult<Vec<_>>>()?;
        Ok(format!("[{}]", values.join(", ")))
    }
}

/// Object with named, fixed fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectGene {
    fields: Vec<Gene>,
}

impl ObjectGene {
    pub(crate) fn new(fields: Vec<Gene>) -> Result<Self, String> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(format!("duplicate field name {}", field.name()));
            }
        }
        Ok(Self { fields })
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[Gene] {
        &self.fields
    }

    /// Field by name
    pub fn field(&self, name: &str) -> Option<&Gene> {
        self.fields.iter().find(|f| f.name() == name)
    }
}

impl GeneValue for ObjectGene {
    fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) -> GeneResult<()> {
        let previous = force_new_value.then(|| self.clone());

        for field in self.fields.iter_mut().filter(|f| f.is_mutable()) {
            field.randomize(rng, false)?;
        }

        if let Some(previous) = previous {
            if self.contains_same_value_as(&previous) {
                self.mutate(rng, &MutationContext::default())?;
            }
        }
        Ok(())
    }

    fn mutate(&mut self, rng: &mut Randomness, ctx: &MutationContext) -> GeneResult<()> {
        let weights: Vec<f64> = self.fields.iter().map(Gene::mutation_weight).collect();
        match rng.choose_weighted(&weights) {
            Some(idx) => self.fields[idx].mutate(rng, ctx),
            None => Ok(()),
        }
    }

    fn mutation_weight(&self) -> f64 {
        self.fields.iter().map(Gene::mutation_weight).sum()
    }

    fn contains_same_value_as(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(other.fields.iter())
                .all(|(a, b)| a.contains_same_value_as(b))
    }

    fn is_locally_valid(&self) -> bool {
        self.fields.iter().all(Gene::is_locally_valid)
    }

    fn value_string(&self) -> GeneResult<String> {
        let mut parts = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            parts.push(format!("{:?}: {}", field.name(), field.value_string()?));
        }
        Ok(format!("{{{}}}", parts.join(", ")))
    }
}

/// One active alternative among several
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceGene {
    choices: Vec<Gene>,
    active: usize,
    probabilities: Option<Vec<f64>>,
}

impl ChoiceGene {
    pub(crate) fn new(
        choices: Vec<Gene>,
        active: usize,
        probabilities: Option<Vec<f64>>,
    ) -> Result<Self, String> {
        if choices.is_empty() {
            return Err("the list of choices cannot be empty".to_string());
        }
        if active >= choices.len() {
            return Err(format!(
                "active choice {active} must be lower than {}",
                choices.len()
            ));
        }
        if let Some(p) = &probabilities {
            if p.len() != choices.len() {
                return Err("probabilities must match the number of choices".to_string());
            }
            if p.iter().any(|w| !w.is_finite() || *w < 0.0) || p.iter().sum::<f64>() <= 0.0 {
                return Err("probabilities must be non-negative with a positive sum".to_string());
            }
        }
        Ok(Self {
            choices,
            active,
            probabilities,
        })
    }

    /// All alternatives
    pub fn choices(&self) -> &[Gene] {
        &self.choices
    }

    /// Index of the active alternative
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Active alternative
    pub fn active_gene(&self) -> &Gene {
        &self.choices[self.active]
    }

    fn switch_candidates(&self) -> Vec<usize> {
        self.choices
            .iter()
            .enumerate()
            .filter(|(i, g)| *i != self.active && !g.is_cycle())
            .map(|(i, _)| i)
            .collect()
    }
}

impl GeneValue for ChoiceGene {
    fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) -> GeneResult<()> {
        let previous = force_new_value.then(|| self.clone());

        let selectable: Vec<f64> = self
            .choices
            .iter()
            .enumerate()
            .map(|(i, g)| {
                if g.is_cycle() {
                    0.0
                } else {
                    self.probabilities.as_ref().map_or(1.0, |p| p[i])
                }
            })
            .collect();
        if let Some(idx) = rng.choose_weighted(&selectable) {
            self.active = idx;
        }

        let gene = &mut self.choices[self.active];
        if gene.is_mutable() {
            gene.randomize(rng, false)?;
        }

        if let Some(previous) = previous {
            if self.contains_same_value_as(&previous) {
                self.mutate(rng, &MutationContext::default())?;
            }
        }
        Ok(())
    }

    fn mutate(&mut self, rng: &mut Randomness, ctx: &MutationContext) -> GeneResult<()> {
        let candidates = self.switch_candidates();
        let active_mutable = self.choices[self.active].is_mutable();

        if !candidates.is_empty() && (!active_mutable || rng.next_bool()) {
            if let Some(&idx) = rng.choose(&candidates) {
                self.active = idx;
            }
            Ok(())
        } else if active_mutable {
            self.choices[self.active].mutate(rng, ctx)
        } else {
            Ok(())
        }
    }

    fn mutation_weight(&self) -> f64 {
        let switch = if self.switch_candidates().is_empty() {
            0.0
        } else {
            1.0
        };
        switch + self.choices[self.active].mutation_weight()
    }

    fn contains_same_value_as(&self, other: &Self) -> bool {
        self.active == other.active
            && self.choices.len() == other.choices.len()
            && self.choices[self.active].contains_same_value_as(&other.choices[other.active])
    }

    fn is_locally_valid(&self) -> bool {
        self.active < self.choices.len()
            && !self.choices[self.active].is_cycle()
            && self.choices[self.active].is_locally_valid()
    }

    fn value_string(&self) -> GeneResult<String> {
        self.choices[self.active].value_string()
    }
}
