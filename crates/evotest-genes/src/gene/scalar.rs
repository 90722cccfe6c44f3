//! Scalar gene variants

use super::{GeneValue, MutationContext};
use crate::error::GeneResult;
use crate::randomness::Randomness;
use serde::{Deserialize, Serialize};

/// Upper bound on the length of randomly generated strings beyond `min_length`
const MAX_RANDOM_STRING_EXTRA: usize = 16;

/// Bounded integer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegerGene {
    value: i64,
    min: i64,
    max: i64,
}

impl IntegerGene {
    pub(crate) fn new(value: i64, min: i64, max: i64) -> Result<Self, String> {
        if min > max {
            return Err(format!("min ({min}) is greater than max ({max})"));
        }
        if value < min || value > max {
            return Err(format!("value {value} outside [{min}, {max}]"));
        }
        Ok(Self { value, min, max })
    }

    /// Current value
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Lower bound (inclusive)
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Upper bound (inclusive)
    pub fn max(&self) -> i64 {
        self.max
    }

    pub(crate) fn set_value(&mut self, value: i64) -> Result<(), String> {
        if value < self.min || value > self.max {
            return Err(format!("value {value} outside [{}, {}]", self.min, self.max));
        }
        self.value = value;
        Ok(())
    }
}

impl GeneValue for IntegerGene {
    fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) -> GeneResult<()> {
        if self.min == self.max {
            self.value = self.min;
            return Ok(());
        }
        let previous = self.value;
        loop {
            let candidate = rng.next_i64(self.min, self.max);
            if !force_new_value || candidate != previous {
                self.value = candidate;
                return Ok(());
            }
        }
    }

    fn mutate(&mut self, rng: &mut Randomness, ctx: &MutationContext) -> GeneResult<()> {
        if self.min >= self.max {
            return Ok(());
        }
        if rng.next_bool_with(ctx.probability_of_randomization) {
            return self.randomize(rng, true);
        }

        let range = (self.max as i128 - self.min as i128).min(u64::MAX as i128) as u64;
        let delta = ctx.numeric_delta(rng, range) as i128;
        let value = self.value as i128;

        // move toward the side that has room, so clamping cannot undo the step
        let up = if value >= self.max as i128 {
            false
        } else if value <= self.min as i128 {
            true
        } else {
            rng.next_bool()
        };
        let next = if up { value + delta } else { value - delta };
        self.value = next.clamp(self.min as i128, self.max as i128) as i64;
        Ok(())
    }

    fn mutation_weight(&self) -> f64 {
        if self.min < self.max {
            1.0
        } else {
            0.0
        }
    }

    fn contains_same_value_as(&self, other: &Self) -> bool {
        self.value == other.value
    }

    fn is_locally_valid(&self) -> bool {
        self.min <= self.value && self.value <= self.max
    }

    fn value_string(&self) -> GeneResult<String> {
        Ok(self.value.to_string())
    }
}

/// Bounded floating point number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatGene {
    value: f64,
    min: f64,
    max: f64,
}

impl FloatGene {
    pub(crate) fn new(value: f64, min: f64, max: f64) -> Result<Self, String> {
        if !min.is_finite() || !max.is_finite() {
            return Err("bounds must be finite".to_string());
        }
        if min > max {
            return Err(format!("min ({min}) is greater than max ({max})"));
        }
        if !value.is_finite() || value < min || value > max {
            return Err(format!("value {value} outside [{min}, {max}]"));
        }
        Ok(Self { value, min, max })
    }

    /// Current value
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl GeneValue for FloatGene {
    fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) -> GeneResult<()> {
        if self.min >= self.max {
            self.value = self.min;
            return Ok(());
        }
        let previous = self.value;
        loop {
            let candidate = rng.next_f64_range(self.min, self.max);
            if !force_new_value || candidate != previous {
                self.value = candidate;
                return Ok(());
            }
        }
    }

    fn mutate(&mut self, rng: &mut Randomness, ctx: &MutationContext) -> GeneResult<()> {
        if self.min >= self.max {
            return Ok(());
        }
        if rng.next_bool_with(ctx.probability_of_randomization) {
            return self.randomize(rng, true);
        }

        let range = self.max - self.min;
        let delta = if range < 1.0 {
            range * (0.5 + rng.next_f64() * 0.5)
        } else {
            ctx.numeric_delta(rng, range.floor().min(u64::MAX as f64) as u64) as f64
        };

        let up = if self.value >= self.max {
            false
        } else if self.value <= self.min {
            true
        } else {
            rng.next_bool()
        };
        // Large magnitudes can absorb a small step, so widen it until the
        // value moves
        let previous = self.value;
        let mut step = delta;
        loop {
            let next = if up { previous + step } else { previous - step };
            self.value = next.clamp(self.min, self.max);
            if self.value != previous {
                return Ok(());
            }
            if step >= range {
                return self.randomize(rng, true);
            }
            step *= 2.0;
        }
    }

    fn mutation_weight(&self) -> f64 {
        if self.min < self.max {
            1.0
        } else {
            0.0
        }
    }

    fn contains_same_value_as(&self, other: &Self) -> bool {
        self.value == other.value
    }

    fn is_locally_valid(&self) -> bool {
        self.value.is_finite() && self.min <= self.value && self.value <= self.max
    }

    fn value_string(&self) -> GeneResult<String> {
        Ok(self.value.to_string())
    }
}

/// Boolean flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanGene {
    value: bool,
}

impl BooleanGene {
    pub(crate) fn new(value: bool) -> Self {
        Self { value }
    }

    /// Current value
    pub fn value(&self) -> bool {
        self.value
    }
}

impl GeneValue for BooleanGene {
    fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) -> GeneResult<()> {
        self.value = if force_new_value {
            !self.value
        } else {
            rng.next_bool()
        };
        Ok(())
    }

    fn mutate(&mut self, _rng: &mut Randomness, _ctx: &MutationContext) -> GeneResult<()> {
        self.value = !self.value;
        Ok(())
    }

    fn mutation_weight(&self) -> f64 {
        1.0
    }

    fn contains_same_value_as(&self, other: &Self) -> bool {
        self.value == other.value
    }

    fn is_locally_valid(&self) -> bool {
        true
    }

    fn value_string(&self) -> GeneResult<String> {
        Ok(self.value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringEdit {
    Change,
    Insert,
    Remove,
}

/// String with length bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringGene {
    value: String,
    min_length: usize,
    max_length: usize,
}

impl StringGene {
    pub(crate) fn new(value: String, min_length: usize, max_length: usize) -> Result<Self, String> {
        if min_length > max_length {
            return Err(format!(
                "min length ({min_length}) is greater than max length ({max_length})"
            ));
        }
        let len = value.chars().count();
        if len < min_length || len > max_length {
            return Err(format!(
                "length {len} outside [{min_length}, {max_length}]"
            ));
        }
        Ok(Self {
            value,
            min_length,
            max_length,
        })
    }

    /// Current value
    pub fn value(&self) -> &str {
        &self.value
    }

    fn random_upper_length(&self) -> usize {
        self.max_length
            .min(self.min_length.saturating_add(MAX_RANDOM_STRING_EXTRA))
    }
}

impl GeneValue for StringGene {
    fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) -> GeneResult<()> {
        if self.max_length == 0 {
            self.value.clear();
            return Ok(());
        }
        let upper = self.random_upper_length();
        loop {
            let candidate = rng.next_word(self.min_length, upper);
            if !force_new_value || candidate != self.value {
                self.value = candidate;
                return Ok(());
            }
        }
    }

    fn mutate(&mut self, rng: &mut Randomness, ctx: &MutationContext) -> GeneResult<()> {
        if self.max_length == 0 {
            return Ok(());
        }
        if rng.next_bool_with(ctx.probability_of_randomization) {
            return self.randomize(rng, true);
        }

        let mut chars: Vec<char> = self.value.chars().collect();
        let mut edits = Vec::with_capacity(3);
        if !chars.is_empty() {
            edits.push(StringEdit::Change);
        }
        if chars.len() < self.max_length {
            edits.push(StringEdit::Insert);
        }
        if chars.len() > self.min_length {
            edits.push(StringEdit::Remove);
        }

        match rng.choose(&edits).copied() {
            Some(StringEdit::Change) => {
                if let Some(idx) = rng.next_index(chars.len()) {
                    chars[idx] = rng.next_char_except(chars[idx]);
                }
            }
            Some(StringEdit::Insert) => {
                let idx = rng.next_usize(0, chars.len());
                chars.insert(idx, rng.next_char());
            }
            Some(StringEdit::Remove) => {
                if let Some(idx) = rng.next_index(chars.len()) {
                    chars.remove(idx);
                }
            }
            None => return self.randomize(rng, true),
        }
        self.value = chars.into_iter().collect();
        Ok(())
    }

    fn mutation_weight(&self) -> f64 {
        if self.max_length > 0 {
            1.0
        } else {
            0.0
        }
    }

    fn contains_same_value_as(&self, other: &Self) -> bool {
        self.value == other.value
    }

    fn is_locally_valid(&self) -> bool {
        let len = self.value.chars().count();
        self.min_length <= len && len <= self.max_length
    }

    fn value_string(&self) -> GeneResult<String> {
        Ok(format!("{:?}", self.value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateField {
    Year,
    Month,
    Day,
}

/// Calendar date with a bounded year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateGene {
    year: i32,
    month: u32,
    day: u32,
    min_year: i32,
    max_year: i32,
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

impl DateGene {
    pub(crate) fn new(
        year: i32,
        month: u32,
        day: u32,
        min_year: i32,
        max_year: i32,
    ) -> Result<Self, String> {
        if min_year > max_year {
            return Err(format!(
                "min year ({min_year}) is greater than max year ({max_year})"
            ));
        }
        let gene = Self {
            year,
            month,
            day,
            min_year,
            max_year,
        };
        if !gene.is_locally_valid() {
            return Err(format!("invalid date {year:04}-{month:02}-{day:02}"));
        }
        Ok(gene)
    }

    /// Year, month and day
    pub fn ymd(&self) -> (i32, u32, u32) {
        (self.year, self.month, self.day)
    }

    fn clamp_day(&mut self) {
        let dim = days_in_month(self.year, self.month);
        if self.day > dim {
            self.day = dim;
        }
    }
}

impl GeneValue for DateGene {
    fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) -> GeneResult<()> {
        let previous = self.ymd();
        loop {
            self.year = rng.next_i64(self.min_year as i64, self.max_year as i64) as i32;
            self.month = rng.next_usize(1, 12) as u32;
            let dim = days_in_month(self.year, self.month);
            self.day = rng.next_usize(1, dim as usize) as u32;
            if !force_new_value || self.ymd() != previous {
                return Ok(());
            }
        }
    }

    fn mutate(&mut self, rng: &mut Randomness, ctx: &MutationContext) -> GeneResult<()> {
        if rng.next_bool_with(ctx.probability_of_randomization) {
            return self.randomize(rng, true);
        }

        let mut fields = vec![DateField::Month, DateField::Day];
        if self.min_year < self.max_year {
            fields.push(DateField::Year);
        }

        match rng.choose(&fields).copied() {
            Some(DateField::Year) => {
                let up = if self.year >= self.max_year {
                    false
                } else if self.year <= self.min_year {
                    true
                } else {
                    rng.next_bool()
                };
                self.year = if up { self.year + 1 } else { self.year - 1 };
                self.clamp_day();
            }
            Some(DateField::Month) => {
                self.month = if rng.next_bool() {
                    self.month % 12 + 1
                } else {
                    (self.month + 10) % 12 + 1
                };
                self.clamp_day();
            }
            Some(DateField::Day) => {
                let dim = days_in_month(self.year, self.month);
                self.day = if rng.next_bool() {
                    self.day % dim + 1
                } else {
                    (self.day + dim - 2) % dim + 1
                };
            }
            None => {}
        }
        Ok(())
    }

    fn mutation_weight(&self) -> f64 {
        1.0
    }

    fn contains_same_value_as(&self, other: &Self) -> bool {
        self.ymd() == other.ymd()
    }

    fn is_locally_valid(&self) -> bool {
        self.min_year <= self.year
            && self.year <= self.max_year
            && (1..=12).contains(&self.month)
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
    }

    fn value_string(&self) -> GeneResult<String> {
        Ok(format!(
            "{:04}-{:02}-{:02}",
            self.year, self.month, self.day
        ))
    }
}
