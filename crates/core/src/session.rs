//! Editing session over one field table.
//!
//! The values read from the image are kept as an immutable snapshot so
//! `reset` is exact; every transform replaces the working copy wholesale or
//! not at all.

use rand::Rng;

use crate::config::FieldConfig;
use crate::error::{Result, ValidationError};
use crate::fields::{FieldTable, FieldValueSet};
use crate::transform::{self, ScaleFactor};

#[derive(Debug, Clone)]
pub struct EditSession {
    table: FieldTable,
    original: FieldValueSet,
    current: FieldValueSet,
}

impl EditSession {
    /// Read `table` from `image` and start a session.
    pub fn open(table: FieldTable, image: &[u8]) -> Result<Self> {
        let original = table.read(image)?;
        Ok(Self::from_values(table, original))
    }

    pub fn from_values(table: FieldTable, original: FieldValueSet) -> Self {
        let current = original.clone();
        Self { table, original, current }
    }

    pub fn table(&self) -> &FieldTable {
        &self.table
    }

    pub fn original(&self) -> &FieldValueSet {
        &self.original
    }

    pub fn current(&self) -> &FieldValueSet {
        &self.current
    }

    pub fn is_modified(&self) -> bool {
        self.original != self.current
    }

    /// Set one editable slot, rejecting values outside the field's width.
    pub fn set(&mut self, field: &str, position: usize, value: u32) -> Result<()> {
        let desc = self
            .table
            .descriptor(field)
            .ok_or_else(|| ValidationError::UnknownField(field.to_string()))?;
        let max = desc.width.max_value();
        let index = self
            .current
            .get(field)
            .and_then(|f| f.slots.get(position))
            .map(|slot| slot.index)
            .ok_or_else(|| ValidationError::UnknownSlot {
                field: field.to_string(),
                index: position,
            })?;
        if value < 1 || value > max {
            return Err(ValidationError::OutOfRange { field: field.to_string(), index, value, max }
                .into());
        }
        self.current.set(field, position, value)
    }

    /// Replace every editable value of `field`.
    pub fn replace(&mut self, field: &str, values: &[u32]) -> Result<()> {
        let mut next = self.current.clone();
        next.replace(field, values)?;
        self.current = next;
        Ok(())
    }

    pub fn scale(&mut self, factor: ScaleFactor) -> Result<()> {
        self.current = transform::scale(&self.table, &self.current, factor)?;
        Ok(())
    }

    /// Parse `input` as a scale factor and apply it. Nothing changes on a parse error.
    pub fn scale_str(&mut self, input: &str) -> Result<ScaleFactor> {
        let factor: ScaleFactor = input.parse()?;
        self.scale(factor)?;
        Ok(factor)
    }

    /// Apply one of the preset factors (`1/6`, `1/4`, `1/2`, `3/4`, `2`).
    pub fn scale_preset(&mut self, label: &str) -> Result<ScaleFactor> {
        let factor = ScaleFactor::preset(label)?;
        self.scale(factor)?;
        Ok(factor)
    }

    pub fn randomize<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        self.current = transform::randomize(&self.table, &self.current, rng)?;
        Ok(())
    }

    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        self.current = transform::shuffle(&self.table, &self.current, rng)?;
        Ok(())
    }

    /// Restore the values originally read from the image.
    pub fn reset(&mut self) {
        self.current = self.original.clone();
    }

    /// Load values from a config snapshot.
    pub fn apply_config(&mut self, config: &FieldConfig) -> Result<()> {
        self.current = config.apply_to(&self.table, &self.current)?;
        Ok(())
    }

    /// Snapshot the working values as a config.
    pub fn to_config(&self) -> FieldConfig {
        FieldConfig::from_values(&self.table, &self.current)
    }

    /// Validate and write the working values into `image`.
    pub fn commit(&self, image: &mut [u8]) -> Result<()> {
        self.table.write(image, &self.current)
    }
}
