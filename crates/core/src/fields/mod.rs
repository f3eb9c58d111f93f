//! Fixed-offset little-endian integer tables inside an image.
//!
//! A table is a list of named descriptors (offset, element width, element
//! count). Reading produces a `FieldValueSet`; writing validates the whole
//! set before touching a single byte.
//!
//! Slots whose raw value is zero are treated as unused and left out of the
//! value set. Since the minimum writable value is 1, a zero slot could never
//! be written back anyway, and skipped slots are never touched on write.

mod tables;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result, ValidationError};
use crate::variant::Variant;

/// Element width in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldWidth {
    /// 1 byte.
    Byte,
    /// 2 bytes, little-endian.
    Half,
}

impl FieldWidth {
    pub fn bytes(self) -> usize {
        match self {
            FieldWidth::Byte => 1,
            FieldWidth::Half => 2,
        }
    }

    /// Largest value representable in this width.
    pub fn max_value(self) -> u32 {
        match self {
            FieldWidth::Byte => u8::MAX as u32,
            FieldWidth::Half => u16::MAX as u32,
        }
    }

    fn decode(self, bytes: &[u8]) -> u32 {
        match self {
            FieldWidth::Byte => bytes[0] as u32,
            FieldWidth::Half => u16::from_le_bytes([bytes[0], bytes[1]]) as u32,
        }
    }

    fn encode(self, value: u32, out: &mut [u8]) {
        match self {
            FieldWidth::Byte => out[0] = value as u8,
            FieldWidth::Half => out.copy_from_slice(&(value as u16).to_le_bytes()),
        }
    }
}

/// Static description of one named field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    /// Noun used to label slots that have no explicit label (e.g. "Elf Cost").
    pub unit: &'static str,
    pub offset: usize,
    pub width: FieldWidth,
    pub count: usize,
    /// Values must be non-decreasing across slots.
    pub graduated: bool,
    /// Optional per-slot labels.
    pub labels: &'static [&'static str],
}

impl FieldDescriptor {
    /// Total number of bytes covered by the field.
    pub fn byte_len(&self) -> usize {
        self.width.bytes() * self.count
    }

    pub fn slot_offset(&self, index: usize) -> usize {
        self.offset + index * self.width.bytes()
    }

    /// Human-readable label for a slot.
    pub fn label(&self, index: usize) -> String {
        match self.labels.get(index) {
            Some(label) => label.to_string(),
            None => format!("{} {}", self.unit, index + 1),
        }
    }

    fn check_bounds(&self, image_len: usize) -> Result<()> {
        let len = self.byte_len();
        match self.offset.checked_add(len) {
            Some(end) if end <= image_len => Ok(()),
            _ => Err(PatchError::OffsetOutOfRange { offset: self.offset, len, image_len }),
        }
    }
}

/// The kinds of editable tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldTableKind {
    /// Cyber-elf costs (Croire levels in Zero 4).
    CyberElfCosts,
    /// Per-level weapon experience thresholds.
    WeaponExp,
}

impl FieldTableKind {
    pub const ALL: [FieldTableKind; 2] = [FieldTableKind::CyberElfCosts, FieldTableKind::WeaponExp];

    pub fn slug(self) -> &'static str {
        match self {
            FieldTableKind::CyberElfCosts => "cyber-elf-costs",
            FieldTableKind::WeaponExp => "weapon-exp",
        }
    }

    /// Stem used in default config file names.
    pub fn config_stem(self) -> &'static str {
        match self {
            FieldTableKind::CyberElfCosts => "cyberelf",
            FieldTableKind::WeaponExp => "weaponexp",
        }
    }
}

impl fmt::Display for FieldTableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for FieldTableKind {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "cyber-elf-costs" | "elf-costs" | "elves" | "croire" | "croire-levels" => {
                Ok(FieldTableKind::CyberElfCosts)
            }
            "weapon-exp" | "weapons" | "exp" => Ok(FieldTableKind::WeaponExp),
            _ => Err(PatchError::UnknownTableKind(s.to_string())),
        }
    }
}

/// A variant's descriptor table of one kind.
#[derive(Debug, Clone, Copy)]
pub struct FieldTable {
    pub variant: Variant,
    pub kind: FieldTableKind,
    pub descriptors: &'static [FieldDescriptor],
    /// Upper bound used when generating random values.
    pub random_ceiling: u32,
}

/// One populated slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSlot {
    /// Slot index within the descriptor (0-based).
    pub index: usize,
    pub value: u32,
}

/// Populated slots of one field, in slot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValues {
    pub name: String,
    pub slots: Vec<FieldSlot>,
}

impl FieldValues {
    pub fn values(&self) -> Vec<u32> {
        self.slots.iter().map(|s| s.value).collect()
    }
}

/// Current values of a table, keyed by field name in descriptor order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValueSet {
    fields: Vec<FieldValues>,
}

impl FieldValueSet {
    pub fn new(fields: Vec<FieldValues>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldValues] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [FieldValues] {
        &mut self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldValues> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValues> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Values of `name` in slot order.
    pub fn values(&self, name: &str) -> Option<Vec<u32>> {
        self.get(name).map(FieldValues::values)
    }

    /// Total number of editable slots.
    pub fn slot_count(&self) -> usize {
        self.fields.iter().map(|f| f.slots.len()).sum()
    }

    /// Set the value at `position` (index into the editable slots of `name`).
    ///
    /// No range check here; `FieldTable::write` validates before committing.
    pub fn set(&mut self, name: &str, position: usize, value: u32) -> Result<()> {
        let field =
            self.get_mut(name).ok_or_else(|| ValidationError::UnknownField(name.to_string()))?;
        let slot = field.slots.get_mut(position).ok_or_else(|| ValidationError::UnknownSlot {
            field: name.to_string(),
            index: position,
        })?;
        slot.value = value;
        Ok(())
    }

    /// Replace every editable value of `name`, keeping slot indices.
    pub fn replace(&mut self, name: &str, values: &[u32]) -> Result<()> {
        let field =
            self.get_mut(name).ok_or_else(|| ValidationError::UnknownField(name.to_string()))?;
        if field.slots.len() != values.len() {
            return Err(ValidationError::CountMismatch {
                field: name.to_string(),
                expected: field.slots.len(),
                found: values.len(),
            }
            .into());
        }
        for (slot, value) in field.slots.iter_mut().zip(values) {
            slot.value = *value;
        }
        Ok(())
    }
}

impl FieldTable {
    /// Look up the table of `kind` for `variant`.
    pub fn for_variant(variant: Variant, kind: FieldTableKind) -> Result<Self> {
        use tables::*;

        let (descriptors, random_ceiling): (&'static [FieldDescriptor], u32) = match (variant, kind)
        {
            (Variant::Zero1, FieldTableKind::CyberElfCosts) => {
                (&ZERO1_ELF_COSTS, ELF_COSTS_RANDOM_CEILING)
            }
            (Variant::Zero2, FieldTableKind::CyberElfCosts) => {
                (&ZERO2_ELF_COSTS, ELF_COSTS_RANDOM_CEILING)
            }
            (Variant::Zero3, FieldTableKind::CyberElfCosts) => {
                (&ZERO3_ELF_COSTS, ELF_COSTS_RANDOM_CEILING)
            }
            (Variant::Zero4, FieldTableKind::CyberElfCosts) => {
                (&ZERO4_CROIRE_LEVELS, ELF_COSTS_RANDOM_CEILING)
            }
            (Variant::Zero1, FieldTableKind::WeaponExp) => {
                (&ZERO1_WEAPON_EXP, WEAPON_EXP_RANDOM_CEILING)
            }
            (Variant::Zero2, FieldTableKind::WeaponExp) => {
                (&ZERO2_WEAPON_EXP, WEAPON_EXP_RANDOM_CEILING)
            }
            _ => {
                return Err(PatchError::UnknownTable {
                    table: kind.to_string(),
                    variant: variant.display_name().to_string(),
                })
            }
        };

        Ok(Self { variant, kind, descriptors, random_ceiling })
    }

    /// Build a table from explicit descriptors.
    pub fn custom(
        variant: Variant,
        kind: FieldTableKind,
        descriptors: &'static [FieldDescriptor],
        random_ceiling: u32,
    ) -> Self {
        Self { variant, kind, descriptors, random_ceiling }
    }

    pub fn descriptor(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Read every descriptor, skipping slots whose raw value is zero.
    pub fn read(&self, image: &[u8]) -> Result<FieldValueSet> {
        let mut fields = Vec::with_capacity(self.descriptors.len());
        for desc in self.descriptors {
            desc.check_bounds(image.len())?;
            let width = desc.width.bytes();
            let slots = (0..desc.count)
                .map(|index| {
                    let at = desc.slot_offset(index);
                    FieldSlot { index, value: desc.width.decode(&image[at..at + width]) }
                })
                .filter(|slot| slot.value != 0)
                .collect();
            fields.push(FieldValues { name: desc.name.to_string(), slots });
        }
        Ok(FieldValueSet::new(fields))
    }

    /// Check every value in `values` without writing anything.
    pub fn validate(&self, values: &FieldValueSet, image_len: usize) -> Result<()> {
        for field in values.fields() {
            let desc = self
                .descriptor(&field.name)
                .ok_or_else(|| ValidationError::UnknownField(field.name.clone()))?;
            desc.check_bounds(image_len)?;

            let max = desc.width.max_value();
            let mut previous: Option<u32> = None;
            for slot in &field.slots {
                if slot.index >= desc.count {
                    return Err(ValidationError::UnknownSlot {
                        field: field.name.clone(),
                        index: slot.index,
                    }
                    .into());
                }
                if slot.value < 1 || slot.value > max {
                    return Err(ValidationError::OutOfRange {
                        field: field.name.clone(),
                        index: slot.index,
                        value: slot.value,
                        max,
                    }
                    .into());
                }
                if desc.graduated {
                    if let Some(prev) = previous {
                        if slot.value < prev {
                            return Err(ValidationError::Decreasing {
                                field: field.name.clone(),
                                index: slot.index,
                                value: slot.value,
                                previous: prev,
                            }
                            .into());
                        }
                    }
                }
                previous = Some(slot.value);
            }
        }
        Ok(())
    }

    /// Validate `values` and write them into `image`.
    ///
    /// Nothing is written unless every field passes validation.
    pub fn write(&self, image: &mut [u8], values: &FieldValueSet) -> Result<()> {
        self.validate(values, image.len())?;
        for field in values.fields() {
            let Some(desc) = self.descriptor(&field.name) else {
                continue;
            };
            let width = desc.width.bytes();
            for slot in &field.slots {
                let at = desc.slot_offset(slot.index);
                desc.width.encode(slot.value, &mut image[at..at + width]);
            }
        }
        Ok(())
    }
}
