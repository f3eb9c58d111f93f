//! Derived-value transforms over a `FieldValueSet`: scaling, randomizing,
//! and shuffling. All results stay within `[1, max_for_width]`.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Result, ValidationError};
use crate::fields::{FieldTable, FieldValueSet};

/// A positive rational multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleFactor {
    numer: u64,
    denom: u64,
}

/// Longest fractional part accepted in decimal input.
const MAX_DECIMALS: u32 = 9;

impl ScaleFactor {
    pub const ONE: ScaleFactor = ScaleFactor { numer: 1, denom: 1 };

    /// Quick-pick factors offered alongside custom input.
    pub const PRESETS: [(&'static str, ScaleFactor); 5] = [
        ("1/6", ScaleFactor { numer: 1, denom: 6 }),
        ("1/4", ScaleFactor { numer: 1, denom: 4 }),
        ("1/2", ScaleFactor { numer: 1, denom: 2 }),
        ("3/4", ScaleFactor { numer: 3, denom: 4 }),
        ("2", ScaleFactor { numer: 2, denom: 1 }),
    ];

    pub fn new(numer: u64, denom: u64) -> std::result::Result<Self, ValidationError> {
        if numer == 0 || denom == 0 {
            return Err(invalid(&format!("{numer}/{denom}"), "must be greater than zero"));
        }
        let g = gcd(numer, denom);
        Ok(Self { numer: numer / g, denom: denom / g })
    }

    /// Look up one of [`Self::PRESETS`] by its label.
    pub fn preset(label: &str) -> std::result::Result<Self, ValidationError> {
        let label = label.trim();
        Self::PRESETS
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, factor)| *factor)
            .ok_or_else(|| invalid(label, "not a preset (1/6, 1/4, 1/2, 3/4, 2)"))
    }

    /// `clamp(round(value * factor), 1, max)`, rounding halves up.
    pub fn apply(&self, value: u32, max: u32) -> u32 {
        let n = value as u128 * self.numer as u128;
        let d = self.denom as u128;
        let rounded = (2 * n + d) / (2 * d);
        rounded.clamp(1, max.max(1) as u128) as u32
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

impl FromStr for ScaleFactor {
    type Err = ValidationError;

    /// Accepts a decimal (`0.5`), a fraction (`3/2`), or a percentage (`150%`).
    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(invalid(input, "empty input"));
        }
        if compact.starts_with('-') {
            return Err(invalid(input, "must be greater than zero"));
        }

        let (numer, denom) = if let Some(percent) = compact.strip_suffix('%') {
            let (n, d) = parse_decimal(percent).ok_or_else(|| invalid(input, "not a number"))?;
            (n, d.checked_mul(100).ok_or_else(|| invalid(input, "too many decimals"))?)
        } else if let Some((top, bottom)) = compact.split_once('/') {
            let (tn, td) = parse_decimal(top).ok_or_else(|| invalid(input, "not a fraction"))?;
            let (bn, bd) = parse_decimal(bottom).ok_or_else(|| invalid(input, "not a fraction"))?;
            if bn == 0 {
                return Err(invalid(input, "division by zero"));
            }
            let numer = tn.checked_mul(bd).ok_or_else(|| invalid(input, "too large"))?;
            let denom = td.checked_mul(bn).ok_or_else(|| invalid(input, "too large"))?;
            (numer, denom)
        } else {
            parse_decimal(&compact).ok_or_else(|| invalid(input, "not a number"))?
        };

        if numer == 0 {
            return Err(invalid(input, "must be greater than zero"));
        }
        let g = gcd(numer, denom);
        Ok(Self { numer: numer / g, denom: denom / g })
    }
}

/// Parse an unsigned decimal into `(numerator, 10^decimals)`.
fn parse_decimal(s: &str) -> Option<(u64, u64)> {
    let s = s.strip_prefix('+').unwrap_or(s);
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    let decimals = frac.len() as u32;
    if decimals > MAX_DECIMALS {
        return None;
    }
    let digits = format!("{whole}{frac}");
    let numer: u64 = digits.parse().ok()?;
    Some((numer, 10u64.pow(decimals)))
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}

fn invalid(input: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidScaleFactor { input: input.to_string(), reason: reason.to_string() }
}

/// Scale every value in `values` by `factor`, clamped to each field's width.
pub fn scale(
    table: &FieldTable,
    values: &FieldValueSet,
    factor: ScaleFactor,
) -> Result<FieldValueSet> {
    let mut scaled = values.clone();
    for field in scaled.fields_mut() {
        let desc = table
            .descriptor(&field.name)
            .ok_or_else(|| ValidationError::UnknownField(field.name.clone()))?;
        let max = desc.width.max_value();
        for slot in &mut field.slots {
            slot.value = factor.apply(slot.value, max);
        }
    }
    Ok(scaled)
}

/// Replace every value with a random one.
///
/// Graduated fields get a non-decreasing sequence: a small random base, then
/// random increments sized so the sequence stays under the ceiling. Other
/// fields draw uniformly from `[1, ceiling]`. The ceiling is the table's
/// random ceiling capped at the field's width maximum.
pub fn randomize<R: Rng>(
    table: &FieldTable,
    values: &FieldValueSet,
    rng: &mut R,
) -> Result<FieldValueSet> {
    let mut out = values.clone();
    for field in out.fields_mut() {
        let desc = table
            .descriptor(&field.name)
            .ok_or_else(|| ValidationError::UnknownField(field.name.clone()))?;
        let ceiling = table.random_ceiling.min(desc.width.max_value()).max(1);
        let levels = field.slots.len() as u32;

        if desc.graduated && levels > 1 {
            let mut last = rng.gen_range(1..=(ceiling / (levels + 1)).max(1));
            for (i, slot) in field.slots.iter_mut().enumerate() {
                if i > 0 {
                    let step = rng.gen_range(1..=((ceiling - last) / levels).max(1));
                    last = (last + step).min(ceiling);
                }
                slot.value = last;
            }
        } else {
            for slot in &mut field.slots {
                slot.value = rng.gen_range(1..=ceiling);
            }
        }
    }
    Ok(out)
}

/// Permute the values of each non-graduated field.
///
/// Graduated fields keep their order.
pub fn shuffle<R: Rng>(
    table: &FieldTable,
    values: &FieldValueSet,
    rng: &mut R,
) -> Result<FieldValueSet> {
    let mut out = values.clone();
    for field in out.fields_mut() {
        let desc = table
            .descriptor(&field.name)
            .ok_or_else(|| ValidationError::UnknownField(field.name.clone()))?;
        if desc.graduated {
            continue;
        }
        let mut pool = field.values();
        pool.shuffle(rng);
        for (slot, value) in field.slots.iter_mut().zip(pool) {
            slot.value = value;
        }
    }
    Ok(out)
}
