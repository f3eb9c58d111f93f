//! Field layouts for each variant.

use super::{FieldDescriptor, FieldWidth};

const fn costs(
    name: &'static str,
    unit: &'static str,
    offset: usize,
    count: usize,
) -> FieldDescriptor {
    FieldDescriptor {
        name,
        unit,
        offset,
        width: FieldWidth::Half,
        count,
        graduated: false,
        labels: &[],
    }
}

const fn levels(
    name: &'static str,
    offset: usize,
    labels: &'static [&'static str],
) -> FieldDescriptor {
    FieldDescriptor {
        name,
        unit: "Level",
        offset,
        width: FieldWidth::Half,
        count: labels.len(),
        graduated: true,
        labels,
    }
}

const fn upgrade(name: &'static str, offset: usize) -> FieldDescriptor {
    FieldDescriptor {
        name,
        unit: "Level",
        offset,
        width: FieldWidth::Byte,
        count: 1,
        graduated: true,
        labels: &[],
    }
}

pub(super) const ELF_COSTS_RANDOM_CEILING: u32 = 4000;
pub(super) const WEAPON_EXP_RANDOM_CEILING: u32 = 2000;

pub(super) static ZERO1_ELF_COSTS: [FieldDescriptor; 1] =
    [costs("Elf Costs", "Elf Cost", 0x2B727C, 16)];
pub(super) static ZERO2_ELF_COSTS: [FieldDescriptor; 1] =
    [costs("Elf Costs", "Elf Cost", 0x34A5C8, 15)];
pub(super) static ZERO3_ELF_COSTS: [FieldDescriptor; 1] =
    [costs("Elf Costs", "Elf Cost", 0x36E2C4, 36)];
pub(super) static ZERO4_CROIRE_LEVELS: [FieldDescriptor; 1] =
    [costs("Croire Levels", "Croire Level", 0x886198, 7)];

const BUSTER: &[&str] = &["Charged Buster", "Faster Charge"];
const SABER: &[&str] = &["Second Slash", "Third Slash", "Charged Saber", "Faster Charge"];
const TRIPLE_ROD: &[&str] = &["Second Stab", "Third Stab", "Charged Rod", "Faster Charge"];
const CHAIN_ROD: &[&str] = &["Charged Rod", "Faster Charge"];
const BOOMERANG: &[&str] = &["Farther Attack Range", "Farthest Attack Range"];

pub(super) static ZERO1_WEAPON_EXP: [FieldDescriptor; 7] = [
    levels("Buster Shot", 0x2A8168, BUSTER),
    levels("Z-Saber", 0x2A8184, SABER),
    levels("Triple Rod", 0x2A81BE, TRIPLE_ROD),
    levels("Shield Boomerang", 0x2A81D6, BOOMERANG),
    upgrade("Buster 4 Shot Upgrade", 0x188A2),
    upgrade("Air Spin Slash", 0x18A60),
    upgrade("Dash Spin Slash", 0x18A1C),
];

pub(super) static ZERO2_WEAPON_EXP: [FieldDescriptor; 4] = [
    levels("Buster Shot", 0x3359B4, BUSTER),
    levels("Z-Saber", 0x3359C4, SABER),
    levels("Chain Rod", 0x3359DA, CHAIN_ROD),
    levels("Shield Boomerang", 0x3359E8, BOOMERANG),
];
