//! The four supported game identities and their compiled-in metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result};
use crate::fields::{FieldTable, FieldTableKind};
use crate::fingerprint::{Fingerprint, HEADER_LEN};

/// One of the supported Mega Man Zero cartridges (US releases).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[serde(alias = "Zero 1", alias = "Zero1")]
    Zero1,
    #[serde(alias = "Zero 2", alias = "Zero2")]
    Zero2,
    #[serde(alias = "Zero 3", alias = "Zero3")]
    Zero3,
    #[serde(alias = "Zero 4", alias = "Zero4")]
    Zero4,
}

/// A patch a variant may opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatchSpec {
    /// Identifier used on the command line and in plan files (e.g. `blood`).
    pub id: &'static str,
    /// Human-friendly description.
    pub label: &'static str,
    /// File name looked up through a `PatchSource`.
    pub file_name: &'static str,
}

pub const BLOOD: PatchSpec =
    PatchSpec { id: "blood", label: "Blood Restoration", file_name: "blood.ips" };

pub const EX_SKILL: PatchSpec = PatchSpec {
    id: "ex-skill",
    label: "Get EX Skill Regardless of Rank",
    file_name: "ex_skill.ips",
};

pub const VOCAL: PatchSpec =
    PatchSpec { id: "vocal", label: "Vocal Restoration", file_name: "vocal.ips" };

/// Static description of a variant.
#[derive(Debug)]
pub struct VariantSpec {
    pub display_name: &'static str,
    pub slug: &'static str,
    /// Expected image length in bytes.
    pub size: usize,
    /// Expected bytes of the cartridge header window `[0xA0, 0xB2)`.
    pub header: &'static [u8; HEADER_LEN],
    /// Expected MD5 of the whole image, lowercase hex.
    pub md5: &'static str,
    pub patches: &'static [PatchSpec],
}

static ZERO1: VariantSpec = VariantSpec {
    display_name: "Zero 1",
    slug: "zero1",
    size: 8_388_608,
    header: b"MEGAMAN ZEROAZCE08",
    md5: "b24a17d080a01a404cbf018ba42b9803",
    patches: &[BLOOD],
};

static ZERO2: VariantSpec = VariantSpec {
    display_name: "Zero 2",
    slug: "zero2",
    size: 8_388_608,
    header: b"MEGAMANZERO2A62E08",
    md5: "182363b0698322e1864ced6e9eed7ead",
    patches: &[BLOOD, EX_SKILL],
};

static ZERO3: VariantSpec = VariantSpec {
    display_name: "Zero 3",
    slug: "zero3",
    size: 8_388_608,
    header: b"MEGAMANZERO3BZ3E08",
    md5: "aa1d5eeffcd5e4577db9ee6d9b1100f9",
    patches: &[BLOOD, EX_SKILL],
};

static ZERO4: VariantSpec = VariantSpec {
    display_name: "Zero 4",
    slug: "zero4",
    size: 16_777_216,
    header: b"MEGAMANZERO4B4ZE08",
    md5: "0d1e88bdb09ff68adf9877a121325f9c",
    patches: &[BLOOD, VOCAL],
};

impl Variant {
    pub const ALL: [Variant; 4] = [Variant::Zero1, Variant::Zero2, Variant::Zero3, Variant::Zero4];

    pub fn spec(self) -> &'static VariantSpec {
        match self {
            Variant::Zero1 => &ZERO1,
            Variant::Zero2 => &ZERO2,
            Variant::Zero3 => &ZERO3,
            Variant::Zero4 => &ZERO4,
        }
    }

    pub fn slug(self) -> &'static str {
        self.spec().slug
    }

    pub fn display_name(self) -> &'static str {
        self.spec().display_name
    }

    /// Display name without spaces (`Zero1`), used in default config file names.
    pub fn compact_name(self) -> String {
        self.display_name().replace(' ', "")
    }

    /// The known-good fingerprint for an unmodified image.
    pub fn fingerprint(self) -> Fingerprint {
        let spec = self.spec();
        Fingerprint { size: spec.size, header: spec.header.to_vec(), md5: spec.md5.to_string() }
    }

    pub fn eligible_patches(self) -> &'static [PatchSpec] {
        self.spec().patches
    }

    /// Look up a patch by id, checking that this variant may use it.
    pub fn patch(self, id: &str) -> Result<&'static PatchSpec> {
        if let Some(spec) = self.eligible_patches().iter().find(|p| p.id == id) {
            return Ok(spec);
        }
        let known = [BLOOD, EX_SKILL, VOCAL].iter().any(|p| p.id == id);
        if known {
            Err(PatchError::IneligiblePatch {
                patch: id.to_string(),
                variant: self.display_name().to_string(),
            })
        } else {
            Err(PatchError::UnknownPatch(id.to_string()))
        }
    }

    /// Field tables available for this variant.
    pub fn field_tables(self) -> Vec<FieldTableKind> {
        FieldTableKind::ALL.into_iter().filter(|kind| self.field_table(*kind).is_ok()).collect()
    }

    pub fn field_table(self, kind: FieldTableKind) -> Result<FieldTable> {
        FieldTable::for_variant(self, kind)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Variant {
    type Err = PatchError;

    /// Accepts `zero1`, `Zero 1`, `Zero1`, or a bare `1`, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String =
            s.chars().filter(|c| !c.is_whitespace() && *c != '-' && *c != '_').collect();
        let normalized = normalized.to_ascii_lowercase();
        let digit = normalized.strip_prefix("zero").unwrap_or(&normalized);
        match digit {
            "1" => Ok(Variant::Zero1),
            "2" => Ok(Variant::Zero2),
            "3" => Ok(Variant::Zero3),
            "4" => Ok(Variant::Zero4),
            _ => Err(PatchError::UnknownVariant(s.to_string())),
        }
    }
}
