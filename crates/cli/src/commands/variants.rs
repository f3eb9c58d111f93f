use anyhow::Result;
use serde::Serialize;
use zero_patch_core::variant::PatchSpec;
use zero_patch_core::Variant;

use crate::commands::print_json;

#[derive(Debug, Serialize)]
pub struct VariantInfo {
    pub slug: &'static str,
    pub name: &'static str,
    pub size: usize,
    pub header: String,
    pub md5: &'static str,
    pub patches: Vec<PatchSpec>,
    pub tables: Vec<String>,
}

impl VariantInfo {
    pub fn of(variant: Variant) -> Self {
        let spec = variant.spec();
        Self {
            slug: spec.slug,
            name: spec.display_name,
            size: spec.size,
            header: spec.header.escape_ascii().to_string(),
            md5: spec.md5,
            patches: spec.patches.to_vec(),
            tables: variant.field_tables().iter().map(|t| t.slug().to_string()).collect(),
        }
    }
}

/// List every supported game with its fingerprint, patches, and tables.
pub fn variants_command(json: bool) -> Result<()> {
    let infos: Vec<VariantInfo> = Variant::ALL.iter().map(|v| VariantInfo::of(*v)).collect();
    if json {
        return print_json(&infos);
    }

    println!("Supported games ({}):", infos.len());
    for info in infos {
        println!("  - {} [{}]", info.name, info.slug);
        println!("      Size:   {} bytes", info.size);
        println!("      Header: {}", info.header);
        println!("      MD5:    {}", info.md5);
        for patch in &info.patches {
            println!("      Patch:  {} ({}, {})", patch.id, patch.label, patch.file_name);
        }
        println!("      Tables: {}", info.tables.join(", "));
    }
    Ok(())
}
