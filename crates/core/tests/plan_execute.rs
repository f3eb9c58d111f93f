use std::fs;

use tempfile::tempdir;
use zero_patch_core::chain::{DirPatchSource, MemoryPatchSource};
use zero_patch_core::fields::FieldTableKind;
use zero_patch_core::fingerprint::HEADER_RANGE;
use zero_patch_core::ips::{EOF_MARKER, MAGIC};
use zero_patch_core::plan::{FieldEdit, PatchPlan};
use zero_patch_core::{rom, PatchError, Variant};

const ZERO2_SIZE: usize = 8_388_608;
const ZERO2_SABER: usize = 0x3359C4;

fn ips(record: &[u8]) -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    out.extend_from_slice(record);
    out.extend_from_slice(EOF_MARKER);
    out
}

fn zero2_image() -> Vec<u8> {
    let mut image = vec![0u8; ZERO2_SIZE];
    image[HEADER_RANGE].copy_from_slice(Variant::Zero2.spec().header);
    for (i, v) in [100u16, 200, 300, 400].iter().enumerate() {
        let at = ZERO2_SABER + i * 2;
        image[at..at + 2].copy_from_slice(&v.to_le_bytes());
    }
    image
}

fn source() -> MemoryPatchSource {
    let mut source = MemoryPatchSource::new();
    source.insert("blood.ips", ips(&[0x00, 0x10, 0x00, 0x00, 0x01, 0xAA]));
    source.insert("ex_skill.ips", ips(&[0x00, 0x10, 0x00, 0x00, 0x02, 0xBB, 0xCC]));
    source
}

#[test]
fn yaml_plan_parses_with_defaults() {
    let plan = PatchPlan::from_yaml(
        "game: Zero 2\n\
         patches: [blood, ex-skill]\n\
         edits:\n  - table: weapon-exp\n    scale: \"1/2\"\n",
    )
    .expect("parse yaml");
    assert_eq!(plan.game, Variant::Zero2);
    assert_eq!(plan.patches, vec!["blood", "ex-skill"]);
    assert!(!plan.allow_mismatch);
    assert_eq!(plan.edits.len(), 1);
    assert_eq!(plan.edits[0].table, FieldTableKind::WeaponExp);
    assert_eq!(plan.edits[0].scale.as_deref(), Some("1/2"));
}

#[test]
fn strict_plan_rejects_unverified_image() {
    let plan = PatchPlan::new(Variant::Zero2);
    let err = plan.execute(&zero2_image(), &source()).unwrap_err();
    assert!(matches!(err, PatchError::Unverified { .. }));
}

#[test]
fn plan_applies_chain_in_order_then_edits() {
    let image = zero2_image();
    let mut plan = PatchPlan::new(Variant::Zero2);
    plan.allow_mismatch = true;
    plan.patches = vec!["blood".into(), "ex-skill".into()];
    let mut edit = FieldEdit::new(FieldTableKind::WeaponExp);
    edit.scale = Some("2".into());
    plan.edits.push(edit);

    let outcome = plan.execute(&image, &source()).expect("execute");
    assert!(!outcome.report.is_valid());
    assert_eq!(outcome.applied, vec!["blood.ips", "ex_skill.ips"]);
    assert_eq!(outcome.edited, vec![FieldTableKind::WeaponExp]);
    assert_eq!(outcome.image.len(), ZERO2_SIZE);
    assert_eq!(&outcome.image[0x1000..0x1002], &[0xBB, 0xCC]);
    assert_eq!(&outcome.image[ZERO2_SABER..ZERO2_SABER + 2], &200u16.to_le_bytes());
    assert_eq!(image[0x1000], 0, "source image must not be modified");
}

#[test]
fn failing_edit_fails_the_whole_plan() {
    let mut plan = PatchPlan::new(Variant::Zero2);
    plan.allow_mismatch = true;
    plan.patches = vec!["blood".into()];
    let mut edit = FieldEdit::new(FieldTableKind::WeaponExp);
    edit.set.insert("Z-Saber".into(), vec![10, 20, 15, 30]);
    plan.edits.push(edit);

    let err = plan.execute(&zero2_image(), &source()).unwrap_err();
    assert!(err.to_string().contains("Z-Saber must not decrease"), "{err}");
}

#[test]
fn plan_file_resolves_relative_paths_and_writes_output() {
    let dir = tempdir().unwrap();
    let patches = dir.path().join("patches");
    fs::create_dir_all(&patches).unwrap();
    fs::write(patches.join("blood.ips"), ips(&[0x00, 0x00, 0x00, 0x00, 0x01, 0x7E])).unwrap();
    fs::write(
        dir.path().join("saber.json"),
        r#"{ "game": "Zero 2", "values": { "Z-Saber": [1, 2, 3, 4] } }"#,
    )
    .unwrap();
    let plan_path = dir.path().join("plan.yaml");
    fs::write(
        &plan_path,
        "game: zero2\n\
         patches: [blood]\n\
         patch_dir: patches\n\
         allow_mismatch: true\n\
         edits:\n  - table: weapon-exp\n    config: saber.json\n",
    )
    .unwrap();

    let plan = PatchPlan::load(&plan_path).expect("load plan");
    assert_eq!(plan.patch_dir.as_deref(), Some(patches.as_path()));

    let source = DirPatchSource::new(plan.patch_dir.clone().unwrap());
    let outcome = plan.execute(&zero2_image(), &source).expect("execute");

    let out_path = dir.path().join("out.gba");
    rom::write_image(&out_path, &outcome.image).unwrap();
    let written = rom::read_image(&out_path).unwrap();
    assert_eq!(written.len(), ZERO2_SIZE);
    assert_eq!(written[0], 0x7E);
    assert_eq!(&written[ZERO2_SABER..ZERO2_SABER + 8], &[1, 0, 2, 0, 3, 0, 4, 0]);
}

#[test]
fn json_plan_is_chosen_by_extension() {
    let dir = tempdir().unwrap();
    let plan_path = dir.path().join("plan.json");
    fs::write(&plan_path, r#"{ "game": "zero4", "patches": ["vocal"] }"#).unwrap();
    let plan = PatchPlan::load(&plan_path).unwrap();
    assert_eq!(plan.game, Variant::Zero4);
    assert_eq!(plan.patches, vec!["vocal"]);
}

#[test]
fn malformed_plan_reports_config_error() {
    let err = PatchPlan::from_yaml("game: zero9\n").unwrap_err();
    assert!(matches!(err, PatchError::Config { .. }));
}
