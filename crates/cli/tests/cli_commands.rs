use std::fs;

use predicates::prelude::*;
use tempfile::tempdir;

mod helpers;
use helpers::{ips, saber_values, write_zero1_image};

/// `variants` lists every game.
#[test]
fn variants_lists_all_games() {
    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .arg("variants")
        .assert()
        .success()
        .stdout(predicate::str::contains("Zero 1 [zero1]"))
        .stdout(predicate::str::contains("Zero 4 [zero4]"))
        .stdout(predicate::str::contains("vocal"));
}

#[test]
fn variants_json_is_parseable() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["variants", "--json"])
        .output()
        .expect("run variants");
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let list = parsed.as_array().expect("array");
    assert_eq!(list.len(), 4);
    assert_eq!(list[3]["size"], 16_777_216);
    assert_eq!(list[1]["tables"][1], "weapon-exp");
}

/// A synthetic image has the right size and header but the wrong hash.
#[test]
fn verify_reports_mismatch_and_fails() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["verify", "--game", "zero1", "--rom"])
        .arg(&rom)
        .assert()
        .failure()
        .stdout(predicate::str::contains("MISMATCH"))
        .stdout(predicate::str::contains("MD5 is"))
        .stdout(predicate::str::contains("size is").not());
}

#[test]
fn verify_reports_every_discrepancy() {
    let dir = tempdir().expect("tempdir");
    let rom = dir.path().join("tiny.gba");
    fs::write(&rom, b"not a rom").expect("write");

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["verify", "--game", "Zero 3", "--rom"])
        .arg(&rom)
        .assert()
        .failure()
        .stdout(predicate::str::contains("size is 9 bytes"))
        .stdout(predicate::str::contains("header is"))
        .stdout(predicate::str::contains("MD5 is"));
}

#[test]
fn verify_rejects_unknown_game() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["verify", "--game", "zero9", "--rom"])
        .arg(&rom)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown game"));
}

#[test]
fn patch_is_refused_without_override() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());
    let patches = dir.path().join("patches");
    fs::create_dir_all(&patches).expect("mkdir");
    fs::write(patches.join("blood.ips"), ips(0x10, &[0xAA])).expect("write patch");
    let out = dir.path().join("out.gba");

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["patch", "--game", "zero1", "--patch", "blood", "--rom"])
        .arg(&rom)
        .arg("--out")
        .arg(&out)
        .arg("--patch-dir")
        .arg(&patches)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not look like an unmodified Zero 1"));
    assert!(!out.exists(), "no output on failure");
}

#[test]
fn patch_with_override_writes_output_and_keeps_input() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());
    let patches = dir.path().join("patches");
    fs::create_dir_all(patches.join("zero1")).expect("mkdir");
    fs::write(patches.join("blood.ips"), ips(0x10, &[0x11])).expect("write shared patch");
    fs::write(patches.join("zero1").join("blood.ips"), ips(0x10, &[0xAA])).expect("write patch");
    let out = dir.path().join("out.gba");

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["patch", "--game", "zero1", "--patch", "blood", "--allow-mismatch", "--rom"])
        .arg(&rom)
        .arg("--out")
        .arg(&out)
        .arg("--patch-dir")
        .arg(&patches)
        .assert()
        .success()
        .stdout(predicate::str::contains("blood.ips"))
        .stdout(predicate::str::contains("SHA-256"))
        .stderr(predicate::str::contains("verification overridden"));

    let patched = fs::read(&out).expect("read out");
    assert_eq!(patched[0x10], 0xAA, "per-game patch wins");
    assert_eq!(fs::read(&rom).expect("read rom")[0x10], 0, "input untouched");
}

#[test]
fn patch_rejects_ineligible_patch() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());
    let out = dir.path().join("out.gba");

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["patch", "--game", "zero1", "--patch", "vocal", "--allow-mismatch", "--rom"])
        .arg(&rom)
        .arg("--out")
        .arg(&out)
        .arg("--patch-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available for Zero 1"));
    assert!(!out.exists());
}

#[test]
fn malformed_patch_aborts_chain() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());
    fs::write(dir.path().join("blood.ips"), b"PATCH\x00\x00").expect("write patch");
    let out = dir.path().join("out.gba");

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["patch", "--game", "zero1", "--patch", "blood", "--allow-mismatch", "--rom"])
        .arg(&rom)
        .arg("--out")
        .arg(&out)
        .arg("--patch-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed patch blood.ips"));
    assert!(!out.exists());
}

#[test]
fn fields_show_lists_editable_entries() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["fields", "show", "--game", "1", "--table", "weapon-exp", "--rom"])
        .arg(&rom)
        .assert()
        .success()
        .stdout(predicate::str::contains("Z-Saber"))
        .stdout(predicate::str::contains("[2] Charged Saber: 300"))
        .stdout(predicate::str::contains("(no editable entries)"));
}

#[test]
fn fields_edit_scales_and_writes_output() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());
    let out = dir.path().join("edited.gba");

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["fields", "edit", "--game", "zero1", "--table", "weapon-exp"])
        .args(["--scale", "1/2", "--set", "Z-Saber:3=999", "--rom"])
        .arg(&rom)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let edited = fs::read(&out).expect("read out");
    assert_eq!(saber_values(&edited), vec![50, 100, 150, 999]);
    assert_eq!(saber_values(&fs::read(&rom).expect("read rom")), vec![100, 200, 300, 400]);
}

#[test]
fn fields_edit_rejects_decreasing_values_without_writing() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());
    let out = dir.path().join("edited.gba");

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["fields", "edit", "--game", "zero1", "--table", "weapon-exp"])
        .args(["--set", "Z-Saber:2=150", "--rom"])
        .arg(&rom)
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Z-Saber must not decrease"));
    assert!(!out.exists());
}

#[test]
fn fields_export_then_import_round_trips() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());
    let config = dir.path().join("saber.json");

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["fields", "export", "--game", "zero1", "--table", "weapon-exp", "--rom"])
        .arg(&rom)
        .arg("--out")
        .arg(&config)
        .assert()
        .success();

    let mut body: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config).expect("read config")).expect("json");
    assert_eq!(body["game"], "Zero 1");
    body["values"]["Z-Saber"] = serde_json::json!([1, 2, 3, 4]);
    fs::write(&config, serde_json::to_string(&body).expect("encode")).expect("write config");

    let defaults = dir.path().join("defaults");
    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["fields", "edit", "--game", "zero1", "--table", "weapon-exp", "--save-default"])
        .arg("--import")
        .arg(&config)
        .arg("--config-dir")
        .arg(&defaults)
        .arg("--rom")
        .arg(&rom)
        .assert()
        .success();

    assert_eq!(saber_values(&fs::read(&rom).expect("read rom")), vec![1, 2, 3, 4]);
    assert!(defaults.join("default_weaponexp_Zero1.json").is_file());
}

#[test]
fn fields_edit_rejects_config_for_another_game() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());
    let config = dir.path().join("zero2.json");
    fs::write(&config, r#"{ "game": "Zero 2", "values": {} }"#).expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["fields", "edit", "--game", "zero1", "--table", "cyber-elf-costs", "--import"])
        .arg(&config)
        .arg("--rom")
        .arg(&rom)
        .assert()
        .failure()
        .stderr(predicate::str::contains("This config is for Zero 2, not Zero 1"));
}

#[test]
fn weapon_exp_is_unavailable_for_zero3() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["fields", "show", "--game", "zero3", "--table", "weapon-exp", "--rom"])
        .arg(&rom)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Zero 3 has no weapon-exp table"));
}

#[test]
fn run_executes_yaml_plan() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());
    fs::create_dir_all(dir.path().join("ips")).expect("mkdir");
    fs::write(dir.path().join("ips").join("blood.ips"), ips(0x20, &[0x5A, 0x5B])).expect("patch");
    let plan = dir.path().join("plan.yaml");
    fs::write(
        &plan,
        "game: zero1\n\
         patches: [blood]\n\
         patch_dir: ips\n\
         allow_mismatch: true\n\
         edits:\n  - table: weapon-exp\n    scale: \"2\"\n",
    )
    .expect("write plan");
    let out = dir.path().join("out.gba");

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .arg("run")
        .arg("--plan")
        .arg(&plan)
        .arg("--rom")
        .arg(&rom)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Tables:  weapon-exp"));

    let patched = fs::read(&out).expect("read out");
    assert_eq!(&patched[0x20..0x22], &[0x5A, 0x5B]);
    assert_eq!(saber_values(&patched), vec![200, 400, 600, 800]);
}

#[test]
fn fields_show_applies_saved_default() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());
    let cfg = dir.path().join("cfg");

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["fields", "edit", "--game", "zero1", "--table", "weapon-exp"])
        .args(["--preset", "1/2", "--save-default", "--rom"])
        .arg(&rom)
        .arg("--out")
        .arg(dir.path().join("scratch.gba"))
        .arg("--config-dir")
        .arg(&cfg)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved default config"));

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["fields", "show", "--game", "zero1", "--table", "weapon-exp", "--rom"])
        .arg(&rom)
        .arg("--config-dir")
        .arg(&cfg)
        .assert()
        .success()
        .stdout(predicate::str::contains("[2] Charged Saber: 150"));
}

#[test]
fn preset_and_scale_are_mutually_exclusive() {
    let dir = tempdir().expect("tempdir");
    let rom = write_zero1_image(dir.path());

    assert_cmd::cargo::cargo_bin_cmd!("zero-patcher")
        .args(["fields", "edit", "--game", "zero1", "--table", "weapon-exp"])
        .args(["--preset", "1/2", "--scale", "2", "--rom"])
        .arg(&rom)
        .assert()
        .failure();
}
