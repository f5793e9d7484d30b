#![cfg(feature = "cli")]

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use predicates::prelude::*;
use stone_sieve::{SieveRunConfig, SieveRunReport};

fn write_photo(path: &std::path::Path) {
    let mut img = RgbImage::from_pixel(320, 240, Rgb([240, 240, 240]));
    draw_filled_rect_mut(&mut img, Rect::at(20, 20).of_size(140, 100), Rgb([10, 10, 10]));
    draw_filled_rect_mut(&mut img, Rect::at(200, 40).of_size(40, 30), Rgb([100, 80, 60]));
    draw_filled_rect_mut(&mut img, Rect::at(60, 170).of_size(30, 24), Rgb([100, 80, 60]));
    img.save(path).expect("save photo");
}

fn stone_sieve() -> Command {
    Command::cargo_bin("stone-sieve").expect("binary")
}

#[test]
fn prints_tables_and_writes_annotated_copy() {
    let dir = tempfile::tempdir().expect("tempdir");
    let photo = dir.path().join("S102.png");
    write_photo(&photo);

    stone_sieve()
        .arg(&photo)
        .assert()
        .success()
        .stdout(predicate::str::contains("Shortest Width (mm)"))
        .stdout(predicate::str::contains("Stone2"))
        .stdout(predicate::str::contains("Total stones across all images: 2"))
        .stdout(predicate::str::contains("Stone Type (Category)"));

    assert!(dir.path().join("S102_output.png").exists());
}

#[test]
fn no_images_is_an_error() {
    stone_sieve()
        .assert()
        .failure()
        .stderr(predicate::str::contains("no images to analyze"));
}

#[test]
fn failed_photo_gives_nonzero_exit_but_full_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let photo = dir.path().join("S101.png");
    write_photo(&photo);
    let report = dir.path().join("report.json");

    stone_sieve()
        .arg(dir.path().join("missing.png"))
        .arg(&photo)
        .arg("--no-annotate")
        .arg("--report")
        .arg(&report)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed: failed to load image"))
        .stdout(predicate::str::contains("Total stones across all images: 2"));

    let parsed = SieveRunReport::load_json(&report).expect("report");
    assert_eq!(parsed.images.len(), 2);
    assert_eq!(parsed.tally.failed_images, 1);
    assert!(!dir.path().join("S101_output.png").exists());
}

#[test]
fn fail_fast_stops_before_the_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let photo = dir.path().join("S101.png");
    write_photo(&photo);

    stone_sieve()
        .arg(dir.path().join("missing.png"))
        .arg(&photo)
        .arg("--fail-fast")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Total stones").not())
        .stderr(predicate::str::contains("missing.png"));
}

#[test]
fn config_file_and_flags_combine() {
    let dir = tempfile::tempdir().expect("tempdir");
    let photo = dir.path().join("S103.png");
    write_photo(&photo);
    let config_path = dir.path().join("run.json");
    SieveRunConfig {
        images: vec![photo.to_string_lossy().into_owned()],
        ..SieveRunConfig::default()
    }
    .write_json(&config_path)
    .expect("config");

    stone_sieve()
        .arg("--config")
        .arg(&config_path)
        .args(["--dpi", "96", "--output-suffix", "_boxes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total stones across all images: 2"));

    assert!(dir.path().join("S103_boxes.png").exists());
}

#[test]
fn conflicting_scale_flags_are_rejected() {
    stone_sieve()
        .args(["x.png", "--dpi", "300", "--side-scale", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn reference_tolerance_needs_a_reference_ratio() {
    stone_sieve()
        .args(["x.png", "--reference-tolerance", "0.2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required arguments were not provided"))
        .stderr(predicate::str::contains("--reference-ratio"));
}

#[test]
fn reference_ratio_with_tolerance_picks_the_card() {
    let dir = tempfile::tempdir().expect("tempdir");
    let photo = dir.path().join("S101.png");
    write_photo(&photo);

    stone_sieve()
        .arg(&photo)
        .args(["--reference-ratio", "1.4", "--reference-tolerance", "0.05"])
        .arg("--no-annotate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total stones across all images: 2"));
}
