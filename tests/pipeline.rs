//! End-to-end tests through real files: decode, extract, encode, batch.

use cutout::config::CutoutConfig;
use cutout::imaging::{ImageBackend, Method, RustBackend};
use cutout::naming::{self, RenameOptions};
use cutout::process;
use cutout::scan;
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const NEAR_WHITE: Rgba<u8> = Rgba([250, 250, 250, 255]);
const RED: Rgba<u8> = Rgba([200, 30, 30, 255]);

fn red_block_scene() -> RgbaImage {
    RgbaImage::from_fn(20, 20, |x, y| {
        if (7..13).contains(&x) && (7..13).contains(&y) {
            RED
        } else {
            NEAR_WHITE
        }
    })
}

fn write(dir: &Path, name: &str, image: &RgbaImage) -> PathBuf {
    let path = dir.join(name);
    RustBackend::new().save_png(image, &path).unwrap();
    path
}

fn load(path: &Path) -> RgbaImage {
    RustBackend::new().load(path).unwrap()
}

#[test]
fn red_block_on_near_white_in_place() {
    let tmp = TempDir::new().unwrap();
    let path = write(tmp.path(), "cat_01.png", &red_block_scene());

    let report = process::process(&path, &path, &CutoutConfig::default()).unwrap();
    assert_eq!(report.subject_pixels, 36);

    let out = load(&path);
    for (x, y, p) in out.enumerate_pixels() {
        let in_block = (7..13).contains(&x) && (7..13).contains(&y);
        if in_block {
            assert_eq!(*p, RED, "block pixel ({x}, {y})");
        } else {
            assert_eq!(p[3], 0, "background pixel ({x}, {y})");
        }
    }
}

#[test]
fn uniform_near_white_becomes_fully_transparent() {
    let tmp = TempDir::new().unwrap();
    let input = write(tmp.path(), "blank.png", &RgbaImage::from_pixel(10, 10, NEAR_WHITE));
    let output = tmp.path().join("blank_cut.png");

    let report = process::process(&input, &output, &CutoutConfig::default()).unwrap();
    assert!(report.fallback_used);
    assert_eq!(report.subject_pixels, 0);
    assert!(load(&output).pixels().all(|p| p[3] == 0));
    // input untouched when output goes elsewhere
    assert!(load(&input).pixels().all(|p| p[3] == 255));
}

#[test]
fn transparent_input_is_written_back_identically() {
    let tmp = TempDir::new().unwrap();
    let source = RgbaImage::from_fn(7, 5, |x, y| Rgba([x as u8 * 30, y as u8 * 40, 99, 3]));
    let input = write(tmp.path(), "ghost.png", &source);
    let output = tmp.path().join("ghost_out.png");

    let report = process::process(&input, &output, &CutoutConfig::default()).unwrap();
    assert!(report.passthrough);
    assert_eq!(report.passes, 0);
    assert_eq!(load(&output), source);
}

#[test]
fn jpeg_like_rgb_input_gets_alpha() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("cat.png");
    RgbImage::from_fn(20, 20, |x, y| {
        if (7..13).contains(&x) && (7..13).contains(&y) {
            Rgb([200, 30, 30])
        } else {
            Rgb([250, 250, 250])
        }
    })
    .save(&input)
    .unwrap();
    let output = tmp.path().join("cat_cut.png");

    process::process(&input, &output, &CutoutConfig::default()).unwrap();
    let out = load(&output);
    assert_eq!(out.get_pixel(10, 10)[3], 255);
    assert_eq!(out.get_pixel(0, 0)[3], 0);
}

#[test]
fn output_alpha_never_exceeds_input_alpha() {
    let tmp = TempDir::new().unwrap();
    let source = RgbaImage::from_fn(32, 24, |x, y| {
        let a = ((x * 7 + y * 13) % 256) as u8;
        Rgba([(x * 8) as u8, (y * 10) as u8, 120, a])
    });
    let input = write(tmp.path(), "noise.png", &source);
    let output = tmp.path().join("noise_out.png");

    for method in [Method::Advanced, Method::Basic] {
        let config = CutoutConfig {
            method,
            ..Default::default()
        };
        process::process(&input, &output, &config).unwrap();
        let out = load(&output);
        for (before, after) in source.pixels().zip(out.pixels()) {
            assert!(after[3] <= before[3]);
            assert_eq!(&before.0[..3], &after.0[..3]);
        }
    }
}

#[test]
fn batch_with_corrupt_file_processes_the_rest() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "cat_01.png", &red_block_scene());
    fs::write(tmp.path().join("cat_02.png"), b"not an image").unwrap();
    write(tmp.path(), "cat_03.png", &red_block_scene());
    write(tmp.path(), "other.png", &red_block_scene());

    let files = scan::scan(tmp.path(), "cat_*.png", false).unwrap();
    assert_eq!(files.len(), 3);

    let out_dir = tmp.path().join("out");
    let report =
        process::process_batch(&files, Some(&out_dir), &CutoutConfig::default(), None).unwrap();

    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(report.files[1].error.as_deref().unwrap().contains("cat_02.png"));
    assert_eq!(load(&out_dir.join("cat_01.png")).get_pixel(0, 0)[3], 0);
    assert_eq!(load(&out_dir.join("cat_03.png")).get_pixel(10, 10)[3], 255);
    assert!(!out_dir.join("cat_02.png").exists());
    assert!(!out_dir.join("other.png").exists());
}

#[test]
fn recursive_batch_into_output_dir_refuses_name_clashes() {
    let tmp = TempDir::new().unwrap();
    let blue = RgbaImage::from_fn(20, 20, |x, y| {
        if (7..13).contains(&x) && (7..13).contains(&y) {
            Rgba([30, 30, 200, 255])
        } else {
            NEAR_WHITE
        }
    });
    fs::create_dir(tmp.path().join("a")).unwrap();
    fs::create_dir(tmp.path().join("b")).unwrap();
    write(&tmp.path().join("a"), "cat_01.png", &red_block_scene());
    write(&tmp.path().join("b"), "cat_01.png", &blue);

    let files = scan::scan(tmp.path(), "cat_*.png", true).unwrap();
    assert_eq!(files.len(), 2);
    let out_dir = tmp.path().join("out");
    let report =
        process::process_batch(&files, Some(&out_dir), &CutoutConfig::default(), None).unwrap();

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);
    assert!(!report.is_success());
    // a/ sorts first and owns the output
    assert_eq!(load(&out_dir.join("cat_01.png")).get_pixel(10, 10), &RED);
    let names: Vec<_> = fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("cat_01.png")]);
}

#[test]
fn batch_report_json_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let input = write(tmp.path(), "cat_01.png", &red_block_scene());
    let report =
        process::process_batch(&[input], None, &CutoutConfig::default(), None).unwrap();

    let json_path = tmp.path().join("report.json");
    process::write_report(&report, &json_path).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["files"][0]["report"]["subject_pixels"], 36);
    assert_eq!(value["files"][0]["report"]["method"], "advanced");
    assert_eq!(value["files"][0]["report"]["coverage_basis"], "opaque");
}

#[test]
fn rename_then_batch() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "photo (7).png", &red_block_scene());
    write(tmp.path(), "photo (2).png", &red_block_scene());

    let steps = naming::plan_directory(tmp.path(), &RenameOptions::default()).unwrap();
    assert_eq!(naming::apply_renames(&steps).unwrap(), 2);

    let files = scan::scan(tmp.path(), "cat_*.png", false).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["cat_01.png", "cat_02.png"]);

    let report = process::process_batch(&files, None, &CutoutConfig::default(), None).unwrap();
    assert!(report.is_success());
}
