use assert_cmd::Command;
use assert_fs::NamedTempFile;
use predicates::prelude::*;
use qspace::{Axis, Space};

fn axis(label: &str, min: f64, max: f64, res: f64) -> Axis {
    Axis::new(label, min, max, res).unwrap()
}

#[test]
fn info_prints_axis_summary() {
    let space = Space::new(vec![axis("q", 0.0, 1.0, 0.5)]).unwrap();
    let file = NamedTempFile::new("space.qsp").unwrap();
    space.write_to_file(file.path()).unwrap();

    Command::cargo_bin("qspace")
        .unwrap()
        .args(["info", file.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("q").and(predicate::str::contains("count=3")));
}

#[test]
fn trim_shrinks_to_nonzero_bounds() {
    let mut space = Space::new(vec![axis("q", 0.0, 2.0, 0.5)]).unwrap();
    space.process_image(&[&[1.0]], &[5.0]).unwrap();

    let input = NamedTempFile::new("in.qsp").unwrap();
    let output = NamedTempFile::new("out.qsp").unwrap();
    space.write_to_file(input.path()).unwrap();

    Command::cargo_bin("qspace")
        .unwrap()
        .args([
            "trim",
            input.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
        ])
        .assert()
        .success();

    let trimmed = Space::read_from_file(output.path()).unwrap();
    assert_eq!(trimmed.shape(), &[1]);
}

#[test]
fn rebin_coarsens_and_preserves_total() {
    let mut space = Space::new(vec![axis("q", 0.0, 2.0, 0.5)]).unwrap();
    space.process_image(&[&[0.0, 0.5, 1.0, 1.5, 2.0]], &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

    let input = NamedTempFile::new("in.qsp").unwrap();
    let output = NamedTempFile::new("out.qsp").unwrap();
    space.write_to_file(input.path()).unwrap();

    Command::cargo_bin("qspace")
        .unwrap()
        .args([
            "rebin",
            input.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
            "2",
        ])
        .assert()
        .success();

    let rebinned = Space::read_from_file(output.path()).unwrap();
    assert!((rebinned.photons().sum() - space.photons().sum()).abs() < 1e-9);
}
