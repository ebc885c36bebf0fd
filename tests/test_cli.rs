
use fixtures::*;

use assert_cmd::Command;
use blockpar::BlockPar;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

fn bpdump() -> Command {
    Command::new(assert_cmd::cargo_bin!("bpdump"))
}

#[test]
fn it_gets_a_value_by_path() {
    let sample = regular_sample();

    let mut cmd = bpdump();
    cmd.args(["get", sample.to_str().unwrap(), "Ship/Engine/Speed"]);
    cmd.assert().success().stdout("300\n");
}

#[test]
fn it_gets_repeated_values_and_fields() {
    let sample = regular_sample();

    let mut cmd = bpdump();
    cmd.args(["get", sample.to_str().unwrap(), "Ship/Cargo", "--index", "1"]);
    cmd.assert().success().stdout("minerals\n");

    let mut cmd = bpdump();
    cmd.args([
        "get",
        sample.to_str().unwrap(),
        "Ship.Color",
        "-d",
        ".",
        "--field",
        "2",
        "--delimiters",
        ",",
    ]);
    cmd.assert().success().stdout("128\n");
}

#[test]
fn it_fails_on_missing_path() {
    let sample = regular_sample();

    let mut cmd = bpdump();
    cmd.args(["get", sample.to_str().unwrap(), "Nope/Name"]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Nope"));
}

#[test]
fn it_rejects_paths_with_empty_segments() {
    let sample = regular_sample();

    let mut cmd = bpdump();
    cmd.args(["get", sample.to_str().unwrap(), "Ship/"]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("empty segment"));
}

#[test]
fn it_reports_parse_errors_with_location() {
    let sample = sample_with_an_unterminated_quote();

    let mut cmd = bpdump();
    cmd.args(["fmt", sample.to_str().unwrap()]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("line 4, column 17"));
}

#[test]
fn it_respects_file_output() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("nested").join("test.out");

    let sample = regular_sample();

    let mut cmd = bpdump();
    cmd.args(["fmt", "-f", &f.to_string_lossy(), sample.to_str().unwrap()]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    assert!(
        output.stdout.is_empty(),
        "Expected output to be printed to file, but was printed to stdout"
    );

    assert_eq!(
        BlockPar::load_from_file(&f).unwrap(),
        BlockPar::load_from_file(&sample).unwrap()
    );
}

#[test]
fn test_it_refuses_to_overwrite_directory() {
    let d = tempdir().unwrap();

    let sample = regular_sample();
    let mut cmd = bpdump();
    cmd.args(["fmt", "-f", &d.path().to_string_lossy(), sample.to_str().unwrap()]);

    cmd.assert().failure().code(1);
}

#[test]
fn test_it_overwrites_file_anyways_if_passed_flag() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("test.out");

    let mut file = File::create(&f).unwrap();
    file.write_all(b"I'm a file!").unwrap();

    let sample = regular_sample();
    let mut cmd = bpdump();
    cmd.args([
        "fmt",
        "-f",
        &f.to_string_lossy(),
        "--no-confirm-overwrite",
        "--ascii",
        sample.to_str().unwrap(),
    ]);

    cmd.assert().success();

    let written = fs::read(&f).unwrap();
    assert!(written.is_ascii());
    assert_eq!(
        BlockPar::load_from_file(&f).unwrap(),
        BlockPar::load_from_file(&sample).unwrap()
    );
}

#[test]
fn it_sets_values_in_place() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("ship.txt");
    fs::copy(regular_sample(), &f).unwrap();

    let mut cmd = bpdump();
    cmd.args(["set", f.to_str().unwrap(), "Ship/Engine/Speed", "999"]);
    cmd.assert().success().stdout("");

    let mut cmd = bpdump();
    cmd.args(["set", f.to_str().unwrap(), "Ship/Weapon/Damage", "40", "--add"]);
    cmd.assert().success();

    let tree = BlockPar::load_from_file(&f).unwrap();
    assert_eq!(tree.param_path_get("Ship/Engine/Speed").unwrap(), "999");
    assert_eq!(tree.param_path_get("Ship/Weapon/Damage").unwrap(), "40");
}

#[test]
fn it_refuses_to_set_under_missing_block_without_add() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("ship.txt");
    fs::copy(regular_sample(), &f).unwrap();
    let before = fs::read(&f).unwrap();

    let mut cmd = bpdump();
    cmd.args(["set", f.to_str().unwrap(), "Ship/Weapon/Damage", "40"]);
    cmd.assert().failure().code(1);

    assert_eq!(fs::read(&f).unwrap(), before);
}

#[test]
fn it_supports_stdin_input_with_dash() {
    let mut cmd = bpdump();
    cmd.args(["fmt", "-"]);
    cmd.write_stdin("a=1;b{c=\"x y\"}");
    cmd.assert()
        .success()
        .stdout("a = 1\nb {\n    c = x y\n}\n");
}

#[test]
fn it_prints_json() {
    let mut cmd = bpdump();
    cmd.args(["json", "--no-indent", "-"]);
    cmd.write_stdin("a = 1\nb { c = 2 }\n");
    cmd.assert().success().stdout(
        "[{\"param\":\"a\",\"value\":\"1\"},{\"block\":\"b\",\"entries\":[{\"param\":\"c\",\"value\":\"2\"}]}]\n",
    );
}

#[test]
fn it_reads_utf16_input() {
    let mut cmd = bpdump();
    cmd.args(["get", utf16_sample().to_str().unwrap(), "Pilot/Race"]);
    cmd.assert().success().stdout("Человек\n");
}
