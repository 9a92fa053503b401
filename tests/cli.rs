use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn billsplit(base: &Path) -> Command {
    let mut cmd = Command::cargo_bin("billsplit").unwrap();
    cmd.env("BILLSPLIT_DIR", base).env_remove("RUST_LOG");
    cmd
}

fn write_export(base: &Path, name: &str, body: &str) {
    let data = base.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(
        data.join(name),
        format!("計算対象,日付,内容,金額（円）,保有金融機関,メモ,振替,ID\n{}", body),
    )
    .unwrap();
}

#[test]
fn init_writes_default_config() {
    let temp = TempDir::new().unwrap();

    billsplit(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Config written to"));
    assert!(temp.path().join("config.json").exists());
    assert!(temp.path().join("data").is_dir());

    billsplit(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Config already exists"));
}

#[test]
fn config_prints_paths() {
    let temp = TempDir::new().unwrap();
    billsplit(temp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("bill_splitting.xlsx"))
        .stdout(predicate::str::contains("\"markers\""));
}

#[test]
fn run_then_rerun() {
    let temp = TempDir::new().unwrap();
    write_export(
        temp.path(),
        "2024-03.csv",
        "1,2024/03/01,居酒屋,3000,カード,dinner 割勘 2:1,0,1\n\
         1,2024/03/02,カフェ,500,カード,coffee,0,2\n",
    );

    billsplit(temp.path())
        .args(["run", "--party", "U1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reconciled 1 new transaction(s) for U1"))
        .stdout(predicate::str::contains("2,000"));

    let ledger = temp.path().join("output").join("bill_splitting.xlsx");
    assert!(ledger.exists());
    let before = fs::read(&ledger).unwrap();

    billsplit(temp.path())
        .args(["run", "--party", "U1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to reconcile for U1"));
    assert_eq!(fs::read(&ledger).unwrap(), before);

    billsplit(temp.path())
        .args(["show", "--party", "U1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dinner"))
        .stdout(predicate::str::contains("Rows: 1"));

    billsplit(temp.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("U1 +1 row(s)"));
}

#[test]
fn malformed_ratio_fails_and_names_id() {
    let temp = TempDir::new().unwrap();
    write_export(
        temp.path(),
        "2024-03.csv",
        "1,2024/03/01,居酒屋,3000,カード,dinner 割勘 two:one,0,x9\n",
    );

    billsplit(temp.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("x9"));
    assert!(!temp.path().join("output").join("bill_splitting.xlsx").exists());
}

#[test]
fn missing_source_directory_fails() {
    let temp = TempDir::new().unwrap();
    billsplit(temp.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source read error"));
}

#[test]
fn archives_empty_then_listed() {
    let temp = TempDir::new().unwrap();
    write_export(
        temp.path(),
        "2024-03.csv",
        "1,2024/03/01,居酒屋,3000,カード,dinner 割勘 2:1,0,1\n",
    );

    billsplit(temp.path())
        .args(["archives", "--party", "U2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No archives for U2"));

    billsplit(temp.path()).args(["run", "-p", "U2"]).assert().success();

    write_export(
        temp.path(),
        "2024-04.csv",
        "1,2024/04/01,タクシー,1200,カード,taxi 割り勘 1:1,0,2\n",
    );
    billsplit(temp.path())
        .args(["run", "-p", "U2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Previous ledger archived as U2_archive_"));

    billsplit(temp.path())
        .args(["archives", "-p", "U2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1 archive(s)"));
}

#[test]
fn unknown_party_is_rejected() {
    let temp = TempDir::new().unwrap();
    billsplit(temp.path())
        .args(["show", "--party", "U3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown party"));
}
