use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn help_prints_usage_and_exits_zero() {
    Command::cargo_bin("genezip")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("genezip"));
}

#[test]
fn missing_required_args_exits_nonzero() {
    Command::cargo_bin("genezip")
        .unwrap()
        .assert()
        .failure();
}

#[test]
fn full_run_writes_output_tsv() {
    let dir = TempDir::new().unwrap();
    let train_fa = dir.path().join("train.fa");
    fs::write(&train_fa, "ACGTACGTACGTACGTACGT\n").unwrap();
    let query_fa = dir.path().join("query.fa");
    fs::write(&query_fa, "ACGTACGT\n").unwrap();

    let train_manifest = dir.path().join("train.tsv");
    fs::write(&train_manifest, format!("clusterA\t{}\n", train_fa.display())).unwrap();
    let query_manifest = dir.path().join("query.tsv");
    fs::write(&query_manifest, format!("sample1\t{}\n", query_fa.display())).unwrap();
    let output = dir.path().join("out.tsv");

    Command::cargo_bin("genezip")
        .unwrap()
        .args([
            "-i",
            train_manifest.to_str().unwrap(),
            "-t",
            query_manifest.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-d",
            "6",
        ])
        .assert()
        .success();

    let contents = fs::read_to_string(&output).unwrap();
    assert!(contents.starts_with("Genome_name\tclusterA\tBest_hit\n"));
    assert!(contents.contains("sample1\t"));
}
