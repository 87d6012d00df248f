use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn check_blastn_installed() -> bool {
    which::which("blastn").is_ok()
}

#[test]
fn command_blastn_help() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("mhg")?;
    cmd.arg("blastn")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<query>vs<subject>.tsv"));

    Ok(())
}

#[test]
fn command_blastn_needs_two_genomes() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("mhg")?;
    cmd.arg("blastn").arg("a.fa").assert().failure();

    Ok(())
}

#[test]
fn command_blastn_not_installed() -> anyhow::Result<()> {
    let tempdir = TempDir::new()?;

    let mut cmd = Command::cargo_bin("mhg")?;
    cmd.env("PATH", "")
        .arg("blastn")
        .arg("a.fa")
        .arg("b.fa")
        .arg("-o")
        .arg(tempdir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("blastn not found"));
    assert!(!tempdir.path().join("out").exists());

    Ok(())
}

#[test]
fn command_blastn_pairs() -> anyhow::Result<()> {
    if !check_blastn_installed() {
        eprintln!("Skipping command_blastn_pairs: blastn not installed");
        return Ok(());
    }

    let tempdir = TempDir::new()?;
    let seq = "ACGTTGCAAGCTTGACCTAGGATCCGTACGATCGATGCTAGCTAGGCTAACGTAGCTAGCATCGATCGTAGC";
    std::fs::write(tempdir.path().join("A.fa"), format!(">A\n{}\n", seq))?;
    std::fs::write(tempdir.path().join("B.fa"), format!(">B\n{}\n", seq))?;
    let outdir = tempdir.path().join("out");

    let mut cmd = Command::cargo_bin("mhg")?;
    cmd.arg("blastn")
        .arg(tempdir.path().join("A.fa"))
        .arg(tempdir.path().join("B.fa"))
        .arg("-p")
        .arg("2")
        .arg("-o")
        .arg(&outdir)
        .assert()
        .success();

    assert!(outdir.join("AvsB.tsv").exists());
    assert!(outdir.join("BvsA.tsv").exists());
    assert!(!outdir.join("AvsA.tsv").exists());

    Ok(())
}
