use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn get_input_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/partition");
    path.push(filename);
    path
}

#[test]
fn command_invalid() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("mhg")?;
    cmd.arg("foobar");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("recognized"));

    Ok(())
}

#[test]
fn command_partition_scenario() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("mhg")?;
    let output = cmd
        .arg("partition")
        .arg(get_input_path("scenario.tsv"))
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // A[60,80]~C[5,25] scores below 0.95 of A's best hit
    assert!(output.status.success());
    assert_eq!(stdout.lines().count(), 1);
    assert_eq!(
        stdout,
        "((A,(10,50)),(10,50),+),((B,(20,60)),(20,60),+)\n"
    );

    Ok(())
}

#[test]
fn command_partition_low_threshold() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("mhg")?;
    let output = cmd
        .arg("partition")
        .arg(get_input_path("scenario.tsv"))
        .arg("-t")
        .arg("0.4")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // both hits kept; nothing links A[10,50] to A[60,80]
    assert_eq!(
        stdout,
        "((A,(10,50)),(10,50),+),((B,(20,60)),(20,60),+)\n((A,(60,80)),(60,80),+),((C,(5,25)),(5,25),+)\n"
    );

    Ok(())
}

#[test]
fn command_partition_outfmt7() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("mhg")?;
    let output = cmd
        .arg("partition")
        .arg(get_input_path("triangle.tsv"))
        .arg("-t")
        .arg("0.9")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // comment lines and the B~B self hit are ignored
    assert_eq!(
        stdout,
        "((A,(101,200)),(101,200),+),((B,(101,200)),(101,200),+),((C,(301,400)),(301,400),+)\n"
    );

    Ok(())
}

#[test]
fn command_partition_conflict() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("mhg")?;
    let output = cmd
        .arg("partition")
        .arg(get_input_path("shifted.tsv"))
        .arg("-t")
        .arg("0.5")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // A~C disagrees with A~B~C by 100 bases and is the weakest edge
    assert_eq!(
        stdout,
        "((A,(101,200)),(101,200),+),((B,(101,200)),(101,200),+),((C,(101,300)),(101,200),+)\n"
    );

    // a generous shift tolerance keeps all three edges
    let mut cmd = Command::cargo_bin("mhg")?;
    let output = cmd
        .arg("partition")
        .arg(get_input_path("shifted.tsv"))
        .arg("-t")
        .arg("0.5")
        .arg("--max-shift")
        .arg("200")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("((C,(101,300)),(101,300),+)"));

    Ok(())
}

#[test]
fn command_partition_contradicting_triangle() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("mhg")?;
    let output = cmd
        .arg("partition")
        .arg(get_input_path("contradicting.tsv"))
        .arg("-t")
        .arg("0.5")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // A~B is the weakest edge between the two copies of C
    assert!(output.status.success());
    assert_eq!(
        stdout,
        "((A,(101,200)),(101,200),+),((C,(1001,1100)),(1001,1100),+)\n((B,(101,200)),(101,200),+),((C,(101,200)),(101,200),+)\n"
    );

    Ok(())
}

#[test]
fn command_partition_dir() -> anyhow::Result<()> {
    let tempdir = TempDir::new()?;
    let outfile = tempdir.path().join("mhg.txt");

    let mut cmd = Command::cargo_bin("mhg")?;
    cmd.arg("partition")
        .arg(get_input_path("reports"))
        .arg("-t")
        .arg("0.9")
        .arg("-p")
        .arg("2")
        .arg("-o")
        .arg(&outfile)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    // .hidden.tsv would pull Z into the group
    let content = std::fs::read_to_string(&outfile)?;
    assert_eq!(
        content,
        "((A,(101,200)),(101,200),+),((B,(101,200)),(101,200),+),((C,(301,400)),(301,400),+)\n"
    );

    Ok(())
}

#[test]
fn command_partition_threshold_invalid() -> anyhow::Result<()> {
    for t in ["0", "1.5", "-0.2"] {
        let tempdir = TempDir::new()?;
        let outfile = tempdir.path().join("mhg.txt");

        let mut cmd = Command::cargo_bin("mhg")?;
        cmd.arg("partition")
            .arg(get_input_path("scenario.tsv"))
            .arg(format!("--threshold={}", t))
            .arg("-o")
            .arg(&outfile)
            .assert()
            .failure()
            .stderr(predicate::str::contains("--threshold"));
        assert!(!outfile.exists());
    }

    Ok(())
}

#[test]
fn command_partition_malformed() -> anyhow::Result<()> {
    let tempdir = TempDir::new()?;
    let outfile = tempdir.path().join("mhg.txt");

    let mut cmd = Command::cargo_bin("mhg")?;
    cmd.arg("partition")
        .arg(get_input_path("malformed.tsv"))
        .arg("-o")
        .arg(&outfile)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed.tsv:2"))
        .stderr(predicate::str::contains("12 tab-separated columns"));
    assert!(!outfile.exists());

    Ok(())
}

#[test]
fn command_partition_missing_file() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("mhg")?;
    cmd.arg("partition")
        .arg(get_input_path("not_there.tsv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not_there.tsv"));

    Ok(())
}

#[test]
fn command_partition_rejects_xml() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("mhg")?;
    cmd.arg("partition")
        .arg(get_input_path("report.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("report.xml:1"));

    let mut cmd = Command::cargo_bin("mhg")?;
    cmd.arg("partition")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("XML reports (-outfmt 5) are not accepted"));

    Ok(())
}
