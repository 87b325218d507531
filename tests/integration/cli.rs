use std::fs;
use std::process::Command;

fn brc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_brc"))
}

#[test]
fn cli_prints_sorted_report() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("measurements.txt");
    fs::write(&path, "B;2.0\nA;1.0\nA;3.0\n").expect("write input");

    let output = brc()
        .arg("--workers=2")
        .arg("--chunk-size=3")
        .arg(&path)
        .output()
        .expect("run brc");

    assert!(
        output.status.success(),
        "brc failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "A: 1.0/2.0/3.0\nB: 2.0/2.0/2.0\n"
    );
}

#[test]
fn cli_stats_line_goes_to_stderr() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("measurements.txt");
    fs::write(&path, "Tokyo;14.3\nTokyo;-5.2\nTokyo;38.9\n").expect("write input");

    let output = brc()
        .args(["--stats", "--split=probe"])
        .arg(&path)
        .output()
        .expect("run brc");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Tokyo: -5.2/16.0/38.9\n"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("rows=3"), "stderr: {stderr}");
    assert!(stderr.contains("stations=1"), "stderr: {stderr}");
}

#[test]
fn cli_defaults_to_measurements_txt() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    fs::write(tmp.path().join("measurements.txt"), "X;0.5\n").expect("write input");

    let output = brc().current_dir(tmp.path()).output().expect("run brc");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "X: 0.5/0.5/0.5\n");
}

#[test]
fn cli_malformed_input_exits_1_without_report() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("measurements.txt");
    fs::write(&path, "A;1.0\nnot a record\n").expect("write input");

    let output = brc().arg(&path).output().expect("run brc");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("byte 6"), "stderr: {stderr}");
}

#[test]
fn cli_rejects_bad_flags() {
    let cases: [&[&str]; 5] = [
        &["--workers=0"],
        &["--chunk-size=abc"],
        &["--split=fast"],
        &["--bogus"],
        &["a.txt", "b.txt"],
    ];
    for args in cases {
        let output = brc().args(args).output().expect("run brc");
        assert_eq!(output.status.code(), Some(2), "args: {args:?}");
    }
}

#[test]
fn cli_missing_file_exits_1() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let output = brc()
        .arg(tmp.path().join("nope.txt"))
        .output()
        .expect("run brc");
    assert_eq!(output.status.code(), Some(1));
}
