use std::process::{Command, Output};

fn replay(seed: &str, inputs: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_delve"))
        .args(["replay", "--seed", seed, "--inputs", inputs, "--idle", "15"])
        .output()
        .expect("failed to launch delve")
}

#[test]
fn replay_prints_identical_frames_for_identical_runs() {
    let first = replay("4242", "dddwwwaass");
    let second = replay("4242", "dddwwwaass");

    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    assert_eq!(first.stdout, second.stdout);

    let text = String::from_utf8(first.stdout).expect("utf-8 frame");
    assert_eq!(text.matches('@').count(), 1);
    assert!(text.contains("/3   Health "));
}

#[test]
fn load_without_save_fails_cleanly() {
    let save = std::env::temp_dir().join(format!("delve-cli-{}-absent.txt", std::process::id()));
    let _ = std::fs::remove_file(&save);

    let output = Command::new(env!("CARGO_BIN_EXE_delve"))
        .arg("--save")
        .arg(&save)
        .arg("load")
        .output()
        .expect("failed to launch delve");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no saved game"));
}
