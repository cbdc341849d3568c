use std::io::Write;
use std::process::Command;

fn rigid_sim() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rigid_sim"));
    cmd.env("RUST_LOG", "info").env("NO_COLOR", "1");
    cmd
}

#[test]
fn every_scene_runs_to_completion() {
    for scene in ["drop", "stack", "rain"] {
        let output = rigid_sim()
            .args(["--scene", scene, "--steps", "120", "--log-every", "60"])
            .output()
            .expect("failed to launch rigid_sim");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(output.status.success(), "{scene}: {}", String::from_utf8_lossy(&output.stderr));
        assert!(stdout.contains("simulation finished after 120 steps"), "{scene}: {stdout}");
        assert_eq!(stdout.matches("progress").count(), 2, "{scene}: {stdout}");
    }
}

#[test]
fn config_file_is_loaded() {
    let path = std::env::temp_dir().join(format!("rigid_sim_config_{}.json", std::process::id()));
    let mut file = std::fs::File::create(&path).expect("create config");
    write!(file, r#"{{ "gravity": -1.0, "solver_iterations": 4 }}"#).expect("write config");
    drop(file);

    let output = rigid_sim()
        .args(["--steps", "10"])
        .arg("--config")
        .arg(&path)
        .output()
        .expect("failed to launch rigid_sim");
    std::fs::remove_file(&path).ok();
    assert!(output.status.success());
}

#[test]
fn invalid_config_fails() {
    let output = rigid_sim()
        .args(["--steps", "10", "--margin", "-1"])
        .output()
        .expect("failed to launch rigid_sim");
    assert!(!output.status.success());
}
