use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

struct Sandbox {
    _temp: TempDir,
    root: PathBuf,
    data_dir: PathBuf,
    home: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let data_dir = root.join("data");
        let home = root.join("home");
        fs::create_dir_all(&home).unwrap();
        Self {
            _temp: temp,
            root,
            data_dir,
            home,
        }
    }

    fn dir(&self, rel: &str) -> PathBuf {
        let path = self.root.join(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    #[allow(deprecated)]
    fn cmd(&self, cwd: &Path) -> Command {
        let mut cmd = Command::cargo_bin("waypoint").expect("binary");
        cmd.current_dir(cwd)
            .env("WAYPOINT_SOURCED", "1")
            .env("WAYPOINT_DATA_DIR", &self.data_dir)
            .env("HOME", &self.home)
            .env_remove("RUST_LOG");
        cmd
    }

    fn add(&self, path: &Path) {
        self.cmd(&self.root)
            .arg("--add")
            .arg(path)
            .assert()
            .success()
            .stdout("");
    }

    fn stdout(&self, cwd: &Path, args: &[&str]) -> String {
        let output = self.cmd(cwd).args(args).output().expect("command run");
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).expect("utf8 stdout")
    }
}

#[test]
#[allow(deprecated)]
fn refuses_to_run_without_shell_integration() {
    let sandbox = Sandbox::new();
    Command::cargo_bin("waypoint")
        .expect("binary")
        .current_dir(&sandbox.root)
        .env_remove("WAYPOINT_SOURCED")
        .env("WAYPOINT_DATA_DIR", &sandbox.data_dir)
        .arg("--add")
        .arg(&sandbox.root)
        .assert()
        .code(1)
        .stdout("");
    assert!(!sandbox.data_dir.exists());
}

#[test]
fn jumps_to_added_directory() {
    let sandbox = Sandbox::new();
    let alpha = sandbox.dir("projects/alpha");
    let beta = sandbox.dir("projects/beta");
    sandbox.add(&alpha);
    sandbox.add(&beta);

    let out = sandbox.stdout(&sandbox.root, &["alp"]);
    assert_eq!(out, format!("{}\n", alpha.display()));
}

#[test]
fn heavier_directory_wins_within_a_tier() {
    let sandbox = Sandbox::new();
    let one = sandbox.dir("work/app-one");
    let two = sandbox.dir("work/app-two");
    sandbox.add(&one);
    sandbox.add(&two);
    sandbox.add(&two);

    let out = sandbox.stdout(&sandbox.root, &["app"]);
    assert_eq!(out.trim_end(), two.display().to_string());
}

#[test]
fn unmatched_jump_prints_dot() {
    let sandbox = Sandbox::new();
    let out = sandbox.stdout(&sandbox.root, &["nothing-here"]);
    assert_eq!(out, ".\n");
}

#[test]
fn current_directory_is_never_the_target() {
    let sandbox = Sandbox::new();
    let alpha = sandbox.dir("projects/alpha");
    sandbox.add(&alpha);

    assert_eq!(sandbox.stdout(&alpha, &["alpha"]), ".\n");
}

#[test]
fn increase_and_decrease_report_the_entry() {
    let sandbox = Sandbox::new();
    let here = sandbox.dir("here");

    let first = sandbox.stdout(&here, &["--increase"]);
    assert_eq!(first, format!("10.0:\t{}\n", here.display()));

    let second = sandbox.stdout(&here, &["--increase", "10"]);
    assert_eq!(second, format!("14.1:\t{}\n", here.display()));

    let decayed = sandbox.stdout(&here, &["--decrease", "100"]);
    assert_eq!(decayed, format!("0.0:\t{}\n", here.display()));
}

#[test]
fn invalid_weight_is_rejected() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd(&sandbox.root)
        .arg("--increase=-5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-negative"));
}

#[test]
fn complete_prints_menu_and_resolves_index() {
    let sandbox = Sandbox::new();
    let alpha = sandbox.dir("projects/alpha");
    let alps = sandbox.dir("projects/alps");
    sandbox.add(&alpha);
    sandbox.add(&alpha);
    sandbox.add(&alps);

    let menu = sandbox.stdout(&sandbox.root, &["--complete", "alp"]);
    let lines: Vec<&str> = menu.lines().collect();
    assert_eq!(lines[0], format!("alp__{}", alpha.display()));
    assert_eq!(lines[1], format!("alp__{}", alps.display()));
    assert!(lines.len() <= 9);

    let second = sandbox.stdout(&sandbox.root, &["--complete", "alp__2"]);
    assert_eq!(second, format!("{}\n", alps.display()));

    let chosen = sandbox.stdout(&sandbox.root, &["--complete", lines[1]]);
    assert_eq!(chosen, format!("{}\n", alps.display()));
}

#[test]
fn complete_offers_missing_directories() {
    let sandbox = Sandbox::new();
    let gone = sandbox.dir("projects/ghost");
    sandbox.add(&gone);
    fs::remove_dir(&gone).unwrap();

    let menu = sandbox.stdout(&sandbox.root, &["--complete", "ghost"]);
    assert!(menu.contains(&gone.display().to_string()));
    assert_eq!(sandbox.stdout(&sandbox.root, &["ghost"]), ".\n");
}

#[test]
fn purge_removes_missing_directories() {
    let sandbox = Sandbox::new();
    let kept = sandbox.dir("kept");
    let gone = sandbox.dir("gone");
    sandbox.add(&kept);
    sandbox.add(&gone);
    fs::remove_dir(&gone).unwrap();

    assert_eq!(
        sandbox.stdout(&sandbox.root, &["--purge"]),
        "Purged 1 entries.\n"
    );
    assert_eq!(
        sandbox.stdout(&sandbox.root, &["--purge"]),
        "Purged 0 entries.\n"
    );
}

#[test]
fn home_directory_is_not_recorded() {
    let sandbox = Sandbox::new();
    sandbox.add(&sandbox.home);

    let stat = sandbox.stdout(&sandbox.root, &["--stat"]);
    assert!(stat.contains("0:\t number of entries"), "{stat}");
}

#[test]
fn stat_lists_entries_and_data_path() {
    let sandbox = Sandbox::new();
    let alpha = sandbox.dir("projects/alpha");
    sandbox.add(&alpha);

    let stat = sandbox.stdout(&alpha, &["--stat"]);
    assert!(stat.contains(&format!("10.0:\t {}", alpha.display())));
    assert!(stat.contains("1:\t number of entries"));
    assert!(stat.contains("10.00:\t current directory weight"));
    assert!(stat.contains(&sandbox.data_dir.join("waypoint.txt").display().to_string()));
}

#[test]
fn version_flag_works_without_integration() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd(&sandbox.root)
        .env_remove("WAYPOINT_SOURCED")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("waypoint "));
}
