use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use docker_startup::{
    prepare, ContainerRuntime, ExecContext, PrepareOutcome, RunOptions, StartupError,
};

/// Records docker invocations; optionally fails the n-th call.
#[derive(Default)]
struct RecordingRuntime {
    calls: RefCell<Vec<Vec<String>>>,
    fail_on: Option<usize>,
}

impl ContainerRuntime for RecordingRuntime {
    fn docker(&self, args: &[String], _ctx: &ExecContext) -> docker_startup::Result<String> {
        let idx = self.calls.borrow().len();
        self.calls.borrow_mut().push(args.to_vec());
        if self.fail_on == Some(idx) {
            return Err(StartupError::ExternalProcess {
                command: "docker run".to_string(),
                status: Some(1),
                stderr: "stat: cannot stat '/etc/missing': No such file or directory".to_string(),
            });
        }
        Ok(String::new())
    }
}

fn write_config(dir: &Path, body: &str) {
    fs::write(dir.join("startup.yml"), body).expect("write startup.yml");
}

fn options(cwd: &Path, volume_root: &Path) -> RunOptions {
    RunOptions::new(cwd, "nginx:1.25").volume_root(volume_root.display().to_string())
}

#[test]
fn int_prepare_existing_host_path_issues_no_docker_call() {
    let work = tempfile::tempdir().expect("tmpdir");
    let vols = tempfile::tempdir().expect("tmpdir");
    write_config(
        work.path(),
        "containerName: web\nconfigFileMount:\n  - \"nginx.conf:/etc/nginx/nginx.conf\"\n",
    );
    let existing = vols.path().join("web").join("nginx.conf");
    fs::create_dir_all(existing.parent().unwrap()).expect("mkdir");
    fs::write(&existing, "user nginx;").expect("write");

    let rt = RecordingRuntime::default();
    let out = prepare(&options(work.path(), vols.path()), &rt).expect("prepare");

    assert_eq!(out, vec![PrepareOutcome::Existing(existing.clone())]);
    assert!(rt.calls.borrow().is_empty());
    assert_eq!(fs::read_to_string(&existing).unwrap(), "user nginx;");
}

#[test]
fn int_prepare_missing_host_path_extracts_once_from_parent_dir() {
    let work = tempfile::tempdir().expect("tmpdir");
    let vols = tempfile::tempdir().expect("tmpdir");
    write_config(
        work.path(),
        "containerName: web\nvolumeSubDirectory: sub\nconfigFileMount:\n  - \"conf/nginx/:/etc/nginx/\"\n",
    );

    let rt = RecordingRuntime::default();
    let out = prepare(&options(work.path(), vols.path()), &rt).expect("prepare");

    let host = vols.path().join("sub").join("conf").join("nginx");
    assert_eq!(out, vec![PrepareOutcome::Extracted(host.clone())]);

    let calls = rt.calls.borrow();
    assert_eq!(calls.len(), 1);
    let parent = host.parent().unwrap();
    assert_eq!(
        calls[0][..5],
        [
            "run".to_string(),
            "--rm".to_string(),
            "-v".to_string(),
            format!("{}:/copy_data_tmp", parent.display()),
            "nginx:1.25".to_string(),
        ]
    );
    assert_eq!(
        calls[0][7],
        "stat /etc/nginx > /dev/null && cp -r /etc/nginx /copy_data_tmp/nginx"
    );
    // parent directory exists so the bind mount has a source
    assert!(parent.is_dir());
}

#[test]
fn int_prepare_processes_mounts_in_order_and_mixes_outcomes() {
    let work = tempfile::tempdir().expect("tmpdir");
    let vols = tempfile::tempdir().expect("tmpdir");
    write_config(
        work.path(),
        "configFileMount:\n  - \"b.conf:/etc/b.conf\"\n  - \"a.conf:/etc/a.conf\"\n",
    );
    fs::write(vols.path().join("a.conf"), "").expect("write");

    let rt = RecordingRuntime::default();
    let out = prepare(&options(work.path(), vols.path()), &rt).expect("prepare");

    assert_eq!(
        out,
        vec![
            PrepareOutcome::Extracted(vols.path().join("b.conf")),
            PrepareOutcome::Existing(vols.path().join("a.conf")),
        ]
    );
    assert_eq!(rt.calls.borrow().len(), 1);
}

#[test]
fn int_prepare_stops_at_first_failed_extraction() {
    let work = tempfile::tempdir().expect("tmpdir");
    let vols = tempfile::tempdir().expect("tmpdir");
    write_config(
        work.path(),
        "configFileMount:\n  - \"one:/etc/one\"\n  - \"two:/etc/missing\"\n  - \"three:/etc/three\"\n",
    );

    let rt = RecordingRuntime {
        fail_on: Some(1),
        ..RecordingRuntime::default()
    };
    let err = prepare(&options(work.path(), vols.path()), &rt).expect_err("should fail");

    assert!(matches!(err, StartupError::ExternalProcess { .. }));
    assert_eq!(rt.calls.borrow().len(), 2, "third mount must not be attempted");
}

#[test]
fn int_prepare_requires_config_file() {
    let work = tempfile::tempdir().expect("tmpdir");
    let rt = RecordingRuntime::default();
    let err = prepare(&options(work.path(), work.path()), &rt).expect_err("missing config");
    assert_eq!(err.to_string(), "Could not find startup.yml");
}

#[test]
fn int_prepare_requires_volume_root() {
    let work = tempfile::tempdir().expect("tmpdir");
    write_config(work.path(), "configFileMount: [\"a:/a\"]\n");
    let rt = RecordingRuntime::default();
    let opts = RunOptions::new(work.path(), "img").env(BTreeMap::new());
    let err = prepare(&opts, &rt).expect_err("no volume root");
    assert!(matches!(err, StartupError::MissingVolumeRoot));
    assert!(rt.calls.borrow().is_empty());
}

#[test]
fn int_prepare_reports_malformed_mount() {
    let work = tempfile::tempdir().expect("tmpdir");
    write_config(work.path(), "configFileMount: [\"onlyonepart\"]\n");
    let rt = RecordingRuntime::default();
    let err = prepare(&options(work.path(), work.path()), &rt).expect_err("malformed");
    match err {
        StartupError::MalformedMount { spec } => assert_eq!(spec, "onlyonepart"),
        other => panic!("unexpected error: {other:?}"),
    }
}
