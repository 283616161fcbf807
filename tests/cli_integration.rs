//! CLI integration tests for bosh-render
//!
//! These tests drive the binary end to end: flags and environment variables
//! in, rendered files under the jobs output directory out.

use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command instance for the bosh-render binary with a clean environment
fn render_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("bosh-render"));
    cmd.env_clear();
    cmd
}

const MANIFEST: &str = r#"
name: test-deployment
instance_groups:
- name: ig1
  jobs:
  - name: web
    release: r1
    properties:
      port: 8080
      bosh_containerization:
        instances:
        - {address: 10.0.0.1, az: z1, id: u0, index: 0, name: web/0}
        - {address: 10.0.0.2, az: z1, id: u1, index: 1, name: web/1}
        - {address: 10.0.0.5, az: z2, id: u4, index: 4, name: web/4}
- name: ig2
  jobs:
  - name: worker
    release: r1
    properties:
      bosh_containerization:
        instances:
        - {address: 10.0.1.1, az: z1, id: w0, index: 0, name: worker/0}
"#;

/// A deployment fixture with manifest, job sources and an output directory
struct Deployment {
    dir: TempDir,
}

impl Deployment {
    /// Creates job `web` of release `r1` with the given `job.MF` templates
    fn new(templates: &[(&str, &str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("manifest.yml"), MANIFEST).unwrap();

        let job_dir = dir.path().join("jobs/jobs-src/r1/web");
        fs::create_dir_all(job_dir.join("templates")).unwrap();

        let mut job_mf = String::from("name: web\ntemplates:\n");
        for (source, destination, content) in templates {
            job_mf.push_str(&format!("  {}: {}\n", source, destination));
            fs::write(job_dir.join("templates").join(source), content).unwrap();
        }
        job_mf.push_str("properties:\n  log_level:\n    default: info\n");
        fs::write(job_dir.join("job.MF"), job_mf).unwrap();

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn out(&self) -> PathBuf {
        self.path().join("out")
    }

    /// `template-render` with input paths set through flags
    fn render(&self, group: &str) -> assert_cmd::Command {
        let mut cmd = render_cmd();
        cmd.arg("template-render")
            .arg("--bosh-manifest-path")
            .arg(self.path().join("manifest.yml"))
            .arg("--jobs-dir")
            .arg(self.path().join("jobs"))
            .arg("--jobs-output-dir")
            .arg(self.out())
            .arg("--instance-group-name")
            .arg(group);
        cmd
    }
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_explicit_index_renders_template() {
    let deployment = Deployment::new(&[("conf.erb", "etc/conf", "name=<%= spec.name %>")]);

    deployment
        .render("ig1")
        .args(["--spec-index", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered 1 file(s)"));

    let rendered = fs::read_to_string(deployment.out().join("web/etc/conf")).unwrap();
    assert_eq!(rendered, "name=web/0");
}

#[test]
fn test_properties_and_defaults_render() {
    let deployment = Deployment::new(&[(
        "app.yml.erb",
        "config/app.yml",
        "port: <%= p('port') %>\nlog: <%= p('log_level') %>\naz: <%= spec.az %>\n",
    )]);

    deployment
        .render("ig1")
        .args(["--spec-index", "1"])
        .assert()
        .success();

    let rendered = fs::read_to_string(deployment.out().join("web/config/app.yml")).unwrap();
    assert_eq!(rendered, "port: 8080\nlog: info\naz: z1\n");
}

#[test]
fn test_computed_index_from_environment() {
    let deployment = Deployment::new(&[("conf.erb", "etc/conf", "<%= spec.index %>:<%= spec.id %>")]);

    deployment
        .render("ig1")
        .env("AZ_INDEX", "2")
        .env("REPLICAS", "3")
        .env("POD_ORDINAL", "1")
        .assert()
        .success();

    let rendered = fs::read_to_string(deployment.out().join("web/etc/conf")).unwrap();
    assert_eq!(rendered, "4:u4");
}

#[test]
fn test_all_inputs_from_environment() {
    let deployment = Deployment::new(&[("conf.erb", "etc/conf", "<%= spec.address %>")]);

    render_cmd()
        .arg("template-render")
        .env("BOSH_MANIFEST_PATH", deployment.path().join("manifest.yml"))
        .env("JOBS_DIR", deployment.path().join("jobs"))
        .env("JOBS_OUTPUT_DIR", deployment.out())
        .env("INSTANCE_GROUP_NAME", "ig1")
        .env("SPEC_INDEX", "1")
        .assert()
        .success();

    let rendered = fs::read_to_string(deployment.out().join("web/etc/conf")).unwrap();
    assert_eq!(rendered, "10.0.0.2");
}

#[test]
fn test_nested_destination_creates_directories() {
    let deployment = Deployment::new(&[("a.erb", "sub/dir/out", "x")]);

    deployment
        .render("ig1")
        .args(["--spec-index", "0"])
        .assert()
        .success();

    let sub_dir = deployment.out().join("web/sub/dir");
    assert!(sub_dir.is_dir());
    assert!(sub_dir.join("out").is_file());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&sub_dir).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode & !0o755, 0, "mode {:o} exceeds 0755", mode);
    }
}

#[test]
fn test_rendering_is_idempotent() {
    let deployment = Deployment::new(&[
        ("conf.erb", "etc/conf", "name=<%= spec.name %>\n"),
        ("bpm.erb", "config/bpm.yml", "port=<%= p('port') %>\n"),
    ]);

    deployment.render("ig1").args(["--spec-index", "0"]).assert().success();
    let first_conf = fs::read(deployment.out().join("web/etc/conf")).unwrap();
    let first_bpm = fs::read(deployment.out().join("web/config/bpm.yml")).unwrap();

    deployment.render("ig1").args(["--spec-index", "0"]).assert().success();
    assert_eq!(fs::read(deployment.out().join("web/etc/conf")).unwrap(), first_conf);
    assert_eq!(fs::read(deployment.out().join("web/config/bpm.yml")).unwrap(), first_bpm);
}

#[test]
fn test_json_summary() {
    let deployment = Deployment::new(&[("conf.erb", "etc/conf", "x")]);

    let output = deployment
        .render("ig1")
        .args(["--spec-index", "0", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["matched"], true);
    assert_eq!(json["deployment"], "test-deployment");
    assert_eq!(json["spec_index"], 0);
    assert_eq!(json["jobs"][0]["name"], "web");
    assert_eq!(json["jobs"][0]["instance"], "web/0");
    assert_eq!(json["jobs"][0]["files"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_missing_instance_fails() {
    let deployment = Deployment::new(&[("conf.erb", "etc/conf", "x")]);

    deployment
        .render("ig1")
        .args(["--spec-index", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no instance found for spec index '9'"));

    assert!(!deployment.out().join("web").exists());
}

#[test]
fn test_unknown_instance_group_writes_nothing() {
    let deployment = Deployment::new(&[("conf.erb", "etc/conf", "x")]);

    deployment
        .render("absent")
        .args(["--spec-index", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing rendered"));

    assert!(!deployment.out().exists());
}

#[test]
fn test_missing_az_index_fails() {
    let deployment = Deployment::new(&[("conf.erb", "etc/conf", "x")]);

    deployment
        .render("ig1")
        .args(["--replicas", "3", "--pod-ordinal", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required parameter 'az-index' not set"));
}

#[test]
fn test_missing_manifest_fails() {
    let deployment = Deployment::new(&[]);
    fs::remove_file(deployment.path().join("manifest.yml")).unwrap();

    deployment
        .render("ig1")
        .args(["--spec-index", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("couldn't read file"))
        .stderr(predicate::str::contains("manifest.yml"));
}

#[test]
fn test_missing_template_source_fails_with_context() {
    let deployment = Deployment::new(&[("conf.erb", "etc/conf", "x")]);
    fs::remove_file(deployment.path().join("jobs/jobs-src/r1/web/templates/conf.erb")).unwrap();

    deployment
        .render("ig1")
        .args(["--spec-index", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to render template 'conf.erb' of job 'web'"));
}

#[test]
fn test_missing_job_spec_for_other_group_fails() {
    // ig2's job has no sources staged
    let deployment = Deployment::new(&[("conf.erb", "etc/conf", "x")]);

    deployment
        .render("ig2")
        .args(["--spec-index", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("job.MF"));
}

// =============================================================================
// resolve-index
// =============================================================================

#[test]
fn test_resolve_index_formula() {
    render_cmd()
        .args(["resolve-index", "--az-index", "2", "--replicas", "3", "--pod-ordinal", "1"])
        .assert()
        .success()
        .stdout("4\n");
}

#[test]
fn test_resolve_index_explicit_json() {
    let output = render_cmd()
        .args(["resolve-index", "--spec-index", "5", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["spec_index"], 5);
    assert_eq!(json["inputs"]["az_index"], -1);
}

#[test]
fn test_resolve_index_missing_replicas() {
    render_cmd()
        .args(["resolve-index", "--az-index", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required parameter 'replicas' not set"));
}
