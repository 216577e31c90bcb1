use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn cmd() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("buildtasks").unwrap()
}

#[test]
fn grep_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "alpha 1\nbeta 2\n").unwrap();

    cmd()
        .current_dir(dir.path())
        .args([
            "grep",
            "--pattern",
            r"(?P<Word>[a-z]+) (?P<Num>\d)",
            "--output",
            "out.xml",
            "a.txt",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 matches from 1 files"));

    let report = fs::read_to_string(dir.path().join("out.xml")).unwrap();
    assert!(report.starts_with("<?xml"));
    assert!(report.contains("<Word>alpha</Word>"), "{report}");
    assert!(report.contains("<Num>2</Num>"), "{report}");
    assert!(report.contains("<LineNumber>2</LineNumber>"), "{report}");
    assert!(report.contains("<File>a.txt</File>"), "{report}");
}

#[test]
fn grep_without_matches_writes_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "nothing here").unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["grep", "-p", r"(?P<N>\d+)", "-o", "out.xml", "a.txt"])
        .assert()
        .success();

    let report = fs::read_to_string(dir.path().join("out.xml")).unwrap();
    assert!(report.contains("Matches"));
    assert!(!report.contains("<Match>"));
}

#[test]
fn grep_include_glob_from_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/a.cs"), "// TODO: one\n").unwrap();
    fs::write(dir.path().join("src/b.cs"), "// TODO: two\n").unwrap();
    fs::write(dir.path().join("src/c.txt"), "// TODO: skipped\n").unwrap();
    fs::write(
        dir.path().join(".buildtasksrc.toml"),
        "[grep]\npattern = \"TODO: (?P<Todo>\\\\w+)\"\noutput_file = \"todos.xml\"\ninclude = [\"**/*.cs\"]\n",
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["grep"])
        .assert()
        .success();

    let report = fs::read_to_string(dir.path().join("todos.xml")).unwrap();
    assert!(report.contains("<Todo>one</Todo>"), "{report}");
    assert!(report.contains("<Todo>two</Todo>"), "{report}");
    assert!(!report.contains("skipped"), "{report}");
}

#[test]
fn grep_invalid_pattern_fails_with_code() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "x").unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["grep", "-p", "(unclosed", "-o", "out.xml", "a.txt"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error[BT0003]"));
    assert!(!dir.path().join("out.xml").exists());
}

#[test]
fn grep_missing_input_fails_without_report() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["grep", "-p", "x", "-o", "out.xml", "missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[BT0001]"));
    assert!(!dir.path().join("out.xml").exists());
}

#[test]
fn grep_requires_pattern() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["grep", "-o", "out.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pattern is required"));
}

#[test]
fn init_creates_config() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created .buildtasksrc.toml"));
    assert!(dir.path().join(".buildtasksrc.toml").exists());
}

#[test]
fn init_fails_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".buildtasksrc.toml"), "").unwrap();
    cmd()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn grep_config_inputs_resolve_under_root() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("project");
    fs::create_dir_all(project.join("src")).unwrap();
    fs::write(project.join("src/a.cs"), "// TODO: listed\n").unwrap();
    fs::write(dir.path().join("b.cs"), "// TODO: positional\n").unwrap();
    fs::write(
        project.join(".buildtasksrc.toml"),
        "[grep]\npattern = \"TODO: (?P<Todo>\\\\w+)\"\ninput_files = [\"src/a.cs\"]\n",
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["grep", "--root", "project", "-o", "out.xml", "b.cs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 matches from 2 files"));

    let report = fs::read_to_string(dir.path().join("out.xml")).unwrap();
    assert!(report.contains("<Todo>positional</Todo>"), "{report}");
    assert!(report.contains("<Todo>listed</Todo>"), "{report}");
}

#[test]
fn item_prints_identity_and_metadata() {
    cmd()
        .args([
            "item",
            "--pattern",
            r"^(?P<name>.*)\.(?P<ext>\w+)$",
            "bla.xml",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("bla.xml"))
        .stdout(predicate::str::contains("name = bla"))
        .stdout(predicate::str::contains("ext = xml"));
}

#[test]
fn item_json_output() {
    let output = cmd()
        .args(["item", "-p", r"(?P<lastword>\w+)$", "a test sentence", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let item: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(item["identity"], "sentence");
}

#[test]
fn item_without_match_fails_with_code() {
    cmd()
        .args(["item", "-p", r"(?P<n>\d+)", "no digits"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error[BT0008]"));
}

#[test]
fn stats_counts_and_appends_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.cs"), "// header\nclass A {}\n\n").unwrap();
    fs::write(dir.path().join("b.vb"), "' note\nModule M\nEnd Module\n").unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["stats", "--label", "C#", "--include", "*.cs", "-o", "stats.xml"])
        .args(["--build-name", "first", "--append"])
        .assert()
        .success()
        .stdout(predicate::str::contains("C#: 3 lines, 1 comment, 1 empty (1 files)"));

    cmd()
        .current_dir(dir.path())
        .args(["stats", "--label", "VB.NET", "b.vb", "-o", "stats.xml"])
        .args(["--build-name", "second", "--append", "--summarize"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VB.NET: 3 lines, 1 comment, 0 empty"));

    let report = fs::read_to_string(dir.path().join("stats.xml")).unwrap();
    assert!(report.contains("<code-summaries>"), "{report}");
    assert!(report.contains(r#"buildname="first""#), "{report}");
    assert!(report.contains(r#"buildname="second""#), "{report}");
    assert_eq!(report.matches("<file-summary ").count(), 1, "{report}");
}

#[test]
fn stats_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["stats", "missing.cs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[BT0001]"));
}

#[test]
fn fxcop_without_tool_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .env_remove("FXCOP_PATH")
        .args(["fxcop", "App.dll", "--tool-path", "no-such-dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[BT0006]"));
}

#[cfg(unix)]
mod fake_tool {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    const REPORT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<FxCopReport Version="1.36">
  <Targets>
    <Target Name="App.dll">
      <Messages>
        <Message CheckId="CA1822" Category="Microsoft.Performance" Status="Active">
          <Issue Path="src" File="A.cs" Line="7">Mark as static.</Issue>
        </Message>
      </Messages>
    </Target>
  </Targets>
</FxCopReport>"#;

    /// Installs a shell script standing in for FxCopCmd that writes
    /// `REPORT` to the `/out:` path and exits with `code`.
    fn install(dir: &Path, code: i32) {
        let tool_dir = dir.join("fxcop");
        fs::create_dir(&tool_dir).unwrap();
        let script = format!(
            "#!/bin/sh\n\
             for a in \"$@\"; do\n\
               case \"$a\" in\n\
                 /out:*) out=\"${{a#/out:}}\"; out=\"${{out#\\\"}}\"; out=\"${{out%\\\"}}\";;\n\
               esac\n\
             done\n\
             cat > \"$out\" <<'XML'\n{REPORT}\nXML\n\
             exit {code}\n"
        );
        let tool = tool_dir.join("FxCopCmd.exe");
        fs::write(&tool, script).unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(
            dir.join(".buildtasksrc.toml"),
            "[fxcop]\ntool_path = \"fxcop\"\nuse_response_file = false\n",
        )
        .unwrap();
    }

    #[test]
    fn fxcop_warnings_pass() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path(), 0);

        let output = cmd()
            .current_dir(dir.path())
            .args(["fxcop", "App.dll", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(parsed["summary"]["warnings"], 1);
        assert_eq!(parsed["summary"]["errors"], 0);
        assert_eq!(parsed["diagnostics"][0]["check_id"], "CA1822");
        assert_eq!(parsed["diagnostics"][0]["line"], 7);
    }

    #[test]
    fn fxcop_treat_warnings_as_errors_fails() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path(), 0);

        cmd()
            .current_dir(dir.path())
            .args(["fxcop", "App.dll", "--treat-warnings-as-errors"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("error[BT0005]"));
    }

    #[test]
    fn fxcop_fatal_exit_code_fails() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path(), 0x80);

        cmd()
            .current_dir(dir.path())
            .args(["fxcop", "App.dll", "--format", "github"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("::error title=CA0059::"))
            .stderr(predicate::str::contains("error[CA0059]"));
    }

    #[test]
    fn fxcop_keeps_report_with_out() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path(), 0);

        cmd()
            .current_dir(dir.path())
            .args(["fxcop", "App.dll", "--out", "analysis.xml"])
            .assert()
            .success()
            .stdout(predicate::str::contains("CA1822"));
        let kept = fs::read_to_string(dir.path().join("analysis.xml")).unwrap();
        assert!(kept.contains("FxCopReport"));
    }
}
