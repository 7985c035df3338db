use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};
use tinysh::{Config, Policy, Session, Shell, ShellStatus};

struct Fixture {
    root: TempDir,
    shell: Shell,
}

impl Fixture {
    /// A shell whose search path is `<tmp>/d1:<tmp>/d2` and whose working
    /// directory and home are `<tmp>/work`.
    fn new(policy: Policy) -> Self {
        let root = tempdir().unwrap();
        let base = root.path().canonicalize().unwrap();
        let work = base.join("work");
        fs::create_dir(&work).unwrap();

        let mut config = Config::default();
        config.apply_overrides([
            format!("PATH={}:{}", base.join("d1").display(), base.join("d2").display()),
            format!("HOME={}", work.display()),
        ]);
        config.policy = policy;

        let session = Session::new(&work, config.home.clone());
        let shell = Shell::new(config, session);
        Self { root, shell }
    }

    fn base(&self) -> std::path::PathBuf {
        self.root.path().canonicalize().unwrap()
    }

    fn run(&mut self, line: &str) -> (ShellStatus, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let status = self.shell.run_line(line, &mut out, &mut err);
        (
            status,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    fn out(&mut self, line: &str) -> String {
        self.run(line).1
    }
}

#[cfg(unix)]
fn install_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_search_path_directories_are_created() {
    let fx = Fixture::new(Policy::Lenient);
    assert!(fx.base().join("d1").is_dir());
    assert!(fx.base().join("d2").is_dir());
    assert_eq!(fx.shell.resolver().search_path().dirs().len(), 2);
}

#[test]
fn test_echo_and_quoting() {
    let mut fx = Fixture::new(Policy::Lenient);
    assert_eq!(fx.out("echo 'a   b' c"), "a   b c\n");
    assert_eq!(fx.out(r#"echo "a\"b" x\ y"#), "a\"b x y\n");
    assert_eq!(fx.out("echo"), "\n");
    assert_eq!(fx.out("echo ''"), "\n");
    assert_eq!(fx.out(r#"'' echo "" hi"#), "hi\n");
}

#[test]
fn test_builtin_output_is_repeatable() {
    let mut fx = Fixture::new(Policy::Lenient);
    for line in ["echo same thing", "pwd", "type echo cd"] {
        assert_eq!(fx.run(line), fx.run(line));
    }
}

#[test]
fn test_type_builtins_ignore_search_path() {
    let mut fx = Fixture::new(Policy::Lenient);
    for name in ["echo", "exit", "type", "pwd"] {
        fs::write(fx.base().join("d1").join(name), "").unwrap();
        assert_eq!(fx.out(&format!("type {}", name)), format!("{} is a shell builtin\n", name));
    }
}

#[test]
fn test_type_prefers_first_directory() {
    let mut fx = Fixture::new(Policy::Lenient);
    let base = fx.base();
    fs::write(base.join("d1").join("foo"), "").unwrap();
    fs::write(base.join("d2").join("foo"), "").unwrap();
    fs::write(base.join("d2").join("bar"), "").unwrap();

    assert_eq!(fx.out("type foo"), format!("foo is {}\n", base.join("d1/foo").display()));
    assert_eq!(fx.out("type bar"), format!("bar is {}\n", base.join("d2/bar").display()));
    assert_eq!(fx.out("type baz"), "baz: not found\n");
}

#[test]
fn test_cd_and_pwd() {
    let mut fx = Fixture::new(Policy::Lenient);
    let work = fx.base().join("work");
    fs::create_dir(work.join("inner")).unwrap();

    assert_eq!(fx.out("pwd"), format!("{}\n", work.display()));
    assert_eq!(fx.out("cd inner"), "");
    assert_eq!(fx.out("pwd"), format!("{}\n", work.join("inner").display()));

    assert_eq!(fx.out("cd /does/not/exist"), "cd: /does/not/exist: No such file or directory\n");
    assert_eq!(fx.out("pwd"), format!("{}\n", work.join("inner").display()));

    fs::write(work.join("notes"), "").unwrap();
    assert_eq!(fx.out("cd ~/notes"), "cd: ~/notes: Not a directory\n");
    assert_eq!(fx.out("pwd"), format!("{}\n", work.join("inner").display()));

    assert_eq!(fx.out("cd ~"), "");
    assert_eq!(fx.out("pwd"), format!("{}\n", work.display()));
}

#[test]
fn test_cat_policies() {
    let mut lenient = Fixture::new(Policy::Lenient);
    let work = lenient.base().join("work");
    fs::write(work.join("file a"), "A\n").unwrap();
    fs::write(work.join("b"), "B").unwrap();
    assert_eq!(
        lenient.run("cat 'file a' gone b"),
        (ShellStatus::Continue, "A\nB".to_string(), String::new())
    );

    let mut strict = Fixture::new(Policy::Strict);
    let (_, out, err) = strict.run("cat gone");
    assert_eq!(out, "");
    assert_eq!(err, "cat: gone: No such file or directory\n");
}

#[test]
fn test_strict_policy_rejects_open_quote() {
    let mut lenient = Fixture::new(Policy::Lenient);
    assert_eq!(lenient.out("echo \"unfinished"), "unfinished\n");

    let mut strict = Fixture::new(Policy::Strict);
    let (status, out, err) = strict.run("echo \"unfinished");
    assert_eq!(status, ShellStatus::Continue);
    assert_eq!(out, "");
    assert!(err.starts_with("tinysh: "), "{err}");
}

#[test]
fn test_command_not_found_and_exit() {
    let mut fx = Fixture::new(Policy::Lenient);
    assert_eq!(
        fx.run("frobnicate now"),
        (
            ShellStatus::Continue,
            "frobnicate: command not found\n".to_string(),
            String::new()
        )
    );
    assert_eq!(fx.run("exit 5").0, ShellStatus::Exit(5));
    assert_eq!(fx.run("   ").1, "");
}

#[cfg(unix)]
#[test]
fn test_external_program_output_is_captured() {
    let mut fx = Fixture::new(Policy::Lenient);
    let base = fx.base();
    install_script(&base.join("d2").join("greet"), r#"printf '%s|' "$@"; echo"#);
    install_script(&base.join("d2").join("where"), "pwd -P");

    assert_eq!(fx.out("greet 'a b' c\\ d \"e\""), "a b|c d|e|\n");
    assert_eq!(fx.out("where"), format!("{}\n", base.join("work").display()));
}

#[cfg(unix)]
#[test]
fn test_non_executable_file_is_not_run() {
    let mut fx = Fixture::new(Policy::Lenient);
    let base = fx.base();
    fs::write(base.join("d1").join("plain"), "echo hi").unwrap();

    assert_eq!(fx.out("plain"), "plain: command not found\n");
    assert_eq!(fx.out("type plain"), format!("plain is {}\n", base.join("d1/plain").display()));
}
