use crate::cli::LintArgs;
use color_eyre::eyre::{eyre, Result};
use duct::cmd;
use std::fs;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckId {
    Fmt,
    Clippy,
    Test,
}

/// A cargo invocation in the lint pipeline.
struct Check {
    id: CheckId,
    args: &'static [&'static str],
    /// Arguments used instead of `args` with `--fix`.
    fix_args: Option<&'static [&'static str]>,
}

const CHECKS: &[Check] = &[
    Check {
        id: CheckId::Fmt,
        args: &["fmt", "--all", "--check"],
        fix_args: Some(&["fmt", "--all"]),
    },
    Check {
        id: CheckId::Clippy,
        args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        fix_args: Some(&[
            "clippy",
            "--workspace",
            "--all-targets",
            "--fix",
            "--allow-dirty",
            "--",
            "-D",
            "warnings",
        ]),
    },
    Check {
        id: CheckId::Test,
        args: &["test", "--workspace", "--all-targets"],
        fix_args: None,
    },
];

fn should_skip(id: CheckId, args: &LintArgs) -> bool {
    match id {
        CheckId::Fmt => args.no_fmt,
        CheckId::Clippy => args.no_clippy,
        CheckId::Test => args.no_test,
    }
}

fn effective_args(check: &Check, fix: bool) -> &'static [&'static str] {
    match check.fix_args {
        Some(fix_args) if fix => fix_args,
        _ => check.args,
    }
}

fn display_name(args: &[&str]) -> String {
    format!("cargo {}", args.join(" "))
}

fn format_log_entry(name: &str, output: &str) -> String {
    format!("=== {name} ===\n{output}\n")
}

/// Run every enabled check in order and stop at the first failure.
///
/// All output is appended to `target/xtask-lint.log`.
pub fn run(args: &LintArgs) -> Result<()> {
    let target_dir = std::env::current_dir()?.join("target");
    fs::create_dir_all(&target_dir)?;
    let log_path = target_dir.join("xtask-lint.log");
    let mut log_file = fs::File::create(&log_path)?;

    for check in CHECKS.iter().filter(|c| !should_skip(c.id, args)) {
        let check_args = effective_args(check, args.fix);
        let name = display_name(check_args);
        println!("running {name}");

        let output = cmd("cargo", check_args)
            .stderr_to_stdout()
            .stdout_capture()
            .unchecked()
            .run()?;
        let text = String::from_utf8_lossy(&output.stdout);
        write!(log_file, "{}", format_log_entry(&name, &text))?;

        if !output.status.success() {
            print!("{text}");
            println!("log: {}", log_path.display());
            return Err(eyre!("lint failed at: {name}"));
        }
        if args.verbose {
            print!("{text}");
        }
    }

    println!("log: {}", log_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_mode_swaps_args() {
        let fmt = &CHECKS[0];
        assert_eq!(display_name(effective_args(fmt, false)), "cargo fmt --all --check");
        assert_eq!(display_name(effective_args(fmt, true)), "cargo fmt --all");

        let test = &CHECKS[2];
        assert_eq!(effective_args(test, true), test.args);
    }

    #[test]
    fn test_skip_flags() {
        let args = LintArgs {
            no_clippy: true,
            ..LintArgs::default()
        };

        assert!(!should_skip(CheckId::Fmt, &args));
        assert!(should_skip(CheckId::Clippy, &args));
        assert!(!should_skip(CheckId::Test, &args));
    }

    #[test]
    fn test_log_entry() {
        assert_eq!(
            format_log_entry("cargo test", "ok"),
            "=== cargo test ===\nok\n"
        );
    }
}
