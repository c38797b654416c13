use colored::Colorize;
use std::process::{Command, ExitStatus, Stdio};

use crate::{project_root, DynError};

const PACKAGE: &str = "mongo_client_settings";

pub fn ci() -> Result<(), DynError> {
    let steps = [
        ("check", vec!["check", "-p", PACKAGE, "--all-targets"]),
        (
            "clippy",
            vec!["clippy", "-p", PACKAGE, "--all-targets", "--", "-D", "warnings"],
        ),
        ("build demo", vec!["build", "-p", PACKAGE, "--example", "demo"]),
        ("unit and integration tests", vec!["nextest", "run", "-p", PACKAGE]),
        ("doc tests", vec!["test", "-p", PACKAGE, "--doc"]),
        ("formatting", vec!["fmt", "--all", "--check"]),
    ];

    for (name, args) in steps {
        println!("{} {}...", "Running".truecolor(255, 165, 0), name.bold());
        let status = cargo_command(&args).status()?;
        if !status.success() {
            report_failure(name, status);
            return Err(format!("CI step `{}` failed", name).into());
        }
    }

    println!("{}", "All CI steps passed".green());
    Ok(())
}

fn report_failure(step: &str, status: ExitStatus) {
    let code = status
        .code()
        .map(|code| code.to_string())
        .unwrap_or_else(|| "<< no status code >>".to_string());
    println!(
        "{} `{}` finished with a non-zero status code: {}",
        "Error:".red(),
        step.blue(),
        code
    );
}

fn cargo_command(args: &[&str]) -> Command {
    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let mut cmd = Command::new(cargo);
    cmd.current_dir(project_root())
        .args(args)
        .stdout(Stdio::inherit());
    cmd
}
