use chrono::{DateTime, Local};
use std::{process::Command, time::SystemTime};

fn exe_cmd(cmd: &mut Command) -> anyhow::Result<String> {
    let output = cmd.output()?;

    if output.status.success() {
        Ok(String::from_utf8(output.stdout)?)
    } else {
        anyhow::bail!(String::from_utf8(output.stderr)?)
    }
}

fn main() {
    // 源码不在git仓库中时(例如打包发布), 版本信息中不带git信息
    let git_commit_hash = match exe_cmd(Command::new("git").args([
        "log",
        "-n",
        "1",
        "--pretty=format:%H",
    ])) {
        Ok(s) => s[..8.min(s.len())].trim().to_string(),
        Err(e) => {
            println!("cargo:warning=git log run failed: {}", e.to_string().trim());
            String::default()
        }
    };

    let git_branch = exe_cmd(Command::new("git").args(["branch", "--show-current"]))
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    println!(
        "cargo:rustc-env=RSACBC_VERSION_INFO={}-{}",
        env!("CARGO_PKG_VERSION"),
        DateTime::<Local>::from(SystemTime::now()).format("%Y/%m/%d-%H:%M:%S:%Z")
    );

    println!(
        "cargo:rustc-env=RSACBC_GIT_INFO={}-{}",
        git_branch, git_commit_hash
    );
}
