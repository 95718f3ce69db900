use std::process::Command;

fn main() {
    let pkg_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());

    // Short commit hash, absent outside a git checkout
    let revision = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|rev| !rev.is_empty());

    let version = match revision {
        Some(rev) => format!("{}+{}", pkg_version, rev),
        None => pkg_version,
    };

    println!("cargo:rustc-env=PHOTOSET_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
}
