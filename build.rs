fn main() {
    // Re-run if git HEAD changes (new commits, checkouts, etc.)
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default();

    let on_tag = std::process::Command::new("git")
        .args(["describe", "--exact-match", "--tags", "HEAD"])
        .output()
        .ok()
        .is_some_and(|o| o.status.success());

    // Baked into `dirindex --version`: release builds print the crate
    // version, everything else prints `dev@<hash>`.
    println!("cargo:rustc-env=DIRINDEX_GIT_HASH={hash}");
    println!("cargo:rustc-env=DIRINDEX_ON_RELEASE_TAG={on_tag}");
}
