//! Platform diagnostic headers sent with every request.

use std::env::consts;

/// Version of this crate, reported in `X-Stainless-Package-Version`.
pub const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum supported compiler, reported in `X-Stainless-Runtime-Version`.
pub const RUNTIME_VERSION: &str = env!("CARGO_PKG_RUST_VERSION");

/// Returns the `User-Agent` value.
pub fn user_agent() -> String {
    format!("ModernTreasury/Rust {PACKAGE_VERSION}")
}

/// Returns the `X-Stainless-*` header pairs describing this platform.
pub fn platform_headers() -> [(&'static str, String); 6] {
    [
        ("X-Stainless-Lang", "rust".to_string()),
        ("X-Stainless-Package-Version", PACKAGE_VERSION.to_string()),
        ("X-Stainless-OS", normalized_os(consts::OS)),
        ("X-Stainless-Arch", normalized_arch(consts::ARCH)),
        ("X-Stainless-Runtime", "rust".to_string()),
        ("X-Stainless-Runtime-Version", RUNTIME_VERSION.to_string()),
    ]
}

fn normalized_os(os: &str) -> String {
    match os {
        "ios" => "iOS".to_string(),
        "android" => "Android".to_string(),
        "macos" => "MacOS".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        "openbsd" => "OpenBSD".to_string(),
        "linux" => "Linux".to_string(),
        other => format!("Other:{other}"),
    }
}

fn normalized_arch(arch: &str) -> String {
    match arch {
        "x86" => "x32".to_string(),
        "x86_64" => "x64".to_string(),
        "arm" => "arm".to_string(),
        "aarch64" => "arm64".to_string(),
        other => format!("other:{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_os() {
        assert_eq!(normalized_os("macos"), "MacOS");
        assert_eq!(normalized_os("linux"), "Linux");
        assert_eq!(normalized_os("solaris"), "Other:solaris");
    }

    #[test]
    fn test_normalized_arch() {
        assert_eq!(normalized_arch("x86_64"), "x64");
        assert_eq!(normalized_arch("aarch64"), "arm64");
        assert_eq!(normalized_arch("riscv64"), "other:riscv64");
    }

    #[test]
    fn test_platform_headers() {
        let headers = platform_headers();
        assert!(headers.iter().any(|(k, v)| *k == "X-Stainless-Lang" && v == "rust"));
        assert!(
            headers
                .iter()
                .any(|(k, v)| *k == "X-Stainless-Package-Version" && v == PACKAGE_VERSION)
        );
        assert!(user_agent().starts_with("ModernTreasury/Rust "));
    }
}
