fn main() {
    // Embed the application manifest when building with the MSVC Windows toolchain.
    // This enables PerMonitorV2 DPI awareness as declared in stickpin.manifest.
    #[cfg(all(target_os = "windows", target_env = "msvc"))]
    {
        println!("cargo:rerun-if-changed=stickpin.manifest");
        println!("cargo:rustc-link-arg=/MANIFEST:EMBED");
        println!("cargo:rustc-link-arg=/MANIFESTINPUT:stickpin.manifest");
        println!("cargo:rustc-link-arg=/MANIFESTUAC:level='asInvoker' uiAccess='false'");
    }
    // If someone builds with MinGW (gnu), we just warn (no embedding here).
    #[cfg(all(target_os = "windows", not(target_env = "msvc")))]
    {
        println!(
            "cargo:warning=Manifest embedding not configured for non-MSVC toolchain; stickpin.manifest may be ignored."
        );
    }
}
