//! Native-crypto capability descriptor
//!
//! The probe runs once per process; everything downstream takes the result as
//! a plain value so both code paths stay testable on any host.

use std::sync::OnceLock;

use keyseal_core::config::NativeOverride;

/// What the native provider can do on this host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// The optimized native provider runs on this target
    pub native_available: bool,
    /// Native AES-GCM is available (requires hardware AES)
    pub native_aead_available: bool,
}

impl PlatformCapabilities {
    pub fn new(native_available: bool, native_aead_available: bool) -> Self {
        Self {
            native_available,
            native_aead_available: native_available && native_aead_available,
        }
    }

    /// Everything native
    pub fn native() -> Self {
        Self::new(true, true)
    }

    /// No native provider at all
    pub fn portable_only() -> Self {
        Self::new(false, false)
    }

    /// Probe the host. The result is cached for the lifetime of the process.
    pub fn detect() -> Self {
        static DETECTED: OnceLock<PlatformCapabilities> = OnceLock::new();
        *DETECTED.get_or_init(|| {
            let caps = Self::new(native_target(), hardware_aes());
            tracing::debug!(
                native = caps.native_available,
                native_aead = caps.native_aead_available,
                "probed platform crypto capabilities"
            );
            caps
        })
    }

    /// Apply a configured override on top of detection.
    pub fn from_override(mode: NativeOverride) -> Self {
        match mode {
            NativeOverride::Auto => Self::detect(),
            NativeOverride::Native => {
                tracing::warn!("native crypto capability forced on by configuration");
                Self::native()
            }
            NativeOverride::Portable => {
                tracing::warn!("native crypto capability forced off by configuration");
                Self::portable_only()
            }
        }
    }
}

fn native_target() -> bool {
    cfg!(any(
        target_arch = "x86_64",
        target_arch = "x86",
        target_arch = "aarch64",
        target_arch = "arm"
    ))
}

#[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
fn hardware_aes() -> bool {
    std::arch::is_x86_feature_detected!("aes") && std::arch::is_x86_feature_detected!("pclmulqdq")
}

#[cfg(target_arch = "aarch64")]
fn hardware_aes() -> bool {
    std::arch::is_aarch64_feature_detected!("aes")
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64")))]
fn hardware_aes() -> bool {
    false
}
