//! RAII guards for process-global state in tests.
//!
//! Environment variables are process-global, so every test that uses these
//! guards must also be `#[serial]`.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::Path;

use tempfile::TempDir;

/// Variables that change how [`crate::config::Config`] resolves.
pub const CONFIG_ENV_VARS: &[&str] = &["BIDWAVES_ROOT", "BIDWAVES_API_URL", "BIDWAVES_TOKEN"];

/// Restores one environment variable (or its absence) on drop.
pub struct EnvGuard {
    key: String,
    original: Option<OsString>,
}

impl EnvGuard {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            original: env::var_os(key),
        }
    }

    /// Snapshot `key`, then set it to `value`.
    ///
    /// # Safety
    /// Calls `std::env::set_var`; the test must be `#[serial]`.
    pub unsafe fn set(key: &str, value: impl AsRef<OsStr>) -> Self {
        let guard = Self::new(key);
        unsafe { env::set_var(key, value) };
        guard
    }

    /// Snapshot `key`, then remove it.
    ///
    /// # Safety
    /// Calls `std::env::remove_var`; the test must be `#[serial]`.
    pub unsafe fn remove(key: &str) -> Self {
        let guard = Self::new(key);
        unsafe { env::remove_var(key) };
        guard
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: guarded tests are #[serial].
        match &self.original {
            Some(val) => unsafe { env::set_var(&self.key, val) },
            None => unsafe { env::remove_var(&self.key) },
        }
    }
}

/// A throwaway config root: `BIDWAVES_ROOT` points at a temp dir and the
/// API/token overrides are cleared for the guard's lifetime.
pub struct ConfigRoot {
    dir: TempDir,
    _env: Vec<EnvGuard>,
}

impl ConfigRoot {
    /// # Safety
    /// Mutates the environment; the test must be `#[serial]`.
    pub unsafe fn new() -> std::io::Result<Self> {
        let dir = TempDir::new()?;
        let mut env = Vec::with_capacity(CONFIG_ENV_VARS.len());
        for key in CONFIG_ENV_VARS {
            env.push(unsafe { EnvGuard::remove(key) });
        }
        unsafe { env::set_var("BIDWAVES_ROOT", dir.path()) };
        Ok(Self { dir, _env: env })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_guard_restores_existing_var() {
        let key = "BIDWAVES_TEST_GUARD_EXISTING";
        unsafe { env::set_var(key, "original_value") };
        {
            let _guard = unsafe { EnvGuard::set(key, "modified_value") };
            assert_eq!(env::var(key).unwrap(), "modified_value");
        }
        assert_eq!(env::var(key).unwrap(), "original_value");
        unsafe { env::remove_var(key) };
    }

    #[test]
    #[serial]
    fn test_env_guard_restores_absent_var() {
        let key = "BIDWAVES_TEST_GUARD_ABSENT";
        unsafe { env::remove_var(key) };
        {
            let _guard = unsafe { EnvGuard::set(key, "temporary") };
            assert_eq!(env::var(key).unwrap(), "temporary");
        }
        assert!(env::var(key).is_err());
    }

    #[test]
    #[serial]
    fn test_config_root_isolates_environment() {
        let _token = unsafe { EnvGuard::set("BIDWAVES_TOKEN", "tok_outer") };
        {
            let root = unsafe { ConfigRoot::new() }.unwrap();
            assert!(env::var("BIDWAVES_TOKEN").is_err());
            assert_eq!(
                env::var_os("BIDWAVES_ROOT").as_deref(),
                Some(root.path().as_os_str())
            );
        }
        assert_eq!(env::var("BIDWAVES_TOKEN").unwrap(), "tok_outer");
    }
}
