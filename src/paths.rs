use std::path::PathBuf;

/// Returns the root BidWaves directory path.
///
/// Resolution order:
/// 1. `BIDWAVES_ROOT` environment variable (if set)
/// 2. Current working directory + `.bidwaves`
pub fn bidwaves_root() -> PathBuf {
    match std::env::var("BIDWAVES_ROOT") {
        Ok(root) if !root.is_empty() => PathBuf::from(root),
        _ => PathBuf::from(".bidwaves"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_guards::EnvGuard;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_bidwaves_root_default() {
        let _guard = unsafe { EnvGuard::remove("BIDWAVES_ROOT") };
        assert_eq!(bidwaves_root(), PathBuf::from(".bidwaves"));
    }

    #[test]
    #[serial]
    fn test_bidwaves_root_from_env() {
        let _guard = unsafe { EnvGuard::set("BIDWAVES_ROOT", "/srv/bidwaves") };
        assert_eq!(bidwaves_root(), PathBuf::from("/srv/bidwaves"));
    }
}
