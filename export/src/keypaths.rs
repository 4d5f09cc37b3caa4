//! Key-Paths profile: the set of "well-known folder" roots (drive,
//! windows, user, appdata, ...) that batch-mode format discovery walks
//! relative to. A profile models either the machine actually running on,
//! or a foreign machine described in a batch descriptor.

use std::env;
use std::path::{Path, PathBuf};

/// Sentinel written in a batch descriptor for a directive whose value is
/// intentionally absent rather than merely unset.
pub const NONE_SENTINEL: &str = "<None>";

/// A named collection of absolute paths reproducing a machine's
/// well-known folders. Each field is `None` only when the profile
/// explicitly marked it absent with [`NONE_SENTINEL`]; invariant: if
/// `drive` is set, every other `Some` field is prefixed by it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPaths {
    pub drive: Option<PathBuf>,
    pub windows: Option<PathBuf>,
    pub temporary: Option<PathBuf>,
    pub user: Option<PathBuf>,
    pub appdata: Option<PathBuf>,
    pub local_appdata: Option<PathBuf>,
    pub local_low_appdata: Option<PathBuf>,
    pub wininet_cache: Option<PathBuf>,
}

impl KeyPaths {
    /// Join a relative path onto the `appdata` root, if present.
    pub fn under_appdata(&self, relative: impl AsRef<Path>) -> Option<PathBuf> {
        self.appdata.as_ref().map(|base| base.join(relative))
    }

    /// Join a relative path onto the `local_low_appdata` root, if present.
    pub fn under_local_low_appdata(&self, relative: impl AsRef<Path>) -> Option<PathBuf> {
        self.local_low_appdata.as_ref().map(|base| base.join(relative))
    }
}

/// Supplies a [`KeyPaths`] profile. Kept as a trait so batch-mode
/// descriptors and the running host's own environment share one
/// discovery surface, and so tests can substitute a fixed profile
/// without touching real environment variables.
pub trait KeyPathsSource {
    fn key_paths(&self) -> KeyPaths;
}

/// Builds a [`KeyPaths`] profile from the environment of the host this
/// process is actually running on.
pub struct DefaultKeyPathsSource;

impl KeyPathsSource for DefaultKeyPathsSource {
    fn key_paths(&self) -> KeyPaths {
        let appdata = env::var_os("APPDATA").map(PathBuf::from);
        let local_appdata = env::var_os("LOCALAPPDATA").map(PathBuf::from);
        let windows = env::var_os("SystemRoot").map(PathBuf::from);
        let user = env::var_os("USERPROFILE")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(PathBuf::from));
        let temporary = env::var_os("TEMP")
            .or_else(|| env::var_os("TMPDIR"))
            .map(PathBuf::from);
        let local_low_appdata = local_appdata
            .as_ref()
            .and_then(|p| p.parent())
            .map(|parent| parent.join("LocalLow"));
        let drive = windows
            .as_ref()
            .and_then(|p| p.components().next())
            .map(|c| PathBuf::from(c.as_os_str()));

        KeyPaths {
            drive,
            windows,
            temporary,
            user,
            appdata,
            local_appdata,
            local_low_appdata,
            wininet_cache: None,
        }
    }
}

/// Wraps a [`KeyPaths`] parsed out of a `BEGIN_PROFILE` batch block.
pub struct BatchKeyPathsSource(pub KeyPaths);

impl KeyPathsSource for BatchKeyPathsSource {
    fn key_paths(&self) -> KeyPaths {
        self.0.clone()
    }
}

/// Interpret a batch directive's raw value, translating the `<None>`
/// sentinel to an absent field.
pub fn parse_directive_value(value: &str) -> Option<PathBuf> {
    if value == NONE_SENTINEL {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_sentinel_parses_to_absent() {
        assert_eq!(parse_directive_value("<None>"), None);
    }

    #[test]
    fn ordinary_value_parses_to_a_path() {
        assert_eq!(parse_directive_value("C:\\Users\\alice"), Some(PathBuf::from("C:\\Users\\alice")));
    }

    #[test]
    fn batch_source_returns_the_wrapped_profile() {
        let mut paths = KeyPaths::default();
        paths.drive = Some(PathBuf::from("C:\\"));
        paths.appdata = Some(PathBuf::from("C:\\Users\\alice\\AppData\\Roaming"));
        let source = BatchKeyPathsSource(paths.clone());
        assert_eq!(source.key_paths(), paths);
    }

    #[test]
    fn under_appdata_joins_when_present() {
        let mut paths = KeyPaths::default();
        paths.appdata = Some(PathBuf::from("/home/alice/.appdata"));
        assert_eq!(
            paths.under_appdata("Macromedia/Flash Player"),
            Some(PathBuf::from("/home/alice/.appdata/Macromedia/Flash Player"))
        );
    }

    #[test]
    fn under_appdata_is_none_when_absent() {
        let paths = KeyPaths::default();
        assert_eq!(paths.under_appdata("x"), None);
    }
}
