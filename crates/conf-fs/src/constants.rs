//! Well-known locations searched for configuration resources.

use std::path::PathBuf;

/// Environment variable naming a directory searched before all others.
pub const CONF_DIR_ENV: &str = "CONF_DIR";

/// Conventional configuration directories, in search order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConventionalDir {
    /// `/etc`
    SystemEtc,
    /// `/usr/local/etc`
    LocalEtc,
    /// The platform configuration directory (`dirs::config_dir`)
    PlatformConfig,
    /// `~/.config`
    HomeConfig,
}

impl ConventionalDir {
    /// All conventional directories in search order.
    pub const ALL: [ConventionalDir; 4] = [
        Self::SystemEtc,
        Self::LocalEtc,
        Self::PlatformConfig,
        Self::HomeConfig,
    ];

    /// Resolve the directory on this platform, if it has a meaning here.
    pub fn path(&self) -> Option<PathBuf> {
        match self {
            Self::SystemEtc => Some(PathBuf::from("/etc")),
            Self::LocalEtc => Some(PathBuf::from("/usr/local/etc")),
            Self::PlatformConfig => dirs::config_dir(),
            Self::HomeConfig => dirs::home_dir().map(|home| home.join(".config")),
        }
    }
}

impl std::fmt::Display for ConventionalDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::SystemEtc => "system",
            Self::LocalEtc => "local",
            Self::PlatformConfig => "platform",
            Self::HomeConfig => "home",
        };
        write!(f, "{}", name)
    }
}
