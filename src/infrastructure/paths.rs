//! Data directory resolution and tilde expansion.

use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "GIGSCOUT_DATA_DIR";

const APP_DIR: &str = "gigscout";

/// Returns the directory holding `state.json` and trace output.
///
/// Resolution order: `GIGSCOUT_DATA_DIR`, then the platform data directory
/// joined with `gigscout` (`~/.local/share/gigscout` on Linux), then the
/// current directory.
#[must_use]
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(expand_tilde(&dir.to_string_lossy()));
    }

    dirs::data_dir().map_or_else(|| PathBuf::from("."), |dir| dir.join(APP_DIR))
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, or hosts without a home directory, are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use gigscout::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/absolute/path"), "/absolute/path");
/// assert_ne!(expand_tilde("~/events"), "~/events");
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    let Some(home) = dirs::home_dir() else {
        return path.to_string();
    };

    if path == "~" {
        home.to_string_lossy().into_owned()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest).to_string_lossy().into_owned()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else { return };
        assert_eq!(expand_tilde("~"), home.to_string_lossy());
        assert_eq!(PathBuf::from(expand_tilde("~/gigs")), home.join("gigs"));
        assert_eq!(expand_tilde("relative/~"), "relative/~");
    }
}
