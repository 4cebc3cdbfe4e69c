// Embedded recorder scripts
//
// The recorder runs as an external Python process. Its sources are compiled into
// the binary and written next to the working directory on every start.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::fs;
use thiserror::Error;

/// Asset the supervisor passes to the interpreter
pub const ENTRY_POINT: &str = "Recordurbate.py";

/// Named file contents, materialized in insertion order
pub type AssetBundle<'a> = IndexMap<&'a str, &'a [u8]>;

/// Errors that can occur while writing assets
#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("Failed to write asset {name} to {path}: {source}")]
    Write {
        name: String,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to make asset {name} executable: {source}")]
    Permissions {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// The four recorder scripts bundled at build time
pub fn bundled() -> AssetBundle<'static> {
    let mut assets = IndexMap::new();
    assets.insert(
        "bot.py",
        include_bytes!("../../assets/recordurbate/bot.py").as_slice(),
    );
    assets.insert(
        "config.py",
        include_bytes!("../../assets/recordurbate/config.py").as_slice(),
    );
    assets.insert(
        "daemon.py",
        include_bytes!("../../assets/recordurbate/daemon.py").as_slice(),
    );
    assets.insert(
        ENTRY_POINT,
        include_bytes!("../../assets/recordurbate/Recordurbate.py").as_slice(),
    );
    assets
}

/// Write every asset into `dir` under its logical name.
///
/// Existing files are overwritten unconditionally. Stops at the first failure,
/// so a partial set may be left behind.
///
/// # Returns
/// The paths that were written, in bundle order
pub fn materialize(dir: &Utf8Path, assets: &AssetBundle<'_>) -> Result<Vec<Utf8PathBuf>, MaterializeError> {
    let mut written = Vec::with_capacity(assets.len());

    for (&name, &contents) in assets {
        let path = dir.join(name);

        fs::write(&path, contents).map_err(|source| MaterializeError::Write {
            name: name.to_string(),
            path: path.clone(),
            source,
        })?;

        make_executable(&path).map_err(|source| MaterializeError::Permissions {
            name: name.to_string(),
            source,
        })?;

        tracing::debug!("Materialized {} ({} bytes)", path, contents.len());
        written.push(path);
    }

    tracing::info!("Materialized {} assets into {}", written.len(), dir);
    Ok(written)
}

#[cfg(unix)]
fn make_executable(path: &Utf8Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Utf8Path) -> std::io::Result<()> {
    Ok(())
}
