#[cfg(target_os = "windows")]
pub mod windows;

use std::io;
use std::path::Path;

/// Create a symbolic link at `link` pointing to `source`.
#[cfg(unix)]
pub fn symlink(source: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

#[cfg(target_os = "windows")]
pub fn symlink(source: &Path, link: &Path) -> io::Result<()> {
    windows::symlink(source, link)
}
