use std::io;
use std::os::windows::fs::{symlink_dir, symlink_file};
use std::path::Path;

/// Windows distinguishes file and directory links. Media sources are files,
/// so only an existing directory gets a directory link.
pub fn symlink(source: &Path, link: &Path) -> io::Result<()> {
    if source.is_dir() {
        symlink_dir(source, link)
    } else {
        symlink_file(source, link)
    }
}
