//! Capability-based file output built on `cap-std` and `camino`.

use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};

/// Write `contents` to `path`, creating any missing parent directories.
pub(crate) fn write_creating_parents(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path should include a file name")
    })?;
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new(""));
    let (anchor, relative) = split_anchor(parent)?;
    if relative.as_str().is_empty() {
        return anchor.write(file_name, contents);
    }
    anchor.create_dir_all(&relative)?;
    anchor.open_dir(&relative)?.write(file_name, contents)
}

/// Open the ambient directory `dir` is relative to and return the remainder.
fn split_anchor(dir: &Utf8Path) -> io::Result<(Dir, Utf8PathBuf)> {
    let (anchor, relative) = anchor_and_relative(dir);
    let dir = Dir::open_ambient_dir(&anchor, ambient_authority())?;
    Ok((dir, relative))
}

/// The anchor is the filesystem root for absolute paths, otherwise the
/// current directory (or an ancestor of it for leading `..` components).
fn anchor_and_relative(dir: &Utf8Path) -> (Utf8PathBuf, Utf8PathBuf) {
    let mut anchor = Utf8PathBuf::new();
    let mut relative = Utf8PathBuf::new();
    for component in dir.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::Prefix(_) | Utf8Component::RootDir => anchor.push(component),
            Utf8Component::ParentDir if relative.as_str().is_empty() => anchor.push(component),
            Utf8Component::ParentDir | Utf8Component::Normal(_) => relative.push(component),
        }
    }
    if anchor.as_str().is_empty() {
        anchor.push(".");
    }
    (anchor, relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 temp dir")
    }

    #[rstest]
    fn writes_into_missing_nested_directories() {
        let tmp = TempDir::new().expect("tempdir");
        let target = utf8_root(&tmp).join("captures/north/street.jpg");

        write_creating_parents(&target, b"jpeg").expect("write should succeed");

        let written = std::fs::read(target.as_std_path()).expect("read back");
        assert_eq!(written, b"jpeg");
    }

    #[rstest]
    fn overwrites_existing_file() {
        let tmp = TempDir::new().expect("tempdir");
        let target = utf8_root(&tmp).join("street.jpg");
        write_creating_parents(&target, b"old").expect("first write");

        write_creating_parents(&target, b"new").expect("second write");

        let written = std::fs::read(target.as_std_path()).expect("read back");
        assert_eq!(written, b"new");
    }

    #[rstest]
    fn rejects_path_without_file_name() {
        let err = write_creating_parents(Utf8Path::new("/"), b"jpeg").expect_err("should fail");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[rstest]
    #[case("/var/tmp/out", "/", "var/tmp/out")]
    #[case("out/images", ".", "out/images")]
    #[case("../shared/out", "..", "shared/out")]
    #[case("./out", ".", "out")]
    #[case("", ".", "")]
    fn splits_directories_at_their_anchor(
        #[case] dir: &str,
        #[case] anchor: &str,
        #[case] relative: &str,
    ) {
        let (actual_anchor, actual_relative) = anchor_and_relative(Utf8Path::new(dir));

        assert_eq!(actual_anchor, Utf8Path::new(anchor));
        assert_eq!(actual_relative, Utf8Path::new(relative));
    }
}
