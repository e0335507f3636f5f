use crate::composer::ComposeError;
use rand::Rng;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4"];
pub const MUSIC_EXTENSIONS: &[&str] = &["mp3", "m4a"];

pub fn list_media_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = path.extension().and_then(OsStr::to_str) {
            let ext_lower = ext.to_ascii_lowercase();
            if extensions.iter().any(|e| *e == ext_lower) {
                out.push(path.to_path_buf());
            }
        }
    }
    // stable order so a seeded rng picks the same file on every run
    out.sort();
    out
}

pub fn pick_random(
    dir: &Path,
    extensions: &[&str],
    rng: &mut impl Rng,
) -> Result<PathBuf, ComposeError> {
    let files = list_media_files(dir, extensions);
    if files.is_empty() {
        return Err(ComposeError::NoAssetAvailable {
            dir: dir.to_path_buf(),
        });
    }
    let idx = rng.gen_range(0..files.len());
    Ok(files[idx].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;

    #[test]
    fn empty_directory_yields_no_asset_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let err = pick_random(dir.path(), VIDEO_EXTENSIONS, &mut rng).unwrap_err();
        match err {
            ComposeError::NoAssetAvailable { dir: reported } => {
                assert_eq!(reported, dir.path());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn only_matching_extensions_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        fs::write(dir.path().join("b.MP4"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("c.mp3"), b"x").unwrap();

        let videos = list_media_files(dir.path(), VIDEO_EXTENSIONS);
        assert_eq!(videos.len(), 2);
        let music = list_media_files(dir.path(), MUSIC_EXTENSIONS);
        assert_eq!(music.len(), 1);
    }

    #[test]
    fn nested_directories_are_scanned() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/deep.mp3"), b"x").unwrap();

        let music = list_media_files(dir.path(), MUSIC_EXTENSIONS);
        assert_eq!(music.len(), 1);
    }

    #[test]
    fn seeded_rng_selects_deterministically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.mp4", "b.mp4", "c.mp4"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let first = {
            let mut rng = StdRng::seed_from_u64(42);
            pick_random(dir.path(), VIDEO_EXTENSIONS, &mut rng).unwrap()
        };
        let second = {
            let mut rng = StdRng::seed_from_u64(42);
            pick_random(dir.path(), VIDEO_EXTENSIONS, &mut rng).unwrap()
        };
        assert_eq!(first, second);
    }
}
