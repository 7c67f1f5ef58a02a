//! Collecting the text files of a resource for publishing.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Relative path (with `/` separators) to text content.
pub type Files = BTreeMap<String, String>;

/// Collect the files to publish from a directory, a `.zip`, or a
/// `.tar.gz`/`.tgz` archive.
///
/// Hidden files and directories are skipped. Files that are not valid
/// UTF-8 are left out. Finding nothing is an error.
pub fn collect(path: &Path) -> Result<Files> {
    let files = if path.is_dir() {
        collect_dir(path)?
    } else {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.ends_with(".zip") {
            collect_zip(path)?
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            collect_tar_gz(path)?
        } else if path.exists() {
            Files::new()
        } else {
            return Err(Error::InvalidInput(format!(
                "Path does not exist: {}",
                path.display()
            )));
        }
    };

    if files.is_empty() {
        return Err(Error::InvalidInput(format!(
            "No files found in {}",
            path.display()
        )));
    }
    Ok(files)
}

/// Read a metadata file, which must hold a JSON object.
pub fn load_metadata(path: &Path) -> Result<Map<String, Value>> {
    let content = fs::read_to_string(path)?;
    match serde_json::from_str(&content) {
        Ok(Value::Object(metadata)) => Ok(metadata),
        Ok(_) => Err(Error::InvalidInput(format!(
            "{} must contain a JSON object",
            path.display()
        ))),
        Err(e) => Err(Error::InvalidInput(format!(
            "Invalid JSON in {}: {}",
            path.display(),
            e
        ))),
    }
}

fn collect_dir(root: &Path) -> Result<Files> {
    let mut files = Files::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden_name(entry.file_name()));

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        insert_text(&mut files, relative, fs::read(entry.path())?);
    }
    Ok(files)
}

fn collect_zip(path: &Path) -> Result<Files> {
    let mut zip = zip::ZipArchive::new(fs::File::open(path)?)?;
    let mut files = Files::new();

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        if !entry.is_file() {
            continue;
        }
        let Some(relative) = entry.enclosed_name() else {
            debug!("Skipping unsafe entry {}", entry.name());
            continue;
        };
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        insert_text(&mut files, &relative, content);
    }
    Ok(files)
}

fn collect_tar_gz(path: &Path) -> Result<Files> {
    let decoder = flate2::read::GzDecoder::new(fs::File::open(path)?);
    let mut archive = tar::Archive::new(decoder);
    let mut files = Files::new();

    for entry in archive
        .entries()
        .map_err(|e| Error::Archive(e.to_string()))?
    {
        let mut entry = entry.map_err(|e| Error::Archive(e.to_string()))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = entry.path().map_err(|e| Error::Archive(e.to_string()))?;
        let Some(relative) = safe_relative(&name) else {
            debug!("Skipping unsafe entry {}", name.display());
            continue;
        };
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(|e| Error::Archive(e.to_string()))?;
        insert_text(&mut files, &relative, content);
    }
    Ok(files)
}

fn insert_text(files: &mut Files, relative: &Path, content: Vec<u8>) {
    if relative
        .components()
        .any(|c| matches!(c, Component::Normal(part) if is_hidden_name(part)))
    {
        return;
    }
    let key = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    match String::from_utf8(content) {
        Ok(text) => {
            files.insert(key, text);
        }
        Err(_) => debug!("Skipping non-text file {}", key),
    }
}

/// The path with `.` segments dropped, or `None` if it is empty, absolute,
/// or contains `..`.
fn safe_relative(name: &Path) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in name.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!relative.as_os_str().is_empty()).then_some(relative)
}

fn is_hidden_name(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use zip::write::SimpleFileOptions;

    use super::*;

    #[test]
    fn test_collect_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "print('hi')").unwrap();
        fs::create_dir_all(dir.path().join("lib/sub")).unwrap();
        fs::write(dir.path().join("lib/sub/util.py"), "pass").unwrap();
        fs::write(dir.path().join(".env"), "SECRET=1").unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config"), "[core]").unwrap();
        fs::write(dir.path().join("logo.png"), [0x89u8, 0x50, 0xff, 0xfe]).unwrap();

        let files = collect(dir.path()).unwrap();

        let keys: Vec<_> = files.keys().map(String::as_str).collect();
        assert_eq!(keys, ["lib/sub/util.py", "main.py"]);
        assert_eq!(files["main.py"], "print('hi')");
    }

    #[test]
    fn test_collect_empty_directory_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".hidden"), "x").unwrap();

        assert!(matches!(collect(dir.path()), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_collect_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            collect(&dir.path().join("nope")),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_collect_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in [
            ("agent.yaml", "name: a"),
            (".DS_Store", "junk"),
            ("../escape", "x"),
        ] {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        fs::write(&path, writer.finish().unwrap().into_inner()).unwrap();

        let files = collect(&path).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files["agent.yaml"], "name: a");
    }

    #[test]
    fn test_collect_tar_gz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.tgz");

        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (name, content) in [("kb/index.md", "# docs"), ("kb/.cache", "x")] {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, content.as_bytes()).unwrap();
        }
        let bytes = builder.into_inner().unwrap().finish().unwrap();
        fs::write(&path, bytes).unwrap();

        let files = collect(&path).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files["kb/index.md"], "# docs");
    }

    #[test]
    fn test_safe_relative() {
        assert_eq!(safe_relative(Path::new("a/b.txt")), Some(PathBuf::from("a/b.txt")));
        assert_eq!(safe_relative(Path::new("./a")), Some(PathBuf::from("a")));
        assert_eq!(safe_relative(Path::new("../a")), None);
        assert_eq!(safe_relative(Path::new("a/../../b")), None);
        assert_eq!(safe_relative(Path::new("/etc/passwd")), None);
        assert_eq!(safe_relative(Path::new("")), None);
        assert_eq!(safe_relative(Path::new(".")), None);
    }

    #[test]
    fn test_load_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("meta.json");
        fs::write(&good, r#"{"license": "MIT"}"#).unwrap();
        assert_eq!(load_metadata(&good).unwrap()["license"], "MIT");

        let list = dir.path().join("list.json");
        fs::write(&list, "[1, 2]").unwrap();
        assert!(matches!(load_metadata(&list), Err(Error::InvalidInput(_))));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{").unwrap();
        assert!(matches!(load_metadata(&broken), Err(Error::InvalidInput(_))));
    }
}
