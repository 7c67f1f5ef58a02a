//! Download and install pipeline.
//!
//! An artifact is streamed into `<target>.part`, hashed as it arrives, and
//! renamed onto the target only once complete. Zip artifacts are then
//! extracted next to the target.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use davy_core::{Format, ResourceType};

use crate::client::{Artifact, Client};
use crate::error::{Error, Result};

/// What to install and where.
#[derive(Debug, Clone)]
pub struct InstallRequest<'a> {
    pub kind: ResourceType,
    pub id: &'a str,
    pub format: Format,
    pub version: Option<&'a str>,
    /// An existing directory, or the path of the file to write.
    pub output: &'a Path,
}

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installed {
    /// Where the artifact was written.
    pub path: PathBuf,
    pub size: u64,
    /// Hex-encoded SHA-256 of the artifact.
    pub sha256: String,
    /// Number of archive entries extracted, for archive formats.
    pub extracted: Option<usize>,
}

/// Download a resource artifact and, for zip artifacts, extract it.
///
/// When `output` is a directory the resource is fetched first to name the
/// file `{name}-{version}.{ext}`. Extraction goes into the directory the
/// artifact was written to.
///
/// A failed download leaves nothing behind. A failed extraction leaves the
/// downloaded artifact and any entries written before the failure.
pub async fn install(client: &Client, request: &InstallRequest<'_>) -> Result<Installed> {
    let target = if request.output.is_dir() {
        let resource = client.get(request.kind, request.id).await?;
        request.output.join(resource.artifact_file_name(request.format))
    } else {
        request.output.to_path_buf()
    };

    let artifact = client
        .download(request.kind, request.id, request.format, request.version)
        .await?;
    let (size, sha256) = write_artifact(artifact, &target).await?;
    debug!("Wrote {} ({} bytes, sha256 {})", target.display(), size, sha256);

    let extracted = if request.format.is_extracted() {
        let dest = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let archive = target.clone();
        let cancel = CancelOnDrop(Arc::new(AtomicBool::new(false)));
        let flag = Arc::clone(&cancel.0);
        let count = tokio::task::spawn_blocking(move || extract_zip(&archive, &dest, &flag))
            .await
            .map_err(|e| Error::Internal(format!("extraction task failed: {e}")))??;
        drop(cancel);
        debug!("Extracted {} entries", count);
        Some(count)
    } else {
        None
    };

    Ok(Installed {
        path: target,
        size,
        sha256,
        extracted,
    })
}

/// Removes a partially written file unless disarmed.
struct PartFile {
    path: PathBuf,
    armed: bool,
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Tells a blocking extraction to stop once the awaiting future is gone.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

async fn write_artifact(mut artifact: Artifact, target: &Path) -> Result<(u64, String)> {
    let mut part_name = target.file_name().unwrap_or_default().to_os_string();
    part_name.push(".part");
    let mut guard = PartFile {
        path: target.with_file_name(part_name),
        armed: true,
    };

    let mut file = tokio::fs::File::create(&guard.path).await?;
    let mut hasher = Sha256::new();
    let mut size = 0u64;

    while let Some(chunk) = artifact.chunk().await? {
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&guard.path, target).await?;
    guard.armed = false;

    Ok((size, hex::encode(hasher.finalize())))
}

/// Extract every entry of a zip archive into `dest`, returning the number
/// of entries. Every entry name is checked before anything is written.
///
/// `cancel` is polled between entries; once set, extraction stops with an
/// `Interrupted` error, leaving the entries already written.
pub fn extract_zip(archive: &Path, dest: &Path, cancel: &AtomicBool) -> Result<usize> {
    let file = fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;

    let mut entries = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let entry = zip.by_index_raw(index)?;
        let relative = entry.enclosed_name().ok_or_else(|| {
            Error::Archive(format!("entry escapes the output directory: {}", entry.name()))
        })?;
        entries.push((relative, entry.is_dir()));
    }

    for (index, (relative, is_dir)) in entries.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::Interrupted,
                "extraction cancelled",
            )));
        }
        let out = dest.join(relative);
        if *is_dir {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut entry = zip.by_index(index)?;
        let mut file = fs::File::create(&out)?;
        io::copy(&mut entry, &mut file)?;
    }

    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};
    use std::time::Duration;

    use serde_json::json;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zip::write::SimpleFileOptions;

    use super::*;
    use crate::config::Config;
    use crate::exit::ExitStatus;

    fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    async fn serve_artifact(server: &MockServer, format: &str, body: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path("/api/v1/skills/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "abc",
                "name": "web-scraper",
                "type": "skill",
                "version": "1.2.0"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/skills/abc/download"))
            .and(query_param("format", format))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> Client {
        Client::new(&Config {
            api_url: format!("{}/api/v1", server.uri()),
            ..Config::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_install_zip_into_directory() {
        let server = MockServer::start().await;
        let body = zip_bytes(&[
            ("SKILL.md", "# scraper"),
            ("src/main.py", "print('hi')"),
            ("src/util.py", "pass"),
        ]);
        let expected_sha = hex::encode(Sha256::digest(&body));
        serve_artifact(&server, "zip", body.clone()).await;

        let dir = tempfile::tempdir().unwrap();
        let installed = install(
            &client_for(&server),
            &InstallRequest {
                kind: ResourceType::Skill,
                id: "abc",
                format: Format::Zip,
                version: None,
                output: dir.path(),
            },
        )
        .await
        .unwrap();

        assert_eq!(installed.path, dir.path().join("web-scraper-1.2.0.zip"));
        assert_eq!(installed.size, body.len() as u64);
        assert_eq!(installed.sha256, expected_sha);
        assert_eq!(installed.extracted, Some(3));
        assert_eq!(
            fs::read_to_string(dir.path().join("src/main.py")).unwrap(),
            "print('hi')"
        );
        assert!(dir.path().join("SKILL.md").is_file());
        assert!(!dir.path().join("web-scraper-1.2.0.zip.part").exists());
    }

    #[tokio::test]
    async fn test_install_python_format_is_not_extracted() {
        let server = MockServer::start().await;
        serve_artifact(&server, "python", b"not a zip".to_vec()).await;

        let dir = tempfile::tempdir().unwrap();
        let installed = install(
            &client_for(&server),
            &InstallRequest {
                kind: ResourceType::Skill,
                id: "abc",
                format: Format::Python,
                version: None,
                output: dir.path(),
            },
        )
        .await
        .unwrap();

        assert_eq!(installed.path, dir.path().join("web-scraper-1.2.0.tar.gz"));
        assert_eq!(installed.extracted, None);
        assert_eq!(fs::read(&installed.path).unwrap(), b"not a zip");
    }

    #[tokio::test]
    async fn test_install_to_file_path_skips_metadata_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/skills/abc/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(zip_bytes(&[("a.txt", "a")])))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("custom.zip");
        let installed = install(
            &client_for(&server),
            &InstallRequest {
                kind: ResourceType::Skill,
                id: "abc",
                format: Format::Zip,
                version: None,
                output: &target,
            },
        )
        .await
        .unwrap();

        assert_eq!(installed.path, target);
        assert_eq!(installed.extracted, Some(1));
        assert!(dir.path().join("a.txt").is_file());
    }

    #[tokio::test]
    async fn test_failed_download_leaves_no_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/skills/abc/download"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.zip");
        let err = install(&client_for(&server), &zip_request(&target))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    fn zip_request(output: &Path) -> InstallRequest<'_> {
        InstallRequest {
            kind: ResourceType::Skill,
            id: "abc",
            format: Format::Zip,
            version: None,
            output,
        }
    }

    /// A server that promises 1000 bytes, sends 10, then either closes the
    /// connection or stalls.
    async fn serve_short_body(stall: bool) -> Client {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 1000\r\n\r\n0123456789")
                .await
                .unwrap();
            stream.flush().await.unwrap();
            if stall {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
        });

        Client::new(&Config {
            api_url: format!("http://{addr}/api/v1"),
            ..Config::default()
        })
        .unwrap()
    }

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_truncated_body_is_network_error_and_leaves_no_file() {
        let client = serve_short_body(false).await;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.zip");

        let err = install(&client, &zip_request(&target)).await.unwrap_err();

        assert!(matches!(err, Error::Network(_)), "{err:?}");
        assert_eq!(ExitStatus::for_error(&err), ExitStatus::Network);
        assert!(leftovers(dir.path()).is_empty(), "{:?}", leftovers(dir.path()));
    }

    #[tokio::test]
    async fn test_cancelled_install_leaves_no_file() {
        let client = serve_short_body(true).await;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.zip");

        let outcome = tokio::time::timeout(
            Duration::from_millis(500),
            install(&client, &zip_request(&target)),
        )
        .await;

        assert!(outcome.is_err(), "install should still be waiting on the body");
        assert!(leftovers(dir.path()).is_empty(), "{:?}", leftovers(dir.path()));
    }

    #[test]
    fn test_extract_counts_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        fs::write(
            &archive,
            zip_bytes(&[("one", "1"), ("two", "2"), ("nested/three", "3")]),
        )
        .unwrap();

        let out = dir.path().join("out");
        let count = extract_zip(&archive, &out, &AtomicBool::new(false)).unwrap();
        assert_eq!(count, 3);
        assert_eq!(fs::read_to_string(out.join("nested/three")).unwrap(), "3");
    }

    #[test]
    fn test_extract_rejects_traversal_before_writing() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("a/b");
        fs::create_dir_all(&out).unwrap();

        let archive = root.path().join("evil.zip");
        fs::write(&archive, zip_bytes(&[("good.txt", "ok"), ("../../evil", "pwned")])).unwrap();

        let err = extract_zip(&archive, &out, &AtomicBool::new(false)).unwrap_err();

        assert!(matches!(err, Error::Archive(_)), "{err:?}");
        assert!(!root.path().join("evil").exists());
        assert!(!out.join("good.txt").exists());
    }

    #[test]
    fn test_extract_stops_when_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        fs::write(&archive, zip_bytes(&[("one", "1"), ("two", "2")])).unwrap();

        let out = dir.path().join("out");
        let err = extract_zip(&archive, &out, &AtomicBool::new(true)).unwrap_err();

        assert!(
            matches!(&err, Error::Io(e) if e.kind() == io::ErrorKind::Interrupted),
            "{err:?}"
        );
        assert!(!out.join("one").exists());
    }

    #[test]
    fn test_extract_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();

        assert!(matches!(
            extract_zip(&archive, dir.path(), &AtomicBool::new(false)),
            Err(Error::Archive(_))
        ));
    }
}
