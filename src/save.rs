//! Persisting fetched bodies to `<root>/<host>/<path>`.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Name used for URLs whose path ends in a directory.
pub const INDEX_FILE: &str = "index.html";

/// Local path for `url` under `root`. An explicit port becomes part of the
/// host directory (`host_8080`); `.` and `..` segments are dropped. A query
/// string is kept in the file name (`page?id=1`), with `/` escaped.
pub fn save_path(root: &Path, url: &str) -> Result<PathBuf> {
    let parsed = Url::parse(url)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::NoHost(url.to_string()))?;

    let mut path = root.to_path_buf();
    match parsed.port() {
        Some(port) => path.push(format!("{}_{}", host, port)),
        None => path.push(host),
    }

    let mut last_is_file = false;
    if let Some(segments) = parsed.path_segments() {
        for segment in segments {
            last_is_file = !segment.is_empty();
            if segment.is_empty() || segment == "." || segment == ".." {
                continue;
            }
            path.push(segment);
        }
    }
    if !last_is_file {
        path.push(INDEX_FILE);
    }
    if let Some(query) = parsed.query() {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.set_file_name(format!("{}?{}", name, query.replace('/', "%2F")));
    }
    Ok(path)
}

/// Writes `body`, creating parent directories as needed.
pub async fn save_body(root: &Path, url: &str, body: &[u8]) -> Result<PathBuf> {
    let path = save_path(root, url)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, body).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_urls_to_host_and_path() {
        let root = Path::new("/tmp/out");
        assert_eq!(
            save_path(root, "http://a.test/x/y.txt").unwrap(),
            PathBuf::from("/tmp/out/a.test/x/y.txt")
        );
        assert_eq!(
            save_path(root, "http://a.test/").unwrap(),
            PathBuf::from("/tmp/out/a.test/index.html")
        );
        assert_eq!(
            save_path(root, "http://a.test/dir/").unwrap(),
            PathBuf::from("/tmp/out/a.test/dir/index.html")
        );
        assert_eq!(
            save_path(root, "http://127.0.0.1:8080/f").unwrap(),
            PathBuf::from("/tmp/out/127.0.0.1_8080/f")
        );
    }

    #[test]
    fn never_escapes_root() {
        let root = Path::new("/tmp/out");
        let path = save_path(root, "http://a.test/../../etc/passwd").unwrap();
        assert!(path.starts_with("/tmp/out/a.test"));
    }

    #[test]
    fn queries_get_their_own_files() {
        let root = Path::new("/tmp/out");
        assert_eq!(
            save_path(root, "http://a.test/a?x=1").unwrap(),
            PathBuf::from("/tmp/out/a.test/a?x=1")
        );
        assert_ne!(
            save_path(root, "http://a.test/a?x=1").unwrap(),
            save_path(root, "http://a.test/a?x=2").unwrap()
        );
        assert_eq!(
            save_path(root, "http://a.test/?next=/b").unwrap(),
            PathBuf::from("/tmp/out/a.test/index.html?next=%2Fb")
        );
    }

    #[test]
    fn rejects_unparseable_urls() {
        assert!(save_path(Path::new("."), "not a url").is_err());
        assert!(matches!(
            save_path(Path::new("."), "data:text/plain,hi"),
            Err(Error::NoHost(_))
        ));
    }

    #[tokio::test]
    async fn creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_body(dir.path(), "http://a.test/deep/er/file.bin", b"hello")
            .await
            .unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"hello");
    }
}
