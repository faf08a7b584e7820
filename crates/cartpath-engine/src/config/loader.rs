use super::schema::CartpathConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Candidate config files, most specific first: `./cartpath.yaml`, then
    /// `~/.cartpath/config.yaml` when a home directory is known.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./cartpath.yaml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".cartpath").join("config.yaml"));
        }
        paths
    }

    /// Load the first config file found on [`Self::search_paths`], or the
    /// built-in defaults when there is none.
    pub async fn load_default() -> Result<CartpathConfig, ConfigError> {
        Self::load_first(&Self::search_paths()).await
    }

    pub async fn load_first(paths: &[PathBuf]) -> Result<CartpathConfig, ConfigError> {
        match paths.iter().find(|path| path.is_file()) {
            Some(path) => Self::load_from(path).await,
            None => {
                debug!("No config file found, using defaults");
                Ok(CartpathConfig::default())
            }
        }
    }

    pub async fn load_from(path: &Path) -> Result<CartpathConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettleMode;
    use cartpath_common::protocol::Marker;

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cartpath.yaml");
        tokio::fs::write(
            &path,
            r#"
base_url: https://store.example.com
settle:
  mode: poll
  timeout_ms: 2500
variants:
  selected_marker:
    attribute: aria-checked
session:
  cookies:
    - name: VtexIdclientAutCookie
      value_env: VTEX_ID_TOKEN
"#,
        )
        .await
        .unwrap();

        let config = ConfigLoader::load_from(&path).await.unwrap();
        assert_eq!(config.base_url, "https://store.example.com");
        assert_eq!(config.settle.mode, SettleMode::Poll);
        assert_eq!(config.settle.timeout_ms, 2500);
        assert_eq!(config.settle.poll_interval_ms, 100);
        assert_eq!(
            config.variants.selected_marker,
            Marker::Attribute("aria-checked".into())
        );
        assert_eq!(config.session.cookies.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cartpath.yaml");
        tokio::fs::write(&path, "settle: [not, a, map]").await.unwrap();

        let err = ConfigLoader::load_from(&path).await.unwrap_err();
        assert!(matches!(&err, ConfigError::Parse { path: p, .. } if *p == path));
        assert!(err.to_string().contains("cartpath.yaml"));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = ConfigLoader::load_from(Path::new("/nonexistent/cartpath.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[tokio::test]
    async fn test_first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("cartpath.yaml");
        let home = dir.path().join("config.yaml");
        tokio::fs::write(&home, "base_url: https://home.example.com")
            .await
            .unwrap();

        let config = ConfigLoader::load_first(&[local.clone(), home.clone()])
            .await
            .unwrap();
        assert_eq!(config.base_url, "https://home.example.com");

        tokio::fs::write(&local, "base_url: https://local.example.com")
            .await
            .unwrap();
        let config = ConfigLoader::load_first(&[local, home]).await.unwrap();
        assert_eq!(config.base_url, "https://local.example.com");
    }

    #[tokio::test]
    async fn test_no_candidates_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load_first(&[dir.path().join("absent.yaml")])
            .await
            .unwrap();
        assert_eq!(config.base_url, CartpathConfig::default().base_url);
    }

    #[test]
    fn test_local_file_searched_first() {
        let paths = ConfigLoader::search_paths();
        assert_eq!(paths[0], PathBuf::from("./cartpath.yaml"));
    }
}
