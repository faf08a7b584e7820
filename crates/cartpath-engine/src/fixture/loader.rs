use super::{Fixture, FixtureError, FixtureStore};
use std::path::Path;
use tracing::debug;

pub struct FixtureLoader;

impl FixtureLoader {
    /// Load every `*.yaml`, `*.yml` and `*.json` file in `dir`.
    ///
    /// The file stem is the scenario name the fixture answers to.
    pub async fn load_dir(dir: &Path) -> Result<FixtureStore, FixtureError> {
        if !dir.is_dir() {
            return Err(FixtureError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut store = FixtureStore::new();
        for extension in ["yaml", "yml", "json"] {
            let pattern = dir.join(format!("*.{}", extension));
            let pattern_str = pattern.to_str().ok_or(FixtureError::Pattern(
                glob::PatternError {
                    pos: 0,
                    msg: "Invalid UTF-8 path",
                },
            ))?;

            for entry in glob::glob(pattern_str)? {
                let path = entry?;
                if !path.is_file() {
                    continue;
                }
                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };

                let content = tokio::fs::read_to_string(&path).await?;
                // JSON is a subset of YAML, one parser covers both.
                let fixture: Fixture =
                    serde_yaml::from_str(&content).map_err(|source| FixtureError::Yaml {
                        path: path.clone(),
                        source,
                    })?;

                debug!(fixture = name, roles = fixture.locators.len(), "loaded fixture");
                store.insert(name, fixture);
            }
        }

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartpath_common::protocol::Role;

    #[tokio::test]
    async fn test_loads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("addToCart.yaml"),
            "productSummary: .summary\naddToCartButton: .buy\n",
        )
        .await
        .unwrap();
        tokio::fs::write(
            dir.path().join("addToCartFromPDP.json"),
            r#"{"productSummary": ".summary", "colorSkuOption": ".color"}"#,
        )
        .await
        .unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "ignored")
            .await
            .unwrap();

        let store = FixtureLoader::load_dir(dir.path()).await.unwrap();
        assert_eq!(store.names(), vec!["addToCart", "addToCartFromPDP"]);
        assert_eq!(
            store
                .resolve("addToCartFromPDP")
                .unwrap()
                .locator(Role::ColorSkuOption),
            Some(".color")
        );
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let err = FixtureLoader::load_dir(Path::new("/nonexistent/fixtures"))
            .await
            .unwrap_err();
        assert!(matches!(err, FixtureError::DirectoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_fixture_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("broken.yaml"), "productSummary: [1, 2")
            .await
            .unwrap();

        let err = FixtureLoader::load_dir(dir.path()).await.unwrap_err();
        match err {
            FixtureError::Yaml { path, .. } => assert!(path.ends_with("broken.yaml")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
