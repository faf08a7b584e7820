use super::definition::{ScenarioDefinition, ScenarioTier};
use super::registry::ScenarioRegistry;
use super::schema::Validatable;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ScenarioLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Glob iteration error: {0}")]
    Glob(#[from] glob::GlobError),
    #[error("Scenario directory not found at {0}")]
    DirectoryNotFound(PathBuf),
}

pub struct ScenarioLoader;

impl ScenarioLoader {
    pub async fn load_file(path: &Path) -> Result<ScenarioDefinition, ScenarioLoadError> {
        let content = tokio::fs::read_to_string(path).await?;
        let mut definition: ScenarioDefinition =
            serde_yaml::from_str(&content).map_err(|source| ScenarioLoadError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        definition.tier = ScenarioTier::Loaded;
        Ok(definition)
    }

    /// Load every `*.yaml` / `*.yml` definition in `dir` into the registry.
    ///
    /// Invalid definitions are skipped with a warning. Returns how many were
    /// registered.
    pub async fn load_dir(
        dir: &Path,
        registry: &mut ScenarioRegistry,
    ) -> Result<usize, ScenarioLoadError> {
        if !dir.is_dir() {
            return Err(ScenarioLoadError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut loaded = 0;
        for extension in ["yaml", "yml"] {
            let pattern = dir.join(format!("*.{}", extension));
            let pattern_str = pattern.to_str().ok_or(ScenarioLoadError::Pattern(
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

                let definition = Self::load_file(&path).await?;
                if let Err(e) = definition.validate() {
                    warn!("Skipping invalid scenario {:?}: {}", path, e);
                    continue;
                }

                debug!(scenario = %definition.name, stages = definition.stages.len(), "loaded scenario");
                if registry.register(definition) {
                    loaded += 1;
                }
            }
        }

        Ok(loaded)
    }
}
