use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use strum_macros::Display;

use crate::errors::{AdapterResult, ToolError};

const DOTENV_FILE: &str = ".env";

/// Which provider a credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderTag {
    /// GLM (vision, video, image generation)
    Primary,
    /// Qwen / DashScope
    Regional,
}

impl ProviderTag {
    pub fn env_key(&self) -> &'static str {
        match self {
            ProviderTag::Primary => "GLM_API_KEY",
            ProviderTag::Regional => "ALIYUN_API_KEY",
        }
    }
}

#[cfg_attr(test, automock)]
pub trait Environment: Send + Sync {
    fn get_var(&self, key: &str) -> Result<String, env::VarError>;
}

pub struct RealEnvironment;

impl Environment for RealEnvironment {
    fn get_var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }
}

/// A place a `.env` file may live. Locations are computed on every lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum DotenvSource {
    /// `.env` in the process working directory
    WorkingDirectory,
    /// `.env` one level above the directory holding the running executable
    InstallDirectory,
    /// `.env` in an explicit directory
    Directory(PathBuf),
}

impl DotenvSource {
    fn path(&self) -> Option<PathBuf> {
        match self {
            DotenvSource::WorkingDirectory => env::current_dir().ok().map(|d| d.join(DOTENV_FILE)),
            DotenvSource::InstallDirectory => {
                let exe = env::current_exe().ok()?;
                let install_root = exe.parent()?.parent()?;
                Some(install_root.join(DOTENV_FILE))
            }
            DotenvSource::Directory(dir) => Some(dir.join(DOTENV_FILE)),
        }
    }
}

/// Resolves provider API keys. Nothing is cached: every call re-reads the
/// environment and the `.env` files so rotated keys apply immediately.
#[derive(Clone)]
pub struct CredentialResolver {
    env: Arc<dyn Environment>,
    sources: Vec<DotenvSource>,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::new(
            Arc::new(RealEnvironment),
            vec![DotenvSource::WorkingDirectory, DotenvSource::InstallDirectory],
        )
    }
}

impl CredentialResolver {
    pub fn new(env: Arc<dyn Environment>, sources: Vec<DotenvSource>) -> Self {
        Self { env, sources }
    }

    pub fn environment(&self) -> &Arc<dyn Environment> {
        &self.env
    }

    pub fn resolve(&self, tag: ProviderTag) -> AdapterResult<String> {
        let key = tag.env_key();

        if let Ok(value) = self.env.get_var(key) {
            if !value.is_empty() {
                return Ok(value);
            }
        }

        for source in &self.sources {
            let Some(path) = source.path() else {
                continue;
            };
            if let Some(value) = read_dotenv_value(&path, key) {
                tracing::debug!(provider = %tag, path = %path.display(), "credential loaded from .env");
                return Ok(value);
            }
        }

        Err(ToolError::MissingCredential { key })
    }
}

fn read_dotenv_value(path: &Path, key: &str) -> Option<String> {
    let entries = dotenv::from_path_iter(path).ok()?;
    entries
        .flatten()
        .find(|(name, value)| name == key && !value.is_empty())
        .map(|(_, value)| value)
}
