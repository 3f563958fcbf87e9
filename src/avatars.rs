use std::path::{Path, PathBuf};

use anyhow::Context;
use sha2::{Digest, Sha256};
use tokio::fs;
use uuid::Uuid;

use crate::config::AvatarConfig;

/// Deterministic default avatar, derived from the email alone. Gravatar
/// serves SHA-256 addresses, so the same email always maps to the same image.
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?d=identicon",
        hex::encode(digest)
    )
}

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Moves uploaded avatars from a staging directory into public storage.
#[derive(Debug, Clone)]
pub struct AvatarStore {
    staging: PathBuf,
    public_root: PathBuf,
    avatar_dir: String,
}

impl AvatarStore {
    pub fn new(cfg: &AvatarConfig) -> Self {
        Self {
            staging: PathBuf::from(&cfg.tmp_dir),
            public_root: PathBuf::from(&cfg.public_dir),
            avatar_dir: cfg.avatar_dir.clone(),
        }
    }

    pub fn rooted_at(root: &Path, cfg: &AvatarConfig) -> Self {
        Self {
            staging: root.join(&cfg.tmp_dir),
            public_root: root.join(&cfg.public_dir),
            avatar_dir: cfg.avatar_dir.clone(),
        }
    }

    /// Write an upload into staging under a user-namespaced, collision-free
    /// name: `{user_id}-{random}.{ext}`.
    pub async fn stage(&self, user_id: Uuid, ext: &str, body: &[u8]) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.staging)
            .await
            .with_context(|| format!("create staging dir {}", self.staging.display()))?;
        let path = self
            .staging
            .join(format!("{}-{}.{}", user_id, Uuid::new_v4(), ext));
        fs::write(&path, body)
            .await
            .with_context(|| format!("write staged avatar {}", path.display()))?;
        Ok(path)
    }

    /// Move a staged file into the public avatar directory and return its
    /// public URL path. On failure the staged file is removed before the
    /// error propagates, so a failed move never leaves an orphan in staging.
    /// The move itself is not transactional with the DB write that follows.
    pub async fn relocate(&self, temp_path: &Path) -> anyhow::Result<String> {
        match self.try_move(temp_path).await {
            Ok(file_name) => Ok(format!("/{}/{}", self.avatar_dir, file_name)),
            Err(err) => {
                let _ = fs::remove_file(temp_path).await;
                Err(err)
            }
        }
    }

    async fn try_move(&self, temp_path: &Path) -> anyhow::Result<String> {
        let dest_dir = self.public_root.join(&self.avatar_dir);
        fs::create_dir_all(&dest_dir)
            .await
            .with_context(|| format!("create avatar dir {}", dest_dir.display()))?;

        let file_name = temp_path
            .file_name()
            .and_then(|n| n.to_str())
            .context("staged avatar has no file name")?
            .to_string();
        let dest = dest_dir.join(&file_name);
        fs::rename(temp_path, &dest)
            .await
            .with_context(|| format!("move avatar to {}", dest.display()))?;
        Ok(file_name)
    }
}
