use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootLayout {
    root: PathBuf,
}

impl RootLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn system() -> Self {
        Self::new("/")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_system_root(&self) -> bool {
        self.root == Path::new("/")
    }

    pub fn resolve(&self, stored_path: &str) -> PathBuf {
        if self.is_system_root() {
            return PathBuf::from(stored_path);
        }
        self.root.join(stored_path.trim_start_matches('/'))
    }

    pub fn default_db_dir(&self) -> PathBuf {
        self.root.join("var").join("lib").join("rpmrm")
    }
}

impl Default for RootLayout {
    fn default() -> Self {
        Self::system()
    }
}
