use std::path::{Path, PathBuf};

const DEFAULT_BASE_PATH: &str = "kuradb_data";

pub struct DBConfig {
    pub base_path: PathBuf,
}

impl Default for DBConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
        }
    }
}

impl DBConfig {
    pub fn new() -> Self {
        DBConfig::default()
    }

    pub fn base_path<P: AsRef<Path>>(mut self, p: P) -> Self {
        self.base_path = p.as_ref().to_path_buf();
        self
    }
}
