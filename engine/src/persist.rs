use crate::error::PersistError;
use crate::InvertedIndex;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    /// Pretty-printed JSON, the human-readable default.
    Json,
    /// Compact bincode snapshot.
    Bincode,
}

impl IndexFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("bin") => IndexFormat::Bincode,
            _ => IndexFormat::Json,
        }
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> PersistError + '_ {
    move |source| PersistError::Io { path: path.to_path_buf(), source }
}

pub fn encode_index(
    index: &InvertedIndex,
    format: IndexFormat,
    path: &Path,
) -> Result<Vec<u8>, PersistError> {
    match format {
        IndexFormat::Json => serde_json::to_vec_pretty(index)
            .map_err(|source| PersistError::Json { path: path.to_path_buf(), source }),
        IndexFormat::Bincode => bincode::serialize(index)
            .map_err(|source| PersistError::Bincode { path: path.to_path_buf(), source }),
    }
}

/// Write the index to `path`, choosing the format from its extension. The
/// file is written beside the target and renamed into place.
pub fn save_index(path: &Path, index: &InvertedIndex) -> Result<(), PersistError> {
    let bytes = encode_index(index, IndexFormat::for_path(path), path)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err(dir))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let mut f = File::create(&tmp).map_err(io_err(&tmp))?;
    f.write_all(&bytes).map_err(io_err(&tmp))?;
    f.sync_all().map_err(io_err(&tmp))?;
    fs::rename(&tmp, path).map_err(io_err(path))?;
    tracing::info!(
        path = %path.display(),
        bytes = bytes.len(),
        terms = index.num_terms(),
        docs = index.num_docs(),
        "saved index"
    );
    Ok(())
}

/// Load a persisted index and check that every posted id is registered.
pub fn load_index(path: &Path) -> Result<InvertedIndex, PersistError> {
    let mut f = File::open(path).map_err(io_err(path))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).map_err(io_err(path))?;
    let index: InvertedIndex = match IndexFormat::for_path(path) {
        IndexFormat::Json => serde_json::from_slice(&buf)
            .map_err(|source| PersistError::Json { path: path.to_path_buf(), source })?,
        IndexFormat::Bincode => bincode::deserialize(&buf)
            .map_err(|source| PersistError::Bincode { path: path.to_path_buf(), source })?,
    };
    validate(&index).map_err(|reason| PersistError::Corrupt { path: path.to_path_buf(), reason })?;
    tracing::info!(
        path = %path.display(),
        terms = index.num_terms(),
        docs = index.num_docs(),
        "loaded index"
    );
    Ok(index)
}

fn validate(index: &InvertedIndex) -> Result<(), String> {
    for (lemma, ids) in &index.inverted_index {
        if lemma.is_empty() {
            return Err("empty lemma".into());
        }
        if let Some(id) = ids.iter().find(|id| !index.documents.contains_key(*id)) {
            return Err(format!("lemma {lemma:?} posts unregistered document {id}"));
        }
    }
    Ok(())
}
