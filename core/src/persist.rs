use crate::cleanup::StopWords;
use crate::Collection;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
}

/// Layout of a data directory holding a collection and its stopword list.
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn collection(&self) -> PathBuf { self.root.join("my_collection.json") }
    pub fn stop_words(&self) -> PathBuf { self.root.join("stopwords.json") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// Reads a whole file, `None` if it does not exist.
fn read_if_exists(path: &Path) -> Result<Option<String>> {
    let mut f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    Ok(Some(buf))
}

pub fn save_collection(paths: &DataPaths, collection: &Collection) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.collection())?;
    let json = serde_json::to_string(collection)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

/// Loads the collection; a missing file gives an empty collection.
pub fn load_collection(paths: &DataPaths) -> Result<Collection> {
    match read_if_exists(&paths.collection())? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => {
            tracing::warn!(path = %paths.collection().display(), "no collection found, starting empty");
            Ok(Collection::new())
        }
    }
}

/// Saves the stopword list as a sorted JSON array.
pub fn save_stop_words(paths: &DataPaths, stop_words: &StopWords) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut words: Vec<&String> = stop_words.iter().collect();
    words.sort();
    let mut f = File::create(paths.stop_words())?;
    let json = serde_json::to_string(&words)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

/// Loads the stopword list; a missing file gives an empty list.
pub fn load_stop_words(paths: &DataPaths) -> Result<StopWords> {
    match read_if_exists(&paths.stop_words())? {
        Some(json) => {
            let words: Vec<String> = serde_json::from_str(&json)?;
            Ok(words.into_iter().collect())
        }
        None => {
            tracing::warn!(path = %paths.stop_words().display(), "no stopword list found");
            Ok(StopWords::new())
        }
    }
}

pub fn save_meta(paths: &DataPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &DataPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Loads everything a search host needs: collection and stopword list.
pub fn load_data_dir(paths: &DataPaths) -> Result<(Collection, StopWords)> {
    let collection = load_collection(paths)?;
    let stop_words = load_stop_words(paths)?;
    Ok((collection, stop_words))
}
