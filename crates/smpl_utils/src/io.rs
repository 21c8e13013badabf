use std::{fs::File, io::BufReader, path::Path};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

pub struct FileLoader {}
impl FileLoader {
    /// Opens a file for buffered reading.
    pub fn open(file_path: impl AsRef<Path>) -> std::io::Result<BufReader<File>> {
        File::open(file_path).map(BufReader::new)
    }
}

/// associating a extension with a enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum FileType {
    Json,
    Npz,
    Unknown,
}
impl FileType {
    pub fn value(&self) -> &'static [&'static str] {
        match self {
            Self::Json => &["json"],
            Self::Npz => &["npz"],
            Self::Unknown => &[""],
        }
    }
    pub fn find_match(ext: &str) -> Self {
        Self::iter()
            .find(|filetype| filetype.value().contains(&(ext.to_lowercase()).as_str()))
            .unwrap_or(FileType::Unknown)
    }
    /// Looks at the extension of the path, no content sniffing
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(FileType::Unknown, Self::find_match)
    }
}
