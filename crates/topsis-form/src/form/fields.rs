use std::fs;
use std::io;
use std::path::Path;

/// A selected CSV dataset as the form holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let file_name = file_name.into();
        let content_type = content_type
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| guess_content_type(&file_name));
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data.csv".to_string());
        Ok(Self::new(file_name, None, bytes))
    }

    /// Browsers submit an unselected file input as an empty, unnamed part.
    pub fn is_blank(&self) -> bool {
        self.file_name.trim().is_empty() && self.bytes.is_empty()
    }
}

fn guess_content_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first()
        .unwrap_or(mime::TEXT_CSV)
        .essence_str()
        .to_string()
}

/// Everything the form currently shows, valid or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub file: Option<UploadFile>,
    pub weights: String,
    pub impacts: String,
    pub email: String,
    pub send_mail: bool,
}
