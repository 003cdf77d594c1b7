use std::fs;
use std::io::{IsTerminal, Read};
use std::path::Path;

use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum SourceKind {
    File,
    Stdin,
    Upload,
}

impl SourceKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Stdin => "stdin",
            Self::Upload => "upload",
        }
    }
}

/// Raw upload bytes plus whatever naming context came with them.
#[derive(Debug, Clone)]
pub struct UploadSource {
    pub(crate) source_kind: SourceKind,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadSource {
    pub fn from_upload(file_name: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            source_kind: SourceKind::Upload,
            file_name,
            bytes,
        }
    }

    pub fn source_kind(&self) -> &'static str {
        self.source_kind.as_str()
    }

    pub(crate) fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        Path::new(name)
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase)
    }

    pub(crate) fn stem(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        Path::new(name)
            .file_stem()
            .and_then(|value| value.to_str())
            .map(str::to_string)
    }
}

pub(crate) fn resolve_source(
    path: Option<String>,
    stdin_override: Option<Vec<u8>>,
) -> ClientResult<UploadSource> {
    if let Some(path_value) = path
        && path_value != "-"
    {
        let bytes = fs::read(&path_value).map_err(|error| {
            ClientError::invalid_argument_with_recovery(
                &format!("Could not read workbook `{path_value}`: {error}"),
                vec![
                    "Verify the path exists and is readable.".to_string(),
                    "Rerun creditlens score <path>.".to_string(),
                ],
            )
        })?;
        return Ok(UploadSource {
            source_kind: SourceKind::File,
            file_name: Some(path_value),
            bytes,
        });
    }

    match read_stdin(stdin_override)? {
        Some(bytes) => Ok(UploadSource {
            source_kind: SourceKind::Stdin,
            file_name: None,
            bytes,
        }),
        None => Err(ClientError::upload_empty()),
    }
}

fn read_stdin(stdin_override: Option<Vec<u8>>) -> ClientResult<Option<Vec<u8>>> {
    if let Some(value) = stdin_override {
        return Ok(Some(value).filter(|bytes| !bytes.is_empty()));
    }

    if std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let mut buffer = Vec::new();
    std::io::stdin().read_to_end(&mut buffer).map_err(|error| {
        ClientError::invalid_argument_with_recovery(
            &format!("Could not read stdin: {error}"),
            vec![
                "Retry with an explicit file path argument.".to_string(),
                "Or rerun with valid stdin content.".to_string(),
            ],
        )
    })?;

    if buffer.is_empty() {
        return Ok(None);
    }

    Ok(Some(buffer))
}
