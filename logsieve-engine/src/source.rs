use crate::{
    error::{EngineError, Result},
    log_line::LogLine,
};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::PathBuf,
};

/// where a document's lines come from
#[derive(Debug, Clone)]
pub enum LineSource {
    File(PathBuf),
    PastedText(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    PastedText,
}

/// number of characters of pasted text used as a page name
const PASTE_NAME_CHARS: usize = 21;

impl LineSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            LineSource::File(_) => SourceKind::File,
            LineSource::PastedText(_) => SourceKind::PastedText,
        }
    }

    /// path for files, the text itself for pasted content
    pub fn source_ref(&self) -> String {
        match self {
            LineSource::File(path) => path.display().to_string(),
            LineSource::PastedText(text) => text.clone(),
        }
    }

    /// short human-readable name for tabs and titles
    pub fn display_name(&self) -> String {
        match self {
            LineSource::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            LineSource::PastedText(text) => text.chars().take(PASTE_NAME_CHARS).collect(),
        }
    }

    /// read every line of the source
    pub fn read_lines(&self) -> Result<Vec<LogLine>> {
        match self {
            LineSource::File(path) => {
                let file = File::open(path).map_err(|source| EngineError::Ingestion {
                    source_ref: path.display().to_string(),
                    source,
                })?;
                read_lines_from(BufReader::new(file)).map_err(|source| EngineError::Ingestion {
                    source_ref: path.display().to_string(),
                    source,
                })
            }
            LineSource::PastedText(text) => read_lines_from(text.as_bytes())
                .map_err(|source| EngineError::Ingestion {
                    source_ref: "pasted text".to_string(),
                    source,
                }),
        }
    }
}

/// split a byte stream into numbered lines
///
/// lines end at `\n`, `\r\n` or a lone `\r`, and a final line break does not
/// produce an extra empty line. invalid UTF-8 is replaced, not rejected.
pub fn read_lines_from<R: Read>(reader: R) -> std::io::Result<Vec<LogLine>> {
    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let bytes_read = reader.read_until(b'\n', &mut buf)?;
        if bytes_read == 0 {
            break;
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
        }

        // a lone `\r` also ends a line; the `\r` of `\r\n` or a final `\r`
        // closes the last piece instead of opening an empty one
        let mut pieces: Vec<&[u8]> = buf.split(|&b| b == b'\r').collect();
        if pieces.len() > 1 && pieces.last().is_some_and(|p| p.is_empty()) {
            pieces.pop();
        }
        for piece in pieces {
            let raw = String::from_utf8_lossy(piece);
            lines.push(LogLine::from_raw(lines.len(), &raw));
        }
    }

    Ok(lines)
}
