use std::borrow::Cow;

use csv::ByteRecord;
use encoding_rs::{EUC_KR, UTF_8};
use tracing::debug;

use crate::config::{DashboardConfig, SourceEncoding};
use crate::error::{DashboardError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decodes `bytes` and splits them into rows of text cells, header included.
///
/// Rows may have differing lengths; callers treat missing cells as empty.
pub fn read_grid(bytes: &[u8], config: &DashboardConfig) -> Result<Vec<Vec<String>>> {
    let text = decode(bytes, config.encoding)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte()?)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    let mut record = ByteRecord::new();
    loop {
        let more = reader
            .read_byte_record(&mut record)
            .map_err(|err| DashboardError::unreadable("csv", err))?;
        if !more {
            break;
        }
        // The text was decoded up front, so every field is valid UTF-8.
        let row = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        grid.push(row);
    }

    if grid.is_empty() {
        return Err(DashboardError::unreadable("csv", "input is empty"));
    }
    debug!(records = grid.len(), "parsed delimited records");
    Ok(grid)
}

/// Decodes raw bytes according to `encoding`.
///
/// EUC-KR and CP949 share the WHATWG EUC-KR decoder, which covers the CP949
/// extension. Malformed byte sequences are rejected in every mode.
pub fn decode(bytes: &[u8], encoding: SourceEncoding) -> Result<Cow<'_, str>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match encoding {
        SourceEncoding::Utf8 => std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|err| DashboardError::unreadable("csv", format!("invalid UTF-8: {err}"))),
        SourceEncoding::EucKr | SourceEncoding::Cp949 => {
            let (text, had_errors) = EUC_KR.decode_without_bom_handling(bytes);
            if had_errors {
                return Err(DashboardError::unreadable(
                    "csv",
                    "byte sequence is not valid EUC-KR/CP949",
                ));
            }
            Ok(text)
        }
        SourceEncoding::Auto => {
            if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
                return Ok(text);
            }
            debug!("input is not UTF-8, decoding as EUC-KR");
            let (text, had_errors) = EUC_KR.decode_without_bom_handling(bytes);
            if had_errors {
                return Err(DashboardError::unreadable(
                    "csv",
                    "byte sequence is neither UTF-8 nor EUC-KR/CP949",
                ));
            }
            Ok(text)
        }
    }
}
