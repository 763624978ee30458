//! Lyrics stanza splitting and pagination

use thiserror::Error;

/// Blank line between stanzas
pub const STANZA_SEPARATOR: &str = "\n\n";

/// Requested page starts past the last stanza
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("page {page} is out of range ({total_stanzas} stanzas)")]
pub struct PageOutOfRange {
    pub page: usize,
    pub total_stanzas: usize,
}

/// One page of stanzas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StanzaPage {
    pub stanzas: Vec<String>,
    pub page: usize,
    pub page_size: usize,
    pub total_stanzas: usize,
}

/// Lyrics library
pub struct LyricsLib;

impl LyricsLib {
    /// Split lyrics into stanzas on blank lines, keeping their order
    pub fn split_stanzas(lyrics: &str) -> Vec<String> {
        let normalized = lyrics.replace("\r\n", "\n");
        normalized
            .split(STANZA_SEPARATOR)
            .map(str::to_string)
            .collect()
    }

    /// Return stanzas `[(page-1)*size, page*size)`, clipped to the stanza count.
    ///
    /// `page` and `size` are 1-based and clamped to at least 1.
    pub fn paginate(lyrics: &str, page: usize, size: usize) -> Result<StanzaPage, PageOutOfRange> {
        let page = page.max(1);
        let size = size.max(1);

        let stanzas = Self::split_stanzas(lyrics);
        let total_stanzas = stanzas.len();

        let start = (page - 1).saturating_mul(size);
        if start >= total_stanzas {
            return Err(PageOutOfRange {
                page,
                total_stanzas,
            });
        }
        let end = start.saturating_add(size).min(total_stanzas);

        Ok(StanzaPage {
            stanzas: stanzas[start..end].to_vec(),
            page,
            page_size: size,
            total_stanzas,
        })
    }
}
