//! Song model and request/response payloads

use serde::{Deserialize, Serialize};

/// A stored song record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub song_id: i64,
    pub group: String,
    pub song: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub release_date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub lyrics: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
}

impl Song {
    #[cfg(test)]
    pub fn from_new(song_id: i64, new: NewSong) -> Self {
        Self {
            song_id,
            group: new.group,
            song: new.song,
            release_date: new.release_date,
            lyrics: new.lyrics,
            link: new.link,
        }
    }
}

/// Body accepted by the create and update endpoints.
///
/// Every field is optional on the wire so that a missing `group` or `song`
/// surfaces as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongBody {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub song: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub lyrics: String,
    #[serde(default)]
    pub link: String,
}

impl SongBody {
    /// Both `group` and `song` must be non-empty
    pub fn has_identity(&self) -> bool {
        !self.group.trim().is_empty() && !self.song.trim().is_empty()
    }

    /// Full replacement payload used by update
    pub fn into_new_song(self) -> NewSong {
        NewSong {
            group: self.group,
            song: self.song,
            release_date: self.release_date,
            lyrics: self.lyrics,
            link: self.link,
        }
    }
}

/// All mutable columns of a song, as written by insert and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSong {
    pub group: String,
    pub song: String,
    pub release_date: String,
    pub lyrics: String,
    pub link: String,
}

impl NewSong {
    /// Combine the caller-supplied identity with enrichment details
    pub fn enriched(group: String, song: String, detail: SongDetail) -> Self {
        Self {
            group,
            song,
            release_date: detail.release_date,
            lyrics: detail.text,
            link: detail.link,
        }
    }
}

/// Supplementary fields returned by the enrichment service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongDetail {
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: String,
}

/// Title and lyrics of one song; lyrics is empty when the column is NULL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongLyrics {
    pub title: String,
    pub lyrics: String,
}

/// Case-insensitive partial-match filters for listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub group: String,
    pub title: String,
}

impl SongFilter {
    pub fn new(group: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            title: title.into(),
        }
    }

    /// ILIKE pattern for the group column, `None` matches every row
    pub fn group_pattern(&self) -> Option<String> {
        like_pattern(&self.group)
    }

    /// ILIKE pattern for the title column, `None` matches every row
    pub fn title_pattern(&self) -> Option<String> {
        like_pattern(&self.title)
    }

    /// Same matching rule as the SQL patterns, for non-SQL stores
    #[cfg(test)]
    pub fn matches(&self, song: &Song) -> bool {
        contains_ignore_case(&song.group, &self.group)
            && contains_ignore_case(&song.song, &self.title)
    }
}

/// Wrap a substring as `%needle%`, escaping LIKE metacharacters
fn like_pattern(needle: &str) -> Option<String> {
    if needle.is_empty() {
        return None;
    }

    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

#[cfg(test)]
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// 1-indexed page window; both values are at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Rows to skip, saturated to the largest OFFSET Postgres accepts
    pub fn offset(&self) -> i64 {
        let rows = (self.page as u64 - 1) * self.limit as u64;
        i64::try_from(rows).unwrap_or(i64::MAX)
    }
}
