//! Core types for confstore
//!
//! Defines the config entity as it travels on the wire and the shapes the
//! views work with:
//! - [`ConfigItem`]: what the API returns
//! - [`ConfigPayload`]: what create/update send
//! - [`LoadedConfig`]: an item plus its resolved attachment URL
//! - [`ConfigDraft`] and [`LocalFile`]: view-local edits before submission

use crate::format::format_filename;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Server-assigned config identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigId(String);

impl ConfigId {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ConfigId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConfigId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Object-store key of an uploaded attachment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentKey(String);

impl AttachmentKey {
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for a freshly uploaded file: `"{epoch_millis}-{file_name}"`
    #[must_use]
    pub fn generate(file_name: &str, at: DateTime<Utc>) -> Self {
        Self(format!("{}-{}", at.timestamp_millis(), file_name))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Original file name, with the generation prefix stripped
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        format_filename(&self.0)
    }
}

impl std::fmt::Display for AttachmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored config as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigItem {
    pub config_id: ConfigId,
    #[serde(default)]
    pub config_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentKey>,
    #[serde(
        default,
        with = "created_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of create and update requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPayload {
    pub config_name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentKey>,
}

/// An item together with the retrieval URL of its attachment
///
/// The URL is derived client-side and has no place in [`ConfigPayload`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub item: ConfigItem,
    pub attachment_url: Option<Url>,
}

impl LoadedConfig {
    #[inline]
    #[must_use]
    pub fn new(item: ConfigItem, attachment_url: Option<Url>) -> Self {
        Self {
            item,
            attachment_url,
        }
    }
}

/// Local edit state of a config before it is submitted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDraft {
    pub config_name: String,
    pub content: String,
    pub attachment: Option<LocalFile>,
}

impl ConfigDraft {
    #[inline]
    #[must_use]
    pub fn new(config_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            config_name: config_name.into(),
            content: content.into(),
            attachment: None,
        }
    }

    /// Attach a picked file
    #[inline]
    #[must_use]
    pub fn with_attachment(mut self, file: LocalFile) -> Self {
        self.attachment = Some(file);
        self
    }

    /// Payload for the write call, using `attachment` as the stored key
    #[must_use]
    pub fn to_payload(&self, attachment: Option<AttachmentKey>) -> ConfigPayload {
        ConfigPayload {
            config_name: self.config_name.clone(),
            content: self.content.clone(),
            attachment,
        }
    }
}

/// Where the bytes of a picked file live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Memory(Vec<u8>),
    Disk(PathBuf),
}

/// A file picked by the user for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    name: String,
    size: u64,
    content_type: String,
    source: FileSource,
}

impl LocalFile {
    /// In-memory file
    #[must_use]
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            content_type: guess_content_type(&name).to_string(),
            size: bytes.len() as u64,
            name,
            source: FileSource::Memory(bytes),
        }
    }

    /// File on disk; only metadata is read here
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            content_type: guess_content_type(&name).to_string(),
            size: metadata.len(),
            name,
            source: FileSource::Disk(path.to_path_buf()),
        })
    }

    /// Override the guessed content type
    #[inline]
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes
    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Read the file contents
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Disk(path) => tokio::fs::read(path).await,
        }
    }
}

fn guess_content_type(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "log" => "text/plain",
        "json" => "application/json",
        "yaml" | "yml" => "application/yaml",
        "toml" => "application/toml",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// `createdAt` arrives as epoch milliseconds or as an RFC 3339 string
mod created_at {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Float(f64),
        Text(String),
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(raw.and_then(|raw| match raw {
            Raw::Millis(ms) => DateTime::from_timestamp_millis(ms),
            #[allow(clippy::cast_possible_truncation)]
            Raw::Float(ms) => DateTime::from_timestamp_millis(ms as i64),
            Raw::Text(text) => parse_text(&text),
        }))
    }

    fn parse_text(text: &str) -> Option<DateTime<Utc>> {
        if text.is_empty() {
            return None;
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
            return Some(ts.with_timezone(&Utc));
        }
        text.parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }

    pub(super) fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_some(&ts.timestamp_millis()),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn config_item_accepts_millisecond_timestamps() {
        let json = r#"{
            "userId": "us-east-1:abc",
            "configId": "c-1",
            "configName": "A",
            "content": "x",
            "attachment": "1700000000-report.pdf",
            "createdAt": 1700000000000
        }"#;

        let item: ConfigItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.config_id, ConfigId::new("c-1"));
        assert_eq!(item.attachment.as_ref().unwrap().display_name(), "report.pdf");
        assert_eq!(
            item.created_at,
            Some(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap())
        );
    }

    #[test]
    fn config_item_accepts_rfc3339_and_missing_timestamps() {
        let item: ConfigItem = serde_json::from_str(
            r#"{"configId":"c-2","configName":"B","content":"y","createdAt":"2024-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        assert_eq!(
            item.created_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
        );

        let item: ConfigItem =
            serde_json::from_str(r#"{"configId":"c-3","configName":"C","content":"z"}"#).unwrap();
        assert!(item.created_at.is_none());
        assert!(item.attachment.is_none());

        let item: ConfigItem = serde_json::from_str(
            r#"{"configId":"c-4","content":"z","createdAt":"not a date"}"#,
        )
        .unwrap();
        assert!(item.created_at.is_none());
    }

    #[test]
    fn payload_omits_absent_attachment() {
        let payload = ConfigDraft::new("A", "x").to_payload(None);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"configName": "A", "content": "x"}));

        let payload = ConfigDraft::new("A", "x").to_payload(Some(AttachmentKey::new("1-a.txt")));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["attachment"], "1-a.txt");
    }

    #[test]
    fn attachment_key_generation() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let key = AttachmentKey::generate("report.pdf", at);
        assert_eq!(key.as_str(), "1700000000123-report.pdf");
        assert_eq!(key.display_name(), "report.pdf");
    }

    #[test]
    fn local_file_from_bytes() {
        let file = LocalFile::from_bytes("settings.JSON", vec![0; 42]);
        assert_eq!(file.size(), 42);
        assert_eq!(file.content_type(), "application/json");

        let file = LocalFile::from_bytes("blob", vec![]).with_content_type("text/csv");
        assert_eq!(file.content_type(), "text/csv");
    }

    #[tokio::test]
    async fn local_file_open_reads_metadata_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello world").unwrap();

        let file = LocalFile::open(&path).await.unwrap();
        assert_eq!(file.name(), "notes.txt");
        assert_eq!(file.size(), 11);
        assert_eq!(file.content_type(), "text/plain");
        assert_eq!(file.read().await.unwrap(), b"hello world");

        assert!(LocalFile::open(dir.path()).await.is_err());
    }
}
