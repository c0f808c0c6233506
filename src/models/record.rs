//! Backup ledger records
//!
//! One `BackupRecord` per tracked item. Records are created the first time
//! an item is seen and afterwards only updated through a `RecordPatch`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Text written in date columns before the first successful backup
pub const NOT_BACKED_UP: &str = "Not yet backed up";

/// Date format used for the human-readable ledger columns
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Render an epoch-millisecond timestamp as UTC text
pub fn stamp_to_text(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts)
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// A successful backup of one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupStamp {
    /// Run start time in epoch milliseconds
    pub backup_ts: i64,
    /// Committed archive location
    pub zip_path: String,
}

/// Partial update for a ledger record
///
/// `None` fields leave the stored value alone. Metadata patches come from
/// the catalog; backup patches come from a verified run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub item_id: String,
    pub item_name: Option<String>,
    pub item_title: Option<String>,
    pub url: Option<String>,
    pub updated_ts: Option<i64>,
    pub last_edit_date_ts: Option<i64>,
    pub backup: Option<BackupStamp>,
}

/// Durable backup state for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub item_id: String,

    #[serde(default)]
    pub item_name: String,

    #[serde(default)]
    pub item_title: String,

    #[serde(default)]
    pub url: String,

    /// Item-level last modified time reported by the catalog
    #[serde(default, deserialize_with = "lenient_millis")]
    pub updated_ts: i64,

    #[serde(default)]
    pub last_edit_date: String,

    /// Latest edit across all layers and tables, 0 if never edited
    #[serde(default, deserialize_with = "lenient_millis")]
    pub last_edit_date_ts: i64,

    #[serde(default)]
    pub backup_date: String,

    /// Last successful backup; `None` means never backed up or unknown
    #[serde(
        default,
        serialize_with = "serialize_backup_ts",
        deserialize_with = "lenient_backup_ts"
    )]
    pub backup_ts: Option<i64>,

    #[serde(default)]
    pub zip_path: String,
}

impl BackupRecord {
    /// A record for an item that has never been backed up
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            item_name: String::new(),
            item_title: String::new(),
            url: String::new(),
            updated_ts: 0,
            last_edit_date: stamp_to_text(0),
            last_edit_date_ts: 0,
            backup_date: NOT_BACKED_UP.to_string(),
            backup_ts: None,
            zip_path: NOT_BACKED_UP.to_string(),
        }
    }

    /// Build a fresh record from a patch
    pub fn from_patch(patch: &RecordPatch) -> Self {
        let mut record = Self::new(patch.item_id.clone());
        record.apply(patch);
        record
    }

    /// Apply a patch in place
    ///
    /// Backup fields only move forward: a stamp older than the stored
    /// `backup_ts` is ignored. Returns false if the patch carried a stale
    /// backup stamp.
    pub fn apply(&mut self, patch: &RecordPatch) -> bool {
        if let Some(name) = &patch.item_name {
            self.item_name = name.clone();
        }
        if let Some(title) = &patch.item_title {
            self.item_title = title.clone();
        }
        if let Some(url) = &patch.url {
            self.url = url.clone();
        }
        if let Some(ts) = patch.updated_ts {
            self.updated_ts = ts;
        }
        if let Some(ts) = patch.last_edit_date_ts {
            self.last_edit_date_ts = ts;
            self.last_edit_date = stamp_to_text(ts);
        }

        match &patch.backup {
            Some(stamp) if self.backup_ts.map_or(true, |prev| stamp.backup_ts >= prev) => {
                self.backup_ts = Some(stamp.backup_ts);
                self.backup_date = stamp_to_text(stamp.backup_ts);
                self.zip_path = stamp.zip_path.clone();
                true
            }
            Some(_) => false,
            None => true,
        }
    }

    /// Whether the item needs a new backup
    ///
    /// An unknown `backup_ts` always counts as older than any edit.
    pub fn is_stale(&self) -> bool {
        match self.backup_ts {
            None => true,
            Some(backup_ts) => backup_ts < self.last_edit_date_ts,
        }
    }

    /// Whether the item has ever been backed up successfully
    pub fn has_backup(&self) -> bool {
        self.backup_ts.is_some()
    }
}

fn parse_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<i64>().ok().or_else(|| {
        // Spreadsheet tools tend to rewrite integers as "1.7e12" or "123.0"
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.round() as i64)
    })
}

fn lenient_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_millis(&raw).unwrap_or(0))
}

fn lenient_backup_ts<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_millis(&raw).filter(|ts| *ts > 0))
}

fn serialize_backup_ts<S>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(value.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(ts: i64) -> BackupStamp {
        BackupStamp {
            backup_ts: ts,
            zip_path: format!("/out/a_{}.zip", ts),
        }
    }

    #[test]
    fn test_new_record_is_stale() {
        let record = BackupRecord::new("a");
        assert!(record.is_stale());
        assert!(!record.has_backup());
        assert_eq!(record.backup_date, NOT_BACKED_UP);
        assert_eq!(record.zip_path, NOT_BACKED_UP);
    }

    #[test]
    fn test_never_backed_up_and_never_edited_is_still_stale() {
        let record = BackupRecord::new("a");
        assert_eq!(record.last_edit_date_ts, 0);
        assert!(record.is_stale());
    }

    #[test]
    fn test_staleness_compares_timestamps() {
        let mut record = BackupRecord::new("a");
        record.last_edit_date_ts = 1_000;

        record.backup_ts = Some(999);
        assert!(record.is_stale());

        record.backup_ts = Some(1_000);
        assert!(!record.is_stale());

        record.backup_ts = Some(2_000);
        assert!(!record.is_stale());
    }

    #[test]
    fn test_apply_preserves_backup_fields_on_metadata_patch() {
        let mut record = BackupRecord::new("a");
        record.apply(&RecordPatch {
            item_id: "a".into(),
            backup: Some(stamp(500)),
            ..Default::default()
        });

        record.apply(&RecordPatch {
            item_id: "a".into(),
            item_title: Some("Roads".into()),
            last_edit_date_ts: Some(800),
            ..Default::default()
        });

        assert_eq!(record.item_title, "Roads");
        assert_eq!(record.backup_ts, Some(500));
        assert_eq!(record.zip_path, "/out/a_500.zip");
        assert!(record.is_stale());
    }

    #[test]
    fn test_backup_ts_never_moves_backwards() {
        let mut record = BackupRecord::new("a");
        assert!(record.apply(&RecordPatch {
            item_id: "a".into(),
            backup: Some(stamp(2_000)),
            ..Default::default()
        }));
        assert!(!record.apply(&RecordPatch {
            item_id: "a".into(),
            backup: Some(stamp(1_000)),
            ..Default::default()
        }));

        assert_eq!(record.backup_ts, Some(2_000));
        assert_eq!(record.zip_path, "/out/a_2000.zip");
    }

    #[test]
    fn test_stamp_to_text() {
        // 2024-01-02T03:04:05Z
        assert_eq!(stamp_to_text(1_704_164_645_000), "02/01/2024 03:04:05");
        assert_eq!(stamp_to_text(0), "01/01/1970 00:00:00");
    }

    #[test]
    fn test_parse_millis_accepts_float_text() {
        assert_eq!(parse_millis("1704164645000"), Some(1_704_164_645_000));
        assert_eq!(parse_millis("1704164645000.0"), Some(1_704_164_645_000));
        assert_eq!(parse_millis(" "), None);
        assert_eq!(parse_millis("NaN"), None);
    }
}
