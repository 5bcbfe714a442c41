use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use ulasan_core::LabelNames;

/// A single cell of a review table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(serde_json::Number),
}

impl CellValue {
    /// Render the value as text. Numbers use their decimal form.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value.into())
    }
}

/// One record of a review table: column name to value, in column order.
///
/// Keys are unique. Setting an existing key replaces its value in place and
/// keeps the column position; new keys are appended.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    fields: Vec<(String, CellValue)>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs. Later duplicates overwrite
    /// earlier ones.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        let mut row = Self::new();
        for (key, value) in pairs {
            row.insert(key, value);
        }
        row
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Text content of `key`, with a missing column reading as `""`.
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(CellValue::to_text).unwrap_or_default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Copy of this row with one more field set.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Label for a lexicon score: above zero is positive, below is negative,
    /// zero is neutral.
    #[must_use]
    pub fn from_score(score: i64) -> Self {
        match score.signum() {
            1 => SentimentLabel::Positive,
            -1 => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        }
    }

    /// The configured spelling of this label for output tables.
    #[must_use]
    pub fn display_name<'a>(&self, names: &'a LabelNames) -> &'a str {
        match self {
            SentimentLabel::Positive => &names.positive,
            SentimentLabel::Negative => &names.negative,
            SentimentLabel::Neutral => &names.neutral,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

/// Count of kept rows per label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DistributionCounters {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl DistributionCounters {
    pub fn increment(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    #[must_use]
    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// Counters reported once per batch run.
///
/// `input_count == output_count + dropped_empty + dropped_duplicate` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub input_count: usize,
    pub output_count: usize,
    pub dropped_empty: usize,
    pub dropped_duplicate: usize,
    pub distribution: DistributionCounters,
}

/// Per-batch switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Column holding the review text.
    pub text_field: String,
    pub use_stopwords: bool,
    pub dedup: bool,
    pub drop_empty: bool,
    /// Maximum number of kept rows echoed back in [`crate::BatchOutput::preview`].
    pub preview_limit: usize,
}

pub const DEFAULT_TEXT_FIELD: &str = "full_text";
pub const DEFAULT_PREVIEW_LIMIT: usize = 50;

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            text_field: DEFAULT_TEXT_FIELD.to_string(),
            use_stopwords: true,
            dedup: true,
            drop_empty: true,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}
