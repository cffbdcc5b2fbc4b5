//! Customer records.
//!
//! Records travel as JSON objects keyed by spreadsheet column header, so the
//! same shape comes back from the backend, goes into create calls and is
//! produced by the spreadsheet import.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Column header holding the customer's full name.
pub const FULL_NAME_COLUMN: &str = "Nome Completo";
/// Column header holding the customer's tax ID.
pub const TAX_ID_COLUMN: &str = "CPF";
/// Column header holding the customer's phone number.
pub const PHONE_NUMBER_COLUMN: &str = "Numero";

/// Columns a spreadsheet must carry to be importable (case-sensitive).
pub const REQUIRED_COLUMNS: [&str; 3] = [FULL_NAME_COLUMN, TAX_ID_COLUMN, PHONE_NUMBER_COLUMN];

/// One customer entry.
///
/// Spreadsheet-backed collections hand back numbers for numeric-looking
/// cells and `null` for blank ones; both are read as text. Columns other
/// than the three known ones are kept in [`Self::extra`] and written back
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "Nome Completo", default, deserialize_with = "cell_text")]
    pub full_name: String,
    #[serde(rename = "CPF", default, deserialize_with = "cell_text")]
    pub tax_id: String,
    #[serde(rename = "Numero", default, deserialize_with = "cell_text")]
    pub phone_number: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomerRecord {
    /// Create a record from its three visible fields.
    #[must_use]
    pub fn new(
        full_name: impl Into<String>,
        tax_id: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            tax_id: tax_id.into(),
            phone_number: phone_number.into(),
            extra: Map::new(),
        }
    }

    /// Case-insensitive substring match against the visible fields.
    ///
    /// The fields are joined by a single space, so a query may span the
    /// boundary between two of them. A blank query matches everything.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let haystack = format!("{} {} {}", self.full_name, self.tax_id, self.phone_number)
            .to_lowercase();
        haystack.contains(&needle)
    }
}

/// A partial update of a [`CustomerRecord`].
///
/// `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(rename = "Nome Completo", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(rename = "CPF", skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(rename = "Numero", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl RecordPatch {
    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.tax_id.is_none() && self.phone_number.is_none()
    }

    /// Build the record that results from applying this patch to `base`.
    #[must_use]
    pub fn merged_onto(&self, base: &CustomerRecord) -> CustomerRecord {
        CustomerRecord {
            full_name: self
                .full_name
                .clone()
                .unwrap_or_else(|| base.full_name.clone()),
            tax_id: self.tax_id.clone().unwrap_or_else(|| base.tax_id.clone()),
            phone_number: self
                .phone_number
                .clone()
                .unwrap_or_else(|| base.phone_number.clone()),
            extra: base.extra.clone(),
        }
    }
}

/// Read a spreadsheet cell as text.
fn cell_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}
