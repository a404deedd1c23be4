//! Label record: the flat set of named text fields printed on a shipping label.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::TarazuError;

/// Default prefix for the QR payload derived from a tracking number.
pub const DEFAULT_QR_BASE_URL: &str = "https://tracking.post.ir/?id=";

/// Names of the editable fields of a [`LabelRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelField {
    TrackingNumber,
    OrderId,
    SenderName,
    SenderCity,
    SenderAddress,
    ReceiverName,
    ReceiverCity,
    ReceiverAddress,
    ReceiverPostCode,
    ReceiverPhone,
    ReceiverMobile,
    Weight,
    Price,
    PaymentMethod,
    Date,
    Time,
    Barcode,
    QrData,
    CustomNote,
}

impl LabelField {
    pub const ALL: [LabelField; 19] = [
        LabelField::TrackingNumber,
        LabelField::OrderId,
        LabelField::SenderName,
        LabelField::SenderCity,
        LabelField::SenderAddress,
        LabelField::ReceiverName,
        LabelField::ReceiverCity,
        LabelField::ReceiverAddress,
        LabelField::ReceiverPostCode,
        LabelField::ReceiverPhone,
        LabelField::ReceiverMobile,
        LabelField::Weight,
        LabelField::Price,
        LabelField::PaymentMethod,
        LabelField::Date,
        LabelField::Time,
        LabelField::Barcode,
        LabelField::QrData,
        LabelField::CustomNote,
    ];

    /// Wire name (camelCase).
    pub fn as_str(self) -> &'static str {
        match self {
            LabelField::TrackingNumber => "trackingNumber",
            LabelField::OrderId => "orderId",
            LabelField::SenderName => "senderName",
            LabelField::SenderCity => "senderCity",
            LabelField::SenderAddress => "senderAddress",
            LabelField::ReceiverName => "receiverName",
            LabelField::ReceiverCity => "receiverCity",
            LabelField::ReceiverAddress => "receiverAddress",
            LabelField::ReceiverPostCode => "receiverPostCode",
            LabelField::ReceiverPhone => "receiverPhone",
            LabelField::ReceiverMobile => "receiverMobile",
            LabelField::Weight => "weight",
            LabelField::Price => "price",
            LabelField::PaymentMethod => "paymentMethod",
            LabelField::Date => "date",
            LabelField::Time => "time",
            LabelField::Barcode => "barcode",
            LabelField::QrData => "qrData",
            LabelField::CustomNote => "customNote",
        }
    }
}

impl fmt::Display for LabelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelField {
    type Err = TarazuError;

    /// Accepts the camelCase wire name or its snake_case spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| *c != '_').collect::<String>().to_lowercase();
        LabelField::ALL
            .into_iter()
            .find(|field| field.as_str().to_lowercase() == wanted)
            .ok_or_else(|| TarazuError::UnknownField(s.to_string()))
    }
}

/// Which derived fields currently hold a direct edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedOverrides {
    pub barcode: bool,
    pub qr_data: bool,
}

/// # Label Record
///
/// Every field is free text. `barcode` and `qr_data` follow
/// `tracking_number`: changing the tracking number through [`LabelRecord::set`]
/// rewrites both. A direct edit of either one sticks until the tracking
/// number changes again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelRecord {
    pub tracking_number: String,
    pub order_id: String,

    pub sender_name: String,
    pub sender_city: String,
    pub sender_address: String,

    pub receiver_name: String,
    pub receiver_city: String,
    pub receiver_address: String,
    pub receiver_post_code: String,
    pub receiver_phone: String,
    pub receiver_mobile: String,

    pub weight: String,
    pub price: String,
    pub payment_method: String,
    pub date: String,
    pub time: String,

    pub barcode: String,
    pub qr_data: String,
    pub custom_note: String,

    #[serde(skip)]
    overrides: DerivedOverrides,
    #[serde(skip)]
    qr_base_url: Option<String>,
}

impl LabelRecord {
    /// Empty record stamped with the given date (`YYYY-MM-DD`) and time (`HH:MM:SS`).
    pub fn new_at(now: DateTime<Local>) -> Self {
        Self {
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M:%S").to_string(),
            ..Default::default()
        }
    }

    /// Use a different prefix when deriving `qr_data` from the tracking number.
    pub fn with_qr_base_url(mut self, base: impl Into<String>) -> Self {
        self.qr_base_url = Some(base.into());
        self
    }

    pub fn qr_base_url(&self) -> &str {
        self.qr_base_url.as_deref().unwrap_or(DEFAULT_QR_BASE_URL)
    }

    pub fn overrides(&self) -> DerivedOverrides {
        self.overrides
    }

    pub fn get(&self, field: LabelField) -> &str {
        match field {
            LabelField::TrackingNumber => &self.tracking_number,
            LabelField::OrderId => &self.order_id,
            LabelField::SenderName => &self.sender_name,
            LabelField::SenderCity => &self.sender_city,
            LabelField::SenderAddress => &self.sender_address,
            LabelField::ReceiverName => &self.receiver_name,
            LabelField::ReceiverCity => &self.receiver_city,
            LabelField::ReceiverAddress => &self.receiver_address,
            LabelField::ReceiverPostCode => &self.receiver_post_code,
            LabelField::ReceiverPhone => &self.receiver_phone,
            LabelField::ReceiverMobile => &self.receiver_mobile,
            LabelField::Weight => &self.weight,
            LabelField::Price => &self.price,
            LabelField::PaymentMethod => &self.payment_method,
            LabelField::Date => &self.date,
            LabelField::Time => &self.time,
            LabelField::Barcode => &self.barcode,
            LabelField::QrData => &self.qr_data,
            LabelField::CustomNote => &self.custom_note,
        }
    }

    fn slot_mut(&mut self, field: LabelField) -> &mut String {
        match field {
            LabelField::TrackingNumber => &mut self.tracking_number,
            LabelField::OrderId => &mut self.order_id,
            LabelField::SenderName => &mut self.sender_name,
            LabelField::SenderCity => &mut self.sender_city,
            LabelField::SenderAddress => &mut self.sender_address,
            LabelField::ReceiverName => &mut self.receiver_name,
            LabelField::ReceiverCity => &mut self.receiver_city,
            LabelField::ReceiverAddress => &mut self.receiver_address,
            LabelField::ReceiverPostCode => &mut self.receiver_post_code,
            LabelField::ReceiverPhone => &mut self.receiver_phone,
            LabelField::ReceiverMobile => &mut self.receiver_mobile,
            LabelField::Weight => &mut self.weight,
            LabelField::Price => &mut self.price,
            LabelField::PaymentMethod => &mut self.payment_method,
            LabelField::Date => &mut self.date,
            LabelField::Time => &mut self.time,
            LabelField::Barcode => &mut self.barcode,
            LabelField::QrData => &mut self.qr_data,
            LabelField::CustomNote => &mut self.custom_note,
        }
    }

    /// Replace one field and apply the derivation rule.
    ///
    /// Returns `true` if any field changed.
    pub fn set(&mut self, field: LabelField, value: impl Into<String>) -> bool {
        let value = value.into();
        match field {
            LabelField::TrackingNumber => {
                if self.tracking_number == value {
                    return false;
                }
                self.barcode = value.clone();
                self.qr_data = format!("{}{}", self.qr_base_url(), value);
                self.tracking_number = value;
                self.overrides = DerivedOverrides::default();
                true
            }
            LabelField::Barcode | LabelField::QrData => {
                if field == LabelField::Barcode {
                    self.overrides.barcode = true;
                } else {
                    self.overrides.qr_data = true;
                }
                replace(self.slot_mut(field), value)
            }
            other => replace(self.slot_mut(other), value),
        }
    }

    /// Pure form of [`LabelRecord::set`]: the record after one field update.
    pub fn with_field(&self, field: LabelField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.set(field, value);
        next
    }

    /// Reject records that cannot produce a usable label.
    pub fn validate(&self) -> Result<(), TarazuError> {
        if self.tracking_number.trim().is_empty() {
            return Err(TarazuError::Validation(
                "tracking number is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse a batch of `name -> value` edits.
///
/// The tracking number is moved to the front so that a barcode or QR value
/// sent in the same batch lands as an override instead of being re-derived.
pub fn parse_updates<I, K, V>(updates: I) -> Result<Vec<(LabelField, String)>, TarazuError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut parsed = updates
        .into_iter()
        .map(|(name, value)| Ok((name.as_ref().parse::<LabelField>()?, value.into())))
        .collect::<Result<Vec<_>, TarazuError>>()?;
    parsed.sort_by_key(|(field, _)| *field != LabelField::TrackingNumber);
    Ok(parsed)
}

fn replace(slot: &mut String, value: String) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tracking_change_derives_barcode_and_qr() {
        let mut record = LabelRecord::default();
        assert!(record.set(LabelField::TrackingNumber, "04515000010732"));
        assert_eq!(record.barcode, "04515000010732");
        assert_eq!(record.qr_data, "https://tracking.post.ir/?id=04515000010732");
    }

    #[test]
    fn test_direct_edit_wins_until_tracking_changes() {
        let mut record = LabelRecord::default();
        record.set(LabelField::TrackingNumber, "A1");
        record.set(LabelField::QrData, "custom-qr");
        record.set(LabelField::Barcode, "custom-bc");
        assert_eq!(record.qr_data, "custom-qr");
        assert!(record.overrides().qr_data);

        // Unrelated edits keep the override
        record.set(LabelField::ReceiverName, "Peyman");
        assert_eq!(record.barcode, "custom-bc");

        // Same tracking value is not a change
        assert!(!record.set(LabelField::TrackingNumber, "A1"));
        assert_eq!(record.qr_data, "custom-qr");

        record.set(LabelField::TrackingNumber, "B2");
        assert_eq!(record.barcode, "B2");
        assert_eq!(record.qr_data, "https://tracking.post.ir/?id=B2");
        assert_eq!(record.overrides(), DerivedOverrides::default());
    }

    #[test]
    fn test_custom_qr_base() {
        let mut record = LabelRecord::default().with_qr_base_url("https://t.example/");
        record.set(LabelField::TrackingNumber, "X");
        assert_eq!(record.qr_data, "https://t.example/X");
    }

    #[test]
    fn test_with_field_leaves_original_untouched() {
        let record = LabelRecord::default();
        let next = record.with_field(LabelField::Weight, "205");
        assert_eq!(record.weight, "");
        assert_eq!(next.weight, "205");
    }

    #[test]
    fn test_set_reports_no_change() {
        let mut record = LabelRecord::default();
        assert!(record.set(LabelField::Weight, "1.2"));
        assert!(!record.set(LabelField::Weight, "1.2"));
    }

    #[test]
    fn test_get_set_every_field() {
        let mut record = LabelRecord::default();
        for field in LabelField::ALL {
            record.set(field, format!("v-{}", field));
            assert_eq!(record.get(field), format!("v-{}", field));
        }
    }

    #[test]
    fn test_field_names_parse() {
        assert_eq!("trackingNumber".parse::<LabelField>().unwrap(), LabelField::TrackingNumber);
        assert_eq!("receiver_post_code".parse::<LabelField>().unwrap(), LabelField::ReceiverPostCode);
        assert_eq!("QRDATA".parse::<LabelField>().unwrap(), LabelField::QrData);
        assert!("nope".parse::<LabelField>().is_err());
    }

    #[test]
    fn test_new_at_stamps_date_and_time() {
        let now = Local.with_ymd_and_hms(2025, 7, 13, 13, 30, 5).unwrap();
        let record = LabelRecord::new_at(now);
        assert_eq!(record.date, "2025-07-13");
        assert_eq!(record.time, "13:30:05");
    }

    #[test]
    fn test_validate_requires_tracking() {
        let mut record = LabelRecord::default();
        assert!(record.validate().is_err());
        record.set(LabelField::TrackingNumber, "   ");
        assert!(record.validate().is_err());
        record.set(LabelField::TrackingNumber, "123");
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_parse_updates_puts_tracking_first() {
        let updates = parse_updates([
            ("barcode", "MANUAL"),
            ("receiver_name", "Sara"),
            ("trackingNumber", "T-9"),
        ])
        .unwrap();
        assert_eq!(updates[0], (LabelField::TrackingNumber, "T-9".to_string()));

        let mut record = LabelRecord::default();
        for (field, value) in updates {
            record.set(field, value);
        }
        assert_eq!(record.barcode, "MANUAL");
        assert_eq!(record.qr_data, "https://tracking.post.ir/?id=T-9");
    }

    #[test]
    fn test_parse_updates_rejects_unknown_names() {
        let err = parse_updates([("colour", "red")]).unwrap_err();
        assert!(matches!(err, TarazuError::UnknownField(name) if name == "colour"));
    }

    #[test]
    fn test_json_uses_camel_case() {
        let mut record = LabelRecord::default();
        record.set(LabelField::ReceiverPostCode, "4571310004");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["receiverPostCode"], "4571310004");
        assert!(json.get("overrides").is_none());
    }
}
