//! # Label Command Encoder
//!
//! Pure mapping from a [`LabelRecord`] and [`LabelSize`] to a TSPL
//! [`Program`]. No I/O, no clock: the same inputs always produce the same
//! program.
//!
//! ## Program Order
//!
//! 1. `SIZE` / `GAP`: media geometry
//! 2. `DIRECTION`
//! 3. `CLS`
//! 4. Header text (brand, date)
//! 5. `BARCODE` of the tracking number (Code 128, human-readable line on)
//! 6. Sender and receiver blocks (`BOX` + `TEXT` rows)
//! 7. Weight and order id text
//! 8. `QRCODE`
//! 9. `PRINT`
//!
//! Rows whose fields are all empty are left out, as are the barcode and QR
//! instructions when their payload is empty.

use super::layout::{self, Content, TextRow};
use super::record::LabelRecord;
use crate::ir::{Op, Program};
use crate::printer::{LABEL_GAP_MM, LabelSize, PrinterConfig};
use crate::protocol::barcode::{QrErrorLevel, QrMode, Symbology};
use crate::protocol::commands::Direction;
use crate::protocol::text::Rotation;

/// Default brand printed in the header.
pub const DEFAULT_BRAND: &str = "ARSH EXPRESS";

/// Default unit appended to the weight.
pub const DEFAULT_WEIGHT_UNIT: &str = "g";

const BARCODE_SYMBOLOGY: Symbology = Symbology::Code128;
const BARCODE_NARROW: u8 = 2;
const BARCODE_WIDE: u8 = 2;
const QR_ECC: QrErrorLevel = QrErrorLevel::L;
const QR_CELL_WIDTH: u8 = 5;

/// Per-job knobs that are not part of the label record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    pub copies: u32,
    pub brand: String,
    pub weight_unit: String,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            copies: 1,
            brand: DEFAULT_BRAND.to_string(),
            weight_unit: DEFAULT_WEIGHT_UNIT.to_string(),
        }
    }
}

/// Encode with default options (one copy).
pub fn encode(record: &LabelRecord, size: LabelSize) -> Program {
    encode_with(record, size, &EncodeOptions::default())
}

/// Encode a label into a TSPL program.
///
/// ## Example
///
/// ```
/// use tarazu::label::{encode, LabelField, LabelRecord};
/// use tarazu::printer::LabelSize;
///
/// let mut record = LabelRecord::default();
/// record.set(LabelField::TrackingNumber, "04515000010732");
/// record.set(LabelField::Weight, "205");
///
/// let tspl = encode(&record, LabelSize::Size100x80).to_tspl();
/// assert!(tspl.starts_with("SIZE 100 mm,80 mm\nGAP 3 mm,0 mm\n"));
/// assert!(tspl.contains(r#""WEIGHT: 205 g""#));
/// assert!(tspl.ends_with("PRINT 1\n"));
/// ```
pub fn encode_with(record: &LabelRecord, size: LabelSize, options: &EncodeOptions) -> Program {
    let config = PrinterConfig::TSPL_203;
    let layout = layout::for_size(size);
    let dots = |mm: f32| config.mm_to_dots(mm);

    let mut program = Program::new();
    program.push(Op::Size {
        width_mm: size.width_mm(),
        height_mm: size.height_mm(),
    });
    program.push(Op::Gap {
        gap_mm: LABEL_GAP_MM,
    });
    program.push(Op::Direction(Direction::Reverse));
    program.push(Op::Cls);

    push_rows(&mut program, layout.header, record, options, &config);

    if !record.tracking_number.is_empty() {
        program.push(Op::Barcode {
            x: dots(layout.barcode.x_mm),
            y: dots(layout.barcode.y_mm),
            symbology: BARCODE_SYMBOLOGY,
            height: dots(layout.barcode.height_mm),
            human_readable: true,
            rotation: Rotation::None,
            narrow: BARCODE_NARROW,
            wide: BARCODE_WIDE,
            content: record.tracking_number.clone(),
        });
    }

    for block in layout.blocks {
        let frame = &block.frame;
        program.push(Op::Box {
            x1: dots(frame.x1_mm),
            y1: dots(frame.y1_mm),
            x2: dots(frame.x2_mm),
            y2: dots(frame.y2_mm),
            thickness: frame.thickness_dots,
        });
        push_rows(&mut program, block.rows, record, options, &config);
    }

    push_rows(&mut program, layout.footer, record, options, &config);

    if !record.qr_data.is_empty() {
        program.push(Op::QrCode {
            x: dots(layout.qr.x_mm),
            y: dots(layout.qr.y_mm),
            ecc: QR_ECC,
            cell_width: QR_CELL_WIDTH,
            mode: QrMode::Auto,
            rotation: Rotation::None,
            content: record.qr_data.clone(),
        });
    }

    program.push(Op::Print {
        copies: options.copies.max(1),
    });
    program
}

fn push_rows(
    program: &mut Program,
    rows: &[TextRow],
    record: &LabelRecord,
    options: &EncodeOptions,
    config: &PrinterConfig,
) {
    for row in rows {
        if let Some(content) = render(&row.content, record, options) {
            program.push(Op::Text {
                x: config.mm_to_dots(row.x_mm),
                y: config.mm_to_dots(row.y_mm),
                font: row.font,
                rotation: row.rotation,
                scale: row.scale,
                content,
            });
        }
    }
}

fn render(content: &Content, record: &LabelRecord, options: &EncodeOptions) -> Option<String> {
    match content {
        Content::Brand => Some(options.brand.clone()).filter(|b| !b.is_empty()),
        Content::Weight => {
            if record.weight.is_empty() {
                None
            } else if options.weight_unit.is_empty() {
                Some(format!("WEIGHT: {}", record.weight))
            } else {
                Some(format!("WEIGHT: {} {}", record.weight, options.weight_unit))
            }
        }
        Content::Fields {
            label,
            fields,
            separator,
        } => {
            if fields.iter().all(|f| record.get(*f).is_empty()) {
                return None;
            }
            let joined = fields
                .iter()
                .map(|f| record.get(*f))
                .collect::<Vec<_>>()
                .join(separator);
            if label.is_empty() {
                Some(joined)
            } else {
                Some(format!("{}: {}", label, joined))
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelField;

    fn sample() -> LabelRecord {
        let mut record = LabelRecord::default();
        record.set(LabelField::TrackingNumber, "04515000010732");
        record.set(LabelField::OrderId, "200-40236801");
        record.set(LabelField::SenderName, "BIZ");
        record.set(LabelField::ReceiverName, "Peyman");
        record.set(LabelField::ReceiverPhone, "02435520000");
        record.set(LabelField::ReceiverMobile, "09100277226");
        record.set(LabelField::ReceiverPostCode, "4571310004");
        record.set(LabelField::Weight, "205");
        record.set(LabelField::Date, "1404-04-22");
        record
    }

    #[test]
    fn test_setup_prefix_order() {
        let lines = encode(&sample(), LabelSize::Size100x100).to_lines();
        assert_eq!(lines[0], "SIZE 100 mm,100 mm");
        assert_eq!(lines[1], "GAP 3 mm,0 mm");
        assert_eq!(lines[2], "DIRECTION 1");
        assert_eq!(lines[3], "CLS");
        assert_eq!(lines.last().unwrap(), "PRINT 1");
    }

    #[test]
    fn test_deterministic() {
        let record = sample();
        let a = encode(&record, LabelSize::Size80x100).to_tspl();
        let b = encode(&record, LabelSize::Size80x100).to_tspl();
        assert_eq!(a, b);
    }

    #[test]
    fn test_instruction_kinds_in_order() {
        let program = encode(&sample(), LabelSize::Size100x80);
        let pos = |pred: fn(&Op) -> bool| program.iter().position(pred).unwrap();
        let barcode = pos(|op| matches!(op, Op::Barcode { .. }));
        let first_box = pos(|op| matches!(op, Op::Box { .. }));
        let weight = pos(|op| matches!(op, Op::Text { content, .. } if content.starts_with("WEIGHT")));
        let qr = pos(|op| matches!(op, Op::QrCode { .. }));
        assert!(barcode < first_box && first_box < weight && weight < qr);
        assert!(program.is_committed());
    }

    #[test]
    fn test_barcode_uses_code128_with_hri() {
        let lines = encode(&sample(), LabelSize::Size100x100).to_lines();
        assert!(lines.contains(&r#"BARCODE 30,80,"128",80,1,0,2,2,"04515000010732""#.to_string()));
    }

    #[test]
    fn test_qr_position_by_width() {
        let wide = encode(&sample(), LabelSize::Size100x100).to_tspl();
        let narrow = encode(&sample(), LabelSize::Size80x100).to_tspl();
        assert!(wide.contains("QRCODE 550,624,L,5,A,0,M2,S7,"));
        assert!(narrow.contains("QRCODE 384,624,L,5,A,0,M2,S7,"));
    }

    #[test]
    fn test_copies_option() {
        let options = EncodeOptions {
            copies: 3,
            ..Default::default()
        };
        let tspl = encode_with(&sample(), LabelSize::Size100x80, &options).to_tspl();
        assert!(tspl.ends_with("PRINT 3\n"));
    }

    #[test]
    fn test_empty_rows_are_skipped() {
        let mut record = sample();
        record.set(LabelField::OrderId, "");
        let tspl = encode(&record, LabelSize::Size100x80).to_tspl();
        assert!(!tspl.contains("Order ID"));
    }

    #[test]
    fn test_empty_record_is_still_a_valid_job() {
        let program = encode(&LabelRecord::default(), LabelSize::Size100x80);
        assert!(!program.iter().any(|op| matches!(op, Op::Barcode { .. } | Op::QrCode { .. })));
        assert_eq!(program.iter().filter(|op| matches!(op, Op::Box { .. })).count(), 2);
        assert!(program.is_committed());
    }

    #[test]
    fn test_barcode_encodes_tracking_number_despite_override() {
        let mut record = sample();
        record.set(LabelField::Barcode, "OVERRIDE");
        let tspl = encode(&record, LabelSize::Size100x80).to_tspl();
        let barcode = tspl.lines().find(|l| l.starts_with("BARCODE ")).unwrap();
        assert!(barcode.ends_with("\"04515000010732\""));
        assert!(!tspl.contains("OVERRIDE"));
    }

    #[test]
    fn test_no_barcode_without_tracking_number() {
        let mut record = sample();
        record.set(LabelField::TrackingNumber, "");
        record.set(LabelField::Barcode, "OVERRIDE");
        let program = encode(&record, LabelSize::Size100x80);
        assert!(!program.iter().any(|op| matches!(op, Op::Barcode { .. })));
    }

    #[test]
    fn test_phones_joined() {
        let tspl = encode(&sample(), LabelSize::Size100x80).to_tspl();
        assert!(tspl.contains("\"Phone: 02435520000 / 09100277226\""));
    }

    #[test]
    fn test_non_latin_passes_verbatim() {
        let mut record = sample();
        record.set(LabelField::ReceiverName, "پیمان معینی");
        let tspl = encode(&record, LabelSize::Size100x80).to_tspl();
        assert!(tspl.contains("\"Receiver: پیمان معینی\""));
    }
}
