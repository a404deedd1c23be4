//! # Label Layout Tables
//!
//! Where each piece of the shipping label goes, per label size. Positions are
//! millimeters from the top-left corner and are converted to dots by the
//! encoder. Adding a size means adding a table here; the encoder has no
//! per-size branches.
//!
//! ## 100 × 80 mm
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ BRAND                     date               │
//! │ ║│║║│║│║║│║│║│║ barcode                       │
//! │ ┌──────────────────────────────────────────┐ │
//! │ │ Sender: name / city, address             │ │
//! │ └──────────────────────────────────────────┘ │
//! │ ┌──────────────────────────────────────────┐ │
//! │ │ Receiver: name / address / phones / code │ │
//! │ └──────────────────────────────────────────┘ │
//! │ WEIGHT: 205 g                      ▛▀▀▜      │
//! │ Order ID: ...                      ▙▄▄▟ QR   │
//! └──────────────────────────────────────────────┘
//! ```

use super::record::LabelField;
use crate::printer::{LabelSize, WidthClass};
use crate::protocol::text::{Font, Rotation};

/// What a text row prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    /// Station brand from the encoder options.
    Brand,
    /// `"<label>: a<sep>b..."`; no prefix when `label` is empty.
    Fields {
        label: &'static str,
        fields: &'static [LabelField],
        separator: &'static str,
    },
    /// `"WEIGHT: <weight> <unit>"`
    Weight,
}

/// A text instruction position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRow {
    pub content: Content,
    pub x_mm: f32,
    pub y_mm: f32,
    pub font: Font,
    pub rotation: Rotation,
    pub scale: u8,
}

/// A rectangle outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x1_mm: f32,
    pub y1_mm: f32,
    pub x2_mm: f32,
    pub y2_mm: f32,
    pub thickness_dots: u32,
}

/// A framed group of text rows (sender, receiver).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub frame: Frame,
    pub rows: &'static [TextRow],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarcodeSlot {
    pub x_mm: f32,
    pub y_mm: f32,
    pub height_mm: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QrSlot {
    pub x_mm: f32,
    pub y_mm: f32,
}

/// Full placement table for one label size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelLayout {
    pub header: &'static [TextRow],
    pub barcode: BarcodeSlot,
    pub blocks: &'static [Block],
    pub footer: &'static [TextRow],
    pub qr: QrSlot,
}

/// Horizontal QR placement, one preset per width class.
pub const fn qr_x_mm(class: WidthClass) -> f32 {
    match class {
        WidthClass::Wide => 68.75,
        WidthClass::Narrow => 48.0,
    }
}

/// Placement table for `size`.
pub fn for_size(size: LabelSize) -> &'static LabelLayout {
    match size {
        LabelSize::Size100x80 => &LAYOUT_100X80,
        LabelSize::Size100x100 => &LAYOUT_100X100,
        LabelSize::Size80x100 => &LAYOUT_80X100,
    }
}

const fn row(content: Content, x_mm: f32, y_mm: f32, font: Font) -> TextRow {
    TextRow {
        content,
        x_mm,
        y_mm,
        font,
        rotation: Rotation::None,
        scale: 1,
    }
}

const fn labeled(label: &'static str, fields: &'static [LabelField]) -> Content {
    Content::Fields {
        label,
        fields,
        separator: " / ",
    }
}

const fn plain(fields: &'static [LabelField], separator: &'static str) -> Content {
    Content::Fields {
        label: "",
        fields,
        separator,
    }
}

const SENDER_NAME: Content = labeled("Sender", &[LabelField::SenderName]);
const SENDER_ADDRESS: Content = plain(&[LabelField::SenderCity, LabelField::SenderAddress], ", ");
const RECEIVER_NAME: Content = labeled("Receiver", &[LabelField::ReceiverName]);
const RECEIVER_ADDRESS: Content =
    plain(&[LabelField::ReceiverCity, LabelField::ReceiverAddress], ", ");
const PHONES: Content = labeled(
    "Phone",
    &[LabelField::ReceiverPhone, LabelField::ReceiverMobile],
);
const POST_CODE: Content = labeled("Post Code", &[LabelField::ReceiverPostCode]);
const ORDER_ID: Content = labeled("Order ID", &[LabelField::OrderId]);
const DATE: Content = plain(&[LabelField::Date], " ");

// ============================================================================
// 100 × 100 mm
// ============================================================================

static LAYOUT_100X100: LabelLayout = LabelLayout {
    header: &[
        row(Content::Brand, 3.75, 3.75, Font::Medium),
        row(DATE, 50.0, 3.75, Font::Small),
    ],
    barcode: BarcodeSlot {
        x_mm: 3.75,
        y_mm: 10.0,
        height_mm: 10.0,
    },
    blocks: &[
        Block {
            frame: Frame {
                x1_mm: 2.5,
                y1_mm: 25.0,
                x2_mm: 97.5,
                y2_mm: 43.75,
                thickness_dots: 2,
            },
            rows: &[
                row(SENDER_NAME, 3.75, 27.5, Font::Small),
                row(SENDER_ADDRESS, 3.75, 32.5, Font::Tiny),
            ],
        },
        Block {
            frame: Frame {
                x1_mm: 2.5,
                y1_mm: 45.0,
                x2_mm: 97.5,
                y2_mm: 75.0,
                thickness_dots: 2,
            },
            rows: &[
                row(RECEIVER_NAME, 3.75, 47.5, Font::Medium),
                row(RECEIVER_ADDRESS, 3.75, 53.75, Font::Tiny),
                row(PHONES, 3.75, 58.75, Font::Small),
                row(POST_CODE, 3.75, 63.75, Font::Small),
            ],
        },
    ],
    footer: &[
        row(Content::Weight, 3.75, 81.25, Font::Large),
        row(ORDER_ID, 3.75, 93.75, Font::Small),
    ],
    qr: QrSlot {
        x_mm: qr_x_mm(WidthClass::Wide),
        y_mm: 78.0,
    },
};

// ============================================================================
// 100 × 80 mm
// ============================================================================

static LAYOUT_100X80: LabelLayout = LabelLayout {
    header: &[
        row(Content::Brand, 3.75, 3.0, Font::Medium),
        row(DATE, 50.0, 3.0, Font::Small),
    ],
    barcode: BarcodeSlot {
        x_mm: 3.75,
        y_mm: 8.0,
        height_mm: 10.0,
    },
    blocks: &[
        Block {
            frame: Frame {
                x1_mm: 2.5,
                y1_mm: 22.0,
                x2_mm: 97.5,
                y2_mm: 33.0,
                thickness_dots: 2,
            },
            rows: &[
                row(SENDER_NAME, 3.75, 23.5, Font::Small),
                row(SENDER_ADDRESS, 3.75, 28.0, Font::Tiny),
            ],
        },
        Block {
            frame: Frame {
                x1_mm: 2.5,
                y1_mm: 34.0,
                x2_mm: 97.5,
                y2_mm: 57.0,
                thickness_dots: 2,
            },
            rows: &[
                row(RECEIVER_NAME, 3.75, 35.5, Font::Medium),
                row(RECEIVER_ADDRESS, 3.75, 40.5, Font::Tiny),
                row(PHONES, 3.75, 45.0, Font::Small),
                row(POST_CODE, 3.75, 50.5, Font::Small),
            ],
        },
    ],
    footer: &[
        row(Content::Weight, 3.75, 61.0, Font::Large),
        row(ORDER_ID, 3.75, 71.0, Font::Small),
    ],
    qr: QrSlot {
        x_mm: qr_x_mm(WidthClass::Wide),
        y_mm: 58.5,
    },
};

// ============================================================================
// 80 × 100 mm
// ============================================================================

static LAYOUT_80X100: LabelLayout = LabelLayout {
    header: &[
        row(Content::Brand, 3.0, 3.75, Font::Medium),
        row(DATE, 45.0, 3.75, Font::Small),
    ],
    barcode: BarcodeSlot {
        x_mm: 3.0,
        y_mm: 10.0,
        height_mm: 10.0,
    },
    blocks: &[
        Block {
            frame: Frame {
                x1_mm: 2.0,
                y1_mm: 25.0,
                x2_mm: 78.0,
                y2_mm: 43.75,
                thickness_dots: 2,
            },
            rows: &[
                row(SENDER_NAME, 3.0, 27.5, Font::Small),
                row(SENDER_ADDRESS, 3.0, 32.5, Font::Tiny),
            ],
        },
        Block {
            frame: Frame {
                x1_mm: 2.0,
                y1_mm: 45.0,
                x2_mm: 78.0,
                y2_mm: 75.0,
                thickness_dots: 2,
            },
            rows: &[
                row(RECEIVER_NAME, 3.0, 47.5, Font::Medium),
                row(RECEIVER_ADDRESS, 3.0, 53.75, Font::Tiny),
                row(PHONES, 3.0, 58.75, Font::Small),
                row(POST_CODE, 3.0, 63.75, Font::Small),
            ],
        },
    ],
    footer: &[
        row(Content::Weight, 3.0, 81.25, Font::Large),
        row(ORDER_ID, 3.0, 93.75, Font::Small),
    ],
    qr: QrSlot {
        x_mm: qr_x_mm(WidthClass::Narrow),
        y_mm: 78.0,
    },
};

// ============================================================================
// TESTS
// ============================================================================
