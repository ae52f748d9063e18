use serde::Serialize;

use crate::errors::AppError;

/// Separator between slot texts in the combined context.
const SLOT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotId {
    First,
    Second,
}

impl SlotId {
    /// Parses the 1-based slot number used in routes.
    pub fn from_number(n: u8) -> Result<Self, AppError> {
        match n {
            1 => Ok(SlotId::First),
            2 => Ok(SlotId::Second),
            other => Err(AppError::Validation(format!(
                "Knowledge base slot must be 1 or 2, got {other}"
            ))),
        }
    }

    pub fn number(self) -> u8 {
        match self {
            SlotId::First => 1,
            SlotId::Second => 2,
        }
    }

    fn index(self) -> usize {
        usize::from(self.number() - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeSlot {
    pub source_label: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotSummary {
    pub slot: u8,
    pub source_label: String,
    pub chars: usize,
}

/// Exactly two independent slots. Empty slots never hold text.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    slots: [Option<KnowledgeSlot>; 2],
}

impl KnowledgeBase {
    /// Replaces a slot. Blank text clears it instead.
    pub fn load(&mut self, slot: SlotId, source_label: impl Into<String>, text: impl Into<String>) {
        let text = text.into();
        self.slots[slot.index()] = if text.trim().is_empty() {
            None
        } else {
            Some(KnowledgeSlot {
                source_label: source_label.into(),
                text,
            })
        };
    }

    pub fn clear(&mut self, slot: SlotId) {
        self.slots[slot.index()] = None;
    }

    pub fn slot(&self, slot: SlotId) -> Option<&KnowledgeSlot> {
        self.slots[slot.index()].as_ref()
    }

    /// Non-empty slot texts in slot order, joined by a blank line.
    pub fn combined_context(&self) -> String {
        self.slots
            .iter()
            .flatten()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(SLOT_SEPARATOR)
    }

    pub fn summaries(&self) -> Vec<SlotSummary> {
        [SlotId::First, SlotId::Second]
            .into_iter()
            .filter_map(|id| {
                self.slot(id).map(|s| SlotSummary {
                    slot: id.number(),
                    source_label: s.source_label.clone(),
                    chars: s.text.chars().count(),
                })
            })
            .collect()
    }
}
