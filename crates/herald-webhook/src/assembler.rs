//! Budgeted greedy packing of detail fields into cards.
//!
//! The message budget is a single character count shared by every card.
//! Packing walks the candidate fields in order and stops at the first one
//! that would eat into the safety margin, so the output is always a prefix
//! of the input and no field is ever split or partially written.

use herald_core::config::LimitsConfig;
use herald_core::sanitize::truncate;

use crate::card::{Card, Field, char_len, color};
use crate::render::DETAIL_TITLE;

/// Remaining character budget for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    remaining: usize,
    margin: usize,
}

impl Budget {
    /// A budget of `total` characters that never dips below `margin`.
    pub const fn new(total: usize, margin: usize) -> Self {
        Self {
            remaining: total,
            margin,
        }
    }

    /// A budget sized from the configured limits.
    pub const fn from_limits(limits: &LimitsConfig) -> Self {
        Self::new(limits.total_text, limits.safety_margin)
    }

    /// Characters still available.
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether spending `size` would keep the safety margin intact.
    pub fn fits(&self, size: usize) -> bool {
        self.remaining
            .checked_sub(size)
            .is_some_and(|left| left >= self.margin)
    }

    /// Deduct `size` unconditionally. Used for reservations that must be
    /// made regardless of the margin, such as the summary card.
    pub const fn spend(&mut self, size: usize) {
        self.remaining = self.remaining.saturating_sub(size);
    }

    /// Deduct `size` if it fits. Returns whether it was deducted.
    pub fn try_spend(&mut self, size: usize) -> bool {
        if self.fits(size) {
            self.spend(size);
            true
        } else {
            false
        }
    }
}

/// Result of packing detail fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packed {
    /// Detail cards with final `(i/n)` titles.
    pub cards: Vec<Card>,
    /// How many leading input fields were placed.
    pub placed: usize,
}

/// The final title of detail card `index` (1-based) out of `total`.
pub fn detail_title(index: usize, total: usize) -> String {
    format!("{DETAIL_TITLE} ({index}/{total})")
}

/// Pack `fields` into at most `max_cards` detail cards.
///
/// A new card is opened only while the budget exceeds
/// `limits.open_threshold`, and each card reserves the length of the
/// longest title it could end up with. Each card holds at most
/// `min(limits.fields_per_card, limits.max_fields)` fields.
pub fn pack_details(
    fields: Vec<Field>,
    limits: &LimitsConfig,
    budget: &mut Budget,
    max_cards: usize,
) -> Packed {
    let per_card = limits.fields_per_card.min(limits.max_fields);
    let title_reserve = char_len(&detail_title(max_cards, max_cards)).min(limits.title_len);
    let mut packed = Packed::default();
    let mut pending = fields.into_iter().peekable();

    while pending.peek().is_some()
        && packed.cards.len() < max_cards
        && budget.remaining() > limits.open_threshold
    {
        if !budget.try_spend(title_reserve) {
            break;
        }
        let mut card = Card::new(DETAIL_TITLE, color::BLUE);
        let mut exhausted = false;

        while card.fields.len() < per_card {
            let Some(field) = pending.next_if(|f| budget.fits(f.text_len())) else {
                exhausted = pending.peek().is_some();
                break;
            };
            budget.spend(field.text_len());
            card.fields.push(field);
        }

        if card.fields.is_empty() {
            break;
        }
        packed.placed = packed.placed.saturating_add(card.fields.len());
        packed.cards.push(card);
        if exhausted {
            tracing::debug!(
                placed = packed.placed,
                remaining = budget.remaining(),
                "text budget reached, remaining fields dropped"
            );
            break;
        }
    }

    let total = packed.cards.len();
    for (i, card) in packed.cards.iter_mut().enumerate() {
        card.title = truncate(&detail_title(i.saturating_add(1), total), limits.title_len);
    }
    packed
}
