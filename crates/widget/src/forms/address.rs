//! The address collector, backed by autocomplete with a free-text fallback.
//!
//! Selecting a prediction triggers an async place-details lookup that the
//! widget runtime performs; this controller tracks the lookup generation
//! so a details response arriving after the user picked something else
//! (or left the form) is discarded, and the confirm action stays disabled
//! while a lookup is in flight.

use crate::places::Prediction;
use screener_core::{
    forms::FormError,
    protocol::{Address, OutboundMessage},
};

#[derive(Debug, Default)]
pub struct AddressForm {
    suggestions: Vec<Prediction>,
    resolved: Option<Address>,
    fallback: String,
    lookup_generation: u64,
    pending_lookup: bool,
}

impl AddressForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_suggestions(&mut self, suggestions: Vec<Prediction>) {
        self.suggestions = suggestions;
    }

    pub fn suggestions(&self) -> &[Prediction] {
        &self.suggestions
    }

    /// Records what the user typed, used as the fallback when no
    /// structured lookup succeeds.
    pub fn set_fallback(&mut self, text: &str) {
        self.fallback = text.trim().to_string();
        // Typing again invalidates a previously resolved selection.
        self.resolved = None;
    }

    /// Finds the prediction the user picked, if it is still in the current
    /// suggestion list.
    pub fn prediction(&self, place_id: &str) -> Option<&Prediction> {
        self.suggestions.iter().find(|p| p.place_id == place_id)
    }

    /// Marks a details lookup as started and returns its generation.
    pub fn begin_lookup(&mut self) -> u64 {
        self.lookup_generation += 1;
        self.pending_lookup = true;
        self.lookup_generation
    }

    pub fn pending_lookup(&self) -> bool {
        self.pending_lookup
    }

    /// Applies a resolved address if the lookup is still current. Returns
    /// whether it was applied.
    pub fn apply_details(&mut self, generation: u64, address: Address) -> bool {
        if generation != self.lookup_generation {
            return false;
        }
        self.pending_lookup = false;
        self.resolved = Some(address);
        true
    }

    /// Records a failed or abandoned lookup; the free-text fallback
    /// remains available.
    pub fn lookup_failed(&mut self, generation: u64) {
        if generation == self.lookup_generation {
            self.pending_lookup = false;
        }
    }

    pub fn can_confirm(&self) -> bool {
        !self.pending_lookup && (self.resolved.is_some() || !self.fallback.is_empty())
    }

    /// Produces the outbound frame: the structured address when a lookup
    /// resolved one, otherwise a fallback record carrying only the typed
    /// text.
    pub fn confirm(&mut self) -> Result<(OutboundMessage, String), FormError> {
        if self.pending_lookup {
            return Err(FormError::MissingAddress);
        }
        let address = match self.resolved.take() {
            Some(address) => address,
            None if !self.fallback.is_empty() => Address {
                full: std::mem::take(&mut self.fallback),
                ..Address::default()
            },
            None => return Err(FormError::MissingAddress),
        };
        let echo = format!("Address: {}", address.full);
        self.reset();
        Ok((OutboundMessage::AddressData { data: address }, echo))
    }

    /// Clears all transient state, invalidating any in-flight lookup.
    pub fn reset(&mut self) {
        self.suggestions.clear();
        self.resolved = None;
        self.fallback.clear();
        self.pending_lookup = false;
        self.lookup_generation += 1;
    }
}
