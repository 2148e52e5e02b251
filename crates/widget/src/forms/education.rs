//! The education-level selector.

use screener_core::{
    forms::{EducationLevel, FormError},
    protocol::OutboundMessage,
};

#[derive(Debug, Default)]
pub struct EducationForm {
    selection: Option<EducationLevel>,
}

impl EducationForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// The options the view should offer, in display order.
    pub fn options() -> &'static [EducationLevel] {
        &EducationLevel::ALL
    }

    pub fn select(&mut self, level: EducationLevel) {
        self.selection = Some(level);
    }

    pub fn selection(&self) -> Option<EducationLevel> {
        self.selection
    }

    pub fn can_confirm(&self) -> bool {
        self.selection.is_some()
    }

    pub fn confirm(&mut self) -> Result<(OutboundMessage, String), FormError> {
        let level = self.selection.take().ok_or(FormError::NoEducationSelected)?;
        let display = level.to_string();
        Ok((
            OutboundMessage::EducationData {
                data: display.clone(),
            },
            format!("Education: {}", display),
        ))
    }

    pub fn reset(&mut self) {
        self.selection = None;
    }
}
