//! The repeatable work-history collector.

use screener_core::{
    forms::{FormError, validate_work_experience},
    protocol::{OutboundMessage, WorkExperienceEntry},
};

#[derive(Debug, Default)]
pub struct WorkExperienceForm {
    entries: Vec<WorkExperienceEntry>,
}

impl WorkExperienceForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, entry: WorkExperienceEntry) {
        self.entries.push(entry);
    }

    pub fn remove_entry(&mut self, index: usize) {
        if index < self.entries.len() {
            self.entries.remove(index);
        }
    }

    pub fn entries(&self) -> &[WorkExperienceEntry] {
        &self.entries
    }

    /// Whether the confirm action should be offered at all.
    pub fn can_confirm(&self) -> bool {
        validate_work_experience(&self.entries).is_ok()
    }

    /// Validates the collected entries and produces the outbound frame and
    /// transcript echo. The form keeps its entries on failure so the user
    /// can fix them.
    pub fn confirm(&mut self) -> Result<(OutboundMessage, String), FormError> {
        validate_work_experience(&self.entries)?;
        let entries = std::mem::take(&mut self.entries);
        let echo = echo_text(&entries);
        Ok((OutboundMessage::WorkExperienceData { data: entries }, echo))
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

fn echo_text(entries: &[WorkExperienceEntry]) -> String {
    let mut lines = vec!["Work history:".to_string()];
    for entry in entries {
        lines.push(format!(
            "{}, {} ({} to {})",
            entry.company, entry.role, entry.start_date, entry.end_date
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(company: &str, role: &str, start: &str, end: &str) -> WorkExperienceEntry {
        WorkExperienceEntry {
            company: company.to_string(),
            role: role.to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
        }
    }

    #[test]
    fn confirm_with_no_entries_is_rejected() {
        let mut form = WorkExperienceForm::new();
        assert!(!form.can_confirm());
        assert_eq!(form.confirm(), Err(FormError::NoEntries));
    }

    #[test]
    fn confirm_emits_one_frame_with_all_entries() {
        let mut form = WorkExperienceForm::new();
        form.add_entry(entry("Acme", "Cashier", "2021-01", "2022-01"));
        form.add_entry(entry("Beta", "Cook", "2022-02", "2023-01"));
        assert!(form.can_confirm());

        let (message, echo) = form.confirm().unwrap();
        match message {
            OutboundMessage::WorkExperienceData { data } => {
                assert_eq!(data.len(), 2);
                assert_eq!(data[0].company, "Acme");
                assert_eq!(data[1].company, "Beta");
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert_eq!(
            echo,
            "Work history:\nAcme, Cashier (2021-01 to 2022-01)\nBeta, Cook (2022-02 to 2023-01)"
        );
        // The form is drained after a successful confirm.
        assert!(form.entries().is_empty());
    }

    #[test]
    fn invalid_entry_keeps_the_form_contents() {
        let mut form = WorkExperienceForm::new();
        form.add_entry(entry("Acme", "Wizard", "2021-01", "2022-01"));
        assert!(form.confirm().is_err());
        assert_eq!(form.entries().len(), 1);
    }

    #[test]
    fn remove_entry_ignores_out_of_range_indices() {
        let mut form = WorkExperienceForm::new();
        form.add_entry(entry("Acme", "Cashier", "2021-01", "2022-01"));
        form.remove_entry(5);
        assert_eq!(form.entries().len(), 1);
        form.remove_entry(0);
        assert!(form.entries().is_empty());
    }
}
