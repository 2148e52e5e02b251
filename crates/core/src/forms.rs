//! Validation for the structured sub-form payloads.
//!
//! Each sub-form's confirm action is gated on these checks, so a payload
//! that reaches the wire is always complete. The role and education lists
//! are fixed enumerations; their display strings are what the backend
//! receives.

use crate::protocol::WorkExperienceEntry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a sub-form confirm was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("At least one work experience entry is required")]
    NoEntries,
    #[error("Entry {0}: company name is required")]
    MissingCompany(usize),
    #[error("Entry {index}: '{role}' is not a recognized role")]
    UnknownRole { index: usize, role: String },
    #[error("Entry {0}: start period is required")]
    MissingStartDate(usize),
    #[error("Entry {0}: end period is required")]
    MissingEndDate(usize),
    #[error("An education level must be selected")]
    NoEducationSelected,
    #[error("An address is required")]
    MissingAddress,
}

/// The fixed list of roles a work-history entry may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Cashier,
    Cook,
    Server,
    ShiftLead,
    Manager,
    Other,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Cashier,
        Role::Cook,
        Role::Server,
        Role::ShiftLead,
        Role::Manager,
        Role::Other,
    ];

    /// Parses a role from its display string. Matching is exact; the UI
    /// only ever offers the display strings, so anything else is a bug or
    /// a hand-crafted payload.
    pub fn parse(value: &str) -> Option<Role> {
        Role::ALL.iter().copied().find(|r| r.to_string() == value)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Cashier => write!(f, "Cashier"),
            Role::Cook => write!(f, "Cook"),
            Role::Server => write!(f, "Server"),
            Role::ShiftLead => write!(f, "Shift Lead"),
            Role::Manager => write!(f, "Manager"),
            Role::Other => write!(f, "Other"),
        }
    }
}

/// The fixed list of education levels the education sub-form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EducationLevel {
    NoDiploma,
    HighSchool,
    SomeCollege,
    Associate,
    Bachelor,
    Graduate,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 6] = [
        EducationLevel::NoDiploma,
        EducationLevel::HighSchool,
        EducationLevel::SomeCollege,
        EducationLevel::Associate,
        EducationLevel::Bachelor,
        EducationLevel::Graduate,
    ];
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EducationLevel::NoDiploma => write!(f, "No diploma"),
            EducationLevel::HighSchool => write!(f, "High school diploma or GED"),
            EducationLevel::SomeCollege => write!(f, "Some college"),
            EducationLevel::Associate => write!(f, "Associate degree"),
            EducationLevel::Bachelor => write!(f, "Bachelor's degree"),
            EducationLevel::Graduate => write!(f, "Graduate degree"),
        }
    }
}

/// Checks a complete work-history submission: at least one entry, and every
/// entry fully filled in with a recognized role.
pub fn validate_work_experience(entries: &[WorkExperienceEntry]) -> Result<(), FormError> {
    if entries.is_empty() {
        return Err(FormError::NoEntries);
    }
    for (index, entry) in entries.iter().enumerate() {
        if entry.company.trim().is_empty() {
            return Err(FormError::MissingCompany(index));
        }
        if Role::parse(&entry.role).is_none() {
            return Err(FormError::UnknownRole {
                index,
                role: entry.role.clone(),
            });
        }
        if entry.start_date.trim().is_empty() {
            return Err(FormError::MissingStartDate(index));
        }
        if entry.end_date.trim().is_empty() {
            return Err(FormError::MissingEndDate(index));
        }
    }
    Ok(())
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
    fn empty_submission_is_rejected() {
        assert_eq!(validate_work_experience(&[]), Err(FormError::NoEntries));
    }

    #[test]
    fn complete_entries_pass() {
        let entries = vec![
            entry("Acme", "Cashier", "2021-01", "2022-01"),
            entry("Beta", "Cook", "2022-02", "2023-01"),
        ];
        assert_eq!(validate_work_experience(&entries), Ok(()));
    }

    #[test]
    fn blank_company_is_rejected_with_index() {
        let entries = vec![
            entry("Acme", "Cashier", "2021-01", "2022-01"),
            entry("   ", "Cook", "2022-02", "2023-01"),
        ];
        assert_eq!(
            validate_work_experience(&entries),
            Err(FormError::MissingCompany(1))
        );
    }

    #[test]
    fn role_outside_the_fixed_list_is_rejected() {
        let entries = vec![entry("Acme", "Astronaut", "2021-01", "2022-01")];
        assert_eq!(
            validate_work_experience(&entries),
            Err(FormError::UnknownRole {
                index: 0,
                role: "Astronaut".to_string()
            })
        );
    }

    #[test]
    fn missing_periods_are_rejected() {
        let entries = vec![entry("Acme", "Cashier", "", "2022-01")];
        assert_eq!(
            validate_work_experience(&entries),
            Err(FormError::MissingStartDate(0))
        );

        let entries = vec![entry("Acme", "Cashier", "2021-01", "")];
        assert_eq!(
            validate_work_experience(&entries),
            Err(FormError::MissingEndDate(0))
        );
    }

    #[test]
    fn role_parse_round_trips_display_strings() {
        for role in Role::ALL {
            assert_eq!(Role::parse(&role.to_string()), Some(role));
        }
        assert_eq!(Role::parse("Shift Lead"), Some(Role::ShiftLead));
        assert_eq!(Role::parse("shift lead"), None);
    }

    #[test]
    fn education_levels_have_distinct_display_strings() {
        let mut seen = std::collections::HashSet::new();
        for level in EducationLevel::ALL {
            assert!(seen.insert(level.to_string()));
        }
    }
}
