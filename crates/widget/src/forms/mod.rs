//! Controllers for the structured data-collection sub-forms.
//!
//! Each controller owns the in-progress input for one form and produces,
//! on a successful confirm, exactly one outbound protocol message plus a
//! human-readable echo for the transcript. The widget runtime performs
//! the shared confirm protocol around them: send the message, append the
//! echo as a user entry, hide the form, restore input.
//!
//! - `work_experience`: repeatable list of past positions.
//! - `education`: single selection from the fixed level list.
//! - `address`: autocomplete-backed structured address with a free-text
//!   fallback.
//! - `gps`: device location capture or an explicit skip.

pub mod address;
pub mod education;
pub mod gps;
pub mod work_experience;

pub use address::AddressForm;
pub use education::EducationForm;
pub use gps::GpsForm;
pub use work_experience::WorkExperienceForm;
