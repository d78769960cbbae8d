// Listing wizard

pub mod controller;
pub mod step;

pub use controller::{ListingWizard, SubmitOutcome, WizardMode};
pub use step::Step;
