//! `aidrecon-iati`: IATI organisation file reader.
//!
//! Turns raw document text into a normalized [`OrganisationDocument`].
//! Validation collects every problem before failing. No network or file IO.

pub mod error;
pub mod model;
pub mod parse;
mod xml;

pub use error::{ParseError, ParseViolation, ViolationKind};
pub use model::{
    BudgetLine, DocumentLink, MoneyPeriod, Narrative, OrganisationDocument, RecipientCountry,
    RecipientCountryBudget, RecipientOrg, RecipientOrgBudget, RecipientRegion,
    RecipientRegionBudget, ReportingOrg,
};
pub use parse::{parse, validate, ValidationReport};
