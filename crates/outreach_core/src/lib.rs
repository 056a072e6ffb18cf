pub mod dedup;
pub mod domain;
pub mod import;
pub mod intake;
pub mod lifecycle;
pub mod ports;
pub mod store;
pub mod validation;

pub use dedup::{deduplicate, find_duplicates};
pub use domain::{
    Campaign, CampaignContact, CampaignStatus, Contact, DuplicateGroup, DuplicateReport,
    EmailStatus, Progress, RawContactRow, ValidationResult,
};
pub use import::{
    import_from_sheet_url, is_valid_sheets_url, parse_contacts_csv, parse_sheet_url, ImportError,
    ImportSequencer, ImportTicket, SheetRef,
};
pub use intake::{run_intake, IntakeReport, RejectedRow};
pub use ports::{CampaignRepository, FetchedBody, PortError, PortResult, SheetFetcher};
pub use store::{CampaignError, CampaignStore, DEFAULT_CAMPAIGN_NAME};
pub use validation::{has_valid_domain, validate_email};
