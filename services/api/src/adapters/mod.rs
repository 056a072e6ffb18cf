pub mod db;
pub mod file_store;
pub mod memory;
pub mod sheets;

pub use db::PgCampaignRepository;
pub use file_store::FileCampaignRepository;
pub use memory::InMemoryCampaignRepository;
pub use sheets::HttpSheetFetcher;
