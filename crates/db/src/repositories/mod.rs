pub mod campaign_repo;
pub mod persona_repo;

pub use campaign_repo::CampaignRepo;
pub use persona_repo::PersonaRepo;
