pub mod campaigns;
pub mod content;
pub mod personas;
