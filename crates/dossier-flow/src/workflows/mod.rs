pub mod dossier;
pub mod import;
