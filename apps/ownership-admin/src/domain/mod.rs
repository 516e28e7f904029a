pub mod record;
pub mod site;
