mod run;
mod status;
mod whitelist;

pub use run::run;
pub use status::status;
pub use whitelist::{whitelist_add, whitelist_list, whitelist_remove};
