pub mod status;
pub mod whitelist;

pub use status::{GetRuleListStatusUseCase, RuleListStatus};
pub use whitelist::{AddWhitelistDomainUseCase, ListWhitelistDomainsUseCase, RemoveWhitelistDomainUseCase};
