use crate::di::Adapters;
use trackerblocker_application::use_cases::{
    AddWhitelistDomainUseCase, ListWhitelistDomainsUseCase, RemoveWhitelistDomainUseCase,
};
use trackerblocker_domain::Config;

pub async fn whitelist_add(config: &Config, domain: &str) -> anyhow::Result<()> {
    let adapters = Adapters::new(config)?;
    let added = AddWhitelistDomainUseCase::new(adapters.whitelist_repository())
        .execute(domain)
        .await?;
    if added {
        println!("Added {domain}");
    } else {
        println!("{domain} is already whitelisted");
    }
    Ok(())
}

pub async fn whitelist_remove(config: &Config, domain: &str) -> anyhow::Result<()> {
    let adapters = Adapters::new(config)?;
    let removed = RemoveWhitelistDomainUseCase::new(adapters.whitelist_repository())
        .execute(domain)
        .await?;
    if removed {
        println!("Removed {domain}");
    } else {
        println!("{domain} is not whitelisted");
    }
    Ok(())
}

pub async fn whitelist_list(config: &Config) -> anyhow::Result<()> {
    let adapters = Adapters::new(config)?;
    let domains = ListWhitelistDomainsUseCase::new(adapters.whitelist_repository())
        .execute()
        .await?;
    for domain in domains {
        println!("{domain}");
    }
    Ok(())
}
