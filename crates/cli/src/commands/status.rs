use crate::di::Adapters;
use trackerblocker_application::use_cases::GetRuleListStatusUseCase;
use trackerblocker_domain::Config;

pub async fn status(config: &Config) -> anyhow::Result<()> {
    let adapters = Adapters::new(config)?;
    let status = GetRuleListStatusUseCase::new(adapters.key_value_store(), adapters.rule_store())
        .execute()
        .await?;

    println!("ETag:       {}", status.etag.as_deref().unwrap_or("none"));
    match &status.identifier {
        Some(identifier) => {
            println!("Identifier: {identifier}");
            println!("Whitelist:  {} domain(s)", identifier.domains.len());
        }
        None => println!("Identifier: none"),
    }
    match status.rule_count {
        Some(count) => println!("Compiled:   yes ({count} rules)"),
        None if status.identifier.is_some() => println!("Compiled:   no (orphaned identifier)"),
        None => println!("Compiled:   no"),
    }
    Ok(())
}
