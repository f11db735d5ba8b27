//! Tracker data set → content blocker rules.
//!
//! Rule order matters to the content blocker engine: a later
//! `ignore-previous-rules` cancels every earlier match. The builder emits,
//! per tracker, its default block rule, then its path rules with their
//! exceptions, then CNAME-cloaked aliases, and finally one rule lifting all
//! blocking on whitelisted sites.

use std::collections::BTreeSet;
use trackerblocker_application::ports::RuleBuilder;
use trackerblocker_domain::{
    ContentBlockerRule, KnownTracker, LoadType, RuleTrigger, TrackerAction, TrackerData,
    TrackerRule,
};

/// Matches any scheme and any subdomain in front of a host or path pattern.
const URL_PREFIX: &str = "^(https?)?(wss?)?://([a-z0-9-]+\\.)*";
const PORT_AND_PATH: &str = "(:?[0-9]+)?/.*";

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentBlockerRulesBuilder;

impl ContentBlockerRulesBuilder {
    pub fn new() -> Self {
        Self
    }

    fn tracker_rules(
        &self,
        tracker_domain: &str,
        tracker: &KnownTracker,
        data: &TrackerData,
    ) -> Vec<ContentBlockerRule> {
        let unless_domain = data
            .entity_for(tracker)
            .map(|entity| wildcard(&entity.domains))
            .filter(|domains| !domains.is_empty());
        let domain = tracker.domain.as_deref().unwrap_or(tracker_domain);

        let mut rules = Vec::new();
        if tracker.default_action == Some(TrackerAction::Block) {
            rules.push(ContentBlockerRule::block(RuleTrigger {
                url_filter: domain_filter(domain),
                unless_domain: unless_domain.clone(),
                load_type: Some(vec![LoadType::ThirdParty]),
                ..Default::default()
            }));
        }

        for rule in &tracker.rules {
            rules.extend(self.path_rules(rule, unless_domain.as_ref()));
        }
        rules
    }

    fn path_rules(
        &self,
        rule: &TrackerRule,
        unless_domain: Option<&Vec<String>>,
    ) -> Vec<ContentBlockerRule> {
        let url_filter = format!("{URL_PREFIX}{}", rule.rule);

        if rule.action == Some(TrackerAction::Ignore) {
            return vec![ContentBlockerRule::ignore_previous(RuleTrigger {
                url_filter,
                load_type: Some(vec![LoadType::ThirdParty]),
                ..Default::default()
            })];
        }

        let options = rule.options.as_ref();
        let if_domain = options
            .and_then(|o| o.domains.as_deref())
            .map(wildcard)
            .filter(|d| !d.is_empty());
        let mut rules = vec![ContentBlockerRule::block(RuleTrigger {
            url_filter: url_filter.clone(),
            // if-domain and unless-domain are mutually exclusive
            unless_domain: if if_domain.is_some() {
                None
            } else {
                unless_domain.cloned()
            },
            if_domain,
            load_type: Some(vec![LoadType::ThirdParty]),
            resource_type: options.and_then(|o| o.types.clone()),
        })];

        if let Some(exceptions) = &rule.exceptions {
            let if_domain = exceptions
                .domains
                .as_deref()
                .map(wildcard)
                .filter(|d| !d.is_empty());
            if if_domain.is_some() || exceptions.types.is_some() {
                rules.push(ContentBlockerRule::ignore_previous(RuleTrigger {
                    url_filter,
                    if_domain,
                    load_type: Some(vec![LoadType::ThirdParty]),
                    resource_type: exceptions.types.clone(),
                    ..Default::default()
                }));
            }
        }
        rules
    }

    /// CNAME aliases of blocking trackers get the tracker's default block rule.
    fn cloaked_rules(&self, data: &TrackerData) -> Vec<ContentBlockerRule> {
        data.cnames
            .iter()
            .filter_map(|(alias, target)| {
                let tracker = find_tracker(data, target)?;
                (tracker.default_action == Some(TrackerAction::Block)).then(|| {
                    ContentBlockerRule::block(RuleTrigger {
                        url_filter: domain_filter(alias),
                        load_type: Some(vec![LoadType::ThirdParty]),
                        ..Default::default()
                    })
                })
            })
            .collect()
    }
}

impl RuleBuilder for ContentBlockerRulesBuilder {
    fn build_rules(
        &self,
        tracker_data: &TrackerData,
        unprotected_domains: &[String],
    ) -> Vec<ContentBlockerRule> {
        let mut rules: Vec<ContentBlockerRule> = tracker_data
            .trackers
            .iter()
            .flat_map(|(domain, tracker)| self.tracker_rules(domain, tracker, tracker_data))
            .collect();
        rules.extend(self.cloaked_rules(tracker_data));

        let unprotected: BTreeSet<&str> = unprotected_domains.iter().map(String::as_str).collect();
        if !unprotected.is_empty() {
            rules.push(ContentBlockerRule::ignore_previous(RuleTrigger {
                url_filter: ".*".to_string(),
                if_domain: Some(unprotected.iter().map(|d| format!("*{d}")).collect()),
                ..Default::default()
            }));
        }
        rules
    }
}

/// Tracker owning `host` or one of its parent domains.
fn find_tracker<'a>(data: &'a TrackerData, host: &str) -> Option<&'a KnownTracker> {
    let mut candidate = host;
    loop {
        if let Some(tracker) = data.trackers.get(candidate) {
            return Some(tracker);
        }
        candidate = candidate.split_once('.')?.1;
    }
}

fn domain_filter(domain: &str) -> String {
    format!("{URL_PREFIX}{}{PORT_AND_PATH}", escape_regex(domain))
}

fn wildcard(domains: &[String]) -> Vec<String> {
    domains.iter().map(|d| format!("*{d}")).collect()
}

fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        if matches!(
            c,
            '.' | '\\' | '+' | '*' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
