use super::list_file::{parse_domain_ttl, read_list_file};
use crate::dns::matcher::build_matcher;
use splitroute_application::ports::{DomainMatcher, ResponseCache};
use splitroute_application::use_cases::DispatcherConfig;
use splitroute_domain::{Config, DomainError, HostsTable, IpNetworkSet, LocalDnsRecord, MatcherKind};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

fn merged_entries(inline: &[String], file: Option<&str>) -> Result<Vec<String>, DomainError> {
    let mut entries = inline.to_vec();
    if let Some(path) = file.filter(|path| !path.is_empty()) {
        entries.extend(read_list_file(path)?);
    }
    Ok(entries)
}

pub fn load_ip_network_set(
    inline: &[String],
    file: Option<&str>,
) -> Result<IpNetworkSet, DomainError> {
    IpNetworkSet::parse(merged_entries(inline, file)?.iter().map(String::as_str))
}

/// `None` when neither the inline list nor the file has entries.
pub fn load_domain_matcher(
    kind: MatcherKind,
    name: &str,
    inline: &[String],
    file: Option<&str>,
) -> Result<Option<Arc<dyn DomainMatcher>>, DomainError> {
    let entries = merged_entries(inline, file)?;
    if entries.is_empty() {
        return Ok(None);
    }
    build_matcher(kind, name, &entries).map(Some)
}

/// File entries override inline ones for the same domain.
pub fn load_domain_ttl(
    inline: &HashMap<String, u32>,
    file: Option<&str>,
) -> Result<HashMap<String, u32>, DomainError> {
    let mut entries = inline.clone();
    if let Some(path) = file.filter(|path| !path.is_empty()) {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DomainError::IoError(format!("{}: {}", path, e)))?;
        entries.extend(parse_domain_ttl(&contents)?);
    }
    Ok(entries)
}

/// `None` when there is no hosts file and no inline record.
pub fn load_hosts(
    hosts_file: Option<&str>,
    local_records: &[LocalDnsRecord],
) -> Result<Option<Arc<HostsTable>>, DomainError> {
    let hosts_file = hosts_file.filter(|path| !path.is_empty());
    if hosts_file.is_none() && local_records.is_empty() {
        return Ok(None);
    }

    let mut table = HostsTable::new();
    if let Some(path) = hosts_file {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DomainError::IoError(format!("{}: {}", path, e)))?;
        table.extend_from_text(&contents)?;
    }
    for record in local_records {
        table.insert(&record.fqdn(), record.ip);
    }

    Ok(Some(Arc::new(table)))
}

pub fn build_dispatcher_config(
    config: &Config,
    cache: Arc<dyn ResponseCache>,
) -> Result<DispatcherConfig, DomainError> {
    let dispatch = &config.dispatch;

    let ip_network_primary = load_ip_network_set(
        &dispatch.ip_network_primary,
        dispatch.ip_network_primary_file.as_deref(),
    )?;
    let ip_network_alternative = load_ip_network_set(
        &dispatch.ip_network_alternative,
        dispatch.ip_network_alternative_file.as_deref(),
    )?;
    let domain_primary = load_domain_matcher(
        dispatch.domain_matcher,
        "primary",
        &dispatch.domain_primary,
        dispatch.domain_primary_file.as_deref(),
    )?;
    let domain_alternative = load_domain_matcher(
        dispatch.domain_matcher,
        "alternative",
        &dispatch.domain_alternative,
        dispatch.domain_alternative_file.as_deref(),
    )?;
    let domain_ttl = load_domain_ttl(&dispatch.domain_ttl, dispatch.domain_ttl_file.as_deref())?;
    let hosts = load_hosts(dispatch.hosts_file.as_deref(), &config.local_records)?;

    info!(
        ip_network_primary = ip_network_primary.len(),
        ip_network_alternative = ip_network_alternative.len(),
        domain_primary = domain_primary.is_some(),
        domain_alternative = domain_alternative.is_some(),
        domain_ttl = domain_ttl.len(),
        hosts = hosts.as_ref().map_or(0, |table| table.len()),
        "Dispatch lists loaded"
    );

    let mut dispatcher_config = DispatcherConfig::new(cache);
    dispatcher_config.primary_dns = dispatch.primary_dns.clone();
    dispatcher_config.alternative_dns = dispatch.alternative_dns.clone();
    dispatcher_config.bootstrap_dns = dispatch.bootstrap_dns.clone();
    dispatcher_config.only_primary_dns = dispatch.only_primary_dns;
    dispatcher_config.when_primary_dns_answer_none_use =
        dispatch.when_primary_dns_answer_none_use.clone();
    dispatcher_config.ip_network_primary = ip_network_primary;
    dispatcher_config.ip_network_alternative = ip_network_alternative;
    dispatcher_config.domain_primary = domain_primary;
    dispatcher_config.domain_alternative = domain_alternative;
    dispatcher_config.redirect_ipv6_record = dispatch.redirect_ipv6_record;
    dispatcher_config.alternative_dns_concurrent = dispatch.alternative_dns_concurrent;
    dispatcher_config.minimum_ttl = dispatch.minimum_ttl;
    dispatcher_config.domain_ttl = domain_ttl;
    dispatcher_config.hosts = hosts;

    Ok(dispatcher_config)
}
