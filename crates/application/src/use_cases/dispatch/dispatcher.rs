use hickory_proto::op::Message;
use hickory_proto::rr::RecordType;
use splitroute_domain::config::dispatch::is_alternative_spelling;
use splitroute_domain::{DomainError, HostsTable, IpNetworkSet, UpstreamDescriptor};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info};

use super::race::RaceArbiter;
use crate::ports::{
    BootstrapResolver, DomainMatcher, ResolverFactory, ResponseCache, UpstreamResolver,
};
use crate::services::message::{first_question, question_type};
use crate::services::{ClientBundle, Group, LocalClient, TtlPolicy};

/// Everything a dispatcher is built from. Lists and matchers are already
/// loaded; upstream descriptors are expected to be normalized.
pub struct DispatcherConfig {
    pub primary_dns: Vec<UpstreamDescriptor>,
    pub alternative_dns: Vec<UpstreamDescriptor>,
    pub bootstrap_dns: Vec<String>,
    pub only_primary_dns: bool,
    pub when_primary_dns_answer_none_use: String,
    pub ip_network_primary: IpNetworkSet,
    pub ip_network_alternative: IpNetworkSet,
    pub domain_primary: Option<Arc<dyn DomainMatcher>>,
    pub domain_alternative: Option<Arc<dyn DomainMatcher>>,
    pub redirect_ipv6_record: bool,
    pub alternative_dns_concurrent: bool,
    pub minimum_ttl: u32,
    pub domain_ttl: HashMap<String, u32>,
    pub hosts: Option<Arc<HostsTable>>,
    pub cache: Arc<dyn ResponseCache>,
}

impl DispatcherConfig {
    pub fn new(cache: Arc<dyn ResponseCache>) -> Self {
        Self {
            primary_dns: Vec::new(),
            alternative_dns: Vec::new(),
            bootstrap_dns: Vec::new(),
            only_primary_dns: false,
            when_primary_dns_answer_none_use: String::new(),
            ip_network_primary: IpNetworkSet::default(),
            ip_network_alternative: IpNetworkSet::default(),
            domain_primary: None,
            domain_alternative: None,
            redirect_ipv6_record: false,
            alternative_dns_concurrent: false,
            minimum_ttl: 0,
            domain_ttl: HashMap::new(),
            hosts: None,
            cache,
        }
    }
}

/// Routes each query to the primary or the alternative upstream group.
///
/// Immutable once built; a reload replaces the whole dispatcher.
pub struct Dispatcher {
    only_primary_dns: bool,
    redirect_ipv6_record: bool,
    domain_primary: Option<Arc<dyn DomainMatcher>>,
    domain_alternative: Option<Arc<dyn DomainMatcher>>,
    hosts: Option<Arc<HostsTable>>,
    cache: Arc<dyn ResponseCache>,
    ttl_policy: Arc<TtlPolicy>,
    arbiter: RaceArbiter,
    primary_resolvers: Arc<[Arc<dyn UpstreamResolver>]>,
    alternative_resolvers: Arc<[Arc<dyn UpstreamResolver>]>,
}

impl Dispatcher {
    pub fn init(
        config: DispatcherConfig,
        factory: &dyn ResolverFactory,
    ) -> Result<Self, DomainError> {
        let bootstrap = if config.bootstrap_dns.is_empty() {
            None
        } else {
            factory.bootstrap(&config.bootstrap_dns)
        };

        let primary_resolvers =
            create_resolvers(factory, bootstrap.clone(), &config.primary_dns)?;
        let alternative_resolvers =
            create_resolvers(factory, bootstrap.clone(), &config.alternative_dns)?;

        info!(
            primary = primary_resolvers.len(),
            alternative = alternative_resolvers.len(),
            bootstrap = bootstrap.is_some(),
            "Dispatcher initialized"
        );

        let arbiter = RaceArbiter::new(
            config.ip_network_primary,
            config.ip_network_alternative,
            is_alternative_spelling(&config.when_primary_dns_answer_none_use),
            config.alternative_dns_concurrent,
        );

        Ok(Self {
            only_primary_dns: config.only_primary_dns,
            redirect_ipv6_record: config.redirect_ipv6_record,
            domain_primary: config.domain_primary,
            domain_alternative: config.domain_alternative,
            hosts: config.hosts,
            cache: config.cache,
            ttl_policy: Arc::new(TtlPolicy::new(config.minimum_ttl, config.domain_ttl)),
            arbiter,
            primary_resolvers,
            alternative_resolvers,
        })
    }

    /// Never fails; `None` means no group could answer.
    pub async fn exchange(&self, query: &Message, inbound_ip: IpAddr) -> Option<Message> {
        if first_question(query).is_none() {
            debug!(client = %inbound_ip, "Query has no question section");
            return None;
        }

        let local = LocalClient::new(query, self.hosts.as_deref(), &self.ttl_policy);
        if let Some(response) = local.exchange() {
            return Some(response);
        }

        let query = Arc::new(query.clone());
        let mut primary = self.bundle(Group::Primary, &query);
        let mut alternative = self.bundle(Group::Alternative, &query);

        for bundle in [&mut primary, &mut alternative] {
            if let Some(response) = bundle.exchange_from_cache() {
                return Some(response);
            }
        }

        debug!(
            client = %inbound_ip,
            domain = %primary.first_question_domain(),
            "Dispatching query"
        );

        if self.only_primary_dns || self.is_select_domain(&primary, self.domain_primary.as_deref())
        {
            primary.exchange(true, true).await;
            return primary.into_response();
        }

        if self.is_exchange_for_ipv6(&query)
            || self.is_select_domain(&alternative, self.domain_alternative.as_deref())
        {
            alternative.exchange(true, true).await;
            return alternative.into_response();
        }

        let winner = self.arbiter.select(primary, alternative).await?;
        winner.cache_result_if_needed();
        winner.into_response()
    }

    fn bundle(&self, group: Group, query: &Arc<Message>) -> ClientBundle {
        let resolvers = match group {
            Group::Primary => self.primary_resolvers.clone(),
            Group::Alternative => self.alternative_resolvers.clone(),
        };
        ClientBundle::new(
            group,
            query.clone(),
            resolvers,
            self.cache.clone(),
            self.ttl_policy.clone(),
        )
    }

    pub fn is_exchange_for_ipv6(&self, query: &Message) -> bool {
        if self.redirect_ipv6_record && question_type(query) == Some(RecordType::AAAA) {
            debug!("Finally use Alternative DNS");
            return true;
        }
        false
    }

    pub fn is_select_domain(&self, bundle: &ClientBundle, matcher: Option<&dyn DomainMatcher>) -> bool {
        let Some(matcher) = matcher else {
            debug!(group = %bundle.name(), "Domain matcher is absent, not checking");
            return false;
        };

        let domain = bundle.first_question_domain();
        if matcher.has(domain) {
            debug!(
                group = %bundle.name(),
                matcher = matcher.name(),
                domain = %domain,
                "Matched domain list"
            );
            debug!("Finally use {} DNS", bundle.name());
            return true;
        }

        debug!(group = %bundle.name(), domain = %domain, "Domain list match failed");
        false
    }
}

fn create_resolvers(
    factory: &dyn ResolverFactory,
    bootstrap: Option<Arc<dyn BootstrapResolver>>,
    descriptors: &[UpstreamDescriptor],
) -> Result<Arc<[Arc<dyn UpstreamResolver>]>, DomainError> {
    descriptors
        .iter()
        .map(|descriptor| {
            if descriptor.is_normalized() {
                factory.create(descriptor, bootstrap.clone())
            } else {
                factory.create(&descriptor.clone().normalized(), bootstrap.clone())
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Arc::from)
}
