use futures::stream::{FuturesUnordered, StreamExt};
use hickory_proto::op::{Message, ResponseCode};
use splitroute_domain::Fingerprint;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use super::message::{fingerprint, question_domain, set_id};
use super::ttl_policy::TtlPolicy;
use crate::ports::{ResponseCache, UpstreamResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Primary,
    Alternative,
}

impl Group {
    pub fn name(&self) -> &'static str {
        match self {
            Group::Primary => "Primary",
            Group::Alternative => "Alternative",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One upstream group working on one query.
///
/// Built fresh for every query; holds at most one response, which is what
/// the dispatcher returns when this group is selected.
pub struct ClientBundle {
    group: Group,
    query: Arc<Message>,
    domain: String,
    fingerprint: Option<Fingerprint>,
    resolvers: Arc<[Arc<dyn UpstreamResolver>]>,
    cache: Arc<dyn ResponseCache>,
    ttl_policy: Arc<TtlPolicy>,
    response: Option<Message>,
}

impl ClientBundle {
    pub fn new(
        group: Group,
        query: Arc<Message>,
        resolvers: Arc<[Arc<dyn UpstreamResolver>]>,
        cache: Arc<dyn ResponseCache>,
        ttl_policy: Arc<TtlPolicy>,
    ) -> Self {
        let domain = question_domain(&query);
        let fingerprint = fingerprint(&query);
        Self {
            group,
            query,
            domain,
            fingerprint,
            resolvers,
            cache,
            ttl_policy,
            response: None,
        }
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn name(&self) -> &str {
        self.group.name()
    }

    pub fn first_question_domain(&self) -> &str {
        &self.domain
    }

    pub fn exchange_from_cache(&mut self) -> Option<Message> {
        let key = self.fingerprint.as_ref()?;
        let mut hit = self.cache.hit(key, self.query.id())?;
        self.ttl_policy.apply(&mut hit);

        debug!(group = %self.group, domain = %self.domain, "Cache hit");
        self.response = Some(hit.clone());
        Some(hit)
    }

    /// Sends the query to every resolver of the group at once. The first
    /// response with answers wins; failing that, the last response that
    /// arrived at all. With `cache_result` the winner is cached right away.
    pub async fn exchange(&mut self, cache_result: bool, log_enabled: bool) -> Option<&Message> {
        let mut response = self.exchange_upstreams(log_enabled).await;
        if let Some(response) = response.as_mut() {
            set_id(response, self.query.id());
            self.ttl_policy.apply(response);
        }
        self.response = response;

        if cache_result {
            self.cache_result_if_needed();
        }
        self.response.as_ref()
    }

    async fn exchange_upstreams(&self, log_enabled: bool) -> Option<Message> {
        if self.resolvers.is_empty() {
            debug!(group = %self.group, "No upstream servers configured");
            return None;
        }

        let query = self.query.as_ref();
        let mut pending: FuturesUnordered<_> = self
            .resolvers
            .iter()
            .map(|resolver| async move { (resolver.name(), resolver.exchange(query).await) })
            .collect();

        let mut fallback = None;
        while let Some((upstream, result)) = pending.next().await {
            match result {
                Ok(response) if !response.answers().is_empty() => {
                    debug!(
                        group = %self.group,
                        upstream = upstream,
                        domain = %self.domain,
                        answers = response.answers().len(),
                        "Upstream answered"
                    );
                    return Some(response);
                }
                Ok(response) => {
                    debug!(
                        group = %self.group,
                        upstream = upstream,
                        domain = %self.domain,
                        rcode = ?response.response_code(),
                        "Upstream returned no answer records"
                    );
                    fallback = Some(response);
                }
                Err(e) if log_enabled => {
                    warn!(
                        group = %self.group,
                        upstream = upstream,
                        domain = %self.domain,
                        error = %e,
                        "Upstream exchange failed"
                    );
                }
                Err(_) => {}
            }
        }
        fallback
    }

    pub fn response_message(&self) -> Option<&Message> {
        self.response.as_ref()
    }

    pub fn into_response(self) -> Option<Message> {
        self.response
    }

    /// SERVFAIL and REFUSED responses are never cached.
    pub fn cache_result_if_needed(&self) {
        let (Some(key), Some(response)) = (self.fingerprint.as_ref(), self.response.as_ref()) else {
            return;
        };
        if matches!(
            response.response_code(),
            ResponseCode::ServFail | ResponseCode::Refused
        ) {
            return;
        }

        self.cache
            .insert(key.clone(), response, self.ttl_policy.minimum_ttl());
        debug!(group = %self.group, domain = %self.domain, "Cached response");
    }
}
