use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::{A, AAAA, CNAME};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use splitroute_application::ports::{
    BootstrapResolver, DomainMatcher, ResolverFactory, ResponseCache, UpstreamResolver,
};
use splitroute_application::services::message::{reply_to, set_id};
use splitroute_domain::{DomainError, Fingerprint, UpstreamDescriptor};
use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn query(domain: &str, record_type: RecordType) -> Message {
    let mut message = Message::new(next_id(), MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(Query::query(Name::from_str(domain).unwrap(), record_type));
    message
}

fn next_id() -> u16 {
    static NEXT: AtomicUsize = AtomicUsize::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed) as u16
}

pub fn answer_ips(message: &Message) -> Vec<IpAddr> {
    splitroute_application::services::message::answer_ips(message).collect()
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[derive(Debug, Clone)]
pub enum Behavior {
    Answer(Vec<IpAddr>),
    AnswerWithTtl(Vec<IpAddr>, u32),
    /// Answers under a different message id than the query's.
    AnswerWithId(Vec<IpAddr>, u16),
    CnameOnly(String),
    Empty,
    Fail,
}

pub struct MockResolver {
    name: String,
    behavior: Mutex<Behavior>,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
}

impl MockResolver {
    pub fn new(name: &str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            behavior: Mutex::new(behavior),
            delay: Mutex::new(Duration::ZERO),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        *self.delay.lock().unwrap() = delay;
        self
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamResolver for MockResolver {
    async fn exchange(&self, query: &Message) -> Result<Message, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let behavior = self.behavior.lock().unwrap().clone();
        let name = query.queries()[0].name().clone();
        let mut response = reply_to(query);
        match behavior {
            Behavior::Answer(ips) => add_ips(&mut response, &name, &ips, 60),
            Behavior::AnswerWithTtl(ips, ttl) => add_ips(&mut response, &name, &ips, ttl),
            Behavior::AnswerWithId(ips, id) => {
                add_ips(&mut response, &name, &ips, 60);
                set_id(&mut response, id);
            }
            Behavior::CnameOnly(target) => {
                response.add_answer(Record::from_rdata(
                    name,
                    60,
                    RData::CNAME(CNAME(Name::from_str(&target).unwrap())),
                ));
            }
            Behavior::Empty => {}
            Behavior::Fail => {
                return Err(DomainError::TransportTimeout {
                    server: self.name.clone(),
                })
            }
        }
        Ok(response)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn add_ips(response: &mut Message, name: &Name, ips: &[IpAddr], ttl: u32) {
    for ip in ips {
        let rdata = match ip {
            IpAddr::V4(v4) => RData::A(A(*v4)),
            IpAddr::V6(v6) => RData::AAAA(AAAA(*v6)),
        };
        response.add_answer(Record::from_rdata(name.clone(), ttl, rdata));
    }
}

/// Hands out pre-registered mock resolvers by descriptor name.
#[derive(Default)]
pub struct MockResolverFactory {
    resolvers: Mutex<HashMap<String, Arc<MockResolver>>>,
    bootstrap_calls: AtomicUsize,
    created: Mutex<Vec<UpstreamDescriptor>>,
}

impl MockResolverFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, resolver: Arc<MockResolver>) {
        self.resolvers
            .lock()
            .unwrap()
            .insert(resolver.name.clone(), resolver);
    }

    pub fn bootstrap_calls(&self) -> usize {
        self.bootstrap_calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<UpstreamDescriptor> {
        self.created.lock().unwrap().clone()
    }
}

struct NoopBootstrap;

#[async_trait]
impl BootstrapResolver for NoopBootstrap {
    async fn resolve(&self, hostname: &str, _port: u16) -> Result<Vec<SocketAddr>, DomainError> {
        Err(DomainError::ResolutionFailed(hostname.to_string()))
    }
}

impl ResolverFactory for MockResolverFactory {
    fn bootstrap(&self, addresses: &[String]) -> Option<Arc<dyn BootstrapResolver>> {
        self.bootstrap_calls.fetch_add(1, Ordering::SeqCst);
        if addresses.is_empty() {
            return None;
        }
        Some(Arc::new(NoopBootstrap))
    }

    fn create(
        &self,
        descriptor: &UpstreamDescriptor,
        _bootstrap: Option<Arc<dyn BootstrapResolver>>,
    ) -> Result<Arc<dyn UpstreamResolver>, DomainError> {
        self.created.lock().unwrap().push(descriptor.clone());
        let resolver = self
            .resolvers
            .lock()
            .unwrap()
            .get(&descriptor.name)
            .cloned()
            .ok_or_else(|| DomainError::InvalidUpstream(descriptor.name.clone()))?;
        Ok(resolver as Arc<dyn UpstreamResolver>)
    }
}

/// In-memory cache that never expires entries.
#[derive(Default)]
pub struct MockCache {
    entries: Mutex<HashMap<Fingerprint, Message>>,
    hit_calls: AtomicUsize,
    inserts: AtomicUsize,
    disabled: bool,
}

impl MockCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn disabled() -> Arc<Self> {
        Arc::new(Self {
            disabled: true,
            ..Self::default()
        })
    }

    pub fn hit_calls(&self) -> usize {
        self.hit_calls.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn get(&self, domain: &str, record_type: RecordType) -> Option<Message> {
        self.entries
            .lock()
            .unwrap()
            .get(&Fingerprint::new(domain, u16::from(record_type)))
            .cloned()
    }

    pub fn put(&self, domain: &str, record_type: RecordType, message: Message) {
        self.entries
            .lock()
            .unwrap()
            .insert(Fingerprint::new(domain, u16::from(record_type)), message);
    }
}

impl ResponseCache for MockCache {
    fn hit(&self, key: &Fingerprint, id: u16) -> Option<Message> {
        self.hit_calls.fetch_add(1, Ordering::SeqCst);
        let mut message = self.entries.lock().unwrap().get(key).cloned()?;
        set_id(&mut message, id);
        Some(message)
    }

    fn insert(&self, key: Fingerprint, message: &Message, _minimum_ttl: u32) {
        if self.disabled {
            return;
        }
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .entry(key)
            .or_insert_with(|| message.clone());
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

pub struct StaticMatcher {
    name: String,
    domains: HashSet<String>,
}

impl StaticMatcher {
    pub fn new(name: &str, domains: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            domains: domains.iter().map(|d| d.to_string()).collect(),
        })
    }
}

impl DomainMatcher for StaticMatcher {
    fn has(&self, name: &str) -> bool {
        self.domains.contains(name)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
