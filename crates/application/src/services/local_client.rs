use hickory_proto::op::Message;
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{RData, Record, RecordType};
use splitroute_domain::HostsTable;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::debug;

use super::message::{first_question, question_domain, reply_to};
use super::ttl_policy::TtlPolicy;

const LOCAL_ANSWER_TTL: u32 = 300;

/// Answers A/AAAA questions from the static hosts table.
pub struct LocalClient<'a> {
    query: &'a Message,
    hosts: Option<&'a HostsTable>,
    ttl_policy: &'a TtlPolicy,
}

impl<'a> LocalClient<'a> {
    pub fn new(query: &'a Message, hosts: Option<&'a HostsTable>, ttl_policy: &'a TtlPolicy) -> Self {
        Self {
            query,
            hosts,
            ttl_policy,
        }
    }

    pub fn exchange(&self) -> Option<Message> {
        let question = first_question(self.query)?;
        let record_type = question.query_type();
        if record_type != RecordType::A && record_type != RecordType::AAAA {
            return None;
        }

        let domain = question_domain(self.query);
        let ips = self
            .literal_answer(&domain, record_type)
            .or_else(|| self.hosts_answer(&domain, record_type))?;
        if ips.is_empty() {
            return None;
        }

        let ttl = self.ttl_policy.ttl_for(&domain, LOCAL_ANSWER_TTL);
        let mut response = reply_to(self.query);
        for ip in &ips {
            let rdata = match ip {
                IpAddr::V4(v4) => RData::A(A(*v4)),
                IpAddr::V6(v6) => RData::AAAA(AAAA(*v6)),
            };
            response.add_answer(Record::from_rdata(question.name().clone(), ttl, rdata));
        }

        debug!(domain = %domain, answers = ips.len(), "Answered from hosts");
        Some(response)
    }

    fn literal_answer(&self, domain: &str, record_type: RecordType) -> Option<Vec<IpAddr>> {
        match record_type {
            RecordType::A => domain
                .parse::<Ipv4Addr>()
                .ok()
                .map(|ip| vec![IpAddr::V4(ip)]),
            RecordType::AAAA => domain
                .parse::<Ipv6Addr>()
                .ok()
                .map(|ip| vec![IpAddr::V6(ip)]),
            _ => None,
        }
    }

    fn hosts_answer(&self, domain: &str, record_type: RecordType) -> Option<Vec<IpAddr>> {
        let addrs = self.hosts?.find(domain)?;
        let ips = match record_type {
            RecordType::A => addrs.v4.iter().copied().map(IpAddr::V4).collect(),
            _ => addrs.v6.iter().copied().map(IpAddr::V6).collect(),
        };
        Some(ips)
    }
}
