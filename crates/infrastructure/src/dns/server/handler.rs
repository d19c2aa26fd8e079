use crate::dns::forwarding::MessageBuilder;
use hickory_proto::op::{Message, MessageType};
use splitroute_application::services::message::{question_domain, reply_to, servfail};
use splitroute_application::use_cases::DispatcherHandle;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Classic DNS payload limit without EDNS(0).
const MIN_UDP_PAYLOAD: usize = 512;

#[derive(Clone)]
pub struct DnsServerHandler {
    dispatcher: Arc<DispatcherHandle>,
}

impl DnsServerHandler {
    pub fn new(dispatcher: Arc<DispatcherHandle>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<DispatcherHandle> {
        &self.dispatcher
    }

    /// Wire-format answer to one wire-format query. `None` means the packet
    /// was not a query we can parse and must be dropped.
    pub async fn handle_raw(&self, packet: &[u8], client_ip: IpAddr) -> Option<Vec<u8>> {
        let query = match Message::from_vec(packet) {
            Ok(query) => query,
            Err(e) => {
                debug!(client = %client_ip, error = %e, "Dropping unparsable DNS packet");
                return None;
            }
        };

        if query.message_type() != MessageType::Query {
            debug!(client = %client_ip, "Dropping non-query DNS packet");
            return None;
        }

        let response = self.handle(&query, client_ip).await;
        match MessageBuilder::encode(&response) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(client = %client_ip, error = %e, "Failed to encode response");
                MessageBuilder::encode(&servfail(&query)).ok()
            }
        }
    }

    pub async fn handle(&self, query: &Message, client_ip: IpAddr) -> Message {
        match self.dispatcher.exchange(query, client_ip).await {
            Some(response) => response,
            None => {
                debug!(domain = %question_domain(query), client = %client_ip, "No upstream answer, replying SERVFAIL");
                servfail(query)
            }
        }
    }

    /// UDP variant: replies that exceed the client's payload size are
    /// replaced by an empty truncated reply so the client retries over TCP.
    pub async fn handle_udp(&self, packet: &[u8], client_ip: IpAddr) -> Option<Vec<u8>> {
        let bytes = self.handle_raw(packet, client_ip).await?;
        if bytes.len() <= MIN_UDP_PAYLOAD {
            return Some(bytes);
        }

        let query = Message::from_vec(packet).ok()?;
        let max_payload = query
            .extensions()
            .as_ref()
            .map(|edns| usize::from(edns.max_payload()).max(MIN_UDP_PAYLOAD))
            .unwrap_or(MIN_UDP_PAYLOAD);
        if bytes.len() <= max_payload {
            return Some(bytes);
        }

        debug!(client = %client_ip, len = bytes.len(), max_payload, "Truncating UDP response");
        let mut truncated = reply_to(&query);
        truncated.set_truncated(true);
        MessageBuilder::encode(&truncated).ok()
    }
}
