use async_trait::async_trait;
use hickory_proto::op::Message;
use splitroute_domain::DomainError;

/// One upstream server. Implementations enforce their own timeout.
#[async_trait]
pub trait UpstreamResolver: Send + Sync {
    async fn exchange(&self, query: &Message) -> Result<Message, DomainError>;

    fn name(&self) -> &str;
}
