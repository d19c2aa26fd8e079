/// Domain list membership.
pub trait DomainMatcher: Send + Sync {
    fn has(&self, name: &str) -> bool;

    fn name(&self) -> &str;
}
