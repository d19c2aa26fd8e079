use splitroute_application::ports::DomainMatcher;

/// Matches every name.
pub struct FinalMatcher {
    name: String,
}

impl FinalMatcher {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl DomainMatcher for FinalMatcher {
    fn has(&self, _name: &str) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }
}
