use splitroute_domain::DomainError;
use std::collections::HashMap;
use std::path::Path;

/// Non-empty lines of `path` with `#` comments stripped.
pub fn read_list_file(path: impl AsRef<Path>) -> Result<Vec<String>, DomainError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| DomainError::IoError(format!("{}: {}", path.display(), e)))?;
    Ok(list_lines(&contents).map(str::to_string).collect())
}

pub(crate) fn list_lines(contents: &str) -> impl Iterator<Item = &str> {
    contents
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
}

/// Parses `domain ttl` lines. Later lines override earlier ones.
pub fn parse_domain_ttl(contents: &str) -> Result<HashMap<String, u32>, DomainError> {
    let mut entries = HashMap::new();

    for line in list_lines(contents) {
        let mut fields = line.split_whitespace();
        let (Some(domain), Some(ttl), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(DomainError::ConfigError(format!(
                "domain TTL line must be 'domain ttl': '{}'",
                line
            )));
        };

        let ttl = ttl.parse::<u32>().map_err(|_| {
            DomainError::ConfigError(format!("invalid TTL '{}' for {}", ttl, domain))
        })?;
        entries.insert(domain.to_string(), ttl);
    }

    Ok(entries)
}
