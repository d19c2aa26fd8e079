use splitroute_domain::{DomainError, UpstreamAddr, UpstreamEndpoint, UpstreamProtocol};

#[test]
fn test_parse_udp_with_port() {
    let endpoint = UpstreamEndpoint::parse(UpstreamProtocol::Udp, "8.8.8.8:53").unwrap();
    assert!(matches!(
        endpoint,
        UpstreamEndpoint::Udp {
            addr: UpstreamAddr::Resolved(_)
        }
    ));
}

#[test]
fn test_parse_udp_bare_ip_gets_default_port() {
    let endpoint = UpstreamEndpoint::parse(UpstreamProtocol::Udp, "8.8.4.4").unwrap();
    assert_eq!(endpoint.addr().unwrap().port(), 53);
}

#[test]
fn test_parse_tcp_hostname_is_unresolved() {
    let endpoint = UpstreamEndpoint::parse(UpstreamProtocol::Tcp, "dns.example:5353").unwrap();
    assert!(endpoint.needs_resolution());
    assert_eq!(
        endpoint.addr().unwrap().unresolved_parts(),
        Some(("dns.example", 5353))
    );
}

#[test]
fn test_parse_ipv6_without_brackets() {
    let endpoint = UpstreamEndpoint::parse(UpstreamProtocol::Udp, "2001:4860:4860::8888").unwrap();
    let addr = endpoint.addr().unwrap().socket_addr().unwrap();
    assert!(addr.is_ipv6());
    assert_eq!(addr.port(), 53);
}

#[test]
fn test_parse_tls_with_server_name() {
    let endpoint =
        UpstreamEndpoint::parse(UpstreamProtocol::TcpTls, "1.1.1.1:853@cloudflare-dns.com").unwrap();
    if let UpstreamEndpoint::Tls { addr, server_name } = endpoint {
        assert_eq!(addr.port(), 853);
        assert_eq!(&*server_name, "cloudflare-dns.com");
    } else {
        panic!("Expected Tls variant");
    }
}

#[test]
fn test_parse_tls_server_name_defaults_to_host() {
    let endpoint = UpstreamEndpoint::parse(UpstreamProtocol::TcpTls, "dns.google").unwrap();
    if let UpstreamEndpoint::Tls { addr, server_name } = endpoint {
        assert_eq!(addr.port(), 853);
        assert_eq!(&*server_name, "dns.google");
    } else {
        panic!("Expected Tls variant");
    }
}

#[test]
fn test_parse_https_extracts_hostname() {
    let endpoint =
        UpstreamEndpoint::parse(UpstreamProtocol::Https, "https://dns.google:443/dns-query").unwrap();
    if let UpstreamEndpoint::Https { url, hostname } = endpoint {
        assert_eq!(&*url, "https://dns.google:443/dns-query");
        assert_eq!(&*hostname, "dns.google");
    } else {
        panic!("Expected Https variant");
    }
}

#[test]
fn test_parse_https_rejects_non_url() {
    let result = UpstreamEndpoint::parse(UpstreamProtocol::Https, "dns.google");
    assert!(matches!(result, Err(DomainError::InvalidUpstream(_))));
}

#[test]
fn test_parse_rejects_bad_port() {
    let result = UpstreamEndpoint::parse(UpstreamProtocol::Udp, "dns.example:notaport");
    assert!(matches!(result, Err(DomainError::InvalidUpstream(_))));
}

#[test]
fn test_parse_rejects_empty() {
    assert!(UpstreamEndpoint::parse(UpstreamProtocol::Tcp, "  ").is_err());
}

#[test]
fn test_with_resolved_addr_keeps_server_name() {
    let endpoint = UpstreamEndpoint::parse(UpstreamProtocol::TcpTls, "dns.quad9.net").unwrap();
    let resolved = endpoint.with_resolved_addr("9.9.9.9:853".parse().unwrap());

    assert!(!resolved.needs_resolution());
    if let UpstreamEndpoint::Tls { server_name, .. } = resolved {
        assert_eq!(&*server_name, "dns.quad9.net");
    } else {
        panic!("Expected Tls variant");
    }
}

#[test]
fn test_protocol_display_names() {
    assert_eq!(UpstreamProtocol::Udp.to_string(), "udp");
    assert_eq!(UpstreamProtocol::TcpTls.to_string(), "tcp-tls");
    assert_eq!(UpstreamProtocol::Https.to_string(), "https");
}
