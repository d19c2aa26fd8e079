use hickory_proto::rr::RecordType;
use splitroute_domain::{DomainError, TcpPoolConfig, UpstreamEndpoint, UpstreamProtocol};
use splitroute_infrastructure::dns::forwarding::{MessageBuilder, ResponseParser};
use splitroute_infrastructure::dns::transport::{
    create_transport, tcp::TcpTransport, udp::UdpTransport, DnsTransport, Transport,
    TransportOptions,
};
use std::net::Ipv4Addr;
use std::time::Duration;

mod helpers;
use helpers::{ip, MockAnswer, MockDnsServer};

const TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_udp_round_trip_against_mock() {
    let server = MockDnsServer::start(MockAnswer::Address(Ipv4Addr::new(93, 184, 216, 34)))
        .await
        .unwrap();
    let query = MessageBuilder::build_query("example.com", RecordType::A).unwrap();
    let bytes = MessageBuilder::encode(&query).unwrap();

    let transport = UdpTransport::new(server.addr());
    let response = transport.send(&bytes, TIMEOUT).await.unwrap();

    assert_eq!(response.protocol_used, "UDP");
    let message = ResponseParser::parse(&response.bytes, query.id()).unwrap();
    assert_eq!(ResponseParser::addresses(&message), vec![ip("93.184.216.34")]);
    assert_eq!(server.queries(), 1);
}

#[tokio::test]
async fn test_udp_timeout_against_silent_server() {
    let server = MockDnsServer::start(MockAnswer::Silent).await.unwrap();
    let query = MessageBuilder::build_query("example.com", RecordType::A).unwrap();
    let bytes = MessageBuilder::encode(&query).unwrap();

    let result = UdpTransport::new(server.addr())
        .send(&bytes, Duration::from_millis(200))
        .await;

    assert!(matches!(result, Err(DomainError::TransportTimeout { .. })));
}

#[tokio::test]
async fn test_tcp_round_trip_against_mock() {
    let server = MockDnsServer::start_tcp(MockAnswer::Address(Ipv4Addr::new(10, 0, 0, 7)))
        .await
        .unwrap();
    let query = MessageBuilder::build_query("intranet.test", RecordType::A).unwrap();
    let bytes = MessageBuilder::encode(&query).unwrap();

    let transport = TcpTransport::new(server.addr(), None, &TcpPoolConfig::default());
    let response = transport.send(&bytes, TIMEOUT).await.unwrap();

    assert_eq!(response.protocol_used, "TCP");
    let message = ResponseParser::parse(&response.bytes, query.id()).unwrap();
    assert_eq!(ResponseParser::addresses(&message), vec![ip("10.0.0.7")]);
}

#[tokio::test]
async fn test_tcp_pool_reuses_connection_across_queries() {
    let server = MockDnsServer::start_tcp(MockAnswer::Address(Ipv4Addr::new(10, 0, 0, 8)))
        .await
        .unwrap();
    let pool = TcpPoolConfig {
        enable: true,
        ..TcpPoolConfig::default()
    };
    let transport = TcpTransport::new(server.addr(), None, &pool);

    for _ in 0..3 {
        let query = MessageBuilder::build_query("intranet.test", RecordType::A).unwrap();
        let bytes = MessageBuilder::encode(&query).unwrap();
        let response = transport.send(&bytes, TIMEOUT).await.unwrap();
        assert!(ResponseParser::parse(&response.bytes, query.id()).is_ok());
    }
    assert_eq!(server.queries(), 3);
}

#[test]
fn test_create_transport_per_protocol() {
    let options = TransportOptions::default();

    let udp = UpstreamEndpoint::parse(UpstreamProtocol::Udp, "8.8.8.8").unwrap();
    assert!(matches!(create_transport(&udp, &options), Ok(Transport::Udp(_))));

    let tcp = UpstreamEndpoint::parse(UpstreamProtocol::Tcp, "8.8.8.8:53").unwrap();
    assert_eq!(create_transport(&tcp, &options).unwrap().protocol_name(), "TCP");

    let tls = UpstreamEndpoint::parse(UpstreamProtocol::TcpTls, "1.1.1.1@cloudflare-dns.com").unwrap();
    assert_eq!(create_transport(&tls, &options).unwrap().protocol_name(), "TLS");

    let https =
        UpstreamEndpoint::parse(UpstreamProtocol::Https, "https://dns.google/dns-query").unwrap();
    assert_eq!(create_transport(&https, &options).unwrap().protocol_name(), "HTTPS");
}

#[test]
fn test_create_transport_needs_resolved_address() {
    let endpoint = UpstreamEndpoint::parse(UpstreamProtocol::Udp, "dns.google:53").unwrap();
    let result = create_transport(&endpoint, &TransportOptions::default());
    assert!(matches!(result, Err(DomainError::InvalidUpstream(_))));
}
