use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{RData, Record, RecordType};
use hickory_proto::serialize::binary::BinEncodable;
use splitroute_application::services::message::set_message_type;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

/// How the mock answers every query it receives.
#[derive(Debug, Clone, Copy)]
pub enum MockAnswer {
    /// A queries get `v4`, AAAA queries get `::ffff:v4`, others stay empty.
    Address(Ipv4Addr),
    /// Response with the TC bit set and no answers.
    Truncated,
    /// NOERROR without answers.
    Empty,
    /// Never replies.
    Silent,
}

pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown: Vec<oneshot::Sender<()>>,
}

impl MockDnsServer {
    /// UDP only, on an ephemeral port.
    pub async fn start(answer: MockAnswer) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));
        let shutdown = vec![spawn_udp(socket, answer, queries.clone())];
        Ok(Self {
            addr,
            queries,
            shutdown,
        })
    }

    /// UDP and TCP on the same port, each with its own answer.
    pub async fn start_dual(udp: MockAnswer, tcp: MockAnswer) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let listener = TcpListener::bind(addr).await?;
        let queries = Arc::new(AtomicUsize::new(0));
        let shutdown = vec![
            spawn_udp(socket, udp, queries.clone()),
            spawn_tcp(listener, tcp, queries.clone()),
        ];
        Ok(Self {
            addr,
            queries,
            shutdown,
        })
    }

    pub async fn start_tcp(answer: MockAnswer) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));
        let shutdown = vec![spawn_tcp(listener, answer, queries.clone())];
        Ok(Self {
            addr,
            queries,
            shutdown,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        for tx in self.shutdown.drain(..) {
            let _ = tx.send(());
        }
    }
}

fn spawn_udp(
    socket: UdpSocket,
    answer: MockAnswer,
    queries: Arc<AtomicUsize>,
) -> oneshot::Sender<()> {
    let (tx, mut rx) = oneshot::channel();
    tokio::spawn(async move {
        let mut buf = vec![0u8; 4096];
        loop {
            tokio::select! {
                _ = &mut rx => break,
                result = socket.recv_from(&mut buf) => {
                    if let Ok((len, peer)) = result {
                        queries.fetch_add(1, Ordering::SeqCst);
                        if let Some(response) = build_response(&buf[..len], answer) {
                            let _ = socket.send_to(&response, peer).await;
                        }
                    }
                }
            }
        }
    });
    tx
}

fn spawn_tcp(
    listener: TcpListener,
    answer: MockAnswer,
    queries: Arc<AtomicUsize>,
) -> oneshot::Sender<()> {
    let (tx, mut rx) = oneshot::channel();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut rx => break,
                accepted = listener.accept() => {
                    let Ok((mut stream, _)) = accepted else { continue };
                    let queries = queries.clone();
                    tokio::spawn(async move {
                        loop {
                            let mut len_buf = [0u8; 2];
                            if stream.read_exact(&mut len_buf).await.is_err() {
                                break;
                            }
                            let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
                            if stream.read_exact(&mut query).await.is_err() {
                                break;
                            }
                            queries.fetch_add(1, Ordering::SeqCst);
                            let Some(response) = build_response(&query, answer) else {
                                tokio::time::sleep(Duration::from_secs(30)).await;
                                break;
                            };
                            let len = (response.len() as u16).to_be_bytes();
                            if stream.write_all(&len).await.is_err()
                                || stream.write_all(&response).await.is_err()
                            {
                                break;
                            }
                        }
                    });
                }
            }
        }
    });
    tx
}

pub fn build_response(query: &[u8], answer: MockAnswer) -> Option<Vec<u8>> {
    let query = Message::from_vec(query).ok()?;
    let mut response = query.clone();
    set_message_type(&mut response, MessageType::Response);
    response.set_recursion_available(true);

    match answer {
        MockAnswer::Silent => return None,
        MockAnswer::Empty => {}
        MockAnswer::Truncated => {
            response.set_truncated(true);
        }
        MockAnswer::Address(v4) => {
            let question = query.queries().first()?;
            let rdata = match question.query_type() {
                RecordType::A => Some(RData::A(A(v4))),
                RecordType::AAAA => Some(RData::AAAA(AAAA(v4.to_ipv6_mapped()))),
                _ => None,
            };
            if let Some(rdata) = rdata {
                response.add_answer(Record::from_rdata(question.name().clone(), 60, rdata));
            }
        }
    }

    response.to_vec().ok()
}
