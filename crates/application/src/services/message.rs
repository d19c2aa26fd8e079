use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::{RData, RecordType};
use splitroute_domain::fingerprint::normalize_name;
use splitroute_domain::Fingerprint;
use std::net::IpAddr;

/// `Message` only exposes its header read-only; header fields are rewritten
/// on a copy and put back.
pub fn set_id(message: &mut Message, id: u16) {
    let mut header = *message.header();
    header.set_id(id);
    message.set_header(header);
}

pub fn set_message_type(message: &mut Message, message_type: MessageType) {
    let mut header = *message.header();
    header.set_message_type(message_type);
    message.set_header(header);
}

pub fn first_question(message: &Message) -> Option<&Query> {
    message.queries().first()
}

/// Lowercased first question name without the root dot; empty when absent.
pub fn question_domain(message: &Message) -> String {
    first_question(message)
        .map(|q| normalize_name(&q.name().to_utf8()))
        .unwrap_or_default()
}

pub fn question_type(message: &Message) -> Option<RecordType> {
    first_question(message).map(|q| q.query_type())
}

pub fn fingerprint(message: &Message) -> Option<Fingerprint> {
    let question = first_question(message)?;
    Some(Fingerprint::new(
        &question.name().to_utf8(),
        u16::from(question.query_type()),
    ))
}

/// A and AAAA addresses in upstream order; other records are skipped.
pub fn answer_ips(message: &Message) -> impl Iterator<Item = IpAddr> + '_ {
    message.answers().iter().filter_map(|record| match record.data() {
        RData::A(a) => Some(IpAddr::V4(a.0)),
        RData::AAAA(aaaa) => Some(IpAddr::V6(aaaa.0)),
        _ => None,
    })
}

/// Empty response echoing the query's id, opcode and questions.
pub fn reply_to(query: &Message) -> Message {
    let mut response = Message::new(query.id(), MessageType::Response, query.op_code());
    response.set_recursion_desired(query.recursion_desired());
    response.set_recursion_available(true);
    for question in query.queries() {
        response.add_query(question.clone());
    }
    response
}

pub fn servfail(query: &Message) -> Message {
    let mut response = reply_to(query);
    response.set_response_code(ResponseCode::ServFail);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::op::OpCode;
    use hickory_proto::rr::Name;
    use std::str::FromStr;

    fn query() -> Message {
        let mut message = Message::new(7, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(Query::query(
            Name::from_str("example.com.").unwrap(),
            RecordType::A,
        ));
        message
    }

    #[test]
    fn test_set_id_keeps_other_header_bits() {
        let mut message = query();
        set_id(&mut message, 4242);

        assert_eq!(message.id(), 4242);
        assert!(message.recursion_desired());
        assert_eq!(message.message_type(), MessageType::Query);
        assert_eq!(message.queries().len(), 1);
    }

    #[test]
    fn test_set_message_type_keeps_id() {
        let mut message = query();
        set_message_type(&mut message, MessageType::Response);

        assert_eq!(message.message_type(), MessageType::Response);
        assert_eq!(message.id(), 7);
    }

    #[test]
    fn test_servfail_echoes_query() {
        let response = servfail(&query());

        assert_eq!(response.id(), 7);
        assert_eq!(response.response_code(), ResponseCode::ServFail);
        assert_eq!(response.message_type(), MessageType::Response);
        assert_eq!(question_domain(&response), "example.com");
    }
}
