use std::io::Cursor;

use kvsecrets::error::Error;
use kvsecrets::protocol::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, write_response_or_error, Command, Response,
    Status, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
use kvsecrets::{Container, ContainerData};

fn sample_container() -> Container {
    let mut data = ContainerData::new();
    data.insert("user".to_string(), b"admin".to_vec());
    data.insert("blob".to_string(), vec![0, 159, 146, 150]);
    Container::new("db", data)
}

// =============================================================================
// Command Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_list_header_and_payload() {
    let encoded = encode_command(&Command::List {
        namespace: "default".into(),
    })
    .unwrap();

    assert_eq!(encoded[0], 0x01);
    assert_eq!(&encoded[1..5], &(4u32 + 7).to_be_bytes());
    assert_eq!(&encoded[5..9], &7u32.to_be_bytes());
    assert_eq!(&encoded[9..], b"default");
}

#[test]
fn test_encode_decode_create_with_binary_data() {
    let cmd = Command::Create {
        namespace: "prod".into(),
        container: sample_container(),
    };

    let decoded = decode_command(&encode_command(&cmd).unwrap()).unwrap();

    assert_eq!(decoded, cmd);
}

#[test]
fn test_encode_decode_delete_name_with_dots() {
    let cmd = Command::Delete {
        namespace: "ns".into(),
        name: "my.app".into(),
    };

    let decoded = decode_command(&encode_command(&cmd).unwrap()).unwrap();

    assert_eq!(decoded, cmd);
}

#[test]
fn test_decode_unknown_command() {
    let bytes = [0x7f, 0, 0, 0, 0];
    assert!(matches!(decode_command(&bytes), Err(Error::Protocol(_))));
}

#[test]
fn test_decode_incomplete_header() {
    assert!(matches!(decode_command(&[0x01, 0]), Err(Error::Protocol(_))));
}

#[test]
fn test_decode_namespace_length_overrun() {
    // LIST whose namespace claims 100 bytes but carries 2
    let mut bytes = vec![0x01, 0, 0, 0, 6];
    bytes.extend_from_slice(&100u32.to_be_bytes());
    bytes.extend_from_slice(b"ns");

    assert!(matches!(decode_command(&bytes), Err(Error::Protocol(_))));
}

#[test]
fn test_decode_ping_with_payload() {
    let bytes = [0x05, 0, 0, 0, 1, 0xaa];
    assert!(matches!(decode_command(&bytes), Err(Error::Protocol(_))));
}

#[test]
fn test_decode_oversized_payload() {
    let mut bytes = vec![0x01];
    bytes.extend_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());
    assert!(matches!(decode_command(&bytes), Err(Error::Protocol(_))));
}

#[test]
fn test_decode_bad_container_body() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&2u32.to_be_bytes());
    payload.extend_from_slice(b"ns");
    payload.extend_from_slice(&[0xff; 3]);
    let mut bytes = vec![0x03];
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&payload);

    assert!(matches!(decode_command(&bytes), Err(Error::Protocol(_))));
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_response_statuses() {
    for response in [
        Response::ok(Some(b"PONG".to_vec())),
        Response::not_found("db"),
        Response::conflict("db"),
        Response::error("boom"),
    ] {
        let decoded = decode_response(&encode_response(&response).unwrap()).unwrap();
        assert_eq!(decoded, response);
    }
}

#[test]
fn test_empty_ok_has_no_payload() {
    let encoded = encode_response(&Response::ok(None)).unwrap();

    assert_eq!(encoded.len(), HEADER_SIZE);
    assert_eq!(decode_response(&encoded).unwrap().payload, None);
}

#[test]
fn test_unknown_status() {
    assert!(matches!(
        decode_response(&[0x09, 0, 0, 0, 0]),
        Err(Error::Protocol(_))
    ));
}

#[test]
fn test_payload_text() {
    assert_eq!(Response::not_found("db").payload_text(), "db");
    assert_eq!(Response::ok(None).payload_text(), "");
    assert_eq!(Response::error("x").status, Status::Error);
}

// =============================================================================
// Stream Tests
// =============================================================================

#[test]
fn test_stream_multiple_commands() {
    let commands = vec![
        Command::Ping,
        Command::List {
            namespace: "a".into(),
        },
        Command::Update {
            namespace: "b".into(),
            container: sample_container(),
        },
    ];

    let mut buffer = Vec::new();
    for cmd in &commands {
        write_command(&mut buffer, cmd).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &commands {
        assert_eq!(&read_command(&mut cursor).unwrap(), expected);
    }
    assert!(matches!(read_command(&mut cursor), Err(Error::Io(_))));
}

#[test]
fn test_stream_response() {
    let mut buffer = Vec::new();
    write_response(&mut buffer, &Response::conflict("db")).unwrap();

    let response = read_response(&mut Cursor::new(buffer)).unwrap();

    assert_eq!(response.status, Status::Conflict);
    assert_eq!(response.payload_text(), "db");
}

#[test]
fn test_oversized_response_is_replaced_by_error() {
    let oversized = Response::ok(Some(vec![0u8; MAX_PAYLOAD_SIZE as usize + 1]));
    assert!(matches!(encode_response(&oversized), Err(Error::Protocol(_))));

    let mut buffer = Vec::new();
    write_response_or_error(&mut buffer, &oversized).unwrap();
    let response = read_response(&mut Cursor::new(buffer)).unwrap();

    assert_eq!(response.status, Status::Error);
    assert!(response.payload_text().contains("too large"));
}

#[test]
fn test_write_response_or_error_passes_small_responses() {
    let mut buffer = Vec::new();
    write_response_or_error(&mut buffer, &Response::not_found("db")).unwrap();

    assert_eq!(
        read_response(&mut Cursor::new(buffer)).unwrap(),
        Response::not_found("db")
    );
}
