#![no_main]

//! Inbound message fuzzer.
//!
//! Arbitrary topics and payloads must decode to a command or an error,
//! never a panic. Anything that decodes must survive a trip back through
//! the client encoding unchanged.

use arbitrary::Arbitrary;
use gridcoin::transport::{decode, encode_command};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Message {
    topic: String,
    payload: Vec<u8>,
}

fuzz_target!(|message: Message| {
    let Ok(command) = decode(&message.topic, &message.payload) else {
        return;
    };
    let publication = encode_command(&command).expect("commands always encode");
    let again = decode(&publication.topic, publication.payload.as_bytes())
        .expect("encoded commands decode");
    assert_eq!(again, command);
});
