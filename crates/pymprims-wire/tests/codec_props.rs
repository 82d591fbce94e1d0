use proptest::prelude::*;
use pymprims_wire::{decode, encode, try_encode, validate_channel_id, DELIMITER};

fn channel_id() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_:.-]{1,24}".prop_filter("frames cleanly", |id| validate_channel_id(id).is_ok())
}

fn message_type() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,24}".prop_filter("frames cleanly", |t| try_encode("c", t, "").is_ok())
}

fn payload() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        any::<String>().prop_map(|s| format!("{s}{DELIMITER}{s}")),
        Just(String::new()),
    ]
}

proptest! {
    #[test]
    fn decode_recovers_type_and_payload(id in channel_id(), ty in message_type(), body in payload()) {
        let wire = try_encode(&id, &ty, &body).unwrap();
        let message = decode(&wire, &id).unwrap();
        prop_assert_eq!(message.message_type, ty);
        prop_assert_eq!(message.payload, body);
    }

    #[test]
    fn other_channels_never_match(a in channel_id(), b in channel_id(), ty in message_type(), body in payload()) {
        prop_assume!(a != b);
        let wire = encode(&a, &ty, &body);
        prop_assert!(decode(&wire, &b).is_none());
    }

    #[test]
    fn arbitrary_input_never_panics(wire in any::<String>(), id in channel_id()) {
        let _ = decode(&wire, &id);
    }
}
