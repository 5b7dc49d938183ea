//! Protocol-level tests for the exception reply protocol and the reserved
//! transaction-code space.

use super::*;

#[test]
fn test_no_exception_reply() {
    let mut reply = Parcel::new();
    reply.write_no_exception();
    reply.write_i32(2);

    assert!(reply.read_exception().is_ok());
    assert_eq!(reply.read_i32().unwrap(), 2);
}

#[test]
fn test_exception_reply_round_trip() {
    let exception = RemoteException::illegal_argument("display id out of range");

    let mut reply = Parcel::new();
    reply.write_exception(&exception);

    let err = reply.read_exception().unwrap_err();
    match err {
        IpcError::Exception(decoded) => assert_eq!(decoded, exception),
        other => panic!("expected remote exception, got {:?}", other),
    }
}

#[test]
fn test_exception_codes_round_trip() {
    let codes = [
        ExceptionCode::Security,
        ExceptionCode::BadParcel,
        ExceptionCode::IllegalArgument,
        ExceptionCode::NullPointer,
        ExceptionCode::IllegalState,
        ExceptionCode::UnsupportedOperation,
    ];
    for code in codes {
        assert!(code.wire_value() < 0);
        assert_eq!(ExceptionCode::from_wire(code.wire_value()), Some(code));
    }
}

#[test]
fn test_unknown_exception_code_is_malformed() {
    let mut reply = Parcel::new();
    reply.write_i32(-42);
    reply.write_str("mystery failure");

    let err = reply.read_exception().unwrap_err();
    assert!(matches!(err, IpcError::MalformedParcel(_)));
}

#[test]
fn test_success_marker_is_not_an_exception_code() {
    assert_eq!(ExceptionCode::from_wire(0), None);
}

#[test]
fn test_reserved_code_space() {
    assert!(FIRST_CALL_TRANSACTION <= LAST_CALL_TRANSACTION);
    // The identity probe lives outside the user-assignable range.
    assert!(INTERFACE_TRANSACTION > LAST_CALL_TRANSACTION);
}
