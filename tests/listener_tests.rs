// tests/listener_tests.rs
#![cfg(unix)]

use std::os::fd::{AsFd, AsRawFd};
use std::path::Path;

use endpoint_listener::{create_listener_file, EndpointError, ListenError, Listener};

#[test]
fn unix_endpoint_binds_and_exports_descriptor() {
    let path = "/tmp/endpoint_listener_unix_bind.sock";
    let _ = std::fs::remove_file(path);

    let (listener, file) = create_listener_file("unix:///tmp/endpoint_listener_unix_bind.sock")
        .expect("unix endpoint should bind");

    assert!(file.as_raw_fd() >= 0);
    // The exported descriptor is a duplicate, not the listener's own fd.
    assert_ne!(file.as_raw_fd(), listener.as_fd().as_raw_fd());

    let Listener::Unix(inner) = &listener else {
        panic!("expected a unix listener");
    };
    assert_eq!(
        inner.local_addr().unwrap().as_pathname(),
        Some(Path::new(path))
    );

    drop(listener);
    let _ = std::fs::remove_file(path);
}

#[test]
fn tcp_endpoint_binds_and_exports_descriptor() {
    let (listener, file) =
        create_listener_file("tcp://localhost:15880").expect("tcp endpoint should bind");

    assert!(file.as_raw_fd() >= 0);
    assert_ne!(file.as_raw_fd(), listener.as_fd().as_raw_fd());

    let Listener::Tcp(inner) = &listener else {
        panic!("expected a tcp listener");
    };
    assert_eq!(inner.local_addr().unwrap().port(), 15880);
}

#[test]
fn bare_address_binds_via_tcp_fallback() {
    let (listener, _file) =
        create_listener_file("127.0.0.1:15881").expect("bare address should fall back to tcp");

    let Listener::Tcp(inner) = &listener else {
        panic!("expected a tcp listener");
    };
    assert_eq!(inner.local_addr().unwrap().port(), 15881);
}

#[test]
fn second_bind_on_same_tcp_address_fails() {
    let (first, _file) = create_listener_file("tcp://127.0.0.1:15882").unwrap();

    let err = create_listener_file("tcp://127.0.0.1:15882").unwrap_err();
    assert!(matches!(err, ListenError::Bind { .. }));

    drop(first);
}

#[test]
fn parse_failures_do_not_bind() {
    let err = create_listener_file("npipe://./pipe/mypipe").unwrap_err();
    assert!(matches!(
        err,
        ListenError::Resolution(EndpointError::UnsupportedProtocol(_))
    ));

    let err = create_listener_file("tcp://a b c").unwrap_err();
    assert!(matches!(
        err,
        ListenError::Resolution(EndpointError::Malformed { .. })
    ));
}

#[test]
fn tcp_address_without_port_fails_at_bind() {
    let err = create_listener_file("tcp://localhost").unwrap_err();
    assert!(matches!(err, ListenError::Bind { .. }));
}

#[test]
fn unix_stale_socket_file_is_not_removed() {
    let path = "/tmp/endpoint_listener_stale.sock";
    let _ = std::fs::remove_file(path);

    // Closing the listener leaves the socket file behind.
    let (listener, _file) =
        create_listener_file("unix:///tmp/endpoint_listener_stale.sock").unwrap();
    drop(listener);
    assert!(Path::new(path).exists());

    // Binding over the stale file surfaces the OS address-in-use error.
    let err = create_listener_file("unix:///tmp/endpoint_listener_stale.sock").unwrap_err();
    assert!(matches!(err, ListenError::Bind { .. }));

    let _ = std::fs::remove_file(path);
}
