//! Round-trip tests for the transport layer
//!
//! These run a real [`TcpServer`] on a loopback port and drive it with
//! [`CallTransport`].

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use crate::codec::{BinaryCodec, Payload};
use crate::protocol::{Address, RemoteError, RemoteErrorKind, Request, Response};
use crate::transport::tcp_server::accept_loop;
use crate::transport::{read_frame, write_frame, CallTransport, TcpServer};

/// Starts a server that echoes the first parameter back as the result.
async fn spawn_echo_server() -> (Address, Arc<AtomicUsize>) {
    let server = TcpServer::new("127.0.0.1:0").await.unwrap();
    let address = Address::from(server.local_addr().unwrap());
    let served = Arc::new(AtomicUsize::new(0));

    let counter = served.clone();
    tokio::spawn(async move {
        let _ = server
            .run_with_handler(move |request: Request| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    match request.parameters.first() {
                        Some(first) => Response::success(request.id, first.clone()),
                        None => Response::error(
                            request.id,
                            RemoteError::new(RemoteErrorKind::BadRequest, "nothing to echo"),
                        ),
                    }
                }
            })
            .await;
    });

    (address, served)
}

#[tokio::test]
async fn test_call_round_trip() {
    let (address, served) = spawn_echo_server().await;
    let transport = CallTransport::default();

    let request = Request::with_params("Echo", "say", &("hello".to_string(),)).unwrap();
    let response = transport.send(&address, &request).await.unwrap();

    assert_eq!(response.request_id, request.id);
    let value: String = response.result.unwrap().decode().unwrap();
    assert_eq!(value, "hello");
    assert_eq!(served.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_error_response_is_delivered() {
    let (address, _) = spawn_echo_server().await;
    let transport = CallTransport::default();

    let request = Request::with_params("Echo", "nothing", &()).unwrap();
    let response = transport.send(&address, &request).await.unwrap();

    assert!(response.is_error());
    assert_eq!(response.error.unwrap().kind, RemoteErrorKind::BadRequest);
}

#[tokio::test]
async fn test_concurrent_calls_get_their_own_responses() {
    let (address, served) = spawn_echo_server().await;
    let transport = CallTransport::default();

    let mut handles = Vec::new();
    for i in 0..32u32 {
        let transport = transport.clone();
        let address = address.clone();
        handles.push(tokio::spawn(async move {
            let request = Request::with_params("Echo", "say", &(i,)).unwrap();
            let response = transport.send(&address, &request).await.unwrap();
            assert_eq!(response.request_id, request.id);
            response.result.unwrap().decode::<u32>().unwrap()
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), i as u32);
    }
    assert_eq!(served.load(Ordering::SeqCst), 32);
}

#[tokio::test]
async fn test_connection_serves_frames_in_order() {
    let (address, _) = spawn_echo_server().await;
    let mut stream = TcpStream::connect(address.to_string()).await.unwrap();

    for word in ["first", "second", "third"] {
        let request = Request::with_params("Echo", "say", &(word.to_string(),)).unwrap();
        write_frame(&mut stream, &BinaryCodec::encode_request(&request).unwrap())
            .await
            .unwrap();

        let frame = read_frame(&mut stream).await.unwrap().unwrap();
        let response = BinaryCodec::decode_response(&frame).unwrap();
        assert_eq!(response.request_id, request.id);
        assert_eq!(response.result.unwrap().decode::<String>().unwrap(), word);
    }

    stream.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_undecodable_request_gets_bad_request() {
    let (address, served) = spawn_echo_server().await;
    let mut stream = TcpStream::connect(address.to_string()).await.unwrap();

    write_frame(&mut stream, &[0xde, 0xad, 0xbe, 0xef]).await.unwrap();
    let frame = read_frame(&mut stream).await.unwrap().unwrap();
    let response = BinaryCodec::decode_response(&frame).unwrap();

    assert_eq!(response.request_id, 0);
    assert_eq!(response.error.unwrap().kind, RemoteErrorKind::BadRequest);
    assert_eq!(served.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_payload_survives_transport_unchanged() {
    let (address, _) = spawn_echo_server().await;
    let transport = CallTransport::default();

    let blob: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
    let request = Request::new(
        "Echo",
        "say",
        vec!["alloc::vec::Vec<u8>".to_string()],
        vec![Payload::encode(&blob).unwrap()],
    );

    let response = tokio::time::timeout(Duration::from_secs(5), transport.send(&address, &request))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.result.unwrap().decode::<Vec<u8>>().unwrap(), blob);
}

#[tokio::test]
async fn test_accept_failures_do_not_stop_the_server() {
    let listener = Arc::new(TcpListener::bind("127.0.0.1:0").await.unwrap());
    let address = Address::from(listener.local_addr().unwrap());

    // The first two accepts fail as if the process were out of descriptors
    let failures = Arc::new(AtomicUsize::new(2));
    let attempts = failures.clone();
    let accept = move || {
        let listener = listener.clone();
        let fail = attempts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        async move {
            if fail {
                Err(io::Error::from_raw_os_error(24))
            } else {
                listener.accept().await
            }
        }
    };

    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(accept_loop(
        accept,
        |request: Request| async move {
            match request.parameters.first() {
                Some(first) => Response::success(request.id, first.clone()),
                None => Response::error(
                    request.id,
                    RemoteError::new(RemoteErrorKind::BadRequest, "nothing to echo"),
                ),
            }
        },
        async {
            let _ = stopped.await;
        },
    ));

    let request = Request::with_params("Echo", "say", &("still here".to_string(),)).unwrap();
    let response = tokio::time::timeout(
        Duration::from_secs(5),
        CallTransport::default().send(&address, &request),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(response.result.unwrap().decode::<String>().unwrap(), "still here");
    assert_eq!(failures.load(Ordering::SeqCst), 0);

    stop.send(()).unwrap();
    assert!(server.await.unwrap().is_ok());
}
