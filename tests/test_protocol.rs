// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Black-box wire protocol tests: each test binds its own loopback listener
// and drives it with std::net::TcpStream, the same split this codebase uses
// for its channel/shm integration tests (public API in, observed behavior
// out).

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use digestd::server::serve_one;
use digestd::Cache;

fn spawn_listener(cache_capacity: usize) -> (std::net::SocketAddr, Arc<Cache>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().unwrap();
    let cache = Arc::new(Cache::new(cache_capacity));

    let server_cache = Arc::clone(&cache);
    thread::spawn(move || {
        for stream in listener.incoming() {
            let mut stream = match stream {
                Ok(s) => s,
                Err(_) => continue,
            };
            let cache = Arc::clone(&server_cache);
            thread::spawn(move || {
                let _ = serve_one(&mut stream, &cache);
            });
        }
    });

    // Give the acceptor thread a moment to start listening.
    thread::sleep(Duration::from_millis(20));
    (addr, cache)
}

fn roundtrip(addr: std::net::SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream.write_all(request).expect("write");
    stream
        .set_read_timeout(Some(Duration::from_secs(3)))
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).expect("read");
    response
}

#[test]
fn hashes_hello_with_zero_delay() {
    let (addr, _cache) = spawn_listener(4);
    let response = roundtrip(addr, b"get hello 0\n");
    assert_eq!(response, "5d41402abc4b2a76b9719d911017c592\n");
}

#[test]
fn repeated_lookup_returns_same_digest_and_is_fast() {
    let (addr, _cache) = spawn_listener(4);
    let first = roundtrip(addr, b"get test1 0\n");
    assert_eq!(first, "5a105e8b9d40e1329780d62ea2265d8a\n");

    let start = Instant::now();
    let second = roundtrip(addr, b"get test1 0\n");
    let elapsed = start.elapsed();

    assert_eq!(second, first);
    assert!(elapsed < Duration::from_millis(500), "cached hit should be fast");
}

#[test]
fn eviction_forces_recompute_of_lru_key() {
    let (addr, cache) = spawn_listener(2);
    roundtrip(addr, b"get test2 0\n");
    roundtrip(addr, b"get test3 0\n");
    roundtrip(addr, b"get test4 0\n");

    // test2 was LRU and should have been evicted.
    assert_eq!(cache.get("test2"), None);
    assert!(cache.get("test3").is_some());
    assert!(cache.get("test4").is_some());

    // Re-requesting test2 recomputes rather than panicking on a stale handle.
    let response = roundtrip(addr, b"get test2 0\n");
    assert_eq!(response.trim_end(), cache.get("test2").unwrap());
}

#[test]
fn oversized_request_is_rejected() {
    let (addr, _cache) = spawn_listener(4);
    let mut body = b"get ".to_vec();
    body.extend(std::iter::repeat(b'x').take(5000));
    body.extend_from_slice(b" 0\n");

    let response = roundtrip(addr, &body);
    assert_eq!(response, "Request is too long.\n");
}

#[test]
fn malformed_verb_is_rejected() {
    let (addr, _cache) = spawn_listener(4);
    let response = roundtrip(addr, b"put foo 0\n");
    assert_eq!(response, "Request is not valid.\n");
}

#[test]
fn idle_connection_times_out() {
    let (addr, _cache) = spawn_listener(4);
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(3)))
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).expect("read");
    assert_eq!(response, "Timeout.\n");
}

#[test]
fn delay_over_bound_is_rejected() {
    // The accepted boundary (60000ms) is covered by request::tests without
    // paying a sixty-second wall-clock cost here.
    let (addr, _cache) = spawn_listener(4);
    let rejected = roundtrip(addr, b"get boundary 60001\n");
    assert_eq!(rejected, "Request is not valid.\n");
}
