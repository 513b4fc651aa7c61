// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Acceptor loop, worker pool and the shutdown sequence. The listening
// socket is opened with raw libc calls (SO_REUSEADDR, SO_RCVTIMEO) and
// handed to std::net::TcpListener via FromRawFd, the same split this
// codebase uses elsewhere between a thin libc setup layer and std-native
// I/O for everything downstream.

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::os::unix::io::FromRawFd;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::cache::Cache;
use crate::md5::md5_hex;
use crate::queue::Queue;
use crate::request::{Request, MAX_REQUEST_SIZE};
use crate::signal;

const SOCKET_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings parsed from the command line.
pub struct ServerConfig {
    pub port: u16,
    pub cache_size: usize,
    pub thread_count: usize,
}

/// Opens a TCP listening socket on `port` with SO_REUSEADDR and a one
/// second accept timeout, with `backlog` pending connections.
fn open_listener(port: u16, backlog: i32) -> io::Result<TcpListener> {
    unsafe {
        let fd = libc::socket(libc::AF_INET, libc::SOCK_STREAM, 0);
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }

        let reuse: libc::c_int = 1;
        if libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_REUSEADDR,
            &reuse as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        ) < 0
        {
            libc::close(fd);
            return Err(io::Error::last_os_error());
        }

        let timeout = libc::timeval {
            tv_sec: SOCKET_TIMEOUT.as_secs() as libc::time_t,
            tv_usec: 0,
        };
        if libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_RCVTIMEO,
            &timeout as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::timeval>() as libc::socklen_t,
        ) < 0
        {
            libc::close(fd);
            return Err(io::Error::last_os_error());
        }

        let addr = libc::sockaddr_in {
            sin_family: libc::AF_INET as libc::sa_family_t,
            sin_port: port.to_be(),
            sin_addr: libc::in_addr { s_addr: 0 },
            sin_zero: [0; 8],
        };
        let ret = libc::bind(
            fd,
            &addr as *const _ as *const libc::sockaddr,
            std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
        );
        if ret < 0 {
            libc::close(fd);
            return Err(io::Error::last_os_error());
        }

        if libc::listen(fd, backlog) < 0 {
            libc::close(fd);
            return Err(io::Error::last_os_error());
        }

        Ok(TcpListener::from_raw_fd(fd))
    }
}

/// Handles a single already-accepted connection against `cache`, following
/// the same framing and error responses as a pooled worker. Exposed so the
/// wire protocol can be exercised directly with a plain `TcpListener`,
/// without going through the signal-driven lifecycle in [`run`].
pub fn serve_one(stream: &mut TcpStream, cache: &Cache) -> io::Result<()> {
    handle_connection(stream, cache)
}

/// Reads and discards whatever is left on `stream` until the client stops
/// sending (EOF) or the read timeout expires. Used before an error reply so
/// the kernel doesn't RST the connection over unread bytes and drop the
/// reply the client hasn't read yet.
fn drain(stream: &mut TcpStream) {
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => return,
            Ok(_) => continue,
            Err(ref e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                return
            }
            Err(_) => return,
        }
    }
}

fn handle_connection(stream: &mut TcpStream, cache: &Cache) -> io::Result<()> {
    stream.set_read_timeout(Some(SOCKET_TIMEOUT))?;
    stream.set_write_timeout(Some(SOCKET_TIMEOUT))?;

    let mut buf = [0u8; MAX_REQUEST_SIZE + 1];
    let n = match stream.read(&mut buf) {
        Ok(0) => return Ok(()),
        Ok(n) => n,
        Err(ref e) if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut => {
            return stream.write_all(b"Timeout.\n");
        }
        Err(e) => return Err(e),
    };

    if n > MAX_REQUEST_SIZE {
        drain(stream);
        return stream.write_all(b"Request is too long.\n");
    }

    let line = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return stream.write_all(b"Request is not valid.\n"),
    };

    let req = match Request::parse(line) {
        Some(req) => req,
        None => return stream.write_all(b"Request is not valid.\n"),
    };

    stream.write_all(respond(cache, &req).as_bytes())?;
    stream.write_all(b"\n")
}

/// Computes the protocol response body (without the trailing newline) for a
/// parsed request: a cache hit returns immediately, a miss computes the
/// digest, sleeps for the requested delay, then populates the cache. Split
/// out from socket handling so the cache/digest semantics can be exercised
/// directly.
pub fn respond(cache: &Cache, req: &Request) -> String {
    match cache.get(&req.msg) {
        Some(digest) => digest,
        None => {
            let digest = md5_hex(req.msg.as_bytes());
            if req.delay_ms > 0 {
                thread::sleep(Duration::from_millis(req.delay_ms));
            }
            cache.put(&req.msg, &digest);
            digest
        }
    }
}

fn worker_loop(queue: Arc<Queue<TcpStream>>, cache: Arc<Cache>) {
    while let Some(mut stream) = queue.pop_blocking() {
        if let Err(e) = handle_connection(&mut stream, &cache) {
            eprintln!("connection error: {e}");
        }
    }
}

/// Runs the server until a termination signal is received. Prints the
/// cache's contents most-recently-used first on shutdown, followed by a
/// farewell message.
pub fn run(config: ServerConfig) -> io::Result<()> {
    signal::install();

    let cache = Arc::new(Cache::new(config.cache_size));
    let queue = Arc::new(Queue::new());

    let listener = open_listener(config.port, config.cache_size as i32)?;

    let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(config.thread_count);
    for _ in 0..config.thread_count {
        let queue = Arc::clone(&queue);
        let cache = Arc::clone(&cache);
        workers.push(thread::spawn(move || worker_loop(queue, cache)));
    }

    loop {
        if signal::take_flush_requested() {
            cache.clear_and_reinit();
            println!("Done!");
        }

        if signal::is_terminating() {
            break;
        }

        match listener.accept() {
            Ok((stream, _addr)) => queue.push(stream),
            Err(ref e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                continue
            }
            Err(e) => {
                eprintln!("accept error: {e}");
                continue;
            }
        }
    }

    queue.shutdown();
    for worker in workers {
        let _ = worker.join();
    }

    for (key, value) in cache.snapshot_and_drain() {
        println!("Request: '{key}' with hash: '{value}'");
    }
    println!("Bye!");

    Ok(())
}
