// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors

use digestd::server::{self, ServerConfig};

const USAGE: &str = "usage: digestd -p <port> -C <cache_size> [-t <threads>]\n\
\n\
  -p <port>         TCP port to listen on (required)\n\
  -C <cache_size>   number of entries the LRU cache holds (required)\n\
  -t <threads>      number of worker threads (default: 8)\n\
  -h                print this message\n";

const DEFAULT_THREAD_COUNT: usize = 8;

fn fail(msg: &str) -> ! {
    eprintln!("{msg}");
    eprint!("{USAGE}");
    std::process::exit(1);
}

fn parse_positive(flag: &str, value: &str) -> usize {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => fail(&format!("invalid value for {flag}: {value}")),
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut port: Option<u16> = None;
    let mut cache_size: Option<usize> = None;
    let mut thread_count: Option<usize> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" => {
                print!("{USAGE}");
                std::process::exit(0);
            }
            "-p" => {
                let value = args.get(i + 1).unwrap_or_else(|| fail("-p requires a value"));
                port = Some(match value.parse::<u16>() {
                    Ok(n) if n > 0 => n,
                    _ => fail(&format!("invalid value for -p: {value}")),
                });
                i += 2;
            }
            "-C" => {
                let value = args.get(i + 1).unwrap_or_else(|| fail("-C requires a value"));
                cache_size = Some(parse_positive("-C", value));
                i += 2;
            }
            "-t" => {
                let value = args.get(i + 1).unwrap_or_else(|| fail("-t requires a value"));
                thread_count = Some(parse_positive("-t", value));
                i += 2;
            }
            other => fail(&format!("unrecognized argument: {other}")),
        }
    }

    let port = port.unwrap_or_else(|| fail("missing required argument: -p"));
    let cache_size = cache_size.unwrap_or_else(|| fail("missing required argument: -C"));
    let thread_count = match thread_count {
        Some(n) if n < 1000 => n,
        _ => DEFAULT_THREAD_COUNT,
    };

    let config = ServerConfig {
        port,
        cache_size,
        thread_count,
    };

    if let Err(e) = server::run(config) {
        eprintln!("fatal: {e}");
        std::process::exit(1);
    }
}
