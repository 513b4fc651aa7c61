// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors

/// Largest request body accepted, in bytes. One more byte than this is
/// the oversize rejection threshold.
pub const MAX_REQUEST_SIZE: usize = 4096;

/// Upper bound on the delay a client may request, in milliseconds. A
/// request above this is rejected rather than honored, so a hostile client
/// can't occupy a worker thread indefinitely.
pub const MAX_DELAY_MS: u64 = 60_000;

/// A parsed `get <msg> <delay_ms>` request.
#[derive(Debug, PartialEq, Eq)]
pub struct Request {
    pub msg: String,
    pub delay_ms: u64,
}

impl Request {
    /// Parses `line` as exactly three whitespace-separated tokens: the
    /// literal `get`, a message, and an unsigned decimal delay in
    /// milliseconds no greater than [`MAX_DELAY_MS`].
    pub fn parse(line: &str) -> Option<Request> {
        let mut tokens = line.trim_end_matches(['\n', '\r']).split(' ');
        let verb = tokens.next()?;
        let msg = tokens.next()?;
        let delay = tokens.next()?;
        if tokens.next().is_some() {
            return None;
        }
        if verb != "get" || msg.is_empty() {
            return None;
        }
        let delay_ms: u64 = delay.parse().ok()?;
        if delay_ms > MAX_DELAY_MS {
            return None;
        }
        Some(Request {
            msg: msg.to_string(),
            delay_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_request() {
        let req = Request::parse("get hello 0\n").unwrap();
        assert_eq!(req.msg, "hello");
        assert_eq!(req.delay_ms, 0);
    }

    #[test]
    fn rejects_wrong_verb() {
        assert_eq!(Request::parse("put foo 0\n"), None);
    }

    #[test]
    fn rejects_too_few_tokens() {
        assert_eq!(Request::parse("get foo\n"), None);
    }

    #[test]
    fn rejects_too_many_tokens() {
        assert_eq!(Request::parse("get foo bar 0\n"), None);
    }

    #[test]
    fn rejects_empty_message() {
        assert_eq!(Request::parse("get  0\n"), None);
    }

    #[test]
    fn rejects_non_numeric_delay() {
        assert_eq!(Request::parse("get foo soon\n"), None);
    }

    #[test]
    fn rejects_negative_delay() {
        assert_eq!(Request::parse("get foo -1\n"), None);
    }

    #[test]
    fn rejects_delay_over_bound() {
        assert_eq!(Request::parse("get foo 60001\n"), None);
    }

    #[test]
    fn accepts_delay_at_bound() {
        let req = Request::parse("get foo 60000\n").unwrap();
        assert_eq!(req.delay_ms, 60_000);
    }
}
