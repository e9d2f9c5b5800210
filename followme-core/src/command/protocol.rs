// File: followme-core/src/command/protocol.rs
//! One request per line: a four-letter vocab tag, then optional arguments.
//! One reply per line: `ok`, `true`/`false`, a number, a JSON object or
//! `fail <reason>`.

use std::fmt;
use std::str::FromStr;
use followme_common::models::{FollowMeStatus, Vocab};
use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub vocab: Vocab,
    pub args: String,
}

impl RpcRequest {
    pub fn new(vocab: Vocab) -> Self {
        Self { vocab, args: String::new() }
    }

    pub fn with_args(vocab: Vocab, args: &str) -> Self {
        Self { vocab, args: args.to_string() }
    }

    pub fn parse(line: &str) -> Result<Self, Error> {
        let line = line.trim();
        if line.is_empty() {
            return Err(Error::Protocol("empty request".into()));
        }

        let (tag, args) = match line.split_once(char::is_whitespace) {
            Some((tag, rest)) => (tag, rest.trim()),
            None => (line, ""),
        };
        let vocab = tag.parse::<Vocab>().map_err(Error::Protocol)?;

        match (vocab, args.is_empty()) {
            (Vocab::Hear, true) => Err(Error::Protocol("hear needs the recognized text".into())),
            (Vocab::Hear, false) => Ok(Self::with_args(vocab, args)),
            (_, true) => Ok(Self::new(vocab)),
            (_, false) => Err(Error::Protocol(format!("{} takes no arguments", vocab))),
        }
    }
}

impl FromStr for RpcRequest {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RpcRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.vocab)
        } else {
            write!(f, "{} {}", self.vocab, self.args)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RpcReply {
    Ok,
    Bool(bool),
    Angle(f64),
    Status(FollowMeStatus),
    Fail(String),
}

impl fmt::Display for RpcReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcReply::Ok => write!(f, "ok"),
            RpcReply::Bool(b) => write!(f, "{}", b),
            RpcReply::Angle(a) => write!(f, "{}", a),
            RpcReply::Status(status) => match serde_json::to_string(status) {
                Ok(json) => write!(f, "{}", json),
                Err(e) => write!(f, "fail {}", e),
            },
            RpcReply::Fail(reason) => write!(f, "fail {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_hear_requests() {
        assert_eq!(RpcRequest::parse("salu\n").unwrap(), RpcRequest::new(Vocab::Salute));
        assert_eq!(RpcRequest::parse("  GEPS ").unwrap().vocab, Vocab::GetEncoderPosition);

        let hear = RpcRequest::parse("hear please follow me").unwrap();
        assert_eq!(hear.vocab, Vocab::Hear);
        assert_eq!(hear.args, "please follow me");
        assert_eq!(hear.to_string(), "hear please follow me");
    }

    #[test]
    fn test_malformed_requests_are_refused() {
        assert!(matches!(RpcRequest::parse(""), Err(Error::Protocol(_))));
        assert!(matches!(RpcRequest::parse("wave"), Err(Error::Protocol(_))));
        assert!(matches!(RpcRequest::parse("hear"), Err(Error::Protocol(_))));
        assert!(matches!(RpcRequest::parse("stop now"), Err(Error::Protocol(_))));
    }

    #[test]
    fn test_reply_lines() {
        assert_eq!(RpcReply::Ok.to_string(), "ok");
        assert_eq!(RpcReply::Bool(false).to_string(), "false");
        assert_eq!(RpcReply::Angle(-12.5).to_string(), "-12.5");
        assert_eq!(RpcReply::Fail("nope".into()).to_string(), "fail nope");
    }
}
