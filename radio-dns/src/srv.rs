//! SRV record parsing
//!
//! DoH JSON answers carry SRV data in presentation format:
//! `"<priority> <weight> <port> <target>"`. Each answer is decoded on its
//! own into an [`AnswerOutcome`]; entries of other record types or with
//! garbled data are skipped and never fail the batch.

use std::fmt;
use std::str::FromStr;

use hickory_proto::rr::RecordType;
use serde_json::Value;
use thiserror::Error;

use crate::doh::RawAnswer;

/// Reasons an SRV data string cannot be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SrvParseError {
    /// The data string did not have exactly four fields
    #[error("expected 4 fields, found {0}")]
    WrongTokenCount(usize),

    /// Priority, weight or port is not an unsigned 16-bit integer
    #[error("invalid {field} '{value}'")]
    InvalidNumber {
        /// Which field failed to parse
        field: &'static str,
        /// The offending token
        value: String,
    },

    /// The target is empty once the root dot is removed
    #[error("empty target")]
    EmptyTarget,
}

/// A single SRV record as returned by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SrvRecord {
    target: String,
    port: u16,
    priority: u16,
    weight: u16,
}

impl SrvRecord {
    /// Create a record, removing a single trailing root dot from `target`
    pub fn new(
        target: impl Into<String>,
        port: u16,
        priority: u16,
        weight: u16,
    ) -> Result<Self, SrvParseError> {
        let target = target.into();
        let target = match target.strip_suffix('.') {
            Some(stripped) => stripped.to_string(),
            None => target,
        };

        if target.is_empty() {
            return Err(SrvParseError::EmptyTarget);
        }

        Ok(Self {
            target,
            port,
            priority,
            weight,
        })
    }

    /// Target host name, without the trailing dot
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Service port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Priority (lower is preferred)
    pub fn priority(&self) -> u16 {
        self.priority
    }

    /// Weight (higher is preferred among equal priority)
    pub fn weight(&self) -> u16 {
        self.weight
    }

    /// Base URL for this server
    ///
    /// The port is not part of the URL: the API is served on the default
    /// HTTPS port.
    pub fn base_url(&self) -> String {
        format!("https://{}", self.target)
    }
}

impl fmt::Display for SrvRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}.",
            self.priority, self.weight, self.port, self.target
        )
    }
}

impl FromStr for SrvRecord {
    type Err = SrvParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Runs of spaces collapse, as resolvers sometimes pad the fields
        let tokens: Vec<&str> = s.split(' ').filter(|t| !t.is_empty()).collect();
        if tokens.len() != 4 {
            return Err(SrvParseError::WrongTokenCount(tokens.len()));
        }

        let priority = parse_u16("priority", tokens[0])?;
        let weight = parse_u16("weight", tokens[1])?;
        let port = parse_u16("port", tokens[2])?;

        Self::new(tokens[3], port, priority, weight)
    }
}

fn parse_u16(field: &'static str, token: &str) -> Result<u16, SrvParseError> {
    token.parse::<u16>().map_err(|_| SrvParseError::InvalidNumber {
        field,
        value: token.to_string(),
    })
}

/// Why an answer entry was left out of the record batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// `type` is absent or not an unsigned 16-bit integer
    MissingType,
    /// The entry is a record of another type
    NotSrv(u16),
    /// `data` is absent or not a string
    MissingData,
    /// The SRV data string could not be parsed
    Malformed(SrvParseError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingType => write!(f, "missing record type"),
            SkipReason::NotSrv(t) => write!(f, "not an SRV record ({})", RecordType::from(*t)),
            SkipReason::MissingData => write!(f, "missing record data"),
            SkipReason::Malformed(e) => write!(f, "malformed SRV data: {}", e),
        }
    }
}

/// Result of decoding a single answer entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// A valid SRV record
    Record(SrvRecord),
    /// The entry was skipped
    Skipped(SkipReason),
}

/// Records decoded from one answer set, plus what was dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SrvBatch {
    /// Valid records, in answer order
    pub records: Vec<SrvRecord>,
    /// Entries that were skipped, in answer order
    pub skipped: Vec<SkipReason>,
}

impl SrvBatch {
    /// True when no usable record was found
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decode one DoH answer entry
pub fn decode_answer(answer: &RawAnswer) -> AnswerOutcome {
    let record_type = match answer
        .get("type")
        .and_then(Value::as_u64)
        .and_then(|t| u16::try_from(t).ok())
    {
        Some(t) => t,
        None => return AnswerOutcome::Skipped(SkipReason::MissingType),
    };

    if RecordType::from(record_type) != RecordType::SRV {
        return AnswerOutcome::Skipped(SkipReason::NotSrv(record_type));
    }

    let Some(data) = answer.get("data").and_then(Value::as_str) else {
        return AnswerOutcome::Skipped(SkipReason::MissingData);
    };

    match data.parse::<SrvRecord>() {
        Ok(record) => AnswerOutcome::Record(record),
        Err(e) => AnswerOutcome::Skipped(SkipReason::Malformed(e)),
    }
}

/// Decode every answer, keeping the SRV records in answer order
pub fn parse_answers(answers: &[RawAnswer]) -> SrvBatch {
    let mut batch = SrvBatch::default();

    for answer in answers {
        match decode_answer(answer) {
            AnswerOutcome::Record(record) => batch.records.push(record),
            AnswerOutcome::Skipped(reason) => {
                log::debug!("Skipping DNS answer: {}", reason);
                batch.skipped.push(reason);
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answer(value: Value) -> RawAnswer {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    fn srv(data: &str) -> RawAnswer {
        answer(json!({"name": "_api._tcp.radio-browser.info", "type": 33, "TTL": 300, "data": data}))
    }

    #[test]
    fn test_parse_srv_data() {
        let record: SrvRecord = "10 5 443 server1.example.org.".parse().unwrap();
        assert_eq!(record.priority(), 10);
        assert_eq!(record.weight(), 5);
        assert_eq!(record.port(), 443);
        assert_eq!(record.target(), "server1.example.org");
    }

    #[test]
    fn test_parse_strips_exactly_one_dot() {
        let record: SrvRecord = "1 1 80 host.example..".parse().unwrap();
        assert_eq!(record.target(), "host.example.");

        let record: SrvRecord = "1 1 80 host.example".parse().unwrap();
        assert_eq!(record.target(), "host.example");
    }

    #[test]
    fn test_parse_wrong_token_count() {
        assert_eq!(
            "10 5 443".parse::<SrvRecord>(),
            Err(SrvParseError::WrongTokenCount(3))
        );
        assert_eq!(
            "10 5 443 a.example. extra".parse::<SrvRecord>(),
            Err(SrvParseError::WrongTokenCount(5))
        );
        assert_eq!("".parse::<SrvRecord>(), Err(SrvParseError::WrongTokenCount(0)));
    }

    #[test]
    fn test_parse_invalid_numbers() {
        assert_eq!(
            "ten 5 443 a.example.".parse::<SrvRecord>(),
            Err(SrvParseError::InvalidNumber {
                field: "priority",
                value: "ten".into()
            })
        );
        assert!(matches!(
            "10 -1 443 a.example.".parse::<SrvRecord>(),
            Err(SrvParseError::InvalidNumber { field: "weight", .. })
        ));
        assert!(matches!(
            "10 5 70000 a.example.".parse::<SrvRecord>(),
            Err(SrvParseError::InvalidNumber { field: "port", .. })
        ));
    }

    #[test]
    fn test_parse_root_target_is_rejected() {
        assert_eq!("0 0 0 .".parse::<SrvRecord>(), Err(SrvParseError::EmptyTarget));
    }

    #[test]
    fn test_parse_collapses_repeated_spaces() {
        let record: SrvRecord = "10  5 443   a.example.".parse().unwrap();
        assert_eq!(record.priority(), 10);
        assert_eq!(record.weight(), 5);
        assert_eq!(record.target(), "a.example");
    }

    #[test]
    fn test_display_presentation_format() {
        let record = SrvRecord::new("a.example.", 443, 10, 5).unwrap();
        assert_eq!(record.to_string(), "10 5 443 a.example.");
    }

    #[test]
    fn test_base_url_omits_port() {
        let record = SrvRecord::new("de1.api.radio-browser.info.", 8443, 1, 1).unwrap();
        assert_eq!(record.base_url(), "https://de1.api.radio-browser.info");
    }

    #[test]
    fn test_decode_answer_outcomes() {
        assert!(matches!(
            decode_answer(&srv("10 5 443 a.example.")),
            AnswerOutcome::Record(_)
        ));
        assert_eq!(
            decode_answer(&answer(json!({"type": 1, "data": "1.2.3.4"}))),
            AnswerOutcome::Skipped(SkipReason::NotSrv(1))
        );
        assert_eq!(
            decode_answer(&answer(json!({"data": "10 5 443 a.example."}))),
            AnswerOutcome::Skipped(SkipReason::MissingType)
        );
        assert_eq!(
            decode_answer(&answer(json!({"type": "33", "data": "10 5 443 a.example."}))),
            AnswerOutcome::Skipped(SkipReason::MissingType)
        );
        assert_eq!(
            decode_answer(&answer(json!({"type": 33}))),
            AnswerOutcome::Skipped(SkipReason::MissingData)
        );
        assert_eq!(
            decode_answer(&answer(json!({"type": 33, "data": 7}))),
            AnswerOutcome::Skipped(SkipReason::MissingData)
        );
        assert_eq!(
            decode_answer(&srv("10 5 a.example.")),
            AnswerOutcome::Skipped(SkipReason::Malformed(SrvParseError::WrongTokenCount(3)))
        );
    }

    #[test]
    fn test_parse_answers_ignores_other_types() {
        let with_noise = vec![
            srv("10 5 443 server1.example.org."),
            answer(json!({"type": 1, "data": "1.2.3.4"})),
            answer(json!({"type": 5, "data": "alias.example.org."})),
            srv("10 20 443 server2.example.org."),
        ];
        let without_noise = vec![
            srv("10 5 443 server1.example.org."),
            srv("10 20 443 server2.example.org."),
        ];

        let noisy = parse_answers(&with_noise);
        let clean = parse_answers(&without_noise);

        assert_eq!(noisy.records, clean.records);
        assert_eq!(noisy.skipped.len(), 2);
        assert!(clean.skipped.is_empty());
    }

    #[test]
    fn test_parse_answers_skips_malformed_without_failing() {
        let answers = vec![
            srv("garbage"),
            srv("1 2 3 ok.example."),
            srv("x y z bad.example."),
            srv("4 5 6 also-ok.example"),
        ];

        let batch = parse_answers(&answers);
        let targets: Vec<&str> = batch.records.iter().map(|r| r.target()).collect();
        assert_eq!(targets, vec!["ok.example", "also-ok.example"]);
        assert_eq!(batch.skipped.len(), 2);
    }

    #[test]
    fn test_parse_answers_empty() {
        let batch = parse_answers(&[]);
        assert!(batch.is_empty());
        assert!(batch.skipped.is_empty());
    }
}
