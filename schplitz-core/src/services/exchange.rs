//! Exchange service - build and read share envelopes
//!
//! Export: ledger -> v3 inner payload -> encrypt -> envelope -> token -> URL,
//! falling back to pretty JSON text when the URL would be too long.
//! Import: URL / token / raw JSON -> envelope (version dispatch) -> decrypt
//! with the recipient's answer -> validate every record.

use serde::Serialize;
use serde_json::Value as JsonValue;
use url::Url;

use crate::config::Config;
use crate::domain::expense::{parse_record, CompactExpense};
use crate::domain::result::{Error, Result};
use crate::domain::{
    Envelope, EnvelopeV1, EnvelopeV2, EnvelopeV3, Expense, PayloadV3, ShareStatus,
};

use super::{crypto, transport};

/// Fragment key carrying the token in share links
pub const SHARE_FRAGMENT_KEY: &str = "share";

/// Link prefix when none is configured
pub const DEFAULT_SHARE_BASE_URL: &str = "https://schplitz.app/";

/// Default bound on the full share URL length
pub const DEFAULT_MAX_URL_LENGTH: usize = 8000;

/// Everything needed to produce an outbound envelope
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub entries: Vec<Expense>,
    pub question: String,
    /// Raw or normalized; normalized again before use
    pub answer: String,
    pub names: [String; 2],
    pub status: ShareStatus,
}

/// What an export produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ShareArtifact {
    /// A link with the token in its `#share=` fragment
    Url(String),
    /// Raw envelope JSON, used when the link would be too long
    Text(String),
}

impl ShareArtifact {
    pub fn as_str(&self) -> &str {
        match self {
            ShareArtifact::Url(s) | ShareArtifact::Text(s) => s,
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, ShareArtifact::Url(_))
    }
}

/// A decrypted, validated inbound share
#[derive(Debug, Clone, Serialize)]
pub struct DecodedShare {
    pub version: u64,
    pub question: Option<String>,
    pub names: Option<[String; 2]>,
    pub status: Option<ShareStatus>,
    pub entries: Vec<Expense>,
}

/// Pasted or uploaded import text, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareInput {
    Json(String),
    Token(String),
}

impl ShareInput {
    /// Classify import text: raw envelope JSON, a full share URL, a
    /// `#share=` fragment, or a bare token.
    pub fn detect(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("Nothing to import"));
        }
        if trimmed.starts_with('{') {
            return Ok(ShareInput::Json(trimmed.to_string()));
        }

        // Links without a scheme, or pasted inside a longer message
        let marker = format!("#{}=", SHARE_FRAGMENT_KEY);
        if let Some(pos) = trimmed.find(&marker) {
            let token: String = trimmed[pos + marker.len()..]
                .chars()
                .take_while(|c| *c != '&' && !c.is_whitespace())
                .collect();
            if token.is_empty() {
                return Err(Error::validation("Link does not contain shared data"));
            }
            return Ok(ShareInput::Token(token));
        }

        if let Ok(url) = Url::parse(trimmed) {
            let token = url
                .fragment()
                .and_then(token_from_fragment)
                .ok_or_else(|| Error::validation("Link does not contain shared data"))?;
            return Ok(ShareInput::Token(token));
        }

        let fragment = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if let Some(token) = token_from_fragment(fragment) {
            return Ok(ShareInput::Token(token));
        }
        Ok(ShareInput::Token(fragment.to_string()))
    }

    /// Turn the input into an envelope, decompressing tokens first
    pub fn into_envelope(self) -> Result<Envelope> {
        match self {
            ShareInput::Json(text) => Envelope::from_str_json(&text),
            ShareInput::Token(token) => {
                let bytes = transport::from_token(&token)?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| Error::malformed("Shared data is not text"))?;
                Envelope::from_str_json(&text)
            }
        }
    }
}

fn token_from_fragment(fragment: &str) -> Option<String> {
    url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == SHARE_FRAGMENT_KEY)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Question of a share, without decrypting it. `None` for v1 envelopes.
pub fn peek_question(input: &str) -> Result<Option<String>> {
    let envelope = ShareInput::detect(input)?.into_envelope()?;
    Ok(envelope.question().map(str::to_string))
}

/// Builds and reads share envelopes
#[derive(Debug, Clone)]
pub struct ExchangeService {
    share_base_url: String,
    max_url_length: usize,
}

impl ExchangeService {
    pub fn new(share_base_url: impl Into<String>, max_url_length: usize) -> Self {
        Self {
            share_base_url: share_base_url.into(),
            max_url_length,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.share_base_url.clone(), config.max_url_length)
    }

    /// Build the current-version envelope for a ledger
    pub fn build_envelope(&self, request: &ExportRequest) -> Result<Envelope> {
        if request.entries.is_empty() {
            return Err(Error::validation("Nothing to export yet"));
        }
        let question = request.question.trim();
        if question.is_empty() {
            return Err(Error::validation("A security question is required"));
        }
        let answer = crypto::normalize_answer(&request.answer);
        if answer.is_empty() {
            return Err(Error::validation("An answer is required"));
        }
        let names = [
            request.names[0].trim().to_string(),
            request.names[1].trim().to_string(),
        ];
        if names.iter().any(String::is_empty) {
            return Err(Error::validation("Both participant names are required"));
        }
        if let Some(stray) = request.entries.iter().find(|e| !names.contains(&e.paid_by)) {
            return Err(Error::validation(format!(
                "'{}' was paid by {}, who is neither {} nor {}",
                stray.description, stray.paid_by, names[0], names[1]
            )));
        }

        let payload = PayloadV3 {
            e: request.entries.iter().map(Expense::to_compact).collect(),
            s: request.status,
        };
        let plaintext = serde_json::to_vec(&payload)?;
        let encrypted = crypto::encrypt(&plaintext, &answer)?;

        Ok(Envelope::V3(EnvelopeV3 {
            question: question.to_string(),
            names,
            status: request.status,
            encrypted,
        }))
    }

    /// Wrap an envelope as a share link, or as text if the link is too long
    pub fn package(&self, envelope: &Envelope) -> Result<ShareArtifact> {
        let json = envelope.to_json();
        let token = transport::to_token(serde_json::to_string(&json)?.as_bytes())?;
        let url = format!("{}#{}={}", self.share_base_url, SHARE_FRAGMENT_KEY, token);

        if url.len() > self.max_url_length {
            return Ok(ShareArtifact::Text(serde_json::to_string_pretty(&json)?));
        }
        Ok(ShareArtifact::Url(url))
    }

    /// Encrypt a ledger and package it for sharing
    pub fn export(&self, request: &ExportRequest) -> Result<ShareArtifact> {
        let envelope = self.build_envelope(request)?;
        self.package(&envelope)
    }

    /// Decode, decrypt and validate an inbound share.
    ///
    /// Nothing here touches a ledger; merging is up to the caller.
    pub fn import(&self, input: &str, answer: &str) -> Result<DecodedShare> {
        let envelope = ShareInput::detect(input)?.into_envelope()?;
        decode_envelope(&envelope, answer)
    }

    /// [`Self::export`] off the async executor
    pub async fn export_async(&self, request: ExportRequest) -> Result<ShareArtifact> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.export(&request))
            .await
            .map_err(|e| Error::validation(format!("Export task failed: {}", e)))?
    }

    /// [`Self::import`] off the async executor
    pub async fn import_async(&self, input: String, answer: String) -> Result<DecodedShare> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.import(&input, &answer))
            .await
            .map_err(|_| Error::AuthFailure)?
    }
}

/// Decrypt and validate an envelope with one decoder per version
pub fn decode_envelope(envelope: &Envelope, answer: &str) -> Result<DecodedShare> {
    match envelope {
        Envelope::V1(e) => decode_v1(e, answer),
        Envelope::V2(e) => decode_v2(e, answer),
        Envelope::V3(e) => decode_v3(e, answer),
    }
}

fn decrypt_json(blob: &str, key_input: &str) -> Result<JsonValue> {
    let plaintext = crypto::decrypt(blob, key_input)?;
    serde_json::from_slice(&plaintext)
        .map_err(|_| Error::malformed("Decrypted data is not valid JSON"))
}

fn validate_all(records: impl Iterator<Item = JsonValue>) -> Result<Vec<Expense>> {
    records
        .enumerate()
        .map(|(index, record)| {
            parse_record(&record).map_err(|reason| Error::InvalidExpense { index, reason })
        })
        .collect()
}

// v1 and v2 predate answer normalization; their keys came from the answer
// with only surrounding whitespace removed.
fn decode_v1(envelope: &EnvelopeV1, answer: &str) -> Result<DecodedShare> {
    let inner = decrypt_json(&envelope.encrypted, answer.trim())?;
    let records = inner
        .get("expenses")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| Error::malformed("Invalid v1 data format"))?;
    let entries = validate_all(records.iter().cloned())?;

    Ok(DecodedShare {
        version: 1,
        question: None,
        names: None,
        status: None,
        entries,
    })
}

fn decode_v2(envelope: &EnvelopeV2, answer: &str) -> Result<DecodedShare> {
    let inner = decrypt_json(&envelope.encrypted, answer.trim())?;
    let records = inner
        .as_array()
        .ok_or_else(|| Error::malformed("Invalid data format"))?;
    let entries = validate_all(records.iter().map(CompactExpense::expand_value))?;

    Ok(DecodedShare {
        version: 2,
        question: Some(envelope.question.clone()),
        names: None,
        status: None,
        entries,
    })
}

fn decode_v3(envelope: &EnvelopeV3, answer: &str) -> Result<DecodedShare> {
    let inner = decrypt_json(&envelope.encrypted, &crypto::normalize_answer(answer))?;
    let records = inner
        .get("e")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| Error::malformed("Invalid v3 data format"))?;
    let status = match inner.get("s") {
        Some(s) => serde_json::from_value::<ShareStatus>(s.clone())
            .map_err(|_| Error::malformed("Invalid status in payload"))?,
        None => envelope.status,
    };
    let entries = validate_all(records.iter().map(CompactExpense::expand_value))?;

    if let Some(index) = entries
        .iter()
        .position(|e| !envelope.names.contains(&e.paid_by))
    {
        return Err(Error::InvalidExpense {
            index,
            reason: format!("Unknown payer: {}", entries[index].paid_by),
        });
    }

    Ok(DecodedShare {
        version: 3,
        question: Some(envelope.question.clone()),
        names: Some(envelope.names.clone()),
        status: Some(status),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Currency;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn expense(id: &str, paid_by: &str, cents: i64) -> Expense {
        Expense {
            id: id.to_string(),
            description: format!("Expense {}", id),
            amount: Decimal::new(cents, 2),
            currency: Currency::Eur,
            paid_by: paid_by.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    fn request(entries: Vec<Expense>) -> ExportRequest {
        ExportRequest {
            entries,
            question: "Where did we meet?".to_string(),
            answer: "Lisbon Airport".to_string(),
            names: ["Ana".to_string(), "Ben".to_string()],
            status: ShareStatus::AlmostDone,
        }
    }

    fn service() -> ExchangeService {
        ExchangeService::new("https://schplitz.app/", DEFAULT_MAX_URL_LENGTH)
    }

    #[test]
    fn test_detect_inputs() {
        assert_eq!(
            ShareInput::detect("  {\"v\":3}  ").unwrap(),
            ShareInput::Json("{\"v\":3}".to_string())
        );
        assert_eq!(
            ShareInput::detect("https://schplitz.app/#share=abc_-1").unwrap(),
            ShareInput::Token("abc_-1".to_string())
        );
        assert_eq!(
            ShareInput::detect("#share=tok").unwrap(),
            ShareInput::Token("tok".to_string())
        );
        assert_eq!(
            ShareInput::detect("share=tok&x=1").unwrap(),
            ShareInput::Token("tok".to_string())
        );
        assert_eq!(
            ShareInput::detect("rawtoken\n").unwrap(),
            ShareInput::Token("rawtoken".to_string())
        );
        assert_eq!(
            ShareInput::detect("schplitz.app/#share=abc").unwrap(),
            ShareInput::Token("abc".to_string())
        );
        assert_eq!(
            ShareInput::detect("Here is my link: https://schplitz.app/#share=abc&ref=1 see you").unwrap(),
            ShareInput::Token("abc".to_string())
        );
        assert_eq!(
            ShareInput::detect("https://schplitz.app/#share=abc\nthanks!").unwrap(),
            ShareInput::Token("abc".to_string())
        );
        assert!(ShareInput::detect("https://schplitz.app/#share=").is_err());
        assert!(ShareInput::detect("https://schplitz.app/").is_err());
        assert!(ShareInput::detect("   ").is_err());
    }

    #[test]
    fn test_export_produces_url_that_imports() {
        let entries = vec![expense("1", "Ana", 1250), expense("2", "Ben", 800)];
        let artifact = service().export(&request(entries.clone())).unwrap();
        assert!(artifact.is_url());
        assert!(artifact.as_str().starts_with("https://schplitz.app/#share="));

        let decoded = service().import(artifact.as_str(), "lisbonairport").unwrap();
        assert_eq!(decoded.version, 3);
        assert_eq!(decoded.entries, entries);
        assert_eq!(decoded.status, Some(ShareStatus::AlmostDone));
        assert_eq!(decoded.question.as_deref(), Some("Where did we meet?"));
    }

    #[test]
    fn test_answer_formatting_does_not_matter() {
        let artifact = service().export(&request(vec![expense("1", "Ana", 100)])).unwrap();
        assert!(service().import(artifact.as_str(), "  LISBON airport ").is_ok());
        assert!(matches!(
            service().import(artifact.as_str(), "Porto"),
            Err(Error::AuthFailure)
        ));
    }

    #[test]
    fn test_oversized_export_falls_back_to_text() {
        let small_bound = ExchangeService::new("https://schplitz.app/", 200);
        let entries: Vec<Expense> = (0..20).map(|i| expense(&i.to_string(), "Ana", 100 + i)).collect();

        let artifact = small_bound.export(&request(entries.clone())).unwrap();
        let ShareArtifact::Text(text) = &artifact else {
            panic!("expected text fallback, got {:?}", artifact);
        };
        let value: JsonValue = serde_json::from_str(text).unwrap();
        assert_eq!(value["v"], json!(3));

        let decoded = small_bound.import(text, "Lisbon Airport").unwrap();
        assert_eq!(decoded.entries.len(), entries.len());
    }

    #[test]
    fn test_export_requires_inputs() {
        assert!(matches!(service().export(&request(vec![])), Err(Error::Validation(_))));

        let mut req = request(vec![expense("1", "Ana", 100)]);
        req.answer = "   ".to_string();
        assert!(matches!(service().export(&req), Err(Error::Validation(_))));

        let mut req = request(vec![expense("1", "Ana", 100)]);
        req.question = String::new();
        assert!(matches!(service().export(&req), Err(Error::Validation(_))));
    }

    #[test]
    fn test_export_rejects_stray_payer() {
        let req = request(vec![expense("1", "Ana", 100), expense("2", "Cid", 100)]);
        assert!(matches!(service().export(&req), Err(Error::Validation(_))));
    }

    #[test]
    fn test_v3_import_rejects_unknown_payer() {
        let inner = json!({ "e": [
            { "i": "1", "d": "Ok", "a": 1, "c": "EUR", "p": "Ana", "t": "2024-01-01" },
            { "i": "2", "d": "Stray", "a": 1, "c": "EUR", "p": "Cid", "t": "2024-01-01" }
        ], "s": "done" });
        let blob = crypto::encrypt(inner.to_string().as_bytes(), "pw").unwrap();
        let text = json!({
            "v": 3, "question": "q", "names": ["Ana", "Ben"], "status": "done", "encrypted": blob
        })
        .to_string();

        let err = service().import(&text, "PW").unwrap_err();
        assert!(matches!(err, Error::InvalidExpense { index: 1, .. }));
    }

    #[test]
    fn test_decodes_legacy_v2() {
        let inner = json!([{ "i": "x1", "d": "Taxi", "a": 12.5, "c": "USD", "p": "Ben", "t": "2023-09-10" }]);
        let blob = crypto::encrypt(inner.to_string().as_bytes(), "Secret Word").unwrap();
        let text = json!({ "question": "Word?", "encrypted": blob, "v": 2 }).to_string();

        let decoded = service().import(&text, "  Secret Word ").unwrap();
        assert_eq!(decoded.version, 2);
        assert_eq!(decoded.entries[0].id, "x1");
        assert_eq!(decoded.entries[0].amount, Decimal::new(125, 1));
        assert_eq!(decoded.status, None);
    }

    #[test]
    fn test_decodes_legacy_v1() {
        let inner = json!({ "expenses": [{
            "id": "old", "description": "Hotel", "amount": 200,
            "currency": "NOK", "paidBy": "Someone Else", "date": "2022-12-24"
        }]});
        let blob = crypto::encrypt(inner.to_string().as_bytes(), "pw").unwrap();
        let text = json!({ "v": 1, "encrypted": blob }).to_string();

        let decoded = service().import(&text, "pw").unwrap();
        assert_eq!(decoded.version, 1);
        assert_eq!(decoded.entries[0].paid_by, "Someone Else");
    }

    #[test]
    fn test_inner_list_must_be_array() {
        let blob = crypto::encrypt(br#"{"expenses": {"not": "a list"}}"#, "pw").unwrap();
        let text = json!({ "v": 1, "encrypted": blob }).to_string();
        assert!(matches!(service().import(&text, "pw"), Err(Error::MalformedPayload(_))));

        let blob = crypto::encrypt(br#"{"e": "nope", "s": "done"}"#, "pw").unwrap();
        let text = json!({ "v": 3, "question": "q", "names": ["A", "B"], "status": "done", "encrypted": blob }).to_string();
        assert!(matches!(service().import(&text, "pw"), Err(Error::MalformedPayload(_))));
    }

    #[test]
    fn test_reports_index_of_invalid_record() {
        let inner = json!([
            { "i": "ok", "d": "Fine", "a": 1, "c": "EUR", "p": "A", "t": "2024-01-01" },
            { "i": "bad", "d": "Broken", "a": -5, "c": "EUR", "p": "A", "t": "2024-01-01" }
        ]);
        let blob = crypto::encrypt(inner.to_string().as_bytes(), "pw").unwrap();
        let text = json!({ "v": 2, "question": "q", "encrypted": blob }).to_string();

        match service().import(&text, "pw") {
            Err(Error::InvalidExpense { index, reason }) => {
                assert_eq!(index, 1);
                assert_eq!(reason, "Invalid expense amount");
            }
            other => panic!("expected invalid expense, got {:?}", other),
        }
    }

    #[test]
    fn test_link_inside_message_imports() {
        let artifact = service().export(&request(vec![expense("1", "Ana", 100)])).unwrap();
        let message = format!("Hi Ben! Our trip: {}\nSee you soon", artifact.as_str());
        let decoded = service().import(&message, "lisbon airport").unwrap();
        assert_eq!(decoded.entries.len(), 1);

        let schemeless = artifact.as_str().trim_start_matches("https://");
        assert!(service().import(schemeless, "lisbon airport").is_ok());
    }

    #[test]
    fn test_garbage_token_is_transport_error() {
        let err = service().import("https://schplitz.app/#share=%%%%", "pw").unwrap_err();
        assert!(err.is_opaque());
    }

    #[test]
    fn test_peek_question() {
        let artifact = service().export(&request(vec![expense("1", "Ana", 100)])).unwrap();
        assert_eq!(
            peek_question(artifact.as_str()).unwrap().as_deref(),
            Some("Where did we meet?")
        );
        let v1 = json!({ "v": 1, "encrypted": "abc" }).to_string();
        assert_eq!(peek_question(&v1).unwrap(), None);
    }
}
