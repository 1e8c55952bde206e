use crate::config::Shared;
use crate::error::Error;
use crate::store::DynStore;
use std::str::FromStr;
use time::{Date, OffsetDateTime};
use tracing::{debug, error, info, warn};
use trust_dns_proto::rr::rdata::SOA;
use trust_dns_server::authority::{MessageRequest, MessageResponseBuilder};
use trust_dns_server::client::op::{Header, LowerQuery, MessageType, OpCode, ResponseCode};
use trust_dns_server::client::rr::rdata::TXT;
use trust_dns_server::client::rr::{Name, RData, Record, RecordType};
use trust_dns_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};

/// TTL of challenge `TXT` answers. Resolvers must re-query rather than cache a challenge that
/// is about to change.
pub const SHORT_TTL: u32 = 1;
/// TTL of `NS` and `SOA` answers, and the SOA minimum TTL.
pub const LONG_TTL: u32 = 86_400;
pub const SOA_REFRESH: i32 = 14_400;
pub const SOA_RETRY: i32 = 3_600;
pub const SOA_EXPIRE: i32 = 604_800;
const MBOX_PREFIX: &str = "admin.";

/// The outcome of answering a query, before it is encoded.
#[derive(Debug, Clone)]
pub struct Answer {
    pub response_code: ResponseCode,
    pub authoritative: bool,
    pub records: Vec<Record>,
}

impl Answer {
    fn refused() -> Self {
        Self {
            response_code: ResponseCode::Refused,
            authoritative: false,
            records: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct Handler {
    root: String,
    public: Name,
    mbox: Name,
    serial: Option<u32>,
    store: DynStore,
}

/// A lowercase, fully qualified form of `domain`.
#[must_use]
pub fn fqdn(domain: &str) -> String {
    let domain = domain.to_ascii_lowercase();
    if domain.ends_with('.') {
        domain
    } else {
        format!("{domain}.")
    }
}

/// The zone serial for `date`, as `YYYYMMDD`.
#[must_use]
pub fn date_serial(date: Date) -> u32 {
    date.year().unsigned_abs() * 10_000
        + u32::from(u8::from(date.month())) * 100
        + u32::from(date.day())
}

impl Handler {
    /// Create a handler answering for the configured root domain, reading challenges from
    /// `store`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DNSError`] if the configured public domain isn't a valid DNS name.
    pub fn new(config: &Shared, store: DynStore) -> Result<Self, Error> {
        let public = fqdn(&config.public);
        Ok(Handler {
            root: fqdn(&config.root),
            mbox: Name::from_str(&format!("{MBOX_PREFIX}{public}"))?,
            public: Name::from_str(&public)?,
            serial: config.serial,
            store,
        })
    }

    /// The root domain this handler is authoritative for, as a lowercase FQDN.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    async fn dispatch_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let answer = self.answer_message(request).await;
        let builder = MessageResponseBuilder::from_message_request(request);
        if answer.response_code == ResponseCode::Refused {
            return Ok(response_handle
                .send_response(builder.error_msg(request.header(), ResponseCode::Refused))
                .await?);
        }

        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(answer.authoritative);
        header.set_recursion_available(false);
        header.set_response_code(answer.response_code);
        // The encoder always compresses names; there is no switch to turn it off.
        let response = builder.build(header, answer.records.iter(), &[], &[], &[]);
        Ok(response_handle.send_response(response).await?)
    }

    /// Answer a decoded request. Anything but a query message is refused.
    pub async fn answer_message(&self, request: &MessageRequest) -> Answer {
        if request.message_type() != MessageType::Query {
            warn!("received {:?} message", request.message_type());
            return Answer::refused();
        }
        self.answer(request.op_code(), std::slice::from_ref(request.query()))
            .await
    }

    /// Answer every question in a query. Questions that can't be answered contribute no
    /// records; the response code is `NXDOMAIN` when no question was answered.
    pub async fn answer(&self, op_code: OpCode, queries: &[LowerQuery]) -> Answer {
        if op_code != OpCode::Query {
            warn!("received invalid operation {op_code:?}");
            return Answer::refused();
        }

        let mut records = Vec::new();
        for query in queries {
            let name = Name::from(query.name());
            let domain = name.to_ascii().to_ascii_lowercase();
            let record = match query.query_type() {
                RecordType::TXT => self.txt_record(name, &domain).await,
                RecordType::NS => self.ns_record(name, &domain),
                RecordType::SOA => self.soa_record(name, &domain),
                other => {
                    warn!("received unsupported question type {other} for \"{domain}\"");
                    None
                }
            };
            records.extend(record);
        }

        let response_code = if records.is_empty() {
            ResponseCode::NXDomain
        } else {
            ResponseCode::NoError
        };
        Answer {
            response_code,
            authoritative: true,
            records,
        }
    }

    /// Split `<label>.<cid>.<root>` into its label and CID. Any other shape is invalid.
    fn txt_name<'a>(&self, domain: &'a str) -> Option<(&'a str, &'a str)> {
        let mut parts = domain.splitn(3, '.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(label), Some(cid), Some(root)) if root == self.root => Some((label, cid)),
            _ => None,
        }
    }

    /// Whether `domain` is the root domain or at most two labels below it.
    fn in_zone(&self, domain: &str) -> bool {
        let mut rest = domain;
        for _ in 0..=2 {
            if rest == self.root {
                return true;
            }
            match rest.split_once('.') {
                Some((_, parent)) => rest = parent,
                None => return false,
            }
        }
        false
    }

    async fn txt_record(&self, name: Name, domain: &str) -> Option<Record> {
        let Some((label, cid)) = self.txt_name(domain) else {
            warn!("received TXT query for invalid name \"{domain}\"");
            return None;
        };
        match self.store.get_challenge(cid, label).await {
            Some(challenge) => {
                info!(
                    "answering TXT query for CID \"{cid}\" and domain \"{label}\" with \"{challenge}\""
                );
                Some(Record::from_rdata(
                    name,
                    SHORT_TTL,
                    RData::TXT(TXT::new(vec![challenge])),
                ))
            }
            None => {
                warn!("received TXT query for unknown CID \"{cid}\" and domain \"{label}\"");
                None
            }
        }
    }

    fn ns_record(&self, name: Name, domain: &str) -> Option<Record> {
        if !self.in_zone(domain) {
            warn!("received NS query for invalid name \"{domain}\"");
            return None;
        }
        info!("answering NS query for \"{domain}\" with \"{}\"", self.public);
        Some(Record::from_rdata(
            name,
            LONG_TTL,
            RData::NS(self.public.clone()),
        ))
    }

    fn soa_record(&self, name: Name, domain: &str) -> Option<Record> {
        if !self.in_zone(domain) {
            warn!("received SOA query for invalid name \"{domain}\"");
            return None;
        }
        let serial = self
            .serial
            .unwrap_or_else(|| date_serial(OffsetDateTime::now_utc().date()));
        debug!("answering SOA query for \"{domain}\" with serial {serial}");
        // Refresh/retry/expire follow RIPE 203[0].
        // [0]: https://www.ripe.net/publications/docs/ripe-203
        let soa_rdata = RData::SOA(SOA::new(
            self.public.clone(),
            self.mbox.clone(),
            serial,
            SOA_REFRESH, // 4 hours.
            SOA_RETRY,   // 1 hour.
            SOA_EXPIRE,  // 7 days.
            LONG_TTL,    // 24 hrs.
        ));
        Some(Record::from_rdata(name, LONG_TTL, soa_rdata))
    }
}

#[async_trait::async_trait]
impl RequestHandler for Handler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> ResponseInfo {
        match self.dispatch_request(request, response_handle).await {
            Ok(info) => info,
            Err(error) => {
                error!("error in RequestHandler: {:?}", error);
                let mut header = Header::new();
                header.set_response_code(ResponseCode::ServFail);
                header.into()
            }
        }
    }
}
