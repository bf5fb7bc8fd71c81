use super::config::LookupConfig;
use super::lookup::{CompoundLookup, LookupError, Namespace};
use crate::core::models::ids::Cid;
use crate::core::models::molecule::MoleculeRecord;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

const RECORD_PROPERTIES: &str = "MolecularWeight,IsomericSMILES,IUPACName,Title";
const NOT_FOUND_FAULT: &str = "PUGREST.NotFound";
const BAD_REQUEST_FAULT: &str = "PUGREST.BadRequest";

/// A [`CompoundLookup`] backed by the PubChem PUG-REST service.
///
/// Queries are sent as form fields of a `POST` so that SMILES and InChI strings need no
/// path escaping. Consecutive requests are spaced by at least
/// [`LookupConfig::min_interval`].
pub struct PubChemClient {
    http: Client,
    base_url: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl PubChemClient {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("odorkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LookupError::Client)?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            min_interval: config.min_interval(),
            last_request: Mutex::new(None),
        })
    }

    fn throttle(&self) {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                trace!("Rate limit: sleeping for {:?}", wait);
                thread::sleep(wait);
            }
        }
        *last = Some(Instant::now());
    }

    /// Posts a form and returns the body, or `None` when the service reports "not found".
    /// See [`classify_response`].
    fn post(
        &self,
        url: &str,
        form: &[(&str, &str)],
        bad_request_is_empty: bool,
    ) -> Result<Option<String>, LookupError> {
        self.throttle();
        debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .form(form)
            .send()
            .map_err(|source| LookupError::Transport {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        let body = response.text().map_err(|source| LookupError::Transport {
            url: url.to_string(),
            source,
        })?;

        classify_response(url, status, body, bad_request_is_empty)
    }
}

impl CompoundLookup for PubChemClient {
    fn lookup_cids(&self, namespace: Namespace, query: &str) -> Result<Vec<Cid>, LookupError> {
        let url = lookup_url(&self.base_url, namespace);
        // A query the service cannot even parse (e.g. a name misread as SMILES) matches nothing.
        match self.post(&url, &[(namespace.as_str(), query)], true)? {
            Some(body) => parse_cid_list(&body),
            None => Ok(Vec::new()),
        }
    }

    fn fetch_records(&self, cids: &[Cid]) -> Result<Vec<MoleculeRecord>, LookupError> {
        if cids.is_empty() {
            return Ok(Vec::new());
        }
        let url = records_url(&self.base_url);
        let joined = cids
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",");
        match self.post(&url, &[("cid", joined.as_str())], false)? {
            Some(body) => parse_property_table(&body),
            None => Ok(Vec::new()),
        }
    }
}

pub fn lookup_url(base_url: &str, namespace: Namespace) -> String {
    format!("{base_url}/compound/{namespace}/cids/JSON")
}

pub fn records_url(base_url: &str) -> String {
    format!("{base_url}/compound/cid/property/{RECORD_PROPERTIES}/JSON")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CidListResponse {
    identifier_list: IdentifierList,
}

#[derive(Debug, Deserialize)]
struct IdentifierList {
    #[serde(rename = "CID", default)]
    cids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PropertyTableResponse {
    property_table: PropertyTable,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PropertyTable {
    #[serde(default)]
    properties: Vec<PropertyRow>,
}

#[derive(Debug, Deserialize)]
struct PropertyRow {
    #[serde(rename = "CID")]
    cid: u64,
    #[serde(rename = "MolecularWeight", default)]
    molecular_weight: Option<NumberOrText>,
    #[serde(rename = "IsomericSMILES", default)]
    isomeric_smiles: Option<String>,
    #[serde(rename = "SMILES", default)]
    smiles: Option<String>, // newer responses replace IsomericSMILES with SMILES
    #[serde(rename = "IUPACName", default)]
    iupac_name: Option<String>,
    #[serde(rename = "Title", default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct FaultResponse {
    #[serde(rename = "Fault")]
    fault: Fault,
}

#[derive(Debug, Deserialize)]
pub struct Fault {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
}

/// Parses a `cids/JSON` response. CID `0` (PubChem's "no structure" placeholder) is dropped.
pub fn parse_cid_list(body: &str) -> Result<Vec<Cid>, LookupError> {
    let response: CidListResponse = serde_json::from_str(body)
        .map_err(|e| LookupError::Malformed(format!("CID list: {e}")))?;
    let mut cids = Vec::with_capacity(response.identifier_list.cids.len());
    for value in response.identifier_list.cids {
        if let Ok(cid) = Cid::new(value) {
            if !cids.contains(&cid) {
                cids.push(cid);
            }
        }
    }
    Ok(cids)
}

/// Parses a `property/.../JSON` response into molecule records, in response order.
pub fn parse_property_table(body: &str) -> Result<Vec<MoleculeRecord>, LookupError> {
    let response: PropertyTableResponse = serde_json::from_str(body)
        .map_err(|e| LookupError::Malformed(format!("property table: {e}")))?;
    response
        .property_table
        .properties
        .into_iter()
        .map(|row| {
            let cid = Cid::new(row.cid)
                .map_err(|e| LookupError::Malformed(format!("property table: {e}")))?;
            let molecular_weight = match row.molecular_weight {
                Some(NumberOrText::Number(w)) => Some(w),
                Some(NumberOrText::Text(text)) => Some(text.trim().parse().map_err(|_| {
                    LookupError::Malformed(format!(
                        "molecular weight '{text}' of CID {cid} is not a number"
                    ))
                })?),
                None => None,
            };
            Ok(MoleculeRecord {
                cid,
                name: row.title,
                isomeric_smiles: row.isomeric_smiles.or(row.smiles),
                iupac_name: row.iupac_name,
                molecular_weight,
            })
        })
        .collect()
}

/// Decides what a PUG-REST answer means.
///
/// - success: `Some(body)`
/// - 404 or a `PUGREST.NotFound` fault: `None`
/// - 400 with a `PUGREST.BadRequest` fault: `None` when `bad_request_is_empty`, an error
///   otherwise
/// - anything else: [`LookupError::Status`]
pub fn classify_response(
    url: &str,
    status: StatusCode,
    body: String,
    bad_request_is_empty: bool,
) -> Result<Option<String>, LookupError> {
    if status.is_success() {
        return Ok(Some(body));
    }
    let fault = parse_fault(&body);
    let fault_code = fault.as_ref().map(|f| f.code.as_str());
    if status == StatusCode::NOT_FOUND || fault_code == Some(NOT_FOUND_FAULT) {
        return Ok(None);
    }
    if bad_request_is_empty
        && status == StatusCode::BAD_REQUEST
        && fault_code == Some(BAD_REQUEST_FAULT)
    {
        warn!("PubChem rejected the query as malformed; treating it as not found.");
        return Ok(None);
    }
    Err(LookupError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        message: fault
            .map(|f| f.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string()),
    })
}

pub fn parse_fault(body: &str) -> Option<Fault> {
    serde_json::from_str::<FaultResponse>(body)
        .ok()
        .map(|r| r.fault)
}
