use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::cache::RecordCache;
use super::{DeleteReport, Refresh, SaveOutcome};
use crate::config::SyncConfig;
use crate::error::MappingIncomplete;
use crate::failure::{FailureRecord, FailureRecorder, SyncOperation};
use crate::record::{normalize_identifier, HttpVerb, NoHooks, Operation, Record, RecordHooks, TypeDescriptor};
use crate::transport::{
    dispatch_for, interpret, Dispatch, RemoteClient, RemoteErrorKind, RemoteFailure, RemoteRequest,
    RequestTarget, TransportError,
};

/// Produces the registry client the first time an engine needs one.
pub type ClientFactory =
    Arc<dyn Fn() -> Result<Arc<dyn RemoteClient>, TransportError> + Send + Sync>;

/// Factory that always hands out the same client.
pub fn shared_client(client: Arc<dyn RemoteClient>) -> ClientFactory {
    Arc::new(move || Ok(Arc::clone(&client)))
}

/// The exact `{code, message}` pair the registry uses for "no data".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundSignature {
    pub code: i64,
    pub message: String,
}

impl NotFoundSignature {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.not_found_code, config.not_found_message.clone())
    }

    pub fn matches(&self, failure: &RemoteFailure) -> bool {
        failure.code == self.code && failure.message == self.message
    }
}

impl Default for NotFoundSignature {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

/// Verb and client method per operation, fixed when the engine is built.
struct DispatchTable {
    read: (HttpVerb, Dispatch),
    lookup: (HttpVerb, Dispatch),
    create: (HttpVerb, Dispatch),
    update: (HttpVerb, Dispatch),
    delete: (HttpVerb, Dispatch),
}

impl DispatchTable {
    fn new(descriptor: &TypeDescriptor) -> Self {
        let bind = |operation: Operation| {
            let verb = descriptor.verb_for(operation);
            (verb, dispatch_for(verb))
        };
        Self {
            read: bind(Operation::Read),
            lookup: bind(Operation::Lookup),
            create: bind(Operation::Create),
            update: bind(Operation::Update),
            delete: bind(Operation::Delete),
        }
    }

    fn resolve(&self, operation: Operation) -> (HttpVerb, Dispatch) {
        match operation {
            Operation::Read => self.read,
            Operation::Lookup => self.lookup,
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

struct CallError {
    failure: RemoteFailure,
    verb: HttpVerb,
    target: RequestTarget,
}

struct Fetched<R> {
    records: Vec<R>,
    failed: Vec<String>,
}

/// What became of one registry payload.
enum Decoded<R> {
    Record(R),
    /// No identifier to key it by.
    Skipped,
    /// Recorded as a failure.
    Failed,
}

impl<R> Decoded<R> {
    fn into_record(self) -> Option<R> {
        match self {
            Decoded::Record(record) => Some(record),
            Decoded::Skipped | Decoded::Failed => None,
        }
    }
}

/// Cached CRUD for one record type against the remote registry.
///
/// Remote failures never surface as errors: they are recorded through the
/// [`FailureRecorder`] and reported as empty results, `SaveOutcome::Failed`
/// or `DeleteReport::failed`. `MappingIncomplete` is returned only when the
/// type's descriptor cannot express the requested operation.
///
/// The cache assumes one logical request or worker uses an engine at a
/// time; cross-process consistency comes from the registry alone.
pub struct StorageEngine<R: Record> {
    type_name: String,
    descriptor: TypeDescriptor,
    dispatch: DispatchTable,
    hooks: Arc<dyn RecordHooks<R>>,
    recorder: Arc<FailureRecorder>,
    not_found: NotFoundSignature,
    client_factory: ClientFactory,
    client: Mutex<Option<Arc<dyn RemoteClient>>>,
    cache: RecordCache<R>,
}

impl<R: Record> StorageEngine<R> {
    pub fn new(
        type_name: impl Into<String>,
        client_factory: ClientFactory,
        recorder: Arc<FailureRecorder>,
    ) -> Self {
        let descriptor = R::descriptor();
        Self {
            type_name: type_name.into(),
            dispatch: DispatchTable::new(&descriptor),
            descriptor,
            hooks: Arc::new(NoHooks),
            recorder,
            not_found: NotFoundSignature::default(),
            client_factory,
            client: Mutex::new(None),
            cache: RecordCache::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn RecordHooks<R>>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_not_found(mut self, signature: NotFoundSignature) -> Self {
        self.not_found = signature;
        self
    }

    /// Replace the type's own descriptor, e.g. to point it at another endpoint.
    pub fn with_descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.dispatch = DispatchTable::new(&descriptor);
        self.descriptor = descriptor;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn is_cached(&self, id: &str) -> bool {
        self.cache.contains(&normalize_identifier(id))
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load one record. `None` when the registry has no such record or the
    /// call failed.
    pub fn load(&self, id: &str) -> Result<Option<R>, MappingIncomplete> {
        let id = normalize_identifier(id);
        if id.is_empty() {
            return Ok(None);
        }
        Ok(self.load_multiple(&[id.as_str()])?.pop())
    }

    /// Load several records, serving what it can from the cache.
    ///
    /// The result follows input order and silently drops ids that resolved
    /// to nothing.
    pub fn load_multiple(&self, ids: &[&str]) -> Result<Vec<R>, MappingIncomplete> {
        self.descriptor
            .require_endpoint(Operation::Read, &self.type_name)?;

        let mut wanted: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            let id = normalize_identifier(id);
            if !id.is_empty() && !wanted.contains(&id) {
                wanted.push(id);
            }
        }

        let (mut found, misses) = self.cache.partition(&wanted);
        debug!(
            type_name = %self.type_name,
            hits = found.len(),
            misses = misses.len(),
            "registry cache lookup"
        );

        if !misses.is_empty() {
            let mut loaded = self.fetch(Some(misses.as_slice()))?.records;
            self.hooks.after_load_batch(&mut loaded);
            for record in loaded {
                if let Some(id) = self.cache_record(&record) {
                    found.insert(id, record);
                }
            }
        }

        Ok(wanted.iter().filter_map(|id| found.remove(id)).collect())
    }

    /// Load everything the read endpoint lists when asked without an id.
    ///
    /// Only meaningful for registries that support unbounded listing;
    /// otherwise this returns whatever the bare read call yields.
    pub fn load_all(&self) -> Result<Vec<R>, MappingIncomplete> {
        let mut records = self.fetch(None)?.records;
        self.hooks.after_load_batch(&mut records);
        for record in &records {
            self.cache_record(record);
        }
        Ok(records)
    }

    /// Fetch records straight from the registry, bypassing the cache.
    pub fn do_load_multiple(&self, ids: &[&str]) -> Result<Vec<R>, MappingIncomplete> {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        Ok(self.fetch(Some(ids.as_slice()))?.records)
    }

    /// Unbounded fetch, bypassing the cache.
    pub fn do_load_all(&self) -> Result<Vec<R>, MappingIncomplete> {
        Ok(self.fetch(None)?.records)
    }

    /// Drop cached entries for `ids`.
    pub fn reset_cache(&self, ids: &[&str]) {
        let ids: Vec<String> = ids.iter().map(|id| normalize_identifier(id)).collect();
        self.cache.remove(ids.iter().map(String::as_str));
    }

    /// Drop every cached entry.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Load one record with a guaranteed registry round trip.
    pub fn load_unchanged(&self, id: &str) -> Result<Option<R>, MappingIncomplete> {
        Ok(self.refresh(id)?.into_record())
    }

    /// Like `load_unchanged`, but says why nothing came back.
    pub fn refresh(&self, id: &str) -> Result<Refresh<R>, MappingIncomplete> {
        let id = normalize_identifier(id);
        if id.is_empty() {
            return Ok(Refresh::Missing);
        }
        self.cache.remove([id.as_str()]);

        let fetched = self.fetch(Some(std::slice::from_ref(&id)))?;
        let mut records = fetched.records;
        self.hooks.after_load_batch(&mut records);

        let mut found = None;
        for record in records {
            if self.cache_record(&record).as_deref() == Some(id.as_str()) {
                found = Some(record);
            }
        }

        Ok(match found {
            Some(record) => Refresh::Loaded(record),
            None if fetched.failed.contains(&id) => Refresh::Failed,
            None => Refresh::Missing,
        })
    }

    /// Resolve business properties to one record via the lookup endpoint.
    pub fn load_by_properties(
        &self,
        properties: &[(&str, &str)],
    ) -> Result<Option<R>, MappingIncomplete> {
        let endpoint = self
            .descriptor
            .require_endpoint(Operation::Lookup, &self.type_name)?;
        let key = self.descriptor.require_lookup_key(&self.type_name)?;

        let request = RemoteRequest::new(endpoint).with_params(properties.iter().copied());
        match self.call(Operation::Lookup, &request) {
            Ok(value) => match lookup_identifier(&value, key) {
                Some(id) => self.load(&id),
                None => {
                    debug!(type_name = %self.type_name, key, "lookup response carried no identifier");
                    Ok(None)
                }
            },
            Err(err) => {
                if !self.not_found.matches(&err.failure) {
                    let label = property_label(properties);
                    self.record_call_failure(SyncOperation::LoadByProperties, endpoint, &label, &request, err);
                }
                Ok(None)
            }
        }
    }

    /// Query the lookup endpoint for a list and decode every element.
    ///
    /// Results are neither read from nor written to the cache.
    pub fn load_multiple_by_properties(
        &self,
        properties: &[(&str, &str)],
    ) -> Result<Vec<R>, MappingIncomplete> {
        let endpoint = self
            .descriptor
            .require_endpoint(Operation::Lookup, &self.type_name)?;

        let request = RemoteRequest::new(endpoint).with_params(properties.iter().copied());
        match self.call(Operation::Lookup, &request) {
            Ok(value) => {
                let items = match value {
                    Value::Array(items) => items,
                    Value::Null => Vec::new(),
                    other => vec![other],
                };
                Ok(items
                    .into_iter()
                    .filter_map(|item| {
                        self.materialize(None, item, SyncOperation::LoadMultipleByProperties, &request)
                            .into_record()
                    })
                    .collect())
            }
            Err(err) => {
                if !self.not_found.matches(&err.failure) {
                    let label = property_label(properties);
                    self.record_call_failure(
                        SyncOperation::LoadMultipleByProperties,
                        endpoint,
                        &label,
                        &request,
                        err,
                    );
                }
                Ok(Vec::new())
            }
        }
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Build a new, unsaved record. Nothing is sent to the registry.
    ///
    /// An identifier present under the type's id key is kept, which lets
    /// migrations create records with pre-assigned ids.
    pub fn create(&self, mut values: Map<String, Value>) -> Result<R, serde_json::Error> {
        self.hooks.before_create(&mut values);
        let preassigned = values.get(self.descriptor.id_key()).and_then(scalar_string);

        let mut record = R::from_map(values)?;
        if let Some(id) = preassigned {
            record.set_identifier(id);
        }
        record.force_new(true);
        self.hooks.after_create(&mut record);
        Ok(record)
    }

    /// Create or update `record` in the registry.
    ///
    /// Remote failures come back as `SaveOutcome::Failed`.
    pub fn save(&self, record: &mut R) -> Result<SaveOutcome, MappingIncomplete> {
        let was_new = record.is_new();
        let operation = if was_new {
            Operation::Create
        } else {
            Operation::Update
        };
        let endpoint = self
            .descriptor
            .require_endpoint(operation, &self.type_name)?
            .to_string();

        self.hooks.before_save(record);

        let identifier = if was_new {
            record.identifier().map(normalize_identifier).unwrap_or_default()
        } else {
            record
                .normalize_identifier()
                .map(str::to_string)
                .unwrap_or_default()
        };

        let format = self.descriptor.format();
        let mut request = RemoteRequest::new(endpoint.as_str());
        if !was_new {
            request = request.with_param("id", identifier.as_str());
        }
        let body = match format.encode(&record.to_map()) {
            Ok(body) => body,
            Err(err) => {
                let (verb, _) = self.dispatch.resolve(operation);
                let target = self.describe(&request);
                self.record_failure(
                    SyncOperation::Save,
                    &endpoint,
                    &identifier,
                    &request,
                    verb,
                    &target,
                    0,
                    format!("could not encode record: {}", err),
                );
                return Ok(SaveOutcome::Failed);
            }
        };
        let request = request.with_body(body, format.content_type());

        match self.call(operation, &request) {
            Ok(value) => {
                let outcome = if was_new {
                    match first_value(&value) {
                        Some(id) => SaveOutcome::Created(id),
                        None => SaveOutcome::Succeeded,
                    }
                } else {
                    SaveOutcome::Updated
                };

                if let SaveOutcome::Created(id) = &outcome {
                    record.set_identifier(normalize_identifier(id));
                }
                record.force_new(false);
                if let Some(id) = record.identifier() {
                    self.cache.remove([id]);
                }
                self.hooks.after_save(record, !was_new);

                debug!(
                    type_name = %self.type_name,
                    identifier = record.identifier().unwrap_or_default(),
                    outcome = ?outcome,
                    "registry save succeeded"
                );
                Ok(outcome)
            }
            Err(err) => {
                self.record_call_failure(SyncOperation::Save, &endpoint, &identifier, &request, err);
                Ok(SaveOutcome::Failed)
            }
        }
    }

    /// Delete records remotely (when the type supports it) and evict them.
    ///
    /// Types without a delete endpoint only drop their cached copies.
    pub fn delete(&self, records: &[R]) -> DeleteReport {
        self.hooks.before_delete(records);

        let mut report = DeleteReport::default();
        let mut ids: Vec<String> = Vec::with_capacity(records.len());
        for record in records {
            match record.identifier().map(normalize_identifier) {
                Some(id) => {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                None => report.skipped += 1,
            }
        }

        match self.descriptor.delete_endpoint() {
            None => {
                debug!(type_name = %self.type_name, "record type has no remote delete");
                report.deleted = ids.clone();
            }
            Some(endpoint) => {
                for id in &ids {
                    let request = RemoteRequest::new(endpoint).with_param("id", id.as_str());
                    match self.call(Operation::Delete, &request) {
                        Ok(_) => report.deleted.push(id.clone()),
                        Err(err) if self.not_found.matches(&err.failure) => {
                            report.deleted.push(id.clone())
                        }
                        Err(err) => {
                            self.record_call_failure(SyncOperation::Delete, endpoint, id, &request, err);
                            report.failed.push(id.clone());
                        }
                    }
                }
            }
        }

        self.cache.remove(ids.iter().map(String::as_str));
        self.hooks.after_delete(records);
        report
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn client(&self) -> Result<Arc<dyn RemoteClient>, TransportError> {
        let mut slot = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Ok(Arc::clone(client));
        }
        let client = (self.client_factory)()?;
        *slot = Some(Arc::clone(&client));
        Ok(client)
    }

    fn describe(&self, request: &RemoteRequest) -> RequestTarget {
        match self.client() {
            Ok(client) => client.describe(request),
            Err(_) => RequestTarget {
                uri: request.path_and_query(),
                host: String::new(),
            },
        }
    }

    fn call(&self, operation: Operation, request: &RemoteRequest) -> Result<Value, CallError> {
        let (verb, dispatch) = self.dispatch.resolve(operation);
        let client = match self.client() {
            Ok(client) => client,
            Err(err) => {
                return Err(CallError {
                    failure: err.into(),
                    verb,
                    target: RequestTarget {
                        uri: request.path_and_query(),
                        host: String::new(),
                    },
                })
            }
        };

        let target = client.describe(request);
        debug!(type_name = %self.type_name, verb = %verb, uri = %target.uri, "registry request");

        interpret(dispatch(client.as_ref(), request), self.descriptor.format())
            .map_err(|failure| CallError {
                failure,
                verb,
                target,
            })
    }

    /// One GET per id (or one unbounded GET), then decode everything collected.
    fn fetch(&self, ids: Option<&[String]>) -> Result<Fetched<R>, MappingIncomplete> {
        let endpoint = self
            .descriptor
            .require_endpoint(Operation::Read, &self.type_name)?;

        let mut fetched = Fetched {
            records: Vec::new(),
            failed: Vec::new(),
        };
        let mut raw: Vec<(Option<String>, RemoteRequest, Value)> = Vec::new();

        match ids {
            None => {
                let request = RemoteRequest::new(endpoint);
                match self.call(Operation::Read, &request) {
                    Ok(value) => raw.push((None, request, value)),
                    Err(err) => self.read_failed(None, endpoint, &request, err, &mut fetched),
                }
            }
            Some(ids) => {
                for id in ids {
                    let id = normalize_identifier(id);
                    if id.is_empty() {
                        continue;
                    }
                    let request = RemoteRequest::new(endpoint)
                        .with_param(self.descriptor.id_key(), id.as_str());
                    match self.call(Operation::Read, &request) {
                        Ok(value) => raw.push((Some(id), request, value)),
                        Err(err) => self.read_failed(Some(id.as_str()), endpoint, &request, err, &mut fetched),
                    }
                }
            }
        }

        for (requested, request, value) in raw {
            let items = match value {
                Value::Null => Vec::new(),
                Value::Array(items) => items,
                item => vec![item],
            };
            let fallback = if items.len() == 1 { requested.as_deref() } else { None };
            let mut undecodable = false;
            for item in items {
                match self.materialize(fallback, item, SyncOperation::LoadMultiple, &request) {
                    Decoded::Record(record) => fetched.records.push(record),
                    Decoded::Skipped => {}
                    Decoded::Failed => undecodable = true,
                }
            }
            if let (true, Some(id)) = (undecodable, requested) {
                fetched.failed.push(id);
            }
        }

        Ok(fetched)
    }

    fn read_failed(
        &self,
        requested: Option<&str>,
        endpoint: &str,
        request: &RemoteRequest,
        err: CallError,
        fetched: &mut Fetched<R>,
    ) {
        if self.not_found.matches(&err.failure) {
            if let Some(id) = requested {
                debug!(type_name = %self.type_name, identifier = id, "registry has no data; retiring local mirror");
                self.hooks.retire_local_mirror(id);
            }
            return;
        }

        if let RemoteErrorKind::Unrecognized(status) = err.failure.kind {
            warn!(type_name = %self.type_name, status, "unrecognized registry status");
        } else {
            debug!(type_name = %self.type_name, kind = %err.failure.kind.label(), "registry read failed");
        }

        let identifier = requested.unwrap_or_default();
        self.record_call_failure(SyncOperation::LoadMultiple, endpoint, identifier, request, err);
        if let Some(id) = requested {
            fetched.failed.push(id.to_string());
        }
    }

    /// Decode one payload into a record, identified from the payload's id key
    /// or else `fallback`. Undecodable payloads are recorded as failures.
    fn materialize(
        &self,
        fallback: Option<&str>,
        value: Value,
        operation: SyncOperation,
        request: &RemoteRequest,
    ) -> Decoded<R> {
        let (verb, _) = self.dispatch.resolve(Operation::Read);
        let Value::Object(map) = value else {
            let target = self.describe(request);
            self.record_failure(
                operation,
                &request.endpoint,
                fallback.unwrap_or_default(),
                request,
                verb,
                &target,
                0,
                "registry payload is not an object".to_string(),
            );
            return Decoded::Failed;
        };

        let identifier = map
            .get(self.descriptor.id_key())
            .and_then(scalar_string)
            .map(|id| normalize_identifier(&id))
            .or_else(|| fallback.map(str::to_string));
        let Some(identifier) = identifier else {
            warn!(type_name = %self.type_name, "registry payload without identifier skipped");
            return Decoded::Skipped;
        };

        match R::from_map(map) {
            Ok(mut record) => {
                record.set_identifier(identifier);
                record.force_new(false);
                Decoded::Record(record)
            }
            Err(err) => {
                let target = self.describe(request);
                self.record_failure(
                    operation,
                    &request.endpoint,
                    &identifier,
                    request,
                    verb,
                    &target,
                    0,
                    format!("could not decode registry payload: {}", err),
                );
                Decoded::Failed
            }
        }
    }

    fn cache_record(&self, record: &R) -> Option<String> {
        let id = normalize_identifier(record.identifier()?);
        self.cache.insert(id.clone(), record.clone());
        Some(id)
    }

    fn record_call_failure(
        &self,
        operation: SyncOperation,
        endpoint: &str,
        identifier: &str,
        request: &RemoteRequest,
        err: CallError,
    ) {
        self.record_failure(
            operation,
            endpoint,
            identifier,
            request,
            err.verb,
            &err.target,
            err.failure.code,
            err.failure.message,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn record_failure(
        &self,
        operation: SyncOperation,
        endpoint: &str,
        identifier: &str,
        request: &RemoteRequest,
        verb: HttpVerb,
        target: &RequestTarget,
        code: i64,
        message: String,
    ) {
        self.recorder.record(FailureRecord {
            operation,
            endpoint: endpoint.to_string(),
            identifier: identifier.to_string(),
            request_payload: request_payload(request),
            entity_type_label: self.type_name.clone(),
            timestamp: SystemTime::now(),
            error_message: message,
            error_code: code,
            request_verb: verb.to_string(),
            request_uri: target.uri.clone(),
            request_host: target.host.clone(),
        });
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The registry answers creates with `{<key>: newId}`; anything else is a
/// bare success.
fn first_value(value: &Value) -> Option<String> {
    value
        .as_object()
        .and_then(|map| map.values().next())
        .and_then(scalar_string)
}

fn lookup_identifier(value: &Value, key: &str) -> Option<String> {
    match value {
        Value::Object(map) => map.get(key).and_then(scalar_string),
        Value::Array(items) => items.first().and_then(|item| lookup_identifier(item, key)),
        _ => None,
    }
}

fn property_label(properties: &[(&str, &str)]) -> String {
    properties
        .iter()
        .map(|(_, v)| *v)
        .collect::<Vec<_>>()
        .join(",")
}

fn request_payload(request: &RemoteRequest) -> String {
    match &request.body {
        Some(body) => body.clone(),
        None => {
            let query: Map<String, Value> = request
                .query
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            serde_json::to_string(&query).unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_value_reads_created_identifier() {
        assert_eq!(first_value(&json!({"firm": "ac100"})), Some("ac100".into()));
        assert_eq!(first_value(&json!({"id": 42})), Some("42".into()));
        assert_eq!(first_value(&json!({})), None);
        assert_eq!(first_value(&json!(true)), None);
        assert_eq!(first_value(&Value::Null), None);
    }

    #[test]
    fn lookup_identifier_handles_lists() {
        assert_eq!(
            lookup_identifier(&json!([{"firm": "ac100"}, {"firm": "ac200"}]), "firm"),
            Some("ac100".into())
        );
        assert_eq!(lookup_identifier(&json!({"other": 1}), "firm"), None);
    }

    #[test]
    fn not_found_signature_needs_exact_pair() {
        let signature = NotFoundSignature::default();
        let failure = |code, message: &str| RemoteFailure {
            kind: RemoteErrorKind::NotFound,
            status: 404,
            code,
            message: message.into(),
        };
        assert!(signature.matches(&failure(99, "SyncErrorCode: 99 | No data")));
        assert!(!signature.matches(&failure(99, "SyncErrorCode: 99 | No data found")));
        assert!(!signature.matches(&failure(98, "SyncErrorCode: 99 | No data")));
    }

    #[test]
    fn get_payload_lists_query_params() {
        let request = RemoteRequest::new("firms").with_param("firm", "ac100");
        assert_eq!(request_payload(&request), r#"{"firm":"ac100"}"#);
    }

    #[test]
    fn get_payload_keeps_param_order() {
        let request = RemoteRequest::new("firms/search")
            .with_param("town", "Leeds")
            .with_param("name", "Acme")
            .with_param("active", "1");
        assert_eq!(
            request_payload(&request),
            r#"{"town":"Leeds","name":"Acme","active":"1"}"#
        );
    }
}
