// ============================================================================
// FIRESTORE - document store over the Firestore REST API
// ============================================================================

use std::rc::Rc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};

use crate::config::FirebaseConfig;
use crate::error::DocumentError;
use crate::services::documents::{Document, DocumentPath, DocumentStore};
use crate::services::firebase_auth::IdTokenSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayTransform {
    Union,
    Remove,
}

impl ArrayTransform {
    fn wire_name(&self) -> &'static str {
        match self {
            ArrayTransform::Union => "appendMissingElements",
            ArrayTransform::Remove => "removeAllFromArray",
        }
    }
}

pub struct Firestore {
    http: Client,
    base_url: String,
    project_id: String,
    tokens: Rc<dyn IdTokenSource>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl Firestore {
    pub fn new(config: &FirebaseConfig, tokens: Rc<dyn IdTokenSource>) -> Self {
        Self {
            http: Client::new(),
            base_url: config.firestore_base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            tokens,
        }
    }

    fn database_root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    /// Full resource name, as used inside commit requests.
    pub fn document_name(&self, path: &DocumentPath) -> String {
        format!("{}/{}/{}", self.database_root(), path.collection, path.id)
    }

    pub fn document_url(&self, path: &DocumentPath) -> Result<Url, DocumentError> {
        let raw = format!("{}/{}", self.base_url, self.document_name(path));
        Url::parse(&raw).map_err(|e| DocumentError::Decode(format!("invalid document URL {}: {}", raw, e)))
    }

    /// PATCH target that only touches `fields`.
    pub fn merge_url<'a>(
        &self,
        path: &DocumentPath,
        fields: impl IntoIterator<Item = &'a String>,
    ) -> Result<Url, DocumentError> {
        let mut url = self.document_url(path)?;
        {
            let mut query = url.query_pairs_mut();
            for field in fields {
                query.append_pair("updateMask.fieldPaths", &field_path(field));
            }
        }
        Ok(url)
    }

    fn commit_url(&self) -> Result<Url, DocumentError> {
        let raw = format!("{}/{}:commit", self.base_url, self.database_root());
        Url::parse(&raw).map_err(|e| DocumentError::Decode(format!("invalid commit URL {}: {}", raw, e)))
    }

    /// Single-write commit applying an array transform to `field`.
    pub fn transform_body(
        &self,
        path: &DocumentPath,
        field: &str,
        transform: ArrayTransform,
        values: &[Value],
    ) -> Value {
        json!({
            "writes": [{
                "transform": {
                    "document": self.document_name(path),
                    "fieldTransforms": [{
                        "fieldPath": field_path(field),
                        transform.wire_name(): { "values": values.iter().map(encode_value).collect::<Vec<_>>() },
                    }],
                },
            }],
        })
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<Response, DocumentError> {
        let token = self.tokens.id_token().await?;
        request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| DocumentError::Network(e.to_string()))
    }

    async fn apply_transform(
        &self,
        path: &DocumentPath,
        field: &str,
        transform: ArrayTransform,
        values: Vec<Value>,
    ) -> Result<(), DocumentError> {
        let body = self.transform_body(path, field, transform, &values);
        let url = self.commit_url()?;
        let response = self.authorized(self.http.post(url).json(&body)).await?;
        check_status(response).await.map(|_| ())
    }
}

async fn check_status(response: Response) -> Result<Response, DocumentError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&text)
        .map(|envelope| envelope.error.message)
        .unwrap_or(text);

    Err(match status {
        StatusCode::UNAUTHORIZED => DocumentError::Unauthenticated,
        StatusCode::FORBIDDEN => DocumentError::PermissionDenied(message),
        _ => DocumentError::Status {
            status: status.as_u16(),
            message,
        },
    })
}

#[async_trait(?Send)]
impl DocumentStore for Firestore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, DocumentError> {
        let url = self.document_url(path)?;
        let response = self.authorized(self.http.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            log::info!("📄 {} does not exist", path);
            return Ok(None);
        }

        let raw: RawDocument = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| DocumentError::Decode(e.to_string()))?;
        decode_fields(&raw.fields).map(Some)
    }

    async fn set_merge(&self, path: &DocumentPath, data: Document) -> Result<(), DocumentError> {
        // An empty mask would replace the whole document
        if data.is_empty() {
            return Ok(());
        }
        let url = self.merge_url(path, data.keys())?;
        let body = json!({ "fields": encode_fields(&data) });
        let response = self.authorized(self.http.patch(url).json(&body)).await?;
        check_status(response).await.map(|_| ())
    }

    async fn array_union(
        &self,
        path: &DocumentPath,
        field: &str,
        values: Vec<Value>,
    ) -> Result<(), DocumentError> {
        self.apply_transform(path, field, ArrayTransform::Union, values).await
    }

    async fn array_remove(
        &self,
        path: &DocumentPath,
        field: &str,
        values: Vec<Value>,
    ) -> Result<(), DocumentError> {
        self.apply_transform(path, field, ArrayTransform::Remove, values).await
    }
}

// ============================================================================
// VALUE CODEC
// ============================================================================

/// Simple field names go bare; anything else is backtick-quoted.
pub fn field_path(name: &str) -> String {
    let mut chars = name.chars();
    let simple = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

pub fn encode_fields(fields: &Document) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    )
}

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // int64 travels as a decimal string
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or(0.0) }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Document, DocumentError> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

/// Timestamps, bytes and references decode to their string form.
pub fn decode_value(value: &Value) -> Result<Value, DocumentError> {
    let (kind, raw) = value
        .as_object()
        .and_then(|map| map.iter().next())
        .ok_or_else(|| DocumentError::Decode(format!("not a typed value: {}", value)))?;

    match (kind.as_str(), raw) {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", Value::Bool(b)) => Ok(Value::Bool(*b)),
        ("integerValue", Value::String(s)) => s
            .parse::<i64>()
            .map(|i| Value::Number(i.into()))
            .map_err(|e| DocumentError::Decode(format!("integerValue {}: {}", s, e))),
        ("integerValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("doubleValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("doubleValue", Value::String(s)) => Ok(s
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)),
        ("stringValue", Value::String(s))
        | ("timestampValue", Value::String(s))
        | ("bytesValue", Value::String(s))
        | ("referenceValue", Value::String(s)) => Ok(Value::String(s.clone())),
        ("geoPointValue", point) => Ok(point.clone()),
        ("arrayValue", array) => array
            .get("values")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
            .unwrap_or_else(|| Ok(Vec::new()))
            .map(Value::Array),
        ("mapValue", map) => match map.get("fields").and_then(Value::as_object) {
            Some(fields) => decode_fields(fields).map(Value::Object),
            None => Ok(Value::Object(Map::new())),
        },
        (kind, raw) => Err(DocumentError::Decode(format!("unsupported {}: {}", kind, raw))),
    }
}
