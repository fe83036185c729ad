//! Canonical request signing shared by outbound creation requests and
//! inbound gateway callbacks.
//!
//! The canonical form is `k1=v1&k2=v2...` over the present fields sorted
//! byte-wise by name, with the shared secret appended as a raw suffix. The
//! digest is MD5 rendered as lowercase hex. The gateway protocol mandates
//! MD5; it only proves the sender holds the secret and is not a tamper-proof
//! seal beyond that.

use md5::{Digest, Md5};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// 签名字段名
pub const SIGNATURE_FIELD: &str = "signature";

/// 字段是否参与签名：缺失、null、空字符串均不参与
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// 字段值的规范文本。数字按最短往返形式输出，字符串原样输出
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// 构造待签名字符串（不含密钥）
pub fn canonical_string(params: &Map<String, Value>) -> String {
    let fields: BTreeMap<&str, String> = params
        .iter()
        .filter(|(name, value)| name.as_str() != SIGNATURE_FIELD && is_present(value))
        .map(|(name, value)| (name.as_str(), render(value)))
        .collect();

    fields
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// 计算签名
pub fn sign(params: &Map<String, Value>, secret: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(canonical_string(params).as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// 校验签名，忽略大小写
pub fn verify(params: &Map<String, Value>, secret: &str, digest: &str) -> bool {
    let expected = sign(params, secret);
    expected.eq_ignore_ascii_case(digest.trim())
}

/// 校验参数集自带的 `signature` 字段
pub fn verify_embedded(params: &Map<String, Value>, secret: &str) -> bool {
    match params.get(SIGNATURE_FIELD).and_then(Value::as_str) {
        Some(digest) if !digest.is_empty() => verify(params, secret, digest),
        _ => false,
    }
}
