//! JSON Web Key records as published by a JWKS endpoint.

// crates.io
use base64::prelude::*;
use jsonwebtoken::jwk::Jwk;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// `use` value marking a key intended for signature verification.
pub const USE_SIGNATURE: &str = "sig";

/// One JSON web key returned by the key set endpoint.
///
/// Decoding is lenient: every member may be absent or `null`. Members not modelled here are
/// retained in [`Key::other`] so the record round-trips without loss.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Key {
	/// Key identifier used to match a signature to its key.
	#[serde(
		default,
		deserialize_with = "null_as_default",
		skip_serializing_if = "String::is_empty"
	)]
	pub kid: String,
	/// Cryptographic family of the key, such as `RSA` or `EC`.
	#[serde(default, deserialize_with = "null_as_default")]
	pub kty: String,
	/// Algorithm intended for use with the key.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub alg: Option<String>,
	/// Intended use of the public key (`sig` or `enc`).
	#[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
	pub key_use: Option<String>,
	/// Operations the key is intended for.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key_ops: Option<Vec<String>>,
	/// X.509 certificate chain; each entry is base64 (not base64url) DER.
	#[serde(
		default,
		deserialize_with = "null_as_default",
		skip_serializing_if = "Vec::is_empty"
	)]
	pub x5c: Vec<String>,
	/// Base64url SHA-1 thumbprint of the leaf certificate.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x5t: Option<String>,
	/// RSA modulus.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub n: Option<String>,
	/// RSA public exponent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub e: Option<String>,
	/// Any other members published with the key.
	#[serde(flatten)]
	pub other: Map<String, Value>,
}
impl Key {
	/// Whether the key is published for signature verification.
	pub fn is_signing(&self) -> bool {
		self.key_use.as_deref() == Some(USE_SIGNATURE)
	}

	/// Decode the `x5c` chain into DER certificates, leaf first.
	pub fn certificate_chain(&self) -> Result<Vec<Vec<u8>>> {
		self.x5c
			.iter()
			.map(|cert| {
				BASE64_STANDARD.decode(cert.trim()).map_err(|err| Error::Validation {
					field: "x5c",
					reason: format!("Invalid base64 certificate: {err}."),
				})
			})
			.collect()
	}

	/// Convert into a [`jsonwebtoken`] JWK, e.g. to build a `DecodingKey`.
	pub fn to_jwk(&self) -> Result<Jwk> {
		let value = serde_json::to_value(self)?;

		Ok(serde_json::from_value(value)?)
	}
}

/// Ordered key records exactly as returned by one fetch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeySet {
	/// Keys in payload order.
	pub keys: Vec<Key>,
}
impl KeySet {
	/// Parse a key set payload.
	pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
		serde_json::from_slice(bytes)
	}

	/// Number of keys in the set.
	pub fn len(&self) -> usize {
		self.keys.len()
	}

	/// Whether the set carries no keys.
	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	/// Iterate keys in payload order.
	pub fn iter(&self) -> impl Iterator<Item = &Key> {
		self.keys.iter()
	}

	/// Last key with the given identifier, regardless of use.
	pub fn find(&self, kid: &str) -> Option<&Key> {
		self.keys.iter().rev().find(|key| key.kid == kid)
	}

	/// Last signing key with the given identifier.
	///
	/// Duplicate identifiers resolve to the key published last.
	pub fn signing_key(&self, kid: &str) -> Option<&Key> {
		self.keys.iter().rev().find(|key| key.kid == kid && key.is_signing())
	}
}
impl<'a> IntoIterator for &'a KeySet {
	type IntoIter = std::slice::Iter<'a, Key>;
	type Item = &'a Key;

	fn into_iter(self) -> Self::IntoIter {
		self.keys.iter()
	}
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
