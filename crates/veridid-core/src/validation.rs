//! Structural and signature checks for documents, schemas and credentials.

use std::collections::HashSet;

use crate::credential::{Credential, Schema, MAX_SCHEMA_ATTRIBUTES};
use crate::crypto::Ed25519PublicKey;
use crate::document::{ServiceEndpoint, VerificationMethod};
use crate::error::ValidationError;

/// Maximum length of a DID in bytes.
pub const MAX_DID_LEN: usize = 512;

/// Per-document size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLimits {
    pub max_verification_methods: usize,
    pub max_services: usize,
}

impl Default for DocumentLimits {
    fn default() -> Self {
        Self {
            max_verification_methods: 32,
            max_services: 32,
        }
    }
}

/// Check DID syntax: `did:<method>:<method-specific-id>`.
///
/// The method is lowercase ASCII alphanumeric. The method-specific id is
/// non-empty and may itself contain colons. No whitespace or control
/// characters anywhere.
pub fn validate_did_id(did: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &str| Err(ValidationError::InvalidDid(format!("{did:?}: {reason}")));

    if did.len() > MAX_DID_LEN {
        return invalid("too long");
    }
    if did.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return invalid("contains whitespace or control characters");
    }

    let Some(rest) = did.strip_prefix("did:") else {
        return invalid("missing did: prefix");
    };
    let Some((method, specific)) = rest.split_once(':') else {
        return invalid("missing method-specific id");
    };

    if method.is_empty()
        || !method
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return invalid("method must be lowercase alphanumeric");
    }
    if specific.is_empty() {
        return invalid("empty method-specific id");
    }

    Ok(())
}

/// Check the mutable fields of a document against `limits`.
pub fn validate_document_fields(
    verification_methods: &[VerificationMethod],
    services: &[ServiceEndpoint],
    limits: &DocumentLimits,
) -> Result<(), ValidationError> {
    // 1. Size limits
    if verification_methods.len() > limits.max_verification_methods {
        return Err(ValidationError::TooManyVerificationMethods {
            count: verification_methods.len(),
            max: limits.max_verification_methods,
        });
    }
    if services.len() > limits.max_services {
        return Err(ValidationError::TooManyServices {
            count: services.len(),
            max: limits.max_services,
        });
    }

    // 2. Unique ids within each list
    let mut seen = HashSet::new();
    for method in verification_methods {
        if !seen.insert(method.id.as_str()) {
            return Err(ValidationError::DuplicateMethodId(method.id.clone()));
        }
    }

    let mut seen = HashSet::new();
    for service in services {
        if !seen.insert(service.id.as_str()) {
            return Err(ValidationError::DuplicateServiceId(service.id.clone()));
        }
    }

    Ok(())
}

/// Check a schema: non-empty name, 1..=64 unique non-empty attribute names.
pub fn validate_schema(schema: &Schema) -> Result<(), ValidationError> {
    if schema.name.is_empty() {
        return Err(ValidationError::InvalidSchema("empty name".into()));
    }
    if schema.attributes.is_empty() {
        return Err(ValidationError::InvalidSchema("no attributes".into()));
    }
    if schema.attributes.len() > MAX_SCHEMA_ATTRIBUTES {
        return Err(ValidationError::InvalidSchema(format!(
            "{} attributes (max {MAX_SCHEMA_ATTRIBUTES})",
            schema.attributes.len()
        )));
    }

    let mut seen = HashSet::new();
    for name in &schema.attributes {
        if name.is_empty() {
            return Err(ValidationError::InvalidSchema("empty attribute name".into()));
        }
        if !seen.insert(name.as_str()) {
            return Err(ValidationError::InvalidSchema(format!(
                "duplicate attribute {name:?}"
            )));
        }
    }

    Ok(())
}

/// Check that a credential's public attributes line up with `schema`.
pub fn validate_credential_structure(
    credential: &Credential,
    schema: &Schema,
) -> Result<(), ValidationError> {
    if credential.schema_id != schema.id() {
        return Err(ValidationError::InvalidSchema(
            "credential names a different schema".into(),
        ));
    }

    if credential.attributes.len() != schema.attributes.len() {
        return Err(ValidationError::AttributeCountMismatch {
            expected: schema.attributes.len(),
            got: credential.attributes.len(),
        });
    }

    for (index, (attr, expected)) in credential
        .attributes
        .iter()
        .zip(&schema.attributes)
        .enumerate()
    {
        if &attr.name != expected {
            return Err(ValidationError::AttributeNameMismatch {
                index,
                expected: expected.clone(),
                got: attr.name.clone(),
            });
        }
    }

    Ok(())
}

/// Verify the issuer's signature over a credential.
pub fn verify_credential_signature(
    credential: &Credential,
    issuer_key: &Ed25519PublicKey,
) -> Result<(), ValidationError> {
    issuer_key
        .verify(&credential.signing_message(), &credential.signature)
        .map_err(|_| ValidationError::SignatureFailed)
}

/// Check that the holder holds a valid opening for every attribute.
pub fn verify_openings(credential: &Credential) -> Result<(), ValidationError> {
    for (index, attr) in credential.attributes.iter().enumerate() {
        let index = index as u32;
        let opening = credential
            .opening(index)
            .ok_or(ValidationError::MissingOpening(index))?;
        if opening.commitment(&credential.schema_id, &attr.name) != attr.commitment {
            return Err(ValidationError::CommitmentMismatch(index));
        }
    }
    Ok(())
}
