//! The resolution algorithm: the first shape of a descriptor that yields a
//! codec wins.

use std::sync::Arc;

use super::CodecRegistry;
use crate::decode::{NullGuardDecoder, ValueDecoder};
use crate::encode::ValueEncoder;
use crate::error::{CodecError, Result};
use crate::shape::{Codable, Descriptor};

const NO_SHAPE: &str = "no shape matched";
const NO_KEY_SHAPE: &str = "map keys must be string-like or parsable";

pub(super) fn decoder<T: Codable>(registry: &CodecRegistry) -> Result<(Arc<dyn ValueDecoder<T>>, &'static str)> {
    let descriptor = T::descriptor();
    for rule in descriptor.rules() {
        if let Some(decoder) = rule.decoder(registry)? {
            return Ok((guard(&descriptor, decoder), rule.name()));
        }
    }
    Err(CodecError::unsupported::<T>(NO_SHAPE))
}

pub(super) fn encoder<T: Codable>(registry: &CodecRegistry) -> Result<(Arc<dyn ValueEncoder<T>>, &'static str)> {
    let descriptor = T::descriptor();
    for rule in descriptor.rules() {
        if let Some(encoder) = rule.encoder(registry)? {
            return Ok((encoder, rule.name()));
        }
    }
    Err(CodecError::unsupported::<T>(NO_SHAPE))
}

pub(super) fn key_decoder<T: Codable>() -> Result<(Arc<dyn ValueDecoder<T>>, &'static str)> {
    let descriptor = T::descriptor();
    if let Some(text) = &descriptor.text {
        return Ok((text.bind_decoder(), "text"));
    }
    if let Some(parse) = &descriptor.parse {
        return Ok((parse.bind_decoder(), "parse"));
    }
    Err(CodecError::unsupported::<T>(NO_KEY_SHAPE))
}

pub(super) fn key_encoder<T: Codable>() -> Result<(Arc<dyn ValueEncoder<T>>, &'static str)> {
    let descriptor = T::descriptor();
    if let Some(text) = &descriptor.text {
        return Ok((text.bind_encoder(), "text"));
    }
    if let Some(parse) = &descriptor.parse {
        return Ok((parse.bind_encoder(), "parse"));
    }
    Err(CodecError::unsupported::<T>(NO_KEY_SHAPE))
}

/// Puts the `null` check in front of reference-like types.
fn guard<T: 'static>(descriptor: &Descriptor<T>, decoder: Arc<dyn ValueDecoder<T>>) -> Arc<dyn ValueDecoder<T>> {
    if descriptor.reference_like {
        Arc::new(NullGuardDecoder::new(decoder, descriptor.null_value))
    } else {
        decoder
    }
}
