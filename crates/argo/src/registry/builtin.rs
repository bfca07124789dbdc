//! Codecs installed before any lookup.

use std::sync::Arc;

use super::CodecRegistry;
use crate::decimal::Decimal;
use crate::decode::{
    AnyDecoder, BoolDecoder, NullGuardDecoder, NumberDecoder, NumberTarget, TextDecoder, ValueDecoder,
};
use crate::encode::{AnyEncoder, BoolEncoder, DisplayEncoder, FloatEncoder, TextEncoder};
use crate::value::Value;

macro_rules! integers {
    ($registry:ident, $widen:ident: $($t:ty),* $(,)?) => {
        $(
            $registry.register_decoder::<$t>(Arc::new(NumberDecoder::new(NumberTarget::Integer, |n| {
                n.$widen().and_then(|v| <$t>::try_from(v).ok())
            })));
            $registry.register_encoder::<$t>(Arc::new(DisplayEncoder::<$t>::new()));
        )*
    };
}

fn empty_text() -> Arc<str> {
    Arc::from("")
}

pub(super) fn install(registry: &CodecRegistry) {
    registry.register_decoder::<bool>(Arc::new(BoolDecoder));
    registry.register_encoder::<bool>(Arc::new(BoolEncoder));

    integers!(registry, to_i128: i8, i16, i32, i64, i128, isize);
    integers!(registry, to_u128: u8, u16, u32, u64, u128, usize);

    registry.register_decoder::<f32>(Arc::new(NumberDecoder::new(NumberTarget::Float32, |n| {
        Some(n.to_f64() as f32)
    })));
    registry.register_encoder::<f32>(Arc::new(FloatEncoder));
    registry.register_decoder::<f64>(Arc::new(NumberDecoder::new(NumberTarget::Float64, |n| Some(n.to_f64()))));
    registry.register_encoder::<f64>(Arc::new(FloatEncoder));
    registry.register_decoder::<Decimal>(Arc::new(NumberDecoder::new(NumberTarget::Fixed, |n| n.to_decimal())));
    registry.register_encoder::<Decimal>(Arc::new(DisplayEncoder::<Decimal>::new()));

    let string: Arc<dyn ValueDecoder<String>> = Arc::new(TextDecoder::new(|text| String::from(&*text)));
    registry.register_decoder::<String>(Arc::new(NullGuardDecoder::new(string, Some(String::new))));
    registry.register_encoder::<String>(Arc::new(TextEncoder::new(String::as_str)));
    let shared: Arc<dyn ValueDecoder<Arc<str>>> = Arc::new(TextDecoder::new(|text| text));
    registry.register_decoder::<Arc<str>>(Arc::new(NullGuardDecoder::new(shared, Some(empty_text))));
    registry.register_encoder::<Arc<str>>(Arc::new(TextEncoder::new(|text: &Arc<str>| &**text)));

    registry.register_decoder::<Value>(Arc::new(AnyDecoder));
    registry.register_encoder::<Value>(Arc::new(AnyEncoder));
}
