//! Untyped decoding.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{JsonReader, Magnitude, NumberTarget, ValueDecoder};
use crate::error::{CodecError, Result};
use crate::runtime::RuntimeType;
use crate::value::Value;

/// Decodes any JSON value into a [`Value`], dispatching on lookahead.
pub(crate) struct AnyDecoder;

impl AnyDecoder {
    fn decode_number(reader: &mut JsonReader<'_>) -> Result<Value> {
        let offset = reader.position();
        let number = reader.lex_number(NumberTarget::Any)?;
        if let Magnitude::Float(_) = number.magnitude {
            return Ok(Value::Double(number.to_f64()));
        }
        let decimal = number.to_decimal().ok_or_else(|| CodecError::InvalidNumber {
            offset,
            reason: "out of range".to_owned(),
        })?;
        if decimal.is_integral() {
            let integer = decimal.trunc();
            if let Ok(v) = i32::try_from(integer) {
                return Ok(Value::Int(v));
            }
            if let Ok(v) = i64::try_from(integer) {
                return Ok(Value::Long(v));
            }
        }
        Ok(Value::Decimal(decimal))
    }
}

impl ValueDecoder<Value> for AnyDecoder {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<Value> {
        match reader.peek_token() {
            Some('n') => reader.consume_keyword("null").map(|_| Value::Null),
            Some('t') => reader.consume_keyword("true").map(|_| Value::Bool(true)),
            Some('f') => reader.consume_keyword("false").map(|_| Value::Bool(false)),
            Some('"') => reader.lex_string().map(Value::String),
            Some('[') => {
                let mut items = Vec::new();
                reader.read_array(|reader| {
                    items.push(self.decode(reader)?);
                    Ok(())
                })?;
                Ok(Value::List(items))
            }
            Some('{') => {
                let mut map = IndexMap::new();
                reader.read_object(|reader, key| {
                    let value = self.decode(reader)?;
                    map.insert(key, value);
                    Ok(())
                })?;
                Ok(Value::Map(map))
            }
            _ => Self::decode_number(reader),
        }
    }
}

/// Object keyed by member name with values of caller-chosen types.
pub type LooseObject = IndexMap<Arc<str>, Box<dyn Any + Send>>;

/// Decodes an object whose known keys have declared runtime types; other
/// keys decode as [`Value`].
pub(crate) struct FieldLookupDecoder {
    fields: HashMap<Arc<str>, RuntimeType>,
}

impl FieldLookupDecoder {
    pub(crate) fn new(fields: HashMap<Arc<str>, RuntimeType>) -> Self {
        Self { fields }
    }
}

impl ValueDecoder<Option<LooseObject>> for FieldLookupDecoder {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<Option<LooseObject>> {
        if reader.try_consume_keyword("null") {
            return Ok(None);
        }
        let mut object = LooseObject::new();
        reader.read_object(|reader, key| {
            let value = match self.fields.get(&*key) {
                Some(runtime) => runtime.decode(reader)?,
                None => Box::new(AnyDecoder.decode(reader)?),
            };
            object.insert(key, value);
            Ok(())
        })?;
        Ok(Some(object))
    }
}
