//! Untyped encoding.

use super::{FloatEncoder, JsonWriter, ValueEncoder};
use crate::error::Result;
use crate::value::Value;

/// Encodes a [`Value`] tree.
pub(crate) struct AnyEncoder;

impl ValueEncoder<Value> for AnyEncoder {
    fn encode(&self, writer: &mut JsonWriter<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Null => writer.write_null(),
            Value::Bool(b) => writer.write_raw(if *b { "true" } else { "false" }),
            Value::Int(v) => writer.write_display(v),
            Value::Long(v) => writer.write_display(v),
            Value::Decimal(d) => writer.write_display(d),
            Value::Double(v) => FloatEncoder.encode(writer, v),
            Value::String(s) => writer.write_string(s),
            Value::List(items) => {
                writer.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writer.item_separator()?;
                    }
                    self.encode(writer, item)?;
                }
                writer.write_char(']')
            }
            Value::Map(map) => {
                writer.write_char('{')?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        writer.item_separator()?;
                    }
                    writer.write_string(key)?;
                    writer.key_separator()?;
                    self.encode(writer, item)?;
                }
                writer.write_char('}')
            }
        }
    }
}
