//! Registration of the built-in [`Message`] and [`Context`] values.
//!
//! Both carry nothing but their message, so the payload is empty and the
//! decoder rebuilds the value from the record's message.

use std::sync::Arc;

use crate::error::Result;
use crate::node::{Context, ErrorValue, Message};
use crate::type_key::TypeKey;

use super::{RegistryBuilder, RegistryEntry};

pub(super) fn register_builtins(builder: &mut RegistryBuilder) {
    builder.insert(
        TypeKey::of::<Message>(),
        RegistryEntry {
            encode: Arc::new(encode_empty),
            decode: Arc::new(decode_message),
        },
    );
    builder.insert(
        TypeKey::of::<Context>(),
        RegistryEntry {
            encode: Arc::new(encode_empty),
            decode: Arc::new(decode_context),
        },
    );
}

fn encode_empty(_value: &dyn ErrorValue) -> Result<Vec<u8>> {
    Ok(Vec::new())
}

fn decode_message(message: &str, _payload: &[u8]) -> Result<Box<dyn ErrorValue>> {
    Ok(Box::new(Message(message.to_string())))
}

fn decode_context(message: &str, _payload: &[u8]) -> Result<Box<dyn ErrorValue>> {
    Ok(Box::new(Context(message.to_string())))
}

#[cfg(test)]
mod tests {
    use crate::node::{Context, Message};
    use crate::registry::Registry;
    use crate::type_key::TypeKey;

    #[test]
    fn test_builtin_payload_is_empty() {
        let registry = Registry::with_builtins();
        let encode = registry.encoder(&TypeKey::of::<Message>()).unwrap();
        assert!(encode(&Message("hello".into())).unwrap().is_empty());
    }

    #[test]
    fn test_builtin_decodes_from_message() {
        let registry = Registry::with_builtins();
        let decode = registry.decoder(&TypeKey::of::<Context>()).unwrap();
        let value = decode("while sending", &[]).unwrap();
        assert_eq!(value.to_string(), "while sending");
        assert_eq!(value.type_key(), TypeKey::of::<Context>());
    }
}
