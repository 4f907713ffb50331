use crate::{Error, Result};
use indexmap::IndexMap;
use std::fmt;

/// Dictionary object.
#[derive(Clone, Default, PartialEq)]
pub(crate) struct Dictionary(IndexMap<Vec<u8>, Object>);

/// Objects produced by the CMap object parser.
///
/// This model only lives while a CMap program is being parsed; the parsed CMaps
/// expose typed data instead.
#[derive(Clone, PartialEq)]
pub(crate) enum Object {
    Integer(i64),
    Real(f64),
    Name(Vec<u8>),
    String(Vec<u8>),
    HexString(Vec<u8>),
    Array(Vec<Object>),
    Dictionary(Dictionary),
    /// Bare keyword, recorded but never evaluated.
    Operand(Vec<u8>),
}

impl Object {
    pub(crate) fn enum_variant(&self) -> &'static str {
        match self {
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::Name(_) => "Name",
            Object::String(_) => "String",
            Object::HexString(_) => "HexString",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Operand(_) => "Operand",
        }
    }

    fn type_error(&self, expected: &'static str) -> Error {
        Error::ObjectType {
            expected,
            found: self.enum_variant(),
        }
    }

    pub(crate) fn is_operand(&self, keyword: &[u8]) -> bool {
        matches!(self, Object::Operand(op) if op.as_slice() == keyword)
    }

    pub(crate) fn as_i64(&self) -> Result<i64> {
        match *self {
            Object::Integer(value) => Ok(value),
            _ => Err(self.type_error("Integer")),
        }
    }

    pub(crate) fn as_name(&self) -> Result<&[u8]> {
        match self {
            Object::Name(name) => Ok(name),
            _ => Err(self.type_error("Name")),
        }
    }

    pub(crate) fn as_name_str(&self) -> Result<String> {
        Ok(String::from_utf8_lossy(self.as_name()?).into_owned())
    }

    pub(crate) fn as_hex_str(&self) -> Result<&[u8]> {
        match self {
            Object::HexString(bytes) => Ok(bytes),
            _ => Err(self.type_error("HexString")),
        }
    }

    /// Text of a string, accepting names as well since some generators emit
    /// `/Adobe` where `(Adobe)` is expected.
    pub(crate) fn as_text(&self) -> Result<String> {
        match self {
            Object::String(text) | Object::Name(text) => Ok(String::from_utf8_lossy(text).into_owned()),
            _ => Err(self.type_error("String")),
        }
    }

    pub(crate) fn as_array(&self) -> Result<&Vec<Object>> {
        match self {
            Object::Array(array) => Ok(array),
            _ => Err(self.type_error("Array")),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Real(value) => write!(f, "{}", value),
            Object::Name(name) => write!(f, "/{}", String::from_utf8_lossy(name)),
            Object::String(text) => write!(f, "({})", String::from_utf8_lossy(text)),
            Object::HexString(bytes) => {
                f.write_str("<")?;
                for byte in bytes {
                    write!(f, "{:02X}", byte)?;
                }
                f.write_str(">")
            }
            Object::Array(array) => {
                let items = array.iter().map(|item| format!("{:?}", item)).collect::<Vec<String>>();
                write!(f, "[{}]", items.join(" "))
            }
            Object::Dictionary(dict) => write!(f, "{:?}", dict),
            Object::Operand(op) => f.write_str(&String::from_utf8_lossy(op)),
        }
    }
}

impl Dictionary {
    pub(crate) fn new() -> Dictionary {
        Dictionary(IndexMap::new())
    }

    pub(crate) fn get(&self, key: &[u8]) -> Option<&Object> {
        self.0.get(key)
    }

    pub(crate) fn set<K>(&mut self, key: K, value: Object)
    where
        K: Into<Vec<u8>>,
    {
        self.0.insert(key.into(), value);
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .0
            .iter()
            .map(|(key, value)| format!("/{} {:?}", String::from_utf8_lossy(key), value))
            .collect::<Vec<String>>();
        write!(f, "<<{}>>", entries.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_report_found_type() {
        let object = Object::Operand(b"def".to_vec());
        assert!(object.is_operand(b"def"));
        assert!(!object.is_operand(b"end"));
        match object.as_hex_str() {
            Err(Error::ObjectType { expected, found }) => {
                assert_eq!(expected, "HexString");
                assert_eq!(found, "Operand");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn text_accepts_names() {
        assert_eq!(Object::Name(b"Adobe".to_vec()).as_text().unwrap(), "Adobe");
        assert_eq!(Object::String(b"UCS".to_vec()).as_text().unwrap(), "UCS");
        assert!(Object::Integer(0).as_text().is_err());
    }

    #[test]
    fn debug_output() {
        let mut dict = Dictionary::new();
        dict.set("Registry", Object::String(b"Adobe".to_vec()));
        dict.set("Supplement", Object::Integer(0));
        let array = Object::Array(vec![
            Object::HexString(vec![0xd8, 0x3d, 0xde, 0x00]),
            Object::Dictionary(dict),
        ]);
        assert_eq!(format!("{:?}", array), "[<D83DDE00> <</Registry (Adobe)/Supplement 0>>]");
    }
}
