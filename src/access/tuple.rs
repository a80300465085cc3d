use crate::access::{DataType, Value};
use crate::planner::Slot;
use anyhow::{bail, Result};
use bytes::Bytes;

/// Typed, null-checked access to the fields of one channel.
///
/// Callers must check `is_null` before calling a typed reader. Only field 0
/// is read by the interpreter.
pub trait TupleReadable {
    fn is_null(&self, field: usize) -> bool;

    fn get_long(&self, field: usize) -> i64;

    fn get_double(&self, field: usize) -> f64;

    fn get_slice(&self, field: usize) -> Bytes;
}

impl<T: TupleReadable + ?Sized> TupleReadable for &T {
    fn is_null(&self, field: usize) -> bool {
        (**self).is_null(field)
    }

    fn get_long(&self, field: usize) -> i64 {
        (**self).get_long(field)
    }

    fn get_double(&self, field: usize) -> f64 {
        (**self).get_double(field)
    }

    fn get_slice(&self, field: usize) -> Bytes {
        (**self).get_slice(field)
    }
}

/// In-memory tuple holding already-decoded field values
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    fields: Vec<Value>,
}

impl Tuple {
    pub fn new(fields: Vec<Value>) -> Self {
        Self { fields }
    }

    /// Tuple with a single field, the shape every channel has today
    pub fn single(value: Value) -> Self {
        Self {
            fields: vec![value],
        }
    }

    /// Build a row: one single-field tuple per channel
    pub fn row(values: impl IntoIterator<Item = Value>) -> Vec<Tuple> {
        values.into_iter().map(Tuple::single).collect()
    }

    /// Build a row from a JSON array of scalars, one per slot.
    ///
    /// Each scalar must match its slot's declared type; integral numbers are
    /// widened for DOUBLE slots. `null` is accepted for every slot.
    pub fn row_from_json(row: &serde_json::Value, slots: &[Slot]) -> Result<Vec<Tuple>> {
        let serde_json::Value::Array(items) = row else {
            bail!("Row must be a JSON array, got {}", row);
        };
        if items.len() != slots.len() {
            bail!(
                "Row has {} fields but {} slots are declared",
                items.len(),
                slots.len()
            );
        }

        let mut channels = Vec::with_capacity(items.len());
        for (item, slot) in items.iter().zip(slots) {
            let value = match (decode_scalar(item)?, slot.data_type) {
                (Value::Long(v), DataType::Double) => Value::Double(v as f64),
                (value, data_type) => match value.data_type() {
                    None => value,
                    Some(actual) if actual == data_type => value,
                    Some(actual) => bail!("Slot {} cannot hold a {} value {}", slot, actual, item),
                },
            };
            channels.push(Tuple::single(value));
        }
        Ok(channels)
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn field(&self, field: usize) -> &Value {
        match self.fields.get(field) {
            Some(value) => value,
            None => panic!(
                "field {} out of bounds for tuple with {} fields",
                field,
                self.fields.len()
            ),
        }
    }
}

fn decode_scalar(item: &serde_json::Value) -> Result<Value> {
    let value = match item {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(v) => Value::Long(v),
            None => match n.as_f64() {
                Some(v) => Value::Double(v),
                None => bail!("Unsupported number in row: {}", n),
            },
        },
        serde_json::Value::String(s) => Value::string(s),
        other => bail!("Unsupported field value in row: {}", other),
    };
    Ok(value)
}

/// # Panics
///
/// The typed readers panic when the field is missing or holds a value of
/// another type; readers must only be called after `is_null` returned false
/// for a field of the declared type.
impl TupleReadable for Tuple {
    fn is_null(&self, field: usize) -> bool {
        self.field(field).is_null()
    }

    fn get_long(&self, field: usize) -> i64 {
        match self.field(field) {
            Value::Long(v) => *v,
            other => panic!("field {} is {}, not LONG", field, other.type_name()),
        }
    }

    fn get_double(&self, field: usize) -> f64 {
        match self.field(field) {
            Value::Double(v) => *v,
            other => panic!("field {} is {}, not DOUBLE", field, other.type_name()),
        }
    }

    fn get_slice(&self, field: usize) -> Bytes {
        match self.field(field) {
            Value::Bytes(b) => b.clone(),
            other => panic!("field {} is {}, not BYTES", field, other.type_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_readers() {
        let tuple = Tuple::new(vec![
            Value::Long(42),
            Value::Double(1.5),
            Value::string("abc"),
            Value::Null,
        ]);

        assert_eq!(tuple.len(), 4);
        assert!(!tuple.is_null(0));
        assert_eq!(tuple.get_long(0), 42);
        assert_eq!(tuple.get_double(1), 1.5);
        assert_eq!(tuple.get_slice(2), Bytes::from_static(b"abc"));
        assert!(tuple.is_null(3));
    }

    #[test]
    fn test_row_builds_one_channel_per_value() {
        let row = Tuple::row(vec![Value::Long(1), Value::Null]);
        assert_eq!(row.len(), 2);
        assert_eq!(row[0].get_long(0), 1);
        assert!(row[1].is_null(0));
    }

    #[test]
    fn test_reader_through_reference() {
        let tuple = Tuple::single(Value::Long(9));
        let readable: &dyn TupleReadable = &tuple;
        assert_eq!((&readable).get_long(0), 9);
    }

    #[test]
    #[should_panic(expected = "not LONG")]
    fn test_typed_reader_on_wrong_type_panics() {
        Tuple::single(Value::string("x")).get_long(0);
    }

    fn slots(types: &[DataType]) -> Vec<Slot> {
        types
            .iter()
            .enumerate()
            .map(|(id, data_type)| Slot::new(id as u32, format!("t.c{}", id), *data_type))
            .collect()
    }

    #[test]
    fn test_row_from_json() -> Result<()> {
        let declared = slots(&[
            DataType::Long,
            DataType::Double,
            DataType::String,
            DataType::Long,
            DataType::Boolean,
        ]);
        let json: serde_json::Value = serde_json::from_str(r#"[1, 2.5, "x", null, true]"#)?;
        let row = Tuple::row_from_json(&json, &declared)?;

        assert_eq!(row.len(), 5);
        assert_eq!(row[0], Tuple::single(Value::Long(1)));
        assert_eq!(row[1], Tuple::single(Value::Double(2.5)));
        assert_eq!(row[2], Tuple::single(Value::string("x")));
        assert_eq!(row[3], Tuple::single(Value::Null));
        assert_eq!(row[4], Tuple::single(Value::Boolean(true)));

        let bad: serde_json::Value = serde_json::from_str(r#"{"a": 1}"#)?;
        assert!(Tuple::row_from_json(&bad, &declared).is_err());
        Ok(())
    }

    #[test]
    fn test_integral_number_widens_for_double_slot() -> Result<()> {
        let json: serde_json::Value = serde_json::from_str("[100]")?;
        let row = Tuple::row_from_json(&json, &slots(&[DataType::Double]))?;

        assert_eq!(row[0], Tuple::single(Value::Double(100.0)));
        assert_eq!(row[0].get_double(0), 100.0);
        Ok(())
    }

    #[test]
    fn test_mismatched_scalar_is_rejected() -> Result<()> {
        let json: serde_json::Value = serde_json::from_str(r#"["x"]"#)?;
        let err = Tuple::row_from_json(&json, &slots(&[DataType::Long])).unwrap_err();
        assert_eq!(err.to_string(), r#"Slot t.c0#0:LONG cannot hold a STRING value "x""#);

        // Doubles are never narrowed into LONG slots
        let json: serde_json::Value = serde_json::from_str("[1.5]")?;
        assert!(Tuple::row_from_json(&json, &slots(&[DataType::Long])).is_err());
        Ok(())
    }

    #[test]
    fn test_row_length_must_match_slots() -> Result<()> {
        let json: serde_json::Value = serde_json::from_str("[1, 2]")?;
        let err = Tuple::row_from_json(&json, &slots(&[DataType::Long])).unwrap_err();
        assert_eq!(err.to_string(), "Row has 2 fields but 1 slots are declared");
        Ok(())
    }
}
