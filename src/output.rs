use std::io::{self, Write};

use crate::value::{MintValue, Value};

/// Where `print` sends its values, in the order the statements execute.
pub trait OutputChannel {
    fn emit(&mut self, value: &Value) -> io::Result<()>;
}

// Collects printed values, used when embedding and in tests
impl OutputChannel for Vec<MintValue> {
    fn emit(&mut self, value: &Value) -> io::Result<()> {
        self.push(value.into());
        Ok(())
    }
}

impl<T: OutputChannel + ?Sized> OutputChannel for &mut T {
    fn emit(&mut self, value: &Value) -> io::Result<()> {
        (**self).emit(value)
    }
}

/// Writes one rendered value per line.
pub struct WriterChannel<W: Write>(W);

impl<W: Write> WriterChannel<W> {
    pub fn new(writer: W) -> Self {
        Self(writer)
    }

    pub fn into_inner(self) -> W {
        self.0
    }
}

impl WriterChannel<io::Stdout> {
    pub fn stdout() -> Self {
        Self(io::stdout())
    }
}

impl<W: Write> OutputChannel for WriterChannel<W> {
    fn emit(&mut self, value: &Value) -> io::Result<()> {
        writeln!(self.0, "{}", value)
    }
}

/// Writes one JSON document per line. JSON has no NaN or infinities, those
/// numbers are written as the strings `"NaN"`, `"inf"` and `"-inf"`.
pub struct JsonChannel<W: Write>(W);

impl<W: Write> JsonChannel<W> {
    pub fn new(writer: W) -> Self {
        Self(writer)
    }

    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: Write> OutputChannel for JsonChannel<W> {
    fn emit(&mut self, value: &Value) -> io::Result<()> {
        match value {
            Value::Number(number) if !number.is_finite() => serde_json::to_writer(&mut self.0, &number.to_string())?,
            value => serde_json::to_writer(&mut self.0, &MintValue::from(value))?,
        }
        self.0.write_all(b"\n")
    }
}
