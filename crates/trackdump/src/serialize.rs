//! JSON output.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Write `value` as indented JSON, followed by a newline.
///
/// Map keys keep their insertion order. Non-finite floats are written as
/// `null`.
pub fn write_json<T, W>(value: &T, writer: W, indent: &str) -> io::Result<()>
where
    T: Serialize + ?Sized,
    W: Write,
{
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = Serializer::with_formatter(writer, formatter);
    value.serialize(&mut ser)?;
    let mut writer = ser.into_inner();
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Render `value` as indented JSON.
pub fn to_json_string<T>(value: &T, indent: &str) -> io::Result<String>
where
    T: Serialize + ?Sized,
{
    let mut out = Vec::new();
    write_json(value, &mut out, indent)?;
    String::from_utf8(out).map_err(io::Error::other)
}
