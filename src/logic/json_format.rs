//! JSON writer honouring PHP-style `json_encode` flags so rendered documents
//! match the established wire format byte for byte.

use crate::model::{PresentationOptions, Result};
use serde::Serialize;
use serde_json::ser::{CharEscape, Formatter, Serializer};
use serde_json::{Map, Value};
use std::io;
use std::ops::{BitOr, BitOrAssign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct JsonFlags(u32);

impl JsonFlags {
    pub const NONE: JsonFlags = JsonFlags(0);
    pub const HEX_TAG: JsonFlags = JsonFlags(1);
    pub const HEX_AMP: JsonFlags = JsonFlags(2);
    pub const HEX_APOS: JsonFlags = JsonFlags(4);
    pub const HEX_QUOT: JsonFlags = JsonFlags(8);
    pub const FORCE_OBJECT: JsonFlags = JsonFlags(16);
    pub const UNESCAPED_SLASHES: JsonFlags = JsonFlags(64);
    pub const PRETTY_PRINT: JsonFlags = JsonFlags(128);
    pub const UNESCAPED_UNICODE: JsonFlags = JsonFlags(256);
    pub const PRESERVE_ZERO_FRACTION: JsonFlags = JsonFlags(1024);
    pub const UNESCAPED_LINE_TERMINATORS: JsonFlags = JsonFlags(2048);

    pub fn from_bits(bits: u32) -> Self {
        JsonFlags(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, other: JsonFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Flags for one encode: the caller's base flags, plus pretty printing when
    /// it was requested and the process runs in debug mode
    pub fn for_options(options: &PresentationOptions) -> Self {
        let mut flags = JsonFlags::from_bits(options.json_options.bits());
        if options.debug_pretty_print && options.environment.is_debug() {
            flags |= JsonFlags::PRETTY_PRINT;
        }
        flags
    }
}

impl BitOr for JsonFlags {
    type Output = JsonFlags;

    fn bitor(self, rhs: JsonFlags) -> JsonFlags {
        JsonFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for JsonFlags {
    fn bitor_assign(&mut self, rhs: JsonFlags) {
        self.0 |= rhs.0;
    }
}

/// Serialize `value` to a string using `flags`
pub fn to_json_string<T: Serialize>(value: &T, flags: JsonFlags) -> Result<String> {
    let mut value = serde_json::to_value(value)?;
    if flags.contains(JsonFlags::FORCE_OBJECT) {
        value = force_object(value);
    }

    let mut out = Vec::with_capacity(256);
    let mut serializer = Serializer::with_formatter(&mut out, FlagFormatter::new(flags));
    value.serialize(&mut serializer)?;

    // The formatter only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn force_object(value: Value) -> Value {
    match value {
        Value::Array(items) => {
            let map: Map<String, Value> = items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| (idx.to_string(), force_object(item)))
                .collect();
            Value::Object(map)
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, force_object(item)))
                .collect(),
        ),
        other => other,
    }
}

struct FlagFormatter {
    flags: JsonFlags,
    current_indent: usize,
    has_value: bool,
}

impl FlagFormatter {
    fn new(flags: JsonFlags) -> Self {
        Self {
            flags,
            current_indent: 0,
            has_value: false,
        }
    }

    fn pretty(&self) -> bool {
        self.flags.contains(JsonFlags::PRETTY_PRINT)
    }

    fn indent<W: ?Sized + io::Write>(&self, writer: &mut W) -> io::Result<()> {
        for _ in 0..self.current_indent {
            writer.write_all(b"    ")?;
        }
        Ok(())
    }

    fn escape_char(&self, c: char, buf: &mut String) {
        match c {
            '/' if !self.flags.contains(JsonFlags::UNESCAPED_SLASHES) => buf.push_str("\\/"),
            '<' if self.flags.contains(JsonFlags::HEX_TAG) => buf.push_str("\\u003C"),
            '>' if self.flags.contains(JsonFlags::HEX_TAG) => buf.push_str("\\u003E"),
            '&' if self.flags.contains(JsonFlags::HEX_AMP) => buf.push_str("\\u0026"),
            '\'' if self.flags.contains(JsonFlags::HEX_APOS) => buf.push_str("\\u0027"),
            '\u{2028}' | '\u{2029}'
                if !self.flags.contains(JsonFlags::UNESCAPED_LINE_TERMINATORS) =>
            {
                push_utf16_escapes(c, buf)
            }
            c if !c.is_ascii() && !self.flags.contains(JsonFlags::UNESCAPED_UNICODE) => {
                push_utf16_escapes(c, buf)
            }
            c => buf.push(c),
        }
    }
}

fn push_utf16_escapes(c: char, buf: &mut String) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        buf.push_str(&format!("\\u{:04x}", unit));
    }
}

impl Formatter for FlagFormatter {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.current_indent += 1;
        self.has_value = false;
        writer.write_all(b"[")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.current_indent -= 1;
        if self.pretty() && self.has_value {
            writer.write_all(b"\n")?;
            self.indent(writer)?;
        }
        writer.write_all(b"]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if !first {
            writer.write_all(b",")?;
        }
        if self.pretty() {
            writer.write_all(b"\n")?;
            self.indent(writer)?;
        }
        Ok(())
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.current_indent += 1;
        self.has_value = false;
        writer.write_all(b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.current_indent -= 1;
        if self.pretty() && self.has_value {
            writer.write_all(b"\n")?;
            self.indent(writer)?;
        }
        writer.write_all(b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if !first {
            writer.write_all(b",")?;
        }
        if self.pretty() {
            writer.write_all(b"\n")?;
            self.indent(writer)?;
        }
        Ok(())
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        if self.pretty() {
            writer.write_all(b": ")
        } else {
            writer.write_all(b":")
        }
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        if value.is_finite()
            && value.fract() == 0.0
            && value.abs() < 1e15
            && !self.flags.contains(JsonFlags::PRESERVE_ZERO_FRACTION)
        {
            return write!(writer, "{}", value as i64);
        }
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
            return write!(writer, "{}.0", value as i64);
        }
        let mut buffer = Vec::new();
        serde_json::to_writer(&mut buffer, &value).map_err(io::Error::from)?;
        writer.write_all(&buffer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut buf = String::with_capacity(fragment.len());
        for c in fragment.chars() {
            self.escape_char(c, &mut buf);
        }
        writer.write_all(buf.as_bytes())
    }

    fn write_char_escape<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        char_escape: CharEscape,
    ) -> io::Result<()> {
        let escaped: String = match char_escape {
            CharEscape::Quote if self.flags.contains(JsonFlags::HEX_QUOT) => "\\u0022".into(),
            CharEscape::Quote => "\\\"".into(),
            CharEscape::ReverseSolidus => "\\\\".into(),
            CharEscape::Solidus => "\\/".into(),
            CharEscape::Backspace => "\\b".into(),
            CharEscape::FormFeed => "\\f".into(),
            CharEscape::LineFeed => "\\n".into(),
            CharEscape::CarriageReturn => "\\r".into(),
            CharEscape::Tab => "\\t".into(),
            CharEscape::AsciiControl(byte) => format!("\\u{:04x}", byte),
        };
        writer.write_all(escaped.as_bytes())
    }
}
