use bytes::Buf;
use commonware_codec::{Error, ReadExt};

/// Reads a `u8` that must be strictly below `limit` (board cells, columns, colours).
pub(crate) fn read_index(
    reader: &mut impl Buf,
    limit: u8,
    what: &'static str,
) -> Result<u8, Error> {
    let value = u8::read(reader)?;
    if value >= limit {
        return Err(Error::Invalid(what, "out of range"));
    }
    Ok(value)
}
