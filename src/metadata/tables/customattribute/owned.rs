use crate::metadata::token::Token;

/// A custom attribute attached to a metadata entity.
///
/// The constructor is kept as a token and the value blob as opaque bytes; decoding either is up
/// to the consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomAttribute {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// The entity this attribute is attached to
    pub parent: Token,
    /// The `MethodDef` or `MemberRef` constructor of the attribute type
    pub constructor: Token,
    /// The raw value blob
    pub value: Vec<u8>,
}
