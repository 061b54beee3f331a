//! Binary framing for the realtime chat channel.
//!
//! Layout of one frame:
//!
//! ```text
//!  byte 0: FIN(1) RSV(3) OPCODE(4)
//!  byte 1: MASK(1) LEN(7)
//!  LEN = 126 -> 2 more bytes, big-endian u16 length
//!  LEN = 127 -> 8 more bytes, big-endian u64 length
//!  MASK = 1  -> 4-byte masking key
//!  payload   -> payload[i] ^ key[i % 4] when masked
//! ```
//!
//! [`decode`] is a pure function over a byte slice so the receive loop can
//! keep its own buffer and call it until it reports [`DecodeError::Incomplete`].

/// Largest payload length that fits in the 7-bit length field.
const MAX_INLINE_LEN: usize = 125;
/// 7-bit marker for a following 16-bit length.
const LEN_U16_MARKER: u8 = 126;
/// 7-bit marker for a following 64-bit length.
const LEN_U64_MARKER: u8 = 127;
/// Control frames may carry at most this many payload bytes.
const MAX_CONTROL_PAYLOAD: usize = 125;

const FIN_BIT: u8 = 0b1000_0000;
const RSV_BITS: u8 = 0b0111_0000;
const OPCODE_BITS: u8 = 0b0000_1111;
const MASK_BIT: u8 = 0b1000_0000;
const LEN_BITS: u8 = 0b0111_1111;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Continuation,
    Text,
    Binary,
    Close,
    Ping,
    Pong,
}

impl OpCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x0 => Some(OpCode::Continuation),
            0x1 => Some(OpCode::Text),
            0x2 => Some(OpCode::Binary),
            0x8 => Some(OpCode::Close),
            0x9 => Some(OpCode::Ping),
            0xA => Some(OpCode::Pong),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            OpCode::Continuation => 0x0,
            OpCode::Text => 0x1,
            OpCode::Binary => 0x2,
            OpCode::Close => 0x8,
            OpCode::Ping => 0x9,
            OpCode::Pong => 0xA,
        }
    }

    pub fn is_control(self) -> bool {
        matches!(self, OpCode::Close | OpCode::Ping | OpCode::Pong)
    }
}

/// A decoded (already unmasked) frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub fin: bool,
    pub opcode: OpCode,
    /// Whether the frame arrived with a masking key.
    pub masked: bool,
    pub payload: Vec<u8>,
}

impl Frame {
    /// An unfragmented text frame.
    pub fn text(payload: impl Into<String>) -> Self {
        Self {
            fin: true,
            opcode: OpCode::Text,
            masked: false,
            payload: payload.into().into_bytes(),
        }
    }

    /// An empty close frame.
    pub fn close() -> Self {
        Self {
            fin: true,
            opcode: OpCode::Close,
            masked: false,
            payload: Vec::new(),
        }
    }

    /// Encode without a mask, as the server always sends.
    pub fn encode(&self) -> Vec<u8> {
        self.encode_inner(None)
    }

    /// Encode with a masking key, as a client sends.
    pub fn encode_masked(&self, mask: [u8; 4]) -> Vec<u8> {
        self.encode_inner(Some(mask))
    }

    fn encode_inner(&self, mask: Option<[u8; 4]>) -> Vec<u8> {
        let len = self.payload.len();
        let mut out = Vec::with_capacity(len + 14);

        let fin_bit = if self.fin { FIN_BIT } else { 0 };
        out.push(fin_bit | self.opcode.as_u8());

        let mask_bit = if mask.is_some() { MASK_BIT } else { 0 };
        if len <= MAX_INLINE_LEN {
            out.push(mask_bit | len as u8);
        } else if let Ok(short) = u16::try_from(len) {
            out.push(mask_bit | LEN_U16_MARKER);
            out.extend_from_slice(&short.to_be_bytes());
        } else {
            out.push(mask_bit | LEN_U64_MARKER);
            out.extend_from_slice(&(len as u64).to_be_bytes());
        }

        match mask {
            Some(key) => {
                out.extend_from_slice(&key);
                out.extend(
                    self.payload
                        .iter()
                        .enumerate()
                        .map(|(i, b)| b ^ key[i % 4]),
                );
            }
            None => out.extend_from_slice(&self.payload),
        }
        out
    }
}

/// Encode `text` as an unfragmented, unmasked text frame.
pub fn encode_text(text: &str) -> Vec<u8> {
    Frame::text(text).encode()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The buffer does not yet hold a whole frame.
    #[error("incomplete frame, at least {needed} more byte(s) required")]
    Incomplete { needed: usize },

    #[error("reserved header bits are set")]
    ReservedBits,

    #[error("unknown opcode {0:#x}")]
    UnknownOpcode(u8),

    #[error("control frames must be final and carry at most 125 bytes")]
    InvalidControlFrame,

    #[error("frame payload of {len} bytes exceeds the {max} byte limit")]
    TooLarge { len: u64, max: usize },
}

impl DecodeError {
    /// True when more input may turn this into a successful decode.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, DecodeError::Incomplete { .. })
    }
}

/// Decode one frame from the front of `buf`.
///
/// On success returns the frame and the number of bytes it occupied, so the
/// caller can drop exactly that prefix from its buffer. `max_payload` caps the
/// declared payload length before any allocation happens.
pub fn decode(buf: &[u8], max_payload: usize) -> Result<(Frame, usize), DecodeError> {
    if buf.len() < 2 {
        return Err(DecodeError::Incomplete {
            needed: 2 - buf.len(),
        });
    }

    let first = buf[0];
    let second = buf[1];

    if first & RSV_BITS != 0 {
        return Err(DecodeError::ReservedBits);
    }
    let fin = first & FIN_BIT != 0;
    let raw_opcode = first & OPCODE_BITS;
    let opcode = OpCode::from_u8(raw_opcode).ok_or(DecodeError::UnknownOpcode(raw_opcode))?;

    let masked = second & MASK_BIT != 0;
    let len_indicator = second & LEN_BITS;

    let mut offset = 2;
    let declared_len: u64 = match len_indicator {
        LEN_U16_MARKER => {
            let bytes = take::<2>(buf, offset)?;
            offset += 2;
            u64::from(u16::from_be_bytes(bytes))
        }
        LEN_U64_MARKER => {
            let bytes = take::<8>(buf, offset)?;
            offset += 8;
            u64::from_be_bytes(bytes)
        }
        short => u64::from(short),
    };

    if opcode.is_control() && (!fin || declared_len > MAX_CONTROL_PAYLOAD as u64) {
        return Err(DecodeError::InvalidControlFrame);
    }
    if declared_len > max_payload as u64 {
        return Err(DecodeError::TooLarge {
            len: declared_len,
            max: max_payload,
        });
    }
    // Bounded by `max_payload`, which is a usize.
    let len = declared_len as usize;

    let mask = if masked {
        let key = take::<4>(buf, offset)?;
        offset += 4;
        Some(key)
    } else {
        None
    };

    let end = offset + len;
    if buf.len() < end {
        return Err(DecodeError::Incomplete {
            needed: end - buf.len(),
        });
    }

    let payload = match mask {
        Some(key) => buf[offset..end]
            .iter()
            .enumerate()
            .map(|(i, b)| b ^ key[i % 4])
            .collect(),
        None => buf[offset..end].to_vec(),
    };

    Ok((
        Frame {
            fin,
            opcode,
            masked,
            payload,
        },
        end,
    ))
}

fn take<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], DecodeError> {
    buf.get(offset..offset + N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| DecodeError::Incomplete {
            needed: (offset + N).saturating_sub(buf.len()),
        })
}
