//! Gate kinds and their pin arithmetic.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::CircuitError;

/// Allowed input counts for the multi-input logic gates.
pub const LOGIC_INPUTS: RangeInclusive<u8> = 2..=8;
/// Allowed select widths for multiplexers and demultiplexers.
pub const SELECT_BITS: RangeInclusive<u8> = 1..=3;
/// Allowed input counts for priority encoders.
pub const ENCODER_SIZES: [u8; 4] = [2, 4, 8, 16];
/// Allowed input counts for binary decoders.
pub const DECODER_INPUTS: RangeInclusive<u8> = 1..=4;

/// Boolean function of a multi-input gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicOp {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
}

impl LogicOp {
    pub const ALL: [LogicOp; 6] = [
        LogicOp::And,
        LogicOp::Or,
        LogicOp::Nand,
        LogicOp::Nor,
        LogicOp::Xor,
        LogicOp::Xnor,
    ];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Xor => "XOR",
            Self::Xnor => "XNOR",
        }
    }

    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::And => "ANDGate",
            Self::Or => "ORGate",
            Self::Nand => "NANDGate",
            Self::Nor => "NORGate",
            Self::Xor => "XORGate",
            Self::Xnor => "XNORGate",
        }
    }
}

/// What a component computes, including its size parameter.
///
/// Sizes are checked by [`GateKind::validate`]; the constructors below only
/// produce valid kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKind {
    Logic { op: LogicOp, inputs: u8 },
    Not,
    Mux { select_bits: u8 },
    Demux { select_bits: u8 },
    Encoder { inputs: u8 },
    Decoder { inputs: u8 },
    Input { state: bool },
    Led,
}

impl GateKind {
    pub fn logic(op: LogicOp, inputs: u8) -> Result<Self, CircuitError> {
        let kind = Self::Logic { op, inputs };
        kind.validate()?;
        Ok(kind)
    }

    pub fn mux(select_bits: u8) -> Result<Self, CircuitError> {
        let kind = Self::Mux { select_bits };
        kind.validate()?;
        Ok(kind)
    }

    pub fn demux(select_bits: u8) -> Result<Self, CircuitError> {
        let kind = Self::Demux { select_bits };
        kind.validate()?;
        Ok(kind)
    }

    pub fn encoder(inputs: u8) -> Result<Self, CircuitError> {
        let kind = Self::Encoder { inputs };
        kind.validate()?;
        Ok(kind)
    }

    pub fn decoder(inputs: u8) -> Result<Self, CircuitError> {
        let kind = Self::Decoder { inputs };
        kind.validate()?;
        Ok(kind)
    }

    #[must_use]
    pub const fn input() -> Self {
        Self::Input { state: false }
    }

    pub fn validate(&self) -> Result<(), CircuitError> {
        let ok = match *self {
            Self::Logic { inputs, .. } => LOGIC_INPUTS.contains(&inputs),
            Self::Mux { select_bits } | Self::Demux { select_bits } => {
                SELECT_BITS.contains(&select_bits)
            }
            Self::Encoder { inputs } => ENCODER_SIZES.contains(&inputs),
            Self::Decoder { inputs } => DECODER_INPUTS.contains(&inputs),
            Self::Not | Self::Input { .. } | Self::Led => true,
        };
        if ok {
            Ok(())
        } else {
            Err(CircuitError::InvalidGateSize {
                kind: self.display_name(),
                size: self.size().unwrap_or_default(),
            })
        }
    }

    /// The adjustable size parameter, if this kind has one.
    #[must_use]
    pub const fn size(&self) -> Option<u8> {
        match *self {
            Self::Logic { inputs, .. } | Self::Encoder { inputs } | Self::Decoder { inputs } => {
                Some(inputs)
            }
            Self::Mux { select_bits } | Self::Demux { select_bits } => Some(select_bits),
            Self::Not | Self::Input { .. } | Self::Led => None,
        }
    }

    /// Step the size parameter by `delta`, clamped to the allowed range.
    ///
    /// Encoders step through [`ENCODER_SIZES`]; a size outside that list
    /// snaps to the nearest entry first.
    #[must_use]
    pub fn resized(self, delta: i32) -> Self {
        fn step(current: u8, delta: i32, range: &RangeInclusive<u8>) -> u8 {
            let next = i32::from(current).saturating_add(delta);
            next.clamp(i32::from(*range.start()), i32::from(*range.end())) as u8
        }

        match self {
            Self::Logic { op, inputs } => Self::Logic {
                op,
                inputs: step(inputs, delta, &LOGIC_INPUTS),
            },
            Self::Mux { select_bits } => Self::Mux {
                select_bits: step(select_bits, delta, &SELECT_BITS),
            },
            Self::Demux { select_bits } => Self::Demux {
                select_bits: step(select_bits, delta, &SELECT_BITS),
            },
            Self::Encoder { inputs } => {
                let current = nearest_encoder_index(inputs) as i32;
                let last = ENCODER_SIZES.len() as i32 - 1;
                let next = current.saturating_add(delta).clamp(0, last) as usize;
                Self::Encoder {
                    inputs: ENCODER_SIZES[next],
                }
            }
            Self::Decoder { inputs } => Self::Decoder {
                inputs: step(inputs, delta, &DECODER_INPUTS),
            },
            other @ (Self::Not | Self::Input { .. } | Self::Led) => other,
        }
    }

    /// Clamp an out-of-range size into range. Used when loading files.
    #[must_use]
    pub fn clamped(self) -> Self {
        self.resized(0)
    }

    #[must_use]
    pub fn input_count(&self) -> usize {
        match *self {
            Self::Logic { inputs, .. } | Self::Encoder { inputs } | Self::Decoder { inputs } => {
                usize::from(inputs)
            }
            Self::Not | Self::Led => 1,
            Self::Mux { select_bits } => (1usize << select_bits) + usize::from(select_bits),
            Self::Demux { select_bits } => 1 + usize::from(select_bits),
            Self::Input { .. } => 0,
        }
    }

    #[must_use]
    pub fn output_count(&self) -> usize {
        match *self {
            Self::Logic { .. } | Self::Not | Self::Mux { .. } | Self::Input { .. } => 1,
            Self::Demux { select_bits } => 1usize << select_bits,
            Self::Encoder { inputs } => encoder_outputs(inputs),
            Self::Decoder { inputs } => 1usize << inputs,
            Self::Led => 0,
        }
    }

    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match *self {
            Self::Logic { op, .. } => op.display_name(),
            Self::Not => "NOT",
            Self::Mux { .. } => "MUX",
            Self::Demux { .. } => "DEMUX",
            Self::Encoder { .. } => "ENCODER",
            Self::Decoder { .. } => "DECODER",
            Self::Input { .. } => "INPUT",
            Self::Led => "LED",
        }
    }

    /// Class name used in circuit files.
    #[must_use]
    pub const fn class_name(&self) -> &'static str {
        match *self {
            Self::Logic { op, .. } => op.class_name(),
            Self::Not => "NOTGate",
            Self::Mux { .. } => "Multiplexer",
            Self::Demux { .. } => "Demultiplexer",
            Self::Encoder { .. } => "Encoder",
            Self::Decoder { .. } => "Decoder",
            Self::Input { .. } => "InputSwitch",
            Self::Led => "OutputLED",
        }
    }

    /// Default-sized kind for a circuit-file class name.
    #[must_use]
    pub fn from_class_name(name: &str) -> Option<Self> {
        if let Some(op) = LogicOp::ALL.into_iter().find(|op| op.class_name() == name) {
            return Some(Self::Logic { op, inputs: 2 });
        }
        match name {
            "NOTGate" => Some(Self::Not),
            "Multiplexer" => Some(Self::Mux { select_bits: 1 }),
            "Demultiplexer" => Some(Self::Demux { select_bits: 1 }),
            "Encoder" => Some(Self::Encoder { inputs: 4 }),
            "Decoder" => Some(Self::Decoder { inputs: 2 }),
            "InputSwitch" => Some(Self::input()),
            "OutputLED" => Some(Self::Led),
            _ => None,
        }
    }

    /// Default-sized kind for a display name (`and`, `mux`, `led`, ...),
    /// case-insensitive.
    #[must_use]
    pub fn from_display_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        if let Some(op) = LogicOp::ALL
            .into_iter()
            .find(|op| op.display_name() == upper)
        {
            return Some(Self::Logic { op, inputs: 2 });
        }
        match upper.as_str() {
            "NOT" => Some(Self::Not),
            "MUX" => Some(Self::Mux { select_bits: 1 }),
            "DEMUX" => Some(Self::Demux { select_bits: 1 }),
            "ENCODER" => Some(Self::Encoder { inputs: 4 }),
            "DECODER" => Some(Self::Decoder { inputs: 2 }),
            "INPUT" | "SWITCH" => Some(Self::input()),
            "LED" | "OUTPUT" => Some(Self::Led),
            _ => None,
        }
    }

    /// Same kind with its size parameter replaced.
    pub fn with_size(self, size: u8) -> Result<Self, CircuitError> {
        let kind = self.replace_size(size);
        kind.validate()?;
        Ok(kind)
    }

    /// Same kind with its size parameter replaced and clamped into range.
    #[must_use]
    pub fn with_size_clamped(self, size: u8) -> Self {
        self.replace_size(size).clamped()
    }

    fn replace_size(self, size: u8) -> Self {
        match self {
            Self::Logic { op, .. } => Self::Logic { op, inputs: size },
            Self::Mux { .. } => Self::Mux { select_bits: size },
            Self::Demux { .. } => Self::Demux { select_bits: size },
            Self::Encoder { .. } => Self::Encoder { inputs: size },
            Self::Decoder { .. } => Self::Decoder { inputs: size },
            other @ (Self::Not | Self::Input { .. } | Self::Led) => other,
        }
    }

    #[must_use]
    pub const fn is_input(&self) -> bool {
        matches!(self, Self::Input { .. })
    }

    #[must_use]
    pub const fn is_led(&self) -> bool {
        matches!(self, Self::Led)
    }

    /// Switch state; `None` for anything but an input switch.
    #[must_use]
    pub const fn input_state(&self) -> Option<bool> {
        match *self {
            Self::Input { state } => Some(state),
            _ => None,
        }
    }

    #[must_use]
    pub const fn select_bits(&self) -> Option<u8> {
        match *self {
            Self::Mux { select_bits } | Self::Demux { select_bits } => Some(select_bits),
            _ => None,
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.size() {
            Some(size) => write!(f, "{}({size})", self.display_name()),
            None => f.write_str(self.display_name()),
        }
    }
}

fn encoder_outputs(inputs: u8) -> usize {
    let n = u32::from(inputs.max(1));
    let bits = u32::BITS - (n - 1).leading_zeros();
    bits.max(1) as usize
}

fn nearest_encoder_index(inputs: u8) -> usize {
    ENCODER_SIZES
        .iter()
        .enumerate()
        .min_by_key(|(_, size)| (i32::from(**size) - i32::from(inputs)).abs())
        .map_or(0, |(idx, _)| idx)
}
