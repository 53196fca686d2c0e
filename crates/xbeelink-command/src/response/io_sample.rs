use serde::Serialize;

use crate::address::{Address16, Address64};
use crate::error::Result;
use crate::fields::Fields;

/// One analog reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalogSample {
    pub channel: u8,
    pub value: u16,
}

/// IO data sample indicator (0x92).
///
/// `digital_mask` names the pins sampled as digital I/O; `digital_samples`
/// holds their levels and is present only when the mask is non-zero.
/// Analog readings follow in ascending channel order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IoSample {
    pub source64: Address64,
    pub source16: Address16,
    pub options: u8,
    pub sample_count: u8,
    pub digital_mask: u16,
    pub analog_mask: u8,
    pub digital_samples: Option<u16>,
    pub analog_samples: Vec<AnalogSample>,
}

impl IoSample {
    pub(crate) fn decode(data: &[u8]) -> Result<Self> {
        let mut fields = Fields::new(data);
        let source64 = fields.address64("source address")?;
        let source16 = fields.address16("source network address")?;
        let options = fields.u8("receive options")?;
        let sample_count = fields.u8("sample count")?;
        let digital_mask = fields.u16("digital channel mask")?;
        let analog_mask = fields.u8("analog channel mask")?;

        let digital_samples = if digital_mask != 0 {
            Some(fields.u16("digital samples")?)
        } else {
            None
        };

        let mut analog_samples = Vec::with_capacity(analog_mask.count_ones() as usize);
        for channel in 0..8u8 {
            if analog_mask & (1 << channel) != 0 {
                let value = fields.u16("analog sample")?;
                analog_samples.push(AnalogSample { channel, value });
            }
        }

        Ok(Self {
            source64,
            source16,
            options,
            sample_count,
            digital_mask,
            analog_mask,
            digital_samples,
            analog_samples,
        })
    }

    /// Level of a digital pin, or `None` if the pin was not sampled.
    pub fn digital(&self, pin: u8) -> Option<bool> {
        if pin >= 16 || self.digital_mask & (1 << pin) == 0 {
            return None;
        }
        self.digital_samples.map(|levels| levels & (1 << pin) != 0)
    }

    /// Reading of an analog channel, or `None` if it was not sampled.
    pub fn analog(&self, channel: u8) -> Option<u16> {
        self.analog_samples
            .iter()
            .find(|s| s.channel == channel)
            .map(|s| s.value)
    }

    /// Pins present in the digital mask, ascending.
    pub fn digital_pins(&self) -> impl Iterator<Item = u8> + '_ {
        (0..16u8).filter(move |pin| self.digital_mask & (1 << pin) != 0)
    }
}
