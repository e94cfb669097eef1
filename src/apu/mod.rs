// APU module - Audio Processing Unit implementation
//
// The 2A03 APU: two pulse channels, a triangle channel, a noise channel and
// a delta modulation channel, driven by a frame sequencer that produces the
// quarter- and half-frame control clocks. `Apu::step` advances everything by
// one CPU cycle, mixes the channels and feeds the resampler, which pushes
// finished samples into the stream buffer for the playback thread.

pub mod channels;
pub mod components;
pub mod constants;
pub mod registers;
pub mod save_state;

#[cfg(test)]
mod tests;

use crate::audio::{AudioStats, Mixer, Resampler, StreamBuffer, StreamReader};
use crate::bus::MemoryMappedDevice;
use crate::config::AudioConfig;
use channels::{Channel, DmcChannel, NoiseChannel, PulseChannel, TriangleChannel};
use components::{FrameEvent, FrameSequencer};

pub use registers::{ChannelId, Register};
pub use save_state::{ApuSaveState, ApuState, SaveStateError};

/// Status register bit: frame interrupt
const STATUS_FRAME_IRQ: u8 = 0x40;
/// Status register bit: DMC interrupt
const STATUS_DMC_IRQ: u8 = 0x80;

/// APU structure representing the Audio Processing Unit state
///
/// The APU owns every channel, the frame sequencer and the producer side of
/// the sample stream. It is driven from a single thread; only the stream is
/// shared with the consumer.
pub struct Apu {
    /// Pulse channel 1 ($4000-$4003)
    pub(crate) pulse1: PulseChannel,
    /// Pulse channel 2 ($4004-$4007)
    pub(crate) pulse2: PulseChannel,
    /// Triangle channel ($4008-$400B)
    pub(crate) triangle: TriangleChannel,
    /// Noise channel ($400C-$400F)
    pub(crate) noise: NoiseChannel,
    /// DMC channel ($4010-$4013)
    pub(crate) dmc: DmcChannel,
    /// Frame sequencer ($4017)
    pub(crate) frame_sequencer: FrameSequencer,

    mixer: Mixer,
    resampler: Resampler,
    stream: StreamBuffer,

    /// CPU cycles since power-on or reset
    cycle: u64,
    /// CPU cycles stepped by this instance, across resets and state loads
    steps: u64,
    /// Samples produced by the resampler (accepted or dropped), same lifetime as `steps`
    samples_emitted: u64,
}

impl Apu {
    /// Create a new APU with the default audio configuration
    pub fn new() -> Self {
        Self::with_config(&AudioConfig::default())
    }

    /// Create a new APU producing samples at the configured rate
    ///
    /// The configuration is clamped first, so any `AudioConfig` is accepted.
    pub fn with_config(config: &AudioConfig) -> Self {
        let config = config.clone().clamped();
        Self {
            pulse1: PulseChannel::pulse1(),
            pulse2: PulseChannel::pulse2(),
            triangle: TriangleChannel::new(),
            noise: NoiseChannel::new(),
            dmc: DmcChannel::new(),
            frame_sequencer: FrameSequencer::new(),
            mixer: Mixer::new(),
            resampler: Resampler::ntsc(config.sample_rate),
            // The APU output is mono regardless of the device layout
            stream: StreamBuffer::new(config.buffer_capacity, config.sample_rate, 1),
            cycle: 0,
            steps: 0,
            samples_emitted: 0,
        }
    }

    /// Reset the APU to its power-on state
    ///
    /// The stream buffer and its contents are kept, and so are the
    /// [`Apu::stats`] counters, which describe the stream.
    pub fn reset(&mut self) {
        log::debug!("APU reset at cycle {}", self.cycle);

        self.pulse1 = PulseChannel::pulse1();
        self.pulse2 = PulseChannel::pulse2();
        self.triangle = TriangleChannel::new();
        self.noise = NoiseChannel::new();
        self.dmc = DmcChannel::new();
        self.frame_sequencer.reset();
        self.resampler.reset();
        self.cycle = 0;
    }

    /// Advance the APU by one CPU cycle
    pub fn step(&mut self) {
        if let Some(event) = self.frame_sequencer.clock() {
            self.apply_frame_event(event);
        }

        let cycle = self.cycle;
        for id in ChannelId::ALL {
            self.channel_mut(id).clock_timer(cycle);
        }

        let level = self.mixer.mix(
            self.pulse1.output(),
            self.pulse2.output(),
            self.triangle.output(),
            self.noise.output(),
            self.dmc.output(),
        );

        if let Some(sample) = self.resampler.push(level) {
            self.samples_emitted += 1;
            // A rejected sample is counted by the stream; emulation carries on
            self.stream.append(sample);
        }

        self.cycle += 1;
        self.steps += 1;
    }

    /// Handle a write to a decoded register
    pub fn write_register(&mut self, register: Register, data: u8) {
        match register {
            Register::Channel(id, index) => self.channel_mut(id).write_register(index, data),
            Register::Status => self.write_status(data),
            Register::FrameCounter => {
                if let Some(event) = self.frame_sequencer.write_control(data) {
                    self.apply_frame_event(event);
                }
            }
        }
    }

    /// $4015 write: ---D NT21 channel enables, acknowledges the DMC IRQ
    fn write_status(&mut self, data: u8) {
        for id in ChannelId::ALL {
            let enabled = (data & id.status_bit()) != 0;
            self.channel_mut(id).set_enabled(enabled);
        }
        self.dmc.clear_irq();
    }

    /// $4015 read: IF-D NT21
    ///
    /// Reading acknowledges the frame interrupt.
    pub fn read_status(&mut self) -> u8 {
        let status = self.peek_status();
        self.frame_sequencer.clear_irq();
        status
    }

    /// Status register value without the read side effect
    pub fn peek_status(&self) -> u8 {
        let mut status = 0;
        for id in ChannelId::ALL {
            if self.channel(id).is_active() {
                status |= id.status_bit();
            }
        }
        if self.frame_sequencer.irq_pending() {
            status |= STATUS_FRAME_IRQ;
        }
        if self.dmc.irq_pending() {
            status |= STATUS_DMC_IRQ;
        }
        status
    }

    /// Clock envelopes and the triangle linear counter
    pub fn clock_quarter_frame(&mut self) {
        for id in ChannelId::ALL {
            self.channel_mut(id).clock_quarter_frame();
        }
    }

    /// Clock length counters and sweep units
    pub fn clock_half_frame(&mut self) {
        for id in ChannelId::ALL {
            self.channel_mut(id).clock_half_frame();
        }
    }

    fn apply_frame_event(&mut self, event: FrameEvent) {
        self.clock_quarter_frame();
        if event.is_half_frame() {
            self.clock_half_frame();
        }
    }

    fn channel(&self, id: ChannelId) -> &dyn Channel {
        match id {
            ChannelId::Pulse1 => &self.pulse1,
            ChannelId::Pulse2 => &self.pulse2,
            ChannelId::Triangle => &self.triangle,
            ChannelId::Noise => &self.noise,
            ChannelId::Dmc => &self.dmc,
        }
    }

    fn channel_mut(&mut self, id: ChannelId) -> &mut dyn Channel {
        match id {
            ChannelId::Pulse1 => &mut self.pulse1,
            ChannelId::Pulse2 => &mut self.pulse2,
            ChannelId::Triangle => &mut self.triangle,
            ChannelId::Noise => &mut self.noise,
            ChannelId::Dmc => &mut self.dmc,
        }
    }

    /// Current output level of one channel (0-15, DMC 0-127)
    pub fn channel_output(&self, id: ChannelId) -> u8 {
        self.channel(id).output()
    }

    /// Raw bytes last written to a channel's registers
    pub fn channel_registers(&self, id: ChannelId) -> [u8; 4] {
        *self.channel(id).registers()
    }

    /// Check if the frame sequencer has raised its interrupt
    pub fn frame_irq_pending(&self) -> bool {
        self.frame_sequencer.irq_pending()
    }

    /// IRQ line towards the CPU (frame or DMC interrupt)
    pub fn irq_pending(&self) -> bool {
        self.frame_sequencer.irq_pending() || self.dmc.irq_pending()
    }

    /// Address the DMC wants read next, if any
    ///
    /// The host should read the byte and hand it to [`Apu::load_dmc_sample`].
    pub fn dmc_sample_request(&self) -> Option<u16> {
        self.dmc.sample_request()
    }

    /// Deliver a sample byte fetched for the DMC
    pub fn load_dmc_sample(&mut self, byte: u8) {
        self.dmc.load_sample(byte);
    }

    /// Consumer handle for the sample stream
    pub fn stream_reader(&self) -> StreamReader {
        self.stream.reader()
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.resampler.output_rate()
    }

    /// CPU cycles since power-on or reset
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Sample production statistics
    ///
    /// Counted over the lifetime of this `Apu`, like the stream it feeds:
    /// neither [`Apu::reset`] nor [`Apu::load_state`] rewinds them.
    pub fn stats(&self) -> AudioStats {
        AudioStats {
            cycles: self.steps,
            samples_emitted: self.samples_emitted,
            samples_dropped: self.stream.dropped(),
            buffered: self.stream.available(),
        }
    }

    /// Capture the emulation state
    pub fn save_state(&self) -> ApuSaveState {
        ApuSaveState::new(ApuState {
            pulse1: self.pulse1.clone(),
            pulse2: self.pulse2.clone(),
            triangle: self.triangle.clone(),
            noise: self.noise.clone(),
            dmc: self.dmc.clone(),
            frame_sequencer: self.frame_sequencer.clone(),
            resampler: self.resampler.clone(),
            cycle: self.cycle,
        })
    }

    /// Restore a previously captured emulation state
    ///
    /// The stream buffer is left untouched. A state captured at another
    /// sample rate keeps the current resampler, minus its partial sample.
    /// A rejected state leaves the APU as it was.
    pub fn load_state(&mut self, save_state: &ApuSaveState) -> Result<(), SaveStateError> {
        save_state.check()?;

        let state = save_state.state.clone();
        self.pulse1 = state.pulse1;
        self.pulse2 = state.pulse2;
        self.triangle = state.triangle;
        self.noise = state.noise;
        self.dmc = state.dmc;
        self.frame_sequencer = state.frame_sequencer;
        self.cycle = state.cycle;

        if state.resampler.output_rate() == self.resampler.output_rate() {
            self.resampler = state.resampler;
        } else {
            log::debug!(
                "Save state sample rate {} differs from {}, resampler restarted",
                state.resampler.output_rate(),
                self.resampler.output_rate()
            );
            self.resampler.reset();
        }

        log::debug!("APU state restored at cycle {}", self.cycle);
        Ok(())
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMappedDevice for Apu {
    /// Only $4015 is readable; everything else reads as 0
    fn read(&mut self, addr: u16) -> u8 {
        match Register::from_address(addr) {
            Some(Register::Status) => self.read_status(),
            _ => {
                log::trace!("Read from write-only or unmapped APU address ${:04X}", addr);
                0
            }
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match Register::from_address(addr) {
            Some(register) => self.write_register(register, data),
            None => log::trace!("Write to unmapped APU address ${:04X} = ${:02X}", addr, data),
        }
    }
}
