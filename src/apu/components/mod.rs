//! Common APU components used by multiple channels

pub mod divider;
pub mod envelope;
pub mod frame_sequencer;
pub mod length_counter;
pub mod linear_counter;
pub mod sequencer;
pub mod sweep;
pub mod timer;

pub use divider::Divider;
pub use envelope::Envelope;
pub use frame_sequencer::{FrameEvent, FrameMode, FrameSequencer};
pub use length_counter::LengthCounter;
pub use linear_counter::LinearCounter;
pub use sequencer::{NoiseShiftRegister, PulseSequencer, TriangleSequencer, WaveformGenerator};
pub use sweep::{NegateMode, Sweep};
pub use timer::Timer;
