// Synthesis, device and scheduling layers of the melody engine
pub mod scales;
pub mod envelope;
pub mod synth;
pub mod voices;
pub mod device;
pub mod timer;
pub mod scheduler;

pub use envelope::{Breakpoint, Curve, Envelope};
pub use synth::{synthesize, EventKind, EventSource, NoteEvents, SoundEvent, Waveform};
pub use device::{AudioOutput, OutputDevice, RodioDevice};
pub use scheduler::{PlaybackScheduler, SessionId, SessionInfo, AUTO_STOP_MARGIN_SECONDS};
