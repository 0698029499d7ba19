/*!
 * Choreography of the ceremony scene.
 *
 * - `stage`: the seven named stages and their delay-based transitions
 * - `timer`: the single pending-transition slot
 * - `threshold`: playback samples and one-shot threshold watchers
 * - `clock`: turns transport events into validated samples
 * - `controller`: the state machine tying them together
 */

pub mod clock;
pub mod controller;
pub mod stage;
pub mod threshold;
pub mod timer;

pub use clock::PlaybackClock;
pub use controller::{ChoreographyController, ChoreographyEvent, ChoreographySnapshot, Effect};
pub use stage::Stage;
pub use threshold::{PlaybackSample, ThresholdWatcher};
pub use timer::{PendingTimer, TimerSlot};
