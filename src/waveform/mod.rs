/*!
Snippet memory contents.

The chip plays waveforms out of a 100 byte memory window
(`SNP_MEM_0`..`SNP_MEM_99`). Two ways of filling it are provided:

* [`PatternBuilder`] works on raw amplitude bytes, with a byte level `repeat`
  and a reserved all-zero silence level.
* [`SnippetBuilder`], [`FrameBuilder`], [`SequenceBuilder`] and
  [`WaveformMemoryBuilder`] produce the structured layout the playback engine
  reads in RTWM and ETWM modes: piecewise linear snippets, referenced by frames,
  grouped into sequences.

Both produce a [`SnippetMemory`] which `Da728x::upload` writes to the chip.

```
use da728x::waveform::{FrameBuilder, SequenceBuilder, SnippetBuilder, WaveformMemoryBuilder};

let click = SnippetBuilder::new().ramp(1, 15)?.ramp(1, 0)?.build()?;

let mut memory = WaveformMemoryBuilder::new();
let id = memory.add_snippet(&click)?;
let sequence = SequenceBuilder::new()
    .add_frame(FrameBuilder::new(id)?.loop_count(2)?.build())?
    .build()?;
memory.add_sequence(&sequence)?;

let memory = memory.build()?;
assert_eq!(memory.as_bytes()[..2], [1, 1]);
# Ok::<(), da728x::WaveformError>(())
```
*/

mod frame;
mod memory;
mod pattern;
mod sequence;
mod snippet;

pub use frame::{Frame, FrameBuilder, Gain, Timebase};
pub use memory::{SnippetMemory, WaveformMemoryBuilder, MAX_SEQUENCES, MAX_SNIPPETS};
pub use pattern::{PatternBuilder, SILENCE};
pub use sequence::{Sequence, SequenceBuilder, MAX_FRAMES_PER_SEQUENCE, MAX_SEQUENCE_BYTES};
pub use snippet::{PwlPoint, Snippet, SnippetBuilder, MAX_POINTS_PER_SNIPPET};
