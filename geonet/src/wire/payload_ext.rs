//! Extension traits for payloads.
use core::ops;
use super::{PayloadMut, Reframe, PayloadResult};

/// Describes the resizing that keeps a payload intact.
pub struct ReframePayload {
    /// Total length of the new buffer.
    ///
    /// Must not be smaller than `new_payload.end`.
    pub length: usize,

    /// The position of the payload before reframing.
    pub old_payload: ops::Range<usize>,

    /// The position of the payload after reframing, same length as `old_payload`.
    pub new_payload: ops::Range<usize>,
}

/// Extends the mutable payload structures with new reorganization methods.
pub trait PayloadMutExt: PayloadMut {
    /// Reframe but keep the payload, possibly at a new position.
    ///
    /// A forwarded GeoNetworking packet keeps its network headers and payload while the link
    /// layer framing around it is rewritten. The bytes are moved after growing or before
    /// shrinking the buffer so that they are never cut off.
    ///
    /// # Panics
    ///
    /// This methods panics if the reframe is inconsistent, that is:
    ///
    /// * The `old_payload` is not contained in the current frame.
    /// * The `new_payload` is not contained in the wanted frame.
    /// * The paylods differ in length.
    fn reframe_payload(&mut self, frame: ReframePayload) -> PayloadResult<()> {
        assert_eq!(frame.old_payload.len(), frame.new_payload.len());

        let current_len = self.payload().len();
        assert!(current_len >= frame.old_payload.end);
        assert!(frame.length >= frame.new_payload.end);

        if frame.length >= frame.old_payload.end {
            if frame.length != current_len {
                self.reframe(Reframe {
                    length: frame.length,
                    range: frame.old_payload.clone(),
                })?;
            }

            self.payload_mut()
                .as_mut_slice()
                .copy_within(frame.old_payload, frame.new_payload.start);
        } else {
            self.payload_mut()
                .as_mut_slice()
                .copy_within(frame.old_payload, frame.new_payload.start);

            if frame.length != current_len {
                self.reframe(Reframe {
                    length: frame.length,
                    range: frame.new_payload,
                })?;
            }
        }

        Ok(())
    }
}

impl<T: PayloadMut + ?Sized> PayloadMutExt for T { }
