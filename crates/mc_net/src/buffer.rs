use std::io::{self, Cursor, Read};

/// A seekable in-memory byte container holding a single, already-framed
/// packet payload.
///
/// `PacketBuffer` implements [`Read`] directly, so every decoder in
/// `mc_protocol` (written against a generic `impl Read`) works unchanged
/// whether it's reading from a `PacketBuffer` or straight off a socket --
/// the buffer exists purely so the dispatcher can hand a payload to more
/// than one handler without re-reading the stream.
#[derive(Debug, Clone)]
pub struct PacketBuffer {
    cursor: Cursor<Vec<u8>>,
}

impl PacketBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    /// Bytes not yet consumed, without advancing the read position.
    pub fn remaining(&self) -> &[u8] {
        let pos = self.cursor.position() as usize;
        &self.cursor.get_ref()[pos..]
    }

    /// An independent `PacketBuffer` over the bytes not yet consumed by
    /// `self`. Used by the dispatcher's multi-subscriber fan-out: each
    /// handler reads from its own snapshot, so one handler consuming bytes
    /// never affects another's view.
    pub fn snapshot(&self) -> PacketBuffer {
        PacketBuffer::new(self.remaining().to_vec())
    }

    /// Consumes and returns every remaining byte.
    pub fn read_to_end(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        Read::read_to_end(self, &mut out).expect("reading from an in-memory buffer cannot fail");
        out
    }
}

impl Read for PacketBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mc_protocol::{Decode, VarInt};

    #[test]
    fn snapshot_does_not_advance_original() {
        let mut buf = PacketBuffer::new(vec![0x01, 0x02, 0x03]);
        let mut first_byte = [0u8; 1];
        buf.read_exact(&mut first_byte).unwrap();

        let snap = buf.snapshot();
        assert_eq!(snap.remaining(), &[0x02, 0x03]);
        assert_eq!(buf.remaining(), &[0x02, 0x03]);
    }

    #[test]
    fn multiple_snapshots_are_independent() {
        let buf = PacketBuffer::new(vec![0x80, 0x01]); // VarInt(128)
        let mut snap_a = buf.snapshot();
        let mut snap_b = buf.snapshot();

        let a = VarInt::decode(&mut snap_a).unwrap();
        let b = VarInt::decode(&mut snap_b).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.0, 128);
        assert!(snap_a.remaining().is_empty());
        assert!(snap_b.remaining().is_empty());
    }
}
