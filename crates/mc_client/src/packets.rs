//! Concrete packet types for the handshake, status, login, and configuration
//! sub-protocols, plus the handful of Play-state packets needed to exercise
//! the dispatcher's bundle rule end to end. The full schema set (the
//! hundred-plus remaining Play packets) is generated elsewhere and is not
//! this crate's concern -- every type here just needs to implement
//! [`Packet`].

use std::io::{Read, Write};

use mc_protocol::{
    decode_prefixed_array, encode_array, Angle, Decode, Direction, Encode, Packet, Result, State,
    Uuid, VarInt,
};

/// `next_state` values carried in the handshake packet.
pub const HANDSHAKE_STATUS_NEXT: i32 = 1;
pub const HANDSHAKE_LOGIN_NEXT: i32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Handshake {
    pub protocol_version: i32,
    pub server_address: String,
    pub server_port: u16,
    pub next_state: i32,
}

impl Packet for Handshake {
    const STATE: State = State::Handshaking;
    const DIRECTION: Direction = Direction::Serverbound;
    const ID: i32 = 0x00;

    fn decode_body(reader: &mut impl Read) -> Result<Self> {
        Ok(Handshake {
            protocol_version: VarInt::decode(reader)?.0,
            server_address: String::decode(reader)?,
            server_port: u16::decode(reader)?,
            next_state: VarInt::decode(reader)?.0,
        })
    }

    fn encode_body(&self, writer: &mut impl Write) -> Result<()> {
        VarInt(self.protocol_version).encode(writer)?;
        self.server_address.encode(writer)?;
        self.server_port.encode(writer)?;
        VarInt(self.next_state).encode(writer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusRequest;

impl Packet for StatusRequest {
    const STATE: State = State::Status;
    const DIRECTION: Direction = Direction::Serverbound;
    const ID: i32 = 0x00;

    fn decode_body(_reader: &mut impl Read) -> Result<Self> {
        Ok(StatusRequest)
    }

    fn encode_body(&self, _writer: &mut impl Write) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusResponse {
    pub json: String,
}

impl Packet for StatusResponse {
    const STATE: State = State::Status;
    const DIRECTION: Direction = Direction::Clientbound;
    const ID: i32 = 0x00;

    fn decode_body(reader: &mut impl Read) -> Result<Self> {
        Ok(StatusResponse {
            json: String::decode(reader)?,
        })
    }

    fn encode_body(&self, writer: &mut impl Write) -> Result<()> {
        self.json.encode(writer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingRequest {
    pub payload: i64,
}

impl Packet for PingRequest {
    const STATE: State = State::Status;
    const DIRECTION: Direction = Direction::Serverbound;
    const ID: i32 = 0x01;

    fn decode_body(reader: &mut impl Read) -> Result<Self> {
        Ok(PingRequest {
            payload: i64::decode(reader)?,
        })
    }

    fn encode_body(&self, writer: &mut impl Write) -> Result<()> {
        self.payload.encode(writer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PongResponse {
    pub payload: i64,
}

impl Packet for PongResponse {
    const STATE: State = State::Status;
    const DIRECTION: Direction = Direction::Clientbound;
    const ID: i32 = 0x01;

    fn decode_body(reader: &mut impl Read) -> Result<Self> {
        Ok(PongResponse {
            payload: i64::decode(reader)?,
        })
    }

    fn encode_body(&self, writer: &mut impl Write) -> Result<()> {
        self.payload.encode(writer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginStart {
    pub username: String,
    pub uuid: Uuid,
}

impl Packet for LoginStart {
    const STATE: State = State::Login;
    const DIRECTION: Direction = Direction::Serverbound;
    const ID: i32 = 0x00;

    fn decode_body(reader: &mut impl Read) -> Result<Self> {
        Ok(LoginStart {
            username: String::decode(reader)?,
            uuid: Uuid::decode(reader)?,
        })
    }

    fn encode_body(&self, writer: &mut impl Write) -> Result<()> {
        self.username.encode(writer)?;
        self.uuid.encode(writer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncryptionRequest {
    pub server_id: String,
    pub public_key: Vec<u8>,
    pub verify_token: Vec<u8>,
}

impl Packet for EncryptionRequest {
    const STATE: State = State::Login;
    const DIRECTION: Direction = Direction::Clientbound;
    const ID: i32 = 0x01;

    fn decode_body(reader: &mut impl Read) -> Result<Self> {
        Ok(EncryptionRequest {
            server_id: String::decode(reader)?,
            public_key: decode_prefixed_array(reader)?,
            verify_token: decode_prefixed_array(reader)?,
        })
    }

    fn encode_body(&self, writer: &mut impl Write) -> Result<()> {
        self.server_id.encode(writer)?;
        VarInt(self.public_key.len() as i32).encode(writer)?;
        encode_array(&self.public_key, writer)?;
        VarInt(self.verify_token.len() as i32).encode(writer)?;
        encode_array(&self.verify_token, writer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginProperty {
    pub name: String,
    pub value: String,
    pub signature: Option<String>,
}

impl Decode for LoginProperty {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        let name = String::decode(reader)?;
        let value = String::decode(reader)?;
        let is_signed = bool::decode(reader)?;
        let signature = if is_signed {
            Some(String::decode(reader)?)
        } else {
            None
        };
        Ok(LoginProperty {
            name,
            value,
            signature,
        })
    }
}

impl Encode for LoginProperty {
    fn encode(&self, writer: &mut impl Write) -> Result<()> {
        self.name.encode(writer)?;
        self.value.encode(writer)?;
        self.signature.is_some().encode(writer)?;
        if let Some(signature) = &self.signature {
            signature.encode(writer)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginSuccess {
    pub uuid: Uuid,
    pub username: String,
    pub properties: Vec<LoginProperty>,
}

impl Packet for LoginSuccess {
    const STATE: State = State::Login;
    const DIRECTION: Direction = Direction::Clientbound;
    const ID: i32 = 0x02;

    fn decode_body(reader: &mut impl Read) -> Result<Self> {
        Ok(LoginSuccess {
            uuid: Uuid::decode(reader)?,
            username: String::decode(reader)?,
            properties: decode_prefixed_array(reader)?,
        })
    }

    fn encode_body(&self, writer: &mut impl Write) -> Result<()> {
        self.uuid.encode(writer)?;
        self.username.encode(writer)?;
        VarInt(self.properties.len() as i32).encode(writer)?;
        encode_array(&self.properties, writer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCompression {
    pub threshold: i32,
}

impl Packet for SetCompression {
    const STATE: State = State::Login;
    const DIRECTION: Direction = Direction::Clientbound;
    const ID: i32 = 0x03;

    fn decode_body(reader: &mut impl Read) -> Result<Self> {
        Ok(SetCompression {
            threshold: VarInt::decode(reader)?.0,
        })
    }

    fn encode_body(&self, writer: &mut impl Write) -> Result<()> {
        VarInt(self.threshold).encode(writer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoginAcknowledged;

impl Packet for LoginAcknowledged {
    const STATE: State = State::Login;
    const DIRECTION: Direction = Direction::Serverbound;
    const ID: i32 = 0x03;

    fn decode_body(_reader: &mut impl Read) -> Result<Self> {
        Ok(LoginAcknowledged)
    }

    fn encode_body(&self, _writer: &mut impl Write) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinishConfigurationServerbound;

impl Packet for FinishConfigurationServerbound {
    const STATE: State = State::Configuration;
    const DIRECTION: Direction = Direction::Serverbound;
    const ID: i32 = 0x03;

    fn decode_body(_reader: &mut impl Read) -> Result<Self> {
        Ok(FinishConfigurationServerbound)
    }

    fn encode_body(&self, _writer: &mut impl Write) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinishConfigurationClientbound;

impl Packet for FinishConfigurationClientbound {
    const STATE: State = State::Configuration;
    const DIRECTION: Direction = Direction::Clientbound;
    const ID: i32 = 0x03;

    fn decode_body(_reader: &mut impl Read) -> Result<Self> {
        Ok(FinishConfigurationClientbound)
    }

    fn encode_body(&self, _writer: &mut impl Write) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BundleDelimiter;

impl Packet for BundleDelimiter {
    const STATE: State = State::Play;
    const DIRECTION: Direction = Direction::Clientbound;
    const ID: i32 = 0x00;

    fn decode_body(_reader: &mut impl Read) -> Result<Self> {
        Ok(BundleDelimiter)
    }

    fn encode_body(&self, _writer: &mut impl Write) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnEntity {
    pub entity_id: i32,
    pub entity_uuid: Uuid,
    pub entity_type: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: Angle,
    pub yaw: Angle,
    pub head_yaw: Angle,
    pub data: i32,
    pub velocity_x: i16,
    pub velocity_y: i16,
    pub velocity_z: i16,
}

impl Packet for SpawnEntity {
    const STATE: State = State::Play;
    const DIRECTION: Direction = Direction::Clientbound;
    const ID: i32 = 0x01;

    fn decode_body(reader: &mut impl Read) -> Result<Self> {
        Ok(SpawnEntity {
            entity_id: VarInt::decode(reader)?.0,
            entity_uuid: Uuid::decode(reader)?,
            entity_type: VarInt::decode(reader)?.0,
            x: f64::decode(reader)?,
            y: f64::decode(reader)?,
            z: f64::decode(reader)?,
            pitch: Angle::decode(reader)?,
            yaw: Angle::decode(reader)?,
            head_yaw: Angle::decode(reader)?,
            data: VarInt::decode(reader)?.0,
            velocity_x: i16::decode(reader)?,
            velocity_y: i16::decode(reader)?,
            velocity_z: i16::decode(reader)?,
        })
    }

    fn encode_body(&self, writer: &mut impl Write) -> Result<()> {
        VarInt(self.entity_id).encode(writer)?;
        self.entity_uuid.encode(writer)?;
        VarInt(self.entity_type).encode(writer)?;
        self.x.encode(writer)?;
        self.y.encode(writer)?;
        self.z.encode(writer)?;
        self.pitch.encode(writer)?;
        self.yaw.encode(writer)?;
        self.head_yaw.encode(writer)?;
        VarInt(self.data).encode(writer)?;
        self.velocity_x.encode(writer)?;
        self.velocity_y.encode(writer)?;
        self.velocity_z.encode(writer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityVelocity {
    pub entity_id: i32,
    pub velocity_x: i16,
    pub velocity_y: i16,
    pub velocity_z: i16,
}

impl Packet for EntityVelocity {
    const STATE: State = State::Play;
    const DIRECTION: Direction = Direction::Clientbound;
    const ID: i32 = 0x5A;

    fn decode_body(reader: &mut impl Read) -> Result<Self> {
        Ok(EntityVelocity {
            entity_id: VarInt::decode(reader)?.0,
            velocity_x: i16::decode(reader)?,
            velocity_y: i16::decode(reader)?,
            velocity_z: i16::decode(reader)?,
        })
    }

    fn encode_body(&self, writer: &mut impl Write) -> Result<()> {
        VarInt(self.entity_id).encode(writer)?;
        self.velocity_x.encode(writer)?;
        self.velocity_y.encode(writer)?;
        self.velocity_z.encode(writer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    pub keep_alive_id: i64,
}

impl Packet for KeepAlive {
    const STATE: State = State::Play;
    const DIRECTION: Direction = Direction::Clientbound;
    const ID: i32 = 0x24;

    fn decode_body(reader: &mut impl Read) -> Result<Self> {
        Ok(KeepAlive {
            keep_alive_id: i64::decode(reader)?,
        })
    }

    fn encode_body(&self, writer: &mut impl Write) -> Result<()> {
        self.keep_alive_id.encode(writer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Disconnect {
    pub reason: String,
}

impl Packet for Disconnect {
    const STATE: State = State::Play;
    const DIRECTION: Direction = Direction::Clientbound;
    const ID: i32 = 0x1D;

    fn decode_body(reader: &mut impl Read) -> Result<Self> {
        Ok(Disconnect {
            reason: String::decode(reader)?,
        })
    }

    fn encode_body(&self, writer: &mut impl Write) -> Result<()> {
        self.reason.encode(writer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartConfiguration;

impl Packet for StartConfiguration {
    const STATE: State = State::Play;
    const DIRECTION: Direction = Direction::Clientbound;
    const ID: i32 = 0x65;

    fn decode_body(_reader: &mut impl Read) -> Result<Self> {
        Ok(StartConfiguration)
    }

    fn encode_body(&self, _writer: &mut impl Write) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn handshake_roundtrip() {
        let packet = Handshake {
            protocol_version: 767,
            server_address: "play.example.com".into(),
            server_port: 25565,
            next_state: HANDSHAKE_LOGIN_NEXT,
        };
        let mut buf = Vec::new();
        packet.encode_body(&mut buf).unwrap();
        let decoded = Handshake::decode_body(&mut Cursor::new(buf)).unwrap();
        assert_eq!(packet, decoded);
    }

    #[test]
    fn login_success_with_unsigned_property_roundtrips() {
        let packet = LoginSuccess {
            uuid: Uuid::new_v4(),
            username: "Notch".into(),
            properties: vec![LoginProperty {
                name: "textures".into(),
                value: "base64-blob".into(),
                signature: None,
            }],
        };
        let mut buf = Vec::new();
        packet.encode_body(&mut buf).unwrap();
        let decoded = LoginSuccess::decode_body(&mut Cursor::new(buf)).unwrap();
        assert_eq!(packet, decoded);
    }

    #[test]
    fn spawn_entity_roundtrip() {
        let packet = SpawnEntity {
            entity_id: 42,
            entity_uuid: Uuid::new_v4(),
            entity_type: 93,
            x: 12.5,
            y: 64.0,
            z: -8.25,
            pitch: Angle(0),
            yaw: Angle(128),
            head_yaw: Angle(64),
            data: 0,
            velocity_x: 0,
            velocity_y: 0,
            velocity_z: 0,
        };
        let mut buf = Vec::new();
        packet.encode_body(&mut buf).unwrap();
        let decoded = SpawnEntity::decode_body(&mut Cursor::new(buf)).unwrap();
        assert_eq!(packet, decoded);
    }
}
