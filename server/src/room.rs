use std::{borrow::Borrow, collections::HashMap, fmt, net::SocketAddr};

use uuid::Uuid;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(RoomId);
string_id!(MemberId);

#[derive(Debug, Clone)]
pub struct Member {
    id: MemberId,
    name: String,
    is_host: bool,
    address: Option<SocketAddr>,
}

impl Member {
    pub fn host(name: &str) -> Self {
        Self::new(name, true)
    }

    pub fn guest(name: &str) -> Self {
        Self::new(name, false)
    }

    fn new(name: &str, is_host: bool) -> Self {
        Self {
            id: MemberId::generate(),
            name: name.to_string(),
            is_host,
            address: None,
        }
    }

    pub fn id(&self) -> &MemberId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// `None` until the member announces itself on the data channel.
    pub fn address(&self) -> Option<SocketAddr> {
        self.address
    }

    pub(crate) fn set_address(&mut self, address: SocketAddr) {
        self.address = Some(address);
    }
}

#[derive(Debug, Clone)]
pub struct LoggedMessage {
    pub member_id: MemberId,
    pub content: String,
}

pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub password: String,
    pub members: HashMap<MemberId, Member>,
    pub messages: Vec<LoggedMessage>,
}

impl Room {
    pub fn new(name: &str, password: &str) -> Self {
        Self {
            id: RoomId::generate(),
            name: name.to_string(),
            password: password.to_string(),
            members: HashMap::new(),
            messages: Vec::new(),
        }
    }

    pub fn admits(&self, supplied_password: &str) -> bool {
        self.password.is_empty() || self.password == supplied_password
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            password: self.password.clone(),
            member_count: self.members.len(),
        }
    }
}

/// Point-in-time copy of a room's descriptive fields, handed out by the
/// registry so callers never hold on to registry state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub id: RoomId,
    pub name: String,
    pub password: String,
    pub member_count: usize,
}

impl RoomInfo {
    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }
}
